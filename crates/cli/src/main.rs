//! Haat CLI - storefront client for the terminal.
//!
//! # Usage
//!
//! ```bash
//! # Browse the catalog
//! haat products --keyword mango
//! haat product 65f0c1a2b3c4d5e6f7a8b9c0
//!
//! # Fill the cart and check out as a guest
//! haat cart add 65f0c1a2b3c4d5e6f7a8b9c0 --quantity 2
//! haat checkout --name "Rahim Uddin" --phone 01712345678 \
//!     --address "House 1, Road 2" --city Dhaka
//!
//! # Track an order
//! haat track "#65f0c9"
//!
//! # Walk a campaign landing page
//! haat landing show summer-mango
//! haat landing lead summer-mango --name Rahim --phone 01712345678
//! ```
//!
//! # Environment Variables
//!
//! See `haat_storefront::config` for the full list. `HAAT_API_URL` is
//! required; `HAAT_LOG_JSON=1` switches log output to JSON. `login` and
//! `signup` take the password from `HAAT_PASSWORD`, or read it from stdin,
//! so it stays out of argv.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Args, Parser, Subcommand};
use haat_core::{DeliveryArea, Language, PaymentMethod};
use haat_storefront::AppState;
use haat_storefront::checkout::CheckoutForm;
use haat_storefront::config::StorefrontConfig;
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{Layer, layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "haat")]
#[command(author, version, about = "Haat storefront client")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List products
    Products {
        /// Search keyword
        #[arg(short, long)]
        keyword: Option<String>,

        /// Category id
        #[arg(long)]
        category: Option<String>,

        /// Brand id
        #[arg(long)]
        brand: Option<String>,

        /// Page number
        #[arg(long)]
        page: Option<u32>,
    },
    /// Show one product
    Product {
        /// Product id
        id: String,
    },
    /// List categories
    Categories,
    /// List brands
    Brands,
    /// Manage the cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Check out the cart, or buy one product directly
    Checkout {
        /// Buy this product instead of the cart contents
        #[arg(long)]
        buy_now: Option<String>,

        /// Units to buy with --buy-now
        #[arg(short, long, default_value_t = 1)]
        quantity: u32,

        #[command(flatten)]
        shipping: ShippingArgs,
    },
    /// Track an order by id
    Track {
        /// Order id, with or without a leading '#'
        order_id: String,
    },
    /// Campaign landing pages
    Landing {
        #[command(subcommand)]
        action: LandingAction,
    },
    /// List articles
    Articles,
    /// Read an article
    Article {
        /// Article slug
        slug: String,
    },
    /// Sign in
    Login {
        #[arg(short, long)]
        email: String,

        /// Read from stdin when neither the flag nor HAAT_PASSWORD is set
        #[arg(short, long, env = "HAAT_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    /// Create an account
    Signup {
        #[arg(short, long)]
        name: String,

        #[arg(short, long)]
        email: String,

        /// Read from stdin when neither the flag nor HAAT_PASSWORD is set
        #[arg(short, long, env = "HAAT_PASSWORD", hide_env_values = true)]
        password: Option<String>,

        /// Password confirmation; defaults to the password unless it was typed
        #[arg(long)]
        confirm_password: Option<String>,
    },
    /// Sign out
    Logout,
    /// Show your profile
    Profile,
    /// List your orders
    Orders,
    /// Send a message to the shop
    Contact {
        #[arg(short, long)]
        name: String,

        #[arg(short, long)]
        email: String,

        #[arg(long)]
        phone: Option<String>,

        #[arg(short, long)]
        subject: Option<String>,

        #[arg(short, long)]
        message: String,
    },
    /// Show or set the interface language (en, bn)
    Language {
        /// New language
        language: Option<Language>,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// Show the cart
    Show,
    /// Add a product
    Add {
        /// Product id
        product_id: String,

        #[arg(short, long, default_value_t = 1)]
        quantity: u32,
    },
    /// Remove a product
    Remove {
        /// Product id
        product_id: String,
    },
    /// Empty the cart
    Clear,
}

#[derive(Subcommand)]
enum LandingAction {
    /// Show a landing page
    Show {
        /// Landing page slug
        slug: String,

        /// Also record a call-to-action click
        #[arg(long)]
        cta: bool,
    },
    /// Leave your details for a call back
    Lead {
        /// Landing page slug
        slug: String,

        #[arg(short, long)]
        name: String,

        #[arg(short, long)]
        phone: String,

        #[arg(short, long)]
        address: Option<String>,

        #[arg(long)]
        note: Option<String>,
    },
    /// Order the campaign product
    Buy {
        /// Landing page slug
        slug: String,

        #[arg(short, long, default_value_t = 1)]
        quantity: u32,

        #[command(flatten)]
        shipping: ShippingArgs,
    },
}

/// Shipping details for an order.
#[derive(Args)]
struct ShippingArgs {
    /// Recipient name
    #[arg(long)]
    name: String,

    /// Mobile number (01XXXXXXXXX)
    #[arg(long)]
    phone: String,

    /// Street address
    #[arg(long)]
    address: String,

    /// City or district
    #[arg(long)]
    city: String,

    /// Delivery note
    #[arg(long)]
    note: Option<String>,

    /// Payment method (cod, bkash, nagad)
    #[arg(long, default_value = "cod")]
    payment: PaymentMethod,

    /// Delivery area (inside, outside); detected from the city by default
    #[arg(long)]
    area: Option<DeliveryArea>,
}

impl From<ShippingArgs> for CheckoutForm {
    fn from(args: ShippingArgs) -> Self {
        Self {
            full_name: args.name,
            phone: args.phone,
            address: args.address,
            city: args.city,
            note: args.note,
            payment_method: args.payment,
            delivery_area: args.area,
        }
    }
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &StorefrontConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

fn init_tracing(sentry_enabled: bool) {
    // Defaults to info level for our crates if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "haat_storefront=info,haat_cli=info".into());

    let json = std::env::var("HAAT_LOG_JSON").is_ok_and(|v| v == "1" || v == "true");
    let fmt_layer = if json {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .boxed()
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .with(sentry_enabled.then(|| sentry_tracing::layer().event_filter(sentry_event_filter)))
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match StorefrontConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            init_tracing(false);
            tracing::error!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    // Initialize Sentry (must be done before tracing subscriber)
    let sentry_guard = init_sentry(&config);
    init_tracing(sentry_guard.is_some());

    let result: Result<(), Box<dyn std::error::Error>> = run(cli, config).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        drop(sentry_guard);
        std::process::exit(1);
    }
}

async fn run(cli: Cli, config: StorefrontConfig) -> Result<(), Box<dyn std::error::Error>> {
    let state = AppState::new(config)?;
    if let Err(e) = state.start().await {
        e.report("Failed to load cart");
    }

    let result = dispatch(&state, cli.command).await;
    state.shutdown().await;
    result
}

async fn dispatch(state: &AppState, command: Commands) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Commands::Products {
            keyword,
            category,
            brand,
            page,
        } => commands::catalog::products(state, keyword, category, brand, page).await?,
        Commands::Product { id } => commands::catalog::product(state, &id).await?,
        Commands::Categories => commands::catalog::categories(state).await?,
        Commands::Brands => commands::catalog::brands(state).await?,
        Commands::Cart { action } => match action {
            CartAction::Show => commands::cart::show(state).await?,
            CartAction::Add {
                product_id,
                quantity,
            } => commands::cart::add(state, &product_id, quantity).await?,
            CartAction::Remove { product_id } => {
                commands::cart::remove(state, &product_id).await?;
            }
            CartAction::Clear => commands::cart::clear(state).await?,
        },
        Commands::Checkout {
            buy_now,
            quantity,
            shipping,
        } => {
            commands::orders::checkout(state, buy_now.as_deref(), quantity, &shipping.into())
                .await?;
        }
        Commands::Track { order_id } => commands::orders::track(state, &order_id).await?,
        Commands::Orders => commands::orders::history(state).await?,
        Commands::Landing { action } => match action {
            LandingAction::Show { slug, cta } => commands::landing::show(state, &slug, cta).await?,
            LandingAction::Lead {
                slug,
                name,
                phone,
                address,
                note,
            } => {
                let form = haat_storefront::landing::LeadForm {
                    name,
                    phone,
                    address,
                    note,
                };
                commands::landing::lead(state, &slug, &form).await?;
            }
            LandingAction::Buy {
                slug,
                quantity,
                shipping,
            } => commands::landing::buy(state, &slug, quantity, &shipping.into()).await?,
        },
        Commands::Articles => commands::content::articles(state).await?,
        Commands::Article { slug } => commands::content::article(state, &slug).await?,
        Commands::Contact {
            name,
            email,
            phone,
            subject,
            message,
        } => {
            let form = haat_storefront::content::ContactForm {
                name,
                email,
                phone,
                subject,
                message,
            };
            commands::content::contact(state, &form).await?;
        }
        Commands::Login { email, password } => {
            let password = match password {
                Some(password) => password,
                None => commands::account::prompt_password("Password: ")?,
            };
            commands::account::login(state, &email, &password).await?;
        }
        Commands::Signup {
            name,
            email,
            password,
            confirm_password,
        } => {
            let (password, confirm_password) = match (password, confirm_password) {
                (Some(password), Some(confirm)) => (password, confirm),
                (Some(password), None) => (password.clone(), password),
                (None, confirm) => {
                    let password = commands::account::prompt_password("Password: ")?;
                    let confirm = match confirm {
                        Some(confirm) => confirm,
                        None => commands::account::prompt_password("Confirm password: ")?,
                    };
                    (password, confirm)
                }
            };
            let form = haat_storefront::session::SignupForm {
                name,
                email,
                password,
                confirm_password,
            };
            commands::account::signup(state, &form).await?;
        }
        Commands::Logout => commands::account::logout(state).await?,
        Commands::Profile => commands::account::profile(state).await?,
        Commands::Language { language } => commands::account::language(state, language)?,
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_login_password_flag_is_optional() {
        let cli = Cli::try_parse_from(["haat", "login", "--email", "rahim@example.com"]).unwrap();
        assert!(matches!(cli.command, Commands::Login { .. }));
    }

    #[test]
    fn test_signup_confirmation_is_optional() {
        let cli = Cli::try_parse_from([
            "haat", "signup", "--name", "Rahim", "--email", "rahim@example.com",
            "--password", "secret123",
        ])
        .unwrap();
        let Commands::Signup {
            password,
            confirm_password,
            ..
        } = cli.command
        else {
            panic!("expected signup");
        };
        assert_eq!(password.as_deref(), Some("secret123"));
        assert_eq!(confirm_password, None);
    }
}
