//! Landing page commands.

#![allow(clippy::print_stdout)]

use haat_core::{Feature, Quantity};
use haat_storefront::AppState;
use haat_storefront::checkout::CheckoutForm;
use haat_storefront::landing::LeadForm;

use super::orders::print_confirmation;
use super::taka;

/// Show a landing page. Opening it records the visit.
pub async fn show(state: &AppState, slug: &str, cta: bool) -> Result<(), Box<dyn std::error::Error>> {
    let funnel = state.landing();
    let page = funnel.open(slug).await?;

    println!("{}", page.title);
    println!("{}", page.headline);
    if let Some(sub) = &page.subheadline {
        println!("{sub}");
    }
    println!();
    match page.compare_at_price() {
        Some(regular) => println!(
            "Offer: {} (regular {})",
            taka(page.effective_price()),
            taka(regular)
        ),
        None => println!("Price: {}", taka(page.effective_price())),
    }

    if !page.features.is_empty() {
        println!();
        for feature in &page.features {
            match feature {
                Feature::Detailed {
                    title,
                    description: Some(description),
                    ..
                } => println!("  * {title}: {description}"),
                other => println!("  * {}", other.title()),
            }
        }
    }

    println!();
    for review in funnel.reviews(&page) {
        let location = review
            .location
            .as_deref()
            .map(|l| format!(", {l}"))
            .unwrap_or_default();
        println!("  \"{}\" - {}{location}", review.text, review.name);
    }

    if cta {
        let recorded = funnel.cta_click(&page).outcome().await;
        tracing::debug!(recorded, "CTA click");
    }
    Ok(())
}

/// Submit a lead for a landing page.
pub async fn lead(
    state: &AppState,
    slug: &str,
    form: &LeadForm,
) -> Result<(), Box<dyn std::error::Error>> {
    let funnel = state.landing();
    let page = funnel.open(slug).await?;
    funnel.submit_lead(&page, form).await?;
    println!("Thanks {}, we will call you shortly.", form.name.trim());
    Ok(())
}

/// Order a landing page's product at the campaign price.
pub async fn buy(
    state: &AppState,
    slug: &str,
    quantity: u32,
    form: &CheckoutForm,
) -> Result<(), Box<dyn std::error::Error>> {
    let funnel = state.landing();
    let page = funnel.open(slug).await?;
    let order = funnel.buy(&page, Quantity::new(quantity)?, form).await?;
    print_confirmation(state, &order);
    Ok(())
}
