//! Account and preference commands.

#![allow(clippy::print_stdout)]

use std::io::{self, BufRead, Write};

use haat_core::Language;
use haat_storefront::AppState;
use haat_storefront::session::SignupForm;

/// Ask on stderr, then read one line of stdin as a password.
pub fn prompt_password(prompt: &str) -> io::Result<String> {
    let mut stderr = io::stderr();
    write!(stderr, "{prompt}")?;
    stderr.flush()?;
    read_password(&mut io::stdin().lock())
}

fn read_password(input: &mut impl BufRead) -> io::Result<String> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            "no password given (use --password, HAAT_PASSWORD or stdin)",
        ));
    }
    Ok(line.trim_end_matches(['\r', '\n']).to_owned())
}

/// Sign in and load the account cart.
pub async fn login(
    state: &AppState,
    email: &str,
    password: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let user = state.login(email, password).await?;
    println!("Signed in as {} <{}>", user.name, user.email);
    Ok(())
}

/// Create an account and sign in.
pub async fn signup(state: &AppState, form: &SignupForm) -> Result<(), Box<dyn std::error::Error>> {
    let user = state.signup(form).await?;
    println!("Welcome, {}! You are signed in as {}.", user.name, user.email);
    Ok(())
}

/// Sign out.
pub async fn logout(state: &AppState) -> Result<(), Box<dyn std::error::Error>> {
    if !state.session().is_authenticated() {
        println!("Not signed in.");
        return Ok(());
    }
    state.logout().await?;
    println!("Signed out.");
    Ok(())
}

/// Refresh and show the signed-in profile.
pub async fn profile(state: &AppState) -> Result<(), Box<dyn std::error::Error>> {
    if !state.session().is_authenticated() {
        println!("Not signed in.");
        return Ok(());
    }
    let user = state.session().refresh_profile(state.api()).await?;
    println!("Name:  {}", user.name);
    println!("Email: {}", user.email);
    if let Some(phone) = &user.phone {
        println!("Phone: {phone}");
    }
    if user.is_admin() {
        println!("Role:  admin");
    }
    Ok(())
}

/// Show the language preference, or change it.
pub fn language(state: &AppState, language: Option<Language>) -> Result<(), Box<dyn std::error::Error>> {
    match language {
        Some(language) => {
            state.session().set_language(language)?;
            println!("Language set to {language}.");
        }
        None => println!("{}", state.language()),
    }
    Ok(())
}
