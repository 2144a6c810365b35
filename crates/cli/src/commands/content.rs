//! Article and contact commands.

#![allow(clippy::print_stdout)]

use haat_storefront::AppState;
use haat_storefront::content::ContactForm;

/// Characters of an article shown in listings.
const SUMMARY_CHARS: usize = 120;

/// List articles, newest first.
pub async fn articles(state: &AppState) -> Result<(), Box<dyn std::error::Error>> {
    let articles = state.content().articles().await?;
    if articles.is_empty() {
        println!("No articles yet.");
        return Ok(());
    }

    for article in &articles {
        let date = article
            .display_date()
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default();
        println!("{date:<10} {} ({})", article.title, article.slug);
        println!("           {}", article.summary(SUMMARY_CHARS));
    }
    Ok(())
}

/// Print one article.
pub async fn article(state: &AppState, slug: &str) -> Result<(), Box<dyn std::error::Error>> {
    let article = state.content().article(slug).await?;
    println!("{}", article.title);
    if let Some(date) = article.display_date() {
        println!("{}", date.format("%d %B %Y"));
    }
    if !article.tags.is_empty() {
        println!("Tags: {}", article.tags.join(", "));
    }
    println!("\n{}", article.content);
    Ok(())
}

/// Send a contact message.
pub async fn contact(state: &AppState, form: &ContactForm) -> Result<(), Box<dyn std::error::Error>> {
    state.content().send_contact(form).await?;
    println!("Message sent. We will get back to you soon.");
    Ok(())
}
