use anyhow::{Context, Result};
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Cell, Color, Table};
use reqwest::header::AUTHORIZATION;

use catalog_client::{ProductClient, ProductList, Session, SessionError, SessionProvider};

pub async fn list_products(client: &ProductClient, json: bool) -> Result<()> {
    if json {
        let body = client
            .get_products()
            .await
            .context("Failed to fetch products")?;
        println!("{}", serde_json::to_string_pretty(&body)?);
        return Ok(());
    }

    let catalog = client
        .list_products()
        .await
        .context("Failed to fetch products")?;
    if catalog.products.is_empty() {
        println!("{}", "No products visible.".yellow());
        return Ok(());
    }

    println!("{}", render_products(&catalog));
    println!("\n{} products total", catalog.products.len());
    Ok(())
}

fn render_products(catalog: &ProductList) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["ID", "Name", "Author", "Publisher", "Premium"]);

    for product in &catalog.products {
        let premium = if product.premium_offer {
            Cell::new("yes").fg(Color::Green)
        } else {
            Cell::new("no")
        };
        table.add_row(vec![
            Cell::new(product.id.as_deref().unwrap_or("-")),
            Cell::new(product.name.as_deref().unwrap_or("-")),
            Cell::new(product.author.as_deref().unwrap_or("-")),
            Cell::new(product.publisher.as_deref().unwrap_or("-")),
            premium,
        ]);
    }
    table
}

pub async fn whoami(sessions: &dyn SessionProvider, json: bool) -> Result<()> {
    let session = sessions.current_session().await;
    println!("{}", render_whoami(session, json)?);
    Ok(())
}

/// JSON mode prints `null` when nobody is signed in and `{}` when the
/// token carries no readable claims.
fn render_whoami(session: Result<Session, SessionError>, json: bool) -> Result<String> {
    let session = match session {
        Ok(session) => session,
        Err(_) if json => return Ok("null".to_string()),
        Err(e) => return Ok(format!("{} ({})", "anonymous".yellow(), e)),
    };

    let claims = match session.id_token().claims() {
        Ok(claims) => claims,
        Err(e) if json => {
            tracing::warn!("ID token claims unavailable: {}", e);
            return Ok("{}".to_string());
        }
        Err(e) => return Ok(format!("{} ({})", "signed in".green(), e)),
    };
    if json {
        return Ok(serde_json::to_string_pretty(&claims)?);
    }

    let or_dash = |value: Option<String>| value.unwrap_or_else(|| "-".to_string());
    let years = claims.years_as_member.map(|y| y.to_string());
    let expires = claims.expires_at.map(|t| t.to_rfc3339());
    let lines = [
        format!("Username:        {}", or_dash(claims.username).green()),
        format!("Role:            {}", or_dash(claims.role)),
        format!("Years as member: {}", or_dash(years)),
        format!("Expires:         {}", or_dash(expires)),
    ];
    Ok(lines.join("\n"))
}

pub async fn show_headers(client: &ProductClient) -> Result<()> {
    let headers = client.headers().await;
    for (name, value) in &headers {
        let value = value.to_str().unwrap_or("<binary>");
        if *name == AUTHORIZATION {
            println!("{}: {}", name, shorten_token(value));
        } else {
            println!("{}: {}", name, value);
        }
    }
    if !headers.contains_key(AUTHORIZATION) {
        println!("{}", "(anonymous request)".yellow());
    }
    Ok(())
}

fn shorten_token(token: &str) -> String {
    const KEEP: usize = 12;
    match token.char_indices().nth(KEEP) {
        Some((idx, _)) => format!("{}…", &token[..idx]),
        None => token.to_string(),
    }
}
