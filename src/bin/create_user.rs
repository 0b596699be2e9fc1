//! Operator tool: creates a user account from the terminal. The web app has
//! no self-service signup; accounts are provisioned with this binary.

use anyhow::{Context, Result, bail};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::io::{BufRead, Write};
use std::str::FromStr;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let username = prompt("Username: ")?;
    let password = prompt("Password: ")?;

    if username.is_empty() || password.is_empty() {
        bail!("Username and password must not be empty");
    }

    let database_url = std::env::var("DATABASE_URL")
        .unwrap_or_else(|_| "sqlite:bookmarks.db?mode=rwc".to_string());

    let options = SqliteConnectOptions::from_str(&database_url)
        .context("Invalid DATABASE_URL")?
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .connect_with(options)
        .await
        .context("Failed to connect to SQLite database")?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run migrations")?;

    let existing = sqlx::query("SELECT id FROM users WHERE username = ?")
        .bind(&username)
        .fetch_optional(&pool)
        .await?;

    if existing.is_some() {
        bail!("Error creating user: username '{}' already exists", username);
    }

    let password_hash =
        bcrypt::hash(&password, bcrypt::DEFAULT_COST).context("Failed to hash password")?;

    sqlx::query("INSERT INTO users (username, password_hash) VALUES (?, ?)")
        .bind(&username)
        .bind(&password_hash)
        .execute(&pool)
        .await
        .context("Error creating user")?;

    println!("Success. User {} created", username);

    Ok(())
}

fn prompt(label: &str) -> Result<String> {
    print!("{}", label);
    std::io::stdout().flush()?;

    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;

    Ok(line.trim().to_string())
}
