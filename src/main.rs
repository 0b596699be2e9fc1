#[macro_use]
extern crate rocket;

mod api;
mod auth;
mod db;
mod env;
mod error;
mod fragments;
mod metadata;
mod models;
mod routes;
mod telemetry;
mod validation;
#[cfg(test)]
mod test;

use db::purge_expired_sessions;
use rocket::{Build, Rocket, tokio};
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::str::FromStr;
use telemetry::TelemetryFairing;
use tracing::info;

#[launch]
async fn rocket() -> _ {
    if let Err(e) = env::load_environment() {
        eprintln!("Failed to load environment files: {}", e);
    }

    telemetry::init_tracing();

    let database_url = env::database_url();

    let options = SqliteConnectOptions::from_str(&database_url)
        .expect("Invalid DATABASE_URL")
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .connect_with(options)
        .await
        .expect("Failed to connect to SQLite database");

    let pool_clone = pool.clone();

    tokio::spawn(async move {
        tokio::time::sleep(tokio::time::Duration::from_secs(5)).await;

        loop {
            match purge_expired_sessions(&pool_clone).await {
                Ok(count) => {
                    if count > 0 {
                        info!("Purged {} expired sessions", count);
                    }
                }
                Err(e) => {
                    error!("Failed to purge expired sessions: {}", e);
                }
            }

            tokio::time::sleep(tokio::time::Duration::from_secs(3600)).await;
        }
    });

    info!("Running database migrations...");
    match sqlx::migrate!("./migrations").run(&pool).await {
        Ok(_) => info!("Migrations completed successfully"),
        Err(e) => {
            error!("Failed to run migrations: {}", e);
            panic!("Database migration failed: {}", e);
        }
    }

    init_rocket(pool).await
}

pub async fn init_rocket(pool: SqlitePool) -> Rocket<Build> {
    info!("Starting bookmark manager");

    rocket::build()
        .manage(pool)
        .mount(
            "/",
            routes![
                routes::index,
                routes::index_anonymous,
                routes::login_page,
                routes::process_login,
                routes::process_logout,
            ],
        )
        .register("/", catchers![auth::unauthorized])
        .mount(
            "/api",
            routes![
                api::api_list_bookmarks,
                api::api_bookmarks_by_tag,
                api::api_get_bookmark,
                api::api_edit_bookmark,
                api::api_fetch_metadata,
                api::api_create_bookmark,
                api::api_update_bookmark,
                api::api_delete_bookmark,
                api::health,
            ],
        )
        .register("/api", catchers![auth::unauthorized_api])
        .attach(TelemetryFairing)
}
