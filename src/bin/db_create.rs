//! Database Schema Tool
//!
//! Drops and recreates the accounts and addresses tables. Destroys all
//! existing data; intended for development and test databases.
//!
//! Run with: cargo run --bin db_create

use sqlx::postgres::PgPoolOptions;

use account_service::db;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("DATABASE_URL")?;

    println!("Connecting to database...");
    let pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&database_url)
        .await?;

    println!("Recreating schema (all existing data is dropped)...");
    db::recreate_schema(&pool).await?;

    if !db::check_schema(&pool).await? {
        anyhow::bail!("Schema verification failed");
    }
    println!("Schema created: accounts, addresses");

    pool.close().await;
    Ok(())
}
