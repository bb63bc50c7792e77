//! Database module
//!
//! Connection checks and schema management for the accounts database.
//! The schema is small enough that we create it directly with DDL rather
//! than a migration framework.

use sqlx::PgPool;

/// Verify database connectivity
pub async fn verify_connection(pool: &PgPool) -> Result<(), sqlx::Error> {
    // Simple connectivity check
    sqlx::query("SELECT 1").execute(pool).await?;

    Ok(())
}

/// Create the accounts and addresses tables when they are missing.
/// Safe to call on every startup.
pub async fn ensure_schema(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS accounts (
            id BIGSERIAL PRIMARY KEY,
            name TEXT NOT NULL,
            email TEXT NOT NULL,
            phone_number TEXT NOT NULL,
            date_joined DATE NOT NULL DEFAULT CURRENT_DATE
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS addresses (
            id BIGSERIAL PRIMARY KEY,
            account_id BIGINT NOT NULL REFERENCES accounts (id),
            name TEXT NOT NULL,
            street TEXT NOT NULL,
            city TEXT NOT NULL,
            state TEXT NOT NULL,
            postal_code TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS addresses_account_id_idx ON addresses (account_id)")
        .execute(pool)
        .await?;

    tracing::info!("Database schema is in place");
    Ok(())
}

/// Drop and recreate both tables. Destroys all data; intended for test and
/// development databases only.
pub async fn recreate_schema(pool: &PgPool) -> Result<(), sqlx::Error> {
    // Children first, the foreign key forbids the other order.
    sqlx::query("DROP TABLE IF EXISTS addresses")
        .execute(pool)
        .await?;

    sqlx::query("DROP TABLE IF EXISTS accounts")
        .execute(pool)
        .await?;

    tracing::info!("Dropped existing tables");
    ensure_schema(pool).await
}

/// Check if required tables exist
pub async fn check_schema(pool: &PgPool) -> Result<bool, sqlx::Error> {
    for table in ["accounts", "addresses"] {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM information_schema.tables
                WHERE table_schema = 'public' AND table_name = $1
            )
            "#,
        )
        .bind(table)
        .fetch_one(pool)
        .await?;

        if !exists {
            tracing::error!("Required table '{}' does not exist", table);
            return Ok(false);
        }
    }

    Ok(true)
}
