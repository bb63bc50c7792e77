//! Address persistence gateway
//!
//! CRUD operations for addresses, always scoped to the owning account.

use sqlx::PgPool;

use crate::model::{Address, NewAddress};

/// Row tuple for the full address column list.
pub(crate) type AddressRow = (i64, i64, String, String, String, String, String);

pub(crate) fn address_from_row(row: AddressRow) -> Address {
    let (id, account_id, name, street, city, state, postal_code) = row;
    Address {
        id,
        account_id,
        name,
        street,
        city,
        state,
        postal_code,
    }
}

/// Persistence gateway for addresses.
#[derive(Debug, Clone)]
pub struct AddressStore {
    pool: PgPool,
}

impl AddressStore {
    /// Create a new AddressStore
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Returns all addresses owned by the account, in insertion order.
    pub async fn list(&self, account_id: i64) -> Result<Vec<Address>, sqlx::Error> {
        let rows: Vec<AddressRow> = sqlx::query_as(
            r#"
            SELECT id, account_id, name, street, city, state, postal_code
            FROM addresses
            WHERE account_id = $1
            ORDER BY id
            "#,
        )
        .bind(account_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(address_from_row).collect())
    }

    /// Returns the address only when it exists under the given account.
    pub async fn find(
        &self,
        account_id: i64,
        address_id: i64,
    ) -> Result<Option<Address>, sqlx::Error> {
        let row: Option<AddressRow> = sqlx::query_as(
            r#"
            SELECT id, account_id, name, street, city, state, postal_code
            FROM addresses
            WHERE id = $1 AND account_id = $2
            "#,
        )
        .bind(address_id)
        .bind(account_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(address_from_row))
    }

    /// Inserts a new address for the account, returning the stored record
    /// with its assigned id.
    pub async fn insert(&self, account_id: i64, new: NewAddress) -> Result<Address, sqlx::Error> {
        let row: AddressRow = sqlx::query_as(
            r#"
            INSERT INTO addresses (account_id, name, street, city, state, postal_code)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, account_id, name, street, city, state, postal_code
            "#,
        )
        .bind(account_id)
        .bind(&new.name)
        .bind(&new.street)
        .bind(&new.city)
        .bind(&new.state)
        .bind(&new.postal_code)
        .fetch_one(&self.pool)
        .await?;

        Ok(address_from_row(row))
    }

    /// Full replace of every field except `account_id`. Returns the updated
    /// record, or None when no address with that id exists under the account.
    pub async fn replace(
        &self,
        account_id: i64,
        address_id: i64,
        new: NewAddress,
    ) -> Result<Option<Address>, sqlx::Error> {
        let row: Option<AddressRow> = sqlx::query_as(
            r#"
            UPDATE addresses
            SET name = $3, street = $4, city = $5, state = $6, postal_code = $7
            WHERE id = $1 AND account_id = $2
            RETURNING id, account_id, name, street, city, state, postal_code
            "#,
        )
        .bind(address_id)
        .bind(account_id)
        .bind(&new.name)
        .bind(&new.street)
        .bind(&new.city)
        .bind(&new.state)
        .bind(&new.postal_code)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(address_from_row))
    }

    /// Removes the address under the account. Returns whether a row was
    /// removed.
    pub async fn delete(&self, account_id: i64, address_id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM addresses WHERE id = $1 AND account_id = $2")
            .bind(address_id)
            .bind(account_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
