//! Account persistence gateway
//!
//! CRUD operations for accounts. Multi-record operations (insert with nested
//! addresses, cascade delete) run inside a single transaction so an account
//! and its addresses never go out of step.

use std::collections::HashMap;

use chrono::NaiveDate;
use sqlx::PgPool;

use crate::model::{Account, AccountUpdate, Address, NewAccount};

use super::addresses::{address_from_row, AddressRow};

/// Row tuple for the account column list.
type AccountRow = (i64, String, String, String, NaiveDate);

/// Persistence gateway for accounts.
#[derive(Debug, Clone)]
pub struct AccountStore {
    pool: PgPool,
}

impl AccountStore {
    /// Create a new AccountStore
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Returns all accounts, optionally filtered by exact name, each with
    /// its addresses embedded.
    pub async fn list(&self, name: Option<&str>) -> Result<Vec<Account>, sqlx::Error> {
        let rows: Vec<AccountRow> = if let Some(name) = name {
            sqlx::query_as(
                r#"
                SELECT id, name, email, phone_number, date_joined
                FROM accounts
                WHERE name = $1
                ORDER BY id
                "#,
            )
            .bind(name)
            .fetch_all(&self.pool)
            .await?
        } else {
            sqlx::query_as(
                r#"
                SELECT id, name, email, phone_number, date_joined
                FROM accounts
                ORDER BY id
                "#,
            )
            .fetch_all(&self.pool)
            .await?
        };

        let ids: Vec<i64> = rows.iter().map(|row| row.0).collect();
        let mut addresses = self.addresses_by_account(&ids).await?;

        Ok(rows
            .into_iter()
            .map(|(id, name, email, phone_number, date_joined)| Account {
                id,
                name,
                email,
                phone_number,
                date_joined,
                addresses: addresses.remove(&id).unwrap_or_default(),
            })
            .collect())
    }

    /// Returns the account with its addresses, or None when absent.
    pub async fn find(&self, id: i64) -> Result<Option<Account>, sqlx::Error> {
        let row: Option<AccountRow> = sqlx::query_as(
            r#"
            SELECT id, name, email, phone_number, date_joined
            FROM accounts
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        let (id, name, email, phone_number, date_joined) = match row {
            Some(row) => row,
            None => return Ok(None),
        };

        let mut addresses = self.addresses_by_account(&[id]).await?;

        Ok(Some(Account {
            id,
            name,
            email,
            phone_number,
            date_joined,
            addresses: addresses.remove(&id).unwrap_or_default(),
        }))
    }

    /// Check whether an account exists without loading it.
    pub async fn exists(&self, id: i64) -> Result<bool, sqlx::Error> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM accounts WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;

        Ok(exists)
    }

    /// Inserts a new account (and any nested addresses) in one transaction,
    /// returning the stored record with its assigned id and defaulted
    /// `date_joined`.
    pub async fn insert(&self, new: NewAccount) -> Result<Account, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        let (id, date_joined): (i64, NaiveDate) = sqlx::query_as(
            r#"
            INSERT INTO accounts (name, email, phone_number, date_joined)
            VALUES ($1, $2, $3, COALESCE($4, CURRENT_DATE))
            RETURNING id, date_joined
            "#,
        )
        .bind(&new.name)
        .bind(&new.email)
        .bind(&new.phone_number)
        .bind(new.date_joined)
        .fetch_one(&mut *tx)
        .await?;

        let mut addresses = Vec::with_capacity(new.addresses.len());
        for address in &new.addresses {
            let row: AddressRow = sqlx::query_as(
                r#"
                INSERT INTO addresses (account_id, name, street, city, state, postal_code)
                VALUES ($1, $2, $3, $4, $5, $6)
                RETURNING id, account_id, name, street, city, state, postal_code
                "#,
            )
            .bind(id)
            .bind(&address.name)
            .bind(&address.street)
            .bind(&address.city)
            .bind(&address.state)
            .bind(&address.postal_code)
            .fetch_one(&mut *tx)
            .await?;

            addresses.push(address_from_row(row));
        }

        tx.commit().await?;

        Ok(Account {
            id,
            name: new.name,
            email: new.email,
            phone_number: new.phone_number,
            date_joined,
            addresses,
        })
    }

    /// Full replace of the scalar attributes. Returns the updated record
    /// (addresses untouched), or None when the account does not exist.
    pub async fn replace(
        &self,
        id: i64,
        update: AccountUpdate,
    ) -> Result<Option<Account>, sqlx::Error> {
        let row: Option<AccountRow> = sqlx::query_as(
            r#"
            UPDATE accounts
            SET name = $2, email = $3, phone_number = $4, date_joined = $5
            WHERE id = $1
            RETURNING id, name, email, phone_number, date_joined
            "#,
        )
        .bind(id)
        .bind(&update.name)
        .bind(&update.email)
        .bind(&update.phone_number)
        .bind(update.date_joined)
        .fetch_optional(&self.pool)
        .await?;

        let (id, name, email, phone_number, date_joined) = match row {
            Some(row) => row,
            None => return Ok(None),
        };

        let mut addresses = self.addresses_by_account(&[id]).await?;

        Ok(Some(Account {
            id,
            name,
            email,
            phone_number,
            date_joined,
            addresses: addresses.remove(&id).unwrap_or_default(),
        }))
    }

    /// Removes the account and every address it owns, children first, in one
    /// transaction. Returns whether an account row was removed; deleting an
    /// unknown id is a no-op.
    pub async fn delete(&self, id: i64) -> Result<bool, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM addresses WHERE account_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM accounts WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(result.rows_affected() > 0)
    }

    /// Loads the addresses of the given accounts, grouped by owner and
    /// ordered by id within each group.
    async fn addresses_by_account(
        &self,
        account_ids: &[i64],
    ) -> Result<HashMap<i64, Vec<Address>>, sqlx::Error> {
        if account_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows: Vec<AddressRow> = sqlx::query_as(
            r#"
            SELECT id, account_id, name, street, city, state, postal_code
            FROM addresses
            WHERE account_id = ANY($1)
            ORDER BY id
            "#,
        )
        .bind(account_ids)
        .fetch_all(&self.pool)
        .await?;

        let mut grouped: HashMap<i64, Vec<Address>> = HashMap::new();
        for row in rows {
            grouped.entry(row.1).or_default().push(address_from_row(row));
        }

        Ok(grouped)
    }
}
