//! Address entity
//!
//! A mailing address owned by exactly one account.

use serde::Serialize;

/// An address as stored.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Address {
    /// Store-assigned identifier, globally scoped (not per account).
    pub id: i64,
    /// Owning account; immutable after creation.
    pub account_id: i64,
    /// Label such as "home" or "work".
    pub name: String,
    pub street: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
}

/// A validated address record for insertion or full replacement.
///
/// Carries no `account_id`: the owning account always comes from the
/// request path (or the enclosing account on nested create).
#[derive(Debug, Clone)]
pub struct NewAddress {
    pub name: String,
    pub street: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
}
