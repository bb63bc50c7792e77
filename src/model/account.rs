//! Account entity
//!
//! A customer account owning zero or more addresses.

use chrono::NaiveDate;
use serde::Serialize;

use super::address::{Address, NewAddress};

/// An account as stored, with its owned addresses embedded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Account {
    /// Store-assigned identifier, immutable once created.
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone_number: String,
    /// Day the account joined, ISO `YYYY-MM-DD` on the wire.
    pub date_joined: NaiveDate,
    /// Owned addresses in insertion order (ascending id).
    pub addresses: Vec<Address>,
}

/// A validated account record ready for insertion.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub name: String,
    pub email: String,
    pub phone_number: String,
    /// Defaults to the current date when absent.
    pub date_joined: Option<NaiveDate>,
    /// Addresses to create together with the account.
    pub addresses: Vec<NewAddress>,
}

/// A validated full replacement of an account's scalar attributes.
///
/// `id` and the address collection are not part of an update; addresses are
/// managed through their own endpoints.
#[derive(Debug, Clone)]
pub struct AccountUpdate {
    pub name: String,
    pub email: String,
    pub phone_number: String,
    pub date_joined: NaiveDate,
}
