//! Entity models
//!
//! The resources exposed by the service: Accounts and the Addresses they own.

mod account;
mod address;

pub use account::{Account, AccountUpdate, NewAccount};
pub use address::{Address, NewAddress};
