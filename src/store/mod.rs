//! Persistence gateways
//!
//! Store structs wrap the connection pool and expose the CRUD contract the
//! resource handlers consume: find, list, insert, replace, delete. All SQL
//! lives here.

mod accounts;
mod addresses;

pub use accounts::AccountStore;
pub use addresses::AddressStore;
