//! Account Service Library
//!
//! Re-exports modules for integration testing and external use.

pub mod api;
pub mod model;
pub mod store;
pub mod validation;

// Modules used mainly by the binaries
pub mod config;
pub mod db;
mod error;

pub use config::Config;
pub use error::{AppError, AppResult};
pub use model::{Account, Address};
