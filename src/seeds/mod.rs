//! Database seeding functionality
//!
//! Populates the credential tables with the bootstrap accounts from
//! configuration when the application starts.

pub mod accounts;

pub use accounts::{SeedReport, seed_accounts};
