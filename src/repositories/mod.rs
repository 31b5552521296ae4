//! # Repository Layer
//!
//! Repository implementations that encapsulate SeaORM operations for the
//! plant records and the credential tables.

pub mod account;
pub mod plant_record;

pub use account::{AccountError, AccountRepository};
pub use plant_record::PlantRecordRepository;
