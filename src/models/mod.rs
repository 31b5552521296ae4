//! # Data Models
//!
//! This module contains the SeaORM entities used by the plant data service.

pub mod admin_user;
pub mod plant_record;
pub mod plant_user;

pub use admin_user::Entity as AdminUser;
pub use plant_record::Entity as PlantRecord;
pub use plant_user::Entity as PlantUser;
