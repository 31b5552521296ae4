//! Plant user entity model
//!
//! Credentials for plant operators, keyed by plant name.

use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "plant_users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Login identity of the operator (unique)
    #[sea_orm(unique)]
    pub plant_name: String,

    /// Argon2id PHC string
    pub password_hash: String,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
