//! Plant record entity model
//!
//! This module contains the SeaORM entity model for the plants table,
//! one row per monthly submission from a plant operator.

use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;

/// A monthly production report submitted by a plant operator
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "plants")]
pub struct Model {
    /// Server-assigned identifier; never changes once assigned
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Operator identity or free text
    pub plant_name: Option<String>,

    /// Reporting period label (e.g. "2025-11" or "November")
    pub month: Option<String>,

    pub run_time: Option<String>,

    pub fb: Option<String>,

    pub total_production: Option<f64>,

    pub total_gas: Option<f64>,

    pub total_sale: Option<f64>,

    pub kwh: Option<f64>,

    /// Narrative of production breakdowns during the period
    #[sea_orm(column_type = "Text", nullable)]
    pub prod_breakdown: Option<String>,

    /// Narrative of maintenance breakdowns during the period
    #[sea_orm(column_type = "Text", nullable)]
    pub maint_breakdown: Option<String>,

    pub total_load: Option<f64>,

    pub dg: Option<String>,

    pub diesel: Option<f64>,

    pub electricity_bill: Option<f64>,

    /// Timestamp assigned at insert; edits never touch it
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
