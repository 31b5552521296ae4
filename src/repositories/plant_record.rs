//! # Plant Record Repository
//!
//! CRUD over the `plants` table. The record id and `created_at` are assigned
//! at insert and never rewritten; updates overwrite the editable fields only.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait, QueryOrder, Set,
};

use crate::models::plant_record::{
    ActiveModel as PlantRecordActiveModel, Column, Entity as PlantRecord, Model as PlantRecordModel,
};
use crate::normalization::PlantRecordFields;

/// Repository for plant record database operations
pub struct PlantRecordRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> PlantRecordRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Insert a new record stamped with the current time, returning its id.
    pub async fn insert(&self, fields: PlantRecordFields) -> Result<i32, DbErr> {
        let mut record = PlantRecordActiveModel {
            created_at: Set(Utc::now().into()),
            ..Default::default()
        };
        apply_fields(&mut record, fields);

        let created = record.insert(self.db).await?;
        tracing::debug!(record_id = created.id, "Inserted plant record");
        Ok(created.id)
    }

    /// Every record, newest submission first.
    pub async fn list_all(&self) -> Result<Vec<PlantRecordModel>, DbErr> {
        PlantRecord::find()
            .order_by_desc(Column::CreatedAt)
            .order_by_desc(Column::Id)
            .all(self.db)
            .await
    }

    /// Every record in insertion order, for spreadsheet export.
    pub async fn list_for_export(&self) -> Result<Vec<PlantRecordModel>, DbErr> {
        PlantRecord::find()
            .order_by_asc(Column::Id)
            .all(self.db)
            .await
    }

    pub async fn get(&self, id: i32) -> Result<Option<PlantRecordModel>, DbErr> {
        PlantRecord::find_by_id(id).one(self.db).await
    }

    /// Overwrite the editable fields of a record. Returns `None` if no record has this id.
    pub async fn update(
        &self,
        id: i32,
        fields: PlantRecordFields,
    ) -> Result<Option<PlantRecordModel>, DbErr> {
        let Some(existing) = self.get(id).await? else {
            return Ok(None);
        };

        let mut record: PlantRecordActiveModel = existing.into();
        apply_fields(&mut record, fields);
        let updated = record.update(self.db).await?;

        tracing::debug!(record_id = id, "Updated plant record");
        Ok(Some(updated))
    }

    /// Remove a record. Returns `false` if no record has this id.
    pub async fn delete(&self, id: i32) -> Result<bool, DbErr> {
        let result = PlantRecord::delete_by_id(id).exec(self.db).await?;
        Ok(result.rows_affected > 0)
    }

    pub async fn count(&self) -> Result<u64, DbErr> {
        PlantRecord::find().count(self.db).await
    }
}

fn apply_fields(record: &mut PlantRecordActiveModel, fields: PlantRecordFields) {
    record.plant_name = Set(fields.plant_name);
    record.month = Set(fields.month);
    record.run_time = Set(fields.run_time);
    record.fb = Set(fields.fb);
    record.total_production = Set(fields.total_production);
    record.total_gas = Set(fields.total_gas);
    record.total_sale = Set(fields.total_sale);
    record.kwh = Set(fields.kwh);
    record.prod_breakdown = Set(fields.prod_breakdown);
    record.maint_breakdown = Set(fields.maint_breakdown);
    record.total_load = Set(fields.total_load);
    record.dg = Set(fields.dg);
    record.diesel = Set(fields.diesel);
    record.electricity_bill = Set(fields.electricity_bill);
}
