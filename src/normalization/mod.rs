//! Record column registry and form normalization.
//!
//! [`RecordColumn`] is the single source of truth for the column order of the
//! `plants` table; the listing, the edit form and the spreadsheet export all
//! walk it. [`PlantRecordForm`] captures raw form input and
//! [`PlantRecordForm::normalize`] turns it into typed [`PlantRecordFields`].

use std::fmt;

use serde::Deserialize;
use thiserror::Error;

use crate::models::plant_record;

/// Columns of the `plants` table, in schema order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordColumn {
    Id,
    PlantName,
    Month,
    RunTime,
    Fb,
    TotalProduction,
    TotalGas,
    TotalSale,
    Kwh,
    ProdBreakdown,
    MaintBreakdown,
    TotalLoad,
    Dg,
    Diesel,
    ElectricityBill,
    CreatedAt,
}

impl RecordColumn {
    /// Every column in schema order.
    pub const ALL: [RecordColumn; 16] = [
        RecordColumn::Id,
        RecordColumn::PlantName,
        RecordColumn::Month,
        RecordColumn::RunTime,
        RecordColumn::Fb,
        RecordColumn::TotalProduction,
        RecordColumn::TotalGas,
        RecordColumn::TotalSale,
        RecordColumn::Kwh,
        RecordColumn::ProdBreakdown,
        RecordColumn::MaintBreakdown,
        RecordColumn::TotalLoad,
        RecordColumn::Dg,
        RecordColumn::Diesel,
        RecordColumn::ElectricityBill,
        RecordColumn::CreatedAt,
    ];

    /// Columns an operator or administrator may set through a form.
    pub const EDITABLE: [RecordColumn; 14] = [
        RecordColumn::PlantName,
        RecordColumn::Month,
        RecordColumn::RunTime,
        RecordColumn::Fb,
        RecordColumn::TotalProduction,
        RecordColumn::TotalGas,
        RecordColumn::TotalSale,
        RecordColumn::Kwh,
        RecordColumn::ProdBreakdown,
        RecordColumn::MaintBreakdown,
        RecordColumn::TotalLoad,
        RecordColumn::Dg,
        RecordColumn::Diesel,
        RecordColumn::ElectricityBill,
    ];

    /// Column (and form field) name.
    pub const fn as_str(self) -> &'static str {
        match self {
            RecordColumn::Id => "id",
            RecordColumn::PlantName => "plant_name",
            RecordColumn::Month => "month",
            RecordColumn::RunTime => "run_time",
            RecordColumn::Fb => "fb",
            RecordColumn::TotalProduction => "total_production",
            RecordColumn::TotalGas => "total_gas",
            RecordColumn::TotalSale => "total_sale",
            RecordColumn::Kwh => "kwh",
            RecordColumn::ProdBreakdown => "prod_breakdown",
            RecordColumn::MaintBreakdown => "maint_breakdown",
            RecordColumn::TotalLoad => "total_load",
            RecordColumn::Dg => "dg",
            RecordColumn::Diesel => "diesel",
            RecordColumn::ElectricityBill => "electricity_bill",
            RecordColumn::CreatedAt => "created_at",
        }
    }

    /// Human-facing label used on forms and in the admin table.
    pub const fn label(self) -> &'static str {
        match self {
            RecordColumn::Id => "ID",
            RecordColumn::PlantName => "Plant Name",
            RecordColumn::Month => "Month",
            RecordColumn::RunTime => "Run Time",
            RecordColumn::Fb => "FB",
            RecordColumn::TotalProduction => "Total Production",
            RecordColumn::TotalGas => "Total Gas",
            RecordColumn::TotalSale => "Total Sale",
            RecordColumn::Kwh => "kWh",
            RecordColumn::ProdBreakdown => "Production Breakdown",
            RecordColumn::MaintBreakdown => "Maintenance Breakdown",
            RecordColumn::TotalLoad => "Total Load",
            RecordColumn::Dg => "DG",
            RecordColumn::Diesel => "Diesel",
            RecordColumn::ElectricityBill => "Electricity Bill",
            RecordColumn::CreatedAt => "Created At",
        }
    }

    /// True for the nullable decimal metrics.
    pub const fn is_numeric(self) -> bool {
        matches!(
            self,
            RecordColumn::TotalProduction
                | RecordColumn::TotalGas
                | RecordColumn::TotalSale
                | RecordColumn::Kwh
                | RecordColumn::TotalLoad
                | RecordColumn::Diesel
                | RecordColumn::ElectricityBill
        )
    }

    /// True for free-form narrative columns rendered as text areas.
    pub const fn is_narrative(self) -> bool {
        matches!(
            self,
            RecordColumn::ProdBreakdown | RecordColumn::MaintBreakdown
        )
    }
}

impl fmt::Display for RecordColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single cell value read from a stored record.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Integer(i64),
    Number(f64),
    Text(String),
    Empty,
}

impl CellValue {
    fn text(value: &Option<String>) -> Self {
        value.clone().map(CellValue::Text).unwrap_or(CellValue::Empty)
    }

    fn number(value: Option<f64>) -> Self {
        value.map(CellValue::Number).unwrap_or(CellValue::Empty)
    }

    /// Plain-text rendering; empty cells render as an empty string.
    pub fn display(&self) -> String {
        match self {
            CellValue::Integer(value) => value.to_string(),
            CellValue::Number(value) => value.to_string(),
            CellValue::Text(value) => value.clone(),
            CellValue::Empty => String::new(),
        }
    }
}

/// Read one column from a stored record.
pub fn cell(record: &plant_record::Model, column: RecordColumn) -> CellValue {
    match column {
        RecordColumn::Id => CellValue::Integer(i64::from(record.id)),
        RecordColumn::PlantName => CellValue::text(&record.plant_name),
        RecordColumn::Month => CellValue::text(&record.month),
        RecordColumn::RunTime => CellValue::text(&record.run_time),
        RecordColumn::Fb => CellValue::text(&record.fb),
        RecordColumn::TotalProduction => CellValue::number(record.total_production),
        RecordColumn::TotalGas => CellValue::number(record.total_gas),
        RecordColumn::TotalSale => CellValue::number(record.total_sale),
        RecordColumn::Kwh => CellValue::number(record.kwh),
        RecordColumn::ProdBreakdown => CellValue::text(&record.prod_breakdown),
        RecordColumn::MaintBreakdown => CellValue::text(&record.maint_breakdown),
        RecordColumn::TotalLoad => CellValue::number(record.total_load),
        RecordColumn::Dg => CellValue::text(&record.dg),
        RecordColumn::Diesel => CellValue::number(record.diesel),
        RecordColumn::ElectricityBill => CellValue::number(record.electricity_bill),
        RecordColumn::CreatedAt => {
            CellValue::Text(record.created_at.format("%Y-%m-%d %H:%M:%S").to_string())
        }
    }
}

/// Errors raised while normalizing submitted form input.
#[derive(Debug, Error, PartialEq)]
pub enum FormError {
    #[error("field '{field}' must be a number, got '{value}'")]
    InvalidNumber { field: &'static str, value: String },
}

/// Raw record form as submitted by the browser. Absent fields stay `None`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlantRecordForm {
    #[serde(default)]
    pub plant_name: Option<String>,
    #[serde(default)]
    pub month: Option<String>,
    #[serde(default)]
    pub run_time: Option<String>,
    #[serde(default)]
    pub fb: Option<String>,
    #[serde(default)]
    pub total_production: Option<String>,
    #[serde(default)]
    pub total_gas: Option<String>,
    #[serde(default)]
    pub total_sale: Option<String>,
    #[serde(default)]
    pub kwh: Option<String>,
    #[serde(default)]
    pub prod_breakdown: Option<String>,
    #[serde(default)]
    pub maint_breakdown: Option<String>,
    #[serde(default)]
    pub total_load: Option<String>,
    #[serde(default)]
    pub dg: Option<String>,
    #[serde(default)]
    pub diesel: Option<String>,
    #[serde(default)]
    pub electricity_bill: Option<String>,
}

/// Typed, normalized values for every editable column.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlantRecordFields {
    pub plant_name: Option<String>,
    pub month: Option<String>,
    pub run_time: Option<String>,
    pub fb: Option<String>,
    pub total_production: Option<f64>,
    pub total_gas: Option<f64>,
    pub total_sale: Option<f64>,
    pub kwh: Option<f64>,
    pub prod_breakdown: Option<String>,
    pub maint_breakdown: Option<String>,
    pub total_load: Option<f64>,
    pub dg: Option<String>,
    pub diesel: Option<f64>,
    pub electricity_bill: Option<f64>,
}

impl PlantRecordForm {
    /// Coerce blank numeric inputs to `None` and parse the rest. Text inputs
    /// are stored as submitted.
    pub fn normalize(self) -> Result<PlantRecordFields, FormError> {
        Ok(PlantRecordFields {
            plant_name: self.plant_name,
            month: self.month,
            run_time: self.run_time,
            fb: self.fb,
            total_production: parse_decimal(RecordColumn::TotalProduction, self.total_production)?,
            total_gas: parse_decimal(RecordColumn::TotalGas, self.total_gas)?,
            total_sale: parse_decimal(RecordColumn::TotalSale, self.total_sale)?,
            kwh: parse_decimal(RecordColumn::Kwh, self.kwh)?,
            prod_breakdown: self.prod_breakdown,
            maint_breakdown: self.maint_breakdown,
            total_load: parse_decimal(RecordColumn::TotalLoad, self.total_load)?,
            dg: self.dg,
            diesel: parse_decimal(RecordColumn::Diesel, self.diesel)?,
            electricity_bill: parse_decimal(RecordColumn::ElectricityBill, self.electricity_bill)?,
        })
    }
}

/// Parse one numeric input. Blank means NULL; anything else must be a finite number.
pub fn parse_decimal(column: RecordColumn, raw: Option<String>) -> Result<Option<f64>, FormError> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    match trimmed.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(Some(value)),
        _ => Err(FormError::InvalidNumber {
            field: column.as_str(),
            value: raw,
        }),
    }
}
