//! Spreadsheet export of all plant records.
//!
//! The workbook holds a single sheet: a header row of column names in
//! schema order followed by one row per record. NULL values become blank
//! cells.

use rust_xlsxwriter::{Format, Workbook, XlsxError};
use thiserror::Error;

use crate::models::plant_record;
use crate::normalization::{CellValue, RecordColumn, cell};

/// Download name of the exported workbook.
pub const EXPORT_FILENAME: &str = "plant_data.xlsx";

/// MIME type of an OOXML workbook.
pub const XLSX_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

const SHEET_NAME: &str = "Plant Data";

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to write workbook: {0}")]
    Workbook(#[from] XlsxError),
    #[error("too many records for one sheet: {0}")]
    TooManyRows(usize),
}

/// The sheet contents as plain cells: header row first, then one row per record.
pub fn export_rows(records: &[plant_record::Model]) -> Vec<Vec<CellValue>> {
    let header = RecordColumn::ALL
        .iter()
        .map(|column| CellValue::Text(column.as_str().to_string()))
        .collect();

    std::iter::once(header)
        .chain(records.iter().map(|record| {
            RecordColumn::ALL
                .iter()
                .map(|column| cell(record, *column))
                .collect()
        }))
        .collect()
}

/// Serialize records into an `.xlsx` workbook held in memory.
pub fn export_workbook(records: &[plant_record::Model]) -> Result<Vec<u8>, ExportError> {
    let rows = export_rows(records);
    let header_format = Format::new().set_bold();

    let mut workbook = Workbook::new();
    {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(SHEET_NAME)?;

        for (row_idx, row) in rows.iter().enumerate() {
            let row_num =
                u32::try_from(row_idx).map_err(|_| ExportError::TooManyRows(records.len()))?;

            for (col_idx, value) in row.iter().enumerate() {
                // Column count is fixed by the schema.
                let col_num = col_idx as u16;
                match value {
                    CellValue::Text(text) if row_num == 0 => {
                        worksheet.write_string_with_format(row_num, col_num, text, &header_format)?;
                    }
                    CellValue::Text(text) => {
                        worksheet.write_string(row_num, col_num, text)?;
                    }
                    CellValue::Integer(number) => {
                        worksheet.write_number(row_num, col_num, *number as f64)?;
                    }
                    CellValue::Number(number) => {
                        worksheet.write_number(row_num, col_num, *number)?;
                    }
                    CellValue::Empty => {}
                }
            }
        }

        worksheet.set_freeze_panes(1, 0)?;
    }

    let bytes = workbook.save_to_buffer()?;
    tracing::debug!(
        records = records.len(),
        bytes = bytes.len(),
        "Built spreadsheet export"
    );
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, TimeZone};

    fn record(id: i32, plant_name: &str, kwh: Option<f64>) -> plant_record::Model {
        plant_record::Model {
            id,
            plant_name: Some(plant_name.to_string()),
            month: Some("2025-11".to_string()),
            run_time: Some("720h".to_string()),
            fb: None,
            total_production: Some(1200.5),
            total_gas: None,
            total_sale: None,
            kwh,
            prod_breakdown: Some("none".to_string()),
            maint_breakdown: None,
            total_load: None,
            dg: None,
            diesel: None,
            electricity_bill: Some(99.0),
            created_at: FixedOffset::east_opt(0)
                .unwrap()
                .with_ymd_and_hms(2025, 11, 30, 8, 15, 0)
                .unwrap(),
        }
    }

    #[test]
    fn header_follows_schema_order() {
        let rows = export_rows(&[]);
        assert_eq!(rows.len(), 1);

        let header: Vec<String> = rows[0].iter().map(CellValue::display).collect();
        assert_eq!(header.first().map(String::as_str), Some("id"));
        assert_eq!(header.last().map(String::as_str), Some("created_at"));
        assert_eq!(header.len(), 16);
        assert_eq!(header[8], "kwh");
    }

    #[test]
    fn one_row_per_record_with_blank_nulls() {
        let records = vec![record(1, "plant1", Some(350.0)), record(2, "plant2", None)];
        let rows = export_rows(&records);

        assert_eq!(rows.len(), records.len() + 1);
        assert_eq!(rows[1][0], CellValue::Integer(1));
        assert_eq!(rows[1][8], CellValue::Number(350.0));
        assert_eq!(rows[2][8], CellValue::Empty);
        assert_eq!(rows[2][15].display(), "2025-11-30 08:15:00");
    }

    #[test]
    fn workbook_is_a_zip_container() {
        let bytes = export_workbook(&[record(1, "plant1", Some(1.0))]).unwrap();
        assert!(bytes.starts_with(b"PK"));
    }
}
