//! Spreadsheet exports of the clinic data.
//!
//! Both entry points are pure: they take already loaded rows and return the
//! bytes of an `.xlsx` file. Aggregates live in [`BudgetSummary`] so they can
//! be checked without opening a workbook.

use std::io::Cursor;

use chrono::{DateTime, Utc};
use engine::{Budget, PatientOverview};
use thiserror::Error;
use umya_spreadsheet::Spreadsheet;

pub use summary::{BudgetSummary, GroupTotals, NOT_INFORMED, StatusTotals, Total};

mod budgets;
mod patients;
mod style;
mod summary;

/// MIME type of the produced files.
pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("workbook error: {0}")]
    Workbook(String),
}

/// Workbook with the `Capa`, `Orcamentos` and `Dashboard` sheets.
pub fn budgets_workbook(
    budgets: &[Budget],
    generated_at: DateTime<Utc>,
) -> Result<Vec<u8>, ReportError> {
    let mut book = umya_spreadsheet::new_file_empty_worksheet();
    budgets::build(&mut book, budgets, generated_at)?;
    tracing::debug!(budgets = budgets.len(), "budgets workbook built");
    write(&book)
}

/// Workbook with one `Pacientes` sheet.
pub fn patients_workbook(patients: &[PatientOverview]) -> Result<Vec<u8>, ReportError> {
    let mut book = umya_spreadsheet::new_file_empty_worksheet();
    patients::build(&mut book, patients)?;
    tracing::debug!(patients = patients.len(), "patients workbook built");
    write(&book)
}

/// `clinica-relatorio-<millis>.xlsx`
pub fn budgets_file_name(at: DateTime<Utc>) -> String {
    format!("clinica-relatorio-{}.xlsx", at.timestamp_millis())
}

/// `pacientes-<millis>.xlsx`
pub fn patients_file_name(at: DateTime<Utc>) -> String {
    format!("pacientes-{}.xlsx", at.timestamp_millis())
}

fn write(book: &Spreadsheet) -> Result<Vec<u8>, ReportError> {
    let mut cursor = Cursor::new(Vec::new());
    umya_spreadsheet::writer::xlsx::write_writer(book, &mut cursor)
        .map_err(|err| ReportError::Workbook(err.to_string()))?;
    Ok(cursor.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_names_carry_the_timestamp() {
        let at = DateTime::from_timestamp_millis(1_700_000_000_123).unwrap();
        assert_eq!(budgets_file_name(at), "clinica-relatorio-1700000000123.xlsx");
        assert_eq!(patients_file_name(at), "pacientes-1700000000123.xlsx");
    }
}
