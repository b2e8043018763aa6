use crate::error::SyncError;
use schema::Row;
use serde_json::Value;

/// Relative tolerance for numbers the spreadsheet stored as doubles.
const NUMBER_TOLERANCE: f64 = 1e-9;

/// Compares the rows written to the spreadsheet with the rows read back from it.
///
/// Values written as user input may come back converted, so numbers are accepted
/// either as JSON numbers or as numeric text.
#[derive(Default)]
pub struct RowVerifier;

impl RowVerifier {
    pub fn verify(&self, written: &[Row], read: &[Row]) -> Result<(), SyncError> {
        if written.len() != read.len() {
            return Err(SyncError::RowCountMismatch {
                written: written.len(),
                read: read.len(),
            });
        }
        for (row, (expected_row, actual_row)) in written.iter().zip(read).enumerate() {
            for (column, expected) in expected_row.iter().enumerate() {
                if !cell_matches(expected, actual_row.get(column)) {
                    return Err(SyncError::CellMismatch { row, column });
                }
            }
        }
        Ok(())
    }
}

fn cell_matches(expected: &Value, actual: Option<&Value>) -> bool {
    let Some(actual) = actual else {
        return false;
    };
    match expected {
        Value::Number(number) => match (number.as_f64(), as_number(actual)) {
            (Some(expected), Some(actual)) => numbers_match(expected, actual),
            _ => false,
        },
        Value::String(text) => actual.as_str() == Some(text.as_str()),
        other => other == actual,
    }
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

fn numbers_match(expected: f64, actual: f64) -> bool {
    (expected - actual).abs() <= NUMBER_TOLERANCE * expected.abs().max(1.0)
}
