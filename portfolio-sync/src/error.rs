use crate::account_selector::AccountSelector;
use thiserror::Error;

/// Conditions under which a sync refuses to touch the spreadsheet or reports a bad result.
#[derive(Debug, Error, PartialEq)]
pub enum SyncError {
    #[error("No brokerage account is linked to this user")]
    NoAccounts,

    #[error("No linked account matches {0}")]
    AccountNotFound(AccountSelector),

    #[error("Position #{index} is malformed: missing {field}")]
    MalformedPosition { index: usize, field: &'static str },

    #[error("Wrote {written} rows but read back {read}")]
    RowCountMismatch { written: usize, read: usize },

    #[error("Cell {column} of row #{row} differs from what was written")]
    CellMismatch { row: usize, column: usize },
}
