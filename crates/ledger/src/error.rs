//! The module contains the errors the ledger can throw.
//!
//! The errors are:
//!
//! - [`NotFound`] thrown when a user has no expense with the requested id.
//! - [`Storage`] thrown when the expense table cannot be reached or an
//!   item cannot be converted.
//!
//!  [`NotFound`]: LedgerError::NotFound
//!  [`Storage`]: LedgerError::Storage
use thiserror::Error;

/// Ledger custom errors.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum LedgerError {
    #[error("no expense found with id {0}")]
    NotFound(u32),
    #[error("expense store failure: {0}")]
    Storage(String),
}
