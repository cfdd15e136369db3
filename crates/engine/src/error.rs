//! The module contains the errors the engine can return.
//!
//! Data-quality problems never reach the calculators: rows that fail to
//! decode are dropped by the fetch layer. The variants below are returned
//! by decoding ([`InvalidDate`], [`InvalidRecord`], ...) or by the report
//! entry points ([`MissingUser`], [`Database`]).
//!
//!  [`InvalidDate`]: EngineError::InvalidDate
//!  [`InvalidRecord`]: EngineError::InvalidRecord
//!  [`MissingUser`]: EngineError::MissingUser
//!  [`Database`]: EngineError::Database
use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid id: {0}")]
    InvalidId(String),
    #[error("Invalid date: {0}")]
    InvalidDate(String),
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Invalid kind: {0}")]
    InvalidKind(String),
    #[error("Invalid record: {0}")]
    InvalidRecord(String),
    #[error("A user id is required: {0}")]
    MissingUser(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::InvalidId(a), Self::InvalidId(b)) => a == b,
            (Self::InvalidDate(a), Self::InvalidDate(b)) => a == b,
            (Self::InvalidAmount(a), Self::InvalidAmount(b)) => a == b,
            (Self::InvalidKind(a), Self::InvalidKind(b)) => a == b,
            (Self::InvalidRecord(a), Self::InvalidRecord(b)) => a == b,
            (Self::MissingUser(a), Self::MissingUser(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
