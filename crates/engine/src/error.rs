//! The module contains the error the engine can throw.
//!
//! The errors are:
//!
//! - [`InvalidInput`] / [`InvalidAmount`] rejected input, never persisted.
//! - [`InvalidCredentials`] login failed, deliberately without saying why.
//! - [`KeyNotFound`] thrown when an item is not found.
//! - [`ExistingKey`] a unique field (email, CRO) is already taken.
//! - [`InUse`] a row is still referenced and cannot be deleted.
//!
//!  [`InvalidInput`]: EngineError::InvalidInput
//!  [`InvalidAmount`]: EngineError::InvalidAmount
//!  [`InvalidCredentials`]: EngineError::InvalidCredentials
//!  [`KeyNotFound`]: EngineError::KeyNotFound
//!  [`ExistingKey`]: EngineError::ExistingKey
//!  [`InUse`]: EngineError::InUse
use sea_orm::{DbErr, SqlErr};
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("{0} not found")]
    KeyNotFound(String),
    #[error("{0} already registered")]
    ExistingKey(String),
    #[error("{0} is still referenced")]
    InUse(String),
    #[error("Invalid token: {0}")]
    Token(String),
    #[error("Internal error: {0}")]
    Internal(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl EngineError {
    /// Classifies store constraint violations; `what` names the record.
    pub(crate) fn from_db(err: DbErr, what: &str) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => Self::ExistingKey(what.to_string()),
            Some(SqlErr::ForeignKeyConstraintViolation(_)) => Self::InUse(what.to_string()),
            _ => Self::Database(err),
        }
    }
}

impl From<api_types::ParseMoneyError> for EngineError {
    fn from(value: api_types::ParseMoneyError) -> Self {
        Self::InvalidAmount(value.to_string())
    }
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::InvalidInput(a), Self::InvalidInput(b)) => a == b,
            (Self::InvalidAmount(a), Self::InvalidAmount(b)) => a == b,
            (Self::InvalidCredentials, Self::InvalidCredentials) => true,
            (Self::Forbidden(a), Self::Forbidden(b)) => a == b,
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::ExistingKey(a), Self::ExistingKey(b)) => a == b,
            (Self::InUse(a), Self::InUse(b)) => a == b,
            (Self::Token(a), Self::Token(b)) => a == b,
            (Self::Internal(a), Self::Internal(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
