//! The module contains the error the engine can throw.
//!
//! The errors are grouped the way callers react to them:
//!
//! - [`Validation`] and [`InvalidAmount`] are raised before any store call.
//! - [`KeyNotFound`] when a wallet or a transaction is missing.
//! - [`InconsistentState`] when persisted data breaks an invariant (e.g. a
//!   transfer with a single leg).
//! - [`Store`] and [`Database`] when the persistence collaborator fails.
//!
//!  [`Validation`]: EngineError::Validation
//!  [`InvalidAmount`]: EngineError::InvalidAmount
//!  [`KeyNotFound`]: EngineError::KeyNotFound
//!  [`InconsistentState`]: EngineError::InconsistentState
//!  [`Store`]: EngineError::Store
//!  [`Database`]: EngineError::Database
use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("\"{0}\" key not found!")]
    KeyNotFound(String),
    #[error("\"{0}\" already present!")]
    ExistingKey(String),
    #[error("Insufficient funds: {0}")]
    InsufficientFunds(String),
    #[error("Inconsistent state: {0}")]
    InconsistentState(String),
    #[error("Wallet \"{0}\" is still referenced by transactions")]
    WalletInUse(String),
    #[error("Store failure: {0}")]
    Store(String),
    #[error("Background task failed: {0}")]
    Task(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Validation(a), Self::Validation(b)) => a == b,
            (Self::InvalidAmount(a), Self::InvalidAmount(b)) => a == b,
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::ExistingKey(a), Self::ExistingKey(b)) => a == b,
            (Self::InsufficientFunds(a), Self::InsufficientFunds(b)) => a == b,
            (Self::InconsistentState(a), Self::InconsistentState(b)) => a == b,
            (Self::WalletInUse(a), Self::WalletInUse(b)) => a == b,
            (Self::Store(a), Self::Store(b)) => a == b,
            (Self::Task(a), Self::Task(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
