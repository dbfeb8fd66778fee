//! The module contains the error the engine can throw.
//!
//! The errors are:
//!
//! - [`KeyNotFound`] thrown when an item (user, ride) is not found.
//! - [`InvalidKm`] thrown when an odometer value violates a ride invariant.
//!
//!  [`KeyNotFound`]: EngineError::KeyNotFound
//!  [`InvalidKm`]: EngineError::InvalidKm
use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("\"{0}\" not found!")]
    KeyNotFound(String),
    #[error("\"{0}\" already present!")]
    ExistingKey(String),
    #[error("Invalid km: {0}")]
    InvalidKm(String),
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Invalid wear rate: {0}")]
    InvalidRate(String),
    #[error("Ride closed: {0}")]
    RideClosed(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::ExistingKey(a), Self::ExistingKey(b)) => a == b,
            (Self::InvalidKm(a), Self::InvalidKm(b)) => a == b,
            (Self::InvalidAmount(a), Self::InvalidAmount(b)) => a == b,
            (Self::InvalidRate(a), Self::InvalidRate(b)) => a == b,
            (Self::RideClosed(a), Self::RideClosed(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
