// src/infra/errors.rs — Error types for callmeter

use thiserror::Error;

#[derive(Error, Debug)]
pub enum MeterError {
    // Precondition failures (surfaced to the caller as-is)
    #[error("Insufficient funds: balance {balance:.2} does not cover {required:.2}")]
    InsufficientFunds { balance: f64, required: f64 },

    #[error("Coin package '{id}' not found")]
    PackageNotFound { id: String },

    #[error("Invalid price per minute: {rate}")]
    InvalidRate { rate: f64 },

    #[error("Session '{session_id}' has already ended")]
    SessionAlreadyEnded { session_id: String },

    // Infra
    #[error("Wallet task is no longer running")]
    WalletClosed,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl MeterError {
    /// True for errors caused by the caller's input rather than the runtime.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            MeterError::InsufficientFunds { .. }
                | MeterError::PackageNotFound { .. }
                | MeterError::InvalidRate { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, MeterError>;
