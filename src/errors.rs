//! Unified error type for the back-office core.
//!
//! Every failure is scoped to a single request. [`Error::kind`] sorts the variants into the
//! classes a caller needs to tell apart: missing records, rejected input, and everything else.

use thiserror::Error;

/// Coarse classification used by callers to map an [`Error`] onto a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A referenced record does not exist.
    NotFound,
    /// The request was understood but rejected.
    Validation,
    /// Storage, configuration, or environment failure.
    Internal,
}

/// Errors produced by the billing core.
#[derive(Debug, Error)]
pub enum Error {
    /// Underlying database failure
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// Configuration file or value problem
    #[error("Configuration error: {message}")]
    Config {
        /// Human-readable description
        message: String,
    },

    /// I/O failure reading an existing config.toml
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Case (customer) does not exist
    #[error("Case not found: {id}")]
    CustomerNotFound {
        /// Requested case id
        id: String,
    },

    /// Estimate does not exist
    #[error("Estimate not found: {id}")]
    EstimateNotFound {
        /// Requested estimate id
        id: String,
    },

    /// Invoice does not exist
    #[error("Invoice not found: {id}")]
    InvoiceNotFound {
        /// Requested invoice id
        id: String,
    },

    /// Flower order does not exist
    #[error("Flower not found: {id}")]
    FlowerNotFound {
        /// Requested flower id
        id: String,
    },

    /// Flower billing target does not exist
    #[error("Flower billing target not found: {id}")]
    BillingTargetNotFound {
        /// Requested target id
        id: String,
    },

    /// Estimate belongs to a different case than the one named in the request
    #[error("Case ID mismatch: estimate {estimate_id} belongs to case {actual}, not {expected}")]
    CaseMismatch {
        /// Estimate being converted
        estimate_id: String,
        /// Case id supplied by the caller
        expected: String,
        /// Case id stored on the estimate
        actual: String,
    },

    /// Cancellation requested but the latest ledger row is not PAID
    #[error("No paid record found for {target}")]
    NoPaidRecord {
        /// Payment target description (e.g. `invoice 12`)
        target: String,
    },

    /// A computed amount does not fit in an `i64`
    #[error("Amount out of range: {what}")]
    AmountOutOfRange {
        /// Which figure overflowed (e.g. `subtotal`)
        what: String,
    },

    /// Identifier string could not be parsed
    #[error("Invalid identifier: {value}")]
    InvalidId {
        /// Offending input
        value: String,
    },
}

impl Error {
    /// Returns the coarse class of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::CustomerNotFound { .. }
            | Self::EstimateNotFound { .. }
            | Self::InvoiceNotFound { .. }
            | Self::FlowerNotFound { .. }
            | Self::BillingTargetNotFound { .. } => ErrorKind::NotFound,
            Self::CaseMismatch { .. }
            | Self::NoPaidRecord { .. }
            | Self::AmountOutOfRange { .. }
            | Self::InvalidId { .. } => ErrorKind::Validation,
            Self::Database(_) | Self::Config { .. } | Self::Io(_) => ErrorKind::Internal,
        }
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
