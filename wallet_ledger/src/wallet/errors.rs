//! Wallet error types.

use thiserror::Error;

use crate::db::StoreError;

/// Wallet errors
#[derive(Debug, Error)]
pub enum WalletError {
    /// Wallet not found
    #[error("Wallet not found: {0}")]
    WalletNotFound(String),

    /// Withdrawal larger than the current balance
    #[error("Insufficient balance: available {available}, required {required}")]
    InsufficientBalance { available: i64, required: i64 },

    /// Row lock held by a concurrent attempt
    #[error("Resource busy, try again!")]
    ConcurrencyConflict,

    /// Invalid amount (must not be negative)
    #[error("Invalid amount: {0}")]
    InvalidAmount(i64),

    /// Unrecognized operation kind
    #[error("Invalid operation type: {0}")]
    InvalidOperation(String),

    /// Deposit would overflow the balance column
    #[error("Balance overflow")]
    BalanceOverflow,

    /// Storage failure not attributable to lock contention
    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),
}

impl WalletError {
    /// Get a client-safe error message that doesn't leak sensitive information
    pub fn client_message(&self) -> String {
        match self {
            WalletError::WalletNotFound(_) => "Wallet not found!".to_string(),
            WalletError::InsufficientBalance { .. } => "Insufficient balance!".to_string(),
            // Don't expose SQL details
            WalletError::Storage(_) => "Internal server error".to_string(),
            _ => self.to_string(),
        }
    }

    /// Stable, machine-checkable error code
    pub fn code(&self) -> &'static str {
        match self {
            WalletError::WalletNotFound(_) => "wallet_not_found",
            WalletError::InsufficientBalance { .. } => "insufficient_balance",
            WalletError::ConcurrencyConflict => "concurrency_conflict",
            WalletError::InvalidAmount(_) | WalletError::InvalidOperation(_) => "validation_error",
            WalletError::BalanceOverflow => "balance_overflow",
            WalletError::Storage(_) => "storage_error",
        }
    }

    /// Whether the error was raised before any storage interaction
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            WalletError::InvalidAmount(_) | WalletError::InvalidOperation(_)
        )
    }
}

/// Result type for wallet operations
pub type WalletResult<T> = Result<T, WalletError>;
