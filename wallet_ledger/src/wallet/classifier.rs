//! Translation of storage failures into caller-facing wallet errors.
//!
//! Domain outcomes raised by the mutator (`WalletNotFound`,
//! `InsufficientBalance`, validation) pass through untouched. Storage
//! contention becomes `ConcurrencyConflict`; every other storage failure
//! stays a `Storage` error so a broken database is never reported as a
//! retryable conflict.

use std::future::Future;

use super::errors::{WalletError, WalletResult};

/// Classify a single error
pub fn classify(err: WalletError) -> WalletError {
    match err {
        WalletError::Storage(store_err) if store_err.is_contention() => {
            WalletError::ConcurrencyConflict
        }
        other => other,
    }
}

/// Run one mutation attempt and classify its failure, if any.
///
/// `wallet` is only used for log context.
pub async fn guard<F, T>(wallet: &str, attempt: F) -> WalletResult<T>
where
    F: Future<Output = WalletResult<T>>,
{
    match attempt.await {
        Ok(value) => Ok(value),
        Err(err) => {
            if let WalletError::Storage(store_err) = &err {
                if store_err.is_contention() {
                    log::warn!("Wallet {wallet} busy: {store_err}");
                } else {
                    log::error!("Wallet {wallet} storage failure: {store_err}");
                }
            }
            Err(classify(err))
        }
    }
}
