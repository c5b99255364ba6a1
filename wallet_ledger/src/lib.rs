//! # Wallet Ledger
//!
//! A wallet balance ledger: one integer balance per wallet, mutated by
//! deposits and withdrawals that run as single-shot transactions.
//!
//! Concurrent attempts against the same wallet are serialized by the store's
//! exclusive row lock. The lock is taken without waiting, so the loser of a
//! race gets an immediate [`WalletError::ConcurrencyConflict`] and decides for
//! itself whether to resubmit.
//!
//! ## Core Modules
//!
//! - [`wallet`]: data model, balance mutator and conflict classification
//! - [`db`]: connection pool, the [`db::WalletStore`] seam and its backends
//!
//! ## Example
//!
//! ```
//! use wallet_ledger::wallet::{WalletManager, WalletOperation};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), wallet_ledger::WalletError> {
//! let wallets = WalletManager::in_memory();
//! let wallet = wallets.create_wallet().await?;
//! let uuid = wallet.uuid.to_string();
//!
//! wallets.apply_operation(&uuid, WalletOperation::deposit(500)?).await?;
//! let wallet = wallets.apply_operation(&uuid, WalletOperation::withdraw(200)?).await?;
//! assert_eq!(wallet.balance, 300);
//! # Ok(())
//! # }
//! ```

/// Database pool, configuration and wallet storage backends.
pub mod db;

/// Wallet model, balance mutation and error classification.
pub mod wallet;

pub use wallet::{OperationKind, Wallet, WalletError, WalletManager, WalletOperation, WalletResult};
