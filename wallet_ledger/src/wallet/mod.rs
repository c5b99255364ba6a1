//! Wallet module providing balance lookup, creation and locked mutation.
//!
//! This module implements:
//! - Deposit and withdraw as single-shot transactions
//! - Non-blocking exclusive row locks (contention fails fast, never queues)
//! - Classification of storage contention into `ConcurrencyConflict`
//!
//! ## Example
//!
//! ```no_run
//! use wallet_ledger::db::{Database, PgWalletStore};
//! use wallet_ledger::wallet::{WalletManager, WalletOperation};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::new(&Default::default()).await?;
//!     let wallets = WalletManager::new(Arc::new(PgWalletStore::new(db.pool().clone())));
//!
//!     let wallet = wallets.create_wallet().await?;
//!     let uuid = wallet.uuid.to_string();
//!
//!     let wallet = wallets
//!         .apply_operation(&uuid, WalletOperation::deposit(500)?)
//!         .await?;
//!     println!("Balance after deposit: {}", wallet.balance);
//!
//!     Ok(())
//! }
//! ```

pub mod classifier;
pub mod errors;
pub mod manager;
pub mod models;

pub use errors::{WalletError, WalletResult};
pub use manager::WalletManager;
pub use models::{OperationKind, Wallet, WalletOperation};
