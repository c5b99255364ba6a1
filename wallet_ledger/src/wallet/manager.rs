//! Wallet manager: lookup, creation and the locked balance mutation.

use std::sync::Arc;
use uuid::Uuid;

use super::{
    classifier,
    errors::{WalletError, WalletResult},
    models::{Wallet, WalletOperation},
};
use crate::db::{MemoryWalletStore, WalletStore, WalletTx};

/// Wallet manager
#[derive(Clone)]
pub struct WalletManager {
    store: Arc<dyn WalletStore>,
}

impl WalletManager {
    /// Create a new wallet manager on top of a store
    pub fn new(store: Arc<dyn WalletStore>) -> Self {
        Self { store }
    }

    /// Wallet manager backed by a fresh in-process store
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryWalletStore::new()))
    }

    pub fn store(&self) -> &Arc<dyn WalletStore> {
        &self.store
    }

    /// Get a wallet by its external identifier. Never locks.
    ///
    /// # Errors
    ///
    /// * `WalletError::WalletNotFound` - unknown or malformed identifier
    pub async fn get_wallet(&self, uuid: &str) -> WalletResult<Wallet> {
        let id = parse_uuid(uuid)?;
        self.store
            .find_by_uuid(id)
            .await?
            .ok_or_else(|| WalletError::WalletNotFound(uuid.to_string()))
    }

    /// Create an empty wallet with a fresh random identifier
    pub async fn create_wallet(&self) -> WalletResult<Wallet> {
        let wallet = self.store.create(Uuid::new_v4()).await?;
        log::info!("Created wallet {}", wallet.uuid);
        Ok(wallet)
    }

    /// Apply one deposit or withdrawal atomically.
    ///
    /// The wallet row is locked without waiting; if another attempt holds it
    /// this returns `ConcurrencyConflict` at once and never retries.
    ///
    /// # Errors
    ///
    /// * `WalletError::InvalidAmount` - negative amount, storage untouched
    /// * `WalletError::WalletNotFound` - unknown or malformed identifier
    /// * `WalletError::InsufficientBalance` - withdrawal exceeds the balance
    /// * `WalletError::BalanceOverflow` - deposit overflows the balance
    /// * `WalletError::ConcurrencyConflict` - row locked by another attempt
    /// * `WalletError::Storage` - any other storage failure
    pub async fn apply_operation(
        &self,
        uuid: &str,
        operation: WalletOperation,
    ) -> WalletResult<Wallet> {
        operation.validate()?;
        let id = parse_uuid(uuid)?;

        let wallet = classifier::guard(uuid, self.locked_apply(id, operation)).await?;

        log::info!(
            "Applied {} of {} to wallet {}, balance now {}",
            operation.operation_type,
            operation.amount,
            wallet.uuid,
            wallet.balance
        );
        Ok(wallet)
    }

    async fn locked_apply(&self, uuid: Uuid, operation: WalletOperation) -> WalletResult<Wallet> {
        let mut tx = self.store.begin().await?;

        let Some(current) = tx.find_by_uuid(uuid, true).await? else {
            return Err(abort(tx, WalletError::WalletNotFound(uuid.to_string())).await);
        };

        let new_balance = match operation.apply_to(current.balance) {
            Ok(balance) => balance,
            Err(err) => return Err(abort(tx, err).await),
        };

        let updated = tx.update_balance(current.id, new_balance).await?;
        tx.commit().await?;

        Ok(updated)
    }
}

/// Roll back and hand back the error that caused it. A failed rollback is
/// only logged; dropping the transaction discards its writes regardless.
async fn abort(tx: Box<dyn WalletTx>, err: WalletError) -> WalletError {
    if let Err(rollback_err) = tx.rollback().await {
        log::warn!("Rollback after {err} failed: {rollback_err}");
    }
    err
}

fn parse_uuid(uuid: &str) -> WalletResult<Uuid> {
    Uuid::parse_str(uuid).map_err(|_| WalletError::WalletNotFound(uuid.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::StoreError;

    async fn funded(manager: &WalletManager, balance: i64) -> String {
        let wallet = manager.create_wallet().await.unwrap();
        let uuid = wallet.uuid.to_string();
        manager
            .apply_operation(&uuid, WalletOperation::deposit(balance).unwrap())
            .await
            .unwrap();
        uuid
    }

    #[tokio::test]
    async fn test_create_then_lookup() {
        let manager = WalletManager::in_memory();
        let created = manager.create_wallet().await.unwrap();
        let found = manager.get_wallet(&created.uuid.to_string()).await.unwrap();
        assert_eq!(found.balance, 0);
        assert_eq!(found.uuid, created.uuid);
    }

    #[tokio::test]
    async fn test_malformed_uuid_is_not_found() {
        let manager = WalletManager::in_memory();
        assert!(matches!(
            manager.get_wallet("abc").await,
            Err(WalletError::WalletNotFound(ref s)) if s == "abc"
        ));
        assert!(matches!(
            manager
                .apply_operation("123", WalletOperation::deposit(1000).unwrap())
                .await,
            Err(WalletError::WalletNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_withdraw_whole_balance() {
        let manager = WalletManager::in_memory();
        let uuid = funded(&manager, 1000).await;

        let wallet = manager
            .apply_operation(&uuid, WalletOperation::withdraw(1000).unwrap())
            .await
            .unwrap();
        assert_eq!(wallet.balance, 0);
    }

    #[tokio::test]
    async fn test_insufficient_balance_leaves_storage_untouched() {
        let manager = WalletManager::in_memory();
        let uuid = funded(&manager, 1000).await;

        let err = manager
            .apply_operation(&uuid, WalletOperation::withdraw(1001).unwrap())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            WalletError::InsufficientBalance {
                available: 1000,
                required: 1001
            }
        ));
        assert_eq!(manager.get_wallet(&uuid).await.unwrap().balance, 1000);
    }

    #[tokio::test]
    async fn test_negative_amount_rejected_before_storage() {
        let manager = WalletManager::in_memory();
        let operation = WalletOperation {
            operation_type: crate::wallet::OperationKind::Deposit,
            amount: -5,
        };
        // The wallet does not exist; validation must win over lookup.
        let err = manager
            .apply_operation(&Uuid::new_v4().to_string(), operation)
            .await
            .unwrap_err();
        assert!(matches!(err, WalletError::InvalidAmount(-5)));
    }

    #[tokio::test]
    async fn test_locked_wallet_reports_conflict() {
        let manager = WalletManager::in_memory();
        let uuid = funded(&manager, 1000).await;
        let id = Uuid::parse_str(&uuid).unwrap();

        let mut holder = manager.store().begin().await.unwrap();
        holder.find_by_uuid(id, true).await.unwrap();

        let err = manager
            .apply_operation(&uuid, WalletOperation::withdraw(10).unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, WalletError::ConcurrencyConflict));
        assert_eq!(manager.get_wallet(&uuid).await.unwrap().balance, 1000);

        drop(holder);
        let wallet = manager
            .apply_operation(&uuid, WalletOperation::withdraw(10).unwrap())
            .await
            .unwrap();
        assert_eq!(wallet.balance, 990);
    }

    #[tokio::test]
    async fn test_failed_attempt_releases_lock() {
        let manager = WalletManager::in_memory();
        let uuid = funded(&manager, 100).await;

        assert!(
            manager
                .apply_operation(&uuid, WalletOperation::withdraw(500).unwrap())
                .await
                .is_err()
        );
        // The failed attempt must not leave the row locked.
        let wallet = manager
            .apply_operation(&uuid, WalletOperation::deposit(1).unwrap())
            .await
            .unwrap();
        assert_eq!(wallet.balance, 101);
    }

    #[tokio::test]
    async fn test_deposit_overflow() {
        let manager = WalletManager::in_memory();
        let uuid = funded(&manager, i64::MAX).await;

        let err = manager
            .apply_operation(&uuid, WalletOperation::deposit(1).unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, WalletError::BalanceOverflow));
        assert_eq!(manager.get_wallet(&uuid).await.unwrap().balance, i64::MAX);
    }

    #[test]
    fn test_parse_uuid() {
        assert!(parse_uuid("f47ac10b-58cc-4372-a567-0e02b2c3d479").is_ok());
        assert!(matches!(
            parse_uuid("11111111-1111-1111-1111"),
            Err(WalletError::WalletNotFound(_))
        ));
    }

    #[test]
    fn test_store_error_converts_to_storage() {
        let err: WalletError = StoreError::UniqueViolation.into();
        assert!(matches!(err, WalletError::Storage(StoreError::UniqueViolation)));
    }
}
