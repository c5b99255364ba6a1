//! In-process wallet store.
//!
//! Each row carries its own `tokio::sync::Mutex`; locking a row for update is
//! a `try_lock_owned`, so a contended row fails immediately instead of
//! queueing. Readers only ever see committed balances. Staged writes live in
//! the transaction and are discarded if it is dropped without `commit`.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};
use uuid::Uuid;

use super::errors::{StoreError, StoreResult};
use super::repository::{WalletStore, WalletTx};
use crate::wallet::Wallet;

struct MemoryRow {
    id: i64,
    uuid: Uuid,
    balance: AtomicI64,
    lock: Arc<Mutex<()>>,
}

impl MemoryRow {
    fn committed(&self) -> Wallet {
        Wallet {
            id: self.id,
            uuid: self.uuid,
            balance: self.balance.load(Ordering::SeqCst),
        }
    }
}

type Rows = Arc<RwLock<HashMap<Uuid, Arc<MemoryRow>>>>;

/// In-memory implementation of `WalletStore`
#[derive(Clone)]
pub struct MemoryWalletStore {
    rows: Rows,
    next_id: Arc<AtomicI64>,
}

impl Default for MemoryWalletStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryWalletStore {
    pub fn new() -> Self {
        Self {
            rows: Arc::new(RwLock::new(HashMap::new())),
            next_id: Arc::new(AtomicI64::new(1)),
        }
    }

    /// Number of stored wallets
    pub async fn len(&self) -> usize {
        self.rows.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.rows.read().await.is_empty()
    }
}

#[async_trait]
impl WalletStore for MemoryWalletStore {
    async fn begin(&self) -> StoreResult<Box<dyn WalletTx>> {
        Ok(Box::new(MemoryWalletTx {
            rows: self.rows.clone(),
            held: HashMap::new(),
            staged: HashMap::new(),
        }))
    }

    async fn find_by_uuid(&self, uuid: Uuid) -> StoreResult<Option<Wallet>> {
        let rows = self.rows.read().await;
        Ok(rows.get(&uuid).map(|row| row.committed()))
    }

    async fn create(&self, uuid: Uuid) -> StoreResult<Wallet> {
        let mut rows = self.rows.write().await;
        if rows.contains_key(&uuid) {
            return Err(StoreError::UniqueViolation);
        }

        let row = Arc::new(MemoryRow {
            id: self.next_id.fetch_add(1, Ordering::SeqCst),
            uuid,
            balance: AtomicI64::new(0),
            lock: Arc::new(Mutex::new(())),
        });
        let wallet = row.committed();
        rows.insert(uuid, row);

        Ok(wallet)
    }

    async fn health_check(&self) -> StoreResult<()> {
        Ok(())
    }
}

struct HeldRow {
    row: Arc<MemoryRow>,
    _guard: OwnedMutexGuard<()>,
}

struct MemoryWalletTx {
    rows: Rows,
    held: HashMap<i64, HeldRow>,
    staged: HashMap<i64, i64>,
}

impl MemoryWalletTx {
    fn view(&self, row: &MemoryRow) -> Wallet {
        let mut wallet = row.committed();
        if let Some(balance) = self.staged.get(&row.id) {
            wallet.balance = *balance;
        }
        wallet
    }

    fn lock_row(&mut self, row: Arc<MemoryRow>) -> StoreResult<()> {
        if self.held.contains_key(&row.id) {
            return Ok(());
        }

        let guard = row
            .lock
            .clone()
            .try_lock_owned()
            .map_err(|_| StoreError::LockNotAvailable)?;
        self.held.insert(row.id, HeldRow { row, _guard: guard });
        Ok(())
    }
}

#[async_trait]
impl WalletTx for MemoryWalletTx {
    async fn find_by_uuid(&mut self, uuid: Uuid, for_update: bool) -> StoreResult<Option<Wallet>> {
        let row = self.rows.read().await.get(&uuid).cloned();
        let Some(row) = row else {
            return Ok(None);
        };

        if for_update {
            self.lock_row(row.clone())?;
        }

        Ok(Some(self.view(&row)))
    }

    async fn update_balance(&mut self, id: i64, balance: i64) -> StoreResult<Wallet> {
        let row = match self.held.get(&id) {
            Some(held) => held.row.clone(),
            None => {
                // Writing an unlocked row takes the lock, as an UPDATE would.
                let row = self
                    .rows
                    .read()
                    .await
                    .values()
                    .find(|row| row.id == id)
                    .cloned()
                    .ok_or(StoreError::Database(sqlx::Error::RowNotFound))?;
                self.lock_row(row.clone())?;
                row
            }
        };

        if balance < 0 {
            return Err(StoreError::ConstraintViolation(format!(
                "balance must not be negative, got {balance}"
            )));
        }

        self.staged.insert(id, balance);
        Ok(self.view(&row))
    }

    async fn commit(self: Box<Self>) -> StoreResult<()> {
        let MemoryWalletTx { held, staged, .. } = *self;
        for (id, balance) in staged {
            if let Some(held) = held.get(&id) {
                held.row.balance.store(balance, Ordering::SeqCst);
            }
        }
        // Guards are released only after every staged write is visible.
        drop(held);
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> StoreResult<()> {
        Ok(())
    }
}
