//! Wallet store abstraction and its PostgreSQL implementation.
//!
//! The store is split in two seams: [`WalletStore`] for pool-level access
//! (plain lookups, inserts) and [`WalletTx`] for work scoped to one explicit
//! transaction. A `WalletTx` that is dropped without `commit` rolls back.

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Row, Transaction, postgres::PgRow};
use std::time::Duration;
use uuid::Uuid;

use super::errors::StoreResult;
use super::timeouts::{DEFAULT_QUERY_TIMEOUT, with_timeout};
use crate::wallet::Wallet;

/// Pool-level wallet storage operations
#[async_trait]
pub trait WalletStore: Send + Sync {
    /// Open a new transaction
    async fn begin(&self) -> StoreResult<Box<dyn WalletTx>>;

    /// Non-locking lookup of committed state
    async fn find_by_uuid(&self, uuid: Uuid) -> StoreResult<Option<Wallet>>;

    /// Insert a wallet with a zero balance and return the persisted row
    async fn create(&self, uuid: Uuid) -> StoreResult<Wallet>;

    /// Check that the store is reachable
    async fn health_check(&self) -> StoreResult<()>;
}

/// Operations scoped to one transaction
#[async_trait]
pub trait WalletTx: Send {
    /// Point lookup. With `for_update` the row is exclusively locked until
    /// the transaction ends; if another transaction holds the lock this
    /// fails at once with `StoreError::LockNotAvailable`.
    async fn find_by_uuid(&mut self, uuid: Uuid, for_update: bool) -> StoreResult<Option<Wallet>>;

    /// Write a new balance and return the refreshed row
    async fn update_balance(&mut self, id: i64, balance: i64) -> StoreResult<Wallet>;

    async fn commit(self: Box<Self>) -> StoreResult<()>;

    async fn rollback(self: Box<Self>) -> StoreResult<()>;
}

const SELECT_BY_UUID: &str = "SELECT id, uuid, balance FROM wallets WHERE uuid = $1";
const SELECT_BY_UUID_FOR_UPDATE: &str =
    "SELECT id, uuid, balance FROM wallets WHERE uuid = $1 FOR UPDATE NOWAIT";

fn wallet_from_row(row: &PgRow) -> Wallet {
    Wallet {
        id: row.get("id"),
        uuid: row.get("uuid"),
        balance: row.get("balance"),
    }
}

/// PostgreSQL implementation of `WalletStore`
#[derive(Clone)]
pub struct PgWalletStore {
    pool: PgPool,
    query_timeout: Duration,
}

impl PgWalletStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            query_timeout: DEFAULT_QUERY_TIMEOUT,
        }
    }

    /// Override the per-statement timeout
    pub fn with_query_timeout(mut self, query_timeout: Duration) -> Self {
        self.query_timeout = query_timeout;
        self
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl WalletStore for PgWalletStore {
    async fn begin(&self) -> StoreResult<Box<dyn WalletTx>> {
        // Bounded by the pool's acquire timeout, which surfaces as `PoolTimedOut`
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgWalletTx {
            tx,
            query_timeout: self.query_timeout,
        }))
    }

    async fn find_by_uuid(&self, uuid: Uuid) -> StoreResult<Option<Wallet>> {
        let row = with_timeout(
            self.query_timeout,
            sqlx::query(SELECT_BY_UUID).bind(uuid).fetch_optional(&self.pool),
        )
        .await?;

        Ok(row.as_ref().map(wallet_from_row))
    }

    async fn create(&self, uuid: Uuid) -> StoreResult<Wallet> {
        let row = with_timeout(
            self.query_timeout,
            sqlx::query(
                "INSERT INTO wallets (uuid, balance) VALUES ($1, 0) RETURNING id, uuid, balance",
            )
            .bind(uuid)
            .fetch_one(&self.pool),
        )
        .await?;

        Ok(wallet_from_row(&row))
    }

    async fn health_check(&self) -> StoreResult<()> {
        with_timeout(self.query_timeout, sqlx::query("SELECT 1").execute(&self.pool)).await?;
        Ok(())
    }
}

struct PgWalletTx {
    tx: Transaction<'static, Postgres>,
    query_timeout: Duration,
}

#[async_trait]
impl WalletTx for PgWalletTx {
    async fn find_by_uuid(&mut self, uuid: Uuid, for_update: bool) -> StoreResult<Option<Wallet>> {
        let sql = if for_update {
            SELECT_BY_UUID_FOR_UPDATE
        } else {
            SELECT_BY_UUID
        };

        let row = with_timeout(
            self.query_timeout,
            sqlx::query(sql).bind(uuid).fetch_optional(&mut *self.tx),
        )
        .await?;

        Ok(row.as_ref().map(wallet_from_row))
    }

    async fn update_balance(&mut self, id: i64, balance: i64) -> StoreResult<Wallet> {
        let row = with_timeout(
            self.query_timeout,
            sqlx::query("UPDATE wallets SET balance = $1 WHERE id = $2 RETURNING id, uuid, balance")
                .bind(balance)
                .bind(id)
                .fetch_one(&mut *self.tx),
        )
        .await?;

        Ok(wallet_from_row(&row))
    }

    async fn commit(self: Box<Self>) -> StoreResult<()> {
        let PgWalletTx { tx, .. } = *self;
        tx.commit().await?;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> StoreResult<()> {
        let PgWalletTx { tx, .. } = *self;
        tx.rollback().await?;
        Ok(())
    }
}
