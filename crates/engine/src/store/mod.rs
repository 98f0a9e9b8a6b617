//! Persistence boundary.
//!
//! The engine never talks to a database directly: every read and write goes
//! through a [`LedgerStore`]. Each call either succeeds or fails as a whole;
//! sequencing several calls is the job of the [`Engine`](crate::Engine).

use async_trait::async_trait;

use crate::{
    ResultEngine, Transaction, TransactionDraft, TransactionPatch, Wallet,
    wallets::{NewWallet, WalletUpdate},
};

mod memory;
mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

#[async_trait]
pub trait LedgerStore: Send + Sync {
    async fn get_wallets(&self) -> ResultEngine<Vec<Wallet>>;

    async fn get_transactions(&self) -> ResultEngine<Vec<Transaction>>;

    async fn get_categories(&self) -> ResultEngine<Vec<String>>;

    /// Persists a new transaction. Assigns an id and the current date when
    /// the draft has none.
    async fn create_transaction(&self, draft: TransactionDraft) -> ResultEngine<Transaction>;

    /// Applies `patch` and returns the stored record.
    async fn update_transaction(
        &self,
        id: &str,
        patch: TransactionPatch,
    ) -> ResultEngine<Transaction>;

    async fn delete_transaction(&self, id: &str) -> ResultEngine<()>;

    async fn update_wallet_balance(&self, id: &str, balance: i64) -> ResultEngine<()>;

    async fn create_wallet(&self, wallet: NewWallet) -> ResultEngine<Wallet>;

    async fn update_wallet(&self, id: &str, update: WalletUpdate) -> ResultEngine<Wallet>;

    async fn delete_wallet(&self, id: &str) -> ResultEngine<()>;
}
