//! In-process store.
//!
//! Behaves like the REST backend (ids assigned on create, records replaced on
//! update) without any I/O. Used by tests and by the `memory` database
//! setting.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::{
    EngineError, ResultEngine, Transaction, TransactionDraft, TransactionPatch, Wallet,
    categories::DEFAULT_CATEGORIES,
    wallets::{NewWallet, WalletUpdate, derive_wallet_id},
};

use super::LedgerStore;

#[derive(Debug, Default)]
struct Tables {
    wallets: Vec<Wallet>,
    transactions: Vec<Transaction>,
    categories: Vec<String>,
}

#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Tables>>,
}

impl MemoryStore {
    /// Empty store with the default category list.
    pub fn new() -> Self {
        Self::default().with_categories(DEFAULT_CATEGORIES.iter().copied())
    }

    #[must_use]
    pub fn with_wallets(self, wallets: impl IntoIterator<Item = Wallet>) -> Self {
        if let Ok(mut tables) = self.inner.try_lock() {
            tables.wallets.extend(wallets);
        }
        self
    }

    #[must_use]
    pub fn with_transactions(self, transactions: impl IntoIterator<Item = Transaction>) -> Self {
        if let Ok(mut tables) = self.inner.try_lock() {
            tables.transactions.extend(transactions);
        }
        self
    }

    #[must_use]
    pub fn with_categories<S: Into<String>>(self, categories: impl IntoIterator<Item = S>) -> Self {
        if let Ok(mut tables) = self.inner.try_lock() {
            tables.categories = categories.into_iter().map(Into::into).collect();
        }
        self
    }
}

#[async_trait]
impl LedgerStore for MemoryStore {
    async fn get_wallets(&self) -> ResultEngine<Vec<Wallet>> {
        Ok(self.inner.lock().await.wallets.clone())
    }

    async fn get_transactions(&self) -> ResultEngine<Vec<Transaction>> {
        Ok(self.inner.lock().await.transactions.clone())
    }

    async fn get_categories(&self) -> ResultEngine<Vec<String>> {
        Ok(self.inner.lock().await.categories.clone())
    }

    async fn create_transaction(&self, draft: TransactionDraft) -> ResultEngine<Transaction> {
        let mut tables = self.inner.lock().await;
        let id = draft
            .id
            .clone()
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        if tables.transactions.iter().any(|tx| tx.id == id) {
            return Err(EngineError::ExistingKey(id));
        }
        let date = draft.date.unwrap_or_else(Utc::now);
        let tx = Transaction::from_draft(id, date, draft);
        tables.transactions.push(tx.clone());
        Ok(tx)
    }

    async fn update_transaction(
        &self,
        id: &str,
        patch: TransactionPatch,
    ) -> ResultEngine<Transaction> {
        let mut tables = self.inner.lock().await;
        let tx = tables
            .transactions
            .iter_mut()
            .find(|tx| tx.id == id)
            .ok_or_else(|| EngineError::KeyNotFound(format!("transaction {id}")))?;
        tx.apply_patch(&patch);
        Ok(tx.clone())
    }

    async fn delete_transaction(&self, id: &str) -> ResultEngine<()> {
        let mut tables = self.inner.lock().await;
        let before = tables.transactions.len();
        tables.transactions.retain(|tx| tx.id != id);
        if tables.transactions.len() == before {
            return Err(EngineError::KeyNotFound(format!("transaction {id}")));
        }
        Ok(())
    }

    async fn update_wallet_balance(&self, id: &str, balance: i64) -> ResultEngine<()> {
        let mut tables = self.inner.lock().await;
        let wallet = tables
            .wallets
            .iter_mut()
            .find(|wallet| wallet.id == id)
            .ok_or_else(|| EngineError::KeyNotFound(format!("wallet {id}")))?;
        wallet.balance = balance;
        Ok(())
    }

    async fn create_wallet(&self, wallet: NewWallet) -> ResultEngine<Wallet> {
        let mut tables = self.inner.lock().await;
        let taken = |candidate: &str| tables.wallets.iter().any(|w| w.id == candidate);
        let id = match wallet.id {
            Some(id) if taken(&id) => return Err(EngineError::ExistingKey(id)),
            Some(id) => id,
            None => derive_wallet_id(&wallet.name, &taken),
        };
        let created = Wallet {
            id,
            name: wallet.name,
            balance: wallet.balance,
            icon: wallet.icon,
        };
        tables.wallets.push(created.clone());
        Ok(created)
    }

    async fn update_wallet(&self, id: &str, update: WalletUpdate) -> ResultEngine<Wallet> {
        let mut tables = self.inner.lock().await;
        let wallet = tables
            .wallets
            .iter_mut()
            .find(|wallet| wallet.id == id)
            .ok_or_else(|| EngineError::KeyNotFound(format!("wallet {id}")))?;
        wallet.apply_update(&update);
        Ok(wallet.clone())
    }

    async fn delete_wallet(&self, id: &str) -> ResultEngine<()> {
        let mut tables = self.inner.lock().await;
        let before = tables.wallets.len();
        tables.wallets.retain(|wallet| wallet.id != id);
        if tables.wallets.len() == before {
            return Err(EngineError::KeyNotFound(format!("wallet {id}")));
        }
        Ok(())
    }
}
