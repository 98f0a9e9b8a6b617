#![allow(dead_code)]

use std::{
    collections::{HashMap, HashSet},
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use engine::{
    CASH_WALLET_ID, Engine, EngineError, LedgerStore, MemoryStore, NewWallet, Transaction,
    TransactionDraft, TransactionPatch, Wallet, WalletUpdate,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Op {
    CreateTransaction,
    UpdateTransaction,
    DeleteTransaction,
    UpdateWalletBalance,
    CreateWallet,
    UpdateWallet,
    DeleteWallet,
}

/// Memory store that counts calls and fails on demand.
#[derive(Clone, Default)]
pub struct ProbeStore {
    pub inner: MemoryStore,
    calls: Arc<Mutex<HashMap<Op, usize>>>,
    failing: Arc<Mutex<HashSet<Op>>>,
}

impl ProbeStore {
    pub fn new(inner: MemoryStore) -> Self {
        Self {
            inner,
            ..Self::default()
        }
    }

    pub fn calls(&self, op: Op) -> usize {
        self.calls.lock().unwrap().get(&op).copied().unwrap_or(0)
    }

    pub fn total_writes(&self) -> usize {
        self.calls.lock().unwrap().values().sum()
    }

    pub fn fail(&self, op: Op) {
        self.failing.lock().unwrap().insert(op);
    }

    pub fn heal(&self, op: Op) {
        self.failing.lock().unwrap().remove(&op);
    }

    fn record(&self, op: Op) -> Result<(), EngineError> {
        *self.calls.lock().unwrap().entry(op).or_default() += 1;
        if self.failing.lock().unwrap().contains(&op) {
            return Err(EngineError::Store(format!("{op:?} refused")));
        }
        Ok(())
    }
}

#[async_trait]
impl LedgerStore for ProbeStore {
    async fn get_wallets(&self) -> Result<Vec<Wallet>, EngineError> {
        self.inner.get_wallets().await
    }

    async fn get_transactions(&self) -> Result<Vec<Transaction>, EngineError> {
        self.inner.get_transactions().await
    }

    async fn get_categories(&self) -> Result<Vec<String>, EngineError> {
        self.inner.get_categories().await
    }

    async fn create_transaction(&self, draft: TransactionDraft) -> Result<Transaction, EngineError> {
        self.record(Op::CreateTransaction)?;
        self.inner.create_transaction(draft).await
    }

    async fn update_transaction(
        &self,
        id: &str,
        patch: TransactionPatch,
    ) -> Result<Transaction, EngineError> {
        self.record(Op::UpdateTransaction)?;
        self.inner.update_transaction(id, patch).await
    }

    async fn delete_transaction(&self, id: &str) -> Result<(), EngineError> {
        self.record(Op::DeleteTransaction)?;
        self.inner.delete_transaction(id).await
    }

    async fn update_wallet_balance(&self, id: &str, balance: i64) -> Result<(), EngineError> {
        self.record(Op::UpdateWalletBalance)?;
        self.inner.update_wallet_balance(id, balance).await
    }

    async fn create_wallet(&self, wallet: NewWallet) -> Result<Wallet, EngineError> {
        self.record(Op::CreateWallet)?;
        self.inner.create_wallet(wallet).await
    }

    async fn update_wallet(&self, id: &str, update: WalletUpdate) -> Result<Wallet, EngineError> {
        self.record(Op::UpdateWallet)?;
        self.inner.update_wallet(id, update).await
    }

    async fn delete_wallet(&self, id: &str) -> Result<(), EngineError> {
        self.record(Op::DeleteWallet)?;
        self.inner.delete_wallet(id).await
    }
}

/// Engine over a probe store holding CASH plus `wallets`.
pub async fn engine_with(cash: i64, wallets: &[(&str, i64)]) -> (Engine, ProbeStore) {
    let mut seeded = vec![Wallet::new(CASH_WALLET_ID, "Cash", cash)];
    seeded.extend(
        wallets
            .iter()
            .map(|(id, balance)| Wallet::new(*id, *id, *balance)),
    );
    let probe = ProbeStore::new(MemoryStore::new().with_wallets(seeded));
    let engine = Engine::builder().store(probe.clone()).build().await.unwrap();
    (engine, probe)
}

pub async fn balance(engine: &Engine, wallet_id: &str) -> i64 {
    engine.wallet(wallet_id).await.unwrap().balance
}

/// Balances of every wallet, ordered by id.
pub async fn balances(engine: &Engine) -> Vec<(String, i64)> {
    let mut all: Vec<(String, i64)> = engine
        .wallets()
        .await
        .into_iter()
        .map(|wallet| (wallet.id, wallet.balance))
        .collect();
    all.sort();
    all
}
