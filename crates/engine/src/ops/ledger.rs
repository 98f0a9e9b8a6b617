//! In-memory mirror of the store.

use crate::{
    EngineError, LedgerStore, ResultEngine, Transaction, Wallet, reconcile::WalletDeltas,
};

/// Wallets, transactions and categories as last confirmed by the store.
///
/// Transactions flagged `is_deleting` are kept here until their delete is
/// committed, but they are hidden from [`Ledger::visible_transactions`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Ledger {
    wallets: Vec<Wallet>,
    transactions: Vec<Transaction>,
    categories: Vec<String>,
}

impl Ledger {
    pub(crate) async fn load(store: &dyn LedgerStore) -> ResultEngine<Self> {
        let (wallets, transactions, categories) = tokio::try_join!(
            store.get_wallets(),
            store.get_transactions(),
            store.get_categories()
        )?;
        Ok(Self {
            wallets,
            transactions,
            categories,
        })
    }

    pub fn wallets(&self) -> &[Wallet] {
        &self.wallets
    }

    pub fn wallet(&self, id: &str) -> ResultEngine<&Wallet> {
        self.wallets
            .iter()
            .find(|wallet| wallet.id == id)
            .ok_or_else(|| EngineError::KeyNotFound(format!("wallet {id}")))
    }

    /// Every mirrored transaction, pending deletes included.
    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn visible_transactions(&self) -> impl Iterator<Item = &Transaction> {
        self.transactions.iter().filter(|tx| !tx.is_deleting)
    }

    pub fn transaction(&self, id: &str) -> ResultEngine<&Transaction> {
        self.transactions
            .iter()
            .find(|tx| tx.id == id)
            .ok_or_else(|| EngineError::KeyNotFound(format!("transaction {id}")))
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    pub fn references_wallet(&self, wallet_id: &str) -> bool {
        self.transactions.iter().any(|tx| tx.wallet == wallet_id)
    }

    /// New balance of every wallet in `deltas`.
    ///
    /// Fails when a wallet is unknown, before anything is written.
    pub(crate) fn balances_after(&self, deltas: &WalletDeltas) -> ResultEngine<Vec<(String, i64)>> {
        deltas
            .iter()
            .map(|(wallet_id, delta)| {
                let wallet = self.wallet(wallet_id)?;
                let balance = wallet.balance.checked_add(delta).ok_or_else(|| {
                    EngineError::InvalidAmount(format!("balance overflow on wallet {wallet_id}"))
                })?;
                Ok((wallet_id.to_string(), balance))
            })
            .collect()
    }

    pub(crate) fn set_balances(&mut self, balances: &[(String, i64)]) {
        for (wallet_id, balance) in balances {
            if let Some(wallet) = self.wallets.iter_mut().find(|w| &w.id == wallet_id) {
                wallet.balance = *balance;
            }
        }
    }

    pub(crate) fn set_wallets(&mut self, wallets: Vec<Wallet>) {
        self.wallets = wallets;
    }

    pub(crate) fn insert_wallet(&mut self, wallet: Wallet) {
        self.wallets.push(wallet);
    }

    pub(crate) fn replace_wallet(&mut self, wallet: Wallet) {
        match self.wallets.iter_mut().find(|w| w.id == wallet.id) {
            Some(slot) => *slot = wallet,
            None => self.wallets.push(wallet),
        }
    }

    pub(crate) fn remove_wallet(&mut self, wallet_id: &str) {
        self.wallets.retain(|wallet| wallet.id != wallet_id);
    }

    pub(crate) fn push_transaction(&mut self, tx: Transaction) {
        self.transactions.push(tx);
    }

    /// Swaps the stored record, keeping the local `is_deleting` flag.
    pub(crate) fn replace_transaction(&mut self, tx: Transaction) {
        match self.transactions.iter_mut().find(|t| t.id == tx.id) {
            Some(slot) => {
                let is_deleting = slot.is_deleting;
                *slot = tx;
                slot.is_deleting = is_deleting;
            }
            None => self.transactions.push(tx),
        }
    }

    pub(crate) fn remove_transaction(&mut self, id: &str) {
        self.transactions.retain(|tx| tx.id != id);
    }

    pub(crate) fn set_deleting(&mut self, ids: &[String], is_deleting: bool) {
        for tx in self
            .transactions
            .iter_mut()
            .filter(|tx| ids.contains(&tx.id))
        {
            tx.is_deleting = is_deleting;
        }
    }
}
