//! Edit reconciliation.
//!
//! Editing a transaction reverts the old effect and applies the new one. The
//! two effects may land on different wallets, so they are accumulated per
//! wallet id instead of diffing amounts.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::{
    Transaction,
    rules::{LedgerAction, WalletDelta, compute_wallet_delta},
    wallets::CASH_WALLET_ID,
};

/// Net balance change per wallet id, ordered by id.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct WalletDeltas(BTreeMap<String, i64>);

impl WalletDeltas {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `delta` to the entry of `wallet_id`.
    pub fn add(&mut self, wallet_id: &str, delta: i64) {
        *self.0.entry(wallet_id.to_string()).or_insert(0) += delta;
    }

    /// Adds both sides of a rules engine result.
    pub fn add_delta(&mut self, delta: &WalletDelta) {
        let Some(primary) = delta.primary_wallet_id.as_deref() else {
            return;
        };
        self.add(primary, delta.primary_delta);
        self.add(CASH_WALLET_ID, delta.cash_delta);
    }

    pub fn get(&self, wallet_id: &str) -> i64 {
        self.0.get(wallet_id).copied().unwrap_or(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, i64)> {
        self.0.iter().map(|(id, delta)| (id.as_str(), *delta))
    }

    pub fn wallet_ids(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Drops wallets whose net change is zero.
    #[must_use]
    pub fn pruned(mut self) -> Self {
        self.0.retain(|_, delta| *delta != 0);
        self
    }
}

impl From<&WalletDelta> for WalletDeltas {
    fn from(delta: &WalletDelta) -> Self {
        let mut deltas = Self::new();
        deltas.add_delta(delta);
        deltas
    }
}

/// Net wallet changes of replacing `original` with `updated`.
///
/// The result is not pruned: wallets whose effects cancel out keep a `0`
/// entry. Call [`WalletDeltas::pruned`] before persisting.
pub fn reconcile_edit(original: &Transaction, updated: &Transaction) -> WalletDeltas {
    let revert = compute_wallet_delta(original, LedgerAction::Delete);
    let apply = compute_wallet_delta(updated, LedgerAction::Create);

    let mut deltas = WalletDeltas::new();
    deltas.add_delta(&revert);
    deltas.add_delta(&apply);
    deltas
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::{MarginType, TransactionDraft, TxType};

    fn tx(draft: TransactionDraft) -> Transaction {
        Transaction::from_draft("t", Utc.timestamp_opt(0, 0).unwrap(), draft)
    }

    #[test]
    fn amount_change_on_same_wallet() {
        let before = tx(TransactionDraft::new("Pulsa", TxType::Out, 10_000, "BRI").margin(2_000));
        let after = tx(TransactionDraft::new("Pulsa", TxType::Out, 25_000, "BRI").margin(2_000));
        let deltas = reconcile_edit(&before, &after);
        assert_eq!(deltas.get("BRI"), -15_000);
        assert_eq!(deltas.get(CASH_WALLET_ID), 15_000);
        assert_eq!(deltas.len(), 2);
    }

    #[test]
    fn wallet_change_moves_the_whole_effect() {
        let before = tx(TransactionDraft::new("Pulsa", TxType::Out, 10_000, "BRI").margin(2_000));
        let after = tx(TransactionDraft::new("Pulsa", TxType::Out, 10_000, "DANA").margin(2_000));
        let deltas = reconcile_edit(&before, &after);
        assert_eq!(deltas.get("BRI"), 10_000);
        assert_eq!(deltas.get("DANA"), -10_000);
        assert_eq!(deltas.get(CASH_WALLET_ID), 0);

        let pruned = deltas.pruned();
        assert_eq!(pruned.wallet_ids().collect::<Vec<_>>(), vec!["BRI", "DANA"]);
    }

    #[test]
    fn category_change_switches_rules() {
        let before = tx(TransactionDraft::new("Tarik Tunai", TxType::In, 50_000, "BRILINK")
            .margin(5_000)
            .margin_type(MarginType::Luar));
        let after = tx(TransactionDraft::new("Tarik Tunai", TxType::In, 50_000, "BRILINK")
            .margin(5_000)
            .margin_type(MarginType::Dalam));
        let deltas = reconcile_edit(&before, &after).pruned();
        assert_eq!(deltas.get("BRILINK"), 5_000);
        assert_eq!(deltas.get(CASH_WALLET_ID), -5_000);
    }

    #[test]
    fn identical_edit_prunes_to_nothing() {
        let t = tx(TransactionDraft::new("Setor Tunai", TxType::In, 20_000, "BRI").margin(1_000));
        assert!(reconcile_edit(&t, &t).pruned().is_empty());
    }

    #[test]
    fn cash_primary_merges_both_sides() {
        let before = tx(TransactionDraft::new("Pulsa", TxType::Out, 10_000, "CASH"));
        let after = tx(TransactionDraft::new("Pulsa", TxType::Out, 12_000, "CASH"));
        let deltas = reconcile_edit(&before, &after);
        assert_eq!(deltas.len(), 1);
        assert_eq!(deltas.get(CASH_WALLET_ID), 0);
    }
}
