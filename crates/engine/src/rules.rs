//! Wallet ledger rules.
//!
//! Every transaction moves money on two logical accounts: its primary wallet
//! and the shared cash drawer ([`CASH_WALLET_ID`](crate::CASH_WALLET_ID)).
//! The rules below decide the signed change of each one. They are pure: no
//! store access, no clock.
//!
//! The rules are an ordered decision list, first match wins:
//!
//! | kind                 | primary                    | cash                                  |
//! |----------------------|----------------------------|---------------------------------------|
//! | reward               | `-amount`                  | `0`                                   |
//! | internal transfer    | OUT `-(amount+margin)`, IN `+amount` | `0`                         |
//! | pindah saldo         | IN `+amount`, OUT `-amount`| `0`                                   |
//! | fee brilink          | `+margin`                  | `0`                                   |
//! | penarikan margin     | `0`                        | `-amount`                             |
//! | tarik tunai (luar)   | `+amount`                  | piutang `-amount`, else `-amount+margin` |
//! | tarik tunai (dalam)  | `+amount+margin`           | `-amount`                             |
//! | other IN             | `+amount+margin`           | piutang `0`, else `-amount`           |
//! | other OUT            | `-amount`                  | piutang `0`, else `+amount+margin`    |
//!
//! Deleting a transaction applies the exact negation of its creation.

use serde::{Deserialize, Serialize};

use crate::{MarginType, Transaction, TransactionKind, TxType};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LedgerAction {
    Create,
    Delete,
}

impl LedgerAction {
    fn sign(self) -> i64 {
        match self {
            Self::Create => 1,
            Self::Delete => -1,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettleAction {
    Settle,
    RevertSettle,
}

/// Balance changes caused by one transaction.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletDelta {
    /// `None` when the transaction has no primary wallet; both deltas are then 0.
    pub primary_wallet_id: Option<String>,
    pub primary_delta: i64,
    pub cash_delta: i64,
}

impl WalletDelta {
    pub fn is_noop(&self) -> bool {
        self.primary_delta == 0 && self.cash_delta == 0
    }
}

/// Computes the wallet effect of creating or deleting `tx`.
pub fn compute_wallet_delta(tx: &Transaction, action: LedgerAction) -> WalletDelta {
    if tx.wallet.trim().is_empty() {
        return WalletDelta::default();
    }

    let (primary, cash) = creation_effect(tx);
    let sign = action.sign();

    WalletDelta {
        primary_wallet_id: Some(tx.wallet.clone()),
        primary_delta: primary * sign,
        cash_delta: cash * sign,
    }
}

fn creation_effect(tx: &Transaction) -> (i64, i64) {
    let amount = tx.amount;
    let margin = tx.margin;

    if tx.kind() == TransactionKind::Reward {
        return (-amount, 0);
    }
    if tx.is_internal_transfer {
        return match tx.tx_type {
            TxType::Out => (-(amount + margin), 0),
            TxType::In => (amount, 0),
        };
    }

    match tx.kind() {
        TransactionKind::PindahSaldo => match tx.tx_type {
            TxType::In => (amount, 0),
            TxType::Out => (-amount, 0),
        },
        TransactionKind::FeeBrilink => (margin, 0),
        TransactionKind::PenarikanMargin => (0, -amount),
        TransactionKind::TarikTunai => match tx.margin_type.unwrap_or_default() {
            MarginType::Luar => {
                let cash = if tx.is_piutang {
                    -amount
                } else {
                    -amount + margin
                };
                (amount, cash)
            }
            MarginType::Dalam => (amount + margin, -amount),
        },
        TransactionKind::Reward
        | TransactionKind::PenyesuaianKas
        | TransactionKind::TambahModal
        | TransactionKind::BungaBank
        | TransactionKind::PotonganBank
        | TransactionKind::Other => match tx.tx_type {
            TxType::In => {
                let cash = if tx.is_piutang { 0 } else { -amount };
                (amount + margin, cash)
            }
            TxType::Out => {
                let cash = if tx.is_piutang { 0 } else { amount + margin };
                (-amount, cash)
            }
        },
    }
}

/// Cash effect of collecting (or un-collecting) a receivable.
///
/// Settling never touches the primary wallet.
pub fn compute_settle_delta(tx: &Transaction, action: SettleAction) -> i64 {
    let total = tx.amount + tx.margin;
    match action {
        SettleAction::Settle => total,
        SettleAction::RevertSettle => -total,
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::TransactionDraft;

    fn tx(draft: TransactionDraft) -> Transaction {
        Transaction::from_draft("t", Utc.timestamp_opt(0, 0).unwrap(), draft)
    }

    fn delta(primary: &str, primary_delta: i64, cash_delta: i64) -> WalletDelta {
        WalletDelta {
            primary_wallet_id: Some(primary.to_string()),
            primary_delta,
            cash_delta,
        }
    }

    #[test]
    fn generic_out_receivable_defers_cash() {
        let t = tx(TransactionDraft::new("Transfer Keluar", TxType::Out, 10_000, "BRI")
            .margin(500)
            .piutang(true));
        assert_eq!(
            compute_wallet_delta(&t, LedgerAction::Create),
            delta("BRI", -10_000, 0)
        );
        assert_eq!(compute_settle_delta(&t, SettleAction::Settle), 10_500);
        assert_eq!(compute_settle_delta(&t, SettleAction::RevertSettle), -10_500);
    }

    #[test]
    fn generic_out_paid_brings_cash_in() {
        let t = tx(TransactionDraft::new("Transfer Keluar", TxType::Out, 10_000, "BRI").margin(500));
        assert_eq!(
            compute_wallet_delta(&t, LedgerAction::Create),
            delta("BRI", -10_000, 10_500)
        );
    }

    #[test]
    fn generic_in() {
        let paid = tx(TransactionDraft::new("Setor Tunai", TxType::In, 20_000, "BRI").margin(2_000));
        assert_eq!(
            compute_wallet_delta(&paid, LedgerAction::Create),
            delta("BRI", 22_000, -20_000)
        );
        let owed = tx(TransactionDraft::new("Setor Tunai", TxType::In, 20_000, "BRI")
            .margin(2_000)
            .piutang(true));
        assert_eq!(
            compute_wallet_delta(&owed, LedgerAction::Create),
            delta("BRI", 22_000, 0)
        );
    }

    #[test]
    fn tarik_tunai_luar() {
        let t = tx(TransactionDraft::new("Tarik Tunai", TxType::In, 50_000, "BRILINK")
            .margin(5_000)
            .margin_type(MarginType::Luar));
        assert_eq!(
            compute_wallet_delta(&t, LedgerAction::Create),
            delta("BRILINK", 50_000, -45_000)
        );

        let owed = tx(TransactionDraft::new("Tarik Tunai", TxType::In, 50_000, "BRILINK")
            .margin(5_000)
            .margin_type(MarginType::Luar)
            .piutang(true));
        assert_eq!(
            compute_wallet_delta(&owed, LedgerAction::Create),
            delta("BRILINK", 50_000, -50_000)
        );
    }

    #[test]
    fn tarik_tunai_dalam_and_unset() {
        let dalam = tx(TransactionDraft::new("Tarik Tunai", TxType::In, 50_000, "BRILINK")
            .margin(5_000)
            .margin_type(MarginType::Dalam));
        assert_eq!(
            compute_wallet_delta(&dalam, LedgerAction::Create),
            delta("BRILINK", 55_000, -50_000)
        );

        let unset = tx(TransactionDraft::new("Tarik Tunai", TxType::Out, 50_000, "BRILINK").margin(5_000));
        assert_eq!(
            compute_wallet_delta(&unset, LedgerAction::Create),
            delta("BRILINK", 55_000, -50_000)
        );
    }

    #[test]
    fn reward_wins_over_transfer_flag() {
        let mut draft = TransactionDraft::new("Reward: Payung", TxType::Out, 25_000, "CASH")
            .internal_transfer("x");
        draft.margin = 1_000;
        assert_eq!(
            compute_wallet_delta(&tx(draft), LedgerAction::Create),
            delta("CASH", -25_000, 0)
        );
    }

    #[test]
    fn internal_transfer_legs() {
        let out = tx(TransactionDraft::new("Pindah Saldo", TxType::Out, 101_000, "BRI")
            .internal_transfer("tr")
            .margin(0));
        let inn = tx(TransactionDraft::new("Pindah Saldo", TxType::In, 100_000, "CASH")
            .internal_transfer("tr"));
        assert_eq!(
            compute_wallet_delta(&out, LedgerAction::Create),
            delta("BRI", -101_000, 0)
        );
        assert_eq!(
            compute_wallet_delta(&inn, LedgerAction::Create),
            delta("CASH", 100_000, 0)
        );

        let with_margin = tx(TransactionDraft::new("Transfer", TxType::Out, 100_000, "BRI")
            .margin(2_500)
            .internal_transfer("tr"));
        assert_eq!(
            compute_wallet_delta(&with_margin, LedgerAction::Create),
            delta("BRI", -102_500, 0)
        );
    }

    #[test]
    fn legacy_pindah_saldo_ignores_margin() {
        let t = tx(TransactionDraft::new("Pindah Saldo ke BRI", TxType::Out, 30_000, "CASH").margin(900));
        assert_eq!(
            compute_wallet_delta(&t, LedgerAction::Create),
            delta("CASH", -30_000, 0)
        );
    }

    #[test]
    fn fee_and_margin_withdrawal() {
        let fee = tx(TransactionDraft::new("Fee Brilink", TxType::In, 0, "BRILINK").margin(7_500));
        assert_eq!(
            compute_wallet_delta(&fee, LedgerAction::Create),
            delta("BRILINK", 7_500, 0)
        );

        let take = tx(TransactionDraft::new("Penarikan Margin Juni", TxType::Out, 300_000, "BRI"));
        assert_eq!(
            compute_wallet_delta(&take, LedgerAction::Create),
            delta("BRI", 0, -300_000)
        );
    }

    #[test]
    fn special_categories_use_generic_rule() {
        let interest = tx(TransactionDraft::new("Bunga Bank", TxType::In, 0, "BRI").margin(1_234));
        assert_eq!(
            compute_wallet_delta(&interest, LedgerAction::Create),
            delta("BRI", 1_234, 0)
        );
        let modal = tx(TransactionDraft::new("Tambah Modal", TxType::In, 1_000_000, "CASH"));
        assert_eq!(
            compute_wallet_delta(&modal, LedgerAction::Create),
            delta("CASH", 1_000_000, -1_000_000)
        );
    }

    #[test]
    fn delete_negates_create() {
        let t = tx(TransactionDraft::new("Tarik Tunai", TxType::In, 50_000, "BRILINK")
            .margin(5_000)
            .margin_type(MarginType::Luar));
        assert_eq!(
            compute_wallet_delta(&t, LedgerAction::Delete),
            delta("BRILINK", -50_000, 45_000)
        );
    }

    #[test]
    fn missing_wallet_is_a_noop() {
        let t = tx(TransactionDraft::new("Pulsa", TxType::Out, 10_000, ""));
        let d = compute_wallet_delta(&t, LedgerAction::Create);
        assert_eq!(d, WalletDelta::default());
        assert!(d.is_noop());
    }
}
