//! Wallet to wallet transfers.
//!
//! A transfer is stored as two transactions sharing a `transfer_id`:
//!
//! - an OUT leg on the source wallet, `amount = transfer + fee`
//! - an IN leg on the destination wallet, `amount = transfer`
//!
//! Both legs are internal transfers, so the rules engine never touches the
//! cash drawer for them. For listings the pair is merged into a
//! [`TransferView`], which is read-only: there is no way to turn it back into
//! a draft.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{
    EngineError, ResultEngine, Transaction, TransactionDraft, TxType,
    reconcile::WalletDeltas,
    transactions::MAX_AMOUNT,
    rules::{LedgerAction, compute_wallet_delta},
};

pub const TRANSFER_DESCRIPTION: &str = "Pindah Saldo";
pub const TRANSFER_CUSTOMER: &str = "Internal";

/// What the user asks for when moving money between wallets.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransferRequest {
    pub from_wallet: String,
    pub to_wallet: String,
    pub amount: i64,
    pub fee: i64,
    pub date: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

impl TransferRequest {
    #[must_use]
    pub fn new(from_wallet: impl Into<String>, to_wallet: impl Into<String>, amount: i64) -> Self {
        Self {
            from_wallet: from_wallet.into(),
            to_wallet: to_wallet.into(),
            amount,
            fee: 0,
            date: None,
            notes: None,
        }
    }

    #[must_use]
    pub fn fee(mut self, fee: i64) -> Self {
        self.fee = fee;
        self
    }

    #[must_use]
    pub fn date(mut self, date: DateTime<Utc>) -> Self {
        self.date = Some(date);
        self
    }

    #[must_use]
    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Amount leaving the source wallet.
    pub fn out_amount(&self) -> i64 {
        self.amount + self.fee
    }

    /// Checks everything that does not need wallet balances.
    pub fn validate(&self) -> ResultEngine<()> {
        if self.from_wallet.trim().is_empty() || self.to_wallet.trim().is_empty() {
            return Err(EngineError::Validation(
                "transfer requires source and destination wallets".to_string(),
            ));
        }
        if self.from_wallet == self.to_wallet {
            return Err(EngineError::Validation(
                "from_wallet and to_wallet must differ".to_string(),
            ));
        }
        if self.amount <= 0 {
            return Err(EngineError::InvalidAmount(
                "transfer amount must be > 0".to_string(),
            ));
        }
        if self.fee < 0 {
            return Err(EngineError::InvalidAmount("fee must be >= 0".to_string()));
        }
        if self.amount > MAX_AMOUNT || self.fee > MAX_AMOUNT {
            return Err(EngineError::InvalidAmount(format!(
                "transfer amount and fee must be <= {MAX_AMOUNT}"
            )));
        }
        Ok(())
    }
}

/// Builds the OUT and IN legs of a transfer.
pub fn transfer_legs(
    request: &TransferRequest,
    transfer_id: &str,
) -> (TransactionDraft, TransactionDraft) {
    let leg = |tx_type: TxType, amount: i64, wallet: &str| {
        let mut draft = TransactionDraft::new(TRANSFER_DESCRIPTION, tx_type, amount, wallet)
            .customer(TRANSFER_CUSTOMER)
            .internal_transfer(transfer_id);
        draft.date = request.date;
        draft.notes = request.notes.clone();
        draft
    };

    (
        leg(TxType::Out, request.out_amount(), &request.from_wallet),
        leg(TxType::In, request.amount, &request.to_wallet),
    )
}

/// Both stored legs of a transfer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransferPair {
    pub out_leg: Transaction,
    pub in_leg: Transaction,
}

impl TransferPair {
    pub fn transfer_id(&self) -> &str {
        self.out_leg.transfer_id.as_deref().unwrap_or_default()
    }

    pub fn fee(&self) -> i64 {
        self.out_leg.amount + self.out_leg.margin - self.in_leg.amount
    }

    pub fn ids(&self) -> [&str; 2] {
        [self.out_leg.id.as_str(), self.in_leg.id.as_str()]
    }
}

/// Looks up both legs of `transfer_id`.
///
/// A single leg, two legs with the same direction, or more than two legs are
/// reported as [`EngineError::InconsistentState`].
pub fn find_transfer_pair<'a>(
    transactions: impl IntoIterator<Item = &'a Transaction>,
    transfer_id: &str,
) -> ResultEngine<TransferPair> {
    let legs: Vec<&Transaction> = transactions
        .into_iter()
        .filter(|tx| tx.is_internal_transfer && tx.transfer_id.as_deref() == Some(transfer_id))
        .collect();

    match legs.as_slice() {
        [] => Err(EngineError::KeyNotFound(format!("transfer {transfer_id}"))),
        [only] => Err(EngineError::InconsistentState(format!(
            "transfer {transfer_id} has a single leg ({})",
            only.id
        ))),
        [a, b] => match (a.tx_type, b.tx_type) {
            (TxType::Out, TxType::In) => Ok(TransferPair {
                out_leg: (*a).clone(),
                in_leg: (*b).clone(),
            }),
            (TxType::In, TxType::Out) => Ok(TransferPair {
                out_leg: (*b).clone(),
                in_leg: (*a).clone(),
            }),
            _ => Err(EngineError::InconsistentState(format!(
                "transfer {transfer_id} legs have the same direction"
            ))),
        },
        more => Err(EngineError::InconsistentState(format!(
            "transfer {transfer_id} has {} legs",
            more.len()
        ))),
    }
}

/// Wallet changes of creating a transfer.
pub fn transfer_create_deltas(request: &TransferRequest) -> WalletDeltas {
    let mut deltas = WalletDeltas::new();
    deltas.add(&request.from_wallet, -request.out_amount());
    deltas.add(&request.to_wallet, request.amount);
    deltas
}

/// Wallet changes of deleting a stored transfer.
pub fn transfer_delete_deltas(pair: &TransferPair) -> WalletDeltas {
    let mut deltas = WalletDeltas::new();
    deltas.add_delta(&compute_wallet_delta(&pair.out_leg, LedgerAction::Delete));
    deltas.add_delta(&compute_wallet_delta(&pair.in_leg, LedgerAction::Delete));
    deltas
}

/// Wallet changes of replacing a stored transfer with `request`.
///
/// Source and destination may both change, so the effects are accumulated
/// per wallet id.
pub fn transfer_edit_deltas(pair: &TransferPair, request: &TransferRequest) -> WalletDeltas {
    let mut deltas = transfer_delete_deltas(pair);
    for (wallet_id, delta) in transfer_create_deltas(request).iter() {
        deltas.add(wallet_id, delta);
    }
    deltas
}

/// A transfer pair merged into one row for listings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferView {
    pub transfer_id: String,
    pub date: DateTime<Utc>,
    pub wallet: String,
    pub to_wallet: String,
    /// Amount received by the destination.
    pub amount: i64,
    /// Fee paid on top, `out - in`.
    pub margin: i64,
    pub customer: String,
    pub notes: Option<String>,
    pub leg_ids: [String; 2],
}

pub fn combine_for_display(pair: &TransferPair) -> TransferView {
    TransferView {
        transfer_id: pair.transfer_id().to_string(),
        date: pair.out_leg.date,
        wallet: pair.out_leg.wallet.clone(),
        to_wallet: pair.in_leg.wallet.clone(),
        amount: pair.in_leg.amount,
        margin: pair.fee(),
        customer: pair.out_leg.customer.clone(),
        notes: pair.out_leg.notes.clone(),
        leg_ids: [pair.out_leg.id.clone(), pair.in_leg.id.clone()],
    }
}

/// One row of the transaction list.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "row", rename_all = "snake_case")]
pub enum DisplayRow {
    Single(Transaction),
    Transfer(TransferView),
}

impl DisplayRow {
    pub fn date(&self) -> DateTime<Utc> {
        match self {
            Self::Single(tx) => tx.date,
            Self::Transfer(view) => view.date,
        }
    }
}

/// Merges transfer pairs for presentation, newest first.
///
/// Legs whose sibling is missing stay as single rows so they remain visible.
/// Transactions flagged `is_deleting` are skipped.
pub fn display_rows(transactions: &[Transaction]) -> Vec<DisplayRow> {
    let visible: Vec<&Transaction> = transactions.iter().filter(|tx| !tx.is_deleting).collect();
    let mut merged: Vec<&str> = Vec::new();
    let mut rows = Vec::with_capacity(visible.len());

    for tx in &visible {
        match (tx.is_internal_transfer, tx.transfer_id.as_deref()) {
            (true, Some(transfer_id)) => {
                if merged.contains(&transfer_id) {
                    continue;
                }
                match find_transfer_pair(visible.iter().copied(), transfer_id) {
                    Ok(pair) => {
                        merged.push(transfer_id);
                        rows.push(DisplayRow::Transfer(combine_for_display(&pair)));
                    }
                    Err(_) => rows.push(DisplayRow::Single((*tx).clone())),
                }
            }
            _ => rows.push(DisplayRow::Single((*tx).clone())),
        }
    }

    rows.sort_by(|a, b| b.date().cmp(&a.date()));
    rows
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn materialize(id: &str, draft: TransactionDraft) -> Transaction {
        Transaction::from_draft(id, Utc.timestamp_opt(1_700_000_000, 0).unwrap(), draft)
    }

    fn stored_pair(request: &TransferRequest, transfer_id: &str) -> TransferPair {
        let (out, inn) = transfer_legs(request, transfer_id);
        TransferPair {
            out_leg: materialize("out", out),
            in_leg: materialize("in", inn),
        }
    }

    #[test]
    fn legs_carry_fee_on_the_out_side() {
        let request = TransferRequest::new("BRI", "CASH", 100_000).fee(2_500);
        let (out, inn) = transfer_legs(&request, "tr-1");
        assert_eq!(out.tx_type, TxType::Out);
        assert_eq!(out.amount, 102_500);
        assert_eq!(out.margin, 0);
        assert_eq!(out.wallet, "BRI");
        assert_eq!(inn.tx_type, TxType::In);
        assert_eq!(inn.amount, 100_000);
        assert_eq!(inn.wallet, "CASH");
        for leg in [&out, &inn] {
            assert!(leg.is_internal_transfer);
            assert_eq!(leg.transfer_id.as_deref(), Some("tr-1"));
            assert_eq!(leg.customer, TRANSFER_CUSTOMER);
        }
    }

    #[test]
    fn oversized_amounts_are_rejected() {
        let huge = TransferRequest::new("BRI", "DANA", i64::MAX).fee(1);
        assert!(matches!(huge.validate(), Err(EngineError::InvalidAmount(_))));

        let huge_fee = TransferRequest::new("BRI", "DANA", 1).fee(i64::MAX);
        assert!(matches!(huge_fee.validate(), Err(EngineError::InvalidAmount(_))));

        let largest = TransferRequest::new("BRI", "DANA", MAX_AMOUNT).fee(MAX_AMOUNT);
        assert!(largest.validate().is_ok());
        assert_eq!(largest.out_amount(), 2 * MAX_AMOUNT);
    }

    #[test]
    fn create_and_delete_cancel_out() {
        let request = TransferRequest::new("BRI", "DANA", 40_000).fee(1_000);
        let created = transfer_create_deltas(&request);
        assert_eq!(created.get("BRI"), -41_000);
        assert_eq!(created.get("DANA"), 40_000);
        assert_eq!(created.get("CASH"), 0);

        let deleted = transfer_delete_deltas(&stored_pair(&request, "tr"));
        assert_eq!(deleted.get("BRI"), 41_000);
        assert_eq!(deleted.get("DANA"), -40_000);
        assert!(deleted.wallet_ids().all(|id| id != "CASH"));
    }

    #[test]
    fn edit_accumulates_by_wallet() {
        let original = TransferRequest::new("BRI", "DANA", 40_000).fee(1_000);
        let pair = stored_pair(&original, "tr");
        let updated = TransferRequest::new("BRI", "CASH", 50_000);
        let deltas = transfer_edit_deltas(&pair, &updated).pruned();
        assert_eq!(deltas.get("BRI"), 41_000 - 50_000);
        assert_eq!(deltas.get("DANA"), -40_000);
        assert_eq!(deltas.get("CASH"), 50_000);
    }

    #[test]
    fn single_leg_is_inconsistent() {
        let request = TransferRequest::new("BRI", "DANA", 40_000);
        let pair = stored_pair(&request, "tr");
        let only_out = vec![pair.out_leg.clone()];
        assert!(matches!(
            find_transfer_pair(&only_out, "tr"),
            Err(EngineError::InconsistentState(_))
        ));
        assert!(matches!(
            find_transfer_pair(&only_out, "missing"),
            Err(EngineError::KeyNotFound(_))
        ));

        let both_out = vec![pair.out_leg.clone(), pair.out_leg.clone()];
        assert!(matches!(
            find_transfer_pair(&both_out, "tr"),
            Err(EngineError::InconsistentState(_))
        ));
    }

    #[test]
    fn pair_lookup_is_order_independent() {
        let request = TransferRequest::new("BRI", "DANA", 40_000).fee(500);
        let pair = stored_pair(&request, "tr");
        let reversed = vec![pair.in_leg.clone(), pair.out_leg.clone()];
        let found = find_transfer_pair(&reversed, "tr").unwrap();
        assert_eq!(found, pair);
        assert_eq!(found.fee(), 500);
    }

    #[test]
    fn display_merges_pairs_and_keeps_orphans() {
        let pair = stored_pair(&TransferRequest::new("BRI", "DANA", 40_000).fee(500), "tr");
        let mut orphan = stored_pair(&TransferRequest::new("BRI", "CASH", 10_000), "lonely").out_leg;
        orphan.id = "orphan".to_string();
        let regular = materialize(
            "pulsa",
            TransactionDraft::new("Pulsa", TxType::Out, 10_000, "BRI"),
        );

        let rows = display_rows(&[pair.out_leg.clone(), regular, pair.in_leg.clone(), orphan]);
        assert_eq!(rows.len(), 3);
        let transfer = rows
            .iter()
            .find_map(|row| match row {
                DisplayRow::Transfer(view) => Some(view),
                DisplayRow::Single(_) => None,
            })
            .unwrap();
        assert_eq!(transfer.wallet, "BRI");
        assert_eq!(transfer.to_wallet, "DANA");
        assert_eq!(transfer.amount, 40_000);
        assert_eq!(transfer.margin, 500);
    }

    #[test]
    fn request_validation() {
        assert!(TransferRequest::new("BRI", "BRI", 1).validate().is_err());
        assert!(TransferRequest::new("BRI", "CASH", 0).validate().is_err());
        assert!(TransferRequest::new("BRI", "CASH", 10).fee(-1).validate().is_err());
        assert!(TransferRequest::new("", "CASH", 10).validate().is_err());
        assert!(TransferRequest::new("BRI", "CASH", 10).validate().is_ok());
    }
}
