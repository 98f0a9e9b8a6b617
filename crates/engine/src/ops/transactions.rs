use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::{
    CASH_WALLET_ID, EngineError, ResultEngine, Transaction, TransactionDraft, TransactionPatch,
    TxType, Wallet, kinds,
    reconcile::{WalletDeltas, reconcile_edit},
    rules::{LedgerAction, SettleAction, compute_settle_delta, compute_wallet_delta},
    transfer::{DisplayRow, TRANSFER_CUSTOMER, display_rows},
};

use super::{Engine, Ledger, normalize_optional_text, normalize_required_name};

impl Engine {
    pub async fn wallets(&self) -> Vec<Wallet> {
        self.ledger.lock().await.wallets().to_vec()
    }

    pub async fn wallet(&self, wallet_id: &str) -> ResultEngine<Wallet> {
        self.ledger.lock().await.wallet(wallet_id).cloned()
    }

    /// Transactions visible to the user (pending deletes are hidden).
    pub async fn transactions(&self) -> Vec<Transaction> {
        self.ledger
            .lock()
            .await
            .visible_transactions()
            .cloned()
            .collect()
    }

    pub async fn transaction(&self, id: &str) -> ResultEngine<Transaction> {
        self.ledger.lock().await.transaction(id).cloned()
    }

    pub async fn categories(&self) -> Vec<String> {
        self.ledger.lock().await.categories().to_vec()
    }

    /// Listing rows with transfer pairs merged, newest first.
    pub async fn display_transactions(&self) -> Vec<DisplayRow> {
        display_rows(self.ledger.lock().await.transactions())
    }

    /// Records a new transaction and applies its wallet effect.
    ///
    /// The effect is computed from the record returned by the store, not from
    /// the draft.
    pub async fn create_transaction(&self, draft: TransactionDraft) -> ResultEngine<Transaction> {
        draft.validate()?;
        if draft.is_internal_transfer {
            return Err(EngineError::Validation(
                "internal transfers are created with create_transfer".to_string(),
            ));
        }

        let mut ledger = self.ledger.lock().await;
        ledger.wallet(&draft.wallet)?;

        let tx = self.store.create_transaction(draft).await?;
        let delta = compute_wallet_delta(&tx, LedgerAction::Create);
        ledger.push_transaction(tx.clone());

        if let Err(err) = self
            .apply_wallet_deltas(&mut ledger, WalletDeltas::from(&delta))
            .await
        {
            warn!(transaction_id = %tx.id, "transaction saved but wallet update failed");
            return Err(err);
        }

        info!(transaction_id = %tx.id, kind = tx.kind().as_str(), "transaction created");
        Ok(tx)
    }

    /// Replaces a transaction and reconciles wallets: the old effect is
    /// reverted and the new one applied, even across different wallets.
    pub async fn update_transaction(
        &self,
        id: &str,
        draft: TransactionDraft,
    ) -> ResultEngine<Transaction> {
        draft.validate()?;
        if draft.is_internal_transfer {
            return Err(EngineError::Validation(
                "a transaction cannot become a transfer leg".to_string(),
            ));
        }

        let mut ledger = self.ledger.lock().await;
        let original = editable(&ledger, id)?;
        if original.is_internal_transfer {
            return Err(EngineError::Validation(
                "transfer legs are edited with edit_transfer".to_string(),
            ));
        }
        ledger.wallet(&draft.wallet)?;

        let updated = self
            .store
            .update_transaction(id, TransactionPatch::full(&draft))
            .await?;
        let deltas = reconcile_edit(&original, &updated);
        ledger.replace_transaction(updated.clone());

        if let Err(err) = self.apply_wallet_deltas(&mut ledger, deltas).await {
            warn!(transaction_id = %id, "transaction updated but wallet reconciliation failed");
            return Err(err);
        }

        info!(transaction_id = %id, "transaction updated");
        Ok(updated)
    }

    /// Collects an outstanding receivable: clears `is_piutang`, stamps
    /// `settled_at` and brings `amount + margin` into the cash drawer.
    pub async fn settle_receivable(&self, id: &str) -> ResultEngine<Transaction> {
        let mut ledger = self.ledger.lock().await;
        let tx = editable(&ledger, id)?;
        if !tx.is_piutang {
            return Err(EngineError::Validation(format!(
                "transaction {id} is not an outstanding receivable"
            )));
        }
        self.change_settlement(&mut ledger, &tx, SettleAction::Settle)
            .await
    }

    /// Undoes [`Engine::settle_receivable`].
    ///
    /// Only transactions carrying a `settled_at` qualify; anything that was
    /// never a receivable is rejected.
    pub async fn revert_settlement(&self, id: &str) -> ResultEngine<Transaction> {
        let mut ledger = self.ledger.lock().await;
        let tx = editable(&ledger, id)?;
        if tx.is_piutang || tx.settled_at.is_none() {
            return Err(EngineError::Validation(format!(
                "transaction {id} is not a settled receivable"
            )));
        }
        self.change_settlement(&mut ledger, &tx, SettleAction::RevertSettle)
            .await
    }

    async fn change_settlement(
        &self,
        ledger: &mut Ledger,
        tx: &Transaction,
        action: SettleAction,
    ) -> ResultEngine<Transaction> {
        let patch = match action {
            SettleAction::Settle => TransactionPatch::settled(Utc::now()),
            SettleAction::RevertSettle => TransactionPatch::unsettled(),
        };
        let updated = self.store.update_transaction(&tx.id, patch).await?;
        ledger.replace_transaction(updated.clone());

        let mut deltas = WalletDeltas::new();
        deltas.add(CASH_WALLET_ID, compute_settle_delta(tx, action));
        if let Err(err) = self.apply_wallet_deltas(ledger, deltas).await {
            warn!(transaction_id = %tx.id, ?action, "receivable flag saved but cash update failed");
            return Err(err);
        }

        info!(transaction_id = %tx.id, ?action, "receivable settlement changed");
        Ok(updated)
    }

    /// Records the BRILink fee credited to `wallet`.
    pub async fn record_brilink_fee(
        &self,
        wallet: &str,
        fee: i64,
        date: Option<DateTime<Utc>>,
    ) -> ResultEngine<Transaction> {
        positive(fee, "fee")?;
        let mut draft = TransactionDraft::new(kinds::FEE_BRILINK, TxType::In, 0, wallet)
            .margin(fee)
            .customer("Brilink");
        draft.date = date;
        self.create_transaction(draft).await
    }

    /// Records the cost of a reward handed to a customer, paid from cash.
    pub async fn record_reward(
        &self,
        reward: &str,
        cost: i64,
        customer: Option<&str>,
        date: Option<DateTime<Utc>>,
    ) -> ResultEngine<Transaction> {
        positive(cost, "reward cost")?;
        let reward = normalize_required_name(reward, "reward")?;
        let mut draft = TransactionDraft::new(
            format!("{} {reward}", kinds::REWARD_PREFIX),
            TxType::Out,
            cost,
            CASH_WALLET_ID,
        )
        .customer(normalize_optional_text(customer).unwrap_or_else(|| "Pelanggan".to_string()));
        draft.date = date;
        self.create_transaction(draft).await
    }

    /// Takes accumulated margin out of the cash drawer.
    pub async fn withdraw_margin(
        &self,
        label: Option<&str>,
        amount: i64,
        date: Option<DateTime<Utc>>,
    ) -> ResultEngine<Transaction> {
        positive(amount, "withdrawal")?;
        let description = match normalize_optional_text(label) {
            Some(label) => format!("{} {label}", kinds::PENARIKAN_MARGIN_PREFIX),
            None => kinds::PENARIKAN_MARGIN_PREFIX.to_string(),
        };
        let mut draft = TransactionDraft::new(description, TxType::Out, amount, CASH_WALLET_ID)
            .customer(TRANSFER_CUSTOMER);
        draft.date = date;
        self.create_transaction(draft).await
    }

    /// Records interest paid by the bank into `wallet`.
    pub async fn record_bank_interest(
        &self,
        wallet: &str,
        interest: i64,
        date: Option<DateTime<Utc>>,
    ) -> ResultEngine<Transaction> {
        positive(interest, "interest")?;
        let mut draft = TransactionDraft::new(kinds::BUNGA_BANK, TxType::In, 0, wallet)
            .margin(interest)
            .customer(TRANSFER_CUSTOMER);
        draft.date = date;
        self.create_transaction(draft).await
    }
}

/// Mirrored transaction that is not waiting for its delete.
fn editable(ledger: &Ledger, id: &str) -> ResultEngine<Transaction> {
    let tx = ledger.transaction(id)?;
    if tx.is_deleting {
        return Err(EngineError::Validation(format!(
            "transaction {id} is pending deletion"
        )));
    }
    Ok(tx.clone())
}

fn positive(value: i64, label: &str) -> ResultEngine<()> {
    if value <= 0 {
        return Err(EngineError::InvalidAmount(format!("{label} must be > 0")));
    }
    Ok(())
}
