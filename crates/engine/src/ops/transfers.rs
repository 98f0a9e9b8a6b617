use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    EngineError, ResultEngine, TransactionPatch,
    transfer::{
        TransferPair, TransferRequest, find_transfer_pair, transfer_create_deltas,
        transfer_delete_deltas, transfer_edit_deltas, transfer_legs,
    },
};

use super::{Engine, Ledger};

impl Engine {
    /// Moves `amount` from one wallet to another, the fee being paid by the
    /// source. Persists the OUT leg, then the IN leg, then both balances.
    pub async fn create_transfer(&self, request: TransferRequest) -> ResultEngine<TransferPair> {
        request.validate()?;
        let request = TransferRequest {
            date: Some(request.date.unwrap_or_else(Utc::now)),
            ..request
        };

        let mut ledger = self.ledger.lock().await;
        ledger.wallet(&request.to_wallet)?;
        let available = ledger.wallet(&request.from_wallet)?.balance;
        ensure_funds(available, &request)?;

        let transfer_id = Uuid::new_v4().to_string();
        let (out_draft, in_draft) = transfer_legs(&request, &transfer_id);

        let out_leg = self.store.create_transaction(out_draft).await?;
        ledger.push_transaction(out_leg.clone());
        let in_leg = match self.store.create_transaction(in_draft).await {
            Ok(leg) => leg,
            Err(err) => {
                warn!(%transfer_id, out_leg = %out_leg.id, "transfer OUT leg saved without its IN leg");
                return Err(err);
            }
        };
        ledger.push_transaction(in_leg.clone());

        if let Err(err) = self
            .apply_wallet_deltas(&mut ledger, transfer_create_deltas(&request))
            .await
        {
            warn!(%transfer_id, "transfer saved but wallet update failed");
            return Err(err);
        }

        info!(
            %transfer_id,
            from = %request.from_wallet,
            to = %request.to_wallet,
            amount = request.amount,
            fee = request.fee,
            "transfer created"
        );
        Ok(TransferPair { out_leg, in_leg })
    }

    /// Replaces both legs of `transfer_id`. Source and destination may change.
    pub async fn edit_transfer(
        &self,
        transfer_id: &str,
        request: TransferRequest,
    ) -> ResultEngine<TransferPair> {
        request.validate()?;

        let mut ledger = self.ledger.lock().await;
        let pair = live_pair(&ledger, transfer_id)?;
        ledger.wallet(&request.to_wallet)?;
        let available = ledger.wallet(&request.from_wallet)?.balance
            + transfer_delete_deltas(&pair).get(&request.from_wallet);
        ensure_funds(available, &request)?;

        let request = TransferRequest {
            date: Some(request.date.unwrap_or(pair.out_leg.date)),
            ..request
        };
        let deltas = transfer_edit_deltas(&pair, &request);
        let (out_draft, in_draft) = transfer_legs(&request, transfer_id);

        let out_leg = self
            .store
            .update_transaction(&pair.out_leg.id, TransactionPatch::full(&out_draft))
            .await?;
        ledger.replace_transaction(out_leg.clone());
        let in_leg = match self
            .store
            .update_transaction(&pair.in_leg.id, TransactionPatch::full(&in_draft))
            .await
        {
            Ok(leg) => leg,
            Err(err) => {
                warn!(%transfer_id, "transfer OUT leg updated without its IN leg");
                return Err(err);
            }
        };
        ledger.replace_transaction(in_leg.clone());

        if let Err(err) = self.apply_wallet_deltas(&mut ledger, deltas).await {
            warn!(%transfer_id, "transfer updated but wallet reconciliation failed");
            return Err(err);
        }

        info!(%transfer_id, "transfer updated");
        Ok(TransferPair { out_leg, in_leg })
    }

    /// Deletes both legs right away and restores both wallets.
    pub async fn delete_transfer(&self, transfer_id: &str) -> ResultEngine<()> {
        let mut ledger = self.ledger.lock().await;
        let pair = live_pair(&ledger, transfer_id)?;
        self.delete_pair(&mut ledger, &pair).await?;
        info!(%transfer_id, "transfer deleted");
        Ok(())
    }

    pub(super) async fn delete_pair(
        &self,
        ledger: &mut Ledger,
        pair: &TransferPair,
    ) -> ResultEngine<()> {
        self.store.delete_transaction(&pair.out_leg.id).await?;
        ledger.remove_transaction(&pair.out_leg.id);
        if let Err(err) = self.store.delete_transaction(&pair.in_leg.id).await {
            warn!(
                transfer_id = %pair.transfer_id(),
                in_leg = %pair.in_leg.id,
                "transfer OUT leg deleted, IN leg left behind"
            );
            return Err(err);
        }
        ledger.remove_transaction(&pair.in_leg.id);

        self.apply_wallet_deltas(ledger, transfer_delete_deltas(pair))
            .await
    }
}

/// Both legs of `transfer_id`, neither waiting for a delete.
fn live_pair(ledger: &Ledger, transfer_id: &str) -> ResultEngine<TransferPair> {
    let pair = find_transfer_pair(ledger.transactions(), transfer_id)?;
    if pair.out_leg.is_deleting || pair.in_leg.is_deleting {
        return Err(EngineError::Validation(format!(
            "transfer {transfer_id} is pending deletion"
        )));
    }
    Ok(pair)
}

fn ensure_funds(available: i64, request: &TransferRequest) -> ResultEngine<()> {
    if available < request.out_amount() {
        return Err(EngineError::InsufficientFunds(format!(
            "wallet {} holds {available}, transfer needs {}",
            request.from_wallet,
            request.out_amount()
        )));
    }
    Ok(())
}
