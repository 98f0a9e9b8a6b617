//! Deletes with an undo window.
//!
//! A delete first hides the transaction (`is_deleting`) and starts a timer.
//! Nothing reaches the store until the timer fires; an undo before that
//! restores the transaction without a single store call. The pending entry
//! holds one cancel sender: whichever of undo and commit takes it decides
//! the outcome.
//!
//! ```text
//! Active -> PendingDelete -> Cancelled   (undo took the sender)
//!                         -> Committed   (timer fired, delete persisted)
//!                         -> Active      (timer fired, delete failed)
//! ```

use serde::Serialize;
use tokio::{sync::oneshot, task::JoinHandle};
use tracing::{info, warn};

use crate::{
    EngineError, ResultEngine, Transaction,
    reconcile::WalletDeltas,
    rules::{LedgerAction, compute_wallet_delta},
    transfer::find_transfer_pair,
};

use super::{Engine, Ledger};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeleteState {
    Active,
    PendingDelete,
    Cancelled,
    Committed,
}

/// How a scheduled delete ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeleteOutcome {
    Cancelled,
    Committed,
}

#[derive(Debug)]
pub(crate) struct PendingEntry {
    state: DeleteState,
    /// Taken exactly once, by either the undo or the commit.
    cancel: Option<oneshot::Sender<()>>,
    ids: Vec<String>,
    transfer_id: Option<String>,
}

impl PendingEntry {
    fn covers(&self, id: &str) -> bool {
        self.ids.iter().any(|candidate| candidate == id)
    }
}

/// Handle on a scheduled delete.
///
/// Dropping it does not cancel anything; use [`Engine::undo_delete`].
#[derive(Debug)]
pub struct PendingDelete {
    transaction_id: String,
    handle: JoinHandle<ResultEngine<DeleteOutcome>>,
}

impl PendingDelete {
    pub fn transaction_id(&self) -> &str {
        &self.transaction_id
    }

    /// Waits for the undo window to close.
    pub async fn outcome(self) -> ResultEngine<DeleteOutcome> {
        self.handle
            .await
            .map_err(|err| EngineError::Task(err.to_string()))?
    }
}

impl Engine {
    /// Hides `id` and deletes it once the grace period elapses.
    ///
    /// A transfer leg schedules the whole pair. A leg without its sibling is
    /// rejected with [`EngineError::InconsistentState`].
    pub async fn schedule_delete(&self, id: &str) -> ResultEngine<PendingDelete> {
        let (ids, transfer_id) = {
            let mut ledger = self.ledger.lock().await;
            let tx = ledger.transaction(id)?;
            if tx.is_deleting {
                return Err(EngineError::Validation(format!(
                    "transaction {id} is already pending deletion"
                )));
            }
            let (ids, transfer_id) = match (tx.is_internal_transfer, tx.transfer_id.clone()) {
                (true, Some(transfer_id)) => {
                    let pair = find_transfer_pair(ledger.transactions(), &transfer_id)?;
                    let ids = pair.ids().map(ToString::to_string).to_vec();
                    (ids, Some(transfer_id))
                }
                _ => (vec![tx.id.clone()], None),
            };
            ledger.set_deleting(&ids, true);
            (ids, transfer_id)
        };

        let (cancel, cancelled) = oneshot::channel();
        {
            let mut pending = self.pending.lock().await;
            pending.retain(|_, entry| !ids.iter().any(|leg| entry.covers(leg)));
            pending.insert(
                id.to_string(),
                PendingEntry {
                    state: DeleteState::PendingDelete,
                    cancel: Some(cancel),
                    ids,
                    transfer_id,
                },
            );
        }

        let engine = self.clone();
        let key = id.to_string();
        let grace_period = self.grace_period;
        let handle = tokio::spawn(async move {
            tokio::select! {
                () = tokio::time::sleep(grace_period) => engine.commit_delete(&key).await,
                _ = cancelled => Ok(DeleteOutcome::Cancelled),
            }
        });

        info!(transaction_id = %id, ?grace_period, "delete scheduled");
        Ok(PendingDelete {
            transaction_id: id.to_string(),
            handle,
        })
    }

    /// Cancels a scheduled delete of `id` (or of its transfer sibling).
    ///
    /// Fails once the commit has started.
    pub async fn undo_delete(&self, id: &str) -> ResultEngine<()> {
        let ids = {
            let mut pending = self.pending.lock().await;
            let entry = pending
                .values_mut()
                .find(|entry| entry.covers(id) && entry.state == DeleteState::PendingDelete)
                .ok_or_else(|| {
                    EngineError::Validation(format!("no pending delete for transaction {id}"))
                })?;
            let Some(cancel) = entry.cancel.take() else {
                return Err(EngineError::Validation(format!(
                    "delete of transaction {id} already started"
                )));
            };
            // The timer may already be gone; commit finds no sender and backs off.
            let _ = cancel.send(());
            entry.state = DeleteState::Cancelled;
            entry.ids.clone()
        };

        self.ledger.lock().await.set_deleting(&ids, false);
        info!(transaction_id = %id, "delete undone");
        Ok(())
    }

    /// State of the last delete requested for `id`.
    pub async fn pending_state(&self, id: &str) -> DeleteState {
        self.pending
            .lock()
            .await
            .values()
            .find(|entry| entry.covers(id))
            .map_or(DeleteState::Active, |entry| entry.state)
    }

    async fn commit_delete(&self, key: &str) -> ResultEngine<DeleteOutcome> {
        let (ids, transfer_id) = {
            let mut pending = self.pending.lock().await;
            let Some(entry) = pending.get_mut(key) else {
                return Ok(DeleteOutcome::Cancelled);
            };
            // An undo that took the sender first wins.
            if entry.cancel.take().is_none() {
                return Ok(DeleteOutcome::Cancelled);
            }
            (entry.ids.clone(), entry.transfer_id.clone())
        };

        let result = {
            let mut ledger = self.ledger.lock().await;
            let result = match transfer_id.as_deref() {
                Some(transfer_id) => match find_transfer_pair(ledger.transactions(), transfer_id) {
                    Ok(pair) => self.delete_pair(&mut ledger, &pair).await,
                    Err(err) => Err(err),
                },
                None => match ledger.transaction(key).cloned() {
                    Ok(tx) => self.delete_single(&mut ledger, &tx).await,
                    Err(err) => Err(err),
                },
            };
            // Records that survived the failure become visible again.
            let restored = result.is_err() && ids.iter().any(|id| ledger.transaction(id).is_ok());
            if restored {
                ledger.set_deleting(&ids, false);
            }
            result.map_err(|err| (err, restored))
        };

        let mut pending = self.pending.lock().await;
        match result {
            Ok(()) => {
                if let Some(entry) = pending.get_mut(key) {
                    entry.state = DeleteState::Committed;
                }
                info!(transaction_id = %key, "delete committed");
                Ok(DeleteOutcome::Committed)
            }
            Err((err, restored)) => {
                if restored {
                    pending.remove(key);
                    warn!(transaction_id = %key, error = %err, "delete failed, transaction restored");
                } else if let Some(entry) = pending.get_mut(key) {
                    entry.state = DeleteState::Committed;
                    warn!(transaction_id = %key, error = %err, "delete persisted but wallet update failed");
                }
                Err(err)
            }
        }
    }

    /// Deletes one stored transaction and reverts its wallet effect.
    async fn delete_single(&self, ledger: &mut Ledger, tx: &Transaction) -> ResultEngine<()> {
        self.store.delete_transaction(&tx.id).await?;
        ledger.remove_transaction(&tx.id);
        let delta = compute_wallet_delta(tx, LedgerAction::Delete);
        self.apply_wallet_deltas(ledger, WalletDeltas::from(&delta))
            .await
    }
}
