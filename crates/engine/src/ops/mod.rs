use std::{collections::HashMap, sync::Arc, time::Duration};

use tokio::sync::Mutex;

use crate::{LedgerStore, ResultEngine, Wallet, wallets::NewWallet};

mod balances;
mod deletes;
mod ledger;
mod transactions;
mod transfers;
mod wallets;

pub use deletes::{DeleteOutcome, DeleteState, PendingDelete};
pub use ledger::Ledger;

use deletes::PendingEntry;

/// Default undo window of a delete.
pub const DEFAULT_DELETE_GRACE: Duration = Duration::from_millis(5000);

/// Orchestrates store calls and keeps the in-memory mirror in sync.
///
/// Each mutating operation follows the same order: compute wallet deltas,
/// persist the transaction change, persist the new wallet balances, update
/// the mirror. A failing store call aborts the steps after it and the error
/// is returned to the caller.
///
/// Cloning is cheap and shares the same state.
#[derive(Clone)]
pub struct Engine {
    store: Arc<dyn LedgerStore>,
    ledger: Arc<Mutex<Ledger>>,
    pending: Arc<Mutex<HashMap<String, PendingEntry>>>,
    grace_period: Duration,
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("grace_period", &self.grace_period)
            .finish_non_exhaustive()
    }
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    pub fn grace_period(&self) -> Duration {
        self.grace_period
    }

    /// Copy of the whole mirror, including transactions pending deletion.
    pub async fn snapshot(&self) -> Ledger {
        self.ledger.lock().await.clone()
    }

    /// Replaces the mirror with fresh data from the store.
    pub async fn reload(&self) -> ResultEngine<()> {
        let fresh = Ledger::load(self.store.as_ref()).await?;
        let mut ledger = self.ledger.lock().await;
        let deleting: Vec<String> = ledger
            .transactions()
            .iter()
            .filter(|tx| tx.is_deleting)
            .map(|tx| tx.id.clone())
            .collect();
        *ledger = fresh;
        ledger.set_deleting(&deleting, true);
        Ok(())
    }
}

fn normalize_required_name(value: &str, label: &str) -> ResultEngine<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(crate::EngineError::Validation(format!(
            "{label} name must not be empty"
        )));
    }
    Ok(trimmed.to_string())
}

fn normalize_optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

/// The builder for `Engine`
pub struct EngineBuilder {
    store: Option<Arc<dyn LedgerStore>>,
    grace_period: Duration,
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self {
            store: None,
            grace_period: DEFAULT_DELETE_GRACE,
        }
    }
}

impl EngineBuilder {
    /// Pass the required store
    pub fn store(mut self, store: impl LedgerStore + 'static) -> EngineBuilder {
        self.store = Some(Arc::new(store));
        self
    }

    /// Undo window of deletes, 5 seconds by default.
    pub fn grace_period(mut self, grace_period: Duration) -> EngineBuilder {
        self.grace_period = grace_period;
        self
    }

    /// Construct `Engine`, loading the mirror and creating the cash wallet
    /// when the store has none.
    pub async fn build(self) -> ResultEngine<Engine> {
        let store = self
            .store
            .ok_or_else(|| crate::EngineError::Validation("store is required".to_string()))?;

        let mut ledger = Ledger::load(store.as_ref()).await?;
        if ledger.wallet(crate::CASH_WALLET_ID).is_err() {
            let cash = Wallet::cash();
            let created = store
                .create_wallet(NewWallet::new(cash.name, cash.balance).id(cash.id))
                .await?;
            tracing::info!(wallet_id = %created.id, "created cash wallet");
            ledger.insert_wallet(created);
        }

        Ok(Engine {
            store,
            ledger: Arc::new(Mutex::new(ledger)),
            pending: Arc::new(Mutex::new(HashMap::new())),
            grace_period: self.grace_period,
        })
    }
}
