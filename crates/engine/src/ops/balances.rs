use futures::future::try_join_all;
use tracing::{debug, warn};

use crate::{ResultEngine, reconcile::WalletDeltas};

use super::{Engine, Ledger};

impl Engine {
    /// Persists the new balance of every wallet touched by `deltas`, then
    /// updates the mirror.
    ///
    /// Writes go out concurrently and are joined before the mirror changes,
    /// so callers never observe a half-applied set. Zero deltas are skipped.
    pub(super) async fn apply_wallet_deltas(
        &self,
        ledger: &mut Ledger,
        deltas: WalletDeltas,
    ) -> ResultEngine<()> {
        let deltas = deltas.pruned();
        if deltas.is_empty() {
            return Ok(());
        }

        let balances = ledger.balances_after(&deltas)?;
        debug!(?deltas, "applying wallet deltas");

        let writes = balances
            .iter()
            .map(|(wallet_id, balance)| self.store.update_wallet_balance(wallet_id, *balance));

        match try_join_all(writes).await {
            Ok(_) => {
                ledger.set_balances(&balances);
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, "wallet balance update failed, balances may be partially applied");
                self.resync_wallets(ledger).await;
                Err(err)
            }
        }
    }

    /// Reloads wallet balances after a failed fan-out so the mirror matches
    /// whatever the store accepted.
    async fn resync_wallets(&self, ledger: &mut Ledger) {
        match self.store.get_wallets().await {
            Ok(wallets) => ledger.set_wallets(wallets),
            Err(err) => warn!(error = %err, "could not reload wallets after failure"),
        }
    }
}
