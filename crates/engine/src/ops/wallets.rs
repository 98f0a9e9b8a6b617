use tracing::info;

use crate::{
    CASH_WALLET_ID, EngineError, ResultEngine, Wallet,
    wallets::{NewWallet, WalletUpdate},
};

use super::{Engine, normalize_optional_text, normalize_required_name};

impl Engine {
    /// Adds a wallet with an opening balance.
    ///
    /// Without an explicit id, one is derived from the name (`"Bank BRI"`
    /// becomes `BANKBRI`), falling back to a uuid when taken.
    pub async fn create_wallet(&self, wallet: NewWallet) -> ResultEngine<Wallet> {
        let name = normalize_required_name(&wallet.name, "wallet")?;
        if wallet.balance < 0 {
            return Err(EngineError::InvalidAmount(
                "opening balance must be >= 0".to_string(),
            ));
        }
        let id = normalize_optional_text(wallet.id.as_deref());

        let mut ledger = self.ledger.lock().await;
        if let Some(id) = &id
            && ledger.wallet(id).is_ok()
        {
            return Err(EngineError::ExistingKey(id.clone()));
        }

        let created = self
            .store
            .create_wallet(NewWallet {
                id,
                name,
                balance: wallet.balance,
                icon: normalize_optional_text(wallet.icon.as_deref()),
            })
            .await?;
        ledger.insert_wallet(created.clone());

        info!(wallet_id = %created.id, balance = created.balance, "wallet created");
        Ok(created)
    }

    /// Changes name and/or icon. Balances are never touched here.
    pub async fn update_wallet(&self, wallet_id: &str, update: WalletUpdate) -> ResultEngine<Wallet> {
        let update = WalletUpdate {
            name: update
                .name
                .as_deref()
                .map(|name| normalize_required_name(name, "wallet"))
                .transpose()?,
            icon: update
                .icon
                .map(|icon| normalize_optional_text(icon.as_deref())),
        };

        let mut ledger = self.ledger.lock().await;
        ledger.wallet(wallet_id)?;
        let updated = self.store.update_wallet(wallet_id, update).await?;
        ledger.replace_wallet(updated.clone());

        info!(%wallet_id, name = %updated.name, "wallet updated");
        Ok(updated)
    }

    pub async fn rename_wallet(&self, wallet_id: &str, name: &str) -> ResultEngine<Wallet> {
        self.update_wallet(
            wallet_id,
            WalletUpdate {
                name: Some(name.to_string()),
                icon: None,
            },
        )
        .await
    }

    /// Removes a wallet no transaction refers to. The cash drawer stays.
    pub async fn delete_wallet(&self, wallet_id: &str) -> ResultEngine<()> {
        if wallet_id == CASH_WALLET_ID {
            return Err(EngineError::Validation(
                "the cash wallet cannot be deleted".to_string(),
            ));
        }

        let mut ledger = self.ledger.lock().await;
        ledger.wallet(wallet_id)?;
        if ledger.references_wallet(wallet_id) {
            return Err(EngineError::WalletInUse(wallet_id.to_string()));
        }
        self.store.delete_wallet(wallet_id).await?;
        ledger.remove_wallet(wallet_id);

        info!(%wallet_id, "wallet deleted");
        Ok(())
    }
}
