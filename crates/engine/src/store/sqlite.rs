//! SQLite persistence through sea-orm.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue, DatabaseConnection, DbErr, EntityTrait, QueryOrder,
};
use uuid::Uuid;

use crate::{
    EngineError, ResultEngine, Transaction, TransactionDraft, TransactionPatch, Wallet,
    categories, transactions,
    wallets::{self, NewWallet, WalletUpdate, derive_wallet_id},
};

use super::LedgerStore;

/// Store backed by the `wallets`, `transactions` and `categories` tables.
///
/// The schema is created by the `migration` crate.
#[derive(Clone, Debug)]
pub struct SqliteStore {
    database: DatabaseConnection,
}

impl SqliteStore {
    pub fn new(database: DatabaseConnection) -> Self {
        Self { database }
    }

    async fn find_transaction(&self, id: &str) -> ResultEngine<Transaction> {
        let model = transactions::Entity::find_by_id(id.to_string())
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound(format!("transaction {id}")))?;
        Transaction::try_from(model)
    }

    async fn find_wallet(&self, id: &str) -> ResultEngine<Wallet> {
        wallets::Entity::find_by_id(id.to_string())
            .one(&self.database)
            .await?
            .map(Wallet::from)
            .ok_or_else(|| EngineError::KeyNotFound(format!("wallet {id}")))
    }
}

fn not_updated(label: &str, id: &str) -> impl FnOnce(DbErr) -> EngineError {
    let key = format!("{label} {id}");
    move |err| match err {
        DbErr::RecordNotUpdated => EngineError::KeyNotFound(key),
        other => EngineError::Database(other),
    }
}

#[async_trait]
impl LedgerStore for SqliteStore {
    async fn get_wallets(&self) -> ResultEngine<Vec<Wallet>> {
        let models = wallets::Entity::find()
            .order_by_asc(wallets::Column::Id)
            .all(&self.database)
            .await?;
        Ok(models.into_iter().map(Wallet::from).collect())
    }

    async fn get_transactions(&self) -> ResultEngine<Vec<Transaction>> {
        let models = transactions::Entity::find()
            .order_by_asc(transactions::Column::Date)
            .order_by_asc(transactions::Column::Id)
            .all(&self.database)
            .await?;
        models.into_iter().map(Transaction::try_from).collect()
    }

    async fn get_categories(&self) -> ResultEngine<Vec<String>> {
        let models = categories::Entity::find()
            .order_by_asc(categories::Column::Position)
            .all(&self.database)
            .await?;
        Ok(models.into_iter().map(|model| model.name).collect())
    }

    async fn create_transaction(&self, draft: TransactionDraft) -> ResultEngine<Transaction> {
        let id = draft
            .id
            .clone()
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        let date = draft.date.unwrap_or_else(Utc::now);
        let tx = Transaction::from_draft(id, date, draft);
        transactions::ActiveModel::from(&tx)
            .insert(&self.database)
            .await?;
        Ok(tx)
    }

    async fn update_transaction(
        &self,
        id: &str,
        patch: TransactionPatch,
    ) -> ResultEngine<Transaction> {
        let mut tx = self.find_transaction(id).await?;
        tx.apply_patch(&patch);
        transactions::ActiveModel::from(&tx)
            .update(&self.database)
            .await
            .map_err(not_updated("transaction", id))?;
        Ok(tx)
    }

    async fn delete_transaction(&self, id: &str) -> ResultEngine<()> {
        let result = transactions::Entity::delete_by_id(id.to_string())
            .exec(&self.database)
            .await?;
        if result.rows_affected == 0 {
            return Err(EngineError::KeyNotFound(format!("transaction {id}")));
        }
        Ok(())
    }

    async fn update_wallet_balance(&self, id: &str, balance: i64) -> ResultEngine<()> {
        let wallet_model = wallets::ActiveModel {
            id: ActiveValue::Set(id.to_string()),
            balance: ActiveValue::Set(balance),
            ..Default::default()
        };
        wallet_model
            .update(&self.database)
            .await
            .map_err(not_updated("wallet", id))?;
        Ok(())
    }

    async fn create_wallet(&self, wallet: NewWallet) -> ResultEngine<Wallet> {
        let existing: Vec<String> = self
            .get_wallets()
            .await?
            .into_iter()
            .map(|wallet| wallet.id)
            .collect();
        let id = match wallet.id {
            Some(id) if existing.contains(&id) => return Err(EngineError::ExistingKey(id)),
            Some(id) => id,
            None => derive_wallet_id(&wallet.name, |candidate| {
                existing.iter().any(|id| id == candidate)
            }),
        };
        let created = Wallet {
            id,
            name: wallet.name,
            balance: wallet.balance,
            icon: wallet.icon,
        };
        wallets::ActiveModel::from(&created)
            .insert(&self.database)
            .await?;
        Ok(created)
    }

    async fn update_wallet(&self, id: &str, update: WalletUpdate) -> ResultEngine<Wallet> {
        let mut wallet = self.find_wallet(id).await?;
        wallet.apply_update(&update);
        let wallet_model = wallets::ActiveModel {
            id: ActiveValue::Set(wallet.id.clone()),
            name: ActiveValue::Set(wallet.name.clone()),
            icon: ActiveValue::Set(wallet.icon.clone()),
            ..Default::default()
        };
        wallet_model
            .update(&self.database)
            .await
            .map_err(not_updated("wallet", id))?;
        Ok(wallet)
    }

    async fn delete_wallet(&self, id: &str) -> ResultEngine<()> {
        let result = wallets::Entity::delete_by_id(id.to_string())
            .exec(&self.database)
            .await?;
        if result.rows_affected == 0 {
            return Err(EngineError::KeyNotFound(format!("wallet {id}")));
        }
        Ok(())
    }
}
