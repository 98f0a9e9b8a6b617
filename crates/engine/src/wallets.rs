//! The module contains `Wallet` struct and its implementation.

use sea_orm::entity::{ActiveValue, prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Id of the wallet holding the physical cash drawer. Always present.
pub const CASH_WALLET_ID: &str = "CASH";

/// A wallet.
///
/// A wallet is a cash drawer, a bank account or an agent balance (e.g. the
/// BRILink deposit). Balances may go negative; only transfers check funds.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wallet {
    /// Stable identifier (`"CASH"`, `"BRI"`, or generated).
    pub id: String,
    pub name: String,
    pub balance: i64,
    /// Opaque icon reference for the UI.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

impl Wallet {
    pub fn new(id: impl Into<String>, name: impl Into<String>, balance: i64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            balance,
            icon: None,
        }
    }

    /// The cash drawer wallet with a zero balance.
    pub fn cash() -> Self {
        Self::new(CASH_WALLET_ID, "Cash", 0)
    }

    #[must_use]
    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    pub fn is_cash(&self) -> bool {
        self.id == CASH_WALLET_ID
    }
}

/// Fields accepted when creating a wallet.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NewWallet {
    /// Requested id; the store derives one when `None`.
    pub id: Option<String>,
    pub name: String,
    pub balance: i64,
    pub icon: Option<String>,
}

impl NewWallet {
    pub fn new(name: impl Into<String>, balance: i64) -> Self {
        Self {
            id: None,
            name: name.into(),
            balance,
            icon: None,
        }
    }

    #[must_use]
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    #[must_use]
    pub fn icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }
}

/// Metadata changes of a wallet. Balances are not editable here.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WalletUpdate {
    pub name: Option<String>,
    pub icon: Option<Option<String>>,
}

impl Wallet {
    pub(crate) fn apply_update(&mut self, update: &WalletUpdate) {
        if let Some(name) = &update.name {
            self.name = name.clone();
        }
        if let Some(icon) = &update.icon {
            self.icon = icon.clone();
        }
    }
}

/// Picks an id for a new wallet: the upper-cased name without spaces when
/// free, a random UUID otherwise.
pub(crate) fn derive_wallet_id(name: &str, taken: impl Fn(&str) -> bool) -> String {
    let candidate: String = name
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_uppercase())
        .collect();
    if candidate.is_empty() || taken(&candidate) {
        Uuid::new_v4().to_string()
    } else {
        candidate
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "wallets")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    pub balance: i64,
    pub icon: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Wallet> for ActiveModel {
    fn from(value: &Wallet) -> Self {
        Self {
            id: ActiveValue::Set(value.id.clone()),
            name: ActiveValue::Set(value.name.clone()),
            balance: ActiveValue::Set(value.balance),
            icon: ActiveValue::Set(value.icon.clone()),
        }
    }
}

impl From<Model> for Wallet {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            balance: model.balance,
            icon: model.icon,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cash_wallet_is_distinguished() {
        let cash = Wallet::cash();
        assert!(cash.is_cash());
        assert_eq!(cash.balance, 0);
        assert!(!Wallet::new("BRI", "Bank BRI", 10).is_cash());
    }

    #[test]
    fn derived_ids() {
        assert_eq!(derive_wallet_id("Bank BRI", |_| false), "BANKBRI");
        assert_eq!(derive_wallet_id("dana", |_| false), "DANA");
        let fallback = derive_wallet_id("Cash", |id| id == "CASH");
        assert!(Uuid::parse_str(&fallback).is_ok());
        assert!(Uuid::parse_str(&derive_wallet_id("  ", |_| false)).is_ok());
    }

    #[test]
    fn update_keeps_balance() {
        let mut wallet = Wallet::new("DANA", "Dana", 15_000);
        wallet.apply_update(&WalletUpdate {
            name: Some("DANA Bisnis".to_string()),
            icon: Some(Some("phone".to_string())),
        });
        assert_eq!(wallet.name, "DANA Bisnis");
        assert_eq!(wallet.icon.as_deref(), Some("phone"));
        assert_eq!(wallet.balance, 15_000);
    }

    #[test]
    fn model_round_trip_keeps_icon() {
        let wallet = Wallet::new("BRILINK", "Saldo BRILink", 2_000_000).with_icon("bank");
        let active = ActiveModel::from(&wallet);
        assert_eq!(active.icon, ActiveValue::Set(Some("bank".to_string())));
        let back = Wallet::from(Model {
            id: "BRILINK".to_string(),
            name: "Saldo BRILink".to_string(),
            balance: 2_000_000,
            icon: Some("bank".to_string()),
        });
        assert_eq!(back, wallet);
    }
}
