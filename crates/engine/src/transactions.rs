//! Transaction primitives.
//!
//! A `Transaction` touches at most two wallets: its primary `wallet` and the
//! shared cash drawer. How much each one moves is decided by
//! [`rules`](crate::rules), based on the transaction [`TransactionKind`].

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};

use crate::{EngineError, ResultEngine, TransactionKind};

/// Largest amount, margin or fee accepted on input, Rp 1.000.000.000.000.000.
///
/// Keeps `amount + margin` and running balances far from `i64` overflow.
pub const MAX_AMOUNT: i64 = 1_000_000_000_000_000;

/// Direction hint of a transaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TxType {
    In,
    Out,
}

impl TxType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::In => "IN",
            Self::Out => "OUT",
        }
    }
}

impl TryFrom<&str> for TxType {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_uppercase().as_str() {
            "IN" => Ok(Self::In),
            "OUT" => Ok(Self::Out),
            other => Err(EngineError::Validation(format!(
                "invalid transaction type: {other}"
            ))),
        }
    }
}

/// Where the margin of a cash withdrawal ends up.
///
/// `Dalam` adds it to the primary wallet, `Luar` hands it over in cash.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarginType {
    #[default]
    Dalam,
    Luar,
}

impl MarginType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Dalam => "dalam",
            Self::Luar => "luar",
        }
    }
}

impl TryFrom<&str> for MarginType {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "dalam" => Ok(Self::Dalam),
            "luar" => Ok(Self::Luar),
            other => Err(EngineError::Validation(format!(
                "invalid margin type: {other}"
            ))),
        }
    }
}

/// A stored transaction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    pub date: DateTime<Utc>,
    description: String,
    kind: TransactionKind,
    pub customer: String,
    #[serde(rename = "type")]
    pub tx_type: TxType,
    pub amount: i64,
    pub margin: i64,
    /// Id of the primary wallet. Empty means "no wallet" and disables the
    /// wallet effect.
    pub wallet: String,
    pub is_piutang: bool,
    /// When the receivable was collected. Only settled transactions can be
    /// turned back into receivables.
    pub settled_at: Option<DateTime<Utc>>,
    pub margin_type: Option<MarginType>,
    pub is_internal_transfer: bool,
    pub transfer_id: Option<String>,
    /// Pending undoable delete. Never persisted.
    #[serde(skip)]
    pub is_deleting: bool,
    pub notes: Option<String>,
}

impl Transaction {
    /// Materializes a draft once the store has picked an id and a date.
    pub fn from_draft(id: impl Into<String>, date: DateTime<Utc>, draft: TransactionDraft) -> Self {
        let kind = TransactionKind::from_description(&draft.description);
        Self {
            id: id.into(),
            date,
            description: draft.description,
            kind,
            customer: draft.customer,
            tx_type: draft.tx_type,
            amount: draft.amount,
            margin: draft.margin,
            wallet: draft.wallet,
            is_piutang: draft.is_piutang,
            settled_at: None,
            margin_type: draft.margin_type,
            is_internal_transfer: draft.is_internal_transfer,
            transfer_id: draft.transfer_id,
            is_deleting: false,
            notes: draft.notes,
        }
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn kind(&self) -> TransactionKind {
        self.kind
    }

    /// Changes the category and resolves the kind again.
    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
        self.kind = TransactionKind::from_description(&self.description);
    }

    /// Draft carrying the same fields, handy for edits.
    pub fn to_draft(&self) -> TransactionDraft {
        TransactionDraft {
            id: Some(self.id.clone()),
            date: Some(self.date),
            description: self.description.clone(),
            customer: self.customer.clone(),
            tx_type: self.tx_type,
            amount: self.amount,
            margin: self.margin,
            wallet: self.wallet.clone(),
            is_piutang: self.is_piutang,
            margin_type: self.margin_type,
            is_internal_transfer: self.is_internal_transfer,
            transfer_id: self.transfer_id.clone(),
            notes: self.notes.clone(),
        }
    }

    /// Applies a partial update in place.
    pub fn apply_patch(&mut self, patch: &TransactionPatch) {
        if let Some(date) = patch.date {
            self.date = date;
        }
        if let Some(description) = &patch.description {
            self.set_description(description.clone());
        }
        if let Some(customer) = &patch.customer {
            self.customer = customer.clone();
        }
        if let Some(tx_type) = patch.tx_type {
            self.tx_type = tx_type;
        }
        if let Some(amount) = patch.amount {
            self.amount = amount;
        }
        if let Some(margin) = patch.margin {
            self.margin = margin;
        }
        if let Some(wallet) = &patch.wallet {
            self.wallet = wallet.clone();
        }
        if let Some(is_piutang) = patch.is_piutang {
            self.is_piutang = is_piutang;
        }
        if let Some(settled_at) = patch.settled_at {
            self.settled_at = settled_at;
        }
        if let Some(margin_type) = patch.margin_type {
            self.margin_type = margin_type;
        }
        if let Some(notes) = &patch.notes {
            self.notes = notes.clone();
        }
    }
}

/// Input for creating (or fully replacing) a transaction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransactionDraft {
    /// Store assigns one when `None`.
    pub id: Option<String>,
    /// Store uses "now" when `None`.
    pub date: Option<DateTime<Utc>>,
    pub description: String,
    pub customer: String,
    pub tx_type: TxType,
    pub amount: i64,
    pub margin: i64,
    pub wallet: String,
    pub is_piutang: bool,
    pub margin_type: Option<MarginType>,
    pub is_internal_transfer: bool,
    pub transfer_id: Option<String>,
    pub notes: Option<String>,
}

impl TransactionDraft {
    #[must_use]
    pub fn new(
        description: impl Into<String>,
        tx_type: TxType,
        amount: i64,
        wallet: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            date: None,
            description: description.into(),
            customer: String::new(),
            tx_type,
            amount,
            margin: 0,
            wallet: wallet.into(),
            is_piutang: false,
            margin_type: None,
            is_internal_transfer: false,
            transfer_id: None,
            notes: None,
        }
    }

    #[must_use]
    pub fn margin(mut self, margin: i64) -> Self {
        self.margin = margin;
        self
    }

    #[must_use]
    pub fn customer(mut self, customer: impl Into<String>) -> Self {
        self.customer = customer.into();
        self
    }

    #[must_use]
    pub fn date(mut self, date: DateTime<Utc>) -> Self {
        self.date = Some(date);
        self
    }

    #[must_use]
    pub fn piutang(mut self, is_piutang: bool) -> Self {
        self.is_piutang = is_piutang;
        self
    }

    #[must_use]
    pub fn margin_type(mut self, margin_type: MarginType) -> Self {
        self.margin_type = Some(margin_type);
        self
    }

    #[must_use]
    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    #[must_use]
    pub fn internal_transfer(mut self, transfer_id: impl Into<String>) -> Self {
        self.is_internal_transfer = true;
        self.transfer_id = Some(transfer_id.into());
        self
    }

    pub fn kind(&self) -> TransactionKind {
        TransactionKind::from_description(&self.description)
    }

    /// Checks the form-level invariants the rules engine relies on.
    pub fn validate(&self) -> ResultEngine<()> {
        if self.description.trim().is_empty() {
            return Err(EngineError::Validation(
                "description must not be empty".to_string(),
            ));
        }
        if self.amount < 0 {
            return Err(EngineError::InvalidAmount("amount must be >= 0".to_string()));
        }
        if self.margin < 0 {
            return Err(EngineError::InvalidAmount("margin must be >= 0".to_string()));
        }
        if self.amount > MAX_AMOUNT || self.margin > MAX_AMOUNT {
            return Err(EngineError::InvalidAmount(format!(
                "amount and margin must be <= {MAX_AMOUNT}"
            )));
        }
        if self.wallet.trim().is_empty() {
            return Err(EngineError::Validation("wallet is required".to_string()));
        }
        if self.is_internal_transfer && self.transfer_id.is_none() {
            return Err(EngineError::Validation(
                "internal transfer requires a transfer id".to_string(),
            ));
        }
        Ok(())
    }
}

/// Partial update. `None` leaves the field untouched.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TransactionPatch {
    pub date: Option<DateTime<Utc>>,
    pub description: Option<String>,
    pub customer: Option<String>,
    pub tx_type: Option<TxType>,
    pub amount: Option<i64>,
    pub margin: Option<i64>,
    pub wallet: Option<String>,
    pub is_piutang: Option<bool>,
    pub settled_at: Option<Option<DateTime<Utc>>>,
    pub margin_type: Option<Option<MarginType>>,
    pub notes: Option<Option<String>>,
}

impl TransactionPatch {
    /// Marks a receivable as collected at `at`.
    pub fn settled(at: DateTime<Utc>) -> Self {
        Self {
            is_piutang: Some(false),
            settled_at: Some(Some(at)),
            ..Default::default()
        }
    }

    /// Turns a settled transaction back into an outstanding receivable.
    pub fn unsettled() -> Self {
        Self {
            is_piutang: Some(true),
            settled_at: Some(None),
            ..Default::default()
        }
    }

    /// Patch replacing every editable field with the draft values.
    pub fn full(draft: &TransactionDraft) -> Self {
        Self {
            date: draft.date,
            description: Some(draft.description.clone()),
            customer: Some(draft.customer.clone()),
            tx_type: Some(draft.tx_type),
            amount: Some(draft.amount),
            margin: Some(draft.margin),
            wallet: Some(draft.wallet.clone()),
            is_piutang: Some(draft.is_piutang),
            // An outstanding receivable has no settlement; otherwise keep it.
            settled_at: if draft.is_piutang { Some(None) } else { None },
            margin_type: Some(draft.margin_type),
            notes: Some(draft.notes.clone()),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub date: DateTimeUtc,
    pub description: String,
    pub customer: String,
    pub tx_type: String,
    pub amount: i64,
    pub margin: i64,
    pub wallet: String,
    pub is_piutang: bool,
    pub margin_type: Option<String>,
    pub is_internal_transfer: bool,
    pub transfer_id: Option<String>,
    pub notes: Option<String>,
    pub settled_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Transaction> for ActiveModel {
    fn from(tx: &Transaction) -> Self {
        Self {
            id: ActiveValue::Set(tx.id.clone()),
            date: ActiveValue::Set(tx.date),
            description: ActiveValue::Set(tx.description.clone()),
            customer: ActiveValue::Set(tx.customer.clone()),
            tx_type: ActiveValue::Set(tx.tx_type.as_str().to_string()),
            amount: ActiveValue::Set(tx.amount),
            margin: ActiveValue::Set(tx.margin),
            wallet: ActiveValue::Set(tx.wallet.clone()),
            is_piutang: ActiveValue::Set(tx.is_piutang),
            margin_type: ActiveValue::Set(tx.margin_type.map(|m| m.as_str().to_string())),
            is_internal_transfer: ActiveValue::Set(tx.is_internal_transfer),
            transfer_id: ActiveValue::Set(tx.transfer_id.clone()),
            notes: ActiveValue::Set(tx.notes.clone()),
            settled_at: ActiveValue::Set(tx.settled_at),
        }
    }
}

impl TryFrom<Model> for Transaction {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let tx_type = TxType::try_from(model.tx_type.as_str())?;
        let margin_type = model
            .margin_type
            .as_deref()
            .map(MarginType::try_from)
            .transpose()?;
        let kind = TransactionKind::from_description(&model.description);
        Ok(Self {
            id: model.id,
            date: model.date,
            description: model.description,
            kind,
            customer: model.customer,
            tx_type,
            amount: model.amount,
            margin: model.margin,
            wallet: model.wallet,
            is_piutang: model.is_piutang,
            settled_at: model.settled_at,
            margin_type,
            is_internal_transfer: model.is_internal_transfer,
            transfer_id: model.transfer_id,
            is_deleting: false,
            notes: model.notes,
        })
    }
}
