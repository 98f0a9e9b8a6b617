//! Bookkeeping core of a BRILink agent.
//!
//! Wallets hold balances, transactions move them. The pure parts decide how
//! much each wallet moves ([`rules`], [`reconcile`], [`transfer`]); the
//! [`Engine`] persists transactions and balances through a [`LedgerStore`]
//! and keeps an in-memory mirror of both.

pub use error::EngineError;
pub use kinds::TransactionKind;
pub use money::Rupiah;
pub use ops::{
    DEFAULT_DELETE_GRACE, DeleteOutcome, DeleteState, Engine, EngineBuilder, Ledger, PendingDelete,
};
pub use reconcile::{WalletDeltas, reconcile_edit};
pub use rules::{
    LedgerAction, SettleAction, WalletDelta, compute_settle_delta, compute_wallet_delta,
};
pub use store::{LedgerStore, MemoryStore, SqliteStore};
pub use transactions::{
    MAX_AMOUNT, MarginType, Transaction, TransactionDraft, TransactionPatch, TxType,
};
pub use transfer::{DisplayRow, TransferPair, TransferRequest, TransferView};
pub use wallets::{CASH_WALLET_ID, NewWallet, Wallet, WalletUpdate};

pub mod categories;
pub mod dates;
mod error;
pub mod kinds;
mod money;
mod ops;
pub mod reconcile;
pub mod reports;
pub mod rules;
mod store;
pub mod transactions;
pub mod transfer;
pub mod wallets;

pub type ResultEngine<T> = Result<T, EngineError>;
