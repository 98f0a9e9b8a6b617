//! Transaction kinds.
//!
//! The category string of a transaction drives the wallet rules. The string
//! is mapped once to a [`TransactionKind`] and the rules engine only looks at
//! the tag afterwards.

use serde::{Deserialize, Serialize};

pub const TARIK_TUNAI: &str = "Tarik Tunai";
pub const FEE_BRILINK: &str = "Fee Brilink";
pub const PENYESUAIAN_KAS: &str = "Penyesuaian Kas";
pub const TAMBAH_MODAL: &str = "Tambah Modal";
pub const BUNGA_BANK: &str = "Bunga Bank";
pub const POTONGAN_BANK: &str = "Potongan Bank";
pub const PINDAH_SALDO_PREFIX: &str = "Pindah Saldo";
pub const REWARD_PREFIX: &str = "Reward:";
pub const PENARIKAN_MARGIN_PREFIX: &str = "Penarikan Margin";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    /// `"Reward: ..."`, cost of a customer reward.
    Reward,
    /// `"Pindah Saldo ..."`, legacy single-record wallet move.
    PindahSaldo,
    FeeBrilink,
    /// `"Penarikan Margin ..."`, owner takes profit out of the cash drawer.
    PenarikanMargin,
    TarikTunai,
    PenyesuaianKas,
    TambahModal,
    BungaBank,
    PotonganBank,
    /// Any other user category (pulsa, transfer keluar, ...).
    Other,
}

impl TransactionKind {
    /// Resolves the kind of a description.
    ///
    /// Prefix categories are matched with `starts_with`, the others need the
    /// exact string.
    #[must_use]
    pub fn from_description(description: &str) -> Self {
        if description.starts_with(REWARD_PREFIX) {
            return Self::Reward;
        }
        if description.starts_with(PINDAH_SALDO_PREFIX) {
            return Self::PindahSaldo;
        }
        if description.starts_with(PENARIKAN_MARGIN_PREFIX) {
            return Self::PenarikanMargin;
        }
        match description {
            FEE_BRILINK => Self::FeeBrilink,
            TARIK_TUNAI => Self::TarikTunai,
            PENYESUAIAN_KAS => Self::PenyesuaianKas,
            TAMBAH_MODAL => Self::TambahModal,
            BUNGA_BANK => Self::BungaBank,
            POTONGAN_BANK => Self::PotonganBank,
            _ => Self::Other,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Reward => "reward",
            Self::PindahSaldo => "pindah_saldo",
            Self::FeeBrilink => "fee_brilink",
            Self::PenarikanMargin => "penarikan_margin",
            Self::TarikTunai => "tarik_tunai",
            Self::PenyesuaianKas => "penyesuaian_kas",
            Self::TambahModal => "tambah_modal",
            Self::BungaBank => "bunga_bank",
            Self::PotonganBank => "potongan_bank",
            Self::Other => "other",
        }
    }

    /// Kinds whose margin is business profit.
    #[must_use]
    pub fn earns_margin(self) -> bool {
        !matches!(
            self,
            Self::Reward | Self::PenarikanMargin | Self::PindahSaldo | Self::TambahModal
        )
    }
}
