//! Category registry and customer name helpers.

use sea_orm::entity::prelude::*;
use unicode_normalization::{UnicodeNormalization, char::is_combining_mark};

use crate::kinds;

/// Categories offered on a fresh install.
pub const DEFAULT_CATEGORIES: &[&str] = &[
    kinds::TARIK_TUNAI,
    "Transfer Keluar",
    "Setor Tunai",
    "Pulsa",
    "Token Listrik",
    "Bayar Tagihan",
    kinds::FEE_BRILINK,
    kinds::PENYESUAIAN_KAS,
    kinds::TAMBAH_MODAL,
    kinds::BUNGA_BANK,
    kinds::POTONGAN_BANK,
];

/// Customer names that mark walk-in or internal records.
const NON_CUSTOMER_NAMES: &[&str] = &["pelanggan", "internal", "brilink"];

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "categories")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub name: String,
    pub position: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Canonical key of a customer name: NFKD without marks, lowercase,
/// whitespace collapsed. `None` for blank names.
pub fn customer_key(name: &str) -> Option<String> {
    let mut out = String::new();
    let mut pending_space = false;
    for ch in name.trim().nfkd() {
        if is_combining_mark(ch) {
            continue;
        }
        if ch.is_whitespace() {
            pending_space = !out.is_empty();
            continue;
        }
        if pending_space {
            out.push(' ');
            pending_space = false;
        }
        for lower in ch.to_lowercase() {
            out.push(lower);
        }
    }
    if out.is_empty() { None } else { Some(out) }
}

/// Returns `true` for names that must not show up in customer reports.
pub fn is_non_customer(name: &str) -> bool {
    match customer_key(name) {
        Some(key) => NON_CUSTOMER_NAMES.contains(&key.as_str()),
        None => true,
    }
}
