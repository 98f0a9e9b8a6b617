//! Read models derived from the mirror.
//!
//! Everything here is a pure function over slices. Internal transfers and
//! transactions pending deletion never count.

use std::collections::BTreeMap;

use chrono::{DateTime, Days, NaiveDate, Utc};
use serde::Serialize;

use crate::{
    ResultEngine, Transaction, TransactionKind, TxType, Wallet,
    categories::{customer_key, is_non_customer},
    dates::{business_day, start_of_day},
};

/// Half-open time window `[from, to)`. Missing bounds are unbounded.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DateRange {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

impl DateRange {
    pub fn all() -> Self {
        Self::default()
    }

    /// Business days `first..=last`.
    pub fn days(first: NaiveDate, last: NaiveDate) -> ResultEngine<Self> {
        let next = last
            .checked_add_days(Days::new(1))
            .unwrap_or(NaiveDate::MAX);
        Ok(Self {
            from: Some(start_of_day(first)?),
            to: Some(start_of_day(next)?),
        })
    }

    pub fn contains(&self, ts: DateTime<Utc>) -> bool {
        self.from.is_none_or(|from| ts >= from) && self.to.is_none_or(|to| ts < to)
    }
}

fn counted(tx: &Transaction) -> bool {
    !tx.is_deleting && !tx.is_internal_transfer
}

/// Sum of every wallet balance.
pub fn total_assets(wallets: &[Wallet]) -> i64 {
    wallets.iter().map(|wallet| wallet.balance).sum()
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct MarginSummary {
    /// Margin earned by business transactions.
    pub gross_margin: i64,
    /// Margin taken out of the drawer.
    pub withdrawn: i64,
    /// Cost of rewards handed to customers.
    pub reward_costs: i64,
    pub net_margin: i64,
}

pub fn margin_summary(transactions: &[Transaction], range: DateRange) -> MarginSummary {
    let mut summary = MarginSummary::default();
    for tx in transactions
        .iter()
        .filter(|tx| counted(tx) && range.contains(tx.date))
    {
        match tx.kind() {
            TransactionKind::PenarikanMargin => summary.withdrawn += tx.amount,
            TransactionKind::Reward => summary.reward_costs += tx.amount,
            kind if kind.earns_margin() => summary.gross_margin += tx.margin,
            _ => {}
        }
    }
    summary.net_margin = summary.gross_margin - summary.withdrawn - summary.reward_costs;
    summary
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CustomerLedger {
    /// Normalized name the rows are grouped by.
    pub key: String,
    /// Name as first written.
    pub name: String,
    pub transactions: usize,
    pub total_amount: i64,
    pub total_margin: i64,
    /// `amount + margin` of unsettled receivables.
    pub outstanding: i64,
}

/// Per customer totals, sorted by normalized name.
///
/// "Ani", " ani " and "ANI" are the same customer. Sentinel names
/// (`Pelanggan`, `Internal`, `Brilink`) are left out.
pub fn customer_ledgers(transactions: &[Transaction]) -> Vec<CustomerLedger> {
    let mut ledgers: BTreeMap<String, CustomerLedger> = BTreeMap::new();
    for tx in transactions.iter().filter(|tx| counted(tx)) {
        if is_non_customer(&tx.customer) {
            continue;
        }
        let Some(key) = customer_key(&tx.customer) else {
            continue;
        };
        let ledger = ledgers
            .entry(key.clone())
            .or_insert_with(|| CustomerLedger {
                key,
                name: tx.customer.trim().to_string(),
                transactions: 0,
                total_amount: 0,
                total_margin: 0,
                outstanding: 0,
            });
        ledger.transactions += 1;
        ledger.total_amount += tx.amount;
        ledger.total_margin += tx.margin;
        if tx.is_piutang {
            ledger.outstanding += tx.amount + tx.margin;
        }
    }
    ledgers.into_values().collect()
}

/// Unsettled receivables, oldest first.
pub fn outstanding_receivables(transactions: &[Transaction]) -> Vec<&Transaction> {
    let mut open: Vec<&Transaction> = transactions
        .iter()
        .filter(|tx| counted(tx) && tx.is_piutang)
        .collect();
    open.sort_by_key(|tx| tx.date);
    open
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct DailySummary {
    pub day: NaiveDate,
    pub count: usize,
    pub total_in: i64,
    pub total_out: i64,
    pub margin: i64,
}

/// Totals of one business day (`Asia/Jakarta`).
pub fn daily_summary(transactions: &[Transaction], day: NaiveDate) -> DailySummary {
    let mut summary = DailySummary {
        day,
        count: 0,
        total_in: 0,
        total_out: 0,
        margin: 0,
    };
    for tx in transactions
        .iter()
        .filter(|tx| counted(tx) && business_day(tx.date) == day)
    {
        summary.count += 1;
        match tx.tx_type {
            TxType::In => summary.total_in += tx.amount,
            TxType::Out => summary.total_out += tx.amount,
        }
        if tx.kind().earns_margin() {
            summary.margin += tx.margin;
        }
    }
    summary
}
