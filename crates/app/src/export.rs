//! CSV export of the transaction list.

use engine::{Transaction, dates::format_local};
use serde::Serialize;

/// One CSV line. Transfer legs are exported as two rows sharing `transfer_id`.
#[derive(Debug, Serialize)]
struct TransactionCsv<'a> {
    id: &'a str,
    date: String,
    description: &'a str,
    kind: &'static str,
    customer: &'a str,
    #[serde(rename = "type")]
    tx_type: &'static str,
    amount: i64,
    margin: i64,
    wallet: &'a str,
    piutang: bool,
    settled_at: Option<String>,
    margin_type: Option<&'static str>,
    transfer_id: Option<&'a str>,
    notes: Option<&'a str>,
}

pub fn write_csv(
    transactions: &[Transaction],
    writer: impl std::io::Write,
) -> Result<(), csv::Error> {
    let mut wtr = csv::Writer::from_writer(writer);
    for tx in transactions {
        wtr.serialize(TransactionCsv {
            id: &tx.id,
            date: format_local(tx.date),
            description: tx.description(),
            kind: tx.kind().as_str(),
            customer: &tx.customer,
            tx_type: tx.tx_type.as_str(),
            amount: tx.amount,
            margin: tx.margin,
            wallet: &tx.wallet,
            piutang: tx.is_piutang,
            settled_at: tx.settled_at.map(format_local),
            margin_type: tx.margin_type.map(|margin_type| margin_type.as_str()),
            transfer_id: tx.transfer_id.as_deref(),
            notes: tx.notes.as_deref(),
        })?;
    }
    wtr.flush()?;
    Ok(())
}
