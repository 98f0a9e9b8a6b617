use std::path::PathBuf;

use chrono::{DateTime, NaiveDate, Utc};
use clap::{Args, Parser, Subcommand, ValueEnum};
use engine::{CASH_WALLET_ID, MarginType, Rupiah, TxType, dates::parse_date};

#[derive(Parser, Debug)]
#[command(name = "brilink")]
#[command(about = "Bookkeeping for a BRILink agent: wallets, transactions, transfers and reports")]
pub struct Cli {
    /// Database connection string, overrides the settings file (also read
    /// from `DATABASE_URL`). Use `memory` for a throwaway ledger.
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Manage wallets.
    Wallet(Wallet),
    /// Record, edit, settle and delete transactions.
    Tx(Tx),
    /// Move money between wallets.
    Transfer(Transfer),
    /// Print derived reports.
    Report(Report),
    /// Write every transaction as CSV.
    Export(ExportArgs),
}

#[derive(Args, Debug)]
pub struct Wallet {
    #[command(subcommand)]
    pub command: WalletCommand,
}

#[derive(Subcommand, Debug)]
pub enum WalletCommand {
    List,
    Add(WalletAddArgs),
    Rename {
        #[arg(long)]
        id: String,
        #[arg(long)]
        name: String,
    },
    Delete {
        #[arg(long)]
        id: String,
    },
}

#[derive(Args, Debug)]
pub struct WalletAddArgs {
    #[arg(long)]
    pub name: String,
    /// Opening balance, e.g. `1.500.000`.
    #[arg(long, default_value = "0")]
    pub balance: Rupiah,
    /// Explicit id; derived from the name when missing.
    #[arg(long)]
    pub id: Option<String>,
    #[arg(long)]
    pub icon: Option<String>,
}

#[derive(Args, Debug)]
pub struct Tx {
    #[command(subcommand)]
    pub command: TxCommand,
}

#[derive(Subcommand, Debug)]
pub enum TxCommand {
    List {
        /// Print JSON instead of a table.
        #[arg(long)]
        json: bool,
    },
    Add(TxArgs),
    Edit {
        #[arg(long)]
        id: String,
        #[command(flatten)]
        fields: TxArgs,
    },
    /// Collect an outstanding receivable.
    Settle {
        #[arg(long)]
        id: String,
    },
    /// Mark a settled receivable as outstanding again.
    Unsettle {
        #[arg(long)]
        id: String,
    },
    /// Delete after the undo window; Ctrl-C before it closes keeps the
    /// transaction.
    Delete {
        #[arg(long)]
        id: String,
    },
    /// Record a BRILink fee.
    Fee {
        #[arg(long)]
        wallet: String,
        #[arg(long)]
        fee: Rupiah,
        #[arg(long, value_parser = parse_date)]
        date: Option<DateTime<Utc>>,
    },
    /// Record the cost of a customer reward, paid from cash.
    Reward {
        #[arg(long)]
        name: String,
        #[arg(long)]
        cost: Rupiah,
        #[arg(long)]
        customer: Option<String>,
        #[arg(long, value_parser = parse_date)]
        date: Option<DateTime<Utc>>,
    },
    /// Take margin out of the cash drawer.
    Withdraw {
        #[arg(long)]
        amount: Rupiah,
        #[arg(long)]
        label: Option<String>,
        #[arg(long, value_parser = parse_date)]
        date: Option<DateTime<Utc>>,
    },
    /// Record bank interest.
    Interest {
        #[arg(long)]
        wallet: String,
        #[arg(long)]
        interest: Rupiah,
        #[arg(long, value_parser = parse_date)]
        date: Option<DateTime<Utc>>,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum Direction {
    In,
    Out,
}

impl From<Direction> for TxType {
    fn from(value: Direction) -> Self {
        match value {
            Direction::In => TxType::In,
            Direction::Out => TxType::Out,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum MarginSide {
    Dalam,
    Luar,
}

impl From<MarginSide> for MarginType {
    fn from(value: MarginSide) -> Self {
        match value {
            MarginSide::Dalam => MarginType::Dalam,
            MarginSide::Luar => MarginType::Luar,
        }
    }
}

#[derive(Args, Debug)]
pub struct TxArgs {
    /// Category, e.g. `Tarik Tunai`.
    #[arg(long)]
    pub description: String,
    #[arg(long = "type", value_enum)]
    pub tx_type: Direction,
    #[arg(long)]
    pub amount: Rupiah,
    #[arg(long, default_value = "0")]
    pub margin: Rupiah,
    #[arg(long, default_value = CASH_WALLET_ID)]
    pub wallet: String,
    #[arg(long, default_value = "Pelanggan")]
    pub customer: String,
    #[arg(long, value_parser = parse_date)]
    pub date: Option<DateTime<Utc>>,
    /// Outstanding receivable.
    #[arg(long)]
    pub piutang: bool,
    #[arg(long, value_enum)]
    pub margin_type: Option<MarginSide>,
    #[arg(long)]
    pub notes: Option<String>,
}

#[derive(Args, Debug)]
pub struct Transfer {
    #[command(subcommand)]
    pub command: TransferCommand,
}

#[derive(Subcommand, Debug)]
pub enum TransferCommand {
    Add(TransferArgs),
    Edit {
        #[arg(long)]
        transfer_id: String,
        #[command(flatten)]
        fields: TransferArgs,
    },
    Delete {
        #[arg(long)]
        transfer_id: String,
    },
}

#[derive(Args, Debug)]
pub struct TransferArgs {
    #[arg(long)]
    pub from: String,
    #[arg(long)]
    pub to: String,
    #[arg(long)]
    pub amount: Rupiah,
    #[arg(long, default_value = "0")]
    pub fee: Rupiah,
    #[arg(long, value_parser = parse_date)]
    pub date: Option<DateTime<Utc>>,
    #[arg(long)]
    pub notes: Option<String>,
}

#[derive(Args, Debug)]
pub struct Report {
    #[command(subcommand)]
    pub command: ReportCommand,
}

#[derive(Subcommand, Debug)]
pub enum ReportCommand {
    Assets,
    Margin {
        /// First business day, inclusive.
        #[arg(long)]
        from: Option<NaiveDate>,
        /// Last business day, inclusive.
        #[arg(long)]
        to: Option<NaiveDate>,
    },
    Customers,
    Receivables,
    Daily {
        /// Business day, today when missing.
        #[arg(long)]
        day: Option<NaiveDate>,
    },
}

#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Output file, stdout when missing.
    #[arg(long)]
    pub output: Option<PathBuf>,
}
