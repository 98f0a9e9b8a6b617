use std::error::Error;

use chrono::{Days, NaiveDate, Utc};
use engine::{
    DeleteOutcome, DisplayRow, Engine, NewWallet, Rupiah, Transaction, TransactionDraft,
    TransferRequest,
    dates::{business_day, format_local, start_of_day},
    reports::{self, DateRange},
    transfer::TRANSFER_DESCRIPTION,
};

use crate::{
    cli::{
        Command, ReportCommand, TransferArgs, TransferCommand, TxArgs, TxCommand, WalletAddArgs,
        WalletCommand,
    },
    export,
};

type ResultCli<T> = Result<T, Box<dyn Error + Send + Sync>>;

pub async fn run(engine: &Engine, command: Command) -> ResultCli<()> {
    match command {
        Command::Wallet(wallet) => run_wallet(engine, wallet.command).await,
        Command::Tx(tx) => run_tx(engine, tx.command).await,
        Command::Transfer(transfer) => run_transfer(engine, transfer.command).await,
        Command::Report(report) => run_report(engine, report.command).await,
        Command::Export(args) => {
            let transactions = engine.transactions().await;
            match args.output {
                Some(path) => export::write_csv(&transactions, std::fs::File::create(&path)?)?,
                None => export::write_csv(&transactions, std::io::stdout().lock())?,
            }
            Ok(())
        }
    }
}

async fn run_wallet(engine: &Engine, command: WalletCommand) -> ResultCli<()> {
    match command {
        WalletCommand::List => {
            let wallets = engine.wallets().await;
            for wallet in &wallets {
                println!(
                    "{:<12} {:<24} {:>18}",
                    wallet.id,
                    wallet.name,
                    Rupiah::new(wallet.balance).to_string()
                );
            }
            println!(
                "{:<37} {:>18}",
                "TOTAL",
                Rupiah::new(reports::total_assets(&wallets)).to_string()
            );
        }
        WalletCommand::Add(WalletAddArgs {
            name,
            balance,
            id,
            icon,
        }) => {
            let mut wallet = NewWallet::new(name, balance.value());
            wallet.id = id;
            wallet.icon = icon;
            let created = engine.create_wallet(wallet).await?;
            println!("wallet {} created", created.id);
        }
        WalletCommand::Rename { id, name } => {
            let wallet = engine.rename_wallet(&id, &name).await?;
            println!("wallet {} is now {}", wallet.id, wallet.name);
        }
        WalletCommand::Delete { id } => {
            engine.delete_wallet(&id).await?;
            println!("wallet {id} deleted");
        }
    }
    Ok(())
}

fn draft(args: TxArgs) -> TransactionDraft {
    let mut draft = TransactionDraft::new(
        args.description,
        args.tx_type.into(),
        args.amount.value(),
        args.wallet,
    )
    .margin(args.margin.value())
    .customer(args.customer)
    .piutang(args.piutang);
    draft.date = args.date;
    draft.margin_type = args.margin_type.map(Into::into);
    draft.notes = args.notes;
    draft
}

async fn run_tx(engine: &Engine, command: TxCommand) -> ResultCli<()> {
    let saved = match command {
        TxCommand::List { json } => {
            let rows = engine.display_transactions().await;
            if json {
                println!("{}", serde_json::to_string_pretty(&rows)?);
            } else {
                rows.iter().for_each(print_row);
            }
            return Ok(());
        }
        TxCommand::Add(args) => engine.create_transaction(draft(args)).await?,
        TxCommand::Edit { id, fields } => engine.update_transaction(&id, draft(fields)).await?,
        TxCommand::Settle { id } => engine.settle_receivable(&id).await?,
        TxCommand::Unsettle { id } => engine.revert_settlement(&id).await?,
        TxCommand::Delete { id } => return delete_with_undo(engine, &id).await,
        TxCommand::Fee { wallet, fee, date } => {
            engine.record_brilink_fee(&wallet, fee.value(), date).await?
        }
        TxCommand::Reward {
            name,
            cost,
            customer,
            date,
        } => {
            engine
                .record_reward(&name, cost.value(), customer.as_deref(), date)
                .await?
        }
        TxCommand::Withdraw {
            amount,
            label,
            date,
        } => {
            engine
                .withdraw_margin(label.as_deref(), amount.value(), date)
                .await?
        }
        TxCommand::Interest {
            wallet,
            interest,
            date,
        } => {
            engine
                .record_bank_interest(&wallet, interest.value(), date)
                .await?
        }
    };
    print_transaction(&saved);
    Ok(())
}

async fn delete_with_undo(engine: &Engine, id: &str) -> ResultCli<()> {
    let pending = engine.schedule_delete(id).await?;
    println!(
        "deleting {id} in {} ms, press Ctrl-C to undo",
        engine.grace_period().as_millis()
    );

    let outcome = tokio::select! {
        outcome = pending.outcome() => outcome?,
        signal = tokio::signal::ctrl_c() => {
            signal?;
            engine.undo_delete(id).await?;
            DeleteOutcome::Cancelled
        }
    };
    match outcome {
        DeleteOutcome::Committed => println!("transaction {id} deleted"),
        DeleteOutcome::Cancelled => println!("delete of {id} undone"),
    }
    Ok(())
}

fn request(args: TransferArgs) -> TransferRequest {
    let mut request =
        TransferRequest::new(args.from, args.to, args.amount.value()).fee(args.fee.value());
    request.date = args.date;
    request.notes = args.notes;
    request
}

async fn run_transfer(engine: &Engine, command: TransferCommand) -> ResultCli<()> {
    match command {
        TransferCommand::Add(args) => {
            let pair = engine.create_transfer(request(args)).await?;
            println!("transfer {} created", pair.transfer_id());
        }
        TransferCommand::Edit {
            transfer_id,
            fields,
        } => {
            engine.edit_transfer(&transfer_id, request(fields)).await?;
            println!("transfer {transfer_id} updated");
        }
        TransferCommand::Delete { transfer_id } => {
            engine.delete_transfer(&transfer_id).await?;
            println!("transfer {transfer_id} deleted");
        }
    }
    Ok(())
}

fn day_range(from: Option<NaiveDate>, to: Option<NaiveDate>) -> ResultCli<DateRange> {
    let from = from.map(start_of_day).transpose()?;
    let to = to
        .and_then(|day| day.checked_add_days(Days::new(1)))
        .map(start_of_day)
        .transpose()?;
    Ok(DateRange { from, to })
}

async fn run_report(engine: &Engine, command: ReportCommand) -> ResultCli<()> {
    match command {
        ReportCommand::Assets => {
            let total = reports::total_assets(&engine.wallets().await);
            println!("total assets: {}", Rupiah::new(total));
        }
        ReportCommand::Margin { from, to } => {
            let summary =
                reports::margin_summary(&engine.transactions().await, day_range(from, to)?);
            println!("gross margin: {}", Rupiah::new(summary.gross_margin));
            println!("withdrawn:    {}", Rupiah::new(summary.withdrawn));
            println!("rewards:      {}", Rupiah::new(summary.reward_costs));
            println!("net margin:   {}", Rupiah::new(summary.net_margin));
        }
        ReportCommand::Customers => {
            for ledger in reports::customer_ledgers(&engine.transactions().await) {
                println!(
                    "{:<24} {:>4} {:>18} {:>14} {:>18}",
                    ledger.name,
                    ledger.transactions,
                    Rupiah::new(ledger.total_amount).to_string(),
                    Rupiah::new(ledger.total_margin).to_string(),
                    Rupiah::new(ledger.outstanding).to_string()
                );
            }
        }
        ReportCommand::Receivables => {
            let transactions = engine.transactions().await;
            for tx in reports::outstanding_receivables(&transactions) {
                print_transaction(tx);
            }
        }
        ReportCommand::Daily { day } => {
            let day = day.unwrap_or_else(|| business_day(Utc::now()));
            let summary = reports::daily_summary(&engine.transactions().await, day);
            println!(
                "{}: {} transactions, in {}, out {}, margin {}",
                summary.day,
                summary.count,
                Rupiah::new(summary.total_in),
                Rupiah::new(summary.total_out),
                Rupiah::new(summary.margin)
            );
        }
    }
    Ok(())
}

fn print_transaction(tx: &Transaction) {
    println!(
        "{:<36} {} {:<24} {:<3} {:>16} {:>12} {:<10} {}{}",
        tx.id,
        format_local(tx.date),
        tx.description(),
        tx.tx_type.as_str(),
        Rupiah::new(tx.amount).to_string(),
        Rupiah::new(tx.margin).to_string(),
        tx.wallet,
        tx.customer,
        if tx.is_piutang { " (piutang)" } else { "" }
    );
}

fn print_row(row: &DisplayRow) {
    match row {
        DisplayRow::Single(tx) => print_transaction(tx),
        DisplayRow::Transfer(view) => println!(
            "{:<36} {} {:<24} {:>16} {:>12} {} -> {}",
            view.transfer_id,
            format_local(view.date),
            TRANSFER_DESCRIPTION,
            Rupiah::new(view.amount).to_string(),
            Rupiah::new(view.margin).to_string(),
            view.wallet,
            view.to_wallet
        ),
    }
}
