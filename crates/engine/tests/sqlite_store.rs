use std::time::Duration;

use chrono::{TimeZone, Utc};
use sea_orm::{Database, DatabaseConnection};

use engine::{
    Engine, EngineError, LedgerStore, MarginType, NewWallet, SqliteStore, TransactionDraft,
    TransactionPatch, TransferRequest, TxType, Wallet, WalletUpdate, kinds,
};
use migration::MigratorTrait;

async fn migrated_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    db
}

async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = migrated_db().await;
    let engine = Engine::builder()
        .store(SqliteStore::new(db.clone()))
        .build()
        .await
        .unwrap();
    (engine, db)
}

fn sorted(mut wallets: Vec<Wallet>) -> Vec<Wallet> {
    wallets.sort_by(|a, b| a.id.cmp(&b.id));
    wallets
}

async fn reopen(db: &DatabaseConnection) -> Engine {
    Engine::builder()
        .store(SqliteStore::new(db.clone()))
        .build()
        .await
        .unwrap()
}

#[tokio::test]
async fn migrations_seed_cash_and_categories() {
    let store = SqliteStore::new(migrated_db().await);

    let wallets = store.get_wallets().await.unwrap();
    assert_eq!(wallets.len(), 1);
    assert!(wallets[0].is_cash());

    let categories = store.get_categories().await.unwrap();
    assert_eq!(categories.len(), 11);
    assert_eq!(categories[0], kinds::TARIK_TUNAI);
    assert!(categories.iter().any(|c| c == kinds::POTONGAN_BANK));
}

#[tokio::test]
async fn balances_survive_a_restart() {
    let (engine, db) = engine_with_db().await;

    engine
        .create_wallet(NewWallet::new("BRI", 500_000).icon("bank"))
        .await
        .unwrap();
    engine
        .create_transaction(
            TransactionDraft::new(kinds::TARIK_TUNAI, TxType::In, 50_000, "BRI")
                .margin(5_000)
                .margin_type(MarginType::Luar),
        )
        .await
        .unwrap();
    engine
        .create_transfer(TransferRequest::new("BRI", "CASH", 100_000).fee(2_500))
        .await
        .unwrap();

    let reopened = reopen(&db).await;
    assert_eq!(
        sorted(reopened.wallets().await),
        sorted(engine.wallets().await)
    );
    assert_eq!(reopened.wallet("BRI").await.unwrap().balance, 447_500);
    assert_eq!(reopened.wallet("CASH").await.unwrap().balance, 55_000);
    assert_eq!(reopened.display_transactions().await.len(), 2);
}

#[tokio::test]
async fn transaction_fields_round_trip() {
    let (engine, db) = engine_with_db().await;
    engine
        .create_wallet(NewWallet::new("BRI", 0).id("BRI"))
        .await
        .unwrap();

    let created = engine
        .create_transaction(
            TransactionDraft::new(kinds::TARIK_TUNAI, TxType::In, 50_000, "BRI")
                .margin(5_000)
                .margin_type(MarginType::Luar)
                .customer("Siti")
                .piutang(true)
                .notes("bayar besok")
                .date(Utc.with_ymd_and_hms(2024, 3, 1, 2, 30, 0).unwrap()),
        )
        .await
        .unwrap();

    let stored = SqliteStore::new(db).get_transactions().await.unwrap();
    assert_eq!(stored, vec![created.clone()]);
    assert_eq!(stored[0].kind(), engine::TransactionKind::TarikTunai);
    assert_eq!(stored[0].margin_type, Some(MarginType::Luar));
}

#[tokio::test]
async fn settlement_survives_a_restart() {
    let (engine, db) = engine_with_db().await;
    let tx = engine
        .create_transaction(
            TransactionDraft::new("Transfer Keluar", TxType::Out, 10_000, "CASH")
                .margin(500)
                .piutang(true),
        )
        .await
        .unwrap();
    engine.settle_receivable(&tx.id).await.unwrap();

    let reopened = reopen(&db).await;
    let stored = reopened.transaction(&tx.id).await.unwrap();
    assert!(!stored.is_piutang);
    assert!(stored.settled_at.is_some());

    let reverted = reopened.revert_settlement(&tx.id).await.unwrap();
    assert_eq!(reverted.settled_at, None);
    let stored = SqliteStore::new(db).get_transactions().await.unwrap();
    assert!(stored[0].is_piutang);
    assert_eq!(stored[0].settled_at, None);
}

#[tokio::test]
async fn missing_rows_are_key_not_found() {
    let store = SqliteStore::new(migrated_db().await);

    let err = store
        .update_transaction("nope", TransactionPatch::unsettled())
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));

    let err = store.delete_transaction("nope").await.unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));

    let err = store.update_wallet_balance("nope", 1).await.unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));

    let err = store
        .update_wallet(
            "nope",
            WalletUpdate {
                name: Some("x".to_string()),
                icon: None,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));

    let err = store
        .create_wallet(NewWallet::new("Cash again", 0).id("CASH"))
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::ExistingKey("CASH".to_string()));
}

#[tokio::test]
async fn grace_delete_reaches_the_database() {
    let db = migrated_db().await;
    let engine = Engine::builder()
        .store(SqliteStore::new(db.clone()))
        .grace_period(Duration::from_millis(20))
        .build()
        .await
        .unwrap();
    let tx = engine.record_reward("Kaos", 30_000, None, None).await.unwrap();
    assert_eq!(engine.wallet("CASH").await.unwrap().balance, -30_000);

    engine
        .schedule_delete(&tx.id)
        .await
        .unwrap()
        .outcome()
        .await
        .unwrap();

    let reopened = reopen(&db).await;
    assert!(reopened.transactions().await.is_empty());
    assert_eq!(reopened.wallet("CASH").await.unwrap().balance, 0);
}
