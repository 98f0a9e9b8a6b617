//! Seeds the cash drawer and the default description list.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

const CASH_ID: &str = "CASH";

const DEFAULT_CATEGORIES: &[&str] = &[
    "Tarik Tunai",
    "Transfer Keluar",
    "Setor Tunai",
    "Pulsa",
    "Token Listrik",
    "Bayar Tagihan",
    "Fee Brilink",
    "Penyesuaian Kas",
    "Tambah Modal",
    "Bunga Bank",
    "Potongan Bank",
];

#[derive(Iden)]
enum Wallets {
    Table,
    Id,
    Name,
    Balance,
}

#[derive(Iden)]
enum Categories {
    Table,
    Name,
    Position,
}

fn seed_err(err: impl std::fmt::Display) -> DbErr {
    DbErr::Migration(err.to_string())
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let cash = Query::insert()
            .into_table(Wallets::Table)
            .columns([Wallets::Id, Wallets::Name, Wallets::Balance])
            .values([CASH_ID.into(), "Cash".into(), 0i64.into()])
            .map_err(seed_err)?
            .on_conflict(OnConflict::column(Wallets::Id).do_nothing().to_owned())
            .to_owned();
        manager.exec_stmt(cash).await?;

        let mut categories = Query::insert();
        categories
            .into_table(Categories::Table)
            .columns([Categories::Name, Categories::Position])
            .on_conflict(OnConflict::column(Categories::Name).do_nothing().to_owned());
        for (position, name) in (0i32..).zip(DEFAULT_CATEGORIES) {
            categories
                .values([(*name).into(), position.into()])
                .map_err(seed_err)?;
        }
        manager.exec_stmt(categories).await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .exec_stmt(
                Query::delete()
                    .from_table(Categories::Table)
                    .and_where(Expr::col(Categories::Name).is_in(DEFAULT_CATEGORIES.iter().copied()))
                    .to_owned(),
            )
            .await?;
        manager
            .exec_stmt(
                Query::delete()
                    .from_table(Wallets::Table)
                    .and_where(Expr::col(Wallets::Id).eq(CASH_ID))
                    .to_owned(),
            )
            .await
    }
}
