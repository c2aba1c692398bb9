use sea_orm_migration::prelude::*;

use crate::column_index;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
enum Accounts {
    Table,
    Id,
    AccountName,
    NickName,
    AccountType,
    AccountStatus,
    ProviderName,
    BalanceAmount,
    BalanceCurrency,
    Included,
    Favourite,
    Hidden,
}

#[derive(Iden)]
enum Merchants {
    Table,
    Id,
    Name,
    MerchantType,
    SmallLogoUrl,
}

#[derive(Iden)]
enum TransactionCategories {
    Table,
    Id,
    Name,
    CategoryType,
    DefaultBudgetCategory,
    IconUrl,
}

#[derive(Iden)]
enum Transactions {
    Table,
    Id,
    AccountId,
    AccountLink,
    MerchantId,
    MerchantLink,
    CategoryId,
    CategoryLink,
    TransactionDate,
    Amount,
    Currency,
    Description,
    Status,
    BaseType,
    BudgetCategory,
    Included,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Accounts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Accounts::Id)
                            .big_integer()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Accounts::AccountName).string().not_null())
                    .col(ColumnDef::new(Accounts::NickName).string())
                    .col(ColumnDef::new(Accounts::AccountType).string().not_null())
                    .col(ColumnDef::new(Accounts::AccountStatus).string().not_null())
                    .col(ColumnDef::new(Accounts::ProviderName).string().not_null())
                    .col(ColumnDef::new(Accounts::BalanceAmount).string())
                    .col(ColumnDef::new(Accounts::BalanceCurrency).string())
                    .col(
                        ColumnDef::new(Accounts::Included)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Accounts::Favourite)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Accounts::Hidden)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Merchants::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Merchants::Id)
                            .big_integer()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Merchants::Name).string().not_null())
                    .col(ColumnDef::new(Merchants::MerchantType).string().not_null())
                    .col(ColumnDef::new(Merchants::SmallLogoUrl).string())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(TransactionCategories::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TransactionCategories::Id)
                            .big_integer()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(TransactionCategories::Name)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TransactionCategories::CategoryType)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TransactionCategories::DefaultBudgetCategory)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(TransactionCategories::IconUrl).string())
                    .to_owned(),
            )
            .await?;

        // Reference columns hold the server value; `*_link` columns are the
        // resolved edges and stay NULL until the parent row is cached.
        manager
            .create_table(
                Table::create()
                    .table(Transactions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Transactions::Id)
                            .big_integer()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Transactions::AccountId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Transactions::AccountLink).big_integer())
                    .col(ColumnDef::new(Transactions::MerchantId).big_integer())
                    .col(ColumnDef::new(Transactions::MerchantLink).big_integer())
                    .col(ColumnDef::new(Transactions::CategoryId).big_integer())
                    .col(ColumnDef::new(Transactions::CategoryLink).big_integer())
                    .col(
                        ColumnDef::new(Transactions::TransactionDate)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Transactions::Amount).string().not_null())
                    .col(ColumnDef::new(Transactions::Currency).string().not_null())
                    .col(ColumnDef::new(Transactions::Description).string().not_null())
                    .col(ColumnDef::new(Transactions::Status).string().not_null())
                    .col(ColumnDef::new(Transactions::BaseType).string().not_null())
                    .col(
                        ColumnDef::new(Transactions::BudgetCategory)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Transactions::Included)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .to_owned(),
            )
            .await?;

        for (name, column) in [
            ("idx-transactions-account_id", Transactions::AccountId),
            ("idx-transactions-merchant_id", Transactions::MerchantId),
            ("idx-transactions-category_id", Transactions::CategoryId),
            ("idx-transactions-transaction_date", Transactions::TransactionDate),
        ] {
            manager
                .create_index(column_index(name, Transactions::Table, column))
                .await?;
        }

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Transactions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(TransactionCategories::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Merchants::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Accounts::Table).to_owned())
            .await?;
        Ok(())
    }
}
