use sea_orm_migration::prelude::*;

use crate::column_index;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
enum Bills {
    Table,
    Id,
    Name,
    Description,
    BillType,
    Status,
    Frequency,
    PaymentStatus,
    NextPaymentDate,
    NextPaymentAmount,
    DueAmount,
    AverageAmount,
    LastPaymentDate,
    Notes,
    AccountId,
    AccountLink,
    MerchantId,
    MerchantLink,
    CategoryId,
    CategoryLink,
}

#[derive(Iden)]
enum BillPayments {
    Table,
    Id,
    BillId,
    BillLink,
    Name,
    Date,
    PaymentStatus,
    Frequency,
    BillType,
    Amount,
    Unpayable,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Bills::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Bills::Id)
                            .big_integer()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Bills::Name).string().not_null())
                    .col(ColumnDef::new(Bills::Description).string())
                    .col(ColumnDef::new(Bills::BillType).string().not_null())
                    .col(ColumnDef::new(Bills::Status).string().not_null())
                    .col(ColumnDef::new(Bills::Frequency).string().not_null())
                    .col(ColumnDef::new(Bills::PaymentStatus).string().not_null())
                    .col(ColumnDef::new(Bills::NextPaymentDate).string().not_null())
                    .col(ColumnDef::new(Bills::NextPaymentAmount).string().not_null())
                    .col(ColumnDef::new(Bills::DueAmount).string().not_null())
                    .col(ColumnDef::new(Bills::AverageAmount).string().not_null())
                    .col(ColumnDef::new(Bills::LastPaymentDate).string())
                    .col(ColumnDef::new(Bills::Notes).string())
                    .col(ColumnDef::new(Bills::AccountId).big_integer())
                    .col(ColumnDef::new(Bills::AccountLink).big_integer())
                    .col(ColumnDef::new(Bills::MerchantId).big_integer())
                    .col(ColumnDef::new(Bills::MerchantLink).big_integer())
                    .col(ColumnDef::new(Bills::CategoryId).big_integer())
                    .col(ColumnDef::new(Bills::CategoryLink).big_integer())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(BillPayments::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(BillPayments::Id)
                            .big_integer()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(BillPayments::BillId).big_integer().not_null())
                    .col(ColumnDef::new(BillPayments::BillLink).big_integer())
                    .col(ColumnDef::new(BillPayments::Name).string().not_null())
                    .col(ColumnDef::new(BillPayments::Date).string().not_null())
                    .col(
                        ColumnDef::new(BillPayments::PaymentStatus)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(BillPayments::Frequency).string().not_null())
                    .col(ColumnDef::new(BillPayments::BillType).string().not_null())
                    .col(ColumnDef::new(BillPayments::Amount).string().not_null())
                    .col(
                        ColumnDef::new(BillPayments::Unpayable)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .to_owned(),
            )
            .await?;

        for (name, table, column) in [
            ("idx-bills-account_id", Bills::Table, Bills::AccountId),
            ("idx-bills-merchant_id", Bills::Table, Bills::MerchantId),
            ("idx-bills-category_id", Bills::Table, Bills::CategoryId),
        ] {
            manager
                .create_index(column_index(name, table, column))
                .await?;
        }
        manager
            .create_index(column_index(
                "idx-bill_payments-bill_id",
                BillPayments::Table,
                BillPayments::BillId,
            ))
            .await?;
        manager
            .create_index(column_index(
                "idx-bill_payments-date",
                BillPayments::Table,
                BillPayments::Date,
            ))
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(BillPayments::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Bills::Table).to_owned())
            .await?;
        Ok(())
    }
}
