use sea_orm_migration::prelude::*;

use crate::column_index;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
enum Budgets {
    Table,
    Id,
    BudgetType,
    TypeValue,
    Frequency,
    Status,
    IsCurrent,
    CurrentAmount,
    TargetAmount,
    PeriodAmount,
    StartDate,
    TrackingStatus,
    ImageUrl,
}

#[derive(Iden)]
enum BudgetPeriods {
    Table,
    Id,
    BudgetId,
    BudgetLink,
    StartDate,
    EndDate,
    CurrentAmount,
    TargetAmount,
    RequiredAmount,
    TrackingStatus,
    Index,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Budgets::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Budgets::Id)
                            .big_integer()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Budgets::BudgetType).string().not_null())
                    .col(ColumnDef::new(Budgets::TypeValue).string().not_null())
                    .col(ColumnDef::new(Budgets::Frequency).string().not_null())
                    .col(ColumnDef::new(Budgets::Status).string().not_null())
                    .col(
                        ColumnDef::new(Budgets::IsCurrent)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(ColumnDef::new(Budgets::CurrentAmount).string().not_null())
                    .col(ColumnDef::new(Budgets::TargetAmount).string())
                    .col(ColumnDef::new(Budgets::PeriodAmount).string().not_null())
                    .col(ColumnDef::new(Budgets::StartDate).string())
                    .col(ColumnDef::new(Budgets::TrackingStatus).string().not_null())
                    .col(ColumnDef::new(Budgets::ImageUrl).string())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(BudgetPeriods::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(BudgetPeriods::Id)
                            .big_integer()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(BudgetPeriods::BudgetId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(BudgetPeriods::BudgetLink).big_integer())
                    .col(ColumnDef::new(BudgetPeriods::StartDate).string().not_null())
                    .col(ColumnDef::new(BudgetPeriods::EndDate).string().not_null())
                    .col(
                        ColumnDef::new(BudgetPeriods::CurrentAmount)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(BudgetPeriods::TargetAmount)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(BudgetPeriods::RequiredAmount)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(BudgetPeriods::TrackingStatus)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(BudgetPeriods::Index)
                            .big_integer()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(column_index(
                "idx-budget_periods-budget_id",
                BudgetPeriods::Table,
                BudgetPeriods::BudgetId,
            ))
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(BudgetPeriods::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Budgets::Table).to_owned())
            .await?;
        Ok(())
    }
}
