use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
enum Contacts {
    Table,
    Id,
    Name,
    NickName,
    Description,
    Verified,
    RelatedProviderAccountIds,
    PaymentMethod,
    PaymentDetails,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // `payment_details` is the JSON body of the variant named by
        // `payment_method`.
        manager
            .create_table(
                Table::create()
                    .table(Contacts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Contacts::Id)
                            .big_integer()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Contacts::Name).string().not_null())
                    .col(ColumnDef::new(Contacts::NickName).string())
                    .col(ColumnDef::new(Contacts::Description).string())
                    .col(
                        ColumnDef::new(Contacts::Verified)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Contacts::RelatedProviderAccountIds)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Contacts::PaymentMethod).string().not_null())
                    .col(ColumnDef::new(Contacts::PaymentDetails).text().not_null())
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Contacts::Table).to_owned())
            .await?;
        Ok(())
    }
}
