pub use sea_orm_migration::prelude::*;

mod m20261016_000001_aggregation;
mod m20261016_000002_bills;
mod m20261016_000003_budgets;
mod m20261016_000004_contacts;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20261016_000001_aggregation::Migration),
            Box::new(m20261016_000002_bills::Migration),
            Box::new(m20261016_000003_budgets::Migration),
            Box::new(m20261016_000004_contacts::Migration),
        ]
    }
}

/// Creates a non-unique index on a single column.
pub(crate) fn column_index<T, C>(name: &str, table: T, column: C) -> IndexCreateStatement
where
    T: IntoIden + 'static,
    C: IntoIden + 'static,
{
    Index::create()
        .name(name)
        .table(table)
        .col(column)
        .if_not_exists()
        .to_owned()
}
