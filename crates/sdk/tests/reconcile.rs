mod common;

use common::{bill, budget, date};
use frollo_sdk::{
    Store, accounts, bills, budgets,
    cache::{self, CachedObject, SyncScope},
};
use sea_orm::{ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryOrder};

async fn store() -> Store {
    Store::open("sqlite::memory:").await.unwrap()
}

async fn budget_ids(db: &DatabaseConnection) -> Vec<i64> {
    budgets::Entity::find()
        .order_by_asc(budgets::Column::Id)
        .all(db)
        .await
        .unwrap()
        .into_iter()
        .map(|b| b.id)
        .collect()
}

#[tokio::test]
async fn reconcile_updates_inserts_and_deletes_within_scope() {
    let store = store().await;
    let db = store.database().unwrap();
    cache::reconcile::<budgets::Entity>(
        db,
        &[budget(1, true), budget(2, true), budget(3, true)],
        &SyncScope::all(),
        &[],
    )
    .await
    .unwrap();

    let mut changed = budget(2, true);
    changed.period_amount = "750.00".to_string();
    let reconciled = cache::reconcile::<budgets::Entity>(
        db,
        &[changed, budget(4, true)],
        &SyncScope::all(),
        &[],
    )
    .await
    .unwrap();

    assert_eq!(reconciled.inserted, vec![4]);
    assert_eq!(reconciled.updated, vec![2]);
    assert_eq!(reconciled.deleted, vec![1, 3]);
    assert_eq!(budget_ids(db).await, vec![2, 4]);
    let updated = budgets::Entity::find_by_id(2).one(db).await.unwrap().unwrap();
    assert_eq!(updated.period_amount, "750.00");
}

#[tokio::test]
async fn reconcile_never_deletes_outside_scope() {
    let store = store().await;
    let db = store.database().unwrap();
    cache::reconcile::<budgets::Entity>(
        db,
        &[budget(1, true), budget(2, false), budget(3, false)],
        &SyncScope::all(),
        &[],
    )
    .await
    .unwrap();

    let current = SyncScope::matching(Condition::all().add(budgets::Column::IsCurrent.eq(true)));
    let reconciled =
        cache::reconcile::<budgets::Entity>(db, &[budget(4, true)], &current, &[])
            .await
            .unwrap();

    assert_eq!(reconciled.deleted, vec![1]);
    assert_eq!(budget_ids(db).await, vec![2, 3, 4]);
}

#[tokio::test]
async fn reconcile_one_only_touches_its_row() {
    let store = store().await;
    let db = store.database().unwrap();
    cache::reconcile::<budgets::Entity>(
        db,
        &[budget(1, true), budget(2, true)],
        &SyncScope::all(),
        &[],
    )
    .await
    .unwrap();

    let mut changed = budget(2, false);
    changed.type_value = "lifestyle".to_string();
    cache::reconcile_one::<budgets::Entity>(db, &changed, &[])
        .await
        .unwrap();
    cache::reconcile_one::<budgets::Entity>(db, &budget(9, true), &[])
        .await
        .unwrap();

    assert_eq!(budget_ids(db).await, vec![1, 2, 9]);
    let updated = budgets::Entity::find_by_id(2).one(db).await.unwrap().unwrap();
    assert_eq!(updated.type_value, "lifestyle");
    assert!(!updated.is_current);
}

#[tokio::test]
async fn reconcile_is_idempotent() {
    let store = store().await;
    let db = store.database().unwrap();
    let response = vec![bill(1, Some(100)), bill(2, None)];

    cache::reconcile::<bills::Entity>(db, &response, &SyncScope::all(), bills::Entity::LINKS)
        .await
        .unwrap();
    let first = bills::Entity::find()
        .order_by_asc(bills::Column::Id)
        .all(db)
        .await
        .unwrap();

    let second_pass =
        cache::reconcile::<bills::Entity>(db, &response, &SyncScope::all(), bills::Entity::LINKS)
            .await
            .unwrap();
    let second = bills::Entity::find()
        .order_by_asc(bills::Column::Id)
        .all(db)
        .await
        .unwrap();

    assert_eq!(first, second);
    assert!(second_pass.inserted.is_empty());
    assert!(second_pass.deleted.is_empty());
    assert_eq!(second_pass.updated, vec![1, 2]);
}

#[tokio::test]
async fn duplicate_ids_in_one_batch_keep_the_last() {
    let store = store().await;
    let db = store.database().unwrap();
    let mut later = bill(7, None);
    later.name = "Second".to_string();

    let reconciled = cache::reconcile::<bills::Entity>(
        db,
        &[bill(7, None), later],
        &SyncScope::all(),
        bills::Entity::LINKS,
    )
    .await
    .unwrap();

    assert_eq!(reconciled.inserted, vec![7]);
    let rows = bills::Entity::find().all(db).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].name, "Second");
}

#[tokio::test]
async fn changed_reference_resets_the_edge() {
    let store = store().await;
    let db = store.database().unwrap();
    cache::reconcile::<accounts::Entity>(
        db,
        &[common::account(100), common::account(200)],
        &SyncScope::all(),
        &[],
    )
    .await
    .unwrap();
    let reconciled = cache::reconcile::<bills::Entity>(
        db,
        &[bill(1, Some(100))],
        &SyncScope::all(),
        bills::Entity::LINKS,
    )
    .await
    .unwrap();
    let pending = reconciled.links.ids(&bills::ACCOUNT);
    cache::link::<bills::Entity, accounts::Entity>(db, &bills::ACCOUNT, &pending)
        .await
        .unwrap();
    let linked = bills::Entity::find_by_id(1).one(db).await.unwrap().unwrap();
    assert_eq!(linked.account_link, Some(100));

    let mut moved = bill(1, Some(200));
    moved.next_payment_date = date(2026, 12, 1);
    cache::reconcile::<bills::Entity>(db, &[moved], &SyncScope::all(), bills::Entity::LINKS)
        .await
        .unwrap();

    let row = bills::Entity::find_by_id(1).one(db).await.unwrap().unwrap();
    assert_eq!(row.account_id, Some(200));
    assert_eq!(row.account_link, None);
}

#[tokio::test]
async fn empty_response_clears_a_bounded_scope() {
    let store = store().await;
    let db = store.database().unwrap();
    cache::reconcile::<budgets::Entity>(
        db,
        &[budget(1, true), budget(2, false)],
        &SyncScope::all(),
        &[],
    )
    .await
    .unwrap();

    let reconciled = cache::reconcile::<budgets::Entity>(db, &[], &SyncScope::all(), &[])
        .await
        .unwrap();

    assert_eq!(reconciled.deleted, vec![1, 2]);
    assert!(reconciled.inserted.is_empty());
    assert!(budget_ids(db).await.is_empty());
}
