mod common;

use std::time::Duration;

use api_types::bills::{BillFrequency, BillPaymentStatus};
use common::{MockApi, account, bill, bill_payment, budget, date, eventually, merchant, sdk};
use frollo_sdk::{ApiError, BillFilter, BillPatch, BillPaymentFilter, BillPaymentPatch, EngineError};
use sea_orm::ConnectionTrait;

#[tokio::test]
async fn refresh_bills_links_bills_to_a_cached_account() {
    let api = MockApi::new();
    api.with(|state| {
        state.accounts = vec![account(100)];
        state.bills = vec![bill(1, None)];
        state.budgets = vec![budget(5, true)];
    });
    let frollo = sdk(api.clone()).await;
    frollo.aggregation().refresh_accounts().await.unwrap();
    frollo.bills().refresh_bills().await.unwrap();
    frollo.budgets().refresh_budgets(None, None).await.unwrap();

    api.with(|state| {
        state.bills = vec![bill(1, Some(100)), bill(2, Some(100))];
    });
    frollo.bills().refresh_bills().await.unwrap();

    let bills = frollo.bills().bills(&BillFilter::default()).await.unwrap().unwrap();
    let mut ids: Vec<i64> = bills.iter().map(|b| b.id).collect();
    ids.sort();
    assert_eq!(ids, vec![1, 2]);
    for bill in &bills {
        assert_eq!(bill.account_id, Some(100));
        assert_eq!(bill.account_link, Some(100));
    }
    let budget = frollo.budgets().budget(5).await.unwrap().unwrap();
    assert_eq!(budget.id, 5);
}

#[tokio::test]
async fn refresh_bills_keeps_unresolved_account_reference() {
    let api = MockApi::new();
    api.with(|state| state.bills = vec![bill(1, None)]);
    let frollo = sdk(api.clone()).await;
    frollo.bills().refresh_bills().await.unwrap();

    api.with(|state| state.bills = vec![bill(1, Some(100)), bill(2, Some(100))]);
    frollo.bills().refresh_bills().await.unwrap();

    for id in [1, 2] {
        let bill = frollo.bills().bill(id).await.unwrap().unwrap();
        assert_eq!(bill.account_id, Some(100));
        assert_eq!(bill.account_link, None);
    }
}

#[tokio::test]
async fn account_link_converges_in_either_order() {
    // Child first.
    let api = MockApi::new();
    api.with(|state| {
        state.accounts = vec![account(100)];
        state.bills = vec![bill(1, Some(100))];
    });
    let frollo = sdk(api.clone()).await;
    frollo.bills().refresh_bills().await.unwrap();
    assert_eq!(frollo.bills().bill(1).await.unwrap().unwrap().account_link, None);
    frollo.aggregation().refresh_accounts().await.unwrap();
    assert_eq!(
        frollo.bills().bill(1).await.unwrap().unwrap().account_link,
        Some(100)
    );

    // Parent first.
    let frollo = sdk(api.clone()).await;
    frollo.aggregation().refresh_accounts().await.unwrap();
    frollo.bills().refresh_bills().await.unwrap();
    assert_eq!(
        frollo.bills().bill(1).await.unwrap().unwrap().account_link,
        Some(100)
    );
}

#[tokio::test]
async fn update_of_uncached_bill_sends_nothing() {
    let api = MockApi::new();
    let frollo = sdk(api.clone()).await;

    let err = frollo
        .bills()
        .update_bill(42, BillPatch::default())
        .await
        .unwrap_err();

    assert!(matches!(err, EngineError::KeyNotFound(_)));
    assert!(api.calls().is_empty());
}

#[tokio::test]
async fn update_bill_merges_patch_over_cached_row() {
    let api = MockApi::new();
    let mut cached = bill(1, None);
    cached.notes = Some("keep".to_string());
    api.with(|state| state.bills = vec![cached]);
    let frollo = sdk(api.clone()).await;
    frollo.bills().refresh_bills().await.unwrap();

    frollo
        .bills()
        .update_bill(
            1,
            BillPatch {
                name: Some("Rent".to_string()),
                frequency: Some(BillFrequency::Fortnightly),
                ..BillPatch::default()
            },
        )
        .await
        .unwrap();

    let bill = frollo.bills().bill(1).await.unwrap().unwrap();
    assert_eq!(bill.name, "Rent");
    assert_eq!(bill.frequency().unwrap(), BillFrequency::Fortnightly);
    assert_eq!(bill.notes.as_deref(), Some("keep"));
}

#[tokio::test]
async fn api_failure_leaves_the_cache_untouched() {
    let api = MockApi::new();
    api.with(|state| state.bills = vec![bill(1, None), bill(2, None)]);
    let frollo = sdk(api.clone()).await;
    frollo.bills().refresh_bills().await.unwrap();

    api.with(|state| {
        state.bills.clear();
        state.failure = Some("maintenance".to_string());
    });
    let err = frollo.bills().refresh_bills().await.unwrap_err();

    assert_eq!(
        err,
        EngineError::Api(ApiError::Server("maintenance".to_string()))
    );
    let bills = frollo.bills().bills(&BillFilter::default()).await.unwrap().unwrap();
    assert_eq!(bills.len(), 2);
}

#[tokio::test]
async fn failed_cache_write_still_completes_the_refresh() {
    let api = MockApi::new();
    api.with(|state| state.bills = vec![bill(1, None)]);
    let frollo = sdk(api.clone()).await;
    frollo
        .store()
        .database()
        .unwrap()
        .execute_unprepared("DROP TABLE bill_payments")
        .await
        .unwrap();

    let result = frollo.bills().refresh_bills().await;

    assert_eq!(result, Ok(()));
    assert_eq!(api.calls_to("fetch_bills"), 1);
    assert!(frollo.bills().bill(1).await.unwrap().is_some());
}

#[tokio::test]
async fn create_bill_rejects_blank_name() {
    let api = MockApi::new();
    let frollo = sdk(api.clone()).await;

    let err = frollo
        .bills()
        .create_bill(
            100,
            "   ",
            "80.00".to_string(),
            BillFrequency::Monthly,
            date(2026, 11, 1),
            None,
        )
        .await
        .unwrap_err();

    assert!(matches!(err, EngineError::InvalidValue(_)));
    assert!(api.calls().is_empty());
}

#[tokio::test]
async fn create_bill_caches_the_created_bill() {
    let api = MockApi::new();
    api.with(|state| state.accounts = vec![account(100)]);
    let frollo = sdk(api.clone()).await;
    frollo.aggregation().refresh_accounts().await.unwrap();

    let id = frollo
        .bills()
        .create_bill(
            100,
            "Internet",
            "70.00".to_string(),
            BillFrequency::Monthly,
            date(2026, 11, 3),
            Some("nbn".to_string()),
        )
        .await
        .unwrap();

    let bill = frollo.bills().bill(id).await.unwrap().unwrap();
    assert_eq!(bill.name, "Internet");
    assert_eq!(bill.due_amount, "70.00");
    assert_eq!(bill.account_link, Some(100));
}

#[tokio::test]
async fn delete_bill_detaches_its_payments() {
    let api = MockApi::new();
    api.with(|state| {
        state.bills = vec![bill(1, None)];
        state.bill_payments = vec![bill_payment(10, 1, date(2026, 11, 1))];
    });
    let frollo = sdk(api.clone()).await;
    frollo.bills().refresh_bills().await.unwrap();
    frollo
        .bills()
        .refresh_bill_payments(date(2026, 10, 1), date(2026, 12, 31))
        .await
        .unwrap();
    let payment = frollo.bills().bill_payment(10).await.unwrap().unwrap();
    assert_eq!(payment.bill_link, Some(1));

    frollo.bills().delete_bill(1).await.unwrap();

    assert!(frollo.bills().bill(1).await.unwrap().is_none());
    let payment = frollo.bills().bill_payment(10).await.unwrap().unwrap();
    assert_eq!(payment.bill_id, 1);
    assert_eq!(payment.bill_link, None);
}

#[tokio::test]
async fn bill_payments_refresh_only_replaces_the_requested_range() {
    let api = MockApi::new();
    api.with(|state| {
        state.bill_payments = vec![
            bill_payment(10, 1, date(2026, 9, 15)),
            bill_payment(11, 1, date(2026, 10, 15)),
            bill_payment(12, 1, date(2026, 11, 15)),
        ];
    });
    let frollo = sdk(api.clone()).await;
    frollo
        .bills()
        .refresh_bill_payments(date(2026, 9, 1), date(2026, 11, 30))
        .await
        .unwrap();

    api.with(|state| state.bill_payments.retain(|p| p.id != 11 && p.id != 10));
    frollo
        .bills()
        .refresh_bill_payments(date(2026, 10, 1), date(2026, 10, 31))
        .await
        .unwrap();

    let mut ids: Vec<i64> = frollo
        .bills()
        .bill_payments(&BillPaymentFilter::default())
        .await
        .unwrap()
        .unwrap()
        .iter()
        .map(|p| p.id)
        .collect();
    ids.sort();
    assert_eq!(ids, vec![10, 12]);
}

#[tokio::test]
async fn update_bill_payment_marks_it_paid() {
    let api = MockApi::new();
    api.with(|state| state.bill_payments = vec![bill_payment(10, 1, date(2026, 10, 15))]);
    let frollo = sdk(api.clone()).await;
    frollo
        .bills()
        .refresh_bill_payments(date(2026, 10, 1), date(2026, 10, 31))
        .await
        .unwrap();

    frollo
        .bills()
        .update_bill_payment(
            10,
            BillPaymentPatch {
                paid: Some(true),
                ..BillPaymentPatch::default()
            },
        )
        .await
        .unwrap();

    let payment = frollo.bills().bill_payment(10).await.unwrap().unwrap();
    assert_eq!(payment.payment_status().unwrap(), BillPaymentStatus::Paid);
}

#[tokio::test]
async fn missing_merchant_is_fetched_once() {
    let api = MockApi::new();
    let mut first = bill(1, None);
    first.merchant_id = Some(30);
    let mut second = bill(2, None);
    second.merchant_id = Some(30);
    api.with(|state| {
        state.bills = vec![first, second];
        state.merchants = vec![merchant(30)];
        state.merchant_delay = Some(Duration::from_millis(100));
    });
    let frollo = sdk(api.clone()).await;

    frollo.bills().refresh_bills().await.unwrap();
    frollo.bills().refresh_bills().await.unwrap();

    let mut done = false;
    for _ in 0..200 {
        let bills = frollo.bills().bills(&BillFilter::default()).await.unwrap().unwrap();
        if bills.iter().all(|b| b.merchant_link == Some(30)) {
            done = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert!(done);
    assert!(eventually(|| api.calls_to("fetch_merchants") == 1).await);
    assert!(frollo.aggregation().merchant(30).await.unwrap().is_some());
}
