mod common;

use api_types::budgets::{BudgetCreateRequest, BudgetFrequency, BudgetType};
use common::{MockApi, budget, budget_period, date, sdk};
use frollo_sdk::{BudgetFilter, BudgetPatch, BudgetPeriodFilter, EngineError};

fn period_ids(periods: &[frollo_sdk::budget_periods::Model]) -> Vec<i64> {
    let mut ids: Vec<i64> = periods.iter().map(|p| p.id).collect();
    ids.sort();
    ids
}

#[tokio::test]
async fn refresh_current_budgets_keeps_past_ones() {
    let api = MockApi::new();
    api.with(|state| state.budgets = vec![budget(1, true), budget(2, false)]);
    let frollo = sdk(api.clone()).await;
    frollo.budgets().refresh_budgets(None, None).await.unwrap();

    api.with(|state| state.budgets = vec![budget(3, true), budget(2, false)]);
    frollo
        .budgets()
        .refresh_budgets(Some(true), None)
        .await
        .unwrap();

    let mut ids: Vec<i64> = frollo
        .budgets()
        .budgets(&BudgetFilter::default())
        .await
        .unwrap()
        .unwrap()
        .iter()
        .map(|b| b.id)
        .collect();
    ids.sort();
    assert_eq!(ids, vec![2, 3]);
}

#[tokio::test]
async fn periods_link_to_budget_in_either_order() {
    let api = MockApi::new();
    api.with(|state| {
        state.budgets = vec![budget(5, true)];
        state.budget_periods = vec![budget_period(50, 5, date(2026, 10, 1))];
    });
    let frollo = sdk(api.clone()).await;

    frollo
        .budgets()
        .refresh_budget_periods(5, None, None)
        .await
        .unwrap();
    let period = frollo.budgets().budget_period(50).await.unwrap().unwrap();
    assert_eq!(period.budget_link, None);

    frollo.budgets().refresh_budgets(None, None).await.unwrap();
    let period = frollo.budgets().budget_period(50).await.unwrap().unwrap();
    assert_eq!(period.budget_link, Some(5));

    frollo.budgets().delete_budget(5).await.unwrap();
    let period = frollo.budgets().budget_period(50).await.unwrap().unwrap();
    assert_eq!(period.budget_id, 5);
    assert_eq!(period.budget_link, None);
}

#[tokio::test]
async fn period_refresh_is_bounded_by_budget_and_dates() {
    let api = MockApi::new();
    api.with(|state| {
        state.budgets = vec![budget(5, true), budget(6, true)];
        state.budget_periods = vec![
            budget_period(50, 5, date(2026, 8, 1)),
            budget_period(51, 5, date(2026, 9, 1)),
            budget_period(52, 5, date(2026, 10, 1)),
            budget_period(60, 6, date(2026, 9, 1)),
        ];
    });
    let frollo = sdk(api.clone()).await;
    frollo.budgets().refresh_budgets(None, None).await.unwrap();
    frollo
        .budgets()
        .refresh_budget_periods(5, None, None)
        .await
        .unwrap();
    frollo
        .budgets()
        .refresh_budget_periods(6, None, None)
        .await
        .unwrap();

    api.with(|state| state.budget_periods.retain(|p| p.id == 52 || p.id == 60));
    frollo
        .budgets()
        .refresh_budget_periods(5, Some(date(2026, 9, 1)), Some(date(2026, 12, 31)))
        .await
        .unwrap();

    let periods = frollo
        .budgets()
        .budget_periods(&BudgetPeriodFilter::default())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(period_ids(&periods), vec![50, 52, 60]);
}

#[tokio::test]
async fn create_and_update_budget() {
    let api = MockApi::new();
    let frollo = sdk(api.clone()).await;

    let id = frollo
        .budgets()
        .create_budget(BudgetCreateRequest {
            budget_type: BudgetType::Merchant,
            type_value: "30".to_string(),
            frequency: BudgetFrequency::Weekly,
            period_amount: "50.00".to_string(),
            start_date: Some(date(2026, 10, 12)),
            target_amount: None,
            image_url: None,
        })
        .await
        .unwrap();

    frollo
        .budgets()
        .update_budget(
            id,
            BudgetPatch {
                period_amount: Some("65.00".to_string()),
                ..BudgetPatch::default()
            },
        )
        .await
        .unwrap();

    let budget = frollo.budgets().budget(id).await.unwrap().unwrap();
    assert_eq!(budget.budget_type().unwrap(), BudgetType::Merchant);
    assert_eq!(budget.type_value, "30");
    assert_eq!(budget.period_amount, "65.00");
    assert_eq!(budget.start_date().unwrap(), Some(date(2026, 10, 12)));
}

#[tokio::test]
async fn create_budget_requires_type_value() {
    let api = MockApi::new();
    let frollo = sdk(api.clone()).await;

    let err = frollo
        .budgets()
        .create_budget(BudgetCreateRequest {
            budget_type: BudgetType::Category,
            type_value: " ".to_string(),
            frequency: BudgetFrequency::Monthly,
            period_amount: "50.00".to_string(),
            start_date: None,
            target_amount: None,
            image_url: None,
        })
        .await
        .unwrap_err();

    assert!(matches!(err, EngineError::InvalidValue(_)));
    assert!(api.calls().is_empty());
}

#[tokio::test]
async fn update_of_uncached_budget_sends_nothing() {
    let api = MockApi::new();
    let frollo = sdk(api.clone()).await;

    let err = frollo
        .budgets()
        .update_budget(8, BudgetPatch::default())
        .await
        .unwrap_err();

    assert_eq!(err, EngineError::KeyNotFound("budget 8".to_string()));
    assert!(api.calls().is_empty());
}
