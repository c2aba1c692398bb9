use std::sync::Arc;

use api_types::budgets::{
    BudgetCreateRequest, BudgetFrequency, BudgetListQuery, BudgetPeriodListQuery,
    BudgetPeriodResponse, BudgetResponse, BudgetStatus, BudgetTrackingStatus, BudgetType,
    BudgetUpdateRequest,
};
use chrono::NaiveDate;
use sea_orm::{ColumnTrait, Condition, DatabaseConnection};

use super::Shared;
use crate::{
    EngineError, ResultEngine, budget_periods, budgets,
    cache::{
        self, CachedObject, Filter, LiveQuery, Sort, SyncScope, detach, link, reconcile, remove,
    },
    locks::EntityKind,
    util::format_date,
};

const BUDGET_LOCKS: &[EntityKind] = &[EntityKind::Budgets, EntityKind::BudgetPeriods];

/// Typed read filter for cached budgets.
#[derive(Clone, Debug, Default)]
pub struct BudgetFilter {
    pub current: Option<bool>,
    pub budget_type: Option<BudgetType>,
    pub type_value: Option<String>,
    pub frequency: Option<BudgetFrequency>,
    pub status: Option<BudgetStatus>,
    pub tracking_status: Option<BudgetTrackingStatus>,
    pub predicate: Option<Condition>,
}

impl BudgetFilter {
    fn to_filter(&self) -> Filter<budgets::Entity> {
        let mut filter = Filter::new();
        if let Some(current) = self.current {
            filter = filter.equals(budgets::Column::IsCurrent, current);
        }
        if let Some(budget_type) = self.budget_type {
            filter = filter.equals(budgets::Column::BudgetType, budget_type.as_str());
        }
        if let Some(type_value) = &self.type_value {
            filter = filter.equals(budgets::Column::TypeValue, type_value.as_str());
        }
        if let Some(frequency) = self.frequency {
            filter = filter.equals(budgets::Column::Frequency, frequency.as_str());
        }
        if let Some(status) = self.status {
            filter = filter.equals(budgets::Column::Status, status.as_str());
        }
        if let Some(tracking_status) = self.tracking_status {
            filter = filter.equals(budgets::Column::TrackingStatus, tracking_status.as_str());
        }
        if let Some(predicate) = &self.predicate {
            filter = filter.predicate(predicate.clone());
        }
        filter
    }
}

/// Changes to apply to a cached budget. `None` keeps the cached value.
#[derive(Clone, Debug, Default)]
pub struct BudgetPatch {
    pub period_amount: Option<String>,
    pub target_amount: Option<String>,
    pub image_url: Option<String>,
}

/// Typed read filter for cached budget periods.
#[derive(Clone, Debug, Default)]
pub struct BudgetPeriodFilter {
    pub budget_id: Option<i64>,
    pub tracking_status: Option<BudgetTrackingStatus>,
    /// Periods starting on or after this date.
    pub from_date: Option<NaiveDate>,
    /// Periods ending on or before this date.
    pub to_date: Option<NaiveDate>,
    pub predicate: Option<Condition>,
}

impl BudgetPeriodFilter {
    fn to_filter(&self) -> Filter<budget_periods::Entity> {
        let mut filter = Filter::new();
        if let Some(budget_id) = self.budget_id {
            filter = filter.equals(budget_periods::Column::BudgetId, budget_id);
        }
        if let Some(tracking_status) = self.tracking_status {
            filter = filter.equals(
                budget_periods::Column::TrackingStatus,
                tracking_status.as_str(),
            );
        }
        if let Some(from) = self.from_date {
            filter = filter.on_or_after(budget_periods::Column::StartDate, from);
        }
        if let Some(to) = self.to_date {
            filter = filter.on_or_before(budget_periods::Column::EndDate, to);
        }
        if let Some(predicate) = &self.predicate {
            filter = filter.predicate(predicate.clone());
        }
        filter
    }
}

fn by_start_date() -> Sort<budget_periods::Entity> {
    Sort::ascending(budget_periods::Column::StartDate).then_ascending(budget_periods::Column::Id)
}

/// Budgets and their periods.
#[derive(Clone)]
pub struct Budgets {
    shared: Arc<Shared>,
}

impl Budgets {
    pub(crate) fn new(shared: Arc<Shared>) -> Self {
        Self { shared }
    }

    pub async fn budgets(&self, filter: &BudgetFilter) -> ResultEngine<Option<Vec<budgets::Model>>> {
        cache::list(&self.shared.store, &filter.to_filter(), &Sort::default(), None).await
    }

    pub async fn budget(&self, budget_id: i64) -> ResultEngine<Option<budgets::Model>> {
        cache::get::<budgets::Entity>(&self.shared.store, budget_id).await
    }

    pub fn budgets_live(&self, filter: &BudgetFilter) -> Option<LiveQuery<budgets::Entity>> {
        cache::live_query(&self.shared.store, filter.to_filter(), Sort::default(), None)
    }

    /// Fetch budgets, optionally only current ones or one type. Cached
    /// budgets outside those filters are left alone.
    pub async fn refresh_budgets(
        &self,
        current: Option<bool>,
        budget_type: Option<BudgetType>,
    ) -> ResultEngine<()> {
        let db = self.shared.database()?;
        let query = BudgetListQuery {
            current,
            category_type: budget_type,
        };
        let response = self.shared.api.fetch_budgets(&query).await?;

        let mut condition = Condition::all();
        if let Some(current) = current {
            condition = condition.add(budgets::Column::IsCurrent.eq(current));
        }
        if let Some(budget_type) = budget_type {
            condition = condition.add(budgets::Column::BudgetType.eq(budget_type.as_str()));
        }
        self.shared
            .persist(
                "refresh_budgets",
                BUDGET_LOCKS,
                save_budgets(db, &response, &SyncScope::matching(condition)),
            )
            .await;
        Ok(())
    }

    pub async fn refresh_budget(&self, budget_id: i64) -> ResultEngine<()> {
        let db = self.shared.database()?;
        let response = self.shared.api.fetch_budget(budget_id).await?;
        self.shared
            .persist(
                "refresh_budget",
                BUDGET_LOCKS,
                save_budgets(db, std::slice::from_ref(&response), &SyncScope::unbounded()),
            )
            .await;
        Ok(())
    }

    /// Create a budget and return its id.
    pub async fn create_budget(&self, request: BudgetCreateRequest) -> ResultEngine<i64> {
        let db = self.shared.database()?;
        if request.type_value.trim().is_empty() {
            return Err(EngineError::InvalidValue(
                "budget type value must not be empty".to_string(),
            ));
        }
        let response = self.shared.api.create_budget(&request).await?;
        self.shared
            .persist(
                "create_budget",
                BUDGET_LOCKS,
                save_budgets(db, std::slice::from_ref(&response), &SyncScope::unbounded()),
            )
            .await;
        Ok(response.id)
    }

    /// Apply `patch` on top of the cached budget and send it.
    pub async fn update_budget(&self, budget_id: i64, patch: BudgetPatch) -> ResultEngine<()> {
        let db = self.shared.database()?;
        let Some(current) = cache::get::<budgets::Entity>(&self.shared.store, budget_id).await?
        else {
            return Err(EngineError::KeyNotFound(format!("budget {budget_id}")));
        };

        let request = BudgetUpdateRequest {
            period_amount: patch.period_amount.unwrap_or(current.period_amount),
            target_amount: patch.target_amount.or(current.target_amount),
            image_url: patch.image_url.or(current.image_url),
        };
        let response = self.shared.api.update_budget(budget_id, &request).await?;
        self.shared
            .persist(
                "update_budget",
                BUDGET_LOCKS,
                save_budgets(db, std::slice::from_ref(&response), &SyncScope::unbounded()),
            )
            .await;
        Ok(())
    }

    /// Delete the budget on the server, then locally. Cached periods of the
    /// budget lose their edge to it.
    pub async fn delete_budget(&self, budget_id: i64) -> ResultEngine<()> {
        let db = self.shared.database()?;
        self.shared.api.delete_budget(budget_id).await?;
        self.shared
            .persist("delete_budget", BUDGET_LOCKS, async {
                remove::<budgets::Entity>(db, &[budget_id]).await?;
                detach::<budget_periods::Entity>(db, &budget_periods::BUDGET, &[budget_id])
                    .await?;
                Ok::<_, EngineError>(())
            })
            .await;
        Ok(())
    }

    // Budget periods

    pub async fn budget_periods(
        &self,
        filter: &BudgetPeriodFilter,
    ) -> ResultEngine<Option<Vec<budget_periods::Model>>> {
        cache::list(&self.shared.store, &filter.to_filter(), &by_start_date(), None).await
    }

    pub async fn budget_period(
        &self,
        period_id: i64,
    ) -> ResultEngine<Option<budget_periods::Model>> {
        cache::get::<budget_periods::Entity>(&self.shared.store, period_id).await
    }

    pub fn budget_periods_live(
        &self,
        filter: &BudgetPeriodFilter,
    ) -> Option<LiveQuery<budget_periods::Entity>> {
        cache::live_query(&self.shared.store, filter.to_filter(), by_start_date(), None)
    }

    /// Fetch the periods of one budget. Only cached periods of that budget
    /// inside the requested dates can be removed.
    pub async fn refresh_budget_periods(
        &self,
        budget_id: i64,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> ResultEngine<()> {
        let db = self.shared.database()?;
        let query = BudgetPeriodListQuery {
            from_date: from,
            to_date: to,
        };
        let response = self
            .shared
            .api
            .fetch_budget_periods(budget_id, &query)
            .await?;

        let mut condition = Condition::all().add(budget_periods::Column::BudgetId.eq(budget_id));
        if let Some(from) = from {
            condition = condition.add(budget_periods::Column::StartDate.gte(format_date(from)));
        }
        if let Some(to) = to {
            condition = condition.add(budget_periods::Column::EndDate.lte(format_date(to)));
        }
        self.shared
            .persist(
                "refresh_budget_periods",
                BUDGET_LOCKS,
                save_budget_periods(db, &response, &SyncScope::matching(condition)),
            )
            .await;
        Ok(())
    }

    pub async fn refresh_budget_period(&self, budget_id: i64, period_id: i64) -> ResultEngine<()> {
        let db = self.shared.database()?;
        let response = self
            .shared
            .api
            .fetch_budget_period(budget_id, period_id)
            .await?;
        self.shared
            .persist(
                "refresh_budget_period",
                BUDGET_LOCKS,
                save_budget_periods(db, std::slice::from_ref(&response), &SyncScope::unbounded()),
            )
            .await;
        Ok(())
    }
}

async fn save_budgets(
    db: &DatabaseConnection,
    response: &[BudgetResponse],
    scope: &SyncScope,
) -> ResultEngine<()> {
    let reconciled = reconcile::<budgets::Entity>(db, response, scope, &[]).await?;
    link::<budget_periods::Entity, budgets::Entity>(
        db,
        &budget_periods::BUDGET,
        &reconciled.present(),
    )
    .await?;
    detach::<budget_periods::Entity>(db, &budget_periods::BUDGET, &reconciled.deleted).await?;
    Ok(())
}

async fn save_budget_periods(
    db: &DatabaseConnection,
    response: &[BudgetPeriodResponse],
    scope: &SyncScope,
) -> ResultEngine<()> {
    let mut links =
        reconcile::<budget_periods::Entity>(db, response, scope, budget_periods::Entity::LINKS)
            .await?
            .links;
    link::<budget_periods::Entity, budgets::Entity>(
        db,
        &budget_periods::BUDGET,
        &links.take(&budget_periods::BUDGET),
    )
    .await?;
    Ok(())
}
