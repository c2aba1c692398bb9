use std::collections::BTreeSet;
use std::sync::Arc;

use api_types::bills::{
    BillCreateRequest, BillFrequency, BillPaymentListQuery, BillPaymentRequestStatus,
    BillPaymentResponse, BillPaymentStatus, BillPaymentUpdateRequest, BillResponse, BillStatus,
    BillType, BillUpdateRequest,
};
use chrono::NaiveDate;
use sea_orm::{ColumnTrait, Condition, DatabaseConnection};

use super::{Aggregation, Shared};
use crate::{
    EngineError, ResultEngine, accounts, bill_payments, bills,
    cache::{
        self, CachedObject, Filter, LiveQuery, Sort, SyncScope, detach, link, reconcile, remove,
    },
    locks::EntityKind,
    merchants, transaction_categories,
    util::{format_date, normalize_optional_text},
};

const BILL_LOCKS: &[EntityKind] = &[
    EntityKind::Bills,
    EntityKind::BillPayments,
    EntityKind::Accounts,
    EntityKind::Merchants,
    EntityKind::TransactionCategories,
];
const BILL_PAYMENT_LOCKS: &[EntityKind] = &[EntityKind::Bills, EntityKind::BillPayments];

/// Typed read filter for cached bills.
#[derive(Clone, Debug, Default)]
pub struct BillFilter {
    pub frequency: Option<BillFrequency>,
    pub payment_status: Option<BillPaymentStatus>,
    pub status: Option<BillStatus>,
    pub bill_type: Option<BillType>,
    pub account_id: Option<i64>,
    pub predicate: Option<Condition>,
}

impl BillFilter {
    fn to_filter(&self) -> Filter<bills::Entity> {
        let mut filter = Filter::new();
        if let Some(frequency) = self.frequency {
            filter = filter.equals(bills::Column::Frequency, frequency.as_str());
        }
        if let Some(payment_status) = self.payment_status {
            filter = filter.equals(bills::Column::PaymentStatus, payment_status.as_str());
        }
        if let Some(status) = self.status {
            filter = filter.equals(bills::Column::Status, status.as_str());
        }
        if let Some(bill_type) = self.bill_type {
            filter = filter.equals(bills::Column::BillType, bill_type.as_str());
        }
        if let Some(account_id) = self.account_id {
            filter = filter.equals(bills::Column::AccountId, account_id);
        }
        if let Some(predicate) = &self.predicate {
            filter = filter.predicate(predicate.clone());
        }
        filter
    }
}

/// Changes to apply to a cached bill. `None` keeps the cached value; empty
/// notes clear them.
#[derive(Clone, Debug, Default)]
pub struct BillPatch {
    pub name: Option<String>,
    pub bill_type: Option<BillType>,
    pub status: Option<BillStatus>,
    pub frequency: Option<BillFrequency>,
    pub due_amount: Option<String>,
    pub next_payment_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

/// Typed read filter for cached bill payments.
#[derive(Clone, Debug, Default)]
pub struct BillPaymentFilter {
    pub bill_id: Option<i64>,
    pub payment_status: Option<BillPaymentStatus>,
    pub frequency: Option<BillFrequency>,
    pub from_date: Option<NaiveDate>,
    pub to_date: Option<NaiveDate>,
    pub predicate: Option<Condition>,
}

impl BillPaymentFilter {
    fn to_filter(&self) -> Filter<bill_payments::Entity> {
        let mut filter = Filter::new();
        if let Some(bill_id) = self.bill_id {
            filter = filter.equals(bill_payments::Column::BillId, bill_id);
        }
        if let Some(payment_status) = self.payment_status {
            filter = filter.equals(bill_payments::Column::PaymentStatus, payment_status.as_str());
        }
        if let Some(frequency) = self.frequency {
            filter = filter.equals(bill_payments::Column::Frequency, frequency.as_str());
        }
        if let Some(from) = self.from_date {
            filter = filter.on_or_after(bill_payments::Column::Date, from);
        }
        if let Some(to) = self.to_date {
            filter = filter.on_or_before(bill_payments::Column::Date, to);
        }
        if let Some(predicate) = &self.predicate {
            filter = filter.predicate(predicate.clone());
        }
        filter
    }
}

/// Changes to apply to a cached bill payment.
#[derive(Clone, Debug, Default)]
pub struct BillPaymentPatch {
    pub date: Option<NaiveDate>,
    pub paid: Option<bool>,
}

fn by_next_payment() -> Sort<bills::Entity> {
    Sort::ascending(bills::Column::NextPaymentDate).then_ascending(bills::Column::Id)
}

fn by_payment_date() -> Sort<bill_payments::Entity> {
    Sort::ascending(bill_payments::Column::Date).then_ascending(bill_payments::Column::Id)
}

/// Bills and their scheduled payments.
#[derive(Clone)]
pub struct Bills {
    shared: Arc<Shared>,
    aggregation: Aggregation,
}

impl Bills {
    pub(crate) fn new(shared: Arc<Shared>, aggregation: Aggregation) -> Self {
        Self {
            shared,
            aggregation,
        }
    }

    pub async fn bills(&self, filter: &BillFilter) -> ResultEngine<Option<Vec<bills::Model>>> {
        cache::list(&self.shared.store, &filter.to_filter(), &by_next_payment(), None).await
    }

    pub async fn bill(&self, bill_id: i64) -> ResultEngine<Option<bills::Model>> {
        cache::get::<bills::Entity>(&self.shared.store, bill_id).await
    }

    pub fn bills_live(&self, filter: &BillFilter) -> Option<LiveQuery<bills::Entity>> {
        cache::live_query(&self.shared.store, filter.to_filter(), by_next_payment(), None)
    }

    /// Replace the cached bills with the server's list.
    pub async fn refresh_bills(&self) -> ResultEngine<()> {
        let db = self.shared.database()?;
        let response = self.shared.api.fetch_bills().await?;
        self.save("refresh_bills", db, &response, &SyncScope::all())
            .await;
        Ok(())
    }

    pub async fn refresh_bill(&self, bill_id: i64) -> ResultEngine<()> {
        let db = self.shared.database()?;
        let response = self.shared.api.fetch_bill(bill_id).await?;
        self.save(
            "refresh_bill",
            db,
            std::slice::from_ref(&response),
            &SyncScope::unbounded(),
        )
        .await;
        Ok(())
    }

    /// Create a manual bill on `account_id` and return its id.
    pub async fn create_bill(
        &self,
        account_id: i64,
        name: &str,
        due_amount: String,
        frequency: BillFrequency,
        next_payment_date: NaiveDate,
        notes: Option<String>,
    ) -> ResultEngine<i64> {
        let Some(name) = normalize_optional_text(Some(name)) else {
            return Err(EngineError::InvalidValue(
                "bill name must not be empty".to_string(),
            ));
        };
        let request = BillCreateRequest {
            account_id: Some(account_id),
            transaction_id: None,
            due_amount: Some(due_amount),
            name: Some(name),
            frequency,
            next_payment_date,
            notes: normalize_optional_text(notes.as_deref()),
        };
        self.create(request).await
    }

    /// Create a bill from an existing transaction and return its id.
    pub async fn create_bill_from_transaction(
        &self,
        transaction_id: i64,
        frequency: BillFrequency,
        next_payment_date: NaiveDate,
        name: Option<String>,
        notes: Option<String>,
    ) -> ResultEngine<i64> {
        let request = BillCreateRequest {
            account_id: None,
            transaction_id: Some(transaction_id),
            due_amount: None,
            name: normalize_optional_text(name.as_deref()),
            frequency,
            next_payment_date,
            notes: normalize_optional_text(notes.as_deref()),
        };
        self.create(request).await
    }

    async fn create(&self, request: BillCreateRequest) -> ResultEngine<i64> {
        let db = self.shared.database()?;
        let response = self.shared.api.create_bill(&request).await?;
        self.save(
            "create_bill",
            db,
            std::slice::from_ref(&response),
            &SyncScope::unbounded(),
        )
        .await;
        Ok(response.id)
    }

    /// Apply `patch` on top of the cached bill and send the full bill.
    pub async fn update_bill(&self, bill_id: i64, patch: BillPatch) -> ResultEngine<()> {
        let db = self.shared.database()?;
        let Some(current) = cache::get::<bills::Entity>(&self.shared.store, bill_id).await? else {
            return Err(EngineError::KeyNotFound(format!("bill {bill_id}")));
        };

        let request = BillUpdateRequest {
            name: match patch.name {
                Some(name) => {
                    normalize_optional_text(Some(name.as_str())).unwrap_or(current.name.clone())
                }
                None => current.name.clone(),
            },
            bill_type: patch.bill_type.map_or_else(|| current.bill_type(), Ok)?,
            status: patch.status.map_or_else(|| current.status(), Ok)?,
            frequency: patch.frequency.map_or_else(|| current.frequency(), Ok)?,
            due_amount: patch.due_amount.unwrap_or(current.due_amount.clone()),
            next_payment_date: patch
                .next_payment_date
                .map_or_else(|| current.next_payment_date(), Ok)?,
            notes: match patch.notes {
                Some(notes) => normalize_optional_text(Some(notes.as_str())),
                None => current.notes.clone(),
            },
        };
        let response = self.shared.api.update_bill(bill_id, &request).await?;
        self.save(
            "update_bill",
            db,
            std::slice::from_ref(&response),
            &SyncScope::unbounded(),
        )
        .await;
        Ok(())
    }

    /// Delete the bill on the server, then locally. Cached payments of the
    /// bill lose their edge to it.
    pub async fn delete_bill(&self, bill_id: i64) -> ResultEngine<()> {
        let db = self.shared.database()?;
        self.shared.api.delete_bill(bill_id).await?;
        self.shared
            .persist("delete_bill", BILL_PAYMENT_LOCKS, async {
                remove::<bills::Entity>(db, &[bill_id]).await?;
                detach::<bill_payments::Entity>(db, &bill_payments::BILL, &[bill_id]).await?;
                Ok::<_, EngineError>(())
            })
            .await;
        Ok(())
    }

    async fn save(
        &self,
        operation: &'static str,
        db: &DatabaseConnection,
        response: &[BillResponse],
        scope: &SyncScope,
    ) {
        if let Some(unresolved) = self
            .shared
            .persist(operation, BILL_LOCKS, save_bills(db, response, scope))
            .await
        {
            self.aggregation.refresh_missing_merchants(unresolved);
        }
    }

    // Bill payments

    pub async fn bill_payments(
        &self,
        filter: &BillPaymentFilter,
    ) -> ResultEngine<Option<Vec<bill_payments::Model>>> {
        cache::list(&self.shared.store, &filter.to_filter(), &by_payment_date(), None).await
    }

    pub async fn bill_payment(
        &self,
        bill_payment_id: i64,
    ) -> ResultEngine<Option<bill_payments::Model>> {
        cache::get::<bill_payments::Entity>(&self.shared.store, bill_payment_id).await
    }

    pub fn bill_payments_live(
        &self,
        filter: &BillPaymentFilter,
    ) -> Option<LiveQuery<bill_payments::Entity>> {
        cache::live_query(&self.shared.store, filter.to_filter(), by_payment_date(), None)
    }

    /// Fetch the payments due between `from` and `to` (inclusive). Cached
    /// payments outside that range are left alone.
    pub async fn refresh_bill_payments(&self, from: NaiveDate, to: NaiveDate) -> ResultEngine<()> {
        let db = self.shared.database()?;
        let query = BillPaymentListQuery {
            from_date: from,
            to_date: to,
        };
        let response = self.shared.api.fetch_bill_payments(&query).await?;
        let scope = SyncScope::matching(
            Condition::all()
                .add(bill_payments::Column::Date.gte(format_date(from)))
                .add(bill_payments::Column::Date.lte(format_date(to))),
        );
        self.shared
            .persist(
                "refresh_bill_payments",
                BILL_PAYMENT_LOCKS,
                save_bill_payments(db, &response, &scope),
            )
            .await;
        Ok(())
    }

    /// Apply `patch` on top of the cached payment and send it.
    pub async fn update_bill_payment(
        &self,
        bill_payment_id: i64,
        patch: BillPaymentPatch,
    ) -> ResultEngine<()> {
        let db = self.shared.database()?;
        let Some(current) =
            cache::get::<bill_payments::Entity>(&self.shared.store, bill_payment_id).await?
        else {
            return Err(EngineError::KeyNotFound(format!(
                "bill payment {bill_payment_id}"
            )));
        };

        let paid = match patch.paid {
            Some(paid) => paid,
            None => current.payment_status()? == BillPaymentStatus::Paid,
        };
        let request = BillPaymentUpdateRequest {
            date: Some(patch.date.map_or_else(|| current.date(), Ok)?),
            status: Some(if paid {
                BillPaymentRequestStatus::Paid
            } else {
                BillPaymentRequestStatus::Unpaid
            }),
        };
        let response = self
            .shared
            .api
            .update_bill_payment(bill_payment_id, &request)
            .await?;
        self.shared
            .persist(
                "update_bill_payment",
                BILL_PAYMENT_LOCKS,
                save_bill_payments(db, std::slice::from_ref(&response), &SyncScope::unbounded()),
            )
            .await;
        Ok(())
    }

    pub async fn delete_bill_payment(&self, bill_payment_id: i64) -> ResultEngine<()> {
        let db = self.shared.database()?;
        self.shared.api.delete_bill_payment(bill_payment_id).await?;
        self.shared
            .persist(
                "delete_bill_payment",
                BILL_PAYMENT_LOCKS,
                remove::<bill_payments::Entity>(db, &[bill_payment_id]),
            )
            .await;
        Ok(())
    }
}

/// Returns the merchant ids that are still missing from the cache.
async fn save_bills(
    db: &DatabaseConnection,
    response: &[BillResponse],
    scope: &SyncScope,
) -> ResultEngine<BTreeSet<i64>> {
    let reconciled = reconcile::<bills::Entity>(db, response, scope, bills::Entity::LINKS).await?;
    let present = reconciled.present();
    let mut links = reconciled.links;

    link::<bills::Entity, accounts::Entity>(db, &bills::ACCOUNT, &links.take(&bills::ACCOUNT))
        .await?;
    let unresolved = link::<bills::Entity, merchants::Entity>(
        db,
        &bills::MERCHANT,
        &links.take(&bills::MERCHANT),
    )
    .await?;
    link::<bills::Entity, transaction_categories::Entity>(
        db,
        &bills::CATEGORY,
        &links.take(&bills::CATEGORY),
    )
    .await?;

    link::<bill_payments::Entity, bills::Entity>(db, &bill_payments::BILL, &present).await?;
    detach::<bill_payments::Entity>(db, &bill_payments::BILL, &reconciled.deleted).await?;
    Ok(unresolved)
}

async fn save_bill_payments(
    db: &DatabaseConnection,
    response: &[BillPaymentResponse],
    scope: &SyncScope,
) -> ResultEngine<()> {
    let mut links =
        reconcile::<bill_payments::Entity>(db, response, scope, bill_payments::Entity::LINKS)
            .await?
            .links;
    link::<bill_payments::Entity, bills::Entity>(
        db,
        &bill_payments::BILL,
        &links.take(&bill_payments::BILL),
    )
    .await?;
    Ok(())
}
