use std::collections::BTreeSet;
use std::sync::{Arc, Mutex, PoisonError};

use api_types::{
    Paging,
    aggregation::{
        AccountResponse, AccountStatus, AccountType, AccountUpdateRequest, BudgetCategory,
        MerchantResponse, TransactionBaseType, TransactionCategoryResponse, TransactionListQuery,
        TransactionResponse, TransactionStatus,
    },
};
use chrono::NaiveDate;
use sea_orm::{ColumnTrait, Condition, DatabaseConnection};

use super::Shared;
use crate::{
    EngineError, ResultEngine, accounts, bills,
    cache::{
        self, CachedObject, Filter, LiveQuery, PageItem, Sort, SyncScope, dated_page_scope,
        detach, link, reconcile,
    },
    locks::EntityKind,
    merchants, transaction_categories, transactions,
    util::{format_date, normalize_optional_text},
};

const ACCOUNT_LOCKS: &[EntityKind] = &[
    EntityKind::Bills,
    EntityKind::Transactions,
    EntityKind::Accounts,
];
const MERCHANT_LOCKS: &[EntityKind] = &[
    EntityKind::Bills,
    EntityKind::Transactions,
    EntityKind::Merchants,
];
const CATEGORY_LOCKS: &[EntityKind] = &[
    EntityKind::Bills,
    EntityKind::Transactions,
    EntityKind::TransactionCategories,
];
const TRANSACTION_LOCKS: &[EntityKind] = &[
    EntityKind::Transactions,
    EntityKind::Accounts,
    EntityKind::Merchants,
    EntityKind::TransactionCategories,
];

/// Typed read filter for cached accounts.
#[derive(Clone, Debug, Default)]
pub struct AccountFilter {
    pub account_type: Option<AccountType>,
    pub account_status: Option<AccountStatus>,
    pub included: Option<bool>,
    pub favourite: Option<bool>,
    pub hidden: Option<bool>,
    pub predicate: Option<Condition>,
}

impl AccountFilter {
    fn to_filter(&self) -> Filter<accounts::Entity> {
        let mut filter = Filter::new();
        if let Some(account_type) = self.account_type {
            filter = filter.equals(accounts::Column::AccountType, account_type.as_str());
        }
        if let Some(status) = self.account_status {
            filter = filter.equals(accounts::Column::AccountStatus, status.as_str());
        }
        if let Some(included) = self.included {
            filter = filter.equals(accounts::Column::Included, included);
        }
        if let Some(favourite) = self.favourite {
            filter = filter.equals(accounts::Column::Favourite, favourite);
        }
        if let Some(hidden) = self.hidden {
            filter = filter.equals(accounts::Column::Hidden, hidden);
        }
        if let Some(predicate) = &self.predicate {
            filter = filter.predicate(predicate.clone());
        }
        filter
    }
}

/// Changes to apply to a cached account. `None` keeps the cached value; an
/// empty nickname clears it.
#[derive(Clone, Debug, Default)]
pub struct AccountPatch {
    pub nick_name: Option<String>,
    pub included: Option<bool>,
    pub favourite: Option<bool>,
    pub hidden: Option<bool>,
}

/// Typed read filter for cached transactions.
#[derive(Clone, Debug, Default)]
pub struct TransactionFilter {
    pub account_id: Option<i64>,
    pub merchant_id: Option<i64>,
    pub category_id: Option<i64>,
    pub status: Option<TransactionStatus>,
    pub base_type: Option<TransactionBaseType>,
    pub budget_category: Option<BudgetCategory>,
    pub included: Option<bool>,
    pub from_date: Option<NaiveDate>,
    pub to_date: Option<NaiveDate>,
    pub predicate: Option<Condition>,
}

impl TransactionFilter {
    fn to_filter(&self) -> Filter<transactions::Entity> {
        let mut filter = Filter::new();
        if let Some(account_id) = self.account_id {
            filter = filter.equals(transactions::Column::AccountId, account_id);
        }
        if let Some(merchant_id) = self.merchant_id {
            filter = filter.equals(transactions::Column::MerchantId, merchant_id);
        }
        if let Some(category_id) = self.category_id {
            filter = filter.equals(transactions::Column::CategoryId, category_id);
        }
        if let Some(status) = self.status {
            filter = filter.equals(transactions::Column::Status, status.as_str());
        }
        if let Some(base_type) = self.base_type {
            filter = filter.equals(transactions::Column::BaseType, base_type.as_str());
        }
        if let Some(budget_category) = self.budget_category {
            filter = filter.equals(transactions::Column::BudgetCategory, budget_category.as_str());
        }
        if let Some(included) = self.included {
            filter = filter.equals(transactions::Column::Included, included);
        }
        if let Some(from) = self.from_date {
            filter = filter.on_or_after(transactions::Column::TransactionDate, from);
        }
        if let Some(to) = self.to_date {
            filter = filter.on_or_before(transactions::Column::TransactionDate, to);
        }
        if let Some(predicate) = &self.predicate {
            filter = filter.predicate(predicate.clone());
        }
        filter
    }
}

fn newest_first() -> Sort<transactions::Entity> {
    Sort::descending(transactions::Column::TransactionDate)
        .then_descending(transactions::Column::Id)
}

/// Accounts, merchants, transaction categories and transactions.
#[derive(Clone)]
pub struct Aggregation {
    shared: Arc<Shared>,
    refreshing_merchants: Arc<Mutex<BTreeSet<i64>>>,
}

impl Aggregation {
    pub(crate) fn new(shared: Arc<Shared>) -> Self {
        Self {
            shared,
            refreshing_merchants: Arc::new(Mutex::new(BTreeSet::new())),
        }
    }

    // Accounts

    pub async fn accounts(
        &self,
        filter: &AccountFilter,
    ) -> ResultEngine<Option<Vec<accounts::Model>>> {
        cache::list(&self.shared.store, &filter.to_filter(), &Sort::default(), None).await
    }

    pub async fn account(&self, account_id: i64) -> ResultEngine<Option<accounts::Model>> {
        cache::get::<accounts::Entity>(&self.shared.store, account_id).await
    }

    pub fn accounts_live(&self, filter: &AccountFilter) -> Option<LiveQuery<accounts::Entity>> {
        cache::live_query(&self.shared.store, filter.to_filter(), Sort::default(), None)
    }

    /// Replace the cached accounts with the server's list.
    pub async fn refresh_accounts(&self) -> ResultEngine<()> {
        let db = self.shared.database()?;
        let response = self.shared.api.fetch_accounts().await?;
        self.shared
            .persist(
                "refresh_accounts",
                ACCOUNT_LOCKS,
                save_accounts(db, &response, &SyncScope::all()),
            )
            .await;
        Ok(())
    }

    pub async fn refresh_account(&self, account_id: i64) -> ResultEngine<()> {
        let db = self.shared.database()?;
        let response = self.shared.api.fetch_account(account_id).await?;
        self.shared
            .persist(
                "refresh_account",
                ACCOUNT_LOCKS,
                save_accounts(db, std::slice::from_ref(&response), &SyncScope::unbounded()),
            )
            .await;
        Ok(())
    }

    /// Apply `patch` on top of the cached account and send the result.
    pub async fn update_account(&self, account_id: i64, patch: AccountPatch) -> ResultEngine<()> {
        let db = self.shared.database()?;
        let Some(current) = cache::get::<accounts::Entity>(&self.shared.store, account_id).await?
        else {
            return Err(EngineError::KeyNotFound(format!("account {account_id}")));
        };

        let request = AccountUpdateRequest {
            nick_name: match patch.nick_name {
                Some(nick_name) => normalize_optional_text(Some(nick_name.as_str())),
                None => current.nick_name,
            },
            included: patch.included.unwrap_or(current.included),
            favourite: patch.favourite.unwrap_or(current.favourite),
            hidden: patch.hidden.unwrap_or(current.hidden),
        };
        let response = self.shared.api.update_account(account_id, &request).await?;
        self.shared
            .persist(
                "update_account",
                ACCOUNT_LOCKS,
                save_accounts(db, std::slice::from_ref(&response), &SyncScope::unbounded()),
            )
            .await;
        Ok(())
    }

    // Merchants

    pub async fn merchants(
        &self,
        merchant_ids: Option<&[i64]>,
    ) -> ResultEngine<Option<Vec<merchants::Model>>> {
        let mut filter = Filter::<merchants::Entity>::new();
        if let Some(ids) = merchant_ids {
            filter = filter.is_in(merchants::Column::Id, ids.iter().copied());
        }
        cache::list(&self.shared.store, &filter, &Sort::ascending(merchants::Column::Name), None)
            .await
    }

    pub async fn merchant(&self, merchant_id: i64) -> ResultEngine<Option<merchants::Model>> {
        cache::get::<merchants::Entity>(&self.shared.store, merchant_id).await
    }

    /// Refresh the given merchants. Requested ids the server no longer
    /// returns are removed from the cache.
    pub async fn refresh_merchants(&self, merchant_ids: &[i64]) -> ResultEngine<()> {
        let db = self.shared.database()?;
        let response = self.shared.api.fetch_merchants(merchant_ids).await?;
        let scope = SyncScope::matching(
            Condition::all().add(merchants::Column::Id.is_in(merchant_ids.iter().copied())),
        );
        let linked = self
            .shared
            .persist(
                "refresh_merchants",
                MERCHANT_LOCKS,
                save_merchants(db, &response, &scope),
            )
            .await;
        if linked.is_some() {
            let mut refreshing = self
                .refreshing_merchants
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            for id in merchant_ids {
                refreshing.remove(id);
            }
        }
        Ok(())
    }

    pub async fn refresh_merchant(&self, merchant_id: i64) -> ResultEngine<()> {
        let db = self.shared.database()?;
        let response = self.shared.api.fetch_merchant(merchant_id).await?;
        self.shared
            .persist(
                "refresh_merchant",
                MERCHANT_LOCKS,
                save_merchants(db, std::slice::from_ref(&response), &SyncScope::unbounded()),
            )
            .await;
        Ok(())
    }

    /// Fetch merchants that cached rows reference but the cache lacks.
    ///
    /// Ids already marked as refreshing are skipped. The mark is only
    /// cleared by a merchant refresh whose result was linked.
    pub(crate) fn refresh_missing_merchants(&self, unresolved: BTreeSet<i64>) {
        let ids: Vec<i64> = {
            let mut refreshing = self
                .refreshing_merchants
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            unresolved
                .into_iter()
                .filter(|id| refreshing.insert(*id))
                .collect()
        };
        if ids.is_empty() {
            return;
        }

        tracing::warn!(?ids, "merchants missing from cache, refreshing");
        let aggregation = self.clone();
        tokio::spawn(async move {
            if let Err(err) = aggregation.refresh_merchants(&ids).await {
                tracing::warn!(?ids, error = %err, "missing merchants refresh failed");
            }
        });
    }

    // Transaction categories

    pub async fn transaction_categories(
        &self,
    ) -> ResultEngine<Option<Vec<transaction_categories::Model>>> {
        cache::list(
            &self.shared.store,
            &Filter::<transaction_categories::Entity>::new(),
            &Sort::ascending(transaction_categories::Column::Name),
            None,
        )
        .await
    }

    pub async fn refresh_transaction_categories(&self) -> ResultEngine<()> {
        let db = self.shared.database()?;
        let response = self.shared.api.fetch_transaction_categories().await?;
        self.shared
            .persist(
                "refresh_transaction_categories",
                CATEGORY_LOCKS,
                save_categories(db, &response, &SyncScope::all()),
            )
            .await;
        Ok(())
    }

    // Transactions

    pub async fn transactions(
        &self,
        filter: &TransactionFilter,
        limit: Option<u64>,
    ) -> ResultEngine<Option<Vec<transactions::Model>>> {
        cache::list(&self.shared.store, &filter.to_filter(), &newest_first(), limit).await
    }

    pub async fn transaction(
        &self,
        transaction_id: i64,
    ) -> ResultEngine<Option<transactions::Model>> {
        cache::get::<transactions::Entity>(&self.shared.store, transaction_id).await
    }

    pub fn transactions_live(
        &self,
        filter: &TransactionFilter,
        limit: Option<u64>,
    ) -> Option<LiveQuery<transactions::Entity>> {
        cache::live_query(&self.shared.store, filter.to_filter(), newest_first(), limit)
    }

    /// Fetch one page of transactions and reconcile it against the cached
    /// rows that fall inside that page's window.
    ///
    /// Returns the server's paging so the caller can request the next page.
    pub async fn refresh_transactions(
        &self,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
        before: Option<String>,
        after: Option<String>,
        size: Option<i64>,
    ) -> ResultEngine<Paging> {
        let db = self.shared.database()?;
        let query = TransactionListQuery {
            from_date: from,
            to_date: to,
            before,
            after,
            size,
        };
        let page = self.shared.api.fetch_transactions(&query).await?;

        let mut base = Condition::all();
        if let Some(from) = from {
            base = base.add(transactions::Column::TransactionDate.gte(format_date(from)));
        }
        if let Some(to) = to {
            base = base.add(transactions::Column::TransactionDate.lte(format_date(to)));
        }
        let items: Vec<PageItem> = page
            .data
            .iter()
            .map(|transaction| PageItem {
                date: transaction.transaction_date,
                id: transaction.id,
            })
            .collect();
        let scope = dated_page_scope(
            base,
            transactions::Column::TransactionDate,
            transactions::Column::Id,
            &items,
            &page.paging.cursors,
        );

        if let Some(unresolved) = self
            .shared
            .persist(
                "refresh_transactions",
                TRANSACTION_LOCKS,
                save_transactions(db, &page.data, &scope),
            )
            .await
        {
            self.refresh_missing_merchants(unresolved);
        }
        Ok(page.paging)
    }

    pub async fn refresh_transaction(&self, transaction_id: i64) -> ResultEngine<()> {
        let db = self.shared.database()?;
        let response = self.shared.api.fetch_transaction(transaction_id).await?;
        if let Some(unresolved) = self
            .shared
            .persist(
                "refresh_transaction",
                TRANSACTION_LOCKS,
                save_transactions(db, std::slice::from_ref(&response), &SyncScope::unbounded()),
            )
            .await
        {
            self.refresh_missing_merchants(unresolved);
        }
        Ok(())
    }
}

async fn save_accounts(
    db: &DatabaseConnection,
    response: &[AccountResponse],
    scope: &SyncScope,
) -> ResultEngine<()> {
    let reconciled = reconcile::<accounts::Entity>(db, response, scope, &[]).await?;
    let present = reconciled.present();
    link::<transactions::Entity, accounts::Entity>(db, &transactions::ACCOUNT, &present).await?;
    link::<bills::Entity, accounts::Entity>(db, &bills::ACCOUNT, &present).await?;
    detach::<transactions::Entity>(db, &transactions::ACCOUNT, &reconciled.deleted).await?;
    detach::<bills::Entity>(db, &bills::ACCOUNT, &reconciled.deleted).await?;
    Ok(())
}

async fn save_merchants(
    db: &DatabaseConnection,
    response: &[MerchantResponse],
    scope: &SyncScope,
) -> ResultEngine<()> {
    let reconciled = reconcile::<merchants::Entity>(db, response, scope, &[]).await?;
    let present = reconciled.present();
    link::<transactions::Entity, merchants::Entity>(db, &transactions::MERCHANT, &present).await?;
    link::<bills::Entity, merchants::Entity>(db, &bills::MERCHANT, &present).await?;
    detach::<transactions::Entity>(db, &transactions::MERCHANT, &reconciled.deleted).await?;
    detach::<bills::Entity>(db, &bills::MERCHANT, &reconciled.deleted).await?;
    Ok(())
}

async fn save_categories(
    db: &DatabaseConnection,
    response: &[TransactionCategoryResponse],
    scope: &SyncScope,
) -> ResultEngine<()> {
    let reconciled = reconcile::<transaction_categories::Entity>(db, response, scope, &[]).await?;
    let present = reconciled.present();
    link::<transactions::Entity, transaction_categories::Entity>(
        db,
        &transactions::CATEGORY,
        &present,
    )
    .await?;
    link::<bills::Entity, transaction_categories::Entity>(db, &bills::CATEGORY, &present).await?;
    detach::<transactions::Entity>(db, &transactions::CATEGORY, &reconciled.deleted).await?;
    detach::<bills::Entity>(db, &bills::CATEGORY, &reconciled.deleted).await?;
    Ok(())
}

/// Returns the merchant ids that are still missing from the cache.
async fn save_transactions(
    db: &DatabaseConnection,
    response: &[TransactionResponse],
    scope: &SyncScope,
) -> ResultEngine<BTreeSet<i64>> {
    let mut links =
        reconcile::<transactions::Entity>(db, response, scope, transactions::Entity::LINKS)
            .await?
            .links;
    link::<transactions::Entity, accounts::Entity>(
        db,
        &transactions::ACCOUNT,
        &links.take(&transactions::ACCOUNT),
    )
    .await?;
    let unresolved = link::<transactions::Entity, merchants::Entity>(
        db,
        &transactions::MERCHANT,
        &links.take(&transactions::MERCHANT),
    )
    .await?;
    link::<transactions::Entity, transaction_categories::Entity>(
        db,
        &transactions::CATEGORY,
        &links.take(&transactions::CATEGORY),
    )
    .await?;
    Ok(unresolved)
}
