//! Frollo client SDK cache engine.
//!
//! Server responses are mirrored into a local SQLite cache. Each manager
//! fetches one area of the API, reconciles the response against the cached
//! rows it is authoritative for, and links references between entity types
//! once both sides are cached.

use std::sync::Arc;

use tokio::runtime::Handle;

pub use api::{
    AggregationApi, ApiResult, BillsApi, BudgetsApi, ContactsApi, FrolloApi, HttpService,
};
pub use delivery::{DELIVERY_THREAD, Delivery};
pub use error::{ApiError, EngineError};
pub use locks::{EntityKind, EntityLocks, LockSet};
pub use ops::{
    AccountFilter, AccountPatch, Aggregation, BillFilter, BillPatch, BillPaymentFilter,
    BillPaymentPatch, Bills, BudgetFilter, BudgetPatch, BudgetPeriodFilter, Budgets, ContactFilter,
    ContactPatch, Contacts, TransactionFilter,
};
pub use settings::Settings;
pub use store::Store;

pub mod accounts;
pub mod api;
pub mod bill_payments;
pub mod bills;
pub mod budget_periods;
pub mod budgets;
pub mod cache;
pub mod contacts;
mod delivery;
mod error;
mod locks;
pub mod merchants;
mod ops;
pub mod settings;
mod store;
pub mod transaction_categories;
pub mod transactions;
mod util;

pub type ResultEngine<T> = Result<T, EngineError>;

/// Entry point of the SDK: the cache store plus one manager per API area.
#[derive(Clone)]
pub struct Frollo {
    store: Store,
    delivery: Delivery,
    aggregation: Aggregation,
    bills: Bills,
    budgets: Budgets,
    contacts: Contacts,
}

impl Frollo {
    /// Return a builder for `Frollo`. Help to build the struct.
    pub fn builder() -> FrolloBuilder {
        FrolloBuilder::default()
    }

    /// Open the configured store and talk to the configured API over HTTP.
    pub async fn from_settings(settings: &Settings) -> ResultEngine<Self> {
        let store = Store::open(&settings.database.url()).await?;
        let api = HttpService::from_settings(&settings.api)?;
        Self::builder().store(store).api(Arc::new(api)).build().await
    }

    pub fn aggregation(&self) -> &Aggregation {
        &self.aggregation
    }

    pub fn bills(&self) -> &Bills {
        &self.bills
    }

    pub fn budgets(&self) -> &Budgets {
        &self.budgets
    }

    pub fn contacts(&self) -> &Contacts {
        &self.contacts
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Runs operations and hands their results to callbacks on the
    /// delivery thread.
    pub fn delivery(&self) -> &Delivery {
        &self.delivery
    }
}

/// The builder for `Frollo`
#[derive(Default)]
pub struct FrolloBuilder {
    store: Option<Store>,
    api: Option<Arc<dyn FrolloApi>>,
    delivery: Option<Delivery>,
}

impl FrolloBuilder {
    /// Pass the cache store. Defaults to an unopened store.
    pub fn store(mut self, store: Store) -> FrolloBuilder {
        self.store = Some(store);
        self
    }

    /// Pass the required network service
    pub fn api(mut self, api: Arc<dyn FrolloApi>) -> FrolloBuilder {
        self.api = Some(api);
        self
    }

    /// Pass a delivery. Defaults to a new delivery thread on the current
    /// runtime.
    pub fn delivery(mut self, delivery: Delivery) -> FrolloBuilder {
        self.delivery = Some(delivery);
        self
    }

    /// Construct `Frollo`
    pub async fn build(self) -> ResultEngine<Frollo> {
        let api = self
            .api
            .ok_or_else(|| EngineError::Setup("network service is required".to_string()))?;
        let store = self.store.unwrap_or_else(Store::unopened);
        let delivery = match self.delivery {
            Some(delivery) => delivery,
            None => Delivery::spawn(Handle::current())?,
        };

        let shared = Arc::new(ops::Shared {
            store: store.clone(),
            locks: EntityLocks::new(),
            api,
        });
        let aggregation = Aggregation::new(shared.clone());
        Ok(Frollo {
            store,
            delivery,
            bills: Bills::new(shared.clone(), aggregation.clone()),
            budgets: Budgets::new(shared.clone()),
            contacts: Contacts::new(shared),
            aggregation,
        })
    }
}
