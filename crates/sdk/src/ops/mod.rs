//! Managers: the public operations of the SDK.
//!
//! Every operation follows the same shape. The store must be opened before
//! any request is sent. The request runs without locks; its response is then
//! written under the entity locks of every table the write touches, and
//! listeners are notified once the locks are released. A cache failure after
//! a successful request is logged and the operation still succeeds.

use std::future::Future;
use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::{ResultEngine, api::FrolloApi, locks::{EntityKind, EntityLocks}, store::Store};

mod aggregation;
mod bills;
mod budgets;
mod contacts;

pub use aggregation::{AccountFilter, AccountPatch, Aggregation, TransactionFilter};
pub use bills::{BillFilter, BillPatch, BillPaymentFilter, BillPaymentPatch, Bills};
pub use budgets::{BudgetFilter, BudgetPatch, BudgetPeriodFilter, Budgets};
pub use contacts::{ContactFilter, ContactPatch, Contacts};

pub(crate) struct Shared {
    pub(crate) store: Store,
    pub(crate) locks: EntityLocks,
    pub(crate) api: Arc<dyn FrolloApi>,
}

impl Shared {
    pub(crate) fn database(&self) -> ResultEngine<&DatabaseConnection> {
        self.store.require()
    }

    /// Run `write` while holding the locks of `kinds`.
    ///
    /// `None` when the write failed; the failure has been logged.
    pub(crate) async fn persist<T>(
        &self,
        operation: &'static str,
        kinds: &[EntityKind],
        write: impl Future<Output = ResultEngine<T>>,
    ) -> Option<T> {
        let locks = self.locks.acquire(kinds).await;
        let result = write.await;
        drop(locks);

        match result {
            Ok(value) => {
                self.store.notify(kinds);
                Some(value)
            }
            Err(err) => {
                tracing::error!(operation, error = %err, "cache update failed");
                None
            }
        }
    }
}
