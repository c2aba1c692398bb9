//! Per-entity-type locks.
//!
//! Every cached entity type owns one async mutex. A unit of work that
//! reconciles and links several types takes all of their locks through
//! [`EntityLocks::acquire`], which always locks in [`EntityKind`] order, and
//! keeps them until the cache transaction has been committed.

use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard};

/// Cached entity types, declared in global lock order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EntityKind {
    Bills,
    BillPayments,
    Transactions,
    Accounts,
    Merchants,
    TransactionCategories,
    Budgets,
    BudgetPeriods,
    Contacts,
}

impl EntityKind {
    pub const ALL: [EntityKind; 9] = [
        Self::Bills,
        Self::BillPayments,
        Self::Transactions,
        Self::Accounts,
        Self::Merchants,
        Self::TransactionCategories,
        Self::Budgets,
        Self::BudgetPeriods,
        Self::Contacts,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Bills => "bills",
            Self::BillPayments => "bill_payments",
            Self::Transactions => "transactions",
            Self::Accounts => "accounts",
            Self::Merchants => "merchants",
            Self::TransactionCategories => "transaction_categories",
            Self::Budgets => "budgets",
            Self::BudgetPeriods => "budget_periods",
            Self::Contacts => "contacts",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// Process-wide lock table shared by every manager.
#[derive(Clone, Debug)]
pub struct EntityLocks {
    locks: Arc<Vec<Arc<Mutex<()>>>>,
}

impl Default for EntityLocks {
    fn default() -> Self {
        Self {
            locks: Arc::new(
                EntityKind::ALL
                    .iter()
                    .map(|_| Arc::new(Mutex::new(())))
                    .collect(),
            ),
        }
    }
}

impl EntityLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lock every kind in `kinds`, sorted into global order and deduplicated.
    pub async fn acquire(&self, kinds: &[EntityKind]) -> LockSet {
        let mut ordered = kinds.to_vec();
        ordered.sort();
        ordered.dedup();

        let mut guards = Vec::with_capacity(ordered.len());
        for kind in &ordered {
            guards.push(self.locks[kind.index()].clone().lock_owned().await);
        }
        tracing::trace!(kinds = ?ordered, "entity locks acquired");

        LockSet {
            kinds: ordered,
            _guards: guards,
        }
    }
}

/// Held locks; released on drop.
#[derive(Debug)]
pub struct LockSet {
    kinds: Vec<EntityKind>,
    _guards: Vec<OwnedMutexGuard<()>>,
}

impl LockSet {
    pub fn kinds(&self) -> &[EntityKind] {
        &self.kinds
    }
}
