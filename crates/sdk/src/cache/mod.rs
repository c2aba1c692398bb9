//! The cache engine: reads, reconciliation of server responses and linking of
//! references between cached entity types.
//!
//! Every cached table implements [`CachedObject`]; the functions in this
//! module are generic over it so that each manager composes the same
//! reconcile and link steps for its own entities.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use chrono::NaiveDate;
use sea_orm::{ActiveModelBehavior, ActiveModelTrait, EntityTrait};

use crate::{ResultEngine, locks::EntityKind, util};

mod accessor;
mod filter;
mod link;
mod reconcile;
mod scope;

pub use accessor::{LiveQuery, get, list, live_query};
pub use filter::{Filter, Sort};
pub use link::{detach, link};
pub use reconcile::{Reconciled, reconcile, reconcile_one, remove};
pub use scope::{PageItem, SyncScope, dated_page_scope, id_page_scope};

/// A table mirrored from the server and keyed by a server-assigned id.
pub trait CachedObject: EntityTrait {
    const KIND: EntityKind;
    /// Every reference this entity holds to a parent entity.
    const LINKS: &'static [LinkPath<Self>];

    type Active: ActiveModelTrait<Entity = Self> + ActiveModelBehavior + Send + Sync;

    /// Decoded server payload for one row.
    type Response: Send + Sync;

    fn id_column() -> Self::Column;

    fn response_id(response: &Self::Response) -> i64;

    /// Active model carrying every server-owned column of `response`.
    ///
    /// Edge columns are left `NotSet`: they belong to the linker.
    fn active_model(response: &Self::Response) -> ResultEngine<Self::Active>;

    /// Format a date the way this entity stores it.
    fn format_date(date: NaiveDate) -> String {
        util::format_date(date)
    }
}

/// A reference from `E` to a parent entity.
///
/// `reference` holds the parent id sent by the server; `edge` holds the same
/// id once the parent row is known to exist locally.
pub struct LinkPath<E: EntityTrait> {
    pub name: &'static str,
    pub reference: E::Column,
    pub edge: E::Column,
}

impl<E: EntityTrait> Clone for LinkPath<E> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<E: EntityTrait> Copy for LinkPath<E> {}

impl<E: EntityTrait> fmt::Debug for LinkPath<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LinkPath")
            .field("name", &self.name)
            .field("reference", &self.reference)
            .field("edge", &self.edge)
            .finish()
    }
}

/// Parent ids awaiting linking, grouped by link name.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LinkKeys {
    keys: BTreeMap<&'static str, BTreeSet<i64>>,
}

impl LinkKeys {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert<E: EntityTrait>(&mut self, path: &LinkPath<E>, id: i64) {
        self.keys.entry(path.name).or_default().insert(id);
    }

    pub fn extend<E: EntityTrait>(
        &mut self,
        path: &LinkPath<E>,
        ids: impl IntoIterator<Item = i64>,
    ) {
        self.keys.entry(path.name).or_default().extend(ids);
    }

    /// Ids pending for `path`, without draining them.
    pub fn ids<E: EntityTrait>(&self, path: &LinkPath<E>) -> BTreeSet<i64> {
        self.keys.get(path.name).cloned().unwrap_or_default()
    }

    /// Drain the ids pending for `path`.
    pub fn take<E: EntityTrait>(&mut self, path: &LinkPath<E>) -> BTreeSet<i64> {
        self.keys.remove(path.name).unwrap_or_default()
    }

    pub fn merge(&mut self, other: LinkKeys) {
        for (name, ids) in other.keys {
            self.keys.entry(name).or_default().extend(ids);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.keys.values().all(BTreeSet::is_empty)
    }
}
