use sea_orm::{ColumnTrait, QueryFilter, QuerySelect};
use tokio::sync::broadcast::{self, error::RecvError};

use super::{CachedObject, Filter, Sort};
use crate::{EngineError, ResultEngine, locks::EntityKind, store::Store};

/// Cached row with primary key `id`.
///
/// `Ok(None)` both when the row is missing and when the store is not opened.
pub async fn get<E: CachedObject>(store: &Store, id: i64) -> ResultEngine<Option<E::Model>> {
    let Some(db) = store.database() else {
        return Ok(None);
    };
    let model = E::find()
        .filter(E::id_column().eq(id))
        .one(db)
        .await?;
    Ok(model)
}

/// Cached rows matching `filter`, or `Ok(None)` when the store is not opened.
pub async fn list<E: CachedObject>(
    store: &Store,
    filter: &Filter<E>,
    sort: &Sort<E>,
    limit: Option<u64>,
) -> ResultEngine<Option<Vec<E::Model>>> {
    let Some(db) = store.database() else {
        return Ok(None);
    };
    let mut query = sort.apply(E::find().filter(filter.condition()));
    if let Some(limit) = limit {
        query = query.limit(limit);
    }
    Ok(Some(query.all(db).await?))
}

/// A list read that can be repeated whenever its entity type changes.
///
/// `None` when the store is not opened.
pub fn live_query<E: CachedObject>(
    store: &Store,
    filter: Filter<E>,
    sort: Sort<E>,
    limit: Option<u64>,
) -> Option<LiveQuery<E>> {
    if !store.is_ready() {
        return None;
    }
    Some(LiveQuery {
        changes: store.subscribe(),
        store: store.clone(),
        filter,
        sort,
        limit,
    })
}

pub struct LiveQuery<E: CachedObject> {
    store: Store,
    filter: Filter<E>,
    sort: Sort<E>,
    limit: Option<u64>,
    changes: broadcast::Receiver<EntityKind>,
}

impl<E: CachedObject> LiveQuery<E> {
    pub async fn fetch(&self) -> ResultEngine<Vec<E::Model>> {
        list(&self.store, &self.filter, &self.sort, self.limit)
            .await?
            .ok_or(EngineError::StoreNotReady)
    }

    /// Wait until a commit touches this entity type.
    ///
    /// Missed notifications count as a change.
    pub async fn changed(&mut self) -> bool {
        loop {
            match self.changes.recv().await {
                Ok(kind) if kind == E::KIND => return true,
                Ok(_) => continue,
                Err(RecvError::Lagged(_)) => return true,
                Err(RecvError::Closed) => return false,
            }
        }
    }
}
