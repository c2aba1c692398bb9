use std::collections::BTreeSet;

use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, IntoActiveModel, ModelTrait,
    QueryFilter, QueryOrder, QuerySelect, Value,
};

use super::{CachedObject, LinkKeys, LinkPath, SyncScope};
use crate::{ResultEngine, store::with_tx, util::value_as_id};

/// Outcome of one reconciliation pass.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Reconciled {
    /// Parent ids referenced by the response, per requested link path.
    pub links: LinkKeys,
    pub inserted: Vec<i64>,
    pub updated: Vec<i64>,
    pub deleted: Vec<i64>,
}

impl Reconciled {
    /// Ids of every row the response carried.
    pub fn present(&self) -> BTreeSet<i64> {
        self.inserted.iter().chain(&self.updated).copied().collect()
    }
}

/// Make the cached rows of `E` agree with `responses` and commit.
///
/// Rows present in both are updated, new ids are inserted, and cached rows
/// matching `scope` that the response no longer carries are deleted. When one
/// batch repeats an id, the last occurrence wins.
pub async fn reconcile<E: CachedObject>(
    db: &DatabaseConnection,
    responses: &[E::Response],
    scope: &SyncScope,
    paths: &[LinkPath<E>],
) -> ResultEngine<Reconciled>
where
    E::Model: IntoActiveModel<E::Active>,
{
    let batch = sorted_batch::<E>(responses);
    let ids: Vec<i64> = batch.iter().map(|response| E::response_id(response)).collect();

    let reconciled = with_tx!(db, |tx| {
        let mut reconciled = Reconciled::default();
        merge::<E, _>(&tx, &batch, &ids, paths, &mut reconciled).await?;
        if let Some(condition) = scope.condition() {
            reconciled.deleted = delete_stale::<E, _>(&tx, condition.clone(), &ids).await?;
        }
        Ok(reconciled)
    })?;

    tracing::debug!(
        entity = E::KIND.as_str(),
        inserted = reconciled.inserted.len(),
        updated = reconciled.updated.len(),
        deleted = reconciled.deleted.len(),
        "response reconciled"
    );
    Ok(reconciled)
}

/// Upsert a single response. Nothing is deleted.
pub async fn reconcile_one<E: CachedObject>(
    db: &DatabaseConnection,
    response: &E::Response,
    paths: &[LinkPath<E>],
) -> ResultEngine<LinkKeys>
where
    E::Model: IntoActiveModel<E::Active>,
{
    let reconciled = reconcile::<E>(
        db,
        std::slice::from_ref(response),
        &SyncScope::unbounded(),
        paths,
    )
    .await?;
    Ok(reconciled.links)
}

/// Delete cached rows by id, for server-side deletes that have no response
/// to reconcile.
pub async fn remove<E: CachedObject>(db: &DatabaseConnection, ids: &[i64]) -> ResultEngine<u64> {
    if ids.is_empty() {
        return Ok(0);
    }
    let result = E::delete_many()
        .filter(E::id_column().is_in(ids.iter().copied()))
        .exec(db)
        .await?;
    tracing::debug!(
        entity = E::KIND.as_str(),
        deleted = result.rows_affected,
        "rows removed"
    );
    Ok(result.rows_affected)
}

/// Responses ordered by id, keeping the last of any repeated id.
fn sorted_batch<E: CachedObject>(responses: &[E::Response]) -> Vec<&E::Response> {
    let mut ordered: Vec<&E::Response> = responses.iter().collect();
    ordered.sort_by_key(|response| E::response_id(response));

    let mut batch: Vec<&E::Response> = Vec::with_capacity(ordered.len());
    for response in ordered {
        match batch.last_mut() {
            Some(last) if E::response_id(last) == E::response_id(response) => *last = response,
            _ => batch.push(response),
        }
    }
    batch
}

fn model_id<E: CachedObject>(model: &E::Model) -> Option<i64> {
    value_as_id(&model.get(E::id_column()))
}

async fn merge<E: CachedObject, C: ConnectionTrait>(
    conn: &C,
    batch: &[&E::Response],
    ids: &[i64],
    paths: &[LinkPath<E>],
    reconciled: &mut Reconciled,
) -> ResultEngine<()>
where
    E::Model: IntoActiveModel<E::Active>,
{
    if batch.is_empty() {
        return Ok(());
    }

    let mut existing = E::find()
        .filter(E::id_column().is_in(ids.iter().copied()))
        .order_by_asc(E::id_column())
        .all(conn)
        .await?
        .into_iter()
        .peekable();

    for response in batch {
        let id = E::response_id(response);
        let mut active = E::active_model(response)?;

        for path in paths {
            if let Some(parent) = active.get(path.reference).into_value().as_ref().and_then(value_as_id)
            {
                reconciled.links.insert(path, parent);
            }
        }

        match existing.next_if(|model| model_id::<E>(model) == Some(id)) {
            Some(current) => {
                for path in E::LINKS {
                    let previous = current.get(path.reference);
                    let next = active.get(path.reference).into_value();
                    if next.as_ref() != Some(&previous) {
                        active.set(path.edge, Value::BigInt(None));
                    }
                }
                E::update_many()
                    .set(active)
                    .filter(E::id_column().eq(id))
                    .exec(conn)
                    .await?;
                reconciled.updated.push(id);
            }
            None => {
                E::insert(active).exec_without_returning(conn).await?;
                reconciled.inserted.push(id);
            }
        }
    }
    Ok(())
}

async fn delete_stale<E: CachedObject, C: ConnectionTrait>(
    conn: &C,
    condition: sea_orm::Condition,
    ids: &[i64],
) -> ResultEngine<Vec<i64>> {
    let stale: Vec<i64> = E::find()
        .select_only()
        .column(E::id_column())
        .filter(condition)
        .filter(E::id_column().is_not_in(ids.iter().copied()))
        .order_by_asc(E::id_column())
        .into_tuple::<i64>()
        .all(conn)
        .await?;

    if !stale.is_empty() {
        E::delete_many()
            .filter(E::id_column().is_in(stale.iter().copied()))
            .exec(conn)
            .await?;
    }
    Ok(stale)
}
