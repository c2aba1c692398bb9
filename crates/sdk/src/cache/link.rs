use std::collections::BTreeSet;

use sea_orm::{
    ColumnTrait, DatabaseConnection, QueryFilter, QuerySelect, Value,
    sea_query::{Expr, SimpleExpr},
};

use super::{CachedObject, LinkPath};
use crate::{ResultEngine, store::with_tx};

/// Resolve `path` on every `Child` row whose reference is one of `pending`
/// and whose `Parent` row is cached. Returns the ids that stayed unresolved.
pub async fn link<Child: CachedObject, Parent: CachedObject>(
    db: &DatabaseConnection,
    path: &LinkPath<Child>,
    pending: &BTreeSet<i64>,
) -> ResultEngine<BTreeSet<i64>> {
    if pending.is_empty() {
        return Ok(BTreeSet::new());
    }

    let found: BTreeSet<i64> = with_tx!(db, |tx| {
        let found: Vec<i64> = Parent::find()
            .select_only()
            .column(Parent::id_column())
            .filter(Parent::id_column().is_in(pending.iter().copied()))
            .into_tuple::<i64>()
            .all(&tx)
            .await?;

        if !found.is_empty() {
            Child::update_many()
                .col_expr(path.edge, Expr::col(path.reference).into())
                .filter(path.reference.is_in(found.iter().copied()))
                .exec(&tx)
                .await?;
        }
        Ok(found.into_iter().collect())
    })?;

    let unresolved: BTreeSet<i64> = pending.difference(&found).copied().collect();
    tracing::debug!(
        entity = Child::KIND.as_str(),
        link = path.name,
        linked = found.len(),
        unresolved = unresolved.len(),
        "links resolved"
    );
    Ok(unresolved)
}

/// Clear `path` on every `Child` row pointing at one of `parent_ids`.
pub async fn detach<Child: CachedObject>(
    db: &DatabaseConnection,
    path: &LinkPath<Child>,
    parent_ids: &[i64],
) -> ResultEngine<u64> {
    if parent_ids.is_empty() {
        return Ok(0);
    }

    let detached = with_tx!(db, |tx| {
        let result = Child::update_many()
            .col_expr(path.edge, SimpleExpr::Value(Value::BigInt(None)))
            .filter(path.edge.is_in(parent_ids.iter().copied()))
            .exec(&tx)
            .await?;
        Ok(result.rows_affected)
    })?;

    tracing::debug!(
        entity = Child::KIND.as_str(),
        link = path.name,
        detached,
        "links detached"
    );
    Ok(detached)
}
