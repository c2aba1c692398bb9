//! Which cached rows a server response is authoritative for.

use api_types::Cursors;
use chrono::NaiveDate;
use sea_orm::{ColumnTrait, Condition};

use crate::util::{day_after, day_before, format_date};

/// Rows a reconciliation may delete when they are missing from the response.
#[derive(Clone, Debug)]
pub struct SyncScope {
    condition: Option<Condition>,
}

impl SyncScope {
    /// Every cached row of the entity.
    pub fn all() -> Self {
        Self {
            condition: Some(Condition::all()),
        }
    }

    pub fn matching(condition: Condition) -> Self {
        Self {
            condition: Some(condition),
        }
    }

    /// Nothing is deleted.
    pub fn unbounded() -> Self {
        Self { condition: None }
    }

    pub fn is_unbounded(&self) -> bool {
        self.condition.is_none()
    }

    pub fn condition(&self) -> Option<&Condition> {
        self.condition.as_ref()
    }
}

/// Sort key of one item in a date-ordered page.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct PageItem {
    pub date: NaiveDate,
    pub id: i64,
}

/// Scope of one page of a newest-first, date-ordered listing.
///
/// A `before` cursor means newer pages exist, so rows newer than the newest
/// item are left alone; an `after` cursor does the same for rows older than
/// the oldest item. Ties on the boundary date are broken by id.
pub fn dated_page_scope<C: ColumnTrait>(
    base: Condition,
    date_column: C,
    id_column: C,
    items: &[PageItem],
    cursors: &Cursors,
) -> SyncScope {
    let has_cursors = cursors.before.is_some() || cursors.after.is_some();
    let (Some(newest), Some(oldest)) = (items.iter().max(), items.iter().min()) else {
        return if has_cursors {
            SyncScope::unbounded()
        } else {
            SyncScope::matching(base)
        };
    };

    let mut condition = base;
    if cursors.before.is_some() {
        let date = format_date(newest.date);
        condition = condition
            .add(date_column.lt(format_date(day_after(newest.date))))
            .add(
                Condition::any()
                    .add(date_column.ne(date))
                    .add(id_column.lte(newest.id)),
            );
    }
    if cursors.after.is_some() {
        let date = format_date(oldest.date);
        condition = condition
            .add(date_column.gt(format_date(day_before(oldest.date))))
            .add(
                Condition::any()
                    .add(date_column.ne(date))
                    .add(id_column.gte(oldest.id)),
            );
    }
    SyncScope::matching(condition)
}

/// Scope of one page of an id-ascending listing.
pub fn id_page_scope<C: ColumnTrait>(
    base: Condition,
    id_column: C,
    ids: &[i64],
    cursors: &Cursors,
) -> SyncScope {
    let has_cursors = cursors.before.is_some() || cursors.after.is_some();
    let (Some(first), Some(last)) = (ids.iter().min(), ids.iter().max()) else {
        return if has_cursors {
            SyncScope::unbounded()
        } else {
            SyncScope::matching(base)
        };
    };

    let mut condition = base;
    if cursors.before.is_some() {
        condition = condition.add(id_column.gte(*first));
    }
    if cursors.after.is_some() {
        condition = condition.add(id_column.lte(*last));
    }
    SyncScope::matching(condition)
}
