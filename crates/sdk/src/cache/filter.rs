use std::fmt;
use std::marker::PhantomData;

use chrono::NaiveDate;
use sea_orm::{ColumnTrait, Condition, Order, QueryOrder, Select, Value};

use super::CachedObject;

enum Clause<E: CachedObject> {
    Equals(E::Column, Value),
    In(E::Column, Vec<Value>),
    OnOrAfter(E::Column, NaiveDate),
    OnOrBefore(E::Column, NaiveDate),
    Predicate(Condition),
}

impl<E: CachedObject> Clause<E> {
    fn expression(&self) -> Condition {
        match self {
            Self::Equals(column, value) => Condition::all().add(column.eq(value.clone())),
            Self::In(column, values) => Condition::all().add(column.is_in(values.clone())),
            Self::OnOrAfter(column, date) => Condition::all().add(column.gte(E::format_date(*date))),
            Self::OnOrBefore(column, date) => Condition::all().add(column.lte(E::format_date(*date))),
            Self::Predicate(condition) => condition.clone(),
        }
    }
}

/// Conjunction of clauses over the columns of one cached entity.
///
/// An empty filter matches every row.
pub struct Filter<E: CachedObject> {
    clauses: Vec<Clause<E>>,
}

impl<E: CachedObject> Default for Filter<E> {
    fn default() -> Self {
        Self {
            clauses: Vec::new(),
        }
    }
}

impl<E: CachedObject> fmt::Debug for Filter<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Filter")
            .field("clauses", &self.clauses.len())
            .finish()
    }
}

impl<E: CachedObject> Filter<E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn equals(mut self, column: E::Column, value: impl Into<Value>) -> Self {
        self.clauses.push(Clause::Equals(column, value.into()));
        self
    }

    pub fn is_in<V: Into<Value>>(
        mut self,
        column: E::Column,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        let values = values.into_iter().map(Into::into).collect();
        self.clauses.push(Clause::In(column, values));
        self
    }

    pub fn on_or_after(mut self, column: E::Column, date: NaiveDate) -> Self {
        self.clauses.push(Clause::OnOrAfter(column, date));
        self
    }

    pub fn on_or_before(mut self, column: E::Column, date: NaiveDate) -> Self {
        self.clauses.push(Clause::OnOrBefore(column, date));
        self
    }

    /// Arbitrary extra condition, for callers that need more than equality
    /// and date bounds.
    pub fn predicate(mut self, condition: impl Into<Condition>) -> Self {
        self.clauses.push(Clause::Predicate(condition.into()));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    pub fn condition(&self) -> Condition {
        self.clauses
            .iter()
            .fold(Condition::all(), |condition, clause| {
                condition.add(clause.expression())
            })
    }
}

/// Ordering of a list read. Without keys, rows come back by id.
pub struct Sort<E: CachedObject> {
    keys: Vec<(E::Column, Order)>,
    _entity: PhantomData<E>,
}

impl<E: CachedObject> Default for Sort<E> {
    fn default() -> Self {
        Self {
            keys: Vec::new(),
            _entity: PhantomData,
        }
    }
}

impl<E: CachedObject> Sort<E> {
    pub fn ascending(column: E::Column) -> Self {
        Self::default().then_ascending(column)
    }

    pub fn descending(column: E::Column) -> Self {
        Self::default().then_descending(column)
    }

    pub fn then_ascending(mut self, column: E::Column) -> Self {
        self.keys.push((column, Order::Asc));
        self
    }

    pub fn then_descending(mut self, column: E::Column) -> Self {
        self.keys.push((column, Order::Desc));
        self
    }

    pub(crate) fn apply(&self, mut query: Select<E>) -> Select<E> {
        if self.keys.is_empty() {
            return query.order_by_asc(E::id_column());
        }
        for (column, order) in &self.keys {
            query = query.order_by(*column, order.clone());
        }
        query
    }
}

#[cfg(test)]
mod tests {
    use sea_orm::{DbBackend, EntityTrait, QueryFilter, QueryTrait};

    use super::*;
    use crate::bills;

    fn sql(filter: &Filter<bills::Entity>, sort: &Sort<bills::Entity>) -> String {
        sort.apply(bills::Entity::find().filter(filter.condition()))
            .build(DbBackend::Sqlite)
            .to_string()
    }

    #[test]
    fn clauses_are_anded() {
        let filter = Filter::<bills::Entity>::new()
            .equals(bills::Column::Frequency, "monthly")
            .is_in(bills::Column::AccountId, [3_i64, 4])
            .on_or_after(
                bills::Column::NextPaymentDate,
                NaiveDate::from_ymd_opt(2026, 10, 1).unwrap(),
            )
            .on_or_before(
                bills::Column::NextPaymentDate,
                NaiveDate::from_ymd_opt(2026, 10, 31).unwrap(),
            );

        let sql = sql(&filter, &Sort::default());
        assert!(sql.contains(r#""frequency" = 'monthly'"#), "{sql}");
        assert!(sql.contains(r#""account_id" IN (3, 4)"#), "{sql}");
        assert!(sql.contains(r#""next_payment_date" >= '2026-10-01'"#), "{sql}");
        assert!(sql.contains(r#""next_payment_date" <= '2026-10-31'"#), "{sql}");
        assert_eq!(sql.matches(" AND ").count(), 3, "{sql}");
    }

    #[test]
    fn empty_filter_matches_everything_by_id() {
        let filter = Filter::<bills::Entity>::new();
        assert!(filter.is_empty());

        let sql = sql(&filter, &Sort::default());
        assert!(sql.ends_with(r#"ORDER BY "bills"."id" ASC"#), "{sql}");
    }

    #[test]
    fn sort_keys_keep_their_order() {
        let sort = Sort::<bills::Entity>::descending(bills::Column::NextPaymentDate)
            .then_ascending(bills::Column::Name);
        let sql = sql(&Filter::new(), &sort);
        assert!(
            sql.ends_with(r#"ORDER BY "bills"."next_payment_date" DESC, "bills"."name" ASC"#),
            "{sql}"
        );
    }
}
