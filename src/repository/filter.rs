//! Translation of [`Where`] trees into boxed Diesel expressions.

use diesel::expression::BoxableExpression;
use diesel::sql_types::Bool;
use diesel::sqlite::Sqlite;
use diesel::{BoolExpressionMethods, IntoSql};

use crate::domain::filter::{Comparison, FieldValue, FilterField, Where};
use crate::repository::{RepositoryError, RepositoryResult};

/// Boolean SQL expression over the columns of table `T`.
pub type Predicate<T> = Box<dyn BoxableExpression<T, Sqlite, SqlType = Bool>>;

/// Fold a predicate tree into one SQL expression.
///
/// `compare` renders a single `field op value` leaf and `any_of` renders a
/// `field IN (...)` leaf; both are supplied per table since column types are
/// only known there.
pub fn build_predicate<T, F>(
    where_clause: &Where<F>,
    compare: impl Fn(F, Comparison, &FieldValue) -> RepositoryResult<Predicate<T>>,
    any_of: impl Fn(F, &[FieldValue]) -> RepositoryResult<Predicate<T>>,
) -> RepositoryResult<Predicate<T>>
where
    T: 'static,
    F: FilterField,
{
    fold(where_clause, &compare, &any_of)
}

type CompareFn<'a, T, F> =
    &'a dyn Fn(F, Comparison, &FieldValue) -> RepositoryResult<Predicate<T>>;
type AnyOfFn<'a, T, F> = &'a dyn Fn(F, &[FieldValue]) -> RepositoryResult<Predicate<T>>;

fn fold<T, F>(
    where_clause: &Where<F>,
    compare: CompareFn<'_, T, F>,
    any_of: AnyOfFn<'_, T, F>,
) -> RepositoryResult<Predicate<T>>
where
    T: 'static,
    F: FilterField,
{
    match where_clause {
        Where::And(items) => items.iter().try_fold(constant::<T>(true), |acc, item| {
            let next = fold(item, compare, any_of)?;
            Ok(Box::new(acc.and(next)) as Predicate<T>)
        }),
        Where::Or(items) => items.iter().try_fold(constant::<T>(false), |acc, item| {
            let next = fold(item, compare, any_of)?;
            Ok(Box::new(acc.or(next)) as Predicate<T>)
        }),
        Where::Compare { field, op, value } => compare(*field, *op, value),
        Where::In { field, values } => any_of(*field, values),
    }
}

fn constant<T: 'static>(value: bool) -> Predicate<T> {
    Box::new(value.into_sql::<Bool>())
}

pub fn integer_value<F: FilterField>(field: F, value: &FieldValue) -> RepositoryResult<i32> {
    match value {
        FieldValue::Integer(raw) => i32::try_from(*raw).map_err(|_| {
            RepositoryError::ValidationError(format!("{} is out of range", field.name()))
        }),
        FieldValue::Text(_) => Err(RepositoryError::ValidationError(format!(
            "{} expects an integer",
            field.name()
        ))),
    }
}

pub fn text_value<F: FilterField>(field: F, value: &FieldValue) -> RepositoryResult<String> {
    match value {
        FieldValue::Text(text) => Ok(text.clone()),
        FieldValue::Integer(_) => Err(RepositoryError::ValidationError(format!(
            "{} expects a string",
            field.name()
        ))),
    }
}

pub fn integer_values<F: FilterField>(
    field: F,
    values: &[FieldValue],
) -> RepositoryResult<Vec<i32>> {
    values.iter().map(|value| integer_value(field, value)).collect()
}

pub fn text_values<F: FilterField>(
    field: F,
    values: &[FieldValue],
) -> RepositoryResult<Vec<String>> {
    values.iter().map(|value| text_value(field, value)).collect()
}

/// Render a comparison on an integer column.
macro_rules! compare_integer {
    ($table:ty, $column:expr, $op:expr, $value:expr) => {{
        let value: i32 = $value;
        let predicate: $crate::repository::filter::Predicate<$table> = match $op {
            $crate::domain::filter::Comparison::Eq => Box::new($column.eq(value)),
            $crate::domain::filter::Comparison::Neq => Box::new($column.ne(value)),
            $crate::domain::filter::Comparison::Gt => Box::new($column.gt(value)),
            $crate::domain::filter::Comparison::Gte => Box::new($column.ge(value)),
            $crate::domain::filter::Comparison::Lt => Box::new($column.lt(value)),
            $crate::domain::filter::Comparison::Lte => Box::new($column.le(value)),
            $crate::domain::filter::Comparison::Like => {
                return Err($crate::repository::RepositoryError::ValidationError(
                    "like is only supported on text fields".to_string(),
                ));
            }
        };
        predicate
    }};
}

/// Render a comparison on a text column.
macro_rules! compare_text {
    ($table:ty, $column:expr, $op:expr, $value:expr) => {{
        let value: String = $value;
        let predicate: $crate::repository::filter::Predicate<$table> = match $op {
            $crate::domain::filter::Comparison::Eq => Box::new($column.eq(value)),
            $crate::domain::filter::Comparison::Neq => Box::new($column.ne(value)),
            $crate::domain::filter::Comparison::Gt => Box::new($column.gt(value)),
            $crate::domain::filter::Comparison::Gte => Box::new($column.ge(value)),
            $crate::domain::filter::Comparison::Lt => Box::new($column.lt(value)),
            $crate::domain::filter::Comparison::Lte => Box::new($column.le(value)),
            $crate::domain::filter::Comparison::Like => Box::new($column.like(value)),
        };
        predicate
    }};
}

pub(crate) use {compare_integer, compare_text};
