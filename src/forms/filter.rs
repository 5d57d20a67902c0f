//! JSON `filter` and `where` query parameters.
//!
//! Both arrive as JSON-encoded strings in this shape:
//!
//! ```text
//! filter={"where":{"name":{"like":"r%"}},"order":"name DESC","limit":10,"skip":20}
//! filter={"include":["tags",{"relation":"comments"}]}
//! where={"or":[{"id":1},{"title":"Hello"}]}
//! ```
//!
//! and are converted into the typed [`Filter`] and [`Where`] of one entity,
//! rejecting unknown fields and operators.

use serde::Deserialize;
use serde_json::error::Category;
use serde_json::{Map, Value};
use thiserror::Error;
use validator::{Validate, ValidationErrors};

use crate::domain::filter::{
    Comparison, FieldKind, FieldValue, Filter, FilterField, MAX_LIMIT, Order, Relation,
    SortDirection, Where,
};

/// Query string carrying an optional `filter` parameter.
#[derive(Debug, Default, Deserialize)]
pub struct FilterQuery {
    pub filter: Option<String>,
}

impl FilterQuery {
    fn form(&self) -> Result<Option<FilterForm>, FilterFormError> {
        match self.filter.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(raw) => Ok(Some(serde_json::from_str(raw)?)),
        }
    }

    /// The filter over `F` together with the relations to embed in every
    /// matching record.
    pub fn parse<F: FilterField, R: Relation>(
        &self,
    ) -> Result<(Filter<F>, Vec<R>), FilterFormError> {
        match self.form()? {
            None => Ok((Filter::default(), Vec::new())),
            Some(mut form) => {
                let include = parse_include(form.include.take())?;
                Ok((form.try_into()?, include))
            }
        }
    }

    /// Only the `include` part; single-record lookups ignore the rest.
    pub fn include<R: Relation>(&self) -> Result<Vec<R>, FilterFormError> {
        match self.form()? {
            None => Ok(Vec::new()),
            Some(form) => parse_include(form.include),
        }
    }
}

/// Query string carrying an optional `where` parameter.
#[derive(Debug, Default, Deserialize)]
pub struct WhereQuery {
    #[serde(rename = "where")]
    pub where_clause: Option<String>,
}

impl WhereQuery {
    pub fn parse<F: FilterField>(&self) -> Result<Where<F>, FilterFormError> {
        match self.where_clause.as_deref().map(str::trim) {
            None | Some("") => Ok(Where::all()),
            Some(raw) => parse_where(&serde_json::from_str::<Value>(raw)?),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum OrderForm {
    One(String),
    Many(Vec<String>),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum IncludeForm {
    One(String),
    Many(Vec<IncludeItemForm>),
}

/// `"tags"` or `{"relation": "tags"}`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum IncludeItemForm {
    Name(String),
    Scoped(IncludeScopeForm),
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IncludeScopeForm {
    pub relation: String,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct FilterForm {
    #[serde(rename = "where")]
    pub where_clause: Option<Value>,
    pub order: Option<OrderForm>,
    #[validate(range(min = 1, max = MAX_LIMIT))]
    pub limit: Option<u32>,
    #[serde(alias = "offset")]
    pub skip: Option<u32>,
    pub include: Option<IncludeForm>,
}

#[derive(Debug, Error)]
pub enum FilterFormError {
    #[error("Filter is not valid JSON: {0}")]
    Malformed(String),
    #[error("Filter validation failed: {0}")]
    Validation(String),
    #[error("Invalid filter: {0}")]
    InvalidClause(String),
}

impl From<serde_json::Error> for FilterFormError {
    fn from(value: serde_json::Error) -> Self {
        match value.classify() {
            Category::Data => Self::InvalidClause(value.to_string()),
            Category::Io | Category::Syntax | Category::Eof => Self::Malformed(value.to_string()),
        }
    }
}

impl From<ValidationErrors> for FilterFormError {
    fn from(value: ValidationErrors) -> Self {
        Self::Validation(value.to_string())
    }
}

fn invalid(message: impl Into<String>) -> FilterFormError {
    FilterFormError::InvalidClause(message.into())
}

impl<F: FilterField> TryFrom<FilterForm> for Filter<F> {
    type Error = FilterFormError;

    fn try_from(value: FilterForm) -> Result<Self, Self::Error> {
        value.validate()?;

        let where_clause = match &value.where_clause {
            Some(raw) => parse_where(raw)?,
            None => Where::all(),
        };
        let order = match value.order {
            Some(OrderForm::One(key)) => vec![parse_order(&key)?],
            Some(OrderForm::Many(keys)) => keys
                .iter()
                .map(|key| parse_order(key))
                .collect::<Result<_, _>>()?,
            None => Vec::new(),
        };

        Ok(Filter {
            where_clause,
            order,
            limit: value.limit,
            skip: value.skip,
        })
    }
}

fn parse_include<R: Relation>(include: Option<IncludeForm>) -> Result<Vec<R>, FilterFormError> {
    let names = match include {
        None => Vec::new(),
        Some(IncludeForm::One(name)) => vec![name],
        Some(IncludeForm::Many(items)) => items
            .into_iter()
            .map(|item| match item {
                IncludeItemForm::Name(name) => name,
                IncludeItemForm::Scoped(scope) => scope.relation,
            })
            .collect(),
    };

    let mut relations = Vec::with_capacity(names.len());
    for name in names {
        let relation =
            R::from_name(&name).ok_or_else(|| invalid(format!("unknown relation `{name}`")))?;
        if !relations.contains(&relation) {
            relations.push(relation);
        }
    }
    Ok(relations)
}

fn parse_field<F: FilterField>(name: &str) -> Result<F, FilterFormError> {
    F::from_name(name).ok_or_else(|| invalid(format!("unknown field `{name}`")))
}

/// `"<field>"` or `"<field> ASC|DESC"`.
fn parse_order<F: FilterField>(key: &str) -> Result<Order<F>, FilterFormError> {
    let mut parts = key.split_whitespace();
    let field = match parts.next() {
        Some(name) => parse_field(name)?,
        None => return Err(invalid("empty order key")),
    };
    let direction = match parts.next() {
        None => SortDirection::Asc,
        Some(dir) if dir.eq_ignore_ascii_case("asc") => SortDirection::Asc,
        Some(dir) if dir.eq_ignore_ascii_case("desc") => SortDirection::Desc,
        Some(dir) => return Err(invalid(format!("unknown sort direction `{dir}`"))),
    };
    if parts.next().is_some() {
        return Err(invalid(format!("malformed order key `{key}`")));
    }
    Ok(Order { field, direction })
}

/// Convert a JSON `where` object into a predicate tree. Several keys in one
/// object are combined with AND.
pub fn parse_where<F: FilterField>(value: &Value) -> Result<Where<F>, FilterFormError> {
    let Value::Object(object) = value else {
        return Err(invalid("where must be an object"));
    };

    let mut clauses = object
        .iter()
        .map(|(key, value)| parse_entry(key, value))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(match clauses.len() {
        1 => clauses.remove(0),
        _ => Where::And(clauses),
    })
}

fn parse_entry<F: FilterField>(key: &str, value: &Value) -> Result<Where<F>, FilterFormError> {
    match key {
        "and" | "or" => {
            let Value::Array(items) = value else {
                return Err(invalid(format!("`{key}` expects an array")));
            };
            let items = items
                .iter()
                .map(parse_where)
                .collect::<Result<Vec<_>, _>>()?;
            Ok(if key == "and" {
                Where::And(items)
            } else {
                Where::Or(items)
            })
        }
        _ => {
            let field = parse_field::<F>(key)?;
            match value {
                Value::Object(operators) => parse_operators(field, operators),
                scalar => Ok(Where::Compare {
                    field,
                    op: Comparison::Eq,
                    value: parse_value(field, scalar)?,
                }),
            }
        }
    }
}

fn parse_operators<F: FilterField>(
    field: F,
    operators: &Map<String, Value>,
) -> Result<Where<F>, FilterFormError> {
    let mut clauses = operators
        .iter()
        .map(|(op, operand)| parse_operator(field, op, operand))
        .collect::<Result<Vec<_>, _>>()?;
    match clauses.len() {
        0 => Err(invalid(format!("no operator given for `{}`", field.name()))),
        1 => Ok(clauses.remove(0)),
        _ => Ok(Where::And(clauses)),
    }
}

fn parse_operator<F: FilterField>(
    field: F,
    op: &str,
    operand: &Value,
) -> Result<Where<F>, FilterFormError> {
    let op = match op {
        "eq" => Comparison::Eq,
        "neq" => Comparison::Neq,
        "gt" => Comparison::Gt,
        "gte" => Comparison::Gte,
        "lt" => Comparison::Lt,
        "lte" => Comparison::Lte,
        "like" => {
            if field.kind() != FieldKind::Text {
                return Err(invalid(format!("`like` is not supported on `{}`", field.name())));
            }
            Comparison::Like
        }
        "inq" => {
            let Value::Array(items) = operand else {
                return Err(invalid("`inq` expects an array"));
            };
            let values = items
                .iter()
                .map(|item| parse_value(field, item))
                .collect::<Result<Vec<_>, _>>()?;
            return Ok(Where::In { field, values });
        }
        other => return Err(invalid(format!("unknown operator `{other}`"))),
    };

    Ok(Where::Compare {
        field,
        op,
        value: parse_value(field, operand)?,
    })
}

/// Type-check a literal against the field. Integer fields also accept
/// numeric strings, as query strings often carry ids that way.
fn parse_value<F: FilterField>(field: F, value: &Value) -> Result<FieldValue, FilterFormError> {
    let mismatch = || {
        invalid(format!(
            "`{}` expects {}",
            field.name(),
            match field.kind() {
                FieldKind::Integer => "an integer",
                FieldKind::Text => "a string",
            }
        ))
    };

    match (field.kind(), value) {
        (FieldKind::Integer, Value::Number(number)) => {
            number.as_i64().map(FieldValue::Integer).ok_or_else(mismatch)
        }
        (FieldKind::Integer, Value::String(text)) => text
            .trim()
            .parse::<i64>()
            .map(FieldValue::Integer)
            .map_err(|_| mismatch()),
        (FieldKind::Text, Value::String(text)) => Ok(FieldValue::Text(text.clone())),
        _ => Err(mismatch()),
    }
}
