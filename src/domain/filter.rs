//! Storage-independent query language shared by every repository.
//!
//! A [`Filter`] is the typed counterpart of a JSON `filter` object:
//! a [`Where`] predicate tree over one entity's fields, an ordering and a
//! pagination window. Repositories translate it into SQL; the in-memory test
//! repository evaluates it with [`Where::matches`] and [`Filter::apply`].

use std::cmp::Ordering;
use std::fmt::Debug;

/// Largest page size a client may request.
pub const MAX_LIMIT: u32 = 1000;

/// Storage type of a filterable field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldKind {
    Integer,
    Text,
}

/// Field enumeration of an entity that can appear in a filter.
pub trait FilterField: Copy + Eq + Debug + 'static {
    /// Every field, in declaration order.
    const ALL: &'static [Self];

    /// Name used on the wire.
    fn name(self) -> &'static str;

    fn kind(self) -> FieldKind;

    /// Look up a field by its wire name.
    fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|field| field.name() == name)
    }
}

/// Related records an entity can embed in query results.
pub trait Relation: Copy + Eq + Debug + 'static {
    const ALL: &'static [Self];

    /// Name used in `include`.
    fn name(self) -> &'static str;

    fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|relation| relation.name() == name)
    }
}

/// Literal operand of a comparison.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FieldValue {
    Integer(i64),
    Text(String),
}

impl FieldValue {
    fn partial_cmp_value(&self, other: &FieldValue) -> Option<Ordering> {
        match (self, other) {
            (Self::Integer(a), Self::Integer(b)) => Some(a.cmp(b)),
            (Self::Text(a), Self::Text(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

impl From<i32> for FieldValue {
    fn from(value: i32) -> Self {
        Self::Integer(value.into())
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// Binary comparison operators.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Comparison {
    Eq,
    Neq,
    Gt,
    Gte,
    Lt,
    Lte,
    /// SQL `LIKE` with `%` and `_` wildcards, ASCII case-insensitive.
    Like,
}

/// Predicate tree over the fields `F` of one entity.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Where<F> {
    /// All children must hold. An empty list matches everything.
    And(Vec<Where<F>>),
    /// At least one child must hold. An empty list matches nothing.
    Or(Vec<Where<F>>),
    Compare {
        field: F,
        op: Comparison,
        value: FieldValue,
    },
    /// Field equals one of the listed values.
    In { field: F, values: Vec<FieldValue> },
}

impl<F> Default for Where<F> {
    fn default() -> Self {
        Self::And(Vec::new())
    }
}

impl<F: FilterField> Where<F> {
    /// Predicate that matches every row.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn eq(field: F, value: impl Into<FieldValue>) -> Self {
        Self::Compare {
            field,
            op: Comparison::Eq,
            value: value.into(),
        }
    }

    /// Conjunction of `self` and `other`, flattening trivial cases.
    pub fn and(self, other: Where<F>) -> Self {
        match (self, other) {
            (Self::And(a), other) if a.is_empty() => other,
            (this, Self::And(b)) if b.is_empty() => this,
            (Self::And(mut a), other) => {
                a.push(other);
                Self::And(a)
            }
            (this, other) => Self::And(vec![this, other]),
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Self::And(items) if items.is_empty())
    }

    /// Evaluate the predicate against an in-memory record.
    pub fn matches<E: Filterable<F>>(&self, entity: &E) -> bool {
        match self {
            Self::And(items) => items.iter().all(|item| item.matches(entity)),
            Self::Or(items) => items.iter().any(|item| item.matches(entity)),
            Self::Compare { field, op, value } => {
                let actual = entity.field_value(*field);
                compare(&actual, *op, value)
            }
            Self::In { field, values } => {
                let actual = entity.field_value(*field);
                values.iter().any(|value| *value == actual)
            }
        }
    }
}

fn compare(actual: &FieldValue, op: Comparison, expected: &FieldValue) -> bool {
    if let Comparison::Like = op {
        return match (actual, expected) {
            (FieldValue::Text(text), FieldValue::Text(pattern)) => like(text, pattern),
            _ => false,
        };
    }
    let Some(ordering) = actual.partial_cmp_value(expected) else {
        return false;
    };
    match op {
        Comparison::Eq => ordering == Ordering::Equal,
        Comparison::Neq => ordering != Ordering::Equal,
        Comparison::Gt => ordering == Ordering::Greater,
        Comparison::Gte => ordering != Ordering::Less,
        Comparison::Lt => ordering == Ordering::Less,
        Comparison::Lte => ordering != Ordering::Greater,
        Comparison::Like => false,
    }
}

/// SQLite `LIKE` semantics: `%` matches any run, `_` one character,
/// ASCII letters compare case-insensitively.
fn like(text: &str, pattern: &str) -> bool {
    let text: Vec<char> = text.chars().map(|c| c.to_ascii_lowercase()).collect();
    let pattern: Vec<char> = pattern.chars().map(|c| c.to_ascii_lowercase()).collect();

    let (mut t, mut p) = (0, 0);
    let mut backtrack: Option<(usize, usize)> = None;
    while t < text.len() {
        if p < pattern.len() && (pattern[p] == '_' || pattern[p] == text[t]) {
            t += 1;
            p += 1;
        } else if p < pattern.len() && pattern[p] == '%' {
            backtrack = Some((p, t));
            p += 1;
        } else if let Some((star, matched)) = backtrack {
            p = star + 1;
            t = matched + 1;
            backtrack = Some((star, matched + 1));
        } else {
            return false;
        }
    }
    pattern[p..].iter().all(|c| *c == '%')
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

/// One ordering key.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Order<F> {
    pub field: F,
    pub direction: SortDirection,
}

/// Full query over one entity type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Filter<F> {
    pub where_clause: Where<F>,
    /// Empty means ascending by id.
    pub order: Vec<Order<F>>,
    pub limit: Option<u32>,
    pub skip: Option<u32>,
}

impl<F> Default for Filter<F> {
    fn default() -> Self {
        Self {
            where_clause: Where::default(),
            order: Vec::new(),
            limit: None,
            skip: None,
        }
    }
}

impl<F: FilterField> Filter<F> {
    pub fn new(where_clause: Where<F>) -> Self {
        Self {
            where_clause,
            ..Self::default()
        }
    }

    pub fn order_by(mut self, field: F, direction: SortDirection) -> Self {
        self.order.push(Order { field, direction });
        self
    }

    pub fn paginate(mut self, limit: u32, skip: u32) -> Self {
        self.limit = Some(limit);
        self.skip = Some(skip);
        self
    }

    /// Narrow the predicate with an additional conjunct.
    pub fn restrict(mut self, extra: Where<F>) -> Self {
        self.where_clause = std::mem::take(&mut self.where_clause).and(extra);
        self
    }

    /// Filter, sort and paginate an in-memory collection.
    pub fn apply<E: Filterable<F>>(&self, items: impl IntoIterator<Item = E>) -> Vec<E> {
        let mut items: Vec<E> = items
            .into_iter()
            .filter(|item| self.where_clause.matches(item))
            .collect();

        items.sort_by(|a, b| {
            for order in &self.order {
                let ordering = a
                    .field_value(order.field)
                    .partial_cmp_value(&b.field_value(order.field))
                    .unwrap_or(Ordering::Equal);
                let ordering = match order.direction {
                    SortDirection::Asc => ordering,
                    SortDirection::Desc => ordering.reverse(),
                };
                if ordering != Ordering::Equal {
                    return ordering;
                }
            }
            a.sort_key().cmp(&b.sort_key())
        });

        let skip = self.skip.unwrap_or(0) as usize;
        let limit = self.limit.map(|l| l as usize).unwrap_or(usize::MAX);
        items.into_iter().skip(skip).take(limit).collect()
    }
}

/// Records that can be evaluated against a [`Where`] in memory.
pub trait Filterable<F> {
    fn field_value(&self, field: F) -> FieldValue;

    /// Tie breaker for ordering; the record id.
    fn sort_key(&self) -> i32;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    enum NoteField {
        Id,
        Title,
    }

    impl FilterField for NoteField {
        const ALL: &'static [Self] = &[Self::Id, Self::Title];

        fn name(self) -> &'static str {
            match self {
                Self::Id => "id",
                Self::Title => "title",
            }
        }

        fn kind(self) -> FieldKind {
            match self {
                Self::Id => FieldKind::Integer,
                Self::Title => FieldKind::Text,
            }
        }
    }

    #[derive(Clone, Debug, PartialEq)]
    struct Note {
        id: i32,
        title: &'static str,
    }

    impl Filterable<NoteField> for Note {
        fn field_value(&self, field: NoteField) -> FieldValue {
            match field {
                NoteField::Id => self.id.into(),
                NoteField::Title => self.title.into(),
            }
        }

        fn sort_key(&self) -> i32 {
            self.id
        }
    }

    fn notes() -> Vec<Note> {
        vec![
            Note { id: 3, title: "Rust ownership" },
            Note { id: 1, title: "Async rust" },
            Note { id: 2, title: "Diesel joins" },
        ]
    }

    #[test]
    fn like_follows_sqlite_wildcards() {
        assert!(like("Async rust", "%RUST"));
        assert!(like("Rust ownership", "rust%"));
        assert!(like("abc", "a_c"));
        assert!(like("abc", "%"));
        assert!(!like("abc", "a_"));
        assert!(!like("Diesel joins", "%rust%"));
    }

    #[test]
    fn empty_where_matches_everything_and_sorts_by_id() {
        let filter = Filter::<NoteField>::default();
        let ids: Vec<i32> = filter.apply(notes()).into_iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn or_and_in_combine() {
        let filter = Filter::new(Where::Or(vec![
            Where::Compare {
                field: NoteField::Title,
                op: Comparison::Like,
                value: "diesel%".into(),
            },
            Where::In {
                field: NoteField::Id,
                values: vec![3.into()],
            },
        ]));
        let ids: Vec<i32> = filter.apply(notes()).into_iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![2, 3]);
    }

    #[test]
    fn orders_and_paginates() {
        let filter = Filter::default()
            .order_by(NoteField::Title, SortDirection::Desc)
            .paginate(2, 1);
        let titles: Vec<&str> = filter.apply(notes()).into_iter().map(|n| n.title).collect();
        assert_eq!(titles, vec!["Diesel joins", "Async rust"]);
    }

    #[test]
    fn mismatched_kinds_never_match() {
        let predicate = Where::eq(NoteField::Id, "3");
        assert!(!predicate.matches(&notes()[0]));
    }

    #[test]
    fn and_flattens_trivial_predicates() {
        let predicate = Where::all().and(Where::eq(NoteField::Id, 1));
        assert_eq!(predicate, Where::eq(NoteField::Id, 1));
        assert!(Where::<NoteField>::all().and(Where::all()).is_all());
    }
}
