//! Domain entities and the traits that let repositories and services treat
//! them generically.

use std::fmt::Display;

use crate::domain::filter::{FilterField, Where};
use crate::domain::types::TypeConstraintError;

pub mod category;
pub mod comment;
pub mod filter;
pub mod post;
pub mod tag;
pub mod types;

/// A persisted record with a generated identifier.
pub trait Entity: Clone {
    type Id: Copy + Eq + Display + Into<i32> + TryFrom<i32, Error = TypeConstraintError>;
    /// Fields usable in a [`Where`] predicate.
    type Field: FilterField;
    /// Insert payload, without the generated id.
    type New;
    /// Partial update payload.
    type Patch;

    /// Singular name used in client-facing messages, e.g. `"Post"`.
    const NAME: &'static str;
    const ID_FIELD: Self::Field;

    fn id(&self) -> Self::Id;

    /// Client-facing message for a missing record of this type.
    fn not_found_message() -> String {
        format!("{} not found", Self::NAME)
    }

    /// Predicate selecting exactly the record with `id`.
    fn where_id(id: Self::Id) -> Where<Self::Field> {
        let id: i32 = id.into();
        Where::eq(Self::ID_FIELD, id)
    }
}

/// Entities that have a non-generated identity used to deduplicate creation
/// requests.
pub trait NaturalKey: Entity {
    /// Predicate matching an existing record with the same natural key as
    /// `new`.
    fn natural_key(new: &Self::New) -> Where<Self::Field>;
}
