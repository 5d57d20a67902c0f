//! Generic data access contract and its Diesel implementation.
//!
//! Services are written against the traits in this module only. Each entity
//! gets the conventional CRUD surface through [`EntityReader`] and
//! [`EntityWriter`]; many-to-many relations backed by a join table are exposed
//! through [`ThroughReader`] and [`ThroughWriter`], parameterized over the
//! owning and the related entity so both directions share one contract.

use crate::db::{DbConnection, DbPool};
use crate::domain::Entity;
use crate::domain::filter::{Filter, Where};

pub mod category;
pub mod comment;
pub mod errors;
pub mod filter;
pub mod post;
pub mod tag;

pub use errors::{RepositoryError, RepositoryResult};

/// Repository implementation backed by Diesel and SQLite.
///
/// The underlying `r2d2::Pool` is cheap to clone, allowing the repository to
/// be passed around freely between handlers.
#[derive(Clone)]
pub struct DieselRepository {
    pool: DbPool, // r2d2::Pool is cheap to clone
}

impl DieselRepository {
    /// Create a new repository from an established database pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Get a pooled database connection.
    fn conn(&self) -> RepositoryResult<DbConnection> {
        Ok(self.pool.get()?)
    }
}

/// Read operations over one entity type.
pub trait EntityReader<E: Entity> {
    /// List records matching the filter.
    fn find(&self, filter: &Filter<E::Field>) -> RepositoryResult<Vec<E>>;

    /// Count records matching the predicate.
    fn count(&self, where_clause: &Where<E::Field>) -> RepositoryResult<usize>;

    /// First record (by id) matching the predicate.
    fn find_one(&self, where_clause: &Where<E::Field>) -> RepositoryResult<Option<E>> {
        let mut filter = Filter::new(where_clause.clone());
        filter.limit = Some(1);
        Ok(self.find(&filter)?.into_iter().next())
    }

    /// Retrieve a record by its identifier.
    fn find_by_id(&self, id: E::Id) -> RepositoryResult<Option<E>> {
        self.find_one(&E::where_id(id))
    }
}

/// Write operations over one entity type.
pub trait EntityWriter<E: Entity> {
    /// Persist a new record and return it with its generated id.
    fn create(&self, new: &E::New) -> RepositoryResult<E>;

    /// Apply a partial update to every record matching the predicate.
    fn patch(&self, patch: &E::Patch, where_clause: &Where<E::Field>) -> RepositoryResult<usize>;

    /// Delete every record matching the predicate.
    fn delete(&self, where_clause: &Where<E::Field>) -> RepositoryResult<usize>;

    fn delete_by_id(&self, id: E::Id) -> RepositoryResult<usize> {
        self.delete(&E::where_id(id))
    }
}

/// Read side of a many-to-many relation from `O` to `R` through a join table.
pub trait ThroughReader<O: Entity, R: Entity> {
    /// Related records linked to `owner` that match the filter.
    fn list_related(&self, owner: O::Id, filter: &Filter<R::Field>) -> RepositoryResult<Vec<R>>;

    /// Whether a join row exists between `owner` and `related`.
    fn link_exists(&self, owner: O::Id, related: R::Id) -> RepositoryResult<bool>;
}

/// Write side of a many-to-many relation from `O` to `R`.
pub trait ThroughWriter<O: Entity, R: Entity> {
    /// Insert the join row. Returns 0 when the pair was already linked.
    fn link(&self, owner: O::Id, related: R::Id) -> RepositoryResult<usize>;

    /// Remove the join row, keeping both records. Returns the rows removed.
    fn unlink(&self, owner: O::Id, related: R::Id) -> RepositoryResult<usize>;

    /// Create a related record and link it to `owner` atomically.
    fn create_related(&self, owner: O::Id, new: &R::New) -> RepositoryResult<R>;

    /// Apply a partial update to the related records linked to `owner` that
    /// match the predicate.
    fn patch_related(
        &self,
        owner: O::Id,
        patch: &R::Patch,
        where_clause: &Where<R::Field>,
    ) -> RepositoryResult<usize>;
}
