//! Many-to-many relation endpoints resolved through a join table.
//!
//! [`ThroughResolver`] holds the create-or-link and the existence-checked
//! unlink policies. It is written once against the repository traits and
//! instantiated for both directions of the Post↔Tag relation.

use std::marker::PhantomData;

use crate::domain::filter::{Filter, Where};
use crate::domain::post::Post;
use crate::domain::tag::Tag;
use crate::domain::{Entity, NaturalKey};
use crate::repository::{EntityReader, RepositoryError, ThroughReader, ThroughWriter};
use crate::services::{ServiceError, ServiceResult};

/// Relation resolver from owner `O` to related `R`.
///
/// `owners` is the repository of the owning side, which also exposes the join
/// table; `related` is the repository searched for existing related records.
pub struct ThroughResolver<'a, O, R, OR, RR> {
    owners: &'a OR,
    related: &'a RR,
    _entities: PhantomData<fn() -> (O, R)>,
}

/// Tags of a post.
pub type PostTags<'a, Repo> = ThroughResolver<'a, Post, Tag, Repo, Repo>;
/// Posts carrying a tag.
pub type TagPosts<'a, Repo> = ThroughResolver<'a, Tag, Post, Repo, Repo>;

impl<'a, O, R, OR, RR> ThroughResolver<'a, O, R, OR, RR>
where
    O: Entity,
    R: Entity,
    OR: EntityReader<O> + ThroughReader<O, R> + ThroughWriter<O, R>,
    RR: EntityReader<R>,
{
    pub fn new(owners: &'a OR, related: &'a RR) -> Self {
        Self {
            owners,
            related,
            _entities: PhantomData,
        }
    }

    /// Related records linked to `owner` that match `filter`.
    pub fn list(&self, owner: O::Id, filter: &Filter<R::Field>) -> ServiceResult<Vec<R>> {
        self.owners.list_related(owner, filter).map_err(|e| {
            log::error!("Failed to list {}s of {} {owner}: {e}", R::NAME, O::NAME);
            e.into()
        })
    }

    /// Apply `patch` to the linked records matching `where_clause`.
    ///
    /// The owner is not checked; an unknown owner simply matches nothing.
    pub fn patch(
        &self,
        owner: O::Id,
        patch: &R::Patch,
        where_clause: &Where<R::Field>,
    ) -> ServiceResult<usize> {
        self.owners
            .patch_related(owner, patch, where_clause)
            .map_err(|e| {
                log::error!("Failed to patch {}s of {} {owner}: {e}", R::NAME, O::NAME);
                e.into()
            })
    }

    /// Remove the link between `owner` and the first record matching
    /// `where_clause`. Both records are kept.
    ///
    /// The target is looked up among all records, not only the linked ones,
    /// so an existing but unlinked target yields a count of 0.
    pub fn unlink(&self, owner: O::Id, where_clause: &Where<R::Field>) -> ServiceResult<usize> {
        self.ensure_owner(owner)?;

        let target = match self.related.find_one(where_clause) {
            Ok(Some(target)) => target,
            Ok(None) => return Err(ServiceError::NotFound(R::not_found_message())),
            Err(e) => {
                log::error!("Failed to find {} to unlink: {e}", R::NAME);
                return Err(e.into());
            }
        };

        let removed = self.owners.unlink(owner, target.id()).map_err(|e| {
            log::error!(
                "Failed to unlink {} {} from {} {owner}: {e}",
                R::NAME,
                target.id(),
                O::NAME
            );
            ServiceError::from(e)
        })?;
        log::info!(
            "Unlinked {} {} from {} {owner} ({removed} rows)",
            R::NAME,
            target.id(),
            O::NAME
        );
        Ok(removed)
    }

    fn ensure_owner(&self, owner: O::Id) -> ServiceResult<O> {
        match self.owners.find_by_id(owner) {
            Ok(Some(found)) => Ok(found),
            Ok(None) => Err(ServiceError::NotFound(O::not_found_message())),
            Err(e) => {
                log::error!("Failed to get {} {owner}: {e}", O::NAME);
                Err(e.into())
            }
        }
    }

    /// Link `existing` to `owner` unless the pair is already linked.
    fn link_existing(&self, owner: O::Id, existing: R) -> ServiceResult<R> {
        let linked = self
            .owners
            .link_exists(owner, existing.id())
            .map_err(|e| {
                log::error!("Failed to check link to {} {owner}: {e}", O::NAME);
                ServiceError::from(e)
            })?;
        if linked {
            log::debug!(
                "{} {} already linked to {} {owner}",
                R::NAME,
                existing.id(),
                O::NAME
            );
            return Ok(existing);
        }

        self.owners.link(owner, existing.id()).map_err(|e| {
            log::error!("Failed to link {} {} to {} {owner}: {e}", R::NAME, existing.id(), O::NAME);
            ServiceError::from(e)
        })?;
        log::info!("Linked existing {} {} to {} {owner}", R::NAME, existing.id(), O::NAME);
        Ok(existing)
    }
}

impl<'a, O, R, OR, RR> ThroughResolver<'a, O, R, OR, RR>
where
    O: Entity,
    R: NaturalKey,
    OR: EntityReader<O> + ThroughReader<O, R> + ThroughWriter<O, R>,
    RR: EntityReader<R>,
{
    /// Attach a record described by `new` to `owner`.
    ///
    /// A record with the same natural key is reused and linked at most once;
    /// otherwise a new record and its link are created together. Never
    /// reports a duplicate: a creation that loses a race against a concurrent
    /// request links the winner's record instead.
    pub fn create_or_link(&self, owner: O::Id, new: &R::New) -> ServiceResult<R> {
        self.ensure_owner(owner)?;

        if let Some(existing) = self.find_by_natural_key(new)? {
            return self.link_existing(owner, existing);
        }

        match self.owners.create_related(owner, new) {
            Ok(created) => {
                log::info!(
                    "Created {} {} linked to {} {owner}",
                    R::NAME,
                    created.id(),
                    O::NAME
                );
                Ok(created)
            }
            Err(RepositoryError::Conflict(reason)) => {
                log::warn!("Concurrent {} creation detected ({reason}), linking instead", R::NAME);
                match self.find_by_natural_key(new)? {
                    Some(existing) => self.link_existing(owner, existing),
                    None => Err(RepositoryError::Conflict(reason).into()),
                }
            }
            Err(e) => {
                log::error!("Failed to create {} for {} {owner}: {e}", R::NAME, O::NAME);
                Err(e.into())
            }
        }
    }

    fn find_by_natural_key(&self, new: &R::New) -> ServiceResult<Option<R>> {
        self.related.find_one(&R::natural_key(new)).map_err(|e| {
            log::error!("Failed to look up existing {}: {e}", R::NAME);
            e.into()
        })
    }
}
