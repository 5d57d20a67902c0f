//! Plain CRUD over a single entity type, shared by posts, tags and comments.

use crate::domain::Entity;
use crate::domain::filter::{Filter, Where};
use crate::repository::{EntityReader, EntityWriter};
use crate::services::includes::{Expand, expand_all};
use crate::services::{ServiceError, ServiceResult};

pub fn list<E, R>(filter: &Filter<E::Field>, repo: &R) -> ServiceResult<Vec<E>>
where
    E: Entity,
    R: EntityReader<E>,
{
    repo.find(filter).map_err(|e| {
        log::error!("Failed to list {}s: {e}", E::NAME);
        e.into()
    })
}

pub fn count<E, R>(where_clause: &Where<E::Field>, repo: &R) -> ServiceResult<usize>
where
    E: Entity,
    R: EntityReader<E>,
{
    repo.count(where_clause).map_err(|e| {
        log::error!("Failed to count {}s: {e}", E::NAME);
        e.into()
    })
}

/// Fetch a record, reporting `"<Entity> not found"` when it is absent.
pub fn get<E, R>(id: E::Id, repo: &R) -> ServiceResult<E>
where
    E: Entity,
    R: EntityReader<E>,
{
    match repo.find_by_id(id) {
        Ok(Some(entity)) => Ok(entity),
        Ok(None) => Err(ServiceError::NotFound(E::not_found_message())),
        Err(e) => {
            log::error!("Failed to get {} {id}: {e}", E::NAME);
            Err(e.into())
        }
    }
}

/// [`list`] with the requested relations embedded in every record.
pub fn list_with<E, R>(
    filter: &Filter<E::Field>,
    include: &[E::Relation],
    repo: &R,
) -> ServiceResult<Vec<E::Expanded>>
where
    E: Expand<R>,
    R: EntityReader<E>,
{
    let items = list::<E, R>(filter, repo)?;
    expand_all(items, include, repo)
}

/// [`get`] with the requested relations embedded.
pub fn get_with<E, R>(id: E::Id, include: &[E::Relation], repo: &R) -> ServiceResult<E::Expanded>
where
    E: Expand<R>,
    R: EntityReader<E>,
{
    get::<E, R>(id, repo)?.expand(include, repo)
}

pub fn create<E, R>(new: &E::New, repo: &R) -> ServiceResult<E>
where
    E: Entity,
    R: EntityWriter<E>,
{
    match repo.create(new) {
        Ok(created) => {
            log::info!("Created {} {}", E::NAME, created.id());
            Ok(created)
        }
        Err(e) => {
            log::error!("Failed to create {}: {e}", E::NAME);
            Err(e.into())
        }
    }
}

pub fn patch<E, R>(id: E::Id, patch: &E::Patch, repo: &R) -> ServiceResult<()>
where
    E: Entity,
    R: EntityReader<E> + EntityWriter<E>,
{
    get::<E, R>(id, repo)?;

    repo.patch(patch, &E::where_id(id)).map_err(|e| {
        log::error!("Failed to patch {} {id}: {e}", E::NAME);
        ServiceError::from(e)
    })?;
    Ok(())
}

pub fn delete<E, R>(id: E::Id, repo: &R) -> ServiceResult<()>
where
    E: Entity,
    R: EntityWriter<E>,
{
    match repo.delete_by_id(id) {
        Ok(0) => Err(ServiceError::NotFound(E::not_found_message())),
        Ok(_) => {
            log::info!("Deleted {} {id}", E::NAME);
            Ok(())
        }
        Err(e) => {
            log::error!("Failed to delete {} {id}: {e}", E::NAME);
            Err(e.into())
        }
    }
}
