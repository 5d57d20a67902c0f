//! Post→Comment one-to-many accessor.
//!
//! Every operation is scoped by the comment's `post_id`; there is no join
//! table and no deduplication.

use crate::domain::Entity;
use crate::domain::comment::{Comment, CommentField, CommentPatch, NewComment};
use crate::domain::filter::{Filter, Where};
use crate::domain::post::Post;
use crate::domain::types::{CommentId, CommentText, PostId};
use crate::repository::{EntityReader, EntityWriter};
use crate::services::{ServiceError, ServiceResult};

fn of_post(post_id: PostId) -> Where<CommentField> {
    Where::eq(CommentField::PostId, post_id.get())
}

pub fn list_post_comments<R>(
    post_id: PostId,
    filter: Filter<CommentField>,
    repo: &R,
) -> ServiceResult<Vec<Comment>>
where
    R: EntityReader<Comment>,
{
    let filter = filter.restrict(of_post(post_id));
    repo.find(&filter).map_err(|e| {
        log::error!("Failed to list comments of post {post_id}: {e}");
        e.into()
    })
}

pub fn create_post_comment<R>(
    post_id: PostId,
    text: CommentText,
    repo: &R,
) -> ServiceResult<Comment>
where
    R: EntityReader<Post> + EntityWriter<Comment>,
{
    match EntityReader::<Post>::find_by_id(repo, post_id) {
        Ok(Some(_)) => {}
        Ok(None) => return Err(ServiceError::NotFound(Post::not_found_message())),
        Err(e) => {
            log::error!("Failed to get post {post_id}: {e}");
            return Err(e.into());
        }
    }

    let new = NewComment { post_id, text };
    match repo.create(&new) {
        Ok(comment) => {
            log::info!("Created comment {} on post {post_id}", comment.id);
            Ok(comment)
        }
        Err(e) => {
            log::error!("Failed to create comment on post {post_id}: {e}");
            Err(e.into())
        }
    }
}

pub fn patch_post_comments<R>(
    post_id: PostId,
    patch: &CommentPatch,
    where_clause: Where<CommentField>,
    repo: &R,
) -> ServiceResult<usize>
where
    R: EntityWriter<Comment>,
{
    let where_clause = where_clause.and(of_post(post_id));
    repo.patch(patch, &where_clause).map_err(|e| {
        log::error!("Failed to patch comments of post {post_id}: {e}");
        e.into()
    })
}

pub fn delete_post_comments<R>(
    post_id: PostId,
    where_clause: Where<CommentField>,
    repo: &R,
) -> ServiceResult<usize>
where
    R: EntityWriter<Comment>,
{
    let where_clause = where_clause.and(of_post(post_id));
    match repo.delete(&where_clause) {
        Ok(deleted) => {
            log::info!("Deleted {deleted} comments of post {post_id}");
            Ok(deleted)
        }
        Err(e) => {
            log::error!("Failed to delete comments of post {post_id}: {e}");
            Err(e.into())
        }
    }
}

/// The post a comment belongs to.
pub fn get_comment_post<R>(comment_id: CommentId, repo: &R) -> ServiceResult<Post>
where
    R: EntityReader<Comment> + EntityReader<Post>,
{
    let comment = match EntityReader::<Comment>::find_by_id(repo, comment_id) {
        Ok(Some(comment)) => comment,
        Ok(None) => return Err(ServiceError::NotFound(Comment::not_found_message())),
        Err(e) => {
            log::error!("Failed to get comment {comment_id}: {e}");
            return Err(e.into());
        }
    };

    match EntityReader::<Post>::find_by_id(repo, comment.post_id) {
        Ok(Some(post)) => Ok(post),
        Ok(None) => Err(ServiceError::NotFound(Post::not_found_message())),
        Err(e) => {
            log::error!("Failed to get post {}: {e}", comment.post_id);
            Err(e.into())
        }
    }
}
