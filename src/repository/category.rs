//! The `categories` join table seen from both sides: Post→Tag and Tag→Post.

use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;

use crate::domain::category::Category;
use crate::domain::filter::{Filter, Where};
use crate::domain::post::{NewPost, Post, PostField, PostPatch};
use crate::domain::tag::{NewTag, Tag, TagField, TagPatch};
use crate::domain::types::{PostId, TagId};
use crate::models::category::{Category as DbCategory, NewCategory as DbNewCategory};
use crate::repository::post::{insert_post, load_posts, update_posts};
use crate::repository::tag::{insert_tag, load_tags, update_tags};
use crate::repository::{DieselRepository, RepositoryResult, ThroughReader, ThroughWriter};
use crate::schema::categories;

fn linked_tag_ids(conn: &mut SqliteConnection, post_id: PostId) -> RepositoryResult<Vec<i32>> {
    let ids = categories::table
        .filter(categories::post_id.eq(post_id.get()))
        .select(categories::tag_id)
        .load::<i32>(conn)?;
    Ok(ids)
}

fn linked_post_ids(conn: &mut SqliteConnection, tag_id: TagId) -> RepositoryResult<Vec<i32>> {
    let ids = categories::table
        .filter(categories::tag_id.eq(tag_id.get()))
        .select(categories::post_id)
        .load::<i32>(conn)?;
    Ok(ids)
}

fn find_link(
    conn: &mut SqliteConnection,
    post_id: PostId,
    tag_id: TagId,
) -> RepositoryResult<Option<Category>> {
    let category = categories::table
        .filter(categories::post_id.eq(post_id.get()))
        .filter(categories::tag_id.eq(tag_id.get()))
        .first::<DbCategory>(conn)
        .optional()?;

    let category = category.map(TryInto::try_into).transpose()?;
    Ok(category)
}

/// Insert the join row unless the pair is already linked.
fn insert_link(
    conn: &mut SqliteConnection,
    post_id: PostId,
    tag_id: TagId,
) -> RepositoryResult<usize> {
    let affected = diesel::insert_or_ignore_into(categories::table)
        .values(DbNewCategory {
            post_id: post_id.get(),
            tag_id: tag_id.get(),
        })
        .execute(conn)?;
    Ok(affected)
}

fn delete_link(
    conn: &mut SqliteConnection,
    post_id: PostId,
    tag_id: TagId,
) -> RepositoryResult<usize> {
    let affected = diesel::delete(
        categories::table
            .filter(categories::post_id.eq(post_id.get()))
            .filter(categories::tag_id.eq(tag_id.get())),
    )
    .execute(conn)?;
    Ok(affected)
}

impl ThroughReader<Post, Tag> for DieselRepository {
    fn list_related(&self, owner: PostId, filter: &Filter<TagField>) -> RepositoryResult<Vec<Tag>> {
        let mut conn = self.conn()?;

        let ids = linked_tag_ids(&mut conn, owner)?;
        load_tags(&mut conn, filter, Some(&ids))
    }

    fn link_exists(&self, owner: PostId, related: TagId) -> RepositoryResult<bool> {
        let mut conn = self.conn()?;
        Ok(find_link(&mut conn, owner, related)?.is_some())
    }
}

impl ThroughWriter<Post, Tag> for DieselRepository {
    fn link(&self, owner: PostId, related: TagId) -> RepositoryResult<usize> {
        let mut conn = self.conn()?;
        insert_link(&mut conn, owner, related)
    }

    fn unlink(&self, owner: PostId, related: TagId) -> RepositoryResult<usize> {
        let mut conn = self.conn()?;
        delete_link(&mut conn, owner, related)
    }

    fn create_related(&self, owner: PostId, new: &NewTag) -> RepositoryResult<Tag> {
        let mut conn = self.conn()?;

        conn.transaction(|conn| {
            let tag = insert_tag(conn, new)?;
            insert_link(conn, owner, tag.id)?;
            Ok(tag)
        })
    }

    fn patch_related(
        &self,
        owner: PostId,
        patch: &TagPatch,
        where_clause: &Where<TagField>,
    ) -> RepositoryResult<usize> {
        let mut conn = self.conn()?;

        conn.transaction(|conn| {
            let ids = linked_tag_ids(conn, owner)?;
            update_tags(conn, patch, where_clause, Some(&ids))
        })
    }
}

impl ThroughReader<Tag, Post> for DieselRepository {
    fn list_related(
        &self,
        owner: TagId,
        filter: &Filter<PostField>,
    ) -> RepositoryResult<Vec<Post>> {
        let mut conn = self.conn()?;

        let ids = linked_post_ids(&mut conn, owner)?;
        load_posts(&mut conn, filter, Some(&ids))
    }

    fn link_exists(&self, owner: TagId, related: PostId) -> RepositoryResult<bool> {
        let mut conn = self.conn()?;
        Ok(find_link(&mut conn, related, owner)?.is_some())
    }
}

impl ThroughWriter<Tag, Post> for DieselRepository {
    fn link(&self, owner: TagId, related: PostId) -> RepositoryResult<usize> {
        let mut conn = self.conn()?;
        insert_link(&mut conn, related, owner)
    }

    fn unlink(&self, owner: TagId, related: PostId) -> RepositoryResult<usize> {
        let mut conn = self.conn()?;
        delete_link(&mut conn, related, owner)
    }

    fn create_related(&self, owner: TagId, new: &NewPost) -> RepositoryResult<Post> {
        let mut conn = self.conn()?;

        conn.transaction(|conn| {
            let post = insert_post(conn, new)?;
            insert_link(conn, post.id, owner)?;
            Ok(post)
        })
    }

    fn patch_related(
        &self,
        owner: TagId,
        patch: &PostPatch,
        where_clause: &Where<PostField>,
    ) -> RepositoryResult<usize> {
        let mut conn = self.conn()?;

        conn.transaction(|conn| {
            let ids = linked_post_ids(conn, owner)?;
            update_posts(conn, patch, where_clause, Some(&ids))
        })
    }
}
