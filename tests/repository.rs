use diesel::prelude::*;
use pushkind_blog::domain::comment::{Comment, CommentField, NewComment};
use pushkind_blog::domain::filter::{Comparison, Filter, SortDirection, Where};
use pushkind_blog::domain::post::{NewPost, Post, PostField, PostPatch};
use pushkind_blog::domain::tag::{NewTag, Tag, TagField, TagPatch};
use pushkind_blog::domain::types::{CommentText, PostContent, PostId, PostTitle, TagId, TagName};
use pushkind_blog::repository::{
    DieselRepository, EntityReader, EntityWriter, RepositoryError, ThroughReader, ThroughWriter,
};
use pushkind_blog::schema::{categories, comments};
use pushkind_blog::services::relations::{PostTags, TagPosts};

mod common;

fn new_post(title: &str) -> NewPost {
    NewPost {
        title: PostTitle::new(title).expect("valid title"),
        content: PostContent::new("Body").expect("valid content"),
    }
}

fn new_tag(name: &str) -> NewTag {
    NewTag {
        name: TagName::new(name).expect("valid name"),
    }
}

fn count_links(test_db: &common::TestDb) -> i64 {
    let mut conn = test_db.pool().get().expect("connection");
    categories::table
        .count()
        .get_result(&mut conn)
        .expect("should count categories")
}

#[test]
fn test_post_repository_crud() {
    let test_db = common::TestDb::new();
    let repo = DieselRepository::new(test_db.pool());

    let post: Post = repo.create(&new_post("Hello")).expect("should create post");
    let found = EntityReader::<Post>::find_by_id(&repo, post.id)
        .expect("should query post")
        .expect("post should exist");
    assert_eq!(found.title.as_str(), "Hello");

    let patch = PostPatch {
        content: Some(PostContent::new("Updated").expect("valid content")),
        ..PostPatch::default()
    };
    let by_id = Where::eq(PostField::Id, post.id.get());
    let affected =
        EntityWriter::<Post>::patch(&repo, &patch, &by_id).expect("should patch post");
    assert_eq!(affected, 1);
    let found = EntityReader::<Post>::find_by_id(&repo, post.id)
        .expect("should query post")
        .expect("post should exist");
    assert_eq!(found.content.as_str(), "Updated");
    assert!(found.updated_at >= post.updated_at);

    let deleted = EntityWriter::<Post>::delete_by_id(&repo, post.id).expect("should delete");
    assert_eq!(deleted, 1);
    assert!(EntityReader::<Post>::find_by_id(&repo, post.id)
        .expect("should query post")
        .is_none());
}

#[test]
fn duplicate_tag_name_is_a_conflict() {
    let test_db = common::TestDb::new();
    let repo = DieselRepository::new(test_db.pool());

    let _: Tag = repo.create(&new_tag("rust")).expect("should create tag");
    let duplicate: Result<Tag, _> = repo.create(&new_tag("rust"));

    assert!(matches!(duplicate, Err(RepositoryError::Conflict(_))));
}

#[test]
fn filters_sort_and_paginate_in_sql() {
    let test_db = common::TestDb::new();
    let repo = DieselRepository::new(test_db.pool());
    for name in ["rust", "diesel", "actix", "Rustacean"] {
        let _: Tag = repo.create(&new_tag(name)).expect("should create tag");
    }

    let like = Filter::new(Where::Compare {
        field: TagField::Name,
        op: Comparison::Like,
        value: "rust%".into(),
    })
    .order_by(TagField::Name, SortDirection::Desc);
    let tags: Vec<Tag> = repo.find(&like).expect("should filter tags");
    let names: Vec<&str> = tags.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["rust", "Rustacean"]);

    let page = Filter::default()
        .order_by(TagField::Name, SortDirection::Asc)
        .paginate(2, 1);
    let tags: Vec<Tag> = repo.find(&page).expect("should paginate tags");
    let names: Vec<&str> = tags.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["actix", "diesel"]);

    let either = Where::Or(vec![
        Where::eq(TagField::Name, "actix"),
        Where::In {
            field: TagField::Id,
            values: vec![1.into(), 2.into()],
        },
    ]);
    let total = EntityReader::<Tag>::count(&repo, &either).expect("should count tags");
    assert_eq!(total, 3);
}

#[test]
fn create_or_link_twice_keeps_one_tag_and_one_link() {
    let test_db = common::TestDb::new();
    let repo = DieselRepository::new(test_db.pool());
    let post: Post = repo.create(&new_post("Hello")).expect("should create post");
    let resolver = PostTags::new(&repo, &repo);

    let first = resolver
        .create_or_link(post.id, &new_tag("rust"))
        .expect("should create tag");
    let second = resolver
        .create_or_link(post.id, &new_tag("rust"))
        .expect("should reuse tag");

    assert_eq!(first.id, second.id);
    let tags: Vec<Tag> = repo.find(&Filter::default()).expect("should list tags");
    assert_eq!(tags.len(), 1);
    assert_eq!(count_links(&test_db), 1);
}

#[test]
fn link_is_idempotent() {
    let test_db = common::TestDb::new();
    let repo = DieselRepository::new(test_db.pool());
    let post: Post = repo.create(&new_post("Hello")).expect("should create post");
    let tag: Tag = repo.create(&new_tag("rust")).expect("should create tag");

    let first = ThroughWriter::<Post, Tag>::link(&repo, post.id, tag.id).expect("should link");
    let second = ThroughWriter::<Post, Tag>::link(&repo, post.id, tag.id).expect("should link");

    assert_eq!((first, second), (1, 0));
    assert!(ThroughReader::<Tag, Post>::link_exists(&repo, tag.id, post.id).expect("lookup"));
}

#[test]
fn unlink_keeps_both_records() {
    let test_db = common::TestDb::new();
    let repo = DieselRepository::new(test_db.pool());
    let post: Post = repo.create(&new_post("Hello")).expect("should create post");
    let resolver = PostTags::new(&repo, &repo);
    resolver
        .create_or_link(post.id, &new_tag("rust"))
        .expect("should create tag");

    let removed = resolver
        .unlink(post.id, &Where::eq(TagField::Name, "rust"))
        .expect("should unlink");

    assert_eq!(removed, 1);
    assert_eq!(count_links(&test_db), 0);
    let tags: Vec<Tag> = repo.find(&Filter::default()).expect("should list tags");
    assert_eq!(tags.len(), 1);
    assert!(EntityReader::<Post>::find_by_id(&repo, post.id)
        .expect("should query post")
        .is_some());
}

#[test]
fn related_listing_and_patch_are_scoped_to_links() {
    let test_db = common::TestDb::new();
    let repo = DieselRepository::new(test_db.pool());
    let tag: Tag = repo.create(&new_tag("rust")).expect("should create tag");
    let resolver = TagPosts::new(&repo, &repo);
    resolver
        .create_or_link(tag.id, &new_post("Linked"))
        .expect("should create post");
    let _: Post = repo.create(&new_post("Unlinked")).expect("should create post");

    let posts = resolver
        .list(tag.id, &Filter::default())
        .expect("should list posts");
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].title.as_str(), "Linked");

    let patch = PostPatch {
        content: Some(PostContent::new("Edited").expect("valid content")),
        ..PostPatch::default()
    };
    let none = resolver
        .patch(tag.id, &patch, &Where::eq(PostField::Title, "Unlinked"))
        .expect("should patch");
    assert_eq!(none, 0);
    let one = resolver
        .patch(tag.id, &patch, &Where::all())
        .expect("should patch");
    assert_eq!(one, 1);

    let tag_patch = TagPatch {
        name: Some(TagName::new("rustlang").expect("valid name")),
    };
    let renamed = ThroughWriter::<Post, Tag>::patch_related(
        &repo,
        posts[0].id,
        &tag_patch,
        &Where::all(),
    )
    .expect("should patch tags");
    assert_eq!(renamed, 1);
}

#[test]
fn deleting_post_cascades_to_comments_and_links() {
    let test_db = common::TestDb::new();
    let repo = DieselRepository::new(test_db.pool());
    let post: Post = repo.create(&new_post("Hello")).expect("should create post");
    PostTags::new(&repo, &repo)
        .create_or_link(post.id, &new_tag("rust"))
        .expect("should create tag");
    let new_comment = NewComment {
        post_id: post.id,
        text: CommentText::new("Nice").expect("valid text"),
    };
    EntityWriter::<Comment>::create(&repo, &new_comment).expect("should create comment");

    EntityWriter::<Post>::delete_by_id(&repo, post.id).expect("should delete post");

    let mut conn = test_db.pool().get().expect("connection");
    let remaining_comments: i64 = comments::table
        .count()
        .get_result(&mut conn)
        .expect("should count comments");
    assert_eq!(remaining_comments, 0);
    assert_eq!(count_links(&test_db), 0);
    let tags: Vec<Tag> = repo.find(&Filter::default()).expect("should list tags");
    assert_eq!(tags.len(), 1);
    assert_eq!(
        EntityReader::<Comment>::count(
            &repo,
            &Where::eq(CommentField::PostId, post.id.get())
        )
        .expect("should count"),
        0
    );
}

#[test]
fn comment_requires_existing_post() {
    let test_db = common::TestDb::new();
    let repo = DieselRepository::new(test_db.pool());

    let orphan = NewComment {
        post_id: PostId::new(99).expect("valid id"),
        text: CommentText::new("Orphan").expect("valid text"),
    };
    let result = EntityWriter::<Comment>::create(&repo, &orphan);

    assert!(matches!(result, Err(RepositoryError::ValidationError(_))));
}

#[test]
fn linking_missing_records_is_a_validation_error() {
    let test_db = common::TestDb::new();
    let repo = DieselRepository::new(test_db.pool());
    let post: Post = repo.create(&new_post("Hello")).expect("should create post");
    let missing_tag = TagId::new(42).expect("valid id");

    let result = ThroughWriter::<Post, Tag>::link(&repo, post.id, missing_tag);

    assert!(matches!(result, Err(RepositoryError::ValidationError(_))));
    assert_eq!(count_links(&test_db), 0);
}
