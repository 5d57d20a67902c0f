//! `/posts/{id}/tags` and its mirror `/tags/{id}/posts`.

use actix_web::{Responder, delete, get, patch, post, web};

use crate::domain::post::{NewPost, Post, PostField, PostPatch, PostRelation};
use crate::domain::tag::{NewTag, Tag, TagField, TagPatch, TagRelation};
use crate::forms::filter::{FilterQuery, WhereQuery};
use crate::forms::posts::{NewPostForm, PatchPostForm};
use crate::forms::tags::{NewTagForm, PatchTagForm};
use crate::repository::DieselRepository;
use crate::routes::{count_response, json_response, path_id};
use crate::services::includes::expand_all;
use crate::services::relations::{PostTags, TagPosts};

#[get("/posts/{id}/tags")]
pub async fn list_post_tags(
    id: web::Path<i32>,
    query: web::Query<FilterQuery>,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let repo = repo.get_ref();
    let result = path_id::<Post>(id.into_inner()).and_then(|id| {
        let (filter, include) = query.parse::<TagField, TagRelation>()?;
        let tags = PostTags::new(repo, repo).list(id, &filter)?;
        expand_all(tags, &include, repo)
    });
    json_response(result)
}

#[post("/posts/{id}/tags")]
pub async fn create_post_tag(
    id: web::Path<i32>,
    form: web::Json<NewTagForm>,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let repo = repo.get_ref();
    let result = path_id::<Post>(id.into_inner()).and_then(|id| {
        let new = NewTag::try_from(form.into_inner())?;
        PostTags::new(repo, repo).create_or_link(id, &new)
    });
    json_response(result)
}

#[patch("/posts/{id}/tags")]
pub async fn patch_post_tags(
    id: web::Path<i32>,
    query: web::Query<WhereQuery>,
    form: web::Json<PatchTagForm>,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let repo = repo.get_ref();
    let result = path_id::<Post>(id.into_inner()).and_then(|id| {
        let where_clause = query.parse::<TagField>()?;
        let patch = TagPatch::try_from(form.into_inner())?;
        PostTags::new(repo, repo).patch(id, &patch, &where_clause)
    });
    count_response(result)
}

#[delete("/posts/{id}/tags")]
pub async fn delete_post_tag(
    id: web::Path<i32>,
    query: web::Query<WhereQuery>,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let repo = repo.get_ref();
    let result = path_id::<Post>(id.into_inner()).and_then(|id| {
        let where_clause = query.parse::<TagField>()?;
        PostTags::new(repo, repo).unlink(id, &where_clause)
    });
    count_response(result)
}

#[get("/tags/{id}/posts")]
pub async fn list_tag_posts(
    id: web::Path<i32>,
    query: web::Query<FilterQuery>,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let repo = repo.get_ref();
    let result = path_id::<Tag>(id.into_inner()).and_then(|id| {
        let (filter, include) = query.parse::<PostField, PostRelation>()?;
        let posts = TagPosts::new(repo, repo).list(id, &filter)?;
        expand_all(posts, &include, repo)
    });
    json_response(result)
}

#[post("/tags/{id}/posts")]
pub async fn create_tag_post(
    id: web::Path<i32>,
    form: web::Json<NewPostForm>,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let repo = repo.get_ref();
    let result = path_id::<Tag>(id.into_inner()).and_then(|id| {
        let new = NewPost::try_from(form.into_inner())?;
        TagPosts::new(repo, repo).create_or_link(id, &new)
    });
    json_response(result)
}

#[patch("/tags/{id}/posts")]
pub async fn patch_tag_posts(
    id: web::Path<i32>,
    query: web::Query<WhereQuery>,
    form: web::Json<PatchPostForm>,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let repo = repo.get_ref();
    let result = path_id::<Tag>(id.into_inner()).and_then(|id| {
        let where_clause = query.parse::<PostField>()?;
        let patch = PostPatch::try_from(form.into_inner())?;
        TagPosts::new(repo, repo).patch(id, &patch, &where_clause)
    });
    count_response(result)
}

#[delete("/tags/{id}/posts")]
pub async fn delete_tag_post(
    id: web::Path<i32>,
    query: web::Query<WhereQuery>,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let repo = repo.get_ref();
    let result = path_id::<Tag>(id.into_inner()).and_then(|id| {
        let where_clause = query.parse::<PostField>()?;
        TagPosts::new(repo, repo).unlink(id, &where_clause)
    });
    count_response(result)
}
