use actix_web::{Responder, delete, get, patch, post, web};

use crate::domain::tag::{NewTag, Tag, TagField, TagPatch, TagRelation};
use crate::forms::filter::{FilterQuery, WhereQuery};
use crate::forms::tags::{NewTagForm, PatchTagForm};
use crate::repository::DieselRepository;
use crate::routes::{count_response, json_response, no_content_response, path_id};
use crate::services::{ServiceError, entities};

#[get("/tags")]
pub async fn list_tags(
    query: web::Query<FilterQuery>,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let result = query
        .parse::<TagField, TagRelation>()
        .map_err(ServiceError::from)
        .and_then(|(filter, include)| {
            entities::list_with::<Tag, _>(&filter, &include, repo.get_ref())
        });
    json_response(result)
}

#[get("/tags/count")]
pub async fn count_tags(
    query: web::Query<WhereQuery>,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let result = query
        .parse::<TagField>()
        .map_err(ServiceError::from)
        .and_then(|where_clause| entities::count::<Tag, _>(&where_clause, repo.get_ref()));
    count_response(result)
}

#[post("/tags")]
pub async fn create_tag(
    form: web::Json<NewTagForm>,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let result = NewTag::try_from(form.into_inner())
        .map_err(ServiceError::from)
        .and_then(|new| entities::create::<Tag, _>(&new, repo.get_ref()));
    json_response(result)
}

#[get("/tags/{id}")]
pub async fn get_tag(
    id: web::Path<i32>,
    query: web::Query<FilterQuery>,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let result = path_id::<Tag>(id.into_inner()).and_then(|id| {
        let include = query.include::<TagRelation>()?;
        entities::get_with::<Tag, _>(id, &include, repo.get_ref())
    });
    json_response(result)
}

#[patch("/tags/{id}")]
pub async fn patch_tag(
    id: web::Path<i32>,
    form: web::Json<PatchTagForm>,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let result = path_id::<Tag>(id.into_inner()).and_then(|id| {
        let patch = TagPatch::try_from(form.into_inner())?;
        entities::patch::<Tag, _>(id, &patch, repo.get_ref())
    });
    no_content_response(result)
}

#[delete("/tags/{id}")]
pub async fn delete_tag(id: web::Path<i32>, repo: web::Data<DieselRepository>) -> impl Responder {
    let result = path_id::<Tag>(id.into_inner())
        .and_then(|id| entities::delete::<Tag, _>(id, repo.get_ref()));
    no_content_response(result)
}
