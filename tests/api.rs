use actix_web::http::StatusCode;
use actix_web::{App, test, web};
use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};
use pushkind_blog::repository::DieselRepository;
use pushkind_blog::routes::configure;
use serde_json::{Value, json};

mod common;

macro_rules! init_app {
    ($test_db:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new(DieselRepository::new($test_db.pool())))
                .configure(configure),
        )
        .await
    };
}

fn encode(raw: &str) -> String {
    utf8_percent_encode(raw, NON_ALPHANUMERIC).to_string()
}

#[actix_web::test]
async fn post_crud_round_trip() {
    let test_db = common::TestDb::new();
    let app = init_app!(test_db);

    let req = test::TestRequest::post()
        .uri("/posts")
        .set_json(json!({"title": "Hello", "content": "World"}))
        .to_request();
    let created: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(created["title"], "Hello");
    let id = created["id"].as_i64().expect("generated id");

    let req = test::TestRequest::patch()
        .uri(&format!("/posts/{id}"))
        .set_json(json!({"content": "Updated"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let req = test::TestRequest::get()
        .uri(&format!("/posts/{id}"))
        .to_request();
    let fetched: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(fetched["content"], "Updated");
    assert!(fetched.get("createdAt").is_some());

    let req = test::TestRequest::get().uri("/posts/count").to_request();
    let count: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(count, json!({"count": 1}));

    let req = test::TestRequest::delete()
        .uri(&format!("/posts/{id}"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let req = test::TestRequest::get()
        .uri(&format!("/posts/{id}"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(
        body,
        json!({"error": {"statusCode": 404, "message": "Post not found"}})
    );
}

#[actix_web::test]
async fn post_tags_create_or_link_and_unlink() {
    let test_db = common::TestDb::new();
    let app = init_app!(test_db);

    let req = test::TestRequest::post()
        .uri("/posts")
        .set_json(json!({"title": "Hello", "content": "World"}))
        .to_request();
    let post: Value = test::call_and_read_body_json(&app, req).await;
    let post_id = post["id"].as_i64().expect("generated id");

    let mut tag_ids = Vec::new();
    for _ in 0..2 {
        let req = test::TestRequest::post()
            .uri(&format!("/posts/{post_id}/tags"))
            .set_json(json!({"name": "rust"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let tag: Value = test::read_body_json(resp).await;
        tag_ids.push(tag["id"].as_i64().expect("tag id"));
    }
    assert_eq!(tag_ids[0], tag_ids[1]);

    let req = test::TestRequest::get()
        .uri(&format!("/posts/{post_id}/tags"))
        .to_request();
    let tags: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(tags.as_array().map(Vec::len), Some(1));

    let req = test::TestRequest::get()
        .uri(&format!("/tags/{}/posts", tag_ids[0]))
        .to_request();
    let posts: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(posts[0]["title"], "Hello");

    let where_name = encode(r#"{"name":"rust"}"#);
    let req = test::TestRequest::delete()
        .uri(&format!("/posts/{post_id}/tags?where={where_name}"))
        .to_request();
    let count: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(count, json!({"count": 1}));

    let req = test::TestRequest::get()
        .uri(&format!("/posts/{post_id}/tags"))
        .to_request();
    let tags: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(tags, json!([]));

    let req = test::TestRequest::get().uri("/tags/count").to_request();
    let count: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(count, json!({"count": 1}));
}

#[actix_web::test]
async fn unlink_reports_missing_owner_and_target() {
    let test_db = common::TestDb::new();
    let app = init_app!(test_db);

    let where_name = encode(r#"{"name":"rust"}"#);
    let req = test::TestRequest::delete()
        .uri(&format!("/posts/41/tags?where={where_name}"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"]["message"], "Post not found");

    let req = test::TestRequest::post()
        .uri("/posts")
        .set_json(json!({"title": "Hello", "content": "World"}))
        .to_request();
    let post: Value = test::call_and_read_body_json(&app, req).await;
    let post_id = post["id"].as_i64().expect("generated id");

    let req = test::TestRequest::delete()
        .uri(&format!("/posts/{post_id}/tags?where={where_name}"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"]["message"], "Tag not found");
}

#[actix_web::test]
async fn patch_related_without_matches_counts_zero() {
    let test_db = common::TestDb::new();
    let app = init_app!(test_db);

    let req = test::TestRequest::post()
        .uri("/tags")
        .set_json(json!({"name": "rust"}))
        .to_request();
    let tag: Value = test::call_and_read_body_json(&app, req).await;
    let tag_id = tag["id"].as_i64().expect("generated id");

    let req = test::TestRequest::post()
        .uri(&format!("/tags/{tag_id}/posts"))
        .set_json(json!({"title": "Hello", "content": "World"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let where_title = encode(r#"{"title":"Missing"}"#);
    let req = test::TestRequest::patch()
        .uri(&format!("/tags/{tag_id}/posts?where={where_title}"))
        .set_json(json!({"content": "Changed"}))
        .to_request();
    let count: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(count, json!({"count": 0}));

    let req = test::TestRequest::get()
        .uri(&format!("/tags/{tag_id}/posts"))
        .to_request();
    let posts: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(posts[0]["content"], "World");
}

#[actix_web::test]
async fn comments_are_scoped_to_their_post() {
    let test_db = common::TestDb::new();
    let app = init_app!(test_db);

    let req = test::TestRequest::post()
        .uri("/posts")
        .set_json(json!({"title": "Hello", "content": "World"}))
        .to_request();
    let post: Value = test::call_and_read_body_json(&app, req).await;
    let post_id = post["id"].as_i64().expect("generated id");

    let req = test::TestRequest::post()
        .uri(&format!("/posts/{post_id}/comments"))
        .set_json(json!({"text": "First!"}))
        .to_request();
    let comment: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(comment["postId"], post_id);
    let comment_id = comment["id"].as_i64().expect("generated id");

    let req = test::TestRequest::get()
        .uri(&format!("/comments/{comment_id}/post"))
        .to_request();
    let owner: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(owner["id"], post_id);

    let req = test::TestRequest::post()
        .uri("/posts/99/comments")
        .set_json(json!({"text": "Orphan"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::delete()
        .uri(&format!("/posts/{post_id}/comments"))
        .to_request();
    let count: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(count, json!({"count": 1}));
}

#[actix_web::test]
async fn invalid_input_is_a_bad_request() {
    let test_db = common::TestDb::new();
    let app = init_app!(test_db);

    let filter = encode(r#"{"where":{"colour":"red"}}"#);
    let req = test::TestRequest::get()
        .uri(&format!("/tags?filter={filter}"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"]["statusCode"], 400);

    let req = test::TestRequest::post()
        .uri("/tags")
        .set_json(json!({"id": 5, "name": "rust"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::post()
        .uri("/tags")
        .set_json(json!({"name": "   "}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn duplicate_tag_through_crud_is_a_conflict() {
    let test_db = common::TestDb::new();
    let app = init_app!(test_db);

    for expected in [StatusCode::OK, StatusCode::CONFLICT] {
        let req = test::TestRequest::post()
            .uri("/tags")
            .set_json(json!({"name": "rust"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), expected);
    }
}

#[actix_web::test]
async fn include_embeds_related_records() {
    let test_db = common::TestDb::new();
    let app = init_app!(test_db);

    let req = test::TestRequest::post()
        .uri("/posts")
        .set_json(json!({"title": "Hello", "content": "World"}))
        .to_request();
    let post: Value = test::call_and_read_body_json(&app, req).await;
    let post_id = post["id"].as_i64().expect("generated id");

    let req = test::TestRequest::post()
        .uri(&format!("/posts/{post_id}/tags"))
        .set_json(json!({"name": "rust"}))
        .to_request();
    let tag: Value = test::call_and_read_body_json(&app, req).await;
    let tag_id = tag["id"].as_i64().expect("tag id");

    let req = test::TestRequest::post()
        .uri(&format!("/posts/{post_id}/comments"))
        .set_json(json!({"text": "First!"}))
        .to_request();
    let comment: Value = test::call_and_read_body_json(&app, req).await;
    let comment_id = comment["id"].as_i64().expect("comment id");

    let filter = encode(r#"{"include":["tags","comments"]}"#);
    let req = test::TestRequest::get()
        .uri(&format!("/posts?filter={filter}"))
        .to_request();
    let posts: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(posts[0]["title"], "Hello");
    assert_eq!(posts[0]["tags"][0]["name"], "rust");
    assert_eq!(posts[0]["comments"][0]["text"], "First!");

    let filter = encode(r#"{"include":[{"relation":"posts"}]}"#);
    let req = test::TestRequest::get()
        .uri(&format!("/tags/{tag_id}?filter={filter}"))
        .to_request();
    let tag: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(tag["name"], "rust");
    assert_eq!(tag["posts"][0]["id"], post_id);

    let filter = encode(r#"{"include":"post"}"#);
    let req = test::TestRequest::get()
        .uri(&format!("/comments/{comment_id}?filter={filter}"))
        .to_request();
    let comment: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(comment["post"]["title"], "Hello");

    let req = test::TestRequest::get()
        .uri(&format!("/posts/{post_id}"))
        .to_request();
    let plain: Value = test::call_and_read_body_json(&app, req).await;
    assert!(plain.get("tags").is_none());
    assert!(plain.get("comments").is_none());

    let filter = encode(r#"{"include":["comments"]}"#);
    let req = test::TestRequest::get()
        .uri(&format!("/tags?filter={filter}"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn unparsable_path_id_is_a_json_not_found() {
    let test_db = common::TestDb::new();
    let app = init_app!(test_db);

    let req = test::TestRequest::get()
        .uri("/posts/99999999999/tags")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(
        body,
        json!({"error": {"statusCode": 404, "message": "Post not found"}})
    );

    let req = test::TestRequest::get().uri("/comments/abc").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"]["message"], "Comment not found");
}

#[actix_web::test]
async fn unsupported_filter_keys_are_not_reported_as_bad_json() {
    let test_db = common::TestDb::new();
    let app = init_app!(test_db);

    let filter = encode(r#"{"fields":["name"]}"#);
    let req = test::TestRequest::get()
        .uri(&format!("/tags?filter={filter}"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    let message = body["error"]["message"].as_str().expect("message");
    assert!(message.starts_with("Invalid filter"));

    let filter = encode("{not json");
    let req = test::TestRequest::get()
        .uri(&format!("/tags?filter={filter}"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    let body: Value = test::read_body_json(resp).await;
    let message = body["error"]["message"].as_str().expect("message");
    assert!(message.starts_with("Filter is not valid JSON"));
}
