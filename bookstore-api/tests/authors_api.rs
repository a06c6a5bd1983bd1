mod common;

use common::TestApp;
use http::StatusCode;
use serde_json::json;

#[tokio::test]
async fn admin_creates_author() {
    let app = TestApp::new();
    let admin = app.seed_admin("admin").await;

    let res = app
        .post(
            "/authors",
            Some(&admin),
            json!({ "name": "Octavia Butler", "bio": "Parable series", "birth_date": "1947-06-22" }),
        )
        .await;
    assert_eq!(res.status, StatusCode::CREATED);
    assert_eq!(res.body["name"], "Octavia Butler");
    assert_eq!(res.body["bio"], "Parable series");
    assert_eq!(res.body["birth_date"], "1947-06-22");
    assert!(res.body["id"].as_i64().is_some());
}

#[tokio::test]
async fn bio_is_optional() {
    let app = TestApp::new();
    let admin = app.seed_admin("admin").await;
    let res = app
        .post(
            "/authors",
            Some(&admin),
            json!({ "name": "Anonymous", "birth_date": "1900-01-01" }),
        )
        .await;
    assert_eq!(res.status, StatusCode::CREATED);
    assert!(res.body["bio"].is_null());
}

#[tokio::test]
async fn duplicate_author_name_rejected() {
    let app = TestApp::new();
    let admin = app.seed_admin("admin").await;
    app.create_author(&admin, "Octavia Butler").await;

    let res = app
        .post(
            "/authors",
            Some(&admin),
            json!({ "name": "Octavia Butler", "birth_date": "1947-06-22" }),
        )
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body["code"], 5003);
}

#[tokio::test]
async fn future_birth_date_rejected_before_persistence() {
    let app = TestApp::new();
    let admin = app.seed_admin("admin").await;

    let res = app
        .post(
            "/authors",
            Some(&admin),
            json!({ "name": "Time Traveller", "birth_date": "2099-01-01" }),
        )
        .await;
    assert_eq!(res.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(res.body["details"]["birth_date"].is_string());

    let res = app.get("/authors", None).await;
    assert_eq!(res.body, json!([]));
}

#[tokio::test]
async fn unparsable_birth_date_is_unprocessable() {
    let app = TestApp::new();
    let admin = app.seed_admin("admin").await;
    let res = app
        .post(
            "/authors",
            Some(&admin),
            json!({ "name": "Someone", "birth_date": "yesterday" }),
        )
        .await;
    assert_eq!(res.status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn author_detail_embeds_books() {
    let app = TestApp::new();
    let admin = app.seed_admin("admin").await;
    let author_id = app.create_author(&admin, "Stanislaw Lem").await;
    let other_id = app.create_author(&admin, "Philip K. Dick").await;
    let first = app.create_book(&admin, author_id, 1000, 1).await;
    let second = app.create_book(&admin, author_id, 2000, 2).await;
    app.create_book(&admin, other_id, 3000, 3).await;

    let res = app.get(&format!("/authors/{author_id}"), None).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["name"], "Stanislaw Lem");
    let books = res.body["books"].as_array().unwrap();
    let ids: Vec<i64> = books.iter().map(|b| b["id"].as_i64().unwrap()).collect();
    assert_eq!(ids, vec![first, second]);
    assert!(books[0].get("author").is_none());
}

#[tokio::test]
async fn unknown_author_is_not_found() {
    let app = TestApp::new();
    let res = app.get("/authors/424242", None).await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert_eq!(res.body["code"], 5002);

    let res = app.get("/authors/not-a-number", None).await;
    assert_eq!(res.status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn list_authors_with_skip_and_limit() {
    let app = TestApp::new();
    let admin = app.seed_admin("admin").await;
    for name in ["A", "B", "C", "D"] {
        app.create_author(&admin, name).await;
    }

    let res = app.get("/authors", None).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body.as_array().unwrap().len(), 4);

    let res = app.get("/authors?skip=1&limit=2", None).await;
    let names: Vec<&str> = res
        .body
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["B", "C"]);

    let res = app.get("/authors?limit=0", None).await;
    assert_eq!(res.status, StatusCode::UNPROCESSABLE_ENTITY);
    let res = app.get("/authors?skip=-1", None).await;
    assert_eq!(res.status, StatusCode::UNPROCESSABLE_ENTITY);
}
