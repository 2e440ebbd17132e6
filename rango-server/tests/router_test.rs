/// HTTP-level tests for the Rango router
///
/// Requests are driven straight through the router with `oneshot`, no socket.

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use rango_core::{Directory, DirectoryConfig};
use rango_server::{build_router, AppState, ServerConfig};
use serde_json::Value;
use tower::ServiceExt;

fn setup() -> (Directory, Router) {
    let directory = Directory::in_memory(DirectoryConfig::default()).unwrap();
    directory.populate().unwrap();
    let state = AppState::new(directory.clone(), ServerConfig::default());
    (directory, build_router(state))
}

async fn get(app: &Router, uri: &str) -> axum::response::Response {
    app.clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

async fn body_string(response: axum::response::Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    serde_json::from_str(&body_string(response).await).unwrap()
}

#[tokio::test]
async fn test_show_category_counts_view() {
    let (directory, app) = setup();
    let before = directory.find_category("Other Frameworks").unwrap().views;

    let response = get(&app, "/category/Other_Frameworks/").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["exists"], true);
    assert_eq!(json["category_name"], "Other Frameworks");
    assert_eq!(json["category"]["views"], before + 1);
    assert_eq!(json["pages"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_show_category_any_case_and_without_trailing_slash() {
    let (_, app) = setup();

    let json = body_json(get(&app, "/category/python").await).await;
    assert_eq!(json["exists"], true);
    assert_eq!(json["category_name"], "Python");
}

#[tokio::test]
async fn test_unknown_category_renders_fallback() {
    let (_, app) = setup();

    let response = get(&app, "/category/Haskell_Web/").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["exists"], false);
    assert_eq!(json["category_name"], "Haskell Web");
    assert!(json["message"].as_str().unwrap().contains("does not exist"));
    assert!(json["category"].is_null());
}

#[tokio::test]
async fn test_like_category_returns_plain_count() {
    let (directory, app) = setup();
    let python = directory.find_category("Python").unwrap();
    let uri = format!("/like_category/?category_id={}", python.id);

    for expected in python.likes + 1..=python.likes + 3 {
        let response = get(&app, &uri).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_string(response).await, expected.to_string());
    }
    assert_eq!(directory.get_category(python.id).unwrap().likes, python.likes + 3);
}

#[tokio::test]
async fn test_like_category_defaults() {
    let (_, app) = setup();

    assert_eq!(body_string(get(&app, "/like_category/").await).await, "0");
    assert_eq!(body_string(get(&app, "/like_category/?category_id=abc").await).await, "0");

    let response = get(&app, "/like_category/?category_id=999").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_goto_redirects_and_counts() {
    let (directory, app) = setup();
    let flask = directory
        .top_pages(100)
        .into_iter()
        .find(|p| p.title == "Flask")
        .unwrap();

    let response = get(&app, &format!("/goto/?page_id={}", flask.id)).await;
    assert!(response.status().is_redirection());
    assert_eq!(response.headers()[header::LOCATION], "http://flask.pocoo.org");
    assert_eq!(directory.get_page(flask.id).unwrap().views, flask.views + 1);
}

#[tokio::test]
async fn test_goto_missing_or_unknown_redirects_home() {
    let (_, app) = setup();

    for uri in ["/goto/", "/goto/?page_id=", "/goto/?page_id=12345"] {
        let response = get(&app, uri).await;
        assert!(response.status().is_redirection(), "{}", uri);
        assert_eq!(response.headers()[header::LOCATION], "/");
    }
}

#[tokio::test]
async fn test_goto_unsendable_url_redirects_home() {
    let tmp = tempfile::TempDir::new().unwrap();
    let path = tmp.path().join("rango.json");
    let snapshot = serde_json::json!({
        "version": 1,
        "next_category_id": 2,
        "next_page_id": 2,
        "categories": [{"id": 1, "name": "Python", "views": 0, "likes": 0}],
        "pages": [{"id": 1, "category": 1, "title": "Bad", "url": "http://example.com/a\u{1}b", "views": 0}]
    });
    std::fs::write(&path, snapshot.to_string()).unwrap();

    let directory = Directory::open(&path, DirectoryConfig::default()).unwrap();
    let app = build_router(AppState::new(directory.clone(), ServerConfig::default()));

    let response = get(&app, "/goto/?page_id=1").await;
    assert!(response.status().is_redirection());
    assert_eq!(response.headers()[header::LOCATION], "/");
}

#[tokio::test]
async fn test_show_category_legacy_links() {
    let (directory, app) = setup();
    directory.add_category("Café Society").unwrap();
    directory.add_category("Web 2.0").unwrap();

    for (uri, name) in [
        ("/category/Caf%C3%A9_Society/", "Café Society"),
        ("/category/Web_2.0/", "Web 2.0"),
    ] {
        let json = body_json(get(&app, uri).await).await;
        assert_eq!(json["exists"], true, "{}", uri);
        assert_eq!(json["category_name"], name);
    }
}

#[tokio::test]
async fn test_suggest_category_prefix() {
    let (directory, app) = setup();
    directory.add_category("Pyramid").unwrap();

    let html = body_string(get(&app, "/suggest_category/?suggestion=Py").await).await;
    assert!(html.contains(">Python<"));
    assert!(html.contains(">Pyramid<"));
    assert!(!html.contains("Django"));

    // Prefix match is case-sensitive
    let html = body_string(get(&app, "/suggest_category/?suggestion=py").await).await;
    assert!(!html.contains("<li>"));
}

#[tokio::test]
async fn test_suggest_category_caps_and_escapes() {
    let (directory, app) = setup();
    for i in 0..12 {
        directory.add_category(&format!("Tool {}", i)).unwrap();
    }
    directory.add_category("T<b>").unwrap();

    let html = body_string(get(&app, "/suggest_category/?suggestion=T").await).await;
    assert_eq!(html.matches("<li>").count(), 8);

    let html = body_string(get(&app, "/suggest_category/?suggestion=T%3C").await).await;
    assert!(html.contains("T&lt;b&gt;"));
}

#[tokio::test]
async fn test_suggest_category_post_form() {
    let (_, app) = setup();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/suggest_category/")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from("suggestion=Dj"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_string(response).await.contains(">Django<"));
}

#[tokio::test]
async fn test_add_category_and_page() {
    let (_, app) = setup();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/add_category/")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"name": "snake_case tips"}"#))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let category = body_json(response).await;
    let slug = category["slug"].as_str().unwrap().to_string();
    assert_eq!(slug, "snake~5Fcase_tips");

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(format!("/category/{}/add_page/", slug))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"title": "PEP 8", "url": "peps.python.org/pep-0008/"}"#))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let page = body_json(response).await;
    assert_eq!(page["url"], "http://peps.python.org/pep-0008/");

    let json = body_json(get(&app, &format!("/category/{}/", slug)).await).await;
    assert_eq!(json["category_name"], "snake_case tips");
    assert_eq!(json["pages"][0]["title"], "PEP 8");
}

#[tokio::test]
async fn test_add_category_conflict_and_invalid() {
    let (_, app) = setup();

    let post = |body: &'static str| {
        Request::builder()
            .method("POST")
            .uri("/add_category/")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .unwrap()
    };

    let response = app.clone().oneshot(post(r#"{"name": "PYTHON"}"#)).await.unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(response).await["code"], "ALREADY_EXISTS");

    let response = app.clone().oneshot(post(r#"{"name": "   "}"#)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_add_page_rejects_control_characters() {
    let (directory, app) = setup();
    let python = directory.find_category("Python").unwrap();
    let pages_before = directory.pages_for(python.id).unwrap().len();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/category/Python/add_page/")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"title": "Bad", "url": "http://example.com/a\u0001b"}"#))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "INVALID_ARGUMENT");
    assert_eq!(directory.pages_for(python.id).unwrap().len(), pages_before);
}

#[tokio::test]
async fn test_add_page_unknown_category() {
    let (_, app) = setup();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/category/Nope/add_page/")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"title": "x", "url": "http://x"}"#))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_index_issues_session_and_counts_visit_once() {
    let (_, app) = setup();

    let response = get(&app, "/").await;
    assert_eq!(response.status(), StatusCode::OK);
    let cookie = response.headers()[header::SET_COOKIE]
        .to_str()
        .unwrap()
        .to_string();
    assert!(cookie.starts_with("sessionid="));
    let session = cookie.split(';').next().unwrap().to_string();

    let json = body_json(response).await;
    assert_eq!(json["visits"], 1);
    assert_eq!(json["categories"][0]["name"], "Python");
    assert_eq!(json["categories"].as_array().unwrap().len(), 3);

    // Same visitor, same day: not counted again, no new cookie
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/about")
                .header(header::COOKIE, &session)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert!(response.headers().get(header::SET_COOKIE).is_none());
    let json = body_json(response).await;
    assert_eq!(json["visits"], 1);
    assert!(json["last_visit"].is_string());
}

#[tokio::test]
async fn test_malformed_session_cookie_replaced() {
    let (_, app) = setup();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/about")
                .header(header::COOKIE, "sessionid=not-a-uuid")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let cookie = response.headers()[header::SET_COOKIE].to_str().unwrap();
    assert!(cookie.starts_with("sessionid="));
    assert!(!cookie.contains("not-a-uuid"));
}

#[tokio::test]
async fn test_rate_limited_likes() {
    let directory = Directory::in_memory(DirectoryConfig::default()).unwrap();
    let category = directory.add_category("Python").unwrap();
    let state = AppState::new(directory.clone(), ServerConfig::new().with_mutation_rps(2));
    let app = build_router(state);

    let uri = format!("/like_category/?category_id={}", category.id);
    assert_eq!(get(&app, &uri).await.status(), StatusCode::OK);
    assert_eq!(get(&app, &uri).await.status(), StatusCode::OK);
    assert_eq!(get(&app, &uri).await.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(directory.get_category(category.id).unwrap().likes, 2);
}

#[tokio::test]
async fn test_health_and_metrics() {
    let (_, app) = setup();

    assert_eq!(body_string(get(&app, "/health").await).await, "OK");

    get(&app, "/category/Django/").await;
    let text = body_string(get(&app, "/metrics").await).await;
    assert!(text.contains("rango_http_requests_total"));
    assert!(text.contains("rango_counter_increments_total"));

    let stats = body_json(get(&app, "/api/stats").await).await;
    assert_eq!(stats["total_categories"], 3);
    assert_eq!(stats["total_pages"], 8);
}
