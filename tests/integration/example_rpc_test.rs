//! Example procedures behind the session middleware

use axum::http::StatusCode;

use crate::common::{body_json, get, post_json, session_cookie, TestApp};

mod common;

#[tokio::test]
async fn test_crud_round_trip_with_session_cookies() {
    let app = TestApp::new();
    let session = app.signed_in_user("alice@example.com");
    let cookie = session_cookie(&session);

    let response = app
        .send(post_json(
            "/api/rpc/example.create",
            serde_json::json!({
                "title": "First",
                "description": "Created in a test",
                "metadata": {"tags": ["a", "b"]}
            }),
            Some(&cookie),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let created = body_json(response).await["data"].clone();
    let id = created["id"].as_str().unwrap().to_string();
    assert_eq!(created["metadata"]["tags"][1], "b");

    // Reads are public
    let response = app
        .send(get(&format!("/api/rpc/example.getById?id={}", id), None))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["title"], "First");

    let response = app
        .send(post_json(
            "/api/rpc/example.update",
            serde_json::json!({"id": id, "isActive": false, "displayOrder": 5}),
            Some(&cookie),
        ))
        .await;
    let updated = body_json(response).await["data"].clone();
    assert_eq!(updated["isActive"], false);
    assert_eq!(updated["displayOrder"], 5);
    assert_eq!(updated["title"], "First");

    let response = app
        .send(post_json(
            "/api/rpc/example.delete",
            serde_json::json!({"id": id}),
            Some(&cookie),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .send(get(&format!("/api/rpc/example.getById?id={}", id), None))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_writes_are_rejected_without_session() {
    let app = TestApp::new();

    for (uri, body) in [
        ("/api/rpc/example.create", serde_json::json!({"title": "Nope"})),
        ("/api/rpc/example.update", serde_json::json!({"id": "x", "title": "Nope"})),
        ("/api/rpc/example.delete", serde_json::json!({"id": "x"})),
    ] {
        let response = app.send(post_json(uri, body, None)).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{}", uri);
        assert_eq!(
            body_json(response).await,
            serde_json::json!({"error": {"code": "UNAUTHORIZED", "message": "UNAUTHORIZED"}})
        );
    }
    assert!(app.examples.is_empty());
}

#[tokio::test]
async fn test_get_all_pagination_bounds() {
    let app = TestApp::new();
    let session = app.signed_in_user("alice@example.com");
    let cookie = session_cookie(&session);

    for i in 0..3 {
        let response = app
            .send(post_json(
                "/api/rpc/example.create",
                serde_json::json!({"title": format!("Item {}", i)}),
                Some(&cookie),
            ))
            .await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = app
        .send(get("/api/rpc/example.getAll?limit=100&offset=1", None))
        .await;
    let data = body_json(response).await["data"].clone();
    assert_eq!(data.as_array().unwrap().len(), 2);

    for query in ["limit=0", "limit=500", "offset=-5"] {
        let response = app
            .send(get(&format!("/api/rpc/example.getAll?{}", query), None))
            .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{}", query);
        assert_eq!(body_json(response).await["error"]["code"], "BAD_REQUEST");
    }
}
