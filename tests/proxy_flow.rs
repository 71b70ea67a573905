//! Proxy routes against a mocked backend API.

mod common;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use httpmock::prelude::*;
use serde_json::json;

use common::{body_bytes, body_json, gateway, send};

const PNG_BYTES: &[u8] = &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a, 0x00, 0x01, 0x02];

#[tokio::test]
async fn image_is_relayed_with_immutable_cache() {
    let backend = MockServer::start_async().await;
    let supabase = MockServer::start_async().await;

    let image = backend
        .mock_async(|when, then| {
            when.method(GET).path("/images/members/m1.png");
            then.status(200)
                .header("content-type", "image/png")
                .body(PNG_BYTES);
        })
        .await;

    let response = send(
        gateway(&backend, &supabase),
        Request::get("/api/images/members/m1.png")
            .body(Body::empty())
            .unwrap(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "image/png");
    let cache = response.headers()[header::CACHE_CONTROL].to_str().unwrap();
    assert!(cache.contains("immutable"));
    assert_eq!(body_bytes(response).await, PNG_BYTES);
    image.assert_async().await;
}

#[tokio::test]
async fn image_backend_error_becomes_404() {
    let backend = MockServer::start_async().await;
    let supabase = MockServer::start_async().await;

    backend
        .mock_async(|when, then| {
            when.method(GET).path("/images/missing.jpg");
            then.status(404).body("nope");
        })
        .await;
    backend
        .mock_async(|when, then| {
            when.method(GET).path("/images/broken.jpg");
            then.status(503).body("down");
        })
        .await;

    for path in ["/api/images/missing.jpg", "/api/images/broken.jpg"] {
        let response = send(
            gateway(&backend, &supabase),
            Request::get(path).body(Body::empty()).unwrap(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_bytes(response).await, b"Image not found");
    }
}

#[tokio::test]
async fn proxy_forwards_allow_listed_headers_query_and_body() {
    let backend = MockServer::start_async().await;
    let supabase = MockServer::start_async().await;

    let create = backend
        .mock_async(|when, then| {
            when.method(POST)
                .path("/members")
                .query_param("page", "2")
                .query_param("search", "ann")
                .header("authorization", "Bearer user-jwt")
                .header("user-agent", "portal-web/1.0")
                .header("content-type", "application/json")
                .header_missing("cookie")
                .json_body(json!({ "first_name": "Anna" }));
            then.status(201)
                .header("content-type", "application/json")
                .json_body(json!({ "success": true, "id": "m9" }));
        })
        .await;

    let response = send(
        gateway(&backend, &supabase),
        Request::post("/api/proxy/members?page=2&search=ann")
            .header(header::AUTHORIZATION, "Bearer user-jwt")
            .header(header::USER_AGENT, "portal-web/1.0")
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::COOKIE, "sb-access-token=secret")
            .body(Body::from(json!({ "first_name": "Anna" }).to_string()))
            .unwrap(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(
        body_json(response).await,
        json!({ "success": true, "id": "m9" })
    );
    create.assert_async().await;
}

#[tokio::test]
async fn proxy_relays_backend_error_status() {
    let backend = MockServer::start_async().await;
    let supabase = MockServer::start_async().await;

    backend
        .mock_async(|when, then| {
            when.method(DELETE).path("/members/m404");
            then.status(404)
                .json_body(json!({ "success": false, "error": { "message": "Member not found" } }));
        })
        .await;

    let response = send(
        gateway(&backend, &supabase),
        Request::delete("/api/proxy/members/m404")
            .header(header::AUTHORIZATION, "Bearer user-jwt")
            .body(Body::empty())
            .unwrap(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "application/json");
    assert_eq!(
        body_json(response).await["error"]["message"],
        "Member not found"
    );
}

#[tokio::test]
async fn proxy_passes_multipart_upload_through() {
    let backend = MockServer::start_async().await;
    let supabase = MockServer::start_async().await;

    let boundary_type = "multipart/form-data; boundary=----portal42";
    let payload = "------portal42\r\n\
Content-Disposition: form-data; name=\"file\"; filename=\"a.png\"\r\n\
Content-Type: image/png\r\n\r\n\
PNGDATA\r\n\
------portal42--\r\n";

    let upload = backend
        .mock_async(|when, then| {
            when.method(POST)
                .path("/members/m1/photo")
                .header("content-type", boundary_type)
                .body(payload);
            then.status(200).json_body(json!({ "success": true }));
        })
        .await;

    let response = send(
        gateway(&backend, &supabase),
        Request::post("/api/proxy/members/m1/photo")
            .header(header::AUTHORIZATION, "Bearer user-jwt")
            .header(header::CONTENT_TYPE, boundary_type)
            .body(Body::from(payload))
            .unwrap(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    upload.assert_async().await;
}

#[tokio::test]
async fn proxy_without_authorization_never_reaches_backend() {
    let backend = MockServer::start_async().await;
    let supabase = MockServer::start_async().await;

    let list = backend
        .mock_async(|when, then| {
            when.path("/members");
            then.status(200).json_body(json!([]));
        })
        .await;

    let response = send(
        gateway(&backend, &supabase),
        Request::get("/api/proxy/members").body(Body::empty()).unwrap(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(list.hits_async().await, 0);
}

#[tokio::test]
async fn proxy_keeps_percent_encoded_path_segments() {
    let backend = MockServer::start_async().await;
    let supabase = MockServer::start_async().await;

    let encoded_slash = backend
        .mock_async(|when, then| {
            when.method(GET).path("/files/a%2Fb");
            then.status(200).json_body(json!({ "file": "a/b" }));
        })
        .await;
    let encoded_query = backend
        .mock_async(|when, then| {
            when.method(GET)
                .path("/search%3Fq%3Dx")
                .query_param("page", "1");
            then.status(200).json_body(json!([]));
        })
        .await;

    for uri in ["/api/proxy/files/a%2Fb", "/api/proxy/search%3Fq%3Dx?page=1"] {
        let response = send(
            gateway(&backend, &supabase),
            Request::get(uri)
                .header(header::AUTHORIZATION, "Bearer user-jwt")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK, "{}", uri);
    }

    encoded_slash.assert_hits_async(1).await;
    encoded_query.assert_hits_async(1).await;
}

#[tokio::test]
async fn image_path_encoding_is_preserved() {
    let backend = MockServer::start_async().await;
    let supabase = MockServer::start_async().await;

    let image = backend
        .mock_async(|when, then| {
            when.method(GET).path("/images/albums/easter%202024.png");
            then.status(200)
                .header("content-type", "image/png")
                .body(PNG_BYTES);
        })
        .await;

    let response = send(
        gateway(&backend, &supabase),
        Request::get("/api/images/albums/easter%202024.png")
            .body(Body::empty())
            .unwrap(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    image.assert_async().await;
}

#[tokio::test]
async fn proxy_empty_response_has_no_content_type() {
    let backend = MockServer::start_async().await;
    let supabase = MockServer::start_async().await;

    backend
        .mock_async(|when, then| {
            when.method(DELETE).path("/members/m1/photo");
            then.status(204);
        })
        .await;

    let response = send(
        gateway(&backend, &supabase),
        Request::delete("/api/proxy/members/m1/photo")
            .header(header::AUTHORIZATION, "Bearer user-jwt")
            .body(Body::empty())
            .unwrap(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert!(response.headers().get(header::CONTENT_TYPE).is_none());
    assert!(body_bytes(response).await.is_empty());
}
