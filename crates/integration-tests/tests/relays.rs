//! End-to-end tests for the JSON relays.

use base64::Engine as _;
use httpmock::prelude::*;
use reqwest::StatusCode;
use righthair_integration_tests::{ACCESS_TOKEN, ARK_KEY, CREEM_KEY, TestOptions, TestServer};
use serde_json::{Value, json};

async fn post_json(server: &TestServer, path: &str, body: &Value) -> (StatusCode, Value) {
    let resp = server
        .client
        .post(server.url(path))
        .json(body)
        .send()
        .await
        .expect("request failed");
    let status = resp.status();
    let body = resp.json().await.expect("response is JSON");
    (status, body)
}

// ============================================================================
// Upload
// ============================================================================

#[tokio::test]
async fn test_upload_passes_remote_url_through() {
    let server = TestServer::start().await;
    let url = "https://cdn.example/face.jpg?size=large";

    let (status, body) = post_json(&server, "/api/upload", &json!({ "image": url })).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "url": url }));
}

#[tokio::test]
async fn test_upload_stores_data_url_and_serves_same_bytes() {
    let server = TestServer::start().await;
    let bytes: Vec<u8> = (0..=255).collect();
    let data_url = format!(
        "data:image/jpeg;base64,{}",
        base64::engine::general_purpose::STANDARD.encode(&bytes)
    );

    let (status, body) = post_json(&server, "/api/upload", &json!({ "image": data_url })).await;
    assert_eq!(status, StatusCode::OK);

    let url = body["url"].as_str().expect("url is a string");
    assert!(url.starts_with(&format!("{}/uploads/", server.origin())), "{url}");
    assert!(url.ends_with(".jpg"), "{url}");

    let fetched = server
        .client
        .get(url)
        .send()
        .await
        .expect("fetch upload")
        .bytes()
        .await
        .expect("read upload");
    assert_eq!(fetched.as_ref(), bytes.as_slice());
}

#[tokio::test]
async fn test_upload_unknown_mime_defaults_to_png() {
    let server = TestServer::start().await;

    let (status, body) = post_json(
        &server,
        "/api/upload",
        &json!({ "image": "data:image/heic;base64,AAECAw==" }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["url"].as_str().is_some_and(|u| u.ends_with(".png")));
}

#[tokio::test]
async fn test_upload_uses_forwarded_origin() {
    let server = TestServer::start().await;

    let resp = server
        .client
        .post(server.url("/api/upload"))
        .header("x-forwarded-proto", "https")
        .header("x-forwarded-host", "righthair.example")
        .json(&json!({ "image": "data:image/webp;base64,UklGRg==" }))
        .send()
        .await
        .expect("request failed");
    let body: Value = resp.json().await.expect("JSON body");

    let url = body["url"].as_str().expect("url is a string");
    assert!(url.starts_with("https://righthair.example/uploads/"), "{url}");
    assert!(url.ends_with(".webp"), "{url}");
}

#[tokio::test]
async fn test_upload_rejects_missing_and_unsupported_images() {
    let server = TestServer::start().await;

    let (status, body) = post_json(&server, "/api/upload", &json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "Missing image data" }));

    let (status, body) = post_json(&server, "/api/upload", &json!({ "image": 42 })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "Missing image data" }));

    let (status, body) =
        post_json(&server, "/api/upload", &json!({ "image": "ftp://host/a.png" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "Unsupported image format" }));

    let (status, _) =
        post_json(&server, "/api/upload", &json!({ "image": "data:image/png;base64" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) =
        post_json(&server, "/api/upload", &json!({ "image": "data:image/png;base64,@@@" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_upload_rejects_invalid_json() {
    let server = TestServer::start().await;

    let resp = server
        .client
        .post(server.url("/api/upload"))
        .body("{not json")
        .send()
        .await
        .expect("request failed");

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.expect("JSON body");
    assert!(body["error"].is_string());
}

// ============================================================================
// Age filter
// ============================================================================

#[tokio::test]
async fn test_age_filter_requires_image_and_age() {
    let server = TestServer::start().await;

    for body in [
        json!({ "age": "60" }),
        json!({ "image": "https://cdn.example/a.jpg" }),
        json!({ "image": "", "age": "60" }),
        json!({ "image": "https://cdn.example/a.jpg", "age": "" }),
    ] {
        let (status, body) = post_json(&server, "/api/age-filter", &body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "error": "Missing image or age" }));
    }
}

#[tokio::test]
async fn test_age_filter_without_key_names_the_variable() {
    let server = TestServer::start_with(TestOptions {
        ark_key: false,
        ..TestOptions::default()
    })
    .await;
    let upstream = server
        .ark
        .mock_async(|when, then| {
            when.any_request();
            then.status(200);
        })
        .await;

    let (status, body) = post_json(
        &server,
        "/api/age-filter",
        &json!({ "image": "https://cdn.example/a.jpg", "age": "60" }),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "error": "Missing ARK_API_KEY env" }));
    assert_eq!(upstream.calls_async().await, 0);
}

#[tokio::test]
async fn test_age_filter_returns_generated_url() {
    let server = TestServer::start().await;
    let upstream = server
        .ark
        .mock_async(|when, then| {
            when.method(POST)
                .path("/images/generations")
                .header("authorization", format!("Bearer {ARK_KEY}"))
                .json_body(json!({
                    "model": "doubao-seedream-4-5-251128",
                    "prompt": "Change the person to 80 years old, keeping the same outfit but in an age-appropriate style",
                    "size": "2K",
                    "response_format": "url",
                    "watermark": false,
                    "image": "data:image/png;base64,iVBORw0KGgo="
                }));
            then.status(200)
                .json_body(json!({ "data": [{ "url": "https://cdn.example/out.png" }] }));
        })
        .await;

    let (status, body) = post_json(
        &server,
        "/api/age-filter",
        &json!({ "image": "data:image/png;base64,iVBORw0KGgo=", "age": 80 }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "url": "https://cdn.example/out.png" }));
    assert_eq!(upstream.calls_async().await, 1);
}

#[tokio::test]
async fn test_age_filter_passes_upstream_status_through() {
    let server = TestServer::start().await;
    server
        .ark
        .mock_async(|when, then| {
            when.method(POST).path("/images/generations");
            then.status(429).body("rate limited");
        })
        .await;

    let (status, body) = post_json(
        &server,
        "/api/age-filter",
        &json!({ "image": "https://cdn.example/a.jpg", "age": "60" }),
    )
    .await;

    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["error"], "Image generation API error");
    assert_eq!(body["detail"], "rate limited");
    assert_eq!(body["status"], 429);
    assert_eq!(body["statusText"], "Too Many Requests");
}

#[tokio::test]
async fn test_age_filter_without_result_url_is_bad_gateway() {
    let server = TestServer::start().await;
    server
        .ark
        .mock_async(|when, then| {
            when.method(POST).path("/images/generations");
            then.status(200).json_body(json!({ "data": [] }));
        })
        .await;

    let (status, body) = post_json(
        &server,
        "/api/age-filter",
        &json!({ "image": "https://cdn.example/a.jpg", "age": "20" }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(
        body,
        json!({ "error": "No URL in response", "data": { "data": [] } })
    );
}

// ============================================================================
// Checkout
// ============================================================================

#[tokio::test]
async fn test_checkout_requires_product_id() {
    let server = TestServer::start().await;

    let (status, body) = post_json(&server, "/api/checkout", &json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "Missing productId" }));

    let resp = server
        .client
        .post(server.url("/api/checkout"))
        .body("garbage")
        .send()
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_checkout_without_key_names_the_variable() {
    let server = TestServer::start_with(TestOptions {
        creem_key: false,
        ..TestOptions::default()
    })
    .await;

    let (status, body) =
        post_json(&server, "/api/checkout", &json!({ "productId": "prod_1" })).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "error": "Missing CREEM_API_KEY env" }));
}

#[tokio::test]
async fn test_checkout_omits_absent_fields_and_returns_url() {
    let server = TestServer::start().await;
    let upstream = server
        .creem
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v1/checkouts")
                .header("x-api-key", CREEM_KEY)
                .json_body(json!({ "product_id": "prod_1", "units": 1 }));
            then.status(200)
                .json_body(json!({ "url": "https://checkout.example/abc" }));
        })
        .await;

    let (status, body) =
        post_json(&server, "/api/checkout", &json!({ "productId": "prod_1" })).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "url": "https://checkout.example/abc" }));
    assert_eq!(upstream.calls_async().await, 1);
}

#[tokio::test]
async fn test_checkout_forwards_optional_fields() {
    let server = TestServer::start().await;
    let upstream = server
        .creem
        .mock_async(|when, then| {
            when.method(POST).path("/v1/checkouts").json_body(json!({
                "product_id": "prod_1",
                "success_url": "https://righthair.example/pricing/success",
                "units": 3,
                "discount_code": "LAUNCH",
                "request_id": "req-9"
            }));
            then.status(200)
                .json_body(json!({ "data": { "url": "https://checkout.example/nested" } }));
        })
        .await;

    let (status, body) = post_json(
        &server,
        "/api/checkout",
        &json!({
            "productId": "prod_1",
            "successUrl": "https://righthair.example/pricing/success",
            "units": 3,
            "discountCode": "LAUNCH",
            "requestId": "req-9"
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "url": "https://checkout.example/nested" }));
    assert_eq!(upstream.calls_async().await, 1);
}

#[tokio::test]
async fn test_checkout_without_redirect_url_is_bad_gateway() {
    let server = TestServer::start().await;
    server
        .creem
        .mock_async(|when, then| {
            when.method(POST).path("/v1/checkouts");
            then.status(200).json_body(json!({}));
        })
        .await;

    let (status, body) =
        post_json(&server, "/api/checkout", &json!({ "productId": "prod_1" })).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(
        body,
        json!({ "error": "Checkout response is missing a redirect URL", "detail": {} })
    );
}

#[tokio::test]
async fn test_checkout_non_json_success_is_bad_gateway() {
    let server = TestServer::start().await;
    server
        .creem
        .mock_async(|when, then| {
            when.method(POST).path("/v1/checkouts");
            then.status(200).body("<html>ok</html>");
        })
        .await;

    let (status, body) =
        post_json(&server, "/api/checkout", &json!({ "productId": "prod_1" })).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(
        body,
        json!({ "error": "Checkout response is missing a redirect URL", "detail": {} })
    );
}

#[tokio::test]
async fn test_checkout_tolerates_unexpected_field_types() {
    let server = TestServer::start().await;
    let upstream = server
        .creem
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v1/checkouts")
                .json_body(json!({ "product_id": "prod_1", "units": "2" }));
            then.status(200)
                .json_body(json!({ "url": "https://checkout.example/abc" }));
        })
        .await;

    let (status, body) = post_json(
        &server,
        "/api/checkout",
        &json!({ "productId": "prod_1", "units": "2", "successUrl": 42 }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "url": "https://checkout.example/abc" }));
    assert_eq!(upstream.calls_async().await, 1);
}

#[tokio::test]
async fn test_checkout_attaches_signed_in_identity() {
    let server = TestServer::start().await;
    server
        .supabase
        .mock_async(|when, then| {
            when.method(GET)
                .path("/auth/v1/user")
                .header("authorization", format!("Bearer {ACCESS_TOKEN}"));
            then.status(200)
                .json_body(json!({ "id": "usr_1", "email": "ada@example.com" }));
        })
        .await;
    let upstream = server
        .creem
        .mock_async(|when, then| {
            when.method(POST).path("/v1/checkouts").json_body(json!({
                "product_id": "prod_1",
                "units": 1,
                "metadata": { "userId": "usr_1", "email": "ada@example.com" }
            }));
            then.status(200)
                .json_body(json!({ "url": "https://checkout.example/abc" }));
        })
        .await;
    server.sign_in("/pricing").await;

    let (status, _) =
        post_json(&server, "/api/checkout", &json!({ "productId": "prod_1" })).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(upstream.calls_async().await, 1);
}

#[tokio::test]
async fn test_checkout_proceeds_anonymously_when_identity_lookup_fails() {
    let server = TestServer::start().await;
    server
        .supabase
        .mock_async(|when, then| {
            when.method(GET).path("/auth/v1/user");
            then.status(500).body("boom");
        })
        .await;
    let upstream = server
        .creem
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v1/checkouts")
                .json_body(json!({ "product_id": "prod_1", "units": 1 }));
            then.status(200)
                .json_body(json!({ "url": "https://checkout.example/abc" }));
        })
        .await;
    server.sign_in("/pricing").await;

    let (status, body) =
        post_json(&server, "/api/checkout", &json!({ "productId": "prod_1" })).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "url": "https://checkout.example/abc" }));
    assert_eq!(upstream.calls_async().await, 1);
}

#[tokio::test]
async fn test_checkout_skips_identity_lookup_for_expired_token() {
    let server = TestServer::start().await;
    let lookup = server
        .supabase
        .mock_async(|when, then| {
            when.method(GET).path("/auth/v1/user");
            then.status(200)
                .json_body(json!({ "id": "usr_1", "email": "ada@example.com" }));
        })
        .await;
    let upstream = server
        .creem
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v1/checkouts")
                .json_body(json!({ "product_id": "prod_1", "units": 1 }));
            then.status(200)
                .json_body(json!({ "url": "https://checkout.example/abc" }));
        })
        .await;
    server.sign_in_with_expiry("/pricing", 30).await;

    let (status, _) =
        post_json(&server, "/api/checkout", &json!({ "productId": "prod_1" })).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(upstream.calls_async().await, 1);
    assert_eq!(lookup.calls_async().await, 0);
}

#[tokio::test]
async fn test_checkout_passes_upstream_error_through() {
    let server = TestServer::start().await;
    server
        .creem
        .mock_async(|when, then| {
            when.method(POST).path("/v1/checkouts");
            then.status(404)
                .json_body(json!({ "message": "Product not found" }));
        })
        .await;

    let (status, body) =
        post_json(&server, "/api/checkout", &json!({ "productId": "prod_missing" })).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(
        body,
        json!({ "error": "Product not found", "detail": { "message": "Product not found" } })
    );
}

// ============================================================================
// Current user
// ============================================================================

#[tokio::test]
async fn test_current_user_is_null_without_session() {
    let server = TestServer::start().await;

    let resp = server
        .client
        .get(server.url("/api/user"))
        .send()
        .await
        .expect("request failed");

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.expect("JSON body");
    assert_eq!(body, json!({ "user": null }));
}
