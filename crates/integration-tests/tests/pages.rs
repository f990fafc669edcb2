//! End-to-end tests for pages, static files and cross-cutting middleware.

use reqwest::StatusCode;
use righthair_integration_tests::{PRO_PRODUCT, TestServer};

async fn get_page(server: &TestServer, path: &str) -> (StatusCode, String) {
    let resp = server
        .client
        .get(server.url(path))
        .send()
        .await
        .expect("request failed");
    let status = resp.status();
    (status, resp.text().await.expect("body is text"))
}

#[tokio::test]
async fn test_health() {
    let server = TestServer::start().await;

    let (status, body) = get_page(&server, "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "ok");
}

#[tokio::test]
async fn test_home_page_renders_generator() {
    let server = TestServer::start().await;

    let (status, html) = get_page(&server, "/").await;

    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("See Yourself at"));
    assert!(html.contains("Select Target Age"));
    for age in ["8", "20", "60", "80"] {
        assert!(html.contains(&format!("data-age=\"{age}\"")), "age option {age}");
    }
    assert!(html.contains("Frequently Asked Questions"));
    assert!(html.contains("AI Anime Filter"));
    assert!(html.contains("href=\"/login\""), "anonymous header shows Sign In");
    assert!(html.contains("/static/js/generator.js"));
}

#[tokio::test]
async fn test_pricing_page_disables_unconfigured_plans() {
    let server = TestServer::start().await;

    let (status, html) = get_page(&server, "/pricing").await;

    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("Clear pricing for AI age transformations"));
    assert!(html.contains(&format!("data-product-id=\"{PRO_PRODUCT}\"")));
    assert!(html.contains("Set product ID first"));
    assert!(html.contains("CREEM_PRODUCT_BASIC"));
    assert!(html.contains("CREEM_PRODUCT_TEAM"));
    assert!(html.contains("data-price-yearly=\"$39.9\""));
}

#[tokio::test]
async fn test_pricing_success_shows_order_details() {
    let server = TestServer::start().await;

    let (status, html) = get_page(
        &server,
        &format!("/pricing/success?checkout_id=ch_1&order_id=ord_9&product_id={PRO_PRODUCT}"),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("Payment successful"));
    assert!(html.contains(">Pro<"));
    assert!(html.contains("ord_9"));
    assert!(html.contains("ch_1"));
    assert!(!html.contains("couldn't read the checkout details"));
}

#[tokio::test]
async fn test_pricing_success_without_params_shows_notice() {
    let server = TestServer::start().await;

    let (_, html) = get_page(&server, "/pricing/success").await;

    assert!(html.contains("Your plan"));
    assert!(html.contains("couldn't read the checkout details"));
}

#[tokio::test]
async fn test_pricing_success_unknown_product() {
    let server = TestServer::start().await;

    let (_, html) = get_page(&server, "/pricing/success?product_id=prod_other").await;

    assert!(html.contains("Product prod_other"));
}

#[tokio::test]
async fn test_login_page() {
    let server = TestServer::start().await;

    let (status, html) = get_page(&server, "/login").await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("href=\"/api/auth/login\""));
    assert!(!html.contains("Sign-in failed"));

    let (_, html) = get_page(&server, "/login?error=true").await;
    assert!(html.contains("Sign-in failed"));
}

#[tokio::test]
async fn test_static_files_are_served() {
    let server = TestServer::start().await;
    let css_dir = server.static_dir.path().join("css");
    std::fs::create_dir_all(&css_dir).expect("create css dir");
    std::fs::write(css_dir.join("main.css"), "body{}").expect("write css");

    let (status, body) = get_page(&server, "/static/css/main.css").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "body{}");
}

#[tokio::test]
async fn test_responses_carry_security_headers_and_request_id() {
    let server = TestServer::start().await;

    let resp = server
        .client
        .get(server.url("/health"))
        .header("x-request-id", "req-from-proxy")
        .send()
        .await
        .expect("request failed");
    let headers = resp.headers();

    assert_eq!(headers["x-request-id"], "req-from-proxy");
    assert_eq!(headers["x-frame-options"], "DENY");
    assert_eq!(headers["x-content-type-options"], "nosniff");
    assert!(
        headers["content-security-policy"]
            .to_str()
            .is_ok_and(|csp| csp.contains("img-src 'self' data: blob: https:"))
    );

    let resp = server
        .client
        .get(server.url("/health"))
        .send()
        .await
        .expect("request failed");
    assert!(
        resp.headers()
            .get("x-request-id")
            .is_some_and(|id| !id.is_empty()),
        "a request ID is minted when none is sent"
    );
}
