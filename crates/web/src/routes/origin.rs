//! Public origin resolution behind reverse proxies.

use axum::http::{HeaderMap, header::HOST};

/// Host assumed when a request carries no `Host` header.
const FALLBACK_HOST: &str = "localhost:3000";

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

/// Origin the request was served on, ignoring proxy headers.
#[must_use]
pub fn request_origin(headers: &HeaderMap) -> String {
    let host = headers
        .get(HOST)
        .and_then(|v| v.to_str().ok())
        .unwrap_or(FALLBACK_HOST);
    format!("http://{host}")
}

/// Public origin for links to uploaded files.
///
/// Prefers `x-forwarded-host` over `Host`, and `x-forwarded-proto` over
/// plain http.
#[must_use]
pub fn public_origin(headers: &HeaderMap) -> String {
    let proto = header(headers, "x-forwarded-proto").unwrap_or("http");
    let host = header(headers, "x-forwarded-host")
        .or_else(|| header(headers, HOST.as_str()))
        .unwrap_or(FALLBACK_HOST);
    format!("{proto}://{host}")
}

/// Base URL to send a visitor to after login.
///
/// A configured public site URL wins unless it is the local default. Behind
/// a proxy the forwarded host is used, assuming https. Otherwise the request
/// origin is used.
#[must_use]
pub fn post_login_base(site_url: Option<&str>, default_site_url: &str, headers: &HeaderMap) -> String {
    if let Some(site) = site_url.filter(|site| *site != default_site_url) {
        return site.to_owned();
    }

    if let Some(host) = header(headers, "x-forwarded-host") {
        let proto = header(headers, "x-forwarded-proto").unwrap_or("https");
        return format!("{proto}://{host}");
    }

    request_origin(headers)
}

/// Keep `next` only if it is a site-relative path.
///
/// `//evil.example` and `/\evil.example` are protocol-relative in browsers
/// and collapse to `/`, as does anything not starting with `/`.
#[must_use]
pub fn sanitize_next(next: Option<&str>) -> &str {
    match next {
        Some(path)
            if path.starts_with('/')
                && !path.starts_with("//")
                && !path.starts_with("/\\") =>
        {
            path
        }
        _ => "/",
    }
}
