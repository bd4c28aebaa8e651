//! Builds an [`Environment`] snapshot from a live HTTP request.

use std::net::SocketAddr;

use bytes::Bytes;
use emojicalc_http::Environment;
use http::header::{CONTENT_TYPE, HOST};
use http::request::Parts;

/// Content type whose body is decoded into form fields.
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Server variable holding the client address.
pub const REMOTE_ADDR: &str = "REMOTE_ADDR";

/// Server variable holding the `Host` header.
pub const HTTP_HOST: &str = "HTTP_HOST";

/// Snapshots request head and body for the router.
///
/// The query string always fills the query parameters. The body fills the
/// form fields only when it is sent as `application/x-www-form-urlencoded`;
/// it is kept as raw input either way. Undecodable query strings or form
/// bodies are logged and treated as empty.
pub fn build_environment(parts: &Parts, remote_addr: Option<SocketAddr>, body: Bytes) -> Environment {
    let uri = parts
        .uri
        .path_and_query()
        .map_or_else(|| parts.uri.path().to_string(), |pq| pq.as_str().to_string());

    let mut env = Environment::new()
        .with_method(parts.method.as_str())
        .with_uri(uri);

    let content_type = header_str(parts, CONTENT_TYPE);
    if let Some(content_type) = content_type {
        env = env.with_content_type(content_type);
    }
    if let Some(host) = header_str(parts, HOST) {
        env = env.with_server_var(HTTP_HOST, host);
    }
    if let Some(addr) = remote_addr {
        env = env.with_server_var(REMOTE_ADDR, addr.to_string());
    }

    if let Some(query) = parts.uri.query() {
        env = env.with_query(decode_pairs(query.as_bytes(), "query"));
    }
    if content_type.is_some_and(is_form) {
        env = env.with_form(decode_pairs(&body, "form"));
    }

    env.with_input(body)
}

fn header_str(parts: &Parts, name: http::header::HeaderName) -> Option<&str> {
    parts.headers.get(name).and_then(|value| value.to_str().ok())
}

fn is_form(content_type: &str) -> bool {
    content_type
        .split(';')
        .next()
        .is_some_and(|essence| essence.trim().eq_ignore_ascii_case(FORM_CONTENT_TYPE))
}

fn decode_pairs(raw: &[u8], source: &'static str) -> Vec<(String, String)> {
    serde_urlencoded::from_bytes(raw).unwrap_or_else(|e| {
        tracing::warn!(source, error = %e, "Ignoring undecodable url-encoded data");
        Vec::new()
    })
}
