//! Per-call environment snapshot.

use bytes::Bytes;
use indexmap::IndexMap;

/// Server variable holding the request method.
pub(crate) const REQUEST_METHOD: &str = "REQUEST_METHOD";

/// Server variable holding the request URI (path plus query string).
pub(crate) const REQUEST_URI: &str = "REQUEST_URI";

/// Server variable holding the `Content-Type` header.
pub(crate) const CONTENT_TYPE: &str = "CONTENT_TYPE";

/// Everything the core needs to know about one inbound call.
///
/// The environment is built once by the host (the HTTP server or a test) and
/// handed to [`Request::new`](crate::Request::new). Nothing in this crate
/// reads process-wide state.
///
/// # Example
///
/// ```
/// use emojicalc_http::Environment;
///
/// let env = Environment::new()
///     .with_method("post")
///     .with_uri("/?debug=1")
///     .with_form_field("first", "1")
///     .with_query_param("debug", "1");
///
/// assert_eq!(env.server_var("REQUEST_METHOD"), Some("post"));
/// assert_eq!(env.post().get("first").map(String::as_str), Some("1"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Environment {
    server: IndexMap<String, String>,
    query: IndexMap<String, String>,
    post: IndexMap<String, String>,
    input: Bytes,
}

impl Environment {
    /// Creates an empty environment.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets an arbitrary server variable.
    #[must_use]
    pub fn with_server_var(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.server.insert(key.into(), value.into());
        self
    }

    /// Sets the raw request method.
    #[must_use]
    pub fn with_method(self, method: impl Into<String>) -> Self {
        self.with_server_var(REQUEST_METHOD, method)
    }

    /// Sets the raw request URI.
    #[must_use]
    pub fn with_uri(self, uri: impl Into<String>) -> Self {
        self.with_server_var(REQUEST_URI, uri)
    }

    /// Sets the raw `Content-Type` header value.
    #[must_use]
    pub fn with_content_type(self, content_type: impl Into<String>) -> Self {
        self.with_server_var(CONTENT_TYPE, content_type)
    }

    /// Adds one query string parameter.
    #[must_use]
    pub fn with_query_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }

    /// Replaces all query string parameters.
    #[must_use]
    pub fn with_query(mut self, query: impl IntoIterator<Item = (String, String)>) -> Self {
        self.query = query.into_iter().collect();
        self
    }

    /// Adds one posted form field.
    #[must_use]
    pub fn with_form_field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.post.insert(key.into(), value.into());
        self
    }

    /// Replaces all posted form fields.
    #[must_use]
    pub fn with_form(mut self, fields: impl IntoIterator<Item = (String, String)>) -> Self {
        self.post = fields.into_iter().collect();
        self
    }

    /// Sets the raw request body.
    #[must_use]
    pub fn with_input(mut self, input: impl Into<Bytes>) -> Self {
        self.input = input.into();
        self
    }

    /// Returns a server variable, if set.
    #[must_use]
    pub fn server_var(&self, key: &str) -> Option<&str> {
        self.server.get(key).map(String::as_str)
    }

    /// Returns all server variables.
    #[must_use]
    pub fn server(&self) -> &IndexMap<String, String> {
        &self.server
    }

    /// Returns the query string parameters.
    #[must_use]
    pub fn query(&self) -> &IndexMap<String, String> {
        &self.query
    }

    /// Returns the posted form fields.
    #[must_use]
    pub fn post(&self) -> &IndexMap<String, String> {
        &self.post
    }

    /// Returns the raw request body.
    #[must_use]
    pub fn input(&self) -> &Bytes {
        &self.input
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_environment() {
        let env = Environment::new();
        assert!(env.server().is_empty());
        assert!(env.query().is_empty());
        assert!(env.post().is_empty());
        assert!(env.input().is_empty());
    }

    #[test]
    fn test_server_vars() {
        let env = Environment::new()
            .with_method("GET")
            .with_uri("/author")
            .with_content_type("text/plain");

        assert_eq!(env.server_var(REQUEST_METHOD), Some("GET"));
        assert_eq!(env.server_var(REQUEST_URI), Some("/author"));
        assert_eq!(env.server_var(CONTENT_TYPE), Some("text/plain"));
        assert_eq!(env.server_var("HTTP_HOST"), None);
    }

    #[test]
    fn test_form_and_query_keep_order() {
        let env = Environment::new()
            .with_form_field("second", "2")
            .with_form_field("first", "1")
            .with_query([("b".to_string(), "2".to_string()), ("a".to_string(), "1".to_string())]);

        let form: Vec<_> = env.post().keys().map(String::as_str).collect();
        assert_eq!(form, ["second", "first"]);
        let query: Vec<_> = env.query().keys().map(String::as_str).collect();
        assert_eq!(query, ["b", "a"]);
    }

    #[test]
    fn test_with_input() {
        let env = Environment::new().with_input(r#"{"first":1}"#);
        assert_eq!(env.input().as_ref(), br#"{"first":1}"#);
    }
}
