//! Normalised inbound request.
//!
//! A [`Request`] wraps an [`Environment`] and resolves the derived fields
//! (method, URI, content type, JSON flag, parsed body and query parameters)
//! on first access. Resolution runs at most once per request value.

use std::cell::OnceCell;

use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::environment::{CONTENT_TYPE, REQUEST_METHOD, REQUEST_URI};
use crate::Environment;

/// Method reported when the environment carries none.
pub const DEFAULT_METHOD: &str = "[UNKNOWN]";

/// Content type assumed when the environment carries none.
pub const DEFAULT_CONTENT_TYPE: &str = "text/html";

const JSON_MEDIA_TYPE: &str = "application/json";

/// Capture groups of the route pattern that matched a request.
///
/// Position 0 is the whole match; the following positions are the pattern's
/// groups in order. Groups that did not take part in the match are empty
/// strings. Named groups are also available by name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathParams {
    positional: Vec<String>,
    named: IndexMap<String, String>,
}

impl PathParams {
    /// Creates path parameters from positional and named captures.
    #[must_use]
    pub fn new(positional: Vec<String>, named: IndexMap<String, String>) -> Self {
        Self { positional, named }
    }

    /// Returns the capture at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&str> {
        self.positional.get(index).map(String::as_str)
    }

    /// Returns a named capture.
    #[must_use]
    pub fn named(&self, name: &str) -> Option<&str> {
        self.named.get(name).map(String::as_str)
    }

    /// Returns all positional captures.
    #[must_use]
    pub fn positional(&self) -> &[String] {
        &self.positional
    }

    /// Returns the number of positional captures.
    #[must_use]
    pub fn len(&self) -> usize {
        self.positional.len()
    }

    /// Returns `true` if there are no captures.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positional.is_empty()
    }
}

#[derive(Debug, Clone)]
struct Resolved {
    method: String,
    uri: String,
    content_type: String,
    is_json: bool,
    parsed_body: Map<String, Value>,
    query_params: IndexMap<String, String>,
}

impl Resolved {
    fn from_environment(env: &Environment) -> Self {
        let method = env
            .server_var(REQUEST_METHOD)
            .map_or_else(|| DEFAULT_METHOD.to_string(), str::to_uppercase);

        let content_type = env
            .server_var(CONTENT_TYPE)
            .unwrap_or(DEFAULT_CONTENT_TYPE)
            .to_string();

        let mut parsed_body: Map<String, Value> = env
            .post()
            .iter()
            .map(|(key, value)| (key.clone(), Value::String(value.clone())))
            .collect();

        let mut is_json = false;
        if starts_with_ignore_case(&content_type, JSON_MEDIA_TYPE) {
            match serde_json::from_slice::<Value>(env.input()) {
                Ok(Value::Object(decoded)) => {
                    parsed_body = decoded;
                    is_json = true;
                }
                Ok(_) => {
                    tracing::debug!("JSON body is not an object, keeping form data");
                }
                Err(e) => {
                    tracing::debug!(error = %e, "Failed to decode JSON body, keeping form data");
                }
            }
        }

        let uri = env.server_var(REQUEST_URI).map(uri_path).unwrap_or_default();

        Self {
            method,
            uri,
            content_type,
            is_json,
            parsed_body,
            query_params: env.query().clone(),
        }
    }
}

/// A normalised inbound request.
///
/// # Example
///
/// ```
/// use emojicalc_http::{Environment, Request};
///
/// let env = Environment::new()
///     .with_method("post")
///     .with_uri("/calc?x=1")
///     .with_content_type("application/json")
///     .with_input(r#"{"first": 1.5}"#);
///
/// let request = Request::new(env);
/// assert_eq!(request.method(), "POST");
/// assert_eq!(request.uri(), "/calc");
/// assert!(request.is_json());
/// assert_eq!(request.parsed_body()["first"], 1.5);
/// ```
#[derive(Debug, Clone)]
pub struct Request {
    environment: Environment,
    resolved: OnceCell<Resolved>,
    path_params: PathParams,
}

impl Request {
    /// Creates a request over an environment snapshot.
    ///
    /// Nothing is resolved until a derived field is first read.
    #[must_use]
    pub fn new(environment: Environment) -> Self {
        Self {
            environment,
            resolved: OnceCell::new(),
            path_params: PathParams::default(),
        }
    }

    fn resolved(&self) -> &Resolved {
        self.resolved
            .get_or_init(|| Resolved::from_environment(&self.environment))
    }

    // Resolves if needed and hands back an owned copy of the resolved state
    // for a `with_*` update.
    fn update(mut self, apply: impl FnOnce(&mut Resolved)) -> Self {
        let mut resolved = self
            .resolved
            .take()
            .unwrap_or_else(|| Resolved::from_environment(&self.environment));
        apply(&mut resolved);
        self.resolved = OnceCell::from(resolved);
        self
    }

    /// Returns the environment this request was built from.
    #[must_use]
    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    /// Returns `true` once the derived fields have been resolved.
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        self.resolved.get().is_some()
    }

    /// Returns the upper-cased method, or [`DEFAULT_METHOD`].
    #[must_use]
    pub fn method(&self) -> &str {
        &self.resolved().method
    }

    /// Returns the path component of the request URI, or `""`.
    #[must_use]
    pub fn uri(&self) -> &str {
        &self.resolved().uri
    }

    /// Returns the content type, or [`DEFAULT_CONTENT_TYPE`].
    #[must_use]
    pub fn content_type(&self) -> &str {
        &self.resolved().content_type
    }

    /// Returns `true` if the body was sent and decoded as a JSON object.
    #[must_use]
    pub fn is_json(&self) -> bool {
        self.resolved().is_json
    }

    /// Returns the parsed body: the decoded JSON object, or the form fields
    /// as JSON strings.
    #[must_use]
    pub fn parsed_body(&self) -> &Map<String, Value> {
        &self.resolved().parsed_body
    }

    /// Returns the query string parameters.
    #[must_use]
    pub fn query_params(&self) -> &IndexMap<String, String> {
        &self.resolved().query_params
    }

    /// Returns the captures of the matched route pattern.
    #[must_use]
    pub fn path_params(&self) -> &PathParams {
        &self.path_params
    }

    /// Overrides the method.
    #[must_use]
    pub fn with_method(self, method: &str) -> Self {
        let method = method.to_uppercase();
        self.update(|r| r.method = method)
    }

    /// Overrides the URI path.
    #[must_use]
    pub fn with_uri(self, uri: impl Into<String>) -> Self {
        let uri = uri.into();
        self.update(|r| r.uri = uri)
    }

    /// Overrides the content type.
    #[must_use]
    pub fn with_content_type(self, content_type: impl Into<String>) -> Self {
        let content_type = content_type.into();
        self.update(|r| r.content_type = content_type)
    }

    /// Overrides the JSON flag.
    #[must_use]
    pub fn set_json(self, is_json: bool) -> Self {
        self.update(|r| r.is_json = is_json)
    }

    /// Overrides the parsed body.
    #[must_use]
    pub fn with_parsed_body(self, body: Map<String, Value>) -> Self {
        self.update(|r| r.parsed_body = body)
    }

    /// Overrides the query parameters.
    #[must_use]
    pub fn with_query_params(self, query: IndexMap<String, String>) -> Self {
        self.update(|r| r.query_params = query)
    }

    /// Sets the captures of the matched route pattern.
    #[must_use]
    pub fn with_path_params(mut self, params: PathParams) -> Self {
        self.path_params = params;
        self
    }
}

/// Extracts the path component of a request URI.
fn uri_path(raw: &str) -> String {
    let without_authority = match raw.find("://") {
        Some(scheme_end) => {
            let rest = &raw[scheme_end + 3..];
            rest.find('/').map_or("", |slash| &rest[slash..])
        }
        None => raw,
    };

    let end = without_authority
        .find(['?', '#'])
        .unwrap_or(without_authority.len());
    without_authority[..end].to_string()
}

fn starts_with_ignore_case(value: &str, prefix: &str) -> bool {
    value
        .get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults_for_empty_environment() {
        let request = Request::new(Environment::new());
        assert_eq!(request.method(), "[UNKNOWN]");
        assert_eq!(request.content_type(), "text/html");
        assert_eq!(request.uri(), "");
        assert!(!request.is_json());
        assert!(request.parsed_body().is_empty());
        assert!(request.query_params().is_empty());
        assert!(request.path_params().is_empty());
    }

    #[test]
    fn test_resolution_is_lazy() {
        let request = Request::new(Environment::new().with_method("get"));
        assert!(!request.is_resolved());
        assert_eq!(request.method(), "GET");
        assert!(request.is_resolved());
    }

    #[test]
    fn test_method_is_uppercased() {
        let request = Request::new(Environment::new().with_method("pOsT"));
        assert_eq!(request.method(), "POST");
    }

    #[test]
    fn test_uri_strips_query_string() {
        let request = Request::new(Environment::new().with_uri("/there/is?x=1&y=2"));
        assert_eq!(request.uri(), "/there/is");
    }

    #[test]
    fn test_uri_path_of_absolute_uri() {
        assert_eq!(uri_path("http://example.com/author?x"), "/author");
        assert_eq!(uri_path("http://example.com"), "");
        assert_eq!(uri_path("/licence#top"), "/licence");
    }

    #[test]
    fn test_form_body() {
        let env = Environment::new()
            .with_method("POST")
            .with_form_field("first", "102.43")
            .with_form_field("operator", "\u{1f480}");
        let request = Request::new(env);

        assert!(!request.is_json());
        assert_eq!(request.parsed_body()["first"], json!("102.43"));
        assert_eq!(request.parsed_body()["operator"], json!("\u{1f480}"));
    }

    #[test]
    fn test_json_body_replaces_form_data() {
        let env = Environment::new()
            .with_content_type("application/json;charset=utf-8")
            .with_form_field("ignored", "yes")
            .with_input(r#"{"first": 102.43, "second": "43.32"}"#);
        let request = Request::new(env);

        assert!(request.is_json());
        assert_eq!(request.parsed_body()["first"], json!(102.43));
        assert_eq!(request.parsed_body()["second"], json!("43.32"));
        assert!(!request.parsed_body().contains_key("ignored"));
    }

    #[test]
    fn test_invalid_json_keeps_form_data() {
        let env = Environment::new()
            .with_content_type("application/json")
            .with_form_field("first", "1")
            .with_input("{not json");
        let request = Request::new(env);

        assert!(!request.is_json());
        assert_eq!(request.parsed_body()["first"], json!("1"));
    }

    #[test]
    fn test_non_object_json_keeps_form_data() {
        let env = Environment::new()
            .with_content_type("application/json")
            .with_input("[1, 2, 3]");
        let request = Request::new(env);

        assert!(!request.is_json());
        assert!(request.parsed_body().is_empty());
    }

    #[test]
    fn test_json_requires_json_content_type() {
        let env = Environment::new()
            .with_content_type("text/plain")
            .with_input(r#"{"first": 1}"#);
        let request = Request::new(env);

        assert!(!request.is_json());
        assert!(request.parsed_body().is_empty());
    }

    #[test]
    fn test_json_content_type_case_insensitive() {
        let env = Environment::new()
            .with_content_type("Application/JSON")
            .with_input(r#"{"a": true}"#);
        assert!(Request::new(env).is_json());
    }

    #[test]
    fn test_query_params() {
        let env = Environment::new().with_query_param("page", "2");
        let request = Request::new(env);
        assert_eq!(request.query_params().get("page").map(String::as_str), Some("2"));
    }

    #[test]
    fn test_with_overrides() {
        let mut body = Map::new();
        body.insert("first".to_string(), json!("5"));

        let request = Request::new(Environment::new().with_method("GET"))
            .with_method("post")
            .with_uri("/elsewhere")
            .with_content_type("application/json")
            .set_json(true)
            .with_parsed_body(body)
            .with_query_params(IndexMap::from([("q".to_string(), "1".to_string())]));

        assert_eq!(request.method(), "POST");
        assert_eq!(request.uri(), "/elsewhere");
        assert_eq!(request.content_type(), "application/json");
        assert!(request.is_json());
        assert_eq!(request.parsed_body()["first"], json!("5"));
        assert_eq!(request.query_params().len(), 1);
    }

    #[test]
    fn test_with_override_keeps_other_resolved_fields() {
        let request = Request::new(Environment::new().with_method("put").with_uri("/a"))
            .with_uri("/b");
        assert_eq!(request.method(), "PUT");
        assert_eq!(request.uri(), "/b");
    }

    #[test]
    fn test_path_params() {
        let params = PathParams::new(
            vec!["there/is/an".to_string(), "an".to_string()],
            IndexMap::from([("word".to_string(), "an".to_string())]),
        );
        let request = Request::new(Environment::new()).with_path_params(params);

        assert_eq!(request.path_params().get(0), Some("there/is/an"));
        assert_eq!(request.path_params().get(1), Some("an"));
        assert_eq!(request.path_params().get(2), None);
        assert_eq!(request.path_params().named("word"), Some("an"));
        assert_eq!(request.path_params().len(), 2);
    }
}
