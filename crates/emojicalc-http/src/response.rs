//! Outbound response accumulator.

/// Default content type for responses.
pub const HTML_CONTENT_TYPE: &str = "text/html;charset=utf-8";

/// Content type used for JSON replies.
pub const JSON_CONTENT_TYPE: &str = "application/json;charset=utf-8";

/// A content type plus an append-only body.
///
/// Handlers receive a fresh `Response` and hand it back populated. The
/// router wraps HTML bodies in the page template and emits everything else
/// verbatim.
///
/// # Example
///
/// ```
/// use emojicalc_http::Response;
///
/// let mut response = Response::default();
/// response.add_to_body("hello").add_to_body(" world");
/// assert_eq!(response.body(), "hello world");
/// assert!(response.is_html());
///
/// response.reset("application/json;charset=utf-8");
/// assert_eq!(response.body(), "");
/// assert!(!response.is_html());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    content_type: String,
    body: String,
}

impl Default for Response {
    fn default() -> Self {
        Self::new(HTML_CONTENT_TYPE)
    }
}

impl Response {
    /// Creates an empty response with the given content type.
    #[must_use]
    pub fn new(content_type: impl Into<String>) -> Self {
        Self {
            content_type: content_type.into(),
            body: String::new(),
        }
    }

    /// Creates an empty JSON response.
    #[must_use]
    pub fn json() -> Self {
        Self::new(JSON_CONTENT_TYPE)
    }

    /// Returns the content type.
    #[must_use]
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// Replaces the content type, keeping the body.
    pub fn set_content_type(&mut self, content_type: impl Into<String>) -> &mut Self {
        self.content_type = content_type.into();
        self
    }

    /// Returns the accumulated body.
    #[must_use]
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Appends text to the body.
    pub fn add_to_body(&mut self, text: impl AsRef<str>) -> &mut Self {
        self.body.push_str(text.as_ref());
        self
    }

    /// Clears the body and sets a new content type.
    pub fn reset(&mut self, content_type: impl Into<String>) -> &mut Self {
        self.body.clear();
        self.content_type = content_type.into();
        self
    }

    /// Returns `true` if the content type starts with `text/html`.
    #[must_use]
    pub fn is_html(&self) -> bool {
        self.content_type.starts_with("text/html")
    }

    /// Consumes the response, returning the content type and body.
    #[must_use]
    pub fn into_parts(self) -> (String, String) {
        (self.content_type, self.body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_html() {
        let response = Response::default();
        assert_eq!(response.content_type(), "text/html;charset=utf-8");
        assert_eq!(response.body(), "");
        assert!(response.is_html());
    }

    #[test]
    fn test_custom_content_type() {
        let response = Response::new("random");
        assert_eq!(response.content_type(), "random");
        assert!(!response.is_html());
    }

    #[test]
    fn test_json_response() {
        assert_eq!(Response::json().content_type(), "application/json;charset=utf-8");
    }

    #[test]
    fn test_add_to_body_appends() {
        let mut response = Response::default();
        response.add_to_body("a");
        response.add_to_body(String::from("b"));
        assert_eq!(response.body(), "ab");
    }

    #[test]
    fn test_set_content_type_keeps_body() {
        let mut response = Response::default();
        response.add_to_body("kept").set_content_type("text/plain");
        assert_eq!(response.body(), "kept");
        assert_eq!(response.content_type(), "text/plain");
    }

    #[test]
    fn test_reset() {
        let mut response = Response::default();
        response.add_to_body("gone").reset("text/plain");
        assert_eq!(response.body(), "");
        assert_eq!(response.content_type(), "text/plain");
    }

    #[test]
    fn test_into_parts() {
        let mut response = Response::new("x/y");
        response.add_to_body("z");
        assert_eq!(response.into_parts(), ("x/y".to_string(), "z".to_string()));
    }
}
