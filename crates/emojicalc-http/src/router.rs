//! Method and regex route table with dispatch and rendering.
//!
//! # Matching
//!
//! Routes are stored per upper-cased method, in registration order. A path
//! is normalised by dropping the query string and any leading or trailing
//! `/`, then tried against each pattern of the method in turn. The first
//! pattern that matches wins. Patterns are regular expressions compiled the
//! first time they are tried, so an invalid pattern only fails when a request
//! reaches it.
//!
//! # Dispatch
//!
//! [`Router::run`] never fails. Its outcomes are:
//!
//! | Outcome | Status | Body |
//! |---------|--------|------|
//! | Handler returned a response | 200 | HTML wrapped in the page template, anything else verbatim |
//! | No route matched | 404 | The `404notFound` view, unwrapped |
//! | Any fault while matching or dispatching | 500 | The `500internalServer` view with `%DEBUG%` set to the fault message |
//!
//! Each reply carries exactly one `content-type` header.

use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, OnceLock};
use std::time::Instant;

use bytes::Bytes;
use http::header::{HeaderValue, CONTENT_TYPE};
use http::StatusCode;
use indexmap::IndexMap;
use regex::Regex;

use crate::handler::erase;
use crate::{
    Handler, IntoReply, Output, OutputCapture, PathParams, Placeholders, Request, Response,
    RouteError, ViewRenderer, HTML_CONTENT_TYPE,
};

/// View rendered as the whole body of a 404 reply.
pub const NOT_FOUND_VIEW: &str = "404notFound";

/// View rendered as the whole body of a 500 reply.
pub const INTERNAL_ERROR_VIEW: &str = "500internalServer";

/// Default page template wrapped around HTML bodies.
pub const PAGE_TEMPLATE: &str = "template";

/// A registered route.
struct Route {
    pattern: String,
    compiled: OnceLock<Result<Regex, regex::Error>>,
    handler: Handler,
}

impl Route {
    fn new(pattern: String, handler: Handler) -> Self {
        Self {
            pattern,
            compiled: OnceLock::new(),
            handler,
        }
    }

    fn regex(&self) -> Result<&Regex, RouteError> {
        self.compiled
            .get_or_init(|| Regex::new(&self.pattern))
            .as_ref()
            .map_err(|e| RouteError::InvalidPattern {
                pattern: self.pattern.clone(),
                source: e.clone(),
            })
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("pattern", &self.pattern)
            .finish_non_exhaustive()
    }
}

/// The route selected for a request, with its captures.
#[derive(Clone)]
pub struct RouteMatch {
    pattern: String,
    params: PathParams,
    handler: Handler,
}

impl RouteMatch {
    /// Returns the pattern that matched.
    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Returns the captures: the whole match first, then each group.
    #[must_use]
    pub fn params(&self) -> &PathParams {
        &self.params
    }

    /// Returns the matched handler.
    #[must_use]
    pub fn handler(&self) -> &Handler {
        &self.handler
    }
}

impl fmt::Debug for RouteMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteMatch")
            .field("pattern", &self.pattern)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

/// Response extension naming the route pattern that handled a request.
///
/// Set by [`Router::run`] whenever a route matched, including when its
/// handler then failed. Absent on 404 replies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchedRoute(String);

impl MatchedRoute {
    /// Returns the matched pattern.
    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.0
    }
}

/// Request router.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use emojicalc_http::{MemorySource, Request, Response, Router, ViewRenderer};
///
/// let renderer = Arc::new(ViewRenderer::new(MemorySource::new()));
/// let mut router = Router::new(renderer);
///
/// router
///     .register_route("GET", "^there/?$", |_: &Request, res: Response, _: &mut _| res)
///     .register_route(
///         "GET",
///         "^there/is/([A-Za-z]+)/([A-Za-z]+)/here/?$",
///         |_: &Request, res: Response, _: &mut _| res,
///     );
///
/// let found = router
///     .find_matching_route("get", "/there/is/an/elephant/here")
///     .unwrap()
///     .unwrap();
/// assert_eq!(found.params().positional(), ["there/is/an/elephant/here", "an", "elephant"]);
///
/// assert!(router.find_matching_route("GET", "there/we/go").unwrap().is_none());
/// ```
pub struct Router {
    routes: IndexMap<String, IndexMap<String, Route>>,
    renderer: Arc<ViewRenderer>,
    page_template: String,
}

impl fmt::Debug for Router {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Router")
            .field("routes", &self.routes)
            .field("page_template", &self.page_template)
            .finish_non_exhaustive()
    }
}

impl Router {
    /// Creates a router with no routes that renders through `renderer`.
    #[must_use]
    pub fn new(renderer: Arc<ViewRenderer>) -> Self {
        Self {
            routes: IndexMap::new(),
            renderer,
            page_template: PAGE_TEMPLATE.to_string(),
        }
    }

    /// Sets the view used to wrap HTML bodies.
    #[must_use]
    pub fn with_page_template(mut self, name: impl Into<String>) -> Self {
        self.page_template = name.into();
        self
    }

    /// Returns the renderer shared with handlers.
    #[must_use]
    pub fn renderer(&self) -> &Arc<ViewRenderer> {
        &self.renderer
    }

    /// Registers a handler for a method and path pattern.
    ///
    /// The method is upper-cased. Registering the same pattern again for a
    /// method replaces the handler but keeps the original position. The
    /// pattern is not validated here.
    pub fn register_route<F, R>(
        &mut self,
        method: &str,
        pattern: impl Into<String>,
        handler: F,
    ) -> &mut Self
    where
        F: Fn(&Request, Response, &mut Output) -> R + Send + Sync + 'static,
        R: IntoReply,
    {
        let method = method.to_uppercase();
        let pattern = pattern.into();
        tracing::debug!(http.method = %method, pattern = %pattern, "Registered route");

        self.routes
            .entry(method)
            .or_default()
            .insert(pattern.clone(), Route::new(pattern, erase(handler)));
        self
    }

    /// Returns `true` if any route is registered.
    #[must_use]
    pub fn are_routes_defined(&self) -> bool {
        self.routes.values().any(|routes| !routes.is_empty())
    }

    /// Returns every registered pattern, grouped by method in registration order.
    #[must_use]
    pub fn all_routes(&self) -> IndexMap<&str, Vec<&str>> {
        self.routes
            .iter()
            .map(|(method, routes)| {
                (
                    method.as_str(),
                    routes.keys().map(String::as_str).collect(),
                )
            })
            .collect()
    }

    /// Returns the patterns registered for `method`, in registration order.
    #[must_use]
    pub fn routes_for_method(&self, method: &str) -> Vec<&str> {
        self.routes
            .get(&method.to_uppercase())
            .map(|routes| routes.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Finds the first route for `method` whose pattern matches `path`.
    ///
    /// Returns `Ok(None)` when nothing matches, and an error if a pattern
    /// tried along the way does not compile.
    pub fn find_matching_route(
        &self,
        method: &str,
        path: &str,
    ) -> Result<Option<RouteMatch>, RouteError> {
        let Some(routes) = self.routes.get(&method.to_uppercase()) else {
            return Ok(None);
        };
        let path = normalise_path(path);

        for route in routes.values() {
            let regex = route.regex()?;
            if let Some(captures) = regex.captures(path) {
                let positional = captures
                    .iter()
                    .map(|group| group.map_or_else(String::new, |m| m.as_str().to_string()))
                    .collect();
                let named = regex
                    .capture_names()
                    .flatten()
                    .filter_map(|name| {
                        captures
                            .name(name)
                            .map(|m| (name.to_string(), m.as_str().to_string()))
                    })
                    .collect();

                return Ok(Some(RouteMatch {
                    pattern: route.pattern.clone(),
                    params: PathParams::new(positional, named),
                    handler: Arc::clone(&route.handler),
                }));
            }
        }

        Ok(None)
    }

    /// Runs a request through the route table and renders the reply.
    pub fn run(&self, request: Request) -> http::Response<Bytes> {
        let started = Instant::now();
        let method = request.method().to_string();
        let uri = request.uri().to_string();

        let mut matched = None;
        let (status, content_type, body) = match self.dispatch(request, &mut matched) {
            Ok(Some((content_type, body))) => (StatusCode::OK, content_type, body),
            Ok(None) => {
                tracing::warn!(http.method = %method, http.path = %uri, "No matching route");
                match self.renderer.render_plain(NOT_FOUND_VIEW) {
                    Ok(page) => (StatusCode::NOT_FOUND, HTML_CONTENT_TYPE.to_string(), page),
                    Err(e) => self.internal_error(&e.into()),
                }
            }
            Err(e) => {
                tracing::error!(
                    http.method = %method,
                    http.path = %uri,
                    error = %e,
                    kind = e.kind(),
                    "Route failed"
                );
                self.internal_error(&e)
            }
        };

        metrics::counter!(
            "emojicalc_router_dispatch_total",
            "status" => status.as_u16().to_string()
        )
        .increment(1);
        tracing::debug!(
            http.method = %method,
            http.path = %uri,
            http.status_code = status.as_u16(),
            duration_ms = started.elapsed().as_millis() as u64,
            "Route dispatched"
        );

        let mut reply = build_reply(status, &content_type, body);
        if let Some(pattern) = matched {
            reply.extensions_mut().insert(MatchedRoute(pattern));
        }
        reply
    }

    // Ok(None) means no route matched. `matched` is set as soon as a pattern
    // matches, so failed dispatches still report their route.
    fn dispatch(
        &self,
        request: Request,
        matched: &mut Option<String>,
    ) -> Result<Option<(String, String)>, RouteError> {
        let Some(found) = self.find_matching_route(request.method(), request.uri())? else {
            return Ok(None);
        };
        tracing::debug!(pattern = found.pattern(), "Matched route");
        *matched = Some(found.pattern.clone());

        let request = request.with_path_params(found.params);
        let handler = found.handler;

        let mut capture = OutputCapture::begin();
        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            handler(&request, Response::default(), capture.output())
        }));
        let mut response = match result {
            Ok(reply) => reply?,
            Err(payload) => return Err(RouteError::Panicked(panic_message(payload.as_ref()))),
        };
        response.add_to_body(capture.finish());

        if response.is_html() {
            let mut placeholders = Placeholders::new();
            let (content_type, body) = response.into_parts();
            placeholders.insert("%BODY%".to_string(), body);
            let page = self.renderer.render(&self.page_template, &placeholders)?;
            Ok(Some((content_type, page)))
        } else {
            Ok(Some(response.into_parts()))
        }
    }

    fn internal_error(&self, error: &RouteError) -> (StatusCode, String, String) {
        let mut placeholders = Placeholders::new();
        placeholders.insert("%DEBUG%".to_string(), error.to_string());

        let body = match self.renderer.render(INTERNAL_ERROR_VIEW, &placeholders) {
            Ok(page) => page,
            Err(e) => {
                tracing::error!(error = %e, "Failed to render error page");
                format!("Internal Server Error: {error}")
            }
        };
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            HTML_CONTENT_TYPE.to_string(),
            body,
        )
    }
}

/// Drops the query string and surrounding slashes.
fn normalise_path(path: &str) -> &str {
    let end = path.find('?').unwrap_or(path.len());
    path[..end].trim_matches('/')
}

fn build_reply(status: StatusCode, content_type: &str, body: String) -> http::Response<Bytes> {
    let header = HeaderValue::from_str(content_type).unwrap_or_else(|_| {
        tracing::warn!(content_type, "Invalid content type, falling back to HTML");
        HeaderValue::from_static(HTML_CONTENT_TYPE)
    });

    let mut reply = http::Response::new(Bytes::from(body));
    *reply.status_mut() = status;
    reply.headers_mut().insert(CONTENT_TYPE, header);
    reply
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "handler panicked".to_string()
    }
}
