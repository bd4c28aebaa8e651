//! Request routing, dispatch and rendering for Emojicalc.
//!
//! This crate turns an [`Environment`] snapshot of an inbound call into a
//! finished HTTP reply:
//!
//! ```text
//! Environment ─► Request ─► Router::run ─► handler(&Request, Response, &mut Output)
//!                                  │                    │
//!                                  │                    ▼
//!                                  │               IntoReply
//!                                  ▼                    │
//!                     404notFound / 500internalServer   │
//!                                  │                    ▼
//!                                  └──────► http::Response<Bytes>
//! ```
//!
//! - [`Environment`] - explicit snapshot of method, URI, content type, query,
//!   form fields and raw body
//! - [`Request`] - lazily normalised view of an environment
//! - [`Response`] - content type plus append-only body
//! - [`Output`] - sink for incidental handler output
//! - [`ViewRenderer`] - cached `%PLACEHOLDER%` template rendering
//! - [`Router`] - method and regex route table with 404/500 mapping
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use emojicalc_http::{Environment, MemorySource, Request, Response, Router, ViewRenderer};
//!
//! let views = MemorySource::new()
//!     .with_template("template", "<html>%BODY%</html>")
//!     .with_template("404notFound", "missing")
//!     .with_template("500internalServer", "broken: %DEBUG%");
//! let renderer = Arc::new(ViewRenderer::new(views));
//!
//! let mut router = Router::new(renderer);
//! router.register_route("get", "^hello$", |_req: &Request, mut res: Response, _out: &mut _| {
//!     res.add_to_body("hi");
//!     res
//! });
//!
//! let env = Environment::new().with_method("GET").with_uri("/hello");
//! let reply = router.run(Request::new(env));
//! assert_eq!(reply.status(), 200);
//! assert_eq!(reply.body().as_ref(), b"<html>hi</html>");
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod environment;
mod error;
mod handler;
mod output;
mod request;
mod response;
mod router;
mod view;

pub use environment::Environment;
pub use error::{RouteError, ViewError};
pub use handler::{Handler, IntoReply};
pub use output::{Output, OutputCapture};
pub use request::{PathParams, Request, DEFAULT_CONTENT_TYPE, DEFAULT_METHOD};
pub use response::{Response, HTML_CONTENT_TYPE, JSON_CONTENT_TYPE};
pub use router::{MatchedRoute, RouteMatch, Router, INTERNAL_ERROR_VIEW, NOT_FOUND_VIEW, PAGE_TEMPLATE};
pub use view::{
    substitute, FileSystemSource, MemorySource, Placeholders, TemplateSource, ViewRenderer,
};
