//! HTTP front-end for Emojicalc.
//!
//! Binds a Tokio listener, serves HTTP/1.1 with hyper, and hands each request
//! to the [`App`](emojicalc_app::App) as an
//! [`Environment`](emojicalc_http::Environment) snapshot:
//!
//! - the query string becomes the query parameters
//! - `application/x-www-form-urlencoded` bodies become the form fields
//! - the raw body is kept as input for JSON requests
//!
//! Each request is tagged with a UUID v7 request id, logged, and counted in
//! the Prometheus metrics.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use emojicalc_app::App;
//! use emojicalc_config::ConfigLoader;
//! use emojicalc_server::{settings, Server};
//!
//! let config = ConfigLoader::new().with_defaults().with_env_prefix("EMOJICALC").load()?;
//! let app = App::new(settings::app_config(&config))?;
//! Server::new(Arc::new(app), config.server.clone()).run().await?;
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod environment;
mod error;
pub mod server;
pub mod settings;
pub mod shutdown;

pub use environment::build_environment;
pub use error::ServerError;
pub use server::{HttpResponse, Server, REQUEST_ID_HEADER};
pub use shutdown::{ConnectionTracker, ShutdownSignal};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
