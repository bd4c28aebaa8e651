//! The Emojicalc web application.
//!
//! Wires the operator registry from `emojicalc-core` and the router from
//! `emojicalc-http` together with the calculator and about controllers:
//!
//! | Method | Pattern | Handler |
//! |--------|---------|---------|
//! | GET | `^/?$` | [`IndexController::start`] |
//! | POST | `^/?$` | [`IndexController::calculate`] |
//! | GET | `^author/?$` | [`AboutController::author`] |
//! | GET | `^specification/?$` | [`AboutController::specification`] |
//! | GET | `^licence/?$` | [`AboutController::licence`] |
//!
//! The bundled views live in this crate's `views/` directory and are
//! expected in a `views/` directory beside an installed binary; see
//! [`default_views_dir`].
//!
//! # Example
//!
//! ```
//! use emojicalc_app::{App, AppConfig};
//! use emojicalc_http::Environment;
//!
//! let app = App::new(AppConfig::default()).unwrap();
//!
//! let env = Environment::new()
//!     .with_method("POST")
//!     .with_uri("/")
//!     .with_form_field("first", "6")
//!     .with_form_field("second", "7")
//!     .with_form_field("operator", "\u{1f47b}");
//! let reply = app.handle(env);
//!
//! assert_eq!(reply.status(), 200);
//! assert!(String::from_utf8_lossy(reply.body()).contains("<strong>42</strong>"));
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod app;
pub mod controllers;
mod error;

pub use app::{default_views_dir, register_default_routes, App, AppBuilder, AppConfig};
pub use controllers::{AboutController, IndexController};
pub use error::AppError;
