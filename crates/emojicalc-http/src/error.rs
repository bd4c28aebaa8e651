//! Error types for view rendering and dispatch.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while resolving or reading a view template.
#[derive(Debug, Error)]
pub enum ViewError {
    /// No template exists for the requested name.
    #[error("File {} does not exist", path.display())]
    NotFound {
        /// Logical template name.
        name: String,
        /// Where the template was looked for.
        path: PathBuf,
    },

    /// The template exists but could not be read.
    #[error("failed to read view {}: {source}", path.display())]
    Read {
        /// Path of the unreadable template.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

impl ViewError {
    /// Creates a new not-found error.
    pub fn not_found(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self::NotFound {
            name: name.into(),
            path: path.into(),
        }
    }

    /// Creates a new read error.
    pub fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Read {
            path: path.into(),
            source,
        }
    }
}

/// Faults raised while matching or dispatching a route.
///
/// Every variant ends up as a 500 page; the [`Display`](std::fmt::Display)
/// text becomes the page's debug message.
#[derive(Debug, Error)]
pub enum RouteError {
    /// A handler produced something other than a response.
    #[error("Invalid response from route.")]
    InvalidResponse,

    /// A view needed by the handler or the router could not be rendered.
    #[error(transparent)]
    View(#[from] ViewError),

    /// A registered pattern is not a valid regular expression.
    #[error("invalid route pattern {pattern}: {source}")]
    InvalidPattern {
        /// The offending pattern.
        pattern: String,
        /// Compilation error.
        #[source]
        source: regex::Error,
    },

    /// A handler returned an error.
    #[error("{0}")]
    Handler(anyhow::Error),

    /// A handler panicked.
    #[error("{0}")]
    Panicked(String),
}

impl RouteError {
    /// Wraps an application error returned by a handler.
    pub fn handler(error: impl Into<anyhow::Error>) -> Self {
        Self::Handler(error.into())
    }

    /// Returns a short label for logs and metrics.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidResponse => "invalid_response",
            Self::View(_) => "view",
            Self::InvalidPattern { .. } => "invalid_pattern",
            Self::Handler(_) => "handler",
            Self::Panicked(_) => "panic",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_view_not_found_message() {
        let err = ViewError::not_found("missing", "views/missing.html");
        assert_eq!(err.to_string(), "File views/missing.html does not exist");
    }

    #[test]
    fn test_invalid_response_message() {
        assert_eq!(
            RouteError::InvalidResponse.to_string(),
            "Invalid response from route."
        );
    }

    #[test]
    fn test_view_error_is_transparent() {
        let err: RouteError = ViewError::not_found("x", "x.html").into();
        assert_eq!(err.to_string(), "File x.html does not exist");
        assert_eq!(err.kind(), "view");
    }

    #[test]
    fn test_handler_error_message() {
        let err = RouteError::handler(anyhow::anyhow!("exception in route"));
        assert_eq!(err.to_string(), "exception in route");
        assert_eq!(err.kind(), "handler");
    }
}
