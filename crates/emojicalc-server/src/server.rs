//! HTTP server.
//!
//! Accepts HTTP/1.1 connections with hyper, turns each request into an
//! [`Environment`](emojicalc_http::Environment) and runs it through the shared
//! [`App`].
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use emojicalc_app::{App, AppConfig};
//! use emojicalc_config::ServerConfig;
//! use emojicalc_server::Server;
//!
//! let app = Arc::new(App::new(AppConfig::default())?);
//! Server::new(app, ServerConfig::default()).run().await?;
//! ```

use std::convert::Infallible;
use std::fmt;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use bytes::Bytes;
use emojicalc_app::App;
use emojicalc_config::ServerConfig;
use emojicalc_http::MatchedRoute;
use emojicalc_telemetry::metrics::{record_request, record_request_size, record_response_size};
use emojicalc_telemetry::{log_request_complete, log_request_error, log_request_start, InFlightGuard};
use http::header::{HeaderValue, CONTENT_TYPE};
use http::{Request, Response, StatusCode};
use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::{Body, Incoming};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use tokio::net::{TcpListener, TcpStream};
use tracing::Instrument;
use uuid::Uuid;

use crate::environment::build_environment;
use crate::shutdown::{ConnectionTracker, ShutdownSignal};
use crate::ServerError;

/// Type alias for HTTP response body.
pub type ResponseBody = Full<Bytes>;

/// Type alias for the HTTP response.
pub type HttpResponse = Response<ResponseBody>;

/// Response header carrying the request id.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Route label used for requests no route matched.
const UNMATCHED_ROUTE: &str = "unmatched";

/// The Emojicalc HTTP server.
pub struct Server {
    app: Arc<App>,
    config: ServerConfig,
}

impl fmt::Debug for Server {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Server")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Server {
    /// Creates a server for `app` using the given listener and limit settings.
    #[must_use]
    pub fn new(app: Arc<App>, config: ServerConfig) -> Self {
        Self { app, config }
    }

    /// Returns the application served.
    #[must_use]
    pub fn app(&self) -> &Arc<App> {
        &self.app
    }

    /// Returns the server configuration.
    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Runs the server until SIGTERM or SIGINT.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured address is invalid or cannot be
    /// bound.
    pub async fn run(self) -> Result<(), ServerError> {
        let shutdown = ShutdownSignal::with_os_signals();
        self.run_with_shutdown(shutdown).await
    }

    /// Binds the configured address and serves until `shutdown` fires.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured address is invalid or cannot be
    /// bound.
    pub async fn run_with_shutdown(self, shutdown: ShutdownSignal) -> Result<(), ServerError> {
        let addr: SocketAddr = self
            .config
            .http_addr
            .parse()
            .map_err(|e| ServerError::invalid_address(&self.config.http_addr, e))?;

        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| ServerError::bind(addr.to_string(), e))?;

        self.serve(listener, shutdown).await
    }

    /// Serves connections from an already bound listener until `shutdown`
    /// fires, then waits up to the shutdown timeout for open connections.
    ///
    /// # Errors
    ///
    /// Returns an error if the listener's local address cannot be read.
    pub async fn serve(self, listener: TcpListener, shutdown: ShutdownSignal) -> Result<(), ServerError> {
        let local_addr = listener.local_addr()?;
        tracing::info!(%local_addr, "Server listening");

        let server = Arc::new(self);
        let tracker = ConnectionTracker::new();

        loop {
            tokio::select! {
                result = listener.accept() => {
                    match result {
                        Ok((stream, remote_addr)) => {
                            let server = Arc::clone(&server);
                            let token = tracker.acquire();
                            let shutdown = shutdown.clone();

                            tokio::spawn(async move {
                                if let Err(e) = server.handle_connection(stream, remote_addr, shutdown).await {
                                    tracing::debug!(%remote_addr, error = %e, "Connection error");
                                }
                                drop(token);
                            });
                        }
                        Err(e) => {
                            tracing::error!(error = %e, "Failed to accept connection");
                        }
                    }
                }

                _ = shutdown.recv() => {
                    tracing::info!("Shutdown signal received, stopping server");
                    break;
                }
            }
        }

        let shutdown_timeout = server.config.shutdown_timeout();
        tracing::info!(
            timeout_secs = shutdown_timeout.as_secs(),
            connections = tracker.active_connections(),
            "Waiting for connections to close"
        );

        tokio::select! {
            _ = tracker.wait_for_shutdown() => {
                tracing::info!("All connections closed");
            }
            _ = tokio::time::sleep(shutdown_timeout) => {
                tracing::warn!(
                    connections = tracker.active_connections(),
                    "Shutdown timeout reached with connections still active"
                );
            }
        }

        tracing::info!("Server stopped");
        Ok(())
    }

    async fn handle_connection(
        self: &Arc<Self>,
        stream: TcpStream,
        remote_addr: SocketAddr,
        shutdown: ShutdownSignal,
    ) -> Result<(), hyper::Error> {
        let io = TokioIo::new(stream);
        let server = Arc::clone(self);

        let service = service_fn(move |req: Request<Incoming>| {
            let server = Arc::clone(&server);
            async move { Ok::<_, Infallible>(server.handle_request(req, Some(remote_addr)).await) }
        });

        let conn = http1::Builder::new().serve_connection(io, service);
        tokio::pin!(conn);

        tokio::select! {
            result = conn.as_mut() => result,
            _ = shutdown.recv() => {
                // Let the current request finish, then close
                conn.as_mut().graceful_shutdown();
                conn.await
            }
        }
    }

    /// Handles one request: collects the body, runs the application, and
    /// records logs and metrics.
    ///
    /// A body over `max_body_bytes` gets 413, a body not received within the
    /// request timeout gets 408, and a body read failure gets 400. Every
    /// reply carries an `x-request-id` header.
    pub async fn handle_request<B>(&self, req: Request<B>, remote_addr: Option<SocketAddr>) -> HttpResponse
    where
        B: Body,
        B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        let request_id = Uuid::now_v7();
        let span = tracing::info_span!(
            "request",
            request_id = %request_id,
            http.method = %req.method(),
            http.path = %req.uri().path()
        );

        async move {
            let started = Instant::now();
            let _in_flight = InFlightGuard::new();
            log_request_start!(request_id, req.method(), req.uri().path());

            let (parts, body) = req.into_parts();
            let (mut response, route) = match self.collect_body(body).await {
                Ok(body) => {
                    let size = body.len() as u64;
                    let env = build_environment(&parts, remote_addr, body);
                    let reply = self.app.handle(env);
                    let route = reply
                        .extensions()
                        .get::<MatchedRoute>()
                        .map_or_else(|| UNMATCHED_ROUTE.to_string(), |m| m.pattern().to_string());
                    record_request_size(&route, size);
                    (reply.map(Full::new), route)
                }
                Err(status) => (plain_error(status), UNMATCHED_ROUTE.to_string()),
            };

            if let Ok(value) = HeaderValue::from_str(&request_id.to_string()) {
                response.headers_mut().insert(REQUEST_ID_HEADER, value);
            }

            if response.status().is_server_error() {
                log_request_error!(request_id, response.status());
            }

            let status = response.status().as_u16();
            let elapsed = started.elapsed();
            record_request(&route, status, elapsed);
            record_response_size(&route, response.body().size_hint().exact().unwrap_or(0));
            log_request_complete!(request_id, status, elapsed.as_millis() as u64);

            response
        }
        .instrument(span)
        .await
    }

    async fn collect_body<B>(&self, body: B) -> Result<Bytes, StatusCode>
    where
        B: Body,
        B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        let limited = Limited::new(body, self.config.max_body_bytes);
        match tokio::time::timeout(self.config.request_timeout(), limited.collect()).await {
            Ok(Ok(collected)) => Ok(collected.to_bytes()),
            Ok(Err(e)) if e.downcast_ref::<LengthLimitError>().is_some() => {
                tracing::warn!(limit = self.config.max_body_bytes, "Request body too large");
                Err(StatusCode::PAYLOAD_TOO_LARGE)
            }
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "Failed to read request body");
                Err(StatusCode::BAD_REQUEST)
            }
            Err(_) => {
                tracing::warn!("Request body collection timed out");
                Err(StatusCode::REQUEST_TIMEOUT)
            }
        }
    }
}

fn plain_error(status: StatusCode) -> HttpResponse {
    let message = status.canonical_reason().unwrap_or("Error");
    let mut response = Response::new(Full::new(Bytes::from(message)));
    *response.status_mut() = status;
    response.headers_mut().insert(
        CONTENT_TYPE,
        HeaderValue::from_static("text/plain;charset=utf-8"),
    );
    response
}
