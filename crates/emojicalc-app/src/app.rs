//! Application wiring.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use bytes::Bytes;
use emojicalc_core::{default_operators, Operators};
use emojicalc_http::{Environment, Output, Request, Response, Router, ViewRenderer, PAGE_TEMPLATE};

use crate::controllers::{AboutController, IndexController};
use crate::AppError;

/// Returns the view directory used when none is configured.
///
/// A `views/` directory next to the running executable wins, so an
/// installed binary finds the templates shipped beside it. Otherwise this
/// falls back to the templates in this crate's source tree.
#[must_use]
pub fn default_views_dir() -> PathBuf {
    let installed = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join("views")));
    first_existing_dir(installed).unwrap_or_else(source_views_dir)
}

fn source_views_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("views")
}

fn first_existing_dir(candidates: impl IntoIterator<Item = PathBuf>) -> Option<PathBuf> {
    candidates.into_iter().find(|dir| dir.is_dir())
}

/// Settings used to build an [`App`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Directory of `<name>.html` view templates.
    pub views_dir: PathBuf,
    /// View wrapped around every HTML page.
    pub page_template: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            views_dir: default_views_dir(),
            page_template: PAGE_TEMPLATE.to_string(),
        }
    }
}

/// The assembled calculator: operator registry, renderer and router.
///
/// # Example
///
/// ```
/// use emojicalc_app::{App, AppConfig};
/// use emojicalc_http::Environment;
///
/// let app = App::new(AppConfig::default()).unwrap();
/// let reply = app.handle(Environment::new().with_method("GET").with_uri("/licence"));
/// assert_eq!(reply.status(), 200);
/// ```
#[derive(Debug)]
pub struct App {
    operators: Arc<Operators>,
    renderer: Arc<ViewRenderer>,
    router: Router,
}

impl App {
    /// Builds the application from configuration with the default operators
    /// and routes.
    pub fn new(config: AppConfig) -> Result<Self, AppError> {
        Self::builder().config(config).build()
    }

    /// Creates a builder for replacing individual components.
    #[must_use]
    pub fn builder() -> AppBuilder {
        AppBuilder::default()
    }

    /// Returns the operator registry.
    #[must_use]
    pub fn operators(&self) -> &Arc<Operators> {
        &self.operators
    }

    /// Returns the view renderer.
    #[must_use]
    pub fn renderer(&self) -> &Arc<ViewRenderer> {
        &self.renderer
    }

    /// Returns the router.
    #[must_use]
    pub fn router(&self) -> &Router {
        &self.router
    }

    /// Handles one request described by `environment`.
    pub fn handle(&self, environment: Environment) -> http::Response<Bytes> {
        self.router.run(Request::new(environment))
    }
}

/// Builder for [`App`].
///
/// Components that are not supplied are built from the [`AppConfig`]. A
/// supplied router that already has routes is used as is; otherwise the
/// default routes are registered on it.
#[derive(Debug, Default)]
pub struct AppBuilder {
    config: AppConfig,
    operators: Option<Operators>,
    renderer: Option<Arc<ViewRenderer>>,
    router: Option<Router>,
}

impl AppBuilder {
    /// Sets the configuration.
    #[must_use]
    pub fn config(mut self, config: AppConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the view template directory.
    #[must_use]
    pub fn views_dir(mut self, directory: impl Into<PathBuf>) -> Self {
        self.config.views_dir = directory.into();
        self
    }

    /// Sets the page template name.
    #[must_use]
    pub fn page_template(mut self, name: impl Into<String>) -> Self {
        self.config.page_template = name.into();
        self
    }

    /// Uses a custom operator registry.
    #[must_use]
    pub fn operators(mut self, operators: Operators) -> Self {
        self.operators = Some(operators);
        self
    }

    /// Uses a custom renderer instead of one reading `views_dir`.
    #[must_use]
    pub fn renderer(mut self, renderer: Arc<ViewRenderer>) -> Self {
        self.renderer = Some(renderer);
        self
    }

    /// Uses a custom router.
    #[must_use]
    pub fn router(mut self, router: Router) -> Self {
        self.router = Some(router);
        self
    }

    /// Builds the application.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::ViewsDirectory`] if no renderer was supplied and
    /// the views directory does not exist.
    pub fn build(self) -> Result<App, AppError> {
        let renderer = match self.renderer {
            Some(renderer) => renderer,
            None => {
                let directory = &self.config.views_dir;
                if !directory.is_dir() {
                    return Err(AppError::views_directory(directory));
                }
                Arc::new(ViewRenderer::from_directory(directory))
            }
        };
        let operators = Arc::new(self.operators.unwrap_or_else(default_operators));

        let mut router = self.router.unwrap_or_else(|| {
            Router::new(Arc::clone(&renderer)).with_page_template(self.config.page_template)
        });
        if router.are_routes_defined() {
            tracing::debug!("Using pre-registered routes");
        } else {
            register_default_routes(&mut router, &operators, &renderer);
        }

        tracing::info!(
            operators = operators.len(),
            routes = router.all_routes().values().map(Vec::len).sum::<usize>(),
            "Application ready"
        );

        Ok(App {
            operators,
            renderer,
            router,
        })
    }
}

/// Registers the calculator and about routes.
pub fn register_default_routes(
    router: &mut Router,
    operators: &Arc<Operators>,
    renderer: &Arc<ViewRenderer>,
) {
    let index = Arc::new(IndexController::new(Arc::clone(operators), Arc::clone(renderer)));
    let about = Arc::new(AboutController::new(Arc::clone(renderer)));

    let start = Arc::clone(&index);
    router.register_route("GET", "^/?$", move |req: &Request, res: Response, _: &mut Output| {
        start.start(req, res)
    });
    let calculate = index;
    router.register_route("POST", "^/?$", move |req: &Request, res: Response, _: &mut Output| {
        calculate.calculate(req, res)
    });

    let author = Arc::clone(&about);
    router.register_route("GET", "^author/?$", move |req: &Request, res: Response, _: &mut Output| {
        author.author(req, res)
    });
    let specification = Arc::clone(&about);
    router.register_route(
        "GET",
        "^specification/?$",
        move |req: &Request, res: Response, _: &mut Output| specification.specification(req, res),
    );
    let licence = about;
    router.register_route("GET", "^licence/?$", move |req: &Request, res: Response, _: &mut Output| {
        licence.licence(req, res)
    });
}
