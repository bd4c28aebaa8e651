//! Static about pages.

use std::sync::Arc;

use emojicalc_http::{Request, Response, ViewError, ViewRenderer};

/// Author page view.
pub const AUTHOR_VIEW: &str = "author";

/// Specification page view.
pub const SPECIFICATION_VIEW: &str = "specification";

/// Licence page view.
pub const LICENCE_VIEW: &str = "licence";

/// Serves the static author, specification and licence pages.
#[derive(Debug, Clone)]
pub struct AboutController {
    renderer: Arc<ViewRenderer>,
}

impl AboutController {
    /// Creates a controller rendering through `renderer`.
    #[must_use]
    pub fn new(renderer: Arc<ViewRenderer>) -> Self {
        Self { renderer }
    }

    /// Renders the author page.
    pub fn author(&self, _request: &Request, response: Response) -> Result<Response, ViewError> {
        self.page(AUTHOR_VIEW, response)
    }

    /// Renders the specification page.
    pub fn specification(&self, _request: &Request, response: Response) -> Result<Response, ViewError> {
        self.page(SPECIFICATION_VIEW, response)
    }

    /// Renders the licence page.
    pub fn licence(&self, _request: &Request, response: Response) -> Result<Response, ViewError> {
        self.page(LICENCE_VIEW, response)
    }

    fn page(&self, view: &str, mut response: Response) -> Result<Response, ViewError> {
        response.add_to_body(self.renderer.render_plain(view)?);
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use emojicalc_http::{Environment, MemorySource};

    fn controller() -> AboutController {
        AboutController::new(Arc::new(ViewRenderer::new(
            MemorySource::new()
                .with_template(AUTHOR_VIEW, "by %NOBODY%")
                .with_template(SPECIFICATION_VIEW, "spec")
                .with_template(LICENCE_VIEW, "licence"),
        )))
    }

    #[test]
    fn test_pages_render_without_placeholders() {
        let controller = controller();
        let request = Request::new(Environment::new());

        let author = controller.author(&request, Response::default()).unwrap();
        assert_eq!(author.body(), "by %NOBODY%");
        assert!(author.is_html());

        let spec = controller.specification(&request, Response::default()).unwrap();
        assert_eq!(spec.body(), "spec");

        let licence = controller.licence(&request, Response::default()).unwrap();
        assert_eq!(licence.body(), "licence");
    }

    #[test]
    fn test_page_appends_to_existing_body() {
        let mut response = Response::default();
        response.add_to_body(">");
        let response = controller()
            .licence(&Request::new(Environment::new()), response)
            .unwrap();
        assert_eq!(response.body(), ">licence");
    }

    #[test]
    fn test_missing_view() {
        let controller = AboutController::new(Arc::new(ViewRenderer::new(MemorySource::new())));
        let err = controller
            .author(&Request::new(Environment::new()), Response::default())
            .unwrap_err();
        assert_eq!(err.to_string(), "File author does not exist");
    }
}
