//! Route handler contract.

use std::sync::Arc;

use crate::{Output, Request, Response, RouteError};

/// A type-erased route handler.
///
/// Built by [`Router::register_route`](crate::Router::register_route) from any
/// closure or function whose return type implements [`IntoReply`].
pub type Handler =
    Arc<dyn Fn(&Request, Response, &mut Output) -> Result<Response, RouteError> + Send + Sync>;

/// Conversion of a handler's return value into a response.
///
/// Returning a [`Response`] is the normal case. Returning `()` or `None`
/// means the handler produced nothing usable, which the router reports as
/// [`RouteError::InvalidResponse`]. Returning `Err` reports the error as
/// [`RouteError::Handler`].
pub trait IntoReply {
    /// Converts the value into a response or a dispatch fault.
    fn into_reply(self) -> Result<Response, RouteError>;
}

impl IntoReply for Response {
    fn into_reply(self) -> Result<Response, RouteError> {
        Ok(self)
    }
}

impl IntoReply for () {
    fn into_reply(self) -> Result<Response, RouteError> {
        Err(RouteError::InvalidResponse)
    }
}

impl IntoReply for Option<Response> {
    fn into_reply(self) -> Result<Response, RouteError> {
        self.ok_or(RouteError::InvalidResponse)
    }
}

impl<R, E> IntoReply for Result<R, E>
where
    R: IntoReply,
    E: Into<anyhow::Error>,
{
    fn into_reply(self) -> Result<Response, RouteError> {
        self.map_err(|e| RouteError::handler(e))?.into_reply()
    }
}

/// Erases a handler's concrete return type.
pub(crate) fn erase<F, R>(handler: F) -> Handler
where
    F: Fn(&Request, Response, &mut Output) -> R + Send + Sync + 'static,
    R: IntoReply,
{
    Arc::new(move |request: &Request, response: Response, output: &mut Output| {
        handler(request, response, output).into_reply()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_is_valid_reply() {
        let reply = Response::new("x").into_reply().unwrap();
        assert_eq!(reply.content_type(), "x");
    }

    #[test]
    fn test_unit_is_invalid_reply() {
        let err = ().into_reply().unwrap_err();
        assert!(matches!(err, RouteError::InvalidResponse));
    }

    #[test]
    fn test_option_reply() {
        assert!(Some(Response::default()).into_reply().is_ok());
        assert!(matches!(
            None::<Response>.into_reply().unwrap_err(),
            RouteError::InvalidResponse
        ));
    }

    #[test]
    fn test_result_reply() {
        let ok: Result<Response, std::io::Error> = Ok(Response::default());
        assert!(ok.into_reply().is_ok());

        let err: Result<Response, anyhow::Error> = Err(anyhow::anyhow!("exception in route"));
        let err = err.into_reply().unwrap_err();
        assert_eq!(err.to_string(), "exception in route");
    }

    #[test]
    fn test_result_of_unit_is_invalid() {
        let ok: Result<(), std::io::Error> = Ok(());
        assert!(matches!(
            ok.into_reply().unwrap_err(),
            RouteError::InvalidResponse
        ));
    }

    #[test]
    fn test_erased_handler() {
        let handler = erase(|_req: &Request, mut res: Response, out: &mut Output| {
            out.print("!");
            res.add_to_body("ok");
            res
        });

        let request = Request::new(crate::Environment::new());
        let mut output = Output::default();
        let reply = handler(&request, Response::default(), &mut output).unwrap();
        assert_eq!(reply.body(), "ok");
        assert_eq!(output.as_str(), "!");
    }
}
