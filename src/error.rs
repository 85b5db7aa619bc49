use std::io::Error as IoError;

use http::{Method, StatusCode};
use thiserror::Error;

use crate::{Body, Response};

/// Boxed error type accepted from handlers and request bodies.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Failures that can end a request.
///
/// `NoRoute` is special: it is the router's way of saying nothing was registered for the
/// request, and `FileMiddleware` recovers from it by looking at the filesystem. Every other
/// variant passes through the middleware untouched.
#[derive(Debug, Error)]
pub enum Error {
    /// No registered route matches the request method and path.
    #[error("no route matches {method} {path}")]
    NoRoute {
        /// Method of the unmatched request.
        method: Method,
        /// Path of the unmatched request.
        path: String,
    },
    /// The request path tried to escape the public directory, or the file is not readable.
    #[error("access to {0} is forbidden")]
    Forbidden(String),
    /// Neither a route nor a file exists for the request path.
    #[error("no file found for {0}")]
    NotFound(String),
    /// The request body could not be decoded.
    #[error("failed to decode request body: {0}")]
    Decode(#[source] serde_json::Error),
    /// The response body could not be encoded.
    #[error("failed to encode response body: {0}")]
    Encode(#[source] serde_json::Error),
    /// The request body could not be read.
    #[error("failed to read request body: {0}")]
    Body(#[source] BoxError),
    /// Unexpected IO error while serving a file.
    #[error(transparent)]
    Io(#[from] IoError),
    /// A response could not be assembled.
    #[error(transparent)]
    Http(#[from] http::Error),
    /// A route handler failed.
    #[error("handler failed: {0}")]
    Handler(#[source] BoxError),
}

impl Error {
    /// Wrap an arbitrary handler error.
    pub fn handler(err: impl Into<BoxError>) -> Self {
        Error::Handler(err.into())
    }

    /// The HTTP status this error is surfaced as.
    pub fn status(&self) -> StatusCode {
        match self {
            Error::NoRoute { .. } | Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::Forbidden(_) => StatusCode::FORBIDDEN,
            Error::Decode(_) | Error::Body(_) => StatusCode::BAD_REQUEST,
            Error::Encode(_) | Error::Io(_) | Error::Http(_) | Error::Handler(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Whether this is the router's "no matching route" signal.
    pub fn is_no_route(&self) -> bool {
        matches!(self, Error::NoRoute { .. })
    }

    /// Render the error as a bodiless response carrying its status.
    pub fn into_response(self) -> Response {
        let mut res = Response::new(Body::Empty);
        *res.status_mut() = self.status();
        res
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_variants_to_statuses() {
        let no_route = Error::NoRoute {
            method: Method::GET,
            path: "/missing".into(),
        };
        assert!(no_route.is_no_route());
        assert_eq!(no_route.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            Error::Forbidden("/../etc".into()).status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            Error::NotFound("/gone".into()).into_response().status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            Error::handler("boom").status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert!(!Error::handler("boom").is_no_route());
    }
}
