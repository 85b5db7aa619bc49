use std::convert::Infallible;
use std::sync::Arc;

use futures_util::future::BoxFuture;
use http_body_util::BodyExt;
use hyper::service::Service;
use tracing::error;

use crate::chain::{Chain, Responder};
use crate::router::Router;
use crate::{BoxError, Error, Request, Response};

/// High-level entry point: a `Chain` shared behind an `Arc`, usable as a `hyper` service.
///
/// The request body is collected in full before dispatch, then the request runs through the
/// chain. Errors that reach this point are answered with the status `Error::status` gives, so
/// the service itself never fails.
pub struct App<R = Router> {
    chain: Arc<Chain<R>>,
}

impl<R> Clone for App<R> {
    fn clone(&self) -> Self {
        Self {
            chain: Arc::clone(&self.chain),
        }
    }
}

impl<R: Responder> App<R> {
    /// Wrap a chain.
    pub fn new(chain: Chain<R>) -> Self {
        Self {
            chain: Arc::new(chain),
        }
    }

    /// Serve an already collected request.
    pub async fn serve(&self, req: Request) -> Response {
        match self.chain.respond(req).await {
            Ok(res) => res,
            Err(err) => {
                if err.status().is_server_error() {
                    error!(error = %err, "request failed");
                }
                err.into_response()
            }
        }
    }
}

impl<R, B> Service<http::Request<B>> for App<R>
where
    R: Responder + 'static,
    B: hyper::body::Body + Send + 'static,
    B::Data: Send,
    B::Error: Into<BoxError>,
{
    type Response = Response;
    type Error = Infallible;
    type Future = BoxFuture<'static, Result<Response, Infallible>>;

    fn call(&self, request: http::Request<B>) -> Self::Future {
        let app = self.clone();
        Box::pin(async move {
            let (parts, body) = request.into_parts();
            let body = match body.collect().await {
                Ok(collected) => collected.to_bytes(),
                Err(err) => return Ok(Error::Body(err.into()).into_response()),
            };
            Ok(app.serve(Request::from_parts(parts, body)).await)
        })
    }
}
