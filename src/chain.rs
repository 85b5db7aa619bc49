//! Middleware composition.
//!
//! A `Chain` is an ordered list of middleware in front of a terminal `Responder`, usually a
//! `Router`. The first middleware added is the outermost: it sees the request first and the
//! response last. Each middleware decides whether to answer itself, or to call `Next::run` and
//! pass on, transform, or recover from what the rest of the chain produced.

use futures_util::future::BoxFuture;

use crate::{Error, Request, Response};

/// Future returned by responders and middleware, borrowing from them.
pub type ResponseFuture<'a> = BoxFuture<'a, Result<Response, Error>>;

/// Anything that turns a request into a response.
pub trait Responder: Send + Sync {
    /// Respond to a request.
    fn respond(&self, req: Request) -> ResponseFuture<'_>;
}

/// A request-handling unit that may delegate to the rest of the chain.
pub trait Middleware: Send + Sync {
    /// Respond to a request, optionally through `next`.
    fn respond<'a>(&'a self, req: Request, next: Next<'a>) -> ResponseFuture<'a>;
}

/// The remainder of a chain, as seen from inside a middleware.
#[derive(Clone, Copy)]
pub struct Next<'a> {
    middleware: &'a [Box<dyn Middleware>],
    endpoint: &'a dyn Responder,
}

impl<'a> Next<'a> {
    /// Pass the request on to the rest of the chain.
    pub fn run(self, req: Request) -> ResponseFuture<'a> {
        match self.middleware.split_first() {
            Some((current, rest)) => current.respond(
                req,
                Next {
                    middleware: rest,
                    endpoint: self.endpoint,
                },
            ),
            None => self.endpoint.respond(req),
        }
    }
}

/// Middleware layered over a terminal responder.
pub struct Chain<R> {
    middleware: Vec<Box<dyn Middleware>>,
    endpoint: R,
}

impl<R: Responder> Chain<R> {
    /// Create a chain with no middleware in front of `endpoint`.
    pub fn new(endpoint: R) -> Self {
        Self {
            middleware: Vec::new(),
            endpoint,
        }
    }

    /// Add a middleware inside the ones already added.
    pub fn with(mut self, middleware: impl Middleware + 'static) -> Self {
        self.middleware.push(Box::new(middleware));
        self
    }

    /// The terminal responder.
    pub fn endpoint(&self) -> &R {
        &self.endpoint
    }
}

impl<R: Responder> Responder for Chain<R> {
    fn respond(&self, req: Request) -> ResponseFuture<'_> {
        Next {
            middleware: &self.middleware,
            endpoint: &self.endpoint,
        }
        .run(req)
    }
}
