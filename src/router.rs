//! Method and path based request routing.
//!
//! Patterns are split on `/` into literal segments and `:name` parameter segments. A pattern
//! matches a request path with the same number of segments when every literal is equal and
//! every parameter segment is non-empty. When several routes match, the one registered first
//! wins; registration order is the only precedence rule.

use std::fmt;
use std::future::Future;

use futures_util::future::BoxFuture;
use http::Method;
use tracing::trace;

use crate::chain::{Responder, ResponseFuture};
use crate::{Error, Request, Response};

/// Future returned by a route handler.
pub type HandlerFuture = BoxFuture<'static, Result<Response, Error>>;

/// A route handler.
///
/// Implemented for any `Fn(Request) -> impl Future<Output = Result<Response, Error>>`, so plain
/// async functions can be registered directly. Path parameters of the matched route are
/// available through `RequestExt::params`.
pub trait Handler: Send + Sync + 'static {
    /// Handle a request that matched this route.
    fn call(&self, req: Request) -> HandlerFuture;
}

impl<F, Fut> Handler for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Response, Error>> + Send + 'static,
{
    fn call(&self, req: Request) -> HandlerFuture {
        Box::pin(self(req))
    }
}

/// Path parameters bound by a matched route, in pattern order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Params(Vec<(String, String)>);

impl Params {
    /// Create an empty set of parameters.
    pub const fn new() -> Self {
        Params(Vec::new())
    }

    /// Value bound to the parameter `name`, if any.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Iterate over `(name, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of bound parameters.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no parameters were bound.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Param(String),
}

/// A parsed route pattern, such as `/user/:name`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PathPattern {
    raw: String,
    segments: Vec<Segment>,
}

fn split_segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|segment| !segment.is_empty())
}

impl PathPattern {
    /// Parse a pattern. Segments starting with `:` bind a parameter of that name.
    pub fn parse(pattern: &str) -> Self {
        let segments = split_segments(pattern)
            .map(|segment| match segment.strip_prefix(':') {
                Some(name) if !name.is_empty() => Segment::Param(name.to_owned()),
                _ => Segment::Literal(segment.to_owned()),
            })
            .collect();
        PathPattern {
            raw: pattern.to_owned(),
            segments,
        }
    }

    /// The pattern as registered.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Match already split request path segments, binding parameters.
    fn match_segments(&self, segments: &[&str]) -> Option<Params> {
        if segments.len() != self.segments.len() {
            return None;
        }
        let mut params = Params::new();
        for (pattern, segment) in self.segments.iter().zip(segments) {
            match pattern {
                Segment::Literal(literal) if literal == segment => {}
                Segment::Literal(_) => return None,
                Segment::Param(name) => {
                    let value = percent_encoding::percent_decode_str(segment)
                        .decode_utf8_lossy()
                        .into_owned();
                    params.0.push((name.clone(), value));
                }
            }
        }
        Some(params)
    }

    /// Match a request path against this pattern.
    pub fn matches(&self, path: &str) -> Option<Params> {
        let segments: Vec<&str> = split_segments(path).collect();
        self.match_segments(&segments)
    }
}

/// A registered method and pattern, with the handler serving it.
pub struct Route {
    method: Method,
    pattern: PathPattern,
    handler: Box<dyn Handler>,
}

impl Route {
    /// Method this route answers to.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Pattern this route matches.
    pub fn pattern(&self) -> &PathPattern {
        &self.pattern
    }

    /// Run the handler for a request.
    pub fn call(&self, req: Request) -> HandlerFuture {
        self.handler.call(req)
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("method", &self.method)
            .field("pattern", &self.pattern.raw)
            .finish_non_exhaustive()
    }
}

/// Outcome of looking up a request in the route table.
#[derive(Debug)]
pub enum RouteMatch<'a> {
    /// A route matched, with its bound parameters.
    Matched {
        /// The matched route.
        route: &'a Route,
        /// Parameters bound from the request path.
        params: Params,
    },
    /// No registered route matches.
    NoMatch,
}

/// Route table and terminal responder of a chain.
///
/// Routes are registered up front and never change afterwards. As a `Responder`, the router
/// runs the matched handler, or fails with `Error::NoRoute` so middleware can fall back.
#[derive(Debug, Default)]
pub struct Router {
    routes: Vec<Route>,
}

impl Router {
    /// Create an empty router.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for a method and pattern.
    pub fn route(&mut self, method: Method, pattern: &str, handler: impl Handler) -> &mut Self {
        self.routes.push(Route {
            method,
            pattern: PathPattern::parse(pattern),
            handler: Box::new(handler),
        });
        self
    }

    /// Register a `GET` handler.
    pub fn get(&mut self, pattern: &str, handler: impl Handler) -> &mut Self {
        self.route(Method::GET, pattern, handler)
    }

    /// Register a `POST` handler.
    pub fn post(&mut self, pattern: &str, handler: impl Handler) -> &mut Self {
        self.route(Method::POST, pattern, handler)
    }

    /// Register a `PUT` handler.
    pub fn put(&mut self, pattern: &str, handler: impl Handler) -> &mut Self {
        self.route(Method::PUT, pattern, handler)
    }

    /// Register a `DELETE` handler.
    pub fn delete(&mut self, pattern: &str, handler: impl Handler) -> &mut Self {
        self.route(Method::DELETE, pattern, handler)
    }

    /// Registered routes, in precedence order.
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// Find the first registered route matching the method and path.
    pub fn find(&self, method: &Method, path: &str) -> RouteMatch<'_> {
        let segments: Vec<&str> = split_segments(path).collect();
        self.routes
            .iter()
            .filter(|route| route.method == *method)
            .find_map(|route| {
                route
                    .pattern
                    .match_segments(&segments)
                    .map(|params| RouteMatch::Matched { route, params })
            })
            .unwrap_or(RouteMatch::NoMatch)
    }
}

impl Responder for Router {
    fn respond(&self, mut req: Request) -> ResponseFuture<'_> {
        match self.find(req.method(), req.uri().path()) {
            RouteMatch::Matched { route, params } => {
                trace!(pattern = route.pattern.as_str(), "route matched");
                req.extensions_mut().insert(params);
                route.call(req)
            }
            RouteMatch::NoMatch => {
                let err = Error::NoRoute {
                    method: req.method().clone(),
                    path: req.uri().path().to_owned(),
                };
                Box::pin(async move { Err(err) })
            }
        }
    }
}
