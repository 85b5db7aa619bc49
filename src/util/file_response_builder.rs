use http::response::Builder as ResponseBuilder;
use http::{header, HeaderMap, Method, Request, Result, StatusCode};

use crate::cache::{evaluate, CacheDecision, Conditions};
use crate::config::DEFAULT_CHUNK_SIZE;
use crate::resolve::FileResource;
use crate::util::FileBytesStream;
use crate::{Body, Response};

/// Utility to build full responses for a resolved `FileResource`.
///
/// This struct allows direct access to its fields, but these fields are typically initialized by
/// the accessors, using the builder pattern. The fields are basically a bunch of settings that
/// determine the response details.
#[derive(Clone, Debug)]
pub struct FileResponseBuilder {
    /// Whether to send cache headers, and what lifespan to indicate.
    pub cache_headers: Option<u32>,
    /// Whether this is a `HEAD` request, with no response body.
    pub is_head: bool,
    /// Conditional headers of the request.
    pub conditions: Conditions,
    /// Size of the pieces the body is streamed in.
    pub chunk_size: usize,
}

impl Default for FileResponseBuilder {
    fn default() -> Self {
        Self {
            cache_headers: None,
            is_head: false,
            conditions: Conditions::default(),
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

impl FileResponseBuilder {
    /// Create a new builder with a default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new builder for the given request.
    pub fn from_request<B>(req: &Request<B>) -> Self {
        let mut builder = Self::new();
        builder.method(req.method());
        builder.headers(req.headers());
        builder
    }

    /// Add cache headers to responses for the given lifespan.
    pub fn cache_headers(&mut self, value: Option<u32>) -> &mut Self {
        self.cache_headers = value;
        self
    }

    /// Build responses for the given request method.
    pub fn method(&mut self, value: &Method) -> &mut Self {
        self.is_head = *value == Method::HEAD;
        self
    }

    /// Build responses for the conditional headers in the given request headers.
    pub fn headers(&mut self, value: &HeaderMap) -> &mut Self {
        self.conditions = Conditions::from_headers(value);
        self
    }

    /// Stream the body in pieces of the given size.
    pub fn chunk_size(&mut self, value: usize) -> &mut Self {
        self.chunk_size = value;
        self
    }

    /// Build a response for the given file, honoring the conditional headers.
    pub fn build(&self, resource: FileResource) -> Result<Response> {
        let validator = resource.validator();

        if evaluate(&validator, &self.conditions) == CacheDecision::UseCached {
            return ResponseBuilder::new()
                .status(StatusCode::NOT_MODIFIED)
                .header(header::ETAG, validator.etag())
                .body(Body::Empty);
        }

        let mut res = ResponseBuilder::new()
            .status(StatusCode::OK)
            .header(header::CONTENT_LENGTH, resource.size)
            .header(header::CONTENT_TYPE, resource.mime.as_ref())
            .header(header::ACCEPT_RANGES, "bytes")
            .header(header::ETAG, validator.etag());
        if let Some(last_modified) = validator.last_modified() {
            res = res.header(header::LAST_MODIFIED, last_modified);
        }
        if let Some(seconds) = self.cache_headers {
            res = res.header(header::CACHE_CONTROL, format!("public, max-age={seconds}"));
        }

        res.body(if self.is_head {
            Body::Empty
        } else {
            Body::Full(FileBytesStream::with_chunk_size(
                resource.file,
                self.chunk_size,
            ))
        })
    }
}
