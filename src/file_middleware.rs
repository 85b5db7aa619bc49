use http::{Method, StatusCode};
use tracing::{debug, warn};

use crate::chain::{Middleware, Next, ResponseFuture};
use crate::config::FileConfig;
use crate::range::{range_header, serve_range, RangeSpec};
use crate::resolve::{resolve_path, ResolveResult};
use crate::util::{FileResponseBuilder, RequestedPath};
use crate::{Error, Request, Response};

/// Serves files from a public directory around the rest of the chain.
///
/// For `GET` and `HEAD` requests:
///
/// - A well-formed `Range: bytes=<start>-<end>` header is answered directly from the file with
///   `206 Partial Content`, without consulting the router. If there is no such file, the
///   request continues as if there was no `Range` header.
/// - Otherwise the request goes down the chain. If the router reports that no route matched,
///   the file is served instead, honoring `If-None-Match` and `If-Modified-Since`. A missing
///   file is `Error::NotFound`.
///
/// Request paths containing a `..` segment are always `Error::Forbidden`. Errors other than
/// the router's `NoRoute` pass through untouched, and so does `NoRoute` for other methods.
#[derive(Clone, Debug)]
pub struct FileMiddleware {
    config: FileConfig,
}

impl FileMiddleware {
    /// Create a middleware serving files according to `config`.
    pub fn new(config: FileConfig) -> Self {
        Self { config }
    }

    /// The configuration this middleware serves with.
    pub fn config(&self) -> &FileConfig {
        &self.config
    }

    async fn serve(&self, req: Request, next: Next<'_>) -> Result<Response, Error> {
        let path = req.uri().path().to_owned();
        let Some(requested) = RequestedPath::parse(&path) else {
            warn!(path = %path, "blocked path traversal attempt");
            return Err(Error::Forbidden(path));
        };

        let is_head = match *req.method() {
            Method::HEAD => true,
            Method::GET => false,
            _ => return next.run(req).await,
        };

        if let Some(spec) = range_header(req.headers()) {
            if let Some(res) = self.serve_partial(&requested, &path, spec, is_head).await? {
                return Ok(res);
            }
        }

        let mut builder = FileResponseBuilder::from_request(&req);
        builder
            .cache_headers(self.config.cache_headers())
            .chunk_size(self.config.chunk_size());

        match next.run(req).await {
            Err(Error::NoRoute { .. }) => {
                debug!(path = %path, "no route matched, looking in public directory");
                match resolve_path(&self.config, &requested).await? {
                    ResolveResult::Found(resource) => Ok(builder.build(resource)?),
                    ResolveResult::NotFound => {
                        debug!(path = %path, "file not found");
                        Err(Error::NotFound(path))
                    }
                    ResolveResult::Forbidden => Err(Error::Forbidden(path)),
                }
            }
            other => other,
        }
    }

    /// Answer a range request from the file, or `None` to continue without the range.
    async fn serve_partial(
        &self,
        requested: &RequestedPath,
        path: &str,
        spec: RangeSpec,
        is_head: bool,
    ) -> Result<Option<Response>, Error> {
        let resource = match resolve_path(&self.config, requested).await? {
            ResolveResult::Found(resource) => resource,
            ResolveResult::NotFound => return Ok(None),
            ResolveResult::Forbidden => return Err(Error::Forbidden(path.to_owned())),
        };

        let res = serve_range(resource, spec, self.config.chunk_size(), is_head)?;
        if let Some(ref res) = res {
            if res.status() == StatusCode::PARTIAL_CONTENT {
                debug!(path, start = spec.start, end = spec.end, "served partial content");
            }
        }
        Ok(res)
    }
}

impl Middleware for FileMiddleware {
    fn respond<'a>(&'a self, req: Request, next: Next<'a>) -> ResponseFuture<'a> {
        Box::pin(self.serve(req, next))
    }
}
