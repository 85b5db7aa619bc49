//! Single byte-range requests.
//!
//! Only the `bytes=<start>-<end>` form is served as partial content. Open-ended, suffix and
//! multi-range forms are not errors: `parse_range` returns `None` for them and the request is
//! handled as if no `Range` header was sent.

use std::cmp::min;

use http::response::Builder as ResponseBuilder;
use http::{header, HeaderMap, StatusCode};
use http_range::HttpRange;

use crate::resolve::FileResource;
use crate::util::FileBytesStreamRange;
use crate::{Body, Response};

/// An inclusive byte range. `parse_range` only produces ranges with `start <= end`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RangeSpec {
    /// Offset of the first byte.
    pub start: u64,
    /// Offset of the last byte.
    pub end: u64,
}

impl RangeSpec {
    /// Number of bytes requested, or zero when `start > end`.
    ///
    /// Saturates at `u64::MAX` for the range covering every offset.
    pub fn length(&self) -> u64 {
        if self.start > self.end {
            return 0;
        }
        (self.end - self.start).saturating_add(1)
    }
}

fn parse_offset(value: &str) -> Option<u64> {
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    value.parse().ok()
}

/// Parse a `Range` header value of the form `bytes=<start>-<end>`.
///
/// Returns `None` for every other form, and for ranges that would be empty (`start > end`).
pub fn parse_range(value: &str) -> Option<RangeSpec> {
    let spec = value.strip_prefix("bytes=")?;
    let (start, end) = spec.split_once('-')?;
    let start = parse_offset(start)?;
    let end = parse_offset(end)?;
    if start > end {
        return None;
    }
    Some(RangeSpec { start, end })
}

/// Read and parse the `Range` header from a request.
pub fn range_header(headers: &HeaderMap) -> Option<RangeSpec> {
    headers
        .get(header::RANGE)
        .and_then(|v| v.to_str().ok())
        .and_then(parse_range)
}

/// Build a partial-content response for `spec` of the resource.
///
/// An end past the last byte is clamped to the file size. A start past the last byte cannot be
/// served at all and yields `416 Range Not Satisfiable`. An empty range (`start > end`) is not
/// served as partial content; `None` tells the caller to answer as if no range was requested.
pub fn serve_range(
    resource: FileResource,
    spec: RangeSpec,
    chunk_size: usize,
    is_head: bool,
) -> Result<Option<Response>, http::Error> {
    if spec.length() == 0 {
        return Ok(None);
    }

    let total = resource.size;
    if spec.start >= total {
        return ResponseBuilder::new()
            .status(StatusCode::RANGE_NOT_SATISFIABLE)
            .header(header::CONTENT_RANGE, format!("bytes */{total}"))
            .header(header::ACCEPT_RANGES, "bytes")
            .body(Body::Empty)
            .map(Some);
    }

    let end = min(spec.end, total - 1);
    let length = end - spec.start + 1;
    let validator = resource.validator();

    let mut res = ResponseBuilder::new()
        .status(StatusCode::PARTIAL_CONTENT)
        .header(header::CONTENT_LENGTH, length)
        .header(
            header::CONTENT_RANGE,
            format!("bytes {}-{}/{}", spec.start, end, total),
        )
        .header(header::ACCEPT_RANGES, "bytes")
        .header(header::CONTENT_TYPE, resource.mime.as_ref())
        .header(header::ETAG, validator.etag());
    if let Some(last_modified) = validator.last_modified() {
        res = res.header(header::LAST_MODIFIED, last_modified);
    }

    let range = HttpRange {
        start: spec.start,
        length,
    };
    res.body(if is_head {
        Body::Empty
    } else {
        Body::Range(FileBytesStreamRange::new(resource.file, range, chunk_size))
    })
    .map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;

    #[test]
    fn parses_closed_range() {
        let spec = parse_range("bytes=0-9").unwrap();
        assert_eq!(spec, RangeSpec { start: 0, end: 9 });
        assert_eq!(spec.length(), 10);
        assert_eq!(parse_range("bytes=5-5").map(|s| s.length()), Some(1));
    }

    #[test]
    fn ignores_unsupported_forms() {
        assert_eq!(parse_range("bytes=500-"), None);
        assert_eq!(parse_range("bytes=-500"), None);
        assert_eq!(parse_range("bytes=0-9,20-29"), None);
        assert_eq!(parse_range("items=0-9"), None);
        assert_eq!(parse_range("bytes=a-b"), None);
        assert_eq!(parse_range("bytes=+1-5"), None);
        assert_eq!(parse_range("bytes=1-2-3"), None);
        assert_eq!(parse_range("bytes=99999999999999999999-1"), None);
    }

    #[test]
    fn ignores_empty_ranges() {
        assert_eq!(parse_range("bytes=10-9"), None);
        assert_eq!(RangeSpec { start: 10, end: 9 }.length(), 0);
    }

    #[test]
    fn length_saturates_at_largest_offset() {
        let spec = parse_range("bytes=0-18446744073709551615").unwrap();
        assert_eq!(spec.end, u64::MAX);
        assert_eq!(spec.length(), u64::MAX);
        assert_eq!(parse_range("bytes=1-18446744073709551615").unwrap().length(), u64::MAX);
    }

    #[test]
    fn reads_header() {
        let mut headers = HeaderMap::new();
        assert_eq!(range_header(&headers), None);
        headers.insert(header::RANGE, HeaderValue::from_static("bytes=2-4"));
        assert_eq!(range_header(&headers), Some(RangeSpec { start: 2, end: 4 }));
    }
}
