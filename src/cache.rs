//! Cache validators and conditional request evaluation.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use http::{header, HeaderMap};

/// Identifies one state of a file, for cache revalidation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Validator {
    etag: String,
    last_modified: Option<SystemTime>,
}

impl Validator {
    /// Build the validator for a file of the given size and modification time.
    pub fn new(size: u64, modified: Option<SystemTime>) -> Self {
        let etag = match modified {
            Some(modified) => {
                let since_epoch = modified
                    .duration_since(UNIX_EPOCH)
                    .unwrap_or(Duration::ZERO);
                format!(
                    "W/\"{0:x}-{1:x}.{2:x}\"",
                    size,
                    since_epoch.as_secs(),
                    since_epoch.subsec_nanos()
                )
            }
            None => format!("W/\"{size:x}\""),
        };
        Self {
            etag,
            last_modified: modified,
        }
    }

    /// The `ETag` header value.
    pub fn etag(&self) -> &str {
        &self.etag
    }

    /// The `Last-Modified` header value, if the modification time is known.
    pub fn last_modified(&self) -> Option<String> {
        self.last_modified.map(httpdate::fmt_http_date)
    }

    fn modified_secs(&self) -> Option<u64> {
        self.last_modified
            .and_then(|modified| modified.duration_since(UNIX_EPOCH).ok())
            .map(|since_epoch| since_epoch.as_secs())
    }
}

/// Conditional headers sent by the client.
#[derive(Clone, Debug, Default)]
pub struct Conditions {
    /// Raw `If-None-Match` value.
    pub if_none_match: Option<String>,
    /// Parsed `If-Modified-Since` value.
    pub if_modified_since: Option<SystemTime>,
}

impl Conditions {
    /// Read the conditional headers from a request. Unparseable values are ignored.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        Self {
            if_none_match: headers
                .get(header::IF_NONE_MATCH)
                .and_then(|v| v.to_str().ok())
                .map(str::to_owned),
            if_modified_since: headers
                .get(header::IF_MODIFIED_SINCE)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| httpdate::parse_http_date(v).ok()),
        }
    }
}

/// What to send back for a file the client may already have.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CacheDecision {
    /// The client copy is current; respond 304 without a body.
    UseCached,
    /// Respond with the full file.
    ServeFull,
}

/// Compare the client's validators against the file's.
///
/// `If-None-Match` wins when present, using weak comparison. Only without it is
/// `If-Modified-Since` considered, at one second precision since that is all an HTTP date
/// carries.
pub fn evaluate(validator: &Validator, conditions: &Conditions) -> CacheDecision {
    if let Some(ref if_none_match) = conditions.if_none_match {
        return if etag_matches(if_none_match, validator.etag()) {
            CacheDecision::UseCached
        } else {
            CacheDecision::ServeFull
        };
    }

    match (conditions.if_modified_since, validator.modified_secs()) {
        (Some(since), Some(modified)) => {
            let since = since
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_secs())
                .unwrap_or(0);
            if modified <= since {
                CacheDecision::UseCached
            } else {
                CacheDecision::ServeFull
            }
        }
        _ => CacheDecision::ServeFull,
    }
}

fn opaque_tag(tag: &str) -> &str {
    let tag = tag.trim();
    tag.strip_prefix("W/").unwrap_or(tag)
}

fn etag_matches(if_none_match: &str, etag: &str) -> bool {
    let etag = opaque_tag(etag);
    if_none_match
        .split(',')
        .map(str::trim)
        .any(|candidate| candidate == "*" || opaque_tag(candidate) == etag)
}
