use std::path::{Component, Path, PathBuf};

#[inline]
fn decode_percents(string: &str) -> String {
    percent_encoding::percent_decode_str(string)
        .decode_utf8_lossy()
        .into_owned()
}

/// A segment is acceptable only if it maps onto exactly one plain path component.
///
/// Parsing again catches a segment that hides a Windows drive letter or separator, e.g.
/// `/anypath/c:/windows/win.ini`.
fn is_plain_segment(segment: &str) -> bool {
    !segment.contains('\0')
        && Path::new(segment)
            .components()
            .all(|c| matches!(c, Component::Normal(_)))
}

/// Sanitized request path, relative to the public directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestedPath {
    /// Relative filesystem path, without a leading separator.
    pub sanitized: PathBuf,
    /// Whether a directory was requested. (The request path ends with a slash.)
    pub is_dir_request: bool,
}

impl RequestedPath {
    /// Sanitize a URL path, or return `None` if it attempts to traverse out of the root.
    ///
    /// The path is percent-decoded first, so `..%2f` counts as traversal too. Empty and `.`
    /// segments are dropped, which also strips the leading separator.
    pub fn parse(request_path: &str) -> Option<Self> {
        let decoded = decode_percents(request_path);
        let is_dir_request = decoded.ends_with('/');

        let mut sanitized = PathBuf::new();
        for segment in decoded.split('/') {
            match segment {
                "" | "." => {}
                ".." => return None,
                segment if is_plain_segment(segment) => sanitized.push(segment),
                _ => return None,
            }
        }

        Some(RequestedPath {
            sanitized,
            is_dir_request,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_leading_separator() {
        let path = RequestedPath::parse("/css/site.css").unwrap();
        assert_eq!(path.sanitized, PathBuf::from("css/site.css"));
        assert!(!path.is_dir_request);
    }

    #[test]
    fn root_is_a_directory_request() {
        let path = RequestedPath::parse("/").unwrap();
        assert_eq!(path.sanitized, PathBuf::new());
        assert!(path.is_dir_request);
    }

    #[test]
    fn decodes_percent_notation() {
        let path = RequestedPath::parse("/has%20space.html").unwrap();
        assert_eq!(path.sanitized, PathBuf::from("has space.html"));
    }

    #[test]
    fn rejects_traversal() {
        assert_eq!(RequestedPath::parse("/../etc/passwd"), None);
        assert_eq!(RequestedPath::parse("/xxx/../index.html"), None);
        assert_eq!(RequestedPath::parse("/xxx/..%2f..%2fsecret"), None);
        assert_eq!(RequestedPath::parse("/.."), None);
        assert_eq!(RequestedPath::parse("/%2e%2e/secret"), None);
        assert_eq!(RequestedPath::parse("/nul%00byte"), None);
    }

    #[test]
    fn keeps_dots_inside_names() {
        let path = RequestedPath::parse("/./archive..tar/v1.2").unwrap();
        assert_eq!(path.sanitized, PathBuf::from("archive..tar/v1.2"));
    }
}
