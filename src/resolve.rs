use std::io::{Error as IoError, ErrorKind as IoErrorKind};
use std::path::PathBuf;
use std::time::SystemTime;

use mime_guess::{Mime, MimeGuess};
use tokio::fs::File;

use crate::cache::Validator;
use crate::config::FileConfig;
use crate::util::{open_with_metadata, FileWithMetadata, RequestedPath};

/// A file found under the public directory, opened and ready to serve.
#[derive(Debug)]
pub struct FileResource {
    /// Path the file was opened from.
    pub path: PathBuf,
    /// Open file handle.
    pub file: File,
    /// Size in bytes.
    pub size: u64,
    /// Last modification time, if the filesystem reports one.
    pub modified: Option<SystemTime>,
    /// Content type guessed from the extension.
    pub mime: Mime,
}

impl FileResource {
    /// The cache validator identifying this state of the file.
    pub fn validator(&self) -> Validator {
        Validator::new(self.size, self.modified)
    }
}

/// The result of `resolve`.
#[derive(Debug)]
pub enum ResolveResult {
    /// The request path tried to escape the public directory, or the file is not readable.
    Forbidden,
    /// No file exists at the resolved path.
    NotFound,
    /// The requested file was found.
    Found(FileResource),
}

/// Some IO errors are expected when serving files, and mapped to a regular result here.
fn map_open_err(err: IoError) -> Result<ResolveResult, IoError> {
    match err.kind() {
        IoErrorKind::NotFound | IoErrorKind::NotADirectory => Ok(ResolveResult::NotFound),
        IoErrorKind::PermissionDenied => Ok(ResolveResult::Forbidden),
        _ => Err(err),
    }
}

fn found(path: PathBuf, opened: FileWithMetadata) -> ResolveResult {
    let mime = MimeGuess::from_path(&path).first_or_octet_stream();
    ResolveResult::Found(FileResource {
        path,
        file: opened.handle,
        size: opened.size,
        modified: opened.modified,
        mime,
    })
}

/// Resolve a URL path to a file under the configured public directory.
///
/// The path is rejected as `Forbidden` if it contains a parent-directory segment, before the
/// filesystem is touched. Otherwise the leading separator is stripped and the rest is appended
/// to the public directory. A directory is served through the configured index file.
///
/// The returned future may error for unexpected IO errors, passing on the `std::io::Error`.
/// Missing files and permission errors are reflected in the result instead.
pub async fn resolve(config: &FileConfig, request_path: &str) -> Result<ResolveResult, IoError> {
    match RequestedPath::parse(request_path) {
        Some(requested) => resolve_path(config, &requested).await,
        None => Ok(ResolveResult::Forbidden),
    }
}

/// Resolve an already sanitized request path.
///
/// This is the part of `resolve` after the traversal check, for callers that already hold a
/// `RequestedPath`.
pub async fn resolve_path(
    config: &FileConfig,
    requested: &RequestedPath,
) -> Result<ResolveResult, IoError> {
    let mut full_path = config.full_path(&requested.sanitized);

    let opened = match open_with_metadata(full_path.clone()).await {
        Ok(opened) => opened,
        Err(err) => return map_open_err(err),
    };

    if !opened.is_dir {
        // A trailing slash names a directory, which this is not.
        if requested.is_dir_request {
            return Ok(ResolveResult::NotFound);
        }
        return Ok(found(full_path, opened));
    }

    let Some(index_file) = config.index_file() else {
        return Ok(ResolveResult::NotFound);
    };
    full_path.push(index_file);
    let opened = match open_with_metadata(full_path.clone()).await {
        Ok(opened) => opened,
        Err(err) => return map_open_err(err),
    };

    // The directory index cannot itself be a directory.
    if opened.is_dir {
        return Ok(ResolveResult::NotFound);
    }

    Ok(found(full_path, opened))
}
