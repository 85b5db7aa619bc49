use std::fs::OpenOptions;
use std::io::{Error, ErrorKind};
use std::path::PathBuf;
use std::time::SystemTime;

use tokio::{fs::File, task::spawn_blocking};

#[cfg(windows)]
use std::os::windows::fs::OpenOptionsExt;
#[cfg(windows)]
use winapi::um::winbase::FILE_FLAG_BACKUP_SEMANTICS;

/// Open file handle with the metadata needed to build a response.
#[derive(Debug)]
pub struct FileWithMetadata {
    /// Open file handle.
    pub handle: File,
    /// Size in bytes.
    pub size: u64,
    /// Last modification time.
    pub modified: Option<SystemTime>,
    /// Whether this is a directory.
    pub is_dir: bool,
}

/// Open a file and read its metadata in one blocking task.
///
/// Using the tokio async functions for both would amount to two `spawn_blocking` calls.
pub async fn open_with_metadata(path: PathBuf) -> Result<FileWithMetadata, Error> {
    spawn_blocking(move || {
        let mut opts = OpenOptions::new();
        opts.read(true);

        // On Windows, we need to set this flag to be able to open directories.
        #[cfg(windows)]
        opts.custom_flags(FILE_FLAG_BACKUP_SEMANTICS);

        let handle = opts.open(path)?;
        let metadata = handle.metadata()?;
        Ok(FileWithMetadata {
            handle: File::from_std(handle),
            size: metadata.len(),
            modified: metadata.modified().ok(),
            is_dir: metadata.is_dir(),
        })
    })
    .await
    .unwrap_or_else(|_| Err(Error::new(ErrorKind::Other, "background task failed")))
}
