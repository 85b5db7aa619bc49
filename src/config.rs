use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer};

/// Default size of the pieces file bodies are streamed in.
pub const DEFAULT_CHUNK_SIZE: usize = 32 * 1024;

const DEFAULT_CHUNK_SIZE_NONZERO: NonZeroUsize = match NonZeroUsize::new(DEFAULT_CHUNK_SIZE) {
    Some(size) => size,
    None => panic!("DEFAULT_CHUNK_SIZE must be non-zero"),
};

const DEFAULT_INDEX_FILE: &str = "index.html";

/// Settings for `FileMiddleware`.
///
/// Built with `FileConfig::new` and the builder-style setters, or deserialized as part of a
/// larger application config. Missing fields take their defaults:
///
/// ```toml
/// public_dir = "assets"
/// chunk_size = 65536
/// cache_headers = 3600
/// index_file = "index.html"
/// ```
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    #[serde(deserialize_with = "deserialize_public_dir")]
    public_dir: String,
    chunk_size: NonZeroUsize,
    cache_headers: Option<u32>,
    index_file: Option<String>,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self::new("public")
    }
}

impl FileConfig {
    /// Create a configuration serving files from `public_dir`.
    ///
    /// The directory may be absolute or relative. An empty string serves from the current
    /// directory.
    pub fn new(public_dir: impl AsRef<str>) -> Self {
        Self {
            public_dir: normalize_public_dir(public_dir.as_ref()),
            chunk_size: DEFAULT_CHUNK_SIZE_NONZERO,
            cache_headers: None,
            index_file: Some(DEFAULT_INDEX_FILE.to_owned()),
        }
    }

    /// The public directory, always ending in exactly one `/`.
    pub fn public_dir(&self) -> &str {
        &self.public_dir
    }

    /// Size of the pieces file bodies are streamed in.
    pub fn chunk_size(&self) -> usize {
        self.chunk_size.get()
    }

    /// Lifespan announced in `Cache-Control`, if any.
    pub fn cache_headers(&self) -> Option<u32> {
        self.cache_headers
    }

    /// File served when a directory is requested.
    pub fn index_file(&self) -> Option<&str> {
        self.index_file.as_deref()
    }

    /// Stream file bodies in pieces of the given size.
    pub fn set_chunk_size(&mut self, value: NonZeroUsize) -> &mut Self {
        self.chunk_size = value;
        self
    }

    /// Add cache headers to responses for the given lifespan.
    pub fn set_cache_headers(&mut self, value: Option<u32>) -> &mut Self {
        self.cache_headers = value;
        self
    }

    /// Serve this file for directory requests, or nothing if `None`.
    pub fn set_index_file(&mut self, value: Option<String>) -> &mut Self {
        self.index_file = value;
        self
    }

    /// Map a sanitized relative path onto the public directory.
    pub fn full_path(&self, relative: &Path) -> PathBuf {
        Path::new(&self.public_dir).join(relative)
    }
}

/// Make sure the directory ends with exactly one separator, so request paths can be appended.
pub fn normalize_public_dir(dir: &str) -> String {
    let trimmed = dir.trim_end_matches('/');
    if trimmed.is_empty() {
        return if dir.is_empty() { "./" } else { "/" }.to_owned();
    }
    let mut normalized = trimmed.to_owned();
    normalized.push('/');
    normalized
}

fn deserialize_public_dir<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    Ok(normalize_public_dir(&raw))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_trailing_separators() {
        assert_eq!(normalize_public_dir("public"), "public/");
        assert_eq!(normalize_public_dir("public/"), "public/");
        assert_eq!(normalize_public_dir("public///"), "public/");
        assert_eq!(normalize_public_dir("/srv/www"), "/srv/www/");
        assert_eq!(normalize_public_dir("/"), "/");
        assert_eq!(normalize_public_dir(""), "./");
    }

    #[test]
    fn defaults() {
        let config = FileConfig::new("assets");
        assert_eq!(config.public_dir(), "assets/");
        assert_eq!(config.chunk_size(), 32_768);
        assert_eq!(DEFAULT_CHUNK_SIZE_NONZERO.get(), DEFAULT_CHUNK_SIZE);
        assert_eq!(config.cache_headers(), None);
        assert_eq!(config.index_file(), Some("index.html"));
        assert_eq!(
            config.full_path(Path::new("css/site.css")),
            PathBuf::from("assets/css/site.css")
        );
    }

    #[test]
    fn deserializes_from_toml() {
        let config: FileConfig = toml::from_str(
            r#"
            public_dir = "static//"
            chunk_size = 1024
            cache_headers = 60
            "#,
        )
        .unwrap();
        assert_eq!(config.public_dir(), "static/");
        assert_eq!(config.chunk_size(), 1024);
        assert_eq!(config.cache_headers(), Some(60));
        assert_eq!(config.index_file(), Some("index.html"));
    }

    #[test]
    fn rejects_zero_chunk_size() {
        let result: Result<FileConfig, _> = toml::from_str("chunk_size = 0");
        assert!(result.is_err());
    }
}
