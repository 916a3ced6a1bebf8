//! Source Location Module
//! Resolves data files against the configured base and fetches their bytes.

use std::fmt;
use std::io::Read;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("HTTP request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: Box<ureq::Error>,
    },
    #[error("Failed to read response body from {url}: {source}")]
    Body {
        url: String,
        #[source]
        source: std::io::Error,
    },
}

/// Where a data file lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceLocation {
    Remote(String),
    Local(PathBuf),
}

impl SourceLocation {
    /// Resolve `file` relative to `base`, which is either an http(s) URL or a directory.
    pub fn resolve(base: &str, file: &str) -> Self {
        if base.starts_with("http://") || base.starts_with("https://") {
            let base = base.trim_end_matches('/');
            let file = file.trim_start_matches('/');
            SourceLocation::Remote(format!("{}/{}", base, file))
        } else {
            SourceLocation::Local(Path::new(base).join(file))
        }
    }

    /// Fetch the whole body. Blocking; callers run this off the UI thread.
    pub fn fetch(&self) -> Result<Vec<u8>, SourceError> {
        match self {
            SourceLocation::Local(path) => std::fs::read(path).map_err(|source| SourceError::Io {
                path: path.clone(),
                source,
            }),
            SourceLocation::Remote(url) => {
                let response = ureq::get(url).call().map_err(|source| SourceError::Http {
                    url: url.clone(),
                    source: Box::new(source),
                })?;

                let mut body = Vec::new();
                response
                    .into_reader()
                    .read_to_end(&mut body)
                    .map_err(|source| SourceError::Body {
                        url: url.clone(),
                        source,
                    })?;
                Ok(body)
            }
        }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceLocation::Remote(url) => write!(f, "{}", url),
            SourceLocation::Local(path) => write!(f, "{}", path.display()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_remote_joins_single_slash() {
        assert_eq!(
            SourceLocation::resolve("https://example.org/data/", "/activity.csv"),
            SourceLocation::Remote("https://example.org/data/activity.csv".to_string())
        );
        assert_eq!(
            SourceLocation::resolve("http://localhost:8000", "icb.geojson"),
            SourceLocation::Remote("http://localhost:8000/icb.geojson".to_string())
        );
    }

    #[test]
    fn test_resolve_local_directory() {
        assert_eq!(
            SourceLocation::resolve("data", "activity.csv"),
            SourceLocation::Local(PathBuf::from("data").join("activity.csv"))
        );
    }

    #[test]
    fn test_fetch_missing_local_file_fails() {
        let location = SourceLocation::resolve("definitely/not/here", "missing.csv");
        let err = location.fetch().unwrap_err();
        assert!(matches!(err, SourceError::Io { .. }));
        assert!(err.to_string().contains("missing.csv"));
    }
}
