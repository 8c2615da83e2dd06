use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use url::Url;

use super::Options;
use crate::error::{Error, Result};

const DEFAULT_FILENAME: &str = "index.html";

static RE_INDEX_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\.(\d+)$").expect("index suffix pattern is valid"));

/// Saves a response body to disk for `--download`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileWriter {
    full_path: PathBuf,
}

impl FileWriter {
    /// Targets `--output` when given, otherwise the last segment of the URL
    /// path in the working directory.
    pub fn new(url: &Url, options: &Options) -> Self {
        let path = match &options.output_file {
            Some(file) => PathBuf::from(file),
            None => PathBuf::from(filename_from_url(url)),
        };
        let full_path = if options.overwrite {
            path
        } else {
            non_overlapping_path(path)
        };
        Self { full_path }
    }

    #[cfg(test)]
    pub fn path(&self) -> &Path {
        &self.full_path
    }

    pub fn filename(&self) -> String {
        self.full_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.full_path.display().to_string())
    }

    /// Writes `body` in full and returns the number of bytes written.
    pub fn download(&self, body: &[u8]) -> Result<u64> {
        fs::write(&self.full_path, body).map_err(|e| {
            Error::io(format!("writing download to {}", self.full_path.display()), e)
        })?;
        log::info!("saved {} byte(s) to {}", body.len(), self.full_path.display());
        Ok(body.len() as u64)
    }
}

/// Base name of the decoded URL path. Decoding comes first so an encoded
/// `%2F` cannot smuggle a directory into the target.
fn filename_from_url(url: &Url) -> String {
    let decoded = percent_encoding::percent_decode_str(url.path())
        .decode_utf8_lossy()
        .into_owned();
    if decoded.ends_with('/') {
        return DEFAULT_FILENAME.to_string();
    }
    Path::new(&decoded)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| DEFAULT_FILENAME.to_string())
}

/// `name` → `name.1` → `name.2` ... until the path does not exist yet.
fn non_overlapping_path(mut path: PathBuf) -> PathBuf {
    while path.exists() {
        let current = path.to_string_lossy().into_owned();
        let next = match RE_INDEX_SUFFIX.captures(&current) {
            Some(caps) => {
                let index: u64 = caps[1].parse().unwrap_or(0);
                let start = caps.get(0).map_or(current.len(), |m| m.start());
                format!("{}.{}", &current[..start], index + 1)
            }
            None => format!("{current}.1"),
        };
        path = PathBuf::from(next);
    }
    path
}
