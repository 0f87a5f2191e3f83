// crates/client/src/media.rs
//! Local source-file checks. Everything here runs before the first network
//! call; a rejected file never reaches the backend.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::MediaError;

/// MIME type the backend expects for podcast audio.
pub const MPEG_AUDIO: &str = "audio/mpeg";

/// True when the file name carries the accepted `.mp3` extension
/// (case-insensitive).
pub fn has_mp3_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("mp3"))
}

/// A validated local file, ready to upload.
#[derive(Debug, Clone)]
pub struct SourceFile {
    path: PathBuf,
    file_name: String,
    content_type: String,
    size_bytes: u64,
}

impl SourceFile {
    /// Validates and stats `path`, deriving the content type from the
    /// extension. The type check runs first.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, MediaError> {
        let path = path.into();
        if !has_mp3_extension(&path) {
            return Err(MediaError::UnsupportedType { path });
        }
        Self::stat(path, MPEG_AUDIO.to_string())
    }

    /// Like [`SourceFile::open`], but with a caller-declared MIME type.
    /// Accepted when either the declared type is MPEG audio or the name ends
    /// in `.mp3`.
    pub fn open_with_type(
        path: impl Into<PathBuf>,
        content_type: impl Into<String>,
    ) -> Result<Self, MediaError> {
        let path = path.into();
        let content_type = content_type.into();
        if content_type != MPEG_AUDIO && !has_mp3_extension(&path) {
            return Err(MediaError::UnsupportedType { path });
        }
        Self::stat(path, content_type)
    }

    fn stat(path: PathBuf, content_type: String) -> Result<Self, MediaError> {
        let metadata = fs::metadata(&path).map_err(|err| MediaError::io(&path, err))?;
        if !metadata.is_file() {
            return Err(MediaError::NotAFile { path });
        }
        let file_name = match path.file_name() {
            Some(name) => name.to_string_lossy().into_owned(),
            None => return Err(MediaError::UnsupportedType { path }),
        };
        Ok(Self {
            path,
            file_name,
            content_type,
            size_bytes: metadata.len(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Bare file name, the candidate object key sent to the backend.
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn size_bytes(&self) -> u64 {
        self.size_bytes
    }

    /// Size in megabytes with two decimals, for display.
    pub fn size_display(&self) -> String {
        format!("{:.2} MB", self.size_bytes as f64 / (1024.0 * 1024.0))
    }

    /// Reads the whole file for the transfer step.
    pub async fn read_bytes(&self) -> Result<Vec<u8>, MediaError> {
        tokio::fs::read(&self.path)
            .await
            .map_err(|err| MediaError::io(&self.path, err))
    }
}
