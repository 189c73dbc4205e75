//! Raster tool trait and shared types.
//!
//! The [`RasterTool`] trait is the only surface the transform pipeline needs
//! from the external tools: run `convert` with a prepared argument vector, and
//! inspect a file on disk. The production implementation is
//! [`ImageMagick`](super::imagemagick::ImageMagick); tests use the recording
//! [`MockTool`](tests::MockTool).

use super::formats::{self, ImageKind};
use crate::dimensions::Dimensions;
use crate::errors::Errors;
use sha2::{Digest, Sha256};
use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ToolError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },
    #[error("{program} timed out after {after:?}")]
    Timeout { program: String, after: Duration },
    #[error("unexpected {program} output: {output}")]
    UnexpectedOutput { program: String, output: String },
}

/// Captured result of one external tool invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolOutput {
    /// Process exit code; `-1` when terminated by a signal.
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl ToolOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Attributes of a readable image file.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageInfo {
    /// Tool-reported format name, e.g. `JPEG`.
    pub format: String,
    pub width: u32,
    pub height: u32,
    /// File size in bytes.
    pub size: u64,
    pub mtime: Option<SystemTime>,
    /// SHA-256 of the file contents, lowercase hex.
    pub checksum: String,
}

impl ImageInfo {
    pub fn dimensions(&self) -> Dimensions {
        Dimensions::new(self.width, self.height)
    }

    pub fn mime_type(&self) -> &'static str {
        formats::mime_type(&self.format)
    }

    pub fn image_kind(&self) -> ImageKind {
        formats::image_kind(&self.format)
    }
}

/// Read-only descriptor for a file on disk.
///
/// Unreadable or corrupt files do not produce an `Err`: they produce an
/// inspection with no [`ImageInfo`] and a non-empty [`Errors`].
#[derive(Debug, Clone)]
pub struct Inspection {
    pub filepath: PathBuf,
    pub info: Option<ImageInfo>,
    pub errors: Errors,
}

impl Inspection {
    pub fn readable(filepath: impl Into<PathBuf>, info: ImageInfo) -> Self {
        Self {
            filepath: filepath.into(),
            info: Some(info),
            errors: Errors::new(),
        }
    }

    pub fn unreadable(filepath: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        let mut errors = Errors::new();
        errors.add("image", message);
        Self {
            filepath: filepath.into(),
            info: None,
            errors,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.info.is_some() && self.errors.is_empty()
    }

    pub fn dimensions(&self) -> Option<Dimensions> {
        self.info.as_ref().map(ImageInfo::dimensions)
    }
}

/// The external raster tool, as seen by the transform pipeline.
///
/// `Sync` so variants can render on a rayon pool.
pub trait RasterTool: Sync {
    /// Run `convert` with `args` (the output path is the final argument).
    ///
    /// A non-zero exit is reported through [`ToolOutput::exit_code`], not as
    /// an `Err`; `Err` means the tool could not be run at all.
    fn convert(&self, args: &[OsString]) -> Result<ToolOutput, ToolError>;

    /// Inspect the file at `path`.
    fn inspect(&self, path: &Path) -> Inspection;
}

/// SHA-256 hash of a file's contents, returned as a hex string.
pub fn checksum_file(path: &Path) -> io::Result<String> {
    let bytes = std::fs::read(path)?;
    Ok(format!("{:x}", Sha256::digest(&bytes)))
}
