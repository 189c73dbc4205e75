//! Shared test utilities.
//!
//! Provides an option catalog parsed from a recorded `convert -help`, the
//! render configs used across the transform tests, and on-disk source files.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = TempDir::new().unwrap();
//! let source = source_file(&tmp);
//! let catalog = fixture_catalog();
//! assert!(catalog.recognizes("resize"));
//! ```

use std::path::PathBuf;
use tempfile::TempDir;

use crate::magick::catalog::OptionCatalog;
use crate::transform::RenderConfig;

/// `convert -help` output from ImageMagick 6.9.
pub const CONVERT_HELP: &str = include_str!("../fixtures/convert-help.txt");

// =========================================================================
// Catalog
// =========================================================================

/// Catalog parsed from [`CONVERT_HELP`]. Panics if the fixture is malformed.
pub fn fixture_catalog() -> OptionCatalog {
    OptionCatalog::from_help_text(CONVERT_HELP).expect("fixture help text must parse")
}

// =========================================================================
// Render configs
// =========================================================================

/// One setting, one repeated plus-flag operator, one argument-less sequence operator.
pub fn scenario_a_config() -> RenderConfig {
    RenderConfig::new()
        .option("colorspace", "RGB")
        .option("+profile", ["8BIMTEXT", "IPTC"])
        .flag("append")
}

// =========================================================================
// Files
// =========================================================================

/// Write a readable stand-in source image into `tmp` and return its path.
pub fn source_file(tmp: &TempDir) -> PathBuf {
    let path = tmp.path().join("source.jpg");
    std::fs::write(&path, "source pixels").unwrap();
    path
}
