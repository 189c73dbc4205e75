//! CLI output formatting.
//!
//! # Output Format
//!
//! ## Inspect
//!
//! ```text
//! photo.jpg
//!     Format: JPEG (image/jpeg)
//!     Dimensions: 4048x3032 (12.3mp)
//!     Size: 2481734 bytes
//!     Checksum: 9f86d081884c7d65...
//! ```
//!
//! ## Transform
//!
//! Progress events print as variants finish, then a summary:
//!
//! ```text
//! 000 thumb.jpg (240x180)
//! 001 FAILED: colorspace/profile mismatch
//!
//! Rendered 1 of 2 variants
//! Errors
//!     variant failed at index 1: colorspace/profile mismatch
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format functions
//! are pure: no I/O, no side effects.

use crate::dimensions::Dimensions;
use crate::errors::Errors;
use crate::image::Image;
use crate::magick::catalog::{OptionCatalog, OptionGroup};
use crate::transform::{Variant, VariantEvent};
use std::path::Path;

// ============================================================================
// Shared helpers
// ============================================================================

/// Format a 0-based input index as 3-digit zero-padded.
fn format_index(index: usize) -> String {
    format!("{:0>3}", index)
}

fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|f| f.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Shorten a hex digest for display.
fn short_checksum(checksum: &str) -> String {
    if checksum.len() > 16 {
        format!("{}...", &checksum[..16])
    } else {
        checksum.to_string()
    }
}

/// `Errors` header followed by one indented full message per line.
pub fn format_errors(errors: &Errors) -> Vec<String> {
    if errors.is_empty() {
        return Vec::new();
    }
    let mut lines = vec!["Errors".to_string()];
    lines.extend(
        errors
            .full_messages()
            .into_iter()
            .map(|m| format!("{}{}", indent(1), m)),
    );
    lines
}

// ============================================================================
// Inspect
// ============================================================================

pub fn format_inspection(image: &Image) -> Vec<String> {
    let mut lines = vec![file_label(image.filepath())];

    match image.info() {
        Some(info) => {
            lines.push(format!(
                "{}Format: {} ({})",
                indent(1),
                info.format,
                image.mime_type()
            ));
            lines.push(format!(
                "{}Dimensions: {} ({})",
                indent(1),
                image.dimensions(),
                image.megapixels_humanized()
            ));
            lines.push(format!("{}Size: {} bytes", indent(1), info.size));
            lines.push(format!(
                "{}Checksum: {}",
                indent(1),
                short_checksum(&info.checksum)
            ));
            if !image.has_valid_extension() {
                lines.push(format!(
                    "{}Warning: extension does not match {}",
                    indent(1),
                    info.format
                ));
            }
        }
        None => {
            lines.extend(
                image
                    .errors()
                    .full_messages()
                    .into_iter()
                    .map(|m| format!("{}{}", indent(1), m)),
            );
        }
    }
    lines
}

pub fn print_inspection(image: &Image) {
    for line in format_inspection(image) {
        println!("{}", line);
    }
}

// ============================================================================
// Transform
// ============================================================================

/// Format a single transform progress event as display lines.
pub fn format_event(event: &VariantEvent) -> Vec<String> {
    match event {
        VariantEvent::Rendered {
            index,
            filepath,
            dimensions,
        } => {
            let label = file_label(filepath);
            match dimensions {
                Some(dims) => vec![format!("{} {} ({})", format_index(*index), label, dims)],
                None => vec![format!("{} {}", format_index(*index), label)],
            }
        }
        VariantEvent::Failed { index, message } => {
            vec![format!("{} FAILED: {}", format_index(*index), message)]
        }
    }
}

/// Summary printed after a transform run.
///
/// `requested` is the number of configs the caller passed in, including ones
/// dropped during validation.
pub fn format_transform_summary(
    requested: usize,
    variants: &[Variant],
    errors: &Errors,
) -> Vec<String> {
    let rendered = variants.iter().filter(|v| v.result().is_some()).count();
    let noun = if requested == 1 { "variant" } else { "variants" };

    let mut lines = vec![
        String::new(),
        format!("Rendered {} of {} {}", rendered, requested, noun),
    ];
    for variant in variants.iter().filter(|v| v.result().is_some()) {
        lines.push(format!(
            "{}{} {}",
            indent(1),
            format_index(variant.input_index()),
            variant.filepath().display()
        ));
    }
    lines.extend(format_errors(errors));
    lines
}

pub fn print_transform_summary(requested: usize, variants: &[Variant], errors: &Errors) {
    for line in format_transform_summary(requested, variants, errors) {
        println!("{}", line);
    }
}

// ============================================================================
// Options and scaling
// ============================================================================

/// List every catalog group with its option names, one per line.
pub fn format_catalog(catalog: &OptionCatalog) -> Vec<String> {
    let mut lines = Vec::new();
    for group in OptionGroup::ORDERED {
        let names = catalog.options(group);
        lines.push(format!("{} ({})", group, names.len()));
        lines.extend(names.iter().map(|n| format!("{}-{}", indent(1), n)));
    }
    lines
}

pub fn print_catalog(catalog: &OptionCatalog) {
    for line in format_catalog(catalog) {
        println!("{}", line);
    }
}

pub fn format_scale(current: Dimensions, scaled: Dimensions) -> Vec<String> {
    vec![
        format!("{} ({} px)", current, current.area()),
        format!("\u{2192} {} ({} px)", scaled, scaled.area()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::magick::backend::{ImageInfo, Inspection};
    use crate::test_helpers::fixture_catalog;
    use crate::transform::RenderConfig;
    use std::path::PathBuf;

    fn jpeg(path: &str, width: u32, height: u32) -> Image {
        Image::from_inspection(Inspection::readable(
            path,
            ImageInfo {
                format: "JPEG".to_string(),
                width,
                height,
                size: 2048,
                mtime: None,
                checksum: "9f86d081884c7d659a2feaa0c55ad015a3bf4f1b2b0b822cd15d6c15b0f00a08"
                    .to_string(),
            },
        ))
    }

    // =========================================================================
    // Inspect
    // =========================================================================

    #[test]
    fn inspection_lines() {
        let lines = format_inspection(&jpeg("/photos/dawn.jpg", 4048, 3032));
        assert_eq!(
            lines,
            [
                "dawn.jpg",
                "    Format: JPEG (image/jpeg)",
                "    Dimensions: 4048x3032 (12.3mp)",
                "    Size: 2048 bytes",
                "    Checksum: 9f86d081884c7d65...",
            ]
        );
    }

    #[test]
    fn inspection_warns_on_mismatched_extension() {
        let lines = format_inspection(&jpeg("dawn.png", 10, 10));
        assert_eq!(
            lines.last().map(String::as_str),
            Some("    Warning: extension does not match JPEG")
        );
    }

    #[test]
    fn unreadable_inspection_shows_errors() {
        let image = Image::from_inspection(Inspection::unreadable("bad.jpg", "corrupt image"));
        assert_eq!(format_inspection(&image), ["bad.jpg", "    image corrupt image"]);
    }

    // =========================================================================
    // Transform
    // =========================================================================

    #[test]
    fn rendered_event() {
        let event = VariantEvent::Rendered {
            index: 2,
            filepath: PathBuf::from("/out/thumb.jpg"),
            dimensions: Some(Dimensions::new(240, 180)),
        };
        assert_eq!(format_event(&event), ["002 thumb.jpg (240x180)"]);
    }

    #[test]
    fn failed_event() {
        let event = VariantEvent::Failed {
            index: 0,
            message: "colorspace/profile mismatch".to_string(),
        };
        assert_eq!(format_event(&event), ["000 FAILED: colorspace/profile mismatch"]);
    }

    #[test]
    fn summary_counts_requested_configs() {
        let mut errors = Errors::new();
        errors.add("config", "invalid: variant 0: options cannot be empty");

        let lines = format_transform_summary(2, &[], &errors);
        assert_eq!(
            lines,
            [
                "",
                "Rendered 0 of 2 variants",
                "Errors",
                "    config invalid: variant 0: options cannot be empty",
            ]
        );
    }

    #[test]
    fn summary_skips_unrendered_variants() {
        let mut variant = Variant::new(
            RenderConfig::new().filepath("/out/a.jpg").flag("strip"),
            0,
            Path::new("/tmp"),
        );
        variant.validate(&fixture_catalog());

        let lines = format_transform_summary(1, &[variant], &Errors::new());
        assert_eq!(lines, ["", "Rendered 0 of 1 variant"]);
    }

    // =========================================================================
    // Options and scaling
    // =========================================================================

    #[test]
    fn catalog_groups_in_order() {
        let lines = format_catalog(&fixture_catalog());
        let headers: Vec<&String> = lines.iter().filter(|l| !l.starts_with(' ')).collect();
        assert_eq!(headers.len(), 3);
        assert!(headers[0].starts_with("image_settings ("));
        assert!(headers[1].starts_with("image_operators ("));
        assert!(headers[2].starts_with("image_sequence_operators ("));
        assert!(lines.contains(&"    -resize".to_string()));
    }

    #[test]
    fn scale_lines() {
        let lines = format_scale(Dimensions::new(990, 503), Dimensions::new(240, 122));
        assert_eq!(lines, ["990x503 (497970 px)", "\u{2192} 240x122 (29280 px)"]);
    }
}
