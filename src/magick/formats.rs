//! Format families, keyed by the format name `identify` reports (`%m`).

use serde::Serialize;
use std::fmt;

const BASE_POSTSCRIPT: &[&str] = &[
    "EPI", "EPS", "EPSF", "EPSI", "EPS2", "EPS3", "EPT", "PS", "PS2", "PS3",
];
const RASTER_FORMATS: &[&str] = &[
    "BMP", "JPEG", "JPF", "JP2", "PAM", "PNG", "WEBP", "GIF", "HEIF", "TIFF",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageKind {
    Raster,
    Vector,
    Unknown,
}

impl fmt::Display for ImageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Raster => "raster",
            Self::Vector => "vector",
            Self::Unknown => "unknown",
        })
    }
}

fn upcased(format: &str) -> String {
    format.trim().to_ascii_uppercase()
}

pub fn is_raster(format: &str) -> bool {
    RASTER_FORMATS.contains(&upcased(format).as_str())
}

pub fn is_eps(format: &str) -> bool {
    BASE_POSTSCRIPT.contains(&upcased(format).as_str())
}

pub fn is_pdf(format: &str) -> bool {
    upcased(format) == "PDF"
}

/// Base PostScript formats plus PDF.
pub fn is_postscript(format: &str) -> bool {
    is_eps(format) || is_pdf(format)
}

/// PostScript formats plus SVG.
pub fn is_vector(format: &str) -> bool {
    is_postscript(format) || upcased(format) == "SVG"
}

pub fn image_kind(format: &str) -> ImageKind {
    if is_raster(format) {
        ImageKind::Raster
    } else if is_vector(format) {
        ImageKind::Vector
    } else {
        ImageKind::Unknown
    }
}

/// File extensions considered honest for a given format.
pub fn permitted_extensions(format: &str) -> &'static [&'static str] {
    match upcased(format).as_str() {
        "BMP" => &[".bmp"],
        "EPT" | "EPS" | "PS" => &[".eps", ".ept"],
        "JPEG" => &[".jpg", ".jpeg"],
        "JPF" => &[".jp2", ".j2k", ".jpf", ".jpx", ".jpm", ".mj2"],
        "PAM" | "WEBP" => &[".webp"],
        "PNG" => &[".png"],
        "GIF" => &[".gif"],
        "HEIF" => &[
            ".heif", ".heifs", ".heic", ".heics", ".avci", ".avcs", ".avif", ".avifs",
        ],
        "TIFF" => &[".tif", ".tiff"],
        "PDF" => &[".pdf"],
        "SVG" => &[".svg"],
        _ => &[],
    }
}

/// Preferred extension: the first permitted one.
pub fn preferred_extension(format: &str) -> Option<&'static str> {
    permitted_extensions(format).first().copied()
}

pub fn mime_type(format: &str) -> &'static str {
    match upcased(format).as_str() {
        "BMP" => "image/bmp",
        "JPEG" => "image/jpeg",
        "JPF" | "JP2" => "image/jp2",
        "PAM" | "WEBP" => "image/webp",
        "PNG" => "image/png",
        "GIF" => "image/gif",
        "HEIF" => "image/heif",
        "TIFF" => "image/tiff",
        "PDF" => "application/pdf",
        "SVG" => "image/svg+xml",
        "PSD" => "image/vnd.adobe.photoshop",
        f if BASE_POSTSCRIPT.contains(&f) => "application/postscript",
        _ => "application/octet-stream",
    }
}
