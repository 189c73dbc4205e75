//! An inspected image file with derived helpers.
//!
//! [`Image`] wraps an [`Inspection`] and adds the conveniences callers reach
//! for most: pixel area and megapixels, format family checks, scaling
//! calculations bound to the image's own dimensions, and two entry points into
//! the transform pipeline ([`Image::transform`] and
//! [`Image::downscale_to_pixel_area`]).
//!
//! Like every other component, problems are collected on [`Errors`] rather
//! than returned.

use crate::dimensions::Dimensions;
use crate::errors::Errors;
use crate::magick::backend::{ImageInfo, Inspection, RasterTool};
use crate::magick::catalog::OptionCatalog;
use crate::magick::formats::{self, ImageKind};
use crate::scaling;
use crate::transform::{RenderConfig, TransformOptions, Transformer, VariantEvent};
use std::path::Path;
use std::sync::mpsc::Sender;

/// JPEG-style quality used when downscaling.
const DOWNSCALE_QUALITY: &str = "99";

#[derive(Debug, Clone)]
pub struct Image {
    inspection: Inspection,
    errors: Errors,
}

impl Image {
    pub fn open<T: RasterTool + ?Sized>(tool: &T, path: &Path) -> Self {
        Self::from_inspection(tool.inspect(path))
    }

    pub fn from_inspection(inspection: Inspection) -> Self {
        let errors = inspection.errors.clone();
        Self { inspection, errors }
    }

    pub fn filepath(&self) -> &Path {
        &self.inspection.filepath
    }

    pub fn inspection(&self) -> &Inspection {
        &self.inspection
    }

    pub fn info(&self) -> Option<&ImageInfo> {
        self.inspection.info.as_ref()
    }

    pub fn is_valid(&self) -> bool {
        self.inspection.info.is_some() && self.errors.is_empty()
    }

    pub fn errors(&self) -> &Errors {
        &self.errors
    }

    /// Width in pixels, `0` when unreadable.
    pub fn width(&self) -> u32 {
        self.info().map_or(0, |i| i.width)
    }

    /// Height in pixels, `0` when unreadable.
    pub fn height(&self) -> u32 {
        self.info().map_or(0, |i| i.height)
    }

    pub fn dimensions(&self) -> Dimensions {
        Dimensions::new(self.width(), self.height())
    }

    pub fn pixel_area(&self) -> u64 {
        self.dimensions().area()
    }

    pub fn megapixels(&self) -> f64 {
        self.pixel_area() as f64 / 1_000_000.0
    }

    /// Megapixels to one decimal, e.g. `"0.7mp"`.
    pub fn megapixels_humanized(&self) -> String {
        format!("{:.1}mp", self.megapixels())
    }

    /// Tool-reported format name, `UNKNOWN` when unreadable.
    pub fn format(&self) -> &str {
        self.info().map_or("UNKNOWN", |i| i.format.as_str())
    }

    pub fn image_kind(&self) -> ImageKind {
        formats::image_kind(self.format())
    }

    pub fn is_raster(&self) -> bool {
        formats::is_raster(self.format())
    }

    pub fn is_vector(&self) -> bool {
        formats::is_vector(self.format())
    }

    pub fn is_postscript(&self) -> bool {
        formats::is_postscript(self.format())
    }

    pub fn mime_type(&self) -> &'static str {
        formats::mime_type(self.format())
    }

    pub fn checksum(&self) -> Option<&str> {
        self.info().map(|i| i.checksum.as_str())
    }

    /// File size in bytes.
    pub fn size(&self) -> Option<u64> {
        self.info().map(|i| i.size)
    }

    /// Lowercased extension with its dot, e.g. `.jpg`.
    pub fn extension(&self) -> Option<String> {
        self.filepath()
            .extension()
            .map(|ext| format!(".{}", ext.to_string_lossy().to_lowercase()))
    }

    /// Whether the file extension is one the detected format permits.
    pub fn has_valid_extension(&self) -> bool {
        self.extension()
            .is_some_and(|ext| formats::permitted_extensions(self.format()).contains(&ext.as_str()))
    }

    pub fn dimensions_for_target_pixel_area(&self, target_area: u64) -> Dimensions {
        scaling::dimensions_for_target_pixel_area(target_area, self.dimensions())
    }

    pub fn dimensions_for_fixed_side(&self, fixed_side: u32) -> Dimensions {
        scaling::dimensions_for_fixed_side(fixed_side, self.dimensions())
    }

    pub fn pixel_area_for_fixed_side(&self, fixed_side: u32) -> u64 {
        scaling::pixel_area_for_fixed_side(fixed_side, self.dimensions())
    }

    /// Render `configs` from this image. Transformer errors are merged into
    /// this image's errors.
    pub fn transform<T: RasterTool + ?Sized>(
        &mut self,
        tool: &T,
        catalog: &OptionCatalog,
        configs: Vec<RenderConfig>,
        options: TransformOptions,
        events: Option<&Sender<VariantEvent>>,
    ) -> bool {
        let mut transformer =
            Transformer::from_inspection(tool, catalog, self.inspection.clone(), configs, options);
        let processed = transformer.process(events);
        self.errors.merge(transformer.errors());
        processed
    }

    /// Write a copy of this raster image scaled down to about `target_area`
    /// pixels at `output`.
    ///
    /// Returns whether `output` exists afterwards. Vector and unknown formats
    /// are refused.
    pub fn downscale_to_pixel_area<T: RasterTool + ?Sized>(
        &mut self,
        tool: &T,
        catalog: &OptionCatalog,
        target_area: u64,
        output: &Path,
    ) -> bool {
        if !self.is_raster() {
            self.errors.add(
                "image",
                format!("must be a raster image to downscale, not {}", self.format()),
            );
            return false;
        }

        let max_side = self.dimensions_for_target_pixel_area(target_area).max_side();
        let config = RenderConfig::new()
            .filepath(output)
            .option("quality", DOWNSCALE_QUALITY)
            .option("format", self.format())
            .flag("auto-orient")
            .option("geometry", format!("{max_side}x{max_side}"));

        self.transform(tool, catalog, vec![config], TransformOptions::default(), None)
            && output.exists()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::magick::backend::tests::MockTool;
    use crate::test_helpers::{fixture_catalog, source_file};
    use tempfile::TempDir;

    fn image_with(format: &str, width: u32, height: u32, path: &Path) -> Image {
        Image::from_inspection(Inspection::readable(
            path,
            ImageInfo {
                format: format.to_string(),
                width,
                height,
                size: 1024,
                mtime: None,
                checksum: "abc".to_string(),
            },
        ))
    }

    #[test]
    fn megapixels() {
        let image = image_with("JPEG", 990, 503, Path::new("a.jpg"));
        assert_eq!(image.pixel_area(), 497_970);
        assert!((image.megapixels() - 0.49797).abs() < 1e-12);
        assert_eq!(image.megapixels_humanized(), "0.5mp");

        let big = image_with("JPEG", 4048, 3032, Path::new("b.jpg"));
        assert_eq!(big.megapixels_humanized(), "12.3mp");
    }

    #[test]
    fn scaling_shortcuts_use_own_dimensions() {
        let image = image_with("JPEG", 990, 503, Path::new("a.jpg"));
        assert_eq!(image.dimensions_for_fixed_side(240), Dimensions::new(240, 122));
        assert_eq!(
            image.dimensions_for_target_pixel_area(5_230_000),
            Dimensions::new(3209, 1631)
        );
        assert_eq!(image.pixel_area_for_fixed_side(240), 240 * 122);
    }

    #[test]
    fn format_family_helpers() {
        let eps = image_with("EPS", 100, 100, Path::new("logo.eps"));
        assert!(eps.is_vector());
        assert!(eps.is_postscript());
        assert!(!eps.is_raster());
        assert_eq!(eps.image_kind(), ImageKind::Vector);
        assert_eq!(eps.mime_type(), "application/postscript");
    }

    #[test]
    fn extension_checks() {
        assert!(image_with("JPEG", 1, 1, Path::new("a.JPG")).has_valid_extension());
        assert!(!image_with("PNG", 1, 1, Path::new("a.jpg")).has_valid_extension());
        assert!(!image_with("JPEG", 1, 1, Path::new("noext")).has_valid_extension());
        assert_eq!(
            image_with("JPEG", 1, 1, Path::new("a.JPG")).extension().as_deref(),
            Some(".jpg")
        );
    }

    #[test]
    fn unreadable_image_defaults() {
        let image = Image::from_inspection(Inspection::unreadable("x.jpg", "corrupt image"));
        assert!(!image.is_valid());
        assert_eq!(image.width(), 0);
        assert_eq!(image.format(), "UNKNOWN");
        assert_eq!(image.errors().full_messages(), ["image corrupt image"]);
    }

    // =========================================================================
    // downscale_to_pixel_area
    // =========================================================================

    #[test]
    fn downscale_runs_single_variant() {
        let tmp = TempDir::new().unwrap();
        let source = source_file(&tmp);
        let output = tmp.path().join("small.jpg");
        let tool = MockTool::new();
        let mut image = image_with("JPEG", 4048, 3032, &source);

        assert!(image.downscale_to_pixel_area(&tool, &fixture_catalog(), 1_000_000, &output));

        let calls = tool.convert_calls();
        assert_eq!(calls.len(), 1);
        let expected_side = scaling::dimensions_for_target_pixel_area(
            1_000_000,
            Dimensions::new(4048, 3032),
        )
        .max_side();
        assert_eq!(
            calls[0],
            [
                source.to_string_lossy().to_string(),
                "-quality".to_string(),
                "99".to_string(),
                "-format".to_string(),
                "JPEG".to_string(),
                "-auto-orient".to_string(),
                "-geometry".to_string(),
                format!("{expected_side}x{expected_side}"),
                output.to_string_lossy().to_string(),
            ]
        );
        assert!(image.errors().is_empty());
    }

    #[test]
    fn downscale_refuses_vector_images() {
        let tmp = TempDir::new().unwrap();
        let tool = MockTool::new();
        let mut image = image_with("EPS", 1000, 1000, Path::new("logo.eps"));

        assert!(!image.downscale_to_pixel_area(
            &tool,
            &fixture_catalog(),
            10_000,
            &tmp.path().join("x.eps")
        ));
        assert!(tool.get_operations().is_empty());
        assert!(image.errors().contains_key("image"));
    }

    #[test]
    fn transform_failures_land_on_image_errors() {
        let tmp = TempDir::new().unwrap();
        let source = source_file(&tmp);
        let tool = MockTool::new().failing_on("out.jpg", "color profile operates on another colorspace");
        let mut image = image_with("JPEG", 100, 100, &source);

        let config = RenderConfig::new()
            .filepath(tmp.path().join("out.jpg"))
            .option("profile", "icc:AdobeRGB1998.icc");
        assert!(!image.transform(
            &tool,
            &fixture_catalog(),
            vec![config],
            TransformOptions::default(),
            None
        ));
        assert_eq!(
            image.errors().to_string(),
            "variant failed at index 0: colorspace/profile mismatch"
        );
    }
}
