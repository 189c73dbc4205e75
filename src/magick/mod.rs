//! The external raster tool boundary.
//!
//! | Module | Role |
//! |--------|------|
//! | [`backend`] | [`RasterTool`] trait, tool output and inspection types |
//! | [`catalog`] | option names per ordering group, parsed from `convert -help` |
//! | [`formats`] | format families, extensions and MIME types |
//! | [`imagemagick`] | the production backend shelling out to ImageMagick |

pub mod backend;
pub mod catalog;
pub mod formats;
pub mod imagemagick;

pub use backend::{ImageInfo, Inspection, RasterTool, ToolError, ToolOutput};
pub use catalog::{CatalogError, OptionCatalog, OptionGroup};
pub use formats::ImageKind;
pub use imagemagick::ImageMagick;
