//! # Image Wrangler
//!
//! Declarative ImageMagick render pipelines. Describe each derivative file as
//! a bag of `convert` options, and image-wrangler validates the options
//! against the installed tool, orders them the way `convert` expects, and
//! renders every derivative from one source image.
//!
//! # Architecture
//!
//! ```text
//! RenderConfig ─▶ Variant ─▶ ComponentList ─▶ Transformer ─▶ RasterTool
//!  (options)     (grouped,    (valid ones,     (one convert   (ImageMagick
//!                 ordered)     indexed errors)  per variant)   or a mock)
//! ```
//!
//! Option validation needs to know which names `convert` accepts and which
//! group each belongs to. That knowledge lives in an [`OptionCatalog`] parsed
//! from `convert -help`, so the crate tracks whatever ImageMagick version is
//! installed rather than a hard-coded list.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`transform`] | Render configs, option grouping, variants, component lists, the transformer |
//! | [`magick`] | The [`RasterTool`] seam, the ImageMagick backend, option catalog, format tables |
//! | [`scaling`] | Area-preserving scaling: target pixel area, fixed longest side |
//! | [`dimensions`] | `WxH` value type |
//! | [`image`] | An inspected file with megapixel, format, and downscale helpers |
//! | [`errors`] | Keyed error accumulator shared by every component |
//! | [`config`] | `image-wrangler.toml` loading, merging over stock defaults, validation |
//! | [`output`] | CLI output formatting |
//!
//! # Validation Over Exceptions
//!
//! Misconfiguration is data, not control flow. Every component carries an
//! [`Errors`] sink; an invalid variant is dropped from its list and reported
//! with its input index, and a failing render is recorded and skipped while
//! the rest of the batch carries on. Raised errors (`thiserror` enums) are kept
//! for tool and I/O failures and for calling methods out of order.
//!
//! # Testing Without ImageMagick
//!
//! Everything above the [`RasterTool`] trait is exercised against a recording
//! mock. Tests that need a real `convert` binary are `#[ignore]`d.
//!
//! [`OptionCatalog`]: magick::OptionCatalog
//! [`RasterTool`]: magick::RasterTool
//! [`Errors`]: errors::Errors

pub mod config;
pub mod dimensions;
pub mod errors;
pub mod image;
pub mod magick;
pub mod output;
pub mod scaling;
pub mod transform;

#[cfg(test)]
pub(crate) mod test_helpers;
