//! Declarative transform pipeline.
//!
//! Callers describe derivative files as [`RenderConfig`]s. The pipeline turns
//! each into a validated [`Variant`] whose options are ordered the way
//! `convert` requires, collects them in a [`ComponentList`], and lets a
//! [`Transformer`] render them against one source image.
//!
//! ```text
//! RenderConfig ──▶ Variant::validate ──▶ ComponentList ──▶ Transformer::process
//!                  (group + order)       (drop invalid)    (one convert per variant)
//! ```

pub mod component_list;
pub mod option;
pub mod transformer;
pub mod value;
pub mod variant;

pub use component_list::ComponentList;
pub use option::{CommandOption, GroupedOptions, Sign};
pub use transformer::{TransformOptions, Transformer, VariantEvent};
pub use value::{OptionMap, OptionValue, RenderConfig};
pub use variant::{RenderResult, TransformError, Variant, VariantState};
