//! Ordered, validated collection of [`Variant`]s.

use super::value::RenderConfig;
use super::variant::Variant;
use crate::errors::Errors;
use crate::magick::catalog::OptionCatalog;
use std::path::PathBuf;

/// Builds one [`Variant`] per [`RenderConfig`] and keeps the valid ones.
///
/// Invalid configs are dropped and reported under the `variant` key with
/// their position in the input list. An empty input list is not an error
/// here; [`Transformer`](super::Transformer) rejects it.
#[derive(Debug, Clone)]
pub struct ComponentList {
    configs: Vec<RenderConfig>,
    scratch_dir: PathBuf,
    variants: Vec<Variant>,
    errors: Errors,
}

impl ComponentList {
    pub fn new(configs: Vec<RenderConfig>) -> Self {
        Self {
            configs,
            scratch_dir: std::env::temp_dir(),
            variants: Vec::new(),
            errors: Errors::new(),
        }
    }

    /// Directory for generated output paths.
    pub fn with_scratch_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.scratch_dir = dir.into();
        self
    }

    /// Validate every config. Returns whether at least one variant was kept.
    pub fn instantiate_variants(&mut self, catalog: &OptionCatalog) -> bool {
        self.variants.clear();
        self.errors.clear();

        for (index, config) in self.configs.iter().enumerate() {
            let mut variant = Variant::new(config.clone(), index, &self.scratch_dir);
            if variant.validate(catalog) {
                self.variants.push(variant);
            } else {
                let messages = variant.errors().full_messages().join("; ");
                self.errors.add("variant", format!("{index}: {messages}"));
            }
        }

        !self.variants.is_empty()
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn configs(&self) -> &[RenderConfig] {
        &self.configs
    }

    /// Kept variants, in input order.
    pub fn variants(&self) -> &[Variant] {
        &self.variants
    }

    pub fn variants_mut(&mut self) -> &mut [Variant] {
        &mut self.variants
    }

    pub fn into_variants(self) -> Vec<Variant> {
        self.variants
    }

    pub fn errors(&self) -> &Errors {
        &self.errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{fixture_catalog, scenario_a_config};

    #[test]
    fn all_valid_configs_are_kept() {
        let mut list = ComponentList::new(vec![
            scenario_a_config(),
            RenderConfig::new().option("resize", "50%"),
        ]);
        assert!(list.instantiate_variants(&fixture_catalog()));
        assert!(list.is_valid());
        assert_eq!(list.variants().len(), 2);
    }

    #[test]
    fn malformed_entry_is_dropped_and_reported() {
        let mut list = ComponentList::new(vec![
            RenderConfig::new().option("qwerty", "1"),
            RenderConfig::new().option("resize", "50%"),
        ]);

        assert!(list.instantiate_variants(&fixture_catalog()));
        assert!(!list.is_valid());
        assert_eq!(list.variants().len(), 1);
        assert_eq!(list.variants()[0].input_index(), 1);
        assert_eq!(
            list.errors().full_messages(),
            ["variant 0: options unrecognized 'qwerty'"]
        );
    }

    #[test]
    fn every_failure_is_indexed() {
        let mut list = ComponentList::new(vec![
            RenderConfig::new().flag("strip"),
            RenderConfig::new(),
            RenderConfig::new().flag("nope"),
        ]);

        assert!(list.instantiate_variants(&fixture_catalog()));
        assert_eq!(
            list.errors().get("variant"),
            ["1: options cannot be empty", "2: options unrecognized 'nope'"]
        );
    }

    #[test]
    fn nothing_kept_returns_false() {
        let mut list = ComponentList::new(vec![RenderConfig::new()]);
        assert!(!list.instantiate_variants(&fixture_catalog()));
        assert!(!list.is_valid());
    }

    #[test]
    fn empty_input_is_valid_but_empty() {
        let mut list = ComponentList::new(Vec::new());
        assert!(!list.instantiate_variants(&fixture_catalog()));
        assert!(list.is_valid());
        assert!(list.variants().is_empty());
    }

    #[test]
    fn scratch_dir_applies_to_generated_paths() {
        let mut list = ComponentList::new(vec![RenderConfig::new().flag("strip")])
            .with_scratch_dir("/scratch");
        list.instantiate_variants(&fixture_catalog());
        assert!(list.variants()[0].filepath().starts_with("/scratch"));
    }

    #[test]
    fn reinstantiating_does_not_duplicate() {
        let catalog = fixture_catalog();
        let mut list = ComponentList::new(vec![
            RenderConfig::new(),
            RenderConfig::new().flag("strip"),
        ]);
        list.instantiate_variants(&catalog);
        list.instantiate_variants(&catalog);
        assert_eq!(list.variants().len(), 1);
        assert_eq!(list.errors().len(), 1);
    }
}
