//! Runs a [`ComponentList`] against one source image.
//!
//! Each kept variant is rendered by one `convert` call. A failing variant has
//! its partial output removed and its error recorded, and the batch moves on:
//! one failure never aborts the others.
//!
//! With cascading on, variant N+1 reads variant N's output instead of the
//! original source, falling back to the original when that output is missing
//! (for example because variant N failed and was cleaned up). Cascading
//! variants always run in order. Without cascading, `parallel` renders the
//! variants on the rayon pool.

use super::component_list::ComponentList;
use super::value::RenderConfig;
use super::variant::{TransformError, Variant};
use crate::config::TransformConfig;
use crate::dimensions::Dimensions;
use crate::errors::Errors;
use crate::magick::backend::{Inspection, RasterTool};
use crate::magick::catalog::OptionCatalog;
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use tracing::{info, warn};

/// Raw tool messages rewritten into something a user can act on.
const HUMANIZED_MESSAGES: &[(&str, &str)] = &[(
    "color profile operates on another colorspace",
    "colorspace/profile mismatch",
)];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransformOptions {
    pub cascade: bool,
    pub parallel: bool,
    /// Directory for generated output paths. `None` means the system temp dir.
    pub scratch_dir: Option<PathBuf>,
}

impl From<&TransformConfig> for TransformOptions {
    fn from(config: &TransformConfig) -> Self {
        Self {
            cascade: config.cascade,
            parallel: config.parallel,
            scratch_dir: config.scratch_dir.clone(),
        }
    }
}

/// Progress report for one variant, keyed by its index in the input list.
#[derive(Debug, Clone, PartialEq)]
pub enum VariantEvent {
    Rendered {
        index: usize,
        filepath: PathBuf,
        dimensions: Option<Dimensions>,
    },
    Failed {
        index: usize,
        message: String,
    },
}

pub struct Transformer<'a, T: RasterTool + ?Sized> {
    tool: &'a T,
    source: Inspection,
    component_list: ComponentList,
    options: TransformOptions,
    errors: Errors,
    processed: bool,
}

impl<'a, T: RasterTool + ?Sized> Transformer<'a, T> {
    /// Inspect `source` and validate `configs` against `catalog`.
    pub fn new(
        tool: &'a T,
        catalog: &OptionCatalog,
        source: &Path,
        configs: Vec<RenderConfig>,
        options: TransformOptions,
    ) -> Self {
        let inspection = tool.inspect(source);
        Self::from_inspection(tool, catalog, inspection, configs, options)
    }

    /// Like [`Transformer::new`], reusing an existing inspection of the source.
    pub fn from_inspection(
        tool: &'a T,
        catalog: &OptionCatalog,
        source: Inspection,
        configs: Vec<RenderConfig>,
        options: TransformOptions,
    ) -> Self {
        let mut component_list = ComponentList::new(configs);
        if let Some(dir) = &options.scratch_dir {
            component_list = component_list.with_scratch_dir(dir);
        }
        component_list.instantiate_variants(catalog);

        let mut transformer = Self {
            tool,
            source,
            component_list,
            options,
            errors: Errors::new(),
            processed: false,
        };
        transformer.ensure_compliance();
        transformer
    }

    fn ensure_compliance(&mut self) {
        if !self.source.is_valid() {
            self.errors.add("source", self.source.errors.to_string());
        }
        if !self.component_list.is_valid() {
            self.errors.add(
                "config",
                format!("invalid: {}", self.component_list.errors()),
            );
        }
        if self.component_list.variants().is_empty() {
            self.errors.add("component_list", "cannot be empty");
        }
    }

    /// Source path for the kept variant at `position`.
    pub fn assert_source_image(&self, position: usize) -> PathBuf {
        let original = self.source.filepath.clone();
        if position == 0 || !self.options.cascade {
            return original;
        }
        let Some(previous) = self.component_list.variants().get(position - 1) else {
            return original;
        };
        if previous.filepath().exists() {
            previous.filepath().to_path_buf()
        } else {
            warn!(
                index = previous.input_index(),
                path = %previous.filepath().display(),
                "previous output missing, cascading from original source"
            );
            original
        }
    }

    /// Render every kept variant. Returns whether all of them succeeded.
    ///
    /// Does nothing and returns `false` when construction recorded errors, or
    /// when this transformer has already processed its variants.
    pub fn process(&mut self, events: Option<&Sender<VariantEvent>>) -> bool {
        if self.processed {
            warn!("transformer already processed, ignoring");
            return false;
        }
        if !self.is_valid() {
            return false;
        }
        self.processed = true;
        if self.options.parallel && !self.options.cascade {
            self.process_parallel(events);
        } else {
            self.process_sequential(events);
        }
        self.is_valid()
    }

    fn process_sequential(&mut self, events: Option<&Sender<VariantEvent>>) {
        let mut previous_area: Option<u64> = None;

        for position in 0..self.component_list.variants().len() {
            let source = self.assert_source_image(position);
            let variant = &mut self.component_list.variants_mut()[position];
            variant.set_source_image(source);
            let outcome = variant.process(self.tool);

            if let Some(message) = settle(variant, outcome, events) {
                record_failure(&mut self.errors, variant.input_index(), &message);
            }

            if self.options.cascade {
                let area = variant.result().map(|r| r.dimensions().area());
                if let (Some(before), Some(after)) = (previous_area, area)
                    && after > before
                {
                    warn!(
                        index = variant.input_index(),
                        before, after, "cascading into a larger area than the previous render"
                    );
                }
                previous_area = area.or(previous_area);
            }
        }
    }

    fn process_parallel(&mut self, events: Option<&Sender<VariantEvent>>) {
        let tool = self.tool;
        let source = self.source.filepath.clone();

        let failures: Vec<(usize, Option<String>)> = self
            .component_list
            .variants_mut()
            .par_iter_mut()
            .map(|variant| {
                variant.set_source_image(source.clone());
                let outcome = variant.process(tool);
                (variant.input_index(), settle(variant, outcome, events))
            })
            .collect();

        // Collected in input order, so errors stay deterministic
        for (index, failure) in failures {
            if let Some(message) = failure {
                record_failure(&mut self.errors, index, &message);
            }
        }
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn is_processed(&self) -> bool {
        self.processed
    }

    pub fn errors(&self) -> &Errors {
        &self.errors
    }

    pub fn source(&self) -> &Inspection {
        &self.source
    }

    pub fn component_list(&self) -> &ComponentList {
        &self.component_list
    }

    pub fn variants(&self) -> &[Variant] {
        self.component_list.variants()
    }

    pub fn options(&self) -> &TransformOptions {
        &self.options
    }
}

/// Clean up after a failed variant and emit its event.
///
/// Returns the humanized failure message, if the variant failed.
fn settle(
    variant: &Variant,
    outcome: Result<(), TransformError>,
    events: Option<&Sender<VariantEvent>>,
) -> Option<String> {
    let index = variant.input_index();
    let (event, failure) = match outcome {
        Ok(()) => {
            let dimensions = variant.result().map(|r| r.dimensions());
            info!(
                index,
                path = %variant.filepath().display(),
                dimensions = ?dimensions,
                "variant rendered"
            );
            let event = VariantEvent::Rendered {
                index,
                filepath: variant.filepath().to_path_buf(),
                dimensions,
            };
            (event, None)
        }
        Err(err) => {
            let message = humanize(&err.to_string());
            warn!(index, error = %message, "variant failed");
            if err.ran_tool() {
                remove_output(variant.filepath());
            }
            let event = VariantEvent::Failed {
                index,
                message: message.clone(),
            };
            (event, Some(message))
        }
    };

    if let Some(tx) = events {
        // A closed receiver only means nobody is listening
        let _ = tx.send(event);
    }
    failure
}

fn record_failure(errors: &mut Errors, index: usize, message: &str) {
    errors.add("variant", format!("failed at index {index}: {message}"));
}

/// Rewrite known raw tool messages.
pub fn humanize(message: &str) -> String {
    HUMANIZED_MESSAGES
        .iter()
        .find(|(raw, _)| message.contains(raw))
        .map(|(_, friendly)| friendly.to_string())
        .unwrap_or_else(|| message.trim().to_string())
}

fn remove_output(path: &Path) {
    if let Err(e) = std::fs::remove_file(path)
        && e.kind() != std::io::ErrorKind::NotFound
    {
        warn!(path = %path.display(), error = %e, "failed to remove partial output");
    }
}
