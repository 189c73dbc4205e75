//! One requested output rendering and its validate → process lifecycle.
//!
//! ```text
//! Constructed ──validate──▶ Validated ──process──▶ Processed
//!                              │
//!                              └─ invalid: process returns NotValidated
//! ```
//!
//! Validation never fails loudly. Empty or unrecognized options are recorded
//! on the variant's [`Errors`] and [`Variant::is_valid`] turns false.
//! Processing is only allowed once, and only on a valid variant; misuse is
//! reported as a [`TransformError`].
//!
//! The `convert` invocation always has this shape:
//!
//! ```text
//! [read options] <source> [grouped options] [relegated options] <output>
//! ```
//!
//! where each option list is ordered settings → operators → sequence operators.

use super::option::{CommandOption, GroupedOptions};
use super::value::{OptionMap, RenderConfig};
use crate::dimensions::Dimensions;
use crate::errors::Errors;
use crate::magick::backend::{RasterTool, ToolError};
use crate::magick::catalog::OptionCatalog;
use crate::magick::formats::ImageKind;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use thiserror::Error;
use tracing::debug;

/// Prefix of generated output file names.
pub const GENERATED_PREFIX: &str = "image_wrangler";

#[derive(Error, Debug)]
pub enum TransformError {
    #[error("variant has not been validated or is invalid")]
    NotValidated,
    #[error("variant has already been processed")]
    AlreadyProcessed,
    #[error("no source image assigned")]
    NoSource,
    #[error("{stderr}")]
    ToolFailed { exit_code: i32, stderr: String },
    #[error("{0}")]
    Inspection(String),
    #[error(transparent)]
    Tool(#[from] ToolError),
}

impl TransformError {
    /// Whether `convert` was invoked, so the output path may hold a partial file.
    pub fn ran_tool(&self) -> bool {
        matches!(
            self,
            Self::ToolFailed { .. } | Self::Inspection(_) | Self::Tool(_)
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariantState {
    Constructed,
    Validated,
    Processed,
}

/// Attributes of a successfully rendered output file.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderResult {
    pub checksum: String,
    pub mtime: Option<SystemTime>,
    pub width: u32,
    pub height: u32,
    pub size: u64,
    pub mime_type: String,
    pub image_kind: ImageKind,
}

impl RenderResult {
    pub fn dimensions(&self) -> Dimensions {
        Dimensions::new(self.width, self.height)
    }
}

#[derive(Debug, Clone)]
pub struct Variant {
    config: RenderConfig,
    input_index: usize,
    filepath: PathBuf,
    read_options: GroupedOptions,
    grouped_options: GroupedOptions,
    relegated_options: GroupedOptions,
    unrecognized_options: Vec<String>,
    errors: Errors,
    state: VariantState,
    source_image: Option<PathBuf>,
    result: Option<RenderResult>,
}

impl Variant {
    /// Create a variant for the config at `input_index` of the caller's list.
    ///
    /// Without a configured `filepath` the output goes to `scratch_dir`, named
    /// by the configured `filename` or a random `image_wrangler.<token>`.
    pub fn new(config: RenderConfig, input_index: usize, scratch_dir: &Path) -> Self {
        let filepath = match (&config.filepath, &config.filename) {
            (Some(path), _) => path.clone(),
            (None, Some(name)) => scratch_dir.join(name),
            (None, None) => scratch_dir.join(generated_filename()),
        };

        Self {
            config,
            input_index,
            filepath,
            read_options: GroupedOptions::new(),
            grouped_options: GroupedOptions::new(),
            relegated_options: GroupedOptions::new(),
            unrecognized_options: Vec::new(),
            errors: Errors::new(),
            state: VariantState::Constructed,
            source_image: None,
            result: None,
        }
    }

    /// Check and group the configured options. Runs once; later calls only
    /// report the outcome of the first.
    pub fn validate(&mut self, catalog: &OptionCatalog) -> bool {
        if self.state != VariantState::Constructed {
            return self.is_valid();
        }
        self.state = VariantState::Validated;

        if self.config.has_no_options() {
            self.errors.add("options", "cannot be empty");
            return false;
        }

        let mut unrecognized = Vec::new();
        self.read_options = build_options(&self.config.read_options, catalog, &mut unrecognized);
        self.grouped_options = build_options(&self.config.options, catalog, &mut unrecognized);
        self.relegated_options =
            build_options(&self.config.relegated_options, catalog, &mut unrecognized);

        if !unrecognized.is_empty() {
            let quoted: Vec<String> = unrecognized.iter().map(|key| format!("'{key}'")).collect();
            self.errors
                .add("options", format!("unrecognized {}", quoted.join("; ")));
        }
        self.unrecognized_options = unrecognized;

        self.is_valid()
    }

    /// The full `convert` argument vector, ending with the output path.
    pub fn command_args(&self, source: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = Vec::new();
        args.extend(self.read_options.merged().into_iter().map(OsString::from));
        args.push(source.as_os_str().to_os_string());
        args.extend(self.grouped_options.merged().into_iter().map(OsString::from));
        args.extend(self.relegated_options.merged().into_iter().map(OsString::from));
        args.push(self.filepath.as_os_str().to_os_string());
        args
    }

    /// Render the output file from the assigned source image.
    ///
    /// On success the output is inspected and its attributes recorded. An
    /// unreadable output is recorded under `result` and returned as
    /// [`TransformError::Inspection`].
    #[tracing::instrument(skip_all, fields(index = self.input_index))]
    pub fn process<T: RasterTool + ?Sized>(&mut self, tool: &T) -> Result<(), TransformError> {
        match self.state {
            VariantState::Constructed => return Err(TransformError::NotValidated),
            VariantState::Processed => return Err(TransformError::AlreadyProcessed),
            VariantState::Validated if !self.is_valid() => {
                return Err(TransformError::NotValidated);
            }
            VariantState::Validated => {}
        }
        let source = self.source_image.clone().ok_or(TransformError::NoSource)?;
        self.state = VariantState::Processed;

        let args = self.command_args(&source);
        debug!(?args, "processing variant");

        let output = tool.convert(&args)?;
        if !output.success() {
            return Err(TransformError::ToolFailed {
                exit_code: output.exit_code,
                stderr: failure_message(&output.stderr, output.exit_code),
            });
        }

        self.inspect_result(tool)
    }

    /// Inspect the rendered output and copy its attributes onto the variant.
    pub fn inspect_result<T: RasterTool + ?Sized>(&mut self, tool: &T) -> Result<(), TransformError> {
        let inspection = tool.inspect(&self.filepath);
        match inspection.info {
            Some(info) if inspection.errors.is_empty() => {
                self.result = Some(RenderResult {
                    mime_type: info.mime_type().to_string(),
                    image_kind: info.image_kind(),
                    checksum: info.checksum,
                    mtime: info.mtime,
                    width: info.width,
                    height: info.height,
                    size: info.size,
                });
                Ok(())
            }
            _ => {
                let message = inspection.errors.to_string();
                self.errors.add("result", message.clone());
                Err(TransformError::Inspection(message))
            }
        }
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &Errors {
        &self.errors
    }

    pub fn state(&self) -> VariantState {
        self.state
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Position of this variant's config in the caller's original list.
    pub fn input_index(&self) -> usize {
        self.input_index
    }

    pub fn filepath(&self) -> &Path {
        &self.filepath
    }

    /// Final path component of the output path.
    pub fn filename(&self) -> String {
        self.filepath
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    pub fn source_image(&self) -> Option<&Path> {
        self.source_image.as_deref()
    }

    pub fn set_source_image(&mut self, path: impl Into<PathBuf>) {
        self.source_image = Some(path.into());
    }

    pub fn read_options(&self) -> &GroupedOptions {
        &self.read_options
    }

    pub fn grouped_options(&self) -> &GroupedOptions {
        &self.grouped_options
    }

    pub fn relegated_options(&self) -> &GroupedOptions {
        &self.relegated_options
    }

    /// Primary option tokens, ordered by group.
    pub fn merged_options(&self) -> Vec<String> {
        self.grouped_options.merged()
    }

    /// Keys the catalog did not recognize, as written by the caller.
    pub fn unrecognized_options(&self) -> &[String] {
        &self.unrecognized_options
    }

    pub fn result(&self) -> Option<&RenderResult> {
        self.result.as_ref()
    }
}

fn build_options(
    map: &OptionMap,
    catalog: &OptionCatalog,
    unrecognized: &mut Vec<String>,
) -> GroupedOptions {
    let mut grouped = GroupedOptions::new();
    for (key, value) in map.iter() {
        if key.is_empty() {
            continue;
        }
        if !CommandOption::recognized(key, catalog) {
            unrecognized.push(key.to_string());
            continue;
        }
        for argument in value.arguments() {
            grouped.push(CommandOption::new(key, argument, catalog));
        }
    }
    grouped
}

fn generated_filename() -> String {
    let token = uuid::Uuid::new_v4().simple().to_string();
    format!("{GENERATED_PREFIX}.{}", &token[..8])
}

fn failure_message(stderr: &str, exit_code: i32) -> String {
    let stderr = stderr.trim();
    if stderr.is_empty() {
        format!("exited with status {exit_code}")
    } else {
        stderr.to_string()
    }
}
