//! The option names `convert` understands, split into ordering groups.
//!
//! `convert` applies options in command-line order, and its grammar expects
//! settings (how images are read and written) before operators (what happens
//! to the pixels) before sequence operators (what happens across frames).
//! [`OptionCatalog`] records which group each option name belongs to so the
//! transform pipeline can emit options in that order.
//!
//! The catalog is normally read from `convert -help`, whose output lists each
//! group under its own header:
//!
//! ```text
//! Image Settings:
//!   -adjoin              join images into a single multi-image file
//!   -colorspace type     alternate image colorspace
//!
//! Image Operators:
//!   -auto-orient         automagically orient image
//! ```
//!
//! Catalogs are plain values: build one once and pass it to the components
//! that need it.

use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("help text has no '{0}:' section")]
    MissingSection(&'static str),
    #[error(transparent)]
    Tool(#[from] super::backend::ToolError),
}

/// Ordering group of a `convert` option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OptionGroup {
    ImageSettings,
    ImageOperators,
    ImageSequenceOperators,
    Unknown,
}

impl OptionGroup {
    /// Known groups in the order their options must be emitted.
    pub const ORDERED: [OptionGroup; 3] = [
        Self::ImageSettings,
        Self::ImageOperators,
        Self::ImageSequenceOperators,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::ImageSettings => "image_settings",
            Self::ImageOperators => "image_operators",
            Self::ImageSequenceOperators => "image_sequence_operators",
            Self::Unknown => "unknown",
        }
    }

    /// Section header used by `convert -help`.
    fn help_header(self) -> &'static str {
        match self {
            Self::ImageSettings => "Image Settings",
            Self::ImageOperators => "Image Operators",
            Self::ImageSequenceOperators => "Image Sequence Operators",
            Self::Unknown => "",
        }
    }
}

impl fmt::Display for OptionGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Recognized option names (without leading `-`/`+`) per ordering group.
#[derive(Debug, Clone, Default)]
pub struct OptionCatalog {
    settings: Vec<String>,
    operators: Vec<String>,
    sequence_operators: Vec<String>,
    index: HashMap<String, OptionGroup>,
}

impl OptionCatalog {
    /// Build a catalog from explicit name lists.
    ///
    /// A name listed in more than one group belongs to the first, in
    /// [`OptionGroup::ORDERED`] order.
    pub fn new<S: Into<String>>(
        settings: impl IntoIterator<Item = S>,
        operators: impl IntoIterator<Item = S>,
        sequence_operators: impl IntoIterator<Item = S>,
    ) -> Self {
        let settings: Vec<String> = settings.into_iter().map(Into::into).collect();
        let operators: Vec<String> = operators.into_iter().map(Into::into).collect();
        let sequence_operators: Vec<String> =
            sequence_operators.into_iter().map(Into::into).collect();

        let mut index = HashMap::new();
        for (group, names) in [
            (OptionGroup::ImageSettings, &settings),
            (OptionGroup::ImageOperators, &operators),
            (OptionGroup::ImageSequenceOperators, &sequence_operators),
        ] {
            for name in names {
                index.entry(name.clone()).or_insert(group);
            }
        }

        Self {
            settings,
            operators,
            sequence_operators,
            index,
        }
    }

    /// Parse the three option sections out of `convert -help` output.
    pub fn from_help_text(help: &str) -> Result<Self, CatalogError> {
        let settings = help_section(help, OptionGroup::ImageSettings)?;
        let operators = help_section(help, OptionGroup::ImageOperators)?;
        let sequence = help_section(help, OptionGroup::ImageSequenceOperators)?;
        Ok(Self::new(settings, operators, sequence))
    }

    /// Group of an already-cleaned option name.
    pub fn group(&self, clean_name: &str) -> OptionGroup {
        self.index
            .get(clean_name)
            .copied()
            .unwrap_or(OptionGroup::Unknown)
    }

    pub fn recognizes(&self, clean_name: &str) -> bool {
        self.index.contains_key(clean_name)
    }

    /// Names in `group`, in catalog order. Empty for [`OptionGroup::Unknown`].
    pub fn options(&self, group: OptionGroup) -> &[String] {
        match group {
            OptionGroup::ImageSettings => &self.settings,
            OptionGroup::ImageOperators => &self.operators,
            OptionGroup::ImageSequenceOperators => &self.sequence_operators,
            OptionGroup::Unknown => &[],
        }
    }

    /// Number of distinct recognized names.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}

/// Option names listed under `group`'s header, up to the next blank line.
fn help_section(help: &str, group: OptionGroup) -> Result<Vec<String>, CatalogError> {
    let header = group.help_header();
    let mut lines = help.lines();

    lines
        .by_ref()
        .find(|line| {
            line.trim()
                .strip_suffix(':')
                .is_some_and(|h| h.eq_ignore_ascii_case(header))
        })
        .ok_or(CatalogError::MissingSection(header))?;

    Ok(lines
        .take_while(|line| !line.trim().is_empty())
        .filter_map(|line| line.split_whitespace().next())
        // Wrapped description lines do not start with a flag
        .filter(|token| token.starts_with(['-', '+']))
        .map(|token| token[1..].to_string())
        .collect())
}
