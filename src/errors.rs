//! Multi-key error accumulator.
//!
//! Every validating component ([`Variant`](crate::transform::Variant),
//! [`ComponentList`](crate::transform::ComponentList),
//! [`Transformer`](crate::transform::Transformer),
//! [`Image`](crate::image::Image)) collects configuration and processing
//! problems here instead of returning early. Callers check [`Errors::is_empty`]
//! and render diagnostics with [`Errors::full_messages`] or `Display`.
//! Keys are kept sorted, so output does not depend on which check ran first.
//!
//! Messages are keyed by logical concern (`options`, `variant`, `config`,
//! `result`, `component_list`, ...). A full message is `"<key> <message>"`,
//! except under the [`BASE`] key where the message stands alone.
//!
//! ```
//! # use image_wrangler::errors::Errors;
//! let mut errors = Errors::new();
//! errors.add("topic", "must be valid");
//! errors.add("new_topic", "is missing");
//! assert_eq!(errors.to_string(), "new_topic is missing; topic must be valid");
//! ```

use std::collections::BTreeMap;
use std::fmt;

/// Key whose messages render without a prefix.
pub const BASE: &str = "base";

/// Key-sorted, de-duplicating collection of error messages grouped by key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Errors {
    entries: BTreeMap<String, Vec<String>>,
}

impl Errors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `message` under `key`. Duplicate messages for a key are ignored.
    pub fn add(&mut self, key: &str, message: impl Into<String>) {
        let message = message.into();
        let messages = self.entries.entry(key.to_string()).or_default();
        if !messages.contains(&message) {
            messages.push(message);
        }
    }

    /// Messages recorded under `key`, in insertion order.
    pub fn get(&self, key: &str) -> &[String] {
        self.entries.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains_key(&self, key: &str) -> bool {
        !self.get(key).is_empty()
    }

    pub fn remove(&mut self, key: &str) -> Vec<String> {
        self.entries.remove(key).unwrap_or_default()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total number of messages across all keys.
    pub fn len(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    /// `(key, message)` pairs, keys alphabetically, messages in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .flat_map(|(key, messages)| messages.iter().map(move |m| (key.as_str(), m.as_str())))
    }

    /// Human-readable messages, `"<key> <message>"` each, in [`Errors::iter`] order.
    pub fn full_messages(&self) -> Vec<String> {
        self.iter()
            .map(|(key, message)| full_message(key, message))
            .collect()
    }

    /// Copy every message of `other` into `self` under the same keys.
    pub fn merge(&mut self, other: &Errors) {
        for (key, message) in other.iter() {
            self.add(key, message);
        }
    }
}

fn full_message(key: &str, message: &str) -> String {
    if key == BASE {
        message.to_string()
    } else {
        format!("{key} {message}")
    }
}

impl fmt::Display for Errors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut messages = self.full_messages();
        messages.sort();
        write!(f, "{}", messages.join("; "))
    }
}
