//! Render configuration as supplied by callers.
//!
//! A [`RenderConfig`] describes one output file: where it goes and which
//! `convert` options produce it. Options are kept in an [`OptionMap`] that
//! preserves the order they were written in, because `convert` applies options
//! in command-line order within a group.
//!
//! Values are one of three shapes:
//!
//! | JSON / TOML | [`OptionValue`] | Emitted as |
//! |---|---|---|
//! | `null` or `true` | `Flag` | `-strip` |
//! | `"RGB"`, `99`, `0.5` | `Value` | `-colorspace RGB` |
//! | `["8BIMTEXT", "IPTC"]` | `Values` | `+profile 8BIMTEXT +profile IPTC` |
//!
//! ```
//! # use image_wrangler::transform::RenderConfig;
//! let config: RenderConfig = serde_json::from_str(r#"{
//!     "filepath": "/tmp/thumb.jpg",
//!     "options": {"colorspace": "RGB", "+profile": ["8BIMTEXT", "IPTC"], "append": null}
//! }"#).unwrap();
//! let keys: Vec<&str> = config.options.keys().collect();
//! assert_eq!(keys, ["colorspace", "+profile", "append"]);
//! ```

use serde::de::{self, Deserializer, MapAccess, SeqAccess, Unexpected, Visitor};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Value of one option key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum OptionValue {
    /// Argument-less flag.
    Flag,
    /// Flag followed by one argument.
    Value(String),
    /// Flag repeated once per argument.
    Values(Vec<String>),
}

impl OptionValue {
    /// Arguments to emit, one entry per occurrence of the flag.
    pub fn arguments(&self) -> Vec<Option<&str>> {
        match self {
            Self::Flag => vec![None],
            Self::Value(value) => vec![Some(value.as_str())],
            Self::Values(values) => values.iter().map(|v| Some(v.as_str())).collect(),
        }
    }
}

impl From<&str> for OptionValue {
    fn from(value: &str) -> Self {
        Self::Value(value.to_string())
    }
}

impl From<String> for OptionValue {
    fn from(value: String) -> Self {
        Self::Value(value)
    }
}

impl From<Vec<String>> for OptionValue {
    fn from(values: Vec<String>) -> Self {
        Self::Values(values)
    }
}

impl<const N: usize> From<[&str; N]> for OptionValue {
    fn from(values: [&str; N]) -> Self {
        Self::Values(values.iter().map(|v| v.to_string()).collect())
    }
}

struct OptionValueVisitor;

impl<'de> Visitor<'de> for OptionValueVisitor {
    type Value = OptionValue;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("null, true, a string, a number, or a list of strings and numbers")
    }

    fn visit_unit<E: de::Error>(self) -> Result<OptionValue, E> {
        Ok(OptionValue::Flag)
    }

    fn visit_none<E: de::Error>(self) -> Result<OptionValue, E> {
        Ok(OptionValue::Flag)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<OptionValue, D::Error> {
        deserializer.deserialize_any(self)
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<OptionValue, E> {
        if v {
            Ok(OptionValue::Flag)
        } else {
            Err(E::invalid_value(Unexpected::Bool(v), &self))
        }
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<OptionValue, E> {
        Ok(OptionValue::Value(v.to_string()))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<OptionValue, E> {
        Ok(OptionValue::Value(v.to_string()))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<OptionValue, E> {
        Ok(OptionValue::Value(v.to_string()))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<OptionValue, E> {
        Ok(OptionValue::Value(v.to_string()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<OptionValue, E> {
        Ok(OptionValue::Value(v))
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<OptionValue, A::Error> {
        let mut values = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(Argument(value)) = seq.next_element()? {
            values.push(value);
        }
        Ok(OptionValue::Values(values))
    }
}

impl<'de> Deserialize<'de> for OptionValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(OptionValueVisitor)
    }
}

/// One element of a repeated option: a string or a number.
struct Argument(String);

impl<'de> Deserialize<'de> for Argument {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ArgumentVisitor;

        impl Visitor<'_> for ArgumentVisitor {
            type Value = Argument;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a string or a number")
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Argument, E> {
                Ok(Argument(v.to_string()))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Argument, E> {
                Ok(Argument(v.to_string()))
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<Argument, E> {
                Ok(Argument(v.to_string()))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Argument, E> {
                Ok(Argument(v.to_string()))
            }
        }

        deserializer.deserialize_any(ArgumentVisitor)
    }
}

/// Option keys and values in the order they were supplied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptionMap(Vec<(String, OptionValue)>);

impl OptionMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `key`, replacing an existing value in place.
    pub fn insert(&mut self, key: impl Into<String>, value: OptionValue) {
        let key = key.into();
        match self.0.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = value,
            None => self.0.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&OptionValue> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &OptionValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, OptionValue)> for OptionMap {
    fn from_iter<I: IntoIterator<Item = (K, OptionValue)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (key, value) in iter {
            map.insert(key, value);
        }
        map
    }
}

impl Serialize for OptionMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, value) in &self.0 {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for OptionMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct OptionMapVisitor;

        impl<'de> Visitor<'de> for OptionMapVisitor {
            type Value = OptionMap;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of option names to values")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<OptionMap, A::Error> {
                let mut map = OptionMap::new();
                while let Some((key, value)) = access.next_entry::<String, OptionValue>()? {
                    map.insert(key, value);
                }
                Ok(map)
            }
        }

        deserializer.deserialize_map(OptionMapVisitor)
    }
}

/// One requested output file.
///
/// `read_options` are emitted before the source path (e.g. `density` for
/// rasterizing vector input). `relegated_options` are emitted after all other
/// options, right before the output path (e.g. `strip`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderConfig {
    /// Output path. Generated in the scratch directory when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filepath: Option<PathBuf>,
    /// File name for a generated output path.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    pub options: OptionMap,
    #[serde(skip_serializing_if = "OptionMap::is_empty")]
    pub read_options: OptionMap,
    #[serde(skip_serializing_if = "OptionMap::is_empty")]
    pub relegated_options: OptionMap,
}

impl RenderConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filepath(mut self, path: impl Into<PathBuf>) -> Self {
        self.filepath = Some(path.into());
        self
    }

    pub fn filename(mut self, name: impl Into<String>) -> Self {
        self.filename = Some(name.into());
        self
    }

    pub fn option(mut self, key: &str, value: impl Into<OptionValue>) -> Self {
        self.options.insert(key, value.into());
        self
    }

    pub fn flag(mut self, key: &str) -> Self {
        self.options.insert(key, OptionValue::Flag);
        self
    }

    pub fn read_option(mut self, key: &str, value: impl Into<OptionValue>) -> Self {
        self.read_options.insert(key, value.into());
        self
    }

    pub fn relegated_flag(mut self, key: &str) -> Self {
        self.relegated_options.insert(key, OptionValue::Flag);
        self
    }

    pub fn relegated_option(mut self, key: &str, value: impl Into<OptionValue>) -> Self {
        self.relegated_options.insert(key, value.into());
        self
    }

    /// True when no bucket holds any option.
    pub fn has_no_options(&self) -> bool {
        self.options.is_empty() && self.read_options.is_empty() && self.relegated_options.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_shapes_from_json() {
        let map: OptionMap = serde_json::from_str(
            r#"{"strip": null, "auto-orient": true, "colorspace": "RGB",
                "quality": 99, "gamma": 0.5, "+profile": ["8BIMTEXT", "IPTC"]}"#,
        )
        .unwrap();

        assert_eq!(map.get("strip"), Some(&OptionValue::Flag));
        assert_eq!(map.get("auto-orient"), Some(&OptionValue::Flag));
        assert_eq!(map.get("colorspace"), Some(&OptionValue::from("RGB")));
        assert_eq!(map.get("quality"), Some(&OptionValue::from("99")));
        assert_eq!(map.get("gamma"), Some(&OptionValue::from("0.5")));
        assert_eq!(
            map.get("+profile"),
            Some(&OptionValue::from(["8BIMTEXT", "IPTC"]))
        );
    }

    #[test]
    fn false_is_rejected() {
        let result: Result<OptionMap, _> = serde_json::from_str(r#"{"strip": false}"#);
        assert!(result.is_err());
    }

    #[test]
    fn nested_maps_are_rejected() {
        let result: Result<OptionMap, _> =
            serde_json::from_str(r#"{"read_options": {"density": 300}}"#);
        assert!(result.is_err());
    }

    #[test]
    fn map_preserves_source_order() {
        let map: OptionMap =
            serde_json::from_str(r#"{"wave": "1x2", "append": null, "colorspace": "RGB"}"#)
                .unwrap();
        let keys: Vec<&str> = map.keys().collect();
        assert_eq!(keys, ["wave", "append", "colorspace"]);
    }

    #[test]
    fn insert_replaces_in_place() {
        let mut map = OptionMap::new();
        map.insert("a", OptionValue::Flag);
        map.insert("b", OptionValue::Flag);
        map.insert("a", OptionValue::from("1"));
        let pairs: Vec<_> = map.iter().collect();
        assert_eq!(pairs, [("a", &OptionValue::from("1")), ("b", &OptionValue::Flag)]);
    }

    #[test]
    fn arguments_per_shape() {
        assert_eq!(OptionValue::Flag.arguments(), [None::<&str>]);
        assert_eq!(OptionValue::from("x").arguments(), [Some("x")]);
        assert_eq!(
            OptionValue::from(["a", "b"]).arguments(),
            [Some("a"), Some("b")]
        );
    }

    #[test]
    fn render_config_from_toml() {
        let config: RenderConfig = toml::from_str(
            r#"
filepath = "/tmp/out.jpg"

[options]
geometry = "100x100"
sharpen = "1x0.5"

[read_options]
density = 300

[relegated_options]
strip = true
"#,
        )
        .unwrap();

        assert_eq!(config.filepath, Some(PathBuf::from("/tmp/out.jpg")));
        assert_eq!(config.options.len(), 2);
        assert_eq!(config.read_options.get("density"), Some(&OptionValue::from("300")));
        assert_eq!(config.relegated_options.get("strip"), Some(&OptionValue::Flag));
    }

    #[test]
    fn render_config_rejects_unknown_fields() {
        let result: Result<RenderConfig, _> =
            serde_json::from_str(r#"{"filpath": "/tmp/x.jpg", "options": {}}"#);
        assert!(result.is_err());
    }

    #[test]
    fn builder_matches_parsed_config() {
        let built = RenderConfig::new()
            .filepath("/tmp/out.jpg")
            .option("colorspace", "RGB")
            .option("+profile", ["8BIMTEXT", "IPTC"])
            .flag("append");
        let parsed: RenderConfig = serde_json::from_str(
            r#"{"filepath": "/tmp/out.jpg",
                "options": {"colorspace": "RGB", "+profile": ["8BIMTEXT", "IPTC"], "append": null}}"#,
        )
        .unwrap();
        assert_eq!(built, parsed);
    }

    #[test]
    fn serializes_flags_as_null() {
        let config = RenderConfig::new().flag("strip").option("quality", "90");
        let json = serde_json::to_value(&config).unwrap();
        assert!(json["options"]["strip"].is_null());
        assert_eq!(json["options"]["quality"], "90");
        assert!(json.get("filepath").is_none());
    }

    #[test]
    fn has_no_options_checks_every_bucket() {
        assert!(RenderConfig::new().has_no_options());
        assert!(!RenderConfig::new().relegated_flag("strip").has_no_options());
    }
}
