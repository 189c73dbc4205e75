//! A single `convert` flag and the group-ordered buckets it is sorted into.

use crate::magick::catalog::{OptionCatalog, OptionGroup};
use std::fmt;

/// Whether a flag sets (`-`) or removes (`+`) a setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sign {
    Minus,
    Plus,
}

impl Sign {
    fn prefix(self) -> char {
        match self {
            Self::Minus => '-',
            Self::Plus => '+',
        }
    }
}

/// One normalized command-line flag with its optional argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOption {
    name: String,
    sign: Sign,
    group: OptionGroup,
    value: Option<String>,
}

impl CommandOption {
    /// Build an option from a raw key such as `-resize`, `+profile` or `strip`.
    pub fn new(raw_key: &str, value: Option<&str>, catalog: &OptionCatalog) -> Self {
        let name = Self::clean(raw_key).to_string();
        let group = catalog.group(&name);
        Self {
            name,
            sign: if Self::is_plus_flag(raw_key) {
                Sign::Plus
            } else {
                Sign::Minus
            },
            group,
            value: value.map(str::to_string),
        }
    }

    /// Strip every leading `-` and `+`.
    pub fn clean(key: &str) -> &str {
        key.trim_start_matches(['-', '+'])
    }

    pub fn is_plus_flag(key: &str) -> bool {
        key.starts_with('+')
    }

    /// Whether the catalog knows `key` once cleaned.
    pub fn recognized(key: &str, catalog: &OptionCatalog) -> bool {
        catalog.recognizes(Self::clean(key))
    }

    /// Option name without its sign.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn sign(&self) -> Sign {
        self.sign
    }

    pub fn group(&self) -> OptionGroup {
        self.group
    }

    /// The argument, or `None` for argument-less flags.
    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    /// The flag token, e.g. `+profile`.
    pub fn render(&self) -> String {
        format!("{}{}", self.sign.prefix(), self.name)
    }
}

impl fmt::Display for CommandOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.sign.prefix(), self.name)
    }
}

/// Options bucketed by [`OptionGroup`], each bucket in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupedOptions {
    settings: Vec<CommandOption>,
    operators: Vec<CommandOption>,
    sequence_operators: Vec<CommandOption>,
}

impl GroupedOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `option` to its group's bucket.
    ///
    /// Returns `false` and drops the option when its group is
    /// [`OptionGroup::Unknown`].
    pub fn push(&mut self, option: CommandOption) -> bool {
        let bucket = match option.group {
            OptionGroup::ImageSettings => &mut self.settings,
            OptionGroup::ImageOperators => &mut self.operators,
            OptionGroup::ImageSequenceOperators => &mut self.sequence_operators,
            OptionGroup::Unknown => return false,
        };
        bucket.push(option);
        true
    }

    pub fn get(&self, group: OptionGroup) -> &[CommandOption] {
        match group {
            OptionGroup::ImageSettings => &self.settings,
            OptionGroup::ImageOperators => &self.operators,
            OptionGroup::ImageSequenceOperators => &self.sequence_operators,
            OptionGroup::Unknown => &[],
        }
    }

    /// All options: settings, then operators, then sequence operators.
    pub fn ordered(&self) -> impl Iterator<Item = &CommandOption> {
        OptionGroup::ORDERED
            .into_iter()
            .flat_map(move |group| self.get(group).iter())
    }

    /// Flat argument tokens. Argument-less flags emit only the flag.
    pub fn merged(&self) -> Vec<String> {
        let mut tokens = Vec::with_capacity(self.len() * 2);
        for option in self.ordered() {
            tokens.push(option.render());
            if let Some(value) = option.value() {
                tokens.push(value.to_string());
            }
        }
        tokens
    }

    pub fn len(&self) -> usize {
        self.settings.len() + self.operators.len() + self.sequence_operators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::fixture_catalog;
    use proptest::prelude::*;

    #[test]
    fn clean_strips_all_leading_signs() {
        assert_eq!(CommandOption::clean("-resize"), "resize");
        assert_eq!(CommandOption::clean("+profile"), "profile");
        assert_eq!(CommandOption::clean("--+strip"), "strip");
        assert_eq!(CommandOption::clean("auto-orient"), "auto-orient");
    }

    #[test]
    fn plus_flag_detection() {
        assert!(CommandOption::is_plus_flag("+profile"));
        assert!(!CommandOption::is_plus_flag("-profile"));
        assert!(!CommandOption::is_plus_flag("profile"));
    }

    #[test]
    fn recognition_uses_cleaned_key() {
        let catalog = fixture_catalog();
        assert!(CommandOption::recognized("-resize", &catalog));
        assert!(CommandOption::recognized("+profile", &catalog));
        assert!(!CommandOption::recognized("qwerty", &catalog));
    }

    #[test]
    fn render_keeps_sign() {
        let catalog = fixture_catalog();
        let plus = CommandOption::new("+profile", Some("IPTC"), &catalog);
        assert_eq!(plus.render(), "+profile");
        assert_eq!(plus.to_string(), "+profile");
        assert_eq!(plus.sign(), Sign::Plus);
        assert_eq!(plus.value(), Some("IPTC"));

        let minus = CommandOption::new("strip", None, &catalog);
        assert_eq!(minus.render(), "-strip");
        assert_eq!(minus.value(), None);
    }

    #[test]
    fn group_comes_from_catalog() {
        let catalog = fixture_catalog();
        assert_eq!(
            CommandOption::new("-colorspace", Some("RGB"), &catalog).group(),
            OptionGroup::ImageSettings
        );
        assert_eq!(
            CommandOption::new("qwerty", None, &catalog).group(),
            OptionGroup::Unknown
        );
    }

    // =========================================================================
    // GroupedOptions
    // =========================================================================

    fn grouped(pairs: &[(&str, Option<&str>)]) -> GroupedOptions {
        let catalog = fixture_catalog();
        let mut grouped = GroupedOptions::new();
        for (key, value) in pairs {
            grouped.push(CommandOption::new(key, *value, &catalog));
        }
        grouped
    }

    #[test]
    fn ordered_by_group_then_insertion() {
        let options = grouped(&[
            ("append", None),
            ("gamma", Some("0.8")),
            ("quality", Some("90")),
            ("resize", Some("50%")),
            ("flatten", None),
            ("colorspace", Some("sRGB")),
        ]);
        let names: Vec<&str> = options.ordered().map(CommandOption::name).collect();
        assert_eq!(
            names,
            ["quality", "colorspace", "gamma", "resize", "append", "flatten"]
        );
    }

    const MIXED: [(&str, OptionGroup); 6] = [
        ("quality", OptionGroup::ImageSettings),
        ("colorspace", OptionGroup::ImageSettings),
        ("gamma", OptionGroup::ImageOperators),
        ("resize", OptionGroup::ImageOperators),
        ("append", OptionGroup::ImageSequenceOperators),
        ("flatten", OptionGroup::ImageSequenceOperators),
    ];

    fn rank(group: OptionGroup) -> usize {
        OptionGroup::ORDERED
            .iter()
            .position(|g| *g == group)
            .unwrap_or(usize::MAX)
    }

    proptest! {
        #[test]
        fn any_declaration_order_is_grouped_and_stable(
            shuffled in Just(MIXED.to_vec()).prop_shuffle()
        ) {
            let pairs: Vec<(&str, Option<&str>)> =
                shuffled.iter().map(|(name, _)| (*name, None)).collect();
            let options = grouped(&pairs);
            let emitted: Vec<&CommandOption> = options.ordered().collect();
            prop_assert_eq!(emitted.len(), MIXED.len());

            let ranks: Vec<usize> = emitted.iter().map(|o| rank(o.group())).collect();
            prop_assert!(ranks.windows(2).all(|w| w[0] <= w[1]), "{:?}", ranks);

            for group in OptionGroup::ORDERED {
                let declared: Vec<&str> = shuffled
                    .iter()
                    .filter(|(_, g)| *g == group)
                    .map(|(name, _)| *name)
                    .collect();
                let placed: Vec<&str> = emitted
                    .iter()
                    .filter(|o| o.group() == group)
                    .map(|o| o.name())
                    .collect();
                prop_assert_eq!(placed, declared);
            }
        }
    }

    #[test]
    fn unknown_options_are_never_placed() {
        let catalog = fixture_catalog();
        let mut options = GroupedOptions::new();
        assert!(!options.push(CommandOption::new("qwerty", Some("1"), &catalog)));
        assert!(options.is_empty());
        assert!(options.get(OptionGroup::Unknown).is_empty());
    }

    #[test]
    fn merged_emits_single_token_for_flags() {
        let options = grouped(&[("strip", None), ("quality", Some("85"))]);
        assert_eq!(options.merged(), ["-quality", "85", "-strip"]);
    }

    #[test]
    fn merged_repeats_plus_flags() {
        let options = grouped(&[
            ("colorspace", Some("RGB")),
            ("+profile", Some("8BIMTEXT")),
            ("+profile", Some("IPTC")),
            ("append", None),
        ]);
        assert_eq!(
            options.merged(),
            ["-colorspace", "RGB", "+profile", "8BIMTEXT", "+profile", "IPTC", "-append"]
        );
        assert_eq!(options.len(), 4);
    }
}
