//! Section/option store with tag-scoped lookups.

use crate::errors::{ConfigurationError, Result};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Raw `section -> option -> value` mapping.
pub type Sections = BTreeMap<String, BTreeMap<String, String>>;

/// Configuration shared by every stage of a workflow.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkflowConfigParser {
    sections: Sections,
}

impl WorkflowConfigParser {
    /// Creates an empty configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a configuration from already-split sections.
    #[must_use]
    pub fn from_sections(sections: Sections) -> Self {
        Self { sections }
    }

    /// Builds a configuration from a JSON object of objects.
    ///
    /// Numbers and booleans are stored in their textual form. Anything else
    /// nested inside a section is rejected.
    pub fn from_json_value(value: &serde_json::Value) -> Result<Self> {
        let serde_json::Value::Object(root) = value else {
            return Err(ConfigurationError::section(
                "<root>",
                "configuration must be a JSON object of sections",
            )
            .into());
        };

        let mut config = Self::new();
        for (section, body) in root {
            let serde_json::Value::Object(options) = body else {
                return Err(
                    ConfigurationError::section(section, "section must be a JSON object").into(),
                );
            };
            config.add_section(section);
            for (option, raw) in options {
                let value = match raw {
                    serde_json::Value::String(s) => s.clone(),
                    serde_json::Value::Number(n) => n.to_string(),
                    serde_json::Value::Bool(b) => b.to_string(),
                    serde_json::Value::Null => String::new(),
                    _ => {
                        return Err(ConfigurationError::option(
                            section,
                            option,
                            "value must be a string, number or boolean",
                        )
                        .into());
                    }
                };
                config.set(section, option, value);
            }
        }
        Ok(config)
    }

    /// Parses a configuration from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        Self::from_json_value(&value)
    }

    /// Reads a configuration from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&raw)
    }

    /// Adds an empty section if it does not exist yet.
    pub fn add_section(&mut self, section: impl Into<String>) {
        self.sections.entry(section.into()).or_default();
    }

    /// Sets an option, creating the section when needed.
    pub fn set(
        &mut self,
        section: impl Into<String>,
        option: impl Into<String>,
        value: impl Into<String>,
    ) {
        self.sections
            .entry(section.into())
            .or_default()
            .insert(option.into(), value.into());
    }

    /// Returns true if the section exists.
    #[must_use]
    pub fn has_section(&self, section: &str) -> bool {
        self.sections.contains_key(section)
    }

    /// Returns true if the option exists in the section.
    #[must_use]
    pub fn has_option(&self, section: &str, option: &str) -> bool {
        self.sections
            .get(section)
            .is_some_and(|options| options.contains_key(option))
    }

    /// Returns the section names in sorted order.
    #[must_use]
    pub fn sections(&self) -> Vec<&str> {
        self.sections.keys().map(String::as_str).collect()
    }

    /// Returns the options of a section in sorted order.
    #[must_use]
    pub fn items(&self, section: &str) -> Vec<(&str, &str)> {
        self.sections
            .get(section)
            .map(|options| {
                options
                    .iter()
                    .map(|(k, v)| (k.as_str(), v.as_str()))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Gets a single option without tag scoping.
    pub fn get(&self, section: &str, option: &str) -> Result<&str> {
        let options = self.sections.get(section).ok_or_else(|| {
            ConfigurationError::option(section, option, "section does not exist")
        })?;
        options
            .get(option)
            .map(String::as_str)
            .ok_or_else(|| ConfigurationError::option(section, option, "option not set").into())
    }

    /// Gets an option, preferring a tagged subsection over the plain section.
    ///
    /// Tagged subsections are `section-<tags>` where `<tags>` is any ordered
    /// selection of the lowercased tags joined by `-`. Exactly one tagged
    /// subsection may define the option; otherwise the lookup is ambiguous.
    pub fn get_opt_tags(&self, section: &str, option: &str, tags: &[String]) -> Result<String> {
        match self.get_opt_tags_optional(section, option, tags)? {
            Some(value) => Ok(value),
            None => {
                let searched = std::iter::once(section.to_string())
                    .chain(tagged_subsections(section, tags))
                    .map(|s| format!("[{s}]"))
                    .join(" ");
                Err(ConfigurationError::option(
                    section,
                    option,
                    format!("option not found in sections {searched}"),
                )
                .into())
            }
        }
    }

    /// Like [`get_opt_tags`](Self::get_opt_tags) but returns `None` when the
    /// option is absent everywhere.
    pub fn get_opt_tags_optional(
        &self,
        section: &str,
        option: &str,
        tags: &[String],
    ) -> Result<Option<String>> {
        let matches: Vec<(String, &String)> = tagged_subsections(section, tags)
            .filter_map(|sub| {
                let value = self.sections.get(&sub)?.get(option)?;
                Some((sub, value))
            })
            .collect();

        match matches.as_slice() {
            [] => Ok(self
                .sections
                .get(section)
                .and_then(|options| options.get(option))
                .cloned()),
            [(_, value)] => Ok(Some((*value).clone())),
            many => {
                let found = many.iter().map(|(s, _)| format!("[{s}]")).join(" ");
                Err(ConfigurationError::option(
                    section,
                    option,
                    format!("multiple values found in sections {found}"),
                )
                .into())
            }
        }
    }

    /// Returns true if the option is set in the section or a tagged subsection.
    #[must_use]
    pub fn has_option_tags(&self, section: &str, option: &str, tags: &[String]) -> bool {
        self.has_option(section, option)
            || tagged_subsections(section, tags).any(|sub| self.has_option(&sub, option))
    }

    /// Returns the plain section followed by every existing tagged subsection.
    #[must_use]
    pub fn sections_for_tags(&self, section: &str, tags: &[String]) -> Vec<String> {
        std::iter::once(section.to_string())
            .chain(tagged_subsections(section, tags))
            .filter(|s| self.has_section(s))
            .collect()
    }
}

/// Yields `section-<p>` for every ordered permutation `p` of 1..=n tags.
fn tagged_subsections<'a>(
    section: &'a str,
    tags: &'a [String],
) -> impl Iterator<Item = String> + 'a {
    let lowered: Vec<String> = tags.iter().map(|t| t.to_lowercase()).collect();
    (1..=lowered.len()).flat_map(move |len| {
        lowered
            .clone()
            .into_iter()
            .permutations(len)
            .map(move |perm| format!("{section}-{}", perm.join("-")))
    })
}
