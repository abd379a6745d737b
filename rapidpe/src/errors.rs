//! Error types for the rapidpe stage.
//!
//! Every failure at this layer aborts workflow construction. Each error
//! carries an [`ErrorInfo`] with a stable code and a remediation hint so
//! operators can diagnose a misconfigured stage without reading code.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// The main error type for rapidpe workflow construction.
#[derive(Debug, Error)]
pub enum RapidpeError {
    /// The configured follow-up method is not registered.
    #[error("{0}")]
    UnrecognizedMethod(#[from] UnrecognizedMethodError),

    /// A required configuration value is missing or malformed.
    #[error("{0}")]
    Configuration(#[from] ConfigurationError),

    /// An upstream artifact needed by a node is not in the workflow.
    #[error("{0}")]
    MissingInput(#[from] MissingInputError),

    /// Two nodes would produce the same output file.
    #[error("{0}")]
    OutputConflict(#[from] OutputConflictError),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl RapidpeError {
    /// Returns structured diagnostics for this error.
    #[must_use]
    pub fn error_info(&self) -> ErrorInfo {
        match self {
            Self::UnrecognizedMethod(err) => err.error_info(),
            Self::Configuration(err) => err.error_info(),
            Self::MissingInput(err) => err.error_info(),
            Self::OutputConflict(err) => err.error_info(),
            Self::Serialization(err) => ErrorInfo::new("RAPIDPE-005-SERDE", err.to_string()),
            Self::Io(err) => ErrorInfo::new("RAPIDPE-006-IO", err.to_string()),
        }
    }
}

/// Result alias used throughout the crate.
pub type Result<T, E = RapidpeError> = std::result::Result<T, E>;

/// Structured metadata about an error for diagnostics.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct ErrorInfo {
    /// Error code (e.g., "RAPIDPE-001-UNKNOWN_METHOD").
    pub code: String,
    /// Short summary of the error.
    pub summary: String,
    /// Hint for fixing the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fix_hint: Option<String>,
    /// Additional context key-value pairs.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub context: BTreeMap<String, String>,
}

impl ErrorInfo {
    /// Creates a new error info.
    #[must_use]
    pub fn new(code: impl Into<String>, summary: impl Into<String>) -> Self {
        let code = code.into();
        let fix_hint = suggestion_for(&code).map(str::to_string);
        Self {
            code,
            summary: summary.into(),
            fix_hint,
            context: BTreeMap::new(),
        }
    }

    /// Sets the fix hint.
    #[must_use]
    pub fn with_fix_hint(mut self, hint: impl Into<String>) -> Self {
        self.fix_hint = Some(hint.into());
        self
    }

    /// Adds a single context entry.
    #[must_use]
    pub fn with_context_entry(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    /// Converts to a JSON representation.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!(self)
    }
}

/// Default remediation hints keyed by error code.
#[must_use]
pub fn suggestion_for(code: &str) -> Option<&'static str> {
    match code {
        "RAPIDPE-001-UNKNOWN_METHOD" => Some(
            "Set rapidpe-method in [workflow-rapidpe] (or a tagged subsection) \
             to one of the registered method identifiers.",
        ),
        "RAPIDPE-002-CONFIG" => Some(
            "Check the named section and option in the workflow configuration. \
             Tagged subsections are named <section>-<tag> with lowercase tags.",
        ),
        "RAPIDPE-003-MISSING_INPUT" => Some(
            "Make sure the upstream stage that produces this file runs before \
             the rapidpe stage, or register the file as a workflow input.",
        ),
        "RAPIDPE-004-OUTPUT_CONFLICT" => Some(
            "Pass distinct tags to repeated invocations of the stage so their \
             output names do not collide.",
        ),
        _ => None,
    }
}

/// Error raised when `rapidpe-method` names an unregistered method.
#[derive(Debug, Clone, Error)]
#[error(
    "Method '{value}' not recognized for option '{option}' in section [{section}]. Must be one of: {}",
    .known.join(", ")
)]
pub struct UnrecognizedMethodError {
    /// The configuration section searched.
    pub section: String,
    /// The option holding the method identifier.
    pub option: String,
    /// The configured value.
    pub value: String,
    /// Registered identifiers, sorted.
    pub known: Vec<String>,
}

impl UnrecognizedMethodError {
    /// Creates a new unrecognized method error.
    #[must_use]
    pub fn new(
        section: impl Into<String>,
        option: impl Into<String>,
        value: impl Into<String>,
        known: Vec<String>,
    ) -> Self {
        Self {
            section: section.into(),
            option: option.into(),
            value: value.into(),
            known,
        }
    }

    /// Returns structured diagnostics.
    #[must_use]
    pub fn error_info(&self) -> ErrorInfo {
        ErrorInfo::new("RAPIDPE-001-UNKNOWN_METHOD", self.to_string())
            .with_context_entry("section", &self.section)
            .with_context_entry("option", &self.option)
            .with_context_entry("value", &self.value)
            .with_context_entry("known", self.known.join(","))
    }
}

/// Error raised when a configuration value is missing or malformed.
#[derive(Debug, Clone, Error)]
#[error("Configuration error in [{section}]{}: {message}", option_suffix(.option.as_deref()))]
pub struct ConfigurationError {
    /// The section involved.
    pub section: String,
    /// The option involved, if any.
    pub option: Option<String>,
    /// Description of the problem.
    pub message: String,
}

impl ConfigurationError {
    /// Creates an error about a whole section.
    #[must_use]
    pub fn section(section: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            section: section.into(),
            option: None,
            message: message.into(),
        }
    }

    /// Creates an error about a single option.
    #[must_use]
    pub fn option(
        section: impl Into<String>,
        option: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            section: section.into(),
            option: Some(option.into()),
            message: message.into(),
        }
    }

    /// Returns structured diagnostics.
    #[must_use]
    pub fn error_info(&self) -> ErrorInfo {
        let info = ErrorInfo::new("RAPIDPE-002-CONFIG", self.to_string())
            .with_context_entry("section", &self.section);
        match &self.option {
            Some(option) => info.with_context_entry("option", option),
            None => info,
        }
    }
}

fn option_suffix(option: Option<&str>) -> String {
    option.map(|o| format!(" option '{o}'")).unwrap_or_default()
}

/// Error raised when an upstream artifact cannot be located.
#[derive(Debug, Clone, Error)]
#[error("Missing input for {consumer}: {what}")]
pub struct MissingInputError {
    /// The node or stage that needed the input.
    pub consumer: String,
    /// Description of the missing input.
    pub what: String,
}

impl MissingInputError {
    /// Creates a new missing input error.
    #[must_use]
    pub fn new(consumer: impl Into<String>, what: impl Into<String>) -> Self {
        Self {
            consumer: consumer.into(),
            what: what.into(),
        }
    }

    /// Returns structured diagnostics.
    #[must_use]
    pub fn error_info(&self) -> ErrorInfo {
        ErrorInfo::new("RAPIDPE-003-MISSING_INPUT", self.to_string())
            .with_context_entry("consumer", &self.consumer)
    }
}

/// Error raised when an output file name is already registered.
#[derive(Debug, Clone, Error)]
#[error("Output conflict for file '{file}': {message}")]
pub struct OutputConflictError {
    /// The conflicting logical file name.
    pub file: String,
    /// Additional message.
    pub message: String,
}

impl OutputConflictError {
    /// Creates a new output conflict error.
    #[must_use]
    pub fn new(file: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            message: message.into(),
        }
    }

    /// Returns structured diagnostics.
    #[must_use]
    pub fn error_info(&self) -> ErrorInfo {
        ErrorInfo::new("RAPIDPE-004-OUTPUT_CONFLICT", self.to_string())
            .with_context_entry("file", &self.file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_info_creation() {
        let info = ErrorInfo::new("TEST-001", "Test error")
            .with_fix_hint("Fix this by doing that")
            .with_context_entry("stage", "rapidpe");

        assert_eq!(info.code, "TEST-001");
        assert_eq!(info.summary, "Test error");
        assert_eq!(info.fix_hint, Some("Fix this by doing that".to_string()));
        assert_eq!(info.context.get("stage"), Some(&"rapidpe".to_string()));
    }

    #[test]
    fn test_unrecognized_method_lists_known() {
        let err = UnrecognizedMethodError::new(
            "workflow-rapidpe",
            "rapidpe-method",
            "BOGUS",
            vec!["COH_PTF_WORKFLOW".to_string(), "OTHER".to_string()],
        );

        let msg = err.to_string();
        assert!(msg.contains("BOGUS"));
        assert!(msg.contains("COH_PTF_WORKFLOW, OTHER"));
        assert!(msg.contains("[workflow-rapidpe]"));

        let info = err.error_info();
        assert_eq!(info.code, "RAPIDPE-001-UNKNOWN_METHOD");
        assert!(info.fix_hint.is_some());
    }

    #[test]
    fn test_configuration_error_display() {
        let err = ConfigurationError::option("executables", "rapidpe", "option not set");
        assert_eq!(
            err.to_string(),
            "Configuration error in [executables] option 'rapidpe': option not set"
        );

        let err = ConfigurationError::section("workflow-rapidpe", "not a table");
        assert_eq!(err.to_string(), "Configuration error in [workflow-rapidpe]: not a table");
    }

    #[test]
    fn test_wrapped_error_info() {
        let err: RapidpeError = MissingInputError::new("rapidpe", "bank file").into();
        let json = err.error_info().to_json();
        assert_eq!(json["code"], "RAPIDPE-003-MISSING_INPUT");
        assert_eq!(json["context"]["consumer"], "rapidpe");
    }

    #[test]
    fn test_suggestions() {
        assert!(suggestion_for("RAPIDPE-004-OUTPUT_CONFLICT").is_some());
        assert!(suggestion_for("UNKNOWN").is_none());
    }
}
