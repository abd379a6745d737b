//! Stage span attributes and timing.

use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Attributes describing one invocation of a workflow stage.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StageSpanAttributes {
    /// Stage name.
    pub stage_name: String,
    /// Tags the stage was invoked with.
    pub tags: Vec<String>,
    /// Selected method identifier.
    pub method: Option<String>,
    /// Number of output files produced.
    pub output_count: Option<usize>,
    /// Duration in milliseconds.
    pub duration_ms: Option<f64>,
    /// Error message if failed.
    pub error: Option<String>,
}

impl StageSpanAttributes {
    /// Creates new stage span attributes.
    #[must_use]
    pub fn new(stage_name: impl Into<String>, tags: &[String]) -> Self {
        Self {
            stage_name: stage_name.into(),
            tags: tags.to_vec(),
            ..Default::default()
        }
    }

    /// Sets the selected method.
    #[must_use]
    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }

    /// Sets the output count.
    #[must_use]
    pub const fn with_output_count(mut self, count: usize) -> Self {
        self.output_count = Some(count);
        self
    }

    /// Sets the duration.
    #[must_use]
    pub const fn with_duration_ms(mut self, duration_ms: f64) -> Self {
        self.duration_ms = Some(duration_ms);
        self
    }

    /// Sets the error.
    #[must_use]
    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    /// Logs the stage entry.
    pub fn log_enter(&self) {
        tracing::info!(
            stage = %self.stage_name,
            tags = ?self.tags,
            "Entering {} module.",
            self.stage_name
        );
    }

    /// Logs the stage exit, at error level when the stage failed.
    pub fn log_exit(&self) {
        match &self.error {
            None => tracing::info!(
                stage = %self.stage_name,
                method = self.method.as_deref().unwrap_or_default(),
                outputs = self.output_count.unwrap_or_default(),
                duration_ms = self.duration_ms.unwrap_or_default(),
                "Leaving {} module.",
                self.stage_name
            ),
            Some(error) => tracing::error!(
                stage = %self.stage_name,
                method = self.method.as_deref().unwrap_or_default(),
                duration_ms = self.duration_ms.unwrap_or_default(),
                error = %error,
                "Stage {} failed",
                self.stage_name
            ),
        }
    }
}

/// Wall-clock timer for one stage call.
#[derive(Debug, Clone, Copy)]
pub struct SpanTimer(Instant);

impl SpanTimer {
    /// Starts timing now.
    #[must_use]
    pub fn start() -> Self {
        Self(Instant::now())
    }

    /// Milliseconds since [`start`](Self::start).
    #[must_use]
    pub fn elapsed_ms(self) -> f64 {
        self.0.elapsed().as_secs_f64() * 1000.0
    }
}
