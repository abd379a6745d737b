//! Method selection for the rapidpe stage.

use super::{MethodRegistry, StageParams};
use crate::errors::{Result, UnrecognizedMethodError};
use crate::observability::{SpanTimer, StageSpanAttributes};
use crate::workflow::{make_analysis_dir, FileList, Workflow};
use std::path::Path;
use std::sync::Arc;

/// Name used in logs and spans.
pub const STAGE_NAME: &str = "rapidpe";

/// Section holding the stage options.
pub const RAPIDPE_SECTION: &str = "workflow-rapidpe";

/// Option selecting the follow-up method.
pub const METHOD_OPTION: &str = "rapidpe-method";

/// Dispatches the rapidpe stage to a registered method.
#[derive(Debug, Clone)]
pub struct RapidpeFollowup {
    registry: Arc<MethodRegistry>,
}

impl Default for RapidpeFollowup {
    fn default() -> Self {
        Self::new(Arc::new(MethodRegistry::with_builtin_methods()))
    }
}

impl RapidpeFollowup {
    /// Creates a dispatcher over `registry`.
    #[must_use]
    pub const fn new(registry: Arc<MethodRegistry>) -> Self {
        Self { registry }
    }

    /// The methods this dispatcher can select.
    #[must_use]
    pub fn registry(&self) -> &MethodRegistry {
        &self.registry
    }

    /// Sets up the stage.
    ///
    /// Creates `output_dir`, resolves `rapidpe-method` scoped by `tags` and
    /// returns whatever the selected method produces. `None` tags behave
    /// exactly like an empty slice.
    ///
    /// # Errors
    ///
    /// [`RapidpeError::UnrecognizedMethod`](crate::errors::RapidpeError::UnrecognizedMethod)
    /// when the configured identifier is not registered, otherwise any error
    /// of the selected method.
    pub fn setup(
        &self,
        workflow: &mut Workflow,
        output_dir: impl AsRef<Path>,
        tags: Option<&[String]>,
        params: &StageParams,
    ) -> Result<FileList> {
        let tags = tags.unwrap_or_default();
        let timer = SpanTimer::start();
        let attrs = StageSpanAttributes::new(STAGE_NAME, tags);
        attrs.log_enter();

        let result = self.dispatch(workflow, output_dir.as_ref(), tags, params);

        let attrs = attrs.with_duration_ms(timer.elapsed_ms());
        match &result {
            Ok((method, files)) => attrs
                .with_method(method.as_str())
                .with_output_count(files.len())
                .log_exit(),
            Err(err) => attrs.with_error(err.to_string()).log_exit(),
        }

        result.map(|(_, files)| files)
    }

    fn dispatch(
        &self,
        workflow: &mut Workflow,
        output_dir: &Path,
        tags: &[String],
        params: &StageParams,
    ) -> Result<(String, FileList)> {
        make_analysis_dir(output_dir)?;

        let configured = workflow
            .config()
            .get_opt_tags(RAPIDPE_SECTION, METHOD_OPTION, tags)?;
        let identifier = configured.trim();

        let method = self.registry.get(identifier).ok_or_else(|| {
            UnrecognizedMethodError::new(
                RAPIDPE_SECTION,
                METHOD_OPTION,
                identifier,
                self.registry.identifiers(),
            )
        })?;

        tracing::debug!(method = identifier, "Selected rapidpe method");
        let files = method.setup(workflow, output_dir, tags, params)?;
        Ok((identifier.to_string(), files))
    }
}

/// Sets up the rapidpe stage with the built-in methods.
///
/// See [`RapidpeFollowup::setup`].
pub fn setup_rapidpe_followup_workflow(
    workflow: &mut Workflow,
    output_dir: impl AsRef<Path>,
    tags: Option<&[String]>,
    params: &StageParams,
) -> Result<FileList> {
    RapidpeFollowup::default().setup(workflow, output_dir, tags, params)
}
