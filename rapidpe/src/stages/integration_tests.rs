//! Integration tests for method dispatch.

#[cfg(test)]
mod tests {
    use crate::config::WorkflowConfigParser;
    use crate::errors::{RapidpeError, Result};
    use crate::stages::{
        setup_rapidpe_followup_workflow, FollowupMethod, MethodRegistry, RapidpeFollowup,
        StageParams, METHOD_OPTION, RAPIDPE_ROLE, RAPIDPE_SECTION,
    };
    use crate::testing::TestWorkflow;
    use crate::workflow::{File, FileList, Workflow};
    use parking_lot::Mutex;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::path::{Path, PathBuf};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[derive(Debug, Clone, PartialEq)]
    struct Call {
        output_dir: PathBuf,
        tags: Vec<String>,
        params: StageParams,
    }

    #[derive(Debug)]
    struct RecordingMethod {
        id: &'static str,
        counter: Arc<AtomicUsize>,
        calls: Arc<Mutex<Vec<Call>>>,
    }

    impl RecordingMethod {
        fn new(id: &'static str) -> Self {
            Self {
                id,
                counter: Arc::new(AtomicUsize::new(0)),
                calls: Arc::new(Mutex::new(Vec::new())),
            }
        }
    }

    impl FollowupMethod for RecordingMethod {
        fn identifier(&self) -> &str {
            self.id
        }

        fn setup(
            &self,
            _workflow: &mut Workflow,
            output_dir: &Path,
            tags: &[String],
            params: &StageParams,
        ) -> Result<FileList> {
            self.counter.fetch_add(1, Ordering::SeqCst);
            self.calls.lock().push(Call {
                output_dir: output_dir.to_path_buf(),
                tags: tags.to_vec(),
                params: params.clone(),
            });
            let file = File::new_output(
                vec!["H1".to_string()],
                self.id,
                None,
                output_dir,
                "xml.gz",
                tags.to_vec(),
            )?;
            Ok(std::iter::once(file).collect())
        }
    }

    struct Harness {
        followup: RapidpeFollowup,
        alpha: Arc<AtomicUsize>,
        beta: Arc<AtomicUsize>,
        alpha_calls: Arc<Mutex<Vec<Call>>>,
    }

    fn harness() -> Harness {
        let alpha = RecordingMethod::new("ALPHA");
        let beta = RecordingMethod::new("BETA");
        let harness_counters = (
            Arc::clone(&alpha.counter),
            Arc::clone(&beta.counter),
            Arc::clone(&alpha.calls),
        );

        let registry = MethodRegistry::new();
        registry.register(Arc::new(alpha));
        registry.register(Arc::new(beta));

        Harness {
            followup: RapidpeFollowup::new(Arc::new(registry)),
            alpha: harness_counters.0,
            beta: harness_counters.1,
            alpha_calls: harness_counters.2,
        }
    }

    fn tags(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn test_invokes_exactly_the_selected_method() {
        let h = harness();
        let dir = tempfile::tempdir().unwrap();
        let mut wf = TestWorkflow::new().with_method("BETA").build().unwrap();

        let out = h
            .followup
            .setup(&mut wf, dir.path(), None, &StageParams::new())
            .unwrap();

        assert_eq!(h.alpha.load(Ordering::SeqCst), 0);
        assert_eq!(h.beta.load(Ordering::SeqCst), 1);
        assert_eq!(out.names(), vec!["H1-BETA.xml.gz"]);
    }

    #[test]
    fn test_method_value_is_trimmed() {
        let h = harness();
        let dir = tempfile::tempdir().unwrap();
        let mut wf = TestWorkflow::new().with_method("  ALPHA ").build().unwrap();

        h.followup
            .setup(&mut wf, dir.path(), None, &StageParams::new())
            .unwrap();
        assert_eq!(h.alpha.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_unrecognized_method_invokes_nothing() {
        let h = harness();
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join("rapidpe");
        let mut wf = TestWorkflow::new().with_method("GAMMA").build().unwrap();

        let err = h
            .followup
            .setup(&mut wf, &dir, None, &StageParams::new())
            .unwrap_err();

        assert!(matches!(err, RapidpeError::UnrecognizedMethod(_)));
        let message = err.to_string();
        assert!(message.contains("GAMMA"));
        assert!(message.contains("ALPHA, BETA"));
        assert_eq!(h.alpha.load(Ordering::SeqCst), 0);
        assert_eq!(h.beta.load(Ordering::SeqCst), 0);
        assert!(dir.is_dir());
    }

    #[test]
    fn test_absent_tags_match_empty_tags() {
        let h = harness();
        let dir = tempfile::tempdir().unwrap();

        let mut first = TestWorkflow::new().with_method("ALPHA").build().unwrap();
        let a = h
            .followup
            .setup(&mut first, dir.path(), None, &StageParams::new())
            .unwrap();

        let mut second = TestWorkflow::new().with_method("ALPHA").build().unwrap();
        let b = h
            .followup
            .setup(&mut second, dir.path(), Some(&[]), &StageParams::new())
            .unwrap();

        assert_eq!(a, b);
        let calls = h.alpha_calls.lock();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0], calls[1]);
        assert!(calls[0].tags.is_empty());
    }

    #[test]
    fn test_arguments_forwarded_verbatim() {
        let h = harness();
        let dir = tempfile::tempdir().unwrap();
        let mut wf = TestWorkflow::new().with_method("ALPHA").build().unwrap();

        let mut params = StageParams::new();
        params.insert("extra".to_string(), json!({"nested": [1, 2, 3]}));
        params.insert("flag".to_string(), json!(true));
        let stage_tags = tags(&["FULL_DATA", "POSTPROC1"]);

        h.followup
            .setup(&mut wf, dir.path(), Some(&stage_tags), &params)
            .unwrap();

        let calls = h.alpha_calls.lock();
        assert_eq!(
            calls[0],
            Call {
                output_dir: dir.path().to_path_buf(),
                tags: stage_tags,
                params,
            }
        );
    }

    #[test]
    fn test_tagged_section_selects_method() {
        let h = harness();
        let dir = tempfile::tempdir().unwrap();
        let mut wf = TestWorkflow::new()
            .with_method("ALPHA")
            .with_option("workflow-rapidpe-postproc1", METHOD_OPTION, "BETA")
            .build()
            .unwrap();

        h.followup
            .setup(&mut wf, dir.path(), Some(&tags(&["POSTPROC1"])), &StageParams::new())
            .unwrap();
        assert_eq!(h.beta.load(Ordering::SeqCst), 1);

        h.followup
            .setup(&mut wf, dir.path(), None, &StageParams::new())
            .unwrap();
        assert_eq!(h.alpha.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_missing_method_option_is_configuration_error() {
        let h = harness();
        let dir = tempfile::tempdir().unwrap();
        let mut wf = TestWorkflow::new().build().unwrap();

        let err = h
            .followup
            .setup(&mut wf, dir.path(), None, &StageParams::new())
            .unwrap_err();

        assert!(matches!(err, RapidpeError::Configuration(_)));
        assert!(err.to_string().contains(METHOD_OPTION));
        assert_eq!(h.alpha.load(Ordering::SeqCst) + h.beta.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_coh_ptf_without_triggers_adds_nothing() {
        let cp = WorkflowConfigParser::from_json_value(&json!({
            "workflow-rapidpe": {"rapidpe-method": "COH_PTF_WORKFLOW"}
        }))
        .unwrap();
        let mut wf = Workflow::new("scenario", cp);
        let dir = tempfile::tempdir().unwrap();

        let out =
            setup_rapidpe_followup_workflow(&mut wf, dir.path(), None, &StageParams::new()).unwrap();

        assert!(out.is_empty());
        assert_eq!(wf.node_count(), 0);
    }

    #[test]
    fn test_bogus_method_names_the_builtin() {
        let cp = WorkflowConfigParser::from_json_value(&json!({
            "workflow-rapidpe": {"rapidpe-method": "BOGUS"}
        }))
        .unwrap();
        let mut wf = Workflow::new("scenario", cp);
        let dir = tempfile::tempdir().unwrap();

        let err = setup_rapidpe_followup_workflow(&mut wf, dir.path(), None, &StageParams::new())
            .unwrap_err();

        assert!(matches!(err, RapidpeError::UnrecognizedMethod(_)));
        assert!(err.to_string().contains("COH_PTF_WORKFLOW"));
        assert_eq!(err.error_info().code, "RAPIDPE-001-UNKNOWN_METHOD");
    }

    #[test]
    fn test_tagged_builtin_method_over_bogus_base() {
        let mut wf = TestWorkflow::new()
            .with_method("BOGUS")
            .with_option("workflow-rapidpe-postproc1", METHOD_OPTION, "COH_PTF_WORKFLOW")
            .with_executable(RAPIDPE_ROLE, "/opt/bin/rapidpe_integrate_extrinsic_likelihood")
            .with_trigger(&["H1", "L1"], 1000, 1100, &[])
            .build()
            .unwrap();
        let dir = tempfile::tempdir().unwrap();

        let out = setup_rapidpe_followup_workflow(
            &mut wf,
            dir.path(),
            Some(&tags(&["POSTPROC1"])),
            &StageParams::new(),
        )
        .unwrap();

        assert_eq!(out.names(), vec!["H1L1-RAPIDPE_POSTPROC1_0-1000-100.xml.gz"]);
        assert_eq!(wf.node_count(), 1);
        assert!(wf.config().has_section(RAPIDPE_SECTION));

        let err = setup_rapidpe_followup_workflow(&mut wf, dir.path(), None, &StageParams::new())
            .unwrap_err();
        assert!(matches!(err, RapidpeError::UnrecognizedMethod(_)));
        assert_eq!(wf.node_count(), 1);
    }
}
