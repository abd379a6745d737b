//! Workflow files and ordered file lists.

use super::{NodeId, Segment};
use crate::errors::{ConfigurationError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

#[allow(clippy::expect_used)]
static NAME_FIELD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_]+$").expect("name field pattern is valid"));

/// A file consumed or produced by the workflow.
///
/// The logical name is the file name of the storage path. Files produced by
/// a node record the owning node once the node is registered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct File {
    ifos: Vec<String>,
    description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    segment: Option<Segment>,
    #[serde(default)]
    tags: Vec<String>,
    storage_path: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    node: Option<NodeId>,
}

impl File {
    /// Describes an existing file, e.g. an input registered from outside.
    pub fn new(
        ifos: Vec<String>,
        description: impl Into<String>,
        segment: Option<Segment>,
        storage_path: impl Into<PathBuf>,
        tags: Vec<String>,
    ) -> Result<Self> {
        let file = Self {
            ifos,
            description: description.into(),
            segment,
            tags,
            storage_path: storage_path.into(),
            node: None,
        };
        file.validate()?;
        Ok(file)
    }

    /// Describes a file to be produced in `directory`, named
    /// `IFOS-DESCRIPTION[_TAGS]-START-DURATION.ext`.
    pub fn new_output(
        ifos: Vec<String>,
        description: impl Into<String>,
        segment: Option<Segment>,
        directory: &Path,
        extension: &str,
        tags: Vec<String>,
    ) -> Result<Self> {
        let description = description.into();
        let mut name = format!("{}-{}", ifos.concat(), description);
        for tag in &tags {
            name.push('_');
            name.push_str(&tag.to_uppercase());
        }
        if let Some(seg) = segment {
            name.push_str(&format!("-{}-{}", seg.start(), seg.duration()));
        }
        name.push('.');
        name.push_str(extension.trim_start_matches('.'));

        Self::new(ifos, description, segment, directory.join(name), tags)
    }

    /// Checks the naming fields.
    ///
    /// Descriptions, tags and ifos end up inside dash-separated file names,
    /// so they may only contain ASCII alphanumerics and underscores.
    pub fn validate(&self) -> Result<()> {
        let check = |kind: &str, value: &str| -> Result<()> {
            if NAME_FIELD.is_match(value) {
                Ok(())
            } else {
                Err(ConfigurationError::section(
                    "file",
                    format!(
                        "invalid {kind} '{value}' for {}: use only letters, digits and '_'",
                        self.storage_path.display()
                    ),
                )
                .into())
            }
        };

        check("description", &self.description)?;
        for ifo in &self.ifos {
            check("ifo", ifo)?;
        }
        for tag in &self.tags {
            check("tag", tag)?;
        }
        if self.name().is_empty() {
            return Err(ConfigurationError::section(
                "file",
                format!("storage path for '{}' has no file name", self.description),
            )
            .into());
        }
        Ok(())
    }

    /// Logical file name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.storage_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
    }

    /// Detectors covered by the file.
    #[must_use]
    pub fn ifos(&self) -> &[String] {
        &self.ifos
    }

    /// Detectors concatenated, e.g. `H1L1`.
    #[must_use]
    pub fn ifo_string(&self) -> String {
        self.ifos.concat()
    }

    /// Content description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Time span covered by the file.
    #[must_use]
    pub const fn segment(&self) -> Option<Segment> {
        self.segment
    }

    /// Tags attached to the file.
    #[must_use]
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// True if the file carries the tag (case insensitive).
    #[must_use]
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t.eq_ignore_ascii_case(tag))
    }

    /// Physical location.
    #[must_use]
    pub fn storage_path(&self) -> &Path {
        &self.storage_path
    }

    /// Node producing the file, if any.
    #[must_use]
    pub const fn node(&self) -> Option<NodeId> {
        self.node
    }

    pub(crate) fn set_node(&mut self, node: NodeId) {
        self.node = Some(node);
    }

    pub(crate) fn clear_node(&mut self) {
        self.node = None;
    }
}

/// Ordered, duplicate-tolerant collection of files.
///
/// Order is significant: lookups return the first match.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileList {
    files: Vec<File>,
}

impl FileList {
    /// Creates an empty list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a file.
    pub fn push(&mut self, file: File) {
        self.files.push(file);
    }

    /// Number of files.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// True when empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Iterates in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, File> {
        self.files.iter()
    }

    /// Returns the file at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&File> {
        self.files.get(index)
    }

    /// Logical names in order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.files.iter().map(File::name).collect()
    }

    /// Files carrying `tag`.
    #[must_use]
    pub fn find_output_with_tag(&self, tag: &str) -> Self {
        self.files.iter().filter(|f| f.has_tag(tag)).cloned().collect()
    }

    /// Files not carrying `tag`.
    #[must_use]
    pub fn find_output_without_tag(&self, tag: &str) -> Self {
        self.files.iter().filter(|f| !f.has_tag(tag)).cloned().collect()
    }

    /// Files with the given description.
    #[must_use]
    pub fn find_by_description(&self, description: &str) -> Self {
        self.files
            .iter()
            .filter(|f| f.description() == description)
            .cloned()
            .collect()
    }

    /// First file with `description` whose segment covers `segment`.
    ///
    /// Files without a segment are treated as covering all time.
    #[must_use]
    pub fn find_output_covering(&self, description: &str, segment: Option<Segment>) -> Option<&File> {
        self.files.iter().find(|f| {
            f.description() == description
                && match (f.segment(), segment) {
                    (Some(own), Some(wanted)) => own.contains(&wanted),
                    _ => true,
                }
        })
    }

    /// First file with the given logical name.
    #[must_use]
    pub fn find_by_name(&self, name: &str) -> Option<&File> {
        self.files.iter().find(|f| f.name() == name)
    }
}

impl FromIterator<File> for FileList {
    fn from_iter<I: IntoIterator<Item = File>>(iter: I) -> Self {
        Self {
            files: iter.into_iter().collect(),
        }
    }
}

impl Extend<File> for FileList {
    fn extend<I: IntoIterator<Item = File>>(&mut self, iter: I) {
        self.files.extend(iter);
    }
}

impl IntoIterator for FileList {
    type Item = File;
    type IntoIter = std::vec::IntoIter<File>;

    fn into_iter(self) -> Self::IntoIter {
        self.files.into_iter()
    }
}

impl<'a> IntoIterator for &'a FileList {
    type Item = &'a File;
    type IntoIter = std::slice::Iter<'a, File>;

    fn into_iter(self) -> Self::IntoIter {
        self.files.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn h1l1() -> Vec<String> {
        vec!["H1".to_string(), "L1".to_string()]
    }

    fn trigger(start: i64, end: i64, tag: &str) -> File {
        File::new_output(
            h1l1(),
            "COH_PTF_INSPIRAL",
            Some(Segment::new(start, end).unwrap()),
            Path::new("/data/triggers"),
            "xml.gz",
            vec![tag.to_string()],
        )
        .unwrap()
    }

    #[test]
    fn test_output_name_convention() {
        let file = File::new_output(
            h1l1(),
            "RAPIDPE",
            Some(Segment::new(1_000_000_000, 1_000_000_100).unwrap()),
            Path::new("/out"),
            ".xml.gz",
            vec!["postproc1".to_string(), "0".to_string()],
        )
        .unwrap();

        assert_eq!(file.name(), "H1L1-RAPIDPE_POSTPROC1_0-1000000000-100.xml.gz");
        assert_eq!(
            file.storage_path(),
            Path::new("/out/H1L1-RAPIDPE_POSTPROC1_0-1000000000-100.xml.gz")
        );
        assert_eq!(file.ifo_string(), "H1L1");
        assert!(file.node().is_none());
    }

    #[test]
    fn test_output_name_without_segment_or_tags() {
        let file =
            File::new_output(h1l1(), "BANK", None, Path::new("out"), "hdf", Vec::new()).unwrap();
        assert_eq!(file.name(), "H1L1-BANK.hdf");
    }

    #[test]
    fn test_description_with_dash_rejected() {
        let err = File::new(h1l1(), "BAD-DESC", None, "/tmp/x.xml", Vec::new()).unwrap_err();
        assert!(err.to_string().contains("BAD-DESC"));

        let err = File::new(h1l1(), "OK", None, "/tmp/x.xml", vec!["a-b".to_string()]);
        assert!(err.is_err());
    }

    #[test]
    fn test_file_list_lookups() {
        let files: FileList = vec![
            trigger(0, 100, "FULL"),
            trigger(100, 200, "INJ"),
            trigger(0, 100, "FULL"),
        ]
        .into_iter()
        .collect();

        assert_eq!(files.len(), 3);
        assert_eq!(files.find_output_with_tag("full").len(), 2);
        assert_eq!(files.find_output_without_tag("FULL").len(), 1);
        assert_eq!(files.find_by_description("COH_PTF_INSPIRAL").len(), 3);
        assert!(files.find_by_description("OTHER").is_empty());

        let wanted = Segment::new(120, 130).unwrap();
        let found = files.find_output_covering("COH_PTF_INSPIRAL", Some(wanted)).unwrap();
        assert!(found.has_tag("INJ"));
        assert!(files
            .find_output_covering("COH_PTF_INSPIRAL", Some(Segment::new(50, 150).unwrap()))
            .is_none());
    }

    #[test]
    fn test_file_serialization() {
        let file = trigger(0, 100, "FULL");
        let json = serde_json::to_value(&file).unwrap();
        assert_eq!(json["description"], "COH_PTF_INSPIRAL");
        assert!(json.get("node").is_none());

        let back: File = serde_json::from_value(json).unwrap();
        assert_eq!(back, file);
    }

    #[test]
    fn test_inverted_segment_rejected_on_load() {
        let mut json = serde_json::to_value(trigger(100, 200, "FULL")).unwrap();
        json["segment"] = serde_json::json!({"start": 200, "end": 100});
        assert!(serde_json::from_value::<File>(json).is_err());
    }
}
