//! The append-only record of one assembly run.

use crate::compose::error::{ShapeCopyWarning, StructureSizeMismatch};
use crate::compose::structure::StepAction;
use crate::config::ConfigError;
use serde::Serialize;

/// What one structure step did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepLogEntry {
    pub step_index: usize,
    pub keyword: String,
    pub action: StepAction,
    /// Source slide chosen by the oracle
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_slide: Option<usize>,
    /// The oracle's reasoning, or why it gave no answer
    pub justification: String,
    pub outcome: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<ShapeCopyWarning>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AuditLog {
    #[serde(skip_serializing_if = "Option::is_none")]
    size_mismatch: Option<StructureSizeMismatch>,
    entries: Vec<StepLogEntry>,
}

impl AuditLog {
    pub(crate) fn record_mismatch(&mut self, mismatch: StructureSizeMismatch) {
        self.size_mismatch = Some(mismatch);
    }

    pub(crate) fn push(&mut self, entry: StepLogEntry) {
        self.entries.push(entry);
    }

    pub fn size_mismatch(&self) -> Option<&StructureSizeMismatch> {
        self.size_mismatch.as_ref()
    }

    /// Entries in step order.
    pub fn entries(&self) -> &[StepLogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        serde_saphyr::to_string(self).map_err(|e| ConfigError::Yaml(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compose::error::CopyFallback;
    use crate::ooxml::pptx::ShapeKind;

    #[test]
    fn test_yaml_output() {
        let mut log = AuditLog::default();
        log.record_mismatch(StructureSizeMismatch { steps: 1, slides: 3 });
        log.push(StepLogEntry {
            step_index: 0,
            keyword: "Timeline".to_string(),
            action: StepAction::CopyVerbatim,
            matched_slide: Some(2),
            justification: "slide 2 lists milestones".to_string(),
            outcome: "replaced slide 0 with matched source slide 2".to_string(),
            warnings: vec![ShapeCopyWarning {
                shape_index: 1,
                kind: ShapeKind::Picture,
                name: "Logo".to_string(),
                reason: "picture has no embedded image".to_string(),
                fallback: CopyFallback::Dropped,
            }],
        });

        assert_eq!(log.len(), 1);
        let yaml = log.to_yaml().unwrap();
        assert!(yaml.contains("size_mismatch"));
        assert!(yaml.contains("keyword: Timeline"));
        assert!(yaml.contains("action: copy_verbatim"));
        assert!(yaml.contains("matched_slide: 2"));
        assert!(yaml.contains("fallback: dropped"));
    }

    #[test]
    fn test_unmatched_entry_omits_slide() {
        let mut log = AuditLog::default();
        log.push(StepLogEntry {
            step_index: 0,
            keyword: "Closing".to_string(),
            action: StepAction::MergeLayout,
            matched_slide: None,
            justification: "nothing fits".to_string(),
            outcome: "no suitable slide found".to_string(),
            warnings: Vec::new(),
        });
        let yaml = log.to_yaml().unwrap();
        assert!(!yaml.contains("matched_slide"));
        assert!(!yaml.contains("warnings"));
        assert!(!yaml.contains("size_mismatch"));
    }
}
