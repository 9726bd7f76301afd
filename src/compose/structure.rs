//! The user-defined deck structure: one step per destination slide.

use crate::config::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// How a matched source slide is brought into the destination slide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepAction {
    /// Replace the destination slide's shapes with copies of the source's
    #[serde(alias = "CopyVerbatim")]
    CopyVerbatim,
    /// Keep the destination layout and write the source's title and body into it
    #[serde(alias = "MergeLayout")]
    MergeLayout,
}

impl fmt::Display for StepAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CopyVerbatim => f.write_str("copy_verbatim"),
            Self::MergeLayout => f.write_str("merge_layout"),
        }
    }
}

/// One entry of the structure. Its position is the destination slide index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructureStep {
    pub keyword: String,
    pub action: StepAction,
}

impl StructureStep {
    pub fn new(keyword: impl Into<String>, action: StepAction) -> Self {
        Self {
            keyword: keyword.into(),
            action,
        }
    }
}

/// Parse a YAML list of `{ keyword, action }` entries.
pub fn parse_structure(yaml: &str) -> Result<Vec<StructureStep>, ConfigError> {
    if yaml.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_saphyr::from_str(yaml).map_err(|e| ConfigError::Yaml(e.to_string()))
}

pub fn load_structure(path: impl AsRef<Path>) -> Result<Vec<StructureStep>, ConfigError> {
    let path = path.as_ref();
    let yaml = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_structure(&yaml)
}
