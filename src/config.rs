//! YAML configuration.
//!
//! Every field has a default, so an empty file (or no file) is a valid
//! configuration:
//!
//! ```yaml
//! placement:
//!   near_top_emu: 1371600
//!   filler_marker: lorem ipsum
//! oracle:
//!   model: gpt-4o-mini
//!   max_concurrency: 2
//! ```

use crate::ooxml::pptx::PlaceholderKind;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// EMUs per inch.
pub const EMU_PER_INCH: i64 = 914_400;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid YAML: {0}")]
    Yaml(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub placement: PlacementConfig,
    pub oracle: OracleConfig,
}

impl Config {
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_saphyr::from_str(yaml).map_err(|e| ConfigError::Yaml(e.to_string()))
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&yaml)
    }
}

/// Heuristics deciding which destination shapes receive title and body text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacementConfig {
    /// Shapes whose top edge is above this offset may take the title
    pub near_top_emu: i64,
    /// Empty shapes taller than this may take the body
    pub large_box_emu: i64,
    /// Filler text marking a shape as a body slot, matched case-insensitively
    pub filler_marker: String,
    /// Placeholder types (`title`, `ctrTitle`, `obj`, ...) that take the title
    pub title_placeholders: Vec<String>,
    /// Placeholder types that take the body
    pub body_placeholders: Vec<String>,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            near_top_emu: EMU_PER_INCH * 3 / 2,
            large_box_emu: EMU_PER_INCH,
            filler_marker: "lorem ipsum".to_string(),
            title_placeholders: ["title", "ctrTitle", "obj"].map(String::from).to_vec(),
            body_placeholders: ["body", "obj", "subTitle"].map(String::from).to_vec(),
        }
    }
}

impl PlacementConfig {
    pub fn is_title_placeholder(&self, kind: PlaceholderKind) -> bool {
        self.title_placeholders.iter().any(|token| token == kind.as_str())
    }

    pub fn is_body_placeholder(&self, kind: PlaceholderKind) -> bool {
        self.body_placeholders.iter().any(|token| token == kind.as_str())
    }
}

/// Settings of the selection oracle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OracleConfig {
    /// Chat-completions endpoint
    pub endpoint: String,
    pub model: String,
    /// Environment variable holding the API key
    pub api_key_env: String,
    pub timeout_secs: u64,
    /// Oracle queries in flight at once
    pub max_concurrency: usize,
    /// Characters of slide text sent per corpus entry
    pub excerpt_chars: usize,
    /// Name the corpus is presented under
    pub corpus_label: String,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.openai.com/v1/chat/completions".to_string(),
            model: "gpt-4o-mini".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            timeout_secs: 30,
            max_concurrency: 4,
            excerpt_chars: 1000,
            corpus_label: "source deck".to_string(),
        }
    }
}

impl OracleConfig {
    #[inline]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
