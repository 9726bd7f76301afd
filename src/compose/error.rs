//! Error types of the assembly pipeline.
//!
//! Only [`AssemblyError`] is ever returned as an `Err`. The other kinds are
//! degradations the pipeline absorbs and records in the audit log.

use crate::ooxml::error::OoxmlError;
use crate::ooxml::pptx::ShapeKind;
use serde::Serialize;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Which input deck a load failure concerns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeckRole {
    Template,
    Source,
}

impl fmt::Display for DeckRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Template => f.write_str("template"),
            Self::Source => f.write_str("source"),
        }
    }
}

/// Fatal pipeline errors. No output is produced when one occurs.
#[derive(Error, Debug)]
pub enum AssemblyError {
    /// An input deck could not be loaded
    #[error("failed to load {role} deck: {source}")]
    Parse {
        role: DeckRole,
        #[source]
        source: OoxmlError,
    },

    /// The assembled deck could not be serialized
    #[error("failed to save assembled deck: {0}")]
    Save(#[source] OoxmlError),
}

pub type Result<T> = std::result::Result<T, AssemblyError>;

/// What happened to a shape that couldn't be copied the regular way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CopyFallback {
    /// The shape's XML was cloned as is
    OpaqueClone,
    /// The shape was left out
    Dropped,
    /// The shape was copied but a reference it made (to a slide, layout or
    /// notes page of the source deck) was removed
    ReferenceDropped,
}

/// A shape of a transplanted slide that took a fallback path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShapeCopyWarning {
    /// Position of the shape in the source slide
    pub shape_index: usize,
    pub kind: ShapeKind,
    pub name: String,
    pub reason: String,
    pub fallback: CopyFallback,
}

impl fmt::Display for ShapeCopyWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let action = match self.fallback {
            CopyFallback::OpaqueClone => "cloned as is",
            CopyFallback::Dropped => "dropped",
            CopyFallback::ReferenceDropped => "copied without its reference",
        };
        write!(
            f,
            "{} {} '{}' {}: {}",
            self.kind, self.shape_index, self.name, action, self.reason
        )
    }
}

/// Why the oracle produced no usable answer. Always treated as "no match".
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OracleError {
    #[error("oracle request failed: {0}")]
    Transport(String),

    #[error("oracle timed out after {0:?}")]
    Timeout(Duration),

    #[error("malformed oracle response: {0}")]
    Malformed(String),

    #[error("oracle service error: {0}")]
    Service(String),

    #[error("oracle returned slide index {index} for a corpus of {corpus_len} slides")]
    InvalidIndex { index: i64, corpus_len: usize },

    #[error("oracle unavailable: {0}")]
    Unavailable(String),
}

/// Step count and template slide count differ. Informational.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StructureSizeMismatch {
    pub steps: usize,
    pub slides: usize,
}

impl fmt::Display for StructureSizeMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.steps < self.slides {
            write!(
                f,
                "structure has {} steps for {} template slides; removed {} trailing slides",
                self.steps,
                self.slides,
                self.slides - self.steps
            )
        } else {
            write!(
                f,
                "structure has {} steps for {} template slides; the last {} steps are ignored",
                self.steps,
                self.slides,
                self.steps - self.slides
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let mismatch = StructureSizeMismatch { steps: 4, slides: 2 };
        assert_eq!(
            mismatch.to_string(),
            "structure has 4 steps for 2 template slides; the last 2 steps are ignored"
        );

        let err = OracleError::InvalidIndex {
            index: 99,
            corpus_len: 5,
        };
        assert_eq!(
            err.to_string(),
            "oracle returned slide index 99 for a corpus of 5 slides"
        );

        let warning = ShapeCopyWarning {
            shape_index: 3,
            kind: ShapeKind::Picture,
            name: "Logo".to_string(),
            reason: "image is linked, not embedded".to_string(),
            fallback: CopyFallback::Dropped,
        };
        assert_eq!(
            warning.to_string(),
            "picture 3 'Logo' dropped: image is linked, not embedded"
        );

        let err = AssemblyError::Parse {
            role: DeckRole::Source,
            source: OoxmlError::InvalidFormat("bad".to_string()),
        };
        assert_eq!(err.to_string(), "failed to load source deck: Invalid format: bad");
    }
}
