//! Selection oracles: given the text of every source slide and a keyword,
//! pick the slide that fits the keyword best.
//!
//! Two implementations ship with the crate:
//! - [`KeywordOracle`]: local, scores slides by keyword occurrences
//! - [`HttpOracle`]: asks a chat-completions endpoint (feature `http_oracle`)

#[cfg(feature = "http_oracle")]
pub mod http;
pub mod keyword;

#[cfg(feature = "http_oracle")]
pub use http::HttpOracle;
pub use keyword::KeywordOracle;

use crate::compose::error::OracleError;
use serde::{Deserialize, Serialize};
use std::future::Future;

/// An oracle's answer before validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OracleAnswer {
    /// Index into the corpus, `None` when nothing fits
    pub slide_index: Option<i64>,
    #[serde(default)]
    pub justification: String,
}

impl OracleAnswer {
    pub fn matched(index: usize, justification: impl Into<String>) -> Self {
        Self {
            slide_index: Some(index as i64),
            justification: justification.into(),
        }
    }

    pub fn no_match(justification: impl Into<String>) -> Self {
        Self {
            slide_index: None,
            justification: justification.into(),
        }
    }
}

pub trait SelectionOracle: Send + Sync {
    /// Pick the corpus entry that best matches `query`.
    ///
    /// `corpus_label` names the corpus (for example "source deck") for
    /// oracles that describe it to someone.
    fn find_best_slide(
        &self,
        corpus: &[String],
        query: &str,
        corpus_label: &str,
    ) -> impl Future<Output = Result<OracleAnswer, OracleError>> + Send;
}

/// A validated oracle outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    Matched { slide: usize, justification: String },
    NoMatch { justification: String },
}

impl Selection {
    /// Validate an answer against the corpus size. Failures and out-of-range
    /// indices become [`Selection::NoMatch`], carrying the reason.
    pub fn from_answer(answer: Result<OracleAnswer, OracleError>, corpus_len: usize) -> (Self, Option<OracleError>) {
        match answer {
            Ok(OracleAnswer {
                slide_index: Some(index),
                justification,
            }) => match usize::try_from(index) {
                Ok(slide) if slide < corpus_len => (Self::Matched { slide, justification }, None),
                _ => {
                    let err = OracleError::InvalidIndex { index, corpus_len };
                    (
                        Self::NoMatch {
                            justification: err.to_string(),
                        },
                        Some(err),
                    )
                },
            },
            Ok(OracleAnswer {
                slide_index: None,
                justification,
            }) => (Self::NoMatch { justification }, None),
            Err(err) => (
                Self::NoMatch {
                    justification: err.to_string(),
                },
                Some(err),
            ),
        }
    }

    pub fn slide(&self) -> Option<usize> {
        match self {
            Self::Matched { slide, .. } => Some(*slide),
            Self::NoMatch { .. } => None,
        }
    }

    pub fn justification(&self) -> &str {
        match self {
            Self::Matched { justification, .. } | Self::NoMatch { justification } => justification,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_validation() {
        let (selection, err) = Selection::from_answer(Ok(OracleAnswer::matched(2, "fits")), 3);
        assert_eq!(selection.slide(), Some(2));
        assert_eq!(selection.justification(), "fits");
        assert!(err.is_none());

        let (selection, err) = Selection::from_answer(Ok(OracleAnswer::matched(99, "fits")), 5);
        assert_eq!(selection.slide(), None);
        assert_eq!(
            err,
            Some(OracleError::InvalidIndex {
                index: 99,
                corpus_len: 5
            })
        );

        let negative = OracleAnswer {
            slide_index: Some(-1),
            justification: String::new(),
        };
        assert_eq!(Selection::from_answer(Ok(negative), 5).0.slide(), None);

        let (selection, err) = Selection::from_answer(Ok(OracleAnswer::no_match("nothing")), 5);
        assert_eq!(selection, Selection::NoMatch { justification: "nothing".to_string() });
        assert!(err.is_none());

        let (selection, err) = Selection::from_answer(Err(OracleError::Timeout(Duration::from_secs(1))), 5);
        assert_eq!(selection.slide(), None);
        assert!(selection.justification().contains("timed out"));
        assert!(err.is_some());
    }
}
