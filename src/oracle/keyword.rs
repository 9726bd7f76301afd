//! Local oracle scoring slides by how often they mention the query's words.

use crate::compose::error::OracleError;
use crate::oracle::{OracleAnswer, SelectionOracle};
use aho_corasick::{AhoCorasick, MatchKind};

/// Scores every corpus entry by case-insensitive occurrences of the query's
/// words. The highest score wins, ties go to the lower index, and a corpus
/// without any occurrence yields no match.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordOracle;

impl KeywordOracle {
    pub fn new() -> Self {
        Self
    }

    fn rank(&self, corpus: &[String], query: &str) -> Result<OracleAnswer, OracleError> {
        let mut words: Vec<String> = query
            .split_whitespace()
            .map(str::to_lowercase)
            .collect();
        words.sort();
        words.dedup();
        if words.is_empty() {
            return Ok(OracleAnswer::no_match("empty query"));
        }

        let matcher = AhoCorasick::builder()
            .ascii_case_insensitive(true)
            .match_kind(MatchKind::LeftmostLongest)
            .build(&words)
            .map_err(|e| OracleError::Unavailable(e.to_string()))?;

        let mut best: Option<(usize, usize)> = None;
        for (index, text) in corpus.iter().enumerate() {
            let score = matcher.find_iter(text.to_lowercase().as_str()).count();
            if score > 0 && best.is_none_or(|(_, top)| score > top) {
                best = Some((index, score));
            }
        }

        Ok(match best {
            Some((index, score)) => OracleAnswer::matched(
                index,
                format!("slide {} mentions '{}' {} time(s)", index, query, score),
            ),
            None => OracleAnswer::no_match(format!("no slide mentions '{}'", query)),
        })
    }
}

impl SelectionOracle for KeywordOracle {
    async fn find_best_slide(
        &self,
        corpus: &[String],
        query: &str,
        _corpus_label: &str,
    ) -> Result<OracleAnswer, OracleError> {
        self.rank(corpus, query)
    }
}
