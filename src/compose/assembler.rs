//! The assembly pipeline: load both decks, size the template to the
//! structure, run every step against the oracle, save.
//!
//! Oracle queries for all steps run concurrently, bounded by
//! `oracle.max_concurrency` and each limited to `oracle.timeout_secs`. Their
//! answers are collected by step index and applied to the template one step
//! at a time, in step order, so the result doesn't depend on which query
//! finished first.

use crate::compose::audit::{AuditLog, StepLogEntry};
use crate::compose::error::{
    AssemblyError, DeckRole, OracleError, Result, ShapeCopyWarning, StructureSizeMismatch,
};
use crate::compose::extract::{extract, slide_excerpt};
use crate::compose::placement::place;
use crate::compose::structure::{StepAction, StructureStep};
use crate::compose::transplant::transplant;
use crate::config::{Config, OracleConfig};
use crate::ooxml::pptx::Document;
use crate::oracle::{OracleAnswer, Selection, SelectionOracle};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio::time::timeout;
use tracing::{debug, info, warn};

/// Where an assembly session stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Loading,
    Sizing,
    Stepping,
    Finalizing,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Loading => f.write_str("loading"),
            Self::Sizing => f.write_str("sizing"),
            Self::Stepping => f.write_str("stepping"),
            Self::Finalizing => f.write_str("finalizing"),
        }
    }
}

/// The assembled deck and what happened while building it.
#[derive(Debug)]
pub struct AssemblyOutput {
    pub bytes: Vec<u8>,
    pub audit: AuditLog,
}

/// One assembly run. Each stage consumes the session and hands it to the
/// next, so stages can't be skipped or repeated.
///
/// ```rust,ignore
/// let output = AssemblySession::load(&template, &source, steps, config)?
///     .size()?
///     .step(Arc::new(KeywordOracle::new()))
///     .await
///     .finalize()?;
/// ```
pub struct AssemblySession {
    stage: Stage,
    config: Config,
    steps: Vec<StructureStep>,
    template: Document,
    source: Document,
    audit: AuditLog,
}

impl AssemblySession {
    /// Parse both decks. Either one failing to load ends the run.
    pub fn load(template: &[u8], source: &[u8], steps: Vec<StructureStep>, config: Config) -> Result<Self> {
        let template = Document::load(template).map_err(|source| AssemblyError::Parse {
            role: DeckRole::Template,
            source,
        })?;
        let source = Document::load(source).map_err(|source| AssemblyError::Parse {
            role: DeckRole::Source,
            source,
        })?;
        info!(
            "Loaded template ({} slides) and source ({} slides) for {} steps",
            template.slide_count(),
            source.slide_count(),
            steps.len()
        );

        Ok(Self {
            stage: Stage::Loading,
            config,
            steps,
            template,
            source,
            audit: AuditLog::default(),
        })
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn audit(&self) -> &AuditLog {
        &self.audit
    }

    pub fn template(&self) -> &Document {
        &self.template
    }

    pub fn source(&self) -> &Document {
        &self.source
    }

    /// Make the template exactly as long as the structure when it is
    /// longer. Extra steps are left for [`step`](Self::step) to ignore.
    pub fn size(mut self) -> Result<Self> {
        self.stage = Stage::Sizing;
        let steps = self.steps.len();
        let slides = self.template.slide_count();
        if steps != slides {
            let mismatch = StructureSizeMismatch { steps, slides };
            warn!("{}", mismatch);
            self.audit.record_mismatch(mismatch);
        }
        if steps < slides {
            let removed = self
                .template
                .truncate_slides(steps)
                .map_err(|source| AssemblyError::Parse {
                    role: DeckRole::Template,
                    source,
                })?;
            debug!("Removed {} template slides", removed);
        }
        Ok(self)
    }

    /// Query the oracle for every step and apply the answers in order.
    pub async fn step<O: SelectionOracle + 'static>(mut self, oracle: Arc<O>) -> Self {
        self.stage = Stage::Stepping;
        let active = self.steps.len().min(self.template.slide_count());
        let corpus: Arc<Vec<String>> = Arc::new(
            self.source
                .slides()
                .iter()
                .map(|slide| slide_excerpt(slide, self.config.oracle.excerpt_chars))
                .collect(),
        );
        info!(
            "Querying oracle for {} steps against {} source slides",
            active,
            corpus.len()
        );

        let answers = select_all(oracle, Arc::clone(&corpus), &self.steps[..active], &self.config.oracle).await;

        let steps = std::mem::take(&mut self.steps);
        for (index, (step, answer)) in steps.iter().zip(answers).enumerate() {
            let (selection, failure) = Selection::from_answer(answer, corpus.len());
            if let Some(err) = failure {
                warn!("Step {} ('{}'): {}", index, step.keyword, err);
            }
            debug!(
                "Step {} ('{}', {}): oracle chose {:?}",
                index,
                step.keyword,
                step.action,
                selection.slide()
            );

            let mut warnings = Vec::new();
            let outcome = match selection.slide() {
                Some(matched) => self.apply(index, step.action, matched, &mut warnings),
                None => "no suitable slide found".to_string(),
            };
            for warning in &warnings {
                warn!("Slide {}: {}", index, warning);
            }

            self.audit.push(StepLogEntry {
                step_index: index,
                keyword: step.keyword.clone(),
                action: step.action,
                matched_slide: selection.slide(),
                justification: selection.justification().to_string(),
                outcome,
                warnings,
            });
        }
        self.steps = steps;
        self
    }

    fn apply(
        &mut self,
        index: usize,
        action: StepAction,
        matched: usize,
        warnings: &mut Vec<ShapeCopyWarning>,
    ) -> String {
        let (Some(dest), Some(src)) = (self.template.slide_mut(index), self.source.slide(matched)) else {
            return "no suitable slide found".to_string();
        };

        match action {
            StepAction::CopyVerbatim => {
                transplant(dest, src, warnings);
                if warnings.is_empty() {
                    format!("replaced slide {} with matched source slide {}", index, matched)
                } else {
                    format!(
                        "replaced slide {} with matched source slide {} ({} shapes degraded)",
                        index,
                        matched,
                        warnings.len()
                    )
                }
            },
            StepAction::MergeLayout => {
                let content = extract(src);
                let placement = place(dest, &content, &self.config.placement);
                if placement.is_empty() && !content.is_empty() {
                    format!(
                        "merged matched content into slide {}: no shape could take source slide {}",
                        index, matched
                    )
                } else {
                    format!("merged matched content into slide {} from source slide {}", index, matched)
                }
            },
        }
    }

    /// Serialize the assembled deck.
    pub fn finalize(mut self) -> Result<AssemblyOutput> {
        self.stage = Stage::Finalizing;
        info!("Saving assembled deck ({} slides)", self.template.slide_count());
        let bytes = self.template.save().map_err(AssemblyError::Save)?;
        Ok(AssemblyOutput {
            bytes,
            audit: self.audit,
        })
    }
}

/// Ask the oracle about every step concurrently. Answers come back in step
/// order.
async fn select_all<O: SelectionOracle + 'static>(
    oracle: Arc<O>,
    corpus: Arc<Vec<String>>,
    steps: &[StructureStep],
    config: &OracleConfig,
) -> Vec<std::result::Result<OracleAnswer, OracleError>> {
    let permits = Arc::new(Semaphore::new(config.max_concurrency.max(1)));
    let limit = config.timeout();
    let mut tasks = JoinSet::new();

    for (index, step) in steps.iter().enumerate() {
        let oracle = Arc::clone(&oracle);
        let corpus = Arc::clone(&corpus);
        let permits = Arc::clone(&permits);
        let query = step.keyword.clone();
        let label = config.corpus_label.clone();
        tasks.spawn(async move {
            let answer = match permits.acquire_owned().await {
                Ok(_permit) => match timeout(limit, oracle.find_best_slide(&corpus, &query, &label)).await {
                    Ok(answer) => answer,
                    Err(_) => Err(OracleError::Timeout(limit)),
                },
                Err(e) => Err(OracleError::Unavailable(e.to_string())),
            };
            (index, answer)
        });
    }

    let mut answers: Vec<Option<std::result::Result<OracleAnswer, OracleError>>> =
        (0..steps.len()).map(|_| None).collect();
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((index, answer)) => answers[index] = Some(answer),
            Err(e) => warn!("Oracle task failed: {}", e),
        }
    }
    answers
        .into_iter()
        .map(|answer| answer.unwrap_or_else(|| Err(OracleError::Unavailable("oracle task failed".to_string()))))
        .collect()
}

/// Run all stages.
pub async fn assemble<O: SelectionOracle + 'static>(
    template: &[u8],
    source: &[u8],
    structure: Vec<StructureStep>,
    oracle: Arc<O>,
    config: Config,
) -> Result<AssemblyOutput> {
    AssemblySession::load(template, source, structure, config)?
        .size()?
        .step(oracle)
        .await
        .finalize()
}
