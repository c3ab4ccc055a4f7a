//! Pipeline Stages
//!
//! `Init -> Extracted -> Rebucketed -> (Repaired)? -> Final`
//!
//! Every stage here is a pure function from one [`PipelineState`] to the
//! next. Model calls happen outside; a stage receives the call's validated
//! output, or `None` when the call failed or could not be parsed.

use serde::{Deserialize, Serialize};

use super::normalizer::ResponseNormalizer;
use crate::domain::entities::{Category, ModelOutput, SummaryPayload};
use crate::domain::value_objects::{DocumentDomain, Language};

/// Pipeline stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Init,
    Extracted,
    Rebucketed,
    Repaired,
    Final,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::Init => write!(f, "init"),
            Stage::Extracted => write!(f, "extracted"),
            Stage::Rebucketed => write!(f, "rebucketed"),
            Stage::Repaired => write!(f, "repaired"),
            Stage::Final => write!(f, "final"),
        }
    }
}

/// Working state of one pipeline run
#[derive(Debug, Clone)]
pub struct PipelineState {
    pub stage: Stage,
    pub language: Language,
    pub domain: DocumentDomain,
    pub categories: Vec<Category>,
    /// Core summary candidate reported by the model, not yet sanitized
    pub model_core: Option<String>,
    pub core_summary: Option<String>,
    pub coupang_query: Option<String>,
    pub guess_summary: Option<String>,
    pub history: Vec<Stage>,
}

impl PipelineState {
    pub fn new(language: Language) -> Self {
        Self {
            stage: Stage::Init,
            language,
            domain: DocumentDomain::default(),
            categories: Vec::new(),
            model_core: None,
            core_summary: None,
            coupang_query: None,
            guess_summary: None,
            history: vec![Stage::Init],
        }
    }

    fn advance(mut self, stage: Stage) -> Self {
        tracing::debug!("Pipeline {} -> {}", self.stage, stage);
        self.stage = stage;
        self.history.push(stage);
        self
    }

    pub fn keys(&self) -> Vec<&str> {
        self.categories.iter().map(|c| c.key.as_str()).collect()
    }
}

/// Terminal result of one pipeline run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineOutcome {
    pub payload: SummaryPayload,
    pub history: Vec<Stage>,
    /// Every category empty and no core summary
    pub totally_empty: bool,
}

impl ResponseNormalizer {
    /// First extraction: picks the domain and realizes its template
    pub fn extracted(&self, state: PipelineState, output: ModelOutput) -> PipelineState {
        let domain = DocumentDomain::resolve(output.domain.as_deref());
        let categories = self.enforce_template(domain, &state.language, &output.categories);

        PipelineState {
            domain,
            categories,
            model_core: output.core_summary,
            coupang_query: Self::search_query(output.coupang_query.as_deref()),
            guess_summary: output.guess_summary,
            ..state
        }
        .advance(Stage::Extracted)
    }

    /// Re-bucketing is best-effort: the prior categories stay unless the new
    /// output carries template keys and does not regress to all-empty.
    pub fn rebucketed(&self, mut state: PipelineState, output: Option<ModelOutput>) -> PipelineState {
        if let Some(output) = output {
            if self.has_template_keys(state.domain, &output.categories) {
                let candidate =
                    self.enforce_template(state.domain, &state.language, &output.categories);
                let regresses = self.all_empty(&state.language, &candidate)
                    && !self.all_empty(&state.language, &state.categories);
                if regresses {
                    tracing::debug!("Ignoring re-bucketed categories: all empty");
                } else {
                    state.categories = candidate;
                }
            } else {
                tracing::debug!("Re-bucket output has no {} categories", state.domain);
            }

            state.model_core = state.model_core.or(output.core_summary);
            state.coupang_query = state
                .coupang_query
                .or_else(|| Self::search_query(output.coupang_query.as_deref()));
            state.guess_summary = state.guess_summary.or(output.guess_summary);
        }

        state.advance(Stage::Rebucketed)
    }

    /// Sanitized model core summary, or one synthesized from the categories
    pub fn summarized(&self, mut state: PipelineState) -> PipelineState {
        let core = self.resolve_core(&state.language, state.model_core.as_deref(), &state.categories);
        state.core_summary = Some(core);
        state
    }

    pub fn needs_repair(&self, state: &PipelineState) -> bool {
        self.all_empty(&state.language, &state.categories)
    }

    /// Repair replaces categories only with a result that is not all empty
    pub fn repaired(&self, mut state: PipelineState, output: Option<ModelOutput>) -> PipelineState {
        let Some(output) = output else {
            return state.advance(Stage::Repaired);
        };

        let candidate = self.enforce_template(state.domain, &state.language, &output.categories);
        if self.all_empty(&state.language, &candidate) {
            tracing::debug!("Repair produced no usable categories");
        } else {
            state.categories = candidate;
        }

        let core_missing = state
            .core_summary
            .as_deref()
            .map_or(true, |c| self.is_placeholder(&state.language, c));
        if core_missing {
            let core = self.resolve_core(
                &state.language,
                output.core_summary.as_deref(),
                &state.categories,
            );
            state.core_summary = Some(core);
        }

        state.coupang_query = state
            .coupang_query
            .or_else(|| Self::search_query(output.coupang_query.as_deref()));
        state.guess_summary = state.guess_summary.or(output.guess_summary);

        state.advance(Stage::Repaired)
    }

    /// Close the run. The guess summary survives only when nothing else did.
    pub fn finish(&self, state: PipelineState) -> PipelineOutcome {
        let language = state.language.clone();
        let state = if state.core_summary.is_none() {
            self.summarized(state)
        } else {
            state
        };
        let state = state.advance(Stage::Final);

        let all_empty = self.all_empty(&language, &state.categories);
        let core_summary = state
            .core_summary
            .unwrap_or_else(|| self.placeholder(&language).to_string());
        let core_empty = self.is_empty_summary(&language, &core_summary);

        let guess_summary = if all_empty {
            state
                .guess_summary
                .map(|g| self.clean(&language, &g))
                .filter(|g| !self.is_placeholder(&language, g))
        } else {
            None
        };

        PipelineOutcome {
            payload: SummaryPayload {
                domain: state.domain,
                categories: state.categories,
                core_summary,
                coupang_query: state.coupang_query,
                guess_summary,
            },
            history: state.history,
            totally_empty: all_empty && core_empty,
        }
    }
}
