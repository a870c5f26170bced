use std::{fmt, sync::Arc};

use chrono::{DateTime, Duration, Utc};
use tracing::{info, warn};

use crate::{
    error::{Result, ScriptwrightError},
    prompt::{build_analysis_prompt, build_final_prompt, final_context},
    provider::{GenerationParams, GenerativeModel},
    research::{Researcher, derive_keywords},
    sanitize::{collapse_paragraph, word_count},
    sources::SourceRegistry,
    types::{RunRequest, RunResult},
};

/// Used in place of the analysis when the analysis call fails.
pub const FALLBACK_ANALYSIS: &str = "- No sources found. Use expert simulation.";

/// Steps of a run, reported to a [`RunObserver`] as they start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stage<'a> {
    Videos { keyword: &'a str },
    Articles { keyword: &'a str },
    Encyclopedia,
    Analysis,
    Script,
}

impl fmt::Display for Stage<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Videos { keyword } => write!(f, "Searching videos for \"{keyword}\"..."),
            Stage::Articles { keyword } => write!(f, "Searching articles for \"{keyword}\"..."),
            Stage::Encyclopedia => write!(f, "Looking up encyclopedia summary..."),
            Stage::Analysis => write!(f, "Analyzing sources..."),
            Stage::Script => write!(f, "Drafting script..."),
        }
    }
}

pub trait RunObserver: Send + Sync {
    fn on_stage(&self, stage: &Stage<'_>);
}

pub struct NoopObserver;

impl RunObserver for NoopObserver {
    fn on_stage(&self, _stage: &Stage<'_>) {}
}

/// Research, analyze, and draft: one run per call, nothing kept between runs.
pub struct Pipeline {
    sources: SourceRegistry,
    model: Arc<dyn GenerativeModel>,
    observer: Arc<dyn RunObserver>,
}

impl Pipeline {
    pub fn new(sources: SourceRegistry, model: Arc<dyn GenerativeModel>) -> Self {
        Self {
            sources,
            model,
            observer: Arc::new(NoopObserver),
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn RunObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub async fn run(&self, request: &RunRequest) -> Result<RunResult> {
        self.run_at(request, Utc::now()).await
    }

    /// Same as [`Pipeline::run`] with an explicit "now" for the lookback cutoff.
    pub async fn run_at(&self, request: &RunRequest, now: DateTime<Utc>) -> Result<RunResult> {
        let title = request.title.trim();
        if title.is_empty() {
            return Err(ScriptwrightError::EmptyTitle);
        }

        let keywords = derive_keywords(title, &request.keywords_text);
        let published_after = now
            .checked_sub_signed(Duration::days(i64::from(request.lookback_days)))
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        info!(title, ?keywords, %published_after, "starting research");

        let snippets = Researcher::new(&self.sources)
            .with_observer(self.observer.as_ref())
            .collect(request, &keywords, published_after)
            .await;

        self.observer.on_stage(&Stage::Analysis);
        info!(model = self.model.name(), snippets = snippets.len(), "analyzing sources");
        let analysis_prompt = build_analysis_prompt(title, &snippets);
        let (analysis, analysis_fallback) = match self
            .model
            .generate(&analysis_prompt, GenerationParams::ANALYSIS)
            .await
        {
            Ok(text) => (text, false),
            Err(e @ ScriptwrightError::MissingApiKey { .. }) => return Err(e),
            Err(e) => {
                warn!(error = %e, "analysis failed, using fallback bullets");
                (FALLBACK_ANALYSIS.to_string(), true)
            }
        };

        self.observer.on_stage(&Stage::Script);
        let final_prompt = build_final_prompt(
            title,
            &analysis,
            &final_context(&snippets),
            request.target_words,
        );
        let raw_script = match self
            .model
            .generate(&final_prompt, GenerationParams::SCRIPT)
            .await
        {
            Ok(text) => text,
            Err(e @ ScriptwrightError::MissingApiKey { .. }) => return Err(e),
            Err(e) => {
                return Err(ScriptwrightError::ScriptFailed {
                    reason: e.to_string(),
                });
            }
        };

        let script = collapse_paragraph(&raw_script);
        if script.is_empty() {
            return Err(ScriptwrightError::ScriptFailed {
                reason: "model returned only blank lines".to_string(),
            });
        }
        let word_count = word_count(&script);
        info!(word_count, "script drafted");

        Ok(RunResult {
            title: title.to_string(),
            keywords,
            published_after,
            snippets,
            analysis,
            analysis_fallback,
            script,
            word_count,
        })
    }
}
