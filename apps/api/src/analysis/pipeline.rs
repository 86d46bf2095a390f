//! Pipeline Orchestrator: segment, extract in bounded parallel, merge, then match.
//!
//! `analyze` always returns a structurally complete `AnalysisResult`. Degraded
//! quality (empty lists, zero score) is how partial failure shows up; no stage
//! error reaches the caller. Every stage runs on its own task, so a panicking
//! completion only costs that stage its result.

use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, StreamExt};
use tracing::{error, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::analysis::extraction::try_extract;
use crate::analysis::matching::match_profile;
use crate::analysis::merge::merge;
use crate::analysis::models::{AnalysisResult, MatchAnalysis, MergedProfile};
use crate::analysis::segmenter::{segment, DEFAULT_MAX_CHUNK_WORDS};
use crate::config::Config;
use crate::llm_client::CompletionClient;

/// Tunables for one analyzer instance.
#[derive(Debug, Clone)]
pub struct AnalyzerSettings {
    pub max_chunk_words: usize,
    /// Upper bound on concurrent chunk extractions.
    pub extraction_concurrency: usize,
    /// Per-completion timeout; an elapsed call takes its stage's fallback.
    pub call_timeout: Duration,
}

impl Default for AnalyzerSettings {
    fn default() -> Self {
        Self {
            max_chunk_words: DEFAULT_MAX_CHUNK_WORDS,
            extraction_concurrency: 2,
            call_timeout: Duration::from_secs(120),
        }
    }
}

impl From<&Config> for AnalyzerSettings {
    fn from(config: &Config) -> Self {
        Self {
            max_chunk_words: config.max_chunk_words,
            extraction_concurrency: config.extraction_concurrency,
            call_timeout: config.llm_timeout(),
        }
    }
}

/// Stateless résumé analyzer. Cheap to share: every analysis owns its own data
/// and only the completion client is common.
#[derive(Clone)]
pub struct ResumeAnalyzer {
    llm: Arc<dyn CompletionClient>,
    settings: AnalyzerSettings,
}

impl ResumeAnalyzer {
    pub fn new(llm: Arc<dyn CompletionClient>, settings: AnalyzerSettings) -> Self {
        Self { llm, settings }
    }

    pub fn llm(&self) -> &dyn CompletionClient {
        self.llm.as_ref()
    }

    pub fn settings(&self) -> &AnalyzerSettings {
        &self.settings
    }

    /// Runs the full pipeline for one résumé. A blank `job_description` is
    /// treated the same as none.
    pub async fn analyze(&self, resume_text: &str, job_description: Option<&str>) -> AnalysisResult {
        let analysis_id = Uuid::new_v4();
        let span = info_span!("analysis", %analysis_id);
        let job_description = job_description.filter(|jd| !jd.trim().is_empty());

        async move {
            info!("Starting resume analysis");

            let basic_info = self.extract_profile(resume_text).await;

            let match_analysis = match job_description {
                Some(jd) => self.match_job(&basic_info, jd).await,
                None => MatchAnalysis::default(),
            };

            info!("Resume analysis completed");
            AnalysisResult {
                basic_info,
                match_analysis,
            }
        }
        .instrument(span)
        .await
    }

    /// Segments, extracts every chunk and merges the successful extractions.
    async fn extract_profile(&self, resume_text: &str) -> MergedProfile {
        let chunks = segment(resume_text, self.settings.max_chunk_words);
        let total = chunks.len();
        info!("Split resume into {total} chunks");

        let timeout = self.settings.call_timeout;
        let concurrency = self.settings.extraction_concurrency.max(1);

        // `buffered` keeps chunk order, which the merge fold depends on.
        let outcomes: Vec<_> = stream::iter(chunks.into_iter().enumerate())
            .map(|(index, chunk)| {
                let llm = Arc::clone(&self.llm);
                let chunk_span = info_span!("chunk", chunk = index + 1, total);
                tokio::spawn(
                    async move {
                        info!("Processing chunk ({} words)", chunk.word_count);
                        try_extract(&chunk.text, llm.as_ref(), timeout).await
                    }
                    .instrument(chunk_span),
                )
            })
            .buffered(concurrency)
            .collect()
            .await;

        let mut results = Vec::with_capacity(total);
        for (index, outcome) in outcomes.into_iter().enumerate() {
            let chunk = index + 1;
            match outcome {
                Ok(Ok(result)) => {
                    info!("Successfully processed chunk {chunk}/{total}");
                    results.push(result);
                }
                Ok(Err(failure)) => warn!("Skipping chunk {chunk}/{total}: {failure}"),
                Err(join_error) => error!("Extraction task for chunk {chunk}/{total} aborted: {join_error}"),
            }
        }

        let llm = Arc::clone(&self.llm);
        let merge_task =
            tokio::spawn(async move { merge(results, llm.as_ref(), timeout).await }.in_current_span());
        let profile = merge_task.await.unwrap_or_else(|join_error| {
            error!("Merge task aborted: {join_error}");
            MergedProfile::default()
        });

        if profile.is_empty() {
            warn!("No skills, experience or education could be extracted");
        }
        profile
    }

    async fn match_job(&self, profile: &MergedProfile, job_description: &str) -> MatchAnalysis {
        let llm = Arc::clone(&self.llm);
        let profile = profile.clone();
        let job_description = job_description.to_string();
        let timeout = self.settings.call_timeout;

        let match_task = tokio::spawn(
            async move { match_profile(&profile, &job_description, llm.as_ref(), timeout).await }
                .in_current_span(),
        );
        match_task.await.unwrap_or_else(|join_error| {
            error!("Match task aborted: {join_error}");
            MatchAnalysis::default()
        })
    }
}
