//! Match Stage: scores a merged profile against a job description.
//!
//! The model produces the score; this module only sanitises it. Score bands
//! are prose guidance in the prompt and are never enforced here.

use std::time::Duration;

use serde_json::{Map, Value};
use tracing::{info, warn};

use crate::analysis::models::{
    string_list, MatchAnalysis, MergedProfile, MAX_MATCHING_SKILLS, MAX_RELEVANT_EXPERIENCE,
    MAX_SKILL_GAPS, MAX_SUGGESTIONS,
};
use crate::analysis::prompts::match_prompt;
use crate::analysis::response_parser::parse;
use crate::analysis::segmenter::normalize_whitespace;
use crate::llm_client::{complete_within, CompletionClient};

/// Compares `profile` with `job_description`. Any failure yields the zero value.
pub async fn match_profile(
    profile: &MergedProfile,
    job_description: &str,
    llm: &dyn CompletionClient,
    timeout: Duration,
) -> MatchAnalysis {
    info!("Starting job description analysis");

    let prompt = match_prompt(
        &profile.to_prompt_json(),
        &normalize_whitespace(job_description),
    );

    let completion = match complete_within(llm, &prompt, timeout).await {
        Ok(text) => text,
        Err(e) => {
            warn!("Job matching failed: {e}");
            return MatchAnalysis::default();
        }
    };

    let Some(object) = parse(&completion).into_object() else {
        warn!("Job matching returned no usable JSON");
        return MatchAnalysis::default();
    };

    let analysis = match_analysis_from_json(&object);
    info!(
        "Job description analysis completed with match score: {:.2}",
        analysis.match_score
    );
    analysis
}

/// Builds a `MatchAnalysis` from model JSON, clamping the score and capping
/// every list at its documented size.
pub fn match_analysis_from_json(object: &Map<String, Value>) -> MatchAnalysis {
    MatchAnalysis {
        match_score: parse_match_score(object.get("match_score")),
        skill_gaps: capped(object.get("skill_gaps"), MAX_SKILL_GAPS),
        suggestions: capped(object.get("suggestions"), MAX_SUGGESTIONS),
        matching_skills: capped(object.get("matching_skills"), MAX_MATCHING_SKILLS),
        relevant_experience: capped(object.get("relevant_experience"), MAX_RELEVANT_EXPERIENCE),
    }
}

/// Reads `match_score` as a number or numeric string and clamps it to [0, 1].
/// Missing, non-numeric and NaN values become 0.0.
pub fn parse_match_score(value: Option<&Value>) -> f64 {
    let raw = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        Some(Value::Bool(b)) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    };

    match raw {
        Some(score) if !score.is_nan() => score.clamp(0.0, 1.0),
        _ => 0.0,
    }
}

fn capped(value: Option<&Value>, cap: usize) -> Vec<String> {
    let mut items = string_list(value);
    items.truncate(cap);
    items
}
