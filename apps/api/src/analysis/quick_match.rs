//! Quick match score for an already-analysed candidate against a structured
//! job posting. The score comes from the model; the gap list is computed
//! locally from the posting's required skills.

use std::collections::HashSet;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::analysis::matching::parse_match_score;
use crate::analysis::models::ResumeSummary;
use crate::analysis::prompts::match_prompt;
use crate::analysis::response_parser::parse;
use crate::analysis::segmenter::segment;
use crate::llm_client::{complete_within, CompletionClient};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct JobPosting {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub required_skills: Vec<String>,
    #[serde(default)]
    pub preferred_skills: Vec<String>,
}

impl JobPosting {
    /// Plain-text rendering sent to the model.
    pub fn to_text(&self) -> String {
        format!(
            "{}\n{}\nRequired Skills: {}\nPreferred Skills: {}",
            self.title,
            self.description,
            self.required_skills.join(", "),
            self.preferred_skills.join(", ")
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct QuickMatch {
    pub match_score: f64,
    pub skill_gaps: Vec<String>,
    pub suggestions: Vec<String>,
}

pub async fn quick_match(
    summary: &ResumeSummary,
    posting: &JobPosting,
    llm: &dyn CompletionClient,
    max_chunk_words: usize,
    timeout: Duration,
) -> QuickMatch {
    let skill_gaps = missing_required_skills(&summary.skills, &posting.required_skills);
    let suggestions = skill_gaps
        .iter()
        .map(|skill| format!("Consider learning {skill}"))
        .collect();

    QuickMatch {
        match_score: model_score(summary, posting, llm, max_chunk_words, timeout).await,
        skill_gaps,
        suggestions,
    }
}

/// Scores only the first chunk of the candidate text to stay within the
/// model's context window.
async fn model_score(
    summary: &ResumeSummary,
    posting: &JobPosting,
    llm: &dyn CompletionClient,
    max_chunk_words: usize,
    timeout: Duration,
) -> f64 {
    let candidate_text = summary
        .experience
        .iter()
        .chain(&summary.skills)
        .cloned()
        .collect::<Vec<_>>()
        .join("\n");

    let Some(first_chunk) = segment(&candidate_text, max_chunk_words).into_iter().next() else {
        warn!("Quick match requested for an empty candidate profile");
        return 0.0;
    };

    let prompt = match_prompt(&first_chunk.text, &posting.to_text());
    match complete_within(llm, &prompt, timeout).await {
        Ok(completion) => parse(&completion)
            .into_object()
            .map(|object| parse_match_score(object.get("match_score")))
            .unwrap_or(0.0),
        Err(e) => {
            warn!("Quick match scoring failed: {e}");
            0.0
        }
    }
}

/// Required skills absent from the candidate's skills, compared case-insensitively.
fn missing_required_skills(candidate_skills: &[String], required: &[String]) -> Vec<String> {
    let have: HashSet<String> = candidate_skills.iter().map(|s| s.to_lowercase()).collect();
    required
        .iter()
        .filter(|skill| !have.contains(&skill.to_lowercase()))
        .cloned()
        .collect()
}
