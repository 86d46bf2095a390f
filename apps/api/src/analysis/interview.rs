//! Interview question generation from an analysed résumé.

use std::time::Duration;

use tracing::{info, warn};

use crate::analysis::models::{string_list, ResumeSummary};
use crate::analysis::prompts::interview_questions_prompt;
use crate::analysis::response_parser::parse;
use crate::llm_client::{complete_within, CompletionClient};

/// Asks the model for interview questions. Any failure yields an empty list.
pub async fn generate_interview_questions(
    summary: &ResumeSummary,
    llm: &dyn CompletionClient,
    timeout: Duration,
) -> Vec<String> {
    let prompt = interview_questions_prompt(summary);

    let completion = match complete_within(llm, &prompt, timeout).await {
        Ok(text) => text,
        Err(e) => {
            warn!("Interview question generation failed: {e}");
            return Vec::new();
        }
    };

    let questions = parse(&completion)
        .into_object()
        .map(|object| string_list(object.get("questions")))
        .unwrap_or_default();

    info!("Generated {} interview questions", questions.len());
    questions
}
