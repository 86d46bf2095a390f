//! Extraction Stage: one prompt, completion and parse cycle per chunk.

use std::time::Duration;

use thiserror::Error;
use tracing::debug;

use crate::analysis::models::ExtractionResult;
use crate::analysis::prompts::extraction_prompt;
use crate::analysis::response_parser::{parse, ParsedResponse};
use crate::llm_client::{complete_within, CompletionClient, LlmError};

/// Why a chunk produced no usable extraction.
#[derive(Debug, Error)]
pub enum ExtractionFailure {
    #[error("completion failed: {0}")]
    Completion(#[from] LlmError),

    #[error("no JSON object in completion")]
    NoJson,

    #[error("malformed JSON in completion: {0}")]
    MalformedJson(String),
}

/// Runs extraction for one chunk, reporting why it failed if it did.
///
/// A reply with none of the profile fields counts as [`ExtractionFailure::NoJson`].
/// The pipeline leaves failed chunks out of the merge; callers that want an
/// all-empty result instead use `unwrap_or_default()`.
pub async fn try_extract(
    chunk: &str,
    llm: &dyn CompletionClient,
    timeout: Duration,
) -> Result<ExtractionResult, ExtractionFailure> {
    let prompt = extraction_prompt(chunk);
    let completion = complete_within(llm, &prompt, timeout).await?;

    match parse(&completion) {
        ParsedResponse::Object(object) => {
            let result =
                ExtractionResult::from_profile_json(&object).ok_or(ExtractionFailure::NoJson)?;
            debug!(
                "Extracted {} skills, {} experience, {} education entries",
                result.skills.len(),
                result.experience.len(),
                result.education.len()
            );
            Ok(result)
        }
        ParsedResponse::NotFound => Err(ExtractionFailure::NoJson),
        ParsedResponse::Invalid(reason) => Err(ExtractionFailure::MalformedJson(reason)),
    }
}
