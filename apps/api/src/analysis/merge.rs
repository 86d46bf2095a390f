//! Merge Stage: folds per-chunk extractions into one profile.
//!
//! Each step asks the model to combine the running profile with the next
//! chunk's result, so step N depends on the output of step N-1. The fold is
//! strictly sequential and left-to-right in chunk order.

use std::time::Duration;

use tracing::{info, warn};

use crate::analysis::models::{ExtractionResult, MergedProfile};
use crate::analysis::prompts::merge_prompt;
use crate::analysis::response_parser::parse;
use crate::llm_client::{complete_within, CompletionClient};

/// Merges chunk results in order.
///
/// - no results → empty profile
/// - one result → returned unchanged, no model call
/// - otherwise a left fold; a step that fails, or whose reply carries no
///   profile fields, replaces the accumulator with the next raw result so
///   the fold keeps moving
pub async fn merge(
    results: Vec<ExtractionResult>,
    llm: &dyn CompletionClient,
    timeout: Duration,
) -> MergedProfile {
    let total = results.len();
    let mut results = results.into_iter();

    let Some(mut merged) = results.next() else {
        return MergedProfile::default();
    };

    for (step, next) in results.enumerate() {
        let step = step + 1;
        let prompt = merge_prompt(&merged, &next);

        merged = match complete_within(llm, &prompt, timeout).await {
            Ok(completion) => match parse(&completion)
                .into_object()
                .and_then(|object| ExtractionResult::from_profile_json(&object))
            {
                Some(profile) => profile,
                None => {
                    warn!("Merge step {step}/{} returned no usable JSON; keeping next chunk's result", total - 1);
                    next.deduplicated()
                }
            },
            Err(e) => {
                warn!("Merge step {step}/{} failed: {e}; keeping next chunk's result", total - 1);
                next.deduplicated()
            }
        };
    }

    if total > 1 {
        info!("Merged {total} chunk results");
    }

    merged
}
