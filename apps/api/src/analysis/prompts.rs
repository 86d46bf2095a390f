// Prompt builders for the analysis pipeline.
// The JSON field names in these templates ("skills", "experience", "education",
// "match_score", ...) are the contract with the model. Keep them stable.

use crate::analysis::models::{ExtractionResult, ResumeSummary};
use crate::llm_client::prompts::{instruct, JSON_FORMAT_INSTRUCTION};

/// Per-chunk extraction of skills, experience and education.
pub fn extraction_prompt(chunk: &str) -> String {
    instruct(&format!(
        r#"Extract key information from this resume section. Be brief and specific.

Text: {chunk}

{JSON_FORMAT_INSTRUCTION}
{{
    "skills": ["skill1", "skill2"],
    "experience": ["job1", "job2"],
    "education": ["edu1", "edu2"]
}}"#
    ))
}

/// Pairwise merge of the running profile with the next chunk's extraction.
pub fn merge_prompt(previous: &ExtractionResult, current: &ExtractionResult) -> String {
    instruct(&format!(
        r#"Combine and summarize these resume sections. Remove duplicates and maintain the most relevant information.

Previous Results: {previous}
Current Section: {current}

{JSON_FORMAT_INSTRUCTION}
{{
    "skills": ["skill1", "skill2"],
    "experience": ["most_recent_job1", "job2"],
    "education": ["education1", "education2"]
}}"#,
        previous = previous.to_prompt_json(),
        current = current.to_prompt_json(),
    ))
}

/// Profile-vs-job assessment. The score bands are guidance for the model only;
/// nothing downstream remaps scores into them.
pub fn match_prompt(resume_information: &str, job_description: &str) -> String {
    instruct(&format!(
        r#"Analyze how well the candidate's profile matches the job requirements. Consider both skills and experience.

Resume Information:
{resume_information}

Job Description:
{job_description}

Provide a detailed analysis in JSON format. The match_score should be between 0.0 and 1.0, where:
- 0.8-1.0: Excellent match (90%+ requirements met)
- 0.6-0.79: Good match (70-89% requirements met)
- 0.4-0.59: Fair match (50-69% requirements met)
- Below 0.4: Poor match (less than 50% requirements met)

{JSON_FORMAT_INSTRUCTION}
{{
    "match_score": 0.XX,
    "skill_gaps": ["missing_skill1", "missing_skill2"],
    "suggestions": ["specific_improvement1", "specific_improvement2"],
    "matching_skills": ["matching_skill1", "matching_skill2"],
    "relevant_experience": ["relevant_exp1", "relevant_exp2"]
}}"#
    ))
}

/// Interview questions tailored to an analysed candidate.
pub fn interview_questions_prompt(summary: &ResumeSummary) -> String {
    let summary_json = serde_json::to_string(summary).unwrap_or_else(|_| "{}".to_string());
    instruct(&format!(
        r#"Generate interview questions for this candidate based on their resume analysis. Cover their strongest skills, probe their most recent experience, and address the listed skill gaps.

Resume Analysis: {summary_json}

{JSON_FORMAT_INSTRUCTION}
{{
    "questions": ["question1", "question2"]
}}"#
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extraction_prompt_embeds_chunk_and_field_contract() {
        let prompt = extraction_prompt("SKILLS Rust Go");
        assert!(prompt.starts_with("<s>[INST]"));
        assert!(prompt.contains("Text: SKILLS Rust Go"));
        for field in ["\"skills\"", "\"experience\"", "\"education\""] {
            assert!(prompt.contains(field), "missing {field}");
        }
    }

    #[test]
    fn test_merge_prompt_serializes_both_sides() {
        let previous = ExtractionResult {
            skills: vec!["Rust".to_string()],
            ..ExtractionResult::default()
        };
        let current = ExtractionResult {
            education: vec!["MIT".to_string()],
            ..ExtractionResult::default()
        };
        let prompt = merge_prompt(&previous, &current);
        assert!(prompt.contains(
            r#"Previous Results: {"skills":["Rust"],"experience":[],"education":[]}"#
        ));
        assert!(prompt.contains(
            r#"Current Section: {"skills":[],"experience":[],"education":["MIT"]}"#
        ));
    }

    #[test]
    fn test_user_text_with_braces_is_not_reinterpolated() {
        let prompt = match_prompt("{job_description}", "Rust {role}");
        assert!(prompt.contains("Resume Information:\n{job_description}"));
        assert!(prompt.contains("Job Description:\nRust {role}"));
    }

    #[test]
    fn test_match_prompt_documents_score_bands() {
        let prompt = match_prompt("{}", "Rust engineer");
        assert!(prompt.contains("0.8-1.0: Excellent match"));
        assert!(prompt.contains("Below 0.4: Poor match"));
        assert!(prompt.contains("\"relevant_experience\""));
    }
}
