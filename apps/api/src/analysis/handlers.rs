//! Axum route handlers for the Analysis API.
//!
//! Handlers only marshal requests; every analysis decision lives in the
//! pipeline modules.

use axum::{
    extract::{Multipart, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::analysis::interview::generate_interview_questions;
use crate::analysis::models::{AnalysisResult, ResumeSummary};
use crate::analysis::quick_match::{quick_match, JobPosting, QuickMatch};
use crate::documents::{clean_text, extract_text, DocumentError, DocumentFormat, RawDocument};
use crate::errors::AppError;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct AnalyzeTextRequest {
    pub resume_text: String,
    #[serde(default)]
    pub job_description: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub status: &'static str,
    pub message: &'static str,
    pub data: AnalysisResult,
}

impl AnalyzeResponse {
    fn completed(data: AnalysisResult) -> Self {
        Self {
            status: "success",
            message: "Resume analysis completed",
            data,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct InterviewQuestionsResponse {
    pub status: &'static str,
    pub questions: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct MatchScoreRequest {
    pub resume_analysis: ResumeSummary,
    pub job_description: JobPosting,
}

#[derive(Debug, Serialize)]
pub struct MatchScoreResponse {
    pub status: &'static str,
    #[serde(flatten)]
    pub result: QuickMatch,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/resumes/analyze
///
/// Multipart upload: `file` (PDF or DOCX, required) and `job_description`
/// (text, optional). Unsupported or unreadable files are rejected before any
/// model call.
pub async fn handle_analyze_upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<AnalyzeResponse>, AppError> {
    let mut document = None;
    let mut job_description = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => {
                let format = DocumentFormat::detect(field.file_name(), field.content_type())?;
                let bytes = field.bytes().await?;
                document = Some(RawDocument { bytes, format });
            }
            Some("job_description") => job_description = Some(field.text().await?),
            _ => {}
        }
    }

    let document =
        document.ok_or_else(|| AppError::Validation("Missing 'file' upload field".to_string()))?;
    info!(
        "Received {:?} upload ({} bytes)",
        document.format,
        document.bytes.len()
    );

    let resume_text = clean_text(&extract_text(document).await?);
    if resume_text.is_empty() {
        return Err(DocumentError::EmptyText.into());
    }

    let result = state
        .analyzer
        .analyze(&resume_text, job_description.as_deref())
        .await;

    Ok(Json(AnalyzeResponse::completed(result)))
}

/// POST /api/v1/resumes/analyze-text
///
/// Same pipeline for callers that already hold plain text.
pub async fn handle_analyze_text(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeTextRequest>,
) -> Result<Json<AnalyzeResponse>, AppError> {
    if request.resume_text.trim().is_empty() {
        return Err(AppError::Validation("resume_text cannot be empty".to_string()));
    }

    let result = state
        .analyzer
        .analyze(&request.resume_text, request.job_description.as_deref())
        .await;

    Ok(Json(AnalyzeResponse::completed(result)))
}

/// POST /api/v1/resumes/interview-questions
pub async fn handle_interview_questions(
    State(state): State<AppState>,
    Json(summary): Json<ResumeSummary>,
) -> Json<InterviewQuestionsResponse> {
    let analyzer = &state.analyzer;
    let questions =
        generate_interview_questions(&summary, analyzer.llm(), analyzer.settings().call_timeout)
            .await;

    Json(InterviewQuestionsResponse {
        status: "success",
        questions,
    })
}

/// POST /api/v1/resumes/match-score
///
/// Model score for an analysed candidate against a structured posting, plus
/// locally computed required-skill gaps.
pub async fn handle_match_score(
    State(state): State<AppState>,
    Json(request): Json<MatchScoreRequest>,
) -> Json<MatchScoreResponse> {
    let analyzer = &state.analyzer;
    let settings = analyzer.settings();
    let result = quick_match(
        &request.resume_analysis,
        &request.job_description,
        analyzer.llm(),
        settings.max_chunk_words,
        settings.call_timeout,
    )
    .await;

    Json(MatchScoreResponse {
        status: "success",
        result,
    })
}
