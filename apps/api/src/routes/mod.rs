pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::analysis::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/health", get(health::health_handler))
        // Analysis API
        .route("/api/v1/resumes/analyze", post(handlers::handle_analyze_upload))
        .route(
            "/api/v1/resumes/analyze-text",
            post(handlers::handle_analyze_text),
        )
        .route(
            "/api/v1/resumes/interview-questions",
            post(handlers::handle_interview_questions),
        )
        .route(
            "/api/v1/resumes/match-score",
            post(handlers::handle_match_score),
        )
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::analysis::pipeline::{AnalyzerSettings, ResumeAnalyzer};
    use crate::config::Config;
    use crate::llm_client::testing::ScriptedCompletion;

    const BOUNDARY: &str = "hirefit-test-boundary";

    fn test_config() -> Config {
        Config {
            llm_base_url: "http://127.0.0.1:8081".to_string(),
            llm_max_new_tokens: 256,
            llm_temperature: 0.1,
            llm_top_k: 30,
            llm_top_p: 0.1,
            llm_timeout_secs: 5,
            llm_startup_attempts: 1,
            max_chunk_words: 800,
            extraction_concurrency: 2,
            max_upload_bytes: 1024 * 1024,
            port: 0,
            rust_log: "info".to_string(),
        }
    }

    fn app(llm: Arc<ScriptedCompletion>) -> Router {
        let settings = AnalyzerSettings {
            call_timeout: Duration::from_secs(5),
            ..AnalyzerSettings::default()
        };
        build_router(AppState {
            analyzer: ResumeAnalyzer::new(llm, settings),
            config: test_config(),
        })
    }

    fn json_request(uri: &str, body: Value) -> Request<Body> {
        Request::post(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn multipart_request(file_name: &str, content_type: &str, contents: &[u8]) -> Request<Body> {
        let mut body = Vec::new();
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(contents);
        body.extend_from_slice(
            format!(
                "\r\n--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"job_description\"\r\n\r\nRust engineer\r\n--{BOUNDARY}--\r\n"
            )
            .as_bytes(),
        );

        Request::post("/api/v1/resumes/analyze")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let response = app(Arc::new(ScriptedCompletion::fixed("{}")))
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["status"], "ok");
    }

    #[tokio::test]
    async fn test_analyze_text_returns_envelope_with_zero_match() {
        let llm = Arc::new(ScriptedCompletion::fixed(
            r#"{"skills": ["Rust"], "experience": ["Acme"], "education": ["MIT"]}"#,
        ));
        let response = app(llm)
            .oneshot(json_request(
                "/api/v1/resumes/analyze-text",
                json!({"resume_text": "SKILLS Rust EXPERIENCE Acme EDUCATION MIT"}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["status"], "success");
        assert_eq!(body["data"]["basic_info"]["skills"], json!(["Rust"]));
        assert_eq!(body["data"]["match_analysis"]["match_score"], 0.0);
        assert_eq!(body["data"]["match_analysis"]["skill_gaps"], json!([]));
    }

    #[tokio::test]
    async fn test_analyze_text_rejects_blank_resume() {
        let response = app(Arc::new(ScriptedCompletion::fixed("{}")))
            .oneshot(json_request(
                "/api/v1/resumes/analyze-text",
                json!({"resume_text": "   "}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_upload_of_unsupported_format_is_rejected_without_model_call() {
        let llm = Arc::new(ScriptedCompletion::fixed("{}"));
        let response = app(llm.clone())
            .oneshot(multipart_request("resume.txt", "text/plain", b"SKILLS Rust"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
        assert_eq!(body_json(response).await["error"]["code"], "UNSUPPORTED_FORMAT");
        assert_eq!(llm.calls(), 0);
    }

    #[tokio::test]
    async fn test_upload_of_corrupted_file_is_an_explicit_error() {
        let llm = Arc::new(ScriptedCompletion::fixed("{}"));
        let response = app(llm.clone())
            .oneshot(multipart_request(
                "resume.docx",
                "application/octet-stream",
                b"this zip is broken",
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body_json(response).await["error"]["code"], "UNREADABLE_DOCUMENT");
        assert_eq!(llm.calls(), 0);
    }

    #[tokio::test]
    async fn test_interview_questions_route() {
        let llm = Arc::new(ScriptedCompletion::fixed(
            r#"{"questions": ["Tell me about Acme."]}"#,
        ));
        let response = app(llm)
            .oneshot(json_request(
                "/api/v1/resumes/interview-questions",
                json!({"skills": ["Rust"], "experience": ["Acme"], "education": []}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_json(response).await["questions"],
            json!(["Tell me about Acme."])
        );
    }

    #[tokio::test]
    async fn test_match_score_route_flattens_result() {
        let llm = Arc::new(ScriptedCompletion::fixed(r#"{"match_score": 0.75}"#));
        let response = app(llm)
            .oneshot(json_request(
                "/api/v1/resumes/match-score",
                json!({
                    "resume_analysis": {"skills": ["Rust"], "experience": ["Acme"]},
                    "job_description": {
                        "title": "Engineer",
                        "description": "Systems work",
                        "required_skills": ["Rust", "Kafka"],
                        "preferred_skills": []
                    }
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["status"], "success");
        assert_eq!(body["match_score"], 0.75);
        assert_eq!(body["skill_gaps"], json!(["Kafka"]));
        assert_eq!(body["suggestions"], json!(["Consider learning Kafka"]));
    }
}
