use crate::analysis::pipeline::ResumeAnalyzer;
use crate::config::Config;

/// Shared application state injected into all route handlers via Axum extractors.
/// Holds no per-request data; every analysis is independent.
#[derive(Clone)]
pub struct AppState {
    pub analyzer: ResumeAnalyzer,
    pub config: Config,
}
