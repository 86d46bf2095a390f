use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Every variable has a default; a present but malformed value fails startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the local inference server (llama.cpp-compatible).
    pub llm_base_url: String,
    pub llm_max_new_tokens: u32,
    pub llm_temperature: f32,
    pub llm_top_k: u32,
    pub llm_top_p: f32,
    pub llm_timeout_secs: u64,
    /// Readiness probes (2s apart) before startup gives up on the engine.
    pub llm_startup_attempts: u32,
    pub max_chunk_words: usize,
    pub extraction_concurrency: usize,
    pub max_upload_bytes: usize,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            llm_base_url: env_or("LLM_BASE_URL", "http://127.0.0.1:8081".to_string())?,
            llm_max_new_tokens: env_or("LLM_MAX_NEW_TOKENS", 256)?,
            llm_temperature: env_or("LLM_TEMPERATURE", 0.1)?,
            llm_top_k: env_or("LLM_TOP_K", 30)?,
            llm_top_p: env_or("LLM_TOP_P", 0.1)?,
            llm_timeout_secs: env_or("LLM_TIMEOUT_SECS", 120)?,
            llm_startup_attempts: env_or("LLM_STARTUP_ATTEMPTS", 30)?,
            max_chunk_words: env_or("MAX_CHUNK_WORDS", 800)?,
            extraction_concurrency: env_or("EXTRACTION_CONCURRENCY", 2)?,
            max_upload_bytes: env_or("MAX_UPLOAD_BYTES", 10 * 1024 * 1024)?,
            port: env_or("PORT", 8000)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }

    pub fn llm_timeout(&self) -> Duration {
        Duration::from_secs(self.llm_timeout_secs)
    }
}

fn env_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => parse_value(key, &raw),
        Err(_) => Ok(default),
    }
}

fn parse_value<T>(key: &str, raw: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    raw.trim()
        .parse::<T>()
        .with_context(|| format!("Environment variable '{key}' has an invalid value: '{raw}'"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_value_accepts_padded_numbers() {
        let port: u16 = parse_value("PORT", " 8000 ").unwrap();
        assert_eq!(port, 8000);
    }

    #[test]
    fn test_parse_value_rejects_garbage_with_key_in_message() {
        let err = parse_value::<usize>("MAX_CHUNK_WORDS", "lots").unwrap_err();
        assert!(err.to_string().contains("MAX_CHUNK_WORDS"));
    }

    #[test]
    fn test_env_or_falls_back_when_unset() {
        let words: usize = env_or("HIREFIT_TEST_SURELY_UNSET_VARIABLE", 800).unwrap();
        assert_eq!(words, 800);
    }
}
