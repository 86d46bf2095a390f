// Résumé analysis pipeline.
// Implements: segmentation, per-chunk extraction, LLM-mediated merge, job matching,
// plus interview questions and quick match scoring for analysed candidates.
// All completions go through llm_client::CompletionClient.

pub mod extraction;
pub mod handlers;
pub mod interview;
pub mod matching;
pub mod merge;
pub mod models;
pub mod pipeline;
pub mod prompts;
pub mod quick_match;
pub mod response_parser;
pub mod segmenter;
