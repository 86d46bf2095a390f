//! Data model shared by every analysis stage.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Caps applied to the match lists before they leave the match stage.
pub const MAX_SKILL_GAPS: usize = 5;
pub const MAX_SUGGESTIONS: usize = 3;
pub const MAX_MATCHING_SKILLS: usize = 5;
pub const MAX_RELEVANT_EXPERIENCE: usize = 3;

const PROFILE_FIELDS: [&str; 3] = ["skills", "experience", "education"];

/// Skills / experience / education pulled out of one chunk.
///
/// Field names are the contract with the model prompts: "skills",
/// "experience", "education".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractionResult {
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub experience: Vec<String>,
    #[serde(default)]
    pub education: Vec<String>,
}

/// The fold accumulator across all chunks. Same shape as a single extraction.
pub type MergedProfile = ExtractionResult;

impl ExtractionResult {
    /// Builds a result from a model-produced JSON object. Missing or non-array
    /// fields become empty lists; each field is deduplicated.
    pub fn from_json(object: &Map<String, Value>) -> Self {
        Self {
            skills: string_list(object.get("skills")),
            experience: string_list(object.get("experience")),
            education: string_list(object.get("education")),
        }
        .deduplicated()
    }

    /// Like [`from_json`](Self::from_json), but an object carrying none of the
    /// profile fields (e.g. a bare `{}`) counts as no answer at all.
    pub fn from_profile_json(object: &Map<String, Value>) -> Option<Self> {
        PROFILE_FIELDS
            .iter()
            .any(|field| object.contains_key(*field))
            .then(|| Self::from_json(object))
    }

    /// Removes repeated entries from each field, keeping first-seen order.
    pub fn deduplicated(self) -> Self {
        Self {
            skills: dedup_preserving_order(self.skills),
            experience: dedup_preserving_order(self.experience),
            education: dedup_preserving_order(self.education),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.skills.is_empty() && self.experience.is_empty() && self.education.is_empty()
    }

    /// Compact JSON rendering embedded in merge and match prompts.
    pub fn to_prompt_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }
}

/// Job-fit assessment. The zero value (`Default`) stands in for "no job
/// description" and for every failed match attempt; it is never omitted.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MatchAnalysis {
    pub match_score: f64,
    pub skill_gaps: Vec<String>,
    pub suggestions: Vec<String>,
    pub matching_skills: Vec<String>,
    pub relevant_experience: Vec<String>,
}

/// Top-level return value of one analysis.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AnalysisResult {
    pub basic_info: MergedProfile,
    pub match_analysis: MatchAnalysis,
}

/// Flattened candidate summary exchanged with clients for follow-up calls
/// (interview questions, quick match score).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResumeSummary {
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub experience: Vec<String>,
    #[serde(default)]
    pub education: Vec<String>,
    #[serde(default)]
    pub match_score: f64,
    #[serde(default)]
    pub skill_gaps: Vec<String>,
    #[serde(default)]
    pub improvement_suggestions: Vec<String>,
}

/// Coerces a model-produced value into a list of strings. Strings are kept
/// as-is, other scalars and objects keep their JSON text, nulls are dropped.
/// Anything that is not an array yields an empty list.
pub fn string_list(value: Option<&Value>) -> Vec<String> {
    let Some(Value::Array(items)) = value else {
        return Vec::new();
    };

    items
        .iter()
        .filter_map(|item| match item {
            Value::String(s) => Some(s.trim().to_string()),
            Value::Null => None,
            other => Some(other.to_string()),
        })
        .filter(|s| !s.is_empty())
        .collect()
}

pub fn dedup_preserving_order(items: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_from_json_dedups_each_field_in_order() {
        let result = ExtractionResult::from_json(&object(json!({
            "skills": ["Rust", "Go", "Rust", "SQL", "Go"],
            "experience": ["Acme"],
            "education": []
        })));
        assert_eq!(result.skills, vec!["Rust", "Go", "SQL"]);
        assert_eq!(result.experience, vec!["Acme"]);
        assert!(result.education.is_empty());
    }

    #[test]
    fn test_from_json_missing_and_malformed_fields_are_empty() {
        let result = ExtractionResult::from_json(&object(json!({
            "skills": "Rust, Go",
            "experience": null
        })));
        assert!(result.is_empty());
    }

    #[test]
    fn test_from_profile_json_rejects_objects_without_profile_fields() {
        assert_eq!(ExtractionResult::from_profile_json(&object(json!({}))), None);
        assert_eq!(
            ExtractionResult::from_profile_json(&object(json!({"name": "Jane"}))),
            None
        );
        assert_eq!(
            ExtractionResult::from_profile_json(&object(json!({"education": []}))),
            Some(ExtractionResult::default())
        );
    }

    #[test]
    fn test_string_list_keeps_non_string_items_as_json_text() {
        let list = string_list(Some(&json!([
            "Engineer",
            {"title": "Lead", "company": "Acme"},
            null,
            "  ",
            3
        ])));
        assert_eq!(list.len(), 3);
        assert_eq!(list[0], "Engineer");
        assert!(list[1].contains("\"company\":\"Acme\""));
        assert_eq!(list[2], "3");
    }

    #[test]
    fn test_match_analysis_zero_value_serializes_all_fields() {
        let json = serde_json::to_value(MatchAnalysis::default()).unwrap();
        assert_eq!(json["match_score"], 0.0);
        assert_eq!(json["skill_gaps"], json!([]));
        assert_eq!(json["suggestions"], json!([]));
        assert_eq!(json["matching_skills"], json!([]));
        assert_eq!(json["relevant_experience"], json!([]));
    }
}
