// Shared prompt fragments and prompt-building utilities.
// Each module that needs completions defines its own prompts.rs alongside it.
// This file contains cross-cutting pieces only.

/// Wraps an instruction in the Mistral-Instruct turn markers the local model expects.
pub fn instruct(body: &str) -> String {
    format!("<s>[INST] {}\n[/INST]</s>", body.trim())
}

/// Appended to every prompt that expects a structured answer.
pub const JSON_FORMAT_INSTRUCTION: &str = "Format the output as JSON:";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instruct_wraps_trimmed_body() {
        assert_eq!(instruct("  Do it.\n"), "<s>[INST] Do it.\n[/INST]</s>");
    }
}
