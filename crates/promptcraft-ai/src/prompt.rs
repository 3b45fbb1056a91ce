//! Prompt templates for writing-prompt generation.

/// Upper bound on the length of the generated prompt, in words.
pub const MAX_PROMPT_WORDS: usize = 50;

/// Template wrapped around the user's description. `{description}` is
/// replaced verbatim.
pub const PROMPT_TEMPLATE: &str = r#"### Task:
Generate a **concise and thought-provoking writing prompt** based on the following description.

### Description:
{description}

### Instructions:
- **Only output a single, creative writing prompt.**
- Do **NOT** generate exercises or story outlines.
- The prompt should be **under {max_words} words** and **spark imagination and storytelling.**
- **Strictly avoid adding additional guidance or tips.**
"#;

/// Build the structured prompt sent to the model.
pub fn build_generation_prompt(description: &str) -> String {
    PROMPT_TEMPLATE
        .replace("{max_words}", &MAX_PROMPT_WORDS.to_string())
        .replace("{description}", description.trim())
}

/// Prompt produced without any model, for use when no service is available.
pub fn offline_prompt(description: &str) -> String {
    format!(
        "Write a detailed and creative response for: {}",
        description.trim()
    )
}

/// Whether a description carries any text worth sending.
pub fn is_blank(description: &str) -> bool {
    description.trim().is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_description_embedded() {
        let prompt = build_generation_prompt("a lighthouse keeper who has never seen the sea");
        assert!(prompt.contains("### Description:\na lighthouse keeper who has never seen the sea\n"));
        assert!(prompt.contains("under 50 words"));
        assert!(prompt.contains("Do **NOT** generate exercises or story outlines."));
    }

    #[test]
    fn test_placeholder_in_description_not_expanded() {
        let prompt = build_generation_prompt("a story about {max_words}");
        assert!(prompt.contains("a story about {max_words}"));
    }

    #[test]
    fn test_offline_prompt() {
        assert_eq!(
            offline_prompt("  dragons in winter \n"),
            "Write a detailed and creative response for: dragons in winter"
        );
    }

    #[test]
    fn test_blank() {
        assert!(is_blank(""));
        assert!(is_blank(" \n\t "));
        assert!(!is_blank(" x "));
    }
}
