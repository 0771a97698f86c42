//! Prompt assembly from ranked chunks.

/// Opening line of every context block.
pub const PREAMBLE: &str = "Based on the following documents:";

/// Closing line of every context block.
pub const TRAILER: &str = "Answer the question below.";

/// Render chunks as a numbered context block with `[i]` citation markers.
///
/// Chunks are separated by a blank line. An empty slice still yields the
/// preamble and trailer.
pub fn format_context(chunks: &[String]) -> String {
    let body = chunks
        .iter()
        .enumerate()
        .map(|(i, chunk)| format!("[{}] {chunk}", i + 1))
        .collect::<Vec<_>>()
        .join("\n\n");

    format!("{PREAMBLE}\n{body}\n\n{TRAILER}")
}

/// Append the user's question to a context block.
pub fn build_prompt(context: &str, query: &str) -> String {
    format!("{context}\nQuestion: {query}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_context() {
        let context = format_context(&[]);
        assert_eq!(
            context,
            "Based on the following documents:\n\n\nAnswer the question below."
        );
        assert!(!context.contains("[1]"));
    }

    #[test]
    fn test_citations_are_one_based() {
        let chunks = vec!["cats are great".to_string(), "dogs are loyal".to_string()];
        let context = format_context(&chunks);
        assert_eq!(
            context,
            "Based on the following documents:\n[1] cats are great\n\n[2] dogs are loyal\n\nAnswer the question below."
        );
    }

    #[test]
    fn test_prompt_ends_with_question() {
        let prompt = build_prompt(&format_context(&["x".to_string()]), "What is x?");
        assert!(prompt.ends_with("\nQuestion: What is x?"));
        assert!(prompt.starts_with(PREAMBLE));
    }
}
