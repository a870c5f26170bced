use crate::{sanitize::truncate_chars, types::Snippet};

/// Snippets considered by the analysis prompt.
pub const ANALYSIS_SNIPPETS: usize = 12;
pub const ANALYSIS_CONTEXT_CHARS: usize = 16_000;
pub const FINAL_CONTEXT_CHARS: usize = 20_000;

/// Join snippet texts with blank lines, capped at `max_chars` characters.
pub fn join_snippets(snippets: &[Snippet], max_chars: usize) -> String {
    let joined = snippets
        .iter()
        .map(|s| s.text.as_str())
        .collect::<Vec<_>>()
        .join("\n\n");
    truncate_chars(&joined, max_chars).to_string()
}

pub fn build_analysis_prompt(title: &str, snippets: &[Snippet]) -> String {
    let head = &snippets[..snippets.len().min(ANALYSIS_SNIPPETS)];
    let joined = join_snippets(head, ANALYSIS_CONTEXT_CHARS);
    format!(
        "Read the following source excerpts related to the title: {title}\n\n\
         {joined}\n\n\
         Provide exactly 8 concise bullets: strongest hooks, recurring themes, contradictions, \
         surprising facts, and 3 unique angles not commonly covered."
    )
}

/// Context block for the final prompt: every snippet, capped.
pub fn final_context(snippets: &[Snippet]) -> String {
    join_snippets(snippets, FINAL_CONTEXT_CHARS)
}

pub fn build_final_prompt(
    title: &str,
    analysis_bullets: &str,
    context_block: &str,
    target_words: u32,
) -> String {
    format!(
        r#"You are the combined expertise of the world's top 100 professional YouTube scriptwriters and researchers.

TITLE: {title}

USE THE FOLLOWING ANALYSIS BULLETS (do not output bullets, just use them):
{analysis_bullets}

CONTEXT SNIPPETS:
{context_block}

Task: Write a single continuous paragraph script (no headings, no bullet points, no list punctuation) of approximately {target_words} words."#
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SnippetSource;

    fn snippet(text: String) -> Snippet {
        Snippet {
            source: SnippetSource::ArticleBody,
            text,
        }
    }

    fn block_between<'a>(prompt: &'a str, start: &str, end: &str) -> &'a str {
        let from = prompt.find(start).unwrap() + start.len();
        let to = prompt.rfind(end).unwrap();
        &prompt[from..to]
    }

    #[test]
    fn test_join_snippets_uses_blank_lines() {
        let snippets = vec![snippet("a".into()), snippet("b".into())];
        assert_eq!(join_snippets(&snippets, 100), "a\n\nb");
        assert_eq!(join_snippets(&snippets, 2), "a\n");
    }

    #[test]
    fn test_analysis_prompt_uses_first_twelve() {
        let snippets: Vec<_> = (0..20).map(|i| snippet(format!("s{i}"))).collect();
        let prompt = build_analysis_prompt("T", &snippets);
        assert!(prompt.contains("s11"));
        assert!(!prompt.contains("s12"));
        assert!(prompt.contains("exactly 8 concise bullets"));
    }

    #[test]
    fn test_analysis_block_is_bounded() {
        let snippets: Vec<_> = (0..12).map(|_| snippet("x".repeat(4000))).collect();
        let prompt = build_analysis_prompt("T", &snippets);
        let block = block_between(&prompt, "title: T\n\n", "\n\nProvide exactly");
        assert_eq!(block.chars().count(), ANALYSIS_CONTEXT_CHARS);
    }

    #[test]
    fn test_final_block_is_bounded() {
        let snippets: Vec<_> = (0..40).map(|_| snippet("y".repeat(3000))).collect();
        let context = final_context(&snippets);
        assert_eq!(context.chars().count(), FINAL_CONTEXT_CHARS);

        let prompt = build_final_prompt("T", "- bullet", &context, 3600);
        let block = block_between(&prompt, "CONTEXT SNIPPETS:\n", "\n\nTask:");
        assert!(block.chars().count() <= FINAL_CONTEXT_CHARS);
        assert!(prompt.contains("TITLE: T"));
        assert!(prompt.contains("approximately 3600 words"));
        assert!(prompt.contains("- bullet"));
    }
}
