use crate::types::{RunResult, SnippetSource};

const SOURCE_ORDER: [(SnippetSource, &str); 6] = [
    (SnippetSource::Video, "videos"),
    (SnippetSource::Transcript, "transcripts"),
    (SnippetSource::SearchResult, "search results"),
    (SnippetSource::ArticleBody, "articles"),
    (SnippetSource::Encyclopedia, "encyclopedia"),
    (SnippetSource::Fallback, "fallback"),
];

/// Snippet counts per source, e.g. `4 videos, 2 transcripts, 5 articles`.
pub fn format_source_breakdown(result: &RunResult) -> String {
    SOURCE_ORDER
        .iter()
        .filter_map(|(source, label)| {
            let count = result.snippets.iter().filter(|s| s.source == *source).count();
            (count > 0).then(|| format!("{count} {label}"))
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Format a run result as human-readable markdown
pub fn format_result_readable(result: &RunResult) -> String {
    let mut output = String::new();
    output.push_str(&format!("# {}\n\n", result.title));

    output.push_str(&format!(
        "**Words:** {} | **Keywords:** {} | **Sources:** {}\n\n",
        result.word_count,
        result.keywords.join(", "),
        format_source_breakdown(result)
    ));

    if result.analysis_fallback {
        output.push_str("_Analysis step failed; the script was drafted without it._\n\n");
    }

    output.push_str("## Script\n\n");
    output.push_str(&result.script);
    output.push('\n');

    output
}
