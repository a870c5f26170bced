use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const WORDS_PER_MINUTE: u32 = 120;
pub const MIN_TARGET_WORDS: u32 = 800;
pub const MAX_TARGET_WORDS: u32 = 7000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoHit {
    pub id: String,
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleHit {
    pub title: String,
    pub link: String,
    pub snippet: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SnippetSource {
    Video,
    Transcript,
    SearchResult,
    ArticleBody,
    Encyclopedia,
    Fallback,
}

impl SnippetSource {
    /// Character cap applied to text from this source.
    pub fn max_chars(self) -> usize {
        match self {
            SnippetSource::Video => 1200,
            SnippetSource::Transcript => 3000,
            SnippetSource::SearchResult => 2000,
            SnippetSource::ArticleBody => 4000,
            SnippetSource::Encyclopedia => 2500,
            SnippetSource::Fallback => usize::MAX,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snippet {
    pub source: SnippetSource,
    pub text: String,
}

/// Everything one research-and-generate run needs from the user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunRequest {
    pub title: String,
    /// Free text, one keyword per line.
    pub keywords_text: String,
    pub target_words: u32,
    pub lookback_days: u32,
    pub max_videos: u32,
    pub max_articles: u32,
    pub fetch_transcripts: bool,
}

impl RunRequest {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Approximate narration length for a video of `minutes` minutes.
    pub fn words_for_minutes(minutes: u32) -> u32 {
        minutes
            .saturating_mul(WORDS_PER_MINUTE)
            .clamp(MIN_TARGET_WORDS, MAX_TARGET_WORDS)
    }
}

impl Default for RunRequest {
    fn default() -> Self {
        Self {
            title: String::new(),
            keywords_text: String::new(),
            target_words: Self::words_for_minutes(30),
            lookback_days: 90,
            max_videos: 4,
            max_articles: 5,
            fetch_transcripts: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunResult {
    pub title: String,
    pub keywords: Vec<String>,
    pub published_after: DateTime<Utc>,
    pub snippets: Vec<Snippet>,
    pub analysis: String,
    /// True when the analysis call failed and the fixed fallback text was used.
    pub analysis_fallback: bool,
    pub script: String,
    pub word_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_words_for_minutes() {
        assert_eq!(RunRequest::words_for_minutes(30), 3600);
        assert_eq!(RunRequest::words_for_minutes(1), MIN_TARGET_WORDS);
        assert_eq!(RunRequest::words_for_minutes(60), MAX_TARGET_WORDS);
    }

    #[test]
    fn test_request_defaults() {
        let req = RunRequest::new("Volcanoes");
        assert_eq!(req.title, "Volcanoes");
        assert_eq!(req.lookback_days, 90);
        assert_eq!(req.max_videos, 4);
        assert_eq!(req.max_articles, 5);
        assert!(req.fetch_transcripts);
    }
}
