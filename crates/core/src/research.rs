//! Research aggregation.
//!
//! Snippets are collected in a fixed order: every keyword's videos first,
//! then every keyword's articles, then one encyclopedia summary for the
//! title. Later truncation to a prompt budget depends on this order.

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::{
    pipeline::{NoopObserver, RunObserver, Stage},
    sanitize::clean,
    sources::SourceRegistry,
    types::{RunRequest, Snippet, SnippetSource},
};

/// Distinct non-empty trimmed lines of `keywords_text`, or just the title.
pub fn derive_keywords(title: &str, keywords_text: &str) -> Vec<String> {
    let mut keywords: Vec<String> = Vec::new();
    for line in keywords_text.lines().map(str::trim) {
        if !line.is_empty() && !keywords.iter().any(|k| k == line) {
            keywords.push(line.to_string());
        }
    }

    if keywords.is_empty() {
        let title = title.trim();
        if !title.is_empty() {
            keywords.push(title.to_string());
        }
    }
    keywords
}

pub fn fallback_snippet(title: &str) -> Snippet {
    let source = SnippetSource::Fallback;
    Snippet {
        source,
        text: clean(
            &format!("No public sources found. Use title as primary seed: {title}"),
            source.max_chars(),
        ),
    }
}

pub struct Researcher<'a> {
    sources: &'a SourceRegistry,
    observer: &'a dyn RunObserver,
    snippets: Vec<Snippet>,
}

impl<'a> Researcher<'a> {
    pub fn new(sources: &'a SourceRegistry) -> Self {
        Self {
            sources,
            observer: &NoopObserver,
            snippets: Vec::new(),
        }
    }

    pub fn with_observer(mut self, observer: &'a dyn RunObserver) -> Self {
        self.observer = observer;
        self
    }

    /// Run every fetch for `request` and return the ordered snippets.
    ///
    /// Never empty: when nothing was found a single fallback snippet seeds
    /// generation from the title.
    pub async fn collect(
        mut self,
        request: &RunRequest,
        keywords: &[String],
        published_after: DateTime<Utc>,
    ) -> Vec<Snippet> {
        let title = request.title.trim();
        let with_transcripts = request.fetch_transcripts && self.sources.transcripts_available();
        if request.fetch_transcripts && !with_transcripts {
            info!("transcripts requested but unavailable, skipping them");
        }

        for keyword in keywords {
            self.observer.on_stage(&Stage::Videos { keyword });
            self.collect_videos(keyword, request.max_videos, published_after, with_transcripts)
                .await;
        }

        for keyword in keywords {
            self.observer.on_stage(&Stage::Articles { keyword });
            self.collect_articles(keyword, request.max_articles).await;
        }

        self.observer.on_stage(&Stage::Encyclopedia);
        let summary = self.sources.encyclopedia.summary(title).await.into_value();
        self.push(SnippetSource::Encyclopedia, &summary);

        if self.snippets.is_empty() {
            info!(title, "no public sources found, seeding from title");
            self.snippets.push(fallback_snippet(title));
        }

        info!(count = self.snippets.len(), "research complete");
        self.snippets
    }

    async fn collect_videos(
        &mut self,
        keyword: &str,
        max_videos: u32,
        published_after: DateTime<Utc>,
        with_transcripts: bool,
    ) {
        let videos = self
            .sources
            .videos
            .search_videos(keyword, max_videos, Some(published_after))
            .await
            .into_value();
        debug!(keyword, count = videos.len(), "videos found");

        for video in videos {
            self.push(
                SnippetSource::Video,
                &format!("{} {}", video.title, video.description),
            );
            if with_transcripts && !video.id.is_empty() {
                let transcript = self
                    .sources
                    .transcripts
                    .fetch_transcript(&video.id)
                    .await
                    .into_value();
                self.push(SnippetSource::Transcript, &transcript);
            }
        }
    }

    async fn collect_articles(&mut self, keyword: &str, max_articles: u32) {
        let hits = self.sources.web.search(keyword, max_articles).await.into_value();
        debug!(keyword, count = hits.len(), "articles found");

        for hit in hits {
            self.push(
                SnippetSource::SearchResult,
                &format!("{} {}", hit.title, hit.snippet),
            );
            if !hit.link.is_empty() {
                let body = self.sources.articles.extract(&hit.link).await.into_value();
                self.push(SnippetSource::ArticleBody, &body);
            }
        }
    }

    /// Sanitize and keep `text` unless it comes out empty.
    fn push(&mut self, source: SnippetSource, text: &str) {
        let text = clean(text, source.max_chars());
        if !text.is_empty() {
            self.snippets.push(Snippet { source, text });
        }
    }
}
