//! Source fetchers.
//!
//! Each fetcher wraps one kind of outbound lookup and never fails past its own
//! boundary: transport errors, bad statuses and malformed payloads are logged
//! and turned into [`Outcome::Empty`]. Fetchers also report whether their
//! backing capability is usable, and [`SourceRegistry`] collects them so the
//! research pass can ask before calling.

use std::{fmt::Display, sync::Arc};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::{
    config::{Config, FETCH_TIMEOUT},
    types::{ArticleHit, VideoHit},
};

pub mod article;
pub mod web_search;
pub mod wikipedia;
pub mod youtube;

pub use article::HtmlArticleExtractor;
pub use web_search::WebSearchChain;
pub use wikipedia::WikipediaSummary;
pub use youtube::{YouTubeSearch, YtDlpTranscripts};

const USER_AGENT: &str = concat!("scriptwright/", env!("CARGO_PKG_VERSION"));

/// Result of a fetch that is not allowed to fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T> {
    Found(T),
    Empty,
}

impl<T> Outcome<T> {
    /// Log the suppressed cause and yield [`Outcome::Empty`].
    pub fn suppressed(source: &'static str, cause: impl Display) -> Self {
        tracing::warn!(source, error = %cause, "fetch failed, continuing without it");
        Outcome::Empty
    }

    /// Settle a fallible fetch, logging the cause on failure.
    pub fn from_result(source: &'static str, result: anyhow::Result<T>) -> Self {
        match result {
            Ok(value) => Outcome::Found(value),
            Err(e) => Outcome::suppressed(source, e),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Outcome::Empty)
    }
}

impl<T: Default> Outcome<T> {
    pub fn into_value(self) -> T {
        match self {
            Outcome::Found(value) => value,
            Outcome::Empty => T::default(),
        }
    }
}

/// Common surface of every fetcher.
pub trait Capability: Send + Sync {
    fn name(&self) -> &'static str;

    fn is_available(&self) -> bool {
        true
    }
}

#[async_trait]
pub trait VideoSearch: Capability {
    async fn search_videos(
        &self,
        query: &str,
        max_results: u32,
        published_after: Option<DateTime<Utc>>,
    ) -> Outcome<Vec<VideoHit>>;
}

#[async_trait]
pub trait TranscriptSource: Capability {
    async fn fetch_transcript(&self, video_id: &str) -> Outcome<String>;
}

#[async_trait]
pub trait WebSearch: Capability {
    async fn search(&self, query: &str, max_results: u32) -> Outcome<Vec<ArticleHit>>;
}

#[async_trait]
pub trait ArticleExtractor: Capability {
    async fn extract(&self, url: &str) -> Outcome<String>;
}

#[async_trait]
pub trait Encyclopedia: Capability {
    async fn summary(&self, title: &str) -> Outcome<String>;
}

/// The set of fetchers a run draws on, queried for capabilities by name.
#[derive(Clone)]
pub struct SourceRegistry {
    pub videos: Arc<dyn VideoSearch>,
    pub transcripts: Arc<dyn TranscriptSource>,
    pub web: Arc<dyn WebSearch>,
    pub articles: Arc<dyn ArticleExtractor>,
    pub encyclopedia: Arc<dyn Encyclopedia>,
}

impl SourceRegistry {
    /// Build the production fetchers. The caption tool is probed once, and
    /// only when `with_transcripts` is set.
    pub async fn from_config(config: &Config, with_transcripts: bool) -> anyhow::Result<Self> {
        let client = http_client()?;
        let transcripts = if with_transcripts {
            YtDlpTranscripts::probe(config, client.clone()).await
        } else {
            YtDlpTranscripts::disabled(config, client.clone())
        };

        Ok(Self {
            videos: Arc::new(YouTubeSearch::new(config, client.clone())),
            transcripts: Arc::new(transcripts),
            web: Arc::new(WebSearchChain::new(config, client.clone())),
            articles: Arc::new(HtmlArticleExtractor::new(client.clone())),
            encyclopedia: Arc::new(WikipediaSummary::new(config, client)),
        })
    }

    pub fn transcripts_available(&self) -> bool {
        self.transcripts.is_available()
    }

    /// Name and availability of every registered fetcher.
    pub fn capabilities(&self) -> Vec<(&'static str, bool)> {
        vec![
            (self.videos.name(), self.videos.is_available()),
            (self.transcripts.name(), self.transcripts.is_available()),
            (self.web.name(), self.web.is_available()),
            (self.articles.name(), self.articles.is_available()),
            (self.encyclopedia.name(), self.encyclopedia.is_available()),
        ]
    }
}

pub(crate) fn http_client() -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(FETCH_TIMEOUT)
        .user_agent(USER_AGENT)
        .build()
}
