#![allow(dead_code)]

use std::{
    collections::VecDeque,
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use scriptwright_core::{
    ArticleHit, GenerationParams, GenerativeModel, Outcome, Result, ScriptwrightError,
    SourceRegistry, VideoHit,
    sources::{
        ArticleExtractor, Capability, Encyclopedia, TranscriptSource, VideoSearch, WebSearch,
    },
};

/// In-memory fetchers. Every result is tagged with its query so snippet
/// order can be asserted.
#[derive(Default)]
pub struct FakeSources {
    pub videos_per_query: usize,
    pub articles_per_query: usize,
    pub with_article_bodies: bool,
    pub with_transcripts: bool,
    pub transcripts_available: bool,
    pub with_encyclopedia: bool,
    pub calls: AtomicUsize,
    pub published_after: Mutex<Vec<Option<DateTime<Utc>>>>,
}

impl FakeSources {
    /// One hit of every kind per query.
    pub fn one_each() -> Self {
        Self {
            videos_per_query: 1,
            articles_per_query: 1,
            with_article_bodies: true,
            with_transcripts: true,
            transcripts_available: true,
            with_encyclopedia: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn hit(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

/// Registry whose every fetcher is the shared fake.
pub fn registry(fake: &Arc<FakeSources>) -> SourceRegistry {
    SourceRegistry {
        videos: fake.clone(),
        transcripts: fake.clone(),
        web: fake.clone(),
        articles: fake.clone(),
        encyclopedia: fake.clone(),
    }
}

impl Capability for FakeSources {
    fn name(&self) -> &'static str {
        "fake"
    }

    fn is_available(&self) -> bool {
        self.transcripts_available
    }
}

#[async_trait]
impl VideoSearch for FakeSources {
    async fn search_videos(
        &self,
        query: &str,
        max_results: u32,
        published_after: Option<DateTime<Utc>>,
    ) -> Outcome<Vec<VideoHit>> {
        self.hit();
        self.published_after.lock().unwrap().push(published_after);
        let count = self.videos_per_query.min(max_results as usize);
        if count == 0 {
            return Outcome::Empty;
        }
        Outcome::Found(
            (0..count)
                .map(|i| VideoHit {
                    id: format!("{query}-{i}"),
                    title: format!("video {query} {i}"),
                    description: "about\nthe topic".to_string(),
                })
                .collect(),
        )
    }
}

#[async_trait]
impl TranscriptSource for FakeSources {
    async fn fetch_transcript(&self, video_id: &str) -> Outcome<String> {
        self.hit();
        if self.with_transcripts {
            Outcome::Found(format!("transcript {video_id}"))
        } else {
            Outcome::Empty
        }
    }
}

#[async_trait]
impl WebSearch for FakeSources {
    async fn search(&self, query: &str, max_results: u32) -> Outcome<Vec<ArticleHit>> {
        self.hit();
        let count = self.articles_per_query.min(max_results as usize);
        if count == 0 {
            return Outcome::Empty;
        }
        Outcome::Found(
            (0..count)
                .map(|i| ArticleHit {
                    title: format!("article {query} {i}"),
                    link: format!("https://example.com/{query}/{i}"),
                    snippet: "snippet".to_string(),
                })
                .collect(),
        )
    }
}

#[async_trait]
impl ArticleExtractor for FakeSources {
    async fn extract(&self, url: &str) -> Outcome<String> {
        self.hit();
        if self.with_article_bodies {
            Outcome::Found(format!("body of {url}"))
        } else {
            Outcome::Empty
        }
    }
}

#[async_trait]
impl Encyclopedia for FakeSources {
    async fn summary(&self, title: &str) -> Outcome<String> {
        self.hit();
        if self.with_encyclopedia {
            Outcome::Found(format!("summary of {title}"))
        } else {
            Outcome::Empty
        }
    }
}

/// Scripted model: replies are handed out in order, prompts are recorded.
pub struct FakeModel {
    replies: Mutex<VecDeque<Result<String>>>,
    pub prompts: Mutex<Vec<(String, GenerationParams)>>,
}

impl FakeModel {
    pub fn new(replies: Vec<Result<String>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn answering(analysis: &str, script: &str) -> Self {
        Self::new(vec![Ok(analysis.to_string()), Ok(script.to_string())])
    }

    pub fn prompt_count(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

#[async_trait]
impl GenerativeModel for FakeModel {
    fn name(&self) -> &str {
        "fake-model"
    }

    async fn generate(&self, prompt: &str, params: GenerationParams) -> Result<String> {
        self.prompts
            .lock()
            .unwrap()
            .push((prompt.to_string(), params));
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| {
                Err(ScriptwrightError::UnexpectedResponse {
                    dump: "no scripted reply".to_string(),
                })
            })
    }
}
