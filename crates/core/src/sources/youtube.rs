use std::process::Stdio;

use anyhow::{Context, bail};
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::Value;
use tokio::process::Command;
use tracing::{debug, info};

use crate::{
    config::{Config, FETCH_TIMEOUT},
    sources::{Capability, Outcome, TranscriptSource, VideoSearch},
    types::VideoHit,
};

/// Upper bound the search API accepts for `maxResults`.
const MAX_SEARCH_RESULTS: u32 = 50;

/// Caption languages in order of preference.
pub const CAPTION_LANGUAGES: [&str; 3] = ["en", "ur", "hi"];

/// Most-viewed videos for a query via the YouTube Data API.
pub struct YouTubeSearch {
    client: reqwest::Client,
    api_key: Option<String>,
    endpoint: String,
}

impl YouTubeSearch {
    pub fn new(config: &Config, client: reqwest::Client) -> Self {
        Self {
            client,
            api_key: config.youtube_api_key.clone(),
            endpoint: config.endpoints.youtube_search.clone(),
        }
    }

    async fn try_search(
        &self,
        api_key: &str,
        query: &str,
        max_results: u32,
        published_after: Option<DateTime<Utc>>,
    ) -> anyhow::Result<Vec<VideoHit>> {
        let mut params = vec![
            ("part", "snippet".to_string()),
            ("q", query.to_string()),
            ("type", "video".to_string()),
            ("order", "viewCount".to_string()),
            ("maxResults", max_results.min(MAX_SEARCH_RESULTS).to_string()),
            ("key", api_key.to_string()),
        ];
        if let Some(ts) = published_after {
            params.push(("publishedAfter", format_published_after(ts)));
        }

        let body: Value = self
            .client
            .get(&self.endpoint)
            .query(&params)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(parse_search_items(&body))
    }
}

impl Capability for YouTubeSearch {
    fn name(&self) -> &'static str {
        "youtube_search"
    }

    fn is_available(&self) -> bool {
        self.api_key.is_some()
    }
}

#[async_trait]
impl VideoSearch for YouTubeSearch {
    async fn search_videos(
        &self,
        query: &str,
        max_results: u32,
        published_after: Option<DateTime<Utc>>,
    ) -> Outcome<Vec<VideoHit>> {
        let Some(api_key) = self.api_key.as_deref() else {
            return Outcome::Empty;
        };
        debug!(query, max_results, "searching videos");
        let result = self
            .try_search(api_key, query, max_results, published_after)
            .await;
        Outcome::from_result(self.name(), result)
    }
}

/// RFC 3339 timestamp in UTC with a `Z` suffix, as the search API expects.
pub fn format_published_after(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Video hits from a search response. Items without a video id are skipped.
pub fn parse_search_items(body: &Value) -> Vec<VideoHit> {
    let Some(items) = body["items"].as_array() else {
        return Vec::new();
    };

    items
        .iter()
        .filter_map(|item| {
            let id = item["id"]["videoId"].as_str().filter(|id| !id.is_empty())?;
            Some(VideoHit {
                id: id.to_string(),
                title: item["snippet"]["title"].as_str().unwrap_or("").to_string(),
                description: item["snippet"]["description"]
                    .as_str()
                    .unwrap_or("")
                    .to_string(),
            })
        })
        .collect()
}

/// Caption text via yt-dlp track discovery.
///
/// yt-dlp lists the caption tracks of a video; the preferred track is then
/// downloaded in `json3` form and flattened to plain text.
pub struct YtDlpTranscripts {
    client: reqwest::Client,
    program: String,
    watch_url: String,
    available: bool,
}

impl YtDlpTranscripts {
    /// Check once whether yt-dlp runs at all.
    pub async fn probe(config: &Config, client: reqwest::Client) -> Self {
        let available = Command::new(&config.yt_dlp)
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map(|status| status.success())
            .unwrap_or(false);

        if !available {
            info!(program = %config.yt_dlp, "yt-dlp not found, transcripts disabled");
        }

        Self::with_availability(config, client, available)
    }

    /// Transcripts switched off without running yt-dlp.
    pub fn disabled(config: &Config, client: reqwest::Client) -> Self {
        Self::with_availability(config, client, false)
    }

    fn with_availability(config: &Config, client: reqwest::Client, available: bool) -> Self {
        Self {
            client,
            program: config.yt_dlp.clone(),
            watch_url: config.endpoints.youtube_watch.clone(),
            available,
        }
    }

    async fn try_fetch(&self, video_id: &str) -> anyhow::Result<String> {
        let url = format!("{}?v={}", self.watch_url, video_id);
        let output = tokio::time::timeout(
            FETCH_TIMEOUT,
            Command::new(&self.program)
                .arg("-J")
                .arg("--skip-download")
                .arg("--no-warnings")
                .arg(&url)
                .kill_on_drop(true)
                .output(),
        )
        .await
        .context("yt-dlp timed out")??;

        if !output.status.success() {
            bail!(
                "yt-dlp exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }

        let info: Value = serde_json::from_slice(&output.stdout)?;
        let Some(track_url) = pick_caption_track(&info) else {
            debug!(video_id, "no caption track in preferred languages");
            return Ok(String::new());
        };

        let captions: Value = self
            .client
            .get(track_url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(join_caption_segments(&captions))
    }
}

impl Capability for YtDlpTranscripts {
    fn name(&self) -> &'static str {
        "transcripts"
    }

    fn is_available(&self) -> bool {
        self.available
    }
}

#[async_trait]
impl TranscriptSource for YtDlpTranscripts {
    async fn fetch_transcript(&self, video_id: &str) -> Outcome<String> {
        if !self.available {
            return Outcome::Empty;
        }
        match self.try_fetch(video_id).await {
            Ok(text) if text.is_empty() => Outcome::Empty,
            result => Outcome::from_result(self.name(), result),
        }
    }
}

/// URL of the first `json3` caption track, by language priority.
///
/// Uploaded subtitles win over automatic captions within one language.
pub fn pick_caption_track(info: &Value) -> Option<&str> {
    CAPTION_LANGUAGES.iter().find_map(|lang| {
        ["subtitles", "automatic_captions"].iter().find_map(|kind| {
            info[*kind][*lang]
                .as_array()?
                .iter()
                .find(|track| track["ext"] == "json3")
                .and_then(|track| track["url"].as_str())
        })
    })
}

/// Flatten a `json3` caption document into single-spaced text.
pub fn join_caption_segments(captions: &Value) -> String {
    let Some(events) = captions["events"].as_array() else {
        return String::new();
    };

    events
        .iter()
        .filter_map(|event| {
            let line: String = event["segs"]
                .as_array()?
                .iter()
                .filter_map(|seg| seg["utf8"].as_str())
                .collect();
            let line = line.split_whitespace().collect::<Vec<_>>().join(" ");
            (!line.is_empty()).then_some(line)
        })
        .collect::<Vec<_>>()
        .join(" ")
}
