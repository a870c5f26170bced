use async_trait::async_trait;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use serde_json::Value;
use tracing::debug;

use crate::{
    config::Config,
    sources::{Capability, Encyclopedia, Outcome},
};

/// Characters left as-is in a page title path segment.
const TITLE_ESCAPE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~')
    .remove(b'/');

/// Page summaries from the Wikipedia REST API.
pub struct WikipediaSummary {
    client: reqwest::Client,
    endpoint: String,
}

impl WikipediaSummary {
    pub fn new(config: &Config, client: reqwest::Client) -> Self {
        Self {
            client,
            endpoint: config.endpoints.wikipedia_summary.clone(),
        }
    }

    async fn try_summary(&self, title: &str) -> anyhow::Result<String> {
        let url = summary_url(&self.endpoint, title);
        debug!(%url, "fetching encyclopedia summary");
        let body: Value = self
            .client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(body["extract"].as_str().unwrap_or("").to_string())
    }
}

impl Capability for WikipediaSummary {
    fn name(&self) -> &'static str {
        "encyclopedia"
    }
}

#[async_trait]
impl Encyclopedia for WikipediaSummary {
    async fn summary(&self, title: &str) -> Outcome<String> {
        match self.try_summary(title).await {
            Ok(extract) if extract.is_empty() => Outcome::Empty,
            result => Outcome::from_result(self.name(), result),
        }
    }
}

pub fn summary_url(endpoint: &str, title: &str) -> String {
    format!(
        "{}/{}",
        endpoint.trim_end_matches('/'),
        utf8_percent_encode(title, TITLE_ESCAPE)
    )
}
