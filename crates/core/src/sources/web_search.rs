use async_trait::async_trait;
use percent_encoding::percent_decode_str;
use scraper::{Html, Selector};
use serde_json::Value;
use tracing::debug;

use crate::{
    config::Config,
    sources::{Capability, Outcome, WebSearch},
    types::ArticleHit,
};

/// Upper bound the Custom Search API accepts for `num`.
const MAX_CUSTOM_SEARCH_RESULTS: u32 = 10;

/// Web search that prefers Google Custom Search and falls back to
/// DuckDuckGo's keyless HTML endpoint.
pub struct WebSearchChain {
    client: reqwest::Client,
    credentials: Option<(String, String)>,
    custom_search_url: String,
    duckduckgo_url: String,
}

impl WebSearchChain {
    pub fn new(config: &Config, client: reqwest::Client) -> Self {
        Self {
            client,
            credentials: config
                .custom_search_credentials()
                .map(|(key, cx)| (key.to_string(), cx.to_string())),
            custom_search_url: config.endpoints.custom_search.clone(),
            duckduckgo_url: config.endpoints.duckduckgo_html.clone(),
        }
    }

    async fn custom_search(
        &self,
        key: &str,
        cx: &str,
        query: &str,
        max_results: u32,
    ) -> anyhow::Result<Vec<ArticleHit>> {
        let num = max_results.min(MAX_CUSTOM_SEARCH_RESULTS).to_string();
        let body: Value = self
            .client
            .get(&self.custom_search_url)
            .query(&[("key", key), ("cx", cx), ("q", query), ("num", num.as_str())])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(parse_custom_search_items(&body))
    }

    async fn duckduckgo(&self, query: &str, max_results: u32) -> anyhow::Result<Vec<ArticleHit>> {
        let body = self
            .client
            .post(&self.duckduckgo_url)
            .form(&[("q", query)])
            .header("Accept", "text/html")
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        Ok(parse_duckduckgo_html(&body, max_results as usize))
    }
}

impl Capability for WebSearchChain {
    fn name(&self) -> &'static str {
        "web_search"
    }
}

#[async_trait]
impl WebSearch for WebSearchChain {
    async fn search(&self, query: &str, max_results: u32) -> Outcome<Vec<ArticleHit>> {
        if let Some((key, cx)) = &self.credentials {
            debug!(query, "searching with custom search");
            match self.custom_search(key, cx, query, max_results).await {
                Ok(hits) => return Outcome::Found(hits),
                Err(e) => {
                    tracing::warn!(error = %e, "custom search failed, falling back to duckduckgo");
                }
            }
        }

        debug!(query, "searching with duckduckgo");
        let result = self.duckduckgo(query, max_results).await;
        Outcome::from_result(self.name(), result)
    }
}

pub fn parse_custom_search_items(body: &Value) -> Vec<ArticleHit> {
    let Some(items) = body["items"].as_array() else {
        return Vec::new();
    };

    items
        .iter()
        .map(|item| ArticleHit {
            title: item["title"].as_str().unwrap_or("").to_string(),
            link: item["link"].as_str().unwrap_or("").to_string(),
            snippet: item["snippet"].as_str().unwrap_or("").to_string(),
        })
        .collect()
}

/// Hits from a DuckDuckGo HTML results page. Results without a link are skipped.
pub fn parse_duckduckgo_html(html: &str, max_results: usize) -> Vec<ArticleHit> {
    let (Some(result_sel), Some(link_sel), Some(snippet_sel)) = (
        selector(".result"),
        selector("a.result__a"),
        selector("a.result__snippet, .result__snippet"),
    ) else {
        return Vec::new();
    };

    let doc = Html::parse_document(html);
    doc.select(&result_sel)
        .filter_map(|result| {
            let link_el = result.select(&link_sel).next()?;
            let link = extract_ddg_url(link_el.value().attr("href").unwrap_or(""));
            if link.is_empty() {
                return None;
            }
            let title = link_el.text().collect::<String>().trim().to_string();
            let snippet = result
                .select(&snippet_sel)
                .next()
                .map(|el| el.text().collect::<String>().trim().to_string())
                .unwrap_or_default();
            Some(ArticleHit {
                title,
                link,
                snippet,
            })
        })
        .take(max_results)
        .collect()
}

fn selector(css: &str) -> Option<Selector> {
    Selector::parse(css).ok()
}

/// DuckDuckGo wraps result URLs in redirect links like
/// `//duckduckgo.com/l/?uddg=https%3A%2F%2Fexample.com&rut=...`.
fn extract_ddg_url(href: &str) -> String {
    if let Some(pos) = href.find("uddg=") {
        let start = pos + 5;
        let end = href[start..]
            .find('&')
            .map(|i| start + i)
            .unwrap_or(href.len());
        let encoded = &href[start..end];
        if !encoded.is_empty() {
            return percent_decode_str(encoded).decode_utf8_lossy().into_owned();
        }
    }
    href.to_string()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    const DDG_PAGE: &str = r#"
        <html><body>
          <div class="result">
            <h2><a class="result__a" href="//duckduckgo.com/l/?uddg=https%3A%2F%2Fexample.com%2Fetna&rut=abc">Mount Etna</a></h2>
            <a class="result__snippet">Etna is the most active volcano in Europe.</a>
          </div>
          <div class="result">
            <h2><a class="result__a">No link here</a></h2>
          </div>
          <div class="result">
            <h2><a class="result__a" href="https://volcano.si.edu/">GVP</a></h2>
            <div class="result__snippet">Global Volcanism Program</div>
          </div>
        </body></html>
    "#;

    #[test]
    fn test_parse_duckduckgo_html() {
        let hits = parse_duckduckgo_html(DDG_PAGE, 5);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].title, "Mount Etna");
        assert_eq!(hits[0].link, "https://example.com/etna");
        assert_eq!(hits[0].snippet, "Etna is the most active volcano in Europe.");
        assert_eq!(hits[1].link, "https://volcano.si.edu/");
        assert_eq!(hits[1].snippet, "Global Volcanism Program");
    }

    #[test]
    fn test_parse_duckduckgo_html_respects_cap() {
        assert_eq!(parse_duckduckgo_html(DDG_PAGE, 1).len(), 1);
    }

    #[test]
    fn test_parse_custom_search_items() {
        let body = json!({
            "items": [
                {"title": "Krakatoa", "link": "https://k.example", "snippet": "1883"},
                {"title": "Untitled"}
            ]
        });
        let hits = parse_custom_search_items(&body);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].link, "https://k.example");
        assert_eq!(hits[1].link, "");
        assert!(parse_custom_search_items(&json!({})).is_empty());
    }

    #[test]
    fn test_extract_ddg_url_passthrough() {
        assert_eq!(extract_ddg_url("https://plain.example"), "https://plain.example");
    }
}
