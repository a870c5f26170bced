use anyhow::bail;
use async_trait::async_trait;
use scraper::{ElementRef, Html, Node, Selector};
use tracing::debug;

use crate::{
    sanitize::clean,
    sources::{ArticleExtractor, Capability, Outcome},
    types::SnippetSource,
};

const CONTENT_SELECTORS: [&str; 4] = ["article", "main", "[role=\"main\"]", "body"];

const SKIP_TAGS: &[&str] = &[
    "script", "style", "nav", "header", "footer", "noscript", "svg", "aside", "form", "iframe",
];

const BLOCK_TAGS: &[&str] = &[
    "p", "div", "br", "h1", "h2", "h3", "h4", "h5", "h6", "li", "tr", "td", "th", "article",
    "section", "main", "blockquote", "pre", "figcaption", "dt", "dd",
];

/// Minimum text a focused region must hold before it is preferred over `<body>`.
const MIN_REGION_CHARS: usize = 100;

/// Article body text from an arbitrary page.
///
/// The structured path parses the HTML and keeps only the readable region.
/// If that fails for any reason, the page is fetched again and its raw body
/// is used as-is.
pub struct HtmlArticleExtractor {
    client: reqwest::Client,
}

impl HtmlArticleExtractor {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    async fn structured(&self, url: &str) -> anyhow::Result<String> {
        let html = self.get_text(url).await?;
        let text = parse_article(&html);
        if text.is_empty() {
            bail!("no article text found");
        }
        debug!(url, chars = text.len(), "extracted article");
        Ok(text)
    }

    async fn raw(&self, url: &str) -> anyhow::Result<String> {
        self.get_text(url).await
    }

    async fn get_text(&self, url: &str) -> anyhow::Result<String> {
        Ok(self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?)
    }
}

impl Capability for HtmlArticleExtractor {
    fn name(&self) -> &'static str {
        "article_extractor"
    }
}

#[async_trait]
impl ArticleExtractor for HtmlArticleExtractor {
    async fn extract(&self, url: &str) -> Outcome<String> {
        let max_chars = SnippetSource::ArticleBody.max_chars();

        let text = match self.structured(url).await {
            Ok(text) => text,
            Err(e) => {
                debug!(url, error = %e, "structured extraction failed, using raw body");
                match self.raw(url).await {
                    Ok(body) => body,
                    Err(e) => return Outcome::suppressed(self.name(), e),
                }
            }
        };

        let text = clean(&text, max_chars);
        if text.is_empty() {
            Outcome::Empty
        } else {
            Outcome::Found(text)
        }
    }
}

/// Readable body text of an HTML page.
pub fn parse_article(html: &str) -> String {
    let doc = Html::parse_document(html);

    let mut text = String::new();
    for css in CONTENT_SELECTORS {
        let Ok(sel) = Selector::parse(css) else {
            continue;
        };
        if let Some(el) = doc.select(&sel).next() {
            text = element_text(&el);
            if text.chars().count() >= MIN_REGION_CHARS {
                break;
            }
        }
    }

    text
}

fn element_text(el: &ElementRef<'_>) -> String {
    let mut buf = String::new();
    collect_text(el, &mut buf);
    collapse_whitespace(&buf)
}

fn collect_text(node: &ElementRef<'_>, buf: &mut String) {
    for child in node.children() {
        match child.value() {
            Node::Text(text) => buf.push_str(text),
            Node::Element(el) => {
                let tag = el.name();
                if SKIP_TAGS.contains(&tag) {
                    continue;
                }
                if BLOCK_TAGS.contains(&tag) {
                    buf.push('\n');
                }
                if let Some(child_ref) = ElementRef::wrap(child) {
                    collect_text(&child_ref, buf);
                }
            }
            _ => {}
        }
    }
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
