//! Fetches a linked page and pulls out its title and visible body text.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use scraper::{ElementRef, Html, Selector};
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

use super::charset::decode_html;
use crate::core::models::ResolvedArticle;
use crate::core::ports::ArticleSource;
use crate::errors::AppError;

pub const TITLE_NOT_FOUND: &str = "Title not found";

const FETCH_TIMEOUT: Duration = Duration::from_secs(10);
const BODY_RENDER_WIDTH: usize = 400;

static TITLE_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("title").expect("static selector parse"));
static BODY_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("body").expect("static selector parse"));
// Title text is raw text, so markup typed into it survives parsing.
static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").expect("static regex compile"));
static WHITESPACE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("static regex compile"));

pub struct ArticleResolver {
    http: Client,
}

impl ArticleResolver {
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new() -> Result<Self, AppError> {
        let http = Client::builder()
            .timeout(FETCH_TIMEOUT)
            .build()
            .map_err(|e| AppError::HttpError(format!("Failed to build fetch client: {e}")))?;
        Ok(Self { http })
    }

    #[must_use]
    pub fn with_client(http: Client) -> Self {
        Self { http }
    }
}

#[async_trait]
impl ArticleSource for ArticleResolver {
    async fn resolve(&self, url: &str) -> Result<ResolvedArticle, AppError> {
        let parsed = Url::parse(url).map_err(|e| AppError::FetchError(format!("{url}: {e}")))?;
        debug!(host = parsed.host_str().unwrap_or(""), "Fetching article");

        let response = self
            .http
            .get(parsed)
            .send()
            .await
            .map_err(|e| AppError::FetchError(format!("GET {url}: {e}")))?;

        let canonical_url = response.url().to_string();
        let status = response.status();
        if !status.is_success() {
            return Err(AppError::FetchError(format!(
                "GET {canonical_url} returned HTTP {status}"
            )));
        }
        if canonical_url != url {
            info!(from = %url, to = %canonical_url, "Followed redirect");
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);
        let bytes = response
            .bytes()
            .await
            .map_err(|e| AppError::FetchError(format!("reading {canonical_url}: {e}")))?;
        let (html, encoding) = decode_html(&bytes, content_type.as_deref());
        debug!(encoding = encoding.name(), bytes = bytes.len(), "Decoded article");

        let (title, body_text) = parse_article(&html);
        debug!(title = %title, body_chars = body_text.chars().count(), "Extracted article");

        Ok(ResolvedArticle {
            canonical_url,
            title,
            body_text,
        })
    }
}

/// Title and body text of an HTML document. Never fails: a missing title
/// becomes [`TITLE_NOT_FOUND`] and a missing body an empty string.
#[must_use]
pub fn parse_article(html: &str) -> (String, String) {
    let document = Html::parse_document(html);
    (title_of(&document), body_text_of(&document))
}

#[must_use]
pub fn extract_title(html: &str) -> String {
    title_of(&Html::parse_document(html))
}

#[must_use]
pub fn extract_body_text(html: &str) -> String {
    body_text_of(&Html::parse_document(html))
}

fn title_of(document: &Html) -> String {
    let Some(element) = document.select(&TITLE_SELECTOR).next() else {
        return TITLE_NOT_FOUND.to_string();
    };
    let raw: String = element.text().collect();
    let stripped = TAG_RE.replace_all(&raw, " ");
    let title = WHITESPACE_RE.replace_all(&stripped, " ").trim().to_string();
    if title.is_empty() {
        TITLE_NOT_FOUND.to_string()
    } else {
        title
    }
}

fn body_text_of(document: &Html) -> String {
    let Some(body) = document.select(&BODY_SELECTOR).next() else {
        return String::new();
    };

    let markup = body.html();
    match html2text::config::plain().string_from_read(markup.as_bytes(), BODY_RENDER_WIDTH) {
        Ok(text) => text.trim().to_string(),
        Err(e) => {
            warn!("html2text failed, falling back to DOM text: {}", e);
            visible_text(body)
        }
    }
}

/// Text nodes under `root`, skipping script and style contents.
fn visible_text(root: ElementRef<'_>) -> String {
    let pieces: Vec<&str> = root
        .descendants()
        .filter(|node| {
            !node
                .parent()
                .and_then(|parent| parent.value().as_element())
                .is_some_and(|el| matches!(el.name(), "script" | "style" | "noscript"))
        })
        .filter_map(|node| node.value().as_text())
        .map(|text| text.trim())
        .filter(|text| !text.is_empty())
        .collect();
    pieces.join(" ")
}
