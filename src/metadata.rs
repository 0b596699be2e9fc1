use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument};

/// Upper bound on the whole metadata request, connect to last byte.
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Default, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct PageMetadata {
    pub title: String,
    pub description: String,
}

static TITLE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<title[^>]*>(.*?)</title>").unwrap());

static META_DESCRIPTION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)<meta[^>]*\bname\s*=\s*("description"|'description')[^>]*>"#).unwrap()
});

static CONTENT_ATTR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)\bcontent\s*=\s*(?:"([^"]*)"|'([^']*)')"#).unwrap());

/// Best-effort title/description scrape for a URL. Empty input short-circuits
/// without a network call; every failure (bad URL, DNS, timeout, non-text
/// body) degrades to empty fields. This function never returns an error.
#[instrument]
pub async fn fetch_page_metadata(url: &str) -> PageMetadata {
    if url.trim().is_empty() {
        return PageMetadata::default();
    }

    match try_fetch(url).await {
        Ok(metadata) => metadata,
        Err(err) => {
            debug!(error = %err, "Metadata fetch failed, returning empty metadata");
            PageMetadata::default()
        }
    }
}

async fn try_fetch(url: &str) -> Result<PageMetadata, reqwest::Error> {
    let client = reqwest::Client::builder()
        .timeout(FETCH_TIMEOUT)
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .build()?;

    let body = client
        .get(url)
        .header(
            reqwest::header::ACCEPT,
            "text/html,application/xhtml+xml;q=0.9,*/*;q=0.2",
        )
        .send()
        .await?
        .text()
        .await?;

    Ok(PageMetadata {
        title: extract_title(&body),
        description: extract_description(&body),
    })
}

/// First `<title>` element, case-insensitive, inner text trimmed.
pub fn extract_title(html: &str) -> String {
    TITLE_RE
        .captures(html)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_default()
}

/// `content` attribute of the first `<meta name="description" ...>` tag.
/// Attribute order within the tag does not matter; both quoting styles are
/// accepted.
pub fn extract_description(html: &str) -> String {
    META_DESCRIPTION_RE
        .find(html)
        .and_then(|tag| CONTENT_ATTR_RE.captures(tag.as_str()))
        .and_then(|caps| caps.get(1).or_else(|| caps.get(2)))
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_default()
}
