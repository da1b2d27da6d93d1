use crate::config::FetchConfig;
use crate::error::{AskError, AskResult};
use crate::utils::collapse_whitespace;
use reqwest::Url;
use scraper::{Html, Selector};
use std::time::Duration;

/// Elements whose text never renders
const HIDDEN_ELEMENTS: &[&str] = &["script", "style", "noscript", "template", "head"];

/// Elements that break words apart when rendered
const BLOCK_ELEMENTS: &[&str] = &[
    "address", "article", "aside", "blockquote", "br", "dd", "div", "dl", "dt", "fieldset",
    "figcaption", "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr",
    "li", "main", "nav", "ol", "p", "pre", "section", "table", "td", "th", "tr", "ul",
];

/// Fetches web pages and reduces them to their visible body text
pub struct UrlFetcher {
    client: reqwest::Client,
}

impl UrlFetcher {
    pub fn new(config: &FetchConfig) -> AskResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| AskError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }

    /// Fetch a page and return the text of its `<body>`.
    ///
    /// An empty body is returned as `Ok("")`; only transport failures and
    /// non-2xx statuses are reported as [`AskError::FetchFailed`].
    pub async fn fetch_text(&self, url: &str) -> AskResult<String> {
        let parsed = parse_http_url(url)?;

        let response = self
            .client
            .get(parsed)
            .send()
            .await
            .map_err(|e| AskError::fetch(url, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AskError::fetch(url, format!("HTTP status {}", status)));
        }

        let body = response
            .text()
            .await
            .map_err(|e| AskError::fetch(url, format!("failed to read body: {}", e)))?;

        Ok(visible_body_text(&body))
    }
}

fn parse_http_url(url: &str) -> AskResult<Url> {
    let parsed = Url::parse(url.trim())
        .map_err(|e| AskError::input(format!("invalid URL '{}': {}", url, e)))?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        other => Err(AskError::input(format!(
            "unsupported URL scheme '{}': only http and https are fetched",
            other
        ))),
    }
}

/// Visible text of an HTML document's body, whitespace collapsed
pub fn visible_body_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let Ok(selector) = Selector::parse("body") else {
        return String::new();
    };
    let Some(body) = document.select(&selector).next() else {
        return String::new();
    };

    let mut text = String::new();
    for node in body.descendants() {
        if let Some(element) = node.value().as_element() {
            if BLOCK_ELEMENTS.contains(&element.name()) {
                text.push(' ');
            }
            continue;
        }
        let Some(fragment) = node.value().as_text() else {
            continue;
        };
        let hidden = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .is_some_and(|e| HIDDEN_ELEMENTS.contains(&e.name()))
        });
        if !hidden {
            text.push_str(fragment);
        }
    }

    collapse_whitespace(&text)
}
