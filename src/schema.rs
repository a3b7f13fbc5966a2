//! Data model shared by the Robust Links pipeline
//!
//! Items are owned by the item store; requests, responses and notices live
//! for a single invocation only.

use crate::error::ResponseError;
use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of an item in the item store
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub u64);

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Item type classification
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    /// Standard bibliographic reference (book, article, web page...)
    #[default]
    Reference,
    /// File or link attached to another item
    Attachment,
    /// Standalone or child note
    Note,
}

impl ItemKind {
    /// Attachments and notes are never archived
    pub fn is_archivable(self) -> bool {
        matches!(self, ItemKind::Reference)
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemKind::Reference => write!(f, "reference"),
            ItemKind::Attachment => write!(f, "attachment"),
            ItemKind::Note => write!(f, "note"),
        }
    }
}

/// A bibliographic item as seen through the item store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    #[serde(default)]
    pub kind: ItemKind,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: String,
    #[serde(default, rename = "DOI")]
    pub doi: String,
    /// Child attachment ids, in store order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<ItemId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<ItemId>,
    /// Note body (HTML)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl Item {
    /// A top-level reference item with no fields set
    pub fn reference(id: u64) -> Self {
        Self {
            id: ItemId(id),
            kind: ItemKind::Reference,
            title: String::new(),
            url: String::new(),
            doi: String::new(),
            attachments: Vec::new(),
            parent: None,
            note: None,
        }
    }
}

/// Which web archive the caller asked for
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ArchiveChoice {
    /// Let the service pick
    #[default]
    Any,
    /// Use the default-archive preference
    Default,
    /// A specific archive by name
    Named(String),
}

impl ArchiveChoice {
    /// Parse a command-line value: `default` selects the preference, anything
    /// else names an archive.
    pub fn from_arg(value: Option<&str>) -> Self {
        match value {
            None => ArchiveChoice::Any,
            Some("default") => ArchiveChoice::Default,
            Some(name) => ArchiveChoice::Named(name.to_string()),
        }
    }
}

/// One call to the Robust Links service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveRequest {
    pub target_url: String,
    /// `None` means any archive (service default)
    pub archive_hint: Option<String>,
    pub force_urir_mode: bool,
}

/// Parsed 200 payload from the Robust Links service
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArchiveResponse {
    pub original_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memento_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anchor_text: Option<String>,
    pub original_anchor: String,
    pub memento_anchor: String,
}

#[derive(Debug, Deserialize)]
struct Payload {
    #[serde(rename = "data-originalurl")]
    original_url: Option<String>,
    #[serde(rename = "data-versionurl")]
    version_url: Option<String>,
    #[serde(rename = "data-versiondate")]
    version_date: Option<String>,
    anchor_text: Option<String>,
    robust_links_html: Option<RobustLinksHtml>,
}

#[derive(Debug, Deserialize)]
struct RobustLinksHtml {
    original_url_as_href: Option<String>,
    memento_url_as_href: Option<String>,
}

impl ArchiveResponse {
    /// Parse a 200 body. Any of the three contract fields missing or empty is
    /// an error, never a partial success.
    pub fn from_json(body: &str) -> Result<Self, ResponseError> {
        let payload: Payload = serde_json::from_str(body)?;

        let original_url = non_empty(payload.original_url)
            .ok_or(ResponseError::MissingField("data-originalurl"))?;
        let html = payload
            .robust_links_html
            .ok_or(ResponseError::MissingField("robust_links_html"))?;
        let original_anchor = non_empty(html.original_url_as_href)
            .ok_or(ResponseError::MissingField("robust_links_html.original_url_as_href"))?;
        let memento_anchor = non_empty(html.memento_url_as_href)
            .ok_or(ResponseError::MissingField("robust_links_html.memento_url_as_href"))?;

        let memento_url =
            non_empty(payload.version_url).or_else(|| anchor_href(&memento_anchor));

        Ok(Self {
            original_url,
            memento_url,
            version_date: non_empty(payload.version_date),
            anchor_text: non_empty(payload.anchor_text),
            original_anchor,
            memento_anchor,
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

/// First `href` of an HTML anchor fragment
fn anchor_href(fragment: &str) -> Option<String> {
    let doc = Html::parse_fragment(fragment);
    let selector = Selector::parse("a[href]").ok()?;
    doc.select(&selector)
        .next()
        .and_then(|el| el.value().attr("href"))
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Severity of a user-facing notice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

impl NoticeLevel {
    pub fn title(self) -> &'static str {
        match self {
            NoticeLevel::Info => "Robust Links INFO",
            NoticeLevel::Warning => "Robust Links WARNING",
            NoticeLevel::Error => "Robust Links ERROR",
        }
    }
}

/// Transient notice shown to the user; never persisted
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub title: String,
    pub message: String,
    pub duration_ms: u64,
}

impl Notice {
    pub const SHORT_MS: u64 = 5_000;
    pub const LONG_MS: u64 = 15_000;

    pub fn new(level: NoticeLevel, message: impl Into<String>, duration_ms: u64) -> Self {
        Self {
            level,
            title: level.title().to_string(),
            message: message.into(),
            duration_ms,
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Info, message, Self::SHORT_MS)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Warning, message, Self::SHORT_MS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL_BODY: &str = r#"{
        "anchor_text": "ABC News for June 15, 2020",
        "api_version": "0.8.1",
        "data-originalurl": "https://abcnews.go.com",
        "data-versiondate": "2020-06-15",
        "data-versionurl": "https://archive.li/wip/hWZdd",
        "request_url": "https://abcnews.go.com",
        "request_url_resource_type": "original-resource",
        "robust_links_html": {
            "memento_url_as_href": "<a href=\"https://archive.li/wip/hWZdd\"\ndata-originalurl=\"https://abcnews.go.com\"\ndata-versiondate=\"2020-06-15\">ABC News for June 15, 2020</a>",
            "original_url_as_href": "<a href=\"https://abcnews.go.com\"\ndata-versionurl=\"https://archive.li/wip/hWZdd\"\ndata-versiondate=\"2020-06-15\">ABC News for June 15, 2020</a>"
        }
    }"#;

    #[test]
    fn test_parse_full_response() {
        let response = ArchiveResponse::from_json(FULL_BODY).unwrap();
        assert_eq!(response.original_url, "https://abcnews.go.com");
        assert_eq!(
            response.memento_url.as_deref(),
            Some("https://archive.li/wip/hWZdd")
        );
        assert_eq!(response.version_date.as_deref(), Some("2020-06-15"));
        assert!(response.original_anchor.starts_with("<a href=\"https://abcnews.go.com\""));
        assert!(response.memento_anchor.contains("archive.li"));
    }

    #[test]
    fn test_memento_url_from_anchor() {
        let body = r#"{
            "data-originalurl": "https://example.com",
            "robust_links_html": {
                "original_url_as_href": "<a href=\"https://example.com\">Example</a>",
                "memento_url_as_href": "<a href=\"https://web.archive.org/web/2020/https://example.com\">Example</a>"
            }
        }"#;
        let response = ArchiveResponse::from_json(body).unwrap();
        assert_eq!(
            response.memento_url.as_deref(),
            Some("https://web.archive.org/web/2020/https://example.com")
        );
    }

    #[test]
    fn test_missing_robust_links_html() {
        let body = r#"{"data-originalurl": "https://example.com"}"#;
        let err = ArchiveResponse::from_json(body).unwrap_err();
        assert!(matches!(err, ResponseError::MissingField("robust_links_html")));
    }

    #[test]
    fn test_missing_original_url() {
        let body = r#"{"robust_links_html": {"original_url_as_href": "<a>x</a>", "memento_url_as_href": "<a>y</a>"}}"#;
        let err = ArchiveResponse::from_json(body).unwrap_err();
        assert!(matches!(err, ResponseError::MissingField("data-originalurl")));
    }

    #[test]
    fn test_malformed_json() {
        let err = ArchiveResponse::from_json("<html>oops</html>").unwrap_err();
        assert!(matches!(err, ResponseError::Json(_)));
    }

    #[test]
    fn test_archive_choice_from_arg() {
        assert_eq!(ArchiveChoice::from_arg(None), ArchiveChoice::Any);
        assert_eq!(ArchiveChoice::from_arg(Some("default")), ArchiveChoice::Default);
        assert_eq!(
            ArchiveChoice::from_arg(Some("archive.today")),
            ArchiveChoice::Named("archive.today".to_string())
        );
    }

    #[test]
    fn test_item_yaml_uses_doi_key() {
        let mut item = Item::reference(7);
        item.doi = "10.25776/abc123".to_string();
        let yaml = serde_yaml::to_string(&item).unwrap();
        assert!(yaml.contains("DOI: 10.25776/abc123"));
        assert!(yaml.contains("kind: reference"));
        // Optional fields should not appear when empty
        assert!(!yaml.contains("attachments:"));
        assert!(!yaml.contains("note:"));
    }

    #[test]
    fn test_notice_titles() {
        assert_eq!(Notice::info("x").title, "Robust Links INFO");
        assert_eq!(Notice::warning("x").title, "Robust Links WARNING");
        assert_eq!(NoticeLevel::Error.title(), "Robust Links ERROR");
        assert_eq!(Notice::info("x").duration_ms, 5_000);
    }

    #[test]
    fn test_item_kind_archivable() {
        assert!(ItemKind::Reference.is_archivable());
        assert!(!ItemKind::Attachment.is_archivable());
        assert!(!ItemKind::Note.is_archivable());
    }
}
