//! Outcome classification for Robust Links invocations
//!
//! Status mapping:
//! - 200: success (payload must carry the three contract fields)
//! - 400: user error, 403: policy refusal
//! - 404, 405 and anything unlisted: service contract mismatch
//! - 500, 502, 503: service or archive unavailable
//! - 504: service degraded

use crate::schema::{ArchiveResponse, ItemKind, Notice, NoticeLevel};
use serde::Serialize;
use tracing::warn;

/// What could not be reached
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Unreachable {
    /// The Robust Links service itself (500)
    Service,
    /// The selected web archive (502/503); `None` is any archive
    Archive(Option<String>),
}

/// Terminal result of one pipeline invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Success(ArchiveResponse),
    AlreadyArchived,
    BlankUrl,
    InvalidUrl(String),
    UnsupportedItemType(ItemKind),
    /// 400; carries the service body for diagnostics
    UserError(String),
    PolicyError,
    /// Contract mismatch; carries the offending status
    ServiceMisconfigured(u16),
    ServiceUnavailable(Unreachable),
    /// 504, or a 200 whose payload broke the contract (with detail)
    ServiceDegraded(Option<String>),
    NetworkFailure(String),
    StoreFailure(String),
}

/// Coarse grouping used in reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeClass {
    Ok,
    Skipped,
    Failed,
}

/// Map a raw status and body to an outcome. Total over all statuses.
pub fn interpret(status: u16, body: &str, archive: Option<&str>) -> Outcome {
    match status {
        200 => match ArchiveResponse::from_json(body) {
            Ok(response) => Outcome::Success(response),
            Err(e) => {
                warn!(error = %e, "200 response broke the service contract");
                Outcome::ServiceDegraded(Some(e.to_string()))
            }
        },
        400 => Outcome::UserError(body.trim().to_string()),
        403 => Outcome::PolicyError,
        404 | 405 => Outcome::ServiceMisconfigured(status),
        500 => Outcome::ServiceUnavailable(Unreachable::Service),
        502 | 503 => Outcome::ServiceUnavailable(Unreachable::Archive(archive.map(String::from))),
        504 => Outcome::ServiceDegraded(None),
        other => {
            warn!(status = other, "unrecognized status from Robust Links service");
            Outcome::ServiceMisconfigured(other)
        }
    }
}

impl Outcome {
    /// Stable snake_case name for logs and reports
    pub fn kind(&self) -> &'static str {
        match self {
            Outcome::Success(_) => "success",
            Outcome::AlreadyArchived => "already_archived",
            Outcome::BlankUrl => "blank_url",
            Outcome::InvalidUrl(_) => "invalid_url",
            Outcome::UnsupportedItemType(_) => "unsupported_item_type",
            Outcome::UserError(_) => "user_error",
            Outcome::PolicyError => "policy_error",
            Outcome::ServiceMisconfigured(_) => "service_misconfigured",
            Outcome::ServiceUnavailable(_) => "service_unavailable",
            Outcome::ServiceDegraded(_) => "service_degraded",
            Outcome::NetworkFailure(_) => "network_failure",
            Outcome::StoreFailure(_) => "store_failure",
        }
    }

    pub fn class(&self) -> OutcomeClass {
        match self {
            Outcome::Success(_) => OutcomeClass::Ok,
            Outcome::AlreadyArchived
            | Outcome::BlankUrl
            | Outcome::UnsupportedItemType(_) => OutcomeClass::Skipped,
            _ => OutcomeClass::Failed,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }

    /// The notice reported for this outcome
    pub fn notice(&self) -> Notice {
        match self {
            Outcome::Success(_) => Notice::info("Success! Note contains archived link."),
            Outcome::AlreadyArchived => Notice::info("Already preserved at a web archive"),
            Outcome::BlankUrl => Notice::warning("Refusing to archive blank URL"),
            Outcome::InvalidUrl(url) => {
                Notice::warning(format!("Refusing to preserve invalid URL {}", url))
            }
            Outcome::UnsupportedItemType(kind) => {
                Notice::warning(format!("Refusing to archive {}", kind))
            }
            Outcome::UserError(_) => Notice::new(
                NoticeLevel::Warning,
                "There was an issue with the value in the URL field.",
                Notice::LONG_MS,
            ),
            Outcome::PolicyError => error(
                "Cannot create a memento for the value in the URL field due to legal or policy reasons.",
            ),
            Outcome::ServiceMisconfigured(_) => error(
                "There is an issue with the Robust Links client. Please contact the maintainer.",
            ),
            Outcome::ServiceUnavailable(Unreachable::Service) => error(
                "There is an issue with the Robust Links service. Please try again later.",
            ),
            Outcome::ServiceUnavailable(Unreachable::Archive(archive)) => error(format!(
                "There was an issue creating a memento at {}. Please try again later.",
                archive.as_deref().unwrap_or("any web archive")
            )),
            Outcome::ServiceDegraded(None) => error(
                "The Robust Links service is experiencing issues. Please try again later.",
            ),
            Outcome::ServiceDegraded(Some(_)) => error(
                "The Robust Links service returned an unexpected response. Please contact the maintainer.",
            ),
            Outcome::NetworkFailure(_) => error(
                "Could not reach the Robust Links service. Please check your connection and try again later.",
            ),
            Outcome::StoreFailure(_) => {
                error("Could not read the item from the library. Please try again.")
            }
        }
    }
}

fn error(message: impl Into<String>) -> Notice {
    Notice::new(NoticeLevel::Error, message, Notice::LONG_MS)
}

#[cfg(test)]
mod tests {
    use super::*;

    const GOOD_BODY: &str = r#"{
        "data-originalurl": "https://example.com",
        "robust_links_html": {
            "original_url_as_href": "<a href=\"https://example.com\">Example</a>",
            "memento_url_as_href": "<a href=\"https://archive.li/x\">Example</a>"
        }
    }"#;

    #[test]
    fn test_status_table() {
        assert_eq!(interpret(200, GOOD_BODY, None).kind(), "success");
        assert_eq!(interpret(400, "bad", None).kind(), "user_error");
        assert_eq!(interpret(403, "", None), Outcome::PolicyError);
        assert_eq!(interpret(404, "", None), Outcome::ServiceMisconfigured(404));
        assert_eq!(interpret(405, "", None), Outcome::ServiceMisconfigured(405));
        assert_eq!(
            interpret(500, "", None),
            Outcome::ServiceUnavailable(Unreachable::Service)
        );
        assert_eq!(
            interpret(502, "", Some("archive.today")),
            Outcome::ServiceUnavailable(Unreachable::Archive(Some("archive.today".to_string())))
        );
        assert_eq!(
            interpret(503, "", None),
            Outcome::ServiceUnavailable(Unreachable::Archive(None))
        );
        assert_eq!(interpret(504, "", None), Outcome::ServiceDegraded(None));
    }

    #[test]
    fn test_unlisted_status_is_misconfigured() {
        assert_eq!(interpret(301, "", None), Outcome::ServiceMisconfigured(301));
        assert_eq!(interpret(999, "", None), Outcome::ServiceMisconfigured(999));
        assert_eq!(interpret(201, GOOD_BODY, None), Outcome::ServiceMisconfigured(201));
    }

    #[test]
    fn test_incomplete_200_is_degraded() {
        let outcome = interpret(200, r#"{"data-originalurl": "https://example.com"}"#, None);
        assert!(matches!(outcome, Outcome::ServiceDegraded(Some(_))));
        assert_eq!(outcome.notice().level, NoticeLevel::Error);

        let outcome = interpret(200, "not json", None);
        assert!(matches!(outcome, Outcome::ServiceDegraded(Some(_))));
    }

    #[test]
    fn test_archive_notice_names_archive() {
        let notice = interpret(503, "", Some("archive.today")).notice();
        assert_eq!(notice.title, "Robust Links ERROR");
        assert!(notice.message.contains("archive.today"));
        assert!(notice.message.contains("try again later"));
        assert_eq!(notice.duration_ms, 15_000);
    }

    #[test]
    fn test_refusal_notices() {
        let notice = Outcome::UnsupportedItemType(ItemKind::Attachment).notice();
        assert_eq!(notice.level, NoticeLevel::Warning);
        assert_eq!(notice.message, "Refusing to archive attachment");

        let notice = Outcome::UnsupportedItemType(ItemKind::Note).notice();
        assert_eq!(notice.message, "Refusing to archive note");

        let notice = Outcome::InvalidUrl("ftp://x".to_string()).notice();
        assert_eq!(notice.message, "Refusing to preserve invalid URL ftp://x");
    }

    #[test]
    fn test_outcome_class() {
        assert_eq!(interpret(200, GOOD_BODY, None).class(), OutcomeClass::Ok);
        assert_eq!(Outcome::AlreadyArchived.class(), OutcomeClass::Skipped);
        assert_eq!(Outcome::BlankUrl.class(), OutcomeClass::Skipped);
        assert_eq!(Outcome::PolicyError.class(), OutcomeClass::Failed);
        assert_eq!(
            Outcome::NetworkFailure("refused".to_string()).class(),
            OutcomeClass::Failed
        );
    }
}
