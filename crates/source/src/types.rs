//! Data structures exchanged with the source catalog.

use std::fmt;
use std::time::Duration;

use bytes::Bytes;
use chrono::{DateTime, NaiveDate, Utc};
use futures::stream::BoxStream;
use recording_migrator_common::{
    DEFAULT_PAGE_SIZE, DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_WEBEX_BASE_URL,
};
use serde::{Deserialize, Serialize};

use crate::error::SourceError;

/// A recording listed in the source catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeetingRecord {
    /// Source recording identifier.
    pub id: String,
    /// Display title.
    pub topic: String,
    /// Host email address.
    pub host_email: Option<String>,
    /// Site the meeting was held on.
    pub site_url: Option<String>,
    /// When recording started.
    pub started_at: Option<DateTime<Utc>>,
    /// When recording ended (start + duration).
    pub ended_at: Option<DateTime<Utc>>,
    /// When the recording object was created.
    pub created_at: Option<DateTime<Utc>>,
    /// Recording size in bytes.
    pub size_bytes: Option<u64>,
}

impl MeetingRecord {
    /// Record carrying only an id, for meetings no longer in the catalog listing.
    pub fn id_only(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            topic: String::new(),
            host_email: None,
            site_url: None,
            started_at: None,
            ended_at: None,
            created_at: None,
            size_bytes: None,
        }
    }
}

/// Just-in-time download information for one recording.
///
/// The download URL is signed and expires within minutes. Resolve it right before
/// the transfer and never keep it around.
#[derive(Clone)]
pub struct TransferMetadata {
    pub meeting_id: String,
    pub topic: String,
    pub download_url: String,
}

impl fmt::Debug for TransferMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransferMetadata")
            .field("meeting_id", &self.meeting_id)
            .field("topic", &self.topic)
            .field("download_url", &"<signed>")
            .finish()
    }
}

/// Streamed recording content.
pub struct RecordingStream {
    /// Length announced by the source, if any.
    pub content_length: Option<u64>,
    /// Body chunks in order.
    pub body: BoxStream<'static, Result<Bytes, SourceError>>,
}

impl fmt::Debug for RecordingStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordingStream")
            .field("content_length", &self.content_length)
            .finish_non_exhaustive()
    }
}

/// Bearer credential for the source API.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn bearer(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

/// Inclusive date window for listing recordings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordingQuery {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl RecordingQuery {
    /// Create a window; `from` must not be after `to`.
    pub fn new(from: NaiveDate, to: NaiveDate) -> Result<Self, SourceError> {
        if from > to {
            return Err(SourceError::InvalidConfig {
                message: format!("date window starts after it ends: {} > {}", from, to),
            });
        }
        Ok(Self { from, to })
    }

    /// `from` query value: start of the first day.
    pub fn from_param(&self) -> String {
        format!("{}T00:00:00", self.from.format("%Y-%m-%d"))
    }

    /// `to` query value: end of the last day.
    pub fn to_param(&self) -> String {
        format!("{}T23:59:59", self.to.format("%Y-%m-%d"))
    }
}

/// Operator session: who is acting, on which site and host, over which window.
///
/// Passed explicitly to every catalog operation.
#[derive(Debug, Clone)]
pub struct SourceSession {
    pub credential: Credential,
    pub site_url: String,
    pub host_email: String,
    pub window: RecordingQuery,
}

impl SourceSession {
    pub fn new(
        credential: Credential,
        site_url: impl Into<String>,
        host_email: impl Into<String>,
        window: RecordingQuery,
    ) -> Self {
        Self {
            credential,
            site_url: site_url.into(),
            host_email: host_email.into(),
            window,
        }
    }
}

/// A site the credential can see.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Site {
    pub site_url: String,
    #[serde(default)]
    pub default: bool,
}

/// A person in the organisation (candidate recording host).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    pub id: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub emails: Vec<String>,
}

/// Settings for the source catalog client.
#[derive(Debug, Clone)]
pub struct SourceSettings {
    /// API base URL, without trailing slash.
    pub base_url: String,
    /// Page size for recording listings.
    pub page_size: u32,
    /// Timeout for catalog calls (not downloads).
    pub request_timeout: Duration,
}

impl Default for SourceSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_WEBEX_BASE_URL.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }
}

impl SourceSettings {
    /// Point the client at another API base URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the page size for listings, kept within the API's 1..=100 range.
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.clamp(1, DEFAULT_PAGE_SIZE);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_query_params_cover_whole_days() {
        let q = RecordingQuery::new(date("2022-03-01"), date("2022-03-31")).unwrap();
        assert_eq!(q.from_param(), "2022-03-01T00:00:00");
        assert_eq!(q.to_param(), "2022-03-31T23:59:59");
    }

    #[test]
    fn test_query_rejects_inverted_window() {
        assert!(RecordingQuery::new(date("2022-04-01"), date("2022-03-01")).is_err());
        assert!(RecordingQuery::new(date("2022-04-01"), date("2022-04-01")).is_ok());
    }

    #[test]
    fn test_secrets_not_in_debug_output() {
        let credential = Credential::new("secret-token");
        assert!(!format!("{:?}", credential).contains("secret-token"));

        let metadata = TransferMetadata {
            meeting_id: "m1".into(),
            topic: "t".into(),
            download_url: "https://example.com/signed?sig=abc".into(),
        };
        assert!(!format!("{:?}", metadata).contains("sig=abc"));
    }

    #[test]
    fn test_settings_trim_base_url() {
        let settings = SourceSettings::default().with_base_url("http://localhost:8080/v1/");
        assert_eq!(settings.base_url, "http://localhost:8080/v1");
    }

    #[test]
    fn test_person_deserialize_without_optional_fields() {
        let person: Person = serde_json::from_str(r#"{"id":"p1"}"#).unwrap();
        assert_eq!(person.id, "p1");
        assert!(person.emails.is_empty());
    }
}
