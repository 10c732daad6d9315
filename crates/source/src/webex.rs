//! Webex REST API implementation of `SourceCatalog`.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::{StreamExt, TryStreamExt};
use reqwest::header::LINK;
use reqwest::{RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::error::SourceError;
use crate::traits::SourceCatalog;
use crate::types::{
    Credential, MeetingRecord, Person, RecordingStream, Site, SourceSession, SourceSettings,
    TransferMetadata,
};

const USER_AGENT: &str = concat!("recording-migrator/", env!("CARGO_PKG_VERSION"));
const CONNECT_TIMEOUT_SECS: u64 = 10;
const MAX_ERROR_BODY_CHARS: usize = 200;

/// A recording as listed by `GET /recordings`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WebexRecording {
    id: String,
    #[serde(default)]
    topic: String,
    host_email: Option<String>,
    site_url: Option<String>,
    time_recorded: Option<DateTime<Utc>>,
    create_time: Option<DateTime<Utc>>,
    duration_seconds: Option<i64>,
    size_bytes: Option<u64>,
}

impl From<WebexRecording> for MeetingRecord {
    fn from(r: WebexRecording) -> Self {
        // Out-of-range durations leave the end unknown instead of failing the listing.
        let ended_at: Option<DateTime<Utc>> = match (r.time_recorded, r.duration_seconds) {
            (Some(start), Some(secs)) => chrono::Duration::try_seconds(secs)
                .and_then(|d| start.checked_add_signed(d)),
            _ => None,
        };
        Self {
            id: r.id,
            topic: r.topic,
            host_email: r.host_email,
            site_url: r.site_url,
            started_at: r.time_recorded,
            ended_at,
            created_at: r.create_time,
            size_bytes: r.size_bytes,
        }
    }
}

/// `GET /recordings/{id}` response, reduced to what a transfer needs.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RecordingDetails {
    topic: Option<String>,
    temporary_direct_download_links: Option<DownloadLinks>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DownloadLinks {
    recording_download_link: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ItemsPage<T> {
    items: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct SitesResponse {
    sites: Vec<Site>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// Source catalog client for the Webex recordings API.
pub struct WebexCatalogClient {
    http: reqwest::Client,
    settings: SourceSettings,
}

impl WebexCatalogClient {
    /// Create a new client.
    ///
    /// # Arguments
    /// * `settings` - Base URL, page size and request timeout
    pub fn new(settings: SourceSettings) -> Result<Self, SourceError> {
        if settings.base_url.is_empty() {
            return Err(SourceError::InvalidConfig {
                message: "source base URL must not be empty".to_string(),
            });
        }
        let base: Url = Url::parse(&settings.base_url).map_err(|e| SourceError::InvalidConfig {
            message: format!("invalid source base URL '{}': {}", settings.base_url, e),
        })?;
        if base.cannot_be_a_base() {
            return Err(SourceError::InvalidConfig {
                message: format!("source base URL '{}' cannot carry a path", settings.base_url),
            });
        }

        // No overall timeout here: downloads run for as long as the item timeout allows.
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .build()
            .map_err(|e| SourceError::InvalidConfig {
                message: e.to_string(),
            })?;

        Ok(Self { http, settings })
    }

    /// List the sites the credential can schedule on.
    pub async fn list_sites(&self, credential: &Credential) -> Result<Vec<Site>, SourceError> {
        let endpoint: &str = "GET /meetingPreferences/sites";
        let request = self.authorized(
            self.http.get(self.url("meetingPreferences/sites")),
            credential,
        );
        let response: Response = send(endpoint, request).await?;
        let body: SitesResponse = decode(endpoint, response).await?;
        Ok(body.sites)
    }

    /// List people in the organisation, following pagination.
    pub async fn list_people(&self, credential: &Credential) -> Result<Vec<Person>, SourceError> {
        let first = self.http.get(self.url("people"));
        self.collect_pages("GET /people", credential, first).await
    }

    /// Resolve a person id to the email used as `hostEmail`.
    ///
    /// # Arguments
    /// * `credential` - Bearer credential
    /// * `person_id` - Person identifier from [`list_people`](Self::list_people)
    pub async fn resolve_host_email(
        &self,
        credential: &Credential,
        person_id: &str,
    ) -> Result<String, SourceError> {
        let endpoint: &str = "GET /people/{id}";
        let request = self.authorized(
            self.http.get(self.resource_url("people", person_id)?),
            credential,
        );
        let response: Response = send(endpoint, request).await?;
        let person: Person = decode(endpoint, response).await?;
        person
            .emails
            .into_iter()
            .next()
            .ok_or(SourceError::MissingField {
                endpoint: endpoint.to_string(),
                field: "emails",
            })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.settings.base_url, path)
    }

    /// URL of one resource in a collection, with `id` escaped as a single path segment.
    fn resource_url(&self, collection: &str, id: &str) -> Result<Url, SourceError> {
        if id.is_empty() || id == "." || id == ".." {
            return Err(SourceError::InvalidIdentifier { id: id.to_string() });
        }
        let mut url: Url = Url::parse(&self.url(collection)).map_err(|e| SourceError::InvalidConfig {
            message: e.to_string(),
        })?;
        url.path_segments_mut()
            .map_err(|_| SourceError::InvalidConfig {
                message: format!("source base URL '{}' cannot carry a path", self.settings.base_url),
            })?
            .pop_if_empty()
            .push(id);
        Ok(url)
    }

    fn authorized(&self, request: RequestBuilder, credential: &Credential) -> RequestBuilder {
        request
            .bearer_auth(credential.bearer())
            .timeout(self.settings.request_timeout)
    }

    /// Fetch a paginated `items` listing to the end.
    async fn collect_pages<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        credential: &Credential,
        first: RequestBuilder,
    ) -> Result<Vec<T>, SourceError> {
        let mut items: Vec<T> = Vec::new();
        let mut request: RequestBuilder = self.authorized(first, credential);
        let mut pages: usize = 0;

        loop {
            let response: Response = send(endpoint, request).await?;
            let next: Option<String> = response
                .headers()
                .get_all(LINK)
                .iter()
                .filter_map(|v| v.to_str().ok())
                .find_map(parse_next_link);
            let page: ItemsPage<T> = decode(endpoint, response).await?;
            pages += 1;
            items.extend(page.items);

            match next {
                Some(url) => {
                    log::debug!("{}: following page {}", endpoint, pages + 1);
                    request = self.authorized(self.http.get(url), credential);
                }
                None => break,
            }
        }

        Ok(items)
    }
}

#[async_trait]
impl SourceCatalog for WebexCatalogClient {
    async fn list_recordings(
        &self,
        session: &SourceSession,
    ) -> Result<Vec<MeetingRecord>, SourceError> {
        let first = self.http.get(self.url("recordings")).query(&[
            ("from", session.window.from_param()),
            ("to", session.window.to_param()),
            ("siteUrl", session.site_url.clone()),
            ("hostEmail", session.host_email.clone()),
            ("max", self.settings.page_size.to_string()),
        ]);

        let recordings: Vec<WebexRecording> = self
            .collect_pages("GET /recordings", &session.credential, first)
            .await?;

        log::info!(
            "Listed {} recording(s) for {} on {} ({} to {})",
            recordings.len(),
            session.host_email,
            session.site_url,
            session.window.from,
            session.window.to
        );
        Ok(recordings.into_iter().map(MeetingRecord::from).collect())
    }

    async fn get_transfer_metadata(
        &self,
        session: &SourceSession,
        meeting_id: &str,
    ) -> Result<TransferMetadata, SourceError> {
        let endpoint: &str = "GET /recordings/{id}";
        let request = self
            .authorized(
                self.http.get(self.resource_url("recordings", meeting_id)?),
                &session.credential,
            )
            .query(&[("hostEmail", session.host_email.as_str())]);

        let response: Response = send(endpoint, request).await?;
        let details: RecordingDetails = decode(endpoint, response).await?;
        transfer_metadata_from(endpoint, meeting_id, details)
    }

    async fn open_download(
        &self,
        metadata: &TransferMetadata,
    ) -> Result<RecordingStream, SourceError> {
        // The signed link carries its own authorisation.
        let endpoint: &'static str = "GET recording download";
        let response: Response = send(endpoint, self.http.get(&metadata.download_url)).await?;

        let content_length: Option<u64> = response.content_length();
        let body = response
            .bytes_stream()
            .map_err(|e| SourceError::Network {
                endpoint: endpoint.to_string(),
                message: e.to_string(),
            })
            .boxed();

        Ok(RecordingStream {
            content_length,
            body,
        })
    }

    async fn delete_recording(
        &self,
        session: &SourceSession,
        meeting_id: &str,
    ) -> Result<(), SourceError> {
        let endpoint: &str = "DELETE /recordings/{id}";
        let request = self
            .authorized(
                self.http.delete(self.resource_url("recordings", meeting_id)?),
                &session.credential,
            )
            .query(&[("hostEmail", session.host_email.as_str())]);

        send(endpoint, request).await?;
        Ok(())
    }
}

/// Send a request and turn non-success statuses into `SourceError`.
async fn send(endpoint: &str, request: RequestBuilder) -> Result<Response, SourceError> {
    let response: Response = request.send().await.map_err(|e| SourceError::Network {
        endpoint: endpoint.to_string(),
        message: e.to_string(),
    })?;

    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body: String = response.text().await.unwrap_or_default();
    Err(error_for_status(endpoint, status.as_u16(), &body))
}

async fn decode<T: DeserializeOwned>(endpoint: &str, response: Response) -> Result<T, SourceError> {
    response.json::<T>().await.map_err(|e| SourceError::Decode {
        endpoint: endpoint.to_string(),
        message: e.to_string(),
    })
}

/// Map a non-success status and body to an error.
fn error_for_status(endpoint: &str, status: u16, body: &str) -> SourceError {
    let message: String = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.message)
        .unwrap_or_else(|| body.chars().take(MAX_ERROR_BODY_CHARS).collect());

    if status == 401 {
        SourceError::Unauthorized {
            endpoint: endpoint.to_string(),
            message,
        }
    } else {
        SourceError::Api {
            endpoint: endpoint.to_string(),
            status,
            message,
        }
    }
}

fn transfer_metadata_from(
    endpoint: &str,
    meeting_id: &str,
    details: RecordingDetails,
) -> Result<TransferMetadata, SourceError> {
    let topic: String = details.topic.ok_or(SourceError::MissingField {
        endpoint: endpoint.to_string(),
        field: "topic",
    })?;
    let download_url: String = details
        .temporary_direct_download_links
        .and_then(|links| links.recording_download_link)
        .ok_or(SourceError::MissingField {
            endpoint: endpoint.to_string(),
            field: "temporaryDirectDownloadLinks.recordingDownloadLink",
        })?;

    Ok(TransferMetadata {
        meeting_id: meeting_id.to_string(),
        topic,
        download_url,
    })
}

/// Extract the `rel="next"` target from an RFC 5988 `Link` header value.
fn parse_next_link(header: &str) -> Option<String> {
    header.split(',').find_map(|part| {
        let mut pieces = part.split(';');
        let target: &str = pieces.next()?.trim();
        let is_next: bool = pieces.any(|p| {
            let p: &str = p.trim();
            p == "rel=\"next\"" || p == "rel=next"
        });
        if !is_next {
            return None;
        }
        target
            .strip_prefix('<')?
            .strip_suffix('>')
            .map(str::to_string)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_next_link() {
        let header = r#"<https://webexapis.com/v1/recordings?max=100&cursor=abc>; rel="next""#;
        assert_eq!(
            parse_next_link(header).as_deref(),
            Some("https://webexapis.com/v1/recordings?max=100&cursor=abc")
        );
    }

    #[test]
    fn test_parse_next_link_among_other_relations() {
        let header = r#"<https://a/first>; rel="first", <https://a/next>; rel="next""#;
        assert_eq!(parse_next_link(header).as_deref(), Some("https://a/next"));
        assert_eq!(parse_next_link(r#"<https://a/prev>; rel="prev""#), None);
        assert_eq!(parse_next_link(""), None);
    }

    #[test]
    fn test_error_for_status_unauthorized() {
        let err: SourceError = error_for_status(
            "GET /recordings",
            401,
            r#"{"message":"The request requires a valid access token set in the Authorization request header."}"#,
        );
        assert!(err.is_unauthorized());
        assert!(err.to_string().contains("valid access token"));
    }

    #[test]
    fn test_error_for_status_api_error_truncates_body() {
        let body: String = "x".repeat(1000);
        match error_for_status("GET /recordings", 502, &body) {
            SourceError::Api {
                status, message, ..
            } => {
                assert_eq!(status, 502);
                assert_eq!(message.len(), MAX_ERROR_BODY_CHARS);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_recording_page_to_meeting_records() {
        let json = r#"{
            "items": [{
                "id": "4f914b1dfe3c4d11a61730f18c0f5387",
                "meetingId": "f91b6edce9864428af084977b7c68291_I_166641849979635652",
                "topic": "Weekly Sync",
                "createTime": "2022-05-10T15:40:13Z",
                "timeRecorded": "2022-05-10T14:30:00Z",
                "durationSeconds": 3600,
                "sizeBytes": 1048576,
                "hostEmail": "host@example.com",
                "siteUrl": "example.webex.com",
                "format": "MP4"
            }]
        }"#;
        let page: ItemsPage<WebexRecording> = serde_json::from_str(json).unwrap();
        let records: Vec<MeetingRecord> = page.items.into_iter().map(MeetingRecord::from).collect();

        assert_eq!(records.len(), 1);
        let record: &MeetingRecord = &records[0];
        assert_eq!(record.id, "4f914b1dfe3c4d11a61730f18c0f5387");
        assert_eq!(record.topic, "Weekly Sync");
        assert_eq!(record.host_email.as_deref(), Some("host@example.com"));
        assert_eq!(record.size_bytes, Some(1_048_576));
        assert_eq!(
            record.ended_at.unwrap().to_rfc3339(),
            "2022-05-10T15:30:00+00:00"
        );
    }

    #[test]
    fn test_out_of_range_duration_leaves_end_unknown() {
        let json = r#"{"items":[
            {"id":"m1","timeRecorded":"2022-05-10T14:30:00Z","durationSeconds":9223372036854775807},
            {"id":"m2","timeRecorded":"2022-05-10T14:30:00Z","durationSeconds":-9223372036854775808},
            {"id":"m3","timeRecorded":"2022-05-10T14:30:00Z","durationSeconds":9000000000000}
        ]}"#;
        let page: ItemsPage<WebexRecording> = serde_json::from_str(json).unwrap();
        let records: Vec<MeetingRecord> = page.items.into_iter().map(MeetingRecord::from).collect();

        assert_eq!(records.len(), 3);
        for record in &records {
            assert!(record.started_at.is_some());
            assert_eq!(record.ended_at, None, "{}", record.id);
        }
    }

    #[test]
    fn test_transfer_metadata_from_details() {
        let details: RecordingDetails = serde_json::from_str(
            r#"{
                "id": "m1",
                "topic": "My Demo",
                "temporaryDirectDownloadLinks": {
                    "recordingDownloadLink": "https://dl.example.com/m1?sig=x",
                    "expiration": "2022-05-10T16:00:00Z"
                }
            }"#,
        )
        .unwrap();
        let metadata: TransferMetadata =
            transfer_metadata_from("GET /recordings/{id}", "m1", details).unwrap();
        assert_eq!(metadata.meeting_id, "m1");
        assert_eq!(metadata.topic, "My Demo");
        assert_eq!(metadata.download_url, "https://dl.example.com/m1?sig=x");
    }

    #[test]
    fn test_transfer_metadata_missing_link() {
        let details: RecordingDetails =
            serde_json::from_str(r#"{"id": "m1", "topic": "My Demo"}"#).unwrap();
        let err: SourceError =
            transfer_metadata_from("GET /recordings/{id}", "m1", details).unwrap_err();
        assert!(matches!(
            err,
            SourceError::MissingField {
                field: "temporaryDirectDownloadLinks.recordingDownloadLink",
                ..
            }
        ));
    }

    #[test]
    fn test_resource_url_escapes_identifier() {
        let client = WebexCatalogClient::new(SourceSettings::default()).unwrap();

        let url: Url = client.resource_url("recordings", "m2?x=1#frag").unwrap();
        let request = client
            .http
            .delete(url)
            .query(&[("hostEmail", "h@example.com")])
            .build()
            .unwrap();
        assert_eq!(request.url().path(), "/v1/recordings/m2%3Fx=1%23frag");
        assert_eq!(request.url().query(), Some("hostEmail=h%40example.com"));
        assert_eq!(request.url().fragment(), None);

        let url: Url = client.resource_url("people", "a/b%c").unwrap();
        assert_eq!(url.path(), "/v1/people/a%2Fb%25c");

        let url: Url = client.resource_url("recordings", "4f914b1dfe3c").unwrap();
        assert_eq!(url.as_str(), "https://webexapis.com/v1/recordings/4f914b1dfe3c");
    }

    #[test]
    fn test_resource_url_rejects_relative_segments() {
        let client = WebexCatalogClient::new(SourceSettings::default()).unwrap();
        for id in ["", ".", ".."] {
            assert!(matches!(
                client.resource_url("recordings", id),
                Err(SourceError::InvalidIdentifier { .. })
            ));
        }
    }

    #[test]
    fn test_new_rejects_unparseable_base_url() {
        let settings = SourceSettings::default().with_base_url("not a url");
        assert!(matches!(
            WebexCatalogClient::new(settings),
            Err(SourceError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn test_new_rejects_empty_base_url() {
        let settings = SourceSettings {
            base_url: String::new(),
            ..SourceSettings::default()
        };
        assert!(WebexCatalogClient::new(settings).is_err());
    }
}
