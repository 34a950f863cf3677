//! Zoom reporting API client.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};

use roster_core::RawSession;

use crate::{ApiError, http_client, read_json};

const ZOOM_OAUTH_URL: &str = "https://zoom.us/oauth/token";
const ZOOM_API_BASE: &str = "https://api.zoom.us/v2";
const ZOOM_API_VERSION: &str = "2.0.0";
const PARTICIPANTS_PAGE_SIZE: u32 = 500;

/// Server-to-server OAuth app credentials.
#[derive(Clone)]
pub struct ZoomCredentials {
    pub account_id: String,
    pub client_id: String,
    pub client_secret: String,
}

impl fmt::Debug for ZoomCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ZoomCredentials")
            .field("account_id", &self.account_id)
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .finish()
    }
}

impl ZoomCredentials {
    fn validate(&self) -> Result<(), ApiError> {
        for (field, value) in [
            ("account_id", &self.account_id),
            ("client_id", &self.client_id),
            ("client_secret", &self.client_secret),
        ] {
            if value.trim().is_empty() {
                return Err(ApiError::InvalidCredentials {
                    reason: format!("Zoom {field} cannot be empty"),
                });
            }
        }
        Ok(())
    }
}

/// Authenticated Zoom API client.
pub struct ZoomClient {
    http: reqwest::Client,
    access_token: String,
    api_base: String,
}

impl fmt::Debug for ZoomClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ZoomClient")
            .field("access_token", &"[REDACTED]")
            .field("api_base", &self.api_base)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// A meeting from the daily user report.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MeetingSummary {
    /// Instance UUID, needed to look up this occurrence's participants.
    pub uuid: String,
    /// Numeric meeting id shared by every occurrence.
    pub id: u64,
    #[serde(default)]
    pub topic: String,
    #[serde(default)]
    pub participants_count: u64,
}

#[derive(Debug, Deserialize)]
struct MeetingsPage {
    #[serde(default)]
    meetings: Vec<MeetingSummary>,
}

/// One participant record, i.e. one join/leave interval.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ZoomParticipant {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub participant_user_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub user_name: Option<String>,
    #[serde(default)]
    pub user_email: Option<String>,
    /// Seconds in the meeting.
    #[serde(default)]
    pub duration: Option<u64>,
}

/// One page of the past-meeting participants listing.
#[derive(Debug, Default, Deserialize)]
pub struct ParticipantsPage {
    #[serde(default)]
    pub participants: Vec<ZoomParticipant>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

impl ParticipantsPage {
    /// The token for the following page, if there is one.
    pub fn next_token(&self) -> Option<&str> {
        self.next_page_token
            .as_deref()
            .map(str::trim)
            .filter(|token| !token.is_empty())
    }
}

impl From<ZoomParticipant> for RawSession {
    fn from(participant: ZoomParticipant) -> Self {
        let session_id = [&participant.id, &participant.participant_user_id]
            .into_iter()
            .flatten()
            .map(|id| id.trim())
            .find(|id| !id.is_empty())
            .unwrap_or_default()
            .to_string();
        Self {
            display_name: participant.name.unwrap_or_default(),
            account_name: participant.user_name.unwrap_or_default(),
            email: participant.user_email.unwrap_or_default(),
            session_id,
            duration_seconds: participant.duration.unwrap_or(0),
        }
    }
}

/// Accepts ids given either as JSON strings or numbers.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrNumber {
        String(String),
        Unsigned(u64),
        Signed(i64),
    }

    Ok(
        Option::<StringOrNumber>::deserialize(deserializer)?.map(|value| match value {
            StringOrNumber::String(s) => s,
            StringOrNumber::Unsigned(n) => n.to_string(),
            StringOrNumber::Signed(n) => n.to_string(),
        }),
    )
}

impl ZoomClient {
    /// Obtains an account-credentials access token.
    pub async fn connect(credentials: &ZoomCredentials) -> Result<Self, ApiError> {
        credentials.validate()?;
        let http = http_client()?;

        let response = http
            .post(ZOOM_OAUTH_URL)
            .query(&[
                ("grant_type", "account_credentials"),
                ("account_id", credentials.account_id.as_str()),
            ])
            .basic_auth(&credentials.client_id, Some(&credentials.client_secret))
            .send()
            .await?;
        let token: TokenResponse = read_json(response).await?;
        tracing::debug!("obtained Zoom access token");

        Ok(Self {
            http,
            access_token: token.access_token,
            api_base: ZOOM_API_BASE.to_string(),
        })
    }

    /// Meetings hosted by `user` on `day`.
    pub async fn list_meetings(
        &self,
        user: &str,
        day: NaiveDate,
    ) -> Result<Vec<MeetingSummary>, ApiError> {
        let day = day.format("%Y-%m-%d").to_string();
        let url = format!(
            "{}/report/users/{}/meetings",
            self.api_base,
            encode_path_segment(user)
        );
        let response = self
            .http
            .get(url)
            .bearer_auth(&self.access_token)
            .query(&[("from", day.as_str()), ("to", day.as_str())])
            .send()
            .await?;
        let page: MeetingsPage = read_json(response).await?;
        tracing::debug!(%day, count = page.meetings.len(), "listed meetings");
        Ok(page.meetings)
    }

    /// Every participant record of one meeting instance, across all pages.
    pub async fn list_participants(
        &self,
        meeting_uuid: &str,
    ) -> Result<Vec<ZoomParticipant>, ApiError> {
        let url = participants_url(&self.api_base, meeting_uuid);
        let page_size = PARTICIPANTS_PAGE_SIZE.to_string();
        let mut participants = Vec::new();
        let mut next_token: Option<String> = None;

        loop {
            let mut query = vec![("page_size", page_size.as_str()), ("include_bots", "true")];
            if let Some(token) = next_token.as_deref() {
                query.push(("next_page_token", token));
            }
            let response = self
                .http
                .get(&url)
                .bearer_auth(&self.access_token)
                .header("Zoom-API-Version", ZOOM_API_VERSION)
                .query(&query)
                .send()
                .await?;
            let page: ParticipantsPage = read_json(response).await?;
            tracing::debug!(
                count = page.participants.len(),
                more = page.next_token().is_some(),
                "fetched participants page"
            );

            next_token = page.next_token().map(str::to_string);
            participants.extend(page.participants);
            if next_token.is_none() {
                break;
            }
        }

        Ok(participants)
    }
}

/// The meeting with the most participants; the first one wins ties.
pub fn busiest_meeting(meetings: &[MeetingSummary]) -> Option<&MeetingSummary> {
    meetings.iter().fold(None, |best, meeting| match best {
        Some(best) if best.participants_count >= meeting.participants_count => Some(best),
        _ => Some(meeting),
    })
}

fn participants_url(api_base: &str, meeting_uuid: &str) -> String {
    format!(
        "{api_base}/past_meetings/{}/participants",
        encode_path_segment(meeting_uuid)
    )
}

/// Percent-encodes everything but unreserved characters.
///
/// Meeting UUIDs may contain `/`, `+` and `=`, all of which must be escaped
/// to stay within one path segment.
fn encode_path_segment(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for byte in value.bytes() {
        if byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'.' | b'_' | b'~') {
            out.push(char::from(byte));
        } else {
            out.push_str(&format!("%{byte:02X}"));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meeting(uuid: &str, count: u64) -> MeetingSummary {
        MeetingSummary {
            uuid: uuid.to_string(),
            id: 1,
            topic: String::new(),
            participants_count: count,
        }
    }

    #[test]
    fn credentials_debug_redacts_secret() {
        let credentials = ZoomCredentials {
            account_id: "acct".to_string(),
            client_id: "client".to_string(),
            client_secret: "hunter2".to_string(),
        };
        let debug = format!("{credentials:?}");
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn credentials_reject_blank_fields() {
        let credentials = ZoomCredentials {
            account_id: "acct".to_string(),
            client_id: " ".to_string(),
            client_secret: "secret".to_string(),
        };
        assert!(matches!(
            credentials.validate(),
            Err(ApiError::InvalidCredentials { .. })
        ));
    }

    #[test]
    fn encodes_meeting_uuid_fully() {
        assert_eq!(encode_path_segment("aB3/xy+z=="), "aB3%2Fxy%2Bz%3D%3D");
        assert_eq!(encode_path_segment("//abc"), "%2F%2Fabc");
        assert_eq!(encode_path_segment("a.b-c_d~e"), "a.b-c_d~e");
    }

    #[test]
    fn participants_url_escapes_uuid() {
        assert_eq!(
            participants_url("https://api.zoom.us/v2", "ab/c=="),
            "https://api.zoom.us/v2/past_meetings/ab%2Fc%3D%3D/participants"
        );
    }

    #[test]
    fn busiest_meeting_prefers_first_on_tie() {
        let meetings = vec![meeting("a", 3), meeting("b", 9), meeting("c", 9)];
        assert_eq!(busiest_meeting(&meetings).unwrap().uuid, "b");
        assert!(busiest_meeting(&[]).is_none());
    }

    #[test]
    fn parses_meetings_page() {
        let body = r#"{
            "page_size": 30,
            "meetings": [
                {"uuid": "u1==", "id": 81234567890, "topic": "Standup", "participants_count": 12},
                {"uuid": "u2==", "id": 81234567891}
            ]
        }"#;
        let page: MeetingsPage = serde_json::from_str(body).unwrap();
        assert_eq!(page.meetings.len(), 2);
        assert_eq!(page.meetings[0].id, 81_234_567_890);
        assert_eq!(page.meetings[0].participants_count, 12);
        assert_eq!(page.meetings[1].participants_count, 0);
    }

    #[test]
    fn parses_participants_page() {
        let body = r#"{
            "page_size": 500,
            "next_page_token": "tok-2",
            "participants": [
                {"id": "p1", "name": "Alice", "user_email": "alice@x.com", "duration": 300},
                {"participant_user_id": 4242, "user_name": "bob", "duration": 61},
                {"name": "Guest"}
            ]
        }"#;
        let page: ParticipantsPage = serde_json::from_str(body).unwrap();
        assert_eq!(page.next_token(), Some("tok-2"));
        assert_eq!(page.participants.len(), 3);
        assert_eq!(page.participants[1].participant_user_id.as_deref(), Some("4242"));
    }

    #[test]
    fn empty_next_page_token_ends_pagination() {
        let page: ParticipantsPage =
            serde_json::from_str(r#"{"participants": [], "next_page_token": ""}"#).unwrap();
        assert_eq!(page.next_token(), None);
        let page: ParticipantsPage = serde_json::from_str(r#"{"participants": []}"#).unwrap();
        assert_eq!(page.next_token(), None);
    }

    #[test]
    fn participant_converts_to_session() {
        let participant = ZoomParticipant {
            id: Some("  ".to_string()),
            participant_user_id: Some("user-7".to_string()),
            name: Some("Alice".to_string()),
            user_name: Some("alice.w".to_string()),
            user_email: Some("alice@x.com".to_string()),
            duration: Some(125),
        };
        let session = RawSession::from(participant);
        assert_eq!(session.display_name, "Alice");
        assert_eq!(session.account_name, "alice.w");
        assert_eq!(session.email, "alice@x.com");
        assert_eq!(session.session_id, "user-7");
        assert_eq!(session.duration_seconds, 125);
    }

    #[test]
    fn participant_without_ids_gets_empty_session_id() {
        let session = RawSession::from(ZoomParticipant::default());
        assert_eq!(session.session_id, "");
        assert_eq!(session.duration_seconds, 0);
    }
}
