//! Google Drive file upload.

use std::fmt;

use serde::Deserialize;

use crate::{ApiError, http_client, read_json};

const DRIVE_UPLOAD_URL: &str = "https://www.googleapis.com/upload/drive/v3/files";

/// Uploads files with a user access token.
pub struct DriveClient {
    http: reqwest::Client,
    access_token: String,
}

impl fmt::Debug for DriveClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DriveClient")
            .field("access_token", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Deserialize)]
struct CreatedFile {
    id: String,
}

impl DriveClient {
    pub fn new(access_token: impl Into<String>) -> Result<Self, ApiError> {
        let access_token = access_token.into();
        if access_token.trim().is_empty() {
            return Err(ApiError::InvalidCredentials {
                reason: "Drive access token cannot be empty".to_string(),
            });
        }
        Ok(Self {
            http: http_client()?,
            access_token,
        })
    }

    /// Creates `filename` in `folder_id` with CSV contents, returning the new
    /// file's id.
    pub async fn upload_csv(
        &self,
        folder_id: &str,
        filename: &str,
        contents: &[u8],
    ) -> Result<String, ApiError> {
        let boundary = format!("roster-{}", uuid::Uuid::new_v4().simple());
        let metadata = serde_json::json!({
            "name": filename,
            "parents": [folder_id],
        });
        let body = multipart_related(&boundary, &metadata, "text/csv", contents);

        let response = self
            .http
            .post(DRIVE_UPLOAD_URL)
            .bearer_auth(&self.access_token)
            .query(&[("uploadType", "multipart"), ("fields", "id")])
            .header(
                reqwest::header::CONTENT_TYPE,
                format!("multipart/related; boundary={boundary}"),
            )
            .body(body)
            .send()
            .await?;
        let created: CreatedFile = read_json(response).await?;
        tracing::info!(file_id = %created.id, %filename, "uploaded file to Drive");
        Ok(created.id)
    }
}

/// Builds a two-part `multipart/related` body: JSON metadata, then media.
fn multipart_related(
    boundary: &str,
    metadata: &serde_json::Value,
    media_type: &str,
    media: &[u8],
) -> Vec<u8> {
    let mut body = Vec::with_capacity(media.len() + 256);
    body.extend_from_slice(
        format!(
            "--{boundary}\r\nContent-Type: application/json; charset=UTF-8\r\n\r\n{metadata}\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(format!("--{boundary}\r\nContent-Type: {media_type}\r\n\r\n").as_bytes());
    body.extend_from_slice(media);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());
    body
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_blank_token() {
        assert!(matches!(
            DriveClient::new("  "),
            Err(ApiError::InvalidCredentials { .. })
        ));
        assert!(DriveClient::new("ya29.token").is_ok());
    }

    #[test]
    fn debug_redacts_token() {
        let client = DriveClient::new("ya29.token").unwrap();
        assert!(!format!("{client:?}").contains("ya29.token"));
    }

    #[test]
    fn multipart_body_layout() {
        let metadata = serde_json::json!({"name": "a.csv", "parents": ["folder"]});
        let body = multipart_related("b0", &metadata, "text/csv", b"x,y\n");
        let body = String::from_utf8(body).unwrap();
        assert_eq!(
            body,
            "--b0\r\nContent-Type: application/json; charset=UTF-8\r\n\r\n\
             {\"name\":\"a.csv\",\"parents\":[\"folder\"]}\r\n\
             --b0\r\nContent-Type: text/csv\r\n\r\nx,y\n\r\n--b0--\r\n"
        );
    }
}
