use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::models::{DraftListQuery, DraftListResult, IntegrationStatus};

/// The drafts endpoints the dashboard depends on.
#[async_trait]
pub trait DraftsApi: Send + Sync {
    async fn list_drafts(&self, query: &DraftListQuery) -> Result<DraftListResult>;

    async fn update_draft(&self, draft_id: &str, subject: &str, body: &str) -> Result<()>;

    /// Returns the provider's message id.
    async fn send_draft(&self, draft_id: &str, recipient_email: &str) -> Result<String>;

    async fn delete_draft(&self, draft_id: &str) -> Result<()>;
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct UpdateDraftRequest<'a> {
    draft_id: &'a str,
    subject: &'a str,
    body: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SendDraftRequest<'a> {
    draft_id: &'a str,
    recipient_email: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SendDraftResponse {
    message_id: String,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: Option<String>,
}

pub struct DraftsClient {
    client: Client,
    base_url: String,
    api_token: Option<String>,
}

impl DraftsClient {
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .user_agent("draft-desk/1.0")
            .build()?;
        Ok(Self {
            client,
            base_url: config.api_url.trim_end_matches('/').to_string(),
            api_token: config.api_token.clone(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Base URL extended with path segments. Each segment is percent-encoded,
    /// so ids containing `/`, `?` or `#` stay inside their own segment.
    fn segment_url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| AppError::Config(format!("Invalid api_url {}: {}", self.base_url, e)))?;
        url.path_segments_mut()
            .map_err(|_| AppError::Config(format!("api_url {} cannot take a path", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Web dashboard page for a single draft
    pub fn draft_page_url(&self, draft_id: &str) -> Result<Url> {
        self.segment_url(&["dashboard", "drafts", draft_id])
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.api_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Connection state of every meeting platform
    pub async fn connection_status(&self) -> Result<IntegrationStatus> {
        let response = self
            .authorize(self.client.get(self.endpoint("/api/auth/status")))
            .send()
            .await?;
        let response = check_status(response).await?;
        Ok(response.json().await?)
    }

    pub async fn disconnect_platform(&self, platform: &str) -> Result<()> {
        let url = self.segment_url(&["api", "integrations", platform, "disconnect"])?;
        let response = self
            .authorize(self.client.post(url))
            .send()
            .await?;
        check_status(response).await?;
        Ok(())
    }
}

#[async_trait]
impl DraftsApi for DraftsClient {
    async fn list_drafts(&self, query: &DraftListQuery) -> Result<DraftListResult> {
        let response = self
            .authorize(self.client.get(self.endpoint("/api/drafts")))
            .query(&query.to_params())
            .send()
            .await?;
        let response = check_status(response).await?;
        Ok(response.json().await?)
    }

    async fn update_draft(&self, draft_id: &str, subject: &str, body: &str) -> Result<()> {
        let request = UpdateDraftRequest {
            draft_id,
            subject,
            body,
        };
        let response = self
            .authorize(self.client.post(self.endpoint("/api/drafts/update")))
            .json(&request)
            .send()
            .await?;
        check_status(response).await?;
        Ok(())
    }

    async fn send_draft(&self, draft_id: &str, recipient_email: &str) -> Result<String> {
        let request = SendDraftRequest {
            draft_id,
            recipient_email,
        };
        let response = self
            .authorize(self.client.post(self.endpoint("/api/drafts/send")))
            .json(&request)
            .send()
            .await?;
        let response = check_status(response).await?;
        let sent: SendDraftResponse = response.json().await?;
        Ok(sent.message_id)
    }

    async fn delete_draft(&self, draft_id: &str) -> Result<()> {
        let url = self.segment_url(&["api", "drafts", draft_id])?;
        let response = self
            .authorize(self.client.delete(url))
            .send()
            .await?;
        check_status(response).await?;
        Ok(())
    }
}

async fn check_status(response: Response) -> Result<Response> {
    if response.status().is_success() {
        return Ok(response);
    }

    let status = response.status();
    let error_text = response.text().await?;
    let message = serde_json::from_str::<ErrorResponse>(&error_text)
        .ok()
        .and_then(|e| e.error)
        .unwrap_or(error_text);

    tracing::warn!("API request failed with HTTP {}: {}", status, message);
    Err(AppError::Api(format!("HTTP {}: {}", status.as_u16(), message)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DateRange, DraftStatus, StatusFilter};
    use mockito::Matcher;

    fn client_for(server: &mockito::ServerGuard) -> DraftsClient {
        let config = Config {
            api_url: format!("{}/", server.url()),
            api_token: Some("token-123".to_string()),
            ..Config::default()
        };
        DraftsClient::new(&config).unwrap()
    }

    #[tokio::test]
    async fn test_list_sends_all_four_params() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/drafts")
            .match_header("authorization", "Bearer token-123")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("page".into(), "3".into()),
                Matcher::UrlEncoded("status".into(), "sent".into()),
                Matcher::UrlEncoded("search".into(), "".into()),
                Matcher::UrlEncoded("dateRange".into(), "month".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"drafts":[{"id":"d1","status":"sent","sentTo":"a@b.com"}],"total":21,"totalPages":3,"stats":{"total":21,"sent":21}}"#,
            )
            .create_async()
            .await;

        let query = DraftListQuery {
            page: 3,
            status: StatusFilter::Only(DraftStatus::Sent),
            search: String::new(),
            date_range: DateRange::Month,
        };
        let result = client_for(&server).list_drafts(&query).await.unwrap();

        mock.assert_async().await;
        assert_eq!(result.drafts.len(), 1);
        assert_eq!(result.drafts[0].sent_to.as_deref(), Some("a@b.com"));
        assert_eq!(result.total_pages, 3);
        assert_eq!(result.stats.sent, 21);
    }

    #[tokio::test]
    async fn test_error_body_message_is_surfaced() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/drafts")
            .match_query(Matcher::Any)
            .with_status(500)
            .with_body(r#"{"error":"database unavailable"}"#)
            .create_async()
            .await;

        let err = client_for(&server)
            .list_drafts(&DraftListQuery::default())
            .await
            .unwrap_err();

        match err {
            AppError::Api(message) => {
                assert_eq!(message, "HTTP 500: database unavailable");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_plain_text_error_body() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("DELETE", "/api/drafts/d9")
            .with_status(404)
            .with_body("not found")
            .create_async()
            .await;

        let err = client_for(&server).delete_draft("d9").await.unwrap_err();
        assert!(matches!(err, AppError::Api(ref m) if m == "HTTP 404: not found"));
    }

    #[tokio::test]
    async fn test_update_posts_camel_case_body() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/drafts/update")
            .match_body(Matcher::Json(serde_json::json!({
                "draftId": "d1",
                "subject": "New subject",
                "body": "Thanks for your time."
            })))
            .with_status(200)
            .with_body(r#"{"success":true}"#)
            .create_async()
            .await;

        tokio_test::assert_ok!(
            client_for(&server)
                .update_draft("d1", "New subject", "Thanks for your time.")
                .await
        );
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_send_returns_message_id() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/drafts/send")
            .match_body(Matcher::Json(serde_json::json!({
                "draftId": "d1",
                "recipientEmail": "client@example.com"
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"messageId":"msg-42"}"#)
            .create_async()
            .await;

        let message_id = client_for(&server)
            .send_draft("d1", "client@example.com")
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(message_id, "msg-42");
    }

    #[tokio::test]
    async fn test_connection_status_and_disconnect() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/auth/status")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"zoom":{"connected":true,"email":"me@example.com"}}"#)
            .create_async()
            .await;
        let disconnect = server
            .mock("POST", "/api/integrations/zoom/disconnect")
            .with_status(200)
            .create_async()
            .await;

        let client = client_for(&server);
        let status = client.connection_status().await.unwrap();
        assert!(status["zoom"].connected);

        tokio_test::assert_ok!(client.disconnect_platform("zoom").await);
        disconnect.assert_async().await;
    }

    #[tokio::test]
    async fn test_delete_encodes_reserved_characters_in_id() {
        let mut server = mockito::Server::new_async().await;
        let truncated = server
            .mock("DELETE", "/api/drafts/d1")
            .with_status(200)
            .expect(0)
            .create_async()
            .await;
        let encoded = server
            .mock("DELETE", "/api/drafts/d1%3Fx=1")
            .with_status(200)
            .expect(1)
            .create_async()
            .await;

        tokio_test::assert_ok!(client_for(&server).delete_draft("d1?x=1").await);

        encoded.assert_async().await;
        truncated.assert_async().await;
    }

    #[tokio::test]
    async fn test_disconnect_keeps_platform_in_one_segment() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/integrations/google%2Fmeet/disconnect")
            .with_status(200)
            .expect(1)
            .create_async()
            .await;

        tokio_test::assert_ok!(client_for(&server).disconnect_platform("google/meet").await);
        mock.assert_async().await;
    }

    #[test]
    fn test_draft_page_url_encodes_id() {
        let config = Config {
            api_url: "https://app.example.com/".to_string(),
            ..Config::default()
        };
        let client = DraftsClient::new(&config).unwrap();
        assert_eq!(
            client.draft_page_url("d1").unwrap().as_str(),
            "https://app.example.com/dashboard/drafts/d1"
        );
        assert_eq!(
            client.draft_page_url("d1#notes").unwrap().as_str(),
            "https://app.example.com/dashboard/drafts/d1%23notes"
        );
    }

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let config = Config {
            api_url: "https://app.example.com/".to_string(),
            ..Config::default()
        };
        let client = DraftsClient::new(&config).unwrap();
        assert_eq!(
            client.endpoint("/api/drafts"),
            "https://app.example.com/api/drafts"
        );
    }
}
