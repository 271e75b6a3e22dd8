//! Remote data gateway.
//!
//! The application layer only sees the [`Gateway`] trait. [`HttpGateway`]
//! is the production implementation talking to the REST endpoints with a
//! cookie-backed session.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::cookie::Jar;
use reqwest::{Client, Method, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use crate::domain::{
    Candidate, ConnectionsEnvelope, FeedDecision, FeedEnvelope, GatewayError, GatewayResult,
    RequestPage, RequestsEnvelope, ReviewDecision,
};
use crate::infrastructure::config::Config;

/// Operations the core needs from the server. One attempt per call.
#[async_trait]
pub trait Gateway: Send + Sync {
    async fn fetch_feed(&self) -> GatewayResult<Vec<Candidate>>;

    async fn send_decision(&self, decision: FeedDecision, candidate_id: &str) -> GatewayResult<()>;

    async fn fetch_received_requests(&self, page: u32, limit: u32) -> GatewayResult<RequestPage>;

    async fn review_request(&self, decision: ReviewDecision, request_id: &str) -> GatewayResult<()>;

    async fn fetch_connections(&self) -> GatewayResult<Vec<Candidate>>;
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// Pulls `message` out of a JSON error body, if there is one.
pub fn server_message(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.message)
        .filter(|m| !m.trim().is_empty())
}

/// One row of the REST surface: method, path and whether an empty JSON
/// body is sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint<'a> {
    Feed,
    SendDecision(FeedDecision, &'a str),
    ReceivedRequests { page: u32, limit: u32 },
    Review(ReviewDecision, &'a str),
    Connections,
}

impl Endpoint<'_> {
    pub fn method(&self) -> Method {
        match self {
            Endpoint::SendDecision(..) => Method::POST,
            Endpoint::Review(..) => Method::PATCH,
            Endpoint::Feed | Endpoint::ReceivedRequests { .. } | Endpoint::Connections => Method::GET,
        }
    }

    pub fn path(&self) -> String {
        match self {
            Endpoint::Feed => "/user/feed".to_string(),
            Endpoint::SendDecision(decision, id) => {
                format!("/requests/request/send/{}/{id}", decision.as_str())
            }
            Endpoint::ReceivedRequests { page, limit } => {
                format!("/requests/requests?page={page}&limit={limit}")
            }
            Endpoint::Review(decision, id) => {
                format!("/requests/request/review/{}/{id}", decision.as_str())
            }
            Endpoint::Connections => "/user/users/connections".to_string(),
        }
    }

    pub fn has_body(&self) -> bool {
        matches!(self, Endpoint::SendDecision(..) | Endpoint::Review(..))
    }
}

pub struct HttpGateway {
    client: Client,
    base_url: String,
    timeout: Option<Duration>,
}

impl HttpGateway {
    /// Builds the client, seeding the cookie jar with the configured
    /// session cookie so every call is authenticated.
    pub fn new(config: &Config) -> GatewayResult<Self> {
        let jar = Arc::new(Jar::default());
        if let Some(cookie) = &config.session_cookie {
            if let Ok(url) = Url::parse(&config.base_url) {
                jar.add_cookie_str(cookie, &url);
            }
        }

        let client = Client::builder().cookie_provider(jar).build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            timeout: config.request_timeout,
        })
    }

    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// The request for `endpoint`, ready to send.
    pub fn request(&self, endpoint: &Endpoint<'_>) -> RequestBuilder {
        let url = self.endpoint(&endpoint.path());
        let mut request = self.client.request(endpoint.method(), &url);
        if endpoint.has_body() {
            request = request.json(&serde_json::json!({}));
        }
        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }
        request
    }

    async fn send(&self, endpoint: Endpoint<'_>) -> GatewayResult<Response> {
        debug!(method = %endpoint.method(), path = %endpoint.path(), "gateway request");

        let response = self.request(&endpoint).send().await.map_err(|e| {
            if e.is_timeout() {
                GatewayError::Timeout
            } else {
                GatewayError::Transport(e)
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::Status {
                status: status.as_u16(),
                message: server_message(&body),
            });
        }
        Ok(response)
    }

    async fn get_json<T: DeserializeOwned>(&self, endpoint: Endpoint<'_>) -> GatewayResult<T> {
        let response = self.send(endpoint).await?;
        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl Gateway for HttpGateway {
    async fn fetch_feed(&self) -> GatewayResult<Vec<Candidate>> {
        let envelope: FeedEnvelope = self.get_json(Endpoint::Feed).await?;
        Ok(envelope.users)
    }

    async fn send_decision(&self, decision: FeedDecision, candidate_id: &str) -> GatewayResult<()> {
        self.send(Endpoint::SendDecision(decision, candidate_id)).await?;
        Ok(())
    }

    async fn fetch_received_requests(&self, page: u32, limit: u32) -> GatewayResult<RequestPage> {
        let envelope: RequestsEnvelope = self.get_json(Endpoint::ReceivedRequests { page, limit }).await?;
        Ok(envelope.into())
    }

    async fn review_request(&self, decision: ReviewDecision, request_id: &str) -> GatewayResult<()> {
        self.send(Endpoint::Review(decision, request_id)).await?;
        Ok(())
    }

    async fn fetch_connections(&self) -> GatewayResult<Vec<Candidate>> {
        let envelope: ConnectionsEnvelope = self.get_json(Endpoint::Connections).await?;
        Ok(envelope.connections)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(base_url: &str) -> Config {
        Config {
            base_url: base_url.to_string(),
            ..Config::default()
        }
    }

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        let gateway = HttpGateway::new(&config("http://localhost:3000/")).unwrap();
        assert_eq!(gateway.endpoint("/user/feed"), "http://localhost:3000/user/feed");
    }

    #[test]
    fn test_new_with_session_cookie() {
        let mut config = config("http://api.example.test");
        config.session_cookie = Some("token=abc".to_string());
        let gateway = HttpGateway::new(&config).unwrap();
        assert_eq!(
            gateway.endpoint("/requests/requests?page=1&limit=5"),
            "http://api.example.test/requests/requests?page=1&limit=5"
        );
    }

    #[test]
    fn test_server_message_extraction() {
        assert_eq!(server_message(r#"{"message":"Invalid status"}"#).as_deref(), Some("Invalid status"));
        assert_eq!(server_message(r#"{"message":"  "}"#), None);
        assert_eq!(server_message(r#"{"error":"x"}"#), None);
        assert_eq!(server_message("<html>Bad Gateway</html>"), None);
    }

    #[test]
    fn test_endpoint_routes() {
        let rows = [
            (Endpoint::Feed, Method::GET, "/user/feed", false),
            (
                Endpoint::SendDecision(FeedDecision::Interested, "A"),
                Method::POST,
                "/requests/request/send/interested/A",
                true,
            ),
            (
                Endpoint::SendDecision(FeedDecision::Ignored, "B"),
                Method::POST,
                "/requests/request/send/ignored/B",
                true,
            ),
            (
                Endpoint::ReceivedRequests { page: 3, limit: 5 },
                Method::GET,
                "/requests/requests?page=3&limit=5",
                false,
            ),
            (
                Endpoint::Review(ReviewDecision::Accepted, "r1"),
                Method::PATCH,
                "/requests/request/review/accepted/r1",
                true,
            ),
            (
                Endpoint::Review(ReviewDecision::Rejected, "r2"),
                Method::PATCH,
                "/requests/request/review/rejected/r2",
                true,
            ),
            (Endpoint::Connections, Method::GET, "/user/users/connections", false),
        ];
        for (endpoint, method, path, body) in rows {
            assert_eq!(endpoint.method(), method, "{endpoint:?}");
            assert_eq!(endpoint.path(), path, "{endpoint:?}");
            assert_eq!(endpoint.has_body(), body, "{endpoint:?}");
        }
    }

    #[test]
    fn test_built_requests_carry_method_url_and_body() {
        let gateway = HttpGateway::new(&config("http://localhost:3000/")).unwrap();

        let send = gateway
            .request(&Endpoint::SendDecision(FeedDecision::Interested, "A"))
            .build()
            .unwrap();
        assert_eq!(send.method(), &Method::POST);
        assert_eq!(send.url().as_str(), "http://localhost:3000/requests/request/send/interested/A");
        assert_eq!(send.body().and_then(|b| b.as_bytes()), Some(&b"{}"[..]));

        let review = gateway
            .request(&Endpoint::Review(ReviewDecision::Rejected, "r9"))
            .build()
            .unwrap();
        assert_eq!(review.method(), &Method::PATCH);
        assert_eq!(review.body().and_then(|b| b.as_bytes()), Some(&b"{}"[..]));

        let list = gateway
            .request(&Endpoint::ReceivedRequests { page: 2, limit: 5 })
            .build()
            .unwrap();
        assert_eq!(list.method(), &Method::GET);
        assert_eq!(list.url().path(), "/requests/requests");
        assert_eq!(list.url().query(), Some("page=2&limit=5"));
        assert!(list.body().is_none());
    }
}
