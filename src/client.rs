use crate::config::{ApiEndpoint, CHAT_PATH, HEALTH_PATH};
use crate::error::AskError;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Url;
use serde::Serialize;
use serde_json::Value;

/// Body of a chat request
#[derive(Debug, Clone, Serialize)]
pub struct AskRequest<'a> {
    pub query: &'a str,
}

/// Parsed JSON body of a successful chat response.
///
/// The shape is not validated; `answer` is read leniently.
#[derive(Debug, Clone, PartialEq)]
pub struct AskReply(pub Value);

impl AskReply {
    /// The reply's `answer`, unless it is missing or falsy (`null`, `false`,
    /// `0`, or an empty string)
    pub fn answer(&self) -> Option<String> {
        match self.0.get("answer")? {
            Value::Null | Value::Bool(false) => None,
            Value::Number(n) if n.as_f64() == Some(0.0) => None,
            Value::String(text) if text.is_empty() => None,
            Value::String(text) => Some(text.clone()),
            other => Some(other.to_string()),
        }
    }
}

/// Anything that can answer a query
#[async_trait]
pub trait AskBackend: Send + Sync {
    async fn ask(&self, query: &str) -> Result<AskReply, AskError>;
}

/// HTTP client for the backend's chat route
#[derive(Clone)]
pub struct QueryClient {
    client: reqwest::Client,
    endpoint: ApiEndpoint,
    chat_url: Url,
    health_url: Url,
}

impl QueryClient {
    /// Build a client for an endpoint resolved at startup
    pub fn new(endpoint: ApiEndpoint) -> Result<Self> {
        let client = reqwest::Client::builder()
            .build()
            .context("Failed to create HTTP client")?;
        let chat_url = endpoint.url(CHAT_PATH)?;
        let health_url = endpoint.url(HEALTH_PATH)?;

        Ok(Self {
            client,
            endpoint,
            chat_url,
            health_url,
        })
    }

    pub fn endpoint(&self) -> &ApiEndpoint {
        &self.endpoint
    }

    pub fn chat_url(&self) -> &Url {
        &self.chat_url
    }

    /// Send one query and decode the reply
    pub async fn ask_llm(&self, query: &str) -> Result<AskReply, AskError> {
        tracing::debug!(url = %self.chat_url, len = query.len(), "sending chat request");

        let response = self
            .client
            .post(self.chat_url.clone())
            .header("Content-Type", "application/json")
            .json(&AskRequest { query })
            .send()
            .await
            .map_err(AskError::Transport)?;

        let value = Self::read_json(response).await?;
        Ok(AskReply(value))
    }

    /// Probe the backend's health route
    pub async fn health(&self) -> Result<Value, AskError> {
        let response = self
            .client
            .get(self.health_url.clone())
            .send()
            .await
            .map_err(AskError::Transport)?;

        Self::read_json(response).await
    }

    async fn read_json(response: reqwest::Response) -> Result<Value, AskError> {
        let status = response.status();
        if !status.is_success() {
            return Err(AskError::Status {
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(AskError::Transport)?;
        serde_json::from_slice(&body).map_err(AskError::Decode)
    }
}

#[async_trait]
impl AskBackend for QueryClient {
    async fn ask(&self, query: &str) -> Result<AskReply, AskError> {
        self.ask_llm(query).await
    }
}


#[cfg(test)]
mod tests {
    use super::testing::{closed_port_url, TestServer};
    use super::*;
    use crate::config::Config;
    use crate::error::AskErrorKind;

    fn endpoint_with_base(base: &str) -> ApiEndpoint {
        let base = base.to_string();
        ApiEndpoint::resolve(
            move |name| (name == "SOCH_API_BASE").then(|| base.clone()),
            &Config::default(),
        )
    }

    fn endpoint_with_origin(origin: &str) -> ApiEndpoint {
        let config = Config {
            origin: origin.to_string(),
            ..Config::default()
        };
        ApiEndpoint::resolve(|_| None, &config)
    }

    #[test]
    fn answer_is_read_leniently() {
        let reply = AskReply(serde_json::json!({"answer": "42", "sources": ["a.md"]}));
        assert_eq!(reply.answer().as_deref(), Some("42"));

        assert_eq!(AskReply(serde_json::json!({})).answer(), None);
        assert_eq!(AskReply(serde_json::json!({"answer": ""})).answer(), None);
        assert_eq!(AskReply(serde_json::json!({"answer": null})).answer(), None);
        assert_eq!(AskReply(serde_json::json!([1, 2])).answer(), None);
        assert_eq!(
            AskReply(serde_json::json!({"answer": 7})).answer().as_deref(),
            Some("7")
        );
    }

    #[test]
    fn falsy_answers_count_as_missing() {
        for answer in [
            serde_json::json!(false),
            serde_json::json!(0),
            serde_json::json!(0.0),
        ] {
            let reply = AskReply(serde_json::json!({ "answer": answer }));
            assert_eq!(reply.answer(), None, "answer {answer}");
        }
        assert_eq!(
            AskReply(serde_json::json!({"answer": true})).answer().as_deref(),
            Some("true")
        );
    }

    #[tokio::test]
    async fn posts_json_query_to_base_chat_route() {
        let mut server = TestServer::start(200, r#"{"answer":"42"}"#).await;
        let client = QueryClient::new(endpoint_with_base(&server.url())).unwrap();

        let reply = client.ask_llm("what is the answer?").await.unwrap();
        assert_eq!(reply.answer().as_deref(), Some("42"));

        let request = server.next_request().await;
        assert!(request.request_line().starts_with("POST /chat "));
        assert_eq!(
            request.header("content-type").as_deref(),
            Some("application/json")
        );
        let body: Value = serde_json::from_str(&request.body).unwrap();
        assert_eq!(body, serde_json::json!({"query": "what is the answer?"}));
    }

    #[tokio::test]
    async fn relative_endpoint_resolves_against_origin() {
        let mut server = TestServer::start(200, r#"{"answer":"hi"}"#).await;
        let client = QueryClient::new(endpoint_with_origin(&server.url())).unwrap();
        assert_eq!(client.endpoint().chat_target(), "/chat");

        client.ask_llm("hello").await.unwrap();
        let request = server.next_request().await;
        assert!(request.request_line().starts_with("POST /chat "));
    }

    #[tokio::test]
    async fn non_success_status_carries_code() {
        let server = TestServer::start(500, r#"{"detail":"boom"}"#).await;
        let client = QueryClient::new(endpoint_with_base(&server.url())).unwrap();

        let err = client.ask_llm("q").await.unwrap_err();
        assert_eq!(err.kind(), AskErrorKind::Status);
        assert_eq!(err.status(), Some(500));
    }

    #[tokio::test]
    async fn unparseable_body_is_a_decode_error() {
        let server = TestServer::start(200, "not json").await;
        let client = QueryClient::new(endpoint_with_base(&server.url())).unwrap();

        let err = client.ask_llm("q").await.unwrap_err();
        assert_eq!(err.kind(), AskErrorKind::Decode);
    }

    #[tokio::test]
    async fn extra_fields_are_kept_but_ignored() {
        let server = TestServer::start(200, r#"{"answer":"ok","sources":["x"]}"#).await;
        let client = QueryClient::new(endpoint_with_base(&server.url())).unwrap();

        let reply = client.ask_llm("q").await.unwrap();
        assert_eq!(reply.answer().as_deref(), Some("ok"));
        assert_eq!(reply.0["sources"][0], "x");
    }

    #[tokio::test]
    async fn connection_refused_is_a_transport_error() {
        let client = QueryClient::new(endpoint_with_base(&closed_port_url().await)).unwrap();

        let err = client.ask_llm("q").await.unwrap_err();
        assert_eq!(err.kind(), AskErrorKind::Transport);
    }

    #[tokio::test]
    async fn health_hits_healthz() {
        let mut server = TestServer::start(200, r#"{"ok":true}"#).await;
        let client = QueryClient::new(endpoint_with_base(&server.url())).unwrap();

        let value = client.health().await.unwrap();
        assert_eq!(value, serde_json::json!({"ok": true}));
        let request = server.next_request().await;
        assert!(request.request_line().starts_with("GET /healthz "));
    }
}
