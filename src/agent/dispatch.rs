use async_trait::async_trait;
use log::{debug, warn};
use reqwest::Client;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};

use super::error::DispatchError;
use super::model::ReturnType;
use super::payload::Envelope;

/// A 2xx webhook reply, reduced to what the normalizer needs.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WebhookResponse {
    pub status: u16,
    pub content_type: Option<String>,
    /// Left empty when the agent's return type is `none`.
    pub body: Vec<u8>,
}

/// Issues one POST per envelope. Owns no per-card state.
#[async_trait]
pub trait Dispatcher: Send + Sync {
    async fn dispatch(
        &self,
        webhook_url: &str,
        envelope: &Envelope,
    ) -> Result<WebhookResponse, DispatchError>;
}

/// `reqwest` backed dispatcher. No timeout, retry or cancellation is applied.
#[derive(Clone, Default)]
pub struct HttpDispatcher {
    client: Client,
}

impl HttpDispatcher {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Dispatcher for HttpDispatcher {
    async fn dispatch(
        &self,
        webhook_url: &str,
        envelope: &Envelope,
    ) -> Result<WebhookResponse, DispatchError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        debug!(
            "POST {} for agent {} ({})",
            webhook_url, envelope.agent_name, envelope.trigger_type
        );
        let response = self
            .client
            .post(webhook_url)
            .headers(headers)
            .json(envelope)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            warn!("Webhook {} answered {}", webhook_url, status);
            return Err(DispatchError::Http {
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or_default().to_string(),
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);

        let body = if envelope.return_type == ReturnType::None {
            Vec::new()
        } else {
            response.bytes().await?.to_vec()
        };

        Ok(WebhookResponse {
            status: status.as_u16(),
            content_type,
            body,
        })
    }
}
