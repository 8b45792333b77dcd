//! HTTP adapter for the ReasoningGateway port

use super::protocol::{ChatCompletionRequest, ChatCompletionResponse, ErrorEnvelope, Message};
use async_trait::async_trait;
use conclave_application::{CompletionRequest, GatewayError, ReasoningGateway};
use conclave_domain::core::string::excerpt;
use reqwest::Client;
use tracing::debug;

/// Header carrying the tier's compute profile to the reasoning service.
pub const COMPUTE_PROFILE_HEADER: &str = "X-Compute-Profile";
/// Header naming the agent a call is made for.
pub const AGENT_HEADER: &str = "X-Conclave-Agent";

const ERROR_BODY_CHARS: usize = 300;

/// Reasoning gateway speaking the OpenAI-compatible chat completions API.
///
/// Each agent may point at its own endpoint; otherwise `base_url` is used.
/// Timeouts are applied by the caller around each call.
pub struct HttpReasoningGateway {
    client: Client,
    base_url: String,
    require_credential: bool,
}

impl HttpReasoningGateway {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            require_credential: true,
        }
    }

    /// Use a preconfigured client (proxies, TLS roots, pools).
    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    /// Allow unauthenticated calls (local model servers).
    pub fn with_require_credential(mut self, require: bool) -> Self {
        self.require_credential = require;
        self
    }

    fn completions_url(&self, request: &CompletionRequest) -> String {
        let base = request.config.endpoint.as_deref().unwrap_or(&self.base_url);
        format!("{}/chat/completions", base.trim_end_matches('/'))
    }

    fn body(request: &CompletionRequest) -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: request.config.model.clone(),
            messages: vec![
                Message::system(request.system_prompt.clone()),
                Message::user(request.prompt.clone()),
            ],
            temperature: request.config.temperature,
            max_tokens: request.config.max_tokens,
        }
    }
}

fn transport_error(e: reqwest::Error) -> GatewayError {
    if e.is_timeout() {
        GatewayError::Timeout
    } else if e.is_connect() {
        GatewayError::ConnectionError(e.to_string())
    } else {
        GatewayError::Other(e.to_string())
    }
}

/// Readable reason from a non-2xx body.
fn error_message(body: &str) -> String {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => envelope.error.message,
        Err(_) => excerpt(body.trim(), ERROR_BODY_CHARS).to_string(),
    }
}

/// Extracts the answer from a 2xx body.
fn parse_completion(body: &str) -> Result<String, GatewayError> {
    let response: ChatCompletionResponse = serde_json::from_str(body)
        .map_err(|e| GatewayError::InvalidResponse(format!("malformed body: {}", e)))?;
    response
        .into_content()
        .ok_or_else(|| GatewayError::InvalidResponse("no choices in response".to_string()))
}

#[async_trait]
impl ReasoningGateway for HttpReasoningGateway {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, GatewayError> {
        if self.require_credential && request.config.credential.is_none() {
            return Err(GatewayError::MissingCredential(format!(
                "no API key for agent {}",
                request.agent_id
            )));
        }

        let url = self.completions_url(request);
        debug!(agent = %request.agent_id, model = %request.config.model, %url, "Sending completion request");

        let mut builder = self
            .client
            .post(&url)
            .header(AGENT_HEADER, request.agent_id.as_str())
            .json(&Self::body(request));
        if let Some(key) = &request.config.credential {
            builder = builder.bearer_auth(key);
        }
        if let Some(profile) = &request.compute_profile {
            builder = builder.header(COMPUTE_PROFILE_HEADER, profile.as_str());
        }

        let response = builder.send().await.map_err(transport_error)?;
        let status = response.status();
        let body = response.text().await.map_err(transport_error)?;

        if !status.is_success() {
            return Err(GatewayError::RequestFailed {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }

        parse_completion(&body)
    }
}
