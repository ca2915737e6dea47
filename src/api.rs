//! ChainStreamer backend HTTP API client

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;
use crate::session::WalletSession;

pub const DEFAULT_USER_AGENT: &str = concat!("ChainStreamerHub/", env!("CARGO_PKG_VERSION"));

/// Blocking JSON POST, shared by the backend client and the Sui RPC client
pub trait HttpTransport: Send + Sync {
    fn post_json(&self, url: &str, body: &str) -> Result<String>;
}

pub struct UreqTransport {
    agent: ureq::Agent,
    user_agent: String,
}

impl UreqTransport {
    pub fn new(timeout: Duration) -> Self {
        let agent = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .build()
            .new_agent();
        Self {
            agent,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl HttpTransport for UreqTransport {
    fn post_json(&self, url: &str, body: &str) -> Result<String> {
        let mut response = self
            .agent
            .post(url)
            .header("Accept", "application/json")
            .header("Content-Type", "application/json")
            .header("User-Agent", &self.user_agent)
            .send(body)?;
        Ok(response.body_mut().read_to_string()?)
    }
}

/// Body of `POST /api/create_live_stream`
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CreateStreamRequest {
    pub url: String,
    pub name: String,
    pub description: String,
}

impl CreateStreamRequest {
    pub fn is_complete(&self) -> bool {
        !self.url.trim().is_empty() && !self.name.trim().is_empty() && !self.description.trim().is_empty()
    }
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    #[serde(default)]
    data: Value,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RegistrationOutcome {
    Created,
    /// Backend answered with something other than "OK"
    Rejected(String),
}

pub struct BackendClient {
    url_prefix: String,
    transport: Arc<dyn HttpTransport>,
}

impl BackendClient {
    pub fn new(url_prefix: &str, transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            url_prefix: url_prefix.trim_end_matches('/').to_string(),
            transport,
        }
    }

    pub fn url_prefix(&self) -> &str {
        &self.url_prefix
    }

    /// Register a new live stream. Fails before any request without a wallet.
    pub fn create_live_stream(
        &self,
        session: &WalletSession,
        request: &CreateStreamRequest,
    ) -> Result<RegistrationOutcome> {
        session.require_account()?;

        let url = format!("{}/api/create_live_stream", self.url_prefix);
        let body = serde_json::to_string(request)?;
        let response = self.transport.post_json(&url, &body)?;
        let parsed: ApiResponse = serde_json::from_str(&response)?;

        Ok(match parsed.data {
            Value::String(s) if s == "OK" => RegistrationOutcome::Created,
            Value::String(s) => RegistrationOutcome::Rejected(s),
            other => RegistrationOutcome::Rejected(other.to_string()),
        })
    }
}

pub fn live_m3u8_url(prefix: &str, stream_name: &str) -> String {
    format!(
        "{}/api/query_live_m3u8?stream_name={}",
        prefix.trim_end_matches('/'),
        stream_name
    )
}

pub fn vod_m3u8_url(prefix: &str, stream_index: &str) -> String {
    format!(
        "{}/api/query_vod_m3u8?stream_index={}",
        prefix.trim_end_matches('/'),
        stream_index
    )
}
