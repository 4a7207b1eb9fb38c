use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;

use crate::shared::config::LivenessConfig;
use crate::shared::ports::{LivenessError, LivenessFuture, LivenessPort, LivenessReply};
use crate::shared::utils::digits_only;

const SOURCE: &str = "wa-validator";
const USER_AGENT: &str = concat!("call-gateway-core/", env!("CARGO_PKG_VERSION"));

const CONFIDENCE_LIVE: f64 = 0.95;
const CONFIDENCE_NOT_LIVE: f64 = 0.90;
const CONFIDENCE_AMBIGUOUS: f64 = 0.5;

#[derive(Debug, Deserialize)]
struct ValidatorResponse {
    #[serde(default)]
    status: bool,
    #[serde(default)]
    valid: bool,
    #[serde(default)]
    wa_id: Option<String>,
    #[serde(default)]
    chat_link: Option<String>,
}

/// Messaging-channel reachability check over an authenticated HTTP API.
pub struct LivenessHttpClient {
    client: Client,
    base_url: String,
    api_key: String,
    timeout: Duration,
}

impl LivenessHttpClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, LivenessError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| LivenessError::RequestFailed(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.into(),
            api_key: api_key.into(),
            timeout,
        })
    }

    pub fn from_config(config: &LivenessConfig) -> Result<Self, LivenessError> {
        match (config.api_url.as_ref(), config.api_key.as_ref()) {
            (Some(url), Some(key)) => Self::new(url.clone(), key.clone(), config.timeout),
            _ => Err(LivenessError::NotConfigured),
        }
    }
}

impl LivenessPort for LivenessHttpClient {
    fn check(&self, number: String) -> LivenessFuture {
        let client = self.client.clone();
        let base_url = self.base_url.clone();
        let api_key = self.api_key.clone();
        let timeout_ms = self.timeout.as_millis() as u64;
        Box::pin(async move {
            let digits = digits_only(&number);
            if digits.is_empty() {
                return Err(LivenessError::InvalidNumber(number));
            }
            let resp = client
                .get(&base_url)
                .query(&[("number", digits.as_str())])
                .bearer_auth(api_key)
                .send()
                .await
                .map_err(|e| {
                    if e.is_timeout() {
                        LivenessError::Timeout(timeout_ms)
                    } else {
                        LivenessError::RequestFailed(e.to_string())
                    }
                })?;

            let status = resp.status();
            if !status.is_success() {
                let body = resp.text().await.unwrap_or_default();
                return Err(LivenessError::BadStatus {
                    status: status.as_u16(),
                    body,
                });
            }
            let parsed: ValidatorResponse = resp
                .json()
                .await
                .map_err(|e| LivenessError::Decode(e.to_string()))?;
            Ok(interpret(&parsed))
        })
    }
}

fn interpret(resp: &ValidatorResponse) -> LivenessReply {
    let has_account = resp
        .wa_id
        .as_deref()
        .map(|id| !id.trim().is_empty())
        .unwrap_or(false);
    let (is_live, confidence) = match (resp.status, resp.valid) {
        (true, true) if has_account => (true, CONFIDENCE_LIVE),
        (true, false) => (false, CONFIDENCE_NOT_LIVE),
        _ => (false, CONFIDENCE_AMBIGUOUS),
    };
    if let Some(link) = resp.chat_link.as_deref() {
        log::debug!("[LivenessHttpClient] chat_link present len={}", link.len());
    }
    LivenessReply {
        is_live,
        confidence,
        source: SOURCE.to_string(),
    }
}
