use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;

use crate::shared::config::LivenessConfig;
use crate::shared::ports::{LivenessError, LivenessFuture, LivenessPort, LivenessReply};
use crate::shared::utils::digits_only;

pub const NUMVERIFY_DEFAULT_URL: &str = "http://apilayer.net/api/validate";

const SOURCE: &str = "numverify";
const CONFIDENCE_VALID: f64 = 0.7;
const CONFIDENCE_INVALID: f64 = 0.3;

#[derive(Debug, Deserialize)]
struct NumVerifyResponse {
    #[serde(default)]
    success: Option<bool>,
    #[serde(default)]
    error: Option<NumVerifyFault>,
    #[serde(default)]
    valid: bool,
    #[serde(default)]
    line_type: Option<String>,
    #[serde(default)]
    carrier: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NumVerifyFault {
    #[serde(default)]
    code: u16,
    #[serde(default)]
    info: String,
}

/// Backup liveness source: a number counts as reachable when the lookup
/// reports a valid mobile line.
pub struct NumVerifyClient {
    client: Client,
    base_url: String,
    access_key: String,
    timeout: Duration,
}

impl NumVerifyClient {
    pub fn new(
        base_url: impl Into<String>,
        access_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, LivenessError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LivenessError::RequestFailed(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.into(),
            access_key: access_key.into(),
            timeout,
        })
    }

    /// `api_url` defaults to the public endpoint; the key is required.
    pub fn from_config(config: &LivenessConfig) -> Result<Self, LivenessError> {
        let Some(key) = config.api_key.as_ref() else {
            return Err(LivenessError::NotConfigured);
        };
        let url = config
            .api_url
            .clone()
            .unwrap_or_else(|| NUMVERIFY_DEFAULT_URL.to_string());
        Self::new(url, key.clone(), config.timeout)
    }
}

impl LivenessPort for NumVerifyClient {
    fn check(&self, number: String) -> LivenessFuture {
        let client = self.client.clone();
        let base_url = self.base_url.clone();
        let access_key = self.access_key.clone();
        let timeout_ms = self.timeout.as_millis() as u64;
        Box::pin(async move {
            let digits = digits_only(&number);
            if digits.is_empty() {
                return Err(LivenessError::InvalidNumber(number));
            }
            let resp = client
                .get(&base_url)
                .query(&[("access_key", access_key.as_str()), ("number", digits.as_str())])
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
            let parsed: NumVerifyResponse = resp
                .json()
                .await
                .map_err(|e| LivenessError::Decode(e.to_string()))?;
            interpret(parsed)
        })
    }
}

fn interpret(resp: NumVerifyResponse) -> Result<LivenessReply, LivenessError> {
    // The service reports key and quota problems inside a 200 reply.
    if resp.success == Some(false) || resp.error.is_some() {
        let (code, info) = resp
            .error
            .map(|fault| (fault.code, fault.info))
            .unwrap_or((0, String::new()));
        return Err(LivenessError::RequestFailed(format!(
            "numverify error {}: {}",
            code, info
        )));
    }
    let mobile = resp.line_type.as_deref() == Some("mobile");
    if let Some(carrier) = resp.carrier.as_deref().filter(|c| !c.is_empty()) {
        log::debug!("[NumVerifyClient] carrier={} line_type={:?}", carrier, resp.line_type);
    }
    Ok(LivenessReply {
        is_live: resp.valid && mobile,
        confidence: if resp.valid {
            CONFIDENCE_VALID
        } else {
            CONFIDENCE_INVALID
        },
        source: SOURCE.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(body: &str) -> Result<LivenessReply, LivenessError> {
        let resp: NumVerifyResponse = serde_json::from_str(body).expect("json");
        interpret(resp)
    }

    #[test]
    fn only_valid_mobile_lines_count_as_live() {
        let mobile = parse(
            r#"{"valid":true,"number":"212661234567","country_code":"MA","carrier":"Maroc Telecom","line_type":"mobile"}"#,
        )
        .expect("reply");
        assert!(mobile.is_live);
        assert_eq!(mobile.confidence, CONFIDENCE_VALID);
        assert_eq!(mobile.source, "numverify");

        let landline = parse(r#"{"valid":true,"line_type":"landline"}"#).expect("reply");
        assert!(!landline.is_live);
        assert_eq!(landline.confidence, CONFIDENCE_VALID);

        let invalid = parse(r#"{"valid":false,"line_type":null}"#).expect("reply");
        assert!(!invalid.is_live);
        assert_eq!(invalid.confidence, CONFIDENCE_INVALID);
    }

    #[test]
    fn in_band_errors_are_not_answers() {
        let err = parse(
            r#"{"success":false,"error":{"code":101,"type":"invalid_access_key","info":"bad key"}}"#,
        )
        .expect_err("fault");
        assert_eq!(
            err,
            LivenessError::RequestFailed("numverify error 101: bad key".to_string())
        );
    }

    #[test]
    fn key_is_required_and_url_defaults() {
        let missing = NumVerifyClient::from_config(&LivenessConfig::default())
            .err()
            .expect("no key");
        assert_eq!(missing, LivenessError::NotConfigured);

        let config = LivenessConfig {
            api_key: Some("k".to_string()),
            ..LivenessConfig::default()
        };
        let client = NumVerifyClient::from_config(&config).expect("client");
        assert_eq!(client.base_url, NUMVERIFY_DEFAULT_URL);
    }
}
