use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::shared::config::ClassifierConfig;
use crate::shared::ports::{ScorerError, ScorerFuture, ScorerPort};

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
    stream: bool,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    message: ChatReply,
}

#[derive(Deserialize)]
struct ChatReply {
    content: String,
}

/// Chat-completion scorer speaking the Ollama `/api/chat` protocol.
pub struct ScorerHttpClient {
    client: Client,
    url: String,
    model: String,
}

impl ScorerHttpClient {
    pub fn new(
        url: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ScorerError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ScorerError::RequestFailed(e.to_string()))?;
        Ok(Self {
            client,
            url: url.into(),
            model: model.into(),
        })
    }

    pub fn from_config(config: &ClassifierConfig) -> Result<Self, ScorerError> {
        Self::new(
            config.scorer_url.clone(),
            config.scorer_model.clone(),
            config.scorer_timeout,
        )
    }
}

impl ScorerPort for ScorerHttpClient {
    fn score(&self, prompt: String) -> ScorerFuture {
        let client = self.client.clone();
        let url = self.url.clone();
        let model = self.model.clone();
        Box::pin(async move {
            let request = ChatRequest {
                model: &model,
                messages: [ChatMessage {
                    role: "user",
                    content: &prompt,
                }],
                stream: false,
            };
            let resp = client
                .post(&url)
                .json(&request)
                .send()
                .await
                .map_err(|e| ScorerError::RequestFailed(e.to_string()))?;

            let status = resp.status();
            if !status.is_success() {
                let body = resp.text().await.unwrap_or_default();
                return Err(ScorerError::BadStatus {
                    status: status.as_u16(),
                    body,
                });
            }
            let parsed: ChatResponse = resp
                .json()
                .await
                .map_err(|e| ScorerError::Unparseable(e.to_string()))?;
            Ok(parsed.message.content)
        })
    }
}
