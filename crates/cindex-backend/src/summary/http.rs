//! LLM-backed summary provider, calling a chat-completions-compatible HTTP
//! endpoint (spec §6 `CINDEX_SUMMARY_METHOD=llm`, the default).

use std::time::Duration;

use async_trait::async_trait;
use cindex_config::{BackendConfig, SummaryConfig};
use serde::{Deserialize, Serialize};

use super::traits::SummaryProvider;
use crate::{BackendError, BackendResult};

const PROMPT_PREFIX: &str = "Summarize the purpose of this source file in one or two sentences:\n\n";

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: String,
}

/// Summarizes files by calling an external LLM chat-completions endpoint.
pub struct HttpSummaryProvider {
    client: reqwest::Client,
    backend: BackendConfig,
    model: String,
}

impl HttpSummaryProvider {
    /// # Errors
    /// Returns [`BackendError::Config`] if the HTTP client cannot be built.
    pub fn new(backend: BackendConfig, summary: &SummaryConfig) -> BackendResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(backend.timeout_secs))
            .build()
            .map_err(BackendError::Request)?;
        Ok(Self {
            client,
            backend,
            model: summary.model.clone(),
        })
    }
}

#[async_trait]
impl SummaryProvider for HttpSummaryProvider {
    async fn summarize(&self, file_path: &str, content: &str) -> BackendResult<String> {
        let url = format!("{}/v1/chat/completions", self.backend.host.trim_end_matches('/'));
        let prompt = format!("{PROMPT_PREFIX}File: {file_path}\n\n{content}");
        let body = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
        };

        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.client.post(&url).json(&body).send().await {
                Ok(response) if response.status().is_success() => {
                    let parsed: ChatResponse = response.json().await?;
                    let summary = parsed
                        .choices
                        .into_iter()
                        .next()
                        .map(|c| c.message.content)
                        .ok_or_else(|| BackendError::Response {
                            message: "summary backend returned no choices".to_string(),
                        })?;
                    return Ok(summary.trim().to_string());
                }
                Ok(response) if attempt >= self.backend.retry_count || !response.status().is_server_error() => {
                    return Err(BackendError::Response {
                        message: format!("summary backend responded with {}", response.status()),
                    });
                }
                Err(err) if attempt >= self.backend.retry_count => return Err(BackendError::Request(err)),
                _ => {}
            }
            let delay = self.backend.retry_base_delay_ms.saturating_mul(2u64.pow(attempt - 1));
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }
    }

    fn method_name(&self) -> &'static str {
        "llm"
    }
}
