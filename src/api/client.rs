//! HTTP client for the survey API.
//!
//! Every endpoint wraps its payload as `{ "data": ... }`. The client only
//! unwraps that envelope; checking the shape of `data` is left to
//! `analysis::validate`.

use crate::config::{ApiConfig, QuestionsConfig};
use crate::error::FetchError;
use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// Source of raw survey payloads.
///
/// Implemented over HTTP by [`SurveyClient`]; tests substitute an
/// in-memory source.
#[allow(async_fn_in_trait)]
pub trait SurveySource {
    /// Answers to one question, by question index.
    async fn answers(&self, question: u32) -> Result<Value, FetchError>;

    /// Pre-aggregated multi-choice tally.
    async fn answer_tally(&self) -> Result<Value, FetchError>;

    /// The list of question metadata objects.
    async fn questions(&self) -> Result<Value, FetchError>;
}

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    data: Value,
}

/// reqwest-backed survey API client.
pub struct SurveyClient {
    http_client: reqwest::Client,
    base_url: String,
    answer_tally_path: String,
    timeout_seconds: u64,
}

impl SurveyClient {
    pub fn new(api: &ApiConfig, questions: &QuestionsConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(api.timeout_seconds))
            .user_agent(concat!("survey-insights/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            http_client,
            base_url: api.base_url.trim_end_matches('/').to_string(),
            answer_tally_path: questions.answer_tally_path.trim_matches('/').to_string(),
            timeout_seconds: api.timeout_seconds,
        })
    }

    /// Full URL for an API path.
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// GET `path` and return the `data` member of the response.
    ///
    /// A response without `data` yields `Value::Null`.
    async fn get_data(&self, path: &str) -> Result<Value, FetchError> {
        let url = self.url(path);
        debug!("GET {}", url);

        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .map_err(|e| FetchError::from_send(&url, self.timeout_seconds, e))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::Status { url, status, body });
        }

        let envelope: Envelope = response
            .json()
            .await
            .map_err(|source| FetchError::Decode {
                url: url.clone(),
                source,
            })?;

        debug!("GET {} done", url);
        Ok(envelope.data)
    }
}

impl SurveySource for SurveyClient {
    async fn answers(&self, question: u32) -> Result<Value, FetchError> {
        self.get_data(&format!("answers/{}", question)).await
    }

    async fn answer_tally(&self) -> Result<Value, FetchError> {
        self.get_data(&self.answer_tally_path).await
    }

    async fn questions(&self) -> Result<Value, FetchError> {
        self.get_data("questions").await
    }
}
