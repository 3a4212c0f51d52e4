use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use shared::protocol::{RecommendRequest, RecommendResponse};
use tracing::{error, info};

use crate::{
    config::{recommend_endpoint, Settings},
    error::SubmissionError,
};

/// Seam between the submission lifecycle and whatever produces the text.
#[async_trait]
pub trait RecommendationService: Send + Sync {
    /// Returns the raw recommendation text on success.
    async fn recommend(&self, request: &RecommendRequest) -> Result<String, SubmissionError>;
}

pub struct HttpRecommendationService {
    http: Client,
    endpoint: String,
}

impl HttpRecommendationService {
    pub fn new(settings: &Settings) -> anyhow::Result<Self> {
        Self::with_timeout(
            &settings.api_base_url,
            Duration::from_secs(settings.request_timeout_secs),
        )
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build recommendation http client")?;
        Ok(Self {
            http,
            endpoint: recommend_endpoint(base_url),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl RecommendationService for HttpRecommendationService {
    async fn recommend(&self, request: &RecommendRequest) -> Result<String, SubmissionError> {
        let endpoint = self.endpoint.as_str();
        let response = self
            .http
            .post(endpoint)
            .json(request)
            .send()
            .await
            .map_err(|err| {
                error!(%endpoint, error = %err, timeout = err.is_timeout(), "recommendation request failed");
                SubmissionError::Transport(err.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            error!(%endpoint, %status, "recommendation service returned error status");
            return Err(SubmissionError::Service {
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(|err| {
            error!(%endpoint, error = %err, "failed to read recommendation response body");
            SubmissionError::Transport(err.to_string())
        })?;
        let decoded = RecommendResponse::decode(&body).map_err(|err| {
            error!(%endpoint, error = %err, body_len = body.len(), "malformed recommendation response");
            SubmissionError::Decoding(err.to_string())
        })?;

        info!(%endpoint, message_len = decoded.message.len(), "recommendation received");
        Ok(decoded.message)
    }
}

#[cfg(test)]
#[path = "tests/transport_tests.rs"]
mod tests;
