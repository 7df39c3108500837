//! Terra-backed health source
//!
//! Talks to the aggregator's REST API: exchange the developer credentials for
//! an auth token, then pull per-range payloads. Payload bodies are passed
//! through as opaque JSON.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::Value;
use url::Url;

use crate::error::{FlowError, Result};

use super::HealthSource;

/// Production aggregator endpoint
pub const DEFAULT_TERRA_URL: &str = "https://api.tryterra.co";

#[derive(Debug, Deserialize)]
struct AuthResponse {
    #[allow(dead_code)]
    status: String,
    token: String,
}

/// REST client for the Terra health aggregator
pub struct TerraClient {
    http: reqwest::Client,
    base: Url,
    api_key: String,
    dev_id: String,
    token: Option<String>,
}

impl TerraClient {
    pub fn new(api_key: impl Into<String>, dev_id: impl Into<String>) -> Self {
        Self::with_base(
            Url::parse(DEFAULT_TERRA_URL).expect("default aggregator URL is valid"),
            api_key,
            dev_id,
        )
    }

    /// Point at a different aggregator host (used by tests)
    pub fn with_base(base: Url, api_key: impl Into<String>, dev_id: impl Into<String>) -> Self {
        let http = reqwest::Client::builder()
            .user_agent(concat!("flowstate/", env!("CARGO_PKG_VERSION")))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            http,
            base,
            api_key: api_key.into(),
            dev_id: dev_id.into(),
            token: None,
        }
    }

    async fn fetch_auth_token(&self) -> Result<String> {
        let url = self
            .base
            .join("/v2/auth/generateAuthToken")
            .map_err(|e| FlowError::HealthSource {
                reason: e.to_string(),
            })?;

        let response = self
            .http
            .post(url)
            .header("x-api-key", &self.api_key)
            .header("dev-id", &self.dev_id)
            .send()
            .await
            .map_err(|e| FlowError::HealthSource {
                reason: format!("auth token request failed: {}", e),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FlowError::HealthSource {
                reason: format!("auth token request returned status {}", status.as_u16()),
            });
        }

        let auth: AuthResponse = response.json().await.map_err(|e| FlowError::HealthSource {
            reason: format!("auth token response malformed: {}", e),
        })?;

        Ok(auth.token)
    }

    async fn fetch_range(&self, kind: &str, start: NaiveDate, end: NaiveDate) -> Result<Value> {
        let token = self.token.as_ref().ok_or(FlowError::NotConnected)?;

        let mut url = self
            .base
            .join(&format!("/v2/{}", kind))
            .map_err(|e| FlowError::HealthSource {
                reason: e.to_string(),
            })?;
        url.query_pairs_mut()
            .append_pair("start_date", &start.to_string())
            .append_pair("end_date", &end.to_string());

        tracing::debug!(kind, %start, %end, "Fetching health payload");

        let response = self
            .http
            .get(url)
            .header("x-api-key", &self.api_key)
            .header("dev-id", &self.dev_id)
            .header("Authorization", format!("Bearer {}", token))
            .send()
            .await
            .map_err(|e| FlowError::HealthSource {
                reason: format!("{} request failed: {}", kind, e),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FlowError::HealthSource {
                reason: format!("{} request returned status {}", kind, status.as_u16()),
            });
        }

        response.json().await.map_err(|e| FlowError::HealthSource {
            reason: format!("{} payload malformed: {}", kind, e),
        })
    }
}

#[async_trait]
impl HealthSource for TerraClient {
    fn name(&self) -> &str {
        "terra"
    }

    fn is_connected(&self) -> bool {
        self.token.is_some()
    }

    async fn init_connection(&mut self) -> Result<()> {
        let token = self.fetch_auth_token().await?;
        self.token = Some(token);
        tracing::debug!("Health aggregator connected");
        Ok(())
    }

    async fn get_activity(&self, start: NaiveDate, end: NaiveDate) -> Result<Value> {
        self.fetch_range("activity", start, end).await
    }

    async fn get_daily(&self, start: NaiveDate, end: NaiveDate) -> Result<Value> {
        self.fetch_range("daily", start, end).await
    }

    async fn get_sleep(&self, start: NaiveDate, end: NaiveDate) -> Result<Value> {
        self.fetch_range("sleep", start, end).await
    }
}
