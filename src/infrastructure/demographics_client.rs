//! Client for the public demographics API surfaced at `/api/us-states`.
//!
//! The response is unrelated to the sales data and is forwarded as-is.

use std::time::Duration;

use thiserror::Error;
use tracing::{debug, error};

pub const DEFAULT_DEMOGRAPHICS_URL: &str =
    "https://api.census.gov/data/2018/pep/components?get=GEONAME,BIRTHS,DEATHS&for=state:*";

#[derive(Debug, Error)]
pub enum ExternalApiError {
    #[error("Failed to build HTTP client: {0}")]
    Client(String),

    #[error("{0}")]
    Request(#[from] reqwest::Error),
}

#[derive(Debug, Clone)]
pub struct DemographicsClient {
    http: reqwest::Client,
    url: String,
}

impl DemographicsClient {
    /// `timeout` of `None` keeps reqwest's default (no overall timeout).
    pub fn new(url: impl Into<String>, timeout: Option<Duration>) -> Result<Self, ExternalApiError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| ExternalApiError::Client(e.to_string()))?;

        Ok(Self {
            http,
            url: url.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Single attempt, no retry. Non-2xx statuses are errors.
    pub async fn fetch(&self) -> Result<serde_json::Value, ExternalApiError> {
        debug!("Fetching demographics from {}", self.url);

        let response = self.http.get(&self.url).send().await.map_err(|e| {
            error!("Demographics request failed: {}", e);
            e
        })?;

        let body = response
            .error_for_status()?
            .json::<serde_json::Value>()
            .await?;

        Ok(body)
    }
}
