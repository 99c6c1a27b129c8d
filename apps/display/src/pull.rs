//! Pull fallback: fetches the latest stored result over HTTP.

use std::time::Duration;

use async_trait::async_trait;
use kioskfeed_core::AnalysisResult;
use reqwest::StatusCode;

use crate::error::{DisplayError, Result};

/// Source of "the latest result", polled while the push channel is down.
#[async_trait]
pub trait PullSource: Send + Sync {
    /// `Ok(None)` when the server holds no result yet.
    async fn fetch_latest(&self) -> Result<Option<AnalysisResult>>;
}

pub struct PullClient {
    client: reqwest::Client,
    latest_url: String,
}

impl PullClient {
    pub fn new(latest_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            latest_url: latest_url.into(),
        })
    }
}

#[async_trait]
impl PullSource for PullClient {
    async fn fetch_latest(&self) -> Result<Option<AnalysisResult>> {
        let response = self.client.get(&self.latest_url).send().await?;
        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => {
                let bytes = response.bytes().await?;
                Ok(Some(serde_json::from_slice(&bytes)?))
            }
            status => Err(DisplayError::UnexpectedStatus(status.as_u16())),
        }
    }
}
