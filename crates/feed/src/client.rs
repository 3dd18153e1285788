//! Cookie-session HTTP client for the exchange site
//!
//! The site rejects API calls from sessions that never loaded a page, so
//! every attempt visits `home_url` first and lets the cookie jar pick up
//! whatever the site sets.

use async_trait::async_trait;
use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::{Client, Url};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::{FeedError, Result};
use crate::retry::RetryPolicy;
use crate::source::OptionChainSource;

const ACCEPT: &str = "application/json, text/plain, */*";
const ACCEPT_LANGUAGE: &str = "en-US,en;q=0.9";

#[derive(Debug)]
pub struct NseClient {
    client: Client,
    home_url: String,
    chain_url: String,
    index_url: String,
    market_stats_url: String,
    retry: RetryPolicy,
}

impl NseClient {
    pub fn from_config(config: &config::UpstreamConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(header::USER_AGENT, header_value("user-agent", &config.user_agent)?);
        headers.insert(header::REFERER, header_value("referer", &config.referer)?);
        headers.insert(header::ACCEPT, HeaderValue::from_static(ACCEPT));
        headers.insert(header::ACCEPT_LANGUAGE, HeaderValue::from_static(ACCEPT_LANGUAGE));

        let client = Client::builder()
            .cookie_store(true)
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(FeedError::ClientBuild)?;

        let chain_url = Url::parse_with_params(
            &config.option_chain_url,
            &[("symbol", config.symbol.as_str())],
        )
        .map_err(|e| FeedError::Unavailable(format!("option chain url: {e}")))?;

        Ok(Self {
            client,
            home_url: config.home_url.clone(),
            chain_url: chain_url.to_string(),
            index_url: config.index_url.clone(),
            market_stats_url: config.market_stats_url.clone(),
            retry: RetryPolicy::from_config(config),
        })
    }

    pub fn chain_url(&self) -> &str {
        &self.chain_url
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    async fn warm_session(&self) -> Result<()> {
        let response = self
            .client
            .get(&self.home_url)
            .send()
            .await
            .map_err(|e| FeedError::request(&self.home_url, e))?;
        debug!(status = response.status().as_u16(), "Session warm-up");
        Ok(())
    }

    async fn get_json_once(&self, url: &str) -> Result<Value> {
        self.warm_session().await?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FeedError::request(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response.json().await.map_err(|e| FeedError::decode(url, e))
    }

    async fn get_json(&self, url: &str) -> Result<Value> {
        self.retry
            .retry_async(|_| self.get_json_once(url))
            .await
            .map_err(|last| {
                warn!(%url, error = %last, "Upstream fetch exhausted retries");
                FeedError::RetriesExhausted {
                    attempts: self.retry.max_attempts,
                    last_error: last.to_string(),
                }
            })
    }
}

fn header_value(name: &'static str, value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value).map_err(|_| FeedError::InvalidHeader {
        name,
        value: value.to_string(),
    })
}

#[async_trait]
impl OptionChainSource for NseClient {
    async fn fetch_chain(&self) -> Result<Value> {
        self.get_json(&self.chain_url).await
    }

    async fn fetch_index(&self) -> Result<Value> {
        self.get_json(&self.index_url).await
    }

    async fn fetch_market_stats(&self) -> Result<Value> {
        self.get_json(&self.market_stats_url).await
    }

    fn describe(&self) -> String {
        self.home_url.clone()
    }
}
