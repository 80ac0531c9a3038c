//! Proxy for the "top agents" recommendation service.

use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use serde_json::Value;
use tracing::{debug, warn};

use super::cache::TtlCache;
use super::retry::{with_retry, RetryPolicy};
use super::PriceError;

#[derive(Debug, thiserror::Error)]
pub enum TopAgentsError {
    #[error("top agents service is not configured")]
    NotConfigured,

    #[error(transparent)]
    Upstream(#[from] PriceError),
}

pub struct TopAgentsService {
    client: Client,
    url: Option<String>,
    cache: TtlCache<Value>,
    retry: RetryPolicy,
}

impl TopAgentsService {
    pub fn new(url: Option<String>, ttl: Duration, retry: RetryPolicy) -> Result<Self, PriceError> {
        let client = Client::builder().timeout(Duration::from_secs(10)).build()?;
        Ok(Self {
            client,
            url,
            cache: TtlCache::new(ttl),
            retry,
        })
    }

    pub async fn top_agents(&self) -> Result<Value, TopAgentsError> {
        self.top_agents_at(Utc::now()).await
    }

    /// Cached passthrough of the upstream JSON. A failed refresh serves the
    /// last known value, however old.
    pub async fn top_agents_at(&self, now: DateTime<Utc>) -> Result<Value, TopAgentsError> {
        let url = self.url.as_deref().ok_or(TopAgentsError::NotConfigured)?;

        if let Some(entry) = self.cache.fresh(now).await {
            debug!("top agents cache hit");
            return Ok(entry.value);
        }

        let client = &self.client;
        match with_retry(&self.retry, "top agents fetch", move || fetch_json(client, url)).await {
            Ok(value) => {
                self.cache.replace(value.clone(), now).await;
                Ok(value)
            }
            Err(err) => match self.cache.latest().await {
                Some(stale) => {
                    warn!("serving stale top agents from {}: {}", stale.fetched_at, err);
                    Ok(stale.value)
                }
                None => Err(err.into()),
            },
        }
    }
}

async fn fetch_json(client: &Client, url: &str) -> Result<Value, PriceError> {
    let response = client.get(url).send().await?;
    let status = response.status();
    if status == StatusCode::TOO_MANY_REQUESTS {
        return Err(PriceError::RateLimited);
    }
    if !status.is_success() {
        return Err(PriceError::Status(status.as_u16()));
    }
    Ok(response.json().await?)
}
