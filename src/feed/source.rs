use crate::{
    constants::{FEED_REQUEST_TIMEOUT_MS, USER_AGENT},
    core::config::DashboardConfig,
    feed::model::RawStrike,
    Result, StormError,
};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use std::time::Duration;

/// Shared async HTTP client for every backend endpoint
pub(crate) static HTTP_CLIENT: Lazy<reqwest::Client> = Lazy::new(|| {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .tcp_keepalive(Duration::from_secs(30))
        .pool_idle_timeout(Duration::from_secs(90))
        .build()
        .expect("failed to build reqwest async client")
});

/// Issues a GET and decodes a JSON body, turning non-2xx statuses into
/// `StormError::Http`.
pub(crate) async fn get_json<T: serde::de::DeserializeOwned>(
    request: reqwest::RequestBuilder,
    endpoint: &str,
) -> Result<T> {
    let response = request.send().await.map_err(StormError::from)?;
    let status = response.status();
    if !status.is_success() {
        return Err(StormError::Http {
            status: status.as_u16(),
            endpoint: endpoint.to_string(),
        }
        .into());
    }
    let body = response.json::<T>().await.map_err(StormError::from)?;
    Ok(body)
}

/// Where strike snapshots come from
#[async_trait]
pub trait StrikeSource: Send + Sync {
    /// Fetches the current strike set. Always a live request; never cached.
    async fn fetch_strikes(&self) -> Result<Vec<RawStrike>>;
}

/// `GET {base}/api/lightning`
#[derive(Debug, Clone)]
pub struct HttpStrikeSource {
    endpoint: String,
    timeout: Duration,
}

impl HttpStrikeSource {
    pub fn new(base_url: &str) -> Self {
        Self {
            endpoint: format!("{}/api/lightning", base_url.trim_end_matches('/')),
            timeout: Duration::from_millis(FEED_REQUEST_TIMEOUT_MS),
        }
    }

    pub fn from_config(config: &DashboardConfig) -> Self {
        Self::new(config.api_base()).with_timeout(config.feed.request_timeout())
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl StrikeSource for HttpStrikeSource {
    async fn fetch_strikes(&self) -> Result<Vec<RawStrike>> {
        log::debug!("fetching strikes from {}", self.endpoint);
        let request = HTTP_CLIENT.get(&self.endpoint).timeout(self.timeout);
        get_json(request, &self.endpoint).await
    }
}
