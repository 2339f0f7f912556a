use std::time::Duration;

use engine_logging::engine_debug;
use futures_util::StreamExt;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use url::Url;

use crate::{FailureKind, SchedulerStats, SourceError};

const STATS_ENDPOINT: &str = "/api/schedule/stats";
const SUCCESS_STATUS: &str = "success";

#[derive(Debug, Clone)]
pub struct SourceSettings {
    pub base_url: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub max_bytes: u64,
}

impl Default for SourceSettings {
    fn default() -> Self {
        Self {
            base_url: "https://localhost:8080".to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            max_bytes: 5 * 1024 * 1024,
        }
    }
}

/// Offset-paginated job-tracking API.
#[async_trait::async_trait]
pub trait PageSource: Send + Sync {
    /// Raw content of one page. An empty page signals the end of the feed.
    async fn fetch_page(
        &self,
        endpoint: &str,
        offset: usize,
        limit: usize,
    ) -> Result<Value, SourceError>;

    async fn fetch_stats(&self) -> Result<SchedulerStats, SourceError>;
}

#[derive(Debug, Deserialize)]
struct Envelope {
    status: String,
    /// `None` when the key is absent, `Some(Value::Null)` for an explicit null.
    #[serde(default, deserialize_with = "present")]
    content: Option<Value>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ReqwestSource {
    settings: SourceSettings,
    base: Url,
    client: reqwest::Client,
}

impl ReqwestSource {
    pub fn new(settings: SourceSettings) -> Result<Self, SourceError> {
        let base = Url::parse(&settings.base_url)
            .map_err(|err| SourceError::new(FailureKind::InvalidUrl, err.to_string()))?;
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| SourceError::new(FailureKind::Network, err.to_string()))?;
        Ok(Self {
            settings,
            base,
            client,
        })
    }

    fn endpoint_url(&self, endpoint: &str) -> Result<Url, SourceError> {
        self.base
            .join(endpoint)
            .map_err(|err| SourceError::new(FailureKind::InvalidUrl, err.to_string()))
    }

    /// Performs a GET and unwraps the `{status, content, message}` envelope.
    async fn get_content(&self, url: Url) -> Result<Value, SourceError> {
        engine_debug!("GET {}", url);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }

        if let Some(content_len) = response.content_length() {
            if content_len > self.settings.max_bytes {
                return Err(too_large(self.settings.max_bytes, content_len));
            }
        }

        let mut body = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            let next_len = body.len() as u64 + chunk.len() as u64;
            if next_len > self.settings.max_bytes {
                return Err(too_large(self.settings.max_bytes, next_len));
            }
            body.extend_from_slice(&chunk);
        }

        let envelope: Envelope = serde_json::from_slice(&body)
            .map_err(|err| SourceError::new(FailureKind::Decode, err.to_string()))?;
        if envelope.status != SUCCESS_STATUS {
            return Err(SourceError::new(
                FailureKind::Api {
                    status: envelope.status,
                },
                envelope.message.unwrap_or_default(),
            ));
        }
        match envelope.content {
            None => {
                engine_debug!("success envelope without content; treating as an empty page");
                Ok(Value::Array(Vec::new()))
            }
            Some(Value::Null) => Err(SourceError::new(
                FailureKind::MissingContent,
                "success envelope with null content",
            )),
            Some(content) => Ok(content),
        }
    }
}

#[async_trait::async_trait]
impl PageSource for ReqwestSource {
    async fn fetch_page(
        &self,
        endpoint: &str,
        offset: usize,
        limit: usize,
    ) -> Result<Value, SourceError> {
        let mut url = self.endpoint_url(endpoint)?;
        url.query_pairs_mut()
            .append_pair("index", &offset.to_string())
            .append_pair("limit", &limit.to_string());
        self.get_content(url).await
    }

    async fn fetch_stats(&self) -> Result<SchedulerStats, SourceError> {
        let url = self.endpoint_url(STATS_ENDPOINT)?;
        let content = self.get_content(url).await?;
        serde_json::from_value(content)
            .map_err(|err| SourceError::new(FailureKind::Decode, err.to_string()))
    }
}

fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

fn too_large(max_bytes: u64, actual: u64) -> SourceError {
    SourceError::new(
        FailureKind::TooLarge {
            max_bytes,
            actual: Some(actual),
        },
        "response too large",
    )
}

fn map_reqwest_error(err: reqwest::Error) -> SourceError {
    if err.is_timeout() {
        return SourceError::new(FailureKind::Timeout, err.to_string());
    }
    SourceError::new(FailureKind::Network, err.to_string())
}
