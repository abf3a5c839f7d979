//! HuggingFace inference API HTTP client.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use tracing::{debug, warn};

use crate::error::{HfError, HfResult};

/// Fixed confidence score for images produced by the remote path.
pub const REMOTE_CONFIDENCE: f64 = 0.92;

const DEFAULT_API_URL: &str = "https://api-inference.huggingface.co/models/";

/// Configuration for the inference client.
#[derive(Debug, Clone)]
pub struct HfConfig {
    /// Base URL, model id is appended
    pub api_url: String,
    /// Bearer credential; `None` disables the client entirely
    pub api_key: Option<String>,
    /// Per-request timeout
    pub timeout: Duration,
    /// Total attempts per enhancement call
    pub max_attempts: u32,
    /// Wait before retrying a 503 (model loading)
    pub model_loading_delay: Duration,
    /// Wait before retrying a transport error
    pub transient_delay: Duration,
}

impl Default for HfConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            api_key: None,
            timeout: Duration::from_secs(60),
            max_attempts: 3,
            model_loading_delay: Duration::from_secs(10),
            transient_delay: Duration::from_secs(5),
        }
    }
}

impl HfConfig {
    /// Create config from environment variables. An unset or empty
    /// `HUGGINGFACE_API_KEY` leaves the client disabled.
    pub fn from_env() -> Self {
        let api_key = std::env::var("HUGGINGFACE_API_KEY")
            .ok()
            .filter(|k| !k.is_empty());

        Self {
            api_url: std::env::var("HUGGINGFACE_API_URL")
                .unwrap_or_else(|_| DEFAULT_API_URL.to_string()),
            api_key,
            timeout: Duration::from_secs(
                std::env::var("HUGGINGFACE_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(60),
            ),
            ..Self::default()
        }
    }
}

/// Client for hosted enhancement models.
pub struct HfClient {
    http: Client,
    config: HfConfig,
}

impl HfClient {
    /// Create a new client.
    pub fn new(config: HfConfig) -> HfResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("frec-hf-client/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(HfError::Network)?;

        Ok(Self { http, config })
    }

    /// Create from environment variables.
    pub fn from_env() -> HfResult<Self> {
        Self::new(HfConfig::from_env())
    }

    /// Whether a credential is configured. When false every enhancement
    /// resolves via the local fallback and `/api/health` reports the API
    /// as disabled.
    pub fn is_enabled(&self) -> bool {
        self.config.api_key.is_some()
    }

    /// Submit image bytes to the given model and return the enhanced
    /// image bytes.
    ///
    /// Retry policy: up to `max_attempts` tries. A 503 waits
    /// `model_loading_delay` and retries; any other non-200 aborts
    /// immediately; a transport error waits `transient_delay` and retries.
    pub async fn enhance(&self, model: &str, image: &[u8]) -> HfResult<Vec<u8>> {
        let Some(api_key) = &self.config.api_key else {
            return Err(HfError::Disabled);
        };

        let url = format!("{}{}", self.config.api_url, model);
        let mut last_error = None;

        for attempt in 1..=self.config.max_attempts {
            let send = self
                .http
                .post(&url)
                .bearer_auth(api_key)
                .body(image.to_vec())
                .send()
                .await;

            match send {
                Ok(response) => match response.status() {
                    StatusCode::OK => {
                        let bytes = response.bytes().await?;
                        debug!(model, attempt, "Remote enhancement succeeded");
                        return Ok(bytes.to_vec());
                    }
                    StatusCode::SERVICE_UNAVAILABLE => {
                        warn!(
                            model,
                            attempt,
                            max = self.config.max_attempts,
                            "Model loading, will retry"
                        );
                        last_error = Some(HfError::ModelLoading {
                            attempts: attempt,
                        });
                        if attempt < self.config.max_attempts {
                            tokio::time::sleep(self.config.model_loading_delay).await;
                        }
                    }
                    status => {
                        let body = response.text().await.unwrap_or_default();
                        warn!(model, %status, "Inference API error, not retrying");
                        return Err(HfError::Upstream {
                            status: status.as_u16(),
                            body,
                        });
                    }
                },
                Err(e) => {
                    warn!(model, attempt, "Request error: {}", e);
                    last_error = Some(HfError::Network(e));
                    if attempt < self.config.max_attempts {
                        tokio::time::sleep(self.config.transient_delay).await;
                    }
                }
            }
        }

        Err(last_error.unwrap_or(HfError::ModelLoading {
            attempts: self.config.max_attempts,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config(url: &str, key: Option<&str>) -> HfConfig {
        HfConfig {
            api_url: format!("{}/models/", url),
            api_key: key.map(String::from),
            timeout: Duration::from_secs(5),
            max_attempts: 3,
            model_loading_delay: Duration::from_millis(10),
            transient_delay: Duration::from_millis(10),
        }
    }

    #[test]
    fn config_defaults() {
        let config = HfConfig::default();
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.max_attempts, 3);
        assert!(config.api_key.is_none());
    }

    #[tokio::test]
    async fn disabled_client_fails_without_io() {
        let client = HfClient::new(test_config("http://127.0.0.1:1", None)).unwrap();
        assert!(!client.is_enabled());
        assert!(matches!(
            client.enhance("some/model", b"img").await,
            Err(HfError::Disabled)
        ));
    }

    #[tokio::test]
    async fn retries_model_loading_then_succeeds() {
        use wiremock::matchers::{method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/models/acme/restorer"))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(2)
            .expect(2)
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/models/acme/restorer"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"enhanced".to_vec()))
            .expect(1)
            .mount(&server)
            .await;

        let client = HfClient::new(test_config(&server.uri(), Some("token"))).unwrap();
        let bytes = client.enhance("acme/restorer", b"img").await.unwrap();
        assert_eq!(bytes, b"enhanced");
    }

    #[tokio::test]
    async fn aborts_on_non_retryable_status() {
        use wiremock::matchers::method;
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_string("bad input"))
            .expect(1)
            .mount(&server)
            .await;

        let client = HfClient::new(test_config(&server.uri(), Some("token"))).unwrap();
        match client.enhance("acme/restorer", b"img").await {
            Err(HfError::Upstream { status, body }) => {
                assert_eq!(status, 400);
                assert_eq!(body, "bad input");
            }
            other => panic!("expected upstream error, got {:?}", other.map(|_| ())),
        }
    }

    #[tokio::test]
    async fn exhausts_attempts_when_model_never_loads() {
        use wiremock::matchers::method;
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503))
            .expect(3)
            .mount(&server)
            .await;

        let client = HfClient::new(test_config(&server.uri(), Some("token"))).unwrap();
        match client.enhance("acme/restorer", b"img").await {
            Err(HfError::ModelLoading { attempts }) => assert_eq!(attempts, 3),
            other => panic!("expected model loading error, got {:?}", other.map(|_| ())),
        }
    }
}
