//! Where key sets come from.
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;
use url::Url;

use super::key_set::KeySet;

/// Pause before the single retry of a failed fetch.
const RETRY_PAUSE: Duration = Duration::from_millis(200);

/// Key-set fetch errors.
///
/// Kept separate from `AuthError` so the cache decides how a fetch failure
/// surfaces to the request.
#[derive(Debug, Error)]
pub enum KeySetError {
    #[error("jwks request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("jwks endpoint returned status {0}")]
    Status(reqwest::StatusCode),
    #[error("invalid jwks document: {0}")]
    Decode(#[from] serde_json::Error),
}

impl KeySetError {
    fn is_transient(&self) -> bool {
        match self {
            Self::Transport(_) => true,
            Self::Status(status) => status.is_server_error(),
            Self::Decode(_) => false,
        }
    }
}

/// Produces the provider's current key set.
///
/// Implementations must be cheap to share (`Arc<dyn KeySource>`).
#[async_trait]
pub trait KeySource: Send + Sync + 'static {
    // Short name for logs.
    fn describe(&self) -> String;

    async fn fetch(&self) -> Result<KeySet, KeySetError>;
}

/// Fetches `/.well-known/jwks.json` over HTTPS.
#[derive(Debug, Clone)]
pub struct HttpKeySource {
    url: Url,
    client: reqwest::Client,
}

impl HttpKeySource {
    /// `timeout` bounds each attempt, not the pair.
    pub fn new(url: Url, timeout: Duration) -> Result<Self, KeySetError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("permit-gate/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { url, client })
    }

    /// `https://{domain}/.well-known/jwks.json`
    pub fn well_known_url(domain: &str) -> Result<Url, url::ParseError> {
        Url::parse(&format!("https://{domain}/.well-known/jwks.json"))
    }

    async fn fetch_once(&self) -> Result<KeySet, KeySetError> {
        let response = self
            .client
            .get(self.url.clone())
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(KeySetError::Status(status));
        }

        let body = response.bytes().await?;
        Ok(KeySet::from_json(&body)?)
    }
}

#[async_trait]
impl KeySource for HttpKeySource {
    fn describe(&self) -> String {
        self.url.to_string()
    }

    async fn fetch(&self) -> Result<KeySet, KeySetError> {
        match self.fetch_once().await {
            Err(err) if err.is_transient() => {
                tracing::warn!(url = %self.url, error = %err, "jwks fetch failed, retrying once");
                tokio::time::sleep(RETRY_PAUSE).await;
                self.fetch_once().await
            }
            result => result,
        }
    }
}

/// A fixed key set.
#[derive(Debug, Clone, Default)]
pub struct StaticKeySource {
    keys: KeySet,
}

impl StaticKeySource {
    pub fn new(keys: KeySet) -> Self {
        Self { keys }
    }
}

#[async_trait]
impl KeySource for StaticKeySource {
    fn describe(&self) -> String {
        format!("static ({} keys)", self.keys.len())
    }

    async fn fetch(&self) -> Result<KeySet, KeySetError> {
        Ok(self.keys.clone())
    }
}
