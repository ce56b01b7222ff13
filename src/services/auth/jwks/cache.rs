//! Read-through key-set cache.
//!
//! Readers load an immutable `Arc<KeySet>` snapshot without locking. A fetch
//! replaces the whole snapshot atomically, so a request that already holds
//! the old set keeps using it until it finishes.
use arc_swap::ArcSwapOption;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

use super::key_set::{KeySet, SigningKey};
use super::source::KeySource;
use crate::services::auth::error::AuthError;

pub struct JwksCache {
    source: Arc<dyn KeySource>,
    snapshot: ArcSwapOption<KeySet>,
    // Serialises fetches.
    refresh: Mutex<RefreshState>,
    min_refresh_interval: Duration,
}

#[derive(Debug, Default)]
struct RefreshState {
    last_attempt: Option<Instant>,
    last_failure: Option<Instant>,
}

impl std::fmt::Debug for JwksCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwksCache")
            .field("source", &self.source.describe())
            .field("cached", &self.snapshot.load_full().map(|k| k.len()))
            .field("min_refresh_interval", &self.min_refresh_interval)
            .finish()
    }
}

impl JwksCache {
    pub fn new(source: Arc<dyn KeySource>, min_refresh_interval: Duration) -> Self {
        Self {
            source,
            snapshot: ArcSwapOption::empty(),
            refresh: Mutex::new(RefreshState::default()),
            min_refresh_interval,
        }
    }

    /// Current key set, fetching it on first use.
    pub async fn snapshot(&self) -> Result<Arc<KeySet>, AuthError> {
        if let Some(keys) = self.snapshot.load_full() {
            tracing::debug!(key_count = keys.len(), "using cached jwks");
            return Ok(keys);
        }

        self.refresh(None, Instant::now()).await
    }

    /// Look up `kid`, refreshing the key set once if it is unknown.
    ///
    /// A refresh that fails (or is rate limited) after a miss is reported
    /// as `KeyNotFound`: the cached set was valid, it just did not contain
    /// the key.
    pub async fn key_for(&self, kid: &str) -> Result<SigningKey, AuthError> {
        let keys = self.snapshot().await?;
        if let Some(key) = keys.find(kid) {
            return Ok(key.clone());
        }

        tracing::debug!(kid = %kid, "kid not in cached jwks, refreshing");

        match self.refresh(Some(&keys), Instant::now()).await {
            Ok(fresh) => fresh.find(kid).cloned().ok_or(AuthError::KeyNotFound),
            Err(err) => {
                tracing::warn!(kid = %kid, error = %err, "jwks refresh after kid miss failed");
                Err(AuthError::KeyNotFound)
            }
        }
    }

    /// Drop the cached set; the next lookup fetches again.
    pub fn invalidate(&self) {
        self.snapshot.store(None);
    }

    /// Fetch and swap in a new key set.
    ///
    /// `seen` is the snapshot the caller found lacking (None when the
    /// cache was empty). If another task already replaced it while we
    /// waited for the lock, that newer set is returned without fetching.
    /// Likewise, a fetch that failed after `requested_at` is the answer for
    /// every caller that queued behind it.
    async fn refresh(
        &self,
        seen: Option<&Arc<KeySet>>,
        requested_at: Instant,
    ) -> Result<Arc<KeySet>, AuthError> {
        let mut state = self.refresh.lock().await;

        let current = self.snapshot.load_full();
        match &current {
            Some(current) => {
                let replaced = match seen {
                    Some(seen) => !Arc::ptr_eq(current, seen),
                    None => true,
                };
                if replaced {
                    return Ok(Arc::clone(current));
                }

                if let Some(at) = state.last_attempt
                    && at.elapsed() < self.min_refresh_interval
                {
                    tracing::debug!(
                        since_last_ms = at.elapsed().as_millis() as u64,
                        "jwks refresh rate limited, keeping cached set"
                    );
                    return Ok(Arc::clone(current));
                }
            }
            None => {
                if state.last_failure.is_some_and(|at| at >= requested_at) {
                    tracing::debug!("jwks fetch failed while waiting, not retrying");
                    return Err(AuthError::KeySetUnavailable);
                }
            }
        }

        let fetched = self.source.fetch().await;
        let now = Instant::now();
        state.last_attempt = Some(now);

        let keys = fetched.map_err(|err| {
            state.last_failure = Some(now);
            tracing::error!(source = %self.source.describe(), error = %err, "failed to fetch jwks");
            AuthError::KeySetUnavailable
        })?;

        tracing::info!(
            source = %self.source.describe(),
            key_count = keys.len(),
            "fetched jwks"
        );

        let keys = Arc::new(keys);
        self.snapshot.store(Some(Arc::clone(&keys)));

        Ok(keys)
    }
}
