//! Process-wide bearer token cache

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::error::{FeedError, Result};

/// A token is refreshed this long before it actually expires
pub const TOKEN_REFRESH_BUFFER: TimeDelta = TimeDelta::seconds(60);

/// Validated result of a token exchange
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenGrant {
    pub access_token: String,
    /// Lifetime in seconds, always positive
    pub expires_in: i64,
}

/// Performs the client-credentials exchange against an identity provider
#[async_trait]
pub trait TokenExchange: Send + Sync {
    async fn exchange(&self) -> Result<TokenGrant>;
}

#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    access_token: String,
    expires_at: DateTime<Utc>,
}

impl Credential {
    pub fn new(access_token: String, expires_at: DateTime<Utc>) -> Self {
        Self { access_token, expires_at }
    }

    /// Fails if the lifetime is not positive or the expiry is not a representable date
    pub fn from_grant(grant: TokenGrant, now: DateTime<Utc>) -> Result<Self> {
        let expires_at = Some(grant.expires_in)
            .filter(|secs| *secs > 0)
            .and_then(TimeDelta::try_seconds)
            .and_then(|lifetime| now.checked_add_signed(lifetime))
            .ok_or_else(|| FeedError::Auth("OpenSky token response is invalid".to_string()))?;
        Ok(Self::new(grant.access_token, expires_at))
    }

    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    pub fn is_usable(&self, now: DateTime<Utc>, refresh_buffer: TimeDelta) -> bool {
        now < self.expires_at - refresh_buffer
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("access_token", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Caches one credential and refreshes it on demand.
///
/// The state mutex is held across the exchange, so concurrent callers that
/// find no usable token wait for a single exchange and then share its result.
/// A failed exchange leaves the stored credential untouched.
pub struct CredentialCache {
    exchange: Arc<dyn TokenExchange>,
    cached: Mutex<Option<Credential>>,
    refresh_buffer: TimeDelta,
}

impl CredentialCache {
    pub fn new(exchange: Arc<dyn TokenExchange>) -> Self {
        Self {
            exchange,
            cached: Mutex::new(None),
            refresh_buffer: TOKEN_REFRESH_BUFFER,
        }
    }

    pub fn with_refresh_buffer(mut self, refresh_buffer: TimeDelta) -> Self {
        self.refresh_buffer = refresh_buffer;
        self
    }

    /// Return a usable bearer token, exchanging credentials if necessary
    pub async fn get_token(&self) -> Result<String> {
        let mut cached = self.cached.lock().await;

        if let Some(credential) = cached.as_ref() {
            if credential.is_usable(Utc::now(), self.refresh_buffer) {
                return Ok(credential.access_token.clone());
            }
        }

        tracing::debug!("No usable access token cached, exchanging client credentials");
        let grant = self.exchange.exchange().await?;
        if grant.access_token.is_empty() {
            return Err(FeedError::Auth("token exchange returned an invalid grant".to_string()));
        }

        let credential = Credential::from_grant(grant, Utc::now())?;
        tracing::info!("Obtained new access token (expires at {})", credential.expires_at);

        let token = credential.access_token.clone();
        *cached = Some(credential);
        Ok(token)
    }

    /// Drop the cached credential; the next `get_token()` exchanges again
    pub async fn invalidate(&self) {
        if self.cached.lock().await.take().is_some() {
            tracing::info!("Cached access token invalidated");
        }
    }

    /// Snapshot of the cached credential, if any
    pub async fn current(&self) -> Option<Credential> {
        self.cached.lock().await.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::CountingExchange;
    use std::time::Duration;

    #[test]
    fn test_usable_window() {
        let now = Utc::now();
        let credential = Credential::new("abc".to_string(), now + TimeDelta::seconds(120));

        assert!(credential.is_usable(now, TOKEN_REFRESH_BUFFER));
        assert!(!credential.is_usable(now + TimeDelta::seconds(60), TOKEN_REFRESH_BUFFER));
        assert!(!credential.is_usable(now + TimeDelta::seconds(90), TOKEN_REFRESH_BUFFER));
    }

    #[test]
    fn test_debug_redacts_token() {
        let credential = Credential::new("super-secret".to_string(), Utc::now());
        assert!(!format!("{:?}", credential).contains("super-secret"));
    }

    #[test]
    fn test_from_grant_rejects_unrepresentable_expiry() {
        let now = Utc::now();
        let grant = |expires_in| TokenGrant { access_token: "abc".to_string(), expires_in };

        let credential = Credential::from_grant(grant(1800), now).unwrap();
        assert_eq!(credential.expires_at(), now + TimeDelta::seconds(1800));

        for expires_in in [0, -5, 10_000_000_000_000, i64::MAX] {
            assert!(matches!(Credential::from_grant(grant(expires_in), now), Err(FeedError::Auth(_))));
        }
    }

    #[tokio::test]
    async fn test_huge_lifetime_fails_without_caching() {
        let exchange = Arc::new(CountingExchange::new(10_000_000_000_000));
        let cache = Arc::new(CredentialCache::new(exchange));

        // runs in its own task so a panic would surface as a JoinError
        let result = tokio::spawn({
            let cache = cache.clone();
            async move { cache.get_token().await }
        })
        .await
        .unwrap();

        assert!(matches!(result, Err(FeedError::Auth(_))));
        assert!(cache.current().await.is_none());
    }

    #[tokio::test]
    async fn test_token_is_reused_inside_window() {
        let exchange = Arc::new(CountingExchange::new(1800));
        let cache = CredentialCache::new(exchange.clone());

        let first = cache.get_token().await.unwrap();
        let second = cache.get_token().await.unwrap();

        assert_eq!(first, "token-1");
        assert_eq!(first, second);
        assert_eq!(exchange.calls(), 1);
    }

    #[tokio::test]
    async fn test_invalidate_forces_fresh_exchange() {
        let exchange = Arc::new(CountingExchange::new(1800));
        let cache = CredentialCache::new(exchange.clone());

        let first = cache.get_token().await.unwrap();
        cache.invalidate().await;
        assert!(cache.current().await.is_none());

        let second = cache.get_token().await.unwrap();
        assert_ne!(first, second);
        assert_eq!(exchange.calls(), 2);
    }

    #[tokio::test]
    async fn test_token_inside_refresh_buffer_is_replaced() {
        // lifetime shorter than the buffer: never usable
        let exchange = Arc::new(CountingExchange::new(30));
        let cache = CredentialCache::new(exchange.clone());

        cache.get_token().await.unwrap();
        cache.get_token().await.unwrap();
        assert_eq!(exchange.calls(), 2);
    }

    #[tokio::test]
    async fn test_failed_exchange_keeps_previous_state() {
        let exchange = Arc::new(CountingExchange::new(30).failing_after(1));
        let cache = CredentialCache::new(exchange.clone());

        assert_eq!(cache.get_token().await.unwrap(), "token-1");
        let before = cache.current().await;

        let err = cache.get_token().await.unwrap_err();
        assert!(matches!(err, FeedError::Auth(_)));
        assert_eq!(cache.current().await, before);
    }

    #[tokio::test]
    async fn test_concurrent_callers_share_one_exchange() {
        let exchange = Arc::new(CountingExchange::new(1800).with_delay(Duration::from_millis(50)));
        let cache = Arc::new(CredentialCache::new(exchange.clone()));

        let tasks: Vec<_> = (0..5)
            .map(|_| {
                let cache = cache.clone();
                tokio::spawn(async move { cache.get_token().await.unwrap() })
            })
            .collect();

        for task in tasks {
            assert_eq!(task.await.unwrap(), "token-1");
        }
        assert_eq!(exchange.calls(), 1);
    }

    #[tokio::test]
    async fn test_invalid_grant_is_rejected() {
        let exchange = Arc::new(CountingExchange::new(0));
        let cache = CredentialCache::new(exchange);

        assert!(matches!(cache.get_token().await, Err(FeedError::Auth(_))));
        assert!(cache.current().await.is_none());
    }
}
