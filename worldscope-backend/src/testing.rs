//! Shared helpers for unit tests

use async_trait::async_trait;
use axum::Router;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use worldscope_common::Channel;

use crate::broadcast::BroadcastSink;
use crate::error::{FeedError, Result};
use crate::module::auth::{TokenExchange, TokenGrant};

/// Sink that keeps every broadcast in memory
#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<(Channel, serde_json::Value)>>,
}

impl RecordingSink {
    pub fn events(&self) -> Vec<(Channel, serde_json::Value)> {
        self.events.lock().unwrap().clone()
    }
}

impl BroadcastSink for RecordingSink {
    fn broadcast(&self, channel: Channel, payload: serde_json::Value) {
        self.events.lock().unwrap().push((channel, payload));
    }
}

/// Serve `router` on an ephemeral local port, returns the base URL
pub async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

pub fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(5))
        .build()
        .unwrap()
}

/// Token exchange that hands out "token-1", "token-2", ... and counts calls
pub struct CountingExchange {
    calls: AtomicUsize,
    expires_in: i64,
    fail_after: Option<usize>,
    delay: Duration,
}

impl CountingExchange {
    pub fn new(expires_in: i64) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            expires_in,
            fail_after: None,
            delay: Duration::ZERO,
        }
    }

    /// Every exchange after the first `n` fails
    pub fn failing_after(mut self, n: usize) -> Self {
        self.fail_after = Some(n);
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TokenExchange for CountingExchange {
    async fn exchange(&self) -> Result<TokenGrant> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if matches!(self.fail_after, Some(limit) if n > limit) {
            return Err(FeedError::Auth("token endpoint unavailable".to_string()));
        }

        Ok(TokenGrant {
            access_token: format!("token-{}", n),
            expires_in: self.expires_in,
        })
    }
}
