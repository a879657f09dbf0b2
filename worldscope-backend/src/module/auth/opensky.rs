//! OpenSky OAuth2 client-credentials exchange

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

use super::credential::{TokenExchange, TokenGrant};
use crate::config::OpenSkyCredentials;
use crate::error::{FeedError, Result};

pub const OPENSKY_TOKEN_URL: &str =
    "https://auth.opensky-network.org/auth/realms/opensky-network/protocol/openid-connect/token";
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(9);

pub struct OpenSkyTokenClient {
    client: Client,
    token_url: String,
    credentials: OpenSkyCredentials,
    timeout: Duration,
}

impl OpenSkyTokenClient {
    pub fn new(client: Client, credentials: OpenSkyCredentials) -> Self {
        Self {
            client,
            token_url: OPENSKY_TOKEN_URL.to_string(),
            credentials,
            timeout: REQUEST_TIMEOUT,
        }
    }

    pub fn with_token_url(mut self, url: impl Into<String>) -> Self {
        self.token_url = url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait]
impl TokenExchange for OpenSkyTokenClient {
    async fn exchange(&self) -> Result<TokenGrant> {
        let client_id = self.credentials.client_id.trim();
        let client_secret = self.credentials.client_secret.trim();
        if client_id.is_empty() || client_secret.is_empty() {
            return Err(FeedError::Auth("OpenSky OAuth credentials are missing".to_string()));
        }

        let form = [
            ("grant_type", "client_credentials"),
            ("client_id", client_id),
            ("client_secret", client_secret),
        ];

        let response = self
            .client
            .post(&self.token_url)
            .timeout(self.timeout)
            .form(&form)
            .send()
            .await
            .map_err(|e| FeedError::Auth(format!("token request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::Auth(format!("token endpoint returned HTTP {}", status)));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| FeedError::Auth(format!("token response is not JSON: {}", e)))?;

        parse_token_response(&body)
    }
}

/// Validate a token endpoint response body
pub fn parse_token_response(body: &Value) -> Result<TokenGrant> {
    let access_token = body
        .get("access_token")
        .and_then(Value::as_str)
        .filter(|token| !token.is_empty());

    // expires_in is a number per RFC 6749, but some providers send a string
    let expires_in = match body.get("expires_in") {
        Some(Value::Number(n)) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Some(Value::String(s)) => s.trim().parse::<i64>().ok(),
        _ => None,
    };

    match (access_token, expires_in) {
        (Some(token), Some(secs)) if secs > 0 => Ok(TokenGrant {
            access_token: token.to_string(),
            expires_in: secs,
        }),
        _ => Err(FeedError::Auth("OpenSky token response is invalid".to_string())),
    }
}
