//! Aircraft feed

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::sync::Arc;
use std::time::Duration;
use worldscope_common::{Channel, FlightRecord};

use super::parser::parse_opensky_states;
use crate::error::{FeedError, Result};
use crate::module::auth::CredentialCache;
use crate::module::feed::{Feed, PollOutcome, SkipReason};

pub const OPENSKY_STATES_URL: &str = "https://opensky-network.org/api/states/all";
pub const POLL_INTERVAL: Duration = Duration::from_secs(10);
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(9);
/// Upper bound on aircraft per broadcast, highest altitude first
pub const MAX_FLIGHTS: usize = 1000;

pub struct FlightFeed {
    client: Client,
    states_url: String,
    /// `None` polls anonymously (lower OpenSky rate limits)
    credentials: Option<Arc<CredentialCache>>,
    max_flights: usize,
}

impl FlightFeed {
    pub fn new(client: Client, credentials: Option<Arc<CredentialCache>>) -> Self {
        Self {
            client,
            states_url: OPENSKY_STATES_URL.to_string(),
            credentials,
            max_flights: MAX_FLIGHTS,
        }
    }

    pub fn with_states_url(mut self, url: impl Into<String>) -> Self {
        self.states_url = url.into();
        self
    }

    pub fn with_max_flights(mut self, max_flights: usize) -> Self {
        self.max_flights = max_flights;
        self
    }
}

#[async_trait]
impl Feed for FlightFeed {
    type Record = FlightRecord;

    fn name(&self) -> &'static str {
        "flights"
    }

    fn channel(&self) -> Channel {
        Channel::Flights
    }

    fn interval(&self) -> Duration {
        POLL_INTERVAL
    }

    async fn poll(&self) -> Result<PollOutcome<FlightRecord>> {
        let mut request = self.client.get(&self.states_url).timeout(REQUEST_TIMEOUT);
        if let Some(cache) = &self.credentials {
            request = request.bearer_auth(cache.get_token().await?);
        }

        let response = request.send().await?;
        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            return Ok(PollOutcome::Skip(SkipReason::RateLimited));
        }
        if status == StatusCode::UNAUTHORIZED {
            if let Some(cache) = &self.credentials {
                cache.invalidate().await;
            }
            return Err(FeedError::Auth("OpenSky rejected the access token (HTTP 401)".to_string()));
        }
        if !status.is_success() {
            return Err(FeedError::Fetch(format!("OpenSky returned HTTP {}", status)));
        }

        let body = response.text().await?;
        let flights = parse_opensky_states(&body, self.max_flights)?;
        Ok(PollOutcome::Publish(flights))
    }
}
