//! Earthquake feed

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use worldscope_common::{Channel, EarthquakeRecord};

use super::parser::parse_usgs_geojson;
use crate::error::{FeedError, Result};
use crate::module::feed::{Feed, PollOutcome};

pub const USGS_ALL_DAY_URL: &str =
    "https://earthquake.usgs.gov/earthquakes/feed/v1.0/summary/all_day.geojson";
pub const POLL_INTERVAL: Duration = Duration::from_secs(30);
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(9);

pub struct EarthquakeFeed {
    client: Client,
    feed_url: String,
}

impl EarthquakeFeed {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            feed_url: USGS_ALL_DAY_URL.to_string(),
        }
    }

    pub fn with_feed_url(mut self, url: impl Into<String>) -> Self {
        self.feed_url = url.into();
        self
    }
}

#[async_trait]
impl Feed for EarthquakeFeed {
    type Record = EarthquakeRecord;

    fn name(&self) -> &'static str {
        "earthquakes"
    }

    fn channel(&self) -> Channel {
        Channel::Earthquakes
    }

    fn interval(&self) -> Duration {
        POLL_INTERVAL
    }

    async fn poll(&self) -> Result<PollOutcome<EarthquakeRecord>> {
        let response = self
            .client
            .get(&self.feed_url)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::Fetch(format!("USGS returned HTTP {}", status)));
        }

        let body = response.text().await?;
        Ok(PollOutcome::Publish(parse_usgs_geojson(&body)?))
    }
}
