//! Satellite service: catalog refresh loop plus position feed

use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use worldscope_common::{Channel, SatelliteRecord};

use super::catalog::{Catalog, CatalogUpdater, TLE_REFRESH_INTERVAL};
use super::propagator::compute_positions;
use crate::broadcast::BroadcastSink;
use crate::error::Result;
use crate::module::feed::{Feed, PollOutcome, SkipReason, run_tick};
use crate::module::scheduled::{RepeatingTask, ServiceHandle};

pub const POSITION_INTERVAL: Duration = Duration::from_secs(1);

/// Publishes propagated positions of the current catalog
pub struct SatellitePositionFeed {
    catalog: Arc<Catalog>,
}

impl SatellitePositionFeed {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self { catalog }
    }
}

#[async_trait]
impl Feed for SatellitePositionFeed {
    type Record = SatelliteRecord;

    fn name(&self) -> &'static str {
        "satellites"
    }

    fn channel(&self) -> Channel {
        Channel::Satellites
    }

    fn interval(&self) -> Duration {
        POSITION_INTERVAL
    }

    // once per second is too chatty for info
    fn log_publishes(&self) -> bool {
        false
    }

    async fn poll(&self) -> Result<PollOutcome<SatelliteRecord>> {
        let objects = self.catalog.snapshot().await;
        if objects.is_empty() {
            return Ok(PollOutcome::Skip(SkipReason::NothingToPublish));
        }
        Ok(PollOutcome::Publish(compute_positions(&objects, Utc::now())))
    }
}

/// Start the refresh loop (first run immediately, then hourly) and the
/// position loop (every second) against the updater's catalog
pub fn start_satellite_service(updater: Arc<CatalogUpdater>, sink: Arc<dyn BroadcastSink>) -> ServiceHandle {
    let feed = Arc::new(SatellitePositionFeed::new(updater.catalog()));

    let refresh = RepeatingTask::new("satellites catalog refresh", TLE_REFRESH_INTERVAL).spawn(move || {
        let updater = updater.clone();
        async move {
            if let Err(e) = updater.refresh().await {
                tracing::error!("[satellites] TLE refresh failed: {}", e);
            }
        }
    });

    let positions = RepeatingTask::new("satellites feed", feed.interval())
        .with_initial_delay(feed.interval())
        .spawn(move || {
            let feed = feed.clone();
            let sink = sink.clone();
            async move {
                run_tick(feed.as_ref(), sink.as_ref()).await;
            }
        });

    ServiceHandle::new("satellites", vec![refresh, positions])
}
