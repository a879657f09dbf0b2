//! Service wiring
//!
//! Builds the shared state (HTTP client, credential cache, catalog) and
//! starts the three feed services against one broadcast sink.

use std::sync::Arc;
use std::time::Duration;

use crate::broadcast::BroadcastSink;
use crate::config::OpenSkyCredentials;
use crate::module::auth::{CredentialCache, OpenSkyTokenClient};
use crate::module::earthquakes::EarthquakeFeed;
use crate::module::feed::start_feed;
use crate::module::flights::FlightFeed;
use crate::module::satellites::{Catalog, CatalogUpdater, start_satellite_service};
use crate::module::scheduled::ServiceHandle;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
const USER_AGENT: &str = concat!("worldscope-backend/", env!("CARGO_PKG_VERSION"));

/// Everything the feed services share
pub struct ServiceContext {
    pub sink: Arc<dyn BroadcastSink>,
    pub credentials: Option<OpenSkyCredentials>,
}

impl ServiceContext {
    pub fn new(sink: Arc<dyn BroadcastSink>, credentials: Option<OpenSkyCredentials>) -> Self {
        Self { sink, credentials }
    }
}

pub fn build_http_client() -> anyhow::Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .connect_timeout(CONNECT_TIMEOUT)
        .user_agent(USER_AGENT)
        .build()?;
    Ok(client)
}

/// Start the flight, satellite and earthquake services
pub fn start_services(ctx: &ServiceContext) -> anyhow::Result<Vec<ServiceHandle>> {
    let client = build_http_client()?;

    let credentials = match &ctx.credentials {
        Some(creds) => {
            tracing::info!("OpenSky OAuth credentials configured for client '{}'", creds.client_id);
            let exchange = OpenSkyTokenClient::new(client.clone(), creds.clone());
            Some(Arc::new(CredentialCache::new(Arc::new(exchange))))
        }
        None => {
            tracing::warn!("OpenSky OAuth credentials missing, polling aircraft anonymously");
            None
        }
    };

    let flights = Arc::new(FlightFeed::new(client.clone(), credentials));
    let earthquakes = Arc::new(EarthquakeFeed::new(client.clone()));
    let catalog = Arc::new(CatalogUpdater::new(client, Arc::new(Catalog::new())));

    let services = vec![
        start_feed(flights, ctx.sink.clone()),
        start_satellite_service(catalog, ctx.sink.clone()),
        start_feed(earthquakes, ctx.sink.clone()),
    ];

    tracing::info!("Started {} services", services.len());
    Ok(services)
}

/// Stop every service and wait for its loops to exit
pub async fn shutdown_services(services: &[ServiceHandle]) {
    for service in services {
        service.stop();
    }
    for service in services {
        service.shutdown().await;
    }
}
