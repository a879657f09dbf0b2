//! Element-set catalog
//!
//! The catalog is refreshed hourly from a three-line element listing and read
//! every second by the position feed. A refresh builds a complete new table and
//! swaps it in under the lock, so readers always see either the old or the new
//! table, never a mix.

use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::error::{FeedError, Result};

pub const CELESTRAK_ACTIVE_URL: &str = "https://celestrak.org/NORAD/elements/gp.php?GROUP=active&FORMAT=tle";
pub const MAX_SATELLITES: usize = 120;
pub const TLE_REFRESH_INTERVAL: Duration = Duration::from_secs(60 * 60);
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(12);

/// One catalog entry with its precomputed propagation constants
#[derive(Clone)]
pub struct TrackedObject {
    pub id: String,
    pub name: String,
    pub elements: sgp4::Elements,
    pub constants: sgp4::Constants,
}

impl std::fmt::Debug for TrackedObject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrackedObject")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("epoch", &self.elements.datetime)
            .finish()
    }
}

/// Catalog number from columns 3-7 of line 1, else the 1-based sequence index
pub fn derive_object_id(line1: &str, fallback_index: usize) -> String {
    line1
        .get(2..7)
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| fallback_index.to_string())
}

/// Parse a three-line element listing into at most `max_objects` entries.
///
/// Malformed triples are skipped without realigning, so one broken entry
/// never shifts the name/line pairing of the ones that follow it.
pub fn parse_element_sets(text: &str, max_objects: usize) -> Vec<TrackedObject> {
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();

    let mut parsed = Vec::new();
    let mut i = 0;

    while i + 2 < lines.len() && parsed.len() < max_objects {
        let (name, line1, line2) = (lines[i], lines[i + 1], lines[i + 2]);
        i += 3;

        if !line1.starts_with("1 ") || !line2.starts_with("2 ") {
            tracing::debug!("Skipping element set '{}': missing line markers", name);
            continue;
        }

        let elements = match sgp4::Elements::from_tle(Some(name.to_string()), line1.as_bytes(), line2.as_bytes()) {
            Ok(elements) => elements,
            Err(e) => {
                tracing::debug!("Skipping element set '{}': {:?}", name, e);
                continue;
            }
        };
        let constants = match sgp4::Constants::from_elements(&elements) {
            Ok(constants) => constants,
            Err(e) => {
                tracing::debug!("Skipping element set '{}': {:?}", name, e);
                continue;
            }
        };

        parsed.push(TrackedObject {
            id: derive_object_id(line1, parsed.len() + 1),
            name: name.to_string(),
            elements,
            constants,
        });
    }

    parsed
}

/// Shared, atomically replaced table of tracked objects
#[derive(Default)]
pub struct Catalog {
    objects: RwLock<Arc<Vec<TrackedObject>>>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current table; stays valid even if a refresh swaps in a new one
    pub async fn snapshot(&self) -> Arc<Vec<TrackedObject>> {
        self.objects.read().await.clone()
    }

    pub async fn replace(&self, objects: Vec<TrackedObject>) {
        *self.objects.write().await = Arc::new(objects);
    }

    pub async fn len(&self) -> usize {
        self.objects.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

/// Downloads the element listing and replaces the catalog
pub struct CatalogUpdater {
    client: Client,
    url: String,
    max_objects: usize,
    catalog: Arc<Catalog>,
}

impl CatalogUpdater {
    pub fn new(client: Client, catalog: Arc<Catalog>) -> Self {
        Self {
            client,
            url: CELESTRAK_ACTIVE_URL.to_string(),
            max_objects: MAX_SATELLITES,
            catalog,
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    pub fn with_max_objects(mut self, max_objects: usize) -> Self {
        self.max_objects = max_objects;
        self
    }

    pub fn catalog(&self) -> Arc<Catalog> {
        self.catalog.clone()
    }

    /// One refresh cycle. On any failure the previous catalog stays in place.
    pub async fn refresh(&self) -> Result<usize> {
        let text = self
            .fetch_listing()
            .await
            .map_err(|e| FeedError::Catalog(e.to_string()))?;

        let objects = parse_element_sets(&text, self.max_objects);
        if objects.is_empty() {
            return Err(FeedError::Catalog("element listing contained no valid element sets".to_string()));
        }

        let count = objects.len();
        self.catalog.replace(objects).await;
        tracing::info!("[satellites] refreshed TLE catalog ({})", count);
        Ok(count)
    }

    async fn fetch_listing(&self) -> Result<String> {
        let response = self
            .client
            .get(&self.url)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::Fetch(format!("element listing returned HTTP {}", status)));
        }

        Ok(response.text().await?)
    }
}
