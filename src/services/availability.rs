//! Cached availability lookups.
//!
//! [`AvailabilityService`] fingerprints the request, serves fresh cache
//! entries, and otherwise asks an [`AvailabilitySource`] for the show record,
//! normalizes it and writes the result back. Failures never escape: callers
//! always get a payload.

use crate::clients::streaming::{StreamingAvailabilityClient, UpstreamError, UpstreamLookup};
use crate::db::Store;
use crate::domain::{AvailabilityPayload, Fingerprint, LookupIdentity};
use crate::services::offers::normalize_offers;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Persistent store of normalized payloads keyed by fingerprint.
#[async_trait::async_trait]
pub trait AvailabilityCache: Send + Sync {
    /// A fresh payload, or `None` on miss, expiry, corruption or store failure.
    async fn read(&self, key: &Fingerprint) -> Option<AvailabilityPayload>;

    async fn write(
        &self,
        key: &Fingerprint,
        subject_id: Option<i64>,
        payload: &AvailabilityPayload,
    ) -> anyhow::Result<()>;
}

/// Upstream two-phase lookup.
#[async_trait::async_trait]
pub trait AvailabilitySource: Send + Sync {
    async fn lookup(&self, title: &str, year: Option<i32>) -> Result<UpstreamLookup, UpstreamError>;

    /// Country the offers are read for.
    fn country(&self) -> &str;
}

#[async_trait::async_trait]
impl AvailabilitySource for StreamingAvailabilityClient {
    async fn lookup(&self, title: &str, year: Option<i32>) -> Result<UpstreamLookup, UpstreamError> {
        Self::lookup(self, title, year).await
    }

    fn country(&self) -> &str {
        Self::country(self)
    }
}

/// True when an entry written at `updated_at` is older than `ttl_days`.
///
/// Timestamps that do not parse count as stale.
#[must_use]
pub fn is_stale(updated_at: &str, now: DateTime<Utc>, ttl_days: i64) -> bool {
    DateTime::parse_from_rfc3339(updated_at).map_or(true, |written| {
        now.signed_duration_since(written.with_timezone(&Utc)) > Duration::days(ttl_days)
    })
}

/// [`AvailabilityCache`] backed by the `availability_cache` table.
pub struct StoreAvailabilityCache {
    store: Store,
    ttl_days: i64,
}

impl StoreAvailabilityCache {
    #[must_use]
    pub const fn new(store: Store, ttl_days: i64) -> Self {
        Self { store, ttl_days }
    }

    pub async fn read_at(&self, key: &Fingerprint, now: DateTime<Utc>) -> Option<AvailabilityPayload> {
        let entry = match self.store.get_availability_entry(key.as_str()).await {
            Ok(Some(entry)) => entry,
            Ok(None) => return None,
            Err(e) => {
                warn!("Availability cache read failed for {}: {}", key, e);
                return None;
            }
        };

        if is_stale(&entry.updated_at, now, self.ttl_days) {
            debug!("Availability cache entry {} is stale", key);
            return None;
        }

        match serde_json::from_str(&entry.payload_json) {
            Ok(payload) => Some(payload),
            Err(e) => {
                warn!("Discarding unreadable availability cache entry {}: {}", key, e);
                None
            }
        }
    }
}

#[async_trait::async_trait]
impl AvailabilityCache for StoreAvailabilityCache {
    async fn read(&self, key: &Fingerprint) -> Option<AvailabilityPayload> {
        self.read_at(key, Utc::now()).await
    }

    async fn write(
        &self,
        key: &Fingerprint,
        subject_id: Option<i64>,
        payload: &AvailabilityPayload,
    ) -> anyhow::Result<()> {
        let payload_json = serde_json::to_string(payload)?;
        self.store
            .upsert_availability_entry(key.as_str(), subject_id, payload_json, Utc::now())
            .await
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityRequest {
    pub title: String,
    pub year: Option<i32>,
    /// Only distinguishes cache keys; never sent upstream.
    pub external_id: Option<String>,
    /// Local catalog id recorded alongside a new cache entry.
    pub local_subject_id: Option<i64>,
    /// Skip the cache read. The result is still written.
    #[serde(default)]
    pub no_cache: bool,
    /// Return the upstream payload verbatim and bypass the cache entirely.
    #[serde(default)]
    pub raw: bool,
}

impl AvailabilityRequest {
    #[must_use]
    pub fn identity(&self) -> LookupIdentity {
        LookupIdentity::new(&self.title, self.year, self.external_id.clone())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AvailabilityResponse {
    Normalized(AvailabilityPayload),
    Raw(Value),
    RawError { error: String },
}

pub struct AvailabilityService {
    cache: Arc<dyn AvailabilityCache>,
    source: Arc<dyn AvailabilitySource>,
}

impl AvailabilityService {
    #[must_use]
    pub fn new(cache: Arc<dyn AvailabilityCache>, source: Arc<dyn AvailabilitySource>) -> Self {
        Self { cache, source }
    }

    pub async fn get_availability(&self, request: &AvailabilityRequest) -> AvailabilityResponse {
        let key = request.identity().fingerprint();

        if !request.no_cache && !request.raw {
            if let Some(cached) = self.cache.read(&key).await {
                metrics::counter!("availability_cache_hits_total").increment(1);
                debug!("Availability cache hit for '{}'", request.title);
                return AvailabilityResponse::Normalized(cached);
            }
            metrics::counter!("availability_cache_misses_total").increment(1);
        }

        let lookup = match self.source.lookup(&request.title, request.year).await {
            Ok(lookup) => lookup,
            Err(e) => {
                metrics::counter!("availability_upstream_failures_total").increment(1);
                error!(
                    "Streaming availability lookup failed for '{}': {}",
                    request.title,
                    e.diagnostic()
                );
                return if request.raw {
                    AvailabilityResponse::RawError {
                        error: e.to_string(),
                    }
                } else {
                    AvailabilityResponse::Normalized(AvailabilityPayload::empty())
                };
            }
        };

        if request.raw {
            return AvailabilityResponse::Raw(lookup.into_raw());
        }

        let sources = match &lookup {
            UpstreamLookup::Found { show } => normalize_offers(show, self.source.country()),
            UpstreamLookup::NotFound { .. } => vec![],
        };
        let payload = AvailabilityPayload::new(sources);

        if let Err(e) = self
            .cache
            .write(&key, request.local_subject_id, &payload)
            .await
        {
            warn!("Failed to cache availability for '{}': {}", request.title, e);
        } else {
            info!(
                "Cached {} availability offer(s) for '{}'",
                payload.sources.len(),
                request.title
            );
        }

        AvailabilityResponse::Normalized(payload)
    }
}
