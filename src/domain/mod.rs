//! Domain types shared by the availability and mood subsystems.
//!
//! Newtypes here keep cache keys from being confused with arbitrary strings,
//! and the serializable records define the JSON shapes handed to callers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Length of a [`Fingerprint`] in hex characters.
pub const FINGERPRINT_LEN: usize = 64;

/// The identity of an availability lookup.
///
/// Two identities are equal when their trimmed, lowercased titles match and
/// their year and external id match exactly.
///
/// # Examples
///
/// ```rust
/// use moodreel::domain::LookupIdentity;
///
/// let a = LookupIdentity::new("  Inception ", Some(2010), None);
/// let b = LookupIdentity::new("inception", Some(2010), None);
/// assert_eq!(a.fingerprint(), b.fingerprint());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct LookupIdentity {
    title: String,
    year: Option<i32>,
    external_id: Option<String>,
}

#[derive(Serialize)]
struct CanonicalIdentity<'a> {
    title: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    year: Option<i32>,
    #[serde(rename = "externalId", skip_serializing_if = "Option::is_none")]
    external_id: Option<&'a str>,
}

impl LookupIdentity {
    #[must_use]
    pub fn new(title: impl AsRef<str>, year: Option<i32>, external_id: Option<String>) -> Self {
        Self {
            title: title.as_ref().trim().to_lowercase(),
            year,
            external_id,
        }
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub const fn year(&self) -> Option<i32> {
        self.year
    }

    #[must_use]
    pub fn external_id(&self) -> Option<&str> {
        self.external_id.as_deref()
    }

    /// SHA-256 over the canonical JSON form `{"title","year","externalId"}`.
    ///
    /// Absent optional fields are left out of the JSON entirely.
    #[must_use]
    pub fn fingerprint(&self) -> Fingerprint {
        let canonical = CanonicalIdentity {
            title: &self.title,
            year: self.year,
            external_id: self.external_id.as_deref(),
        };
        let json = serde_json::to_string(&canonical).unwrap_or_default();
        let mut digest = hex::encode(Sha256::digest(json.as_bytes()));
        digest.truncate(FINGERPRINT_LEN);
        Fingerprint(digest)
    }
}

/// Cache primary key derived from a [`LookupIdentity`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<Fingerprint> for String {
    fn from(key: Fingerprint) -> Self {
        key.0
    }
}

/// One way a title can be watched on a platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedOffer {
    pub platform: String,
    pub access: String,
    pub link: Option<String>,
}

impl NormalizedOffer {
    /// Case-insensitive `(platform, access)` key used for de-duplication.
    #[must_use]
    pub fn dedup_key(&self) -> String {
        format!(
            "{}:{}",
            self.platform.to_lowercase(),
            self.access.to_lowercase()
        )
    }
}

/// The cacheable availability payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityPayload {
    pub sources: Vec<NormalizedOffer>,
    pub fetched_at: DateTime<Utc>,
}

impl AvailabilityPayload {
    #[must_use]
    pub fn new(sources: Vec<NormalizedOffer>) -> Self {
        Self {
            sources,
            fetched_at: Utc::now(),
        }
    }

    #[must_use]
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }
}

/// Where a recommended movie came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Provenance {
    Local,
    ExternalDiscovery,
}

/// A movie record as returned by mood analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovieResult {
    pub id: Option<i64>,
    pub title: String,
    pub year: Option<i32>,
    pub genres: Vec<String>,
    pub poster: String,
    pub trailer_link: String,
    pub reviews: Vec<String>,
    #[serde(rename = "_source")]
    pub source: Provenance,
}

impl MovieResult {
    /// Merge key: the id when present, otherwise a title/year composite.
    #[must_use]
    pub fn merge_key(&self) -> String {
        match self.id {
            Some(id) => format!("id:{id}"),
            None => format!(
                "hash:{}-{}",
                self.title,
                self.year.map(|y| y.to_string()).unwrap_or_default()
            ),
        }
    }
}

/// A row of the mood table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoodLabel {
    pub id: i32,
    pub mood_label: String,
}

/// Catalog insert input.
#[derive(Debug, Clone, Default)]
pub struct NewMovie {
    pub title: String,
    pub year: Option<i32>,
    pub genres: Vec<String>,
    pub poster_url: Option<String>,
    pub trailer_url: Option<String>,
    pub review: Option<String>,
    /// Defaults to the insert time.
    pub date_added: Option<DateTime<Utc>>,
}
