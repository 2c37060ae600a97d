use crate::config::AvailabilityConfig;
use crate::constants::limits::DIAGNOSTIC_BODY_CHARS;
use reqwest::Client;
use serde_json::{Value, json};
use tracing::debug;
use url::Url;

#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    #[error("streaming availability API is not configured: {0}")]
    Config(String),

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("upstream returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("invalid upstream response: {0}")]
    Decode(String),
}

impl UpstreamError {
    /// Status and truncated body, suitable for a log line.
    #[must_use]
    pub fn diagnostic(&self) -> String {
        match self {
            Self::Status { status, body } => format!("{status} {body}"),
            Self::Transport(e) => e
                .status()
                .map_or_else(|| e.to_string(), |s| format!("{} {e}", s.as_u16())),
            other => truncate_body(&other.to_string()),
        }
    }
}

/// Outcome of a two-phase lookup.
#[derive(Debug, Clone, PartialEq)]
pub enum UpstreamLookup {
    /// The search produced nothing usable. Carries what the search returned.
    NotFound { search: Value },

    /// The full show record.
    Found { show: Value },
}

impl UpstreamLookup {
    /// The payload handed back in raw mode.
    #[must_use]
    pub fn into_raw(self) -> Value {
        match self {
            Self::NotFound { search } => json!({ "_search": search }),
            Self::Found { show } => show,
        }
    }
}

#[derive(Clone)]
pub struct StreamingAvailabilityClient {
    client: Client,
    search_url: String,
    show_url: String,
    api_key: String,
    api_host: String,
    country: String,
    output_language: String,
}

impl StreamingAvailabilityClient {
    #[must_use]
    pub fn new(client: Client, config: &AvailabilityConfig) -> Self {
        Self {
            client,
            search_url: config.search_url.clone(),
            show_url: config.show_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            api_host: config.api_host.clone(),
            country: config.country.to_lowercase(),
            output_language: config.output_language.clone(),
        }
    }

    #[must_use]
    pub fn country(&self) -> &str {
        &self.country
    }

    async fn get_json(&self, url: Url) -> Result<Value, UpstreamError> {
        if self.api_key.is_empty() {
            return Err(UpstreamError::Config("missing RapidAPI key".to_string()));
        }

        let response = self
            .client
            .get(url)
            .header("X-RapidAPI-Key", &self.api_key)
            .header("X-RapidAPI-Host", &self.api_host)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(UpstreamError::Status {
                status: status.as_u16(),
                body: truncate_body(&body),
            });
        }

        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|e| UpstreamError::Decode(e.to_string()))
    }

    pub async fn search(&self, title: &str, year: Option<i32>) -> Result<Value, UpstreamError> {
        let mut url = Url::parse(&self.search_url)
            .map_err(|e| UpstreamError::Config(format!("search url: {e}")))?;

        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("title", title)
                .append_pair("country", &self.country)
                .append_pair("show_type", "movie")
                .append_pair("output_language", &self.output_language)
                .append_pair("series_granularity", "show");
            if let Some(year) = year {
                query.append_pair("year", &year.to_string());
            }
        }

        debug!(title, ?year, "Searching streaming availability");
        self.get_json(url).await
    }

    pub async fn get_show(&self, show_id: &str) -> Result<Value, UpstreamError> {
        let raw = format!("{}/{}", self.show_url, urlencoding::encode(show_id));
        let mut url =
            Url::parse(&raw).map_err(|e| UpstreamError::Config(format!("show url: {e}")))?;

        url.query_pairs_mut()
            .append_pair("country", &self.country)
            .append_pair("output_language", &self.output_language)
            .append_pair("series_granularity", "show");

        debug!(show_id, "Fetching streaming availability show");
        self.get_json(url).await
    }

    /// Search by title, then fetch the first hit's full record.
    pub async fn lookup(
        &self,
        title: &str,
        year: Option<i32>,
    ) -> Result<UpstreamLookup, UpstreamError> {
        let search = self.search(title, year).await?;

        let Some(results) = extract_results(&search) else {
            return Ok(UpstreamLookup::NotFound { search });
        };

        let Some(show_id) = results.first().and_then(show_id) else {
            return Ok(UpstreamLookup::NotFound {
                search: Value::Array(results.clone()),
            });
        };

        let show = self.get_show(&show_id).await?;
        Ok(UpstreamLookup::Found { show })
    }
}

/// The non-empty result list of a search payload, from `result`, `results`,
/// or the root array.
#[must_use]
pub fn extract_results(payload: &Value) -> Option<&Vec<Value>> {
    let results = payload
        .get("result")
        .and_then(Value::as_array)
        .or_else(|| payload.get("results").and_then(Value::as_array))
        .or_else(|| payload.as_array())?;

    (!results.is_empty()).then_some(results)
}

/// Identifier of a search hit: `id`, `showId`, or `_id`, string or number.
#[must_use]
pub fn show_id(entry: &Value) -> Option<String> {
    ["id", "showId", "_id"].iter().find_map(|key| match entry.get(*key)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

fn truncate_body(body: &str) -> String {
    body.chars().take(DIAGNOSTIC_BODY_CHARS).collect()
}
