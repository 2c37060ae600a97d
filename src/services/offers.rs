//! Reduces a streaming-availability show record to a flat offer list.
//!
//! Upstream has shipped several shapes over time: offers keyed by provider or
//! listed flat, under `streamingInfo`, `streamingOptions` or
//! `streamingInfoByCountry`, with country keys in either case. All of them are
//! accepted; anything unrecognised yields an empty list.

use crate::domain::NormalizedOffer;
use serde_json::{Map, Value};
use std::collections::HashSet;

const ROOT_KEYS: [&str; 3] = ["streamingInfo", "streamingOptions", "streamingInfoByCountry"];
const ACCESS_KEYS: [&str; 3] = ["streamingType", "type", "monetizationType"];
const LINK_KEYS: [&str; 6] = ["link", "webUrl", "url", "watchLink", "deeplink", "deepLink"];
const UNKNOWN: &str = "unknown";

/// Offers for `country`, de-duplicated on case-insensitive `(platform, access)`.
#[must_use]
pub fn normalize_offers(show: &Value, country: &str) -> Vec<NormalizedOffer> {
    let Some(entry) = country_entry(show, country) else {
        return vec![];
    };

    let offers = match entry {
        Value::Object(by_provider) => provider_keyed(by_provider),
        Value::Array(list) => list
            .iter()
            .filter_map(Value::as_object)
            .map(|offer| NormalizedOffer {
                platform: service_name(offer)
                    .or_else(|| non_empty_str(offer.get("provider")))
                    .unwrap_or_else(|| UNKNOWN.to_string()),
                access: access(offer),
                link: link(offer),
            })
            .collect(),
        _ => vec![],
    };

    dedup(offers)
}

fn country_entry<'a>(show: &'a Value, country: &str) -> Option<&'a Value> {
    let root = ROOT_KEYS
        .iter()
        .find_map(|key| show.get(*key).filter(|v| v.is_object()))?;

    let lower = country.to_lowercase();
    let upper = country.to_uppercase();
    let usable = |v: &&Value| v.is_object() || v.is_array();

    root.get(&lower)
        .filter(usable)
        .or_else(|| root.get(&upper).filter(usable))
        .or_else(|| {
            let nested = root.get("country")?;
            nested
                .get(&lower)
                .filter(usable)
                .or_else(|| nested.get(&upper).filter(usable))
        })
}

fn provider_keyed(by_provider: &Map<String, Value>) -> Vec<NormalizedOffer> {
    let mut out = Vec::new();
    for (provider, offers) in by_provider {
        let Some(offers) = offers.as_array() else {
            continue;
        };
        for offer in offers.iter().filter_map(Value::as_object) {
            out.push(NormalizedOffer {
                platform: service_name(offer).unwrap_or_else(|| provider.clone()),
                access: access(offer),
                link: link(offer),
            });
        }
    }
    out
}

fn non_empty_str(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// `service` as a bare string, or its `id` then `name`.
fn service_name(offer: &Map<String, Value>) -> Option<String> {
    match offer.get("service")? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        service @ Value::Object(_) => {
            non_empty_str(service.get("id")).or_else(|| non_empty_str(service.get("name")))
        }
        _ => None,
    }
}

fn access(offer: &Map<String, Value>) -> String {
    ACCESS_KEYS
        .iter()
        .find_map(|key| non_empty_str(offer.get(*key)))
        .unwrap_or_else(|| UNKNOWN.to_string())
}

fn link(offer: &Map<String, Value>) -> Option<String> {
    LINK_KEYS.iter().find_map(|key| non_empty_str(offer.get(*key)))
}

fn dedup(offers: Vec<NormalizedOffer>) -> Vec<NormalizedOffer> {
    let mut seen = HashSet::new();
    offers
        .into_iter()
        .filter(|offer| seen.insert(offer.dedup_key()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn offer(platform: &str, access: &str, link: Option<&str>) -> NormalizedOffer {
        NormalizedOffer {
            platform: platform.to_string(),
            access: access.to_string(),
            link: link.map(ToString::to_string),
        }
    }

    #[test]
    fn test_provider_keyed_shape() {
        let show = json!({
            "streamingInfo": {
                "us": {
                    "netflix": [{"streamingType": "subscription", "link": "https://n/1"}],
                    "apple": [
                        {"type": "rent", "webUrl": "https://a/r"},
                        {"type": "buy", "deeplink": "apple://b"}
                    ]
                }
            }
        });

        assert_eq!(
            normalize_offers(&show, "us"),
            vec![
                offer("netflix", "subscription", Some("https://n/1")),
                offer("apple", "rent", Some("https://a/r")),
                offer("apple", "buy", Some("apple://b")),
            ]
        );
    }

    #[test]
    fn test_array_shape_with_service_objects() {
        let show = json!({
            "streamingOptions": {
                "US": [
                    {"service": {"id": "prime", "name": "Prime Video"}, "type": "addon", "link": "https://p"},
                    {"service": {"name": "Tubi"}, "monetizationType": "free"},
                    {"provider": "mubi", "streamingType": ""},
                    {"service": {}}
                ]
            }
        });

        assert_eq!(
            normalize_offers(&show, "us"),
            vec![
                offer("prime", "addon", Some("https://p")),
                offer("Tubi", "free", None),
                offer("mubi", UNKNOWN, None),
                offer(UNKNOWN, UNKNOWN, None),
            ]
        );
    }

    #[test]
    fn test_nested_country_key() {
        let show = json!({
            "streamingInfoByCountry": {
                "country": {"GB": [{"service": "bbc", "streamingType": "free", "url": "https://b"}]}
            }
        });
        assert_eq!(
            normalize_offers(&show, "gb"),
            vec![offer("bbc", "free", Some("https://b"))]
        );
    }

    #[test]
    fn test_dedup_is_case_insensitive_first_wins() {
        let show = json!({
            "streamingInfo": {
                "us": [
                    {"service": "Netflix", "streamingType": "subscription", "link": "first"},
                    {"service": "netflix", "streamingType": "SUBSCRIPTION", "link": "second"},
                    {"service": "netflix", "streamingType": "rent"}
                ]
            }
        });

        let offers = normalize_offers(&show, "us");
        assert_eq!(offers.len(), 2);
        assert_eq!(offers[0].link.as_deref(), Some("first"));
        assert_eq!(offers[1].access, "rent");
    }

    #[test]
    fn test_unrecognised_shapes_yield_nothing() {
        assert!(normalize_offers(&json!({}), "us").is_empty());
        assert!(normalize_offers(&json!(null), "us").is_empty());
        assert!(normalize_offers(&json!({"streamingInfo": {"de": []}}), "us").is_empty());
        assert!(normalize_offers(&json!({"streamingInfo": {"us": "nope"}}), "us").is_empty());
        assert!(
            normalize_offers(&json!({"streamingInfo": {"us": {"netflix": {"x": 1}}}}), "us")
                .is_empty()
        );
    }

    #[test]
    fn test_first_present_root_wins() {
        let show = json!({
            "streamingInfo": {},
            "streamingOptions": {"us": [{"service": "hulu"}]}
        });
        assert!(normalize_offers(&show, "us").is_empty());
    }
}
