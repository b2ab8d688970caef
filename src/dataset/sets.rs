//! Set-list refresh: populates the registry from the ratings service's
//! recognized-event list and the catalog's full set list. Either endpoint
//! failing falls back to the compiled-in registry.

use reqwest::blocking::Client;
use serde_json::Value;

use crate::config::{catalog_sets_url, event_sets_url, CATALOG_RETRIES, RATINGS_RETRIES};
use crate::models::{SetEntry, SetRegistry};

use super::get_json_with_retry;

/// One recognized event set from the ratings service.
#[derive(Debug, Clone, PartialEq)]
pub struct EventSet {
    pub name: String,
    pub code: String,
    pub start_date: Option<String>,
}

/// Fetch both set lists and assemble a registry. Any failure keeps the
/// engine usable by returning the built-in registry instead.
pub fn fetch_registry(client: &Client, ratings_base: &str, catalog_base: &str) -> SetRegistry {
    let events = match get_json_with_retry(client, &event_sets_url(ratings_base), RATINGS_RETRIES)
    {
        Ok(payload) => parse_event_sets(&payload),
        Err(e) => {
            tracing::warn!("event set list failed: {}; using built-in registry", e);
            return SetRegistry::builtin();
        }
    };
    if events.is_empty() {
        tracing::warn!("event set list empty; using built-in registry");
        return SetRegistry::builtin();
    }

    let catalog_codes =
        match get_json_with_retry(client, &catalog_sets_url(catalog_base), CATALOG_RETRIES) {
            Ok(payload) => parse_catalog_sets(&payload),
            Err(e) => {
                tracing::warn!("catalog set list failed: {}", e);
                Vec::new()
            }
        };

    let mut registry = SetRegistry::new();
    for event in events {
        let catalog: Vec<String> = catalog_codes
            .iter()
            .filter(|code| code.eq_ignore_ascii_case(&event.code))
            .cloned()
            .collect();
        registry.insert(
            event.name,
            SetEntry {
                arena_codes: vec![event.code.clone()],
                catalog_codes: if catalog.is_empty() {
                    vec![event.code.to_lowercase()]
                } else {
                    catalog
                },
                ratings_codes: vec![event.code],
                start_date: event.start_date,
            },
        );
    }
    registry
}

/// Recognized event sets: an array of `{name, code, start_date}` rows.
/// Rows missing a name or code are skipped.
pub fn parse_event_sets(payload: &Value) -> Vec<EventSet> {
    let Some(rows) = payload.as_array() else {
        return Vec::new();
    };

    rows.iter()
        .filter_map(|row| {
            let name = row.get("name")?.as_str()?.to_string();
            let code = row.get("code")?.as_str()?.to_uppercase();
            let start_date = row
                .get("start_date")
                .and_then(Value::as_str)
                .map(str::to_string);
            Some(EventSet {
                name,
                code,
                start_date,
            })
        })
        .collect()
}

/// Catalog set codes from the full set list (`data[].code`).
pub fn parse_catalog_sets(payload: &Value) -> Vec<String> {
    payload
        .get("data")
        .and_then(Value::as_array)
        .map(|rows| {
            rows.iter()
                .filter_map(|row| row.get("code").and_then(Value::as_str))
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}
