//! Catalog fallback: when the local card database cannot be read, cards
//! are assembled from the external catalog's search endpoint instead.
//! Pagination follows the `next_page` cursor until `has_more` clears.

use reqwest::blocking::Client;
use serde_json::Value;

use crate::config::{catalog_search_url, CATALOG_RETRIES};
use crate::constants::CARD_TYPES;
use crate::error::Result;
use crate::models::card::normalize_creature_first;
use crate::models::{Card, Rarity};

use super::get_json_with_retry;

/// Collect the cards of the given catalog codes.
pub fn collect_cards(
    client: &Client,
    base_url: &str,
    catalog_codes: &[String],
) -> Result<Vec<(String, Card)>> {
    let mut cards = Vec::new();

    for code in catalog_codes {
        let mut url = catalog_search_url(base_url, code);
        loop {
            let page = get_json_with_retry(client, &url, CATALOG_RETRIES)?;
            let (mut page_cards, next_page, has_more) = parse_catalog_page(&page);
            cards.append(&mut page_cards);

            match (has_more, next_page) {
                (true, Some(next)) => url = next,
                _ => break,
            }
        }
    }

    tracing::info!("catalog ingest produced {} cards", cards.len());
    Ok(cards)
}

/// Split one search-result page into its cards and pagination cursor.
pub fn parse_catalog_page(page: &Value) -> (Vec<(String, Card)>, Option<String>, bool) {
    let cards = page
        .get("data")
        .and_then(Value::as_array)
        .map(|records| records.iter().filter_map(card_from_catalog).collect())
        .unwrap_or_default();

    let next_page = page
        .get("next_page")
        .and_then(Value::as_str)
        .map(str::to_string);
    let has_more = page.get("has_more").and_then(Value::as_bool).unwrap_or(false);

    (cards, next_page, has_more)
}

/// Translate one catalog record into the card schema.
///
/// Dual-faced records keep the catalog's `Front // Back` name and store
/// both face images; the mana cost and types come from the front face.
pub fn card_from_catalog(record: &Value) -> Option<(String, Card)> {
    let name = record.get("name")?.as_str()?.to_string();

    let id = record
        .get("arena_id")
        .and_then(Value::as_u64)
        .map(|id| id.to_string())
        .or_else(|| record.get("id").and_then(Value::as_str).map(str::to_string))?;

    let faces = record.get("card_faces").and_then(Value::as_array);
    let front = faces.and_then(|f| f.first()).unwrap_or(record);

    let cmc = record
        .get("cmc")
        .and_then(Value::as_f64)
        .or_else(|| front.get("cmc").and_then(Value::as_f64))
        .unwrap_or(0.0) as u32;

    let mana_cost = front
        .get("mana_cost")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    let colors = record
        .get("color_identity")
        .and_then(Value::as_array)
        .map(|symbols| {
            symbols
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    let type_line = front
        .get("type_line")
        .or_else(|| record.get("type_line"))
        .and_then(Value::as_str)
        .unwrap_or_default();
    let mut types = parse_type_line(type_line);
    normalize_creature_first(&mut types);

    let rarity = match record.get("rarity").and_then(Value::as_str) {
        Some("uncommon") => Rarity::Uncommon,
        Some("rare") => Rarity::Rare,
        Some("mythic") => Rarity::Mythic,
        _ => Rarity::Common,
    };

    let images = collect_images(record, faces);

    Some((
        id,
        Card {
            name,
            cmc,
            mana_cost,
            colors,
            types,
            rarity,
            images,
            ..Card::default()
        },
    ))
}

/// Recognized card types appearing on the front face's type line.
fn parse_type_line(type_line: &str) -> Vec<String> {
    let front = type_line.split(" // ").next().unwrap_or(type_line);
    let before_dash = front.split('\u{2014}').next().unwrap_or(front);

    let mut types: Vec<String> = Vec::new();
    for word in before_dash.split_whitespace() {
        if CARD_TYPES.contains(&word) && !types.iter().any(|t| t == word) {
            types.push(word.to_string());
        }
    }
    types
}

/// Front image, plus the back face when present. At most two entries.
fn collect_images(record: &Value, faces: Option<&Vec<Value>>) -> Vec<String> {
    let image_of = |value: &Value| -> Option<String> {
        value
            .get("image_uris")
            .and_then(|uris| uris.get("normal"))
            .and_then(Value::as_str)
            .map(str::to_string)
    };

    if let Some(faces) = faces {
        let mut images: Vec<String> = faces.iter().filter_map(image_of).take(2).collect();
        if images.is_empty() {
            images.extend(image_of(record));
        }
        images
    } else {
        image_of(record).into_iter().collect()
    }
}
