//! Ratings ingest: one request per (ratings code, deck-color filter),
//! with the response field names mapped through a fixed dictionary into
//! the ratings block.
//!
//! A failed filter fetch is tolerated: the artifact simply keeps that
//! filter zero-initialized. Only cancellation aborts the ingest.

use std::collections::HashMap;
use std::thread;

use reqwest::blocking::Client;
use serde_json::Value;

use crate::config::{card_ratings_url, color_ratings_url, INTER_CALL_DELAY, RATINGS_RETRIES};
use crate::constants::{COLOR_RATING_MINIMUM_GAMES, DECK_COLOR_FILTERS, FILTER_ALL_DECKS};
use crate::error::{EngineError, Result};
use crate::models::{RatingsBlock, SetEntry};

use super::{get_json_with_retry, ProgressSink};

/// Per-card ratings for every filter: `name -> filter -> block`.
pub type RatingsMap = HashMap<String, HashMap<String, RatingsBlock>>;

// ---------------------------------------------------------------------------
// Card ratings
// ---------------------------------------------------------------------------

/// Fetch the 26 filter slices for every ratings code of a set entry.
///
/// Progress runs from 10 to 85 percent across the filter fetches; the
/// sink returning `false` aborts with [`EngineError::Cancelled`].
pub fn fetch_set_ratings(
    client: &Client,
    base_url: &str,
    entry: &SetEntry,
    event_type: &str,
    start_date: &str,
    end_date: &str,
    sink: &mut dyn ProgressSink,
) -> Result<RatingsMap> {
    let mut ratings: RatingsMap = HashMap::new();
    let total = (entry.ratings_codes.len() * DECK_COLOR_FILTERS.len()).max(1);
    let mut done = 0usize;

    for code in &entry.ratings_codes {
        for filter in DECK_COLOR_FILTERS {
            let percent = 10 + (75 * done / total) as u8;
            if !sink.update(percent, &format!("{} ratings: {}", code, filter)) {
                return Err(EngineError::Cancelled);
            }
            done += 1;

            let mut url = format!(
                "{}?expansion={}&format={}&start_date={}&end_date={}",
                card_ratings_url(base_url),
                code,
                event_type,
                start_date,
                end_date
            );
            if filter != FILTER_ALL_DECKS {
                url.push_str(&format!("&colors={}", filter));
            }

            match get_json_with_retry(client, &url, RATINGS_RETRIES) {
                Ok(Value::Array(rows)) => {
                    for row in &rows {
                        if let Some((name, block)) = parse_rating_entry(row) {
                            ratings.entry(name).or_default().insert(filter.to_string(), block);
                        }
                    }
                }
                Ok(_) => tracing::warn!("{} filter {}: unexpected response shape", code, filter),
                Err(e) => {
                    // Leave the filter zeroed; the artifact stays valid.
                    tracing::warn!("{} filter {} failed: {}", code, filter, e);
                }
            }

            thread::sleep(INTER_CALL_DELAY);
        }
    }

    Ok(ratings)
}

/// Response field dictionary, applied to one per-card entry.
///
/// ALSA/ATA are stored as rounded floats, win rates and IWD multiplied by
/// 100 and rounded to two decimals, sample counts as integers.
pub fn parse_rating_entry(value: &Value) -> Option<(String, RatingsBlock)> {
    let name = value.get("name")?.as_str()?.to_string();

    let float = |key: &str| value.get(key).and_then(Value::as_f64).unwrap_or(0.0);
    let count = |key: &str| value.get(key).and_then(Value::as_u64).unwrap_or(0) as u32;

    let block = RatingsBlock {
        alsa: round2(float("avg_seen")),
        ata: round2(float("avg_pick")),
        iwd: round2(float("drawn_improvement_win_rate") * 100.0),
        gihwr: round2(float("ever_drawn_win_rate") * 100.0),
        ohwr: round2(float("opening_hand_win_rate") * 100.0),
        gpwr: round2(float("win_rate") * 100.0),
        gdwr: round2(float("drawn_win_rate") * 100.0),
        gnswr: round2(float("never_drawn_win_rate") * 100.0),
        gih: count("ever_drawn_game_count"),
        ngoh: count("opening_hand_game_count"),
        ngp: count("game_count"),
        ngd: count("drawn_game_count"),
        ngnd: count("never_drawn_game_count"),
    };

    Some((name, block))
}

// ---------------------------------------------------------------------------
// Color ratings
// ---------------------------------------------------------------------------

/// Fetch the per-color deck win-rate summary for a set entry.
pub fn fetch_color_ratings(
    client: &Client,
    base_url: &str,
    entry: &SetEntry,
    event_type: &str,
    start_date: &str,
    end_date: &str,
) -> Result<HashMap<String, f64>> {
    let mut color_ratings = HashMap::new();

    for code in &entry.ratings_codes {
        let url = format!(
            "{}?expansion={}&event_type={}&start_date={}&end_date={}&combine_splash=true",
            color_ratings_url(base_url),
            code,
            event_type,
            start_date,
            end_date
        );

        match get_json_with_retry(client, &url, RATINGS_RETRIES) {
            Ok(Value::Array(rows)) => {
                for row in &rows {
                    if let Some((colors, win_rate)) = parse_color_rating_row(row) {
                        color_ratings.insert(colors, win_rate);
                    }
                }
            }
            Ok(_) => tracing::warn!("{} color ratings: unexpected response shape", code),
            Err(e) => tracing::warn!("{} color ratings failed: {}", code, e),
        }

        thread::sleep(INTER_CALL_DELAY);
    }

    Ok(color_ratings)
}

/// One summary row: kept when it is a real color combination with a
/// meaningful sample, the display name mapped to its compact string.
pub fn parse_color_rating_row(row: &Value) -> Option<(String, f64)> {
    if row.get("is_summary").and_then(Value::as_bool).unwrap_or(true) {
        return None;
    }
    let games = row.get("games").and_then(Value::as_u64).unwrap_or(0);
    if games <= COLOR_RATING_MINIMUM_GAMES {
        return None;
    }

    let display = row.get("color_name")?.as_str()?;
    let colors = compact_color_name(display)?;

    let wins = row.get("wins").and_then(Value::as_u64).unwrap_or(0);
    let win_rate = round1(wins as f64 / games as f64 * 100.0);

    Some((colors, win_rate))
}

/// `"Mono-White"` -> `"W"`, `"Azorius (WU)"` / `"(WUR)"` -> the
/// parenthesized symbols.
fn compact_color_name(display: &str) -> Option<String> {
    if let Some(color) = display.strip_prefix("Mono-") {
        let symbol = match color {
            "White" => "W",
            "Blue" => "U",
            "Black" => "B",
            "Red" => "R",
            "Green" => "G",
            _ => return None,
        };
        return Some(symbol.to_string());
    }

    let open = display.find('(')?;
    let close = display[open..].find(')')? + open;
    let symbols = &display[open + 1..close];
    if symbols.is_empty() {
        None
    } else {
        Some(symbols.to_string())
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
