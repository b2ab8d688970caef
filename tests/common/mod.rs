//! Shared fixtures for the engine integration tests.
//!
//! Provides small card/artifact factories and log-file helpers. Cards are
//! built with the full 26-filter table so fixtures satisfy the same
//! invariants as built artifacts.

#![allow(dead_code)]

use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::Path;

use arena_draft_engine::constants::FILTER_ALL_DECKS;
use arena_draft_engine::models::card::zeroed_deck_colors;
use arena_draft_engine::models::{ArtifactMeta, Card, Rarity, RatingsBlock, SetArtifact};
use arena_draft_engine::scoring::SetMetrics;
use arena_draft_engine::Settings;

// ---------------------------------------------------------------------------
// Card factories
// ---------------------------------------------------------------------------

/// A card with every filter zero-filled except "All Decks".
pub fn rated_card(name: &str, cmc: u32, mana_cost: &str, types: &[&str], gihwr: f64, gih: u32) -> Card {
    let mut deck_colors = zeroed_deck_colors();
    deck_colors.insert(
        FILTER_ALL_DECKS.to_string(),
        RatingsBlock {
            gihwr,
            gih,
            alsa: 5.0,
            ..RatingsBlock::default()
        },
    );

    Card {
        name: name.to_string(),
        cmc,
        mana_cost: mana_cost.to_string(),
        colors: mana_colors(mana_cost),
        types: types.iter().map(|t| (*t).to_string()).collect(),
        rarity: Rarity::Common,
        deck_colors,
        ..Card::default()
    }
}

/// Install a ratings block under an additional filter key.
pub fn with_filter(mut card: Card, filter: &str, block: RatingsBlock) -> Card {
    card.deck_colors.insert(filter.to_string(), block);
    card
}

fn mana_colors(mana_cost: &str) -> Vec<String> {
    let mut colors = Vec::new();
    for symbol in ['W', 'U', 'B', 'R', 'G'] {
        if mana_cost.contains(symbol) && !colors.contains(&symbol.to_string()) {
            colors.push(symbol.to_string());
        }
    }
    colors
}

// ---------------------------------------------------------------------------
// Artifact factory
// ---------------------------------------------------------------------------

/// An artifact holding `extra` plus enough filler cards to pass the
/// integrity minimum. Ids for `extra` are their position as a string
/// starting at "101"; fillers use ids from 10_000 up.
pub fn sample_artifact(extra: &[Card]) -> SetArtifact {
    let mut card_ratings: HashMap<String, Card> = HashMap::new();

    for (i, card) in extra.iter().enumerate() {
        card_ratings.insert((101 + i).to_string(), card.clone());
    }
    for i in 0..120 {
        let gihwr = 50.0 + (i % 13) as f64;
        let card = rated_card(
            &format!("Filler {}", i),
            2,
            "{1}{G}",
            &["Creature"],
            gihwr,
            1000,
        );
        card_ratings.insert((10_000 + i).to_string(), card);
    }

    SetArtifact {
        meta: ArtifactMeta {
            version: 2,
            start_date: "2023-06-20".to_string(),
            end_date: "2023-08-01".to_string(),
            collection_date: "2023-08-01 12:00:00".to_string(),
        },
        card_ratings,
        color_ratings: HashMap::from([("WU".to_string(), 56.0)]),
    }
}

// ---------------------------------------------------------------------------
// Metrics and settings
// ---------------------------------------------------------------------------

pub fn metrics(mean: f64, standard_deviation: f64) -> SetMetrics {
    SetMetrics {
        mean,
        standard_deviation,
    }
}

pub fn default_settings() -> Settings {
    Settings::default()
}

// ---------------------------------------------------------------------------
// Log helpers
// ---------------------------------------------------------------------------

/// Overwrite the log with the given lines.
pub fn write_log(path: &Path, lines: &[String]) {
    let mut contents = lines.join("\n");
    contents.push('\n');
    fs::write(path, contents).unwrap();
}

/// Append lines to the log.
pub fn append_log(path: &Path, lines: &[String]) {
    let mut file = fs::OpenOptions::new().append(true).open(path).unwrap();
    for line in lines {
        writeln!(file, "{}", line).unwrap();
    }
}

pub fn join_line(event_name: &str) -> String {
    format!(
        "[UnityCrossThreadLogger]==> Event_Join {{\"EventName\":\"{}\",\"EntryFeeType\":\"Gem\"}}",
        event_name
    )
}

pub fn cards_in_pack_line(ids: &[u64]) -> String {
    let list = ids
        .iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(",");
    format!(
        "[UnityCrossThreadLogger]Event_GetCourses {{\"CardsInPack\":[{}],\"PackNumber\":1,\"PickNumber\":1}}",
        list
    )
}

pub fn draft_notify_line(pack: u32, pick: u32, ids: &[u64]) -> String {
    let list = ids
        .iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(",");
    format!(
        "[UnityCrossThreadLogger]Draft.Notify {{\"draftId\":\"d-1\",\"SelfPack\":{},\"SelfPick\":{},\"PackCards\":\"{}\"}}",
        pack, pick, list
    )
}

pub fn pick_v1_line(pack: u32, pick: u32, grp_id: u64) -> String {
    format!(
        "[UnityCrossThreadLogger]==> Event_PlayerDraftMakePick {{\"Pack\":{},\"Pick\":{},\"GrpId\":{}}}",
        pack, pick, grp_id
    )
}

pub fn pick_v2_line(pack: u32, pick: u32, card_id: u64) -> String {
    format!(
        "[UnityCrossThreadLogger]==> Draft.MakeHumanDraftPick {{\"packNumber\":{},\"pickNumber\":{},\"cardId\":{}}}",
        pack, pick, card_id
    )
}

pub fn quick_pack_line(pack0: u32, pick0: u32, ids: &[u64]) -> String {
    let list = ids
        .iter()
        .map(|id| format!("\"{}\"", id))
        .collect::<Vec<_>>()
        .join(",");
    format!(
        "[UnityCrossThreadLogger]BotDraft_DraftStatus {{\"PackNumber\":{},\"PickNumber\":{},\"DraftPack\":[{}],\"DraftStatus\":\"PickNext\"}}",
        pack0, pick0, list
    )
}

pub fn quick_pick_line(pack0: u32, pick0: u32, card_id: u64) -> String {
    format!(
        "[UnityCrossThreadLogger]==> BotDraft_DraftPick {{\"PackNumber\":{},\"PickNumber\":{},\"CardId\":\"{}\"}}",
        pack0, pick0, card_id
    )
}

pub fn sealed_pool_line(ids: &[u64]) -> String {
    let granted = ids
        .iter()
        .map(|id| format!("{{\"GrpId\":{}}}", id))
        .collect::<Vec<_>>()
        .join(",");
    format!(
        "{{\"InventoryInfo\":{{\"Changes\":[{{\"Source\":\"EventGrantCardPool\",\"GrantedCards\":[{}]}}]}}}}",
        granted
    )
}

pub fn courses_line(event_name: &str, ids: &[u64]) -> String {
    let list = ids
        .iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(",");
    format!(
        "{{\"Courses\":[{{\"InternalEventName\":\"{}\",\"CardPool\":[{}]}}]}}",
        event_name, list
    )
}
