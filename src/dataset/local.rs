//! Local card ingest from the game client's SQLite card database.
//!
//! Three queries feed the ingest: the localization table (card titles and
//! enumerator strings, English column), the enumerator table (integer ->
//! localization id for colors and card types), and the card rows
//! themselves. Linked faces are folded into their primary so dual-faced
//! cards come out as a single record named `Front // Back`.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use rusqlite::{Connection, OpenFlags};

use crate::config::card_database_search_dirs;
use crate::error::{EngineError, Result};
use crate::models::card::normalize_creature_first;
use crate::models::{Card, Rarity};

/// Modal dual-faced layout; the playable cost is the lower of the faces.
const LINKED_FACE_TYPE_MODAL: i64 = 6;

const COLOR_NAMES: [(&str, &str); 5] = [
    ("White", "W"),
    ("Blue", "U"),
    ("Black", "B"),
    ("Red", "R"),
    ("Green", "G"),
];

// ---------------------------------------------------------------------------
// Locating the database
// ---------------------------------------------------------------------------

/// Find the newest `Raw_CardDatabase*` file under the platform search
/// paths.
pub fn locate_database() -> Result<PathBuf> {
    let mut candidates: Vec<PathBuf> = Vec::new();

    for dir in card_database_search_dirs() {
        let Ok(entries) = fs::read_dir(&dir) else {
            continue;
        };
        for entry in entries.flatten() {
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            if name.starts_with("Raw_CardDatabase") {
                candidates.push(entry.path());
            }
        }
    }

    candidates.sort();
    candidates.pop().ok_or_else(|| {
        EngineError::NotFound(
            "game card database not found; check the client installation".to_string(),
        )
    })
}

// ---------------------------------------------------------------------------
// LocalCardDatabase
// ---------------------------------------------------------------------------

pub struct LocalCardDatabase {
    conn: Connection,
}

#[derive(Debug, Clone)]
struct CardRow {
    grp_id: i64,
    title_id: i64,
    set_code: String,
    digital_set_code: String,
    type_ids: Vec<i64>,
    color_ids: Vec<i64>,
    casting_cost: String,
    rarity: i64,
    is_primary: bool,
    linked_faces: Vec<i64>,
    linked_face_type: i64,
    is_token: bool,
}

impl LocalCardDatabase {
    /// Open the database read-only; the engine never mutates client files.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open_with_flags(
            path.as_ref(),
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        Ok(Self { conn })
    }

    /// Collect the cards of the given expansion codes, keyed by group id.
    /// The sentinel code `ALL` takes every card in the database.
    pub fn collect_set_cards(&self, arena_codes: &[String]) -> Result<Vec<(String, Card)>> {
        let localizations = self.load_localizations()?;
        let (color_names, type_names) = self.load_enumerators(&localizations)?;
        let rows = self.load_card_rows()?;

        let take_all = arena_codes.iter().any(|c| c == "ALL");
        let wanted: Vec<String> = arena_codes.iter().map(|c| c.to_uppercase()).collect();

        let mut cards = Vec::new();

        for row in rows.values() {
            if row.is_token || !row.is_primary {
                continue;
            }
            if !take_all {
                let set = row.set_code.to_uppercase();
                let digital = row.digital_set_code.to_uppercase();
                if !wanted.contains(&set) && !wanted.contains(&digital) {
                    continue;
                }
            }

            match build_card(row, &rows, &localizations, &color_names, &type_names) {
                Some(card) => cards.push((row.grp_id.to_string(), card)),
                None => tracing::debug!("card row {} skipped (no title)", row.grp_id),
            }
        }

        if cards.is_empty() {
            return Err(EngineError::NotFound(format!(
                "no cards found for codes {:?}",
                arena_codes
            )));
        }

        tracing::info!("local ingest produced {} cards", cards.len());
        Ok(cards)
    }

    // -- Queries -----------------------------------------------------------

    fn load_localizations(&self) -> Result<BTreeMap<i64, String>> {
        let mut stmt = self.conn.prepare("SELECT LocId, enUS FROM Localizations")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut map = BTreeMap::new();
        for row in rows {
            let (id, text) = row?;
            map.insert(id, text);
        }
        Ok(map)
    }

    /// Color and card-type enumerators, resolved through the localization
    /// table. Colors come back as their single-letter symbols.
    fn load_enumerators(
        &self,
        localizations: &BTreeMap<i64, String>,
    ) -> Result<(BTreeMap<i64, String>, BTreeMap<i64, String>)> {
        let mut stmt = self
            .conn
            .prepare("SELECT Type, Value, LocId FROM Enums WHERE Type IN ('Color', 'CardType')")?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, i64>(1)?,
                row.get::<_, i64>(2)?,
            ))
        })?;

        let mut colors = BTreeMap::new();
        let mut types = BTreeMap::new();

        for row in rows {
            let (kind, value, loc_id) = row?;
            let Some(text) = localizations.get(&loc_id) else {
                continue;
            };
            match kind.as_str() {
                "Color" => {
                    if let Some((_, symbol)) =
                        COLOR_NAMES.iter().find(|(name, _)| *name == text.as_str())
                    {
                        colors.insert(value, (*symbol).to_string());
                    }
                }
                "CardType" => {
                    types.insert(value, text.clone());
                }
                _ => {}
            }
        }

        Ok((colors, types))
    }

    fn load_card_rows(&self) -> Result<BTreeMap<i64, CardRow>> {
        let mut stmt = self.conn.prepare(
            "SELECT GrpId, TitleId, ExpansionCode, DigitalReleaseSet, Types, Colors, \
             CastingCost, Rarity, IsPrimaryCard, LinkedFaces, LinkedFaceType, IsToken \
             FROM Cards",
        )?;

        let rows = stmt.query_map([], |row| {
            Ok(CardRow {
                grp_id: row.get(0)?,
                title_id: row.get(1)?,
                set_code: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
                digital_set_code: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
                type_ids: parse_id_list(&row.get::<_, Option<String>>(4)?.unwrap_or_default()),
                color_ids: parse_id_list(&row.get::<_, Option<String>>(5)?.unwrap_or_default()),
                casting_cost: row.get::<_, Option<String>>(6)?.unwrap_or_default(),
                rarity: row.get::<_, Option<i64>>(7)?.unwrap_or(0),
                is_primary: row.get::<_, Option<i64>>(8)?.unwrap_or(1) != 0,
                linked_faces: parse_id_list(&row.get::<_, Option<String>>(9)?.unwrap_or_default()),
                linked_face_type: row.get::<_, Option<i64>>(10)?.unwrap_or(0),
                is_token: row.get::<_, Option<i64>>(11)?.unwrap_or(0) != 0,
            })
        })?;

        let mut map = BTreeMap::new();
        for row in rows {
            let row = row?;
            map.insert(row.grp_id, row);
        }
        Ok(map)
    }
}

// ---------------------------------------------------------------------------
// Row assembly
// ---------------------------------------------------------------------------

fn build_card(
    row: &CardRow,
    rows: &BTreeMap<i64, CardRow>,
    localizations: &BTreeMap<i64, String>,
    color_names: &BTreeMap<i64, String>,
    type_names: &BTreeMap<i64, String>,
) -> Option<Card> {
    let mut name = localizations.get(&row.title_id)?.clone();
    let (mut cmc, mut mana_cost) = parse_casting_cost(&row.casting_cost);
    let mut types = resolve_names(&row.type_ids, type_names);
    let colors = resolve_names(&row.color_ids, color_names);

    // Fold secondary faces into the primary.
    for linked_id in &row.linked_faces {
        if *linked_id == row.grp_id {
            continue;
        }
        let Some(face) = rows.get(linked_id) else {
            continue;
        };
        if face.is_primary || *linked_id < row.grp_id {
            continue;
        }

        if let Some(face_name) = localizations.get(&face.title_id) {
            name = format!("{} // {}", name, face_name);
        }
        types.extend(resolve_names(&face.type_ids, type_names));

        if row.linked_face_type == LINKED_FACE_TYPE_MODAL {
            let (face_cmc, face_cost) = parse_casting_cost(&face.casting_cost);
            if face_cmc < cmc {
                cmc = face_cmc;
                mana_cost = face_cost;
            }
        }
    }

    dedup_preserving_order(&mut types);
    normalize_creature_first(&mut types);

    Some(Card {
        name,
        cmc,
        mana_cost,
        colors,
        types,
        rarity: map_rarity(row.rarity),
        ..Card::default()
    })
}

/// Parse the client's casting-cost string: parentheses stripped, sections
/// separated by `o`. Numeric sections contribute their value to the cmc,
/// every other section contributes 1.
pub fn parse_casting_cost(cost: &str) -> (u32, String) {
    let cleaned = cost.replace(['(', ')'], "");
    let mut cmc = 0u32;
    let mut mana = String::new();

    for section in cleaned.split('o') {
        if section.is_empty() {
            continue;
        }
        match section.parse::<u32>() {
            Ok(value) => cmc += value,
            Err(_) => cmc += 1,
        }
        mana.push('{');
        mana.push_str(section);
        mana.push('}');
    }

    (cmc, mana)
}

fn resolve_names(ids: &[i64], names: &BTreeMap<i64, String>) -> Vec<String> {
    ids.iter().filter_map(|id| names.get(id).cloned()).collect()
}

fn dedup_preserving_order(values: &mut Vec<String>) {
    let mut seen = Vec::new();
    values.retain(|v| {
        if seen.contains(v) {
            false
        } else {
            seen.push(v.clone());
            true
        }
    });
}

fn map_rarity(value: i64) -> Rarity {
    match value {
        3 => Rarity::Uncommon,
        4 => Rarity::Rare,
        5 => Rarity::Mythic,
        _ => Rarity::Common,
    }
}

/// Comma-separated id list column.
fn parse_id_list(value: &str) -> Vec<i64> {
    value
        .split(',')
        .filter_map(|part| part.trim().parse().ok())
        .collect()
}
