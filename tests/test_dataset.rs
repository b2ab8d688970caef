//! Dataset builder tests: local SQLite ingest, response parsing for the
//! ratings and catalog endpoints, and the merge step.

mod common;

use std::collections::HashMap;

use rusqlite::Connection;
use serde_json::json;

use arena_draft_engine::dataset::catalog::{card_from_catalog, parse_catalog_page};
use arena_draft_engine::dataset::local::{parse_casting_cost, LocalCardDatabase};
use arena_draft_engine::dataset::merge_ratings;
use arena_draft_engine::dataset::ratings::{parse_color_rating_row, parse_rating_entry};
use arena_draft_engine::models::{Rarity, RatingsBlock};

// ---------------------------------------------------------------------------
// SQLite fixture
// ---------------------------------------------------------------------------

fn fixture_database(path: &std::path::Path) {
    let conn = Connection::open(path).unwrap();
    conn.execute_batch(
        "CREATE TABLE Localizations (LocId INTEGER, enUS TEXT);
         CREATE TABLE Enums (Type TEXT, Value INTEGER, LocId INTEGER);
         CREATE TABLE Cards (
             GrpId INTEGER, TitleId INTEGER, ExpansionCode TEXT,
             DigitalReleaseSet TEXT, Types TEXT, Colors TEXT,
             CastingCost TEXT, Rarity INTEGER, IsPrimaryCard INTEGER,
             LinkedFaces TEXT, LinkedFaceType INTEGER, IsToken INTEGER
         );",
    )
    .unwrap();

    // Localized strings: titles and enumerator names.
    let localizations: [(i64, &str); 9] = [
        (2001, "Creature"),
        (2002, "Instant"),
        (2003, "Land"),
        (2101, "White"),
        (2102, "Blue"),
        (2103, "Black"),
        (1000, "Shire Scout"),
        (1001, "Dark Lord"),
        (1002, "Shadow Form"),
    ];
    for (id, text) in localizations {
        conn.execute(
            "INSERT INTO Localizations (LocId, enUS) VALUES (?1, ?2)",
            rusqlite::params![id, text],
        )
        .unwrap();
    }

    let enums: [(&str, i64, i64); 6] = [
        ("CardType", 1, 2001),
        ("CardType", 2, 2002),
        ("CardType", 5, 2003),
        ("Color", 1, 2101),
        ("Color", 2, 2102),
        ("Color", 3, 2103),
    ];
    for (kind, value, loc_id) in enums {
        conn.execute(
            "INSERT INTO Enums (Type, Value, LocId) VALUES (?1, ?2, ?3)",
            rusqlite::params![kind, value, loc_id],
        )
        .unwrap();
    }

    // A plain creature, a modal dual-face pair, and a token to skip.
    conn.execute_batch(
        "INSERT INTO Cards VALUES (101, 1000, 'LTR', '', '1', '1', 'o1oW', 2, 1, '', 0, 0);
         INSERT INTO Cards VALUES (102, 1001, 'LTR', '', '1', '3', 'o3oB', 4, 1, '102,103', 6, 0);
         INSERT INTO Cards VALUES (103, 1002, 'LTR', '', '2', '3', 'oB', 4, 0, '102,103', 6, 0);
         INSERT INTO Cards VALUES (900, 1000, 'LTR', '', '1', '1', '', 2, 1, '', 0, 1);",
    )
    .unwrap();
}

#[test]
fn local_ingest_builds_card_records() {
    let tmp = tempfile::tempdir().unwrap();
    let db_path = tmp.path().join("Raw_CardDatabase_test.mtga");
    fixture_database(&db_path);

    let database = LocalCardDatabase::open(&db_path).unwrap();
    let cards = database
        .collect_set_cards(&["LTR".to_string()])
        .unwrap()
        .into_iter()
        .collect::<HashMap<_, _>>();

    // The token and the secondary face do not produce records.
    assert_eq!(cards.len(), 2);

    let scout = &cards["101"];
    assert_eq!(scout.name, "Shire Scout");
    assert_eq!(scout.cmc, 2);
    assert_eq!(scout.mana_cost, "{1}{W}");
    assert_eq!(scout.colors, ["W".to_string()]);
    assert_eq!(scout.types, ["Creature".to_string()]);
    assert_eq!(scout.rarity, Rarity::Common);
}

#[test]
fn modal_faces_merge_under_the_primary() {
    let tmp = tempfile::tempdir().unwrap();
    let db_path = tmp.path().join("Raw_CardDatabase_test.mtga");
    fixture_database(&db_path);

    let database = LocalCardDatabase::open(&db_path).unwrap();
    let cards = database
        .collect_set_cards(&["LTR".to_string()])
        .unwrap()
        .into_iter()
        .collect::<HashMap<_, _>>();

    let lord = &cards["102"];
    assert_eq!(lord.name, "Dark Lord // Shadow Form");
    // Modal dual-face: the lower of the two costs wins.
    assert_eq!(lord.cmc, 1);
    assert_eq!(lord.mana_cost, "{B}");
    // Face types merged, Creature normalized to the front.
    assert_eq!(
        lord.types,
        ["Creature".to_string(), "Instant".to_string()]
    );
}

#[test]
fn unknown_set_codes_error_out() {
    let tmp = tempfile::tempdir().unwrap();
    let db_path = tmp.path().join("Raw_CardDatabase_test.mtga");
    fixture_database(&db_path);

    let database = LocalCardDatabase::open(&db_path).unwrap();
    assert!(database.collect_set_cards(&["ZZZ".to_string()]).is_err());
}

#[test]
fn all_sentinel_takes_every_card() {
    let tmp = tempfile::tempdir().unwrap();
    let db_path = tmp.path().join("Raw_CardDatabase_test.mtga");
    fixture_database(&db_path);

    let database = LocalCardDatabase::open(&db_path).unwrap();
    let cards = database.collect_set_cards(&["ALL".to_string()]).unwrap();
    assert_eq!(cards.len(), 2);
}

// ---------------------------------------------------------------------------
// Casting-cost parser
// ---------------------------------------------------------------------------

#[test]
fn casting_cost_sections_split_on_separator() {
    assert_eq!(parse_casting_cost("o1oW"), (2, "{1}{W}".to_string()));
    assert_eq!(parse_casting_cost("o2oWoW"), (4, "{2}{W}{W}".to_string()));
    assert_eq!(parse_casting_cost("oXoGoG"), (3, "{X}{G}{G}".to_string()));
    assert_eq!(parse_casting_cost(""), (0, String::new()));
}

#[test]
fn composite_sections_count_one() {
    // Hybrid and Phyrexian sections each contribute a single pip.
    assert_eq!(parse_casting_cost("o(W/U)o(W/U)"), (2, "{W/U}{W/U}".to_string()));
    assert_eq!(parse_casting_cost("o3o(B/P)"), (4, "{3}{B/P}".to_string()));
}

// ---------------------------------------------------------------------------
// Ratings response parsing
// ---------------------------------------------------------------------------

#[test]
fn rating_entry_maps_fields_and_rounds() {
    let entry = json!({
        "name": "Shire Scout",
        "avg_seen": 4.5678,
        "avg_pick": 5.1234,
        "ever_drawn_win_rate": 0.55342,
        "ever_drawn_game_count": 1500,
        "opening_hand_win_rate": 0.5411,
        "opening_hand_game_count": 700,
        "win_rate": 0.5322,
        "game_count": 3200,
        "drawn_win_rate": 0.5199,
        "drawn_game_count": 800,
        "never_drawn_win_rate": 0.5101,
        "never_drawn_game_count": 1700,
        "drawn_improvement_win_rate": 0.0412
    });

    let (name, block) = parse_rating_entry(&entry).unwrap();
    assert_eq!(name, "Shire Scout");
    assert_eq!(block.alsa, 4.57);
    assert_eq!(block.ata, 5.12);
    assert_eq!(block.gihwr, 55.34);
    assert_eq!(block.ohwr, 54.11);
    assert_eq!(block.gpwr, 53.22);
    assert_eq!(block.gdwr, 51.99);
    assert_eq!(block.gnswr, 51.01);
    assert_eq!(block.iwd, 4.12);
    assert_eq!(block.gih, 1500);
    assert_eq!(block.ngoh, 700);
    assert_eq!(block.ngp, 3200);
    assert_eq!(block.ngd, 800);
    assert_eq!(block.ngnd, 1700);
}

#[test]
fn rating_entry_defaults_missing_fields_to_zero() {
    let entry = json!({"name": "Sparse"});
    let (_, block) = parse_rating_entry(&entry).unwrap();
    assert_eq!(block, RatingsBlock::default());
}

#[test]
fn rating_entry_without_name_is_rejected() {
    assert!(parse_rating_entry(&json!({"avg_seen": 4.5})).is_none());
}

// ---------------------------------------------------------------------------
// Color-rating rows
// ---------------------------------------------------------------------------

#[test]
fn color_rating_rows_filter_and_map_names() {
    let row = json!({
        "is_summary": false,
        "color_name": "Azorius (WU)",
        "wins": 6000,
        "games": 10000
    });
    assert_eq!(parse_color_rating_row(&row), Some(("WU".to_string(), 60.0)));

    let mono = json!({
        "is_summary": false,
        "color_name": "Mono-White",
        "wins": 5300,
        "games": 9900
    });
    assert_eq!(
        parse_color_rating_row(&mono),
        Some(("W".to_string(), 53.5))
    );

    let triple = json!({
        "is_summary": false,
        "color_name": "(WUR)",
        "wins": 3500,
        "games": 6000
    });
    assert_eq!(
        parse_color_rating_row(&triple),
        Some(("WUR".to_string(), 58.3))
    );
}

#[test]
fn summary_and_small_sample_rows_are_dropped() {
    let summary = json!({
        "is_summary": true,
        "color_name": "Two-color",
        "wins": 60000,
        "games": 100000
    });
    assert!(parse_color_rating_row(&summary).is_none());

    let small = json!({
        "is_summary": false,
        "color_name": "Azorius (WU)",
        "wins": 2500,
        "games": 4000
    });
    assert!(parse_color_rating_row(&small).is_none());
}

// ---------------------------------------------------------------------------
// Catalog fallback parsing
// ---------------------------------------------------------------------------

#[test]
fn catalog_page_yields_cards_and_cursor() {
    let page = json!({
        "has_more": true,
        "next_page": "https://catalog.example/page2",
        "data": [{
            "arena_id": 86463,
            "name": "Shire Scout",
            "cmc": 2.0,
            "mana_cost": "{1}{W}",
            "color_identity": ["W"],
            "type_line": "Creature — Halfling Scout",
            "rarity": "common",
            "image_uris": {"normal": "https://img.example/front.jpg"}
        }]
    });

    let (cards, next, has_more) = parse_catalog_page(&page);
    assert!(has_more);
    assert_eq!(next.as_deref(), Some("https://catalog.example/page2"));
    assert_eq!(cards.len(), 1);

    let (id, card) = &cards[0];
    assert_eq!(id, "86463");
    assert_eq!(card.name, "Shire Scout");
    assert_eq!(card.cmc, 2);
    assert_eq!(card.types, ["Creature".to_string()]);
    assert_eq!(card.rarity, Rarity::Common);
    assert_eq!(card.images, ["https://img.example/front.jpg".to_string()]);
}

#[test]
fn catalog_dual_face_keeps_both_images() {
    let record = json!({
        "arena_id": 90001,
        "name": "Dark Lord // Shadow Form",
        "cmc": 4.0,
        "color_identity": ["B"],
        "rarity": "rare",
        "type_line": "Creature — Wizard // Instant",
        "card_faces": [
            {
                "name": "Dark Lord",
                "mana_cost": "{3}{B}",
                "type_line": "Creature — Wizard",
                "image_uris": {"normal": "https://img.example/front.jpg"}
            },
            {
                "name": "Shadow Form",
                "mana_cost": "{B}",
                "type_line": "Instant",
                "image_uris": {"normal": "https://img.example/back.jpg"}
            }
        ]
    });

    let (id, card) = card_from_catalog(&record).unwrap();
    assert_eq!(id, "90001");
    assert_eq!(card.name, "Dark Lord // Shadow Form");
    assert_eq!(card.mana_cost, "{3}{B}");
    assert_eq!(card.rarity, Rarity::Rare);
    assert_eq!(
        card.images,
        [
            "https://img.example/front.jpg".to_string(),
            "https://img.example/back.jpg".to_string()
        ]
    );
}

#[test]
fn catalog_record_without_id_is_skipped() {
    assert!(card_from_catalog(&json!({"name": "No Id"})).is_none());
}

// ---------------------------------------------------------------------------
// Set lists
// ---------------------------------------------------------------------------

#[test]
fn event_set_rows_parse_and_uppercase() {
    let payload = json!([
        {"name": "Bloomburrow", "code": "blb", "start_date": "2024-07-30"},
        {"name": "Nameless"},
        {"code": "XXX"}
    ]);

    let sets = arena_draft_engine::dataset::sets::parse_event_sets(&payload);
    assert_eq!(sets.len(), 1);
    assert_eq!(sets[0].name, "Bloomburrow");
    assert_eq!(sets[0].code, "BLB");
    assert_eq!(sets[0].start_date.as_deref(), Some("2024-07-30"));
}

#[test]
fn catalog_set_codes_come_from_data_rows() {
    let payload = json!({
        "data": [
            {"code": "blb", "name": "Bloomburrow"},
            {"code": "ltr", "name": "Tales of Middle-earth"}
        ]
    });

    let codes = arena_draft_engine::dataset::sets::parse_catalog_sets(&payload);
    assert_eq!(codes, ["blb".to_string(), "ltr".to_string()]);

    assert!(arena_draft_engine::dataset::sets::parse_catalog_sets(&json!([])).is_empty());
}

// ---------------------------------------------------------------------------
// Merge
// ---------------------------------------------------------------------------

#[test]
fn merge_installs_full_filter_table() {
    let card = common::rated_card("Shire Scout", 2, "{1}{W}", &["Creature"], 0.0, 0);
    let mut ratings = HashMap::new();
    ratings.insert(
        "Shire Scout".to_string(),
        HashMap::from([(
            "All Decks".to_string(),
            RatingsBlock {
                gihwr: 56.78,
                gih: 1200,
                ..RatingsBlock::default()
            },
        )]),
    );

    let merged = merge_ratings(vec![("101".to_string(), card)], &ratings, true);
    let scout = &merged["101"];

    assert_eq!(scout.deck_colors.len(), 26);
    assert_eq!(scout.rating("All Decks").gihwr, 56.78);
    assert_eq!(scout.rating("WU"), RatingsBlock::default());
}

#[test]
fn merge_matching_only_drops_unrated_cards() {
    let rated = common::rated_card("Known", 2, "{1}{W}", &["Creature"], 0.0, 0);
    let unrated = common::rated_card("Unknown", 2, "{1}{W}", &["Creature"], 0.0, 0);

    let mut ratings = HashMap::new();
    ratings.insert("Known".to_string(), HashMap::new());

    let cards = vec![
        ("1".to_string(), rated.clone()),
        ("2".to_string(), unrated.clone()),
    ];

    let merged = merge_ratings(cards.clone(), &ratings, true);
    assert!(merged.contains_key("1"));
    assert!(!merged.contains_key("2"));

    // Without matching_only the unrated card stays, zero-initialized.
    let merged = merge_ratings(cards, &ratings, false);
    assert_eq!(merged.len(), 2);
    assert_eq!(merged["2"].rating("All Decks"), RatingsBlock::default());
}

#[test]
fn merge_normalizes_face_separators() {
    let mut card = common::rated_card("Fire", 2, "{1}{R}", &["Instant"], 0.0, 0);
    card.name = "Fire///Ice".to_string();

    let mut ratings = HashMap::new();
    ratings.insert(
        "Fire // Ice".to_string(),
        HashMap::from([(
            "All Decks".to_string(),
            RatingsBlock {
                gihwr: 58.0,
                gih: 500,
                ..RatingsBlock::default()
            },
        )]),
    );

    let merged = merge_ratings(vec![("7".to_string(), card)], &ratings, true);
    let fire = &merged["7"];
    assert_eq!(fire.name, "Fire // Ice");
    assert_eq!(fire.rating("All Decks").gihwr, 58.0);
}
