//! Scoring engine tests: win-rate formatting, grades, wheel probability,
//! set metrics and value ordering.

mod common;

use std::collections::HashMap;

use arena_draft_engine::constants::FILTER_ALL_DECKS;
use arena_draft_engine::models::tier::{TierEntry, TierTable};
use arena_draft_engine::models::RatingsBlock;
use arena_draft_engine::scoring::{
    bayesian_smoothed, calculate_set_metrics, normalize_wheel, score_cards, wheel_probability,
    ColumnSource, FieldSpec, RowValue,
};
use arena_draft_engine::{deck, RatingsField, ResultFormat};

fn winrate_spec() -> FieldSpec {
    FieldSpec::new()
        .push("Card", ColumnSource::Name)
        .push("GIHWR", ColumnSource::Stat(RatingsField::Gihwr))
}

fn no_tiers() -> HashMap<String, TierTable> {
    HashMap::new()
}

// ---------------------------------------------------------------------------
// Bayesian smoothing
// ---------------------------------------------------------------------------

#[test]
fn bayesian_formula_matches_fixed_prior() {
    // 20 pseudo-games at 50%: (70*5 + 1000) / (5 + 20).
    assert_eq!(bayesian_smoothed(70.0, 5), 54.0);
    assert_eq!(bayesian_smoothed(0.0, 0), 50.0);
}

#[test]
fn low_sample_winrate_is_zero_without_bayesian() {
    let card = common::rated_card("Sample", 2, "{1}{W}", &["Creature"], 70.0, 5);
    let settings = common::default_settings();
    let metrics = common::metrics(55.0, 2.0);

    let rows = score_cards(
        &[card],
        &[FILTER_ALL_DECKS.to_string()],
        &winrate_spec(),
        &settings,
        &metrics,
        1,
        &no_tiers(),
    );
    assert_eq!(rows[0].values[1], RowValue::Number(0.0));
}

#[test]
fn low_sample_winrate_is_smoothed_with_bayesian() {
    let card = common::rated_card("Sample", 2, "{1}{W}", &["Creature"], 70.0, 5);
    let mut settings = common::default_settings();
    settings.bayesian_enabled = true;
    let metrics = common::metrics(55.0, 2.0);

    let rows = score_cards(
        &[card],
        &[FILTER_ALL_DECKS.to_string()],
        &winrate_spec(),
        &settings,
        &metrics,
        1,
        &no_tiers(),
    );
    assert_eq!(rows[0].values[1], RowValue::Number(54.0));
}

#[test]
fn threshold_sample_count_passes_raw_winrate() {
    let card = common::rated_card("Sample", 2, "{1}{W}", &["Creature"], 57.5, 200);
    let settings = common::default_settings();
    let metrics = common::metrics(55.0, 2.0);

    let rows = score_cards(
        &[card],
        &[FILTER_ALL_DECKS.to_string()],
        &winrate_spec(),
        &settings,
        &metrics,
        1,
        &no_tiers(),
    );
    assert_eq!(rows[0].values[1], RowValue::Number(57.5));
}

// ---------------------------------------------------------------------------
// Grades and ratings
// ---------------------------------------------------------------------------

#[test]
fn grade_assignment_walks_deviation_table() {
    let mut settings = common::default_settings();
    settings.result_format = ResultFormat::Grade;
    let metrics = common::metrics(55.0, 2.0);

    let a = common::rated_card("Exactly A", 2, "{1}{W}", &["Creature"], 59.0, 1000);
    let a_minus = common::rated_card("A minus", 2, "{1}{W}", &["Creature"], 58.5, 1000);

    let rows = score_cards(
        &[a, a_minus],
        &[FILTER_ALL_DECKS.to_string()],
        &winrate_spec(),
        &settings,
        &metrics,
        1,
        &no_tiers(),
    );
    assert_eq!(rows[0].values[1], RowValue::Grade("A"));
    assert_eq!(rows[1].values[1], RowValue::Grade("A-"));
}

#[test]
fn zero_deviation_grade_is_na() {
    let mut settings = common::default_settings();
    settings.result_format = ResultFormat::Grade;
    let metrics = common::metrics(55.0, 0.0);

    let card = common::rated_card("Sample", 2, "{1}{W}", &["Creature"], 59.0, 1000);
    let rows = score_cards(
        &[card],
        &[FILTER_ALL_DECKS.to_string()],
        &winrate_spec(),
        &settings,
        &metrics,
        1,
        &no_tiers(),
    );
    assert_eq!(rows[0].values[1], RowValue::Missing);
    assert_eq!(rows[0].values[1].to_string(), "NA");
}

#[test]
fn rating_projects_onto_five_point_scale() {
    let mut settings = common::default_settings();
    settings.result_format = ResultFormat::Rating;
    let metrics = common::metrics(55.0, 2.0);

    let card = common::rated_card("Sample", 2, "{1}{W}", &["Creature"], 59.0, 1000);
    let rows = score_cards(
        &[card.clone()],
        &[FILTER_ALL_DECKS.to_string()],
        &winrate_spec(),
        &settings,
        &metrics,
        1,
        &no_tiers(),
    );
    // (59 - (55 - 4.66)) / 9.32 * 5, one decimal.
    assert_eq!(rows[0].values[1], RowValue::Number(4.6));

    // Far-below-mean values clamp to 0.
    let weak = common::rated_card("Weak", 2, "{1}{W}", &["Creature"], 40.0, 1000);
    let rows = score_cards(
        &[weak],
        &[FILTER_ALL_DECKS.to_string()],
        &winrate_spec(),
        &settings,
        &metrics,
        1,
        &no_tiers(),
    );
    assert_eq!(rows[0].values[1], RowValue::Number(0.0));
}

#[test]
fn zero_deviation_rating_clamps_to_zero() {
    let mut settings = common::default_settings();
    settings.result_format = ResultFormat::Rating;
    let metrics = common::metrics(55.0, 0.0);

    let card = common::rated_card("Sample", 2, "{1}{W}", &["Creature"], 59.0, 1000);
    let rows = score_cards(
        &[card],
        &[FILTER_ALL_DECKS.to_string()],
        &winrate_spec(),
        &settings,
        &metrics,
        1,
        &no_tiers(),
    );
    assert_eq!(rows[0].values[1], RowValue::Number(0.0));
}

// ---------------------------------------------------------------------------
// Columns
// ---------------------------------------------------------------------------

#[test]
fn empty_card_list_scores_to_empty() {
    let settings = common::default_settings();
    let rows = score_cards(
        &[],
        &[FILTER_ALL_DECKS.to_string()],
        &winrate_spec(),
        &settings,
        &common::metrics(55.0, 2.0),
        1,
        &no_tiers(),
    );
    assert!(rows.is_empty());
}

#[test]
fn colors_column_respects_identity_toggle() {
    let mut card = common::rated_card("Hybrid", 3, "{1}{W}{W}", &["Creature"], 55.0, 1000);
    card.colors = vec!["W".to_string(), "U".to_string()];

    let spec = FieldSpec::new().push("Colors", ColumnSource::Colors);
    let metrics = common::metrics(55.0, 2.0);

    let mut settings = common::default_settings();
    let rows = score_cards(
        &[card.clone()],
        &[],
        &spec,
        &settings,
        &metrics,
        1,
        &no_tiers(),
    );
    assert_eq!(rows[0].values[0], RowValue::Text("W".to_string()));

    settings.color_identity_enabled = true;
    let rows = score_cards(&[card], &[], &spec, &settings, &metrics, 1, &no_tiers());
    assert_eq!(rows[0].values[0], RowValue::Text("WU".to_string()));
}

#[test]
fn lands_always_use_color_identity() {
    let mut land = common::rated_card("Tower", 0, "", &["Land"], 55.0, 1000);
    land.colors = vec!["U".to_string(), "B".to_string()];

    let spec = FieldSpec::new().push("Colors", ColumnSource::Colors);
    let settings = common::default_settings();
    let rows = score_cards(
        &[land],
        &[],
        &spec,
        &settings,
        &common::metrics(55.0, 2.0),
        1,
        &no_tiers(),
    );
    assert_eq!(rows[0].values[0], RowValue::Text("UB".to_string()));
}

#[test]
fn tier_column_stars_commented_entries() {
    let mut table = TierTable::default();
    table.ratings.insert(
        "Plain".to_string(),
        TierEntry {
            rating: "B+".to_string(),
            comment: String::new(),
        },
    );
    table.ratings.insert(
        "Commented".to_string(),
        TierEntry {
            rating: "A".to_string(),
            comment: "bomb".to_string(),
        },
    );
    let tiers = HashMap::from([("Tier_LTR_0".to_string(), table)]);

    let spec = FieldSpec::new().push("Tier", ColumnSource::Tier("Tier_LTR_0".to_string()));
    let settings = common::default_settings();
    let metrics = common::metrics(55.0, 2.0);

    let cards = [
        common::rated_card("Plain", 2, "{1}{W}", &["Creature"], 55.0, 1000),
        common::rated_card("Commented", 2, "{1}{W}", &["Creature"], 55.0, 1000),
        common::rated_card("Absent", 2, "{1}{W}", &["Creature"], 55.0, 1000),
    ];
    let rows = score_cards(&cards, &[], &spec, &settings, &metrics, 1, &tiers);

    assert_eq!(rows[0].values[0], RowValue::Text("B+".to_string()));
    assert_eq!(rows[1].values[0], RowValue::Text("*A".to_string()));
    assert_eq!(rows[2].values[0], RowValue::Missing);
}

#[test]
fn best_value_across_filters_is_kept() {
    let card = common::with_filter(
        common::rated_card("Sample", 2, "{1}{W}", &["Creature"], 56.0, 1000),
        "WU",
        RatingsBlock {
            gihwr: 61.0,
            gih: 900,
            ..RatingsBlock::default()
        },
    );
    let settings = common::default_settings();
    let rows = score_cards(
        &[card],
        &[FILTER_ALL_DECKS.to_string(), "WU".to_string()],
        &winrate_spec(),
        &settings,
        &common::metrics(55.0, 2.0),
        1,
        &no_tiers(),
    );
    assert_eq!(rows[0].values[1], RowValue::Number(61.0));
}

// ---------------------------------------------------------------------------
// Wheel probability
// ---------------------------------------------------------------------------

#[test]
fn wheel_requires_minimum_alsa() {
    assert_eq!(wheel_probability(1, 1.9), 0.0);
    assert_eq!(wheel_probability(1, 0.0), 0.0);
}

#[test]
fn wheel_pick_zero_clamps_to_one() {
    assert_eq!(wheel_probability(0, 6.0), wheel_probability(1, 6.0));
}

#[test]
fn wheel_pick_beyond_table_clamps_to_last_row() {
    assert_eq!(wheel_probability(9, 6.0), wheel_probability(8, 6.0));
    assert_eq!(wheel_probability(15, 6.0), wheel_probability(8, 6.0));
}

#[test]
fn wheel_negative_polynomial_clamps_to_zero() {
    // Pick 1 at the minimum ALSA evaluates negative.
    assert_eq!(wheel_probability(1, 2.0), 0.0);
}

#[test]
fn wheel_value_is_rounded_to_one_decimal() {
    let value = wheel_probability(1, 10.0);
    assert!(value > 0.0);
    assert!((value * 10.0 - (value * 10.0).round()).abs() < 1e-9);
}

#[test]
fn wheel_normalization_sums_to_percentages() {
    assert_eq!(normalize_wheel(&[30.0, 10.0]), vec![75.0, 25.0]);
    assert_eq!(normalize_wheel(&[0.0, 0.0]), vec![0.0, 0.0]);
    assert!(normalize_wheel(&[]).is_empty());
}

// ---------------------------------------------------------------------------
// Set metrics
// ---------------------------------------------------------------------------

#[test]
fn metrics_use_sample_standard_deviation() {
    let cards = [
        common::rated_card("A", 2, "{1}{W}", &["Creature"], 54.0, 1000),
        common::rated_card("B", 2, "{1}{W}", &["Creature"], 56.0, 1000),
        common::rated_card("C", 2, "{1}{W}", &["Creature"], 58.0, 1000),
    ];
    let metrics = calculate_set_metrics(cards.iter(), false);
    assert_eq!(metrics.mean, 56.0);
    assert_eq!(metrics.standard_deviation, 2.0);
}

#[test]
fn metrics_need_more_than_two_samples_for_deviation() {
    let cards = [
        common::rated_card("A", 2, "{1}{W}", &["Creature"], 54.0, 1000),
        common::rated_card("B", 2, "{1}{W}", &["Creature"], 58.0, 1000),
    ];
    let metrics = calculate_set_metrics(cards.iter(), false);
    assert_eq!(metrics.mean, 56.0);
    assert_eq!(metrics.standard_deviation, 0.0);
}

#[test]
fn metrics_skip_zero_winrate_cards() {
    let cards = [
        common::rated_card("A", 2, "{1}{W}", &["Creature"], 54.0, 1000),
        common::rated_card("B", 2, "{1}{W}", &["Creature"], 58.0, 1000),
        common::rated_card("Zero", 2, "{1}{W}", &["Creature"], 0.0, 0),
    ];
    let metrics = calculate_set_metrics(cards.iter(), false);
    assert_eq!(metrics.mean, 56.0);
}

// ---------------------------------------------------------------------------
// Ordering
// ---------------------------------------------------------------------------

#[test]
fn grade_ordering_runs_a_plus_down_to_na() {
    use std::cmp::Ordering;

    assert_eq!(
        RowValue::Grade("A+").cmp_values(&RowValue::Grade("A")),
        Ordering::Greater
    );
    assert_eq!(
        RowValue::Grade("C").cmp_values(&RowValue::Grade("B-")),
        Ordering::Less
    );
    assert_eq!(
        RowValue::Grade("F").cmp_values(&RowValue::Missing),
        Ordering::Greater
    );
    assert_eq!(
        RowValue::Missing.cmp_values(&RowValue::Number(0.0)),
        Ordering::Less
    );
    assert_eq!(
        RowValue::Number(55.5).cmp_values(&RowValue::Number(55.4)),
        Ordering::Greater
    );
}

// ---------------------------------------------------------------------------
// Auto filter resolution
// ---------------------------------------------------------------------------

#[test]
fn auto_filter_resolves_to_strongest_pair() {
    let mut pool = Vec::new();
    for i in 0..10 {
        pool.push(common::rated_card(
            &format!("White {}", i),
            2,
            "{1}{W}",
            &["Creature"],
            60.0,
            1000,
        ));
        pool.push(common::rated_card(
            &format!("Blue {}", i),
            2,
            "{1}{U}",
            &["Creature"],
            60.0,
            1000,
        ));
    }

    let settings = common::default_settings();
    let metrics = common::metrics(55.0, 3.0);
    let filters = deck::resolve_filters(
        &["Auto".to_string()],
        &pool,
        &metrics,
        &settings,
        &HashMap::new(),
    );
    assert_eq!(filters, ["WU".to_string()]);
}

#[test]
fn auto_filter_falls_back_to_all_decks_on_empty_pool() {
    let settings = common::default_settings();
    let metrics = common::metrics(55.0, 3.0);
    let filters = deck::resolve_filters(
        &["Auto".to_string()],
        &[],
        &metrics,
        &settings,
        &HashMap::new(),
    );
    assert_eq!(filters, [FILTER_ALL_DECKS.to_string()]);
}
