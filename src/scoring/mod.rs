//! The card scoring engine.
//!
//! Pure transformation from `(card, filter, settings, metrics, pick)` to a
//! row of display values. Total: every column of every row is produced,
//! with `NA` substituted where a value cannot be computed.

pub mod metrics;
pub mod wheel;

pub use metrics::{bayesian_smoothed, calculate_set_metrics, SetMetrics};
pub use wheel::{normalize_wheel, wheel_probability};

use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;

use crate::constants::{
    FILTER_ALL_DECKS, GRADE_DEVIATIONS, GRADE_NA, RATING_SCALE_DEVIATION,
    SAMPLE_COUNT_THRESHOLD,
};
use crate::models::card::{first_face, mana_cost_colors};
use crate::models::{Card, RatingsField, TierTable};
use crate::settings::{ResultFormat, Settings};

// ---------------------------------------------------------------------------
// Column specification
// ---------------------------------------------------------------------------

/// Source of one output column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnSource {
    Name,
    Count,
    Colors,
    Wheel,
    /// A tier-table id from the loaded tier lists.
    Tier(String),
    /// A ratings-block field.
    Stat(RatingsField),
}

/// Ordered mapping of output column label to source.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldSpec {
    pub columns: Vec<(String, ColumnSource)>,
}

impl FieldSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(mut self, label: impl Into<String>, source: ColumnSource) -> Self {
        self.columns.push((label.into(), source));
        self
    }
}

// ---------------------------------------------------------------------------
// RowValue
// ---------------------------------------------------------------------------

/// One display value. Numeric values sort numerically, grades by the
/// fixed A+..F order, and `Missing` (shown as `NA`) sorts below
/// everything.
#[derive(Debug, Clone, PartialEq)]
pub enum RowValue {
    Text(String),
    Number(f64),
    Grade(&'static str),
    Missing,
}

impl RowValue {
    fn class_rank(&self) -> u8 {
        match self {
            RowValue::Missing => 0,
            RowValue::Text(_) => 1,
            RowValue::Grade(_) => 2,
            RowValue::Number(_) => 3,
        }
    }

    /// Grade-aware total ordering across values of one column.
    pub fn cmp_values(&self, other: &Self) -> Ordering {
        match (self, other) {
            (RowValue::Number(a), RowValue::Number(b)) => {
                a.partial_cmp(b).unwrap_or(Ordering::Equal)
            }
            (RowValue::Grade(a), RowValue::Grade(b)) => {
                let ra = crate::constants::grade_rank(a).unwrap_or(0);
                let rb = crate::constants::grade_rank(b).unwrap_or(0);
                ra.cmp(&rb)
            }
            (RowValue::Text(a), RowValue::Text(b)) => a.cmp(b),
            (RowValue::Missing, RowValue::Missing) => Ordering::Equal,
            _ => self.class_rank().cmp(&other.class_rank()),
        }
    }
}

impl fmt::Display for RowValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowValue::Text(s) => write!(f, "{}", s),
            RowValue::Number(n) => write!(f, "{}", n),
            RowValue::Grade(g) => write!(f, "{}", g),
            RowValue::Missing => write!(f, "{}", GRADE_NA),
        }
    }
}

/// One scored card: the column values in [`FieldSpec`] order.
#[derive(Debug, Clone, PartialEq)]
pub struct CardRow {
    pub name: String,
    pub values: Vec<RowValue>,
}

// ---------------------------------------------------------------------------
// score_cards
// ---------------------------------------------------------------------------

/// Score a candidate card list.
///
/// `filters` must already be resolved (the `"Auto"` placeholder is mapped
/// to a concrete filter by the caller). For stat columns the best value
/// across the given filters is kept, compared with the grade-aware
/// ordering. An empty card list produces an empty result.
pub fn score_cards(
    cards: &[Card],
    filters: &[String],
    spec: &FieldSpec,
    settings: &Settings,
    metrics: &SetMetrics,
    pick_number: u32,
    tier_tables: &HashMap<String, TierTable>,
) -> Vec<CardRow> {
    if cards.is_empty() {
        return Vec::new();
    }

    let filters: Vec<&str> = if filters.is_empty() {
        vec![FILTER_ALL_DECKS]
    } else {
        filters.iter().map(String::as_str).collect()
    };

    let wheel_raw: Vec<f64> = cards
        .iter()
        .map(|c| wheel_probability(pick_number, c.rating(FILTER_ALL_DECKS).alsa))
        .collect();
    let wheel_pct = normalize_wheel(&wheel_raw);

    cards
        .iter()
        .enumerate()
        .map(|(idx, card)| CardRow {
            name: card.name.clone(),
            values: spec
                .columns
                .iter()
                .map(|(_, source)| {
                    column_value(card, source, &filters, settings, metrics, wheel_pct[idx], tier_tables)
                })
                .collect(),
        })
        .collect()
}

fn column_value(
    card: &Card,
    source: &ColumnSource,
    filters: &[&str],
    settings: &Settings,
    metrics: &SetMetrics,
    wheel_pct: f64,
    tier_tables: &HashMap<String, TierTable>,
) -> RowValue {
    match source {
        ColumnSource::Name => RowValue::Text(card.name.clone()),
        ColumnSource::Count => RowValue::Number(f64::from(card.count)),
        ColumnSource::Colors => RowValue::Text(colors_column(card, settings)),
        ColumnSource::Wheel => RowValue::Number(wheel_pct),
        ColumnSource::Tier(id) => tier_column(card, id, tier_tables),
        ColumnSource::Stat(field) => stat_column(card, *field, filters, settings, metrics),
    }
}

fn colors_column(card: &Card, settings: &Settings) -> String {
    if settings.color_identity_enabled || card.is_land() {
        card.colors_string()
    } else {
        mana_cost_colors(&card.mana_cost).into_iter().collect()
    }
}

fn tier_column(card: &Card, id: &str, tier_tables: &HashMap<String, TierTable>) -> RowValue {
    let Some(entry) = tier_tables
        .get(id)
        .and_then(|t| t.entry(first_face(&card.name)))
    else {
        return RowValue::Missing;
    };
    if entry.comment.is_empty() {
        RowValue::Text(entry.rating.clone())
    } else {
        RowValue::Text(format!("*{}", entry.rating))
    }
}

fn stat_column(
    card: &Card,
    field: RatingsField,
    filters: &[&str],
    settings: &Settings,
    metrics: &SetMetrics,
) -> RowValue {
    let mut best: Option<(RowValue, f64)> = None;

    for filter in filters {
        let block = card.rating(filter);
        let value = if field.is_win_rate() {
            format_winrate(field.value(&block), field.sample_count(&block), settings, metrics)
        } else {
            RowValue::Number(field.value(&block))
        };

        // Dormant unless the weights are configured: break ordering ties
        // toward earlier picks and better improvement-when-drawn.
        let tie_break = settings.iwd_weight * block.iwd - settings.alsa_weight * block.alsa;

        best = match best {
            None => Some((value, tie_break)),
            Some((current, current_tie)) => {
                let keep_new = match value.cmp_values(&current) {
                    Ordering::Greater => true,
                    Ordering::Equal => tie_break > current_tie,
                    Ordering::Less => false,
                };
                if keep_new {
                    Some((value, tie_break))
                } else {
                    Some((current, current_tie))
                }
            }
        };
    }

    best.map(|(value, _)| value).unwrap_or(RowValue::Missing)
}

// ---------------------------------------------------------------------------
// Win-rate formatting
// ---------------------------------------------------------------------------

/// Format one win-rate value according to the configured result format.
///
/// Raw mode returns 0 below the sample threshold unless Bayesian
/// smoothing is enabled; rating mode projects onto a 0-5 scale anchored
/// at mean ± 2.33 sigma; grade mode walks the deviation table top-down.
pub fn format_winrate(
    win_rate: f64,
    sample_count: u32,
    settings: &Settings,
    metrics: &SetMetrics,
) -> RowValue {
    let value = if settings.bayesian_enabled {
        bayesian_smoothed(win_rate, sample_count)
    } else if sample_count < SAMPLE_COUNT_THRESHOLD {
        0.0
    } else {
        win_rate
    };

    match settings.result_format {
        ResultFormat::WinRate => RowValue::Number(value),
        ResultFormat::Rating => RowValue::Number(rating_scale(value, metrics)),
        ResultFormat::Grade => {
            if metrics.standard_deviation == 0.0 {
                RowValue::Missing
            } else {
                let z = (value - metrics.mean) / metrics.standard_deviation;
                RowValue::Grade(letter_grade(z))
            }
        }
    }
}

/// Project a win rate onto the 0-5 scale, one decimal.
fn rating_scale(value: f64, metrics: &SetMetrics) -> f64 {
    if metrics.standard_deviation == 0.0 {
        return 0.0;
    }
    let span = RATING_SCALE_DEVIATION * metrics.standard_deviation;
    let lower = metrics.mean - span;
    let rating = (value - lower) / (2.0 * span) * 5.0;
    (rating.clamp(0.0, 5.0) * 10.0).round() / 10.0
}

/// First grade whose deviation the z-score meets or exceeds.
fn letter_grade(z: f64) -> &'static str {
    for (grade, deviation) in GRADE_DEVIATIONS {
        if z >= deviation {
            return grade;
        }
    }
    GRADE_DEVIATIONS[GRADE_DEVIATIONS.len() - 1].0
}
