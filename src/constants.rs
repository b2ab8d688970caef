//! Dependency-free constants shared across the engine.
//!
//! Filter keys, card types, the grade/deviation table, wheel coefficients
//! and the fixed numeric thresholds live here so that the card model, the
//! scanner, the scoring engine and the deck suggester can all reference
//! them without importing each other.

// ---------------------------------------------------------------------------
// Colors and filters
// ---------------------------------------------------------------------------

/// The five mana color symbols, in canonical WUBRG order.
pub const MANA_SYMBOLS: [char; 5] = ['W', 'U', 'B', 'R', 'G'];

/// The aggregate filter covering every deck.
pub const FILTER_ALL_DECKS: &str = "All Decks";

/// Placeholder filter resolved to the pool's strongest color pair at
/// display time.
pub const FILTER_AUTO: &str = "Auto";

/// Every per-color ratings slice a built artifact carries: the aggregate,
/// 5 mono colors, 10 two-color pairs and 10 three-color triples.
pub const DECK_COLOR_FILTERS: [&str; 26] = [
    FILTER_ALL_DECKS,
    "W", "U", "B", "R", "G",
    "WU", "WB", "WR", "WG", "UB", "UR", "UG", "BR", "BG", "RG",
    "WUB", "WUR", "WUG", "WBR", "WBG", "WRG", "UBR", "UBG", "URG", "BRG",
];

/// The ten two-color pairs, the candidate pool for deck suggestion.
pub const COLOR_PAIRS: [&str; 10] = [
    "WU", "WB", "WR", "WG", "UB", "UR", "UG", "BR", "BG", "RG",
];

/// Basic land printed for each color when computing a mana base.
pub const BASIC_LANDS: [(&str, char); 5] = [
    ("Plains", 'W'),
    ("Island", 'U'),
    ("Swamp", 'B'),
    ("Mountain", 'R'),
    ("Forest", 'G'),
];

// ---------------------------------------------------------------------------
// Card types
// ---------------------------------------------------------------------------

pub const CARD_TYPE_CREATURE: &str = "Creature";
pub const CARD_TYPE_LAND: &str = "Land";

/// Card types recognized when parsing type lines and enumerators.
pub const CARD_TYPES: [&str; 7] = [
    "Creature",
    "Planeswalker",
    "Instant",
    "Sorcery",
    "Enchantment",
    "Artifact",
    "Land",
];

/// Types that count toward the non-creature spell minimum of a deck.
pub const NON_CREATURE_SPELL_TYPES: [&str; 5] = [
    "Instant",
    "Sorcery",
    "Artifact",
    "Enchantment",
    "Planeswalker",
];

// ---------------------------------------------------------------------------
// Grades
// ---------------------------------------------------------------------------

/// Letter grades with their z-score thresholds, best first.
///
/// A card earns the first grade whose deviation its z-score meets or
/// exceeds; the final `F` row is an unconditional floor.
pub const GRADE_DEVIATIONS: [(&str, f64); 13] = [
    ("A+", 2.33),
    ("A", 2.0),
    ("A-", 1.66),
    ("B+", 1.33),
    ("B", 1.0),
    ("B-", 0.66),
    ("C+", 0.33),
    ("C", 0.0),
    ("C-", -0.33),
    ("D+", -0.66),
    ("D", -1.0),
    ("D-", -1.33),
    ("F", f64::NEG_INFINITY),
];

/// Sentinel emitted when a grade or rating cannot be computed.
pub const GRADE_NA: &str = "NA";

/// The 0-5 rating scale spans mean ± this many standard deviations
/// (the A+ deviation, applied symmetrically).
pub const RATING_SCALE_DEVIATION: f64 = 2.33;

/// Rank of a grade for ordering: `A+` highest, `F` lowest. `None` for
/// strings that are not grades (including [`GRADE_NA`]).
pub fn grade_rank(grade: &str) -> Option<usize> {
    GRADE_DEVIATIONS
        .iter()
        .position(|(g, _)| *g == grade)
        .map(|idx| GRADE_DEVIATIONS.len() - idx)
}

// ---------------------------------------------------------------------------
// Fixed thresholds
// ---------------------------------------------------------------------------

/// Win-rate fields with fewer samples than this surface as 0 unless
/// Bayesian smoothing is enabled.
pub const SAMPLE_COUNT_THRESHOLD: u32 = 200;

/// Bayesian prior: 20 pseudo-games at a 50% win rate.
pub const BAYESIAN_PRIOR_GAMES: f64 = 20.0;
pub const BAYESIAN_PRIOR_WINS: f64 = 1000.0;

/// Cards with an ALSA below this never wheel.
pub const WHEEL_ALSA_MINIMUM: f64 = 2.0;

/// Target size of a limited deck, lands included.
pub const DECK_SIZE: usize = 40;

/// Color-rating rows with at most this many games are discarded.
pub const COLOR_RATING_MINIMUM_GAMES: u64 = 5000;

/// An artifact with fewer cards than this fails the integrity check.
pub const ARTIFACT_MINIMUM_CARDS: usize = 100;

// ---------------------------------------------------------------------------
// Wheel coefficients
// ---------------------------------------------------------------------------

/// Quadratic coefficients `[c0, c1, c2]` of the wheel-probability fit for
/// picks 1 through 8: `P(alsa) = c0 + c1 * alsa + c2 * alsa^2`, in
/// percentage points. Picks beyond the table clamp to the last row.
pub const WHEEL_COEFFICIENTS: [[f64; 3]; 8] = [
    [-10.9, 1.42, 0.31],
    [-10.1, 1.38, 0.30],
    [-9.3, 1.35, 0.29],
    [-8.4, 1.31, 0.28],
    [-7.5, 1.26, 0.27],
    [-6.5, 1.20, 0.26],
    [-5.4, 1.12, 0.25],
    [-4.2, 1.02, 0.24],
];
