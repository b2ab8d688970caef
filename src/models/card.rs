//! The per-card record passed through the engine, its ratings block, and
//! the small card utility surface shared by the scanner, the scoring
//! engine and the deck suggester.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::constants::{
    CARD_TYPE_CREATURE, CARD_TYPE_LAND, DECK_COLOR_FILTERS, MANA_SYMBOLS,
    NON_CREATURE_SPELL_TYPES,
};

// ---------------------------------------------------------------------------
// RatingsBlock — one per-color slice of the community statistics
// ---------------------------------------------------------------------------

/// Per-filter ratings for a card. Win rates and IWD are percentages,
/// ALSA/ATA are pick positions, the remaining fields are sample counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RatingsBlock {
    pub alsa: f64,
    pub ata: f64,
    pub iwd: f64,
    pub gihwr: f64,
    pub ohwr: f64,
    pub gpwr: f64,
    pub gdwr: f64,
    pub gnswr: f64,
    pub gih: u32,
    pub ngoh: u32,
    pub ngp: u32,
    pub ngd: u32,
    pub ngnd: u32,
}

// ---------------------------------------------------------------------------
// RatingsField — closed selector over the ratings block
// ---------------------------------------------------------------------------

/// Selects one [`RatingsBlock`] field at display time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RatingsField {
    Alsa,
    Ata,
    Iwd,
    Gihwr,
    Ohwr,
    Gpwr,
    Gdwr,
    Gnswr,
    Gih,
    Ngoh,
    Ngp,
    Ngd,
    Ngnd,
}

impl RatingsField {
    /// Whether the field is a win rate subject to formatting and the
    /// sample-count threshold.
    pub fn is_win_rate(self) -> bool {
        matches!(
            self,
            RatingsField::Gihwr
                | RatingsField::Ohwr
                | RatingsField::Gpwr
                | RatingsField::Gdwr
                | RatingsField::Gnswr
        )
    }

    /// Raw value of the field.
    pub fn value(self, block: &RatingsBlock) -> f64 {
        match self {
            RatingsField::Alsa => block.alsa,
            RatingsField::Ata => block.ata,
            RatingsField::Iwd => block.iwd,
            RatingsField::Gihwr => block.gihwr,
            RatingsField::Ohwr => block.ohwr,
            RatingsField::Gpwr => block.gpwr,
            RatingsField::Gdwr => block.gdwr,
            RatingsField::Gnswr => block.gnswr,
            RatingsField::Gih => f64::from(block.gih),
            RatingsField::Ngoh => f64::from(block.ngoh),
            RatingsField::Ngp => f64::from(block.ngp),
            RatingsField::Ngd => f64::from(block.ngd),
            RatingsField::Ngnd => f64::from(block.ngnd),
        }
    }

    /// Sample count paired with a win-rate field; 0 for every other field.
    pub fn sample_count(self, block: &RatingsBlock) -> u32 {
        match self {
            RatingsField::Gihwr => block.gih,
            RatingsField::Ohwr => block.ngoh,
            RatingsField::Gpwr => block.ngp,
            RatingsField::Gdwr => block.ngd,
            RatingsField::Gnswr => block.ngnd,
            _ => 0,
        }
    }
}

// ---------------------------------------------------------------------------
// Rarity
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rarity {
    #[default]
    Common,
    Uncommon,
    Rare,
    Mythic,
}

// ---------------------------------------------------------------------------
// Card
// ---------------------------------------------------------------------------

/// The universal per-card unit. Dual-faced cards are stored once, under
/// the front face, with `" // "` joining the face names.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Card {
    pub name: String,
    pub cmc: u32,
    pub mana_cost: String,
    /// Color identity symbols; may exceed the mana cost, notably for
    /// lands and activated abilities.
    #[serde(default)]
    pub colors: Vec<String>,
    /// Ordered card types; `Creature` is normalized to index 0.
    #[serde(default)]
    pub types: Vec<String>,
    pub rarity: Rarity,
    /// Front-face image URL, optionally followed by the back face.
    #[serde(default)]
    pub images: Vec<String>,
    /// One ratings block per deck-color filter key.
    #[serde(default)]
    pub deck_colors: HashMap<String, RatingsBlock>,
    /// Copies of the card; populated only after deck stacking.
    #[serde(default)]
    pub count: u32,
}

impl Card {
    /// Ratings block for a filter key, zero-filled when absent.
    pub fn rating(&self, filter: &str) -> RatingsBlock {
        self.deck_colors.get(filter).copied().unwrap_or_default()
    }

    pub fn is_creature(&self) -> bool {
        self.types.iter().any(|t| t == CARD_TYPE_CREATURE)
    }

    pub fn is_land(&self) -> bool {
        self.types.iter().any(|t| t == CARD_TYPE_LAND)
    }

    /// Instant, sorcery, artifact, enchantment or planeswalker, and not
    /// a creature.
    pub fn is_noncreature_spell(&self) -> bool {
        !self.is_creature()
            && self
                .types
                .iter()
                .any(|t| NON_CREATURE_SPELL_TYPES.contains(&t.as_str()))
    }

    /// The color identity joined into a single string, e.g. `"WU"`.
    pub fn colors_string(&self) -> String {
        self.colors.concat()
    }

    /// Name of the front face.
    pub fn first_face(&self) -> &str {
        first_face(&self.name)
    }
}

/// A `deck_colors` table with every filter key present and zero-filled.
pub fn zeroed_deck_colors() -> HashMap<String, RatingsBlock> {
    DECK_COLOR_FILTERS
        .iter()
        .map(|f| ((*f).to_string(), RatingsBlock::default()))
        .collect()
}

/// Move `Creature` to index 0, keeping the rest of the order.
pub fn normalize_creature_first(types: &mut Vec<String>) {
    if let Some(idx) = types.iter().position(|t| t == CARD_TYPE_CREATURE) {
        if idx > 0 {
            let creature = types.remove(idx);
            types.insert(0, creature);
        }
    }
}

/// Front face of a possibly dual-faced name.
pub fn first_face(name: &str) -> &str {
    name.split(" // ").next().unwrap_or(name)
}

/// Normalize the ratings service's `"///"` face separator to `" // "`.
pub fn normalize_face_separator(name: &str) -> String {
    name.replace(" /// ", " // ").replace("///", " // ")
}

// ---------------------------------------------------------------------------
// Card utility surface
// ---------------------------------------------------------------------------

/// Collapse duplicate cards by name, carrying the copy count. Idempotent:
/// stacking a stacked list returns an equal list.
pub fn stack_cards(cards: &[Card]) -> Vec<Card> {
    let mut order: Vec<String> = Vec::new();
    let mut stacked: HashMap<String, Card> = HashMap::new();

    for card in cards {
        let copies = card.count.max(1);
        match stacked.get_mut(&card.name) {
            Some(existing) => existing.count += copies,
            None => {
                let mut entry = card.clone();
                entry.count = copies;
                order.push(card.name.clone());
                stacked.insert(card.name.clone(), entry);
            }
        }
    }

    order
        .into_iter()
        .filter_map(|name| stacked.remove(&name))
        .collect()
}

/// Parse a mana-cost string into an ordered color -> pip-count mapping.
///
/// Sections are tested for symbol membership, so a hybrid `{W/U}` section
/// counts one pip toward both W and U. Colors appear in first-seen order.
pub fn card_colors(mana_cost: &str) -> Vec<(char, u32)> {
    let mut counts: Vec<(char, u32)> = Vec::new();

    for section in mana_cost_sections(mana_cost) {
        for symbol in MANA_SYMBOLS {
            if section.contains(symbol) {
                match counts.iter_mut().find(|(c, _)| *c == symbol) {
                    Some((_, n)) => *n += 1,
                    None => counts.push((symbol, 1)),
                }
            }
        }
    }

    counts
}

/// The distinct color symbols of a mana cost, in first-seen order.
pub fn mana_cost_colors(mana_cost: &str) -> Vec<char> {
    card_colors(mana_cost).into_iter().map(|(c, _)| c).collect()
}

/// Row tag for UI coloring; computed here for determinism.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorTag {
    White,
    Blue,
    Black,
    Red,
    Green,
    Gold,
    Colorless,
}

impl ColorTag {
    pub fn as_str(self) -> &'static str {
        match self {
            ColorTag::White => "white",
            ColorTag::Blue => "blue",
            ColorTag::Black => "black",
            ColorTag::Red => "red",
            ColorTag::Green => "green",
            ColorTag::Gold => "gold",
            ColorTag::Colorless => "colorless",
        }
    }
}

/// Classify a mana cost as exactly one row color tag.
pub fn row_color_tag(mana_cost: &str) -> ColorTag {
    let colors = mana_cost_colors(mana_cost);
    match colors.as_slice() {
        [] => ColorTag::Colorless,
        ['W'] => ColorTag::White,
        ['U'] => ColorTag::Blue,
        ['B'] => ColorTag::Black,
        ['R'] => ColorTag::Red,
        ['G'] => ColorTag::Green,
        _ => ColorTag::Gold,
    }
}

/// Split a `{2}{W}{W}`-style cost into its brace-delimited sections.
fn mana_cost_sections(mana_cost: &str) -> Vec<&str> {
    let mut sections = Vec::new();
    let mut rest = mana_cost;
    while let Some(open) = rest.find('{') {
        let Some(close) = rest[open..].find('}') else {
            break;
        };
        sections.push(&rest[open + 1..open + close]);
        rest = &rest[open + close + 1..];
    }
    sections
}
