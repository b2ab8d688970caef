//! Deck suggester: proposes archetype decks from the taken pool.
//!
//! Each viable color pair is tried with the Aggro/Mid/Control curve
//! templates; the best-rated archetype survives per pair. Cards in the
//! taken pool are treated as one copy each; only the basic lands appended
//! by the mana base carry counts.

pub mod archetype;
pub mod mana_base;

pub use archetype::Archetype;
pub use mana_base::mana_base;

use std::collections::HashMap;

use crate::constants::{
    COLOR_PAIRS, DECK_COLOR_FILTERS, DECK_SIZE, FILTER_ALL_DECKS, FILTER_AUTO, MANA_SYMBOLS,
};
use crate::models::card::{mana_cost_colors, stack_cards};
use crate::models::Card;
use crate::scoring::{bayesian_smoothed, SetMetrics};
use crate::settings::Settings;

// ---------------------------------------------------------------------------
// SuggestedDeck
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct SuggestedDeck {
    /// Color pair, with the splash color appended when one was found.
    pub colors: String,
    pub archetype: Archetype,
    pub deck_cards: Vec<Card>,
    pub sideboard_cards: Vec<Card>,
    pub rating: f64,
}

// ---------------------------------------------------------------------------
// Auto-color detection
// ---------------------------------------------------------------------------

/// Affinity of the pool toward each color: for every card whose aggregate
/// GIHWR clears the threshold, the margin is credited to each color in
/// its mana cost.
pub fn color_affinity(pool: &[Card], threshold: f64) -> Vec<(char, f64)> {
    let mut affinity: Vec<(char, f64)> = MANA_SYMBOLS.iter().map(|&c| (c, 0.0)).collect();

    for card in pool {
        let gihwr = card.rating(FILTER_ALL_DECKS).gihwr;
        if gihwr <= threshold {
            continue;
        }
        for color in mana_cost_colors(&card.mana_cost) {
            if let Some(slot) = affinity.iter_mut().find(|(c, _)| *c == color) {
                slot.1 += gihwr - threshold;
            }
        }
    }

    affinity
}

/// Rank candidate color combinations for the pool, strongest first, with
/// the "All Decks" baseline appended.
pub fn ranked_color_combinations(
    pool: &[Card],
    metrics: &SetMetrics,
    settings: &Settings,
    color_ratings: &HashMap<String, f64>,
) -> Vec<(String, f64)> {
    let threshold = metrics.mean - metrics.standard_deviation / 3.0;
    let mut affinity = color_affinity(pool, threshold);
    affinity.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    let top: Vec<(char, f64)> = affinity.into_iter().take(5).collect();

    let mut combos: HashMap<String, f64> = HashMap::new();
    let max_len = settings.colors_max.clamp(1, top.len());

    for mask in 1u32..(1 << top.len()) {
        let size = mask.count_ones() as usize;
        if size > max_len {
            continue;
        }
        let colors: Vec<char> = top
            .iter()
            .enumerate()
            .filter(|(i, _)| mask & (1 << i) != 0)
            .map(|(_, (c, _))| *c)
            .collect();

        // Permutations of the same colors collapse onto one filter key.
        let Some(filter) = canonical_filter(&colors) else {
            continue;
        };
        if combos.contains_key(&filter) {
            continue;
        }

        let base: f64 = colors
            .iter()
            .map(|c| top.iter().find(|(t, _)| t == c).map(|(_, a)| *a).unwrap_or(0.0))
            .sum();
        // Combinations without summary data are assumed average (50%).
        let rating_factor = color_ratings.get(&filter).map(|r| r / 100.0).unwrap_or(0.5);
        let curve_factor = curve_factor(pool, &filter, settings);

        combos.insert(filter, base * rating_factor * curve_factor);
    }

    let mut ranked: Vec<(String, f64)> = combos.into_iter().collect();
    // Equal weights resolve toward fewer colors (filter-table order).
    ranked.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| filter_index(&a.0).cmp(&filter_index(&b.0)))
    });

    let baseline = top.iter().map(|(_, a)| a).sum::<f64>() / MANA_SYMBOLS.len() as f64;
    ranked.push((FILTER_ALL_DECKS.to_string(), baseline));
    ranked
}

/// Resolve the pool's strongest color combination; `"All Decks"` when the
/// pool gives no signal.
pub fn auto_color_pair(
    pool: &[Card],
    metrics: &SetMetrics,
    settings: &Settings,
    color_ratings: &HashMap<String, f64>,
) -> String {
    let ranked = ranked_color_combinations(pool, metrics, settings, color_ratings);
    match ranked.first() {
        Some((filter, weight)) if *weight > 0.0 => filter.clone(),
        _ => FILTER_ALL_DECKS.to_string(),
    }
}

/// Replace the `"Auto"` placeholder with the pool's auto-color filter.
pub fn resolve_filters(
    filters: &[String],
    pool: &[Card],
    metrics: &SetMetrics,
    settings: &Settings,
    color_ratings: &HashMap<String, f64>,
) -> Vec<String> {
    filters
        .iter()
        .map(|f| {
            if f == FILTER_AUTO {
                auto_color_pair(pool, metrics, settings, color_ratings)
            } else {
                f.clone()
            }
        })
        .collect()
}

fn filter_index(filter: &str) -> usize {
    DECK_COLOR_FILTERS
        .iter()
        .position(|f| *f == filter)
        .unwrap_or(DECK_COLOR_FILTERS.len())
}

/// How well the pool's creatures castable in a filter fill a deck,
/// saturating at 1.
fn curve_factor(pool: &[Card], filter: &str, settings: &Settings) -> f64 {
    let creatures = pool
        .iter()
        .filter(|c| c.is_creature() && castable(c, filter))
        .count();
    (creatures as f64 / f64::from(settings.minimum_creature_count.max(1))).min(1.0)
}

// ---------------------------------------------------------------------------
// Splash detection
// ---------------------------------------------------------------------------

/// The strongest off-pair color against the splash threshold
/// (mean + 2.33 sigma), if any clears it.
pub fn splash_color(pool: &[Card], pair: &str, metrics: &SetMetrics) -> Option<char> {
    let threshold = metrics.mean + 2.33 * metrics.standard_deviation;
    let affinity = color_affinity(pool, threshold);

    affinity
        .into_iter()
        .filter(|(color, score)| !pair.contains(*color) && *score > 0.0)
        .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
        .map(|(color, _)| color)
}

// ---------------------------------------------------------------------------
// suggest_decks
// ---------------------------------------------------------------------------

/// Propose decks for every viable color pair, best rating first.
pub fn suggest_decks(
    pool: &[Card],
    metrics: &SetMetrics,
    settings: &Settings,
    color_ratings: &HashMap<String, f64>,
) -> Vec<SuggestedDeck> {
    let mut suggestions: Vec<SuggestedDeck> = Vec::new();

    for pair in COLOR_PAIRS {
        if !pair_is_viable(pool, pair, settings) {
            continue;
        }

        let colors = match splash_color(pool, pair, metrics) {
            Some(splash) => format!("{}{}", pair, splash),
            None => pair.to_string(),
        };

        let mut best: Option<SuggestedDeck> = None;
        for archetype in Archetype::ALL {
            let deck = build_deck(archetype, &colors, pool, metrics, settings);
            if deck.rating < settings.ratings_threshold {
                continue;
            }
            best = match best {
                Some(current) if current.rating >= deck.rating => Some(current),
                _ => Some(deck),
            };
        }

        if let Some(deck) = best {
            suggestions.push(deck);
        }
    }

    suggestions.sort_by(|a, b| b.rating.partial_cmp(&a.rating).unwrap_or(std::cmp::Ordering::Equal));
    suggestions
}

/// A pair is built only when, restricted to the pair, the pool holds
/// enough creatures, non-creature spells and total playables.
fn pair_is_viable(pool: &[Card], pair: &str, settings: &Settings) -> bool {
    let creatures = pool
        .iter()
        .filter(|c| c.is_creature() && castable(c, pair))
        .count() as u32;
    let noncreatures = pool
        .iter()
        .filter(|c| c.is_noncreature_spell() && castable(c, pair))
        .count() as u32;

    creatures >= settings.minimum_creature_count
        && noncreatures >= settings.minimum_noncreature_count
        && creatures + noncreatures >= settings.minimum_deck_total
}

// ---------------------------------------------------------------------------
// Deck construction
// ---------------------------------------------------------------------------

/// Build one archetype deck for a color combination.
pub fn build_deck(
    archetype: Archetype,
    colors: &str,
    pool: &[Card],
    metrics: &SetMetrics,
    settings: &Settings,
) -> SuggestedDeck {
    let template = archetype.template(settings).clone();
    let threshold = metrics.mean - metrics.standard_deviation / 3.0;
    let filter = canonical_filter(&colors.chars().collect::<Vec<_>>())
        .unwrap_or_else(|| FILTER_ALL_DECKS.to_string());

    let score = |card: &Card| -> f64 {
        let block = card.rating(&filter);
        if settings.bayesian_enabled {
            bayesian_smoothed(block.gihwr, block.gih)
        } else {
            block.gihwr
        }
    };

    let mut used = vec![false; pool.len()];
    let mut deck: Vec<usize> = Vec::new();

    // Creatures castable in the combination, best first.
    let mut creatures: Vec<usize> = (0..pool.len())
        .filter(|&i| pool[i].is_creature() && castable(&pool[i], colors))
        .collect();
    creatures.sort_by(|&a, &b| {
        score(&pool[b])
            .partial_cmp(&score(&pool[a]))
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    // Curve minimums per cmc bucket.
    for (bucket, &minimum) in template.distribution.iter().enumerate() {
        let mut taken = 0;
        for &i in &creatures {
            if taken >= minimum {
                break;
            }
            if !used[i] && cmc_bucket(pool[i].cmc) == bucket {
                used[i] = true;
                deck.push(i);
                taken += 1;
            }
        }
    }

    // Backfill toward the recommended creature count without pushing the
    // mean creature cmc over the archetype ceiling.
    let creature_cmc: f64 = deck.iter().map(|&i| f64::from(pool[i].cmc)).sum();
    let slots = (template.recommended_creature_count as usize).saturating_sub(deck.len());
    if slots > 0 {
        let candidates: Vec<usize> = creatures.iter().copied().filter(|&i| !used[i]).collect();
        let budget =
            template.cmc_average * f64::from(template.recommended_creature_count) - creature_cmc;

        let mut picked = Vec::new();
        if backfill_dfs(pool, &candidates, 0, slots, budget, &mut picked) {
            for i in picked {
                used[i] = true;
                deck.push(i);
            }
        } else {
            // No cmc-respecting fill exists; take the best remaining.
            for &i in &candidates {
                if deck.len() >= template.recommended_creature_count as usize {
                    break;
                }
                used[i] = true;
                deck.push(i);
            }
        }
    }

    // Fill the non-land slots with whatever scores best.
    let mut spells: Vec<usize> = (0..pool.len())
        .filter(|&i| !used[i] && !pool[i].is_land() && castable(&pool[i], colors))
        .collect();
    spells.sort_by(|&a, &b| {
        score(&pool[b])
            .partial_cmp(&score(&pool[a]))
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    for i in spells {
        if deck.len() >= template.maximum_card_count as usize {
            break;
        }
        used[i] = true;
        deck.push(i);
    }

    // Playable non-basic lands in the combination.
    for i in 0..pool.len() {
        if deck.len() >= DECK_SIZE {
            break;
        }
        if !used[i] && pool[i].is_land() && land_fits(&pool[i], colors) && score(&pool[i]) >= threshold
        {
            used[i] = true;
            deck.push(i);
        }
    }

    // Rating reflects the playables this pool produced for the template.
    let creature_count = deck.iter().filter(|&&i| pool[i].is_creature()).count();
    let creature_cmc: f64 = deck
        .iter()
        .filter(|&&i| pool[i].is_creature())
        .map(|&i| f64::from(pool[i].cmc))
        .sum();
    let mut rating: f64 = deck
        .iter()
        .map(|&i| score(&pool[i]))
        .filter(|s| *s > threshold)
        .sum();
    rating -= 50.0
        * f64::from(
            (template.recommended_creature_count).saturating_sub(creature_count as u32),
        );
    if creature_count > 0 && creature_cmc / creature_count as f64 > template.cmc_average {
        rating -= 500.0;
    }

    let mut deck_cards: Vec<Card> = deck.iter().map(|&i| pool[i].clone()).collect();
    deck_cards.extend(mana_base(&deck_cards));

    let sideboard_cards: Vec<Card> = (0..pool.len())
        .filter(|&i| !used[i])
        .map(|i| pool[i].clone())
        .collect();

    SuggestedDeck {
        colors: colors.to_string(),
        archetype,
        deck_cards,
        sideboard_cards,
        rating,
    }
}

/// Depth-first fill of `slots` creatures within a total-cmc budget,
/// preferring the best-scored candidates. Includes a candidate when it
/// fits the remaining budget, defers it otherwise; succeeds when every
/// slot is filled.
fn backfill_dfs(
    pool: &[Card],
    candidates: &[usize],
    index: usize,
    slots: usize,
    budget: f64,
    picked: &mut Vec<usize>,
) -> bool {
    if slots == 0 {
        return true;
    }
    if index >= candidates.len() {
        return false;
    }

    let cmc = f64::from(pool[candidates[index]].cmc);
    if cmc <= budget {
        picked.push(candidates[index]);
        if backfill_dfs(pool, candidates, index + 1, slots - 1, budget - cmc, picked) {
            return true;
        }
        picked.pop();
    }

    backfill_dfs(pool, candidates, index + 1, slots, budget, picked)
}

fn cmc_bucket(cmc: u32) -> usize {
    (cmc as usize).min(6)
}

/// Whether a spell's mana cost stays inside the color combination.
fn castable(card: &Card, colors: &str) -> bool {
    if card.is_land() {
        return land_fits(card, colors);
    }
    mana_cost_colors(&card.mana_cost)
        .iter()
        .all(|c| colors.contains(*c))
}

/// Whether a land's produced colors stay inside the color combination.
fn land_fits(card: &Card, colors: &str) -> bool {
    card.colors
        .iter()
        .all(|c| c.chars().next().map(|ch| colors.contains(ch)).unwrap_or(false))
}

/// Canonical filter key for a color set: WUBRG order, deduplicated, and
/// known to the filter table.
pub fn canonical_filter(colors: &[char]) -> Option<String> {
    let mut ordered: Vec<char> = MANA_SYMBOLS
        .iter()
        .copied()
        .filter(|c| colors.contains(c))
        .collect();
    if ordered.is_empty() {
        return None;
    }
    ordered.dedup();
    let key: String = ordered.into_iter().collect();
    DECK_COLOR_FILTERS
        .iter()
        .find(|f| **f == key)
        .map(|f| (*f).to_string())
}

// ---------------------------------------------------------------------------
// Copy-deck export
// ---------------------------------------------------------------------------

/// Render a deck and sideboard as an importable text block.
pub fn export_deck_text(deck: &[Card], sideboard: &[Card]) -> String {
    let mut out = String::from("Deck\n");
    for card in stack_cards(deck) {
        out.push_str(&format!("{} {}\n", card.count, card.name));
    }
    out.push('\n');
    out.push_str("Sideboard\n");
    for card in stack_cards(sideboard) {
        out.push_str(&format!("{} {}\n", card.count, card.name));
    }
    out
}
