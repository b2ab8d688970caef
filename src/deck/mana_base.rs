//! Basic-land allocation for a suggested deck.

use crate::constants::{BASIC_LANDS, CARD_TYPE_LAND, DECK_SIZE, MANA_SYMBOLS};
use crate::models::card::card_colors;
use crate::models::Card;

/// Compute the basic lands that bring a deck to 40 cards.
///
/// Pip demand is counted over the non-lands' mana costs, reduced by one
/// per matching color produced by lands already in the deck, and basics
/// are allocated proportionally (ceiling division), capped at the
/// remaining slots.
pub fn mana_base(deck: &[Card]) -> Vec<Card> {
    let deck_size: usize = deck.iter().map(|c| c.count.max(1) as usize).sum();
    let lands_needed = DECK_SIZE.saturating_sub(deck_size);
    if lands_needed == 0 {
        return Vec::new();
    }

    let mut demand: Vec<(char, i64)> = MANA_SYMBOLS.iter().map(|&c| (c, 0i64)).collect();

    for card in deck {
        let copies = i64::from(card.count.max(1));
        if card.is_land() {
            for color in &card.colors {
                let Some(symbol) = color.chars().next() else {
                    continue;
                };
                if let Some(slot) = demand.iter_mut().find(|(c, _)| *c == symbol) {
                    slot.1 -= copies;
                }
            }
        } else {
            for (symbol, pips) in card_colors(&card.mana_cost) {
                if let Some(slot) = demand.iter_mut().find(|(c, _)| *c == symbol) {
                    slot.1 += i64::from(pips) * copies;
                }
            }
        }
    }

    for slot in &mut demand {
        slot.1 = slot.1.max(0);
    }

    let total_demand: i64 = demand.iter().map(|(_, n)| n).sum();
    if total_demand == 0 {
        return Vec::new();
    }

    let mut lands = Vec::new();
    let mut remaining = lands_needed as i64;

    for (symbol, pips) in demand {
        if pips == 0 || remaining == 0 {
            continue;
        }
        let share = (pips * lands_needed as i64 + total_demand - 1) / total_demand;
        let count = share.min(remaining);
        remaining -= count;

        let Some((name, _)) = BASIC_LANDS.iter().find(|(_, c)| *c == symbol) else {
            continue;
        };
        lands.push(Card {
            name: (*name).to_string(),
            cmc: 0,
            mana_cost: format!("{{{}}}", symbol),
            colors: vec![symbol.to_string()],
            types: vec![CARD_TYPE_LAND.to_string()],
            count: count as u32,
            ..Card::default()
        });
    }

    lands
}
