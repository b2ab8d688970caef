//! Set-wide win-rate metrics and Bayesian smoothing.

use crate::constants::{BAYESIAN_PRIOR_GAMES, BAYESIAN_PRIOR_WINS, FILTER_ALL_DECKS};
use crate::models::Card;

/// Mean and sample standard deviation of the set's win rates.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SetMetrics {
    pub mean: f64,
    pub standard_deviation: f64,
}

/// Smooth a win rate toward the fixed 20-pseudo-game, 50% prior, rounded
/// to two decimals.
pub fn bayesian_smoothed(win_rate: f64, sample_count: u32) -> f64 {
    let n = f64::from(sample_count);
    let smoothed = (win_rate * n + BAYESIAN_PRIOR_WINS) / (n + BAYESIAN_PRIOR_GAMES);
    (smoothed * 100.0).round() / 100.0
}

/// Compute set metrics over the "All Decks" GIHWR population.
///
/// Cards with a zero raw GIHWR are excluded before optional smoothing
/// (smoothing a zero-sample card would fabricate the 50% prior). The
/// standard deviation uses the n-1 divisor and requires more than two
/// samples; it is zero otherwise.
pub fn calculate_set_metrics<'a, I>(cards: I, bayesian_enabled: bool) -> SetMetrics
where
    I: IntoIterator<Item = &'a Card>,
{
    let mut population: Vec<f64> = Vec::new();

    for card in cards {
        let block = card.rating(FILTER_ALL_DECKS);
        if block.gihwr != 0.0 {
            let value = if bayesian_enabled {
                bayesian_smoothed(block.gihwr, block.gih)
            } else {
                block.gihwr
            };
            population.push(value);
        }
    }

    if population.is_empty() {
        return SetMetrics::default();
    }

    let n = population.len() as f64;
    let mean = population.iter().sum::<f64>() / n;

    let standard_deviation = if population.len() > 2 {
        let variance = population
            .iter()
            .map(|v| (v - mean) * (v - mean))
            .sum::<f64>()
            / (n - 1.0);
        variance.sqrt()
    } else {
        0.0
    };

    SetMetrics {
        mean,
        standard_deviation,
    }
}
