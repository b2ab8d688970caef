//! Wheel probability: the odds that a card survives a full pass of the
//! table and comes back around.

use crate::constants::{WHEEL_ALSA_MINIMUM, WHEEL_COEFFICIENTS};

/// Raw wheel score for one card at one pick, in percentage points.
///
/// The pick number clamps into the coefficient table (pick 0 is treated
/// as pick 1); cards with an ALSA below 2 never wheel. The polynomial
/// result clamps at 0 and rounds to one decimal.
pub fn wheel_probability(pick_number: u32, alsa: f64) -> f64 {
    if alsa < WHEEL_ALSA_MINIMUM {
        return 0.0;
    }

    let index = pick_number.max(1).min(WHEEL_COEFFICIENTS.len() as u32) as usize - 1;
    let [c0, c1, c2] = WHEEL_COEFFICIENTS[index];

    let raw = c0 + c1 * alsa + c2 * alsa * alsa;
    (raw.max(0.0) * 10.0).round() / 10.0
}

/// Normalize raw wheel scores into percentages of the list sum, two
/// decimals. A zero sum yields all zeros.
pub fn normalize_wheel(raw: &[f64]) -> Vec<f64> {
    let sum: f64 = raw.iter().sum();
    if sum == 0.0 {
        return vec![0.0; raw.len()];
    }
    raw.iter()
        .map(|v| (v / sum * 100.0 * 100.0).round() / 100.0)
        .collect()
}
