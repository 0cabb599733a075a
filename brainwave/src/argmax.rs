use engine::Integer;
use itertools::Itertools;

/// Frequency of the strongest sample.
///
/// Scans every index once, in order, keeping a running maximum of `powers`
/// that only moves on a strictly greater power, so the lowest index wins ties.
/// Both accumulators start at zero: if no power is positive the result is 0.
///
/// # Panics
///
/// If the arrays are empty or of different lengths.
pub fn reduce<T: Integer>(powers: &[T], frequencies: &[T]) -> T {
    assert!(!powers.is_empty(), "reduce needs at least one sample");

    let mut max_power: T = powers[0].constant_like(0);
    let mut frequency: T = powers[0].constant_like(0);
    for (power, candidate) in powers.iter().zip_eq(frequencies.iter()) {
        let is_new_max: T = power.is_gt(&max_power);
        max_power = max_power.clone() + is_new_max.clone() * (power.clone() - max_power);
        frequency = frequency.clone() + is_new_max * (candidate.clone() - frequency);
    }
    frequency
}
