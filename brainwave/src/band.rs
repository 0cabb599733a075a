use std::fmt;

use engine::Integer;

use crate::scale::scale;

/// Oscillation bands, ordered by frequency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Band {
    Delta = 0,
    Theta = 1,
    Alpha = 2,
    Beta = 3,
    Gamma = 4,
}

impl Band {
    pub const ALL: [Band; 5] = [Band::Delta, Band::Theta, Band::Alpha, Band::Beta, Band::Gamma];

    pub fn ordinal(self) -> i64 {
        self as i64
    }

    pub fn from_ordinal(ordinal: i64) -> Option<Band> {
        usize::try_from(ordinal)
            .ok()
            .and_then(|i| Band::ALL.get(i).copied())
    }

    pub fn name(self) -> &'static str {
        match self {
            Band::Delta => "Delta",
            Band::Theta => "Theta",
            Band::Alpha => "Alpha",
            Band::Beta => "Beta",
            Band::Gamma => "Gamma",
        }
    }

    /// Inclusive lower bound, in Hz.
    pub fn lower_hz(self) -> f64 {
        match self {
            Band::Delta => 0.0,
            Band::Theta => 4.0,
            Band::Alpha => 8.0,
            Band::Beta => 13.0,
            Band::Gamma => 30.0,
        }
    }

    /// Exclusive upper bound, in Hz.
    pub fn upper_hz(self) -> f64 {
        match self {
            Band::Delta => 4.0,
            Band::Theta => 8.0,
            Band::Alpha => 13.0,
            Band::Beta => 30.0,
            Band::Gamma => 100.0,
        }
    }

    pub fn lower_threshold(self) -> i64 {
        scale(self.lower_hz())
    }

    pub fn upper_threshold(self) -> i64 {
        scale(self.upper_hz())
    }

    /// `1` when the scaled frequency `f` falls in this band. Delta has no
    /// lower bound.
    pub fn indicator<T: Integer>(self, f: &T) -> T {
        let below: T = f.is_lt(&f.constant_like(self.upper_threshold()));
        match self {
            Band::Delta => below,
            _ => f.is_ge(&f.constant_like(self.lower_threshold())) * below,
        }
    }
}

impl fmt::Display for Band {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// All five band indicators of `f`, in ordinal order.
pub fn indicators<T: Integer>(f: &T) -> [T; 5] {
    Band::ALL.map(|band| band.indicator(f))
}

/// Ordinal of the band holding the scaled frequency `f`, as
/// `sum(ordinal * indicator)` over every band.
///
/// Every term is evaluated whatever `f` is. Frequencies with no matching band
/// (from `scale(100)` upwards) give 0, the Delta ordinal.
pub fn classify<T: Integer>(f: &T) -> T {
    indicators(f)
        .into_iter()
        .zip(Band::ALL)
        .fold(f.constant_like(0), |acc, (indicator, band)| {
            acc + indicator * f.constant_like(band.ordinal())
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scale::SCALE_MAX;
    use proptest::prelude::*;

    #[test]
    fn ordinals_round_trip_names() {
        for band in Band::ALL {
            assert_eq!(Band::from_ordinal(band.ordinal()), Some(band));
        }
        assert_eq!(Band::from_ordinal(-1), None);
        assert_eq!(Band::from_ordinal(5), None);
        assert_eq!(Band::Alpha.to_string(), "Alpha");
    }

    #[test]
    fn boundaries_are_exact() {
        for band in &Band::ALL[1..] {
            let s: i64 = band.lower_threshold();
            assert_eq!(classify(&s), band.ordinal(), "{band} lower bound");
            assert_eq!(classify(&(s - 1)), band.ordinal() - 1, "{band} below lower bound");
        }
        assert_eq!(classify(&(scale(100.0) - 1)), Band::Gamma.ordinal());
        assert_eq!(classify(&scale(100.0)), 0);
    }

    #[test]
    fn total_over_the_scaled_domain() {
        for f in 0..=SCALE_MAX {
            let fired: i64 = indicators(&f).iter().sum();
            let band: i64 = classify(&f);
            if f < scale(100.0) {
                assert_eq!(fired, 1, "f={f}");
            } else {
                assert_eq!(fired, 0);
            }
            assert!((0..5).contains(&band));
        }
    }

    #[test]
    fn out_of_range_frequencies_alias_delta() {
        assert_eq!(classify(&-1i64), 0);
        assert_eq!(classify(&scale(150.0)), 0);
    }

    proptest! {
        #[test]
        fn agrees_with_hz_bounds(hz in 0.0f64..100.0) {
            let band: Band = Band::ALL
                .into_iter()
                .find(|b| b.lower_hz() <= hz && hz < b.upper_hz())
                .unwrap();
            let f: i64 = scale(hz);
            // Flooring can land a value just below an upper bound on the bound.
            let got: i64 = classify(&f);
            prop_assert!(got == band.ordinal() || got == band.ordinal() + 1);
            prop_assert_eq!(indicators(&f)[got as usize], 1);
        }
    }
}
