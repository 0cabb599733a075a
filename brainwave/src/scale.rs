use crate::error::InvalidInput;

/// Largest scaled value; `scale(FULL_SCALE_HZ)`.
pub const SCALE_MAX: i64 = 65535;

/// Upper end of the frequency range covered by the scaled domain.
pub const FULL_SCALE_HZ: f64 = 100.0;

/// Maps a value on `[0, 100)` to the 16-bit integer domain:
/// `floor(value * 65535 / 100)`.
///
/// Total: negative values map below zero and values from 100 upwards map
/// above [SCALE_MAX]. Used for samples and band thresholds alike, so both sides
/// of every comparison go through the same rounding.
pub fn scale(value: f64) -> i64 {
    // Floor division of the product, exact for every representable product.
    let x: f64 = value * SCALE_MAX as f64;
    ((x - x.rem_euclid(FULL_SCALE_HZ)) / FULL_SCALE_HZ).round() as i64
}

/// [scale], restricted to finite values on `[0, 100)`.
pub fn try_scale(value: f64) -> Result<i64, InvalidInput> {
    if !value.is_finite() {
        return Err(InvalidInput::NotFinite);
    }
    if !(0.0..FULL_SCALE_HZ).contains(&value) {
        return Err(InvalidInput::OutOfRange { value });
    }
    Ok(scale(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn thresholds() {
        assert_eq!(scale(0.0), 0);
        assert_eq!(scale(4.0), 2621);
        assert_eq!(scale(8.0), 5242);
        assert_eq!(scale(13.0), 8519);
        assert_eq!(scale(30.0), 19660);
        assert_eq!(scale(100.0), SCALE_MAX);
    }

    #[test]
    fn floors_towards_negative_infinity() {
        assert_eq!(scale(-1.0), -656);
        assert_eq!(scale(150.0), 98302);
        assert_eq!(scale(2.5), 1638);
    }

    #[test]
    fn grid_is_injective() {
        // k * 100 / 65536 maps to k - 1 for every k >= 1.
        let mut previous: i64 = -1;
        for k in 1..65536i64 {
            let s: i64 = scale(k as f64 * FULL_SCALE_HZ / 65536.0);
            assert_eq!(s, k - 1);
            assert!(s > previous);
            previous = s;
        }
    }

    #[test]
    fn try_scale_rejects_outside_domain() {
        assert_eq!(try_scale(99.99), Ok(scale(99.99)));
        assert_eq!(try_scale(0.0), Ok(0));
        assert_eq!(try_scale(100.0), Err(InvalidInput::OutOfRange { value: 100.0 }));
        assert_eq!(try_scale(-0.5), Err(InvalidInput::OutOfRange { value: -0.5 }));
        assert_eq!(try_scale(f64::NAN), Err(InvalidInput::NotFinite));
        assert_eq!(try_scale(f64::INFINITY), Err(InvalidInput::NotFinite));
    }

    proptest! {
        #[test]
        fn non_decreasing(a in 0.0f64..100.0, b in 0.0f64..100.0) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(scale(lo) <= scale(hi));
        }

        #[test]
        fn stays_in_domain(v in 0.0f64..100.0) {
            let s: i64 = scale(v);
            prop_assert!((0..SCALE_MAX).contains(&s));
        }
    }
}
