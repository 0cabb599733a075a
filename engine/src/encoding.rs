use crate::layouts::Width;

/// Two's-complement layout of a signed integer of width `w`.
///
/// Values are evaluated on `w + 1` bits: `w` bits hold the declared range
/// and one extra bit absorbs the carry of intermediate results. Arithmetic
/// is modulo `2^(w+1)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Encoding {
    width: Width,
}

impl Encoding {
    pub fn new(width: Width) -> Self {
        debug_assert!(width.0 >= 1 && width.0 <= crate::MAX_WIDTH, "width={}", width.0);
        Self { width }
    }

    pub fn width(&self) -> Width {
        self.width
    }

    /// Number of bits a value is evaluated on.
    #[inline]
    pub fn bits(&self) -> usize {
        self.width.0 as usize + 1
    }

    pub fn min_value(&self) -> i64 {
        -(1i64 << (self.width.0 - 1))
    }

    pub fn max_value(&self) -> i64 {
        (1i64 << (self.width.0 - 1)) - 1
    }

    pub fn fits(&self, value: i64) -> bool {
        (self.min_value()..=self.max_value()).contains(&value)
    }

    /// Reduces `value` modulo `2^(w+1)` into the signed range.
    #[inline]
    pub fn wrap(&self, value: i64) -> i64 {
        self.sign_extend(value as u64)
    }

    /// Bits of `value`, least significant first.
    pub fn to_bits(&self, value: i64) -> Vec<bool> {
        let x: u64 = value as u64;
        (0..self.bits()).map(|i| (x >> i) & 1 == 1).collect()
    }

    /// Inverse of [Encoding::to_bits]. Missing high bits read as zero.
    pub fn from_bits(&self, bits: &[bool]) -> i64 {
        let x: u64 = bits
            .iter()
            .take(self.bits())
            .enumerate()
            .fold(0u64, |acc, (i, b)| acc | ((*b as u64) << i));
        self.sign_extend(x)
    }

    #[inline]
    fn sign_extend(&self, x: u64) -> i64 {
        let shift: u32 = u64::BITS - self.width.0 - 1;
        ((x << shift) as i64) >> shift
    }
}
