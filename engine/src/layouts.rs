use sampling::{Distribution, SIGMA, SIX_SIGMA};
use serde::{Deserialize, Serialize};

/// Largest LWE dimension accepted by key generation.
pub const MAX_LWE_DIMENSION: u32 = 1 << 14;

/// Largest GLWE ring degree accepted by key generation.
pub const MAX_GLWE_DEGREE: u32 = 1 << 16;

/// Smallest GLWE ring degree accepted by key generation.
pub const MIN_GLWE_DEGREE: u32 = 8;

/// Largest number of bits a gadget decomposition may keep.
pub const MAX_DECOMPOSITION_BITS: u32 = 62;

/// Largest integer width a circuit may be compiled for.
///
/// Values are evaluated on `width + 1` bits, so the widest value still fits
/// an `i64`.
pub const MAX_WIDTH: u32 = 62;

/// Number of coefficients of an LWE mask or of a GLWE polynomial.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Degree(pub u32);

/// Number of significant torus bits; noise is sampled at scale `2^-k`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TorusPrecision(pub u32);

/// log2 of the base of a gadget decomposition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Base2K(pub u32);

/// Number of digits of a gadget decomposition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Dnum(pub u32);

/// Signed bit width of a circuit value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Width(pub u32);

impl Width {
    /// Smallest signed width holding `v`.
    pub fn of(v: i64) -> Width {
        let magnitude: i64 = if v < 0 { !v } else { v };
        Width(i64::BITS - magnitude.leading_zeros() + 1)
    }

    /// Smallest signed width holding every value of `[min, max]`.
    pub fn of_range(min: i64, max: i64) -> Width {
        Width::of(min).max(Width::of(max))
    }
}

impl From<Degree> for usize {
    fn from(value: Degree) -> Self {
        value.0 as usize
    }
}

/// Cryptographic and sizing parameters of the engine.
///
/// Every circuit bit is an LWE ciphertext of dimension `lwe_dimension`.
/// Gates are bootstrapped by blind rotation over GLWE of degree
/// `glwe_degree`, then key-switched back to the LWE key.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Parameters {
    /// Dimension of the LWE secret.
    pub lwe_dimension: Degree,
    /// Torus precision at which LWE noise is sampled.
    pub noise_precision: TorusPrecision,
    /// Standard deviation of fresh noise, in units of `2^-noise_precision`
    /// (LWE) or `2^-glwe_noise_precision` (GLWE).
    pub sigma: f64,
    /// Distribution of the LWE secret coefficients. Blind rotation needs a
    /// binary secret.
    pub secret: Distribution,
    /// Ring degree of the GLWE accumulator, a power of two.
    pub glwe_degree: Degree,
    /// Torus precision at which bootstrapping key noise is sampled.
    pub glwe_noise_precision: TorusPrecision,
    /// Distribution of the GLWE secret coefficients.
    pub glwe_secret: Distribution,
    /// Gadget decomposition of the bootstrapping key.
    pub bsk_base2k: Base2K,
    pub bsk_dnum: Dnum,
    /// Gadget decomposition of the key-switching key.
    pub ksk_base2k: Base2K,
    pub ksk_dnum: Dnum,
    /// Compilation fails for circuits needing more bits than this.
    pub max_width: Width,
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            lwe_dimension: Degree(630),
            noise_precision: TorusPrecision(17),
            sigma: SIGMA,
            secret: Distribution::BinaryProb(0.5),
            glwe_degree: Degree(1024),
            glwe_noise_precision: TorusPrecision(27),
            glwe_secret: Distribution::BinaryProb(0.5),
            bsk_base2k: Base2K(7),
            bsk_dnum: Dnum(3),
            ksk_base2k: Base2K(2),
            ksk_dnum: Dnum(8),
            max_width: Width(32),
        }
    }
}

impl Parameters {
    pub fn validate(&self) -> Result<(), String> {
        if self.lwe_dimension.0 == 0 || self.lwe_dimension.0 > MAX_LWE_DIMENSION {
            return Err(format!(
                "lwe_dimension {} not in [1, {MAX_LWE_DIMENSION}]",
                self.lwe_dimension.0
            ));
        }
        if !self.glwe_degree.0.is_power_of_two()
            || !(MIN_GLWE_DEGREE..=MAX_GLWE_DEGREE).contains(&self.glwe_degree.0)
        {
            return Err(format!(
                "glwe_degree {} must be a power of two in [{MIN_GLWE_DEGREE}, {MAX_GLWE_DEGREE}]",
                self.glwe_degree.0
            ));
        }
        for (name, k) in [
            ("noise_precision", self.noise_precision),
            ("glwe_noise_precision", self.glwe_noise_precision),
        ] {
            if k.0 == 0 || k.0 > 64 {
                return Err(format!("{name} {} not in [1, 64]", k.0));
            }
        }
        if !self.sigma.is_finite() || self.sigma <= 0.0 {
            return Err(format!("sigma {} must be finite and positive", self.sigma));
        }
        for (name, base2k, dnum) in [
            ("bsk", self.bsk_base2k, self.bsk_dnum),
            ("ksk", self.ksk_base2k, self.ksk_dnum),
        ] {
            if base2k.0 == 0 || dnum.0 == 0 || base2k.0 * dnum.0 > MAX_DECOMPOSITION_BITS {
                return Err(format!(
                    "{name} decomposition {}x{} must keep between 1 and {MAX_DECOMPOSITION_BITS} bits",
                    base2k.0, dnum.0
                ));
            }
        }
        if self.max_width.0 == 0 || self.max_width.0 > MAX_WIDTH {
            return Err(format!(
                "max_width {} not in [1, {MAX_WIDTH}]",
                self.max_width.0
            ));
        }
        if !self.secret.is_binary() {
            return Err(format!("secret distribution {:?} is not binary", self.secret));
        }
        self.secret
            .validate(self.lwe_dimension.into())
            .map_err(|e| format!("secret distribution: {e}"))?;
        self.glwe_secret
            .validate(self.glwe_degree.into())
            .map_err(|e| format!("glwe secret distribution: {e}"))
    }

    /// Absolute bound beyond which noise samples are redrawn.
    pub fn noise_bound(&self) -> f64 {
        SIX_SIGMA * self.sigma
    }
}
