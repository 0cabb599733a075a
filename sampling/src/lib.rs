pub mod dist;
pub mod source;

pub use dist::*;
pub use source::*;

/// Default standard deviation of the encryption noise, in units of the
/// noise precision.
pub const SIGMA: f64 = 3.2;

/// Noise samples are rejected beyond this many standard deviations.
pub const SIX_SIGMA: f64 = 6.0;
