use rand_chacha::{ChaCha8Rng, rand_core::SeedableRng};
use rand_core::RngCore;
use rand_distr::{Distribution, Normal, NormalError};

const MAXF64: f64 = 9007199254740992.0;

/// Draws a 32-byte seed from the operating system entropy pool.
pub fn new_seed() -> [u8; 32] {
    let mut seed: [u8; 32] = [0u8; 32];
    rand::rng().fill_bytes(&mut seed);
    seed
}

/// Seeded ChaCha8 stream used for secret keys, masks and noise.
///
/// Each use (secret sampling, mask sampling, noise sampling) should own its
/// own [Source] so that re-running with the same seeds reproduces the same
/// keys and ciphertexts.
pub struct Source {
    source: ChaCha8Rng,
}

impl Source {
    pub fn new(seed: [u8; 32]) -> Source {
        Source {
            source: ChaCha8Rng::from_seed(seed),
        }
    }

    /// A source seeded from operating system entropy.
    pub fn from_entropy() -> Source {
        Source::new(new_seed())
    }

    /// Derives an independent child source, returning the seed it was built from.
    pub fn branch(&mut self) -> ([u8; 32], Self) {
        let seed: [u8; 32] = self.new_seed();
        (seed, Source::new(seed))
    }

    pub fn new_seed(&mut self) -> [u8; 32] {
        let mut seed: [u8; 32] = [0u8; 32];
        self.fill_bytes(&mut seed);
        seed
    }

    /// Uniform value in `[0, max)`, by rejection on `next_u64() & mask`.
    /// `mask` must cover `max - 1`.
    #[inline(always)]
    pub fn next_u64n(&mut self, max: u64, mask: u64) -> u64 {
        let mut x: u64 = self.next_u64() & mask;
        while x >= max {
            x = self.next_u64() & mask;
        }
        x
    }

    #[inline(always)]
    pub fn next_f64(&mut self, min: f64, max: f64) -> f64 {
        min + ((self.next_u64() << 11 >> 11) as f64) / MAXF64 * (max - min)
    }

    #[inline(always)]
    pub fn next_i64(&mut self) -> i64 {
        self.next_u64() as i64
    }

    pub fn fill_uniform(&mut self, data: &mut [u64]) {
        data.iter_mut().for_each(|x| *x = self.next_u64());
    }
}

impl RngCore for Source {
    #[inline(always)]
    fn next_u32(&mut self) -> u32 {
        self.source.next_u32()
    }

    #[inline(always)]
    fn next_u64(&mut self) -> u64 {
        self.source.next_u64()
    }

    #[inline(always)]
    fn fill_bytes(&mut self, bytes: &mut [u8]) {
        self.source.fill_bytes(bytes)
    }
}

/// Rounded Gaussian with tail rejection.
#[derive(Clone, Copy, Debug)]
pub struct Gaussian {
    normal: Normal<f64>,
    bound: f64,
}

impl Gaussian {
    /// `bound` is absolute; samples with `|x| > bound` are redrawn.
    pub fn new(sigma: f64, bound: f64) -> Result<Self, NormalError> {
        Ok(Self {
            normal: Normal::new(0.0, sigma)?,
            bound,
        })
    }

    pub fn sigma(&self) -> f64 {
        self.normal.std_dev()
    }

    pub fn sample(&self, source: &mut Source) -> i64 {
        loop {
            let x: f64 = self.normal.sample(source);
            if x.abs() <= self.bound {
                return x.round() as i64;
            }
        }
    }
}
