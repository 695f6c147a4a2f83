//! Pseudo-random sampling primitives over a pluggable [`Rand`] source.

use chrono::Utc;
use tinyrand::{Rand, Seeded, Wyrand};

/// A uniformly distributed value in `[0, 1)`.
#[inline]
pub fn random_f64(rand: &mut impl Rand) -> f64 {
    (rand.next_u64() >> 11) as f64 / (1u64 << 53) as f64
}

/// A uniformly distributed value in `[min, max)`.
#[inline]
pub fn uniform(rand: &mut impl Rand, min: f64, max: f64) -> f64 {
    min + random_f64(rand) * (max - min)
}

/// A uniformly distributed integer in `[min, max]`.
#[inline]
pub fn uniform_int(rand: &mut impl Rand, min: u32, max: u32) -> u32 {
    debug_assert!(min <= max, "invalid range {min}..={max}");
    min + (random_f64(rand) * (max - min + 1) as f64) as u32
}

#[inline]
pub fn coin_flip(rand: &mut impl Rand) -> bool {
    random_f64(rand) < 0.5
}

/// Standard normal variate using the Box-Muller transform.
pub fn standard_normal(rand: &mut impl Rand) -> f64 {
    let u_1 = 1.0 - random_f64(rand);
    let u_2 = random_f64(rand);
    (-2.0 * u_1.ln()).sqrt() * (std::f64::consts::TAU * u_2).cos()
}

/// Gamma variate with the given `shape` and `scale`, sampled using the Marsaglia-Tsang method.
/// Shapes below 1 are boosted by one and corrected with a uniform power.
pub fn gamma(rand: &mut impl Rand, shape: f64, scale: f64) -> f64 {
    debug_assert!(shape > 0.0, "shape must be positive: {shape}");
    if shape < 1.0 {
        let boost = (1.0 - random_f64(rand)).powf(1.0 / shape);
        return gamma(rand, shape + 1.0, scale) * boost;
    }

    let d = shape - 1.0 / 3.0;
    let c = 1.0 / (9.0 * d).sqrt();
    loop {
        let (x, v) = loop {
            let x = standard_normal(rand);
            let v = 1.0 + c * x;
            if v > 0.0 {
                break (x, v * v * v);
            }
        };
        let u = 1.0 - random_f64(rand);
        if u < 1.0 - 0.0331 * x.powi(4) || u.ln() < 0.5 * x * x + d * (1.0 - v + v.ln()) {
            return d * v * scale;
        }
    }
}

/// A seed derived from the wall clock.
pub fn clock_seed() -> u64 {
    Utc::now().timestamp_nanos_opt().unwrap_or_default() as u64
}

/// A [`Wyrand`] seeded from `seed`, or from the wall clock when no seed is given.
pub fn seeded(seed: Option<u64>) -> Wyrand {
    Wyrand::seed(seed.unwrap_or_else(clock_seed))
}

#[cfg(test)]
pub(crate) mod stub {
    use tinyrand::Rand;

    /// Cycles through a fixed sequence of raw values.
    pub struct Cycle {
        values: Vec<u64>,
        index: usize,
    }
    impl Cycle {
        pub fn new(values: Vec<u64>) -> Self {
            Self { values, index: 0 }
        }

        /// A source whose [`random_f64`](super::random_f64) outputs approximate `fractions`.
        pub fn of_fractions(fractions: &[f64]) -> Self {
            Self::new(
                fractions
                    .iter()
                    .map(|&fraction| ((fraction * (1u64 << 53) as f64) as u64) << 11)
                    .collect(),
            )
        }
    }
    impl Rand for Cycle {
        fn next_u64(&mut self) -> u64 {
            let value = self.values[self.index % self.values.len()];
            self.index += 1;
            value
        }
    }
}
