//! Poisson goal-count model.

use tinyrand::Rand;

use crate::sampling::random_f64;

/// Probability of exactly `k` events at rate `lambda`, evaluated as a running product.
#[inline]
pub fn univariate(k: u8, lambda: f64) -> f64 {
    (1..=k).fold(f64::exp(-lambda), |prob, i| prob * lambda / i as f64)
}

/// Probabilities of `0..=max` events at rate `lambda`. The tail beyond `max` is not included, so
/// the result sums to slightly less than 1.
pub fn distribution(lambda: f64, max: u8) -> Vec<f64> {
    let mut probs = Vec::with_capacity(max as usize + 1);
    let mut prob = f64::exp(-lambda);
    probs.push(prob);
    for k in 1..=max {
        prob *= lambda / k as f64;
        probs.push(prob);
    }
    probs
}

/// Draws an event count at rate `lambda` using Knuth's multiplication method, stopping at `cap`.
pub fn sample(lambda: f64, cap: u8, rand: &mut impl Rand) -> u8 {
    let limit = f64::exp(-lambda);
    let mut product = 1.0 - random_f64(rand);
    let mut k = 0;
    while product > limit && k < cap {
        k += 1;
        product *= 1.0 - random_f64(rand);
    }
    k
}

#[cfg(test)]
mod tests {
    use assert_float_eq::*;
    use tinyrand::{Seeded, Wyrand};

    use crate::probs::SliceExt;

    use super::*;

    #[test]
    pub fn test_univariate() {
        assert_float_relative_eq!(0.36787944117144233, univariate(0, 1.0));
        assert_float_relative_eq!(0.36787944117144233, univariate(1, 1.0));
        assert_float_relative_eq!(0.18393972058572117, univariate(2, 1.0));
        assert_float_relative_eq!(0.0820849986238988, univariate(0, 2.5));
        assert_float_relative_eq!(0.205212496559747, univariate(1, 2.5));
        assert_float_relative_eq!(0.25651562069968376, univariate(2, 2.5));
    }

    #[test]
    pub fn distribution_matches_univariate() {
        let probs = distribution(1.7, 8);
        assert_eq!(9, probs.len());
        for (k, &prob) in probs.iter().enumerate() {
            assert_float_relative_eq!(univariate(k as u8, 1.7), prob, 1e-12);
        }
        assert!(probs.sum() < 1.0);
        assert_float_absolute_eq!(1.0, probs.sum(), 1e-3);
    }

    #[test]
    pub fn sample_mean() {
        let mut rand = Wyrand::seed(11);
        let samples = (0..50_000)
            .map(|_| sample(1.4, 15, &mut rand) as f64)
            .collect::<Vec<_>>();
        assert_float_relative_eq!(1.4, samples.mean(), 0.02);
        assert_float_relative_eq!(1.4, samples.variance(), 0.04);
    }

    #[test]
    pub fn sample_respects_cap() {
        let mut rand = Wyrand::seed(5);
        for _ in 0..1_000 {
            assert!(sample(12.0, 3, &mut rand) <= 3);
        }
    }
}
