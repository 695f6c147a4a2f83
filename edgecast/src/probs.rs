//! Utilities for working with probabilities and sample statistics.

pub trait SliceExt {
    fn sum(&self) -> f64;
    fn normalise(&mut self, target: f64) -> f64;
    fn scale(&mut self, factor: f64);
    fn mean(&self) -> f64;
    fn variance(&self) -> f64;
    fn std_dev(&self) -> f64;
}
impl SliceExt for [f64] {
    fn sum(&self) -> f64 {
        self.iter().sum()
    }

    /// Scales the elements so that they sum to `target`, returning the original sum. A slice that
    /// sums to zero (or to a non-finite value) is left untouched.
    fn normalise(&mut self, target: f64) -> f64 {
        let sum = self.sum();
        if sum > 0.0 && sum.is_finite() {
            self.scale(target / sum);
        }
        sum
    }

    fn scale(&mut self, factor: f64) {
        for element in self {
            *element *= factor;
        }
    }

    /// Arithmetic mean; 0 for an empty slice.
    fn mean(&self) -> f64 {
        if self.is_empty() {
            0.0
        } else {
            self.sum() / self.len() as f64
        }
    }

    /// Population variance; 0 for fewer than two elements.
    fn variance(&self) -> f64 {
        if self.len() < 2 {
            return 0.0;
        }
        let mean = self.mean();
        self.iter().map(|&element| (element - mean).powi(2)).sum::<f64>() / self.len() as f64
    }

    fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }
}

/// Divides `numerator` by `denominator`, substituting `default` where the denominator is zero.
#[inline]
pub fn ratio_or(numerator: f64, denominator: f64, default: f64) -> f64 {
    if denominator == 0.0 {
        default
    } else {
        numerator / denominator
    }
}
