//! Assertion helpers shared by the test suites.

use assert_float_eq::*;

/// Asserts that two slices hold the same number of elements and that each pair of elements lies
/// within `epsilon` of one another.
pub fn assert_slice_f64_absolute(expected: &[f64], actual: &[f64], epsilon: f64) {
    assert_eq!(
        expected.len(),
        actual.len(),
        "lengths do not match: {} ≠ {}",
        expected.len(),
        actual.len()
    );
    for (index, &expected) in expected.iter().enumerate() {
        let actual = actual[index];
        if actual != expected {
            assert_float_absolute_eq!(expected, actual, epsilon);
        }
    }
}

pub fn assert_slice_f64_relative(expected: &[f64], actual: &[f64], epsilon: f64) {
    assert_eq!(
        expected.len(),
        actual.len(),
        "lengths do not match: {} ≠ {}",
        expected.len(),
        actual.len()
    );
    for (index, &expected) in expected.iter().enumerate() {
        let actual = actual[index];
        if actual != expected {
            assert_float_relative_eq!(expected, actual, epsilon);
        }
    }
}

/// Asserts that a set of percentages forms a complete book, each in `[0, 100]` and together
/// summing to 100 within `epsilon`.
pub fn assert_percentages(percentages: &[f64], epsilon: f64) {
    for &percentage in percentages {
        assert!(
            (0.0..=100.0).contains(&percentage),
            "{percentage} out of range in {percentages:?}"
        );
    }
    let sum: f64 = percentages.iter().sum();
    assert_float_absolute_eq!(100.0, sum, epsilon);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slices_within_tolerance() {
        assert_slice_f64_absolute(&[0.1, 0.2], &[0.1001, 0.1999], 0.001);
        assert_slice_f64_relative(&[10.0, 20.0], &[10.001, 19.999], 0.001);
    }

    #[test]
    #[should_panic = "lengths do not match: 2 ≠ 1"]
    fn slices_of_different_lengths() {
        assert_slice_f64_absolute(&[0.1, 0.2], &[0.1], 0.001);
    }

    #[test]
    fn complete_book() {
        assert_percentages(&[45.0, 25.0, 30.0], 1e-9);
    }

    #[test]
    #[should_panic]
    fn incomplete_book() {
        assert_percentages(&[45.0, 25.0, 20.0], 1e-9);
    }
}
