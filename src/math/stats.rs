//! Summary statistics for repeated trials.

/// Mean and sample standard deviation of one column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Summary {
    pub mean: f64,
    pub std: f64,
}

impl Summary {
    /// Summarize `values`, skipping NaN entries.
    ///
    /// The standard deviation uses one delta degree of freedom (`n - 1`).
    /// No non-NaN value yields NaN for both fields; a single one yields a NaN
    /// standard deviation.
    pub fn of(values: &[f64]) -> Self {
        let kept: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
        Self {
            mean: mean(&kept),
            std: sample_std(&kept),
        }
    }
}

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

pub fn sample_std(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 2 {
        return f64::NAN;
    }
    let m = mean(values);
    let ss: f64 = values.iter().map(|v| (v - m) * (v - m)).sum();
    (ss / (n - 1) as f64).sqrt()
}

/// Population standard deviation (`n` in the denominator).
///
/// Used for the spread of fit coefficients across seeds in the slice plots.
pub fn population_std(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    let m = mean(values);
    let ss: f64 = values.iter().map(|v| (v - m) * (v - m)).sum();
    (ss / values.len() as f64).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_matches_hand_computation() {
        let s = Summary::of(&[0.2, 0.4, 0.6]);
        assert!((s.mean - 0.4).abs() < 1e-12);
        assert!((s.std - 0.2).abs() < 1e-12);
    }

    #[test]
    fn empty_and_single_values_are_nan() {
        let empty = Summary::of(&[]);
        assert!(empty.mean.is_nan());
        assert!(empty.std.is_nan());

        let single = Summary::of(&[0.7]);
        assert_eq!(single.mean, 0.7);
        assert!(single.std.is_nan());
    }

    #[test]
    fn nan_trials_are_skipped() {
        let s = Summary::of(&[0.2, f64::NAN, 0.6]);
        assert!((s.mean - 0.4).abs() < 1e-12);
        assert!((s.std - 0.08f64.sqrt()).abs() < 1e-12);

        let all_nan = Summary::of(&[f64::NAN, f64::NAN]);
        assert!(all_nan.mean.is_nan());
        assert!(all_nan.std.is_nan());
    }

    #[test]
    fn population_std_divides_by_n() {
        let v = population_std(&[1.0, 3.0]);
        assert!((v - 1.0).abs() < 1e-12);
    }
}
