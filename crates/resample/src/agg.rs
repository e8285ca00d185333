//! Aggregation functions over daily buckets.

/// How the values of one variable within a day are collapsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggFunc {
    /// Arithmetic mean of the non-missing values.
    Mean,
    /// Sum of the non-missing values (empty bucket sums to zero).
    Sum,
    /// Largest non-missing value.
    Max,
    /// Smallest non-missing value.
    Min,
    /// Most frequent non-missing value; ties resolve to the smallest.
    Mode,
}

impl AggFunc {
    /// Aggregates a bucket of raw values, omitting NaNs.
    ///
    /// An empty (or all-NaN) bucket yields NaN, except for [`AggFunc::Sum`]
    /// which yields 0.0.
    pub fn apply(self, values: &[f64]) -> f64 {
        let finite: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
        if finite.is_empty() {
            return match self {
                AggFunc::Sum => 0.0,
                _ => f64::NAN,
            };
        }
        match self {
            AggFunc::Mean => finite.iter().sum::<f64>() / finite.len() as f64,
            AggFunc::Sum => finite.iter().sum(),
            AggFunc::Max => finite.iter().copied().fold(f64::MIN, f64::max),
            AggFunc::Min => finite.iter().copied().fold(f64::MAX, f64::min),
            AggFunc::Mode => mode(&finite),
        }
    }
}

/// Most frequent value; ties resolve to the smallest value.
fn mode(values: &[f64]) -> f64 {
    let mut counts: std::collections::BTreeMap<u64, usize> = std::collections::BTreeMap::new();
    for v in values {
        *counts.entry(v.to_bits()).or_insert(0) += 1;
    }

    let mut best_value = f64::NAN;
    let mut best_count = 0usize;
    for (bits, count) in counts {
        let value = f64::from_bits(bits);
        let better = count > best_count
            || (count == best_count && value < best_value);
        if better {
            best_value = value;
            best_count = count;
        }
    }
    best_value
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn mean_omits_nan() {
        assert_relative_eq!(AggFunc::Mean.apply(&[1.0, f64::NAN, 3.0]), 2.0);
    }

    #[test]
    fn sum_of_empty_bucket_is_zero() {
        assert_relative_eq!(AggFunc::Sum.apply(&[]), 0.0);
        assert_relative_eq!(AggFunc::Sum.apply(&[f64::NAN]), 0.0);
    }

    #[test]
    fn mean_of_empty_bucket_is_nan() {
        assert!(AggFunc::Mean.apply(&[]).is_nan());
        assert!(AggFunc::Max.apply(&[f64::NAN, f64::NAN]).is_nan());
    }

    #[test]
    fn max_and_min() {
        let v = [3.0, f64::NAN, -1.0, 7.5];
        assert_relative_eq!(AggFunc::Max.apply(&v), 7.5);
        assert_relative_eq!(AggFunc::Min.apply(&v), -1.0);
    }

    #[test]
    fn mode_picks_most_frequent() {
        assert_relative_eq!(AggFunc::Mode.apply(&[90.0, 180.0, 90.0, 270.0]), 90.0);
    }

    #[test]
    fn mode_tie_resolves_to_smallest() {
        assert_relative_eq!(AggFunc::Mode.apply(&[270.0, 90.0]), 90.0);
    }
}
