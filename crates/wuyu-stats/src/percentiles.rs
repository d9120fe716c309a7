/// The three quartile points of a dataset.
///
/// # Examples
///
/// ```
/// use wuyu_stats::percentiles::Quartiles;
///
/// let values = [1.0, 2.0, 3.0, 4.0, 5.0];
/// let quartiles = Quartiles::from_sorted(&values).unwrap();
///
/// assert_eq!(quartiles.q1, 2.0);
/// assert_eq!(quartiles.q2, 3.0);
/// assert_eq!(quartiles.q3, 4.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quartiles {
    /// 25th percentile.
    pub q1: f64,
    /// 50th percentile (median).
    pub q2: f64,
    /// 75th percentile.
    pub q3: f64,
}

impl Quartiles {
    /// Computes quartiles from sorted values.
    ///
    /// Returns `None` if `sorted_values` is empty.
    ///
    /// # Panics
    ///
    /// Panics if `sorted_values` is not sorted in ascending order.
    #[must_use]
    pub fn from_sorted(sorted_values: &[f64]) -> Option<Self> {
        assert!(
            sorted_values.is_sorted_by(|a, b| a <= b),
            "values must be sorted in ascending order"
        );
        if sorted_values.is_empty() {
            return None;
        }
        Some(Self {
            q1: compute_percentile(sorted_values, 25.0),
            q2: compute_percentile(sorted_values, 50.0),
            q3: compute_percentile(sorted_values, 75.0),
        })
    }
}

/// Computes a single percentile value from sorted data.
///
/// Uses linear interpolation between the two closest ranks: for `n` values the
/// `k`-th percentile sits at fractional position `(n - 1) * k / 100`. This is the
/// same convention spreadsheet tools and most dataframe libraries use for
/// quartiles in summary tables.
///
/// # Arguments
///
/// * `sorted_values` - Values sorted in ascending order
/// * `percentile` - The percentile to compute (0.0 to 100.0)
///
/// # Returns
///
/// The value at the specified percentile. Returns `f64::NAN` if the input is empty.
///
/// # Examples
///
/// ```
/// use wuyu_stats::percentiles::compute_percentile;
///
/// let values = vec![1.0, 2.0, 3.0, 4.0];
///
/// assert_eq!(compute_percentile(&values, 0.0), 1.0);
/// assert_eq!(compute_percentile(&values, 50.0), 2.5);
/// assert_eq!(compute_percentile(&values, 100.0), 4.0);
/// ```
#[expect(
    clippy::cast_sign_loss,
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss
)]
#[must_use]
pub fn compute_percentile(sorted_values: &[f64], percentile: f64) -> f64 {
    if sorted_values.is_empty() {
        return f64::NAN;
    }
    let last = sorted_values.len() - 1;
    let position = (last as f64 * percentile.clamp(0.0, 100.0)) / 100.0;
    let lower = (position.floor() as usize).min(last);
    let upper = (position.ceil() as usize).min(last);
    let fraction = position - position.floor();
    sorted_values[lower] + (sorted_values[upper] - sorted_values[lower]) * fraction
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_is_nan() {
        assert!(compute_percentile(&[], 50.0).is_nan());
        assert!(Quartiles::from_sorted(&[]).is_none());
    }

    #[test]
    fn test_single_value() {
        let q = Quartiles::from_sorted(&[7.0]).unwrap();
        assert_eq!(q.q1, 7.0);
        assert_eq!(q.q2, 7.0);
        assert_eq!(q.q3, 7.0);
    }

    #[test]
    fn test_interpolates_between_ranks() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0];
        // (8 - 1) * 0.25 = 1.75 -> 2.0 + 0.75
        assert!((compute_percentile(&values, 25.0) - 2.75).abs() < 1e-12);
        assert!((compute_percentile(&values, 75.0) - 6.25).abs() < 1e-12);
    }

    #[test]
    fn test_out_of_range_percentile_is_clamped() {
        let values = [1.0, 2.0, 3.0];
        assert_eq!(compute_percentile(&values, -10.0), 1.0);
        assert_eq!(compute_percentile(&values, 250.0), 3.0);
    }
}
