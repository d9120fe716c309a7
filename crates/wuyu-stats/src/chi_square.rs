//! Pearson chi-square test of independence on a contingency table.
//!
//! Expected counts follow the usual product-of-margins rule:
//!
//! ```text
//! expected[r][c] = row_total[r] * col_total[c] / grand_total
//! statistic      = Σ (observed - expected)² / expected
//! dof            = (rows - 1) * (cols - 1)
//! ```
//!
//! The p-value is the upper tail of the chi-square distribution with `dof`
//! degrees of freedom.

use statrs::distribution::{ChiSquared, ContinuousCDF};

/// Result of a chi-square independence test.
#[derive(Debug, Clone, PartialEq)]
pub struct ChiSquareTest {
    pub statistic: f64,
    pub dof: usize,
    pub p_value: f64,
    /// Expected counts under independence, same shape as the observed table.
    pub expected: Vec<Vec<f64>>,
}

/// Runs the chi-square independence test on `observed`.
///
/// When `continuity_correction` is set and the table has exactly one degree of
/// freedom, Yates' correction moves every observed count up to 0.5 towards its
/// expected count before the statistic is computed.
///
/// Returns `None` when the table cannot be tested: no cells, ragged rows, a
/// zero grand total, or any row or column whose total is zero.
///
/// # Examples
///
/// ```
/// use wuyu_stats::chi_square::chi_square_independence;
///
/// let observed = vec![vec![10, 0], vec![0, 10]];
/// let test = chi_square_independence(&observed, false).unwrap();
/// assert_eq!(test.dof, 1);
/// assert!((test.statistic - 20.0).abs() < 1e-9);
/// assert!(test.p_value < 1e-4);
///
/// assert!(chi_square_independence(&[vec![3, 0], vec![0, 0]], false).is_none());
/// ```
#[expect(clippy::cast_precision_loss)]
#[must_use]
pub fn chi_square_independence(
    observed: &[Vec<u64>],
    continuity_correction: bool,
) -> Option<ChiSquareTest> {
    let num_cols = observed.first()?.len();
    if num_cols == 0 || observed.iter().any(|row| row.len() != num_cols) {
        return None;
    }

    let row_totals = observed
        .iter()
        .map(|row| row.iter().sum::<u64>())
        .collect::<Vec<_>>();
    let col_totals = (0..num_cols)
        .map(|col| observed.iter().map(|row| row[col]).sum::<u64>())
        .collect::<Vec<_>>();
    let grand_total = row_totals.iter().sum::<u64>();

    if grand_total == 0 || row_totals.contains(&0) || col_totals.contains(&0) {
        return None;
    }

    let grand = grand_total as f64;
    let expected = row_totals
        .iter()
        .map(|&row_total| {
            col_totals
                .iter()
                .map(|&col_total| row_total as f64 * col_total as f64 / grand)
                .collect::<Vec<_>>()
        })
        .collect::<Vec<_>>();

    let dof = (observed.len() - 1) * (num_cols - 1);
    let correct = continuity_correction && dof == 1;

    let statistic = observed
        .iter()
        .zip(&expected)
        .flat_map(|(obs_row, exp_row)| obs_row.iter().zip(exp_row))
        .map(|(&obs, &exp)| {
            let mut diff = (obs as f64 - exp).abs();
            if correct {
                diff = (diff - 0.5).max(0.0);
            }
            diff * diff / exp
        })
        .sum::<f64>();

    // A single row or column carries no information about association
    let p_value = if dof == 0 {
        1.0
    } else {
        ChiSquared::new(dof as f64).ok()?.sf(statistic)
    };

    Some(ChiSquareTest {
        statistic,
        dof,
        p_value,
        expected,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_independent_table() {
        let observed = vec![vec![5, 5], vec![5, 5]];
        let test = chi_square_independence(&observed, false).unwrap();
        assert!(test.statistic.abs() < 1e-12);
        assert_eq!(test.dof, 1);
        assert!((test.p_value - 1.0).abs() < 1e-9);
        assert_eq!(test.expected, vec![vec![5.0, 5.0], vec![5.0, 5.0]]);
    }

    #[test]
    fn test_known_statistic() {
        // expected = [[15, 15], [15, 15]]; each cell deviates by 5 -> 4 * 25 / 15
        let observed = vec![vec![20, 10], vec![10, 20]];
        let test = chi_square_independence(&observed, false).unwrap();
        assert!((test.statistic - 100.0 / 15.0).abs() < 1e-9);
        // chi2(1) upper tail at 6.667 is about 0.0098
        assert!((test.p_value - 0.00982).abs() < 1e-4);
    }

    #[test]
    fn test_yates_correction_only_for_one_dof() {
        let observed = vec![vec![20, 10], vec![10, 20]];
        let corrected = chi_square_independence(&observed, true).unwrap();
        // each deviation shrinks from 5 to 4.5
        assert!((corrected.statistic - 4.0 * 4.5 * 4.5 / 15.0).abs() < 1e-9);

        let wide = vec![vec![20, 10, 5], vec![10, 20, 5]];
        let plain = chi_square_independence(&wide, false).unwrap();
        let with_flag = chi_square_independence(&wide, true).unwrap();
        assert_eq!(plain.dof, 2);
        assert!((plain.statistic - with_flag.statistic).abs() < 1e-12);
    }

    #[test]
    fn test_larger_table_dof() {
        let observed = vec![vec![3, 4, 5], vec![6, 2, 1], vec![4, 4, 4], vec![1, 9, 2]];
        let test = chi_square_independence(&observed, false).unwrap();
        assert_eq!(test.dof, 6);
        assert!(test.statistic > 0.0);
        assert!((0.0..=1.0).contains(&test.p_value));
    }

    #[test]
    fn test_single_row_has_zero_dof() {
        let test = chi_square_independence(&[vec![4, 6, 1]], false).unwrap();
        assert_eq!(test.dof, 0);
        assert!(test.statistic.abs() < 1e-12);
        assert_eq!(test.p_value, 1.0);
    }

    #[test]
    fn test_insufficient_data() {
        assert!(chi_square_independence(&[], false).is_none());
        assert!(chi_square_independence(&[vec![]], false).is_none());
        assert!(chi_square_independence(&[vec![0, 0], vec![0, 0]], false).is_none());
        // zero row total
        assert!(chi_square_independence(&[vec![1, 2], vec![0, 0]], false).is_none());
        // zero column total
        assert!(chi_square_independence(&[vec![1, 0], vec![2, 0]], false).is_none());
        // ragged
        assert!(chi_square_independence(&[vec![1, 2], vec![3]], false).is_none());
    }
}
