//! Threshold binning for metric analysis
//!
//! This module partitions the real line into ordered half-open intervals from a
//! list of analyst-supplied cut points. `N` cut points yield `N + 1` intervals:
//!
//! ```text
//!   (-inf, c0)  [c0, c1)  ...  [c(N-2), c(N-1))  [c(N-1), +inf)
//!     "< c0"    "c0 - c1"       ...               ">= c(N-1)"
//! ```
//!
//! Every finite or infinite value lands in exactly one interval. `NaN` lands in
//! none and is reported as excluded.
//!
//! # Examples
//!
//! ```
//! use wuyu_stats::binning::{CutPoints, bin_values};
//!
//! let cuts = CutPoints::parse("2, 4").unwrap();
//! let binning = bin_values([Some(1.5), Some(3.0), None, Some(5.0)], &cuts);
//!
//! let labels = binning.intervals.iter().map(|i| i.label.as_str()).collect::<Vec<_>>();
//! assert_eq!(labels, ["< 2", "2 - 4", ">= 4"]);
//! assert_eq!(binning.counts(), vec![1, 1, 1]);
//! assert_eq!(binning.members[2], vec![3]);
//! assert_eq!(binning.excluded, 1);
//! ```

use std::fmt;

#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum CutPointsError {
    #[display("at least one cut point is required")]
    Empty,
    #[display("cut point must be a finite number, got {value}")]
    NonFinite { value: f64 },
    #[display("cut point '{token}' is not a number")]
    Parse { token: String },
}

/// Sorted, de-duplicated, non-empty list of finite cut points.
#[derive(Debug, Clone, PartialEq)]
pub struct CutPoints {
    points: Vec<f64>,
}

impl CutPoints {
    /// Builds cut points from arbitrary values.
    ///
    /// Values are sorted ascending and duplicates are removed.
    ///
    /// # Errors
    ///
    /// Returns [`CutPointsError::Empty`] when no values are given and
    /// [`CutPointsError::NonFinite`] when a value is `NaN` or infinite.
    pub fn new<I>(points: I) -> Result<Self, CutPointsError>
    where
        I: IntoIterator<Item = f64>,
    {
        let mut points = points.into_iter().collect::<Vec<_>>();
        if let Some(&value) = points.iter().find(|p| !p.is_finite()) {
            return Err(CutPointsError::NonFinite { value });
        }
        points.sort_by(f64::total_cmp);
        points.dedup();
        if points.is_empty() {
            return Err(CutPointsError::Empty);
        }
        Ok(Self { points })
    }

    /// Parses a comma separated list such as `"1, 2.5,3"`.
    ///
    /// Blank tokens are skipped.
    pub fn parse(text: &str) -> Result<Self, CutPointsError> {
        let points = text
            .split(',')
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .map(|token| {
                token.parse::<f64>().map_err(|_| CutPointsError::Parse {
                    token: token.to_owned(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(points)
    }

    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.points
    }

    #[must_use]
    pub fn num_intervals(&self) -> usize {
        self.points.len() + 1
    }

    /// Returns the index of the interval containing `value`.
    ///
    /// Returns `None` for `NaN`.
    #[must_use]
    pub fn locate(&self, value: f64) -> Option<usize> {
        if value.is_nan() {
            return None;
        }
        Some(self.points.partition_point(|&cut| cut <= value))
    }

    /// Builds the ordered list of intervals.
    #[must_use]
    pub fn intervals(&self) -> Vec<Interval> {
        let n = self.points.len();
        (0..=n)
            .map(|idx| {
                let lower = idx.checked_sub(1).map(|i| self.points[i]);
                let upper = (idx < n).then(|| self.points[idx]);
                Interval::new(lower, upper)
            })
            .collect()
    }
}

/// A half-open interval `[lower, upper)`.
///
/// A missing bound means the interval is unbounded on that side.
#[derive(Debug, Clone, PartialEq)]
pub struct Interval {
    pub lower: Option<f64>,
    pub upper: Option<f64>,
    pub label: String,
}

impl Interval {
    fn new(lower: Option<f64>, upper: Option<f64>) -> Self {
        let label = IntervalLabel { lower, upper }.to_string();
        Self {
            lower,
            upper,
            label,
        }
    }

    #[must_use]
    pub fn contains(&self, value: f64) -> bool {
        if value.is_nan() {
            return false;
        }
        self.lower.is_none_or(|lower| lower <= value) && self.upper.is_none_or(|upper| value < upper)
    }
}

struct IntervalLabel {
    lower: Option<f64>,
    upper: Option<f64>,
}

impl fmt::Display for IntervalLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.lower, self.upper) {
            (None, Some(upper)) => write!(f, "< {upper}"),
            (Some(lower), None) => write!(f, ">= {lower}"),
            (Some(lower), Some(upper)) => write!(f, "{lower} - {upper}"),
            (None, None) => f.write_str("all"),
        }
    }
}

/// Interval membership of a sequence of values.
#[derive(Debug, Clone)]
pub struct Binning {
    pub intervals: Vec<Interval>,
    /// Indices (into the input sequence) of the values in each interval.
    pub members: Vec<Vec<usize>>,
    /// Number of absent or `NaN` values that belong to no interval.
    pub excluded: usize,
}

impl Binning {
    #[must_use]
    pub fn counts(&self) -> Vec<usize> {
        self.members.iter().map(Vec::len).collect()
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.members.iter().map(Vec::len).sum()
    }
}

/// Assigns each present value to its interval.
#[must_use]
pub fn bin_values<I>(values: I, cuts: &CutPoints) -> Binning
where
    I: IntoIterator<Item = Option<f64>>,
{
    let mut members = vec![Vec::new(); cuts.num_intervals()];
    let mut excluded = 0;
    for (idx, value) in values.into_iter().enumerate() {
        match value.and_then(|v| cuts.locate(v)) {
            Some(bin) => members[bin].push(idx),
            None => excluded += 1,
        }
    }
    Binning {
        intervals: cuts.intervals(),
        members,
        excluded,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_cut_points_rejected() {
        assert_eq!(CutPoints::new(Vec::<f64>::new()), Err(CutPointsError::Empty));
        assert_eq!(CutPoints::parse(" , "), Err(CutPointsError::Empty));
    }

    #[test]
    fn test_non_finite_rejected() {
        assert!(matches!(
            CutPoints::new([1.0, f64::NAN]),
            Err(CutPointsError::NonFinite { .. })
        ));
        assert!(matches!(
            CutPoints::new([f64::INFINITY]),
            Err(CutPointsError::NonFinite { .. })
        ));
    }

    #[test]
    fn test_parse_error_reports_token() {
        assert_eq!(
            CutPoints::parse("1,abc"),
            Err(CutPointsError::Parse {
                token: "abc".to_owned()
            })
        );
    }

    #[test]
    fn test_sorted_and_deduplicated() {
        let cuts = CutPoints::new([3.0, 1.0, 3.0, 2.0, 1.0]).unwrap();
        assert_eq!(cuts.as_slice(), &[1.0, 2.0, 3.0]);
        assert_eq!(cuts.num_intervals(), 4);
    }

    #[test]
    fn test_labels() {
        let cuts = CutPoints::new([2.0, 4.0, 6.5]).unwrap();
        let labels = cuts
            .intervals()
            .into_iter()
            .map(|i| i.label)
            .collect::<Vec<_>>();
        assert_eq!(labels, ["< 2", "2 - 4", "4 - 6.5", ">= 6.5"]);
    }

    #[test]
    fn test_single_cut_point() {
        let cuts = CutPoints::new([0.0]).unwrap();
        let intervals = cuts.intervals();
        assert_eq!(intervals.len(), 2);
        assert_eq!(intervals[0].label, "< 0");
        assert_eq!(intervals[1].label, ">= 0");
        assert_eq!(cuts.locate(-0.5), Some(0));
        assert_eq!(cuts.locate(0.0), Some(1));
    }

    #[test]
    fn test_boundaries_are_half_open() {
        let cuts = CutPoints::new([2.0, 4.0]).unwrap();
        assert_eq!(cuts.locate(2.0), Some(1));
        assert_eq!(cuts.locate(4.0), Some(2));
        assert_eq!(cuts.locate(3.999), Some(1));
        assert_eq!(cuts.locate(f64::NEG_INFINITY), Some(0));
        assert_eq!(cuts.locate(f64::INFINITY), Some(2));
        assert_eq!(cuts.locate(f64::NAN), None);
    }

    #[test]
    fn test_exactly_one_interval_contains_each_value() {
        let cuts = CutPoints::new([-1.0, 0.0, 0.5, 3.0, 10.0]).unwrap();
        let intervals = cuts.intervals();
        let probes = [
            f64::NEG_INFINITY,
            -100.0,
            -1.0,
            -0.5,
            0.0,
            0.25,
            0.5,
            2.999,
            3.0,
            9.5,
            10.0,
            1e9,
            f64::INFINITY,
        ];
        for value in probes {
            let containing = intervals
                .iter()
                .enumerate()
                .filter(|(_, interval)| interval.contains(value))
                .map(|(idx, _)| idx)
                .collect::<Vec<_>>();
            assert_eq!(containing.len(), 1, "value {value} in {containing:?}");
            assert_eq!(Some(containing[0]), cuts.locate(value));
        }
    }

    #[test]
    fn test_absent_values_excluded() {
        let cuts = CutPoints::new([1.0]).unwrap();
        let binning = bin_values([None, Some(f64::NAN), Some(0.0), Some(1.0)], &cuts);
        assert_eq!(binning.counts(), vec![1, 1]);
        assert_eq!(binning.excluded, 2);
        assert_eq!(binning.total(), 2);
        assert_eq!(binning.members, vec![vec![2], vec![3]]);
    }
}
