//! Distribution of a metric over threshold intervals.

use tracing::debug;
use wuyu_stats::{
    binning::{CutPoints, Interval, bin_values},
    descriptive::DescriptiveStats,
    histogram::Histogram,
};

use crate::{
    dataset::DatasetView,
    error::{AnalysisError, Notice},
};

/// Number of equal-width histogram bins over the valid values.
pub const HISTOGRAM_BINS: usize = 20;

#[derive(Debug, Clone, PartialEq)]
pub struct IntervalShare {
    pub interval: Interval,
    pub count: usize,
    /// Share of the valid values, in percent.
    pub percent: f64,
}

#[derive(Debug, Clone)]
pub struct ThresholdReport {
    pub metric: String,
    pub shares: Vec<IntervalShare>,
    /// Records of the view with a numeric metric value.
    pub valid_count: usize,
    /// Records of the view whose metric is absent or not numeric.
    pub excluded_count: usize,
    pub stats: Option<DescriptiveStats>,
    pub histogram: Histogram,
    pub notices: Vec<Notice>,
}

impl ThresholdReport {
    /// Valid metric values of `view`, in view order; `None` for records whose
    /// metric is absent or not numeric.
    pub(crate) fn metric_values<'v>(
        view: &'v DatasetView<'_>,
        metric: &'v str,
    ) -> impl Iterator<Item = Option<f64>> + 'v {
        view.records()
            .map(move |record| record.get(metric).and_then(|value| value.as_number()))
    }

    /// Builds the report of `metric` over `view`.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::UnknownField`] when `metric` is not a column and
    /// [`AnalysisError::NonNumericMetric`] when the view holds values of the
    /// metric but none of them is numeric.
    #[expect(clippy::cast_precision_loss)]
    pub fn new(
        view: &DatasetView<'_>,
        metric: &str,
        cuts: &CutPoints,
    ) -> Result<Self, AnalysisError> {
        view.ensure_column(metric)?;

        let values = Self::metric_values(view, metric).collect::<Vec<_>>();
        let valid = values.iter().flatten().copied().collect::<Vec<_>>();
        let present = view.records().filter(|r| r.get(metric).is_some()).count();
        if valid.is_empty() && present > 0 {
            return Err(AnalysisError::NonNumericMetric {
                field: metric.to_owned(),
            });
        }

        let mut notices = vec![];
        if present > valid.len() {
            notices.push(Notice::coercion(
                metric,
                format!("{} non-numeric values excluded", present - valid.len()),
            ));
        }

        let binning = bin_values(values, cuts);
        let total = binning.total();
        let shares = binning
            .intervals
            .iter()
            .zip(binning.counts())
            .map(|(interval, count)| IntervalShare {
                interval: interval.clone(),
                count,
                percent: if total == 0 {
                    0.0
                } else {
                    count as f64 / total as f64 * 100.0
                },
            })
            .collect();

        let stats = DescriptiveStats::new(valid.iter().copied());
        match &stats {
            None => notices.push(Notice::insufficient(format!("no valid values of '{metric}'"))),
            Some(stats) if stats.std_dev.is_none() => notices.push(Notice::insufficient(
                "standard deviation needs at least two values",
            )),
            Some(stats) if stats.is_constant() => {
                notices.push(Notice::insufficient(format!("'{metric}' has zero variance")));
            }
            Some(_) => {}
        }

        debug!(metric, valid = total, excluded = binning.excluded, "built threshold report");

        Ok(Self {
            metric: metric.to_owned(),
            shares,
            valid_count: total,
            excluded_count: binning.excluded,
            stats,
            histogram: Histogram::new(valid, HISTOGRAM_BINS),
            notices,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{Filter, tests::sample_dataset};

    #[test]
    fn test_shares() {
        let dataset = sample_dataset();
        let cuts = CutPoints::new([2.0, 4.0]).unwrap();
        let report = ThresholdReport::new(&dataset.view(), "score", &cuts).unwrap();

        // scores: 3, 1, 5, absent, 2
        let counts = report.shares.iter().map(|s| s.count).collect::<Vec<_>>();
        assert_eq!(counts, vec![1, 2, 1]);
        assert_eq!(report.valid_count, 4);
        assert_eq!(report.excluded_count, 1);
        assert!((report.shares[1].percent - 50.0).abs() < 1e-12);
        let percent_sum = report.shares.iter().map(|s| s.percent).sum::<f64>();
        assert!((percent_sum - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_stats_and_histogram() {
        let dataset = sample_dataset();
        let cuts = CutPoints::new([3.0]).unwrap();
        let report = ThresholdReport::new(&dataset.view(), "score", &cuts).unwrap();
        let stats = report.stats.as_ref().unwrap();
        assert_eq!(stats.count, 4);
        assert!((stats.mean - 2.75).abs() < 1e-12);
        assert_eq!(report.histogram.bins.len(), HISTOGRAM_BINS);
        assert_eq!(report.histogram.bins.iter().map(|b| b.count).sum::<u64>(), 4);
        assert!(report.notices.is_empty());
    }

    #[test]
    fn test_single_value_notice() {
        let dataset = sample_dataset();
        let view = dataset.view().filter(&Filter::new("score", [5.0])).unwrap();
        let cuts = CutPoints::new([3.0]).unwrap();
        let report = ThresholdReport::new(&view, "score", &cuts).unwrap();
        assert!(report.stats.as_ref().unwrap().std_dev.is_none());
        assert!(report.notices.iter().any(Notice::is_insufficient_data));
    }

    #[test]
    fn test_empty_view() {
        let dataset = sample_dataset();
        let view = dataset.view().filter(&Filter::new("group", ["西北"])).unwrap();
        let cuts = CutPoints::new([3.0]).unwrap();
        let report = ThresholdReport::new(&view, "score", &cuts).unwrap();
        assert!(report.stats.is_none());
        assert!(report.shares.iter().all(|s| s.count == 0 && s.percent == 0.0));
        assert!(report.notices[0].is_insufficient_data());
    }

    #[test]
    fn test_text_metric_rejected() {
        let dataset = sample_dataset();
        let cuts = CutPoints::new([3.0]).unwrap();
        assert_eq!(
            ThresholdReport::new(&dataset.view(), "group", &cuts).unwrap_err(),
            AnalysisError::NonNumericMetric {
                field: "group".to_owned()
            }
        );
    }
}
