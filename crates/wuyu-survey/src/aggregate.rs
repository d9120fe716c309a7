//! Group-wise means of a metric.
//!
//! Records missing either the metric or the grouping value are dropped before
//! grouping. Rows are ordered by mean descending; ties are broken by group
//! value ascending.
//!
//! An empty view or a metric without numeric values yields no rows and a
//! [`Notice`] instead of an error.

use std::collections::BTreeMap;

use tracing::debug;

use crate::{
    dataset::DatasetView,
    error::{AnalysisError, Notice},
    record::Value,
};

#[derive(Debug, Clone, PartialEq)]
pub struct GroupMean {
    pub group: Value,
    pub mean: f64,
    /// Records contributing to the mean.
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Aggregation {
    pub metric: String,
    pub group_field: String,
    pub rows: Vec<GroupMean>,
    pub notices: Vec<Notice>,
}

/// Computes the mean of `metric` per distinct `group_field` value.
///
/// # Errors
///
/// Returns [`AnalysisError::UnknownField`] when either field is not a column
/// of the dataset.
#[expect(clippy::cast_precision_loss)]
pub fn aggregate(
    view: &DatasetView<'_>,
    metric: &str,
    group_field: &str,
) -> Result<Aggregation, AnalysisError> {
    view.ensure_column(metric)?;
    view.ensure_column(group_field)?;

    let mut aggregation = Aggregation {
        metric: metric.to_owned(),
        group_field: group_field.to_owned(),
        rows: vec![],
        notices: vec![],
    };

    if view.is_empty() {
        aggregation
            .notices
            .push(Notice::insufficient("no records match the current filters"));
        return Ok(aggregation);
    }

    let mut groups = BTreeMap::<&Value, (f64, usize)>::new();
    let mut present = 0;
    let mut non_numeric = 0;
    for record in view.records() {
        let (Some(value), Some(group)) = (record.get(metric), record.get(group_field)) else {
            continue;
        };
        present += 1;
        let Some(number) = value.as_number() else {
            non_numeric += 1;
            continue;
        };
        let (sum, count) = groups.entry(group).or_default();
        *sum += number;
        *count += 1;
    }

    if groups.is_empty() {
        let notice = if present > 0 {
            Notice::coercion(metric, "metric is not numeric")
        } else {
            Notice::insufficient(format!("no record has both '{metric}' and '{group_field}'"))
        };
        debug!(metric, group_field, %notice, "aggregation skipped");
        aggregation.notices.push(notice);
        return Ok(aggregation);
    }
    if non_numeric > 0 {
        aggregation.notices.push(Notice::coercion(
            metric,
            format!("{non_numeric} non-numeric values ignored"),
        ));
    }

    let mut rows = groups
        .into_iter()
        .map(|(group, (sum, count))| GroupMean {
            group: group.clone(),
            mean: sum / count as f64,
            count,
        })
        .collect::<Vec<_>>();
    // BTreeMap iteration is already group-ascending; the sort is stable
    rows.sort_by(|a, b| b.mean.total_cmp(&a.mean));
    aggregation.rows = rows;
    Ok(aggregation)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{Filter, tests::sample_dataset};

    #[test]
    fn test_group_means_descending() {
        let dataset = sample_dataset();
        let aggregation = aggregate(&dataset.view(), "score", "group").unwrap();
        let rows = aggregation
            .rows
            .iter()
            .map(|r| (r.group.to_string(), r.mean, r.count))
            .collect::<Vec<_>>();
        // 华北 has no score and is dropped
        assert_eq!(
            rows,
            vec![("华东".to_owned(), 4.0, 2), ("华南".to_owned(), 1.5, 2)]
        );
        assert!(aggregation.notices.is_empty());
    }

    #[test]
    fn test_ties_broken_by_group_ascending() {
        let dataset = sample_dataset();
        // grade codes: 1 -> [3, absent], 2 -> [1, 5], 3 -> [2]
        let aggregation = aggregate(&dataset.view(), "score", "grade").unwrap();
        let groups = aggregation
            .rows
            .iter()
            .map(|r| (r.group.clone(), r.mean))
            .collect::<Vec<_>>();
        assert_eq!(
            groups,
            vec![
                (Value::from(1.0), 3.0),
                (Value::from(2.0), 3.0),
                (Value::from(3.0), 2.0)
            ]
        );
    }

    #[test]
    fn test_empty_view_yields_notice() {
        let dataset = sample_dataset();
        let view = dataset.view().filter(&Filter::new("group", ["西北"])).unwrap();
        let aggregation = aggregate(&view, "score", "group").unwrap();
        assert!(aggregation.rows.is_empty());
        assert!(aggregation.notices[0].is_insufficient_data());
    }

    #[test]
    fn test_non_numeric_metric_yields_notice() {
        let dataset = sample_dataset();
        let aggregation = aggregate(&dataset.view(), "group", "grade").unwrap();
        assert!(aggregation.rows.is_empty());
        assert!(aggregation.notices[0].is_coercion());
    }

    #[test]
    fn test_unknown_field() {
        let dataset = sample_dataset();
        assert!(matches!(
            aggregate(&dataset.view(), "nope", "group"),
            Err(AnalysisError::UnknownField { .. })
        ));
    }
}
