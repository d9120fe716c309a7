//! Flat header + rows tables for every exposed result.
//!
//! Each result type converts into a [`Table`] of strings that can be written
//! as delimited text or JSON. Means, percentages and statistics are formatted
//! with two decimals.

use serde::Serialize;
use wuyu_stats::descriptive::DescriptiveStats;

use crate::{
    aggregate::Aggregation,
    catalog::{FieldCatalog, FieldKind},
    contingency::ContingencyTable,
    dataset::DatasetView,
    encoding::EncodingTable,
    region::PROVINCE_REGIONS,
    threshold::ThresholdReport,
};

const TOTAL_LABEL: &str = "Total";
const CHI_SQUARE_LABEL: &str = "Chi-square test";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Table {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Which optional parts of a contingency table are exported.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ContingencyLayout {
    /// Appends a totals column and a totals row.
    pub totals: bool,
    /// Appends an annotated row carrying the chi-square summary.
    pub chi_square_row: bool,
}

fn header<I, S>(names: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    names.into_iter().map(Into::into).collect()
}

fn decimal(value: f64) -> String {
    format!("{value:.2}")
}

impl Table {
    /// Group means, one row per group.
    #[must_use]
    pub fn from_aggregation(aggregation: &Aggregation) -> Self {
        Self {
            header: header([aggregation.group_field.as_str(), aggregation.metric.as_str(), "count"]),
            rows: aggregation
                .rows
                .iter()
                .map(|row| vec![row.group.to_string(), decimal(row.mean), row.count.to_string()])
                .collect(),
        }
    }

    /// Count and percentage per interval.
    #[must_use]
    pub fn from_threshold_distribution(report: &ThresholdReport) -> Self {
        Self {
            header: header(["interval", "count", "percent"]),
            rows: report
                .shares
                .iter()
                .map(|share| {
                    vec![
                        share.interval.label.clone(),
                        share.count.to_string(),
                        format!("{}%", decimal(share.percent)),
                    ]
                })
                .collect(),
        }
    }

    /// Equal-width histogram bins.
    #[must_use]
    pub fn from_histogram(report: &ThresholdReport) -> Self {
        Self {
            header: header(["bin_start", "bin_end", "count"]),
            rows: report
                .histogram
                .bins
                .iter()
                .map(|bin| {
                    vec![
                        decimal(bin.range.start),
                        decimal(bin.range.end),
                        bin.count.to_string(),
                    ]
                })
                .collect(),
        }
    }

    /// `count, mean, std, min, 25%, 50%, 75%, max`.
    ///
    /// The standard deviation is left blank when it is unavailable.
    #[must_use]
    pub fn from_descriptive_stats(metric: &str, stats: &DescriptiveStats) -> Self {
        let rows = [
            ("count", stats.count.to_string()),
            ("mean", decimal(stats.mean)),
            ("std", stats.std_dev.map(decimal).unwrap_or_default()),
            ("min", decimal(stats.min)),
            ("25%", decimal(stats.q1)),
            ("50%", decimal(stats.median)),
            ("75%", decimal(stats.q3)),
            ("max", decimal(stats.max)),
        ];
        Self {
            header: header(["statistic", metric]),
            rows: rows
                .into_iter()
                .map(|(name, value)| vec![name.to_owned(), value])
                .collect(),
        }
    }

    /// Category rows by interval columns.
    #[must_use]
    pub fn from_contingency(table: &ContingencyTable, layout: ContingencyLayout) -> Self {
        let mut columns = vec![table.grouping.clone()];
        columns.extend(table.intervals.iter().map(|i| i.label.clone()));
        if layout.totals {
            columns.push(TOTAL_LABEL.to_owned());
        }

        let mut rows = table
            .rows
            .iter()
            .zip(&table.cells)
            .zip(&table.row_totals)
            .map(|((category, cells), total)| {
                let mut row = vec![category.to_string()];
                row.extend(cells.iter().map(ToString::to_string));
                if layout.totals {
                    row.push(total.to_string());
                }
                row
            })
            .collect::<Vec<_>>();

        if layout.totals {
            let mut row = vec![TOTAL_LABEL.to_owned()];
            row.extend(table.col_totals.iter().map(ToString::to_string));
            row.push(table.grand_total.to_string());
            rows.push(row);
        }
        if layout.chi_square_row {
            let mut row = vec![CHI_SQUARE_LABEL.to_owned(), table.chi_square.summary()];
            row.resize(columns.len(), String::new());
            rows.push(row);
        }

        Self {
            header: columns,
            rows,
        }
    }

    /// `code, label` pairs in code order.
    #[must_use]
    pub fn from_encoding(encoding: &EncodingTable) -> Self {
        Self {
            header: header(["code", "label"]),
            rows: encoding
                .iter()
                .map(|(code, label)| vec![code.to_string(), label.to_owned()])
                .collect(),
        }
    }

    /// Raw question text to canonical field name, with the field kind.
    #[must_use]
    pub fn from_rename_map(catalog: &FieldCatalog) -> Self {
        Self {
            header: header(["raw_name", "canonical_name", "kind", "metric"]),
            rows: catalog
                .fields()
                .iter()
                .map(|spec| {
                    vec![
                        spec.raw_name.clone(),
                        spec.canonical_name.clone(),
                        kind_name(&spec.kind).to_owned(),
                        spec.metric.to_string(),
                    ]
                })
                .collect(),
        }
    }

    /// Label-to-score tables of every fixed-scale field.
    #[must_use]
    pub fn from_fixed_scales(catalog: &FieldCatalog) -> Self {
        let mut rows = vec![];
        for spec in catalog.fields() {
            if let FieldKind::FixedScale { scale } = &spec.kind {
                rows.extend(scale.iter().map(|(label, score)| {
                    vec![spec.canonical_name.clone(), label.clone(), score.to_string()]
                }));
            }
        }
        Self {
            header: header(["field", "label", "score"]),
            rows,
        }
    }

    /// The province-to-region lookup table.
    #[must_use]
    pub fn from_region_table() -> Self {
        Self {
            header: header(["province", "region"]),
            rows: PROVINCE_REGIONS
                .iter()
                .map(|(province, region)| vec![(*province).to_owned(), (*region).to_owned()])
                .collect(),
        }
    }

    /// Every record of `view`, absent values left blank.
    #[must_use]
    pub fn from_view(view: &DatasetView<'_>) -> Self {
        let columns = view.dataset().columns().to_vec();
        let rows = view
            .records()
            .map(|record| {
                columns
                    .iter()
                    .map(|column| record.get(column).map(ToString::to_string).unwrap_or_default())
                    .collect()
            })
            .collect();
        Self {
            header: columns,
            rows,
        }
    }
}

fn kind_name(kind: &FieldKind) -> &'static str {
    match kind {
        FieldKind::OrdinalCategorical { .. } => "ordinal_categorical",
        FieldKind::MultiSelectFlag => "multi_select_flag",
        FieldKind::SignedLikert => "signed_likert",
        FieldKind::Passthrough => "passthrough",
        FieldKind::FixedScale { .. } => "fixed_scale",
        FieldKind::Indicator { .. } => "indicator",
        FieldKind::Relabel { .. } => "relabel",
    }
}
