//! Cross-tabulation of metric intervals against categories.
//!
//! Rows are [`Category`]s of a grouping field: either a plain value or a named
//! composite group (the union of several plain values). Columns are the
//! threshold intervals in ascending order. A cell counts records whose metric
//! falls in the column interval and whose grouping value matches the row.
//!
//! Rows may overlap; a record is counted once in every row it matches. Totals
//! are kept apart from the cells so they never feed back into a computation.
//!
//! # Examples
//!
//! ```
//! use wuyu_stats::binning::CutPoints;
//! use wuyu_survey::{
//!     contingency::{Category, CompositeGroups, ContingencyRequest, ContingencyTable},
//!     dataset::Dataset,
//!     encoder::CoercionReport,
//!     record::{EncodedRecord, Value},
//! };
//!
//! let records = [("华东", 1.0), ("华南", 3.0), ("华北", 3.0)]
//!     .into_iter()
//!     .map(|(region, score)| {
//!         [("Region", Value::from(region)), ("score", Value::from(score))]
//!             .into_iter()
//!             .collect::<EncodedRecord>()
//!     })
//!     .collect();
//! let dataset = Dataset::new(
//!     vec!["Region".into(), "score".into()],
//!     records,
//!     Default::default(),
//!     vec!["score".into()],
//!     CoercionReport::default(),
//! );
//!
//! let mut groups = CompositeGroups::new();
//! groups.define_group("东南", [Value::from("华东"), Value::from("华南")]);
//! let categories = Category::select(&[Value::from("华北")], &groups);
//!
//! let cuts = CutPoints::new([2.0]).unwrap();
//! let request = ContingencyRequest::new("score", "Region", &cuts, &categories);
//! let table = ContingencyTable::build(&dataset.view(), &request).unwrap();
//!
//! assert_eq!(table.row_labels(), ["华北", "东南"]);
//! assert_eq!(table.cells, vec![vec![0, 1], vec![1, 1]]);
//! assert_eq!(table.grand_total, 3);
//! ```

use std::{collections::BTreeSet, fmt};

use indexmap::IndexMap;
use tracing::debug;
use wuyu_stats::{
    binning::{CutPoints, Interval},
    chi_square::{ChiSquareTest, chi_square_independence},
    descriptive::DescriptiveStats,
};

use crate::{
    dataset::DatasetView,
    error::{AnalysisError, Notice},
    record::Value,
};

/// Registry of analyst-defined composite groups.
///
/// Groups keep their definition order. Re-defining a name replaces its member
/// set in place; groups are never removed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompositeGroups {
    groups: IndexMap<String, BTreeSet<Value>>,
}

impl CompositeGroups {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn define_group<I>(&mut self, name: impl Into<String>, members: I)
    where
        I: IntoIterator<Item = Value>,
    {
        let name = name.into();
        let members = members.into_iter().collect::<BTreeSet<_>>();
        debug!(group = %name, members = members.len(), "defined composite group");
        self.groups.insert(name, members);
    }

    pub fn list_groups(&self) -> impl Iterator<Item = (&str, &BTreeSet<Value>)> {
        self.groups.iter().map(|(name, members)| (name.as_str(), members))
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&BTreeSet<Value>> {
        self.groups.get(name)
    }
}

/// One row of a contingency table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Category {
    Plain(Value),
    Composite {
        name: String,
        members: BTreeSet<Value>,
    },
}

impl Category {
    /// Rows for a selection of plain values followed by every composite group.
    ///
    /// A plain value whose label equals a composite group name is replaced in
    /// place by that group. The remaining groups follow in definition order.
    #[must_use]
    pub fn select(plain: &[Value], groups: &CompositeGroups) -> Vec<Self> {
        let composite = |name: &str, members: &BTreeSet<Value>| Category::Composite {
            name: name.to_owned(),
            members: members.clone(),
        };
        let mut rows = vec![];
        let mut placed = BTreeSet::new();
        for value in plain {
            let label = value.to_string();
            match groups.get(&label) {
                Some(members) => {
                    if placed.insert(label.clone()) {
                        rows.push(composite(&label, members));
                    }
                }
                None => rows.push(Category::Plain(value.clone())),
            }
        }
        rows.extend(
            groups
                .list_groups()
                .filter(|(name, _)| !placed.contains(*name))
                .map(|(name, members)| composite(name, members)),
        );
        rows
    }

    #[must_use]
    pub fn matches(&self, value: &Value) -> bool {
        match self {
            Category::Plain(plain) => plain == value,
            Category::Composite { members, .. } => members.contains(value),
        }
    }

}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::Plain(value) => write!(f, "{value}"),
            Category::Composite { name, .. } => f.write_str(name),
        }
    }
}

/// Parameters of a contingency table.
#[derive(Debug, Clone, Copy)]
pub struct ContingencyRequest<'a> {
    pub metric: &'a str,
    pub grouping: &'a str,
    pub cuts: &'a CutPoints,
    pub categories: &'a [Category],
    /// Apply Yates' correction when the table has one degree of freedom.
    pub continuity_correction: bool,
}

impl<'a> ContingencyRequest<'a> {
    #[must_use]
    pub fn new(
        metric: &'a str,
        grouping: &'a str,
        cuts: &'a CutPoints,
        categories: &'a [Category],
    ) -> Self {
        Self {
            metric,
            grouping,
            cuts,
            categories,
            continuity_correction: false,
        }
    }

    #[must_use]
    pub fn with_continuity_correction(mut self, enabled: bool) -> Self {
        self.continuity_correction = enabled;
        self
    }
}

/// Chi-square result attached to a table.
#[derive(Debug, Clone, PartialEq, derive_more::IsVariant)]
pub enum ChiSquareOutcome {
    Computed(ChiSquareTest),
    /// Some row or column total is zero.
    InsufficientData,
}

impl ChiSquareOutcome {
    #[must_use]
    pub fn summary(&self) -> String {
        match self {
            ChiSquareOutcome::Computed(test) => {
                format!("χ² = {:.2}, p = {:.4}", test.statistic, test.p_value)
            }
            ChiSquareOutcome::InsufficientData => {
                "insufficient data for chi-square test".to_owned()
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct ContingencyTable {
    pub metric: String,
    pub grouping: String,
    pub rows: Vec<Category>,
    pub intervals: Vec<Interval>,
    /// `cells[row][col]`
    pub cells: Vec<Vec<u64>>,
    pub row_totals: Vec<u64>,
    pub col_totals: Vec<u64>,
    pub grand_total: u64,
    pub chi_square: ChiSquareOutcome,
    /// Statistics of the metric over the records counted in at least one row.
    pub stats: Option<DescriptiveStats>,
    pub notices: Vec<Notice>,
}

impl ContingencyTable {
    /// Cross-tabulates `request` over `view`.
    ///
    /// # Errors
    ///
    /// - [`AnalysisError::InvalidParameter`] when no category is requested.
    /// - [`AnalysisError::UnknownField`] when the metric or grouping field is
    ///   not a column.
    /// - [`AnalysisError::NonNumericMetric`] when the metric has values but
    ///   none of them is numeric.
    pub fn build(
        view: &DatasetView<'_>,
        request: &ContingencyRequest<'_>,
    ) -> Result<Self, AnalysisError> {
        if request.categories.is_empty() {
            return Err(AnalysisError::InvalidParameter {
                message: "select at least one category or composite group".to_owned(),
            });
        }
        view.ensure_column(request.metric)?;
        view.ensure_column(request.grouping)?;

        let cuts = request.cuts;
        let num_rows = request.categories.len();
        let mut cells = vec![vec![0_u64; cuts.num_intervals()]; num_rows];
        let mut counted = vec![];
        let mut present = 0;
        let mut numeric = 0;

        for record in view.records() {
            let Some(metric) = record.get(request.metric) else {
                continue;
            };
            present += 1;
            let Some(value) = metric.as_number() else {
                continue;
            };
            numeric += 1;
            let (Some(group), Some(col)) = (record.get(request.grouping), cuts.locate(value)) else {
                continue;
            };
            let mut hit = false;
            for (row, category) in request.categories.iter().enumerate() {
                if category.matches(group) {
                    cells[row][col] += 1;
                    hit = true;
                }
            }
            if hit {
                counted.push(value);
            }
        }

        if present > 0 && numeric == 0 {
            return Err(AnalysisError::NonNumericMetric {
                field: request.metric.to_owned(),
            });
        }

        let row_totals = cells.iter().map(|row| row.iter().sum()).collect::<Vec<u64>>();
        let col_totals = (0..cuts.num_intervals())
            .map(|col| cells.iter().map(|row| row[col]).sum())
            .collect::<Vec<u64>>();
        let grand_total = row_totals.iter().sum();

        let mut notices = vec![];
        let chi_square = match chi_square_independence(&cells, request.continuity_correction) {
            Some(test) => ChiSquareOutcome::Computed(test),
            None => {
                debug!(
                    metric = request.metric,
                    grouping = request.grouping,
                    "chi-square test skipped: a row or column total is zero"
                );
                notices.push(Notice::insufficient(
                    "a row or column total is zero; chi-square test skipped",
                ));
                ChiSquareOutcome::InsufficientData
            }
        };

        let stats = DescriptiveStats::new(counted);
        if stats.is_none() {
            notices.push(Notice::insufficient("no record falls in the selected categories"));
        }

        Ok(Self {
            metric: request.metric.to_owned(),
            grouping: request.grouping.to_owned(),
            rows: request.categories.to_vec(),
            intervals: cuts.intervals(),
            cells,
            row_totals,
            col_totals,
            grand_total,
            chi_square,
            stats,
            notices,
        })
    }

    #[must_use]
    pub fn row_labels(&self) -> Vec<String> {
        self.rows.iter().map(ToString::to_string).collect()
    }
}
