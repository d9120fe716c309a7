//! Encoding and cross-tabulation of questionnaire responses
//!
//! This crate turns a wide table of raw survey answers into analysis-ready
//! numeric data and answers three kinds of questions about it: group means,
//! threshold distributions and contingency tables with a chi-square test.
//!
//! # Overview
//!
//! Data flows leaf to root:
//!
//! 1. **Describe the input** ([`catalog::FieldCatalog`]): which raw columns to
//!    keep, their canonical names and how each one is encoded
//! 2. **Encode** ([`encoder::Encoder`]): rename fields, assign ordinal codes in
//!    first-seen order ([`encoding::EncodingTable`]), derive flags, rescaled
//!    Likert scores and the region ([`region::RegionClassifier`])
//! 3. **Select** ([`dataset::DatasetView`]): narrow the immutable
//!    [`dataset::Dataset`] with [`dataset::Filter`]s
//! 4. **Analyze**:
//!    - [`aggregate::aggregate`]: mean of a metric per group
//!    - [`threshold::ThresholdReport`]: interval shares, descriptive
//!      statistics and a histogram of one metric
//!    - [`contingency::ContingencyTable`]: intervals by categories, including
//!      analyst-defined [`contingency::CompositeGroups`], with a chi-square test
//! 5. **Export** ([`export::Table`]): flat header + rows tables
//!
//! Fatal problems are [`error::ConfigError`]s (at encoding time) or
//! [`error::AnalysisError`]s (per request). Everything else (coercion
//! fallbacks, empty views, untestable tables) is reported as an
//! [`error::Notice`] next to a successful result.
//!
//! # Examples
//!
//! ```
//! use wuyu_stats::binning::CutPoints;
//! use wuyu_survey::{
//!     aggregate::aggregate,
//!     catalog::{CatalogConfig, FieldCatalog, FieldKind, FieldSpec},
//!     encoder::Encoder,
//!     record::RawTable,
//!     threshold::ThresholdReport,
//! };
//!
//! let catalog = FieldCatalog::new(CatalogConfig {
//!     fields: vec![
//!         FieldSpec::new("1.性别", "gender", FieldKind::Passthrough),
//!         FieldSpec::new("27.尴尬", "awkward_score", FieldKind::SignedLikert).metric(),
//!     ],
//!     region: None,
//!     prefilter: vec![],
//! })?;
//!
//! let raw = RawTable::from_rows(
//!     vec!["1.性别".to_owned(), "27.尴尬".to_owned()],
//!     [["男", "3"], ["女", "1"], ["男", "1"]]
//!         .map(|row| row.map(str::to_owned)),
//! );
//! let dataset = Encoder::new(&catalog).encode(&raw)?;
//! assert_eq!(dataset.metric_fields(), ["awkward_score"]);
//!
//! let means = aggregate(&dataset.view(), "awkward_score", "gender")?;
//! assert_eq!(means.rows[0].group.to_string(), "女");
//! assert_eq!(means.rows[0].mean, -1.0);
//!
//! let cuts = CutPoints::new([-2.0])?;
//! let report = ThresholdReport::new(&dataset.view(), "awkward_score", &cuts)?;
//! assert_eq!(report.shares[0].count, 1);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod aggregate;
pub mod catalog;
pub mod contingency;
pub mod dataset;
pub mod encoder;
pub mod encoding;
pub mod error;
pub mod export;
pub mod record;
pub mod region;
pub mod threshold;
