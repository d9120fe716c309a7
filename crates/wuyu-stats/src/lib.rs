//! Statistical utilities for the wuyu survey analysis workspace.
//!
//! This crate provides the numeric building blocks used by the survey pipeline:
//!
//! - **Descriptive statistics**: count, mean, sample standard deviation, min, quartiles, max
//! - **Percentiles**: linear-interpolated percentile points over sorted data
//! - **Histogram generation**: equal-width frequency distributions
//! - **Threshold binning**: half-open intervals derived from analyst-supplied cut points
//! - **Chi-square test**: independence test on a contingency table of counts
//!
//! # Modules
//!
//! - [`descriptive`]: Descriptive statistics for summarizing datasets
//! - [`percentiles`]: Percentile computation
//! - [`histogram`]: Histogram construction for visualizing data distributions
//! - [`binning`]: Cut points, intervals and interval membership
//! - [`chi_square`]: Pearson chi-square independence test
//!
//! # Examples
//!
//! ## Computing descriptive statistics
//!
//! ```
//! use wuyu_stats::descriptive::DescriptiveStats;
//!
//! let values = [1.0, 2.0, 3.0, 4.0, 5.0];
//! let stats = DescriptiveStats::new(values).unwrap();
//! assert_eq!(stats.mean, 3.0);
//! assert_eq!(stats.median, 3.0);
//! ```
//!
//! ## Binning values with cut points
//!
//! ```
//! use wuyu_stats::binning::CutPoints;
//!
//! let cuts = CutPoints::new([4.0, 2.0, 2.0]).unwrap();
//! assert_eq!(cuts.as_slice(), &[2.0, 4.0]);
//! assert_eq!(cuts.locate(1.5), Some(0));
//! assert_eq!(cuts.locate(3.0), Some(1));
//! assert_eq!(cuts.locate(5.0), Some(2));
//! ```
//!
//! ## Testing independence
//!
//! ```
//! use wuyu_stats::chi_square::chi_square_independence;
//!
//! let observed = vec![vec![5, 5], vec![5, 5]];
//! let test = chi_square_independence(&observed, false).unwrap();
//! assert!(test.statistic.abs() < 1e-12);
//! assert!((test.p_value - 1.0).abs() < 1e-9);
//! ```

pub mod binning;
pub mod chi_square;
pub mod descriptive;
pub mod histogram;
pub mod percentiles;
