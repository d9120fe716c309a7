//! Field catalog: declarative mapping from raw questionnaire columns to
//! canonical fields.
//!
//! The catalog is an ordered list of [`FieldSpec`]s. Each spec names a raw
//! column, the canonical name written to the encoded dataset, and the
//! [`FieldKind`] that decides how the raw answer is turned into a [`Value`].
//! Several specs may read the same raw column (e.g. an indicator and a
//! display relabel derived from one answer).
//!
//! A catalog is built from a serializable [`CatalogConfig`] and validated once
//! by [`FieldCatalog::new`]; it is immutable afterwards.
//!
//! # Examples
//!
//! ```
//! use wuyu_survey::catalog::{CatalogConfig, FieldCatalog, FieldKind, FieldSpec};
//!
//! let config = CatalogConfig {
//!     fields: vec![
//!         FieldSpec::new("Q1", "grade", FieldKind::ordinal()),
//!         FieldSpec::new("Q2", "score", FieldKind::SignedLikert).metric(),
//!     ],
//!     region: None,
//!     prefilter: vec![],
//! };
//! let catalog = FieldCatalog::new(config).unwrap();
//! assert_eq!(catalog.output_columns(), ["grade", "score"]);
//! ```
//!
//! [`Value`]: crate::record::Value

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::{error::ConfigError, record::RawRecord};

pub mod builtin;

/// Label written to an ordinal label column when the code is absent.
pub const UNKNOWN_LABEL: &str = "未知";

/// Default canonical name of the derived region column.
pub const DEFAULT_REGION_FIELD: &str = "Region";

/// How a raw answer is encoded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, derive_more::IsVariant)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldKind {
    /// Dense first-seen integer codes; optionally emits the decoded label into
    /// `label_field` (`未知` when absent).
    OrdinalCategorical {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        label_field: Option<String>,
    },
    /// 1 when the answer is present and non-blank, else 0.
    MultiSelectFlag,
    /// Numeric negation of the parsed answer; unparsable or absent become 0.
    SignedLikert,
    /// Raw text kept verbatim.
    Passthrough,
    /// Explicit label-to-score table; unlisted labels become absent.
    FixedScale { scale: Vec<(String, f64)> },
    /// 1 when the answer equals `equals`, else 0.
    Indicator { equals: String },
    /// Raw text mapped through a display table; unmatched text kept verbatim.
    Relabel { labels: Vec<(String, String)> },
}

impl FieldKind {
    /// Ordinal kind without a label column.
    #[must_use]
    pub fn ordinal() -> Self {
        FieldKind::OrdinalCategorical { label_field: None }
    }

    /// Ordinal kind that also emits the decoded label into `label_field`.
    #[must_use]
    pub fn ordinal_with_label(label_field: impl Into<String>) -> Self {
        FieldKind::OrdinalCategorical {
            label_field: Some(label_field.into()),
        }
    }

    #[must_use]
    pub fn fixed_scale<'a, I>(scale: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, f64)>,
    {
        FieldKind::FixedScale {
            scale: scale
                .into_iter()
                .map(|(label, score)| (label.to_owned(), score))
                .collect(),
        }
    }

    #[must_use]
    pub fn indicator(equals: impl Into<String>) -> Self {
        FieldKind::Indicator {
            equals: equals.into(),
        }
    }

    #[must_use]
    pub fn relabel<'a, I>(labels: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        FieldKind::Relabel {
            labels: labels
                .into_iter()
                .map(|(from, to)| (from.to_owned(), to.to_owned()))
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub raw_name: String,
    pub canonical_name: String,
    #[serde(flatten)]
    pub kind: FieldKind,
    /// Eligible for aggregation ("question column").
    #[serde(default)]
    pub metric: bool,
    /// Input without this raw column is rejected.
    #[serde(default)]
    pub required: bool,
}

impl FieldSpec {
    #[must_use]
    pub fn new(raw_name: impl Into<String>, canonical_name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            raw_name: raw_name.into(),
            canonical_name: canonical_name.into(),
            kind,
            metric: false,
            required: false,
        }
    }

    #[must_use]
    pub fn metric(mut self) -> Self {
        self.metric = true;
        self
    }

    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Canonical names this spec writes, in column order.
    pub fn output_names(&self) -> impl Iterator<Item = &str> {
        let label = match &self.kind {
            FieldKind::OrdinalCategorical { label_field } => label_field.as_deref(),
            _ => None,
        };
        std::iter::once(self.canonical_name.as_str()).chain(label)
    }
}

/// Derivation of the region column from two passthrough fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionSpec {
    /// Canonical name of the province field. Its value is replaced by the
    /// normalized province.
    pub province: String,
    /// Canonical name of the city field.
    pub city: String,
    #[serde(default = "default_region_field")]
    pub output: String,
}

fn default_region_field() -> String {
    DEFAULT_REGION_FIELD.to_owned()
}

/// Keeps only raw records whose `raw_name` answer equals `equals`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawFilter {
    pub raw_name: String,
    pub equals: String,
}

impl RawFilter {
    #[must_use]
    pub fn matches(&self, record: &RawRecord) -> bool {
        record.get(&self.raw_name) == Some(self.equals.as_str())
    }
}

/// Serializable catalog definition, validated by [`FieldCatalog::new`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogConfig {
    pub fields: Vec<FieldSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<RegionSpec>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub prefilter: Vec<RawFilter>,
}

/// Validated, immutable field catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldCatalog {
    config: CatalogConfig,
}

impl FieldCatalog {
    /// Validates `config`.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::EmptyCatalog`] when no field is declared.
    /// - [`ConfigError::DuplicateCanonicalName`] when two outputs (canonical
    ///   names, label columns or the region column) share a name.
    /// - [`ConfigError::UnknownRegionSource`] when the region spec refers to a
    ///   field the catalog does not declare.
    pub fn new(config: CatalogConfig) -> Result<Self, ConfigError> {
        if config.fields.is_empty() {
            return Err(ConfigError::EmptyCatalog);
        }

        let catalog = Self { config };
        let mut seen = BTreeSet::new();
        for name in catalog.output_columns() {
            if !seen.insert(name) {
                return Err(ConfigError::DuplicateCanonicalName {
                    name: name.to_owned(),
                });
            }
        }

        let config = &catalog.config;
        if let Some(region) = &config.region {
            for source in [&region.province, &region.city] {
                if !config.fields.iter().any(|f| &f.canonical_name == source) {
                    return Err(ConfigError::UnknownRegionSource {
                        name: source.clone(),
                    });
                }
            }
        }

        Ok(catalog)
    }

    #[must_use]
    pub fn fields(&self) -> &[FieldSpec] {
        &self.config.fields
    }

    #[must_use]
    pub fn field(&self, canonical_name: &str) -> Option<&FieldSpec> {
        self.config
            .fields
            .iter()
            .find(|f| f.canonical_name == canonical_name)
    }

    #[must_use]
    pub fn region(&self) -> Option<&RegionSpec> {
        self.config.region.as_ref()
    }

    #[must_use]
    pub fn prefilter(&self) -> &[RawFilter] {
        &self.config.prefilter
    }

    #[must_use]
    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }

    /// Returns a copy of this catalog that keeps every raw record.
    #[must_use]
    pub fn without_prefilter(&self) -> Self {
        let mut config = self.config.clone();
        config.prefilter.clear();
        Self { config }
    }

    /// Every column the encoder can write, in catalog order.
    #[must_use]
    pub fn output_columns(&self) -> Vec<&str> {
        let region = self.config.region.as_ref().map(|r| r.output.as_str());
        self.config
            .fields
            .iter()
            .flat_map(FieldSpec::output_names)
            .chain(region)
            .collect()
    }

    /// Checks that every raw column that cannot be defaulted is present.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingRawField`] for the first required field
    /// or pre-filter column absent from `headers`.
    pub fn check_schema(&self, headers: &[String]) -> Result<(), ConfigError> {
        let required = self
            .config
            .fields
            .iter()
            .filter(|f| f.required)
            .map(|f| f.raw_name.as_str())
            .chain(self.config.prefilter.iter().map(|f| f.raw_name.as_str()));
        for raw_name in required {
            if !headers.iter().any(|h| h == raw_name) {
                return Err(ConfigError::MissingRawField {
                    raw_name: raw_name.to_owned(),
                });
            }
        }
        Ok(())
    }
}
