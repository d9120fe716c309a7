//! Raw table to [`Dataset`] conversion.
//!
//! The encoder makes a single ordered pass over the raw records:
//!
//! 1. Records failing the catalog pre-filter are dropped.
//! 2. Every spec whose raw column exists in the input is encoded into its
//!    canonical name; raw columns without a spec are dropped. Specs whose raw
//!    column is missing (and not required) produce no column.
//! 3. Ordinal codes are assigned in first-seen order, so re-encoding the same
//!    input yields identical [`EncodingTable`]s.
//! 4. The region column is derived when both source columns are present.
//!
//! Values that cannot be parsed never abort the pass; they are defaulted or
//! left absent and counted in the [`CoercionReport`].
//!
//! [`EncodingTable`]: crate::encoding::EncodingTable

use std::collections::BTreeSet;

use indexmap::IndexMap;
use serde::Serialize;
use tracing::{debug, warn};

use crate::{
    catalog::{FieldCatalog, FieldKind, FieldSpec, UNKNOWN_LABEL},
    dataset::Dataset,
    encoding::EncodingTableBuilder,
    error::{ConfigError, Notice},
    record::{EncodedRecord, RawRecord, RawTable, Value},
    region::{OTHER_REGION, RegionClassifier, region_of},
};

/// Per-field counts of values the encoder had to default or drop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FieldCoercion {
    /// Absent answers replaced by the kind's default.
    pub absent_defaulted: usize,
    /// Unparsable answers replaced by the kind's default.
    pub unparsable_defaulted: usize,
    /// Labels outside a fixed scale, left absent.
    pub unmapped: usize,
}

impl FieldCoercion {
    /// Returns `true` when some answer was unparsable or unmapped.
    #[must_use]
    pub fn has_warnings(&self) -> bool {
        self.unparsable_defaulted > 0 || self.unmapped > 0
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CoercionReport {
    fields: IndexMap<String, FieldCoercion>,
}

impl CoercionReport {
    /// Counts for `field`; all zero when nothing was coerced.
    #[must_use]
    pub fn get(&self, field: &str) -> FieldCoercion {
        self.fields.get(field).copied().unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldCoercion)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Coercion warnings, one per affected field.
    #[must_use]
    pub fn notices(&self) -> Vec<Notice> {
        let mut notices = vec![];
        for (field, counts) in &self.fields {
            if counts.unparsable_defaulted > 0 {
                notices.push(Notice::coercion(
                    field,
                    format!("{} unparsable values defaulted", counts.unparsable_defaulted),
                ));
            }
            if counts.unmapped > 0 {
                notices.push(Notice::coercion(
                    field,
                    format!("{} labels outside the scale left absent", counts.unmapped),
                ));
            }
        }
        notices
    }

    fn entry(&mut self, field: &str) -> &mut FieldCoercion {
        if !self.fields.contains_key(field) {
            self.fields.insert(field.to_owned(), FieldCoercion::default());
        }
        &mut self.fields[field]
    }
}

/// Encodes raw tables with a validated catalog.
#[derive(Debug, Clone, Copy)]
pub struct Encoder<'a> {
    catalog: &'a FieldCatalog,
    classifier: RegionClassifier,
}

impl<'a> Encoder<'a> {
    #[must_use]
    pub fn new(catalog: &'a FieldCatalog) -> Self {
        Self {
            catalog,
            classifier: RegionClassifier::new(),
        }
    }

    /// Encodes `table` into a dataset.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingRawField`] when a required raw column or
    /// a pre-filter column is absent from the table headers.
    pub fn encode(&self, table: &RawTable) -> Result<Dataset, ConfigError> {
        self.catalog.check_schema(&table.headers)?;

        let mut pass = EncodingPass::new(self.catalog, table, self.classifier);

        let mut kept = 0;
        let records = table
            .records
            .iter()
            .filter(|raw| self.catalog.prefilter().iter().all(|f| f.matches(raw)))
            .inspect(|_| kept += 1)
            .map(|raw| pass.encode_record(raw))
            .collect::<Vec<_>>();
        debug!(
            total = table.records.len(),
            kept,
            "encoded survey responses"
        );

        for (field, counts) in pass.coercion.iter() {
            if counts.has_warnings() {
                warn!(
                    field,
                    unparsable = counts.unparsable_defaulted,
                    unmapped = counts.unmapped,
                    "values could not be coerced"
                );
            }
        }

        let columns = pass.columns();
        let metric_fields = pass
            .fields
            .iter()
            .filter(|spec| spec.metric)
            .map(|spec| spec.canonical_name.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let encodings = pass
            .builders
            .into_iter()
            .map(|(field, builder)| (field, builder.build()))
            .collect();

        Ok(Dataset::new(
            columns,
            records,
            encodings,
            metric_fields,
            pass.coercion,
        ))
    }
}

struct ActiveRegion<'c> {
    province_raw: &'c str,
    city_raw: &'c str,
    province_field: &'c str,
    output: &'c str,
}

struct EncodingPass<'c> {
    fields: Vec<&'c FieldSpec>,
    region: Option<ActiveRegion<'c>>,
    builders: IndexMap<String, EncodingTableBuilder>,
    coercion: CoercionReport,
    classifier: RegionClassifier,
}

impl<'c> EncodingPass<'c> {
    fn new(catalog: &'c FieldCatalog, table: &RawTable, classifier: RegionClassifier) -> Self {
        let mut fields = vec![];
        for spec in catalog.fields() {
            if table.has_column(&spec.raw_name) {
                fields.push(spec);
            } else {
                debug!(field = %spec.canonical_name, "raw column missing, field skipped");
            }
        }

        let builders = fields
            .iter()
            .filter(|spec| spec.kind.is_ordinal_categorical())
            .map(|spec| (spec.canonical_name.clone(), EncodingTableBuilder::new()))
            .collect();

        let find_active = |name: &str| fields.iter().copied().find(|f| f.canonical_name == name);
        let region = catalog.region().and_then(|region| {
            let province = find_active(&region.province)?;
            let city = find_active(&region.city)?;
            Some(ActiveRegion {
                province_raw: &province.raw_name,
                city_raw: &city.raw_name,
                province_field: &province.canonical_name,
                output: &region.output,
            })
        });

        Self {
            fields,
            region,
            builders,
            coercion: CoercionReport::default(),
            classifier,
        }
    }

    fn columns(&self) -> Vec<String> {
        self.fields
            .iter()
            .flat_map(|spec| spec.output_names())
            .chain(self.region.as_ref().map(|r| r.output))
            .map(str::to_owned)
            .collect()
    }

    fn encode_record(&mut self, raw: &RawRecord) -> EncodedRecord {
        let mut out = EncodedRecord::default();
        for spec in self.fields.clone() {
            self.encode_field(spec, raw, &mut out);
        }

        if let Some(region) = &self.region {
            let raw_province = raw.get(region.province_raw);
            let province = self
                .classifier
                .normalize_province(raw_province, raw.get(region.city_raw));
            let label = region_of(&province).unwrap_or(OTHER_REGION);
            // a province answered as a bare suffix still becomes its stripped form
            if raw_province.is_some() || !province.is_empty() {
                out.set(region.province_field, Value::Text(province));
            }
            out.set(region.output, Value::from(label));
        }
        out
    }

    fn encode_field(&mut self, spec: &FieldSpec, raw: &RawRecord, out: &mut EncodedRecord) {
        let answer = raw.get(&spec.raw_name);
        let name = spec.canonical_name.as_str();
        match &spec.kind {
            FieldKind::OrdinalCategorical { label_field } => {
                if let Some(label) = answer {
                    let code = self
                        .builders
                        .get_mut(name)
                        .map_or(0, |builder| builder.observe(label));
                    out.set(name, Value::Number(f64::from(code)));
                }
                if let Some(label_field) = label_field {
                    out.set(label_field.as_str(), Value::from(answer.unwrap_or(UNKNOWN_LABEL)));
                }
            }
            FieldKind::MultiSelectFlag => {
                out.set(name, flag(answer.is_some()));
            }
            FieldKind::SignedLikert => {
                let magnitude = match answer {
                    None => {
                        self.coercion.entry(name).absent_defaulted += 1;
                        0.0
                    }
                    Some(text) => match text.trim().parse::<f64>() {
                        Ok(value) if value.is_finite() => value,
                        _ => {
                            self.coercion.entry(name).unparsable_defaulted += 1;
                            0.0
                        }
                    },
                };
                // subtracting from +0.0 never yields -0.0
                out.set(name, Value::Number(0.0 - magnitude));
            }
            FieldKind::Passthrough => {
                if let Some(text) = answer {
                    out.set(name, Value::from(text));
                }
            }
            FieldKind::FixedScale { scale } => {
                if let Some(text) = answer {
                    match scale.iter().find(|(label, _)| label == text) {
                        Some((_, score)) => out.set(name, Value::Number(*score)),
                        None => self.coercion.entry(name).unmapped += 1,
                    }
                }
            }
            FieldKind::Indicator { equals } => {
                out.set(name, flag(answer == Some(equals.as_str())));
            }
            FieldKind::Relabel { labels } => {
                if let Some(text) = answer {
                    let display = labels
                        .iter()
                        .find(|(from, _)| from == text)
                        .map_or(text, |(_, to)| to.as_str());
                    out.set(name, Value::from(display));
                }
            }
        }
    }
}

fn flag(on: bool) -> Value {
    Value::Number(if on { 1.0 } else { 0.0 })
}
