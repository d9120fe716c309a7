//! Encoded dataset and filtered views.
//!
//! A [`Dataset`] is built once by the [`Encoder`](crate::encoder::Encoder) and
//! never mutated. Filtering produces a [`DatasetView`], a list of record
//! indices borrowing the dataset.

use indexmap::IndexMap;

use crate::{
    encoder::CoercionReport,
    encoding::EncodingTable,
    error::AnalysisError,
    record::{EncodedRecord, Value},
};

#[derive(Debug, Clone)]
pub struct Dataset {
    columns: Vec<String>,
    records: Vec<EncodedRecord>,
    encodings: IndexMap<String, EncodingTable>,
    metric_fields: Vec<String>,
    coercion: CoercionReport,
}

impl Dataset {
    #[must_use]
    pub fn new(
        columns: Vec<String>,
        records: Vec<EncodedRecord>,
        encodings: IndexMap<String, EncodingTable>,
        metric_fields: Vec<String>,
        coercion: CoercionReport,
    ) -> Self {
        Self {
            columns,
            records,
            encodings,
            metric_fields,
            coercion,
        }
    }

    /// Output columns in catalog order.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    #[must_use]
    pub fn has_column(&self, field: &str) -> bool {
        self.columns.iter().any(|c| c == field)
    }

    #[must_use]
    pub fn records(&self) -> &[EncodedRecord] {
        &self.records
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Encoding table of an ordinal field.
    #[must_use]
    pub fn encoding(&self, field: &str) -> Option<&EncodingTable> {
        self.encodings.get(field)
    }

    /// Every encoding table, in catalog order.
    #[must_use]
    pub fn encodings(&self) -> &IndexMap<String, EncodingTable> {
        &self.encodings
    }

    /// Fields eligible for aggregation, sorted and unique.
    #[must_use]
    pub fn metric_fields(&self) -> &[String] {
        &self.metric_fields
    }

    #[must_use]
    pub fn coercion(&self) -> &CoercionReport {
        &self.coercion
    }

    /// View over every record.
    #[must_use]
    pub fn view(&self) -> DatasetView<'_> {
        DatasetView {
            dataset: self,
            indices: (0..self.records.len()).collect(),
        }
    }

    /// Translates user-facing text into the value stored in `field`.
    ///
    /// Labels of encoded fields become their codes. Otherwise the text is
    /// taken as a number when the column holds numbers, and as text when it
    /// does not.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::UnknownField`] when `field` is not a column.
    pub fn resolve_value(&self, field: &str, text: &str) -> Result<Value, AnalysisError> {
        if !self.has_column(field) {
            return Err(AnalysisError::unknown_field(field));
        }
        if let Some(code) = self.encoding(field).and_then(|table| table.forward(text)) {
            return Ok(Value::Number(f64::from(code)));
        }
        let numeric_column = self
            .records
            .iter()
            .find_map(|r| r.get(field))
            .is_some_and(Value::is_number);
        match text.trim().parse::<f64>() {
            Ok(number) if numeric_column => Ok(Value::Number(number)),
            _ => Ok(Value::from(text)),
        }
    }
}

/// Keeps records whose `field` value is one of `allowed`.
///
/// An empty `allowed` list keeps every record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    pub field: String,
    pub allowed: Vec<Value>,
}

impl Filter {
    #[must_use]
    pub fn new<I, V>(field: impl Into<String>, allowed: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self {
            field: field.into(),
            allowed: allowed.into_iter().map(Into::into).collect(),
        }
    }

    #[must_use]
    pub fn matches(&self, record: &EncodedRecord) -> bool {
        self.allowed.is_empty()
            || record
                .get(&self.field)
                .is_some_and(|value| self.allowed.contains(value))
    }
}

/// Subset of a dataset's records, in dataset order.
#[derive(Debug, Clone)]
pub struct DatasetView<'a> {
    dataset: &'a Dataset,
    indices: Vec<usize>,
}

impl<'a> DatasetView<'a> {
    #[must_use]
    pub fn dataset(&self) -> &'a Dataset {
        self.dataset
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn records(&self) -> impl Iterator<Item = &'a EncodedRecord> + '_ {
        self.indices.iter().map(|&idx| &self.dataset.records[idx])
    }

    /// Narrows the view to records matching `filter`.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::UnknownField`] when the filter field is not a
    /// column of the dataset.
    pub fn filter(&self, filter: &Filter) -> Result<Self, AnalysisError> {
        self.ensure_column(&filter.field)?;
        let indices = self
            .indices
            .iter()
            .copied()
            .filter(|&idx| filter.matches(&self.dataset.records[idx]))
            .collect();
        Ok(Self {
            dataset: self.dataset,
            indices,
        })
    }

    /// Applies every filter in turn.
    ///
    /// # Errors
    ///
    /// Returns the first [`AnalysisError::UnknownField`] encountered.
    pub fn filter_all<'f, I>(&self, filters: I) -> Result<Self, AnalysisError>
    where
        I: IntoIterator<Item = &'f Filter>,
    {
        filters
            .into_iter()
            .try_fold(self.clone(), |view, filter| view.filter(filter))
    }

    pub(crate) fn ensure_column(&self, field: &str) -> Result<(), AnalysisError> {
        if self.dataset.has_column(field) {
            Ok(())
        } else {
            Err(AnalysisError::unknown_field(field))
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Small dataset: `group` text, `score` numbers, `grade` ordinal codes.
    pub(crate) fn sample_dataset() -> Dataset {
        let mut grades = crate::encoding::EncodingTableBuilder::new();
        let rows = [
            ("华东", Some(3.0), "A.大一"),
            ("华南", Some(1.0), "B.大二"),
            ("华东", Some(5.0), "B.大二"),
            ("华北", None, "A.大一"),
            ("华南", Some(2.0), "C.大三"),
        ];
        let records = rows
            .iter()
            .map(|&(group, score, grade)| {
                let mut record = EncodedRecord::default();
                record.set("group", Value::from(group));
                if let Some(score) = score {
                    record.set("score", Value::from(score));
                }
                record.set("grade", Value::from(f64::from(grades.observe(grade))));
                record
            })
            .collect();
        let mut encodings = IndexMap::new();
        encodings.insert("grade".to_owned(), grades.build());
        Dataset::new(
            ["group", "score", "grade"].map(String::from).to_vec(),
            records,
            encodings,
            vec!["score".to_owned()],
            CoercionReport::default(),
        )
    }

    #[test]
    fn test_view_covers_all_records() {
        let dataset = sample_dataset();
        let view = dataset.view();
        assert_eq!(view.len(), 5);
        assert_eq!(view.records().count(), 5);
    }

    #[test]
    fn test_filter_does_not_mutate_dataset() {
        let dataset = sample_dataset();
        let view = dataset.view();
        let east = view.filter(&Filter::new("group", ["华东"])).unwrap();
        assert_eq!(east.len(), 2);
        assert_eq!(view.len(), 5);
        assert_eq!(dataset.len(), 5);
    }

    #[test]
    fn test_filter_conjunction() {
        let dataset = sample_dataset();
        let filters = [
            Filter::new("group", ["华东", "华南"]),
            Filter::new("grade", [2.0]),
        ];
        let view = dataset.view().filter_all(&filters).unwrap();
        assert_eq!(view.len(), 2);
    }

    #[test]
    fn test_empty_filter_keeps_everything() {
        let dataset = sample_dataset();
        let view = dataset
            .view()
            .filter(&Filter::new("group", Vec::<Value>::new()))
            .unwrap();
        assert_eq!(view.len(), 5);
    }

    #[test]
    fn test_absent_values_never_match() {
        let dataset = sample_dataset();
        let view = dataset.view().filter(&Filter::new("score", [3.0, 5.0])).unwrap();
        assert_eq!(view.len(), 2);
    }

    #[test]
    fn test_unknown_filter_field() {
        let dataset = sample_dataset();
        assert_eq!(
            dataset.view().filter(&Filter::new("gender", ["男"])).unwrap_err(),
            AnalysisError::UnknownField {
                field: "gender".to_owned()
            }
        );
    }

    #[test]
    fn test_resolve_value() {
        let dataset = sample_dataset();
        assert_eq!(dataset.resolve_value("grade", "B.大二").unwrap(), Value::from(2.0));
        assert_eq!(dataset.resolve_value("grade", "3").unwrap(), Value::from(3.0));
        assert_eq!(dataset.resolve_value("group", "华东").unwrap(), Value::from("华东"));
        assert_eq!(dataset.resolve_value("score", "5").unwrap(), Value::from(5.0));
        assert!(dataset.resolve_value("nope", "1").is_err());
    }
}
