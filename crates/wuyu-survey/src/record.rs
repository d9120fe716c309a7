//! Raw survey responses and encoded values.
//!
//! A [`RawRecord`] maps raw question text to the respondent's answer. Blank or
//! whitespace-only answers are treated as absent. An [`EncodedRecord`] maps
//! canonical field names to typed [`Value`]s; a missing key means the value is
//! absent.

use std::{cmp::Ordering, collections::BTreeMap, fmt};

use serde::{Deserialize, Serialize};

/// One typed cell of the encoded dataset.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Number(f64),
    Text(String),
}

impl Value {
    /// Numeric interpretation of the value.
    ///
    /// Text is parsed after trimming; text that is not a finite number yields
    /// `None`.
    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            Value::Text(text) => text.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        }
    }

    #[must_use]
    pub fn is_number(&self) -> bool {
        matches!(self, Value::Number(_))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Number(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_owned())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => write!(f, "{n}"),
            Value::Text(text) => f.write_str(text),
        }
    }
}

// Numbers order before text; numbers compare with `total_cmp` so values can
// key ordered maps.
impl Ord for Value {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => a.total_cmp(b),
            (Value::Number(_), Value::Text(_)) => Ordering::Less,
            (Value::Text(_), Value::Number(_)) => Ordering::Greater,
            (Value::Text(a), Value::Text(b)) => a.cmp(b),
        }
    }
}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Value {}

/// One survey response keyed by raw question text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRecord {
    fields: BTreeMap<String, String>,
}

impl RawRecord {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, raw_name: impl Into<String>, answer: impl Into<String>) {
        self.fields.insert(raw_name.into(), answer.into());
    }

    /// Returns the answer to `raw_name`, or `None` when it is missing or blank.
    #[must_use]
    pub fn get(&self, raw_name: &str) -> Option<&str> {
        self.fields
            .get(raw_name)
            .map(String::as_str)
            .filter(|answer| !answer.trim().is_empty())
    }
}

impl<K, V> FromIterator<(K, V)> for RawRecord
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Raw responses together with the column headers of the input.
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub records: Vec<RawRecord>,
}

impl RawTable {
    /// Builds a table from positional rows.
    ///
    /// Cells beyond the header width are ignored; short rows leave the
    /// remaining questions absent.
    #[must_use]
    pub fn from_rows<R, C>(headers: Vec<String>, rows: R) -> Self
    where
        R: IntoIterator<Item = C>,
        C: IntoIterator<Item = String>,
    {
        let records = rows
            .into_iter()
            .map(|row| headers.iter().cloned().zip(row).collect())
            .collect();
        Self { headers, records }
    }

    #[must_use]
    pub fn has_column(&self, raw_name: &str) -> bool {
        self.headers.iter().any(|h| h == raw_name)
    }
}

/// One response after encoding, keyed by canonical field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EncodedRecord {
    values: BTreeMap<String, Value>,
}

impl EncodedRecord {
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.values.get(field)
    }

    pub fn set(&mut self, field: impl Into<String>, value: Value) {
        self.values.insert(field.into(), value);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<K> FromIterator<(K, Value)> for EncodedRecord
where
    K: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (K, Value)>>(iter: T) -> Self {
        Self {
            values: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_answers_are_absent() {
        let record = [("q1", "A.男"), ("q2", "   "), ("q3", "")]
            .into_iter()
            .collect::<RawRecord>();
        assert_eq!(record.get("q1"), Some("A.男"));
        assert_eq!(record.get("q2"), None);
        assert_eq!(record.get("q3"), None);
        assert_eq!(record.get("q4"), None);
    }

    #[test]
    fn test_from_rows() {
        let table = RawTable::from_rows(
            vec!["a".to_owned(), "b".to_owned()],
            vec![
                vec!["1".to_owned(), "2".to_owned()],
                vec!["3".to_owned()],
            ],
        );
        assert!(table.has_column("b"));
        assert_eq!(table.records.len(), 2);
        assert_eq!(table.records[0].get("b"), Some("2"));
        assert_eq!(table.records[1].get("b"), None);
    }

    #[test]
    fn test_value_number_coercion() {
        assert_eq!(Value::from(2.0).as_number(), Some(2.0));
        assert_eq!(Value::from(" -1.5 ").as_number(), Some(-1.5));
        assert_eq!(Value::from("abc").as_number(), None);
        assert_eq!(Value::from("NaN").as_number(), None);
    }

    #[test]
    fn test_value_ordering() {
        let mut values = vec![
            Value::from("b"),
            Value::from(3.0),
            Value::from("a"),
            Value::from(-1.0),
        ];
        values.sort();
        assert_eq!(
            values,
            vec![
                Value::from(-1.0),
                Value::from(3.0),
                Value::from("a"),
                Value::from("b"),
            ]
        );
    }

    #[test]
    fn test_value_display() {
        assert_eq!(Value::from(1.0).to_string(), "1");
        assert_eq!(Value::from(0.5).to_string(), "0.5");
        assert_eq!(Value::from("华东").to_string(), "华东");
    }
}
