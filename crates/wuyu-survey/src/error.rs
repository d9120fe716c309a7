//! Error taxonomy of the survey pipeline
//!
//! Failures fall into four kinds ([`ErrorKind`]):
//!
//! - **Configuration**: the field catalog is inconsistent or the input lacks a
//!   column that cannot be defaulted ([`ConfigError`]). Fatal at startup.
//! - **Coercion warning**: a declared numeric field holds values that could not
//!   be parsed. Reported as a [`Notice`], never fatal.
//! - **Insufficient data**: an empty view, a zero-variance sample or a
//!   contingency table with an empty row/column. Reported as a [`Notice`]; the
//!   dependent computation is skipped.
//! - **Invalid parameter**: rejected before execution ([`AnalysisError`]).

use wuyu_stats::binning::CutPointsError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum ErrorKind {
    #[display("configuration error")]
    Configuration,
    #[display("coercion warning")]
    CoercionWarning,
    #[display("insufficient data")]
    InsufficientData,
    #[display("invalid parameter")]
    InvalidParameter,
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum ConfigError {
    #[display("field catalog declares no fields")]
    EmptyCatalog,
    #[display("canonical name '{name}' is declared more than once")]
    DuplicateCanonicalName { name: String },
    #[display("region source '{name}' is not a field of the catalog")]
    UnknownRegionSource { name: String },
    #[display("required raw field '{raw_name}' is missing from the input")]
    MissingRawField { raw_name: String },
}

impl ConfigError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::Configuration
    }
}

/// Per-operation failure, rejected before any computation runs.
#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum AnalysisError {
    #[display("unknown field '{field}'")]
    UnknownField { field: String },
    #[display("invalid cut points: {_0}")]
    CutPoints(CutPointsError),
    #[display("field '{field}' holds no numeric values")]
    NonNumericMetric { field: String },
    #[display("{message}")]
    InvalidParameter { message: String },
}

impl AnalysisError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::InvalidParameter
    }

    pub(crate) fn unknown_field(field: &str) -> Self {
        Self::UnknownField {
            field: field.to_owned(),
        }
    }
}

impl From<CutPointsError> for AnalysisError {
    fn from(err: CutPointsError) -> Self {
        Self::CutPoints(err)
    }
}

/// Non-fatal condition attached to an otherwise successful result.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::IsVariant)]
pub enum Notice {
    #[display("insufficient data: {reason}")]
    InsufficientData { reason: String },
    #[display("field '{field}': {message}")]
    Coercion { field: String, message: String },
}

impl Notice {
    pub(crate) fn insufficient(reason: impl Into<String>) -> Self {
        Self::InsufficientData {
            reason: reason.into(),
        }
    }

    pub(crate) fn coercion(field: &str, message: impl Into<String>) -> Self {
        Self::Coercion {
            field: field.to_owned(),
            message: message.into(),
        }
    }

    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Notice::InsufficientData { .. } => ErrorKind::InsufficientData,
            Notice::Coercion { .. } => ErrorKind::CoercionWarning,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds() {
        assert_eq!(
            ConfigError::EmptyCatalog.kind(),
            ErrorKind::Configuration
        );
        assert_eq!(
            AnalysisError::from(CutPointsError::Empty).kind(),
            ErrorKind::InvalidParameter
        );
        assert_eq!(
            Notice::insufficient("empty view").kind(),
            ErrorKind::InsufficientData
        );
        assert_eq!(
            Notice::coercion("awkward_score", "2 values defaulted").kind(),
            ErrorKind::CoercionWarning
        );
    }

    #[test]
    fn test_messages() {
        let err = AnalysisError::from(CutPointsError::Empty);
        assert_eq!(
            err.to_string(),
            "invalid cut points: at least one cut point is required"
        );
        let err = ConfigError::DuplicateCanonicalName {
            name: "gender".to_owned(),
        };
        assert_eq!(
            err.to_string(),
            "canonical name 'gender' is declared more than once"
        );
        assert_eq!(
            Notice::coercion("identity", "1 unmapped label").to_string(),
            "field 'identity': 1 unmapped label"
        );
    }
}
