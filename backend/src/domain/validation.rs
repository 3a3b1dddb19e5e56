//! Field-level validation failures shared by student and request inputs.

use serde_json::json;

use super::Error;

/// A single input field that is missing or malformed.
///
/// Validation stops at the first failing field, so callers always receive
/// exactly one field name to act on.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// Required field absent or blank.
    #[error("{field} is required")]
    Missing { field: &'static str },
    /// Field present but not acceptable.
    #[error("{field} {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl ValidationError {
    /// Construct a [`ValidationError::Missing`].
    #[must_use]
    pub fn missing(field: &'static str) -> Self {
        Self::Missing { field }
    }

    /// Construct a [`ValidationError::Invalid`].
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }

    /// Name of the offending field.
    #[must_use]
    pub fn field(&self) -> &'static str {
        match self {
            Self::Missing { field } | Self::Invalid { field, .. } => field,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            Self::Missing { .. } => "missing_field",
            Self::Invalid { .. } => "invalid_field",
        }
    }
}

impl From<ValidationError> for Error {
    fn from(value: ValidationError) -> Self {
        Error::invalid_request(value.to_string()).with_details(json!({
            "field": value.field(),
            "code": value.code(),
        }))
    }
}

/// Trim `value` and reject it when absent or blank.
pub(crate) fn required_text(
    field: &'static str,
    value: Option<&str>,
) -> Result<String, ValidationError> {
    match value.map(str::trim) {
        Some(text) if !text.is_empty() => Ok(text.to_owned()),
        _ => Err(ValidationError::missing(field)),
    }
}

/// Trim `value`, treating blank text as absent.
pub(crate) fn optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_owned)
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::ErrorCode;
    use rstest::rstest;

    #[rstest]
    #[case(None)]
    #[case(Some(""))]
    #[case(Some("   "))]
    fn required_text_rejects_absent_or_blank(#[case] value: Option<&str>) {
        let err = required_text("reason", value).expect_err("must fail");
        assert_eq!(err, ValidationError::missing("reason"));
    }

    #[test]
    fn required_text_trims() {
        assert_eq!(
            required_text("reason", Some("  home visit ")).expect("valid"),
            "home visit"
        );
    }

    #[test]
    fn optional_text_drops_blank() {
        assert_eq!(optional_text(Some("  ")), None);
        assert_eq!(optional_text(Some(" a4 ")), Some("a4".to_owned()));
    }

    #[rstest]
    #[case(ValidationError::missing("pages"), "missing_field", "pages is required")]
    #[case(
        ValidationError::invalid("pages", "must be a positive integer"),
        "invalid_field",
        "pages must be a positive integer"
    )]
    fn converts_into_invalid_request(
        #[case] source: ValidationError,
        #[case] code: &str,
        #[case] message: &str,
    ) {
        let err: Error = source.into();
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
        assert_eq!(err.message(), message);
        assert_eq!(err.field(), Some("pages"));
        assert_eq!(
            err.details().and_then(|d| d.get("code")).and_then(|c| c.as_str()),
            Some(code)
        );
    }
}
