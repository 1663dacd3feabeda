//! Error types raised by logic actions.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use indexmap::IndexMap;
use regex::Regex;
use std::fmt;
use std::sync::OnceLock;
use thiserror::Error;

/// Field name to error message, in schema order.
pub type ErrorDict = IndexMap<String, String>;

pub type ActionResult<T> = Result<T, ActionError>;

/// Errors surfaced by create/show/update actions.
///
/// `Action` is also the variant integrity violations from the store are
/// translated into.
#[derive(Debug, Error)]
pub enum ActionError {
    #[error("{0}")]
    Action(String),

    /// A record looked up by id or uuid does not exist.
    #[error("{0}")]
    NotFound(String),

    /// At most one matching record was expected but more were found.
    #[error("{0}")]
    MultipleResults(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Database error: {0}")]
    Database(DieselError),
}

impl ActionError {
    pub fn not_found(entity: &str, reference: impl fmt::Display) -> Self {
        ActionError::NotFound(format!("{} not found: {}", entity, reference))
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, ActionError::Validation(_))
    }
}

impl From<DieselError> for ActionError {
    fn from(err: DieselError) -> Self {
        match err {
            DieselError::DatabaseError(kind, info) => match kind {
                DatabaseErrorKind::UniqueViolation
                | DatabaseErrorKind::ForeignKeyViolation
                | DatabaseErrorKind::NotNullViolation
                | DatabaseErrorKind::CheckViolation => {
                    tracing::warn!("Integrity violation ({:?}): {}", kind, info.message());
                    ActionError::Action(info.message().to_string())
                }
                _ => ActionError::Database(DieselError::DatabaseError(kind, info)),
            },
            DieselError::NotFound => ActionError::NotFound("Record not found".to_string()),
            other => ActionError::Database(other),
        }
    }
}

/// Failed validation of an input data dictionary.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    pub error_dict: ErrorDict,
    error_summary: Option<ErrorDict>,
    extra_msg: Option<String>,
}

impl ValidationError {
    pub fn new(error_dict: ErrorDict) -> Self {
        Self {
            error_dict,
            error_summary: None,
            extra_msg: None,
        }
    }

    /// A validation error not tied to a particular field.
    pub fn message(message: impl Into<String>) -> Self {
        let mut error_dict = ErrorDict::new();
        error_dict.insert("message".to_string(), message.into());
        Self::new(error_dict)
    }

    /// A validation error for a single field.
    pub fn field(name: impl Into<String>, message: impl Into<String>) -> Self {
        let mut error_dict = ErrorDict::new();
        error_dict.insert(name.into(), message.into());
        Self::new(error_dict)
    }

    pub fn with_summary(mut self, summary: ErrorDict) -> Self {
        self.error_summary = Some(summary);
        self
    }

    pub fn with_extra_msg(mut self, extra_msg: impl Into<String>) -> Self {
        self.extra_msg = Some(extra_msg.into());
        self
    }

    /// Human friendly error summary keyed by prettified field names. Generated
    /// from the error dictionary unless one was supplied.
    pub fn error_summary(&self) -> ErrorDict {
        if let Some(summary) = &self.error_summary {
            return summary.clone();
        }
        self.error_dict
            .iter()
            .map(|(field, error)| (prettify(field), error.clone()))
            .collect()
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let errors = self
            .error_dict
            .iter()
            .map(|(k, v)| format!("{}: {}", k, v))
            .collect::<Vec<_>>()
            .join(", ");
        match &self.extra_msg {
            Some(msg) if !msg.is_empty() => write!(f, "{} - {{{}}}", msg, errors),
            _ => write!(f, "{{{}}}", errors),
        }
    }
}

impl std::error::Error for ValidationError {}

/// Turn a field name into a label: `website_url` becomes `Website URL`.
pub fn prettify(field_name: &str) -> String {
    static URL_WORD: OnceLock<Regex> = OnceLock::new();
    let url_word = URL_WORD.get_or_init(|| Regex::new(r"\b[Uu]rl\b").expect("valid regex"));

    let spaced = field_name.replace('_', " ");
    let mut chars = spaced.chars();
    let capitalized = match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
        None => String::new(),
    };
    url_word.replace_all(&capitalized, "URL").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prettify_field_names() {
        assert_eq!(prettify("postal_code"), "Postal code");
        assert_eq!(prettify("website_url"), "Website URL");
        assert_eq!(prettify("url"), "URL");
        assert_eq!(prettify("curly_name"), "Curly name");
    }

    #[test]
    fn test_error_summary_generated_from_dict() {
        let err = ValidationError::field("website_url", "Must be a URL");
        let summary = err.error_summary();
        assert_eq!(summary.get("Website URL"), Some(&"Must be a URL".to_string()));
    }

    #[test]
    fn test_supplied_summary_wins() {
        let mut summary = ErrorDict::new();
        summary.insert("Code".to_string(), "Taken".to_string());
        let err = ValidationError::field("code", "Required").with_summary(summary.clone());
        assert_eq!(err.error_summary(), summary);
    }

    #[test]
    fn test_display_includes_extra_message() {
        let err = ValidationError::field("name", "Required").with_extra_msg("Bad input");
        assert_eq!(err.to_string(), "Bad input - {name: Required}");

        let err = ValidationError::field("name", "Required");
        assert_eq!(err.to_string(), "{name: Required}");
    }

    #[test]
    fn test_not_found_message() {
        let err = ActionError::not_found("Country", 1);
        assert!(matches!(err, ActionError::NotFound(_)));
        assert_eq!(err.to_string(), "Country not found: 1");
    }
}
