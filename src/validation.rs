//! Field-level validation shared by the record forms.
//!
//! Forms are deserialized with every field optional, merged onto a draft
//! (defaults for new records, the stored record for updates) and the draft is
//! then validated into the type that gets written to the database. Every
//! problem found is collected into [FieldErrors] so the client sees all of
//! them at once.

use std::{collections::BTreeMap, fmt::Display};

use rust_decimal::Decimal;
use serde::Serialize;

use crate::Error;

/// The message for a required field that was not submitted.
pub const REQUIRED_MESSAGE: &str = "This field is required.";

const BLANK_MESSAGE: &str = "This field may not be blank.";

/// The number of digits kept after the decimal point for money and
/// quantities.
pub const DECIMAL_PLACES: u32 = 2;

/// The number of digits allowed before the decimal point for money and
/// quantities.
const WHOLE_DIGITS: usize = 8;

/// Validation messages keyed by field name.
///
/// Serializes as `{"field": ["message", ...]}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    /// Create an empty set of errors.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a set of errors with one message for one field.
    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    /// Record a problem with `field`.
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_owned())
            .or_default()
            .push(message.into());
    }

    /// Add all the messages from `other`.
    pub fn extend(&mut self, other: FieldErrors) {
        for (field, messages) in other.0 {
            self.0.entry(field).or_default().extend(messages);
        }
    }

    /// Whether there are any messages for `field`.
    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    /// The messages for `field`, if any.
    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    /// Whether no problems were recorded.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Return `value` if no problems were recorded, otherwise the errors.
    pub fn into_result<T>(self, value: T) -> Result<T, FieldErrors> {
        if self.is_empty() { Ok(value) } else { Err(self) }
    }
}

impl Display for FieldErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;

        for (field, messages) in &self.0 {
            for message in messages {
                if !first {
                    write!(f, "; ")?;
                }
                write!(f, "{field}: {message}")?;
                first = false;
            }
        }

        Ok(())
    }
}

impl From<FieldErrors> for Error {
    fn from(errors: FieldErrors) -> Self {
        Error::InvalidFields(errors)
    }
}

/// How a submitted form is merged onto an existing draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// Creating (POST) or replacing (PUT) a record: required fields must be
    /// submitted, omitted optional fields keep the draft's value.
    Full,
    /// Partially updating (PATCH) a record: every omitted field keeps the
    /// draft's value.
    Partial,
}

impl WriteMode {
    /// Pick the value of a required field from the submission or the draft.
    pub fn required<T>(self, submitted: Option<T>, draft: Option<T>) -> Option<T> {
        match self {
            WriteMode::Full => submitted,
            WriteMode::Partial => submitted.or(draft),
        }
    }
}

/// Validate a required text field, trimming surrounding whitespace.
///
/// Returns an empty string if the field is invalid.
pub fn required_text(
    errors: &mut FieldErrors,
    field: &str,
    value: Option<String>,
    max_length: usize,
) -> String {
    let Some(value) = value else {
        errors.add(field, REQUIRED_MESSAGE);
        return String::new();
    };

    let value = value.trim();

    if value.is_empty() {
        errors.add(field, BLANK_MESSAGE);
    } else {
        check_length(errors, field, value, max_length);
    }

    value.to_owned()
}

/// Validate a required text field that is kept exactly as submitted, e.g. a
/// password.
///
/// Returns an empty string if the field is invalid.
pub fn required_untrimmed_text(
    errors: &mut FieldErrors,
    field: &str,
    value: Option<String>,
) -> String {
    match value {
        Some(value) if !value.is_empty() => value,
        Some(_) => {
            errors.add(field, BLANK_MESSAGE);
            String::new()
        }
        None => {
            errors.add(field, REQUIRED_MESSAGE);
            String::new()
        }
    }
}

/// Validate an optional text field, trimming surrounding whitespace.
///
/// Blank strings are allowed.
pub fn optional_text(
    errors: &mut FieldErrors,
    field: &str,
    value: Option<String>,
    max_length: usize,
) -> Option<String> {
    value.map(|value| {
        let value = value.trim();
        check_length(errors, field, value, max_length);
        value.to_owned()
    })
}

fn check_length(errors: &mut FieldErrors, field: &str, value: &str, max_length: usize) {
    if value.chars().count() > max_length {
        errors.add(
            field,
            format!("Ensure this field has no more than {max_length} characters."),
        );
    }
}

/// Validate a required decimal field.
///
/// Returns zero if the field is invalid.
pub fn required_decimal(errors: &mut FieldErrors, field: &str, value: Option<Decimal>) -> Decimal {
    match value {
        Some(value) => check_decimal(errors, field, value),
        None => {
            errors.add(field, REQUIRED_MESSAGE);
            Decimal::ZERO
        }
    }
}

/// Validate an optional decimal field.
pub fn optional_decimal(
    errors: &mut FieldErrors,
    field: &str,
    value: Option<Decimal>,
) -> Option<Decimal> {
    value.map(|value| check_decimal(errors, field, value))
}

/// Check that `value` fits in a decimal column with [DECIMAL_PLACES] places
/// and at most eight digits before the decimal point, and return it with
/// exactly [DECIMAL_PLACES] places.
///
/// Trailing zeros do not count towards the decimal places.
pub fn check_decimal(errors: &mut FieldErrors, field: &str, value: Decimal) -> Decimal {
    let normalized = value.normalize();

    if normalized.scale() > DECIMAL_PLACES {
        errors.add(
            field,
            format!("Ensure that there are no more than {DECIMAL_PLACES} decimal places."),
        );
    } else if whole_digits(normalized) > WHOLE_DIGITS {
        errors.add(
            field,
            format!("Ensure that there are no more than {WHOLE_DIGITS} digits before the decimal point."),
        );
    }

    let mut rescaled = normalized;
    rescaled.rescale(DECIMAL_PLACES);
    rescaled
}

fn whole_digits(value: Decimal) -> usize {
    let whole = value.trunc().abs();

    if whole.is_zero() {
        0
    } else {
        whole.to_string().len()
    }
}
