//! JSON helpers shared by the API handlers and record types.

use axum::{
    Json,
    extract::{FromRequest, Request, rejection::JsonRejection},
};
use serde::{Deserialize, Deserializer, de::DeserializeOwned};
use serde_json::{Map, Value};

use crate::{Error, validation::FieldErrors};

/// The key for problems with a request body that do not belong to one field.
pub const NON_FIELD_ERRORS: &str = "non_field_errors";

/// The message for a decimal field that was given something other than a number.
pub const INVALID_NUMBER_MESSAGE: &str = "A valid number is required.";

/// The message for a text field that was given something other than a string.
pub const INVALID_STRING_MESSAGE: &str = "Not a valid string.";

/// The message for a date field that was not given a "YYYY-MM-DD" string.
pub const INVALID_DATE_MESSAGE: &str =
    "Date has wrong format. Use one of these formats instead: YYYY-MM-DD.";

/// A JSON request body extractor.
///
/// Bodies that are not JSON are reported as [Error::MalformedBody]. Fields
/// with a value of the wrong type are reported as [Error::InvalidFields],
/// one message per field.
#[derive(Debug)]
pub struct ApiJson<T>(pub T);

impl<T, S> FromRequest<S> for ApiJson<T>
where
    T: JsonForm,
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request(request: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(body) = Json::<Value>::from_request(request, state).await?;

        parse_form(body).map(ApiJson)
    }
}

impl From<JsonRejection> for Error {
    fn from(rejection: JsonRejection) -> Self {
        Error::MalformedBody(rejection.body_text())
    }
}

/// A request body made up of named fields.
pub trait JsonForm: DeserializeOwned {
    /// The message for when `value` cannot be used for `field`.
    fn invalid_value_message(field: &str, value: &Value) -> String;
}

/// Deserialize `body` into the form `T`.
///
/// A single field of the wrong type fails the whole body, so on failure each
/// submitted field is tried on its own to find the ones at fault.
///
/// # Errors
///
/// Returns [Error::InvalidFields] naming the fields that could not be used,
/// or [Error::MalformedBody] if no single field is to blame.
pub fn parse_form<T: JsonForm>(body: Value) -> Result<T, Error> {
    let fields = match body {
        Value::Object(fields) => fields,
        other => {
            return Err(FieldErrors::single(
                NON_FIELD_ERRORS,
                format!(
                    "Invalid data. Expected a dictionary, but got {}.",
                    type_name(&other)
                ),
            )
            .into());
        }
    };

    let error = match serde_json::from_value::<T>(Value::Object(fields.clone())) {
        Ok(form) => return Ok(form),
        Err(error) => error,
    };

    let mut errors = FieldErrors::new();

    for (field, value) in &fields {
        let only_field = Map::from_iter([(field.clone(), value.clone())]);

        if serde_json::from_value::<T>(Value::Object(only_field)).is_err() {
            errors.add(field, T::invalid_value_message(field, value));
        }
    }

    if errors.is_empty() {
        Err(Error::MalformedBody(error.to_string()))
    } else {
        Err(errors.into())
    }
}

/// The message for a reference to another record that was not given an ID.
pub fn invalid_reference_message(value: &Value) -> String {
    format!(
        "Incorrect type. Expected pk value, received {}.",
        type_name(value)
    )
}

/// The message for a choice field that was given something other than a string.
pub fn invalid_choice_message(value: &Value) -> String {
    format!("\"{value}\" is not a valid choice.")
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(number) if number.is_f64() => "float",
        Value::Number(_) => "int",
        Value::String(_) => "str",
        Value::Array(_) => "list",
        Value::Object(_) => "dict",
    }
}

/// Deserialize a field that may be absent, `null`, or set.
///
/// Use with `#[serde(default, deserialize_with = "deserialize_some")]` on an
/// `Option<Option<T>>` so that an absent key is `None` and an explicit `null`
/// is `Some(None)`.
pub fn deserialize_some<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}

pub mod date_format {
    //! Serializes a [time::Date] as "YYYY-MM-DD".
    //!
    //! Without the `serde-human-readable` feature, `time` serializes dates as
    //! a (year, ordinal) tuple which clients should not have to deal with.
    use serde::{Deserialize, Deserializer, Serializer};
    use time::{Date, format_description::BorrowedFormatItem, macros::format_description};

    const DATE_FORMAT: &[BorrowedFormatItem] = format_description!("[year]-[month]-[day]");

    pub fn serialize<S>(date: &Date, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let formatted = date
            .format(DATE_FORMAT)
            .map_err(serde::ser::Error::custom)?;
        serializer.serialize_str(&formatted)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Date, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Date::parse(&s, DATE_FORMAT).map_err(serde::de::Error::custom)
    }

    /// Deserialize an optional date, treating `null` the same as an absent key.
    pub fn deserialize_option<'de, D>(deserializer: D) -> Result<Option<Date>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<String>::deserialize(deserializer)? {
            Some(s) => Date::parse(&s, DATE_FORMAT)
                .map(Some)
                .map_err(serde::de::Error::custom),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod parse_form_tests {
    use rust_decimal::Decimal;
    use serde::Deserialize;
    use serde_json::{Value, json};

    use crate::Error;

    use super::{INVALID_NUMBER_MESSAGE, INVALID_STRING_MESSAGE, JsonForm, parse_form};

    #[derive(Debug, Deserialize)]
    struct PriceForm {
        label: Option<String>,
        price: Option<Decimal>,
    }

    impl JsonForm for PriceForm {
        fn invalid_value_message(field: &str, _: &Value) -> String {
            match field {
                "price" => INVALID_NUMBER_MESSAGE,
                _ => INVALID_STRING_MESSAGE,
            }
            .to_owned()
        }
    }

    fn field_errors(result: Result<PriceForm, Error>) -> Value {
        match result {
            Err(Error::InvalidFields(errors)) => serde_json::to_value(errors).unwrap(),
            other => panic!("expected field errors, got {other:?}"),
        }
    }

    #[test]
    fn parses_valid_body() {
        let form: PriceForm = parse_form(json!({"label": "Scrap", "price": "1.50"})).unwrap();

        assert_eq!(form.label.as_deref(), Some("Scrap"));
        assert_eq!(form.price.map(|price| price.to_string()).as_deref(), Some("1.50"));
    }

    #[test]
    fn names_each_field_with_the_wrong_type() {
        let result = parse_form::<PriceForm>(json!({"label": 7, "price": "abc"}));

        assert_eq!(
            field_errors(result),
            json!({
                "label": ["Not a valid string."],
                "price": ["A valid number is required."],
            })
        );
    }

    #[test]
    fn ignores_well_typed_fields_next_to_bad_ones() {
        let result = parse_form::<PriceForm>(json!({"label": "Scrap", "price": [1]}));

        assert_eq!(
            field_errors(result),
            json!({"price": ["A valid number is required."]})
        );
    }

    #[test]
    fn rejects_bodies_that_are_not_objects() {
        let result = parse_form::<PriceForm>(json!(["Scrap"]));

        assert_eq!(
            field_errors(result),
            json!({"non_field_errors": ["Invalid data. Expected a dictionary, but got list."]})
        );
    }
}

#[cfg(test)]
mod deserialize_some_tests {
    use serde::Deserialize;

    use super::deserialize_some;

    #[derive(Debug, Deserialize)]
    struct Patch {
        #[serde(default, deserialize_with = "deserialize_some")]
        color: Option<Option<String>>,
    }

    #[test]
    fn absent_key_is_none() {
        let patch: Patch = serde_json::from_str("{}").unwrap();

        assert_eq!(patch.color, None);
    }

    #[test]
    fn explicit_null_is_some_none() {
        let patch: Patch = serde_json::from_str(r#"{"color": null}"#).unwrap();

        assert_eq!(patch.color, Some(None));
    }

    #[test]
    fn value_is_some_some() {
        let patch: Patch = serde_json::from_str(r#"{"color": "red"}"#).unwrap();

        assert_eq!(patch.color, Some(Some("red".to_owned())));
    }
}
