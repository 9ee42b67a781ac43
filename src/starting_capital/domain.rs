//! Core starting capital domain types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::{Date, OffsetDateTime};

use crate::{
    DatabaseID,
    json::{INVALID_DATE_MESSAGE, INVALID_NUMBER_MESSAGE, INVALID_STRING_MESSAGE, JsonForm},
    validation::{FieldErrors, WriteMode, required_decimal, required_text},
};

/// Database identifier for a starting capital record.
pub type StartingCapitalId = DatabaseID;

const DESCRIPTION_MAX_LENGTH: usize = 255;

/// An amount of money put into the business to fund trading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartingCapital {
    /// The ID of the record.
    pub id: StartingCapitalId,
    /// What the money was put in from.
    pub description: String,
    /// The amount of money, with two decimal places.
    pub amount: Decimal,
    /// The day the money was put in.
    #[serde(with = "crate::json::date_format")]
    pub date: Date,
}

/// A validated starting capital record that is ready to be written to the database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewStartingCapital {
    /// The trimmed description.
    pub description: String,
    /// The amount rescaled to two decimal places.
    pub amount: Decimal,
    /// The given date, or today.
    pub date: Date,
}

/// The JSON body for creating and updating starting capital.
#[derive(Debug, Default, Deserialize)]
pub struct StartingCapitalForm {
    /// The submitted description, if any.
    pub description: Option<String>,
    /// The submitted amount, if any.
    pub amount: Option<Decimal>,
    /// The submitted date. `null` is treated as omitted.
    #[serde(default, deserialize_with = "crate::json::date_format::deserialize_option")]
    pub date: Option<Date>,
}

impl JsonForm for StartingCapitalForm {
    fn invalid_value_message(field: &str, _value: &Value) -> String {
        match field {
            "amount" => INVALID_NUMBER_MESSAGE,
            "date" => INVALID_DATE_MESSAGE,
            _ => INVALID_STRING_MESSAGE,
        }
        .to_owned()
    }
}

/// A starting capital record that has not been validated yet.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StartingCapitalDraft {
    /// The description to validate.
    pub description: Option<String>,
    /// The amount to validate.
    pub amount: Option<Decimal>,
    /// Today's date is used when no date is given.
    pub date: Option<Date>,
}

impl From<StartingCapital> for StartingCapitalDraft {
    fn from(capital: StartingCapital) -> Self {
        Self {
            description: Some(capital.description),
            amount: Some(capital.amount),
            date: Some(capital.date),
        }
    }
}

impl StartingCapitalForm {
    /// Apply the submitted fields to `draft`.
    pub fn merge(self, draft: StartingCapitalDraft, mode: WriteMode) -> StartingCapitalDraft {
        StartingCapitalDraft {
            description: mode.required(self.description, draft.description),
            amount: mode.required(self.amount, draft.amount),
            date: self.date.or(draft.date),
        }
    }
}

impl StartingCapitalDraft {
    /// Check the field constraints of a starting capital record.
    ///
    /// # Errors
    ///
    /// Returns the problems with each invalid field.
    pub fn validate(self) -> Result<NewStartingCapital, FieldErrors> {
        let mut errors = FieldErrors::new();

        let description = required_text(
            &mut errors,
            "description",
            self.description,
            DESCRIPTION_MAX_LENGTH,
        );
        let amount = required_decimal(&mut errors, "amount", self.amount);
        let date = self
            .date
            .unwrap_or_else(|| OffsetDateTime::now_utc().date());

        errors.into_result(NewStartingCapital {
            description,
            amount,
            date,
        })
    }
}
