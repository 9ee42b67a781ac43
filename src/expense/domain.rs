//! Core expense domain types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::{Date, OffsetDateTime};

use crate::{
    DatabaseID,
    json::{INVALID_DATE_MESSAGE, INVALID_NUMBER_MESSAGE, INVALID_STRING_MESSAGE, JsonForm},
    validation::{FieldErrors, WriteMode, required_decimal, required_text},
};

/// Database identifier for an expense.
pub type ExpenseId = DatabaseID;

const DESCRIPTION_MAX_LENGTH: usize = 255;
const EXPENSE_TYPE_MAX_LENGTH: usize = 10;

/// Money spent on running the business, e.g. fuel or rent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expense {
    /// The ID of the record.
    pub id: ExpenseId,
    /// What the money was spent on.
    pub description: String,
    /// The amount of money, with two decimal places.
    pub amount: Decimal,
    /// The day the money was spent.
    #[serde(with = "crate::json::date_format")]
    pub date: Date,
    /// A short free-form category such as "Fuel".
    pub expense_type: String,
}

/// A validated expense that is ready to be written to the database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewExpense {
    /// The trimmed description.
    pub description: String,
    /// The amount rescaled to two decimal places.
    pub amount: Decimal,
    /// The given date, or today.
    pub date: Date,
    /// The trimmed expense type.
    pub expense_type: String,
}

/// The JSON body for creating and updating expenses.
#[derive(Debug, Default, Deserialize)]
pub struct ExpenseForm {
    /// The submitted description, if any.
    pub description: Option<String>,
    /// The submitted amount, if any.
    pub amount: Option<Decimal>,
    /// The submitted date. `null` is treated as omitted.
    #[serde(default, deserialize_with = "crate::json::date_format::deserialize_option")]
    pub date: Option<Date>,
    /// The submitted expense type, if any.
    pub expense_type: Option<String>,
}

impl JsonForm for ExpenseForm {
    fn invalid_value_message(field: &str, _value: &Value) -> String {
        match field {
            "amount" => INVALID_NUMBER_MESSAGE,
            "date" => INVALID_DATE_MESSAGE,
            _ => INVALID_STRING_MESSAGE,
        }
        .to_owned()
    }
}

/// An expense that has not been validated yet.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExpenseDraft {
    /// The description to validate.
    pub description: Option<String>,
    /// The amount to validate.
    pub amount: Option<Decimal>,
    /// Today's date is used when no date is given.
    pub date: Option<Date>,
    /// The expense type to validate.
    pub expense_type: Option<String>,
}

impl From<Expense> for ExpenseDraft {
    fn from(expense: Expense) -> Self {
        Self {
            description: Some(expense.description),
            amount: Some(expense.amount),
            date: Some(expense.date),
            expense_type: Some(expense.expense_type),
        }
    }
}

impl ExpenseForm {
    /// Apply the submitted fields to `draft`.
    pub fn merge(self, draft: ExpenseDraft, mode: WriteMode) -> ExpenseDraft {
        ExpenseDraft {
            description: mode.required(self.description, draft.description),
            amount: mode.required(self.amount, draft.amount),
            date: self.date.or(draft.date),
            expense_type: mode.required(self.expense_type, draft.expense_type),
        }
    }
}

impl ExpenseDraft {
    /// Check the field constraints of an expense, dating it today if no date
    /// was given.
    ///
    /// # Errors
    ///
    /// Returns the problems with each invalid field.
    pub fn validate(self) -> Result<NewExpense, FieldErrors> {
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
        let expense_type = required_text(
            &mut errors,
            "expense_type",
            self.expense_type,
            EXPENSE_TYPE_MAX_LENGTH,
        );

        errors.into_result(NewExpense {
            description,
            amount,
            date,
            expense_type,
        })
    }
}
