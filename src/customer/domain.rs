//! Core customer domain types.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    DatabaseID,
    json::{INVALID_STRING_MESSAGE, JsonForm},
    validation::{FieldErrors, WriteMode, required_text},
};

/// Database identifier for a customer.
pub type CustomerId = DatabaseID;

const NAME_MAX_LENGTH: usize = 100;

/// A party that materials are sold to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    /// The ID of the customer.
    pub id: CustomerId,
    /// The unique name of the customer.
    pub name: String,
}

/// A validated customer that is ready to be written to the database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCustomer {
    /// The trimmed, unique name.
    pub name: String,
}

/// The JSON body for creating and updating customers.
#[derive(Debug, Default, Deserialize)]
pub struct CustomerForm {
    /// The submitted name, if any.
    pub name: Option<String>,
}

impl JsonForm for CustomerForm {
    fn invalid_value_message(_field: &str, _value: &Value) -> String {
        INVALID_STRING_MESSAGE.to_owned()
    }
}

/// A customer that has not been validated yet.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CustomerDraft {
    /// The name to validate.
    pub name: Option<String>,
}

impl From<Customer> for CustomerDraft {
    fn from(customer: Customer) -> Self {
        Self {
            name: Some(customer.name),
        }
    }
}

impl CustomerForm {
    /// Apply the submitted fields to `draft`.
    pub fn merge(self, draft: CustomerDraft, mode: WriteMode) -> CustomerDraft {
        CustomerDraft {
            name: mode.required(self.name, draft.name),
        }
    }
}

impl CustomerDraft {
    /// Check the field constraints of a customer.
    ///
    /// # Errors
    ///
    /// Returns the problems with each invalid field.
    pub fn validate(self) -> Result<NewCustomer, FieldErrors> {
        let mut errors = FieldErrors::new();

        let name = required_text(&mut errors, "name", self.name, NAME_MAX_LENGTH);

        errors.into_result(NewCustomer { name })
    }
}
