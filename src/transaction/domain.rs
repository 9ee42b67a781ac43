//! Core transaction domain types.

use std::fmt::Display;

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::OffsetDateTime;

use crate::{
    DatabaseID,
    customer::CustomerId,
    json::{
        INVALID_NUMBER_MESSAGE, INVALID_STRING_MESSAGE, JsonForm, deserialize_some,
        invalid_choice_message, invalid_reference_message,
    },
    material::MaterialId,
    validation::WriteMode,
};

/// Database identifier for a transaction.
pub type TransactionId = DatabaseID;

/// What kind of event a transaction records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionType {
    /// A purchase of material from a supplier.
    #[serde(rename = "CR")]
    Credit,
    /// A sale of material to a customer.
    #[serde(rename = "DB")]
    Debit,
    /// A payment received from a customer.
    #[serde(rename = "RC")]
    Reconciliation,
}

impl TransactionType {
    /// The two letter code clients use for the type.
    pub fn code(self) -> &'static str {
        match self {
            TransactionType::Credit => "CR",
            TransactionType::Debit => "DB",
            TransactionType::Reconciliation => "RC",
        }
    }

    /// Parse a two letter code, returning `None` for unknown codes.
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "CR" => Some(TransactionType::Credit),
            "DB" => Some(TransactionType::Debit),
            "RC" => Some(TransactionType::Reconciliation),
            _ => None,
        }
    }
}

impl Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

impl ToSql for TransactionType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.code()))
    }
}

impl FromSql for TransactionType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let code = value.as_str()?;

        TransactionType::from_code(code)
            .ok_or_else(|| FromSqlError::Other(format!("unknown transaction type {code}").into()))
    }
}

/// A row of the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// Whether this is a purchase, sale or payment.
    pub transaction_type: TransactionType,
    /// The material bought or sold, cleared if the material is deleted.
    pub material: Option<MaterialId>,
    /// The customer sold to or paid by, cleared if the customer is deleted.
    pub customer: Option<CustomerId>,
    /// How much material was bought or sold.
    pub quantity: Option<Decimal>,
    /// The price of the goods, or the amount paid for a reconciliation.
    pub total_price: Decimal,
    /// How much of the price has been paid so far.
    pub money_received: Option<Decimal>,
    /// A free-form note.
    pub description: Option<String>,
    /// When the transaction was recorded. Never changes after creation.
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
}

/// A transaction with the names of the records it refers to, as sent to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionView {
    /// The stored transaction.
    #[serde(flatten)]
    pub transaction: Transaction,
    /// The name of the material, if the transaction has one.
    pub material_name: Option<String>,
    /// The name of the customer, if the transaction has one.
    pub customer_name: Option<String>,
}

/// A validated transaction that is ready to be written to the database.
///
/// The timestamp is assigned when the transaction is created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTransaction {
    /// Decides which of the other fields are required.
    pub transaction_type: TransactionType,
    /// The material bought or sold.
    pub material: Option<MaterialId>,
    /// The customer sold to or paid by.
    pub customer: Option<CustomerId>,
    /// A non-zero quantity for purchases and sales.
    pub quantity: Option<Decimal>,
    /// The price of the material for purchases and sales, or the amount paid
    /// for reconciliations.
    pub total_price: Decimal,
    /// How much of the price has been paid so far.
    pub money_received: Option<Decimal>,
    /// The trimmed note, if any.
    pub description: Option<String>,
}

/// The JSON body for creating and updating transactions.
///
/// Nullable fields distinguish between an omitted key (`None`) and an
/// explicit `null` (`Some(None)`). Any submitted timestamp is ignored.
#[derive(Debug, Default, Deserialize)]
pub struct TransactionForm {
    /// The submitted type code, checked during validation.
    pub transaction_type: Option<String>,
    /// The ID of the material.
    #[serde(default, deserialize_with = "deserialize_some")]
    pub material: Option<Option<MaterialId>>,
    /// The ID of the customer.
    #[serde(default, deserialize_with = "deserialize_some")]
    pub customer: Option<Option<CustomerId>>,
    /// The quantity of material.
    #[serde(default, deserialize_with = "deserialize_some")]
    pub quantity: Option<Option<Decimal>>,
    /// The price, or the amount paid.
    #[serde(default, deserialize_with = "deserialize_some")]
    pub total_price: Option<Option<Decimal>>,
    /// The amount paid so far.
    #[serde(default, deserialize_with = "deserialize_some")]
    pub money_received: Option<Option<Decimal>>,
    /// A free-form note.
    #[serde(default, deserialize_with = "deserialize_some")]
    pub description: Option<Option<String>>,
}

impl JsonForm for TransactionForm {
    fn invalid_value_message(field: &str, value: &Value) -> String {
        match field {
            "transaction_type" => invalid_choice_message(value),
            "material" | "customer" => invalid_reference_message(value),
            "quantity" | "total_price" | "money_received" => INVALID_NUMBER_MESSAGE.to_owned(),
            _ => INVALID_STRING_MESSAGE.to_owned(),
        }
    }
}

/// A transaction that has not been validated yet.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionDraft {
    /// The submitted type code, which may not be a valid code.
    pub transaction_type: Option<String>,
    /// The material to check for.
    pub material: Option<MaterialId>,
    /// The customer to check for.
    pub customer: Option<CustomerId>,
    /// The quantity to check for.
    pub quantity: Option<Decimal>,
    /// The price to check for.
    pub total_price: Option<Decimal>,
    /// Defaults to zero for new transactions.
    pub money_received: Option<Decimal>,
    /// The note to validate.
    pub description: Option<String>,
}

impl Default for TransactionDraft {
    fn default() -> Self {
        Self {
            transaction_type: None,
            material: None,
            customer: None,
            quantity: None,
            total_price: None,
            money_received: Some(Decimal::ZERO),
            description: None,
        }
    }
}

impl From<Transaction> for TransactionDraft {
    fn from(transaction: Transaction) -> Self {
        Self {
            transaction_type: Some(transaction.transaction_type.code().to_owned()),
            material: transaction.material,
            customer: transaction.customer,
            quantity: transaction.quantity,
            total_price: Some(transaction.total_price),
            money_received: transaction.money_received,
            description: transaction.description,
        }
    }
}

impl TransactionForm {
    /// Apply the submitted fields to `draft`.
    pub fn merge(self, draft: TransactionDraft, mode: WriteMode) -> TransactionDraft {
        let total_price = match (mode, self.total_price) {
            (_, Some(submitted)) => submitted,
            (WriteMode::Full, None) => None,
            (WriteMode::Partial, None) => draft.total_price,
        };

        TransactionDraft {
            transaction_type: mode.required(self.transaction_type, draft.transaction_type),
            material: self.material.unwrap_or(draft.material),
            customer: self.customer.unwrap_or(draft.customer),
            quantity: self.quantity.unwrap_or(draft.quantity),
            total_price,
            money_received: self.money_received.unwrap_or(draft.money_received),
            description: self.description.unwrap_or(draft.description),
        }
    }
}


#[cfg(test)]
mod transaction_form_tests {
    use rust_decimal::Decimal;

    use crate::validation::WriteMode;

    use super::{TransactionDraft, TransactionForm};

    fn stored_sale() -> TransactionDraft {
        TransactionDraft {
            transaction_type: Some("DB".to_owned()),
            material: Some(1),
            customer: Some(2),
            quantity: Some(Decimal::from(5)),
            total_price: Some(Decimal::from(50)),
            money_received: Some(Decimal::from(20)),
            description: Some("Five coils".to_owned()),
        }
    }

    #[test]
    fn new_draft_defaults_money_received_to_zero() {
        let form: TransactionForm = serde_json::from_str(r#"{"transaction_type": "CR"}"#).unwrap();

        let got = form.merge(TransactionDraft::default(), WriteMode::Full);

        assert_eq!(got.money_received, Some(Decimal::ZERO));
    }

    #[test]
    fn patch_null_customer_clears_reference() {
        let form: TransactionForm = serde_json::from_str(r#"{"customer": null}"#).unwrap();

        let got = form.merge(stored_sale(), WriteMode::Partial);

        assert_eq!(got.customer, None);
        assert_eq!(got.material, Some(1));
        assert_eq!(got.total_price, Some(Decimal::from(50)));
    }

    #[test]
    fn replace_without_total_price_drops_stored_price() {
        let form: TransactionForm =
            serde_json::from_str(r#"{"transaction_type": "DB", "quantity": 6}"#).unwrap();

        let got = form.merge(stored_sale(), WriteMode::Full);

        assert_eq!(got.total_price, None);
        assert_eq!(got.quantity, Some(Decimal::from(6)));
        assert_eq!(got.customer, Some(2));
    }

    #[test]
    fn explicit_null_total_price_is_missing() {
        let form: TransactionForm = serde_json::from_str(r#"{"total_price": null}"#).unwrap();

        let got = form.merge(stored_sale(), WriteMode::Partial);

        assert_eq!(got.total_price, None);
    }

    #[test]
    fn timestamp_is_ignored() {
        let form: TransactionForm = serde_json::from_str(
            r#"{"transaction_type": "RC", "timestamp": "1999-01-01T00:00:00Z"}"#,
        )
        .unwrap();

        assert_eq!(form.transaction_type.as_deref(), Some("RC"));
    }
}
