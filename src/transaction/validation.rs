//! The rules for which fields a transaction needs, by transaction type.

use crate::{
    transaction::{NewTransaction, TransactionDraft, TransactionType},
    validation::{FieldErrors, REQUIRED_MESSAGE, optional_decimal, optional_text},
};

const DESCRIPTION_MAX_LENGTH: usize = 255;

/// A field that must be filled in for a transaction type.
struct Requirement {
    field: &'static str,
    message: &'static str,
    is_present: fn(&TransactionDraft) -> bool,
}

const PURCHASE_REQUIREMENTS: &[Requirement] = &[
    Requirement {
        field: "material",
        message: "Material is required for a Purchase (CR).",
        is_present: has_material,
    },
    Requirement {
        field: "quantity",
        message: "Quantity is required for a Purchase (CR).",
        is_present: has_quantity,
    },
];

const SALE_REQUIREMENTS: &[Requirement] = &[
    Requirement {
        field: "material",
        message: "Material is required for a Sale (DB).",
        is_present: has_material,
    },
    Requirement {
        field: "customer",
        message: "Customer is required for a Sale (DB).",
        is_present: has_customer,
    },
    Requirement {
        field: "quantity",
        message: "Quantity is required for a Sale (DB).",
        is_present: has_quantity,
    },
];

const RECONCILIATION_REQUIREMENTS: &[Requirement] = &[
    Requirement {
        field: "customer",
        message: "Customer is required for a Reconciliation (RC).",
        is_present: has_customer,
    },
    Requirement {
        field: "total_price",
        message: "Amount received is required for Reconciliation (RC).",
        is_present: has_total_price,
    },
];

fn requirements(transaction_type: TransactionType) -> &'static [Requirement] {
    match transaction_type {
        TransactionType::Credit => PURCHASE_REQUIREMENTS,
        TransactionType::Debit => SALE_REQUIREMENTS,
        TransactionType::Reconciliation => RECONCILIATION_REQUIREMENTS,
    }
}

fn has_material(draft: &TransactionDraft) -> bool {
    draft.material.is_some()
}

fn has_customer(draft: &TransactionDraft) -> bool {
    draft.customer.is_some()
}

// A zero quantity is treated the same as a missing one.
fn has_quantity(draft: &TransactionDraft) -> bool {
    draft.quantity.is_some_and(|quantity| !quantity.is_zero())
}

fn has_total_price(draft: &TransactionDraft) -> bool {
    draft.total_price.is_some()
}

/// Check `draft` against the field rules for its transaction type.
///
/// | Type | Required |
/// |------|----------|
/// | CR (Purchase) | material, non-zero quantity |
/// | DB (Sale) | material, customer, non-zero quantity |
/// | RC (Reconciliation) | customer, total_price |
///
/// `total_price` is required for every type. Every problem is reported, one
/// entry per field. This does not check that referenced records exist, see
/// [crate::transaction::find_missing_references].
///
/// # Errors
///
/// Returns the problems with each invalid field.
pub fn validate_transaction(draft: TransactionDraft) -> Result<NewTransaction, FieldErrors> {
    let mut errors = FieldErrors::new();

    let transaction_type = match draft.transaction_type.as_deref() {
        None => {
            errors.add("transaction_type", REQUIRED_MESSAGE);
            None
        }
        Some(code) => {
            let transaction_type = TransactionType::from_code(code);
            if transaction_type.is_none() {
                errors.add(
                    "transaction_type",
                    format!("\"{code}\" is not a valid choice."),
                );
            }
            transaction_type
        }
    };

    if let Some(transaction_type) = transaction_type {
        for requirement in requirements(transaction_type) {
            if !(requirement.is_present)(&draft) {
                errors.add(requirement.field, requirement.message);
            }
        }
    }

    if !has_total_price(&draft) && !errors.contains("total_price") {
        errors.add("total_price", REQUIRED_MESSAGE);
    }

    let quantity = optional_decimal(&mut errors, "quantity", draft.quantity);
    let total_price = optional_decimal(&mut errors, "total_price", draft.total_price);
    let money_received = optional_decimal(&mut errors, "money_received", draft.money_received);
    let description = optional_text(
        &mut errors,
        "description",
        draft.description,
        DESCRIPTION_MAX_LENGTH,
    );

    let (Some(transaction_type), Some(total_price)) = (transaction_type, total_price) else {
        return Err(errors);
    };

    errors.into_result(NewTransaction {
        transaction_type,
        material: draft.material,
        customer: draft.customer,
        quantity,
        total_price,
        money_received,
        description,
    })
}
