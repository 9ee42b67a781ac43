//! The REST endpoints for transactions.

use axum::{Json, extract::State, http::StatusCode};
use rusqlite::Connection;

use crate::{
    Error,
    app_state::DbState,
    db::lock_connection,
    json::ApiJson,
    path::ApiPath,
    transaction::{
        NewTransaction, TransactionDraft, TransactionForm, TransactionId, TransactionView,
        create_transaction, delete_transaction, find_missing_references,
        get_all_transaction_views, get_transaction, get_transaction_view, update_transaction,
        validate_transaction,
    },
    validation::WriteMode,
};

/// List all transactions, newest first.
pub async fn list_transactions_endpoint(
    State(state): State<DbState>,
) -> Result<Json<Vec<TransactionView>>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    get_all_transaction_views(&connection).map(Json)
}

/// Get a single transaction.
pub async fn get_transaction_endpoint(
    ApiPath(transaction_id): ApiPath<TransactionId>,
    State(state): State<DbState>,
) -> Result<Json<TransactionView>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    get_transaction_view(transaction_id, &connection).map(Json)
}

/// Record a transaction, responding with 201 and the new transaction.
pub async fn create_transaction_endpoint(
    State(state): State<DbState>,
    ApiJson(form): ApiJson<TransactionForm>,
) -> Result<(StatusCode, Json<TransactionView>), Error> {
    let draft = form.merge(TransactionDraft::default(), WriteMode::Full);

    let connection = lock_connection(&state.db_connection)?;
    let new_transaction = validate_with_references(draft, &connection)?;
    let transaction = create_transaction(new_transaction, &connection)?;
    tracing::debug!(
        "Created {} transaction {}",
        transaction.transaction_type,
        transaction.id
    );

    let view = get_transaction_view(transaction.id, &connection)?;

    Ok((StatusCode::CREATED, Json(view)))
}

/// Replace the fields of a transaction.
pub async fn replace_transaction_endpoint(
    ApiPath(transaction_id): ApiPath<TransactionId>,
    State(state): State<DbState>,
    ApiJson(form): ApiJson<TransactionForm>,
) -> Result<Json<TransactionView>, Error> {
    apply_update(transaction_id, form, WriteMode::Full, &state).map(Json)
}

/// Update the submitted fields of a transaction.
///
/// The type rules are checked against the transaction as it would be after
/// the update.
pub async fn patch_transaction_endpoint(
    ApiPath(transaction_id): ApiPath<TransactionId>,
    State(state): State<DbState>,
    ApiJson(form): ApiJson<TransactionForm>,
) -> Result<Json<TransactionView>, Error> {
    apply_update(transaction_id, form, WriteMode::Partial, &state).map(Json)
}

/// Delete a transaction, responding with 204.
pub async fn delete_transaction_endpoint(
    ApiPath(transaction_id): ApiPath<TransactionId>,
    State(state): State<DbState>,
) -> Result<StatusCode, Error> {
    let connection = lock_connection(&state.db_connection)?;
    delete_transaction(transaction_id, &connection)?;

    Ok(StatusCode::NO_CONTENT)
}

fn apply_update(
    transaction_id: TransactionId,
    form: TransactionForm,
    mode: WriteMode,
    state: &DbState,
) -> Result<TransactionView, Error> {
    let connection = lock_connection(&state.db_connection)?;
    let stored = get_transaction(transaction_id, &connection)?;

    let draft = form.merge(TransactionDraft::from(stored), mode);
    let changes = validate_with_references(draft, &connection)?;
    update_transaction(transaction_id, changes, &connection)?;

    get_transaction_view(transaction_id, &connection)
}

/// Validate `draft` and check its references, reporting both kinds of
/// problems together.
fn validate_with_references(
    draft: TransactionDraft,
    connection: &Connection,
) -> Result<NewTransaction, Error> {
    let mut errors = find_missing_references(draft.material, draft.customer, connection)?;

    match validate_transaction(draft) {
        Ok(transaction) if errors.is_empty() => Ok(transaction),
        Ok(_) => Err(errors.into()),
        Err(rule_errors) => {
            errors.extend(rule_errors);
            Err(errors.into())
        }
    }
}
