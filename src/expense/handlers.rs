//! The REST endpoints for expenses.

use axum::{Json, extract::State, http::StatusCode};

use crate::{
    Error,
    app_state::DbState,
    db::lock_connection,
    expense::{
        Expense, ExpenseDraft, ExpenseForm, ExpenseId, create_expense, delete_expense,
        get_all_expenses, get_expense, update_expense,
    },
    json::ApiJson,
    path::ApiPath,
    validation::WriteMode,
};

/// List all expenses, most recent first.
pub async fn list_expenses_endpoint(
    State(state): State<DbState>,
) -> Result<Json<Vec<Expense>>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    get_all_expenses(&connection).map(Json)
}

/// Get a single expense.
pub async fn get_expense_endpoint(
    ApiPath(expense_id): ApiPath<ExpenseId>,
    State(state): State<DbState>,
) -> Result<Json<Expense>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    get_expense(expense_id, &connection).map(Json)
}

/// Create an expense, responding with 201 and the new expense.
pub async fn create_expense_endpoint(
    State(state): State<DbState>,
    ApiJson(form): ApiJson<ExpenseForm>,
) -> Result<(StatusCode, Json<Expense>), Error> {
    let new_expense = form
        .merge(ExpenseDraft::default(), WriteMode::Full)
        .validate()?;

    let connection = lock_connection(&state.db_connection)?;
    let expense = create_expense(new_expense, &connection)?;
    tracing::debug!("Created expense {}", expense.id);

    Ok((StatusCode::CREATED, Json(expense)))
}

/// Replace all the fields of an expense.
pub async fn replace_expense_endpoint(
    ApiPath(expense_id): ApiPath<ExpenseId>,
    State(state): State<DbState>,
    ApiJson(form): ApiJson<ExpenseForm>,
) -> Result<Json<Expense>, Error> {
    apply_update(expense_id, form, WriteMode::Full, &state).map(Json)
}

/// Update only the submitted fields of an expense.
pub async fn patch_expense_endpoint(
    ApiPath(expense_id): ApiPath<ExpenseId>,
    State(state): State<DbState>,
    ApiJson(form): ApiJson<ExpenseForm>,
) -> Result<Json<Expense>, Error> {
    apply_update(expense_id, form, WriteMode::Partial, &state).map(Json)
}

/// Delete an expense, responding with 204.
pub async fn delete_expense_endpoint(
    ApiPath(expense_id): ApiPath<ExpenseId>,
    State(state): State<DbState>,
) -> Result<StatusCode, Error> {
    let connection = lock_connection(&state.db_connection)?;
    delete_expense(expense_id, &connection)?;

    Ok(StatusCode::NO_CONTENT)
}

fn apply_update(
    expense_id: ExpenseId,
    form: ExpenseForm,
    mode: WriteMode,
    state: &DbState,
) -> Result<Expense, Error> {
    let connection = lock_connection(&state.db_connection)?;
    let stored = get_expense(expense_id, &connection)?;

    let changes = form.merge(ExpenseDraft::from(stored), mode).validate()?;

    update_expense(expense_id, changes, &connection)
}

#[cfg(test)]
mod expense_endpoint_tests {
    use axum::http::StatusCode;
    use serde_json::{Value, json};

    use crate::{endpoints, endpoints::format_endpoint, test_utils::TestClient};

    #[tokio::test]
    async fn list_expenses_by_date_descending() {
        let client = TestClient::new();
        for (description, date) in [
            ("Rent", "2024-01-15"),
            ("Fuel", "2024-03-02"),
            ("Tolls", "2024-02-20"),
        ] {
            client
                .create(
                    endpoints::EXPENSES,
                    &json!({
                        "description": description,
                        "amount": "12.00",
                        "date": date,
                        "expense_type": "Running",
                    }),
                )
                .await;
        }

        let response = client.get(endpoints::EXPENSES).await;

        response.assert_status_ok();
        let dates: Vec<String> = response
            .json::<Vec<Value>>()
            .iter()
            .map(|expense| expense["date"].as_str().unwrap().to_owned())
            .collect();
        assert_eq!(dates, ["2024-03-02", "2024-02-20", "2024-01-15"]);
    }

    #[tokio::test]
    async fn create_expense_reports_all_missing_fields() {
        let client = TestClient::new();

        let response = client.post(endpoints::EXPENSES, &json!({})).await;

        response.assert_status(StatusCode::BAD_REQUEST);
        response.assert_json(&json!({
            "amount": ["This field is required."],
            "description": ["This field is required."],
            "expense_type": ["This field is required."],
        }));
    }

    #[tokio::test]
    async fn put_expense_keeps_date_when_omitted() {
        let client = TestClient::new();
        let id = client
            .create(
                endpoints::EXPENSES,
                &json!({
                    "description": "Rent",
                    "amount": 500,
                    "date": "2024-01-01",
                    "expense_type": "Rent",
                }),
            )
            .await;

        let response = client
            .put(
                &format_endpoint(endpoints::EXPENSE, id),
                &json!({"description": "Rent", "amount": 550, "expense_type": "Rent"}),
            )
            .await;

        response.assert_status_ok();
        let body = response.json::<Value>();
        assert_eq!(body["amount"], "550.00");
        assert_eq!(body["date"], "2024-01-01");
    }

    #[tokio::test]
    async fn wrongly_typed_amount_and_date_are_field_errors() {
        let client = TestClient::new();

        let response = client
            .post(
                endpoints::EXPENSES,
                &json!({
                    "description": "Diesel",
                    "amount": "abc",
                    "date": "02/03/2024",
                    "expense_type": "Fuel",
                }),
            )
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        response.assert_json(&json!({
            "amount": ["A valid number is required."],
            "date": ["Date has wrong format. Use one of these formats instead: YYYY-MM-DD."],
        }));
        client.get(endpoints::EXPENSES).await.assert_json(&json!([]));
    }
}
