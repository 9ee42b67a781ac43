//! The REST endpoints for customers.

use axum::{Json, extract::State, http::StatusCode};

use crate::{
    Error,
    app_state::DbState,
    customer::{
        Customer, CustomerDraft, CustomerForm, CustomerId, create_customer, delete_customer,
        get_all_customers, get_customer, update_customer,
    },
    db::lock_connection,
    json::ApiJson,
    path::ApiPath,
    validation::WriteMode,
};

/// List all customers ordered by name.
pub async fn list_customers_endpoint(
    State(state): State<DbState>,
) -> Result<Json<Vec<Customer>>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    get_all_customers(&connection).map(Json)
}

/// Get a single customer.
pub async fn get_customer_endpoint(
    ApiPath(customer_id): ApiPath<CustomerId>,
    State(state): State<DbState>,
) -> Result<Json<Customer>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    get_customer(customer_id, &connection).map(Json)
}

/// Create a customer, responding with 201 and the new customer.
pub async fn create_customer_endpoint(
    State(state): State<DbState>,
    ApiJson(form): ApiJson<CustomerForm>,
) -> Result<(StatusCode, Json<Customer>), Error> {
    let new_customer = form
        .merge(CustomerDraft::default(), WriteMode::Full)
        .validate()?;

    let connection = lock_connection(&state.db_connection)?;
    let customer = create_customer(new_customer, &connection)?;
    tracing::debug!("Created customer {}", customer.id);

    Ok((StatusCode::CREATED, Json(customer)))
}

/// Replace all the fields of a customer.
pub async fn replace_customer_endpoint(
    ApiPath(customer_id): ApiPath<CustomerId>,
    State(state): State<DbState>,
    ApiJson(form): ApiJson<CustomerForm>,
) -> Result<Json<Customer>, Error> {
    apply_update(customer_id, form, WriteMode::Full, &state).map(Json)
}

/// Update only the submitted fields of a customer.
pub async fn patch_customer_endpoint(
    ApiPath(customer_id): ApiPath<CustomerId>,
    State(state): State<DbState>,
    ApiJson(form): ApiJson<CustomerForm>,
) -> Result<Json<Customer>, Error> {
    apply_update(customer_id, form, WriteMode::Partial, &state).map(Json)
}

/// Delete a customer, responding with 204.
///
/// Transactions for the customer are kept and no longer refer to a customer.
pub async fn delete_customer_endpoint(
    ApiPath(customer_id): ApiPath<CustomerId>,
    State(state): State<DbState>,
) -> Result<StatusCode, Error> {
    let connection = lock_connection(&state.db_connection)?;
    delete_customer(customer_id, &connection)?;

    Ok(StatusCode::NO_CONTENT)
}

fn apply_update(
    customer_id: CustomerId,
    form: CustomerForm,
    mode: WriteMode,
    state: &DbState,
) -> Result<Customer, Error> {
    let connection = lock_connection(&state.db_connection)?;
    let stored = get_customer(customer_id, &connection)?;

    let changes = form.merge(CustomerDraft::from(stored), mode).validate()?;

    update_customer(customer_id, changes, &connection)
}

#[cfg(test)]
mod customer_endpoint_tests {
    use axum::http::StatusCode;
    use serde_json::{Value, json};

    use crate::{endpoints, endpoints::format_endpoint, test_utils::TestClient};

    #[tokio::test]
    async fn create_customer_trims_name() {
        let client = TestClient::new();

        let response = client
            .post(endpoints::CUSTOMERS, &json!({"name": "  Acme Metals  "}))
            .await;

        response.assert_status(StatusCode::CREATED);
        assert_eq!(response.json::<Value>()["name"], "Acme Metals");
    }

    #[tokio::test]
    async fn create_customer_with_blank_name_is_field_error() {
        let client = TestClient::new();

        let response = client.post(endpoints::CUSTOMERS, &json!({"name": ""})).await;

        response.assert_status(StatusCode::BAD_REQUEST);
        response.assert_json(&json!({"name": ["This field may not be blank."]}));
    }

    #[tokio::test]
    async fn create_duplicate_customer_is_conflict() {
        let client = TestClient::new();
        client.create(endpoints::CUSTOMERS, &json!({"name": "Acme"})).await;

        let response = client.post(endpoints::CUSTOMERS, &json!({"name": "Acme"})).await;

        response.assert_status(StatusCode::CONFLICT);
        response.assert_json(&json!({"name": ["customer with this name already exists."]}));
    }

    #[tokio::test]
    async fn rename_customer_with_put() {
        let client = TestClient::new();
        let id = client.create(endpoints::CUSTOMERS, &json!({"name": "Acme"})).await;
        let path = format_endpoint(endpoints::CUSTOMER, id);

        let response = client.put(&path, &json!({"name": "Acme Ltd"})).await;

        response.assert_status_ok();
        response.assert_json(&json!({"id": id, "name": "Acme Ltd"}));
    }

    #[tokio::test]
    async fn get_missing_customer_is_not_found() {
        let client = TestClient::new();

        let response = client
            .get(&format_endpoint(endpoints::CUSTOMER, 404))
            .await;

        response.assert_status_not_found();
    }

    #[tokio::test]
    async fn list_customers_requires_token() {
        let client = TestClient::new();

        let response = client.server.get(endpoints::CUSTOMERS).await;

        response.assert_status_unauthorized();
        response.assert_json(&json!({"detail": "Authentication credentials were not provided."}));
    }
}
