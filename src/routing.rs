//! Application router configuration with protected and unprotected route definitions.

use axum::{
    Router, middleware,
    routing::{get, post},
};

use crate::{
    AppState,
    auth::{auth_guard, log_in_endpoint, refresh_token_endpoint, register_endpoint},
    customer::{
        create_customer_endpoint, delete_customer_endpoint, get_customer_endpoint,
        list_customers_endpoint, patch_customer_endpoint, replace_customer_endpoint,
    },
    endpoints,
    expense::{
        create_expense_endpoint, delete_expense_endpoint, get_expense_endpoint,
        list_expenses_endpoint, patch_expense_endpoint, replace_expense_endpoint,
    },
    material::{
        create_material_endpoint, delete_material_endpoint, get_material_endpoint,
        list_materials_endpoint, patch_material_endpoint, replace_material_endpoint,
    },
    not_found::get_404_not_found,
    starting_capital::{
        create_starting_capital_endpoint, delete_starting_capital_endpoint,
        get_starting_capital_endpoint, list_starting_capital_endpoint,
        patch_starting_capital_endpoint, replace_starting_capital_endpoint,
    },
    transaction::{
        create_transaction_endpoint, delete_transaction_endpoint, get_transaction_endpoint,
        list_transactions_endpoint, patch_transaction_endpoint, replace_transaction_endpoint,
    },
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    let unprotected_routes = Router::new()
        .route(endpoints::REGISTER, post(register_endpoint))
        .route(endpoints::LOG_IN, post(log_in_endpoint))
        .route(endpoints::REFRESH_TOKEN, post(refresh_token_endpoint));

    let protected_routes = Router::new()
        .route(
            endpoints::STARTING_CAPITAL,
            get(list_starting_capital_endpoint).post(create_starting_capital_endpoint),
        )
        .route(
            endpoints::STARTING_CAPITAL_ITEM,
            get(get_starting_capital_endpoint)
                .put(replace_starting_capital_endpoint)
                .patch(patch_starting_capital_endpoint)
                .delete(delete_starting_capital_endpoint),
        )
        .route(
            endpoints::MATERIALS,
            get(list_materials_endpoint).post(create_material_endpoint),
        )
        .route(
            endpoints::MATERIAL,
            get(get_material_endpoint)
                .put(replace_material_endpoint)
                .patch(patch_material_endpoint)
                .delete(delete_material_endpoint),
        )
        .route(
            endpoints::CUSTOMERS,
            get(list_customers_endpoint).post(create_customer_endpoint),
        )
        .route(
            endpoints::CUSTOMER,
            get(get_customer_endpoint)
                .put(replace_customer_endpoint)
                .patch(patch_customer_endpoint)
                .delete(delete_customer_endpoint),
        )
        .route(
            endpoints::EXPENSES,
            get(list_expenses_endpoint).post(create_expense_endpoint),
        )
        .route(
            endpoints::EXPENSE,
            get(get_expense_endpoint)
                .put(replace_expense_endpoint)
                .patch(patch_expense_endpoint)
                .delete(delete_expense_endpoint),
        )
        .route(
            endpoints::TRANSACTIONS,
            get(list_transactions_endpoint).post(create_transaction_endpoint),
        )
        .route(
            endpoints::TRANSACTION,
            get(get_transaction_endpoint)
                .put(replace_transaction_endpoint)
                .patch(patch_transaction_endpoint)
                .delete(delete_transaction_endpoint),
        )
        .layer(middleware::from_fn_with_state(state.clone(), auth_guard));

    protected_routes
        .merge(unprotected_routes)
        .fallback(get_404_not_found)
        .with_state(state)
}

#[cfg(test)]
mod router_tests {
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use serde_json::{Value, json};

    use crate::{
        build_router, endpoints,
        test_utils::{TestClient, get_test_app_state},
    };

    #[tokio::test]
    async fn unknown_route_is_not_found() {
        let server = TestServer::try_new(build_router(get_test_app_state()))
            .expect("Could not create test server.");

        let response = server.get("/api/coffee").await;

        response.assert_status_not_found();
        response.assert_json(&json!({"detail": "Not found."}));
    }

    #[tokio::test]
    async fn non_numeric_record_id_is_not_found() {
        let client = TestClient::new();

        for path in [
            "/api/startingcapital/abc",
            "/api/materials/abc",
            "/api/customers/abc",
            "/api/expenses/abc",
            "/api/transactions/abc",
        ] {
            let response = client.get(path).await;

            response.assert_status_not_found();
            response.assert_json(&json!({"detail": "Not found."}));
        }

        let response = client.patch("/api/materials/1.5", &json!({"name": "Tin"})).await;
        response.assert_status_not_found();
        response.assert_json(&json!({"detail": "Not found."}));
    }

    #[tokio::test]
    async fn every_resource_requires_a_token() {
        let server = TestServer::try_new(build_router(get_test_app_state()))
            .expect("Could not create test server.");

        for path in [
            endpoints::STARTING_CAPITAL,
            endpoints::MATERIALS,
            endpoints::CUSTOMERS,
            endpoints::EXPENSES,
            endpoints::TRANSACTIONS,
        ] {
            server
                .get(path)
                .await
                .assert_status(StatusCode::UNAUTHORIZED);
        }
    }

    #[tokio::test]
    async fn register_log_in_and_use_token() {
        let server = TestServer::try_new(build_router(get_test_app_state()))
            .expect("Could not create test server.");
        let credentials = json!({"username": "trader", "password": "averysafeandsecurepassword"});

        server
            .post(endpoints::REGISTER)
            .json(&credentials)
            .await
            .assert_status(StatusCode::CREATED);

        let log_in = server.post(endpoints::LOG_IN).json(&credentials).await;
        log_in.assert_status_ok();
        let body = log_in.json::<Value>();
        assert_eq!(body["user"]["username"], "trader");
        let access = body["access"].as_str().unwrap().to_owned();
        let refresh = body["refresh"].as_str().unwrap().to_owned();

        server
            .get(endpoints::MATERIALS)
            .authorization_bearer(&access)
            .await
            .assert_status_ok();

        let refreshed = server
            .post(endpoints::REFRESH_TOKEN)
            .json(&json!({"refresh": refresh}))
            .await;
        refreshed.assert_status_ok();
        let new_access = refreshed.json::<Value>()["access"]
            .as_str()
            .unwrap()
            .to_owned();

        server
            .get(endpoints::TRANSACTIONS)
            .authorization_bearer(new_access)
            .await
            .assert_status_ok();
    }
}
