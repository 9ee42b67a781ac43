//! Helpers for testing the API end-to-end through the application router.

use axum_test::{TestResponse, TestServer};
use rusqlite::Connection;
use serde_json::Value;

use crate::{
    AppState, PasswordHash, build_router, create_user,
    auth::{TokenType, issue_token},
};

/// The lowest cost bcrypt allows, which keeps hashing in tests fast.
pub(crate) const TEST_PASSWORD_HASH_COST: u32 = 4;

/// Create app state backed by a fresh in-memory database.
pub(crate) fn get_test_app_state() -> AppState {
    let connection =
        Connection::open_in_memory().expect("Could not open in-memory SQLite database");

    AppState::new(connection, "42")
        .expect("Could not create app state")
        .with_password_hash_cost(TEST_PASSWORD_HASH_COST)
}

/// A test server with a registered user and a valid access token that is
/// sent with every request.
pub(crate) struct TestClient {
    /// The server running the full router.
    pub server: TestServer,
    /// The state shared with the server, for checking the database.
    pub state: AppState,
    /// The bearer token sent with each request.
    pub access_token: String,
}

impl TestClient {
    pub fn new() -> Self {
        let state = get_test_app_state();

        let user = create_user(
            "tester",
            PasswordHash::new_unchecked("not a real hash"),
            &state.db_connection.lock().unwrap(),
        )
        .expect("Could not create test user");
        let access_token = issue_token(
            &user,
            TokenType::Access,
            &state.jwt_keys,
            state.access_token_duration,
        )
        .expect("Could not create access token");

        let server =
            TestServer::try_new(build_router(state.clone())).expect("Could not create test server.");

        Self {
            server,
            state,
            access_token,
        }
    }

    pub async fn get(&self, path: &str) -> TestResponse {
        self.server
            .get(path)
            .authorization_bearer(&self.access_token)
            .await
    }

    pub async fn post(&self, path: &str, body: &Value) -> TestResponse {
        self.server
            .post(path)
            .authorization_bearer(&self.access_token)
            .json(body)
            .await
    }

    pub async fn put(&self, path: &str, body: &Value) -> TestResponse {
        self.server
            .put(path)
            .authorization_bearer(&self.access_token)
            .json(body)
            .await
    }

    pub async fn patch(&self, path: &str, body: &Value) -> TestResponse {
        self.server
            .patch(path)
            .authorization_bearer(&self.access_token)
            .json(body)
            .await
    }

    pub async fn delete(&self, path: &str) -> TestResponse {
        self.server
            .delete(path)
            .authorization_bearer(&self.access_token)
            .await
    }

    /// Create a record at `path` and return its ID.
    pub async fn create(&self, path: &str, body: &Value) -> i64 {
        let response = self.post(path, body).await;
        response.assert_status(axum::http::StatusCode::CREATED);

        response.json::<Value>()["id"]
            .as_i64()
            .expect("Created record has no ID")
    }
}
