//! The endpoint for creating a new user account.

use axum::{Json, extract::State, http::StatusCode};
use serde::Deserialize;
use serde_json::Value;

use crate::{
    Error, PasswordHash, ValidatedPassword,
    app_state::AuthState,
    db::lock_connection,
    json::{ApiJson, INVALID_STRING_MESSAGE, JsonForm},
    user::{PublicUser, USERNAME_MAX_LENGTH, create_user},
    validation::{FieldErrors, required_text, required_untrimmed_text},
};

/// The details submitted to register a user.
#[derive(Debug, Default, Deserialize)]
pub struct RegisterForm {
    /// The name to log in with.
    pub username: Option<String>,
    /// The password to log in with, in plain text.
    pub password: Option<String>,
}

impl JsonForm for RegisterForm {
    fn invalid_value_message(_field: &str, _value: &Value) -> String {
        INVALID_STRING_MESSAGE.to_owned()
    }
}

/// Create a user, responding with 201 and the user's ID and username.
///
/// # Errors
///
/// This function will return an error if:
/// - the username or password is missing or blank,
/// - or the username is already taken.
pub async fn register_endpoint(
    State(state): State<AuthState>,
    ApiJson(form): ApiJson<RegisterForm>,
) -> Result<(StatusCode, Json<PublicUser>), Error> {
    let mut errors = FieldErrors::new();
    let username = required_text(&mut errors, "username", form.username, USERNAME_MAX_LENGTH);
    let raw_password = required_untrimmed_text(&mut errors, "password", form.password);
    errors.into_result(())?;

    let password = ValidatedPassword::new_unchecked(&raw_password);
    let password_hash = PasswordHash::new(password, state.password_hash_cost)?;

    let connection = lock_connection(&state.db_connection)?;
    let user = create_user(&username, password_hash, &connection)?;
    tracing::info!("Registered user {}", user.id);

    Ok((StatusCode::CREATED, Json(PublicUser::from(&user))))
}

#[cfg(test)]
mod register_tests {
    use axum::{Router, http::StatusCode, routing::post};
    use axum_test::TestServer;
    use serde_json::{Value, json};

    use crate::{
        AppState, auth::register_endpoint, get_user_by_username, test_utils::get_test_app_state,
    };

    fn get_test_server() -> (TestServer, AppState) {
        let state = get_test_app_state();
        let app = Router::new()
            .route("/register", post(register_endpoint))
            .with_state(state.clone());

        (
            TestServer::try_new(app).expect("Could not create test server."),
            state,
        )
    }

    #[tokio::test]
    async fn register_creates_user_without_echoing_password() {
        let (server, state) = get_test_server();

        let response = server
            .post("/register")
            .json(&json!({"username": "trader", "password": "averysafeandsecurepassword"}))
            .await;

        response.assert_status(StatusCode::CREATED);
        let body = response.json::<Value>();
        assert_eq!(body["username"], "trader");
        assert!(body["id"].as_i64().unwrap() > 0);
        assert!(body.get("password").is_none());

        let user = get_user_by_username("trader", &state.db_connection.lock().unwrap()).unwrap();
        assert!(user.password_hash.verify("averysafeandsecurepassword").unwrap());
    }

    #[tokio::test]
    async fn register_accepts_common_password() {
        let (server, state) = get_test_server();

        let response = server
            .post("/register")
            .json(&json!({"username": "bob", "password": "password123"}))
            .await;

        response.assert_status(StatusCode::CREATED);
        let user = get_user_by_username("bob", &state.db_connection.lock().unwrap()).unwrap();
        assert!(user.password_hash.verify("password123").unwrap());
    }

    #[tokio::test]
    async fn register_rejects_blank_password() {
        let (server, _) = get_test_server();

        let response = server
            .post("/register")
            .json(&json!({"username": "trader", "password": ""}))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        response.assert_json(&json!({"password": ["This field may not be blank."]}));
    }

    #[tokio::test]
    async fn register_rejects_duplicate_username() {
        let (server, _) = get_test_server();
        let body = json!({"username": "trader", "password": "averysafeandsecurepassword"});
        server
            .post("/register")
            .json(&body)
            .await
            .assert_status(StatusCode::CREATED);

        let response = server.post("/register").json(&body).await;

        response.assert_status(StatusCode::CONFLICT);
        response.assert_json(&json!({"username": ["A user with that username already exists."]}));
    }

    #[tokio::test]
    async fn register_requires_username_and_password() {
        let (server, _) = get_test_server();

        let response = server.post("/register").json(&json!({})).await;

        response.assert_status(StatusCode::BAD_REQUEST);
        response.assert_json(&json!({
            "password": ["This field is required."],
            "username": ["This field is required."],
        }));
    }
}
