//! The log-in endpoint, which exchanges a username and password for tokens.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    Error, PasswordHash,
    app_state::AuthState,
    auth::{TokenType, issue_token},
    db::lock_connection,
    json::{ApiJson, INVALID_STRING_MESSAGE, JsonForm},
    user::{PublicUser, USERNAME_MAX_LENGTH, get_user_by_username},
    validation::{FieldErrors, required_text, required_untrimmed_text},
};

/// The credentials submitted to log in.
#[derive(Debug, Default, Deserialize)]
pub struct LogInForm {
    /// The name of the user logging in.
    pub username: Option<String>,
    /// The user's password in plain text.
    pub password: Option<String>,
}

impl JsonForm for LogInForm {
    fn invalid_value_message(_field: &str, _value: &Value) -> String {
        INVALID_STRING_MESSAGE.to_owned()
    }
}

/// A bcrypt hash at the default cost that unknown usernames are checked
/// against, so that they take as long to reject as wrong passwords.
const UNKNOWN_USER_PASSWORD_HASH: &str =
    "$2b$12$Gwf0uvxH3L7JLfo0CC/NCOoijK2vQ/wbgP.LeNup8vj6gg31IiFkm";

/// The tokens issued after a successful log-in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogInResponse {
    /// The token to send with API requests.
    pub access: String,
    /// The token to exchange for a new access token.
    pub refresh: String,
    /// The user the tokens were issued for.
    pub user: PublicUser,
}

/// Check the submitted credentials and respond with a pair of tokens.
///
/// An unknown username and a wrong password get the same response.
///
/// # Errors
///
/// Returns [Error::InvalidFields] if the username or password is missing and
/// [Error::InvalidCredentials] if they do not match a user.
pub async fn log_in_endpoint(
    State(state): State<AuthState>,
    ApiJson(form): ApiJson<LogInForm>,
) -> Result<Json<LogInResponse>, Error> {
    let mut errors = FieldErrors::new();
    let username = required_text(&mut errors, "username", form.username, USERNAME_MAX_LENGTH);
    let password = required_untrimmed_text(&mut errors, "password", form.password);
    errors.into_result(())?;

    let user = {
        let connection = lock_connection(&state.db_connection)?;
        match get_user_by_username(&username, &connection) {
            Ok(user) => Some(user),
            Err(Error::NotFound) => None,
            Err(error) => return Err(error),
        }
    };

    let unknown_user_hash = PasswordHash::new_unchecked(UNKNOWN_USER_PASSWORD_HASH);
    let password_hash = user
        .as_ref()
        .map_or(&unknown_user_hash, |user| &user.password_hash);
    let is_password_correct = password_hash
        .verify(&password)
        .map_err(|error| Error::HashingError(error.to_string()))?;

    let Some(user) = user.filter(|_| is_password_correct) else {
        tracing::debug!("Rejected log-in attempt for {username}");
        return Err(Error::InvalidCredentials);
    };

    let access = issue_token(
        &user,
        TokenType::Access,
        &state.jwt_keys,
        state.access_token_duration,
    )?;
    let refresh = issue_token(
        &user,
        TokenType::Refresh,
        &state.jwt_keys,
        state.refresh_token_duration,
    )?;
    tracing::info!("User {} logged in", user.id);

    Ok(Json(LogInResponse {
        access,
        refresh,
        user: PublicUser::from(&user),
    }))
}

#[cfg(test)]
mod log_in_tests {
    use axum::{Router, http::StatusCode, routing::post};
    use axum_test::TestServer;
    use serde_json::json;

    use crate::{
        AppState, PasswordHash, ValidatedPassword, create_user,
        auth::{LogInResponse, TokenType, decode_token, log_in_endpoint},
        test_utils::{TEST_PASSWORD_HASH_COST, get_test_app_state},
    };

    use super::UNKNOWN_USER_PASSWORD_HASH;

    const PASSWORD: &str = "averysafeandsecurepassword";

    fn get_test_server() -> (TestServer, AppState) {
        let state = get_test_app_state();
        create_user(
            "trader",
            PasswordHash::new(
                ValidatedPassword::new_unchecked(PASSWORD),
                TEST_PASSWORD_HASH_COST,
            )
            .unwrap(),
            &state.db_connection.lock().unwrap(),
        )
        .unwrap();

        let app = Router::new()
            .route("/log_in", post(log_in_endpoint))
            .with_state(state.clone());

        (
            TestServer::try_new(app).expect("Could not create test server."),
            state,
        )
    }

    #[tokio::test]
    async fn log_in_succeeds_with_valid_credentials() {
        let (server, state) = get_test_server();

        let response = server
            .post("/log_in")
            .json(&json!({"username": "trader", "password": PASSWORD}))
            .await;

        response.assert_status_ok();
        let body = response.json::<LogInResponse>();
        assert_eq!(body.user.username, "trader");
        let access = decode_token(&body.access, TokenType::Access, &state.jwt_keys).unwrap();
        assert_eq!(access.sub, body.user.id);
        let refresh = decode_token(&body.refresh, TokenType::Refresh, &state.jwt_keys).unwrap();
        assert_eq!(refresh.sub, body.user.id);
    }

    #[tokio::test]
    async fn log_in_fails_with_wrong_password() {
        let (server, _) = get_test_server();

        let response = server
            .post("/log_in")
            .json(&json!({"username": "trader", "password": "definitelyNotTheCorrectPassword"}))
            .await;

        response.assert_status(StatusCode::UNAUTHORIZED);
        response.assert_json(&json!({"detail": "Invalid credentials"}));
    }

    #[tokio::test]
    async fn log_in_fails_with_unknown_user() {
        let (server, _) = get_test_server();

        let response = server
            .post("/log_in")
            .json(&json!({"username": "nobody", "password": PASSWORD}))
            .await;

        response.assert_status(StatusCode::UNAUTHORIZED);
        response.assert_json(&json!({"detail": "Invalid credentials"}));
    }

    #[tokio::test]
    async fn log_in_fails_with_missing_credentials() {
        let (server, _) = get_test_server();

        let response = server.post("/log_in").json(&json!({})).await;

        response.assert_status(StatusCode::BAD_REQUEST);
        response.assert_json(&json!({
            "password": ["This field is required."],
            "username": ["This field is required."],
        }));
    }

    #[tokio::test]
    async fn unknown_user_is_rejected_with_the_password_of_the_stand_in_hash() {
        let (server, _) = get_test_server();

        let response = server
            .post("/log_in")
            .json(&json!({"username": "nobody", "password": "okon"}))
            .await;

        response.assert_status(StatusCode::UNAUTHORIZED);
        response.assert_json(&json!({"detail": "Invalid credentials"}));
    }

    #[test]
    fn stand_in_hash_costs_as_much_as_new_passwords() {
        let prefix = format!("$2b${}$", PasswordHash::DEFAULT_COST);

        assert!(UNKNOWN_USER_PASSWORD_HASH.starts_with(&prefix));
        assert!(matches!(
            PasswordHash::new_unchecked(UNKNOWN_USER_PASSWORD_HASH).verify("anything"),
            Ok(false)
        ));
    }
}
