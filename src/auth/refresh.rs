//! Exchanging a refresh token for a new access token.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    Error,
    app_state::AuthState,
    auth::{TokenType, decode_token, issue_token},
    db::lock_connection,
    json::{ApiJson, INVALID_STRING_MESSAGE, JsonForm},
    user::get_user_by_id,
    validation::{FieldErrors, REQUIRED_MESSAGE},
};

/// The body of a token refresh request.
#[derive(Debug, Default, Deserialize)]
pub struct RefreshForm {
    /// The refresh token issued at log-in.
    pub refresh: Option<String>,
}

impl JsonForm for RefreshForm {
    fn invalid_value_message(_field: &str, _value: &Value) -> String {
        INVALID_STRING_MESSAGE.to_owned()
    }
}

/// A freshly issued access token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefreshResponse {
    /// The new access token.
    pub access: String,
}

/// Issue a new access token for the holder of a valid refresh token.
///
/// # Errors
///
/// Returns [Error::InvalidToken] if the refresh token is invalid, expired,
/// an access token, or belongs to a user that no longer exists.
pub async fn refresh_token_endpoint(
    State(state): State<AuthState>,
    ApiJson(form): ApiJson<RefreshForm>,
) -> Result<Json<RefreshResponse>, Error> {
    let Some(refresh) = form.refresh else {
        return Err(FieldErrors::single("refresh", REQUIRED_MESSAGE).into());
    };

    let claims = decode_token(&refresh, TokenType::Refresh, &state.jwt_keys)?;

    let user = {
        let connection = lock_connection(&state.db_connection)?;
        get_user_by_id(claims.sub, &connection).map_err(|error| match error {
            Error::NotFound => Error::InvalidToken,
            error => error,
        })?
    };

    let access = issue_token(
        &user,
        TokenType::Access,
        &state.jwt_keys,
        state.access_token_duration,
    )?;

    Ok(Json(RefreshResponse { access }))
}
