//! Authentication middleware that checks the bearer token on protected routes.

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::headers::{Authorization, HeaderMapExt, authorization::Bearer};

use crate::{
    Error,
    app_state::AuthState,
    auth::{TokenType, decode_token},
};

/// Middleware function that checks for a valid access token in the
/// `Authorization: Bearer` header.
///
/// The token's [crate::auth::Claims] are placed into the request extensions
/// and the request executed normally if the token is valid, otherwise a 401
/// response is returned.
///
/// **Note**: Route handlers can use the function argument
/// `Extension(claims): Extension<Claims>` to receive the claims.
pub async fn auth_guard(
    State(state): State<AuthState>,
    mut request: Request,
    next: Next,
) -> Response {
    if !request.headers().contains_key(AUTHORIZATION) {
        return Error::MissingToken.into_response();
    }

    let Some(Authorization(bearer)) = request.headers().typed_get::<Authorization<Bearer>>()
    else {
        tracing::debug!("Authorization header is not a bearer token");
        return Error::InvalidToken.into_response();
    };

    match decode_token(bearer.token(), TokenType::Access, &state.jwt_keys) {
        Ok(claims) => {
            request.extensions_mut().insert(claims);
            next.run(request).await
        }
        Err(error) => error.into_response(),
    }
}
