//! Registration, log-in and the bearer token checks that protect the API.

mod log_in;
mod middleware;
mod refresh;
mod register;
mod token;

pub use log_in::{LogInForm, LogInResponse, log_in_endpoint};
pub use middleware::auth_guard;
pub use refresh::{RefreshForm, RefreshResponse, refresh_token_endpoint};
pub use register::{RegisterForm, register_endpoint};
pub use token::{Claims, TokenType, decode_token, issue_token};
