//! The paths of the REST API.

/// The route for registering a new user.
pub const REGISTER: &str = "/api/register";
/// The route for exchanging a username and password for tokens.
pub const LOG_IN: &str = "/api/login";
/// The route for exchanging a refresh token for a new access token.
pub const REFRESH_TOKEN: &str = "/api/token/refresh";

/// The route to access starting capital.
pub const STARTING_CAPITAL: &str = "/api/startingcapital";
/// The route to access a single starting capital record.
pub const STARTING_CAPITAL_ITEM: &str = "/api/startingcapital/{starting_capital_id}";
/// The route to access materials.
pub const MATERIALS: &str = "/api/materials";
/// The route to access a single material.
pub const MATERIAL: &str = "/api/materials/{material_id}";
/// The route to access customers.
pub const CUSTOMERS: &str = "/api/customers";
/// The route to access a single customer.
pub const CUSTOMER: &str = "/api/customers/{customer_id}";
/// The route to access expenses.
pub const EXPENSES: &str = "/api/expenses";
/// The route to access a single expense.
pub const EXPENSE: &str = "/api/expenses/{expense_id}";
/// The route to access transactions.
pub const TRANSACTIONS: &str = "/api/transactions";
/// The route to access a single transaction.
pub const TRANSACTION: &str = "/api/transactions/{transaction_id}";

/// Replace the parameter in `endpoint_path` with `id`.
///
/// A parameter is a string that starts with a left brace, followed by
/// lowercase letters or underscores, and ends with a right brace.
/// For example, in the endpoint path '/users/{user_id}', '{user_id}' is the parameter.
///
/// This function assumes that an endpoint path only contains ASCII characters
/// and a single parameter.
///
/// If no parameter is found in `endpoint_path`, the function returns the
/// the original `endpoint_path`.
#[cfg(test)]
pub fn format_endpoint(endpoint_path: &str, id: i64) -> String {
    let mut param_start = None;
    let mut param_end = None;

    for (i, c) in endpoint_path.chars().enumerate() {
        if c == '{' {
            param_start = Some(i);
        } else if param_start.is_some() && c == '}' {
            param_end = Some(i + 1);
            break;
        }
    }

    let param_start = match param_start {
        Some(start) => start,
        None => return endpoint_path.to_string(),
    };

    let param_end = param_end.unwrap_or(endpoint_path.len());

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        id,
        &endpoint_path[param_end..]
    )
}
