//! The REST endpoints for starting capital.

use axum::{Json, extract::State, http::StatusCode};

use crate::{
    Error,
    app_state::DbState,
    db::lock_connection,
    json::ApiJson,
    path::ApiPath,
    starting_capital::{
        StartingCapital, StartingCapitalDraft, StartingCapitalForm, StartingCapitalId,
        create_starting_capital, delete_starting_capital, get_all_starting_capital,
        get_starting_capital, update_starting_capital,
    },
    validation::WriteMode,
};

/// List all starting capital in the order it was recorded.
pub async fn list_starting_capital_endpoint(
    State(state): State<DbState>,
) -> Result<Json<Vec<StartingCapital>>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    get_all_starting_capital(&connection).map(Json)
}

/// Get a single starting capital record.
pub async fn get_starting_capital_endpoint(
    ApiPath(starting_capital_id): ApiPath<StartingCapitalId>,
    State(state): State<DbState>,
) -> Result<Json<StartingCapital>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    get_starting_capital(starting_capital_id, &connection).map(Json)
}

/// Record starting capital, responding with 201 and the new record.
pub async fn create_starting_capital_endpoint(
    State(state): State<DbState>,
    ApiJson(form): ApiJson<StartingCapitalForm>,
) -> Result<(StatusCode, Json<StartingCapital>), Error> {
    let new_starting_capital = form
        .merge(StartingCapitalDraft::default(), WriteMode::Full)
        .validate()?;

    let connection = lock_connection(&state.db_connection)?;
    let starting_capital = create_starting_capital(new_starting_capital, &connection)?;
    tracing::debug!("Created starting capital {}", starting_capital.id);

    Ok((StatusCode::CREATED, Json(starting_capital)))
}

/// Replace all the fields of a starting capital record.
pub async fn replace_starting_capital_endpoint(
    ApiPath(starting_capital_id): ApiPath<StartingCapitalId>,
    State(state): State<DbState>,
    ApiJson(form): ApiJson<StartingCapitalForm>,
) -> Result<Json<StartingCapital>, Error> {
    apply_update(starting_capital_id, form, WriteMode::Full, &state).map(Json)
}

/// Update only the submitted fields of a starting capital record.
pub async fn patch_starting_capital_endpoint(
    ApiPath(starting_capital_id): ApiPath<StartingCapitalId>,
    State(state): State<DbState>,
    ApiJson(form): ApiJson<StartingCapitalForm>,
) -> Result<Json<StartingCapital>, Error> {
    apply_update(starting_capital_id, form, WriteMode::Partial, &state).map(Json)
}

/// Delete a starting capital record, responding with 204.
pub async fn delete_starting_capital_endpoint(
    ApiPath(starting_capital_id): ApiPath<StartingCapitalId>,
    State(state): State<DbState>,
) -> Result<StatusCode, Error> {
    let connection = lock_connection(&state.db_connection)?;
    delete_starting_capital(starting_capital_id, &connection)?;

    Ok(StatusCode::NO_CONTENT)
}

fn apply_update(
    starting_capital_id: StartingCapitalId,
    form: StartingCapitalForm,
    mode: WriteMode,
    state: &DbState,
) -> Result<StartingCapital, Error> {
    let connection = lock_connection(&state.db_connection)?;
    let stored = get_starting_capital(starting_capital_id, &connection)?;

    let changes = form
        .merge(StartingCapitalDraft::from(stored), mode)
        .validate()?;

    update_starting_capital(starting_capital_id, changes, &connection)
}
