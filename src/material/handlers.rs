//! The REST endpoints for materials.

use axum::{Json, extract::State, http::StatusCode};

use crate::{
    Error,
    app_state::DbState,
    db::lock_connection,
    json::ApiJson,
    path::ApiPath,
    material::{
        Material, MaterialDraft, MaterialForm, MaterialId, create_material, delete_material,
        get_all_materials, get_material, update_material,
    },
    validation::WriteMode,
};

/// List all materials ordered by name.
pub async fn list_materials_endpoint(
    State(state): State<DbState>,
) -> Result<Json<Vec<Material>>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    get_all_materials(&connection).map(Json)
}

/// Get a single material.
pub async fn get_material_endpoint(
    ApiPath(material_id): ApiPath<MaterialId>,
    State(state): State<DbState>,
) -> Result<Json<Material>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    get_material(material_id, &connection).map(Json)
}

/// Create a material, responding with 201 and the new material.
pub async fn create_material_endpoint(
    State(state): State<DbState>,
    ApiJson(form): ApiJson<MaterialForm>,
) -> Result<(StatusCode, Json<Material>), Error> {
    let new_material = form
        .merge(MaterialDraft::default(), WriteMode::Full)
        .validate()?;

    let connection = lock_connection(&state.db_connection)?;
    let material = create_material(new_material, &connection)?;
    tracing::debug!("Created material {}", material.id);

    Ok((StatusCode::CREATED, Json(material)))
}

/// Replace all the fields of a material.
pub async fn replace_material_endpoint(
    ApiPath(material_id): ApiPath<MaterialId>,
    State(state): State<DbState>,
    ApiJson(form): ApiJson<MaterialForm>,
) -> Result<Json<Material>, Error> {
    apply_update(material_id, form, WriteMode::Full, &state).map(Json)
}

/// Update only the submitted fields of a material.
pub async fn patch_material_endpoint(
    ApiPath(material_id): ApiPath<MaterialId>,
    State(state): State<DbState>,
    ApiJson(form): ApiJson<MaterialForm>,
) -> Result<Json<Material>, Error> {
    apply_update(material_id, form, WriteMode::Partial, &state).map(Json)
}

/// Delete a material, responding with 204.
///
/// Transactions for the material are kept and no longer refer to a material.
pub async fn delete_material_endpoint(
    ApiPath(material_id): ApiPath<MaterialId>,
    State(state): State<DbState>,
) -> Result<StatusCode, Error> {
    let connection = lock_connection(&state.db_connection)?;
    delete_material(material_id, &connection)?;

    Ok(StatusCode::NO_CONTENT)
}

fn apply_update(
    material_id: MaterialId,
    form: MaterialForm,
    mode: WriteMode,
    state: &DbState,
) -> Result<Material, Error> {
    let connection = lock_connection(&state.db_connection)?;
    let stored = get_material(material_id, &connection)?;

    let changes = form.merge(MaterialDraft::from(stored), mode).validate()?;

    update_material(material_id, changes, &connection)
}
