//! Database operations for materials.

use rusqlite::{Connection, Row};

use crate::{
    Error,
    material::{Material, MaterialId, NewMaterial},
};

/// Create a material and return it with its generated ID.
///
/// # Errors
///
/// Returns [Error::DuplicateMaterialName] if a material with the same name exists.
pub fn create_material(material: NewMaterial, connection: &Connection) -> Result<Material, Error> {
    connection.execute(
        "INSERT INTO material (name, color) VALUES (?1, ?2);",
        (&material.name, &material.color),
    )?;

    let id = connection.last_insert_rowid();

    Ok(Material {
        id,
        name: material.name,
        color: material.color,
    })
}

/// Retrieve a single material by ID.
pub fn get_material(material_id: MaterialId, connection: &Connection) -> Result<Material, Error> {
    connection
        .prepare("SELECT id, name, color FROM material WHERE id = :id;")?
        .query_row(&[(":id", &material_id)], map_row)
        .map_err(|error| error.into())
}

/// Retrieve all materials ordered alphabetically by name.
pub fn get_all_materials(connection: &Connection) -> Result<Vec<Material>, Error> {
    connection
        .prepare("SELECT id, name, color FROM material ORDER BY name ASC;")?
        .query_map([], map_row)?
        .map(|maybe_material| maybe_material.map_err(|error| error.into()))
        .collect()
}

/// Overwrite a material's fields. Returns an error if the material doesn't exist.
pub fn update_material(
    material_id: MaterialId,
    material: NewMaterial,
    connection: &Connection,
) -> Result<Material, Error> {
    let rows_affected = connection.execute(
        "UPDATE material SET name = ?1, color = ?2 WHERE id = ?3",
        (&material.name, &material.color, material_id),
    )?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(Material {
        id: material_id,
        name: material.name,
        color: material.color,
    })
}

/// Delete a material by ID. Returns an error if the material doesn't exist.
///
/// Transactions that referenced the material are kept with the reference cleared.
pub fn delete_material(material_id: MaterialId, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute("DELETE FROM material WHERE id = ?1", [material_id])?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}

/// Initialize the material table.
pub fn create_material_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS material (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL UNIQUE,
            color TEXT
        );",
    )?;

    Ok(())
}

fn map_row(row: &Row) -> Result<Material, rusqlite::Error> {
    Ok(Material {
        id: row.get(0)?,
        name: row.get(1)?,
        color: row.get(2)?,
    })
}
