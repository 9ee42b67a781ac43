//! The catalog of raw materials that are bought and sold.

mod db;
mod domain;
mod handlers;

pub use db::{
    create_material, create_material_table, delete_material, get_all_materials, get_material,
    update_material,
};
pub use domain::{Material, MaterialDraft, MaterialForm, MaterialId, NewMaterial};
pub use handlers::{
    create_material_endpoint, delete_material_endpoint, get_material_endpoint,
    list_materials_endpoint, patch_material_endpoint, replace_material_endpoint,
};
