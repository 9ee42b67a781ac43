//! Core material domain types.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    DatabaseID,
    json::{INVALID_STRING_MESSAGE, JsonForm, deserialize_some},
    validation::{FieldErrors, WriteMode, optional_text, required_text},
};

/// Database identifier for a material.
pub type MaterialId = DatabaseID;

const NAME_MAX_LENGTH: usize = 100;
const COLOR_MAX_LENGTH: usize = 50;

/// A raw material that is traded, e.g. 'Copper wire'.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Material {
    /// The ID of the material.
    pub id: MaterialId,
    /// The unique name of the material.
    pub name: String,
    /// The colour or a short description of the material.
    pub color: Option<String>,
}

/// A validated material that is ready to be written to the database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMaterial {
    /// The trimmed, unique name.
    pub name: String,
    /// The trimmed colour, if any.
    pub color: Option<String>,
}

/// The JSON body for creating and updating materials.
#[derive(Debug, Default, Deserialize)]
pub struct MaterialForm {
    /// The submitted name, if any.
    pub name: Option<String>,
    /// `Some(None)` clears the colour.
    #[serde(default, deserialize_with = "deserialize_some")]
    pub color: Option<Option<String>>,
}

impl JsonForm for MaterialForm {
    fn invalid_value_message(_field: &str, _value: &Value) -> String {
        INVALID_STRING_MESSAGE.to_owned()
    }
}

/// A material that has not been validated yet.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MaterialDraft {
    /// The name to validate.
    pub name: Option<String>,
    /// The colour to validate.
    pub color: Option<String>,
}

impl From<Material> for MaterialDraft {
    fn from(material: Material) -> Self {
        Self {
            name: Some(material.name),
            color: material.color,
        }
    }
}

impl MaterialForm {
    /// Apply the submitted fields to `draft`.
    pub fn merge(self, draft: MaterialDraft, mode: WriteMode) -> MaterialDraft {
        MaterialDraft {
            name: mode.required(self.name, draft.name),
            color: self.color.unwrap_or(draft.color),
        }
    }
}

impl MaterialDraft {
    /// Check the field constraints of a material.
    ///
    /// # Errors
    ///
    /// Returns the problems with each invalid field.
    pub fn validate(self) -> Result<NewMaterial, FieldErrors> {
        let mut errors = FieldErrors::new();

        let name = required_text(&mut errors, "name", self.name, NAME_MAX_LENGTH);
        let color = optional_text(&mut errors, "color", self.color, COLOR_MAX_LENGTH);

        errors.into_result(NewMaterial { name, color })
    }
}
