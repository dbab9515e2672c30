use crate::model::{Association, FieldType, ModelId, Reflection};
use std::collections::BTreeMap;
use thiserror::Error as ThisError;

///
/// ModelDef
///
/// Runtime description of one model: its default table, typed fields and
/// named associations.
///

#[derive(Clone, Debug, Default)]
pub struct ModelDef {
    source: String,
    fields: BTreeMap<String, FieldType>,
    associations: BTreeMap<String, Association>,
}

impl ModelDef {
    #[must_use]
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn field(mut self, name: impl Into<String>, ty: FieldType) -> Self {
        self.fields.insert(name.into(), ty);
        self
    }

    #[must_use]
    pub fn association(mut self, name: impl Into<String>, assoc: Association) -> Self {
        self.associations.insert(name.into(), assoc);
        self
    }

    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }
}

///
/// Schema
///
/// In-memory `Reflection` implementation keyed by model id.
///

#[derive(Clone, Debug, Default)]
pub struct Schema {
    models: BTreeMap<ModelId, ModelDef>,
}

impl Schema {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn model(mut self, id: impl Into<ModelId>, def: ModelDef) -> Self {
        self.models.insert(id.into(), def);
        self
    }

    /// Check that every association points at a declared model and that both
    /// join keys exist on their respective sides.
    pub fn validate(&self) -> Result<(), SchemaError> {
        for (id, def) in &self.models {
            if def.source.is_empty() {
                return Err(SchemaError::EmptySource { model: id.clone() });
            }

            for (name, assoc) in &def.associations {
                let Some(related) = self.models.get(&assoc.related) else {
                    return Err(SchemaError::UnknownRelated {
                        model: id.clone(),
                        association: name.clone(),
                        related: assoc.related.clone(),
                    });
                };

                if !def.fields.contains_key(&assoc.owner_key) {
                    return Err(SchemaError::UnknownKey {
                        model: id.clone(),
                        association: name.clone(),
                        key: assoc.owner_key.clone(),
                    });
                }

                if !related.fields.contains_key(&assoc.assoc_key) {
                    return Err(SchemaError::UnknownKey {
                        model: assoc.related.clone(),
                        association: name.clone(),
                        key: assoc.assoc_key.clone(),
                    });
                }
            }
        }

        Ok(())
    }
}

impl Reflection for Schema {
    fn source(&self, model: &ModelId) -> Option<&str> {
        self.models.get(model).map(ModelDef::source)
    }

    fn field_type(&self, model: &ModelId, field: &str) -> Option<&FieldType> {
        self.models.get(model)?.fields.get(field)
    }

    fn association(&self, model: &ModelId, name: &str) -> Option<&Association> {
        self.models.get(model)?.associations.get(name)
    }
}

///
/// SchemaError
///
/// Inconsistencies detected in a hand-built schema.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum SchemaError {
    #[error("model '{model}' has an empty source table")]
    EmptySource { model: ModelId },

    #[error("association '{model}.{association}' points at unknown model '{related}'")]
    UnknownRelated {
        model: ModelId,
        association: String,
        related: ModelId,
    },

    #[error("association '{association}' references unknown key '{model}.{key}'")]
    UnknownKey {
        model: ModelId,
        association: String,
        key: String,
    },
}
