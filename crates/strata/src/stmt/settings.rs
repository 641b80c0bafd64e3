use super::{qualified_name, Value};
use crate::schema::{EntityId, FieldId, Schema};
use crate::{Error, Result};

use std::collections::BTreeSet;

/// A field/value pair a write statement supplies.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldSetting {
    pub field: FieldId,
    pub value: Value,
}

impl FieldSetting {
    pub fn new(field: impl Into<FieldId>, value: impl Into<Value>) -> FieldSetting {
        FieldSetting {
            field: field.into(),
            value: value.into(),
        }
    }
}

/// Ordered setting storage for a single target entity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Settings {
    settings: Vec<FieldSetting>,
}

impl Settings {
    /// Validates that every setting targets a primitive field of `entity`,
    /// at most once.
    pub(crate) fn from_vec(
        schema: &Schema,
        entity: EntityId,
        settings: Vec<FieldSetting>,
    ) -> Result<Settings> {
        for (i, setting) in settings.iter().enumerate() {
            if setting.field.entity != entity {
                return Err(Error::invalid_statement(format!(
                    "setting for `{}` does not target entity `{}`",
                    qualified_name(schema, setting.field),
                    schema.entity(entity).name
                )));
            }
            if !schema.field(setting.field).is_primitive() {
                return Err(Error::invalid_statement(format!(
                    "cannot set foreign key `{}` directly; connect instead",
                    qualified_name(schema, setting.field)
                )));
            }
            if settings[..i].iter().any(|s| s.field == setting.field) {
                return Err(Error::invalid_statement(format!(
                    "duplicate setting for `{}`",
                    qualified_name(schema, setting.field)
                )));
            }
        }
        Ok(Settings { settings })
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldSetting> {
        self.settings.iter()
    }

    pub fn fields(&self) -> impl Iterator<Item = FieldId> + '_ {
        self.settings.iter().map(|setting| setting.field)
    }

    pub fn field_set(&self) -> BTreeSet<FieldId> {
        self.fields().collect()
    }

    pub fn contains(&self, field: impl Into<FieldId>) -> bool {
        let field = field.into();
        self.settings.iter().any(|setting| setting.field == field)
    }

    pub fn len(&self) -> usize {
        self.settings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.settings.is_empty()
    }
}
