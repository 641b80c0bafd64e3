use super::{Field, FieldId};
use std::fmt;

#[derive(Debug, Clone)]
pub struct Entity {
    /// Uniquely identifies the entity within the schema
    pub id: EntityId,

    /// The entity name
    pub name: String,

    /// Fields contained by the entity, declared fields first, then any
    /// reverse keys materialized by the builder.
    pub fields: Vec<Field>,

    /// Position in `fields` of the primary identifier
    pub id_index: usize,
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntityId(pub usize);

impl Entity {
    /// The entity's primary identifier field.
    pub fn id_field(&self) -> &Field {
        &self.fields[self.id_index]
    }

    pub fn field(&self, field: impl Into<FieldId>) -> &Field {
        let field_id = field.into();
        assert_eq!(self.id, field_id.entity);
        &self.fields[field_id.index]
    }

    pub fn field_by_name(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|field| field.name == name)
    }
}

impl From<&Entity> for EntityId {
    fn from(value: &Entity) -> Self {
        value.id
    }
}

impl From<&Self> for EntityId {
    fn from(src: &Self) -> Self {
        *src
    }
}

impl fmt::Debug for EntityId {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(fmt, "EntityId({})", self.0)
    }
}
