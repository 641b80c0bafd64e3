use super::{Builder, Entity, EntityId, Field, FieldId};

use indexmap::IndexMap;

/// The logical entity-relationship model. Immutable once built; all
/// planning reads through it.
#[derive(Debug, Default)]
pub struct Schema {
    pub entities: IndexMap<EntityId, Entity>,
}

impl Schema {
    pub fn builder() -> Builder {
        Builder::default()
    }

    /// Get an entity by ID
    pub fn entity(&self, id: impl Into<EntityId>) -> &Entity {
        self.entities.get(&id.into()).expect("invalid entity ID")
    }

    pub fn entity_by_name(&self, name: &str) -> Option<&Entity> {
        self.entities.values().find(|entity| entity.name == name)
    }

    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values()
    }

    /// Get a field by ID
    pub fn field(&self, id: FieldId) -> &Field {
        self.entity(id.entity)
            .fields
            .get(id.index)
            .expect("invalid field ID")
    }

    /// The identifier field of the given entity.
    pub fn id_field(&self, entity: impl Into<EntityId>) -> FieldId {
        self.entity(entity).id_field().id
    }

    /// Resolve a foreign key's reverse: the paired key on the target
    /// entity, walking the relation against its declared direction.
    ///
    /// # Panics
    ///
    /// Panics if `key` is not a foreign-key field.
    #[track_caller]
    pub fn reverse(&self, key: FieldId) -> FieldId {
        self.field(key).expect_foreign_key().pair
    }
}
