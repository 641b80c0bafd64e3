use crate::schema::{EntityId, FieldId, Schema};
use crate::{Error, Result};

/// An ordered walk through the entity graph.
///
/// The first key is the identifier field of the leading entity; every
/// later key is a foreign key owned by the entity the path has reached,
/// pointing at the next. A path never revisits an entity.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyPath {
    keys: Vec<FieldId>,
    entities: Vec<EntityId>,
}

impl KeyPath {
    pub fn new(schema: &Schema, keys: Vec<FieldId>) -> Result<KeyPath> {
        let Some(first) = keys.first() else {
            return Err(Error::invalid_schema("path must contain at least one key"));
        };
        if schema.id_field(first.entity) != *first {
            return Err(Error::invalid_schema(format!(
                "path must start at an identifier, not `{}`",
                schema.field(*first).name
            )));
        }

        let mut entities = vec![first.entity];
        for key in &keys[1..] {
            let field = schema.field(*key);
            let Some(fk) = field.as_foreign_key() else {
                return Err(Error::invalid_schema(format!(
                    "path key `{}` is not a foreign key",
                    field.name
                )));
            };
            if key.entity != *entities.last().unwrap() {
                return Err(Error::invalid_schema(format!(
                    "path key `{}` is not owned by the entity the path reached",
                    field.name
                )));
            }
            if entities.contains(&fk.target) {
                return Err(Error::invalid_schema(format!(
                    "path revisits `{}`",
                    schema.entity(fk.target).name
                )));
            }
            entities.push(fk.target);
        }

        Ok(KeyPath { keys, entities })
    }

    /// The length-one path of a single entity.
    pub fn from_entity(schema: &Schema, entity: impl Into<EntityId>) -> KeyPath {
        let entity = entity.into();
        KeyPath {
            keys: vec![schema.id_field(entity)],
            entities: vec![entity],
        }
    }

    /// Assembles a path already validated by graph traversal.
    pub(crate) fn from_parts(keys: Vec<FieldId>, entities: Vec<EntityId>) -> KeyPath {
        debug_assert_eq!(keys.len(), entities.len());
        KeyPath { keys, entities }
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn first(&self) -> FieldId {
        self.keys[0]
    }

    pub fn keys(&self) -> &[FieldId] {
        &self.keys
    }

    pub fn contains(&self, key: FieldId) -> bool {
        self.keys.contains(&key)
    }

    /// The entity the path starts from: the target of a query over it.
    pub fn leading_entity(&self) -> EntityId {
        self.entities[0]
    }

    /// The entities the path traverses, in order.
    pub fn entities(&self) -> &[EntityId] {
        &self.entities
    }

    pub fn contains_entity(&self, entity: impl Into<EntityId>) -> bool {
        self.entities.contains(&entity.into())
    }

    /// Diagnostic form: the leading entity followed by the keys walked,
    /// e.g. `Tweet.User`.
    pub fn display(&self, schema: &Schema) -> String {
        let mut out = schema.entity(self.leading_entity()).name.clone();
        for key in &self.keys[1..] {
            out.push('.');
            out.push_str(&schema.field(*key).name);
        }
        out
    }
}
