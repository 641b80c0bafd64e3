use super::{Entity, EntityId, FieldId, Schema};

/// A foreign key linking its owning entity to a target entity.
#[derive(Debug, Clone)]
pub struct ForeignKey {
    /// The entity the key points at
    pub target: EntityId,

    /// The reverse key field on the target entity, linked by the builder
    pub pair: FieldId,
}

impl ForeignKey {
    pub fn target<'a>(&self, schema: &'a Schema) -> &'a Entity {
        schema.entity(self.target)
    }

    pub(crate) fn is_placeholder(&self) -> bool {
        self.pair == FieldId::placeholder()
    }
}
