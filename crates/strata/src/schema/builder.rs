use super::{Entity, EntityId, Field, FieldId, FieldTy, ForeignKey, ScalarTy, Schema};
use crate::{Error, Result};

use indexmap::IndexMap;

/// Assembles a [`Schema`], materializing reverse keys and linking each
/// foreign key to its pair.
#[derive(Default)]
pub struct Builder {
    entities: Vec<EntityBuilder>,
}

pub struct EntityBuilder {
    name: String,
    fields: Vec<FieldDef>,
}

enum FieldDef {
    Primitive {
        name: String,
        ty: ScalarTy,
        identifier: bool,
    },
    ForeignKey {
        name: String,
        target: String,
        reverse: String,
    },
}

impl Builder {
    /// Declare an entity. Fields are added through the returned handle.
    pub fn entity(&mut self, name: impl Into<String>) -> &mut EntityBuilder {
        self.entities.push(EntityBuilder {
            name: name.into(),
            fields: vec![],
        });
        self.entities.last_mut().unwrap()
    }

    pub fn build(self) -> Result<Schema> {
        // Entity names must be unique before anything can be resolved.
        for (i, entity) in self.entities.iter().enumerate() {
            if self.entities[..i].iter().any(|e| e.name == entity.name) {
                return Err(Error::invalid_schema(format!(
                    "duplicate entity `{}`",
                    entity.name
                )));
            }
        }

        let entity_id = |name: &str| {
            self.entities
                .iter()
                .position(|entity| entity.name == name)
                .map(EntityId)
        };

        // First pass: create each entity with its declared fields. Foreign
        // keys get a placeholder pair until the linking pass below.
        let mut entities = Vec::with_capacity(self.entities.len());
        for (i, decl) in self.entities.iter().enumerate() {
            let id = EntityId(i);
            let mut fields: Vec<Field> = Vec::with_capacity(decl.fields.len());
            let mut id_index = None;

            for def in &decl.fields {
                let (name, ty) = match def {
                    FieldDef::Primitive {
                        name,
                        ty,
                        identifier,
                    } => {
                        if *identifier {
                            if id_index.is_some() {
                                return Err(Error::invalid_schema(format!(
                                    "entity `{}` declares more than one identifier",
                                    decl.name
                                )));
                            }
                            id_index = Some(fields.len());
                        }
                        (name, FieldTy::Primitive(*ty))
                    }
                    FieldDef::ForeignKey { name, target, .. } => {
                        let target = entity_id(target).ok_or_else(|| {
                            Error::invalid_schema(format!(
                                "foreign key `{}.{}` references undeclared entity `{}`",
                                decl.name, name, target
                            ))
                        })?;

                        (
                            name,
                            FieldTy::ForeignKey(ForeignKey {
                                target,
                                pair: FieldId::placeholder(),
                            }),
                        )
                    }
                };

                if fields.iter().any(|field| &field.name == name) {
                    return Err(Error::invalid_schema(format!(
                        "duplicate field `{}.{}`",
                        decl.name, name
                    )));
                }

                fields.push(Field {
                    id: FieldId {
                        entity: id,
                        index: fields.len(),
                    },
                    name: name.clone(),
                    ty,
                });
            }

            let Some(id_index) = id_index else {
                return Err(Error::invalid_schema(format!(
                    "entity `{}` has no identifier field",
                    decl.name
                )));
            };

            entities.push(Entity {
                id,
                name: decl.name.clone(),
                fields,
                id_index,
            });
        }

        // Second pass: materialize the reverse key for every declared
        // foreign key on its target entity and link the pairs.
        for (i, decl) in self.entities.iter().enumerate() {
            for (index, def) in decl.fields.iter().enumerate() {
                let FieldDef::ForeignKey { name, reverse, .. } = def else {
                    continue;
                };

                let forward = FieldId {
                    entity: EntityId(i),
                    index,
                };
                let target = entities[i].fields[index].expect_foreign_key().target;

                if entities[target.0]
                    .fields
                    .iter()
                    .any(|field| &field.name == reverse)
                {
                    return Err(Error::invalid_schema(format!(
                        "reverse key `{}.{}` for `{}.{}` collides with an existing field",
                        entities[target.0].name, reverse, decl.name, name
                    )));
                }

                let pair = FieldId {
                    entity: target,
                    index: entities[target.0].fields.len(),
                };
                entities[target.0].fields.push(Field {
                    id: pair,
                    name: reverse.clone(),
                    ty: FieldTy::ForeignKey(ForeignKey {
                        target: EntityId(i),
                        pair: forward,
                    }),
                });

                entities[i].fields[index]
                    .ty
                    .expect_foreign_key_mut()
                    .pair = pair;
            }
        }

        debug_assert!(entities
            .iter()
            .flat_map(|entity| entity.fields.iter())
            .filter_map(|field| field.as_foreign_key())
            .all(|fk| !fk.is_placeholder()));

        Ok(Schema {
            entities: entities
                .into_iter()
                .map(|entity| (entity.id, entity))
                .collect::<IndexMap<_, _>>(),
        })
    }
}

impl EntityBuilder {
    /// Declare the entity's primary identifier field.
    pub fn id(&mut self, name: impl Into<String>, ty: ScalarTy) -> &mut Self {
        self.fields.push(FieldDef::Primitive {
            name: name.into(),
            ty,
            identifier: true,
        });
        self
    }

    /// Declare a data field.
    pub fn field(&mut self, name: impl Into<String>, ty: ScalarTy) -> &mut Self {
        self.fields.push(FieldDef::Primitive {
            name: name.into(),
            ty,
            identifier: false,
        });
        self
    }

    /// Declare a foreign key to `target`. The builder materializes the
    /// reverse key on the target entity under `reverse`.
    pub fn foreign_key(
        &mut self,
        name: impl Into<String>,
        target: impl Into<String>,
        reverse: impl Into<String>,
    ) -> &mut Self {
        self.fields.push(FieldDef::ForeignKey {
            name: name.into(),
            target: target.into(),
            reverse: reverse.into(),
        });
        self
    }
}
