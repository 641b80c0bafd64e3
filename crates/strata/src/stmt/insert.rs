use super::support_query::{connections_cross_path, derive_support_query};
use super::{
    settings_clause, Condition, Conditions, FieldSetting, Settings, Statement, SupportQuery,
};
use crate::graph::EntityGraph;
use crate::schema::{EntityId, FieldId, Index, Schema};
use crate::{Error, Result};

use std::collections::BTreeSet;
use std::hash::{Hash, Hasher};

/// Creates a new entity instance, optionally connected to existing
/// instances of other entities through foreign keys.
#[derive(Debug, Clone)]
pub struct Insert {
    /// The entity receiving the new instance
    entity: EntityId,

    /// Sub-graph touched by the statement: the entity alone
    graph: EntityGraph,

    /// Values supplied for the new instance
    settings: Settings,

    /// Connection conditions: a foreign key bound to the identifier of an
    /// existing instance
    conditions: Conditions,
}

impl Insert {
    pub fn new(
        schema: &Schema,
        entity: impl Into<EntityId>,
        settings: Vec<FieldSetting>,
        connections: Vec<Condition>,
    ) -> Result<Insert> {
        let entity = entity.into();
        let settings = Settings::from_vec(schema, entity, settings)?;

        if !settings.contains(schema.id_field(entity)) {
            return Err(Error::invalid_statement(format!(
                "insert into `{}` must set its own identifier",
                schema.entity(entity).name
            )));
        }

        for condition in &connections {
            let field = schema.field(condition.field);
            if condition.field.entity != entity {
                return Err(Error::invalid_statement(format!(
                    "connection key `{}` is not a field of `{}`",
                    field.name,
                    schema.entity(entity).name
                )));
            }
            if !field.is_foreign_key() {
                return Err(Error::invalid_statement(format!(
                    "connection key `{}` is not a foreign key",
                    field.name
                )));
            }
            if !condition.op.is_eq() {
                return Err(Error::invalid_statement(format!(
                    "connection on `{}` must bind with `=`",
                    field.name
                )));
            }
        }
        let conditions = Conditions::from_vec(schema, connections)?;

        Ok(Insert {
            entity,
            graph: EntityGraph::single(entity),
            settings,
            conditions,
        })
    }

    pub fn entity(&self) -> EntityId {
        self.entity
    }

    pub fn graph(&self) -> &EntityGraph {
        &self.graph
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn conditions(&self) -> &Conditions {
        &self.conditions
    }

    /// Determines whether this insert modifies the given index.
    pub fn modifies_index(&self, schema: &Schema, index: &Index) -> bool {
        if self.modifies_single_entity_index(index) {
            return true;
        }
        if index.is_single_entity() || !index.path().contains_entity(self.entity) {
            return false;
        }

        // We must be connecting on some component of the path if the index
        // is going to pick up the new instance.
        connections_cross_path(schema, &self.conditions, index)
    }

    /// Inserts always write a new row.
    pub fn requires_insert(&self, _index: &Index) -> bool {
        true
    }

    /// There is no previous row to displace.
    pub fn requires_delete(&self, _index: &Index) -> bool {
        false
    }

    /// The settings' fields plus, per connection, the identifier of the
    /// connected instance.
    pub fn given_fields(&self, schema: &Schema) -> BTreeSet<FieldId> {
        let mut fields = self.settings.field_set();
        for condition in self.conditions.iter() {
            let fk = schema.field(condition.field).expect_foreign_key();
            fields.insert(schema.id_field(fk.target));
        }
        fields
    }

    /// Inserting into a multi-entity index requires reading the attributes
    /// of the related instances the new row joins against.
    pub fn support_queries(&self, schema: &Schema, index: &Index) -> Result<Vec<SupportQuery>> {
        if !self.modifies_index(schema, index) || self.modifies_single_entity_index(index) {
            return Ok(vec![]);
        }

        let mut select = index.all_fields().clone();
        for field in self.given_fields(schema) {
            select.remove(&field);
        }
        if select.is_empty() {
            return Ok(vec![]);
        }

        // Work on a private copy of the index graph, with one edge per
        // connection.
        let mut graph = index.graph().clone();
        for condition in self.conditions.iter() {
            let fk = schema.field(condition.field).expect_foreign_key();
            graph.add_edge(self.entity, fk.target, condition.field);
        }

        // Prune to exactly the entities owning a needed field.
        let owners: BTreeSet<EntityId> = select.iter().map(|field| field.entity).collect();
        let doomed: BTreeSet<EntityId> = graph
            .entities()
            .iter()
            .copied()
            .filter(|entity| !owners.contains(entity))
            .collect();
        graph.remove_nodes(&doomed);

        // Surviving connections become identifier equalities on the
        // connected entity.
        let translated = self.conditions.iter().filter_map(|condition| {
            let fk = schema.field(condition.field).expect_foreign_key();
            graph.contains(fk.target).then(|| {
                Condition::new(
                    schema.id_field(fk.target),
                    condition.op,
                    condition.value.clone(),
                )
            })
        });
        let conditions = Conditions::retaining_first(translated);

        let query = derive_support_query(
            schema,
            Statement::from(self.clone()),
            index,
            graph,
            select,
            conditions,
        )?;
        Ok(vec![query])
    }

    /// Diagnostic text form.
    pub fn unparse(&self, schema: &Schema) -> String {
        let mut out = format!(
            "INSERT INTO {} {}",
            schema.entity(self.entity).name,
            settings_clause(schema, &self.settings)
        );

        if !self.conditions.is_empty() {
            let connections: Vec<String> = self
                .conditions
                .iter()
                .map(|condition| {
                    let value = match &condition.value {
                        Some(value) => value.to_string(),
                        None => "?".to_string(),
                    };
                    format!("{}({})", schema.field(condition.field).name, value)
                })
                .collect();
            out.push_str(" AND CONNECT TO ");
            out.push_str(&connections.join(", "));
        }

        out
    }

    /// A single-entity index over this entity is modified whenever the
    /// settings land in it; no connection is needed.
    fn modifies_single_entity_index(&self, index: &Index) -> bool {
        index.is_single_entity()
            && index.path().leading_entity() == self.entity
            && self
                .settings
                .fields()
                .any(|field| index.all_fields().contains(&field))
    }
}

impl PartialEq for Insert {
    fn eq(&self, other: &Self) -> bool {
        self.graph == other.graph
            && self.entity == other.entity
            && self.settings == other.settings
            && self.conditions == other.conditions
    }
}

impl Eq for Insert {}

impl Hash for Insert {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.graph.hash(state);
        self.entity.hash(state);
        self.settings.hash(state);
        self.conditions.hash(state);
    }
}
