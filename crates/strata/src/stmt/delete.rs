use super::support_query::derive_support_query;
use super::{qualified_name, where_clause, Condition, Conditions, Statement, SupportQuery};
use crate::graph::{EntityGraph, KeyPath};
use crate::schema::{EntityId, FieldId, Index, Schema};
use crate::{Error, Result};

use std::collections::BTreeSet;
use std::hash::{Hash, Hasher};

/// Removes instances reached by a key path.
#[derive(Debug, Clone)]
pub struct Delete {
    /// The entity losing instances: the path's leading entity
    entity: EntityId,

    /// Sub-graph touched by the statement
    graph: EntityGraph,

    /// The path identifying the instances
    key_path: KeyPath,

    /// Predicates identifying the instances
    conditions: Conditions,
}

impl Delete {
    pub fn new(schema: &Schema, path: KeyPath, conditions: Vec<Condition>) -> Result<Delete> {
        let entity = path.leading_entity();

        let conditions = Conditions::from_vec(schema, conditions)?;
        for condition in conditions.iter() {
            if !path.contains_entity(condition.field.entity) {
                return Err(Error::invalid_statement(format!(
                    "condition on `{}` is off the statement's path",
                    qualified_name(schema, condition.field)
                )));
            }
        }

        Ok(Delete {
            entity,
            graph: EntityGraph::from_path(&path),
            key_path: path,
            conditions,
        })
    }

    pub fn entity(&self) -> EntityId {
        self.entity
    }

    pub fn graph(&self) -> &EntityGraph {
        &self.graph
    }

    pub fn key_path(&self) -> &KeyPath {
        &self.key_path
    }

    pub fn conditions(&self) -> &Conditions {
        &self.conditions
    }

    /// Every view materializing instances of the entity loses rows.
    pub fn modifies_index(&self, _schema: &Schema, index: &Index) -> bool {
        index.path().contains_entity(self.entity)
    }

    /// Nothing new is written.
    pub fn requires_insert(&self, _index: &Index) -> bool {
        false
    }

    /// The doomed rows must always be removed.
    pub fn requires_delete(&self, _index: &Index) -> bool {
        true
    }

    pub fn given_fields(&self, _schema: &Schema) -> BTreeSet<FieldId> {
        self.conditions.field_set()
    }

    /// Deleting from an index requires recovering the placement key of the
    /// doomed rows, unless the conditions already pin it down.
    pub fn support_queries(&self, schema: &Schema, index: &Index) -> Result<Vec<SupportQuery>> {
        if !self.modifies_index(schema, index) {
            return Ok(vec![]);
        }

        let mut select = index.placement_fields();
        for field in self.conditions.fields() {
            select.remove(&field);
        }
        if select.is_empty() {
            return Ok(vec![]);
        }

        let restricted: Vec<Condition> = self
            .conditions
            .iter()
            .filter(|condition| index.graph().contains(condition.field.entity))
            .cloned()
            .collect();

        let mut touched: BTreeSet<EntityId> =
            select.iter().map(|field| field.entity).collect();
        touched.extend(restricted.iter().map(|condition| condition.field.entity));

        let mut graph = index.graph().clone();
        let doomed: BTreeSet<EntityId> = graph
            .entities()
            .iter()
            .copied()
            .filter(|entity| !touched.contains(entity))
            .collect();
        graph.remove_nodes(&doomed);

        let conditions = Conditions::retaining_first(restricted);
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
            "DELETE {} FROM {}",
            schema.entity(self.entity).name,
            self.key_path.display(schema)
        );
        if !self.conditions.is_empty() {
            out.push(' ');
            out.push_str(&where_clause(schema, &self.conditions));
        }
        out
    }
}

impl PartialEq for Delete {
    fn eq(&self, other: &Self) -> bool {
        self.graph == other.graph
            && self.entity == other.entity
            && self.conditions == other.conditions
    }
}

impl Eq for Delete {}

impl Hash for Delete {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.graph.hash(state);
        self.entity.hash(state);
        self.conditions.hash(state);
    }
}
