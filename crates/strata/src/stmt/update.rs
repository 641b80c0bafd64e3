use super::support_query::{connections_cross_path, derive_support_query};
use super::{
    qualified_name, settings_clause, where_clause, Condition, Conditions, FieldSetting, Settings,
    Statement, SupportQuery,
};
use crate::graph::{EntityGraph, KeyPath};
use crate::schema::{EntityId, FieldId, Index, Schema};
use crate::{Error, Result};

use std::collections::BTreeSet;
use std::hash::{Hash, Hasher};

/// Mutates fields of instances reached by a key path.
#[derive(Debug, Clone)]
pub struct Update {
    /// The entity being updated: the path's leading entity
    entity: EntityId,

    /// Sub-graph touched by the statement
    graph: EntityGraph,

    /// The path identifying the instances
    key_path: KeyPath,

    /// New values
    settings: Settings,

    /// Predicates identifying the instances
    conditions: Conditions,
}

impl Update {
    pub fn new(
        schema: &Schema,
        path: KeyPath,
        settings: Vec<FieldSetting>,
        conditions: Vec<Condition>,
    ) -> Result<Update> {
        let entity = path.leading_entity();

        let settings = Settings::from_vec(schema, entity, settings)?;
        if settings.is_empty() {
            return Err(Error::invalid_statement(format!(
                "update of `{}` must set at least one field",
                schema.entity(entity).name
            )));
        }

        let conditions = Conditions::from_vec(schema, conditions)?;
        for condition in conditions.iter() {
            if !path.contains_entity(condition.field.entity) {
                return Err(Error::invalid_statement(format!(
                    "condition on `{}` is off the statement's path",
                    qualified_name(schema, condition.field)
                )));
            }
        }

        Ok(Update {
            entity,
            graph: EntityGraph::from_path(&path),
            key_path: path,
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

    pub fn key_path(&self) -> &KeyPath {
        &self.key_path
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn conditions(&self) -> &Conditions {
        &self.conditions
    }

    /// Determines whether this update modifies the given index: either the
    /// updated fields land in it, or the conditions reach its path.
    pub fn modifies_index(&self, schema: &Schema, index: &Index) -> bool {
        if self
            .settings
            .fields()
            .any(|field| index.all_fields().contains(&field))
        {
            return true;
        }
        if index.is_single_entity() || !index.path().contains_entity(self.entity) {
            return false;
        }

        connections_cross_path(schema, &self.conditions, index)
    }

    /// The post-image must always be written.
    pub fn requires_insert(&self, _index: &Index) -> bool {
        true
    }

    /// True when the update touches the index's placement key: the old row
    /// is unreachable in place and must be deleted and reinserted.
    pub fn requires_delete(&self, index: &Index) -> bool {
        let placement = index.placement_fields();
        self.settings.fields().any(|field| placement.contains(&field))
    }

    /// Only the condition fields. The settings are excluded: the
    /// previously existing values of non-updated fields must be re-read.
    pub fn given_fields(&self, _schema: &Schema) -> BTreeSet<FieldId> {
        self.conditions.field_set()
    }

    pub fn support_queries(&self, schema: &Schema, index: &Index) -> Result<Vec<SupportQuery>> {
        if !self.modifies_index(schema, index) {
            return Ok(vec![]);
        }

        let set_fields = self.settings.field_set();

        // Only a placement-key change forces a full-row re-fetch; otherwise
        // locating the old row needs just its placement fields.
        let placement = index.placement_fields();
        let updated_key = !set_fields.is_disjoint(&placement);

        let mut select = if updated_key {
            index.all_fields().clone()
        } else {
            placement
        };
        for field in &set_fields {
            select.remove(field);
        }
        for field in self.conditions.fields() {
            select.remove(&field);
        }
        if select.is_empty() {
            return Ok(vec![]);
        }

        // Conditions the index can evaluate: those owned by a path entity.
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
            "UPDATE {} FROM {} {}",
            schema.entity(self.entity).name,
            self.key_path.display(schema),
            settings_clause(schema, &self.settings)
        );
        if !self.conditions.is_empty() {
            out.push(' ');
            out.push_str(&where_clause(schema, &self.conditions));
        }
        out
    }
}

impl PartialEq for Update {
    fn eq(&self, other: &Self) -> bool {
        self.graph == other.graph
            && self.entity == other.entity
            && self.settings == other.settings
            && self.conditions == other.conditions
    }
}

impl Eq for Update {}

impl Hash for Update {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.graph.hash(state);
        self.entity.hash(state);
        self.settings.hash(state);
        self.conditions.hash(state);
    }
}
