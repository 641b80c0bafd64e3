use super::{qualified_name, where_clause, Conditions};
use crate::graph::{EntityGraph, KeyPath};
use crate::schema::{EntityId, FieldId, Schema};

use std::collections::BTreeSet;
use std::hash::{Hash, Hasher};

/// A read-only statement over a path: select a field set from the leading
/// entity, filtered by conditions. Derived support queries are queries
/// themselves, so the planner can compile them recursively.
#[derive(Debug, Clone)]
pub struct Query {
    /// The entity the query targets (the path's leading entity)
    entity: EntityId,

    /// Sub-graph touched by the query
    graph: EntityGraph,

    /// The path the read traverses
    key_path: KeyPath,

    /// Fields the query fetches
    select: BTreeSet<FieldId>,

    /// Predicates restricting the result
    conditions: Conditions,
}

impl Query {
    pub(crate) fn new(
        graph: EntityGraph,
        key_path: KeyPath,
        select: BTreeSet<FieldId>,
        conditions: Conditions,
    ) -> Query {
        Query {
            entity: key_path.leading_entity(),
            graph,
            key_path,
            select,
            conditions,
        }
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

    pub fn select(&self) -> &BTreeSet<FieldId> {
        &self.select
    }

    pub fn conditions(&self) -> &Conditions {
        &self.conditions
    }

    /// The condition fields: the values a caller must supply to run the
    /// query.
    pub fn given_fields(&self) -> BTreeSet<FieldId> {
        self.conditions.field_set()
    }

    /// Diagnostic text form.
    pub fn unparse(&self, schema: &Schema) -> String {
        let fields: Vec<String> = self
            .select
            .iter()
            .map(|field| qualified_name(schema, *field))
            .collect();

        let mut out = format!(
            "SELECT {} FROM {}",
            fields.join(", "),
            self.key_path.display(schema)
        );
        if !self.conditions.is_empty() {
            out.push(' ');
            out.push_str(&where_clause(schema, &self.conditions));
        }
        out
    }
}

impl PartialEq for Query {
    fn eq(&self, other: &Self) -> bool {
        self.graph == other.graph
            && self.entity == other.entity
            && self.select == other.select
            && self.conditions == other.conditions
    }
}

impl Eq for Query {}

impl Hash for Query {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.graph.hash(state);
        self.entity.hash(state);
        self.select.hash(state);
        self.conditions.hash(state);
    }
}
