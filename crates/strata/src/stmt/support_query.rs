use super::{qualified_name, Conditions, Query, Statement};
use crate::graph::EntityGraph;
use crate::schema::{EntityId, FieldId, Index, IndexId, Schema};
use crate::{fingerprint, Error, Result};

use std::collections::BTreeSet;
use std::hash::{Hash, Hasher};

/// A derived read that fetches the field values a write does not itself
/// supply, tagged with the write it completes and the index it feeds.
///
/// Frozen from construction: accessors only.
#[derive(Debug, Clone)]
pub struct SupportQuery {
    query: Query,

    /// The write statement this read completes
    statement: Box<Statement>,

    /// The index the write is being applied to
    index: IndexId,

    /// `fingerprint(statement) ^ fingerprint(index)`; pairs the read with
    /// the write's physical execution downstream
    correlation: u64,
}

impl SupportQuery {
    pub fn query(&self) -> &Query {
        &self.query
    }

    pub fn statement(&self) -> &Statement {
        &self.statement
    }

    pub fn index(&self) -> IndexId {
        self.index
    }

    pub fn correlation(&self) -> u64 {
        self.correlation
    }

    pub fn entity(&self) -> EntityId {
        self.query.entity()
    }

    pub fn select(&self) -> &BTreeSet<FieldId> {
        self.query.select()
    }

    pub fn conditions(&self) -> &Conditions {
        self.query.conditions()
    }

    pub fn unparse(&self, schema: &Schema) -> String {
        self.query.unparse(schema)
    }
}

impl PartialEq for SupportQuery {
    fn eq(&self, other: &Self) -> bool {
        self.query == other.query
            && self.statement == other.statement
            && self.index == other.index
    }
}

impl Eq for SupportQuery {}

impl Hash for SupportQuery {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.query.hash(state);
        self.statement.hash(state);
        self.index.hash(state);
    }
}

/// True when some condition's key, walked forward or in reverse, lies on
/// the index's path. A write connecting on a path component is the only
/// way a multi-entity index picks it up.
pub(crate) fn connections_cross_path(
    schema: &Schema,
    conditions: &Conditions,
    index: &Index,
) -> bool {
    conditions.iter().any(|condition| {
        let Some(fk) = schema.field(condition.field).as_foreign_key() else {
            return false;
        };
        index.path().contains(condition.field) || index.path().contains(fk.pair)
    })
}

/// The shared tail of support-query derivation: take the longest path
/// through the pruned graph and emit the query over it.
///
/// The graph must still reach the owner of every selected field; losing
/// one is an internal fault (callers gate on `modifies_index`), not a
/// recoverable state.
pub(crate) fn derive_support_query(
    schema: &Schema,
    statement: Statement,
    index: &Index,
    graph: EntityGraph,
    select: BTreeSet<FieldId>,
    conditions: Conditions,
) -> Result<SupportQuery> {
    let key_path = graph.longest_path(schema)?;

    for field in &select {
        if !key_path.contains_entity(field.entity) {
            return Err(Error::internal(format!(
                "support query for {:?} cannot reach `{}`: the pruned graph lost its owner",
                index.id(),
                qualified_name(schema, *field)
            )));
        }
    }

    tracing::debug!(
        index = ?index.id(),
        entity = %schema.entity(key_path.leading_entity()).name,
        select = select.len(),
        conditions = conditions.len(),
        "derived support query"
    );

    let correlation = fingerprint(&statement) ^ fingerprint(index);
    Ok(SupportQuery {
        query: Query::new(graph, key_path, select, conditions),
        statement: Box::new(statement),
        index: index.id(),
        correlation,
    })
}
