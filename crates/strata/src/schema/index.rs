use super::{FieldId, Schema};
use crate::graph::{EntityGraph, KeyPath};
use crate::{fingerprint, Error, Result};

use std::collections::BTreeSet;
use std::fmt;

/// A denormalized materialized view over a path of entities: rows are
/// placed by the hash fields, ordered within a placement by the order
/// fields, and carry the extra fields as payload.
///
/// Immutable once constructed; the planner only reads it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Index {
    /// Uniquely identifies the index: a fingerprint of its structure
    id: IndexId,

    /// The entities and keys the view joins across
    path: KeyPath,

    hash_fields: BTreeSet<FieldId>,
    order_fields: Vec<FieldId>,
    extra_fields: BTreeSet<FieldId>,

    /// Union of hash, order and extra fields
    all_fields: BTreeSet<FieldId>,

    /// Graph view of the path
    graph: EntityGraph,
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct IndexId(pub u64);

impl Index {
    pub fn new(
        schema: &Schema,
        path: KeyPath,
        hash_fields: impl IntoIterator<Item = FieldId>,
        order_fields: Vec<FieldId>,
        extra_fields: impl IntoIterator<Item = FieldId>,
    ) -> Result<Index> {
        let hash_fields: BTreeSet<FieldId> = hash_fields.into_iter().collect();
        let extra_fields: BTreeSet<FieldId> = extra_fields.into_iter().collect();

        if hash_fields.is_empty() {
            return Err(Error::invalid_schema(
                "index must have at least one hash field",
            ));
        }
        for (i, field) in order_fields.iter().enumerate() {
            if order_fields[..i].contains(field) {
                return Err(Error::invalid_schema(format!(
                    "duplicate order field `{}`",
                    schema.field(*field).name
                )));
            }
        }

        let mut all_fields = hash_fields.clone();
        all_fields.extend(order_fields.iter().copied());
        all_fields.extend(extra_fields.iter().copied());

        for field in &all_fields {
            if !path.contains_entity(field.entity) {
                return Err(Error::invalid_schema(format!(
                    "index field `{}.{}` is not owned by a path entity",
                    schema.entity(field.entity).name,
                    schema.field(*field).name
                )));
            }
        }

        let graph = EntityGraph::from_path(&path);
        let id = IndexId(fingerprint(&(
            &path,
            &hash_fields,
            &order_fields,
            &extra_fields,
        )));

        Ok(Index {
            id,
            path,
            hash_fields,
            order_fields,
            extra_fields,
            all_fields,
            graph,
        })
    }

    pub fn id(&self) -> IndexId {
        self.id
    }

    pub fn path(&self) -> &KeyPath {
        &self.path
    }

    pub fn hash_fields(&self) -> &BTreeSet<FieldId> {
        &self.hash_fields
    }

    pub fn order_fields(&self) -> &[FieldId] {
        &self.order_fields
    }

    pub fn extra_fields(&self) -> &BTreeSet<FieldId> {
        &self.extra_fields
    }

    /// Union of all fields the view materializes.
    pub fn all_fields(&self) -> &BTreeSet<FieldId> {
        &self.all_fields
    }

    /// Graph view of the index's path.
    pub fn graph(&self) -> &EntityGraph {
        &self.graph
    }

    /// True when the view covers a single entity (no joins).
    pub fn is_single_entity(&self) -> bool {
        self.path.len() == 1
    }

    /// The fields that decide a row's physical placement: a write touching
    /// one of these cannot update the old row in place.
    pub fn placement_fields(&self) -> BTreeSet<FieldId> {
        let mut fields = self.hash_fields.clone();
        fields.extend(self.order_fields.iter().copied());
        fields
    }
}

impl fmt::Debug for IndexId {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(fmt, "IndexId({:016x})", self.0)
    }
}
