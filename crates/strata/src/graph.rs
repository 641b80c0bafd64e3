mod path;
pub use path::KeyPath;

use crate::schema::{EntityId, FieldId, Schema};
use crate::{Error, Result};

use std::collections::BTreeSet;

/// A multigraph over entities with foreign-key edges.
///
/// Nodes and edges are kept in canonically sorted vectors of arena
/// identifiers, so equality and hashing are structural regardless of
/// insertion order and cloning before mutation stays cheap. Statements
/// derive support queries on private clones of an index's graph; the
/// index's own graph is never touched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct EntityGraph {
    nodes: Vec<EntityId>,
    edges: Vec<GraphEdge>,
}

/// An edge in the declared direction of its foreign key. Traversals may
/// also walk it backwards, in which case the key's reverse pair labels the
/// step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GraphEdge {
    pub from: EntityId,
    pub to: EntityId,
    pub key: FieldId,
}

impl EntityGraph {
    pub fn new() -> EntityGraph {
        EntityGraph::default()
    }

    /// The graph of a single, unconnected entity.
    pub fn single(entity: impl Into<EntityId>) -> EntityGraph {
        let mut graph = EntityGraph::new();
        graph.add_node(entity.into());
        graph
    }

    /// The graph view of a key path: its entities, connected by its keys.
    pub fn from_path(path: &KeyPath) -> EntityGraph {
        let mut graph = EntityGraph::new();
        let entities = path.entities();
        graph.add_node(entities[0]);

        for (i, key) in path.keys().iter().enumerate().skip(1) {
            graph.add_edge(entities[i - 1], entities[i], *key);
        }

        graph
    }

    pub fn add_node(&mut self, entity: impl Into<EntityId>) {
        let entity = entity.into();
        if let Err(pos) = self.nodes.binary_search(&entity) {
            self.nodes.insert(pos, entity);
        }
    }

    /// Add an edge, creating either endpoint as needed. Re-adding an
    /// existing edge is a no-op.
    pub fn add_edge(
        &mut self,
        from: impl Into<EntityId>,
        to: impl Into<EntityId>,
        key: FieldId,
    ) {
        let edge = GraphEdge {
            from: from.into(),
            to: to.into(),
            key,
        };
        self.add_node(edge.from);
        self.add_node(edge.to);

        if let Err(pos) = self.edges.binary_search(&edge) {
            self.edges.insert(pos, edge);
        }
    }

    /// Remove a node set along with every incident edge.
    pub fn remove_nodes(&mut self, doomed: &BTreeSet<EntityId>) {
        self.nodes.retain(|node| !doomed.contains(node));
        self.edges
            .retain(|edge| !doomed.contains(&edge.from) && !doomed.contains(&edge.to));
    }

    /// Remaining entities, in canonical order.
    pub fn entities(&self) -> &[EntityId] {
        &self.nodes
    }

    pub fn contains(&self, entity: impl Into<EntityId>) -> bool {
        self.nodes.binary_search(&entity.into()).is_ok()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The entity owning `field`, if it is part of this graph.
    pub fn find_field_parent(&self, field: FieldId) -> Option<EntityId> {
        self.contains(field.entity).then_some(field.entity)
    }

    /// The longest simple path through the graph.
    ///
    /// Deterministic: among equal-length candidates the path whose
    /// entity-name sequence is lexicographically smallest wins, and
    /// remaining ties (parallel edges) break on the key-name sequence.
    /// Plan reproducibility depends on this rule; do not weaken it.
    pub fn longest_path(&self, schema: &Schema) -> Result<KeyPath> {
        if self.nodes.is_empty() {
            return Err(Error::internal("longest path requested of an empty graph"));
        }

        let mut walk = Walk {
            graph: self,
            schema,
            nodes: vec![],
            keys: vec![],
            best: None,
        };

        let mut starts = self.nodes.clone();
        starts.sort_by(|a, b| schema.entity(*a).name.cmp(&schema.entity(*b).name));
        for start in starts {
            walk.nodes.push(start);
            walk.extend();
            walk.nodes.pop();
        }

        let (nodes, mut keys) = walk.best.expect("at least one candidate path");
        tracing::trace!(len = nodes.len(), "longest path selected");

        keys.insert(0, schema.id_field(nodes[0]));
        Ok(KeyPath::from_parts(keys, nodes))
    }
}

struct Walk<'a> {
    graph: &'a EntityGraph,
    schema: &'a Schema,
    nodes: Vec<EntityId>,
    keys: Vec<FieldId>,
    best: Option<(Vec<EntityId>, Vec<FieldId>)>,
}

impl Walk<'_> {
    fn extend(&mut self) {
        if self.improves_best() {
            self.best = Some((self.nodes.clone(), self.keys.clone()));
        }

        let current = *self.nodes.last().unwrap();
        let mut steps: Vec<(EntityId, FieldId)> = vec![];
        for edge in &self.graph.edges {
            if edge.from == current && !self.nodes.contains(&edge.to) {
                steps.push((edge.to, edge.key));
            }
            if edge.to == current && !self.nodes.contains(&edge.from) {
                steps.push((edge.from, self.schema.reverse(edge.key)));
            }
        }
        steps.sort_by(|(entity_a, key_a), (entity_b, key_b)| {
            let a = (
                self.schema.entity(*entity_a).name.as_str(),
                self.schema.field(*key_a).name.as_str(),
            );
            let b = (
                self.schema.entity(*entity_b).name.as_str(),
                self.schema.field(*key_b).name.as_str(),
            );
            a.cmp(&b)
        });

        for (next, key) in steps {
            self.nodes.push(next);
            self.keys.push(key);
            self.extend();
            self.nodes.pop();
            self.keys.pop();
        }
    }

    fn improves_best(&self) -> bool {
        let Some((best_nodes, best_keys)) = &self.best else {
            return true;
        };

        if self.nodes.len() != best_nodes.len() {
            return self.nodes.len() > best_nodes.len();
        }

        let names = |nodes: &[EntityId]| -> Vec<&str> {
            nodes
                .iter()
                .map(|node| self.schema.entity(*node).name.as_str())
                .collect()
        };
        let key_names = |keys: &[FieldId]| -> Vec<&str> {
            keys.iter()
                .map(|key| self.schema.field(*key).name.as_str())
                .collect()
        };

        (names(&self.nodes), key_names(&self.keys)) < (names(best_nodes), key_names(best_keys))
    }
}
