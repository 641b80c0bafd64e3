mod condition;
pub use condition::{Condition, ConditionOp, Conditions};

mod delete;
pub use delete::Delete;

mod insert;
pub use insert::Insert;

mod query;
pub use query::Query;

mod settings;
pub use settings::{FieldSetting, Settings};

mod support_query;
pub use support_query::SupportQuery;

mod update;
pub use update::Update;

mod value;
pub use value::Value;

use crate::schema::{EntityId, FieldId, Index, Schema};
use crate::Result;

use std::collections::BTreeSet;

/// A write statement, as handed to the planner.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Statement {
    Insert(Insert),
    Update(Update),
    Delete(Delete),
}

impl Statement {
    /// The statement's target entity.
    pub fn entity(&self) -> EntityId {
        match self {
            Statement::Insert(insert) => insert.entity(),
            Statement::Update(update) => update.entity(),
            Statement::Delete(delete) => delete.entity(),
        }
    }

    /// Determines whether this write touches the given index.
    pub fn modifies_index(&self, schema: &Schema, index: &Index) -> bool {
        match self {
            Statement::Insert(insert) => insert.modifies_index(schema, index),
            Statement::Update(update) => update.modifies_index(schema, index),
            Statement::Delete(delete) => delete.modifies_index(schema, index),
        }
    }

    /// Whether applying this write inserts a row into the index.
    pub fn requires_insert(&self, index: &Index) -> bool {
        match self {
            Statement::Insert(insert) => insert.requires_insert(index),
            Statement::Update(update) => update.requires_insert(index),
            Statement::Delete(delete) => delete.requires_insert(index),
        }
    }

    /// Whether applying this write must first delete the index's existing
    /// row.
    pub fn requires_delete(&self, index: &Index) -> bool {
        match self {
            Statement::Insert(insert) => insert.requires_delete(index),
            Statement::Update(update) => update.requires_delete(index),
            Statement::Delete(delete) => delete.requires_delete(index),
        }
    }

    /// Fields whose values the statement itself supplies.
    pub fn given_fields(&self, schema: &Schema) -> BTreeSet<FieldId> {
        match self {
            Statement::Insert(insert) => insert.given_fields(schema),
            Statement::Update(update) => update.given_fields(schema),
            Statement::Delete(delete) => delete.given_fields(schema),
        }
    }

    /// The reads required to complete this write's effect on the index.
    /// Freshly derived on every call; an empty sequence is a normal
    /// outcome.
    pub fn support_queries(&self, schema: &Schema, index: &Index) -> Result<Vec<SupportQuery>> {
        match self {
            Statement::Insert(insert) => insert.support_queries(schema, index),
            Statement::Update(update) => update.support_queries(schema, index),
            Statement::Delete(delete) => delete.support_queries(schema, index),
        }
    }

    /// Diagnostic text form.
    pub fn unparse(&self, schema: &Schema) -> String {
        match self {
            Statement::Insert(insert) => insert.unparse(schema),
            Statement::Update(update) => update.unparse(schema),
            Statement::Delete(delete) => delete.unparse(schema),
        }
    }

    pub fn is_insert(&self) -> bool {
        matches!(self, Statement::Insert(..))
    }

    pub fn as_insert(&self) -> Option<&Insert> {
        match self {
            Statement::Insert(insert) => Some(insert),
            _ => None,
        }
    }

    pub fn is_update(&self) -> bool {
        matches!(self, Statement::Update(..))
    }

    pub fn as_update(&self) -> Option<&Update> {
        match self {
            Statement::Update(update) => Some(update),
            _ => None,
        }
    }

    pub fn is_delete(&self) -> bool {
        matches!(self, Statement::Delete(..))
    }

    pub fn as_delete(&self) -> Option<&Delete> {
        match self {
            Statement::Delete(delete) => Some(delete),
            _ => None,
        }
    }
}

impl From<Insert> for Statement {
    fn from(src: Insert) -> Self {
        Self::Insert(src)
    }
}

impl From<Update> for Statement {
    fn from(src: Update) -> Self {
        Self::Update(src)
    }
}

impl From<Delete> for Statement {
    fn from(src: Delete) -> Self {
        Self::Delete(src)
    }
}

pub(crate) fn qualified_name(schema: &Schema, field: FieldId) -> String {
    format!(
        "{}.{}",
        schema.entity(field.entity).name,
        schema.field(field).name
    )
}

pub(crate) fn settings_clause(schema: &Schema, settings: &Settings) -> String {
    let assignments: Vec<String> = settings
        .iter()
        .map(|setting| format!("{} = {}", schema.field(setting.field).name, setting.value))
        .collect();
    format!("SET {}", assignments.join(", "))
}

pub(crate) fn where_clause(schema: &Schema, conditions: &Conditions) -> String {
    let predicates: Vec<String> = conditions
        .iter()
        .map(|condition| {
            let value = match &condition.value {
                Some(value) => value.to_string(),
                None => "?".to_string(),
            };
            format!(
                "{} {} {}",
                qualified_name(schema, condition.field),
                condition.op,
                value
            )
        })
        .collect();
    format!("WHERE {}", predicates.join(" AND "))
}
