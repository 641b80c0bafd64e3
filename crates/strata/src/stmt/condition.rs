use super::{qualified_name, Value};
use crate::schema::{FieldId, Schema};
use crate::{Error, Result};

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// A predicate over a single field.
///
/// A condition without a value is unbound: the value arrives as a
/// parameter at execution time.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Condition {
    /// The field being constrained
    pub field: FieldId,

    /// The comparison operator
    pub op: ConditionOp,

    /// The bound value, if any
    pub value: Option<Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConditionOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl Condition {
    pub fn new(
        field: impl Into<FieldId>,
        op: ConditionOp,
        value: impl Into<Option<Value>>,
    ) -> Condition {
        Condition {
            field: field.into(),
            op,
            value: value.into(),
        }
    }

    /// An equality condition with a bound value.
    pub fn eq(field: impl Into<FieldId>, value: impl Into<Value>) -> Condition {
        Condition::new(field, ConditionOp::Eq, value.into())
    }

    pub fn is_bound(&self) -> bool {
        self.value.is_some()
    }
}

impl ConditionOp {
    pub fn is_eq(self) -> bool {
        matches!(self, Self::Eq)
    }
}

impl fmt::Display for ConditionOp {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op = match self {
            Self::Eq => "=",
            Self::Ne => "!=",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
        };
        fmt.write_str(op)
    }
}

/// Condition storage: unique per field, iterated in field order so every
/// derived artifact is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Conditions {
    by_field: BTreeMap<FieldId, Condition>,
}

impl Conditions {
    pub fn from_vec(schema: &Schema, conditions: Vec<Condition>) -> Result<Conditions> {
        let mut by_field = BTreeMap::new();
        for condition in conditions {
            let field = condition.field;
            if by_field.insert(field, condition).is_some() {
                return Err(Error::invalid_statement(format!(
                    "duplicate condition for `{}`",
                    qualified_name(schema, field)
                )));
            }
        }
        Ok(Conditions { by_field })
    }

    /// Collects derived conditions, keeping the first for each field.
    /// Translation can collapse several connections onto one identifier;
    /// the first in field order wins.
    pub(crate) fn retaining_first(conditions: impl IntoIterator<Item = Condition>) -> Conditions {
        let mut by_field = BTreeMap::new();
        for condition in conditions {
            by_field.entry(condition.field).or_insert(condition);
        }
        Conditions { by_field }
    }

    pub fn get(&self, field: impl Into<FieldId>) -> Option<&Condition> {
        self.by_field.get(&field.into())
    }

    pub fn contains(&self, field: impl Into<FieldId>) -> bool {
        self.by_field.contains_key(&field.into())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Condition> {
        self.by_field.values()
    }

    pub fn fields(&self) -> impl Iterator<Item = FieldId> + '_ {
        self.by_field.keys().copied()
    }

    pub fn field_set(&self) -> BTreeSet<FieldId> {
        self.by_field.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.by_field.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_field.is_empty()
    }
}
