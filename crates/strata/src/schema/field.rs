use super::{EntityId, ForeignKey};
use std::fmt;

#[derive(Debug, Clone)]
pub struct Field {
    /// Uniquely identifies the field within the containing entity.
    pub id: FieldId,

    /// The field name
    pub name: String,

    /// Primitive or foreign key; resolved once when the schema is built.
    pub ty: FieldTy,
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FieldId {
    pub entity: EntityId,
    pub index: usize,
}

#[derive(Debug, Clone)]
pub enum FieldTy {
    Primitive(ScalarTy),
    ForeignKey(ForeignKey),
}

/// Storage type of a primitive field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarTy {
    Bool,
    I64,
    Text,
}

impl Field {
    pub fn is_primitive(&self) -> bool {
        self.ty.is_primitive()
    }

    pub fn is_foreign_key(&self) -> bool {
        self.ty.is_foreign_key()
    }

    pub fn as_foreign_key(&self) -> Option<&ForeignKey> {
        self.ty.as_foreign_key()
    }

    #[track_caller]
    pub fn expect_foreign_key(&self) -> &ForeignKey {
        self.ty.expect_foreign_key()
    }
}

impl FieldTy {
    pub fn is_primitive(&self) -> bool {
        matches!(self, Self::Primitive(..))
    }

    pub fn is_foreign_key(&self) -> bool {
        matches!(self, Self::ForeignKey(..))
    }

    pub fn as_foreign_key(&self) -> Option<&ForeignKey> {
        match self {
            Self::ForeignKey(fk) => Some(fk),
            _ => None,
        }
    }

    #[track_caller]
    pub fn expect_foreign_key(&self) -> &ForeignKey {
        match self {
            Self::ForeignKey(fk) => fk,
            _ => panic!("expected foreign key field, but was {self:?}"),
        }
    }

    #[track_caller]
    pub fn expect_foreign_key_mut(&mut self) -> &mut ForeignKey {
        match self {
            Self::ForeignKey(fk) => fk,
            _ => panic!("expected foreign key field, but was {self:?}"),
        }
    }
}

impl FieldId {
    pub(crate) fn placeholder() -> Self {
        Self {
            entity: EntityId(usize::MAX),
            index: usize::MAX,
        }
    }
}

impl From<&Self> for FieldId {
    fn from(val: &Self) -> Self {
        *val
    }
}

impl From<&Field> for FieldId {
    fn from(val: &Field) -> Self {
        val.id
    }
}

impl fmt::Debug for FieldId {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(fmt, "FieldId({}/{})", self.entity.0, self.index)
    }
}
