mod builder;
pub use builder::Builder;

mod entity;
pub use entity::{Entity, EntityId};

mod field;
pub use field::{Field, FieldId, FieldTy, ScalarTy};

mod fk;
pub use fk::ForeignKey;

mod index;
pub use index::{Index, IndexId};

mod schema;
pub use schema::Schema;
