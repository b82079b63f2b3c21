//! Typed per-simplex attribute storage with transactional scopes.

pub mod accessor;
pub mod attribute;
pub mod handle;
pub mod manager;
pub mod value;

pub use accessor::{Accessor, ConstAccessor};
pub use attribute::{Attribute, AttributeRole};
pub use handle::{AttributeHandle, MeshAttributeHandle, TypedAttributeHandle};
pub use manager::{AttributeManager, AttributeVisitor, TypedAttributes};
pub use value::AttributeValue;
