//! Expression types for building SQL conditions.

pub mod column;
pub mod ops;

pub use column::{Col, Order};
pub use ops::Condition;
