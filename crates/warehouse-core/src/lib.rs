//! Repository façades over chainable query scopes.
//!
//! A [`RepositoryType`] is configured with a model (optionally narrowed by a
//! scope) and a set of author-defined methods. Callers get [`Repository`]
//! instances from it; those forward unknown operations to the wrapped domain
//! and keep wrapping the result as long as it is chainable. Calling a domain
//! operation directly on the type is refused, so every query goes through a
//! method the repository's author chose to expose.
//!
//! The data-access layer stays outside this crate: anything implementing
//! [`DomainObject`] can be wrapped, and [`Record`] covers the per-record
//! persistence helpers.

pub mod chainable;
pub mod crud;
pub mod domain;
pub mod error;
pub mod proxy;
pub mod registry;
pub mod resolver;
pub mod value;

pub use chainable::{ChainableTypes, DEFAULT_CHAINABLE_TYPES};
pub use crud::Record;
pub use domain::{DomainObject, ObjectRef};
pub use error::{Result, WarehouseError};
pub use proxy::{Forwarded, Repository};
pub use registry::{ConfigureOptions, Dispatched, Method, RepositoryType};
pub use resolver::{classify, ModelTable, ResolveModel};
pub use value::Value;
