//! The repository proxy.
//!
//! A [`Repository`] wraps one domain object and forwards operations to it.
//! When a forwarded result is chainable the repository swaps its domain for
//! that result and keeps going, so `confirmed` then `alphabetically` narrow
//! the same repository instead of producing a new one.

use std::{fmt, sync::Arc};

use tracing::{debug, trace};

use crate::{
    chainable::ChainableTypes,
    domain::ObjectRef,
    error::{Result, WarehouseError},
    registry::MethodTable,
    value::Value,
};

/// Outcome of an operation sent to a repository instance.
#[derive(Debug, PartialEq)]
pub enum Forwarded {
    /// The result chained: the repository now wraps it.
    Chained,
    /// The raw result of the domain operation.
    Value(Value),
}

impl Forwarded {
    pub fn is_chained(&self) -> bool {
        matches!(self, Forwarded::Chained)
    }

    /// The raw value, or `None` when the call chained.
    pub fn into_value(self) -> Option<Value> {
        match self {
            Forwarded::Chained => None,
            Forwarded::Value(value) => Some(value),
        }
    }
}

/// A repository instance wrapping a single domain object.
pub struct Repository {
    domain: ObjectRef,
    methods: Arc<MethodTable>,
    chainable: Arc<ChainableTypes>,
}

impl Repository {
    /// Wraps `domain` with no author-defined methods and the default
    /// allow-list.
    pub fn new(domain: ObjectRef) -> Self {
        Self::with_parts(
            domain,
            Arc::new(MethodTable::default()),
            Arc::new(ChainableTypes::default()),
        )
    }

    pub(crate) fn with_parts(
        domain: ObjectRef,
        methods: Arc<MethodTable>,
        chainable: Arc<ChainableTypes>,
    ) -> Self {
        Self {
            domain,
            methods,
            chainable,
        }
    }

    /// The domain object currently wrapped.
    pub fn domain(&self) -> &ObjectRef {
        &self.domain
    }

    pub fn into_domain(self) -> ObjectRef {
        self.domain
    }

    /// Type name of the wrapped domain.
    pub fn domain_type(&self) -> String {
        self.domain.type_name()
    }

    /// Whether `operation` is an author-defined method or answered by the
    /// domain.
    pub fn responds_to(&self, operation: &str) -> bool {
        self.methods.contains(operation) || self.domain.responds_to(operation)
    }

    /// Sends `operation` to this repository.
    ///
    /// Author-defined methods run first; anything else is forwarded to the
    /// domain.
    pub fn send(&mut self, operation: &str, args: &[Value]) -> Result<Forwarded> {
        let method = self.methods.get(operation).cloned();
        if let Some(method) = method {
            trace!(operation, "running repository method");
            return method(self, args);
        }

        self.forward(operation, args)
    }

    /// Forwards `operation` straight to the wrapped domain.
    pub fn forward(&mut self, operation: &str, args: &[Value]) -> Result<Forwarded> {
        if !self.domain.responds_to(operation) {
            return Err(WarehouseError::UnsupportedOperation {
                operation: operation.to_string(),
                receiver: self.domain.type_name(),
            });
        }

        let previous = self.domain.type_name();
        trace!(operation, receiver = %previous, args = args.len(), "forwarding to domain");

        let result = self.domain.invoke(operation, args)?;
        if !self.chainable.classify(&previous, &result) {
            return Ok(Forwarded::Value(result));
        }

        match result {
            Value::Object(next) => {
                debug!(
                    operation,
                    from = %previous,
                    to = %next.type_name(),
                    "chained domain"
                );
                self.domain = next;
                Ok(Forwarded::Chained)
            }
            other => Ok(Forwarded::Value(other)),
        }
    }

    /// Like [`send`](Self::send), but for call sites that expect a scope.
    ///
    /// Fails with [`WarehouseError::NotChainable`] when the operation produced
    /// a plain value.
    pub fn chain(&mut self, operation: &str, args: &[Value]) -> Result<&mut Self> {
        match self.send(operation, args)? {
            Forwarded::Chained => Ok(self),
            Forwarded::Value(value) => Err(WarehouseError::NotChainable {
                operation: operation.to_string(),
                receiver: value.type_name(),
            }),
        }
    }

    /// Sends `operation` and returns its value, or `Value::Nil` if it chained.
    pub fn call(&mut self, operation: &str, args: &[Value]) -> Result<Value> {
        Ok(self.send(operation, args)?.into_value().unwrap_or_default())
    }

    /// Converts the wrapped domain into an ordered sequence.
    pub fn to_sequence(&self) -> Result<Vec<Value>> {
        self.domain.to_sequence()
    }
}

impl fmt::Debug for Repository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Repository")
            .field("domain", &self.domain.type_name())
            .field("methods", &self.methods.names())
            .finish()
    }
}
