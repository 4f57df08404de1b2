//! The capability interface every wrapped domain value implements.
//!
//! A repository never knows the concrete type it wraps. It only asks whether
//! the domain answers a named operation, invokes it with a list of
//! [`Value`] arguments, and inspects the runtime type name of what came back.

use std::{any::Any, sync::Arc};

use crate::{
    error::{Result, WarehouseError},
    value::Value,
};

/// Shared handle to a domain object.
pub type ObjectRef = Arc<dyn DomainObject>;

/// A model type, query relation or record that accepts named operations.
pub trait DomainObject: Any + Send + Sync {
    /// Runtime type name, `::`-namespaced (e.g. `User::Relation`).
    ///
    /// Used by the chainability rule, so two values of the same kind must
    /// report the same name.
    fn type_name(&self) -> String;

    /// Whether `operation` can be invoked on this object.
    fn responds_to(&self, operation: &str) -> bool;

    /// Invokes `operation` with `args`.
    ///
    /// Callers check [`responds_to`](Self::responds_to) first; implementations
    /// may still reject bad arguments with [`WarehouseError::InvalidArgument`].
    fn invoke(&self, operation: &str, args: &[Value]) -> Result<Value>;

    /// Converts this object into an ordered sequence of values.
    fn to_sequence(&self) -> Result<Vec<Value>> {
        Err(WarehouseError::NotSequence {
            receiver: self.type_name(),
        })
    }

    fn as_any(&self) -> &dyn Any;
}

/// Builds the error a domain returns for an operation it does not know.
pub fn unsupported(operation: &str, receiver: &dyn DomainObject) -> WarehouseError {
    WarehouseError::UnsupportedOperation {
        operation: operation.to_string(),
        receiver: receiver.type_name(),
    }
}

/// Fetches argument `index` of `operation`, failing when it is absent.
pub fn arg<'a>(operation: &str, args: &'a [Value], index: usize) -> Result<&'a Value> {
    args.get(index)
        .ok_or_else(|| WarehouseError::InvalidArgument {
            operation: operation.to_string(),
            reason: format!("expected at least {} argument(s), got {}", index + 1, args.len()),
        })
}

/// Fetches argument `index` of `operation` as text.
pub fn text_arg<'a>(operation: &str, args: &'a [Value], index: usize) -> Result<&'a str> {
    let value = arg(operation, args, index)?;
    value.as_str().ok_or_else(|| WarehouseError::InvalidArgument {
        operation: operation.to_string(),
        reason: format!("argument {} must be text, got {}", index + 1, value.type_name()),
    })
}

/// Fetches argument `index` of `operation` as an integer.
pub fn int_arg(operation: &str, args: &[Value], index: usize) -> Result<i64> {
    let value = arg(operation, args, index)?;
    value.as_int().ok_or_else(|| WarehouseError::InvalidArgument {
        operation: operation.to_string(),
        reason: format!("argument {} must be an integer, got {}", index + 1, value.type_name()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Bare;

    impl DomainObject for Bare {
        fn type_name(&self) -> String {
            "Bare".to_string()
        }

        fn responds_to(&self, _: &str) -> bool {
            false
        }

        fn invoke(&self, operation: &str, _: &[Value]) -> Result<Value> {
            Err(unsupported(operation, self))
        }

        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    #[test]
    fn test_default_to_sequence_fails() {
        let err = Bare.to_sequence().unwrap_err();
        assert!(matches!(err, WarehouseError::NotSequence { receiver } if receiver == "Bare"));
    }

    #[test]
    fn test_arg_helpers() {
        let args = [Value::from("name"), Value::from(5)];
        assert_eq!(text_arg("where", &args, 0).unwrap(), "name");
        assert_eq!(int_arg("limit", &args, 1).unwrap(), 5);
        assert!(matches!(
            text_arg("where", &args, 1),
            Err(WarehouseError::InvalidArgument { .. })
        ));
        assert!(matches!(
            arg("where", &args, 2),
            Err(WarehouseError::InvalidArgument { .. })
        ));
    }
}
