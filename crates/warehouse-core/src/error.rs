//! Error types for warehouse-core.

use miette::Diagnostic;
use thiserror::Error;
use warehouse_config::error::ConfigError;

/// Errors raised while forwarding, dispatching or configuring repositories.
#[derive(Error, Diagnostic, Debug)]
pub enum WarehouseError {
    #[error("undefined operation `{operation}` for {receiver}")]
    #[diagnostic(
        code(warehouse::unsupported_operation),
        help("The wrapped domain does not answer this operation")
    )]
    UnsupportedOperation { operation: String, receiver: String },

    #[error("Direct call on domain's methods is not allowed: `{operation}`")]
    #[diagnostic(
        code(warehouse::domain_method),
        help("Define a repository method that exposes this operation, or call it through `query()`")
    )]
    DomainMethod { operation: String },

    #[error("{receiver} cannot be converted into a sequence")]
    #[diagnostic(code(warehouse::not_sequence))]
    NotSequence { receiver: String },

    #[error("`{operation}` returned a {receiver}, which does not chain")]
    #[diagnostic(
        code(warehouse::not_chainable),
        help("Use `send` to receive plain values")
    )]
    NotChainable { operation: String, receiver: String },

    #[error("Repository is not configured: {0}")]
    #[diagnostic(
        code(warehouse::not_configured),
        help("Call `configure` on the repository type before querying it")
    )]
    NotConfigured(String),

    #[error("Unknown model: {0}")]
    #[diagnostic(
        code(warehouse::unknown_model),
        help("Register the model with the resolver before configuring repositories over it")
    )]
    UnknownModel(String),

    #[error("Scope `{scope}` returned a {receiver}, not a domain object")]
    #[diagnostic(code(warehouse::invalid_scope))]
    InvalidScope { scope: String, receiver: String },

    #[error("Invalid arguments for `{operation}`: {reason}")]
    #[diagnostic(code(warehouse::invalid_argument))]
    InvalidArgument { operation: String, reason: String },

    #[error("Invalid chainable type list: {0}")]
    #[diagnostic(code(warehouse::invalid_chainable_types))]
    InvalidChainableTypes(String),

    #[error(transparent)]
    #[diagnostic(code(warehouse::backend))]
    Backend(Box<dyn std::error::Error + Send + Sync>),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),
}

impl WarehouseError {
    /// Wraps an error raised by a data-access collaborator.
    pub fn backend<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Backend(Box::new(err))
    }
}

/// Result type alias for warehouse-core operations.
pub type Result<T> = std::result::Result<T, WarehouseError>;
