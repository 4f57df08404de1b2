use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Diagnostic, Debug)]
pub enum ConfigError {
    #[error("TOML deserialization error: {0}")]
    #[diagnostic(
        code(warehouse_config::toml_deserialize),
        help("Check your warehouse.toml syntax and structure")
    )]
    TomlDeError(#[from] toml::de::Error),

    #[error("Repository name cannot be empty")]
    #[diagnostic(
        code(warehouse_config::empty_repository_name),
        help("Give every [[repositories]] entry a `name`")
    )]
    EmptyRepositoryName,

    #[error("Duplicate repository name: {0}")]
    #[diagnostic(
        code(warehouse_config::duplicate_repository),
        help("Each repository must have a unique name")
    )]
    DuplicateRepositoryName(String),

    #[error("Repository {0} has no model")]
    #[diagnostic(
        code(warehouse_config::missing_model),
        help("Set `model` to the model identifier, e.g. \"user\"")
    )]
    MissingModel(String),

    #[error("Invalid scope `{scope}` for repository {repository}")]
    #[diagnostic(
        code(warehouse_config::invalid_scope),
        help("Scopes are operation names: letters, digits and underscores")
    )]
    InvalidScope { repository: String, scope: String },

    #[error("Invalid chainable type: `{0}`")]
    #[diagnostic(
        code(warehouse_config::invalid_chainable_type),
        help("Chainable types are single type-name segments: letters, digits and underscores")
    )]
    InvalidChainableType(String),

    #[error("No repository declared with name: {0}")]
    #[diagnostic(
        code(warehouse_config::missing_repository),
        help("Add a [[repositories]] entry with this name to your configuration")
    )]
    MissingRepository(String),

    #[error("IO error: {0}")]
    #[diagnostic(code(warehouse_config::io))]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
