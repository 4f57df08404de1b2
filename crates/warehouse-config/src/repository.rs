use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;

use crate::error::{ConfigError, Result};

static SCOPE_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*[?!]?$").expect("unable to compile scope name regex")
});

/// Binds a repository type to the model it wraps.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct RepositoryConfig {
    /// Name of the repository type this entry configures (e.g. "UserRepository").
    pub name: String,

    /// Model identifier, resolved to a model type (e.g. "user" or "admin/users").
    pub model: String,

    /// Zero-argument scope applied to the model before it is wrapped (e.g. "all").
    /// Default: the model itself
    pub scope: Option<String>,
}

impl RepositoryConfig {
    pub fn new(name: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            model: model.into(),
            scope: None,
        }
    }

    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = Some(scope.into());
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::EmptyRepositoryName);
        }
        if self.model.trim().is_empty() {
            return Err(ConfigError::MissingModel(self.name.clone()));
        }
        if let Some(scope) = &self.scope {
            if !is_scope_name(scope) {
                return Err(ConfigError::InvalidScope {
                    repository: self.name.clone(),
                    scope: scope.clone(),
                });
            }
        }
        Ok(())
    }
}

fn is_scope_name(scope: &str) -> bool {
    SCOPE_NAME.is_match(scope)
}
