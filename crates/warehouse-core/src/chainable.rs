//! Decides whether a forwarded result should replace a repository's domain.
//!
//! A result chains when one of its `::`-separated type-name segments is on
//! the allow-list, or when its type name equals the current domain's. The
//! second rule lets homegrown query objects chain without being registered.

use regex::Regex;
pub use warehouse_config::config::DEFAULT_CHAINABLE_TYPES;
use warehouse_config::config::Config;

use crate::{
    error::{Result, WarehouseError},
    value::Value,
};

/// A compiled allow-list of chainable type-name segments.
#[derive(Debug, Clone)]
pub struct ChainableTypes {
    names: Vec<String>,
    pattern: Option<Regex>,
}

impl ChainableTypes {
    pub fn new<I, S>(names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();

        if let Some(empty) = names.iter().position(|n| n.trim().is_empty()) {
            return Err(WarehouseError::InvalidChainableTypes(format!(
                "entry {} is empty",
                empty + 1
            )));
        }

        let pattern = compile(&names)
            .map_err(|e| WarehouseError::InvalidChainableTypes(e.to_string()))?;

        Ok(Self {
            names,
            pattern,
        })
    }

    /// Builds the allow-list from configuration, falling back to
    /// [`DEFAULT_CHAINABLE_TYPES`] when none is configured.
    pub fn from_config(config: &Config) -> Result<Self> {
        match &config.chainable_types {
            Some(names) => Self::new(names.iter().cloned()),
            None => Ok(Self::default()),
        }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Whether any segment of `type_name` is on the allow-list.
    pub fn matches(&self, type_name: &str) -> bool {
        self.pattern
            .as_ref()
            .is_some_and(|pattern| pattern.is_match(type_name))
    }

    /// Classifies a forwarded result against the type of the domain it came
    /// from.
    pub fn is_chainable(&self, previous_type: &str, result_type: &str) -> bool {
        self.matches(result_type) || result_type == previous_type
    }

    /// Classifies a forwarded value. Only domain objects can chain.
    pub fn classify(&self, previous_type: &str, result: &Value) -> bool {
        match result {
            Value::Object(object) => self.is_chainable(previous_type, &object.type_name()),
            _ => false,
        }
    }
}

impl Default for ChainableTypes {
    fn default() -> Self {
        let names: Vec<String> = DEFAULT_CHAINABLE_TYPES
            .iter()
            .map(|n| n.to_string())
            .collect();
        let pattern = compile(&names).expect("unable to compile default chainable types regex");

        Self {
            names,
            pattern,
        }
    }
}

fn compile(names: &[String]) -> std::result::Result<Option<Regex>, regex::Error> {
    if names.is_empty() {
        return Ok(None);
    }

    let alternatives = names
        .iter()
        .map(|n| regex::escape(n))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!("(?:^|::)(?:{alternatives})(?:$|::)")).map(Some)
}
