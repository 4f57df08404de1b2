use std::{
    collections::HashSet,
    fs,
    path::{Path, PathBuf},
    sync::{LazyLock, PoisonError, RwLock},
};

use regex::Regex;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::{
    error::{ConfigError, Result},
    repository::RepositoryConfig,
};

/// Type-name segments that make a forwarded result chainable when nothing
/// else is configured: the model type, the relation type and the
/// association-relation type of the SQL layer.
pub const DEFAULT_CHAINABLE_TYPES: [&str; 3] = ["Table", "Relation", "AssociationRelation"];

static TYPE_SEGMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("unable to compile type segment regex")
});

/// Warehouse configuration
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct Config {
    /// Type-name segments whose values keep chaining when a repository forwards a call.
    /// A result also chains when its type equals the type of the domain it came from.
    /// Default: ["Table", "Relation", "AssociationRelation"]
    pub chainable_types: Option<Vec<String>>,

    /// Repository declarations, one per repository type.
    #[serde(default)]
    pub repositories: Vec<RepositoryConfig>,
}

pub static CONFIG: LazyLock<RwLock<Option<Config>>> = LazyLock::new(|| RwLock::new(None));

pub static CONFIG_PATH: LazyLock<RwLock<PathBuf>> = LazyLock::new(|| {
    RwLock::new(match std::env::var("WAREHOUSE_CONFIG") {
        Ok(path_str) => PathBuf::from(path_str),
        Err(_) => PathBuf::from("warehouse.toml"),
    })
});

fn config_path() -> PathBuf {
    CONFIG_PATH
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .to_path_buf()
}

/// Loads the configuration file into the global [`CONFIG`].
pub fn init() -> Result<()> {
    let config = Config::new()?;
    *CONFIG.write().unwrap_or_else(PoisonError::into_inner) = Some(config);
    Ok(())
}

/// Returns the global configuration, falling back to the defaults when
/// [`init`] has not run.
pub fn get_config() -> Config {
    if let Some(config) = CONFIG
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .as_ref()
    {
        return config.clone();
    }

    let mut guard = CONFIG.write().unwrap_or_else(PoisonError::into_inner);
    guard.get_or_insert_with(Config::default_config).clone()
}

impl Config {
    pub fn default_config() -> Self {
        Self {
            chainable_types: Some(
                DEFAULT_CHAINABLE_TYPES
                    .iter()
                    .map(|name| name.to_string())
                    .collect(),
            ),
            repositories: Vec::new(),
        }
    }

    /// Loads the configuration from [`CONFIG_PATH`].
    /// If the file is not found, the default configuration is used.
    pub fn new() -> Result<Self> {
        let path = config_path();
        match fs::read_to_string(&path) {
            Ok(content) => Self::from_toml_str(&content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!(
                    "No configuration found at {}, using defaults",
                    path.display()
                );
                Ok(Self::default_config())
            }
            Err(err) => Err(ConfigError::IoError(err)),
        }
    }

    /// Loads and validates the configuration at `path`.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        debug!("loading configuration from {}", path.as_ref().display());
        Self::from_toml_str(&content)
    }

    /// Parses and validates a configuration document.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let mut config: Config = toml::from_str(content)?;
        config.resolve()?;
        Ok(config)
    }

    pub fn resolve(&mut self) -> Result<()> {
        if let Some(types) = &mut self.chainable_types {
            for name in types.iter_mut() {
                let trimmed = name.trim();
                if !TYPE_SEGMENT.is_match(trimmed) {
                    return Err(ConfigError::InvalidChainableType(name.clone()));
                }
                *name = trimmed.to_string();
            }
        }

        let mut seen = HashSet::new();
        for repo in &mut self.repositories {
            repo.name = repo.name.trim().to_string();
            repo.validate()?;
            if !seen.insert(repo.name.clone()) {
                return Err(ConfigError::DuplicateRepositoryName(repo.name.clone()));
            }
        }

        Ok(())
    }

    pub fn get_repository(&self, name: &str) -> Option<&RepositoryConfig> {
        self.repositories.iter().find(|repo| repo.name == name)
    }
}
