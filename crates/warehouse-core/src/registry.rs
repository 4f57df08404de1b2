//! Repository types: type-level configuration and dispatch.
//!
//! A [`RepositoryType`] plays the role of a repository class. It is
//! configured once with the domain it wraps, owns the table of methods its
//! author defined, and hands out [`Repository`] instances through
//! [`RepositoryType::query`].
//!
//! Type-level dispatch refuses to reach straight through to the domain:
//! anything the domain answers must be re-exposed by an author method.

use std::{
    collections::HashMap,
    sync::{Arc, PoisonError, RwLock},
};

use tracing::{debug, trace};
use warehouse_config::{config::Config, error::ConfigError};

use crate::{
    chainable::ChainableTypes,
    crud::{self, Record},
    domain::ObjectRef,
    error::{Result, WarehouseError},
    proxy::{Forwarded, Repository},
    resolver::{classify, ResolveModel},
    value::Value,
};

/// An author-defined repository method.
///
/// It receives the repository instance it was sent to, so it can send
/// further operations (`repo.send("where", ..)`) that chain on the same
/// instance.
pub type Method = Arc<dyn Fn(&mut Repository, &[Value]) -> Result<Forwarded> + Send + Sync>;

/// Author-defined methods keyed by name.
#[derive(Default, Clone)]
pub struct MethodTable {
    methods: HashMap<String, Method>,
}

impl MethodTable {
    pub fn get(&self, name: &str) -> Option<&Method> {
        self.methods.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.methods.contains_key(name)
    }

    /// Method names in alphabetical order.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.methods.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.methods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }
}

/// Options accepted by [`RepositoryType::configure`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigureOptions {
    /// Zero-argument operation applied to the resolved model before storing it.
    pub scope: Option<String>,
}

impl ConfigureOptions {
    pub fn scope(scope: impl Into<String>) -> Self {
        Self {
            scope: Some(scope.into()),
        }
    }
}

/// Outcome of a type-level dispatch.
#[derive(Debug)]
pub enum Dispatched {
    /// The call chained; this repository wraps the result.
    Repository(Repository),
    /// The raw result.
    Value(Value),
}

impl Dispatched {
    pub fn into_repository(self) -> Option<Repository> {
        match self {
            Dispatched::Repository(repository) => Some(repository),
            Dispatched::Value(_) => None,
        }
    }

    pub fn into_value(self) -> Option<Value> {
        match self {
            Dispatched::Repository(_) => None,
            Dispatched::Value(value) => Some(value),
        }
    }
}

/// Builder for a [`RepositoryType`].
pub struct RepositoryTypeBuilder {
    name: String,
    methods: HashMap<String, Method>,
    chainable: ChainableTypes,
}

impl RepositoryTypeBuilder {
    /// Defines a repository method. Later definitions replace earlier ones.
    pub fn method<F>(mut self, name: impl Into<String>, method: F) -> Self
    where
        F: Fn(&mut Repository, &[Value]) -> Result<Forwarded> + Send + Sync + 'static,
    {
        self.methods.insert(name.into(), Arc::new(method));
        self
    }

    /// Replaces the default chainable allow-list.
    pub fn chainable(mut self, chainable: ChainableTypes) -> Self {
        self.chainable = chainable;
        self
    }

    pub fn build(self) -> RepositoryType {
        RepositoryType {
            name: self.name,
            domain: RwLock::new(None),
            methods: Arc::new(MethodTable {
                methods: self.methods,
            }),
            chainable: RwLock::new(Arc::new(self.chainable)),
        }
    }
}

/// A repository "class": the configured domain plus author-defined methods.
///
/// Meant to be built once and kept in a static, e.g.
///
/// ```ignore
/// static USERS: LazyLock<RepositoryType> = LazyLock::new(|| {
///     RepositoryType::builder("UserRepository")
///         .method("confirmed", |repo, _| repo.send("where_not", &["confirmed_at".into(), Value::Nil]))
///         .build()
/// });
/// USERS.configure(&models, "user", ConfigureOptions::scope("all"))?;
/// let confirmed = USERS.dispatch("confirmed", &[])?;
/// ```
pub struct RepositoryType {
    name: String,
    domain: RwLock<Option<ObjectRef>>,
    methods: Arc<MethodTable>,
    chainable: RwLock<Arc<ChainableTypes>>,
}

impl RepositoryType {
    pub fn builder(name: impl Into<String>) -> RepositoryTypeBuilder {
        RepositoryTypeBuilder {
            name: name.into(),
            methods: HashMap::new(),
            chainable: ChainableTypes::default(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn methods(&self) -> &MethodTable {
        &self.methods
    }

    /// The configured domain, if any.
    pub fn domain(&self) -> Option<ObjectRef> {
        self.domain
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn chainable(&self) -> Arc<ChainableTypes> {
        self.chainable
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn set_chainable(&self, chainable: ChainableTypes) {
        *self
            .chainable
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Arc::new(chainable);
    }

    /// Resolves `model` and stores it (or the result of the `scope` option
    /// applied to it) as this type's domain.
    ///
    /// Configuring again overwrites the previous domain.
    pub fn configure(
        &self,
        resolver: &dyn ResolveModel,
        model: &str,
        options: ConfigureOptions,
    ) -> Result<&Self> {
        let class_name = classify(model);
        let resolved = resolver
            .resolve(&class_name)
            .ok_or_else(|| WarehouseError::UnknownModel(class_name.clone()))?;

        let domain = match options.scope.as_deref() {
            Some(scope) => apply_scope(resolved, scope)?,
            None => resolved,
        };

        debug!(
            repository = %self.name,
            model = %class_name,
            scope = options.scope.as_deref().unwrap_or("-"),
            domain = %domain.type_name(),
            "configured repository"
        );

        let mut current = self.domain.write().unwrap_or_else(PoisonError::into_inner);
        if current.is_some() {
            debug!(repository = %self.name, "overwriting previous domain");
        }
        *current = Some(domain);

        Ok(self)
    }

    /// Configures this type from the declaration carrying its name.
    ///
    /// A configured chainable allow-list replaces this type's allow-list.
    pub fn apply_config(&self, config: &Config, resolver: &dyn ResolveModel) -> Result<&Self> {
        let declaration = config
            .get_repository(&self.name)
            .ok_or_else(|| ConfigError::MissingRepository(self.name.clone()))?;

        if config.chainable_types.is_some() {
            self.set_chainable(ChainableTypes::from_config(config)?);
        }

        let options = ConfigureOptions {
            scope: declaration.scope.clone(),
        };
        self.configure(resolver, &declaration.model, options)
    }

    /// A new repository over the configured domain.
    pub fn query(&self) -> Result<Repository> {
        let domain = self
            .domain()
            .ok_or_else(|| WarehouseError::NotConfigured(self.name.clone()))?;
        Ok(self.query_with(domain))
    }

    /// A new repository over `domain`, sharing this type's methods.
    pub fn query_with(&self, domain: ObjectRef) -> Repository {
        Repository::with_parts(domain, Arc::clone(&self.methods), self.chainable())
    }

    /// Type-level dispatch.
    ///
    /// Author-defined methods run on a fresh [`query`](Self::query). Names
    /// the configured domain answers directly are refused with
    /// [`WarehouseError::DomainMethod`]. Everything else goes to a fresh
    /// query, which reports it as unsupported.
    pub fn dispatch(&self, operation: &str, args: &[Value]) -> Result<Dispatched> {
        if !self.methods.contains(operation) {
            if let Some(domain) = self.domain() {
                if domain.responds_to(operation) {
                    return Err(WarehouseError::DomainMethod {
                        operation: operation.to_string(),
                    });
                }
            }
        }

        trace!(repository = %self.name, operation, "type-level dispatch");
        let mut repository = self.query()?;
        match repository.send(operation, args)? {
            Forwarded::Chained => Ok(Dispatched::Repository(repository)),
            Forwarded::Value(value) => Ok(Dispatched::Value(value)),
        }
    }

    /// Saves `record` unless it is already persisted.
    pub fn create<R: Record + ?Sized>(&self, record: &mut R, extra: &[Value]) -> Result<bool> {
        trace!(repository = %self.name, "create");
        crud::create(record, extra)
    }

    /// Saves `record` unless it is new.
    pub fn update<R: Record + ?Sized>(&self, record: &mut R, extra: &[Value]) -> Result<bool> {
        trace!(repository = %self.name, "update");
        crud::update(record, extra)
    }

    /// Destroys `record` unless it is new.
    pub fn destroy<'r, R: Record + ?Sized>(&self, record: &'r mut R) -> Result<Option<&'r mut R>> {
        trace!(repository = %self.name, "destroy");
        crud::destroy(record)
    }
}

fn apply_scope(model: ObjectRef, scope: &str) -> Result<ObjectRef> {
    if !model.responds_to(scope) {
        return Err(WarehouseError::UnsupportedOperation {
            operation: scope.to_string(),
            receiver: model.type_name(),
        });
    }

    model
        .invoke(scope, &[])?
        .into_object()
        .ok_or_else(|| WarehouseError::InvalidScope {
            scope: scope.to_string(),
            receiver: model.type_name(),
        })
}

#[cfg(test)]
mod tests {
    use std::{any::Any, sync::Mutex};

    use super::*;
    use crate::{
        crud::tests::StubRecord,
        domain::{unsupported, DomainObject},
        proxy::tests::Finder,
        resolver::ModelTable,
    };

    /// Stands in for a model type: `all` and `where` produce finders.
    #[derive(Default)]
    struct Model {
        calls: Mutex<Vec<String>>,
    }

    impl DomainObject for Model {
        fn type_name(&self) -> String {
            "Model::Table".to_string()
        }

        fn responds_to(&self, operation: &str) -> bool {
            matches!(operation, "all" | "where" | "name" | "custom_scope")
        }

        fn invoke(&self, operation: &str, args: &[Value]) -> Result<Value> {
            self.calls.lock().unwrap().push(operation.to_string());
            match operation {
                "all" => Ok(Value::Object(Arc::new(Finder::default()))),
                "where" => Finder::default().invoke("where", args),
                "name" => Ok(Value::from("Model")),
                "custom_scope" => Ok(Value::from("from the model")),
                _ => Err(unsupported(operation, self)),
            }
        }

        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    fn models() -> ModelTable {
        let mut models = ModelTable::new();
        models.register("Model", Model::default());
        models
    }

    fn repository_type() -> RepositoryType {
        RepositoryType::builder("ModelRepository")
            .method("custom_scope", |_, _| Ok(Forwarded::Value(Value::from("custom"))))
            .method("active", |repo, _| repo.send("where", &["active".into()]))
            .method("active_count", |repo, _| {
                repo.chain("active", &[])?;
                repo.send("count", &[])
            })
            .build()
    }

    fn finder_filters(repository: &Repository) -> Vec<String> {
        repository
            .domain()
            .as_any()
            .downcast_ref::<Finder>()
            .map(|f| f.filters.clone())
            .unwrap_or_default()
    }

    #[test]
    fn test_configure_without_scope_stores_model() {
        let models = models();
        let repositories = repository_type();

        repositories
            .configure(&models, "model", ConfigureOptions::default())
            .unwrap();

        let domain = repositories.domain().unwrap();
        assert!(Arc::ptr_eq(&domain, &models.resolve("Model").unwrap()));
    }

    #[test]
    fn test_configure_with_scope_stores_scope_result() {
        let repositories = repository_type();
        repositories
            .configure(&models(), "models", ConfigureOptions::scope("all"))
            .unwrap();

        assert_eq!(repositories.domain().unwrap().type_name(), "Finder");
    }

    #[test]
    fn test_configure_is_fluent_and_overwrites() {
        let models = models();
        let repositories = repository_type();

        let configured = repositories
            .configure(&models, "model", ConfigureOptions::scope("all"))
            .unwrap()
            .configure(&models, "model", ConfigureOptions::default())
            .unwrap();

        assert_eq!(configured.domain().unwrap().type_name(), "Model::Table");
    }

    #[test]
    fn test_configure_unknown_model() {
        let err = repository_type()
            .configure(&models(), "post", ConfigureOptions::default())
            .err()
            .unwrap();
        assert!(matches!(err, WarehouseError::UnknownModel(name) if name == "Post"));
    }

    #[test]
    fn test_configure_with_unsupported_scope() {
        let err = repository_type()
            .configure(&models(), "model", ConfigureOptions::scope("visible"))
            .err()
            .unwrap();
        assert!(matches!(err, WarehouseError::UnsupportedOperation { .. }));
    }

    #[test]
    fn test_configure_with_non_object_scope() {
        let err = repository_type()
            .configure(&models(), "model", ConfigureOptions::scope("name"))
            .err()
            .unwrap();
        assert!(matches!(err, WarehouseError::InvalidScope { .. }));
    }

    #[test]
    fn test_query_requires_configuration() {
        let err = repository_type().query().unwrap_err();
        assert!(matches!(err, WarehouseError::NotConfigured(name) if name == "ModelRepository"));
    }

    #[test]
    fn test_query_wraps_configured_domain() {
        let repositories = repository_type();
        repositories
            .configure(&models(), "model", ConfigureOptions::scope("all"))
            .unwrap();

        let repository = repositories.query().unwrap();
        assert!(Arc::ptr_eq(
            repository.domain(),
            &repositories.domain().unwrap()
        ));
    }

    #[test]
    fn test_query_with_custom_domain() {
        let repositories = repository_type();
        let custom: ObjectRef = Arc::new(Finder::with_filters(&["test"]));

        let repository = repositories.query_with(Arc::clone(&custom));

        assert!(Arc::ptr_eq(repository.domain(), &custom));
        assert!(repository.responds_to("active"));
    }

    #[test]
    fn test_instance_delegates_to_domain() {
        let repositories = repository_type();
        repositories
            .configure(&models(), "model", ConfigureOptions::scope("all"))
            .unwrap();

        let mut repository = repositories.query().unwrap();
        let outcome = repository.send("where", &["test".into()]).unwrap();

        assert!(outcome.is_chained());
        assert_eq!(finder_filters(&repository), vec!["test"]);
    }

    #[test]
    fn test_dispatch_runs_author_method() {
        let repositories = repository_type();
        repositories
            .configure(&models(), "model", ConfigureOptions::scope("all"))
            .unwrap();

        let repository = repositories
            .dispatch("active", &[])
            .unwrap()
            .into_repository()
            .unwrap();
        assert_eq!(finder_filters(&repository), vec!["active"]);

        let count = repositories.dispatch("active_count", &[]).unwrap();
        assert_eq!(count.into_value(), Some(Value::Int(1)));
    }

    #[test]
    fn test_dispatch_matches_instance_call() {
        let repositories = repository_type();
        repositories
            .configure(&models(), "model", ConfigureOptions::scope("all"))
            .unwrap();

        let from_type = repositories.dispatch("custom_scope", &[]).unwrap();
        let from_instance = repositories
            .query_with(Arc::new(Finder::default()))
            .send("custom_scope", &[])
            .unwrap();

        assert_eq!(from_type.into_value(), from_instance.into_value());
    }

    #[test]
    fn test_dispatch_author_method_wins_over_domain() {
        let repositories = repository_type();
        repositories
            .configure(&models(), "model", ConfigureOptions::default())
            .unwrap();

        let value = repositories.dispatch("custom_scope", &[]).unwrap();
        assert_eq!(value.into_value(), Some(Value::from("custom")));
    }

    #[test]
    fn test_dispatch_refuses_domain_methods() {
        let repositories = repository_type();
        repositories
            .configure(&models(), "model", ConfigureOptions::scope("all"))
            .unwrap();

        let err = repositories.dispatch("where", &["x".into()]).unwrap_err();
        assert!(matches!(
            err,
            WarehouseError::DomainMethod { ref operation } if operation == "where"
        ));
    }

    #[test]
    fn test_dispatch_unknown_operation() {
        let repositories = repository_type();
        repositories
            .configure(&models(), "model", ConfigureOptions::scope("all"))
            .unwrap();

        let err = repositories.dispatch("explode", &[]).unwrap_err();
        assert!(matches!(err, WarehouseError::UnsupportedOperation { .. }));
    }

    #[test]
    fn test_crud_helpers() {
        let repositories = repository_type();

        let mut fresh = StubRecord::fresh();
        assert!(!repositories.update(&mut fresh, &[]).unwrap());
        assert!(repositories.destroy(&mut fresh).unwrap().is_none());
        assert!(repositories.create(&mut fresh, &[]).unwrap());
        assert_eq!(fresh.saves, 1);

        let mut stored = StubRecord::stored();
        assert!(!repositories.create(&mut stored, &[]).unwrap());
        assert!(repositories.update(&mut stored, &[]).unwrap());
        assert_eq!(repositories.destroy(&mut stored).unwrap().unwrap().destroys, 1);
    }

    #[test]
    fn test_apply_config() {
        let config = Config::from_toml_str(
            r#"
            chainable_types = ["Finder"]

            [[repositories]]
            name = "ModelRepository"
            model = "model"
            scope = "all"
            "#,
        )
        .unwrap();

        let repositories = repository_type();
        repositories.apply_config(&config, &models()).unwrap();

        assert_eq!(repositories.domain().unwrap().type_name(), "Finder");
        assert_eq!(repositories.chainable().names(), ["Finder".to_string()]);
    }

    #[test]
    fn test_apply_config_without_declaration() {
        let err = repository_type()
            .apply_config(&Config::default(), &models())
            .err()
            .unwrap();
        assert!(matches!(
            err,
            WarehouseError::Config(ConfigError::MissingRepository(_))
        ));
    }
}
