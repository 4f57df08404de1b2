//! Name to model resolution.
//!
//! Repositories are configured with a model identifier such as `user` or
//! `admin/user_accounts`. The identifier is classified into a type name
//! (`User`, `Admin::UserAccount`) and looked up through [`ResolveModel`].

use std::{collections::HashMap, sync::Arc};

use crate::domain::{DomainObject, ObjectRef};

/// Resolves a classified model name to the domain object standing for it.
pub trait ResolveModel {
    fn resolve(&self, name: &str) -> Option<ObjectRef>;
}

/// A lookup table of model types keyed by classified name.
#[derive(Default, Clone)]
pub struct ModelTable {
    models: HashMap<String, ObjectRef>,
}

impl ModelTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `model` under `name`. The name is classified first, so
    /// `register("users", ..)` and `register("User", ..)` are equivalent.
    pub fn register<T: DomainObject>(&mut self, name: &str, model: T) -> &mut Self {
        self.register_ref(name, Arc::new(model))
    }

    pub fn register_ref(&mut self, name: &str, model: ObjectRef) -> &mut Self {
        self.models.insert(classify(name), model);
        self
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

impl ResolveModel for ModelTable {
    fn resolve(&self, name: &str) -> Option<ObjectRef> {
        self.models.get(&classify(name)).cloned()
    }
}

impl<F> ResolveModel for F
where
    F: Fn(&str) -> Option<ObjectRef>,
{
    fn resolve(&self, name: &str) -> Option<ObjectRef> {
        self(name)
    }
}

/// Turns a model identifier into a type name.
///
/// The last path segment is singularized, `_`-separated words are
/// camel-cased and `/` becomes `::`. Names that are already classified come
/// back unchanged.
pub fn classify(name: &str) -> String {
    let segments: Vec<&str> = name
        .trim()
        .split(['/', ':'])
        .filter(|s| !s.is_empty())
        .collect();
    let last = segments.len().saturating_sub(1);

    segments
        .iter()
        .enumerate()
        .map(|(i, segment)| {
            if i == last {
                camelize(&singularize(segment))
            } else {
                camelize(segment)
            }
        })
        .collect::<Vec<_>>()
        .join("::")
}

fn camelize(word: &str) -> String {
    word.split('_')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect()
}

fn singularize(word: &str) -> String {
    let lower = word.to_ascii_lowercase();

    if let Some(stem) = lower.strip_suffix("ies") {
        if !stem.is_empty() {
            return format!("{}y", &word[..stem.len()]);
        }
    }

    for suffix in ["sses", "shes", "ches", "xes"] {
        if lower.ends_with(suffix) && lower.len() > suffix.len() {
            return word[..word.len() - 2].to_string();
        }
    }

    if lower.ends_with('s') && !lower.ends_with("ss") && !lower.ends_with("us") && lower.len() > 1 {
        return word[..word.len() - 1].to_string();
    }

    word.to_string()
}
