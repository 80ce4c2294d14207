use std::{collections::HashMap, fmt::Debug, sync::Arc};

use crate::{
    errors::ResolveError,
    types::{Binding, Value},
};

/// Read access to registered bindings, uninterpreted
///
/// Implementations serve the bound value verbatim: an alias stays a string,
/// a callable stays un-invoked. Interpretation is the resolving container's
/// job.
pub trait BindingSource: Send + Sync {
    fn has(&self, id: &str) -> bool;

    /// The bound value verbatim; fails with
    /// [`ResolveError::NotFound`] when `has(id)` is false
    fn get(&self, id: &str) -> Result<Binding, ResolveError>;
}

/// The resolving contract the rest of the application depends on
pub trait Container: Send + Sync {
    /// Pure query: never mutates, never fails
    fn has(&self, id: &str) -> bool;

    /// Resolve `id` to a finished value
    ///
    /// Repeated calls with the same identifier return the same reference.
    fn get(&self, id: &str) -> Result<Value, ResolveError>;
}

/// Flat map of bindings, fixed at construction
pub struct MapContainer {
    bindings: HashMap<String, Binding>,
}

impl MapContainer {
    pub fn new(bindings: HashMap<String, Binding>) -> Self {
        MapContainer { bindings }
    }
}

impl From<HashMap<String, Binding>> for MapContainer {
    fn from(bindings: HashMap<String, Binding>) -> Self {
        Self::new(bindings)
    }
}

impl BindingSource for MapContainer {
    fn has(&self, id: &str) -> bool {
        self.bindings.contains_key(id)
    }

    fn get(&self, id: &str) -> Result<Binding, ResolveError> {
        self.bindings
            .get(id)
            .cloned()
            .ok_or_else(|| ResolveError::NotFound(id.to_string()))
    }
}

impl Debug for MapContainer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut map = f.debug_struct("MapContainer");
        for (id, binding) in &self.bindings {
            map.field(id, &binding_label(binding));
        }
        map.finish()
    }
}

fn binding_label(binding: &Binding) -> String {
    match binding {
        Binding::Instance(instance) => instance.info.type_name.to_string(),
        Binding::Alias(target) => format!("alias -> {target}"),
        Binding::Callable(callable) => format!("callable {}", callable.describe()),
    }
}

/// Flat map plus an append-ordered list of fallback containers
///
/// Fallbacks are consulted in append order when the local map misses; they
/// never shadow a local binding.
pub struct CompositeContainer {
    local: MapContainer,
    fallbacks: Vec<Arc<dyn BindingSource>>,
}

impl CompositeContainer {
    pub fn new(bindings: HashMap<String, Binding>) -> Self {
        CompositeContainer {
            local: MapContainer::new(bindings),
            fallbacks: Vec::new(),
        }
    }

    /// Append a fallback container; a plain mapping is wrapped in a
    /// [`MapContainer`] first
    pub fn with_container(mut self, sub: impl IntoBindingSource) -> Self {
        self.fallbacks.push(sub.into_binding_source());
        self
    }
}

impl BindingSource for CompositeContainer {
    fn has(&self, id: &str) -> bool {
        self.local.has(id) || self.fallbacks.iter().any(|sub| sub.has(id))
    }

    fn get(&self, id: &str) -> Result<Binding, ResolveError> {
        if self.local.has(id) {
            return self.local.get(id);
        }
        for sub in &self.fallbacks {
            if sub.has(id) {
                return sub.get(id);
            }
        }
        Err(ResolveError::NotFound(id.to_string()))
    }
}

impl Debug for CompositeContainer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompositeContainer")
            .field("local", &self.local)
            .field("fallbacks", &self.fallbacks.len())
            .finish()
    }
}

/// Anything acceptable as a fallback container
pub trait IntoBindingSource {
    fn into_binding_source(self) -> Arc<dyn BindingSource>;
}

impl IntoBindingSource for HashMap<String, Binding> {
    fn into_binding_source(self) -> Arc<dyn BindingSource> {
        Arc::new(MapContainer::new(self))
    }
}

impl IntoBindingSource for MapContainer {
    fn into_binding_source(self) -> Arc<dyn BindingSource> {
        Arc::new(self)
    }
}

impl IntoBindingSource for CompositeContainer {
    fn into_binding_source(self) -> Arc<dyn BindingSource> {
        Arc::new(self)
    }
}

impl IntoBindingSource for Arc<dyn BindingSource> {
    fn into_binding_source(self) -> Arc<dyn BindingSource> {
        self
    }
}
