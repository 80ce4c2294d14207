use std::{
    collections::HashMap,
    fmt::Debug,
    sync::{Arc, RwLock},
};

use tracing::{debug, error};

use crate::{
    autowirer::Autowirer,
    container::{BindingSource, CompositeContainer, Container},
    errors::{AutowireError, ResolveError},
    types::{Binding, Callable, Injectable, Instance, Value},
};

/// The resolving container
///
/// Combines the bound map (local bindings plus fallback containers) with a
/// memoization cache and an [`Autowirer`]: aliases are chased, callable
/// chains are driven until the requested type appears, and unbound class
/// identifiers are constructed from their declared parameters.
///
/// The cache is seeded with the container itself and its autowirer, so both
/// can be declared as constructor dependencies like anything else. Entries
/// are written once on first resolution and never replaced, which is what
/// makes `get` idempotent.
pub struct AutowiringContainer {
    bindings: CompositeContainer,
    autowirer: Arc<Autowirer>,
    resolved: RwLock<HashMap<String, Value>>,
}

impl AutowiringContainer {
    pub fn new(bindings: CompositeContainer, autowirer: Autowirer) -> Arc<Self> {
        let autowirer = Arc::new(autowirer);
        let container = Arc::new(AutowiringContainer {
            bindings,
            autowirer: autowirer.clone(),
            resolved: RwLock::new(HashMap::new()),
        });

        // Bootstrap entries: the container and its engine resolve to themselves
        let mut resolved = container.resolved.write().unwrap();
        resolved.insert(
            Self::id().to_string(),
            Value::Instance(Instance::from_arc(container.clone())),
        );
        resolved.insert(
            Autowirer::id().to_string(),
            Value::Instance(Instance::from_arc(autowirer)),
        );
        drop(resolved);

        container
    }

    /// Identifier this container caches itself under
    pub fn id() -> &'static str {
        std::any::type_name::<AutowiringContainer>()
    }

    pub fn autowirer(&self) -> &Arc<Autowirer> {
        &self.autowirer
    }

    /// Downcasting accessor over [`Container::get`]
    pub fn get_as<T: Injectable>(&self, id: &str) -> Result<Arc<T>, ResolveError> {
        self.get(id)?.downcast()
    }

    fn cached(&self, id: &str) -> Option<Value> {
        self.resolved.read().unwrap().get(id).cloned()
    }

    /// Insert-once memoization; an entry already written by a nested
    /// resolution wins over `value`
    fn remember(&self, id: &str, value: Value) -> Value {
        let mut resolved = self.resolved.write().unwrap();
        resolved.entry(id.to_string()).or_insert(value).clone()
    }

    fn resolve_binding(&self, id: &str, binding: Binding) -> Result<Value, ResolveError> {
        match binding {
            Binding::Instance(instance) => {
                debug!("Serving bound instance for {}", id);
                Ok(self.remember(id, Value::Instance(instance)))
            }
            Binding::Alias(target) => {
                debug!("Following alias {} -> {}", id, target);
                let value = self.get(&target)?;
                Ok(self.remember(id, value))
            }
            Binding::Callable(callable) => {
                let value = self.resolve_callable(id, callable)?;
                Ok(self.remember(id, value))
            }
        }
    }

    /// Callable-chain resolution
    ///
    /// For a registered class or interface identifier the current value is
    /// re-invoked while it is callable and not yet an instance of the
    /// identifier - checked before every invocation, so an invokable object
    /// that already satisfies the identifier is returned un-invoked. Opaque
    /// keys have no type to converge on: exactly one invocation, and the
    /// result is served as-is even if it is itself callable.
    fn resolve_callable(&self, id: &str, callable: Callable) -> Result<Value, ResolveError> {
        let registry = self.autowirer.registry();

        if !registry.contains(id) {
            debug!("Invoking the callable bound to opaque key {}", id);
            return self
                .autowirer
                .autowire_callable(self, &callable)
                .map_err(|source| fail(id, source));
        }

        let mut value = Value::Callable(callable);
        loop {
            if registry.is_instance(&value, id) {
                return Ok(value);
            }
            match value {
                Value::Callable(callable) => {
                    debug!("Invoking {} while resolving {}", callable.describe(), id);
                    value = self
                        .autowirer
                        .autowire_callable(self, &callable)
                        .map_err(|source| fail(id, source))?;
                }
                terminal => {
                    return Err(ResolveError::WrongProduct {
                        id: id.to_string(),
                        actual: terminal.type_label().to_string(),
                    });
                }
            }
        }
    }
}

fn fail(id: &str, source: AutowireError) -> ResolveError {
    error!("Resolution of {} failed: {}", id, source);
    ResolveError::Failed {
        id: id.to_string(),
        source: Box::new(source),
    }
}

impl Container for AutowiringContainer {
    /// Bound, already resolved, or constructible - checked in that order.
    /// A pure probe: the cache is not touched and nothing is constructed.
    fn has(&self, id: &str) -> bool {
        self.bindings.has(id)
            || self.resolved.read().unwrap().contains_key(id)
            || self.autowirer.can_autowire(self, id)
    }

    fn get(&self, id: &str) -> Result<Value, ResolveError> {
        if let Some(value) = self.cached(id) {
            debug!("Serving cached value for {}", id);
            return Ok(value);
        }

        if self.bindings.has(id) {
            let binding = self.bindings.get(id)?;
            return self.resolve_binding(id, binding);
        }

        debug!("Nothing bound for {}, attempting to autowire", id);
        match self.autowirer.autowire(self, id) {
            Ok(instance) => Ok(self.remember(id, Value::Instance(instance))),
            Err(AutowireError::Wiring(_)) => Err(ResolveError::NotFound(id.to_string())),
            Err(other) => Err(fail(id, other)),
        }
    }
}

impl Debug for AutowiringContainer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let resolved = self.resolved.read().unwrap();
        let mut ids = resolved.keys().collect::<Vec<_>>();
        ids.sort();
        f.debug_struct("AutowiringContainer")
            .field("bindings", &self.bindings)
            .field("resolved", &ids)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::registry::{ClassDescriptor, ClassRegistry};

    #[derive(Default)]
    struct Engine;

    fn container_with(registry: ClassRegistry) -> Arc<AutowiringContainer> {
        AutowiringContainer::new(
            CompositeContainer::new(HashMap::new()),
            Autowirer::new(Arc::new(registry)),
        )
    }

    #[test]
    fn the_container_resolves_itself() {
        let container = container_with(ClassRegistry::new());
        let me = container
            .get_as::<AutowiringContainer>(AutowiringContainer::id())
            .unwrap();
        assert!(Arc::ptr_eq(&me, &container));
    }

    #[test]
    fn the_autowirer_is_pre_resolved() {
        let container = container_with(ClassRegistry::new());
        let autowirer = container.get_as::<Autowirer>(Autowirer::id()).unwrap();
        assert!(Arc::ptr_eq(&autowirer, container.autowirer()));
    }

    #[test]
    fn an_unbound_opaque_key_is_not_found() {
        let container = container_with(ClassRegistry::new());
        assert!(!container.has("nothing.here"));
        assert!(matches!(
            container.get("nothing.here"),
            Err(ResolveError::NotFound(_))
        ));
    }

    #[test]
    fn probing_does_not_populate_the_cache() {
        let constructions = Arc::new(AtomicUsize::new(0));
        let counter = constructions.clone();
        let registry = ClassRegistry::new().with_class(
            ClassDescriptor::concrete::<Engine>("Engine").with_constructor(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(Instance::new(Engine))
            }),
        );
        let container = container_with(registry);

        assert!(container.has("Engine"));
        assert_eq!(constructions.load(Ordering::SeqCst), 0);
        assert!(!container.resolved.read().unwrap().contains_key("Engine"));

        container.get("Engine").unwrap();
        container.get("Engine").unwrap();
        assert_eq!(constructions.load(Ordering::SeqCst), 1);
    }
}
