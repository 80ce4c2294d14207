use std::{collections::HashMap, sync::Arc};

use crate::{
    autowirer::Autowirer,
    autowiring::AutowiringContainer,
    container::{BindingSource, CompositeContainer, IntoBindingSource},
    registry::ClassRegistry,
    resolver::UntypedParamResolver,
    types::{Binding, Callable, Injectable},
};

/// Assembles bindings, fallback containers and untyped-parameter resolvers,
/// then builds the resolving container
pub struct ContainerBuilder {
    registry: Arc<ClassRegistry>,
    bindings: HashMap<String, Binding>,
    fallbacks: Vec<Arc<dyn BindingSource>>,
    untyped_resolvers: Vec<Arc<dyn UntypedParamResolver>>,
}

impl ContainerBuilder {
    pub fn new(registry: Arc<ClassRegistry>) -> Self {
        ContainerBuilder {
            registry,
            bindings: HashMap::new(),
            fallbacks: Vec::new(),
            untyped_resolvers: Vec::new(),
        }
    }

    /// Bind a ready value
    pub fn bind_instance<T: Injectable>(mut self, id: impl Into<String>, value: T) -> Self {
        self.bindings.insert(id.into(), Binding::instance(value));
        self
    }

    /// Bind an already shared value
    pub fn bind_shared<T: Injectable>(mut self, id: impl Into<String>, value: Arc<T>) -> Self {
        self.bindings.insert(id.into(), Binding::shared(value));
        self
    }

    /// Bind a forwarding pointer to another identifier
    pub fn bind_alias(mut self, id: impl Into<String>, target: impl Into<String>) -> Self {
        self.bindings.insert(id.into(), Binding::alias(target));
        self
    }

    /// Bind a factory
    pub fn bind_callable(mut self, id: impl Into<String>, callable: Callable) -> Self {
        self.bindings.insert(id.into(), Binding::Callable(callable));
        self
    }

    pub fn bind(mut self, id: impl Into<String>, binding: Binding) -> Self {
        self.bindings.insert(id.into(), binding);
        self
    }

    /// Append a fallback container consulted after the local bindings
    pub fn with_container(mut self, sub: impl IntoBindingSource) -> Self {
        self.fallbacks.push(sub.into_binding_source());
        self
    }

    /// Append a resolver for untyped parameters; earlier registrations win
    pub fn with_untyped_param_resolver(
        mut self,
        resolver: Arc<dyn UntypedParamResolver>,
    ) -> Self {
        self.untyped_resolvers.push(resolver);
        self
    }

    pub fn build(self) -> Arc<AutowiringContainer> {
        let mut bindings = CompositeContainer::new(self.bindings);
        for sub in self.fallbacks {
            bindings = bindings.with_container(sub);
        }

        let mut autowirer = Autowirer::new(self.registry);
        for resolver in self.untyped_resolvers {
            autowirer = autowirer.with_untyped_param_resolver(resolver);
        }

        AutowiringContainer::new(bindings, autowirer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::Container;

    struct Greeting(&'static str);

    #[test]
    fn built_containers_serve_their_bindings() {
        let container = ContainerBuilder::new(Arc::new(ClassRegistry::new()))
            .bind_instance("greeting", Greeting("hello"))
            .bind_alias("hi", "greeting")
            .build();

        assert!(container.has("greeting"));
        let greeting = container.get_as::<Greeting>("hi").unwrap();
        assert_eq!(greeting.0, "hello");
    }

    #[test]
    fn fallback_containers_are_appended() {
        let mut sub = HashMap::new();
        sub.insert("flag".to_string(), Binding::instance(Greeting("set")));

        let container = ContainerBuilder::new(Arc::new(ClassRegistry::new()))
            .with_container(sub)
            .build();

        assert!(container.has("flag"));
    }
}
