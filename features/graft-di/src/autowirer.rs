use std::{fmt::Debug, sync::Arc};

use tracing::debug;

use crate::{
    container::Container,
    errors::{AutowireError, ResolveError, WiringError},
    registry::{ClassDescriptor, ClassRegistry},
    resolver::UntypedParamResolver,
    types::{Callable, Instance, ParamInfo, Value},
};

/// Deferred argument factory for one parameter
///
/// Captures the wiring decision only; nothing is resolved until the factory
/// is invoked against a container.
pub type ArgFactory = Arc<dyn Fn(&dyn Container) -> Result<Value, ResolveError> + Send + Sync>;

/// A prepared constructor call: one deferred factory per parameter, with
/// None standing for "pass literal null"
///
/// Every invocation evaluates all argument factories afresh against the
/// container it is given; invocations share nothing.
pub struct AutoFactory {
    target: String,
    args: Vec<Option<ArgFactory>>,
    descriptor: ClassDescriptor,
}

impl AutoFactory {
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Evaluate the argument factories and invoke the constructor
    /// positionally
    pub fn invoke(&self, container: &dyn Container) -> Result<Instance, AutowireError> {
        let args = evaluate_args(container, &self.target, &self.args)?;
        let instance = self
            .descriptor
            .instantiate(&args)
            .map_err(|source| AutowireError::Invocation {
                target: self.target.clone(),
                source,
            })?;
        debug!("Constructed instance of {}", instance.info.type_name);
        Ok(instance)
    }
}

fn evaluate_args(
    container: &dyn Container,
    target: &str,
    factories: &[Option<ArgFactory>],
) -> Result<Vec<Value>, AutowireError> {
    let mut args = Vec::with_capacity(factories.len());
    for factory in factories {
        match factory {
            Some(factory) => {
                let value = factory(container).map_err(|source| AutowireError::Argument {
                    target: target.to_string(),
                    source,
                })?;
                args.push(value);
            }
            None => args.push(Value::Null),
        }
    }
    Ok(args)
}

/// The resolution engine
///
/// Turns class names and callables into constructed values using the declared
/// parameter descriptors of a [`ClassRegistry`] plus any container answering
/// has/get. Stateless per resolution; the only mutable state is the
/// append-only list of untyped-parameter resolvers, so one autowirer can be
/// shared between containers.
pub struct Autowirer {
    registry: Arc<ClassRegistry>,
    untyped_resolvers: Vec<Arc<dyn UntypedParamResolver>>,
}

impl Autowirer {
    pub fn new(registry: Arc<ClassRegistry>) -> Self {
        Autowirer {
            registry,
            untyped_resolvers: Vec::new(),
        }
    }

    /// Append a resolver for untyped parameters; earlier registrations win
    pub fn with_untyped_param_resolver(mut self, resolver: Arc<dyn UntypedParamResolver>) -> Self {
        self.untyped_resolvers.push(resolver);
        self
    }

    pub fn registry(&self) -> &Arc<ClassRegistry> {
        &self.registry
    }

    /// Identifier a container caches its autowirer under
    pub fn id() -> &'static str {
        std::any::type_name::<Autowirer>()
    }

    /// Prepare a factory for `class` without constructing anything
    pub fn auto_factory(
        &self,
        container: &dyn Container,
        class: &str,
    ) -> Result<AutoFactory, WiringError> {
        let descriptor = self
            .registry
            .describe(class)
            .ok_or_else(|| WiringError::UnknownClass(class.to_string()))?;
        if !descriptor.is_instantiable() {
            return Err(WiringError::NotInstantiable(class.to_string()));
        }

        let mut args = Vec::with_capacity(descriptor.params.len());
        for param in &descriptor.params {
            args.push(self.param_auto_factory(container, class, param)?);
        }

        debug!("Prepared factory for {} with {} arguments", class, args.len());
        Ok(AutoFactory {
            target: class.to_string(),
            args,
            descriptor: descriptor.clone(),
        })
    }

    /// Decide how one parameter will be supplied
    ///
    /// Untyped parameters go through the registered resolvers first; typed
    /// parameters defer to `container.get` when the container can answer for
    /// the declared type. `Ok(None)` means literal null. The returned factory
    /// does not resolve anything yet, so feasibility probing never constructs
    /// nested objects.
    pub fn param_auto_factory(
        &self,
        container: &dyn Container,
        target: &str,
        param: &ParamInfo,
    ) -> Result<Option<ArgFactory>, WiringError> {
        let Some(wanted) = &param.type_name else {
            for resolver in &self.untyped_resolvers {
                if let Some(factory) = resolver.resolve(container, target, param) {
                    return Ok(Some(factory));
                }
            }
            if param.nullable {
                return Ok(None);
            }
            return Err(WiringError::MissingTypeHint {
                target: target.to_string(),
                param: param.name.clone(),
            });
        };

        if container.has(wanted) {
            let id = wanted.clone();
            return Ok(Some(Arc::new(move |container: &dyn Container| {
                container.get(&id)
            })));
        }
        if param.nullable {
            return Ok(None);
        }
        Err(WiringError::UnresolvableParam {
            target: target.to_string(),
            param: param.name.clone(),
            wanted: wanted.clone(),
        })
    }

    /// Prepare and immediately invoke
    ///
    /// Constructor failures propagate with their cause attached; they are
    /// never mistaken for "cannot autowire".
    pub fn autowire(
        &self,
        container: &dyn Container,
        class: &str,
    ) -> Result<Instance, AutowireError> {
        let factory = self.auto_factory(container, class)?;
        factory.invoke(container)
    }

    /// Dry run: whether `class` could be constructed against `container`
    ///
    /// Builds the argument factories but invokes nothing.
    pub fn can_autowire(&self, container: &dyn Container, class: &str) -> bool {
        self.auto_factory(container, class).is_ok()
    }

    /// Resolve a callable's declared parameters and invoke it once
    pub fn autowire_callable(
        &self,
        container: &dyn Container,
        callable: &Callable,
    ) -> Result<Value, AutowireError> {
        let target = callable.describe();
        let mut factories = Vec::with_capacity(callable.params().len());
        for param in callable.params() {
            factories.push(self.param_auto_factory(container, target, param)?);
        }
        let args = evaluate_args(container, target, &factories)?;

        debug!("Invoking {} with {} arguments", target, args.len());
        callable
            .invoke(&args)
            .map_err(|source| AutowireError::Invocation {
                target: target.to_string(),
                source,
            })
    }
}

impl Debug for Autowirer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Autowirer")
            .field("registry", &self.registry)
            .field("untyped_resolvers", &self.untyped_resolvers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::{
        collections::HashMap,
        sync::atomic::{AtomicUsize, Ordering},
    };

    use super::*;
    use crate::resolver::fixed::FixedValueResolver;

    /// Bare has/get over prepared values, so the engine is tested in
    /// isolation from the resolving container
    struct FakeContainer {
        values: HashMap<String, Value>,
    }

    impl FakeContainer {
        fn new(entries: Vec<(&str, Value)>) -> Self {
            FakeContainer {
                values: entries
                    .into_iter()
                    .map(|(id, value)| (id.to_string(), value))
                    .collect(),
            }
        }
    }

    impl Container for FakeContainer {
        fn has(&self, id: &str) -> bool {
            self.values.contains_key(id)
        }

        fn get(&self, id: &str) -> Result<Value, ResolveError> {
            self.values
                .get(id)
                .cloned()
                .ok_or_else(|| ResolveError::NotFound(id.to_string()))
        }
    }

    #[derive(Default)]
    struct Engine;
    struct Car {
        engine: Arc<Engine>,
    }
    trait Vehicle {}

    fn car_registry() -> Arc<ClassRegistry> {
        Arc::new(
            ClassRegistry::new()
                .with_class(ClassDescriptor::default_constructed::<Engine>("Engine"))
                .with_class(
                    ClassDescriptor::concrete::<Car>("Car")
                        .with_param(ParamInfo::typed("engine", "Engine"))
                        .with_constructor(|args| {
                            Ok(Instance::new(Car {
                                engine: args[0].downcast()?,
                            }))
                        }),
                )
                .with_class(ClassDescriptor::interface::<dyn Vehicle>("Vehicle")),
        )
    }

    #[test]
    fn an_unknown_class_is_a_wiring_error() {
        let autowirer = Autowirer::new(car_registry());
        let container = FakeContainer::new(Vec::new());
        assert!(matches!(
            autowirer.auto_factory(&container, "Spaceship"),
            Err(WiringError::UnknownClass(_))
        ));
    }

    #[test]
    fn an_interface_target_is_not_instantiable() {
        let autowirer = Autowirer::new(car_registry());
        let container = FakeContainer::new(Vec::new());
        assert!(matches!(
            autowirer.auto_factory(&container, "Vehicle"),
            Err(WiringError::NotInstantiable(_))
        ));
    }

    #[test]
    fn a_parameterless_class_constructs() {
        let autowirer = Autowirer::new(car_registry());
        let container = FakeContainer::new(Vec::new());
        let instance = autowirer.autowire(&container, "Engine").unwrap();
        assert!(instance.downcast::<Engine>().is_ok());
    }

    #[test]
    fn typed_parameters_resolve_through_the_container() {
        let autowirer = Autowirer::new(car_registry());
        let engine = Arc::new(Engine);
        let container = FakeContainer::new(vec![(
            "Engine",
            Value::Instance(Instance::from_arc(engine.clone())),
        )]);
        let car = autowirer.autowire(&container, "Car").unwrap();
        let car = car.downcast::<Car>().unwrap();
        assert!(Arc::ptr_eq(&car.engine, &engine));
    }

    #[test]
    fn an_unresolvable_typed_parameter_is_a_wiring_error() {
        let autowirer = Autowirer::new(car_registry());
        let container = FakeContainer::new(Vec::new());
        assert!(matches!(
            autowirer.auto_factory(&container, "Car"),
            Err(WiringError::UnresolvableParam { .. })
        ));
        assert!(!autowirer.can_autowire(&container, "Car"));
    }

    #[test]
    fn a_nullable_unresolvable_parameter_becomes_null() {
        struct Trailer;
        let registry = Arc::new(ClassRegistry::new().with_class(
            ClassDescriptor::concrete::<Trailer>("Trailer")
                .with_param(ParamInfo::typed("hitch", "Hitch").nullable())
                .with_constructor(|args| {
                    assert!(args[0].is_null());
                    Ok(Instance::new(Trailer))
                }),
        ));
        let autowirer = Autowirer::new(registry);
        let container = FakeContainer::new(Vec::new());
        assert!(autowirer.autowire(&container, "Trailer").is_ok());
    }

    #[test]
    fn an_untyped_parameter_without_resolver_needs_nullability() {
        struct Radio;
        let registry = Arc::new(ClassRegistry::new().with_class(
            ClassDescriptor::concrete::<Radio>("Radio")
                .with_param(ParamInfo::untyped("band"))
                .with_constructor(|_| Ok(Instance::new(Radio))),
        ));
        let autowirer = Autowirer::new(registry);
        let container = FakeContainer::new(Vec::new());
        assert!(matches!(
            autowirer.auto_factory(&container, "Radio"),
            Err(WiringError::MissingTypeHint { .. })
        ));
    }

    #[test]
    fn untyped_resolvers_win_in_registration_order() {
        struct Radio {
            band: Arc<String>,
        }
        let registry = Arc::new(ClassRegistry::new().with_class(
            ClassDescriptor::concrete::<Radio>("Radio")
                .with_param(ParamInfo::untyped("band"))
                .with_constructor(|args| {
                    Ok(Instance::new(Radio {
                        band: args[0].downcast()?,
                    }))
                }),
        ));
        let autowirer = Autowirer::new(registry)
            .with_untyped_param_resolver(Arc::new(
                FixedValueResolver::new().with_value("band", Value::of("FM".to_string())),
            ))
            .with_untyped_param_resolver(Arc::new(
                FixedValueResolver::new().with_value("band", Value::of("AM".to_string())),
            ));
        let container = FakeContainer::new(Vec::new());
        let radio = autowirer.autowire(&container, "Radio").unwrap();
        assert_eq!(*radio.downcast::<Radio>().unwrap().band, "FM");
    }

    #[test]
    fn probing_never_constructs() {
        let constructions = Arc::new(AtomicUsize::new(0));
        let counter = constructions.clone();
        let registry = Arc::new(ClassRegistry::new().with_class(
            ClassDescriptor::concrete::<Engine>("Engine").with_constructor(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(Instance::new(Engine))
            }),
        ));
        let autowirer = Autowirer::new(registry);
        let container = FakeContainer::new(Vec::new());

        assert!(autowirer.can_autowire(&container, "Engine"));
        assert!(autowirer.auto_factory(&container, "Engine").is_ok());
        assert_eq!(constructions.load(Ordering::SeqCst), 0);

        autowirer.autowire(&container, "Engine").unwrap();
        assert_eq!(constructions.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn constructor_failures_surface_with_their_cause() {
        struct Flaky;
        let registry = Arc::new(ClassRegistry::new().with_class(
            ClassDescriptor::concrete::<Flaky>("Flaky")
                .with_constructor(|_| Err("ignition failure".into())),
        ));
        let autowirer = Autowirer::new(registry);
        let container = FakeContainer::new(Vec::new());
        match autowirer.autowire(&container, "Flaky") {
            Err(AutowireError::Invocation { target, source }) => {
                assert_eq!(target, "Flaky");
                assert_eq!(source.to_string(), "ignition failure");
            }
            other => panic!("expected an invocation error, got {other:?}"),
        }
    }

    #[test]
    fn callables_are_wired_like_constructors() {
        let engine = Arc::new(Engine);
        let container = FakeContainer::new(vec![(
            "Engine",
            Value::Instance(Instance::from_arc(engine.clone())),
        )]);
        let autowirer = Autowirer::new(car_registry());
        let callable = Callable::new(vec![ParamInfo::typed("engine", "Engine")], |args| {
            Ok(Value::of(Car {
                engine: args[0].downcast()?,
            }))
        });
        let value = autowirer.autowire_callable(&container, &callable).unwrap();
        let car = value.downcast::<Car>().unwrap();
        assert!(Arc::ptr_eq(&car.engine, &engine));
    }
}
