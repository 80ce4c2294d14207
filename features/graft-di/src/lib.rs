//! Graft DI resolves object graphs from a flat map of bindings: ask for an
//! identifier, get a fully constructed value, without writing the wiring by
//! hand.
//!
//! Graft DI is split into four major parts:
//! 1. [`ClassRegistry`]: declarative descriptors standing in for constructor
//!    reflection - parameters, nullability, interfaces, the constructor itself
//! 2. [`MapContainer`] / [`CompositeContainer`]: the bound map, with fallback
//!    containers consulted in append order
//! 3. [`Autowirer`]: the engine turning class names and callables into
//!    constructed values through deferred per-parameter factories
//! 4. [`AutowiringContainer`]: the resolving container - memoization, alias
//!    chasing, callable-chain resolution, autowiring fallback
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use graft_di::{
//!     Autowirer, AutowiringContainer, ClassDescriptor, ClassRegistry,
//!     CompositeContainer, Instance, ParamInfo,
//! };
//!
//! #[derive(Default)]
//! struct Logger;
//! struct Mailer {
//!     logger: Arc<Logger>,
//! }
//!
//! let registry = Arc::new(
//!     ClassRegistry::new()
//!         .with_class(ClassDescriptor::default_constructed::<Logger>("Logger"))
//!         .with_class(
//!             ClassDescriptor::concrete::<Mailer>("Mailer")
//!                 .with_param(ParamInfo::typed("logger", "Logger"))
//!                 .with_constructor(|args| {
//!                     Ok(Instance::new(Mailer {
//!                         logger: args[0].downcast()?,
//!                     }))
//!                 }),
//!         ),
//! );
//!
//! let container = AutowiringContainer::new(
//!     CompositeContainer::new(Default::default()),
//!     Autowirer::new(registry),
//! );
//!
//! let mailer = container.get_as::<Mailer>("Mailer").unwrap();
//! let _ = &mailer.logger;
//! ```

pub mod autowirer;
pub mod autowiring;
pub mod builder;
pub mod container;
pub mod errors;
pub mod registry;
pub mod resolver;
pub mod types;

pub use autowirer::{ArgFactory, AutoFactory, Autowirer};
pub use autowiring::AutowiringContainer;
pub use builder::ContainerBuilder;
pub use container::{
    BindingSource, CompositeContainer, Container, IntoBindingSource, MapContainer,
};
pub use errors::{AutowireError, ResolveError, WiringError};
pub use registry::{ClassDescriptor, ClassKind, ClassRegistry};
pub use resolver::{by_name::BindingNameResolver, fixed::FixedValueResolver, UntypedParamResolver};
pub use types::{Binding, Callable, DynError, Injectable, Instance, ParamInfo, TypeInfo, Value};
