use std::{
    any::{Any, TypeId},
    fmt::Debug,
    sync::Arc,
};

use crate::errors::ResolveError;

/// Failures raised inside constructors and callable bodies are carried as
/// boxed errors
pub type DynError = Box<dyn std::error::Error + Send + Sync>;

/// We assume the resolved graph may be handed to other threads,
/// so anything resolvable needs to be Send + Sync + 'static
pub trait Injectable: Send + Sync + 'static {}
impl<T: Send + Sync + 'static> Injectable for T {}

/// Type Name and Type Id
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub struct TypeInfo {
    pub type_name: &'static str,
    pub type_id: TypeId,
}
impl std::fmt::Display for TypeInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.type_name)
    }
}
impl TypeInfo {
    pub fn of<T: 'static + ?Sized>() -> TypeInfo {
        TypeInfo {
            type_name: std::any::type_name::<T>(),
            type_id: TypeId::of::<T>(),
        }
    }
}

/// A constructed object held by the engine
///
/// Cloning shares the underlying Arc, so an instance handed out twice is
/// reference-identical both times.
#[derive(Clone)]
pub struct Instance {
    pub info: TypeInfo,
    instance: Arc<dyn Any + Send + Sync>,
}

impl Instance {
    pub fn new<T: Injectable>(instance: T) -> Self {
        Instance {
            info: TypeInfo::of::<T>(),
            instance: Arc::new(instance),
        }
    }

    /// Wrap an already shared object without re-boxing it
    pub fn from_arc<T: Injectable>(instance: Arc<T>) -> Self {
        Instance {
            info: TypeInfo::of::<T>(),
            instance,
        }
    }

    pub fn downcast<T: Injectable>(&self) -> Result<Arc<T>, &'static str> {
        match Arc::downcast::<T>(self.instance.clone()) {
            Ok(downcasted) => Ok(downcasted),
            Err(_) => Err(self.info.type_name),
        }
    }

    pub fn ptr_eq(&self, other: &Instance) -> bool {
        Arc::ptr_eq(&self.instance, &other.instance)
    }
}

impl Debug for Instance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Instance").field(&self.info.type_name).finish()
    }
}

/// One declared constructor or callable parameter
#[derive(Debug, Clone)]
pub struct ParamInfo {
    /// Zero-based position in the parameter list, assigned at registration
    pub position: usize,
    pub name: String,
    /// Declared type identifier - None means the parameter is untyped
    pub type_name: Option<String>,
    /// Whether literal null is acceptable for this parameter
    pub nullable: bool,
}

impl ParamInfo {
    pub fn typed(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        ParamInfo {
            position: 0,
            name: name.into(),
            type_name: Some(type_name.into()),
            nullable: false,
        }
    }

    pub fn untyped(name: impl Into<String>) -> Self {
        ParamInfo {
            position: 0,
            name: name.into(),
            type_name: None,
            nullable: false,
        }
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }
}

type CallFn = Box<dyn Fn(&[Value]) -> Result<Value, DynError> + Send + Sync>;

/// An invokable binding: a factory with a declared parameter list, invoked
/// positionally
///
/// A callable can double as an instance of a registered class (an invokable
/// object); resolution then treats it as a finished product instead of
/// invoking it again.
#[derive(Clone)]
pub struct Callable(Arc<CallableInner>);

struct CallableInner {
    instance: Option<Instance>,
    params: Vec<ParamInfo>,
    call: CallFn,
}

impl Callable {
    pub fn new(
        params: Vec<ParamInfo>,
        call: impl Fn(&[Value]) -> Result<Value, DynError> + Send + Sync + 'static,
    ) -> Self {
        Self::build(None, params, Box::new(call))
    }

    /// A callable without parameters
    pub fn nullary(call: impl Fn() -> Result<Value, DynError> + Send + Sync + 'static) -> Self {
        Self::build(None, Vec::new(), Box::new(move |_| call()))
    }

    /// A callable that is itself an instance of a registered class
    pub fn invokable<T: Injectable>(
        object: Arc<T>,
        params: Vec<ParamInfo>,
        call: impl Fn(&[Value]) -> Result<Value, DynError> + Send + Sync + 'static,
    ) -> Self {
        Self::build(Some(Instance::from_arc(object)), params, Box::new(call))
    }

    fn build(instance: Option<Instance>, mut params: Vec<ParamInfo>, call: CallFn) -> Self {
        for (position, param) in params.iter_mut().enumerate() {
            param.position = position;
        }
        Callable(Arc::new(CallableInner {
            instance,
            params,
            call,
        }))
    }

    pub fn params(&self) -> &[ParamInfo] {
        &self.0.params
    }

    /// The invokable object behind this callable, if there is one
    pub fn instance(&self) -> Option<&Instance> {
        self.0.instance.as_ref()
    }

    pub fn invoke(&self, args: &[Value]) -> Result<Value, DynError> {
        (self.0.call)(args)
    }

    /// Label used in diagnostics
    pub fn describe(&self) -> &'static str {
        match &self.0.instance {
            Some(instance) => instance.info.type_name,
            None => "closure",
        }
    }
}

impl Debug for Callable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Callable").field(&self.describe()).finish()
    }
}

/// A value produced by resolution
#[derive(Clone, Debug)]
pub enum Value {
    /// Literal null, the product of an unresolvable nullable parameter
    Null,
    Instance(Instance),
    Callable(Callable),
}

impl Value {
    pub fn of<T: Injectable>(value: T) -> Self {
        Value::Instance(Instance::new(value))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn is_callable(&self) -> bool {
        matches!(self, Value::Callable(_))
    }

    /// The instance behind this value, if any; an invokable callable counts
    pub fn as_instance(&self) -> Option<&Instance> {
        match self {
            Value::Instance(instance) => Some(instance),
            Value::Callable(callable) => callable.instance(),
            Value::Null => None,
        }
    }

    pub fn downcast<T: Injectable>(&self) -> Result<Arc<T>, ResolveError> {
        let required = std::any::type_name::<T>();
        match self.as_instance() {
            Some(instance) => {
                instance
                    .downcast()
                    .map_err(|actual| ResolveError::DowncastFailed { required, actual })
            }
            None => Err(ResolveError::DowncastFailed {
                required,
                actual: self.type_label(),
            }),
        }
    }

    /// Type label for diagnostics
    pub fn type_label(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Instance(instance) => instance.info.type_name,
            Value::Callable(callable) => callable.describe(),
        }
    }
}

/// What a container associates with an identifier
#[derive(Clone, Debug)]
pub enum Binding {
    /// A ready value, served as-is
    Instance(Instance),
    /// A forwarding pointer to another identifier
    Alias(String),
    /// A factory; resolution may need to invoke it repeatedly
    Callable(Callable),
}

impl Binding {
    pub fn instance<T: Injectable>(value: T) -> Self {
        Binding::Instance(Instance::new(value))
    }

    pub fn shared<T: Injectable>(value: Arc<T>) -> Self {
        Binding::Instance(Instance::from_arc(value))
    }

    pub fn alias(target: impl Into<String>) -> Self {
        Binding::Alias(target.into())
    }
}
