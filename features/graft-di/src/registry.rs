use std::{
    any::TypeId,
    collections::{HashMap, HashSet},
    fmt::Debug,
    sync::Arc,
};

use crate::types::{DynError, Injectable, Instance, ParamInfo, TypeInfo, Value};

type ConstructFn = Arc<dyn Fn(&[Value]) -> Result<Instance, DynError> + Send + Sync>;

/// What kind of declaration an identifier names
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassKind {
    Concrete,
    Abstract,
    Interface,
}

/// Declarative stand-in for constructor reflection
///
/// Everything the engine needs to know about one class or interface: the
/// backing Rust type, the declared constructor parameters, the constructor
/// itself, and which interface identifiers the class satisfies.
#[derive(Clone)]
pub struct ClassDescriptor {
    pub name: String,
    pub info: TypeInfo,
    pub kind: ClassKind,
    pub params: Vec<ParamInfo>,
    /// Interface identifiers this declaration satisfies (interfaces may list
    /// the interfaces they extend)
    pub interfaces: Vec<String>,
    construct: Option<ConstructFn>,
}

impl ClassDescriptor {
    pub fn concrete<T: Injectable>(name: impl Into<String>) -> Self {
        ClassDescriptor {
            name: name.into(),
            info: TypeInfo::of::<T>(),
            kind: ClassKind::Concrete,
            params: Vec::new(),
            interfaces: Vec::new(),
            construct: None,
        }
    }

    /// A concrete class with no declared constructor: built with no arguments
    pub fn default_constructed<T: Injectable + Default>(name: impl Into<String>) -> Self {
        Self::concrete::<T>(name).with_constructor(|_| Ok(Instance::new(T::default())))
    }

    pub fn abstract_class<T: 'static + ?Sized>(name: impl Into<String>) -> Self {
        ClassDescriptor {
            name: name.into(),
            info: TypeInfo::of::<T>(),
            kind: ClassKind::Abstract,
            params: Vec::new(),
            interfaces: Vec::new(),
            construct: None,
        }
    }

    pub fn interface<T: 'static + ?Sized>(name: impl Into<String>) -> Self {
        ClassDescriptor {
            kind: ClassKind::Interface,
            ..Self::abstract_class::<T>(name)
        }
    }

    /// Declare the next constructor parameter
    pub fn with_param(mut self, mut param: ParamInfo) -> Self {
        param.position = self.params.len();
        self.params.push(param);
        self
    }

    /// The constructor receives the argument values positionally, in
    /// declared parameter order
    pub fn with_constructor(
        mut self,
        construct: impl Fn(&[Value]) -> Result<Instance, DynError> + Send + Sync + 'static,
    ) -> Self {
        self.construct = Some(Arc::new(construct));
        self
    }

    pub fn implements(mut self, interface: impl Into<String>) -> Self {
        self.interfaces.push(interface.into());
        self
    }

    pub fn is_instantiable(&self) -> bool {
        self.kind == ClassKind::Concrete && self.construct.is_some()
    }

    pub fn instantiate(&self, args: &[Value]) -> Result<Instance, DynError> {
        match &self.construct {
            Some(construct) => construct(args),
            None => Err(format!("'{}' has no constructor", self.name).into()),
        }
    }
}

impl Debug for ClassDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClassDescriptor")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("params", &self.params.len())
            .finish()
    }
}

/// All classes and interfaces the engine can reason about
///
/// Registries are assembled up front and shared between autowirers via Arc;
/// they answer the class-existence predicate and the "is this value already
/// an instance of that identifier" question.
#[derive(Default)]
pub struct ClassRegistry {
    classes: HashMap<String, ClassDescriptor>,
    by_type: HashMap<TypeId, String>,
}

impl ClassRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_class(mut self, descriptor: ClassDescriptor) -> Self {
        self.register(descriptor);
        self
    }

    pub fn register(&mut self, descriptor: ClassDescriptor) {
        if descriptor.kind == ClassKind::Concrete {
            self.by_type
                .insert(descriptor.info.type_id, descriptor.name.clone());
        }
        self.classes.insert(descriptor.name.clone(), descriptor);
    }

    /// The class/interface existence predicate
    pub fn contains(&self, id: &str) -> bool {
        self.classes.contains_key(id)
    }

    pub fn describe(&self, id: &str) -> Option<&ClassDescriptor> {
        self.classes.get(id)
    }

    /// Whether a resolved value already satisfies the identifier
    ///
    /// True on an exact type match, or when the value's class declares `id`
    /// among its interfaces (directly or through interface extension). An
    /// invokable callable is judged by the object behind it.
    pub fn is_instance(&self, value: &Value, id: &str) -> bool {
        let Some(expected) = self.classes.get(id) else {
            return false;
        };
        let Some(instance) = value.as_instance() else {
            return false;
        };
        if instance.info.type_id == expected.info.type_id {
            return true;
        }
        match self.by_type.get(&instance.info.type_id) {
            Some(class) => self.satisfies(class, id),
            None => false,
        }
    }

    /// Walk the declared interface lists, following interface extension
    fn satisfies(&self, class: &str, wanted: &str) -> bool {
        let mut seen = HashSet::new();
        let mut queue = match self.classes.get(class) {
            Some(descriptor) => descriptor.interfaces.iter().collect::<Vec<_>>(),
            None => return false,
        };
        while let Some(next) = queue.pop() {
            if next.as_str() == wanted {
                return true;
            }
            if !seen.insert(next.as_str()) {
                continue;
            }
            if let Some(descriptor) = self.classes.get(next) {
                queue.extend(descriptor.interfaces.iter());
            }
        }
        false
    }
}

impl Debug for ClassRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut map = f.debug_struct("ClassRegistry");
        for (name, descriptor) in &self.classes {
            map.field(name, &descriptor.kind);
        }
        map.finish()
    }
}
