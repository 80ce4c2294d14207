use std::{collections::HashMap, sync::Arc};

use crate::{
    autowirer::ArgFactory,
    container::Container,
    resolver::UntypedParamResolver,
    types::{ParamInfo, Value},
};

/// Serves fixed values for untyped parameters, matched by parameter name
///
/// Useful for construction inputs that have no identifier of their own, such
/// as connection strings or feature switches.
#[derive(Default)]
pub struct FixedValueResolver {
    values: HashMap<String, Value>,
}

impl FixedValueResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(mut self, param: impl Into<String>, value: Value) -> Self {
        self.values.insert(param.into(), value);
        self
    }
}

impl UntypedParamResolver for FixedValueResolver {
    fn resolve(
        &self,
        _container: &dyn Container,
        _target: &str,
        param: &ParamInfo,
    ) -> Option<ArgFactory> {
        let value = self.values.get(&param.name)?.clone();
        Some(Arc::new(move |_: &dyn Container| Ok(value.clone())))
    }
}
