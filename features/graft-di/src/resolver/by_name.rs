use std::sync::Arc;

use crate::{
    autowirer::ArgFactory,
    container::Container,
    resolver::UntypedParamResolver,
    types::ParamInfo,
};

/// Resolves an untyped parameter from a binding named like the parameter
///
/// A constructor parameter `mailer` with no declared type receives whatever
/// `get("mailer")` produces, provided such a binding is resolvable at the
/// time the factory is built.
pub struct BindingNameResolver;

impl UntypedParamResolver for BindingNameResolver {
    fn resolve(
        &self,
        container: &dyn Container,
        _target: &str,
        param: &ParamInfo,
    ) -> Option<ArgFactory> {
        if !container.has(&param.name) {
            return None;
        }
        let id = param.name.clone();
        Some(Arc::new(move |container: &dyn Container| container.get(&id)))
    }
}
