use crate::{autowirer::ArgFactory, container::Container, types::ParamInfo};

pub mod by_name;
pub mod fixed;

/// Pluggable strategy for parameters without a declared type
///
/// Resolvers are consulted in registration order; the first one to produce a
/// factory wins. Returning None passes the decision on to the next resolver
/// (and ultimately to the nullability of the parameter).
pub trait UntypedParamResolver: Send + Sync {
    fn resolve(
        &self,
        container: &dyn Container,
        target: &str,
        param: &ParamInfo,
    ) -> Option<ArgFactory>;
}
