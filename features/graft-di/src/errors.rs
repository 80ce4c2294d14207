use thiserror::Error;

use crate::types::DynError;

/// Static analysis proved a type cannot be constructed
///
/// This is the only "expected" failure in the engine: probing functions such
/// as [`Autowirer::can_autowire`](crate::Autowirer::can_autowire) translate
/// it into a plain `false`, and [`Container::get`](crate::Container::get)
/// translates it into [`ResolveError::NotFound`]. It never surfaces raw.
#[derive(Error, Debug)]
pub enum WiringError {
    /// The identifier names no registered class or interface
    #[error("'{0}' is not a known class or interface")]
    UnknownClass(String),
    /// Abstract classes and interfaces have no constructor to call
    #[error("'{0}' is abstract or an interface and cannot be instantiated")]
    NotInstantiable(String),
    #[error("Parameter '{param}' of '{target}' needs a type hint or a nullable marker")]
    MissingTypeHint { target: String, param: String },
    #[error("Parameter '{param}' of '{target}' wants '{wanted}' which is not resolvable and not nullable")]
    UnresolvableParam {
        target: String,
        param: String,
        wanted: String,
    },
}

/// Errors while autowiring a class or invoking a callable
#[derive(Error, Debug)]
pub enum AutowireError {
    #[error(transparent)]
    Wiring(#[from] WiringError),
    /// A deferred argument factory failed when it was finally evaluated
    #[error("Could not resolve an argument of '{target}': {source}")]
    Argument {
        target: String,
        #[source]
        source: ResolveError,
    },
    /// The constructor or callable body itself failed
    #[error("'{target}' failed while being built: {source}")]
    Invocation {
        target: String,
        #[source]
        source: DynError,
    },
}

/// Errors surfaced by [`Container::get`](crate::Container::get)
#[derive(Error, Debug)]
pub enum ResolveError {
    /// The identifier is simply undefined - nothing is bound and nothing can
    /// be autowired
    #[error("Nothing is bound or buildable for '{0}'")]
    NotFound(String),
    /// The wiring was fine but resolution machinery failed while producing
    /// the value; the cause is retained
    #[error("Failed to resolve '{id}': {source}")]
    Failed {
        id: String,
        #[source]
        source: DynError,
    },
    /// A callable chain ran dry without producing the requested type
    #[error("Resolving '{id}' ended on '{actual}' which does not satisfy it")]
    WrongProduct { id: String, actual: String },
    #[error("Failed to downcast, required: '{required}' actual: '{actual}'")]
    DowncastFailed {
        required: &'static str,
        actual: &'static str,
    },
}
