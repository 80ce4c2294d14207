mod modules;

use std::sync::Arc;

use graft_di::{BindingNameResolver, Callable, ClassRegistry, ContainerBuilder, Instance, Value};
use tracing_subscriber::EnvFilter;

use modules::newsletter::{self, ConsoleLogger, Logger, Newsletter};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")))
        .init();

    let registry = newsletter::register(ClassRegistry::new());

    let container = ContainerBuilder::new(Arc::new(registry))
        .bind_callable(
            "prototype.Logger",
            Callable::nullary(|| {
                let logger: Arc<dyn Logger> = Arc::new(ConsoleLogger::default());
                Ok(Value::Instance(Instance::new(logger)))
            }),
        )
        .bind_instance("sender", "newsletter@example.org".to_string())
        .with_untyped_param_resolver(Arc::new(BindingNameResolver))
        .build();

    let newsletter = container
        .get_as::<Newsletter>("prototype.Newsletter")
        .expect("the prototype graph should resolve");

    newsletter.send("October issue", "Graft resolved this object graph.");
    tracing::debug!("{:?}", container);
}
