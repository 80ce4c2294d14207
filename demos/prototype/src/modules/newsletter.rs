use std::sync::Arc;

use graft_di::{ClassDescriptor, ClassRegistry, Instance, ParamInfo};
use tracing::info;

/// Anything that can carry a log line; the registry knows it as
/// `prototype.Logger`
pub trait Logger: Send + Sync {
    fn log(&self, message: &str);
}

#[derive(Default)]
pub struct ConsoleLogger;

impl Logger for ConsoleLogger {
    fn log(&self, message: &str) {
        info!("{message}");
    }
}

#[derive(Default)]
pub struct TemplateEngine;

impl TemplateEngine {
    pub fn render(&self, subject: &str, body: &str) -> String {
        format!("[{subject}]\n{body}")
    }
}

/// Composes and "sends" newsletters; every dependency arrives through the
/// container
pub struct Newsletter {
    logger: Arc<dyn Logger>,
    templates: Arc<TemplateEngine>,
    sender: Arc<String>,
}

impl Newsletter {
    pub fn send(&self, subject: &str, body: &str) {
        let rendered = self.templates.render(subject, body);
        self.logger
            .log(&format!("sending as {}: {rendered}", self.sender));
    }
}

/// Class declarations for this module
pub fn register(registry: ClassRegistry) -> ClassRegistry {
    registry
        .with_class(ClassDescriptor::interface::<Arc<dyn Logger>>("prototype.Logger"))
        .with_class(ClassDescriptor::default_constructed::<TemplateEngine>(
            "prototype.TemplateEngine",
        ))
        .with_class(
            ClassDescriptor::concrete::<Newsletter>("prototype.Newsletter")
                .with_param(ParamInfo::typed("logger", "prototype.Logger"))
                .with_param(ParamInfo::typed("templates", "prototype.TemplateEngine"))
                .with_param(ParamInfo::untyped("sender"))
                .with_constructor(|args| {
                    let logger: Arc<Arc<dyn Logger>> = args[0].downcast()?;
                    Ok(Instance::new(Newsletter {
                        logger: logger.as_ref().clone(),
                        templates: args[1].downcast()?,
                        sender: args[2].downcast()?,
                    }))
                }),
        )
}
