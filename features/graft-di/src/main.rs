use std::{collections::HashMap, sync::Arc};

use graft_di::{
    Autowirer, AutowiringContainer, ClassDescriptor, ClassRegistry, CompositeContainer, Container,
    Instance, ParamInfo,
};

#[derive(Default, Debug)]
struct Clock;

#[derive(Debug)]
struct Scheduler {
    clock: Arc<Clock>,
}

fn main() {
    let registry = Arc::new(
        ClassRegistry::new()
            .with_class(ClassDescriptor::default_constructed::<Clock>("Clock"))
            .with_class(
                ClassDescriptor::concrete::<Scheduler>("Scheduler")
                    .with_param(ParamInfo::typed("clock", "Clock"))
                    .with_constructor(|args| {
                        Ok(Instance::new(Scheduler {
                            clock: args[0].downcast()?,
                        }))
                    }),
            ),
    );

    let container = AutowiringContainer::new(
        CompositeContainer::new(HashMap::new()),
        Autowirer::new(registry),
    );

    let scheduler = container.get_as::<Scheduler>("Scheduler").unwrap();
    println!("{:?}", container);
    println!("{:?}", scheduler);
    println!("same clock again: {}", container.has("Clock"));
}
