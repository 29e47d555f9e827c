//! Builtin producer registry: the only crate allowed to know about concrete
//! [`reelforge_core::producer::ProducerHandler`] implementations. `reelforge-core`
//! never references this crate — the dependency points one way, from registry
//! down to the contract it implements (§9 design notes).

pub mod builtin;
pub mod errors;
pub mod registry;
pub mod spec;

pub use errors::{ProducersError, ProducersResult};
pub use registry::{ProducerRegistry, ProducerResolver, RegisteredProducer};
pub use spec::{ProducerDescriptor, ProducerId};

/// Builds a [`ProducerRegistry`] pre-populated with every builtin stub
/// producer, keyed by the conventional producer names a blueprint's
/// `producers` section would reference.
pub fn builtin_registry() -> ProducerRegistry {
    use std::sync::Arc;

    let mut registry = ProducerRegistry::new();
    registry
        .register(
            ProducerDescriptor::new("StubTextProducer"),
            Arc::new(builtin::StubTextProducer::new("stub-text")),
        )
        .expect("builtin registration names are unique");
    registry
        .register(
            ProducerDescriptor::new("StubAudioProducer"),
            Arc::new(builtin::StubAudioProducer::new("stub-audio")),
        )
        .expect("builtin registration names are unique");
    registry
        .register(
            ProducerDescriptor::new("StubImageProducer"),
            Arc::new(builtin::StubImageProducer::new("stub-image")),
        )
        .expect("builtin registration names are unique");
    registry
        .register(
            ProducerDescriptor::new("StubTimelineAssembler"),
            Arc::new(builtin::StubTimelineAssembler::new("stub-timeline")),
        )
        .expect("builtin registration names are unique");
    registry
}
