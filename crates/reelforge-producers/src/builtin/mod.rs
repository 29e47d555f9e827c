//! Builtin stub producers: deterministic, provider-free implementations of
//! the common content-generation roles, useful for tests, demos, and
//! `doctor`-style smoke checks without calling out to a real generative
//! provider.

mod audio;
mod image;
mod text;
mod timeline;

pub use audio::StubAudioProducer;
pub use image::StubImageProducer;
pub use text::StubTextProducer;
pub use timeline::StubTimelineAssembler;
