//! The five LLM-backed agents plus the batch image generator.
//!
//! Every agent is total over model output: a malformed response yields a
//! deterministic domain-sensible default, never an error. Backend failures
//! (network, quota) do propagate — the orchestrator owns that policy.

pub mod analyst;
pub mod controller;
pub mod designer;
pub mod image_gen;
pub mod marketer;
#[cfg(any(test, feature = "test-support"))]
pub mod testing;
pub mod writer;

pub use analyst::Analyst;
pub use controller::Controller;
pub use designer::Designer;
pub use image_gen::{is_placeholder, ImageGenerator, PLACEHOLDER_IMAGE_URL};
pub use marketer::Marketer;
pub use writer::Writer;
