//! Pipeline orchestration: stage sequencing, duplicate suppression,
//! per-stage fallback policy, and publish branching.

pub mod assembler;
pub mod guard;
pub mod pipeline;
pub mod publish;
pub mod run_state;
#[cfg(any(test, feature = "test-support"))]
pub mod testing;
pub mod traits;

#[cfg(test)]
mod pipeline_tests;

pub use assembler::{assemble, split_sections, BodyImage};
pub use guard::DuplicateGuard;
pub use pipeline::{Pipeline, PipelineDeps};
pub use publish::{CmsTarget, HeadlessTarget, PublishTarget};
pub use run_state::{RunHandle, RunSnapshot};
