//! End-to-end handling of one upload request.

mod orchestrator;
mod stage;

pub use orchestrator::{Pipeline, PipelineOutcome, RunReport, SubmissionStatus};
pub use stage::PipelineStage;
