use std::fmt;

/// Where a run currently is.
///
/// Stages advance in declaration order. Any stage may jump straight to
/// [`PipelineStage::Cleanup`], which every run ends in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PipelineStage {
    Validating,
    AwaitingConfirmation,
    Downloading,
    Transcoding,
    Publishing,
    Submitting,
    Cleanup,
}

impl PipelineStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineStage::Validating => "validating",
            PipelineStage::AwaitingConfirmation => "awaiting_confirmation",
            PipelineStage::Downloading => "downloading",
            PipelineStage::Transcoding => "transcoding",
            PipelineStage::Publishing => "publishing",
            PipelineStage::Submitting => "submitting",
            PipelineStage::Cleanup => "cleanup",
        }
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
