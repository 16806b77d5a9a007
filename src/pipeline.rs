//! Batch checking over multiple artifacts
//!
//! The pipeline runs the checker over a batch and captures each item's
//! failure instead of aborting the whole run. Rendered failures carry the
//! fixed plugin prefix so they are attributable in aggregated build logs.
//! A direct `Checker::transform` call propagates the raw typed error.

use std::fmt;
use std::path::PathBuf;

use crate::artifact::Artifact;
use crate::checker::Checker;
use crate::error::CheckError;

/// Prefix attached to every rendered pipeline failure
pub const PLUGIN_NAME: &str = "depvet";

/// One artifact's failure inside a batch
#[derive(Debug)]
pub struct ItemFailure {
    /// Path of the failing artifact
    pub path: PathBuf,
    /// The underlying error
    pub error: CheckError,
}

impl ItemFailure {
    /// Returns true when the failure is an outdated-threshold violation
    pub fn is_threshold(&self) -> bool {
        matches!(self.error, CheckError::OutdatedThreshold { .. })
    }
}

impl fmt::Display for ItemFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {}",
            PLUGIN_NAME,
            self.path.display(),
            self.error
        )
    }
}

/// Outcome of one batch run
#[derive(Debug, Default)]
pub struct PipelineResult {
    /// Artifacts that completed the transform
    pub processed: Vec<Artifact>,
    /// Per-item failures
    pub failures: Vec<ItemFailure>,
}

impl PipelineResult {
    /// Returns true when any failure was an outdated-threshold violation
    pub fn threshold_exceeded(&self) -> bool {
        self.failures.iter().any(ItemFailure::is_threshold)
    }
}

/// Runs the checker over a batch of artifacts
pub struct Pipeline {
    checker: Checker,
}

impl Pipeline {
    /// Creates a pipeline around a configured checker
    pub fn new(checker: Checker) -> Self {
        Self { checker }
    }

    /// Checks every artifact, capturing failures per item
    pub async fn run(&self, artifacts: Vec<Artifact>) -> PipelineResult {
        let mut result = PipelineResult::default();

        for mut artifact in artifacts {
            match self.checker.transform(&mut artifact).await {
                Ok(()) => result.processed.push(artifact),
                Err(error) => result.failures.push(ItemFailure {
                    path: artifact.path.clone(),
                    error,
                }),
            }
        }

        result
    }
}
