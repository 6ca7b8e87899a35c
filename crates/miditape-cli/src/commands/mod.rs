//! CLI command implementations.

pub mod convert;
pub mod doctor;
pub mod json_output;
pub mod merge;
pub mod reporting;

use anyhow::Result;
use miditape_merge::{MergeConfig, ResolutionPolicy};

/// Merge settings shared by `convert` and `merge`.
#[derive(Debug, Clone, PartialEq)]
pub struct MergeOptions {
    /// Seconds of silence between inputs
    pub gap_secs: f64,
    /// Seconds of silence after the last input
    pub tail_secs: f64,
    /// How inputs with differing resolutions are handled
    pub resolution: ResolutionPolicy,
}

impl MergeOptions {
    /// Builds and validates the merge configuration.
    pub fn config(&self) -> Result<MergeConfig> {
        let config = MergeConfig::default()
            .gap_secs(self.gap_secs)
            .tail_secs(self.tail_secs)
            .resolution_policy(self.resolution);
        config.validate()?;
        Ok(config)
    }
}
