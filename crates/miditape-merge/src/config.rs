//! Merge configuration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{MergeError, MergeResult};

/// Default silence between two consecutive input files, in seconds.
pub const DEFAULT_GAP_SECS: f64 = 2.0;

/// Default silence after the last input file, in seconds.
pub const DEFAULT_TAIL_SECS: f64 = 1.0;

/// How inputs whose time base differs from the output resolution are handled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionPolicy {
    /// Merge ticks as they are and only re-stamp the output header.
    #[default]
    Passthrough,
    /// Refuse inputs that are not already at the output resolution.
    Strict,
    /// Rescale each input's tick grid to the output resolution.
    Rescale,
}

impl ResolutionPolicy {
    /// Returns the string identifier for this policy.
    pub fn as_str(&self) -> &'static str {
        match self {
            ResolutionPolicy::Passthrough => "passthrough",
            ResolutionPolicy::Strict => "strict",
            ResolutionPolicy::Rescale => "rescale",
        }
    }
}

impl fmt::Display for ResolutionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResolutionPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "passthrough" => Ok(ResolutionPolicy::Passthrough),
            "strict" => Ok(ResolutionPolicy::Strict),
            "rescale" => Ok(ResolutionPolicy::Rescale),
            other => Err(format!(
                "unknown resolution policy '{}' (expected passthrough, strict, or rescale)",
                other
            )),
        }
    }
}

/// Configuration for a merge run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MergeConfig {
    /// Seconds of silence inserted between consecutive inputs.
    pub gap_secs: f64,
    /// Seconds of silence appended after the last input.
    pub tail_secs: f64,
    /// Handling of inputs at a different resolution.
    pub resolution_policy: ResolutionPolicy,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            gap_secs: DEFAULT_GAP_SECS,
            tail_secs: DEFAULT_TAIL_SECS,
            resolution_policy: ResolutionPolicy::default(),
        }
    }
}

impl MergeConfig {
    /// Sets the inter-file gap.
    pub fn gap_secs(mut self, secs: f64) -> Self {
        self.gap_secs = secs;
        self
    }

    /// Sets the trailing tail.
    pub fn tail_secs(mut self, secs: f64) -> Self {
        self.tail_secs = secs;
        self
    }

    /// Sets the resolution policy.
    pub fn resolution_policy(mut self, policy: ResolutionPolicy) -> Self {
        self.resolution_policy = policy;
        self
    }

    /// Checks that both durations are finite and non-negative.
    pub fn validate(&self) -> MergeResult<()> {
        for seconds in [self.gap_secs, self.tail_secs] {
            if !seconds.is_finite() || seconds < 0.0 {
                return Err(MergeError::InvalidDuration { seconds });
            }
        }
        Ok(())
    }
}
