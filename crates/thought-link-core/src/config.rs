//! Engine configuration bundle.
//!
//! Groups the per-subsystem parameter sets so a driver can load one config
//! (from file, environment, or defaults) and hand each piece to the right
//! component.

use serde::{Deserialize, Serialize};

use crate::error::CoreResult;
use crate::sketch::SketchParams;
use crate::thresholds::ThresholdConfig;
use crate::types::MiningParams;

/// Top-level configuration for the mining engine.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Batch miner parameters.
    pub mining: MiningParams,
    /// Sketch builder parameters.
    pub sketch: SketchParams,
    /// Threshold API limits.
    pub thresholds: ThresholdConfig,
}

impl EngineConfig {
    /// Validate all parameter sets.
    pub fn validate(&self) -> CoreResult<()> {
        self.mining.validate()?;
        self.sketch.validate()?;
        Ok(())
    }
}
