use std::fs;
use std::path::Path;

use lane_detect_preproc::PreprocParams;
use serde::{Deserialize, Serialize};

use crate::{RunError, TrackerParams};

/// Optional debug artifacts of a run.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DebugOutputs {
    /// Write the first processed frame's histogram as JSON to this file.
    pub histogram_path: Option<String>,
    /// Write the search windows of every frame as PNGs into this directory.
    pub windows_dir: Option<String>,
}

/// Full configuration of a run, loaded from JSON.
///
/// Every field is optional in the file; missing ones take their defaults.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub preproc: PreprocParams,
    pub tracker: TrackerParams,
    pub debug: DebugOutputs,
    pub max_frames: Option<usize>,
}

impl RunConfig {
    pub fn load(path: &Path) -> Result<Self, RunError> {
        let text = fs::read_to_string(path).map_err(|source| RunError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| RunError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn to_json_pretty(&self) -> String {
        // Plain data structs with string keys; serialization cannot fail.
        serde_json::to_string_pretty(self).unwrap_or_default()
    }

    pub fn validate(&self) -> Result<(), RunError> {
        self.preproc.validate()?;
        self.tracker.search.validate()?;
        let tol = self.tracker.direction.center_tolerance_px;
        if !tol.is_finite() || tol < 0.0 {
            return Err(RunError::InvalidConfig(format!(
                "center_tolerance_px must be a non-negative number (got {tol})"
            )));
        }
        Ok(())
    }
}
