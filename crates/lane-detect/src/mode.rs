use lane_detect_search::LaneType;
use log::info;
use serde::{Deserialize, Serialize};

/// Which binary source drives the lane fits.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectionMode {
    /// Combined and yellow passes both run; the combined pass is authoritative
    /// until the yellow pass becomes dominant.
    #[default]
    Combined,
    /// Only the yellow pass runs and it is authoritative.
    YellowLocked,
}

/// Whether a yellow lock can be released again.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModePolicy {
    /// Once locked to yellow, stay locked for the rest of the run.
    #[default]
    Latching,
    /// Return to combined detection after `release_after` consecutive yellow
    /// passes without dominance (`0` behaves like `1`).
    Reversible { release_after: u32 },
}

/// Two-state machine switching between the combined and the yellow-only
/// source, driven by the yellow pass' dominance signal.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ModeController {
    mode: DetectionMode,
    policy: ModePolicy,
    non_dominant_streak: u32,
}

impl ModeController {
    pub fn new(policy: ModePolicy) -> Self {
        Self {
            mode: DetectionMode::Combined,
            policy,
            non_dominant_streak: 0,
        }
    }

    pub fn mode(&self) -> DetectionMode {
        self.mode
    }

    pub fn policy(&self) -> ModePolicy {
        self.policy
    }

    /// The combined pass is skipped while locked to yellow.
    pub fn runs_combined_pass(&self) -> bool {
        self.mode == DetectionMode::Combined
    }

    /// Feed this frame's yellow-pass result; returns the pass whose fits are
    /// authoritative for the frame.
    pub fn observe(&mut self, yellow_dominant: bool) -> LaneType {
        match self.mode {
            DetectionMode::Combined if yellow_dominant => {
                info!("yellow lanes dominant, locking detection to the yellow source");
                self.mode = DetectionMode::YellowLocked;
                self.non_dominant_streak = 0;
                LaneType::Yellow
            }
            DetectionMode::Combined => LaneType::Combined,
            DetectionMode::YellowLocked => {
                if yellow_dominant {
                    self.non_dominant_streak = 0;
                } else {
                    self.non_dominant_streak += 1;
                }
                if let ModePolicy::Reversible { release_after } = self.policy {
                    if self.non_dominant_streak >= release_after.max(1) {
                        info!(
                            "yellow lanes lost for {} frames, back to combined detection",
                            self.non_dominant_streak
                        );
                        self.mode = DetectionMode::Combined;
                        self.non_dominant_streak = 0;
                    }
                }
                // The combined pass did not run this frame.
                LaneType::Yellow
            }
        }
    }
}
