//! Update rate control for latest-value subscriptions

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Rate at which a latest-value subscriber wants to see records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateRate {
    /// Every value the stream publishes
    #[default]
    Native,

    /// At most this many values per second, latest wins.
    /// `Max(0)` is treated as `Native`.
    Max(u32),
}

impl UpdateRate {
    /// Normalize against the device output rate, when known.
    ///
    /// A limit at or above the output rate needs no throttling.
    pub fn normalize(self, output_hz: Option<f64>) -> Self {
        match (self, output_hz) {
            (UpdateRate::Max(0), _) => UpdateRate::Native,
            (UpdateRate::Max(hz), Some(out)) if hz as f64 >= out => UpdateRate::Native,
            (rate, _) => rate,
        }
    }

    /// Minimum spacing between delivered values, if throttled
    pub fn throttle_interval(self, output_hz: Option<f64>) -> Option<Duration> {
        match self.normalize(output_hz) {
            UpdateRate::Native => None,
            UpdateRate::Max(hz) => Some(Duration::from_secs_f64(1.0 / hz as f64)),
        }
    }
}
