//! Autosave configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default quiet period before a dirty design is saved
pub const DEFAULT_QUIET_PERIOD_SECS: u64 = 30;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AutosaveConfig {
    /// When false, changes are tracked but only saved on request
    pub enabled: bool,

    /// Seconds without changes before a save starts
    pub quiet_period_secs: u64,
}

impl Default for AutosaveConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            quiet_period_secs: DEFAULT_QUIET_PERIOD_SECS,
        }
    }
}

impl AutosaveConfig {
    /// `None` when the timer is disabled
    pub fn quiet_period(&self) -> Option<Duration> {
        self.enabled.then(|| Duration::from_secs(self.quiet_period_secs))
    }
}
