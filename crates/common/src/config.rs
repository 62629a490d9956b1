//! Configuration structs for the pipeline.

use serde::{Deserialize, Serialize};

/// Device-open inputs for the acceleration pipeline.
///
/// The filter itself exposes no tunable options; this only carries where to
/// find the hardware. Buffer depth is a fixed internal constant of the
/// pipeline, not a configuration knob.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Display identity to connect to (`None` = the `DISPLAY` environment
    /// default).
    pub display: Option<String>,
    /// Screen index on that display.
    pub screen: u32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            display: None,
            screen: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_targets_env_display() {
        let cfg = PipelineConfig::default();
        assert_eq!(cfg.display, None);
        assert_eq!(cfg.screen, 0);
    }
}
