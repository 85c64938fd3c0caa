use serde::{Deserialize, Serialize};

/// Mapper instance configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapperConfig {
    /// Instance label attached to log events
    pub name: String,

    /// Report dispatch failures to the diagnostic sink
    pub report_failures: bool,

    /// Emit debug events for registration, removal and one-shot consumption
    pub trace_registrations: bool,
}

impl Default for MapperConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl MapperConfig {
    pub fn new() -> Self {
        Self {
            name: "entitymapper".to_string(),
            report_failures: true,
            trace_registrations: true,
        }
    }

    /// Set the instance label
    pub fn name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    /// Enable or disable failure reports
    pub fn report_failures(mut self, enabled: bool) -> Self {
        self.report_failures = enabled;
        self
    }

    /// Enable or disable registration tracing
    pub fn trace_registrations(mut self, enabled: bool) -> Self {
        self.trace_registrations = enabled;
        self
    }
}
