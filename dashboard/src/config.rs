use crate::backend::HistoryClass;
use fleet_dashboard_model::keys;
use std::time::Duration;

/// Settings for a dashboard pipeline run
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    /// Upper bound for every single backend call
    pub call_timeout: Duration,
    pub history_windows: HistoryWindows,
    pub catalog: MetricCatalog,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            call_timeout: Duration::from_secs(30),
            history_windows: HistoryWindows::default(),
            catalog: MetricCatalog::default(),
        }
    }
}

/// How far back to read each history class.
///
/// A window has to be a little longer than the polling interval of the items, 600 s for the
/// default metrics, or a sample that arrives late is missed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryWindows {
    pub integer: Duration,
    pub float: Duration,
}

impl HistoryWindows {
    pub fn for_class(&self, class: HistoryClass) -> Duration {
        match class {
            HistoryClass::Integer => self.integer,
            HistoryClass::Float => self.float,
        }
    }
}

impl Default for HistoryWindows {
    fn default() -> Self {
        Self {
            integer: Duration::from_secs(659),
            float: Duration::from_secs(659),
        }
    }
}

/// The metrics shown on the dashboard
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricCatalog {
    /// Keys matched exactly
    pub fixed_keys: Vec<String>,
    /// Key patterns where `*` matches any run of characters, expanded by the backend
    pub discovery_patterns: Vec<String>,
}

impl Default for MetricCatalog {
    fn default() -> Self {
        Self {
            fixed_keys: vec![keys::CPU_LOAD.to_string(), keys::MEMORY_USED.to_string()],
            discovery_patterns: vec![keys::FILESYSTEM_FREE_PATTERN.to_string()],
        }
    }
}
