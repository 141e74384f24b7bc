//! Render-ready widgets for a dashboard row.
//!
//! Widgets describe what to draw, never how. A front end turns a [HostWidgets] into
//! sparklines, pies and tooltips in whatever charting library it uses.

use crate::{AggregatedHost, Dashboard, Environment, MetricSeries, SampleValue, Severity};
use serde::{Deserialize, Serialize};

/// Upper bound of the load sparkline
const LOAD_RANGE_MAX: f64 = 4.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SparklineStyle {
    Line,
    Bar,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sparkline {
    pub style: SparklineStyle,
    pub min: f64,
    pub max: f64,
    /// Values in chronological order, oldest first
    pub values: Vec<SampleValue>,
    pub current: Option<SampleValue>,
    pub tooltip: String,
}

impl Sparkline {
    fn from_series(
        series: &MetricSeries,
        style: SparklineStyle,
        max: f64,
        unit: &str,
    ) -> Sparkline {
        let current = series.latest();
        Sparkline {
            style,
            min: 0.0,
            max,
            values: series.samples.iter().rev().copied().collect(),
            current,
            tooltip: match current {
                Some(value) => format!("current: {}{unit}", format_value(value)),
                None => String::new(),
            },
        }
    }
}

/// A filesystem usage pie
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PieGauge {
    pub mount: String,
    pub used_percent: SampleValue,
    pub tooltip: String,
}

/// Environment label and style
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Badge {
    pub label: String,
    pub severity: Severity,
}

impl From<Environment> for Badge {
    fn from(environment: Environment) -> Self {
        Badge {
            label: environment.to_string(),
            severity: environment.severity(),
        }
    }
}

/// Everything needed to draw one host row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostWidgets {
    pub name: String,
    pub fqdn: String,
    pub badge: Badge,
    pub load: Option<Sparkline>,
    pub memory: Option<Sparkline>,
    pub filesystems: Vec<PieGauge>,
}

impl HostWidgets {
    pub fn from_host(host: &AggregatedHost) -> Self {
        HostWidgets {
            name: host.host.display_name.clone(),
            fqdn: host.host.short_name.clone(),
            badge: host.environment.into(),
            load: host
                .cpu_load()
                .map(|s| Sparkline::from_series(s, SparklineStyle::Line, LOAD_RANGE_MAX, "")),
            memory: host
                .memory_used()
                .map(|s| Sparkline::from_series(s, SparklineStyle::Bar, 100.0, "%")),
            filesystems: host
                .filesystems()
                .filter_map(|fs| {
                    let used = fs.used_percent?;
                    Some(PieGauge {
                        tooltip: format!("{} ({}%)", fs.mount, format_value(used)),
                        mount: fs.mount,
                        used_percent: used,
                    })
                })
                .collect(),
        }
    }

    /// Widgets for every host of a dashboard, environment by environment.
    pub fn for_dashboard(dashboard: &Dashboard) -> Vec<HostWidgets> {
        dashboard.hosts().map(HostWidgets::from_host).collect()
    }
}

/// Format a value for a tooltip, floats rounded to two decimals.
pub fn format_value(value: SampleValue) -> String {
    match value {
        SampleValue::Integer(v) => v.to_string(),
        SampleValue::Float(v) => {
            let rounded = format!("{v:.2}");
            rounded
                .trim_end_matches('0')
                .trim_end_matches('.')
                .to_string()
        }
    }
}
