use chrono::{DateTime, Utc};
use fleet_dashboard_model::widget::{format_value, HostWidgets};
use fleet_dashboard_model::{AggregatedHost, Dashboard, MetricSeries};
use serde::Serialize;
use tabled::settings::Style;
use tabled::{Table, Tabled};

/// The JSON document printed by the binary
#[derive(Debug, Serialize)]
pub struct DashboardReport {
    pub generated_at: DateTime<Utc>,
    pub dashboard: Dashboard,
    pub widgets: Vec<HostWidgets>,
}

impl DashboardReport {
    pub fn new(dashboard: Dashboard, generated_at: DateTime<Utc>) -> Self {
        Self {
            generated_at,
            widgets: HostWidgets::for_dashboard(&dashboard),
            dashboard,
        }
    }
}

#[derive(Tabled)]
struct HostRow {
    #[tabled(rename = "Environment")]
    environment: String,
    #[tabled(rename = "Node")]
    node: String,
    #[tabled(rename = "Load")]
    load: String,
    #[tabled(rename = "RAM")]
    memory: String,
    #[tabled(rename = "Disk")]
    disk: String,
}

impl HostRow {
    fn new(environment: String, host: &AggregatedHost) -> Self {
        let disk = host
            .filesystems()
            .filter_map(|fs| {
                fs.used_percent
                    .map(|used| format!("{} {}%", fs.mount, format_value(used)))
            })
            .collect::<Vec<_>>();

        HostRow {
            environment,
            node: host.host.display_name.clone(),
            load: latest(host.cpu_load(), ""),
            memory: latest(host.memory_used(), "%"),
            disk: if disk.is_empty() {
                "-".to_string()
            } else {
                disk.join("\n")
            },
        }
    }
}

fn latest(series: Option<&MetricSeries>, unit: &str) -> String {
    match series.and_then(MetricSeries::latest) {
        Some(value) => format!("{}{unit}", format_value(value)),
        None => "-".to_string(),
    }
}

/// Render one row per host, the environment named on the first row of its group.
pub fn render_table(dashboard: &Dashboard) -> String {
    let rows = dashboard
        .environments
        .iter()
        .flat_map(|group| {
            group.hosts.iter().enumerate().map(|(i, host)| {
                let environment = if i == 0 {
                    group.environment.to_string()
                } else {
                    String::new()
                };
                HostRow::new(environment, host)
            })
        })
        .collect::<Vec<_>>();

    let mut table = Table::new(rows);
    table.with(Style::modern());

    table.to_string()
}
