use clap::{Parser, ValueEnum};
use fleet_dashboard::config::{HistoryWindows, PipelineConfig};
use fleet_dashboard_model::HostId;
use std::time::Duration;
use url::Url;

/// One year
const MAX_WINDOW_SECS: u64 = 365 * 24 * 60 * 60;

#[derive(Parser)]
#[command(about, long_about = None)]
pub struct CliArgs {
    /// Name of the service the dashboard is for.
    #[arg(long)]
    pub service: String,

    /// Port the service listens on.
    #[arg(long)]
    pub port: u16,

    /// Comma separated ids of the hosts running the service.
    #[arg(long, value_delimiter = ',', required = true)]
    pub hosts: Vec<HostId>,

    /// URL of the Zabbix JSON-RPC endpoint, e.g. `https://zabbix.example.org/api_jsonrpc.php`.
    #[arg(long, env = "ZABBIX_URL")]
    pub zabbix_url: Url,

    /// Zabbix API token, used instead of a user and password when set.
    #[arg(long, env = "ZABBIX_API_TOKEN", hide_env_values = true)]
    pub zabbix_api_token: Option<String>,

    /// Zabbix user to log in as.
    #[arg(long, env = "ZABBIX_USER")]
    pub zabbix_user: Option<String>,

    /// Password of the Zabbix user.
    #[arg(long, env = "ZABBIX_PASSWORD", hide_env_values = true)]
    pub zabbix_password: Option<String>,

    /// Send credentials in the request body instead of the `Authorization` header, for Zabbix
    /// servers older than 6.4.
    #[arg(long, env = "ZABBIX_AUTH_IN_BODY")]
    pub zabbix_auth_in_body: bool,

    /// Upper bound for each call to Zabbix, in seconds.
    #[arg(long, default_value_t = 30)]
    pub timeout_secs: u64,

    /// How far back to read integer history, in seconds. Must exceed the polling interval of
    /// the items.
    #[arg(long, default_value_t = 659, value_parser = clap::value_parser!(u64).range(1..=MAX_WINDOW_SECS))]
    pub integer_window_secs: u64,

    /// How far back to read float history, in seconds. Must exceed the polling interval of
    /// the items.
    #[arg(long, default_value_t = 659, value_parser = clap::value_parser!(u64).range(1..=MAX_WINDOW_SECS))]
    pub float_window_secs: u64,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// The dashboard and its widgets as JSON
    Json,
    /// A table with one row per host
    Table,
}

impl CliArgs {
    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            call_timeout: Duration::from_secs(self.timeout_secs),
            history_windows: HistoryWindows {
                integer: Duration::from_secs(self.integer_window_secs),
                float: Duration::from_secs(self.float_window_secs),
            },
            ..Default::default()
        }
    }
}
