use anyhow::{bail, Context};
use chrono::Utc;
use clap::Parser as _;
use fleet_dashboard::report::{render_table, DashboardReport};
use zabbix_client::prelude::*;

mod cli;

use cli::{CliArgs, OutputFormat};

const CRATE_NAME: &str = env!("CARGO_PKG_NAME");
const CRATE_VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args = CliArgs::parse();
    log::info!("{CRATE_NAME} {CRATE_VERSION}");
    log::debug!("Using Zabbix API at {}", args.zabbix_url);

    let (client, logged_in) = connect(&args).await?;

    let dashboard = fleet_dashboard::build_dashboard(
        &client,
        &args.pipeline_config(),
        &args.service,
        args.port,
        &args.hosts,
    )
    .await;

    if logged_in {
        if let Err(e) = client.logout().await {
            log::warn!("Failed to log out of Zabbix: {e}");
        }
    }

    let dashboard = dashboard.context("Failed to build dashboard")?;

    match args.format {
        OutputFormat::Json => {
            let report = DashboardReport::new(dashboard, Utc::now());
            println!(
                "{}",
                serde_json::to_string_pretty(&report).context("Failed to serialize report")?
            );
        }
        OutputFormat::Table => println!("{}", render_table(&dashboard)),
    }

    Ok(())
}

/// Create a client from an API token, or by logging in with a user and password.
///
/// The flag is set when a session was opened that should be closed again.
async fn connect(args: &CliArgs) -> anyhow::Result<(ZabbixClient, bool)> {
    let client = ZabbixClient::new(args.zabbix_url.clone()).with_auth_method(
        if args.zabbix_auth_in_body {
            AuthMethod::RequestBody
        } else {
            AuthMethod::Header
        },
    );

    if let Some(token) = &args.zabbix_api_token {
        log::debug!("Using Zabbix API token");
        return Ok((client.with_token(token), false));
    }

    match (&args.zabbix_user, &args.zabbix_password) {
        (Some(user), Some(password)) => {
            let client = client
                .login(user, password)
                .await
                .with_context(|| format!("Failed to log in to Zabbix as {user:?}"))?;
            Ok((client, true))
        }
        _ => bail!(
            "Cannot read from Zabbix without `ZABBIX_API_TOKEN` or both `ZABBIX_USER` and `ZABBIX_PASSWORD`"
        ),
    }
}
