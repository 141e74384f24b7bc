use crate::backend::MonitoringBackend;
use crate::config::PipelineConfig;
use crate::query::catalog::resolve_metrics;
use crate::query::history::fetch_history;
use crate::query::query_hosts;
use chrono::Utc;
use fleet_dashboard_model::{Dashboard, HostId, ServiceRef};
use itertools::Itertools;

mod aggregator;
pub mod backend;
pub mod classify;
pub mod config;
pub mod error;
pub mod query;
pub mod report;

#[cfg(any(test, feature = "test_data"))]
pub mod test_data;

pub use aggregator::{aggregate, series_for_host};
pub use error::{BackendError, BackendResult, DashboardError};

/// A validated dashboard request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardRequest {
    pub service: ServiceRef,
    /// Requested hosts, without duplicates, in the order they were first given
    pub host_ids: Vec<HostId>,
}

impl DashboardRequest {
    /// Check a request before anything is sent to the backend.
    ///
    /// The service name and port are only carried into the result, but they still have to be
    /// present.
    pub fn new(
        service_name: &str,
        port: u16,
        host_ids: &[HostId],
    ) -> Result<Self, DashboardError> {
        let service_name = service_name.trim();
        if service_name.is_empty() {
            return Err(DashboardError::invalid_request("service name is empty"));
        }
        if port == 0 {
            return Err(DashboardError::invalid_request("port must not be 0"));
        }
        if host_ids.is_empty() {
            return Err(DashboardError::invalid_request("no hosts requested"));
        }

        Ok(Self {
            service: ServiceRef {
                name: service_name.to_string(),
                port,
            },
            host_ids: host_ids.iter().copied().unique().collect(),
        })
    }
}

/// Build the dashboard for a service running on the given hosts.
///
/// History windows end at the current time.
pub async fn build_dashboard<B>(
    backend: &B,
    config: &PipelineConfig,
    service_name: &str,
    port: u16,
    host_ids: &[HostId],
) -> Result<Dashboard, DashboardError>
where
    B: MonitoringBackend + ?Sized,
{
    let request = DashboardRequest::new(service_name, port, host_ids)?;

    execute_request(backend, config, request, Utc::now().timestamp()).await
}

/// Run the pipeline for a validated request with history windows ending at `now`.
pub async fn execute_request<B>(
    backend: &B,
    config: &PipelineConfig,
    request: DashboardRequest,
    now: i64,
) -> Result<Dashboard, DashboardError>
where
    B: MonitoringBackend + ?Sized,
{
    log::debug!(
        "Building dashboard for {}:{} on {} hosts",
        request.service.name,
        request.service.port,
        request.host_ids.len()
    );

    let hosts = query_hosts(backend, &request.host_ids, config.call_timeout).await?;
    let host_ids = hosts.iter().map(|host| host.id).unique().collect::<Vec<_>>();
    if host_ids.is_empty() {
        log::info!("None of the requested hosts are known to the backend");
        return Ok(aggregate(request.service, &[], &[], &Default::default()));
    }

    let definitions =
        resolve_metrics(backend, &host_ids, &config.catalog, config.call_timeout).await?;

    let item_ids = definitions
        .iter()
        .map(|definition| definition.item_id)
        .collect::<Vec<_>>();
    let history = fetch_history(
        backend,
        &item_ids,
        &config.history_windows,
        now,
        config.call_timeout,
    )
    .await?;

    Ok(aggregate(request.service, &hosts, &definitions, &history))
}
