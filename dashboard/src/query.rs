use crate::backend::MonitoringBackend;
use crate::error::{BackendResult, DashboardError};
use fleet_dashboard_model::{Host, HostId};
use std::future::Future;
use std::time::Duration;

pub mod catalog;
pub mod history;

/// Run a backend call, bounded by `timeout`.
///
/// Backend errors are tagged with `operation` so the caller can tell which stage failed.
pub(crate) async fn bounded<T, F>(
    operation: &'static str,
    timeout: Duration,
    call: F,
) -> Result<T, DashboardError>
where
    F: Future<Output = BackendResult<T>>,
{
    log::debug!("Querying {}", operation);

    match tokio::time::timeout(timeout, call).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => {
            log::debug!("Query for {} failed: {}", operation, e);
            Err(DashboardError::from_backend(operation, e))
        }
        Err(_) => Err(DashboardError::BackendTimeout { operation, timeout }),
    }
}

/// Fetch the metadata of the requested hosts, in the order the backend returns them.
pub async fn query_hosts<B>(
    backend: &B,
    host_ids: &[HostId],
    timeout: Duration,
) -> Result<Vec<Host>, DashboardError>
where
    B: MonitoringBackend + ?Sized,
{
    let hosts = bounded("hosts", timeout, backend.get_hosts(host_ids)).await?;

    if hosts.len() < host_ids.len() {
        log::debug!(
            "Backend knows {} of {} requested hosts",
            hosts.len(),
            host_ids.len()
        );
    }

    Ok(hosts)
}
