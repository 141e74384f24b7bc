use crate::backend::{ItemQuery, MonitoringBackend};
use crate::config::MetricCatalog;
use crate::error::DashboardError;
use crate::query::bounded;
use fleet_dashboard_model::{HostId, MetricDefinition};
use futures::FutureExt;
use std::collections::HashSet;
use std::time::Duration;

/// Find the metric definitions to display for the given hosts.
///
/// Fixed keys come first, then the definitions discovered by each pattern in order. A host
/// without an item for some key simply has no definition for it.
pub async fn resolve_metrics<B>(
    backend: &B,
    host_ids: &[HostId],
    catalog: &MetricCatalog,
    timeout: Duration,
) -> Result<Vec<MetricDefinition>, DashboardError>
where
    B: MonitoringBackend + ?Sized,
{
    log::debug!(
        "Resolving {} fixed keys and {} discovery patterns for {} hosts",
        catalog.fixed_keys.len(),
        catalog.discovery_patterns.len(),
        host_ids.len()
    );

    let fixed_query = (!catalog.fixed_keys.is_empty())
        .then(|| ItemQuery::exact_keys(host_ids.to_vec(), catalog.fixed_keys.clone()));
    let discovery_queries = catalog
        .discovery_patterns
        .iter()
        .map(|pattern| ItemQuery::key_pattern(host_ids.to_vec(), pattern.clone()))
        .collect::<Vec<_>>();

    let fixed = match &fixed_query {
        Some(query) => bounded("fixed items", timeout, backend.get_items(query)).left_future(),
        None => futures::future::ok(Vec::new()).right_future(),
    };
    let discovered = futures::future::try_join_all(
        discovery_queries
            .iter()
            .map(|query| bounded("discovered items", timeout, backend.get_items(query))),
    );

    let (fixed, discovered) = tokio::try_join!(fixed, discovered)?;

    let queries = fixed_query.iter().chain(discovery_queries.iter());
    let batches = fixed_query
        .as_ref()
        .map(|_| fixed)
        .into_iter()
        .chain(discovered);

    let requested = host_ids.iter().collect::<HashSet<_>>();
    let mut seen_items = HashSet::new();
    let mut definitions = Vec::new();
    for (query, batch) in queries.zip(batches) {
        let kind = query.kind();
        for definition in batch {
            if !requested.contains(&definition.host_id) {
                log::debug!(
                    "Ignoring item {} of host {} which was not requested",
                    definition.item_id,
                    definition.host_id
                );
                continue;
            }
            if seen_items.insert(definition.item_id) {
                definitions.push(MetricDefinition { kind, ..definition });
            }
        }
    }

    log::debug!("Resolved {} metric definitions", definitions.len());

    Ok(definitions)
}
