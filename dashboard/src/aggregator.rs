use crate::classify::classify;
use crate::query::history::HistoryByItem;
use fleet_dashboard_model::{
    AggregatedHost, Dashboard, Environment, EnvironmentGroup, Host, HostId, MetricDefinition,
    MetricSeries, ServiceRef,
};
use std::collections::{BTreeMap, HashSet};

/// Assemble the dashboard from the resolved hosts, their metric definitions and history.
///
/// Hosts are grouped by environment. Groups appear in the order their first host appears in
/// `hosts`, and hosts keep that order within their group. A host id seen twice is only kept
/// the first time.
pub fn aggregate(
    service: ServiceRef,
    hosts: &[Host],
    definitions: &[MetricDefinition],
    history: &HistoryByItem,
) -> Dashboard {
    let mut seen = HashSet::new();
    let mut environments: Vec<EnvironmentGroup> = Vec::new();

    for host in hosts {
        if !seen.insert(host.id) {
            log::debug!("Skipping duplicate host {}", host.id);
            continue;
        }

        let environment = classify(&host.display_name);
        if environment == Environment::Unknown {
            log::debug!(
                "No environment tag in host name {:?} of host {}",
                host.display_name,
                host.id
            );
        }

        let aggregated = AggregatedHost {
            host: host.clone(),
            environment,
            series: series_for_host(host.id, definitions, history),
        };

        match environments
            .iter_mut()
            .find(|group| group.environment == environment)
        {
            Some(group) => group.hosts.push(aggregated),
            None => environments.push(EnvironmentGroup {
                environment,
                hosts: vec![aggregated],
            }),
        }
    }

    log::info!(
        "Aggregated {} hosts in {} environments for service {}:{}",
        seen.len(),
        environments.len(),
        service.name,
        service.port
    );

    Dashboard {
        service,
        environments,
    }
}

/// Build the series of every metric defined for a host, keyed by metric key.
///
/// When a host has more than one item for a key the first definition wins. A definition without
/// history gets an empty series.
pub fn series_for_host(
    host_id: HostId,
    definitions: &[MetricDefinition],
    history: &HistoryByItem,
) -> BTreeMap<String, MetricSeries> {
    let mut series = BTreeMap::new();

    for definition in definitions.iter().filter(|d| d.host_id == host_id) {
        if series.contains_key(&definition.key) {
            log::debug!(
                "Host {} has more than one item for {}, ignoring item {}",
                host_id,
                definition.key,
                definition.item_id
            );
            continue;
        }

        series.insert(
            definition.key.clone(),
            MetricSeries {
                host_id,
                key: definition.key.clone(),
                samples: history
                    .get(&definition.item_id)
                    .cloned()
                    .unwrap_or_default(),
            },
        );
    }

    series
}
