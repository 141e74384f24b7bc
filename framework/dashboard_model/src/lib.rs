use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

mod environment;
pub mod keys;
mod sample;
pub mod widget;

pub use environment::{Environment, Severity};
pub use sample::SampleValue;

/// Backend identifier of a monitored host
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
    derive_more::FromStr,
)]
#[serde(transparent)]
pub struct HostId(pub u64);

/// Backend identifier of a single metric on a single host
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
    derive_more::FromStr,
)]
#[serde(transparent)]
pub struct ItemId(pub u64);

/// A monitored host as reported by the backend
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Host {
    pub id: HostId,
    /// The visible name, which carries the environment tag
    pub display_name: String,
    /// The technical host name, usually the FQDN
    pub short_name: String,
}

/// How a metric definition was found
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    /// The key matched one of the fixed keys exactly
    Fixed,
    /// The key was found by a wildcard search, one item per discovered instance
    Discovered,
}

/// A metric item attached to a host
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MetricDefinition {
    pub item_id: ItemId,
    pub host_id: HostId,
    pub key: String,
    pub display_name: String,
    pub kind: MetricKind,
}

/// A single history value read from the backend
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HistorySample {
    pub item_id: ItemId,
    /// Unix timestamp in seconds
    pub clock: i64,
    pub value: SampleValue,
}

/// The recent values of one metric on one host
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MetricSeries {
    pub host_id: HostId,
    pub key: String,
    /// Values ordered newest first
    pub samples: Vec<SampleValue>,
}

impl MetricSeries {
    /// The most recent value, if any was observed in the window.
    pub fn latest(&self) -> Option<SampleValue> {
        self.samples.first().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Usage of one filesystem, derived from its free space series
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FilesystemUsage {
    pub mount: String,
    pub key: String,
    /// `100 - free%` of the most recent sample, [None] when the series is empty
    pub used_percent: Option<SampleValue>,
}

/// A host with its environment and the series of all its metrics
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AggregatedHost {
    pub host: Host,
    pub environment: Environment,
    /// Series by metric key
    pub series: BTreeMap<String, MetricSeries>,
}

impl AggregatedHost {
    /// Get the series for a metric key.
    ///
    /// Partial coverage is normal, so a missing key is [None] rather than an error.
    pub fn series(&self, key: &str) -> Option<&MetricSeries> {
        self.series.get(key)
    }

    /// The 1 minute CPU load average series
    pub fn cpu_load(&self) -> Option<&MetricSeries> {
        self.series(keys::CPU_LOAD)
    }

    /// The percentage of memory used series
    pub fn memory_used(&self) -> Option<&MetricSeries> {
        self.series(keys::MEMORY_USED)
    }

    /// Usage of every filesystem discovered on this host, ordered by key.
    pub fn filesystems(&self) -> impl Iterator<Item = FilesystemUsage> + '_ {
        self.series.iter().filter_map(|(key, series)| {
            keys::filesystem_mount(key).map(|mount| FilesystemUsage {
                mount: mount.to_string(),
                key: key.clone(),
                used_percent: series.latest().map(SampleValue::complement_percent),
            })
        })
    }
}

/// The service a dashboard was requested for.
///
/// Carried through to the result, it does not filter hosts or items.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServiceRef {
    pub name: String,
    pub port: u16,
}

/// The hosts of one environment, in the order they were first seen
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EnvironmentGroup {
    pub environment: Environment,
    pub hosts: Vec<AggregatedHost>,
}

/// The result of a dashboard request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Dashboard {
    pub service: ServiceRef,
    /// Environments in the order they were first seen among the resolved hosts
    pub environments: Vec<EnvironmentGroup>,
}

impl Dashboard {
    /// Find the group for an environment
    pub fn environment(&self, environment: Environment) -> Option<&EnvironmentGroup> {
        self.environments
            .iter()
            .find(|group| group.environment == environment)
    }

    /// All hosts, environment by environment
    pub fn hosts(&self) -> impl Iterator<Item = &AggregatedHost> {
        self.environments.iter().flat_map(|group| group.hosts.iter())
    }

    pub fn host_count(&self) -> usize {
        self.environments.iter().map(|group| group.hosts.len()).sum()
    }
}
