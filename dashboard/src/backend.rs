use crate::error::BackendResult;
use fleet_dashboard_model::{Host, HistorySample, HostId, ItemId, MetricDefinition, MetricKind};
use futures::future::BoxFuture;
use std::time::Duration;

mod zabbix;

/// A trait to describe how hosts, items and history are read from a monitoring backend.
///
/// Every call is a single read. Implementations should not retry, the pipeline treats any
/// error as fatal for the request.
pub trait MonitoringBackend: Send + Sync {
    /// Look up hosts by id.
    ///
    /// Ids that the backend does not know are left out of the result.
    fn get_hosts<'a>(&'a self, host_ids: &'a [HostId]) -> BoxFuture<'a, BackendResult<Vec<Host>>>;

    /// Find the items of the given hosts that match the query selector.
    ///
    /// The returned definitions carry [ItemQuery::kind].
    fn get_items<'a>(
        &'a self,
        query: &'a ItemQuery,
    ) -> BoxFuture<'a, BackendResult<Vec<MetricDefinition>>>;

    /// Read one history class for the given items, newest first.
    fn get_history<'a>(
        &'a self,
        query: &'a HistoryQuery,
    ) -> BoxFuture<'a, BackendResult<Vec<HistorySample>>>;
}

/// Which item keys to select
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemSelector {
    /// Keys equal to one of these
    ExactKeys(Vec<String>),
    /// Keys matching a pattern, `*` being a wildcard
    KeyPattern(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemQuery {
    pub host_ids: Vec<HostId>,
    pub selector: ItemSelector,
}

impl ItemQuery {
    pub fn exact_keys(host_ids: Vec<HostId>, keys: Vec<String>) -> Self {
        Self {
            host_ids,
            selector: ItemSelector::ExactKeys(keys),
        }
    }

    pub fn key_pattern(host_ids: Vec<HostId>, pattern: String) -> Self {
        Self {
            host_ids,
            selector: ItemSelector::KeyPattern(pattern),
        }
    }

    /// The kind of metric definition this query finds.
    pub fn kind(&self) -> MetricKind {
        match self.selector {
            ItemSelector::ExactKeys(_) => MetricKind::Fixed,
            ItemSelector::KeyPattern(_) => MetricKind::Discovered,
        }
    }
}

/// The storage partition of history values, by numeric type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
pub enum HistoryClass {
    /// Unsigned integer values
    #[display("integer")]
    Integer,
    /// Floating point values
    #[display("float")]
    Float,
}

/// An inclusive range of unix timestamps, in seconds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    pub from: i64,
    pub till: i64,
}

impl TimeRange {
    /// The `span` long range ending at `now`
    pub fn ending_at(now: i64, span: Duration) -> Self {
        let span = i64::try_from(span.as_secs()).unwrap_or(i64::MAX);
        Self {
            from: now.saturating_sub(span),
            till: now,
        }
    }

    pub fn contains(&self, clock: i64) -> bool {
        self.from <= clock && clock <= self.till
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryQuery {
    pub item_ids: Vec<ItemId>,
    pub class: HistoryClass,
    pub range: TimeRange,
}
