//! Fixture data and a fake backend for testing the pipeline without a monitoring server.

use crate::backend::{HistoryClass, HistoryQuery, ItemQuery, ItemSelector, MonitoringBackend};
use crate::error::{BackendError, BackendResult};
use anyhow::Context;
use fleet_dashboard_model::{
    Dashboard, HistorySample, Host, HostId, ItemId, MetricDefinition, SampleValue,
};
use futures::future::BoxFuture;
use futures::FutureExt;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Everything a [StaticBackend] knows about
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BackendFixture {
    #[serde(default)]
    pub hosts: Vec<Host>,
    #[serde(default)]
    pub items: Vec<FixtureItem>,
    #[serde(default)]
    pub integer_history: Vec<HistorySample>,
    #[serde(default)]
    pub float_history: Vec<HistorySample>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixtureItem {
    pub item_id: ItemId,
    pub host_id: HostId,
    pub key: String,
    #[serde(default)]
    pub name: String,
}

impl BackendFixture {
    pub fn with_host(mut self, id: u64, display_name: &str) -> Self {
        self.hosts.push(Host {
            id: HostId(id),
            display_name: display_name.to_string(),
            short_name: format!("{display_name}.example.org"),
        });
        self
    }

    pub fn with_item(mut self, item_id: u64, host_id: u64, key: &str) -> Self {
        self.items.push(FixtureItem {
            item_id: ItemId(item_id),
            host_id: HostId(host_id),
            key: key.to_string(),
            name: key.to_string(),
        });
        self
    }

    pub fn with_integer_sample(mut self, item_id: u64, clock: i64, value: u64) -> Self {
        self.integer_history.push(HistorySample {
            item_id: ItemId(item_id),
            clock,
            value: SampleValue::Integer(value),
        });
        self
    }

    pub fn with_float_sample(mut self, item_id: u64, clock: i64, value: f64) -> Self {
        self.float_history.push(HistorySample {
            item_id: ItemId(item_id),
            clock,
            value: SampleValue::Float(value),
        });
        self
    }
}

/// A recorded call to a [StaticBackend]
#[derive(Debug, Clone, PartialEq)]
pub enum BackendCall {
    Hosts(Vec<HostId>),
    Items(ItemQuery),
    History(HistoryQuery),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendOperation {
    Hosts,
    Items,
    History,
}

#[derive(Debug, Clone)]
enum Behaviour {
    Fail(BackendError),
    Stall,
}

/// A [MonitoringBackend] that answers from a [BackendFixture] and records every call.
pub struct StaticBackend {
    fixture: BackendFixture,
    behaviour: HashMap<BackendOperation, Behaviour>,
    calls: Mutex<Vec<BackendCall>>,
}

impl StaticBackend {
    pub fn new(fixture: BackendFixture) -> Self {
        Self {
            fixture,
            behaviour: HashMap::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Make every call of `operation` fail with `error`.
    pub fn fail_on(mut self, operation: BackendOperation, error: BackendError) -> Self {
        self.behaviour.insert(operation, Behaviour::Fail(error));
        self
    }

    /// Make every call of `operation` never complete.
    pub fn stall_on(mut self, operation: BackendOperation) -> Self {
        self.behaviour.insert(operation, Behaviour::Stall);
        self
    }

    /// The calls made so far, in the order they were made
    pub fn calls(&self) -> Vec<BackendCall> {
        self.calls.lock().clone()
    }

    fn respond<'a, T: Send + 'a>(
        &'a self,
        operation: BackendOperation,
        call: BackendCall,
        answer: impl FnOnce() -> T + Send + 'a,
    ) -> BoxFuture<'a, BackendResult<T>> {
        self.calls.lock().push(call);

        match self.behaviour.get(&operation).cloned() {
            Some(Behaviour::Fail(error)) => futures::future::ready(Err(error)).boxed(),
            Some(Behaviour::Stall) => futures::future::pending().boxed(),
            None => async move { Ok(answer()) }.boxed(),
        }
    }
}

impl MonitoringBackend for StaticBackend {
    fn get_hosts<'a>(&'a self, host_ids: &'a [HostId]) -> BoxFuture<'a, BackendResult<Vec<Host>>> {
        self.respond(
            BackendOperation::Hosts,
            BackendCall::Hosts(host_ids.to_vec()),
            move || {
                self.fixture
                    .hosts
                    .iter()
                    .filter(|host| host_ids.contains(&host.id))
                    .cloned()
                    .collect()
            },
        )
    }

    fn get_items<'a>(
        &'a self,
        query: &'a ItemQuery,
    ) -> BoxFuture<'a, BackendResult<Vec<MetricDefinition>>> {
        self.respond(
            BackendOperation::Items,
            BackendCall::Items(query.clone()),
            move || {
                let kind = query.kind();
                self.fixture
                    .items
                    .iter()
                    .filter(|item| query.host_ids.contains(&item.host_id))
                    .filter(|item| match &query.selector {
                        ItemSelector::ExactKeys(keys) => keys.contains(&item.key),
                        ItemSelector::KeyPattern(pattern) => wildcard_match(pattern, &item.key),
                    })
                    .map(|item| MetricDefinition {
                        item_id: item.item_id,
                        host_id: item.host_id,
                        key: item.key.clone(),
                        display_name: item.name.clone(),
                        kind,
                    })
                    .collect()
            },
        )
    }

    fn get_history<'a>(
        &'a self,
        query: &'a HistoryQuery,
    ) -> BoxFuture<'a, BackendResult<Vec<HistorySample>>> {
        self.respond(
            BackendOperation::History,
            BackendCall::History(query.clone()),
            move || {
                let samples = match query.class {
                    HistoryClass::Integer => &self.fixture.integer_history,
                    HistoryClass::Float => &self.fixture.float_history,
                };
                let mut samples = samples
                    .iter()
                    .filter(|s| query.item_ids.contains(&s.item_id))
                    .filter(|s| query.range.contains(s.clock))
                    .cloned()
                    .collect::<Vec<_>>();
                samples.sort_by(|a, b| b.clock.cmp(&a.clock));
                samples
            },
        )
    }
}

/// Match `value` against `pattern` where `*` stands for any run of characters.
fn wildcard_match(pattern: &str, value: &str) -> bool {
    match pattern.split_once('*') {
        None => pattern == value,
        Some((prefix, rest)) => {
            let Some(value) = value.strip_prefix(prefix) else {
                return false;
            };
            value
                .char_indices()
                .map(|(i, _)| i)
                .chain(std::iter::once(value.len()))
                .any(|i| wildcard_match(rest, &value[i..]))
        }
    }
}

/// A recorded dashboard request and the backend state it ran against
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardCase {
    pub request: CaseRequest,
    pub backend: BackendFixture,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseRequest {
    pub service: String,
    pub port: u16,
    pub host_ids: Vec<HostId>,
    /// Unix timestamp the history windows end at
    pub now: i64,
}

/// Load a dashboard case from `1_fixtures`
pub fn load_case(path: &Path) -> anyhow::Result<DashboardCase> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("Failed to open dashboard case {path:?}"))?;
    serde_json::from_reader(std::io::BufReader::new(file))
        .with_context(|| format!("Failed to load dashboard case {path:?}"))
}

/// Load an expected dashboard from `2_dashboards`
pub fn load_dashboard(path: &Path) -> anyhow::Result<Dashboard> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("Failed to open expected dashboard {path:?}"))?;
    serde_json::from_reader(std::io::BufReader::new(file))
        .with_context(|| format!("Failed to load expected dashboard {path:?}"))
}

/// Write the dashboard for a case into `2_dashboards` under the case's file name.
pub fn insert_dashboard(file_name: &str, dashboard: &Dashboard) -> anyhow::Result<()> {
    let path = test_data_dir().join("2_dashboards").join(file_name);
    log::debug!("Writing dashboard to {:?}", path);

    let out_file = std::fs::File::create(&path)
        .with_context(|| format!("Failed to create dashboard file {path:?}"))?;
    serde_json::to_writer_pretty(out_file, dashboard).context("Failed to write dashboard")?;

    Ok(())
}

pub fn test_data_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("test_data")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wildcards_match_any_run() {
        assert!(wildcard_match("vfs.fs.size[*,pfree]", "vfs.fs.size[/,pfree]"));
        assert!(wildcard_match("vfs.fs.size[*,pfree]", "vfs.fs.size[/var/log,pfree]"));
        assert!(wildcard_match("vfs.fs.size[*,pfree]", "vfs.fs.size[,pfree]"));
        assert!(!wildcard_match("vfs.fs.size[*,pfree]", "vfs.fs.size[/data,used]"));
        assert!(!wildcard_match("vfs.fs.size[*,pfree]", "vfs.fs.size[/,pfree]x"));
        assert!(wildcard_match("a*b*c", "a-b-b-c"));
    }

    #[tokio::test]
    async fn calls_are_recorded_even_when_failing() {
        let backend = StaticBackend::new(BackendFixture::default().with_host(1, "adsysprd101"))
            .fail_on(
                BackendOperation::Hosts,
                BackendError::Auth("Not authorized.".to_string()),
            );

        let result = backend.get_hosts(&[HostId(1)]).await;

        assert_eq!(Err(BackendError::Auth("Not authorized.".to_string())), result);
        assert_eq!(vec![BackendCall::Hosts(vec![HostId(1)])], backend.calls());
    }
}
