use super::{HistoryClass, HistoryQuery, ItemQuery, ItemSelector, MonitoringBackend};
use crate::error::{BackendError, BackendResult};
use fleet_dashboard_model::{
    Host, HistorySample, HostId, ItemId, MetricDefinition, MetricKind, SampleValue,
};
use futures::future::BoxFuture;
use futures::FutureExt;
use std::str::FromStr;
use zabbix_client::prelude::*;

impl MonitoringBackend for ZabbixClient {
    fn get_hosts<'a>(&'a self, host_ids: &'a [HostId]) -> BoxFuture<'a, BackendResult<Vec<Host>>> {
        async move {
            let params = HostGetParams::by_ids(host_ids.iter().map(ToString::to_string).collect());
            let records = self.host_get(&params).await.map_err(backend_error)?;
            log::trace!("host.get returned {} records", records.len());

            records.into_iter().map(host_from_record).collect()
        }
        .boxed()
    }

    fn get_items<'a>(
        &'a self,
        query: &'a ItemQuery,
    ) -> BoxFuture<'a, BackendResult<Vec<MetricDefinition>>> {
        async move {
            let host_ids = query.host_ids.iter().map(ToString::to_string).collect();
            let params = match &query.selector {
                ItemSelector::ExactKeys(keys) => ItemGetParams::exact_keys(host_ids, keys.clone()),
                ItemSelector::KeyPattern(pattern) => {
                    ItemGetParams::key_pattern(host_ids, pattern.clone())
                }
            };
            let records = self.item_get(&params).await.map_err(backend_error)?;
            log::trace!("item.get returned {} records", records.len());

            let kind = query.kind();
            records
                .into_iter()
                .map(|record| definition_from_record(record, kind))
                .collect()
        }
        .boxed()
    }

    fn get_history<'a>(
        &'a self,
        query: &'a HistoryQuery,
    ) -> BoxFuture<'a, BackendResult<Vec<HistorySample>>> {
        async move {
            let params = HistoryGetParams::recent(
                query.item_ids.iter().map(ToString::to_string).collect(),
                history_code(query.class),
                query.range.from,
                query.range.till,
            );
            let records = self.history_get(&params).await.map_err(backend_error)?;
            log::trace!(
                "history.get ({}) returned {} records",
                query.class,
                records.len()
            );

            records
                .into_iter()
                .map(|record| sample_from_record(record, query.class))
                .collect()
        }
        .boxed()
    }
}

fn history_code(class: HistoryClass) -> u8 {
    match class {
        HistoryClass::Integer => HISTORY_UNSIGNED,
        HistoryClass::Float => HISTORY_FLOAT,
    }
}

fn backend_error(err: ZabbixError) -> BackendError {
    if err.is_auth_failure() {
        BackendError::Auth(err.to_string())
    } else {
        BackendError::Query(err.to_string())
    }
}

fn parse_field<T: FromStr>(value: &str, field: &str) -> BackendResult<T> {
    value
        .parse()
        .map_err(|_| BackendError::Malformed(format!("{field} is not a number: {value:?}")))
}

fn host_from_record(record: HostRecord) -> BackendResult<Host> {
    Ok(Host {
        id: HostId(parse_field(&record.hostid, "hostid")?),
        display_name: record.name,
        short_name: record.host,
    })
}

fn definition_from_record(record: ItemRecord, kind: MetricKind) -> BackendResult<MetricDefinition> {
    Ok(MetricDefinition {
        item_id: ItemId(parse_field(&record.itemid, "itemid")?),
        host_id: HostId(parse_field(&record.hostid, "hostid")?),
        key: record.key,
        display_name: record.name,
        kind,
    })
}

fn sample_from_record(record: HistoryRecord, class: HistoryClass) -> BackendResult<HistorySample> {
    let value = match class {
        HistoryClass::Integer => SampleValue::Integer(parse_field(&record.value, "value")?),
        HistoryClass::Float => SampleValue::Float(parse_field(&record.value, "value")?),
    };

    Ok(HistorySample {
        item_id: ItemId(parse_field(&record.itemid, "itemid")?),
        clock: parse_field(&record.clock, "clock")?,
        value,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn history_record(value: &str) -> HistoryRecord {
        HistoryRecord {
            itemid: "23296".to_string(),
            clock: "1351090996".to_string(),
            value: value.to_string(),
            ns: None,
        }
    }

    #[test]
    fn samples_keep_their_class_type() {
        assert_eq!(
            HistorySample {
                item_id: ItemId(23296),
                clock: 1351090996,
                value: SampleValue::Integer(12),
            },
            sample_from_record(history_record("12"), HistoryClass::Integer).unwrap()
        );
        assert_eq!(
            SampleValue::Float(0.085),
            sample_from_record(history_record("0.0850"), HistoryClass::Float)
                .unwrap()
                .value
        );
    }

    #[test]
    fn float_in_integer_class_is_malformed() {
        let err = sample_from_record(history_record("0.0850"), HistoryClass::Integer).unwrap_err();
        assert!(matches!(err, BackendError::Malformed(_)));
    }

    #[test]
    fn item_records_become_definitions() {
        let definition = definition_from_record(
            ItemRecord {
                itemid: "42269".to_string(),
                hostid: "10084".to_string(),
                key: "vfs.fs.size[/,pfree]".to_string(),
                name: "Free disk space on / (percentage)".to_string(),
            },
            MetricKind::Discovered,
        )
        .unwrap();

        assert_eq!(ItemId(42269), definition.item_id);
        assert_eq!(HostId(10084), definition.host_id);
        assert_eq!(MetricKind::Discovered, definition.kind);
    }

    #[test]
    fn unparsable_host_id_is_malformed() {
        let err = host_from_record(HostRecord {
            hostid: "ten".to_string(),
            name: "adsysprd101".to_string(),
            host: "adsysprd101".to_string(),
        })
        .unwrap_err();
        assert_eq!(
            BackendError::Malformed("hostid is not a number: \"ten\"".to_string()),
            err
        );
    }

    #[test]
    fn auth_failures_are_classified() {
        let err = backend_error(ZabbixError::Api {
            method: "host.get".to_string(),
            code: -32602,
            message: "Invalid params.".to_string(),
            data: "Not authorized.".to_string(),
        });
        assert!(matches!(err, BackendError::Auth(_)));

        let err = backend_error(ZabbixError::EmptyResponse {
            method: "item.get".to_string(),
        });
        assert!(matches!(err, BackendError::Query(_)));
    }

    #[test]
    fn history_class_codes() {
        assert_eq!(3, history_code(HistoryClass::Integer));
        assert_eq!(0, history_code(HistoryClass::Float));
    }
}
