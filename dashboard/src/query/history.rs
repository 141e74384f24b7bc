use crate::backend::{HistoryClass, HistoryQuery, MonitoringBackend, TimeRange};
use crate::config::HistoryWindows;
use crate::error::DashboardError;
use crate::query::bounded;
use fleet_dashboard_model::{HistorySample, ItemId, SampleValue};
use std::collections::BTreeMap;
use std::time::Duration;

/// Values per item, newest first
pub type HistoryByItem = BTreeMap<ItemId, Vec<SampleValue>>;

/// Read the recent history of the given items from both history classes.
///
/// Both classes are queried concurrently, each over its own window ending at `now`. The
/// samples are merged per item, newest first. Every requested item is present in the result,
/// with an empty sequence if nothing was recorded in the window.
pub async fn fetch_history<B>(
    backend: &B,
    item_ids: &[ItemId],
    windows: &HistoryWindows,
    now: i64,
    timeout: Duration,
) -> Result<HistoryByItem, DashboardError>
where
    B: MonitoringBackend + ?Sized,
{
    if item_ids.is_empty() {
        log::debug!("No items to read history for");
        return Ok(HistoryByItem::new());
    }

    let integer_query = history_query(item_ids, HistoryClass::Integer, windows, now);
    let float_query = history_query(item_ids, HistoryClass::Float, windows, now);

    let (integer, float) = tokio::try_join!(
        bounded(
            "integer history",
            timeout,
            backend.get_history(&integer_query)
        ),
        bounded("float history", timeout, backend.get_history(&float_query)),
    )?;

    log::debug!(
        "Read {} integer and {} float samples for {} items",
        integer.len(),
        float.len(),
        item_ids.len()
    );

    Ok(merge_history(
        item_ids,
        [(integer_query.range, integer), (float_query.range, float)],
    ))
}

fn history_query(
    item_ids: &[ItemId],
    class: HistoryClass,
    windows: &HistoryWindows,
    now: i64,
) -> HistoryQuery {
    HistoryQuery {
        item_ids: item_ids.to_vec(),
        class,
        range: TimeRange::ending_at(now, windows.for_class(class)),
    }
}

/// Merge sample batches into one newest first sequence per item.
///
/// Samples outside the range of their batch and samples of items that were not requested are
/// dropped. Samples with the same clock keep the order of the batches.
pub(crate) fn merge_history<const N: usize>(
    item_ids: &[ItemId],
    batches: [(TimeRange, Vec<HistorySample>); N],
) -> HistoryByItem {
    let mut by_item = item_ids
        .iter()
        .map(|id| (*id, Vec::<HistorySample>::new()))
        .collect::<BTreeMap<_, _>>();

    for (range, samples) in batches {
        for sample in samples {
            if !range.contains(sample.clock) {
                log::trace!(
                    "Dropping sample of item {} at {} outside {:?}",
                    sample.item_id,
                    sample.clock,
                    range
                );
                continue;
            }
            match by_item.get_mut(&sample.item_id) {
                Some(item_samples) => item_samples.push(sample),
                None => log::debug!("Dropping sample of unrequested item {}", sample.item_id),
            }
        }
    }

    by_item
        .into_iter()
        .map(|(id, mut samples)| {
            samples.sort_by(|a, b| b.clock.cmp(&a.clock));
            (id, samples.into_iter().map(|s| s.value).collect())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BackendError;
    use crate::test_data::{BackendCall, BackendFixture, BackendOperation, StaticBackend};
    use pretty_assertions::assert_eq;

    const NOW: i64 = 1_700_000_000;

    fn sample(item: u64, clock: i64, value: SampleValue) -> HistorySample {
        HistorySample {
            item_id: ItemId(item),
            clock,
            value,
        }
    }

    #[tokio::test]
    async fn both_classes_are_merged_per_item() {
        let backend = StaticBackend::new(
            BackendFixture::default()
                .with_integer_sample(1, NOW - 10, 5)
                .with_integer_sample(1, NOW - 70, 6)
                .with_integer_sample(1, NOW - 130, 7)
                .with_float_sample(1, NOW - 40, 0.5)
                .with_float_sample(1, NOW - 100, 0.25)
                .with_float_sample(2, NOW - 20, 1.5),
        );

        let history = fetch_history(
            &backend,
            &[ItemId(1), ItemId(2)],
            &HistoryWindows::default(),
            NOW,
            Duration::from_secs(1),
        )
        .await
        .unwrap();

        assert_eq!(
            vec![
                SampleValue::Integer(5),
                SampleValue::Float(0.5),
                SampleValue::Integer(6),
                SampleValue::Float(0.25),
                SampleValue::Integer(7),
            ],
            history[&ItemId(1)]
        );
        assert_eq!(vec![SampleValue::Float(1.5)], history[&ItemId(2)]);
    }

    #[tokio::test]
    async fn items_without_samples_map_to_empty() {
        let backend =
            StaticBackend::new(BackendFixture::default().with_float_sample(1, NOW - 10, 0.1));

        let history = fetch_history(
            &backend,
            &[ItemId(1), ItemId(3)],
            &HistoryWindows::default(),
            NOW,
            Duration::from_secs(1),
        )
        .await
        .unwrap();

        assert_eq!(Some(&vec![]), history.get(&ItemId(3)));
    }

    #[tokio::test]
    async fn each_class_has_its_own_window() {
        let backend = StaticBackend::new(BackendFixture::default());
        let windows = HistoryWindows {
            integer: Duration::from_secs(700),
            float: Duration::from_secs(660),
        };

        fetch_history(
            &backend,
            &[ItemId(1)],
            &windows,
            NOW,
            Duration::from_secs(1),
        )
        .await
        .unwrap();

        let mut ranges = backend
            .calls()
            .into_iter()
            .filter_map(|call| match call {
                BackendCall::History(query) => Some((query.class, query.range)),
                _ => None,
            })
            .collect::<Vec<_>>();
        ranges.sort_by_key(|(class, _)| *class == HistoryClass::Float);

        assert_eq!(
            vec![
                (
                    HistoryClass::Integer,
                    TimeRange {
                        from: NOW - 700,
                        till: NOW
                    }
                ),
                (
                    HistoryClass::Float,
                    TimeRange {
                        from: NOW - 660,
                        till: NOW
                    }
                ),
            ],
            ranges
        );
    }

    #[tokio::test]
    async fn late_samples_within_the_jitter_margin_are_kept() {
        // One poll every 600 s, the last one arriving half a minute late
        let backend = StaticBackend::new(
            BackendFixture::default()
                .with_float_sample(1, NOW - 630, 0.75)
                .with_integer_sample(2, NOW - 630, 37),
        );

        let history = fetch_history(
            &backend,
            &[ItemId(1), ItemId(2)],
            &HistoryWindows::default(),
            NOW,
            Duration::from_secs(1),
        )
        .await
        .unwrap();

        assert_eq!(vec![SampleValue::Float(0.75)], history[&ItemId(1)]);
        assert_eq!(vec![SampleValue::Integer(37)], history[&ItemId(2)]);
    }

    #[tokio::test]
    async fn no_items_means_no_queries() {
        let backend = StaticBackend::new(BackendFixture::default());

        let history = fetch_history(
            &backend,
            &[],
            &HistoryWindows::default(),
            NOW,
            Duration::from_secs(1),
        )
        .await
        .unwrap();

        assert!(history.is_empty());
        assert!(backend.calls().is_empty());
    }

    #[tokio::test]
    async fn failure_aborts_the_fetch() {
        let backend = StaticBackend::new(BackendFixture::default().with_float_sample(1, NOW, 1.0))
            .fail_on(
                BackendOperation::History,
                BackendError::Query("history.get failed".to_string()),
            );

        let err = fetch_history(
            &backend,
            &[ItemId(1)],
            &HistoryWindows::default(),
            NOW,
            Duration::from_secs(1),
        )
        .await
        .unwrap_err();

        assert!(err.is_query_failure());
    }

    #[tokio::test]
    async fn stalled_query_times_out() {
        let backend =
            StaticBackend::new(BackendFixture::default()).stall_on(BackendOperation::History);

        let err = fetch_history(
            &backend,
            &[ItemId(1)],
            &HistoryWindows::default(),
            NOW,
            Duration::from_millis(20),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, DashboardError::BackendTimeout { .. }));
    }

    #[test]
    fn merge_drops_samples_outside_their_window() {
        let merged = merge_history(
            &[ItemId(1)],
            [
                (
                    TimeRange::ending_at(NOW, Duration::from_secs(659)),
                    vec![sample(1, NOW - 650, SampleValue::Integer(1))],
                ),
                (
                    TimeRange::ending_at(NOW, Duration::from_secs(600)),
                    vec![
                        sample(1, NOW - 650, SampleValue::Float(2.0)),
                        sample(1, NOW + 5, SampleValue::Float(3.0)),
                    ],
                ),
            ],
        );

        assert_eq!(vec![SampleValue::Integer(1)], merged[&ItemId(1)]);
    }

    #[test]
    fn merge_is_stable_for_equal_clocks_and_ignores_unrequested_items() {
        let range = TimeRange::ending_at(NOW, Duration::from_secs(600));
        let merged = merge_history(
            &[ItemId(1)],
            [
                (range, vec![sample(1, NOW - 60, SampleValue::Integer(4))]),
                (
                    range,
                    vec![
                        sample(1, NOW - 60, SampleValue::Float(4.5)),
                        sample(9, NOW - 60, SampleValue::Float(9.0)),
                    ],
                ),
            ],
        );

        assert_eq!(1, merged.len());
        assert_eq!(
            vec![SampleValue::Integer(4), SampleValue::Float(4.5)],
            merged[&ItemId(1)]
        );
    }
}
