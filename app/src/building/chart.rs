use std::time::Duration;

use derive_more::derive::{Display, Error};
use serde::Serialize;
use tokio::{sync::mpsc, task::JoinSet};

use crate::core::timeseries::{DataPoint, StoreError, TimeSeriesStore};
use crate::core::unit::Quantity;

use super::{Building, RoomId};

/// Full history of one room, oldest point first
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series<T> {
    pub name: RoomId,
    pub points: Vec<DataPoint<T>>,
}

#[derive(Debug, Display, Error)]
pub enum CollectError {
    #[display("Error reading history of room '{room}': {source}")]
    Store { room: RoomId, source: StoreError },

    #[display("No history from room '{room}' within {timeout:?}")]
    Timeout { room: RoomId, timeout: Duration },

    #[display("History task failed")]
    TaskFailed(tokio::task::JoinError),
}

/// Reads the history of every room concurrently and returns one series per room, sorted by room
/// name regardless of the order in which the rooms answer. Either all series are returned or an
/// error, each room read is bounded by `timeout`.
#[tracing::instrument(skip_all, fields(quantity = T::NAME, rooms = building.len()))]
pub async fn build_sorted_series<T: Quantity>(
    building: &Building<T>,
    timeout: Duration,
) -> Result<Vec<Series<T>>, CollectError> {
    let (series_tx, series_rx) = mpsc::channel(building.len().max(1));
    let merger = tokio::spawn(sort_series_by_name(series_rx));

    let mut fetches = JoinSet::new();
    for (room, store) in building.rooms() {
        let (room, store, series_tx) = (room.clone(), store.clone(), series_tx.clone());

        fetches.spawn(async move {
            let series = fetch_series(room, store, timeout).await?;
            if series_tx.send(series).await.is_err() {
                tracing::warn!("Series merger stopped before all rooms were collected");
            }
            Ok::<_, CollectError>(())
        });
    }

    //merger completes once the last fetch has dropped its sender
    drop(series_tx);

    while let Some(joined) = fetches.join_next().await {
        joined.map_err(CollectError::TaskFailed)??;
    }

    let sorted = merger.await.map_err(CollectError::TaskFailed)?;
    tracing::debug!("Collected {} series", sorted.len());

    Ok(sorted)
}

async fn fetch_series<T: Quantity>(
    room: RoomId,
    store: TimeSeriesStore<T>,
    timeout: Duration,
) -> Result<Series<T>, CollectError> {
    match tokio::time::timeout(timeout, store.history()).await {
        Ok(Ok(points)) => Ok(Series { name: room, points }),
        Ok(Err(source)) => Err(CollectError::Store { room, source }),
        Err(_) => {
            tracing::warn!("Timeout reading history of room '{}'", room);
            Err(CollectError::Timeout { room, timeout })
        }
    }
}

//insertion via binary search keeps the result sorted after every arrival
async fn sort_series_by_name<T>(mut rx: mpsc::Receiver<Series<T>>) -> Vec<Series<T>> {
    let mut sorted: Vec<Series<T>> = Vec::new();

    while let Some(series) = rx.recv().await {
        let pos = sorted
            .binary_search_by(|s| s.name.cmp(&series.name))
            .unwrap_or_else(|pos| pos);
        sorted.insert(pos, series);
    }

    sorted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::time::{DateTime, FIXED_NOW};
    use crate::core::unit::Humidity;

    const TIMEOUT: Duration = Duration::from_secs(5);

    fn names<T>(series: &[Series<T>]) -> Vec<&str> {
        series.iter().map(|s| s.name.as_str()).collect()
    }

    fn series(name: &str) -> Series<Humidity> {
        Series {
            name: name.into(),
            points: vec![],
        }
    }

    #[tokio::test(start_paused = true)]
    async fn series_are_sorted_by_room_name() {
        let building = Building::<Humidity>::from_stores([
            (RoomId::from("Zeta"), TimeSeriesStore::new(10)),
            (RoomId::from("Alpha"), TimeSeriesStore::delayed(10, Duration::from_millis(200))),
            (RoomId::from("Mid"), TimeSeriesStore::delayed(10, Duration::from_millis(100))),
        ]);
        for (_, store) in building.rooms() {
            store.append(Humidity(50.0)).await.unwrap();
        }

        let result = build_sorted_series(&building, TIMEOUT).await.unwrap();

        assert_eq!(names(&result), vec!["Alpha", "Mid", "Zeta"]);
        assert!(result.iter().all(|s| s.points.len() == 1));
    }

    #[tokio::test(start_paused = true)]
    async fn merge_orders_by_name_independent_of_arrival() {
        let (tx, rx) = mpsc::channel(3);
        let merger = tokio::spawn(sort_series_by_name(rx));

        for (name, delay_ms) in [("Zeta", 0), ("Alpha", 50), ("Mid", 10)] {
            let tx = tx.clone();
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                tx.send(series(name)).await.unwrap();
            });
        }
        drop(tx);

        let sorted = merger.await.unwrap();

        assert_eq!(names(&sorted), vec!["Alpha", "Mid", "Zeta"]);
    }

    #[tokio::test]
    async fn points_keep_arrival_order() {
        let building = Building::<Humidity>::new(&[RoomId::from("Kitchen")], 10);
        let store = building.room(&"Kitchen".into()).unwrap();
        let first = DateTime::from_iso("2024-11-03T15:00:00Z").unwrap();
        let second = DateTime::from_iso("2024-11-03T15:05:00Z").unwrap();

        FIXED_NOW.scope(first, store.append(Humidity(41.0))).await.unwrap();
        FIXED_NOW.scope(second, store.append(Humidity(43.5))).await.unwrap();

        let result = build_sorted_series(&building, TIMEOUT).await.unwrap();

        assert_eq!(
            result,
            vec![Series {
                name: "Kitchen".into(),
                points: vec![
                    DataPoint::new(Humidity(41.0), first),
                    DataPoint::new(Humidity(43.5), second)
                ],
            }]
        );
    }

    #[tokio::test]
    async fn rooms_without_history_yield_empty_series() {
        let building = Building::<Humidity>::new(&[RoomId::from("B"), RoomId::from("A")], 10);

        let result = build_sorted_series(&building, TIMEOUT).await.unwrap();

        assert_eq!(result, vec![series("A"), series("B")]);
    }

    #[tokio::test]
    async fn empty_building_yields_no_series() {
        let building = Building::<Humidity>::new(&[], 10);

        let result = build_sorted_series(&building, TIMEOUT).await.unwrap();

        assert!(result.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn stalled_room_fails_with_timeout() {
        let building = Building::<Humidity>::from_stores([
            (RoomId::from("A"), TimeSeriesStore::new(10)),
            (RoomId::from("Stalled"), TimeSeriesStore::stalled()),
        ]);

        let result = build_sorted_series(&building, TIMEOUT).await;

        match result {
            Err(CollectError::Timeout { room, timeout }) => {
                assert_eq!(room.as_str(), "Stalled");
                assert_eq!(timeout, TIMEOUT);
            }
            other => panic!("Expected timeout, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn closed_room_fails_collection() {
        let building = Building::<Humidity>::new(&[RoomId::from("A")], 10);
        building.close().await.unwrap();

        let result = build_sorted_series(&building, TIMEOUT).await;

        assert!(matches!(
            result,
            Err(CollectError::Store {
                source: StoreError::Closed,
                ..
            })
        ));
    }
}
