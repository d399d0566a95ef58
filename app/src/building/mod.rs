mod chart;
mod dashboard;

use std::collections::HashMap;

use derive_more::derive::Display;
use serde::{Deserialize, Serialize};

use crate::core::timeseries::{StoreError, TimeSeriesStore};
use crate::core::unit::Quantity;

pub use chart::{CollectError, build_sorted_series};
pub use dashboard::DashboardSnapshot;

/// Stable, opaque identifier of a monitored room
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Display, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomId(String);

impl RoomId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for RoomId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for RoomId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// One store per room for a single quantity. Rooms are fixed once the building is created.
pub struct Building<T> {
    rooms: HashMap<RoomId, TimeSeriesStore<T>>,
}

impl<T> Clone for Building<T> {
    fn clone(&self) -> Self {
        Self {
            rooms: self.rooms.clone(),
        }
    }
}

impl<T: Quantity> Building<T> {
    pub fn new(room_ids: &[RoomId], capacity: usize) -> Self {
        Self::from_stores(
            room_ids
                .iter()
                .map(|id| (id.clone(), TimeSeriesStore::new(capacity))),
        )
    }

    pub fn from_stores(stores: impl IntoIterator<Item = (RoomId, TimeSeriesStore<T>)>) -> Self {
        Self {
            rooms: stores.into_iter().collect(),
        }
    }

    pub fn room(&self, id: &RoomId) -> Option<&TimeSeriesStore<T>> {
        self.rooms.get(id)
    }

    pub fn rooms(&self) -> impl Iterator<Item = (&RoomId, &TimeSeriesStore<T>)> {
        self.rooms.iter()
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    /// Mean over the latest value of every room that has data. Rooms without data are left out of
    /// both sum and count. `None` if no room has data.
    #[tracing::instrument(skip_all, fields(quantity = T::NAME))]
    pub async fn average(&self) -> Result<Option<T>, StoreError> {
        let latest = futures::future::join_all(
            self.rooms
                .iter()
                .map(|(room, store)| async move { (room, store.latest().await) }),
        )
        .await;

        let mut sum = 0.0_f32;
        let mut count = 0_usize;

        for (room, result) in latest {
            match result? {
                Some(dp) => {
                    sum += dp.value.to_f32();
                    count += 1;
                }
                None => tracing::warn!("No {} for room '{}'", T::NAME, room),
            }
        }

        if count == 0 {
            tracing::warn!("Not enough data to calculate average {}", T::NAME);
            return Ok(None);
        }

        Ok(Some(T::from_f32(sum / count as f32)))
    }

    /// Closes every room's store. All rooms are attempted, the last failure is returned.
    pub async fn close(&self) -> Result<(), StoreError> {
        let results = futures::future::join_all(
            self.rooms
                .iter()
                .map(|(room, store)| async move { (room, store.close().await) }),
        )
        .await;

        let mut outcome = Ok(());
        for (room, result) in results {
            if let Err(e) = result {
                tracing::error!("Error closing {} store of room '{}': {}", T::NAME, room, e);
                outcome = Err(e);
            }
        }

        outcome
    }
}
