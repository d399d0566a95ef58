use serde::Serialize;

use crate::core::register::SharedValue;
use crate::core::time::DateTime;
use crate::core::timeseries::{StoreError, TimeSeriesStore};
use crate::core::unit::{DutyCycle, Humidity};

use super::{Building, RoomId};

/// Everything shown on the dashboard, `None` meaning unknown
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSnapshot {
    pub average: Option<Humidity>,
    pub target: Option<Humidity>,
    pub duty_cycle: Option<DutyCycle>,
    pub rooms: Vec<RoomReading>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RoomReading {
    pub room: RoomId,
    pub humidity: Option<Humidity>,
    pub updated: Option<DateTime>,
}

impl DashboardSnapshot {
    #[tracing::instrument(skip_all)]
    pub async fn collect(
        building: &Building<Humidity>,
        target: &SharedValue<Humidity>,
        duty_cycle: &TimeSeriesStore<DutyCycle>,
    ) -> Result<Self, StoreError> {
        let rooms = async {
            let mut readings = futures::future::try_join_all(building.rooms().map(|(room, store)| async move {
                let latest = store.latest().await?;

                Ok::<_, StoreError>(RoomReading {
                    room: room.clone(),
                    humidity: latest.as_ref().map(|dp| dp.value),
                    updated: latest.map(|dp| dp.timestamp),
                })
            }))
            .await?;

            readings.sort_by(|a, b| a.room.cmp(&b.room));
            Ok::<_, StoreError>(readings)
        };

        let target = async { Ok::<_, StoreError>(target.get().await) };
        let (average, rooms, duty_cycle, target) =
            futures::future::try_join4(building.average(), rooms, duty_cycle.latest(), target).await?;

        Ok(Self {
            average,
            target,
            duty_cycle: duty_cycle.map(|dp| dp.value),
            rooms,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::time::FIXED_NOW;
    use assert_json_diff::assert_json_eq;
    use serde_json::json;

    #[tokio::test]
    async fn unknown_values_are_null() {
        let building = Building::<Humidity>::new(&[RoomId::from("B"), RoomId::from("A")], 10);
        let target = SharedValue::empty();
        let duty_cycle = TimeSeriesStore::new(10);

        let snapshot = DashboardSnapshot::collect(&building, &target, &duty_cycle).await.unwrap();

        assert_json_eq!(
            serde_json::to_value(&snapshot).unwrap(),
            json!({
                "average": null,
                "target": null,
                "duty_cycle": null,
                "rooms": [
                    { "room": "A", "humidity": null, "updated": null },
                    { "room": "B", "humidity": null, "updated": null },
                ]
            })
        );
    }

    #[tokio::test]
    async fn snapshot_contains_latest_values() {
        let at = DateTime::from_iso("2024-11-03T15:23:46Z").unwrap();
        let building = Building::<Humidity>::new(&[RoomId::from("Bedroom"), RoomId::from("Attic")], 10);
        let target = SharedValue::new(Humidity(35.0));
        let duty_cycle = TimeSeriesStore::new(10);

        FIXED_NOW
            .scope(at, async {
                let bedroom = building.room(&RoomId::from("Bedroom")).unwrap();
                bedroom.append(Humidity(48.0)).await.unwrap();
                bedroom.append(Humidity(52.0)).await.unwrap();
                duty_cycle.append(DutyCycle(25.0)).await.unwrap();
            })
            .await;

        let snapshot = DashboardSnapshot::collect(&building, &target, &duty_cycle).await.unwrap();

        assert_json_eq!(
            serde_json::to_value(&snapshot).unwrap(),
            json!({
                "average": 52.0,
                "target": 35.0,
                "duty_cycle": 25.0,
                "rooms": [
                    { "room": "Attic", "humidity": null, "updated": null },
                    { "room": "Bedroom", "humidity": 52.0, "updated": serde_json::to_value(at).unwrap() },
                ]
            })
        );
    }

    #[tokio::test]
    async fn rooms_are_listed_by_name() {
        let building = Building::<Humidity>::new(
            &[RoomId::from("Zeta"), RoomId::from("Alpha"), RoomId::from("Mid")],
            10,
        );

        let snapshot = DashboardSnapshot::collect(&building, &SharedValue::empty(), &TimeSeriesStore::new(10))
            .await
            .unwrap();

        let rooms: Vec<&str> = snapshot.rooms.iter().map(|r| r.room.as_str()).collect();
        assert_eq!(rooms, vec!["Alpha", "Mid", "Zeta"]);
    }

    #[tokio::test]
    async fn closed_building_fails() {
        let building = Building::<Humidity>::new(&[RoomId::from("A")], 10);
        building.close().await.unwrap();

        let result = DashboardSnapshot::collect(&building, &SharedValue::empty(), &TimeSeriesStore::new(10)).await;

        assert!(matches!(result, Err(StoreError::Closed)));
    }
}
