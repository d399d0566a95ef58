use std::time::Duration;

use config::{Config, ConfigError, Environment, File};
use infrastructure::{HttpServerConfig, MonitoringConfig};
use serde::Deserialize;

use crate::building::RoomId;

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub http_server: HttpServerConfig,
    pub monitoring: MonitoringConfig,
    pub building: BuildingSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BuildingSettings {
    pub rooms: Vec<RoomId>,
    #[serde(default = "default_humidity_capacity")]
    pub humidity_capacity: usize,
    #[serde(default = "default_duty_cycle_capacity")]
    pub duty_cycle_capacity: usize,
    #[serde(default = "default_chart_timeout_ms")]
    pub chart_timeout_ms: u64,
    #[serde(default = "default_target_humidity")]
    pub target_humidity: f32,
}

//one day of readings at one per minute
fn default_humidity_capacity() -> usize {
    1440
}

fn default_duty_cycle_capacity() -> usize {
    1440
}

fn default_chart_timeout_ms() -> u64 {
    2000
}

fn default_target_humidity() -> f32 {
    35.0
}

impl BuildingSettings {
    pub fn chart_timeout(&self) -> Duration {
        Duration::from_millis(self.chart_timeout_ms)
    }
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let builder = Config::builder()
            .add_source(File::with_name("config.toml"))
            .add_source(
                Environment::with_prefix("HVAC")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("building.rooms")
                    .try_parsing(true),
            );

        builder.build()?.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;

    #[test]
    fn shipped_config_is_valid() {
        let settings: Settings = Config::builder()
            .add_source(File::from_str(include_str!("../../config.toml"), FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(settings.http_server.port, 9090);
        assert_eq!(settings.building.rooms.len(), 2);
        assert_eq!(settings.building.chart_timeout(), Duration::from_millis(2000));
    }

    #[test]
    fn building_defaults_apply() {
        let building: BuildingSettings = Config::builder()
            .add_source(File::from_str(r#"rooms = ["Kitchen"]"#, FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(building.rooms, vec![RoomId::from("Kitchen")]);
        assert_eq!(building.humidity_capacity, 1440);
        assert_eq!(building.duty_cycle_capacity, 1440);
        assert_eq!(building.target_humidity, 35.0);
        assert_eq!(building.chart_timeout(), Duration::from_secs(2));
    }
}
