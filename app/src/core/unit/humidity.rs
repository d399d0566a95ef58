use std::fmt::Display;

use serde::{Deserialize, Serialize};

use super::Quantity;

/// Relative humidity in percent
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Humidity(pub f32);

impl Quantity for Humidity {
    const NAME: &'static str = "humidity";

    fn to_f32(&self) -> f32 {
        self.0
    }

    fn from_f32(value: f32) -> Self {
        Self(value)
    }
}

impl Display for Humidity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2} %", self.0)
    }
}
