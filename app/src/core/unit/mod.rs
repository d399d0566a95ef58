mod duty_cycle;
mod humidity;

pub use duty_cycle::DutyCycle;
pub use humidity::Humidity;

/// A scalar measurement tracked per room. Values are percentages unless the bounds say otherwise.
pub trait Quantity: Copy + Send + Sync + std::fmt::Debug + std::fmt::Display + 'static {
    const NAME: &'static str;
    const MIN: f32 = 0.0;
    const MAX: f32 = 100.0;

    fn to_f32(&self) -> f32;
    fn from_f32(value: f32) -> Self;

    fn validated(value: f64) -> Option<Self> {
        let range = (Self::MIN as f64)..=(Self::MAX as f64);
        range.contains(&value).then(|| Self::from_f32(value as f32))
    }
}
