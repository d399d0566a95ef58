pub mod register;
pub mod time;
pub mod timeseries;
pub mod unit;
