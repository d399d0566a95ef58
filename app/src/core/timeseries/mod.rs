pub mod datapoint;
pub mod store;

pub use datapoint::DataPoint;
pub use store::{StoreError, TimeSeriesStore};
