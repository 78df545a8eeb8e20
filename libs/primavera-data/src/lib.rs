//! Core data layer for the Primavera plant monitor: a client for the
//! CrateDB-compatible time-series store, the threshold alarm evaluator, the
//! resample-then-forecast pipeline, and the aggregator that drives one full
//! dashboard refresh.

use serde::{Deserialize, Serialize};

pub use error::Error;

mod aggregator;
pub mod alarm;
mod error;
pub mod forecast;
pub mod store;

pub use aggregator::{Aggregator, RefreshBundle};
pub use alarm::{AlarmState, Band, evaluate};
pub use forecast::{Forecast, Series, forecast};
pub use store::{SensorQuery, StoreClient};

/// One sensor sample as returned by the store.
///
/// `time_index` is epoch milliseconds. Sequences are ordered ascending by
/// `time_index`; spacing is irregular and duplicate timestamps can occur.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    pub entity_id: String,
    pub time_index: i64,
    pub value: f64,
}

/// One GPS track point. The store orders the track by its time index; no
/// entity id is carried.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GpsPoint {
    pub lat: f64,
    pub lon: f64,
}
