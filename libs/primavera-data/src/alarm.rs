//! Threshold alarm evaluation for sensor readings.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Inclusive band of acceptable values. A reading strictly outside the band
/// raises the alarm.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Band {
    pub lower: f64,
    pub upper: f64,
}

impl Band {
    pub const fn new(lower: f64, upper: f64) -> Self {
        Band { lower, upper }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.lower && value <= self.upper
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AlarmState {
    Green,
    Red,
}

impl AlarmState {
    /// The CSS color the dashboard paints the alarm indicator with.
    pub fn as_str(self) -> &'static str {
        match self {
            AlarmState::Green => "green",
            AlarmState::Red => "red",
        }
    }
}

impl fmt::Display for AlarmState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Red iff at least one value lies strictly outside the band. An empty
/// sequence is green.
pub fn evaluate(values: &[f64], band: Band) -> AlarmState {
    if values.iter().any(|&v| !band.contains(v)) {
        AlarmState::Red
    } else {
        AlarmState::Green
    }
}
