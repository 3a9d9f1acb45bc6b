use thiserror::Error;

use crate::event::Phase;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolarError {
    #[error("Invalid location: latitude {latitude}, longitude {longitude}")]
    InvalidLocation { latitude: f64, longitude: f64 },
    #[error("No {phase} crossing at {depression}° below the horizon within {days} days")]
    NoEventInSearchWindow {
        phase: Phase,
        depression: f64,
        days: u32,
    },
}
