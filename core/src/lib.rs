pub mod calculator;
pub mod config;
pub mod error;
pub mod event;
pub mod location;
pub mod solar;

pub use calculator::{next_dawn, next_dusk, next_sunrise, next_sunset, SolarEventCalculator};
pub use error::SolarError;
pub use event::{Phase, SolarEvent, Twilight, STANDARD_DEPRESSION};
pub use location::Location;
pub use solar::SolarModel;
