use serde::{Deserialize, Serialize};
use std::fmt;

/// Depression for sunrise and sunset: refraction plus the sun's apparent radius.
pub const STANDARD_DEPRESSION: f64 = 0.833;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Morning,
    Evening,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Morning => write!(f, "morning"),
            Phase::Evening => write!(f, "evening"),
        }
    }
}

/// Named twilight conventions. The calculator itself only sees degrees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Twilight {
    Civil,
    Nautical,
    Astronomical,
}

impl Twilight {
    pub fn depression(self) -> f64 {
        match self {
            Twilight::Civil => 6.0,
            Twilight::Nautical => 12.0,
            Twilight::Astronomical => 18.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "depression", rename_all = "lowercase")]
pub enum SolarEvent {
    Sunrise,
    Sunset,
    Dawn(f64),
    Dusk(f64),
}

impl SolarEvent {
    pub fn phase(&self) -> Phase {
        match self {
            SolarEvent::Sunrise | SolarEvent::Dawn(_) => Phase::Morning,
            SolarEvent::Sunset | SolarEvent::Dusk(_) => Phase::Evening,
        }
    }

    pub fn depression(&self) -> f64 {
        match *self {
            SolarEvent::Sunrise | SolarEvent::Sunset => STANDARD_DEPRESSION,
            SolarEvent::Dawn(angle) | SolarEvent::Dusk(angle) => angle,
        }
    }
}

impl fmt::Display for SolarEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolarEvent::Sunrise => write!(f, "sunrise"),
            SolarEvent::Sunset => write!(f, "sunset"),
            SolarEvent::Dawn(angle) => write!(f, "dawn ({}°)", angle),
            SolarEvent::Dusk(angle) => write!(f, "dusk ({}°)", angle),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_decomposition() {
        assert_eq!(SolarEvent::Sunrise.phase(), Phase::Morning);
        assert_eq!(SolarEvent::Sunset.depression(), STANDARD_DEPRESSION);

        let dusk = SolarEvent::Dusk(Twilight::Nautical.depression());
        assert_eq!(dusk.phase(), Phase::Evening);
        assert_eq!(dusk.depression(), 12.0);
    }

    #[test]
    fn test_serde_shape() {
        let json = serde_json::to_string(&SolarEvent::Dawn(6.0)).unwrap();
        assert_eq!(json, r#"{"event":"dawn","depression":6.0}"#);

        let back: SolarEvent = serde_json::from_str(r#"{"event":"sunset"}"#).unwrap();
        assert_eq!(back, SolarEvent::Sunset);
    }
}
