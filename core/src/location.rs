use serde::Serialize;
use std::fmt;

use crate::error::SolarError;

/// A point on the earth in signed degrees (north and east positive).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Location {
    latitude: f64,
    longitude: f64,
}

impl Location {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, SolarError> {
        // NaN fails both range checks
        if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
            return Err(SolarError::InvalidLocation { latitude, longitude });
        }

        Ok(Self { latitude, longitude })
    }

    /// Skips range checks. Garbage in makes the search fail with `NoEventInSearchWindow`.
    pub fn new_unchecked(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ns = if self.latitude < 0.0 { 'S' } else { 'N' };
        let ew = if self.longitude < 0.0 { 'W' } else { 'E' };
        write!(f, "{:.4}°{} {:.4}°{}", self.latitude.abs(), ns, self.longitude.abs(), ew)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_bounds() {
        assert!(Location::new(90.0, 180.0).is_ok());
        assert!(Location::new(-90.0, -180.0).is_ok());
    }

    #[test]
    fn test_rejects_out_of_range() {
        assert_eq!(
            Location::new(90.5, 0.0),
            Err(SolarError::InvalidLocation { latitude: 90.5, longitude: 0.0 })
        );
        assert!(Location::new(0.0, -180.01).is_err());
        assert!(Location::new(f64::NAN, 0.0).is_err());
        assert!(Location::new(0.0, f64::INFINITY).is_err());
    }

    #[test]
    fn test_fields_only_through_constructors() {
        let stockholm = Location::new(59.332953, 18.059986).unwrap();
        assert_eq!(stockholm.latitude(), 59.332953);
        assert_eq!(stockholm.longitude(), 18.059986);

        let json = serde_json::to_string(&stockholm).unwrap();
        assert_eq!(json, r#"{"latitude":59.332953,"longitude":18.059986}"#);
    }

    #[test]
    fn test_display() {
        let sydney = Location::new(-33.900626, 151.196210).unwrap();
        assert_eq!(sydney.to_string(), "33.9006°S 151.1962°E");
    }
}
