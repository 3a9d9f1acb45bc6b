use chrono::{DateTime, Datelike, NaiveDate, Timelike, Utc};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

use crate::location::Location;

const UNIX_EPOCH_JULIAN_DAY: f64 = 2_440_587.5;
const J2000_JULIAN_DAY: f64 = 2_451_545.0;
const DAYS_PER_JULIAN_CENTURY: f64 = 36_525.0;

/// Which set of orbital approximations feeds the per-day parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SolarModel {
    /// Truncated Fourier series in the fractional year. Good to a few minutes.
    Harmonic,
    /// NOAA Julian-century formulation. Good to well under a minute away from the poles.
    #[default]
    Noaa,
}

/// Equation of time and declination for one evaluation instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolarDayParameters {
    /// Apparent minus mean solar time, in minutes.
    pub equation_of_time: f64,
    /// Radians north of the celestial equator.
    pub declination: f64,
}

/// Outcome of solving for the hour angle at a given depression.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HourAngle {
    /// Degrees between solar noon and the crossing.
    Crossing(f64),
    /// The sun stays below the requested elevation all day.
    AlwaysBelow,
    /// The sun stays above the requested elevation all day.
    AlwaysAbove,
    /// Non-finite input (NaN coordinates).
    Undefined,
}

impl HourAngle {
    pub fn degrees(self) -> Option<f64> {
        match self {
            HourAngle::Crossing(deg) => Some(deg),
            _ => None,
        }
    }
}

impl SolarModel {
    pub fn parameters(self, at: DateTime<Utc>) -> SolarDayParameters {
        match self {
            SolarModel::Harmonic => harmonic_parameters(fractional_year(at)),
            SolarModel::Noaa => noaa_parameters(julian_century(at)),
        }
    }
}

fn days_in_year(year: i32) -> f64 {
    if NaiveDate::from_ymd_opt(year, 2, 29).is_some() {
        366.0
    } else {
        365.0
    }
}

/// Fractional year in radians, centred on noon UTC.
pub fn fractional_year(at: DateTime<Utc>) -> f64 {
    let doy = at.ordinal() as f64;
    let hour = at.hour() as f64 + at.minute() as f64 / 60.0 + at.second() as f64 / 3600.0;

    (2.0 * PI / days_in_year(at.year())) * (doy - 1.0 + (hour - 12.0) / 24.0)
}

pub fn harmonic_parameters(gamma: f64) -> SolarDayParameters {
    let equation_of_time = 229.18
        * (0.000075 + 0.001868 * gamma.cos()
            - 0.032077 * gamma.sin()
            - 0.014615 * (2.0 * gamma).cos()
            - 0.040849 * (2.0 * gamma).sin());

    let declination = 0.006918 - 0.399912 * gamma.cos() + 0.070257 * gamma.sin()
        - 0.006758 * (2.0 * gamma).cos()
        + 0.000907 * (2.0 * gamma).sin()
        - 0.002697 * (3.0 * gamma).cos()
        + 0.00148 * (3.0 * gamma).sin();

    SolarDayParameters {
        equation_of_time,
        declination,
    }
}

/// Julian centuries since J2000.0. UT is used directly; the delta-T offset is below our precision.
pub fn julian_century(at: DateTime<Utc>) -> f64 {
    let seconds = at.timestamp() as f64 + at.timestamp_subsec_nanos() as f64 * 1e-9;
    let julian_day = seconds / 86_400.0 + UNIX_EPOCH_JULIAN_DAY;

    (julian_day - J2000_JULIAN_DAY) / DAYS_PER_JULIAN_CENTURY
}

pub fn noaa_parameters(t: f64) -> SolarDayParameters {
    // Geometric mean longitude and anomaly (degrees)
    let mean_longitude = (280.46646 + t * (36000.76983 + 0.0003032 * t)).rem_euclid(360.0);
    let mean_anomaly = 357.52911 + t * (35999.05029 - 0.0001537 * t);
    let eccentricity = 0.016708634 - t * (0.000042037 + 0.0000001267 * t);

    let m = mean_anomaly.to_radians();
    let centre = m.sin() * (1.914602 - t * (0.004817 + 0.000014 * t))
        + (2.0 * m).sin() * (0.019993 - 0.000101 * t)
        + (3.0 * m).sin() * 0.000289;

    // Apparent longitude, corrected for nutation and aberration
    let omega = (125.04 - 1934.136 * t).to_radians();
    let apparent_longitude = mean_longitude + centre - 0.00569 - 0.00478 * omega.sin();

    let mean_obliquity =
        23.0 + (26.0 + (21.448 - t * (46.815 + t * (0.00059 - t * 0.001813))) / 60.0) / 60.0;
    let obliquity = (mean_obliquity + 0.00256 * omega.cos()).to_radians();

    let declination = (obliquity.sin() * apparent_longitude.to_radians().sin()).asin();

    let y = (obliquity / 2.0).tan().powi(2);
    let l0 = mean_longitude.to_radians();
    let eq_radians = y * (2.0 * l0).sin() - 2.0 * eccentricity * m.sin()
        + 4.0 * eccentricity * y * m.sin() * (2.0 * l0).cos()
        - 0.5 * y * y * (4.0 * l0).sin()
        - 1.25 * eccentricity * eccentricity * (2.0 * m).sin();

    SolarDayParameters {
        equation_of_time: 4.0 * eq_radians.to_degrees(),
        declination,
    }
}

/// Solves cos(HA) = (cos(z) - sin(lat)·sin(decl)) / (cos(lat)·cos(decl)) for z = 90° + depression.
pub fn hour_angle(latitude: f64, declination: f64, depression: f64) -> HourAngle {
    let zenith = (90.0 + depression).to_radians();
    let lat = latitude.to_radians();

    let cos_ha = (zenith.cos() - lat.sin() * declination.sin()) / (lat.cos() * declination.cos());

    if cos_ha.is_nan() {
        HourAngle::Undefined
    } else if cos_ha > 1.0 {
        HourAngle::AlwaysBelow
    } else if cos_ha < -1.0 {
        HourAngle::AlwaysAbove
    } else {
        HourAngle::Crossing(cos_ha.clamp(-1.0, 1.0).acos().to_degrees())
    }
}

/// Solar noon in UTC minutes after midnight of the evaluation day.
pub fn solar_noon_minutes(longitude: f64, params: &SolarDayParameters) -> f64 {
    720.0 - 4.0 * longitude - params.equation_of_time
}

/// Solar elevation in degrees (positive = day, negative = night).
pub fn solar_elevation(at: DateTime<Utc>, location: &Location, model: SolarModel) -> f64 {
    let params = model.parameters(at);
    let minutes = at.hour() as f64 * 60.0
        + at.minute() as f64
        + (at.second() as f64 + at.nanosecond() as f64 * 1e-9) / 60.0;

    // True solar time (minutes), 4 minutes per degree of longitude
    let true_solar_time = minutes + params.equation_of_time + 4.0 * location.longitude();
    let ha = ((true_solar_time / 4.0) - 180.0).to_radians();

    let lat = location.latitude().to_radians();
    let cos_zenith =
        lat.sin() * params.declination.sin() + lat.cos() * params.declination.cos() * ha.cos();

    90.0 - cos_zenith.clamp(-1.0, 1.0).acos().to_degrees()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn degrees(rad: f64) -> f64 {
        rad.to_degrees()
    }

    #[test]
    fn test_declination_near_solstices() {
        let june = Utc.with_ymd_and_hms(2014, 6, 21, 12, 0, 0).unwrap();
        let december = Utc.with_ymd_and_hms(2014, 12, 21, 12, 0, 0).unwrap();

        for model in [SolarModel::Noaa, SolarModel::Harmonic] {
            assert!((degrees(model.parameters(june).declination) - 23.44).abs() < 0.1);
            assert!((degrees(model.parameters(december).declination) + 23.44).abs() < 0.1);
        }
    }

    #[test]
    fn test_equation_of_time_extremes() {
        // Early November the sundial runs ~16.4 minutes fast, mid-February ~14.2 slow.
        let november = Utc.with_ymd_and_hms(2014, 11, 3, 12, 0, 0).unwrap();
        let february = Utc.with_ymd_and_hms(2014, 2, 11, 12, 0, 0).unwrap();

        for model in [SolarModel::Noaa, SolarModel::Harmonic] {
            assert!((model.parameters(november).equation_of_time - 16.4).abs() < 0.3);
            assert!((model.parameters(february).equation_of_time + 14.2).abs() < 0.3);
        }
    }

    #[test]
    fn test_julian_century_epoch() {
        let j2000 = Utc.with_ymd_and_hms(2000, 1, 1, 12, 0, 0).unwrap();
        assert!(julian_century(j2000).abs() < 1e-12);
    }

    #[test]
    fn test_fractional_year_uses_leap_length() {
        let leap_end = Utc.with_ymd_and_hms(2016, 12, 31, 12, 0, 0).unwrap();
        let gamma = fractional_year(leap_end);
        assert!((gamma - 2.0 * PI * 365.0 / 366.0).abs() < 1e-9);
    }

    #[test]
    fn test_hour_angle_branches() {
        let winter = (-23.44f64).to_radians();
        let summer = 23.44f64.to_radians();

        // Equator at equinox: six hours either side of noon, plus refraction.
        let equinox = hour_angle(0.0, 0.0, 0.833).degrees().unwrap();
        assert!((equinox - 90.833).abs() < 1e-6);

        assert_eq!(hour_angle(80.0, winter, 0.833), HourAngle::AlwaysBelow);
        assert_eq!(hour_angle(80.0, summer, 0.833), HourAngle::AlwaysAbove);
        assert_eq!(hour_angle(f64::NAN, summer, 0.833), HourAngle::Undefined);
    }

    #[test]
    fn test_elevation_at_local_noon_and_midnight() {
        let quito = Location::new(-0.18, -78.47).unwrap();
        let noon = Utc.with_ymd_and_hms(2014, 3, 20, 17, 21, 0).unwrap();
        let midnight = Utc.with_ymd_and_hms(2014, 3, 21, 5, 21, 0).unwrap();

        assert!(solar_elevation(noon, &quito, SolarModel::Noaa) > 88.0);
        assert!(solar_elevation(midnight, &quito, SolarModel::Noaa) < -88.0);
    }
}
