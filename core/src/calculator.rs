use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use tracing::{debug, trace};

use crate::error::SolarError;
use crate::event::{Phase, SolarEvent, STANDARD_DEPRESSION};
use crate::location::Location;
use crate::solar::{hour_angle, solar_noon_minutes, HourAngle, SolarModel};

pub const DEFAULT_SEARCH_LIMIT_DAYS: u32 = 366;
pub const DEFAULT_REFINEMENT_PASSES: u32 = 3;

/// Finds the next sunrise, sunset, dawn or dusk after a reference instant.
///
/// Stateless apart from its settings; share it freely between threads.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolarEventCalculator {
    model: SolarModel,
    search_limit_days: u32,
    refinement_passes: u32,
}

impl Default for SolarEventCalculator {
    fn default() -> Self {
        Self {
            model: SolarModel::default(),
            search_limit_days: DEFAULT_SEARCH_LIMIT_DAYS,
            refinement_passes: DEFAULT_REFINEMENT_PASSES,
        }
    }
}

fn add_minutes(midnight: DateTime<Utc>, minutes: f64) -> Option<DateTime<Utc>> {
    if !minutes.is_finite() {
        return None;
    }
    midnight.checked_add_signed(Duration::microseconds((minutes * 60_000_000.0).round() as i64))
}

/// Calendar date of local mean solar time (UTC shifted 4 minutes per degree east).
fn solar_date(at: DateTime<Utc>, location: &Location) -> Option<NaiveDate> {
    let shift = Duration::seconds((240.0 * location.longitude()).round() as i64);
    Some(at.checked_add_signed(shift)?.date_naive())
}

impl SolarEventCalculator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_model(mut self, model: SolarModel) -> Self {
        self.model = model;
        self
    }

    /// Days tried before giving up. Zero is allowed and always fails.
    pub fn with_search_limit_days(mut self, days: u32) -> Self {
        self.search_limit_days = days;
        self
    }

    pub fn with_refinement_passes(mut self, passes: u32) -> Self {
        self.refinement_passes = passes.max(1);
        self
    }

    pub fn model(&self) -> SolarModel {
        self.model
    }

    pub fn search_limit_days(&self) -> u32 {
        self.search_limit_days
    }

    pub fn refinement_passes(&self) -> u32 {
        self.refinement_passes
    }

    /// The crossing during the local mean solar day `date` at `location`, if the sun crosses at all.
    ///
    /// `date` names a solar day, not a UTC day: the instant returned is often on the previous
    /// or next UTC date. Sydney's sunrise for 2014-11-01 is 2014-10-31T18:55Z.
    /// Orbital parameters are re-evaluated at the candidate itself, starting from local mean noon.
    pub fn event_on(
        &self,
        date: NaiveDate,
        location: &Location,
        depression: f64,
        phase: Phase,
    ) -> Option<DateTime<Utc>> {
        let midnight = date.and_hms_opt(0, 0, 0)?.and_utc();
        let mut minutes = 720.0 - 4.0 * location.longitude();

        for _ in 0..self.refinement_passes {
            let params = self.model.parameters(add_minutes(midnight, minutes)?);

            let ha = match hour_angle(location.latitude(), params.declination, depression) {
                HourAngle::Crossing(ha) => ha,
                other => {
                    trace!("{}: no {} crossing at {}° ({:?})", date, phase, depression, other);
                    return None;
                }
            };

            let noon = solar_noon_minutes(location.longitude(), &params);
            minutes = match phase {
                Phase::Morning => noon - 4.0 * ha,
                Phase::Evening => noon + 4.0 * ha,
            };
        }

        add_minutes(midnight, minutes)
    }

    pub fn sunrise_on(&self, date: NaiveDate, location: &Location) -> Option<DateTime<Utc>> {
        self.event_on(date, location, STANDARD_DEPRESSION, Phase::Morning)
    }

    pub fn sunset_on(&self, date: NaiveDate, location: &Location) -> Option<DateTime<Utc>> {
        self.event_on(date, location, STANDARD_DEPRESSION, Phase::Evening)
    }

    pub fn dawn_on(&self, date: NaiveDate, location: &Location, depression: f64) -> Option<DateTime<Utc>> {
        self.event_on(date, location, depression, Phase::Morning)
    }

    pub fn dusk_on(&self, date: NaiveDate, location: &Location, depression: f64) -> Option<DateTime<Utc>> {
        self.event_on(date, location, depression, Phase::Evening)
    }

    /// Upper transit of the sun on the local mean solar day `date`. Exists even on polar days.
    pub fn solar_noon_on(&self, date: NaiveDate, location: &Location) -> Option<DateTime<Utc>> {
        let midnight = date.and_hms_opt(0, 0, 0)?.and_utc();
        let mut minutes = 720.0 - 4.0 * location.longitude();

        for _ in 0..self.refinement_passes {
            let params = self.model.parameters(add_minutes(midnight, minutes)?);
            minutes = solar_noon_minutes(location.longitude(), &params);
        }

        add_minutes(midnight, minutes)
    }

    /// First crossing of `depression` in `phase` strictly after `reference`.
    ///
    /// Steps forward one day at a time from the local mean solar day of `reference`, so
    /// `search_limit_days` counts days from the reference on. Polar days without a crossing
    /// are skipped; running out of `search_limit_days` is an error.
    pub fn next_event<Tz: TimeZone>(
        &self,
        reference: &DateTime<Tz>,
        location: &Location,
        depression: f64,
        phase: Phase,
    ) -> Result<DateTime<Tz>, SolarError> {
        let exhausted = SolarError::NoEventInSearchWindow {
            phase,
            depression,
            days: self.search_limit_days,
        };

        if self.search_limit_days == 0 {
            return Err(exhausted);
        }

        let reference_utc = reference.with_timezone(&Utc);
        let mut date = match solar_date(reference_utc, location) {
            Some(date) => date,
            None => return Err(exhausted),
        };

        debug!(
            "Searching {} crossing at {}° after {} for {} from solar day {}",
            phase, depression, reference_utc, location, date
        );

        // A crossing near solar midnight can still belong to the previous solar day.
        // Checking it does not count against the search window.
        if let Some(candidate) = date
            .pred_opt()
            .and_then(|previous| self.event_on(previous, location, depression, phase))
        {
            if candidate > reference_utc {
                debug!("Found {} crossing at {} on the previous solar day", phase, candidate);
                return Ok(candidate.with_timezone(&reference.timezone()));
            }
        }

        for day in 0..self.search_limit_days {
            if let Some(candidate) = self.event_on(date, location, depression, phase) {
                trace!("{}: candidate {}", date, candidate);
                if candidate > reference_utc {
                    debug!("Found {} crossing at {} after {} days", phase, candidate, day + 1);
                    return Ok(candidate.with_timezone(&reference.timezone()));
                }
            }

            date = match date.succ_opt() {
                Some(next) => next,
                None => break,
            };
        }

        debug!("Search for {} crossing gave up after {} days", phase, self.search_limit_days);
        Err(exhausted)
    }

    pub fn next<Tz: TimeZone>(
        &self,
        reference: &DateTime<Tz>,
        location: &Location,
        event: SolarEvent,
    ) -> Result<DateTime<Tz>, SolarError> {
        self.next_event(reference, location, event.depression(), event.phase())
    }

    pub fn next_sunrise<Tz: TimeZone>(
        &self,
        reference: &DateTime<Tz>,
        location: &Location,
    ) -> Result<DateTime<Tz>, SolarError> {
        self.next_event(reference, location, STANDARD_DEPRESSION, Phase::Morning)
    }

    pub fn next_sunset<Tz: TimeZone>(
        &self,
        reference: &DateTime<Tz>,
        location: &Location,
    ) -> Result<DateTime<Tz>, SolarError> {
        self.next_event(reference, location, STANDARD_DEPRESSION, Phase::Evening)
    }

    pub fn next_dawn<Tz: TimeZone>(
        &self,
        reference: &DateTime<Tz>,
        location: &Location,
        depression: f64,
    ) -> Result<DateTime<Tz>, SolarError> {
        self.next_event(reference, location, depression, Phase::Morning)
    }

    pub fn next_dusk<Tz: TimeZone>(
        &self,
        reference: &DateTime<Tz>,
        location: &Location,
        depression: f64,
    ) -> Result<DateTime<Tz>, SolarError> {
        self.next_event(reference, location, depression, Phase::Evening)
    }
}

pub fn next_sunrise<Tz: TimeZone>(
    reference: &DateTime<Tz>,
    latitude: f64,
    longitude: f64,
) -> Result<DateTime<Tz>, SolarError> {
    SolarEventCalculator::default().next_sunrise(reference, &Location::new(latitude, longitude)?)
}

pub fn next_sunset<Tz: TimeZone>(
    reference: &DateTime<Tz>,
    latitude: f64,
    longitude: f64,
) -> Result<DateTime<Tz>, SolarError> {
    SolarEventCalculator::default().next_sunset(reference, &Location::new(latitude, longitude)?)
}

pub fn next_dawn<Tz: TimeZone>(
    reference: &DateTime<Tz>,
    latitude: f64,
    longitude: f64,
    depression: f64,
) -> Result<DateTime<Tz>, SolarError> {
    SolarEventCalculator::default().next_dawn(reference, &Location::new(latitude, longitude)?, depression)
}

pub fn next_dusk<Tz: TimeZone>(
    reference: &DateTime<Tz>,
    latitude: f64,
    longitude: f64,
    depression: f64,
) -> Result<DateTime<Tz>, SolarError> {
    SolarEventCalculator::default().next_dusk(reference, &Location::new(latitude, longitude)?, depression)
}
