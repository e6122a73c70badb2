//! Controller terminology tables and locale-specific parsing.
//!
//! The controller renders every name and value in its configured interface
//! language. A [`Terminology`] maps logical field identifiers to the
//! locale-specific strings and owns the parsing grammar for measurements,
//! durations and timestamps.
//!
//! Terminologies are immutable configuration objects constructed once at
//! startup and passed explicitly into the pipeline.
//!
//! # Supported Languages
//!
//! | Id | Language |
//! |----|----------|
//! | `en` | English |
//! | `de` | German |
//! | `nl` | Dutch |
//! | `cz` | Czech |
//! | `fi` | Finnish |
//!
//! Dutch and Czech carry no operating-mode table; every mode resolves to
//! the unknown id.

// ============================================================================
// Imports
// ============================================================================

use std::time::Duration;

use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone};
use rustc_hash::FxHashMap;

use crate::error::{Error, Result};

// ============================================================================
// Submodules
// ============================================================================

mod czech;
mod dutch;
mod english;
mod finnish;
mod german;

pub use czech::czech;
pub use dutch::dutch;
pub use english::english;
pub use finnish::finnish;
pub use german::german;

// ============================================================================
// Operating Mode Ids
// ============================================================================

/// Numeric id for the "off" operating mode.
pub const OP_MODE_ID_OFF: f64 = 0.0;

/// Numeric id for the utility-lockout (EVU) operating mode.
pub const OP_MODE_ID_EVU: f64 = 1.0;

/// Numeric id for the domestic-hot-water operating mode.
pub const OP_MODE_ID_DHW: f64 = 2.0;

/// Numeric id for the heating operating mode.
pub const OP_MODE_ID_HEATING: f64 = 3.0;

/// Numeric id for the defrosting operating mode.
pub const OP_MODE_ID_DEFROSTING: f64 = 4.0;

/// Numeric id reported for an unrecognized mode string.
pub const OP_MODE_ID_UNKNOWN: f64 = -1.0;

// ============================================================================
// Terminology
// ============================================================================

/// Locale-specific terminology of a controller interface language.
#[derive(Debug, Clone)]
pub struct Terminology {
    /// Language identifier, e.g. `en`.
    pub id: &'static str,

    /// Language name in its own language.
    pub name: &'static str,

    /// Timestamp format with seconds (chrono syntax).
    pub(crate) timestamp_format: &'static str,

    /// Timestamp format without seconds.
    pub(crate) timestamp_short_format: &'static str,

    /// Navigation entry holding the information pages.
    pub nav_information: &'static str,

    /// Group name for temperature sensors.
    pub nav_temperatures: &'static str,

    /// Group name for elapsed times.
    pub nav_elapsed_times: &'static str,

    /// Group name for input states.
    pub nav_inputs: &'static str,

    /// Group name for output states.
    pub nav_outputs: &'static str,

    /// Group name for the supplied-heat totals.
    pub nav_heat_quantity: &'static str,

    /// Group name for the energy-input totals.
    pub nav_energy_input: &'static str,

    /// Group name for the error memory timetable.
    pub nav_error_memory: &'static str,

    /// Group name for the switch-off timetable.
    pub nav_switch_offs: &'static str,

    /// Group name for operating hours and impulse counts.
    pub nav_op_hours: &'static str,

    /// Group name for the system status fields.
    pub nav_system_status: &'static str,

    /// Status field: heat pump model.
    pub status_type: &'static str,

    /// Status field: software version.
    pub status_software_version: &'static str,

    /// Status field: operating mode.
    pub status_operation_mode: &'static str,

    /// Status field: current power consumption.
    pub status_power_consumption: &'static str,

    /// Status field: current heating capacity.
    pub status_heating_capacity: &'static str,

    /// Status field: defrost demand.
    pub status_defrost_demand: &'static str,

    /// Status field: last defrost timestamp.
    pub status_last_defrost: &'static str,

    /// Literal for a false boolean value.
    pub bool_false: &'static str,

    /// Literal for a true boolean value.
    pub bool_true: &'static str,

    /// Lowercased mode string to numeric mode id.
    pub(crate) operation_modes: FxHashMap<&'static str, f64>,

    /// Row-name prefixes marking impulse counts among operating hours.
    pub(crate) impulse_prefixes: &'static [&'static str],
}

impl Terminology {
    /// Returns `true` if an operating-hours row holds an impulse count
    /// rather than a duration.
    #[must_use]
    pub fn is_impulse(&self, name: &str) -> bool {
        self.impulse_prefixes
            .iter()
            .any(|prefix| name.starts_with(prefix))
    }

    /// Maps a mode string to its numeric id.
    ///
    /// The lookup is case-insensitive. Returns `None` for modes missing
    /// from the locale table.
    #[must_use]
    pub fn operation_mode_id(&self, mode: &str) -> Option<f64> {
        self.operation_modes
            .get(mode.to_lowercase().as_str())
            .copied()
    }

    /// Parses a measurement such as `20 °C` or `33 %`.
    ///
    /// Returns the numeric value and the canonicalized unit label; a value
    /// without a unit yields an empty label.
    ///
    /// # Errors
    ///
    /// - [`Error::Measurement`] if the text does not match
    ///   `<number>[ <unit>]`
    pub fn parse_measurement(&self, text: &str) -> Result<(f64, String)> {
        let trimmed = text.trim();

        let (number, unit) = match trimmed.split_once(' ') {
            Some((number, unit)) => (number, unit.trim()),
            None => (trimmed, ""),
        };

        let value: f64 = number.parse().map_err(|_| Error::measurement(text))?;

        Ok((value, canonical_unit(unit).to_string()))
    }

    /// Parses a duration in the locale grammar: `H:MM[:SS]` or `<hours>h`.
    ///
    /// # Errors
    ///
    /// - [`Error::DurationFormat`] if the text matches neither form
    pub fn parse_duration(&self, text: &str) -> Result<Duration> {
        let trimmed = text.trim();

        if let Some(hours) = trimmed.strip_suffix('h') {
            let hours: u64 = hours
                .trim()
                .parse()
                .map_err(|_| Error::duration_format(text))?;
            return Ok(Duration::from_secs(hours * 3600));
        }

        let mut parts = trimmed.splitn(3, ':');
        let hours = parts.next();
        let minutes = parts.next();
        let seconds = parts.next();

        let (Some(hours), Some(minutes)) = (hours, minutes) else {
            return Err(Error::duration_format(text));
        };

        let hours: u64 = hours.parse().map_err(|_| Error::duration_format(text))?;
        let minutes: u64 = minutes.parse().map_err(|_| Error::duration_format(text))?;
        let seconds: u64 = match seconds {
            Some(seconds) => seconds.parse().map_err(|_| Error::duration_format(text))?,
            None => 0,
        };

        if minutes >= 60 || seconds >= 60 {
            return Err(Error::duration_format(text));
        }

        Ok(Duration::from_secs(hours * 3600 + minutes * 60 + seconds))
    }

    /// Parses a timestamp with seconds, e.g. `02.02.11 08:00:00`.
    ///
    /// # Errors
    ///
    /// - [`Error::Timestamp`] if the text does not match the locale format
    pub fn parse_timestamp(&self, text: &str, tz: FixedOffset) -> Result<DateTime<FixedOffset>> {
        parse_in_format(text, self.timestamp_format, tz)
    }

    /// Parses a timestamp without seconds, e.g. `02.02.11 08:00`.
    ///
    /// # Errors
    ///
    /// - [`Error::Timestamp`] if the text does not match the locale format
    pub fn parse_timestamp_short(
        &self,
        text: &str,
        tz: FixedOffset,
    ) -> Result<DateTime<FixedOffset>> {
        parse_in_format(text, self.timestamp_short_format, tz)
    }
}

fn parse_in_format(text: &str, format: &str, tz: FixedOffset) -> Result<DateTime<FixedOffset>> {
    let naive = NaiveDateTime::parse_from_str(text.trim(), format)
        .map_err(|_| Error::timestamp(text))?;

    tz.from_local_datetime(&naive)
        .single()
        .ok_or_else(|| Error::timestamp(text))
}

fn canonical_unit(unit: &str) -> &str {
    match unit {
        "°C" => "degC",
        "%" => "pct",
        "RPM" => "rpm",
        other => other,
    }
}

// ============================================================================
// Lookup
// ============================================================================

/// Returns all supported terminologies.
#[must_use]
pub fn all() -> Vec<Terminology> {
    vec![english(), german(), dutch(), czech(), finnish()]
}

/// Resolves a terminology by language id.
///
/// # Errors
///
/// - [`Error::UnknownLanguage`] for ids without a terminology table
pub fn lookup(id: &str) -> Result<Terminology> {
    all()
        .into_iter()
        .find(|terms| terms.id == id)
        .ok_or_else(|| Error::unknown_language(id))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup() {
        assert_eq!(lookup("de").expect("german").name, "Deutsch");
        assert_eq!(lookup("fi").expect("finnish").id, "fi");

        let err = lookup("xx").unwrap_err();
        assert!(matches!(err, Error::UnknownLanguage { .. }));
    }

    #[test]
    fn test_all_ids_unique() {
        let mut ids: Vec<_> = all().iter().map(|t| t.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 5);
    }

    #[test]
    fn test_parse_measurement() {
        let terms = english();

        assert_eq!(
            terms.parse_measurement("20 °C").expect("parse"),
            (20.0, "degC".to_string())
        );
        assert_eq!(
            terms.parse_measurement("33 %").expect("parse"),
            (33.0, "pct".to_string())
        );
        assert_eq!(
            terms.parse_measurement("200 RPM").expect("parse"),
            (200.0, "rpm".to_string())
        );
        assert_eq!(
            terms.parse_measurement("738.2 kWh").expect("parse"),
            (738.2, "kWh".to_string())
        );
        assert_eq!(
            terms.parse_measurement("5414").expect("parse"),
            (5414.0, String::new())
        );
        assert_eq!(
            terms.parse_measurement(" -1.5 °C ").expect("parse"),
            (-1.5, "degC".to_string())
        );

        assert!(terms.parse_measurement("").is_err());
        assert!(terms.parse_measurement("n/a").is_err());
    }

    #[test]
    fn test_parse_duration() {
        let terms = english();

        assert_eq!(terms.parse_duration("1h").expect("parse").as_secs(), 3600);
        assert_eq!(terms.parse_duration("1:2:3").expect("parse").as_secs(), 3723);
        assert_eq!(terms.parse_duration("1:2").expect("parse").as_secs(), 3720);
        assert_eq!(
            terms.parse_duration("100:00:30").expect("parse").as_secs(),
            360_030
        );

        assert!(terms.parse_duration("1:75").is_err());
        assert!(terms.parse_duration("abc").is_err());
        assert!(terms.parse_duration("").is_err());
    }

    #[test]
    fn test_parse_timestamp() {
        let terms = english();
        let utc = FixedOffset::east_opt(0).expect("offset");

        let ts = terms
            .parse_timestamp("02.02.11 08:00:00", utc)
            .expect("parse");
        assert_eq!(ts.timestamp(), 1_296_633_600);

        let short = terms.parse_timestamp_short("02.02.11 08:00", utc).expect("parse");
        assert_eq!(short.timestamp(), 1_296_633_600);

        assert!(terms.parse_timestamp("not a date", utc).is_err());
        assert!(terms.parse_timestamp("02.02.11 08:00", utc).is_err());
    }

    #[test]
    fn test_parse_timestamp_offset() {
        let terms = english();
        let cet = FixedOffset::east_opt(3600).expect("offset");

        let ts = terms
            .parse_timestamp("02.02.11 08:00:00", cet)
            .expect("parse");
        assert_eq!(ts.timestamp(), 1_296_633_600 - 3600);
    }

    #[test]
    fn test_operation_mode_id() {
        let terms = german();

        assert_eq!(terms.operation_mode_id("Heizen"), Some(OP_MODE_ID_HEATING));
        assert_eq!(terms.operation_mode_id("WW"), Some(OP_MODE_ID_DHW));
        assert_eq!(terms.operation_mode_id("unbekannt"), None);

        // Dutch and Czech have no mode table.
        assert_eq!(dutch().operation_mode_id("off"), None);
        assert_eq!(czech().operation_mode_id("off"), None);
    }

    #[test]
    fn test_is_impulse() {
        let terms = english();
        assert!(terms.is_impulse("Impulses compressor"));
        assert!(terms.is_impulse("impulses compressor"));
        assert!(!terms.is_impulse("compressor"));

        let terms = czech();
        assert!(terms.is_impulse("Počet startů kompresor"));
        assert!(!terms.is_impulse("kompresor"));
    }
}
