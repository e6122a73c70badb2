//! Metric derivation pipeline.
//!
//! Turns one content tree into samples by running a fixed, ordered list of
//! independent extraction steps. Steps are isolated: a failing step is
//! recorded and the remaining steps still run, so a scrape with one broken
//! group still exports everything else. All step errors are combined into
//! one aggregated error for the caller.
//!
//! Two kinds of state cross step boundaries:
//!
//! - [`Quirks`], reset per scrape: facts derived by one step and consumed
//!   by a later one (e.g. a controller model that never reports
//!   supplied-heat totals).
//! - [`CounterFloor`], shared across scrapes: the monotonic floor for
//!   counter samples.

// ============================================================================
// Imports
// ============================================================================

use chrono::{DateTime, FixedOffset};
use rustc_hash::FxHashMap;
use tracing::warn;

use crate::collector::floor::CounterFloor;
use crate::collector::sample::{
    MetricDef, Sample, DEFROST, ELAPSED_DURATION, ENERGY_INPUT, IMPULSES, INFO, INPUT,
    LATEST_ERROR, LATEST_SWITCH_OFF, OPERATING_DURATION, OP_MODE, OP_MODE_ID, OUTPUT,
    SS_ENERGY_INPUT, SS_HEAT_CAPACITY, SUPPLIED_HEAT, SUPPLIED_HEAT_COUNTER, TEMPERATURE,
};
use crate::collector::text::normalize_space;
use crate::error::{Error, Result};
use crate::lang::{Terminology, OP_MODE_ID_UNKNOWN};
use crate::protocol::{by_name, by_name_with_children, ContentItem, ContentRoot};

// ============================================================================
// Constants
// ============================================================================

/// Model code of controllers that never report supplied-heat totals.
const MODEL_NO_SUPPLIED_HEAT: &str = "l2a";

// ============================================================================
// Quirks
// ============================================================================

/// Scrape-transient facts shared between extraction steps.
///
/// Reset for every scrape.
#[derive(Debug, Default)]
pub(crate) struct Quirks {
    /// Set by the info step for controller models without supplied-heat
    /// reporting; the supplied-heat step skips entirely when set.
    pub missing_supplied_heat: bool,
}

// ============================================================================
// Pipeline
// ============================================================================

/// Derivation pipeline over one content tree.
pub(crate) struct Pipeline<'a> {
    terms: &'a Terminology,
    tz: FixedOffset,
    floor: &'a CounterFloor,
}

impl<'a> Pipeline<'a> {
    pub(crate) fn new(terms: &'a Terminology, tz: FixedOffset, floor: &'a CounterFloor) -> Self {
        Self { terms, tz, floor }
    }

    /// Runs all extraction steps against a content tree.
    ///
    /// Returns the samples of every successful step together with the
    /// aggregated error of the failed ones. Partial success is a
    /// first-class outcome.
    pub(crate) fn collect_all(&self, content: &ContentRoot) -> (Vec<Sample>, Option<Error>) {
        let mut samples = Vec::new();
        let mut quirks = Quirks::default();
        let mut errors = Vec::new();

        let mut record = |result: Result<()>| {
            if let Err(e) = result {
                errors.push(e);
            }
        };

        record(self.collect_info(&mut samples, content, &mut quirks));
        record(self.collect_temperatures(&mut samples, content));
        record(self.collect_operating_duration(&mut samples, content));
        record(self.collect_elapsed_time(&mut samples, content));
        record(self.collect_inputs(&mut samples, content));
        record(self.collect_outputs(&mut samples, content));
        record(self.collect_supplied_heat(&mut samples, content, &quirks));
        record(self.collect_energy_input(&mut samples, content));
        record(self.collect_latest_error(&mut samples, content));
        record(self.collect_latest_switch_off(&mut samples, content));
        record(self.collect_impulses(&mut samples, content));

        (samples, Error::aggregate(errors))
    }

    /// Parses a value string, special-casing the locale's boolean literals.
    ///
    /// Boolean comparison is a case-sensitive exact match.
    fn parse_value(&self, text: &str) -> Result<(f64, String)> {
        let trimmed = text.trim();

        if trimmed == self.terms.bool_false {
            return Ok((0.0, "bool".to_string()));
        }
        if trimmed == self.terms.bool_true {
            return Ok((1.0, "bool".to_string()));
        }

        self.terms.parse_measurement(trimmed)
    }

    fn find_group<'c>(
        &self,
        content: &'c ContentRoot,
        name: &str,
        require_children: bool,
    ) -> Result<&'c ContentItem> {
        let found = if require_children {
            content.find(by_name_with_children(name))
        } else {
            content.find(by_name(name))
        };

        found.ok_or_else(|| Error::item_not_found(name))
    }

    // ========================================================================
    // Info Step
    // ========================================================================

    fn collect_info(
        &self,
        out: &mut Vec<Sample>,
        content: &ContentRoot,
        quirks: &mut Quirks,
    ) -> Result<()> {
        let group = self.find_group(content, self.terms.nav_system_status, false)?;

        let mut sw_version = String::new();
        let mut op_mode = String::new();
        let mut hp_type: Vec<String> = Vec::new();
        let mut heat_capacity = (0.0, String::new());
        let mut power = (0.0, String::new());
        let mut defrost_demand = (0.0, String::new());
        let mut last_defrost: Option<DateTime<FixedOffset>> = None;

        group.each_non_nil(|item| {
            let value = item.value.as_deref().unwrap_or_default();
            let name = item.name.as_str();

            if name == self.terms.status_type {
                let model = normalize_space(value);
                if model.eq_ignore_ascii_case(MODEL_NO_SUPPLIED_HEAT) {
                    quirks.missing_supplied_heat = true;
                }
                hp_type.push(model);
            } else if name == self.terms.status_software_version {
                sw_version = normalize_space(value);
            } else if name == self.terms.status_operation_mode {
                op_mode = normalize_space(value);
                if op_mode.is_empty() {
                    op_mode = "off".to_string();
                }
            } else if name == self.terms.status_heating_capacity {
                match self.parse_value(value) {
                    Ok(parsed) => heat_capacity = parsed,
                    Err(e) => warn!(error = %e, value, "parsing heating capacity failed"),
                }
            } else if name == self.terms.status_power_consumption {
                match self.parse_value(value) {
                    Ok(parsed) => power = parsed,
                    Err(e) => warn!(error = %e, value, "parsing power consumption failed"),
                }
            } else if name == self.terms.status_defrost_demand {
                match self.parse_value(value) {
                    Ok(parsed) => defrost_demand = parsed,
                    Err(e) => warn!(error = %e, value, "parsing defrost demand failed"),
                }
            } else if name == self.terms.status_last_defrost {
                match self.terms.parse_timestamp_short(value, self.tz) {
                    Ok(ts) => last_defrost = Some(ts),
                    Err(e) => warn!(error = %e, value, "parsing last defrost failed"),
                }
            }
        });

        hp_type.sort();

        let mode_id = self.terms.operation_mode_id(&op_mode).unwrap_or_else(|| {
            warn!(mode = %op_mode, "operating mode not recognized");
            OP_MODE_ID_UNKNOWN
        });

        out.push(Sample::new(&INFO, 1.0, [sw_version, hp_type.join(", ")]));
        out.push(Sample::new(&OP_MODE, 1.0, [op_mode.clone()]));
        out.push(Sample::new(&OP_MODE_ID, mode_id, [op_mode]));
        out.push(Sample::new(&SS_HEAT_CAPACITY, heat_capacity.0, [heat_capacity.1]));
        out.push(Sample::new(&SS_ENERGY_INPUT, power.0, [power.1]));
        out.push(Sample::new(
            &DEFROST,
            defrost_demand.0,
            ["demand".to_string(), defrost_demand.1],
        ));
        out.push(Sample::new(
            &DEFROST,
            last_defrost.map_or(0.0, |ts| ts.timestamp() as f64),
            ["last", "ts"],
        ));

        Ok(())
    }

    // ========================================================================
    // Measurement Steps
    // ========================================================================

    /// Emits one sample per child with a parseable value.
    ///
    /// A group that resolves but yields no usable item produces exactly one
    /// placeholder sample (empty labels, value 0): "present but empty"
    /// rather than "absent". Items failing to parse are skipped with a
    /// diagnostic.
    fn collect_measurements(
        &self,
        out: &mut Vec<Sample>,
        def: &'static MetricDef,
        content: &ContentRoot,
        group_name: &str,
        require_children: bool,
        filter: Option<&dyn Fn(&str) -> bool>,
    ) -> Result<()> {
        let group = self.find_group(content, group_name, require_children)?;

        let mut found = false;
        group.each_non_nil(|item| {
            if let Some(filter) = filter
                && !filter(&item.name)
            {
                return;
            }

            let value = item.value.as_deref().unwrap_or_default();
            match self.parse_value(value) {
                Ok((value, unit)) => {
                    out.push(Sample::new(def, value, [normalize_space(&item.name), unit]));
                    found = true;
                }
                Err(e) => warn!(error = %e, value, "parsing value failed"),
            }
        });

        if !found {
            out.push(Sample::new(def, 0.0, ["", ""]));
        }

        Ok(())
    }

    fn collect_temperatures(&self, out: &mut Vec<Sample>, content: &ContentRoot) -> Result<()> {
        self.collect_measurements(out, &TEMPERATURE, content, self.terms.nav_temperatures, false, None)
    }

    fn collect_inputs(&self, out: &mut Vec<Sample>, content: &ContentRoot) -> Result<()> {
        self.collect_measurements(out, &INPUT, content, self.terms.nav_inputs, false, None)
    }

    fn collect_outputs(&self, out: &mut Vec<Sample>, content: &ContentRoot) -> Result<()> {
        self.collect_measurements(out, &OUTPUT, content, self.terms.nav_outputs, false, None)
    }

    fn collect_impulses(&self, out: &mut Vec<Sample>, content: &ContentRoot) -> Result<()> {
        self.collect_measurements(
            out,
            &IMPULSES,
            content,
            self.terms.nav_op_hours,
            false,
            Some(&|name| self.terms.is_impulse(name)),
        )
    }

    /// Requires the group to have children: the terminology name collides
    /// with an empty decoy node of the same name elsewhere in the tree.
    fn collect_energy_input(&self, out: &mut Vec<Sample>, content: &ContentRoot) -> Result<()> {
        self.collect_measurements(out, &ENERGY_INPUT, content, self.terms.nav_energy_input, true, None)
    }

    // ========================================================================
    // Supplied-Heat Step
    // ========================================================================

    /// Emits the supplied-heat totals twice: as a gauge (the raw reading,
    /// which decreases during defrost cycles) and as a counter subject to
    /// the monotonic floor.
    fn collect_supplied_heat(
        &self,
        out: &mut Vec<Sample>,
        content: &ContentRoot,
        quirks: &Quirks,
    ) -> Result<()> {
        if quirks.missing_supplied_heat {
            return Ok(());
        }

        let group = self.find_group(content, self.terms.nav_heat_quantity, false)?;

        let mut found = false;
        group.each_non_nil(|item| {
            let value = item.value.as_deref().unwrap_or_default();
            match self.parse_value(value) {
                Ok((value, unit)) => {
                    let name = normalize_space(&item.name);

                    out.push(Sample::new(
                        &SUPPLIED_HEAT,
                        value,
                        [name.clone(), unit.clone()],
                    ));

                    if self.floor.admit(SUPPLIED_HEAT_COUNTER.name, &name, value) {
                        out.push(Sample::new(&SUPPLIED_HEAT_COUNTER, value, [name, unit]));
                    }

                    found = true;
                }
                Err(e) => warn!(error = %e, value, "parsing supplied heat failed"),
            }
        });

        if !found {
            out.push(Sample::new(&SUPPLIED_HEAT, 0.0, ["", ""]));
            out.push(Sample::new(&SUPPLIED_HEAT_COUNTER, 0.0, ["", ""]));
        }

        Ok(())
    }

    // ========================================================================
    // Duration Steps
    // ========================================================================

    /// Emits one sample per child whose value parses as a duration.
    ///
    /// A duration parse failure aborts the step: the value is essential to
    /// the output, unlike a skippable measurement row.
    fn collect_durations(
        &self,
        out: &mut Vec<Sample>,
        def: &'static MetricDef,
        content: &ContentRoot,
        group_name: &str,
        exclude_impulses: bool,
    ) -> Result<()> {
        let group = self.find_group(content, group_name, false)?;

        let mut found = false;
        for item in &group.items {
            let Some(value) = &item.value else {
                continue;
            };

            if exclude_impulses && self.terms.is_impulse(&item.name) {
                continue;
            }

            let duration = self.terms.parse_duration(value)?;

            out.push(Sample::new(
                def,
                duration.as_secs_f64(),
                [normalize_space(&item.name)],
            ));
            found = true;
        }

        if !found {
            out.push(Sample::new(def, 0.0, [""]));
        }

        Ok(())
    }

    /// Impulse-count rows live in the same group but are counters, not
    /// durations; they are routed to [`Pipeline::collect_impulses`].
    fn collect_operating_duration(&self, out: &mut Vec<Sample>, content: &ContentRoot) -> Result<()> {
        self.collect_durations(out, &OPERATING_DURATION, content, self.terms.nav_op_hours, true)
    }

    fn collect_elapsed_time(&self, out: &mut Vec<Sample>, content: &ContentRoot) -> Result<()> {
        self.collect_durations(out, &ELAPSED_DURATION, content, self.terms.nav_elapsed_times, false)
    }

    // ========================================================================
    // Timetable Steps
    // ========================================================================

    /// Emits the most recent timestamp per reason.
    ///
    /// Child item names are timestamps, values are free-text reasons. Rows
    /// whose name reduces to dashes only are unfilled placeholders and
    /// skipped. For rows sharing a reason the chronologically latest
    /// timestamp wins, regardless of row order.
    fn collect_timetable(
        &self,
        out: &mut Vec<Sample>,
        def: &'static MetricDef,
        content: &ContentRoot,
        group_name: &str,
    ) -> Result<()> {
        let group = self.find_group(content, group_name, false)?;

        let mut latest: FxHashMap<String, DateTime<FixedOffset>> = FxHashMap::default();

        for item in &group.items {
            let ts_raw = normalize_space(&item.name);

            let Some(value) = &item.value else {
                continue;
            };
            if ts_raw.trim_matches('-').is_empty() {
                continue;
            }

            let ts = self.terms.parse_timestamp(&ts_raw, self.tz)?;
            let reason = normalize_space(value);

            latest
                .entry(reason)
                .and_modify(|prev| {
                    if *prev < ts {
                        *prev = ts;
                    }
                })
                .or_insert(ts);
        }

        if latest.is_empty() {
            out.push(Sample::new(def, 0.0, [""]));
        } else {
            for (reason, ts) in latest {
                out.push(Sample::new(def, ts.timestamp() as f64, [reason]));
            }
        }

        Ok(())
    }

    fn collect_latest_error(&self, out: &mut Vec<Sample>, content: &ContentRoot) -> Result<()> {
        self.collect_timetable(out, &LATEST_ERROR, content, self.terms.nav_error_memory)
    }

    fn collect_latest_switch_off(&self, out: &mut Vec<Sample>, content: &ContentRoot) -> Result<()> {
        self.collect_timetable(out, &LATEST_SWITCH_OFF, content, self.terms.nav_switch_offs)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use crate::lang;

    fn item(name: &str, value: Option<&str>) -> ContentItem {
        ContentItem {
            id: String::new(),
            name: name.to_string(),
            value: value.map(ToString::to_string),
            unit: None,
            min: None,
            max: None,
            step: None,
            div: None,
            raw: None,
            items: Vec::new(),
        }
    }

    fn group(name: &str, items: Vec<ContentItem>) -> ContentItem {
        ContentItem {
            items,
            ..item(name, None)
        }
    }

    fn utc() -> FixedOffset {
        FixedOffset::east_opt(0).expect("offset")
    }

    fn samples_for(samples: &[Sample], def: &'static MetricDef) -> Vec<Sample> {
        samples
            .iter()
            .filter(|s| std::ptr::eq(s.def, def))
            .cloned()
            .collect()
    }

    fn sorted_labels(samples: &[Sample]) -> Vec<(Vec<String>, f64)> {
        let mut out: Vec<_> = samples
            .iter()
            .map(|s| (s.labels.clone(), s.value))
            .collect();
        out.sort_by(|a, b| a.0.cmp(&b.0));
        out
    }

    #[test]
    fn test_measurements_with_booleans() {
        let terms = lang::german();
        let floor = CounterFloor::new();
        let pipeline = Pipeline::new(&terms, utc(), &floor);

        let content = ContentRoot {
            items: vec![group(
                "Eingänge",
                vec![
                    item("temp  a", Some("20 °C")),
                    item("pump", Some("Ein")),
                    item("valve", Some("Aus")),
                    item("broken", Some("n/a")),
                    item("placeholder", None),
                ],
            )],
        };

        let mut out = Vec::new();
        pipeline
            .collect_inputs(&mut out, &content)
            .expect("collect");

        assert_eq!(
            sorted_labels(&out),
            vec![
                (vec!["pump".to_string(), "bool".to_string()], 1.0),
                (vec!["temp a".to_string(), "degC".to_string()], 20.0),
                (vec!["valve".to_string(), "bool".to_string()], 0.0),
            ]
        );
    }

    #[test]
    fn test_empty_group_yields_placeholder() {
        let terms = lang::german();
        let floor = CounterFloor::new();
        let pipeline = Pipeline::new(&terms, utc(), &floor);

        let content = ContentRoot {
            items: vec![group("Ausgänge", Vec::new())],
        };

        let mut out = Vec::new();
        pipeline
            .collect_outputs(&mut out, &content)
            .expect("collect");

        assert_eq!(out, vec![Sample::new(&OUTPUT, 0.0, ["", ""])]);
    }

    #[test]
    fn test_missing_group_is_step_error() {
        let terms = lang::german();
        let floor = CounterFloor::new();
        let pipeline = Pipeline::new(&terms, utc(), &floor);

        let content = ContentRoot { items: Vec::new() };

        let mut out = Vec::new();
        let err = pipeline.collect_outputs(&mut out, &content).unwrap_err();
        assert!(matches!(err, Error::ItemNotFound { .. }));
        assert!(out.is_empty());
    }

    #[test]
    fn test_durations_and_impulses_split() {
        let terms = lang::german();
        let floor = CounterFloor::new();
        let pipeline = Pipeline::new(&terms, utc(), &floor);

        let content = ContentRoot {
            items: vec![group(
                "Betriebsstunden",
                vec![
                    item("compressor", Some("1:02:03")),
                    item("heater", Some("12h")),
                    item("Impulse compressor", Some("5414")),
                ],
            )],
        };

        let mut out = Vec::new();
        pipeline
            .collect_operating_duration(&mut out, &content)
            .expect("durations");
        pipeline
            .collect_impulses(&mut out, &content)
            .expect("impulses");

        let durations = samples_for(&out, &OPERATING_DURATION);
        assert_eq!(
            sorted_labels(&durations),
            vec![
                (vec!["compressor".to_string()], 3723.0),
                (vec!["heater".to_string()], 43200.0),
            ]
        );

        let impulses = samples_for(&out, &IMPULSES);
        assert_eq!(
            sorted_labels(&impulses),
            vec![(
                vec!["Impulse compressor".to_string(), String::new()],
                5414.0
            )]
        );
    }

    #[test]
    fn test_duration_parse_failure_aborts_step() {
        let terms = lang::german();
        let floor = CounterFloor::new();
        let pipeline = Pipeline::new(&terms, utc(), &floor);

        let content = ContentRoot {
            items: vec![group(
                "Ablaufzeiten",
                vec![item("ok", Some("1:00")), item("bad", Some("soon"))],
            )],
        };

        let mut out = Vec::new();
        let err = pipeline.collect_elapsed_time(&mut out, &content).unwrap_err();
        assert!(matches!(err, Error::DurationFormat { .. }));
    }

    #[test]
    fn test_timetable_latest_per_reason() {
        let terms = lang::german();
        let floor = CounterFloor::new();
        let pipeline = Pipeline::new(&terms, utc(), &floor);

        let content = ContentRoot {
            items: vec![group(
                "Fehlerspeicher",
                vec![
                    item("02.02.11 08:00:00", Some("aaa")),
                    item("03.04.14 23:00:00", Some("bbb")),
                    item("01.01.10 09:00:11", Some("aaa")),
                    item("----", Some("placeholder")),
                ],
            )],
        };

        let mut out = Vec::new();
        pipeline
            .collect_latest_error(&mut out, &content)
            .expect("collect");

        assert_eq!(
            sorted_labels(&out),
            vec![
                (vec!["aaa".to_string()], 1_296_633_600.0),
                (vec!["bbb".to_string()], 1_396_566_000.0),
            ]
        );
    }

    #[test]
    fn test_timetable_empty_yields_placeholder() {
        let terms = lang::german();
        let floor = CounterFloor::new();
        let pipeline = Pipeline::new(&terms, utc(), &floor);

        let content = ContentRoot {
            items: vec![group(
                "Abschaltungen",
                vec![item("----", Some("unused"))],
            )],
        };

        let mut out = Vec::new();
        pipeline
            .collect_latest_switch_off(&mut out, &content)
            .expect("collect");

        assert_eq!(out, vec![Sample::new(&LATEST_SWITCH_OFF, 0.0, [""])]);
    }

    #[test]
    fn test_info_step() {
        let terms = lang::german();
        let floor = CounterFloor::new();
        let pipeline = Pipeline::new(&terms, utc(), &floor);

        let content = ContentRoot {
            items: vec![group(
                "Anlagenstatus",
                vec![
                    item("Wärmepumpen Typ", Some("typeB")),
                    item("Wärmepumpen Typ", Some("typeA")),
                    item("Softwarestand", Some("V1.23")),
                    item("Betriebszustand", Some("Heizen")),
                    item("Heizleistung Ist", Some("5.2 kW")),
                    item("Eingesetzte Energie", Some("1.1 kW")),
                    item("Abtaubedarf", Some("30 %")),
                    item("Letzte Abt.", Some("02.02.11 08:00")),
                ],
            )],
        };

        let mut out = Vec::new();
        let mut quirks = Quirks::default();
        pipeline
            .collect_info(&mut out, &content, &mut quirks)
            .expect("collect");

        assert!(!quirks.missing_supplied_heat);

        // Model list is sorted and joined.
        assert_eq!(
            samples_for(&out, &INFO),
            vec![Sample::new(&INFO, 1.0, ["V1.23", "typeA, typeB"])]
        );
        assert_eq!(
            samples_for(&out, &OP_MODE),
            vec![Sample::new(&OP_MODE, 1.0, ["Heizen"])]
        );
        assert_eq!(
            samples_for(&out, &OP_MODE_ID),
            vec![Sample::new(&OP_MODE_ID, 3.0, ["Heizen"])]
        );
        assert_eq!(
            samples_for(&out, &SS_HEAT_CAPACITY),
            vec![Sample::new(&SS_HEAT_CAPACITY, 5.2, ["kW"])]
        );
        assert_eq!(
            samples_for(&out, &SS_ENERGY_INPUT),
            vec![Sample::new(&SS_ENERGY_INPUT, 1.1, ["kW"])]
        );
        assert_eq!(
            samples_for(&out, &DEFROST),
            vec![
                Sample::new(&DEFROST, 30.0, ["demand", "pct"]),
                Sample::new(&DEFROST, 1_296_633_600.0, ["last", "ts"]),
            ]
        );
    }

    #[test]
    fn test_info_unknown_mode_yields_unknown_id() {
        let terms = lang::german();
        let floor = CounterFloor::new();
        let pipeline = Pipeline::new(&terms, utc(), &floor);

        let content = ContentRoot {
            items: vec![group(
                "Anlagenstatus",
                vec![item("Betriebszustand", Some("Urlaub"))],
            )],
        };

        let mut out = Vec::new();
        let mut quirks = Quirks::default();
        pipeline
            .collect_info(&mut out, &content, &mut quirks)
            .expect("collect");

        assert_eq!(
            samples_for(&out, &OP_MODE_ID),
            vec![Sample::new(&OP_MODE_ID, -1.0, ["Urlaub"])]
        );
    }

    #[test]
    fn test_info_empty_mode_defaults_to_off() {
        let terms = lang::english();
        let floor = CounterFloor::new();
        let pipeline = Pipeline::new(&terms, utc(), &floor);

        let content = ContentRoot {
            items: vec![group(
                "system status",
                vec![item("operation mode", Some("   "))],
            )],
        };

        let mut out = Vec::new();
        let mut quirks = Quirks::default();
        pipeline
            .collect_info(&mut out, &content, &mut quirks)
            .expect("collect");

        assert_eq!(
            samples_for(&out, &OP_MODE_ID),
            vec![Sample::new(&OP_MODE_ID, 0.0, ["off"])]
        );
    }

    #[test]
    fn test_l2a_quirk_suppresses_supplied_heat() {
        let terms = lang::english();
        let floor = CounterFloor::new();
        let pipeline = Pipeline::new(&terms, utc(), &floor);

        let content = ContentRoot {
            items: vec![
                group(
                    "system status",
                    vec![item("type of heat pump", Some("L2A"))],
                ),
                group("Heat Quantity", vec![item("total", Some("10 kWh"))]),
            ],
        };

        let mut out = Vec::new();
        let mut quirks = Quirks::default();
        pipeline
            .collect_info(&mut out, &content, &mut quirks)
            .expect("info");
        assert!(quirks.missing_supplied_heat);

        pipeline
            .collect_supplied_heat(&mut out, &content, &quirks)
            .expect("supplied heat");

        assert!(samples_for(&out, &SUPPLIED_HEAT).is_empty());
        assert!(samples_for(&out, &SUPPLIED_HEAT_COUNTER).is_empty());
    }

    #[test]
    fn test_supplied_heat_counter_floor() {
        let terms = lang::german();
        let floor = CounterFloor::new();
        let pipeline = Pipeline::new(&terms, utc(), &floor);

        let content_at = |value: &str| ContentRoot {
            items: vec![group("Wärmemenge", vec![item("total", Some(value))])],
        };
        let quirks = Quirks::default();

        // First scrape establishes the floor.
        let mut out = Vec::new();
        pipeline
            .collect_supplied_heat(&mut out, &content_at("200 kWh"), &quirks)
            .expect("collect");
        assert_eq!(samples_for(&out, &SUPPLIED_HEAT_COUNTER).len(), 1);

        // A lower reading keeps the gauge but suppresses the counter.
        let mut out = Vec::new();
        pipeline
            .collect_supplied_heat(&mut out, &content_at("150 kWh"), &quirks)
            .expect("collect");
        assert_eq!(
            samples_for(&out, &SUPPLIED_HEAT),
            vec![Sample::new(&SUPPLIED_HEAT, 150.0, ["total", "kWh"])]
        );
        assert!(samples_for(&out, &SUPPLIED_HEAT_COUNTER).is_empty());

        // A higher reading advances the floor and is emitted again.
        let mut out = Vec::new();
        pipeline
            .collect_supplied_heat(&mut out, &content_at("250 kWh"), &quirks)
            .expect("collect");
        assert_eq!(
            samples_for(&out, &SUPPLIED_HEAT_COUNTER),
            vec![Sample::new(&SUPPLIED_HEAT_COUNTER, 250.0, ["total", "kWh"])]
        );
    }

    #[test]
    fn test_energy_input_skips_empty_decoy() {
        let terms = lang::english();
        let floor = CounterFloor::new();
        let pipeline = Pipeline::new(&terms, utc(), &floor);

        // The system-status field "Power Consumption" is a childless leaf
        // with the same name as the energy-input group.
        let content = ContentRoot {
            items: vec![
                item("Power Consumption", Some("5 kW")),
                group(
                    "Power Consumption",
                    vec![item("heating", Some("738.2 kWh"))],
                ),
            ],
        };

        let mut out = Vec::new();
        pipeline
            .collect_energy_input(&mut out, &content)
            .expect("collect");

        assert_eq!(
            out,
            vec![Sample::new(&ENERGY_INPUT, 738.2, ["heating", "kWh"])]
        );
    }

    #[test]
    fn test_collect_all_isolates_step_failures() {
        let terms = lang::german();
        let floor = CounterFloor::new();
        let pipeline = Pipeline::new(&terms, utc(), &floor);

        // Only temperatures are present; every other step fails with its
        // own not-found error.
        let content = ContentRoot {
            items: vec![group(
                "Temperaturen",
                vec![item("flow", Some("35.2 °C"))],
            )],
        };

        let (samples, err) = pipeline.collect_all(&content);

        assert_eq!(
            samples_for(&samples, &TEMPERATURE),
            vec![Sample::new(&TEMPERATURE, 35.2, ["flow", "degC"])]
        );

        let err = err.expect("aggregated error");
        let text = err.to_string();
        assert!(text.contains("Anlagenstatus"));
        assert!(text.contains("Fehlerspeicher"));
        assert!(text.contains("; "));
    }

    #[test]
    fn test_collect_all_complete_content_has_no_error() {
        let terms = lang::english();
        let floor = CounterFloor::new();
        let pipeline = Pipeline::new(&terms, utc(), &floor);

        let content = ContentRoot {
            items: vec![
                group("system status", Vec::new()),
                group("temperatures", Vec::new()),
                group("operating hours", Vec::new()),
                group("elapsed times", Vec::new()),
                group("inputs", Vec::new()),
                group("outputs", Vec::new()),
                group("Heat Quantity", Vec::new()),
                group(
                    "Power Consumption",
                    vec![item("total", Some("1 kWh"))],
                ),
                group("error memory", Vec::new()),
                group("switch offs", Vec::new()),
            ],
        };

        let (samples, err) = pipeline.collect_all(&content);

        assert!(err.is_none(), "unexpected error: {err:?}");
        assert!(!samples.is_empty());
    }
}
