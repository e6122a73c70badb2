//! Exported metric definitions and samples.
//!
//! Every metric this exporter can produce is declared here as a static
//! [`MetricDef`]. The pipeline emits [`Sample`]s referencing these
//! definitions; the rendering layer turns them into Prometheus metric
//! families.

// ============================================================================
// ValueKind
// ============================================================================

/// Prometheus value kind of a metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    /// Value may go up and down.
    Gauge,
    /// Value must never decrease.
    Counter,
}

// ============================================================================
// MetricDef
// ============================================================================

/// Definition of one exported metric.
#[derive(Debug, PartialEq, Eq)]
pub struct MetricDef {
    /// Metric name.
    pub name: &'static str,

    /// Help string.
    pub help: &'static str,

    /// Label names, in emission order.
    pub labels: &'static [&'static str],

    /// Value kind.
    pub kind: ValueKind,
}

// ============================================================================
// Metric Definitions
// ============================================================================

/// Scrape success indicator.
pub static UP: MetricDef = MetricDef {
    name: "luxws_up",
    help: "Whether scrape was successful",
    labels: &["status"],
    kind: ValueKind::Gauge,
};

/// Controller software version and model list.
pub static INFO: MetricDef = MetricDef {
    name: "luxws_info",
    help: "Controller information",
    labels: &["swversion", "hptype"],
    kind: ValueKind::Gauge,
};

/// Sensor temperatures.
pub static TEMPERATURE: MetricDef = MetricDef {
    name: "luxws_temperature",
    help: "Sensor temperature",
    labels: &["name", "unit"],
    kind: ValueKind::Gauge,
};

/// Operating times.
pub static OPERATING_DURATION: MetricDef = MetricDef {
    name: "luxws_operating_duration_seconds",
    help: "Operating time",
    labels: &["name"],
    kind: ValueKind::Gauge,
};

/// Elapsed times.
pub static ELAPSED_DURATION: MetricDef = MetricDef {
    name: "luxws_elapsed_duration_seconds",
    help: "Elapsed time",
    labels: &["name"],
    kind: ValueKind::Gauge,
};

/// Input states.
pub static INPUT: MetricDef = MetricDef {
    name: "luxws_input",
    help: "Input values",
    labels: &["name", "unit"],
    kind: ValueKind::Gauge,
};

/// Output states.
pub static OUTPUT: MetricDef = MetricDef {
    name: "luxws_output",
    help: "Output values",
    labels: &["name", "unit"],
    kind: ValueKind::Gauge,
};

/// Operating mode as reported by the controller.
pub static OP_MODE: MetricDef = MetricDef {
    name: "luxws_operational_mode",
    help: "Operational mode",
    labels: &["mode"],
    kind: ValueKind::Gauge,
};

/// Operating mode as a numeric id.
pub static OP_MODE_ID: MetricDef = MetricDef {
    name: "luxws_operational_mode_id",
    help: "Operational mode by ID",
    labels: &["mode"],
    kind: ValueKind::Gauge,
};

/// Current heating capacity from the system-status page.
pub static SS_HEAT_CAPACITY: MetricDef = MetricDef {
    name: "luxws_ss_heat_capacity",
    help: "System Status / Heating Capacity",
    labels: &["unit"],
    kind: ValueKind::Gauge,
};

/// Current power consumption from the system-status page.
pub static SS_ENERGY_INPUT: MetricDef = MetricDef {
    name: "luxws_ss_energy_input",
    help: "System Status / Power Consumption",
    labels: &["unit"],
    kind: ValueKind::Gauge,
};

/// Supplied heat as a gauge; decreases during defrost cycles.
pub static SUPPLIED_HEAT: MetricDef = MetricDef {
    name: "luxws_supplied_heat",
    help: "Supplied heat / Heat Quantity / Energy Monitor",
    labels: &["name", "unit"],
    kind: ValueKind::Gauge,
};

/// Supplied heat as a counter, subject to the monotonic floor.
pub static SUPPLIED_HEAT_COUNTER: MetricDef = MetricDef {
    name: "luxws_supplied_heat_cntr",
    help: "Supplied heat 2 / Heat Quantity / Energy Monitor",
    labels: &["name", "unit"],
    kind: ValueKind::Counter,
};

/// Energy input totals.
pub static ENERGY_INPUT: MetricDef = MetricDef {
    name: "luxws_energy_input",
    help: "Energy Input / Power Consumption / Energy Monitor",
    labels: &["name", "unit"],
    kind: ValueKind::Counter,
};

/// Most recent error per reason.
pub static LATEST_ERROR: MetricDef = MetricDef {
    name: "luxws_latest_error",
    help: "Latest error",
    labels: &["reason"],
    kind: ValueKind::Gauge,
};

/// Most recent switch-off per reason.
pub static LATEST_SWITCH_OFF: MetricDef = MetricDef {
    name: "luxws_latest_switchoff",
    help: "Latest switch-off",
    labels: &["reason"],
    kind: ValueKind::Gauge,
};

/// Controller clock from the HTTP `Date` header.
pub static NODE_TIME: MetricDef = MetricDef {
    name: "luxws_node_time_seconds",
    help: "System time in seconds since epoch (1970)",
    labels: &[],
    kind: ValueKind::Gauge,
};

/// Impulse counts from the operating-hours page.
pub static IMPULSES: MetricDef = MetricDef {
    name: "luxws_impulses",
    help: "Impulses via operating hours",
    labels: &["name", "unit"],
    kind: ValueKind::Counter,
};

/// Defrost demand and last defrost time.
pub static DEFROST: MetricDef = MetricDef {
    name: "luxws_defrost",
    help: "Defrost demand in % and last defrost time",
    labels: &["name", "unit"],
    kind: ValueKind::Gauge,
};

// ============================================================================
// Sample
// ============================================================================

/// One produced sample: a metric identity, a value and its label values.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    /// The metric this sample belongs to.
    pub def: &'static MetricDef,

    /// Numeric value.
    pub value: f64,

    /// Label values matching `def.labels` in order.
    pub labels: Vec<String>,
}

impl Sample {
    /// Creates a sample.
    pub fn new<I, S>(def: &'static MetricDef, value: f64, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            def,
            value,
            labels: labels.into_iter().map(Into::into).collect(),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_new() {
        let sample = Sample::new(&TEMPERATURE, 21.5, ["flow", "degC"]);

        assert_eq!(sample.def.name, "luxws_temperature");
        assert_eq!(sample.value, 21.5);
        assert_eq!(sample.labels, vec!["flow", "degC"]);
    }

    #[test]
    fn test_label_arity_matches_defs() {
        let sample = Sample::new(&NODE_TIME, 1.0, Vec::<String>::new());
        assert_eq!(sample.labels.len(), sample.def.labels.len());
    }
}
