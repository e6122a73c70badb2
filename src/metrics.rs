//! Prometheus text exposition rendering.
//!
//! Builds a fresh registry for every scrape from the static metric
//! definitions, applies the produced samples and encodes the result. The
//! scrape outcome is reported through `luxws_up`: value 1 with an empty
//! `status` label on success, value 0 with the aggregated error text
//! otherwise.

// ============================================================================
// Imports
// ============================================================================

use std::collections::hash_map::Entry;

use prometheus::{CounterVec, GaugeVec, Opts, Registry, TextEncoder};
use rustc_hash::FxHashMap;
use tracing::warn;

use crate::collector::sample::UP;
use crate::collector::{Sample, Scrape, ValueKind};
use crate::error::Result;

// ============================================================================
// Rendering
// ============================================================================

enum Family {
    Gauge(GaugeVec),
    Counter(CounterVec),
}

/// Renders a scrape as Prometheus text exposition.
///
/// # Errors
///
/// - [`crate::Error::Prometheus`] if registration or encoding fails
pub fn render(scrape: &Scrape) -> Result<String> {
    let registry = Registry::new();
    let mut families: FxHashMap<&'static str, Family> = FxHashMap::default();

    let up = Sample::new(
        &UP,
        if scrape.is_up() { 1.0 } else { 0.0 },
        [scrape.error.clone().unwrap_or_default()],
    );

    for sample in scrape.samples.iter().chain(std::iter::once(&up)) {
        let def = sample.def;

        let family = match families.entry(def.name) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                let opts = Opts::new(def.name, def.help);
                let family = match def.kind {
                    ValueKind::Gauge => {
                        let vec = GaugeVec::new(opts, def.labels)?;
                        registry.register(Box::new(vec.clone()))?;
                        Family::Gauge(vec)
                    }
                    ValueKind::Counter => {
                        let vec = CounterVec::new(opts, def.labels)?;
                        registry.register(Box::new(vec.clone()))?;
                        Family::Counter(vec)
                    }
                };
                entry.insert(family)
            }
        };

        let labels: Vec<&str> = sample.labels.iter().map(String::as_str).collect();

        match family {
            Family::Gauge(vec) => vec.with_label_values(&labels).set(sample.value),
            Family::Counter(vec) => {
                if sample.value < 0.0 {
                    warn!(
                        metric = def.name,
                        value = sample.value,
                        "skipping negative counter sample"
                    );
                    continue;
                }
                vec.with_label_values(&labels).inc_by(sample.value);
            }
        }
    }

    let encoder = TextEncoder::new();
    let mut buffer = String::new();
    encoder.encode_utf8(&registry.gather(), &mut buffer)?;

    Ok(buffer)
}

// ============================================================================
// Tests
// ============================================================================
