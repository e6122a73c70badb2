//! Monotonic counter floor.
//!
//! Heat-pump controllers occasionally report counter values below an
//! earlier reading, e.g. during a defrost cycle or after transient sensor
//! noise. Prometheus counters must never decrease, so the floor keeps the
//! highest value observed per metric and item and suppresses anything
//! below it.

// ============================================================================
// Imports
// ============================================================================

use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use tracing::debug;

// ============================================================================
// CounterFloor
// ============================================================================

/// High-water marks for counter samples, keyed by metric and item name.
///
/// Shared by all scrapes of one collector instance for its lifetime; the
/// mutex guards against overlapping scrapes. Nothing is persisted across
/// process restarts.
#[derive(Debug, Default)]
pub struct CounterFloor {
    floors: Mutex<FxHashMap<(String, String), f64>>,
}

impl CounterFloor {
    /// Creates an empty floor map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Decides whether a counter sample may be emitted.
    ///
    /// A value at or above the stored floor advances the floor and is
    /// admitted. A value below the floor is suppressed with a diagnostic;
    /// the floor is never lowered. Suppression is not an error.
    pub fn admit(&self, metric: &str, item: &str, value: f64) -> bool {
        let mut floors = self.floors.lock();

        match floors.get_mut(&(metric.to_string(), item.to_string())) {
            Some(floor) if value < *floor => {
                debug!(
                    metric,
                    item,
                    value,
                    floor = *floor,
                    "suppressing non-monotonic counter value"
                );
                false
            }
            Some(floor) => {
                *floor = value;
                true
            }
            None => {
                floors.insert((metric.to_string(), item.to_string()), value);
                true
            }
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
    fn test_first_value_admitted() {
        let floor = CounterFloor::new();
        assert!(floor.admit("m", "a", 200.0));
    }

    #[test]
    fn test_below_floor_suppressed() {
        let floor = CounterFloor::new();

        assert!(floor.admit("m", "a", 200.0));
        assert!(!floor.admit("m", "a", 150.0));

        // The floor stayed at 200.
        assert!(!floor.admit("m", "a", 199.0));
        assert!(floor.admit("m", "a", 200.0));
        assert!(floor.admit("m", "a", 250.0));
        assert!(!floor.admit("m", "a", 249.0));
    }

    #[test]
    fn test_keys_are_independent() {
        let floor = CounterFloor::new();

        assert!(floor.admit("m", "a", 200.0));
        assert!(floor.admit("m", "b", 10.0));
        assert!(floor.admit("other", "a", 10.0));
        assert!(!floor.admit("m", "a", 100.0));
    }
}
