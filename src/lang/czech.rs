//! Czech terminology.
//!
//! No operating-mode table has been confirmed for this locale; every mode
//! resolves to the unknown id.

use rustc_hash::FxHashMap;

use super::Terminology;

/// Returns the Czech terminology.
#[must_use]
pub fn czech() -> Terminology {
    Terminology {
        id: "cz",
        name: "Česky",

        timestamp_format: "%d.%m.%y %H:%M:%S",
        timestamp_short_format: "%d.%m.%y %H:%M",

        nav_information: "Informace",
        nav_temperatures: "Teploty",
        nav_elapsed_times: "Doby chodu",
        nav_inputs: "Vstupy",
        nav_outputs: "Výstupy",
        nav_heat_quantity: "Teplo",
        nav_energy_input: "energy input",
        nav_error_memory: "Chybová paměť",
        nav_switch_offs: "Odepnutí",
        nav_op_hours: "Provozní hodiny",
        nav_system_status: "Status zařízení",

        status_type: "Typ TČ",
        status_software_version: "Softwarová verze",
        status_operation_mode: "Provozní stav",
        status_power_consumption: "Výkon",
        status_heating_capacity: "Heating capacity",
        status_defrost_demand: "Defrost demand",
        status_last_defrost: "last defrost",

        bool_false: "Vypnuto",
        bool_true: "Zapnuto",

        operation_modes: FxHashMap::default(),

        impulse_prefixes: &["počet startů", "Počet startů"],
    }
}
