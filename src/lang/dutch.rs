//! Dutch terminology.
//!
//! No operating-mode table has been confirmed for this locale; every mode
//! resolves to the unknown id.

use rustc_hash::FxHashMap;

use super::Terminology;

/// Returns the Dutch terminology.
#[must_use]
pub fn dutch() -> Terminology {
    Terminology {
        id: "nl",
        name: "Nederlands",

        timestamp_format: "%d.%m.%y %H:%M:%S",
        timestamp_short_format: "%d.%m.%y %H:%M",

        nav_information: "Informatie",
        nav_temperatures: "Temperaturen",
        nav_elapsed_times: "Aflooptijden",
        nav_inputs: "Ingangen",
        nav_outputs: "Uitgangen",
        nav_heat_quantity: "Energie",
        nav_energy_input: "energy input",
        nav_error_memory: "Storingsbuffer",
        nav_switch_offs: "Afschakelingen",
        nav_op_hours: "Bedrijfsuren",
        nav_system_status: "Installatiestatus",

        status_type: "Warmtepomp Type",
        status_software_version: "Softwareversie",
        status_operation_mode: "Bedrijfstoestand",
        status_power_consumption: "Vermogen",
        status_heating_capacity: "Heating capacity",
        status_defrost_demand: "Defrost demand",
        status_last_defrost: "last defrost",

        bool_false: "Uit",
        bool_true: "Aan",

        operation_modes: FxHashMap::default(),

        impulse_prefixes: &["impulse", "Impulse"],
    }
}
