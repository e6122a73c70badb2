//! Finnish terminology.

use rustc_hash::FxHashMap;

use super::{
    Terminology, OP_MODE_ID_DEFROSTING, OP_MODE_ID_DHW, OP_MODE_ID_EVU, OP_MODE_ID_HEATING,
    OP_MODE_ID_OFF,
};

/// Returns the Finnish terminology.
#[must_use]
pub fn finnish() -> Terminology {
    Terminology {
        id: "fi",
        name: "Suomi",

        timestamp_format: "%d.%m.%y %H:%M:%S",
        timestamp_short_format: "%d.%m.%y %H:%M",

        nav_information: "Informaatio",
        nav_temperatures: "Lämpötilat",
        nav_elapsed_times: "Käyntiajat",
        nav_inputs: "Tilat sisäänmeno",
        nav_outputs: "Tilat ulostulo",
        nav_heat_quantity: "Kalorimetri",
        nav_energy_input: "Power Consumption",
        nav_error_memory: "Häiriöloki",
        nav_switch_offs: "Pysähtymistieto",
        nav_op_hours: "Käyttötunnit",
        nav_system_status: "Laitetiedot",

        status_type: "Lämpöpumpun tyyppi",
        status_software_version: "Ohjelmaversio",
        status_operation_mode: "Toimintatila",
        status_power_consumption: "Kapasiteetti",
        status_heating_capacity: "Heating capacity",
        status_defrost_demand: "Defrost demand",
        status_last_defrost: "last defrost",

        bool_false: "Pois",
        bool_true: "On",

        operation_modes: FxHashMap::from_iter([
            ("off", OP_MODE_ID_OFF),
            ("heating", OP_MODE_ID_HEATING),
            ("evu", OP_MODE_ID_EVU),
            ("dhw", OP_MODE_ID_DHW),
            ("defrosting", OP_MODE_ID_DEFROSTING),
        ]),

        impulse_prefixes: &["impulse", "Impulse"],
    }
}
