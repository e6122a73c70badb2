//! German terminology.

use rustc_hash::FxHashMap;

use super::{
    Terminology, OP_MODE_ID_DEFROSTING, OP_MODE_ID_DHW, OP_MODE_ID_EVU, OP_MODE_ID_HEATING,
    OP_MODE_ID_OFF,
};

/// Returns the German terminology.
#[must_use]
pub fn german() -> Terminology {
    Terminology {
        id: "de",
        name: "Deutsch",

        timestamp_format: "%d.%m.%y %H:%M:%S",
        timestamp_short_format: "%d.%m.%y %H:%M",

        nav_information: "Informationen",
        nav_temperatures: "Temperaturen",
        nav_elapsed_times: "Ablaufzeiten",
        nav_inputs: "Eingänge",
        nav_outputs: "Ausgänge",
        nav_heat_quantity: "Wärmemenge",
        nav_energy_input: "Eingesetzte Energie",
        nav_error_memory: "Fehlerspeicher",
        nav_switch_offs: "Abschaltungen",
        nav_op_hours: "Betriebsstunden",
        nav_system_status: "Anlagenstatus",

        status_type: "Wärmepumpen Typ",
        status_software_version: "Softwarestand",
        status_operation_mode: "Betriebszustand",
        status_power_consumption: "Eingesetzte Energie",
        status_heating_capacity: "Heizleistung Ist",
        status_defrost_demand: "Abtaubedarf",
        status_last_defrost: "Letzte Abt.",

        bool_false: "Aus",
        bool_true: "Ein",

        operation_modes: FxHashMap::from_iter([
            ("off", OP_MODE_ID_OFF),
            ("heizen", OP_MODE_ID_HEATING),
            ("evu", OP_MODE_ID_EVU),
            ("ww", OP_MODE_ID_DHW),
            ("abt", OP_MODE_ID_DEFROSTING),
        ]),

        impulse_prefixes: &["impulse", "Impulse"],
    }
}
