//! English terminology.

use rustc_hash::FxHashMap;

use super::{
    Terminology, OP_MODE_ID_DEFROSTING, OP_MODE_ID_DHW, OP_MODE_ID_EVU, OP_MODE_ID_HEATING,
    OP_MODE_ID_OFF,
};

/// Returns the English terminology.
#[must_use]
pub fn english() -> Terminology {
    Terminology {
        id: "en",
        name: "English",

        timestamp_format: "%d.%m.%y %H:%M:%S",
        timestamp_short_format: "%d.%m.%y %H:%M",

        nav_information: "information",
        nav_temperatures: "temperatures",
        nav_elapsed_times: "elapsed times",
        nav_inputs: "inputs",
        nav_outputs: "outputs",
        nav_heat_quantity: "Heat Quantity",
        nav_energy_input: "Power Consumption",
        nav_error_memory: "error memory",
        nav_switch_offs: "switch offs",
        nav_op_hours: "operating hours",
        nav_system_status: "system status",

        status_type: "type of heat pump",
        status_software_version: "software version",
        status_operation_mode: "operation mode",
        status_power_consumption: "Power Consumption",
        status_heating_capacity: "Heating capacity",
        status_defrost_demand: "Defrost demand",
        status_last_defrost: "last defrost",

        bool_false: "Off",
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
