use serde::{Deserialize, Serialize};

/// The columns of a charge log CSV file. Every column is required in an uploaded file.
#[derive(
    Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ChargeColumn {
    Date,
    Energy,
    Cost,
    Exempt,
    Odometer,
    Location,
    Notes,
}

serde_plain::derive_display_from_serialize!(ChargeColumn);
serde_plain::derive_fromstr_from_deserialize!(ChargeColumn);

impl ChargeColumn {
    /// All columns in the order they are written on export.
    pub const ALL: [ChargeColumn; 7] = [
        ChargeColumn::Date,
        ChargeColumn::Energy,
        ChargeColumn::Cost,
        ChargeColumn::Exempt,
        ChargeColumn::Odometer,
        ChargeColumn::Location,
        ChargeColumn::Notes,
    ];

    /// Resolves an already-normalized (trimmed, lower-cased) header to a column. Both the canonical
    /// English names and the legacy Portuguese names used by older spreadsheets are accepted.
    pub fn from_header(header: &str) -> Option<ChargeColumn> {
        match header {
            DATE_STR | DATE_ALIAS => Some(ChargeColumn::Date),
            ENERGY_STR | ENERGY_ALIAS => Some(ChargeColumn::Energy),
            COST_STR | COST_ALIAS => Some(ChargeColumn::Cost),
            EXEMPT_STR | EXEMPT_ALIAS => Some(ChargeColumn::Exempt),
            ODOMETER_STR | ODOMETER_ALIAS => Some(ChargeColumn::Odometer),
            LOCATION_STR | LOCATION_ALIAS => Some(ChargeColumn::Location),
            NOTES_STR | NOTES_ALIAS => Some(ChargeColumn::Notes),
            _ => None,
        }
    }

    /// The canonical header name.
    pub fn header(&self) -> &'static str {
        match self {
            ChargeColumn::Date => DATE_STR,
            ChargeColumn::Energy => ENERGY_STR,
            ChargeColumn::Cost => COST_STR,
            ChargeColumn::Exempt => EXEMPT_STR,
            ChargeColumn::Odometer => ODOMETER_STR,
            ChargeColumn::Location => LOCATION_STR,
            ChargeColumn::Notes => NOTES_STR,
        }
    }
}

pub(crate) const DATE_STR: &str = "date";
const DATE_ALIAS: &str = "data";

pub(crate) const ENERGY_STR: &str = "energy";
const ENERGY_ALIAS: &str = "kwh";

pub(crate) const COST_STR: &str = "cost";
const COST_ALIAS: &str = "custo";

pub(crate) const EXEMPT_STR: &str = "exempt";
const EXEMPT_ALIAS: &str = "isento";

pub(crate) const ODOMETER_STR: &str = "odometer";
const ODOMETER_ALIAS: &str = "odometro";

pub(crate) const LOCATION_STR: &str = "location";
const LOCATION_ALIAS: &str = "local";

pub(crate) const NOTES_STR: &str = "notes";
const NOTES_ALIAS: &str = "observacoes";
