use crate::model::Quantity;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Date layouts recognized in charge logs, tried in order.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y", "%Y/%m/%d"];

/// Parses a record date in any of the recognized layouts.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
}

/// The identity assigned to a charge record by the datastore.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(i64);

impl RecordId {
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl Display for RecordId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl FromStr for RecordId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.trim().parse()?))
    }
}

/// The fields of a single charging event, as validated from an upload or a form submission. This
/// is what the datastore receives to insert or to replace an existing record.
#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ChargeInput {
    /// The calendar date of the charge, as written by the user.
    pub date: String,
    /// Energy delivered in kWh. Always greater than zero.
    pub energy: Quantity,
    /// Amount charged. Never negative.
    pub cost: Quantity,
    /// The user did not personally pay for this charge, e.g. free public charging.
    pub exempt: bool,
    /// Odometer reading when charging. Never negative.
    pub odometer: Quantity,
    pub location: String,
    pub notes: String,
}

impl ChargeInput {
    /// The parsed calendar date, if `date` is in a recognized layout.
    pub fn parsed_date(&self) -> Option<NaiveDate> {
        parse_date(&self.date)
    }
}

/// A persisted charge record owned by a user.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ChargeRecord {
    /// Absent for records that have not been persisted yet.
    pub id: Option<RecordId>,
    pub user: String,
    #[serde(flatten)]
    pub input: ChargeInput,
}

impl ChargeRecord {
    pub fn new(id: Option<RecordId>, user: impl Into<String>, input: ChargeInput) -> Self {
        Self {
            id,
            user: user.into(),
            input,
        }
    }

    pub fn date(&self) -> &str {
        &self.input.date
    }

    pub fn parsed_date(&self) -> Option<NaiveDate> {
        self.input.parsed_date()
    }

    pub fn energy(&self) -> Quantity {
        self.input.energy
    }

    pub fn cost(&self) -> Quantity {
        self.input.cost
    }

    pub fn exempt(&self) -> bool {
        self.input.exempt
    }

    pub fn odometer(&self) -> Quantity {
        self.input.odometer
    }

    pub fn location(&self) -> &str {
        &self.input.location
    }

    pub fn notes(&self) -> &str {
        &self.input.notes
    }
}
