//! Types that represent the core data model, such as `ChargeRecord` and `BaselineConfig`.
mod baseline;
mod column;
mod quantity;
mod record;

pub use baseline::BaselineConfig;
pub use column::ChargeColumn;
pub use quantity::{Quantity, QuantityError};
pub use record::{parse_date, ChargeInput, ChargeRecord, RecordId};
