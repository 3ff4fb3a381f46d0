mod attribute;
mod types;

pub use attribute::{Attribute, Vsa};
pub use types::{AcctStatusType, AttributeType};
