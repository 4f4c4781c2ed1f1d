//! The tabular dataset model: typed columns (`Attribute`), weighted rows (`Instance`) and the
//! dataset that ties them together (`Instances`).

mod attribute;
mod instance;
mod instances;

pub use self::attribute::{Attribute, AttributeKind, Range};
pub use self::instance::{is_missing, Instance, MISSING};
pub use self::instances::Instances;
