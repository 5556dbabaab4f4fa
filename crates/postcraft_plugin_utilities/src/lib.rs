mod builtin;
mod utilities;
mod utility_lookup;

pub use utilities::*;
pub use utility_lookup::{UtilityLookup, UtilityRegistry};
