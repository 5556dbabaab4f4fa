mod nesting;
mod selectors;

pub use nesting::*;
pub use selectors::merge_selectors;
