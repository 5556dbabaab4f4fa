mod strip_directive;
mod strip_directive_options;

pub use strip_directive::*;
pub use strip_directive_options::StripDirectiveOptions;
