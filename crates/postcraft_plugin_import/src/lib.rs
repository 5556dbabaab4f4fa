mod import;
mod import_statement;
mod resolver;

pub use import::*;
pub use import_statement::ImportStatement;
pub use resolver::ImportResolver;
