pub mod css_syntax_error;
pub mod list;
pub mod nodes;
pub mod parse;
pub mod stringifier;

pub use css_syntax_error::CssSyntaxError;
pub use nodes::*;
pub use parse::parse;
pub use stringifier::stringify;

pub fn root() -> Root {
  Root::new()
}

pub fn rule(selector: impl Into<String>) -> Rule {
  Rule::new(selector)
}

pub fn at_rule(name: impl Into<String>, params: impl Into<String>) -> AtRule {
  AtRule::new(name, params)
}

pub fn decl(prop: impl Into<String>, value: impl Into<String>) -> Declaration {
  Declaration::new(prop, value)
}

pub fn comment(text: impl Into<String>) -> Comment {
  Comment::new(text)
}
