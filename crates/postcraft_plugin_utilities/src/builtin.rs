//! The small set of utility classes available without configuration.

use postcraft_ast::Declaration;

type Utility = (&'static str, &'static [(&'static str, &'static str)]);

const STATIC_UTILITIES: &[Utility] = &[
  // display
  ("block", &[("display", "block")]),
  ("inline-block", &[("display", "inline-block")]),
  ("inline", &[("display", "inline")]),
  ("flex", &[("display", "flex")]),
  ("inline-flex", &[("display", "inline-flex")]),
  ("grid", &[("display", "grid")]),
  ("inline-grid", &[("display", "inline-grid")]),
  ("contents", &[("display", "contents")]),
  ("hidden", &[("display", "none")]),
  // flex
  ("flex-row", &[("flex-direction", "row")]),
  ("flex-col", &[("flex-direction", "column")]),
  ("flex-wrap", &[("flex-wrap", "wrap")]),
  ("flex-nowrap", &[("flex-wrap", "nowrap")]),
  ("flex-1", &[("flex", "1 1 0%")]),
  ("flex-auto", &[("flex", "1 1 auto")]),
  ("flex-none", &[("flex", "none")]),
  ("grow", &[("flex-grow", "1")]),
  ("shrink-0", &[("flex-shrink", "0")]),
  ("items-start", &[("align-items", "flex-start")]),
  ("items-center", &[("align-items", "center")]),
  ("items-end", &[("align-items", "flex-end")]),
  ("items-baseline", &[("align-items", "baseline")]),
  ("items-stretch", &[("align-items", "stretch")]),
  ("justify-start", &[("justify-content", "flex-start")]),
  ("justify-center", &[("justify-content", "center")]),
  ("justify-end", &[("justify-content", "flex-end")]),
  ("justify-between", &[("justify-content", "space-between")]),
  ("justify-around", &[("justify-content", "space-around")]),
  ("justify-evenly", &[("justify-content", "space-evenly")]),
  ("self-center", &[("align-self", "center")]),
  // position
  ("static", &[("position", "static")]),
  ("fixed", &[("position", "fixed")]),
  ("absolute", &[("position", "absolute")]),
  ("relative", &[("position", "relative")]),
  ("sticky", &[("position", "sticky")]),
  // sizing
  ("w-full", &[("width", "100%")]),
  ("w-screen", &[("width", "100vw")]),
  ("w-auto", &[("width", "auto")]),
  ("w-fit", &[("width", "fit-content")]),
  ("h-full", &[("height", "100%")]),
  ("h-screen", &[("height", "100vh")]),
  ("h-auto", &[("height", "auto")]),
  ("min-h-screen", &[("min-height", "100vh")]),
  // typography
  ("text-left", &[("text-align", "left")]),
  ("text-center", &[("text-align", "center")]),
  ("text-right", &[("text-align", "right")]),
  ("text-xs", &[("font-size", "0.75rem"), ("line-height", "1rem")]),
  ("text-sm", &[("font-size", "0.875rem"), ("line-height", "1.25rem")]),
  ("text-base", &[("font-size", "1rem"), ("line-height", "1.5rem")]),
  ("text-lg", &[("font-size", "1.125rem"), ("line-height", "1.75rem")]),
  ("text-xl", &[("font-size", "1.25rem"), ("line-height", "1.75rem")]),
  ("text-2xl", &[("font-size", "1.5rem"), ("line-height", "2rem")]),
  ("font-normal", &[("font-weight", "400")]),
  ("font-medium", &[("font-weight", "500")]),
  ("font-semibold", &[("font-weight", "600")]),
  ("font-bold", &[("font-weight", "700")]),
  ("italic", &[("font-style", "italic")]),
  ("underline", &[("text-decoration-line", "underline")]),
  ("uppercase", &[("text-transform", "uppercase")]),
  (
    "truncate",
    &[
      ("overflow", "hidden"),
      ("text-overflow", "ellipsis"),
      ("white-space", "nowrap"),
    ],
  ),
  // interactivity
  ("select-none", &[("user-select", "none")]),
  ("select-text", &[("user-select", "text")]),
  ("cursor-pointer", &[("cursor", "pointer")]),
  ("overflow-hidden", &[("overflow", "hidden")]),
  ("overflow-auto", &[("overflow", "auto")]),
  // borders
  ("border", &[("border-width", "1px")]),
  ("rounded", &[("border-radius", "0.25rem")]),
  ("rounded-full", &[("border-radius", "9999px")]),
];

/// Spacing prefixes, longest first so `px-` wins over `p-`.
const SPACING_UTILITIES: &[Utility] = &[
  ("gap-x", &[("column-gap", "")]),
  ("gap-y", &[("row-gap", "")]),
  ("gap", &[("gap", "")]),
  ("px", &[("padding-left", ""), ("padding-right", "")]),
  ("py", &[("padding-top", ""), ("padding-bottom", "")]),
  ("pt", &[("padding-top", "")]),
  ("pr", &[("padding-right", "")]),
  ("pb", &[("padding-bottom", "")]),
  ("pl", &[("padding-left", "")]),
  ("p", &[("padding", "")]),
  ("mx", &[("margin-left", ""), ("margin-right", "")]),
  ("my", &[("margin-top", ""), ("margin-bottom", "")]),
  ("mt", &[("margin-top", "")]),
  ("mr", &[("margin-right", "")]),
  ("mb", &[("margin-bottom", "")]),
  ("ml", &[("margin-left", "")]),
  ("m", &[("margin", "")]),
];

pub fn lookup(class: &str) -> Option<Vec<Declaration>> {
  if let Some((_, declarations)) = STATIC_UTILITIES.iter().find(|(name, _)| *name == class) {
    return Some(
      declarations
        .iter()
        .map(|(prop, value)| Declaration::new(*prop, *value))
        .collect(),
    );
  }

  spacing(class)
}

/// `p-4` → `padding: 1rem`, one scale step being `0.25rem`.
fn spacing(class: &str) -> Option<Vec<Declaration>> {
  SPACING_UTILITIES.iter().find_map(|(prefix, props)| {
    let step = class.strip_prefix(*prefix)?.strip_prefix('-')?;
    let value = spacing_value(step, prefix.starts_with('m'))?;
    Some(
      props
        .iter()
        .map(|(prop, _)| Declaration::new(*prop, value.as_str()))
        .collect(),
    )
  })
}

fn spacing_value(step: &str, allows_auto: bool) -> Option<String> {
  match step {
    "px" => return Some(String::from("1px")),
    "0" => return Some(String::from("0px")),
    "auto" if allows_auto => return Some(String::from("auto")),
    _ => {}
  }

  let steps: f64 = step.parse().ok()?;
  // Only whole and half steps are part of the scale
  if steps <= 0.0 || (steps * 2.0).fract() != 0.0 {
    return None;
  }

  Some(format!("{}rem", steps * 0.25))
}

#[cfg(test)]
mod tests {
  use pretty_assertions::assert_eq;

  use super::*;

  fn css(class: &str) -> Option<Vec<String>> {
    lookup(class).map(|declarations| {
      declarations
        .into_iter()
        .map(|decl| format!("{}: {}", decl.prop, decl.value))
        .collect()
    })
  }

  #[test]
  fn static_utilities() {
    assert_eq!(css("flex"), Some(vec![String::from("display: flex")]));
    assert_eq!(
      css("items-center"),
      Some(vec![String::from("align-items: center")])
    );
    assert_eq!(css("select-none"), Some(vec![String::from("user-select: none")]));
  }

  #[test]
  fn spacing_scale() {
    assert_eq!(css("p-4"), Some(vec![String::from("padding: 1rem")]));
    assert_eq!(
      css("px-2"),
      Some(vec![
        String::from("padding-left: 0.5rem"),
        String::from("padding-right: 0.5rem")
      ])
    );
    assert_eq!(css("mt-1.5"), Some(vec![String::from("margin-top: 0.375rem")]));
    assert_eq!(css("gap-x-px"), Some(vec![String::from("column-gap: 1px")]));
    assert_eq!(css("m-0"), Some(vec![String::from("margin: 0px")]));
    assert_eq!(css("mx-auto").map(|decls| decls.len()), Some(2));
  }

  #[test]
  fn unknown_classes() {
    assert_eq!(css("p-auto"), None);
    assert_eq!(css("p-1.3"), None);
    assert_eq!(css("padding-4"), None);
    assert_eq!(css("bg-red-500"), None);
  }
}
