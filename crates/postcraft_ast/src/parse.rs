use crate::css_syntax_error::CssSyntaxError;
use crate::nodes::{AtRule, Comment, Declaration, Node, Position, Root, Rule};

const OPEN_CURLY: u8 = b'{';
const CLOSE_CURLY: u8 = b'}';
const SEMICOLON: u8 = b';';
const SLASH: u8 = b'/';
const ASTERISK: u8 = b'*';
const BACKSLASH: u8 = b'\\';
const AT: u8 = b'@';

fn is_space(byte: u8) -> bool {
  matches!(byte, b' ' | b'\n' | b'\t' | b'\r' | 0x0c)
}

fn is_at_name_end(byte: u8) -> bool {
  is_space(byte)
    || matches!(
      byte,
      b'"' | b'\'' | b'(' | b')' | b'/' | b';' | b'[' | b']' | b'{' | b'}' | b'\\'
    )
}

/// Parses stylesheet source into a [`Root`].
///
/// `from` is only used to label errors.
pub fn parse(css: &str, from: Option<&str>) -> Result<Root, CssSyntaxError> {
  let parser = Parser::new(css, from);
  parser.parse()
}

struct Parser<'a> {
  css: &'a str,
  bytes: &'a [u8],
  pos: usize,
  from: Option<&'a str>,
  line_starts: Vec<usize>,
}

impl<'a> Parser<'a> {
  fn new(css: &'a str, from: Option<&'a str>) -> Self {
    let mut line_starts = vec![0];
    line_starts.extend(
      css
        .bytes()
        .enumerate()
        .filter(|(_, byte)| *byte == b'\n')
        .map(|(index, _)| index + 1),
    );

    Self {
      css,
      bytes: css.as_bytes(),
      pos: 0,
      from,
      line_starts,
    }
  }

  fn parse(mut self) -> Result<Root, CssSyntaxError> {
    let nodes = self.nodes(None)?;
    Ok(Root { nodes })
  }

  fn position(&self, offset: usize) -> Position {
    let line = match self.line_starts.binary_search(&offset) {
      Ok(line) => line,
      Err(next) => next - 1,
    };
    let column = self.css[self.line_starts[line]..offset].chars().count() + 1;
    Position::new(line as u32 + 1, column as u32, offset)
  }

  fn error(&self, reason: &str, offset: usize) -> CssSyntaxError {
    CssSyntaxError::new(reason, self.from, Some(self.position(offset)))
  }

  fn peek(&self) -> Option<u8> {
    self.bytes.get(self.pos).copied()
  }

  fn peek_at(&self, ahead: usize) -> Option<u8> {
    self.bytes.get(self.pos + ahead).copied()
  }

  fn at_comment(&self) -> bool {
    self.peek() == Some(SLASH) && self.peek_at(1) == Some(ASTERISK)
  }

  /// Steps over one whole character, which may span several bytes.
  fn advance_char(&mut self) {
    let width = self.css[self.pos..]
      .chars()
      .next()
      .map_or(1, |ch| ch.len_utf8());
    self.pos += width;
  }

  fn skip_separators(&mut self) {
    while let Some(byte) = self.peek() {
      if is_space(byte) || byte == SEMICOLON {
        self.pos += 1;
      } else {
        break;
      }
    }
  }

  /// Parses the children of a block, or the top level when `open` is `None`.
  /// `open` is the offset of the `{` that started the block.
  fn nodes(&mut self, open: Option<usize>) -> Result<Vec<Node>, CssSyntaxError> {
    let mut nodes = Vec::new();

    loop {
      self.skip_separators();

      let Some(byte) = self.peek() else {
        return match open {
          Some(open) => Err(self.error("Unclosed block", open)),
          None => Ok(nodes),
        };
      };

      match byte {
        CLOSE_CURLY => {
          if open.is_none() {
            return Err(self.error("Unexpected }", self.pos));
          }
          self.pos += 1;
          return Ok(nodes);
        }
        SLASH if self.at_comment() => nodes.push(Node::Comment(self.comment()?)),
        AT => nodes.push(self.at_rule()?),
        _ => nodes.push(self.rule_or_declaration()?),
      }
    }
  }

  fn comment(&mut self) -> Result<Comment, CssSyntaxError> {
    let start = self.pos;
    let body = start + 2;
    let Some(length) = self.css[body..].find("*/") else {
      return Err(self.error("Unclosed comment", start));
    };

    self.pos = body + length + 2;
    Ok(Comment {
      text: self.css[body..body + length].trim().to_string(),
      source: Some(self.position(start)),
    })
  }

  fn skip_comment(&mut self) -> Result<(), CssSyntaxError> {
    self.comment().map(|_| ())
  }

  fn skip_string(&mut self, quote: u8) -> Result<(), CssSyntaxError> {
    let start = self.pos;
    self.pos += 1;

    while let Some(byte) = self.peek() {
      if byte == BACKSLASH {
        self.pos += 1;
        if self.peek().is_some() {
          self.advance_char();
        }
      } else if byte == quote {
        self.pos += 1;
        return Ok(());
      } else {
        self.advance_char();
      }
    }

    Err(self.error("Unclosed string", start))
  }

  /// Moves forward until one of `stops` is found outside strings, comments,
  /// parentheses and brackets. Leaves `pos` on the stop byte.
  fn scan_until(&mut self, stops: &[u8]) -> Result<Option<u8>, CssSyntaxError> {
    let mut closers: Vec<u8> = Vec::new();

    while let Some(byte) = self.peek() {
      match byte {
        b'"' | b'\'' => self.skip_string(byte)?,
        SLASH if self.at_comment() => self.skip_comment()?,
        BACKSLASH => {
          self.pos += 1;
          if self.peek().is_some() {
            self.advance_char();
          }
        }
        b'(' => {
          closers.push(b')');
          self.pos += 1;
        }
        b'[' => {
          closers.push(b']');
          self.pos += 1;
        }
        b')' | b']' if closers.last() == Some(&byte) => {
          closers.pop();
          self.pos += 1;
        }
        _ if closers.is_empty() && stops.contains(&byte) => return Ok(Some(byte)),
        _ => self.advance_char(),
      }
    }

    Ok(None)
  }

  /// Skips a `{ ... }` group that belongs to a custom property value.
  fn skip_balanced_block(&mut self) -> Result<(), CssSyntaxError> {
    let open = self.pos;
    let mut depth = 0usize;

    while let Some(byte) = self.peek() {
      match byte {
        b'"' | b'\'' => {
          self.skip_string(byte)?;
          continue;
        }
        SLASH if self.at_comment() => {
          self.skip_comment()?;
          continue;
        }
        OPEN_CURLY => depth += 1,
        CLOSE_CURLY => {
          depth -= 1;
          if depth == 0 {
            self.pos += 1;
            return Ok(());
          }
        }
        _ => {}
      }
      self.advance_char();
    }

    Err(self.error("Unclosed block", open))
  }

  fn at_rule(&mut self) -> Result<Node, CssSyntaxError> {
    let start = self.pos;
    self.pos += 1;

    let name_start = self.pos;
    while let Some(byte) = self.peek() {
      if is_at_name_end(byte) {
        break;
      }
      self.advance_char();
    }
    let name = &self.css[name_start..self.pos];
    if name.is_empty() {
      return Err(self.error("At-rule without name", start));
    }

    let params_start = self.pos;
    let stop = self.scan_until(&[SEMICOLON, OPEN_CURLY, CLOSE_CURLY])?;
    let params = self.css[params_start..self.pos].trim().to_string();

    let mut at_rule = AtRule::new(name, params).with_source(Some(self.position(start)));
    match stop {
      Some(OPEN_CURLY) => {
        let open = self.pos;
        self.pos += 1;
        at_rule.nodes = Some(self.nodes(Some(open))?);
      }
      Some(SEMICOLON) => self.pos += 1,
      // `}` closes the parent block and is consumed by it
      _ => {}
    }

    Ok(Node::AtRule(at_rule))
  }

  fn rule_or_declaration(&mut self) -> Result<Node, CssSyntaxError> {
    let start = self.pos;

    let stop = loop {
      let stop = self.scan_until(&[SEMICOLON, OPEN_CURLY, CLOSE_CURLY])?;
      if stop == Some(OPEN_CURLY) && is_custom_property_head(&self.css[start..self.pos]) {
        self.skip_balanced_block()?;
        continue;
      }
      break stop;
    };

    if stop == Some(OPEN_CURLY) {
      let selector = self.css[start..self.pos].trim().to_string();
      let open = self.pos;
      self.pos += 1;
      let nodes = self.nodes(Some(open))?;

      return Ok(Node::Rule(Rule {
        selector,
        nodes,
        source: Some(self.position(start)),
      }));
    }

    let end = self.pos;
    if stop == Some(SEMICOLON) {
      self.pos += 1;
    }

    self.declaration(start, end).map(Node::Declaration)
  }

  fn declaration(&self, start: usize, end: usize) -> Result<Declaration, CssSyntaxError> {
    let text = &self.css[start..end];
    let Some(colon) = find_top_level(text, b':') else {
      return Err(self.error("Unknown word", start));
    };

    let prop = text[..colon].trim();
    if prop.is_empty() {
      return Err(self.error("Unknown word", start));
    }

    let (value, important) = split_important(text[colon + 1..].trim());

    Ok(Declaration {
      prop: prop.to_string(),
      value: value.to_string(),
      important,
      source: Some(self.position(start)),
    })
  }
}

fn is_custom_property_head(head: &str) -> bool {
  let head = head.trim_start();
  head.starts_with("--") && head.contains(':')
}

/// Byte offset of the first `needle` outside strings and parentheses.
fn find_top_level(text: &str, needle: u8) -> Option<usize> {
  let bytes = text.as_bytes();
  let mut depth = 0u32;
  let mut quote: Option<u8> = None;
  let mut index = 0;

  while index < bytes.len() {
    let byte = bytes[index];
    match quote {
      Some(open) => {
        if byte == BACKSLASH {
          index += 1;
        } else if byte == open {
          quote = None;
        }
      }
      None => match byte {
        BACKSLASH => index += 1,
        b'"' | b'\'' => quote = Some(byte),
        b'(' | b'[' => depth += 1,
        b')' | b']' => depth = depth.saturating_sub(1),
        _ if byte == needle && depth == 0 => return Some(index),
        _ => {}
      },
    }
    index += 1;
  }

  None
}

/// Splits a trailing `!important` (any case, optional space after `!`).
fn split_important(value: &str) -> (&str, bool) {
  if let Some(bang) = value.rfind('!') {
    if value[bang + 1..].trim().eq_ignore_ascii_case("important") {
      return (value[..bang].trim_end(), true);
    }
  }
  (value, false)
}

#[cfg(test)]
mod tests {
  use indoc::indoc;
  use pretty_assertions::assert_eq;

  use super::*;
  use crate::{at_rule, comment, decl, rule};

  fn strip_sources(nodes: &mut Vec<Node>) {
    for node in nodes.iter_mut() {
      match node {
        Node::Rule(rule) => rule.source = None,
        Node::AtRule(at_rule) => at_rule.source = None,
        Node::Declaration(decl) => decl.source = None,
        Node::Comment(comment) => comment.source = None,
      }
      if let Some(children) = node.children_mut() {
        strip_sources(children);
      }
    }
  }

  fn parse_without_sources(css: &str) -> Root {
    let mut root = parse(css, None).unwrap();
    strip_sources(&mut root.nodes);
    root
  }

  #[test]
  fn parses_rules_declarations_and_at_rules() {
    let root = parse_without_sources(indoc! {r#"
      @import "base.css";
      .card {
        color: red;
        @apply flex items-center;
        .title { margin: 0 !important }
      }
    "#});

    assert_eq!(
      root,
      Root::with_nodes(vec![
        at_rule("import", "\"base.css\"").into(),
        rule(".card")
          .append(decl("color", "red"))
          .append(at_rule("apply", "flex items-center"))
          .append(rule(".title").append(decl("margin", "0").important(true)))
          .into(),
      ])
    );
  }

  #[test]
  fn parses_block_at_rules_and_comments() {
    let root = parse_without_sources("/* header */ @media (min-width: 640px) { a { b: c } }");

    assert_eq!(
      root,
      Root::with_nodes(vec![
        comment("header").into(),
        at_rule("media", "(min-width: 640px)")
          .with_nodes(vec![rule("a").append(decl("b", "c")).into()])
          .into(),
      ])
    );
  }

  #[test]
  fn keeps_semicolons_and_braces_inside_strings_and_urls() {
    let root = parse_without_sources(
      r#"a { content: "a;b}"; background: url(data:image/png;base64,AAA) }"#,
    );

    assert_eq!(
      root,
      Root::with_nodes(vec![rule("a")
        .append(decl("content", "\"a;b}\""))
        .append(decl("background", "url(data:image/png;base64,AAA)"))
        .into()])
    );
  }

  #[test]
  fn custom_properties_may_contain_braces() {
    let root = parse_without_sources(":root { --toolbar: { color: red }; --gap: 4px }");

    assert_eq!(
      root,
      Root::with_nodes(vec![rule(":root")
        .append(decl("--toolbar", "{ color: red }"))
        .append(decl("--gap", "4px"))
        .into()])
    );
  }

  #[test]
  fn records_source_positions() {
    let root = parse("a {\n  color: red;\n}", None).unwrap();
    let rule = root.nodes[0].as_rule().unwrap();

    assert_eq!(rule.source, Some(Position::new(1, 1, 0)));
    assert_eq!(rule.nodes[0].source(), Some(Position::new(2, 3, 6)));
  }

  #[test]
  fn statement_at_rule_may_close_its_block() {
    let root = parse_without_sources("a { @apply flex }");

    assert_eq!(
      root,
      Root::with_nodes(vec![rule("a").append(at_rule("apply", "flex")).into()])
    );
  }

  #[test]
  fn reports_unclosed_block() {
    let error = parse("a {\n  color: red;", Some("card.css")).unwrap_err();

    assert_eq!(error.to_string(), "card.css:1:3: Unclosed block");
  }

  #[test]
  fn reports_unexpected_close() {
    let error = parse("a {}\n}", None).unwrap_err();

    assert_eq!(error.reason, "Unexpected }");
    assert_eq!((error.line, error.column), (2, 1));
  }

  #[test]
  fn reports_unknown_word() {
    let error = parse("a { color red }", None).unwrap_err();

    assert_eq!(error.reason, "Unknown word");
    assert_eq!((error.line, error.column), (1, 5));
  }

  #[test]
  fn reports_unclosed_string_and_comment() {
    assert_eq!(parse("a { content: \"x }", None).unwrap_err().reason, "Unclosed string");
    assert_eq!(parse("/* never closed", None).unwrap_err().reason, "Unclosed comment");
  }
}
