use lightningcss::printer::PrinterOptions;
use lightningcss::stylesheet::{MinifyOptions, ParserOptions, StyleSheet};

/// Re-parses serialized output with lightningcss and prints it minified.
///
/// Errors are flattened to strings since lightningcss errors borrow the input.
pub fn minify_css(css: &str, filename: &str) -> Result<String, String> {
  let mut stylesheet = StyleSheet::parse(
    css,
    ParserOptions {
      filename: filename.to_string(),
      ..ParserOptions::default()
    },
  )
  .map_err(|err| err.to_string())?;

  stylesheet
    .minify(MinifyOptions::default())
    .map_err(|err| err.to_string())?;

  let output = stylesheet
    .to_css(PrinterOptions {
      minify: true,
      ..PrinterOptions::default()
    })
    .map_err(|err| err.to_string())?;

  Ok(output.code)
}
