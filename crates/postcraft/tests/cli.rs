use std::io::Write;
use std::process::{Command, Output, Stdio};

use assert_fs::prelude::*;
use assert_fs::TempDir;
use indoc::indoc;
use pretty_assertions::assert_eq;

const CARD: &str = indoc! {"
  .card {
    color: red;
    @apply flex p-4;
    & .title {
      @apply font-bold;
    }
  }
"};

fn project() -> TempDir {
  let dir = TempDir::new().unwrap();
  dir
    .child("postcraft.config.json")
    .write_str("{ autoprefixer: { browsers: ['chrome 120'] } }")
    .unwrap();
  dir
}

fn postcraft(dir: &TempDir, args: &[&str], stdin: Option<&str>) -> Output {
  let mut child = Command::new(env!("CARGO_BIN_EXE_postcraft"))
    .args(args)
    .current_dir(dir.path())
    .env_remove("RUST_LOG")
    .env_remove("POSTCRAFT_CONFIG")
    .stdin(Stdio::piped())
    .stdout(Stdio::piped())
    .stderr(Stdio::piped())
    .spawn()
    .unwrap();

  let mut input = child.stdin.take().unwrap();
  input.write_all(stdin.unwrap_or_default().as_bytes()).unwrap();
  drop(input);

  child.wait_with_output().unwrap()
}

fn stdout(output: &Output) -> String {
  String::from_utf8(output.stdout.clone()).unwrap()
}

fn stderr(output: &Output) -> String {
  String::from_utf8(output.stderr.clone()).unwrap()
}

#[test]
fn prints_the_default_stage_order() {
  let dir = project();

  let output = postcraft(&dir, &["--print-stages"], None);

  assert!(output.status.success());
  assert_eq!(
    stdout(&output),
    "import\nnesting\nstrip-directive\nutilities\nautoprefixer\n"
  );
}

#[test]
fn expands_apply_in_css_files() {
  let dir = project();
  dir.child("card.css").write_str(CARD).unwrap();

  let output = postcraft(&dir, &["card.css"], None);

  assert!(output.status.success(), "{}", stderr(&output));
  assert_eq!(
    stdout(&output),
    indoc! {"
      .card {
        color: red;
        display: flex;
        padding: 1rem;
      }
      .card .title {
        font-weight: 700;
      }
    "}
  );
}

#[test]
fn strips_apply_from_less_files() {
  let dir = project();
  dir.child("card.less").write_str(CARD).unwrap();

  let output = postcraft(&dir, &["card.less"], None);

  assert!(output.status.success(), "{}", stderr(&output));
  assert_eq!(
    stdout(&output),
    ".card {\n  color: red;\n}\n.card .title {}\n"
  );
}

#[test]
fn reads_virtual_ids_from_stdin() {
  let dir = project();

  let less = postcraft(
    &dir,
    &["--from", "src/Card.vue.less?vue&type=style&index=0"],
    Some(CARD),
  );
  let vue = postcraft(
    &dir,
    &["--from", "src/Card.vue?vue&type=style&index=0&lang=less"],
    Some(CARD),
  );

  assert!(less.status.success(), "{}", stderr(&less));
  assert!(!stdout(&less).contains("display"));
  assert!(vue.status.success(), "{}", stderr(&vue));
  assert!(stdout(&vue).contains("display: flex;"));
}

#[test]
fn writes_every_file_into_the_out_dir() {
  let dir = project();
  dir.child("src/card.css").write_str(CARD).unwrap();
  dir.child("src/theme.less").write_str(CARD).unwrap();

  let output = postcraft(
    &dir,
    &["--out-dir", "dist", "src/card.css", "src/theme.less"],
    None,
  );

  assert!(output.status.success(), "{}", stderr(&output));
  assert_eq!(stdout(&output), "");
  let card = std::fs::read_to_string(dir.child("dist/card.css").path()).unwrap();
  assert!(card.contains("display: flex;"));
  dir
    .child("dist/theme.css")
    .assert(".card {\n  color: red;\n}\n.card .title {}\n");
}

#[test]
fn fails_when_a_file_fails() {
  let dir = project();
  dir
    .child("broken.css")
    .write_str(".a { @apply does-not-exist; }")
    .unwrap();
  dir.child("ok.css").write_str(".b { color: red; }").unwrap();

  let output = postcraft(&dir, &["broken.css", "ok.css"], None);

  assert_eq!(output.status.code(), Some(1));
  assert_eq!(stdout(&output), ".b {\n  color: red;\n}\n");
  assert!(stderr(&output).contains("The `does-not-exist` class does not exist."));
}

#[test]
fn rejects_unknown_plugins_in_the_config() {
  let dir = TempDir::new().unwrap();
  dir
    .child(".postcraftrc")
    .write_str("{ plugins: ['import', 'sass'] }")
    .unwrap();

  let output = postcraft(&dir, &["--print-stages"], None);

  assert!(!output.status.success());
  assert!(stderr(&output).contains("Unknown plugin 'sass'"));
}

#[test]
fn refuses_inputs_that_share_an_output_file() {
  let dir = project();
  dir.child("a/card.css").write_str(".a { color: red; }").unwrap();
  dir.child("b/card.less").write_str(".b { color: blue; }").unwrap();

  let output = postcraft(
    &dir,
    &["--out-dir", "dist", "a/card.css", "b/card.less"],
    None,
  );

  assert!(!output.status.success());
  assert!(stderr(&output).contains("a/card.css and b/card.less would both be written to"));
  assert!(!dir.child("dist/card.css").path().exists());
}
