#![cfg(feature = "cli")]

use std::io::Write;
use std::process::{Command, Output, Stdio};

const RECORDS: &str = r#"{"name": "ada", "age": 36, "tier": "gold", "joined": "2015-12-10"}
{"name": "bob", "age": 17, "tier": "free", "joined": "2021-02-05"}
{"name": "cy", "age": 52, "tier": "platinum", "joined": "2019-07-01"}
"#;

fn run(args: &[&str], stdin: &str) -> Output {
    let mut child = Command::new(env!("CARGO_BIN_EXE_sift"))
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to spawn sift");

    child
        .stdin
        .take()
        .unwrap()
        .write_all(stdin.as_bytes())
        .unwrap();

    child.wait_with_output().expect("failed to wait for sift")
}

fn fields() -> Vec<&'static str> {
    vec![
        "--field", "name:text", "--field", "age:int", "--field", "tier:text", "--field",
        "joined:date",
    ]
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn test_matching_lines_are_echoed() {
    let mut args = vec!["--query", "age >= 18 && tier ∈ [gold, platinum]"];
    args.extend(fields());
    let output = run(&args, RECORDS);

    assert!(output.status.success(), "{output:?}");
    let lines: Vec<String> = stdout(&output).lines().map(str::to_string).collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].contains("\"ada\""));
    assert!(lines[1].contains("\"cy\""));
}

#[test]
fn test_count() {
    let mut args = vec!["--query", "joined < 2020-01-01", "--count"];
    args.extend(fields());
    let output = run(&args, RECORDS);

    assert!(output.status.success(), "{output:?}");
    assert_eq!(stdout(&output).trim(), "2");
}

#[test]
fn test_parse_error_exits_non_zero() {
    let mut args = vec!["--query", "age >= "];
    args.extend(fields());
    let output = run(&args, RECORDS);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Query ended early"), "{stderr}");
}

#[test]
fn test_unknown_field_exits_non_zero() {
    let mut args = vec!["--query", "height > 1"];
    args.extend(fields());
    let output = run(&args, RECORDS);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("height"), "{stderr}");
}

#[test]
fn test_bad_records_are_skipped_unless_strict() {
    let input = format!("not json\n{RECORDS}{{\"name\": \"dee\"}}\n");

    let mut args = vec!["--query", "age > 40", "--count"];
    args.extend(fields());
    let output = run(&args, &input);
    assert!(output.status.success(), "{output:?}");
    assert_eq!(stdout(&output).trim(), "1");

    args.push("--strict");
    let output = run(&args, &input);
    assert!(!output.status.success());
}

#[test]
fn test_evaluation_error_is_reported_per_record() {
    let mut args = vec!["--query", "age > old", "--strict"];
    args.extend(fields());
    let output = run(&args, RECORDS);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("line 1"), "{stderr}");
}

#[test]
fn test_invalid_field_declaration() {
    let output = run(&["--query", "a = 1", "--field", "a:integer"], "");
    assert!(!output.status.success());
}
