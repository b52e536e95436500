// Command-line tests for the `genlink` binary.
//
// Each test writes its inputs to a unique temp path, runs the binary, and
// checks stdout, stderr and the exit code.

use std::path::PathBuf;
use std::process::{Command, Output};
use std::sync::atomic::{AtomicUsize, Ordering};

fn genlink_binary() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_genlink"))
}

static COUNTER: AtomicUsize = AtomicUsize::new(0);

fn temp_file(prefix: &str, contents: &str) -> PathBuf {
    let n = COUNTER.fetch_add(1, Ordering::Relaxed);
    let path = std::env::temp_dir().join(format!(
        "genlink_cli_{}_{}_{}.json",
        prefix,
        std::process::id(),
        n
    ));
    std::fs::write(&path, contents).expect("failed to write temp file");
    path
}

fn run(args: &[&str]) -> Output {
    Command::new(genlink_binary())
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run genlink")
}

fn stdout(output: &Output) -> String {
    String::from_utf8(output.stdout.clone()).expect("non-UTF8 output")
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

const MANIFEST: &str = r#"{
    "unit": "agg_sum",
    "suffix": "v1",
    "bindings": [
        { "id": 42, "target": "add_i64" },
        { "id": 3, "target": "concat_str" }
    ],
    "call_sites": [
        { "name": "sum", "binding": 42,
          "signature": { "params": ["i64", "i64"], "ret": "i64" },
          "args": [40, 2] },
        { "name": "label", "binding": 3,
          "signature": { "params": ["str", "str"], "ret": "str" },
          "args": ["gen", "link"] }
    ]
}"#;

#[test]
fn name_allocates_sequential_names() {
    let output = run(&["name", "agg sum", "--suffix", "v1", "-n", "3"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(
        stdout(&output),
        "genlink.$gen.agg_sum_v1_1\ngenlink.$gen.agg_sum_v1_2\ngenlink.$gen.agg_sum_v1_3\n"
    );
}

#[test]
fn name_honours_config() {
    let config = temp_file("config", r#"{"namespace": "acme.jit", "placeholder": "$"}"#);
    let output = run(&[
        "name",
        "a-b",
        "--suffix",
        "s",
        "--config",
        config.to_str().unwrap(),
    ]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(stdout(&output), "acme.jit.a$b_s_1\n");
    std::fs::remove_file(&config).ok();
}

#[test]
fn invalid_config_exits_2() {
    let config = temp_file("bad_config", r#"{"placeholder": "-"}"#);
    let output = run(&["name", "x", "--config", config.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(2));
    assert!(
        stderr(&output).contains("invalid naming config field 'placeholder'"),
        "stderr: {}",
        stderr(&output)
    );
    std::fs::remove_file(&config).ok();
}

#[test]
fn link_executes_call_sites() {
    let manifest = temp_file("link", MANIFEST);
    let output = run(&["link", manifest.to_str().unwrap()]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let out = stdout(&output);
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines[0], "unit genlink.$gen.agg_sum_v1_1");
    assert!(lines[1].starts_with("registry 2 binding(s), fingerprint "));
    assert_eq!(lines[2], "#0 sum(40, 2) = 42");
    assert_eq!(lines[3], "#1 label(\"gen\", \"link\") = \"genlink\"");
    std::fs::remove_file(&manifest).ok();
}

#[test]
fn link_reports_missing_binding_and_exits_1() {
    let manifest = temp_file(
        "missing",
        r#"{
            "unit": "u",
            "suffix": "s",
            "bindings": [{ "id": 42, "target": "add_i64" }],
            "call_sites": [
                { "name": "lost", "binding": 99,
                  "signature": { "params": ["i64", "i64"], "ret": "i64" },
                  "args": [1, 2] },
                { "name": "sum", "binding": 42,
                  "signature": { "params": ["i64", "i64"], "ret": "i64" },
                  "args": [1, 2] }
            ]
        }"#,
    );
    let output = run(&["link", manifest.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(1));

    let err = stderr(&output);
    assert!(
        err.contains("binding 99 for call site lost(i64, i64) -> i64 not found"),
        "stderr: {}",
        err
    );
    assert!(err.contains("hint:"), "stderr: {}", err);
    // The other call site still runs.
    assert!(stdout(&output).contains("#1 sum(1, 2) = 3"));
    std::fs::remove_file(&manifest).ok();
}

#[test]
fn dump_prints_unit() {
    let manifest = temp_file("dump", MANIFEST);
    let output = run(&["dump", manifest.to_str().unwrap()]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(
        stdout(&output),
        "unit genlink.$gen.agg_sum_v1_1 {\n    #0 sum(i64, i64) -> i64 -> binding 42\n    #1 label(str, str) -> str -> binding 3\n}\n"
    );
    std::fs::remove_file(&manifest).ok();
}

#[test]
fn missing_manifest_exits_2() {
    let output = run(&["link", "/nonexistent/genlink_manifest.json"]);
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("genlink_manifest.json"));
}
