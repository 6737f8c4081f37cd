// CLI flows for dictctl: convert between formats, set/get/list on a config file.
use std::{
    io::Write,
    process::{Command, Stdio},
};

use serde_json::Value;

fn cmd() -> Command {
    Command::new(env!("CARGO_BIN_EXE_dictctl"))
}

fn convert(from: &str, to: &str, input: &str) -> std::process::Output {
    let mut child = cmd()
        .args(["convert", "--from", from, "--to", to])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("spawn");
    child
        .stdin
        .take()
        .expect("stdin")
        .write_all(input.as_bytes())
        .expect("write stdin");
    child.wait_with_output().expect("output")
}

#[test]
fn literal_to_json() {
    let out = convert("literal", "json", "{'x': '1', 'n': 2, 'ok': True}");
    assert!(out.status.success());
    let json: Value = serde_json::from_slice(&out.stdout).expect("json");
    assert_eq!(json["x"], "1");
    assert_eq!(json["n"], 2);
    assert_eq!(json["ok"], true);
}

#[test]
fn persist_to_literal() {
    let out = convert("persist", "literal", r#"{"username": "alex"}"#);
    assert!(out.status.success());
    assert_eq!(String::from_utf8_lossy(&out.stdout).trim(), "{'username': 'alex'}");
}

#[test]
fn json_to_display() {
    let out = convert("json", "display", r#"{"a": 1}"#);
    assert!(out.status.success());
    assert_eq!(String::from_utf8_lossy(&out.stdout).trim(), "{a=1}");
}

#[test]
fn malformed_input_fails() {
    let out = convert("literal", "json", "'x': '1'");
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("curly braces"));

    let out = convert("display", "json", "{a=1}");
    assert!(!out.status.success());
}

#[test]
fn set_get_list_flow() {
    let temp = tempfile::tempdir().expect("tempdir");
    let config = temp.path().join("config.json");
    let config = config.to_str().unwrap();

    for (key, value) in [("role", "admin"), ("username", "alex")] {
        let set = cmd()
            .args(["set", "--config", config, "--path", "players.alex", key, value])
            .output()
            .expect("set");
        assert!(set.status.success());
    }

    let get = cmd()
        .args(["get", "--config", config, "--path", "players.alex", "role"])
        .output()
        .expect("get");
    assert!(get.status.success());
    assert_eq!(String::from_utf8_lossy(&get.stdout).trim(), "admin");

    let missing = cmd()
        .args(["get", "--config", config, "--path", "players.alex", "email"])
        .output()
        .expect("get");
    assert!(!missing.status.success());

    let list = cmd().args(["list", "--config", config]).output().expect("list");
    assert!(list.status.success());
    assert_eq!(String::from_utf8_lossy(&list.stdout).trim(), "players.alex");

    let doc: Value = serde_json::from_str(&std::fs::read_to_string(config).unwrap()).unwrap();
    let stored = doc["players"]["alex"]["json"].as_str().expect("persisted string");
    assert!(stored.contains(r#""role": "admin""#));
}
