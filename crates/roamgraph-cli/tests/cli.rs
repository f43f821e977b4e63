use assert_cmd::Command;
use predicates::prelude::*;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const TRIANGLE: &str = r#"{
    "nodes": [
        { "id": 0, "x": 100, "y": 100 },
        { "id": 1, "x": 300, "y": 100 },
        { "id": 2, "x": 200, "y": 300 }
    ],
    "edges": [
        { "id": 0, "leftNodeID": 0, "rightNodeID": 1 },
        { "id": 1, "leftNodeID": 1, "rightNodeID": 2 },
        { "id": 2, "leftNodeID": 2, "rightNodeID": 0 }
    ]
}"#;

struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    fn graph(&self, name: &str, json: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        std::fs::write(&path, json).unwrap();
        path
    }

    fn config_path(&self) -> PathBuf {
        self.dir.path().join("config").join("config.toml")
    }

    fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("roamgraph").unwrap();
        cmd.env("ROAMGRAPH_CONFIG", self.config_path())
            .env_remove("RUST_LOG");
        cmd
    }
}

fn read_json(path: &Path) -> serde_json::Value {
    serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
}

#[test]
fn test_validate_reports_counts() {
    let ws = Workspace::new();
    let file = ws.graph("triangle.json", TRIANGLE);

    ws.cmd()
        .arg("validate")
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("valid (3 nodes, 3 edges)"));
}

#[test]
fn test_validate_lists_every_problem() {
    let ws = Workspace::new();
    let file = ws.graph(
        "broken.json",
        r#"{
            "nodes": [{ "id": 0, "x": 5000, "y": 0 }],
            "edges": [{ "id": 0, "leftNodeID": 0, "rightNodeID": 7 }]
        }"#,
    );

    ws.cmd()
        .arg("validate")
        .arg(&file)
        .assert()
        .failure()
        .stderr(predicate::str::contains("outside extent"))
        .stderr(predicate::str::contains("unknown node 7"))
        .stderr(predicate::str::contains("2 problem(s) found"));
}

#[test]
fn test_build_graph_from_scratch() {
    let ws = Workspace::new();
    let file = ws.dir.path().join("new.json");

    for (x, y) in [("10", "10"), ("50", "10")] {
        ws.cmd()
            .args(["node", "add"])
            .arg(&file)
            .args(["--x", x, "--y", y])
            .assert()
            .success();
    }
    ws.cmd()
        .args(["edge", "add"])
        .arg(&file)
        .args(["0", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("edge 0 added between 0 and 1"));

    let value = read_json(&file);
    assert_eq!(value["nodes"].as_array().unwrap().len(), 2);
    assert_eq!(value["edges"][0]["leftNodeID"], 0);
    assert_eq!(value["edges"][0]["rightNodeID"], 1);
}

#[test]
fn test_delete_node_cascades() {
    let ws = Workspace::new();
    let file = ws.graph("triangle.json", TRIANGLE);

    ws.cmd()
        .args(["node", "delete"])
        .arg(&file)
        .arg("0")
        .assert()
        .success()
        .stdout(predicate::str::contains("edge 0 deleted"))
        .stdout(predicate::str::contains("edge 2 deleted"))
        .stdout(predicate::str::contains("node 0 deleted"));

    let value = read_json(&file);
    assert_eq!(value["nodes"].as_array().unwrap().len(), 2);
    assert_eq!(value["edges"].as_array().unwrap().len(), 1);
}

#[test]
fn test_missing_edge_fails() {
    let ws = Workspace::new();
    let file = ws.graph("triangle.json", TRIANGLE);

    ws.cmd()
        .args(["edge", "delete"])
        .arg(&file)
        .arg("42")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Edge not found: 42"));
}

#[test]
fn test_node_outside_extent_rejected() {
    let ws = Workspace::new();
    let file = ws.graph("triangle.json", TRIANGLE);

    ws.cmd()
        .args(["node", "add"])
        .arg(&file)
        .args(["--x", "99999", "--y", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("outside extent"));
}

#[test]
fn test_nearest_node() {
    let ws = Workspace::new();
    let file = ws.graph("triangle.json", TRIANGLE);

    ws.cmd()
        .arg("nearest")
        .arg(&file)
        .args(["--x", "290", "--y", "120"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("node 1 at"));
}

#[test]
fn test_show_json_matches_wire_format() {
    let ws = Workspace::new();
    let file = ws.graph("triangle.json", TRIANGLE);

    let output = ws
        .cmd()
        .args(["--format", "json", "show"])
        .arg(&file)
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["edges"][2]["leftNodeID"], 2);
    assert_eq!(value["nodes"][1]["x"], 300.0);
}

#[test]
fn test_simulate_keeps_every_entity() {
    let ws = Workspace::new();
    let file = ws.graph("triangle.json", TRIANGLE);

    let output = ws
        .cmd()
        .args(["--format", "json", "simulate"])
        .arg(&file)
        .args(["--ticks", "400", "--seed", "7", "--entities", "3"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let entities = value.as_array().unwrap();
    assert_eq!(entities.len(), 3);
    for entity in entities {
        assert!(entity["x"].is_number());
        assert!(entity["colour"].as_str().unwrap().starts_with('#'));
    }
}

#[test]
fn test_config_set_and_get() {
    let ws = Workspace::new();

    ws.cmd()
        .args(["config", "set", "entity_count", "9"])
        .assert()
        .success();
    ws.cmd()
        .args(["config", "get", "entity_count"])
        .assert()
        .success()
        .stdout("9\n");
    ws.cmd()
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));

    assert!(ws.config_path().exists());
}

#[test]
fn test_config_init_refuses_to_overwrite() {
    let ws = Workspace::new();

    ws.cmd().args(["config", "init"]).assert().success();
    ws.cmd()
        .args(["config", "init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));
    ws.cmd()
        .args(["config", "init", "--force"])
        .assert()
        .success();
}

#[test]
fn test_config_list_marks_changed_values() {
    let ws = Workspace::new();

    ws.cmd()
        .args(["config", "set", "move_speed", "250"])
        .assert()
        .success();
    ws.cmd()
        .args(["config", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("250*"))
        .stdout(predicate::str::contains("extent"));

    let output = ws
        .cmd()
        .args(["--format", "json", "config", "list"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let rows: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let speed = rows
        .as_array()
        .unwrap()
        .iter()
        .find(|row| row["key"] == "move_speed")
        .unwrap();
    assert_eq!(speed["value"], "250");
    assert_eq!(speed["default"], "100");
    assert_eq!(speed["group"], "controller");
}

#[test]
fn test_config_reset_restores_default() {
    let ws = Workspace::new();

    ws.cmd().args(["config", "set", "seed", "11"]).assert().success();
    ws.cmd()
        .args(["config", "reset", "seed"])
        .assert()
        .success()
        .stdout("Reset seed to (unset)\n");
    ws.cmd()
        .args(["config", "get", "seed"])
        .assert()
        .success()
        .stdout("(unset)\n");
}

#[test]
fn test_config_unknown_key() {
    let ws = Workspace::new();

    ws.cmd()
        .args(["config", "get", "colour"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown config key"));
}

#[test]
fn test_completions() {
    let ws = Workspace::new();

    ws.cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("roamgraph"));
}
