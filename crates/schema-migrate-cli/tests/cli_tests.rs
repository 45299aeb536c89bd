//! CLI integration tests for schema-migrate.
//!
//! These tests verify command-line argument parsing, help output,
//! generated output and exit codes for various error conditions.

use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Get a command for the schema-migrate binary.
fn cmd() -> Command {
    Command::cargo_bin("schema-migrate").unwrap()
}

const CONFIG: &str = "\
source:
  type: mssql
  host: sql.internal
  database: Sales
  user: sa
  password: secret
target:
  type: postgres
  database: sales
";

const SCHEMA: &str = r#"{
    "databaseType": "mssql",
    "tables": [{
        "name": "orders",
        "schema": "dbo",
        "columns": [
            {"name": "id", "dataType": "int", "isNullable": false, "isIdentity": true},
            {"name": "total", "dataType": "decimal"},
            {"name": "created", "dataType": "datetime"}
        ],
        "primaryKey": ["id"]
    }]
}"#;

/// Temp directory holding a config and a schema analysis.
struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new(config: &str) -> Self {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("config.yaml"), config).unwrap();
        std::fs::write(dir.path().join("schema.json"), SCHEMA).unwrap();
        Self { dir }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn cmd(&self) -> Command {
        let mut cmd = cmd();
        cmd.arg("--config").arg(self.path("config.yaml"));
        cmd
    }
}

fn arg(path: &Path) -> &str {
    path.to_str().unwrap()
}

// =============================================================================
// Help and Version Tests
// =============================================================================

#[test]
fn test_help_shows_all_commands() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("plan"))
        .stdout(predicate::str::contains("script"))
        .stdout(predicate::str::contains("explain"))
        .stdout(predicate::str::contains("map-type"))
        .stdout(predicate::str::contains("dialects"));
}

#[test]
fn test_script_subcommand_help() {
    cmd()
        .args(["script", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--schema"))
        .stdout(predicate::str::contains("--plan"))
        .stdout(predicate::str::contains("--output"));
}

#[test]
fn test_version_flag() {
    cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("schema-migrate"));
}

// =============================================================================
// Global Flags Tests
// =============================================================================

#[test]
fn test_log_format_flag_exists() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--log-format"))
        .stdout(predicate::str::contains("[default: text]"));
}

#[test]
fn test_verbosity_flag_exists() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--verbosity"))
        .stdout(predicate::str::contains("[default: info]"));
}

#[test]
fn test_config_default_path() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("[default: config.yaml]"));
}

#[test]
fn test_short_config_flag() {
    cmd()
        .args(["-c", "some_config.yaml", "--help"])
        .assert()
        .success();
}

#[test]
fn test_no_subcommand_shows_help() {
    cmd()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage:"));
}

// =============================================================================
// Exit Code Tests
// =============================================================================

#[test]
fn test_missing_config_exits_with_code_7() {
    // Missing file is an IO error (code 7), not config error (code 1)
    cmd()
        .args(["--config", "nonexistent_config_file.yaml", "map-type", "int"])
        .assert()
        .code(7);
}

#[test]
fn test_invalid_yaml_exits_with_code_1() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "invalid: yaml: content: [").unwrap();

    cmd()
        .args(["--config", arg(file.path()), "map-type", "int"])
        .assert()
        .code(1);
}

#[test]
fn test_empty_config_exits_with_code_1() {
    let file = tempfile::NamedTempFile::new().unwrap();

    cmd()
        .args(["--config", arg(file.path()), "map-type", "int"])
        .assert()
        .code(1);
}

#[test]
fn test_missing_target_exits_with_code_1() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "source:").unwrap();
    writeln!(file, "  type: mssql").unwrap();

    cmd()
        .args(["--config", arg(file.path()), "map-type", "int"])
        .assert()
        .code(1);
}

#[test]
fn test_unknown_target_dialect_exits_with_code_1() {
    let ws = Workspace::new(&CONFIG.replace("type: postgres", "type: db2"));
    ws.cmd()
        .args(["map-type", "int"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("db2"));
}

#[test]
fn test_missing_schema_file_exits_with_code_7() {
    let ws = Workspace::new(CONFIG);
    ws.cmd()
        .args(["plan", "--schema", arg(&ws.path("missing.json"))])
        .assert()
        .code(7);
}

#[test]
fn test_malformed_schema_exits_with_code_2() {
    let ws = Workspace::new(CONFIG);
    std::fs::write(ws.path("bad.json"), "{ not json").unwrap();
    ws.cmd()
        .args(["plan", "--schema", arg(&ws.path("bad.json"))])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("JSON error"));
}

// =============================================================================
// Command Tests
// =============================================================================

#[test]
fn test_dialects_needs_no_config() {
    let dir = tempfile::tempdir().unwrap();
    cmd()
        .current_dir(dir.path())
        .arg("dialects")
        .assert()
        .success()
        .stdout("mssql\nmysql\npostgres\n");
}

#[test]
fn test_map_type() {
    let ws = Workspace::new(CONFIG);
    ws.cmd()
        .args(["map-type", "datetime"])
        .assert()
        .success()
        .stdout("timestamp\n");

    ws.cmd()
        .args(["map-type", "tinyint(1)", "--source-dialect", "mysql"])
        .assert()
        .success()
        .stdout("boolean\n");
}

#[test]
fn test_map_type_unmapped_warns() {
    let ws = Workspace::new(CONFIG);
    ws.cmd()
        .args(["map-type", "sysname"])
        .assert()
        .success()
        .stdout("text\n")
        .stderr(predicate::str::contains("warning: Unmapped source type 'sysname'"));
}

#[test]
fn test_script_to_stdout() {
    let ws = Workspace::new(CONFIG);
    ws.cmd()
        .args(["--verbosity", "error", "script", "--schema", arg(&ws.path("schema.json"))])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("-- Migration script: mssql to postgres"))
        .stdout(predicate::str::contains("id integer GENERATED ALWAYS AS IDENTITY NOT NULL"))
        .stdout(predicate::str::contains("total numeric"))
        .stdout(predicate::str::contains("CAST(created AS timestamp) AS created"));
}

#[test]
fn test_plan_then_script_from_plan() {
    let ws = Workspace::new(CONFIG);
    let plan_path = ws.path("plan.json");
    ws.cmd()
        .args([
            "plan",
            "--schema",
            arg(&ws.path("schema.json")),
            "--output",
            arg(&plan_path),
        ])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    let plan: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&plan_path).unwrap()).unwrap();
    assert_eq!(plan["tableMappings"][0]["sourceTable"], "dbo.orders");
    assert_eq!(
        plan["tableMappings"][0]["columnMappings"][2]["transformation"],
        "CAST(created AS timestamp)"
    );

    // Rename the target table and script from the edited plan.
    let edited = std::fs::read_to_string(&plan_path)
        .unwrap()
        .replace("\"targetTable\": \"orders\"", "\"targetTable\": \"archive.orders\"");
    std::fs::write(&plan_path, edited).unwrap();

    let sql_path = ws.path("migration.sql");
    ws.cmd()
        .args([
            "script",
            "--schema",
            arg(&ws.path("schema.json")),
            "--plan",
            arg(&plan_path),
            "--output",
            arg(&sql_path),
        ])
        .assert()
        .success();

    let sql = std::fs::read_to_string(&sql_path).unwrap();
    assert!(sql.contains("CREATE SCHEMA IF NOT EXISTS archive;"));
    assert!(sql.contains("CREATE TABLE archive.orders ("));
    assert!(sql.contains("INSERT INTO archive.orders (id, total, created)"));
}

#[test]
fn test_explain_without_generator_uses_summary() {
    let ws = Workspace::new(CONFIG);
    let plan_path = ws.path("plan.json");
    ws.cmd()
        .args([
            "plan",
            "--schema",
            arg(&ws.path("schema.json")),
            "--output",
            arg(&plan_path),
        ])
        .assert()
        .success();

    ws.cmd()
        .args(["explain", "--plan", arg(&plan_path)])
        .assert()
        .success()
        .stdout(predicate::str::starts_with(
            "This plan migrates 1 table(s), 0 view(s), 0 stored procedure(s) and 0 trigger(s).",
        ));
}

#[test]
fn test_logs_go_to_stderr() {
    let ws = Workspace::new(CONFIG);
    ws.cmd()
        .args(["--log-format", "json", "map-type", "int"])
        .assert()
        .success()
        .stdout("integer\n")
        .stderr(predicate::str::contains("Loaded configuration"));
}
