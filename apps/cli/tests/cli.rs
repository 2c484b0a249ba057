use std::fs;
use std::path::PathBuf;

use assert_cmd::Command;
use predicates::str::contains;
use serde_json::Value;
use tempfile::TempDir;

/// Isolated home directory plus the deterministic mock-source flags.
struct TestEnv {
    _tmp: TempDir,
    home: PathBuf,
}

impl TestEnv {
    fn new() -> Self {
        let tmp = TempDir::new().expect("create temp dir");
        let home = tmp.path().join("home");
        fs::create_dir_all(&home).expect("create isolated home");
        Self { _tmp: tmp, home }
    }

    fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("rankscope").expect("rankscope binary");
        cmd.env("HOME", &self.home)
            .env_remove("RUST_LOG")
            .args(["--seed", "1", "--no-latency"]);
        cmd
    }

    fn run_json(&self, args: &[&str]) -> Value {
        let out = self
            .cmd()
            .arg("--json")
            .args(args)
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();
        serde_json::from_slice(&out).expect("valid json output")
    }

    fn write_config(&self, content: &str) {
        let dir = self.home.join(".rankscope");
        fs::create_dir_all(&dir).expect("create config dir");
        fs::write(dir.join("rankscope.toml"), content).expect("write config");
    }
}

#[test]
fn keywords_export_writes_header_and_every_row() {
    let env = TestEnv::new();
    let out_dir = env.home.join("exports");

    env.cmd()
        .args(["keywords", "https://example.com/", "--export"])
        .arg(&out_dir)
        .assert()
        .success()
        .stdout(contains("Keyword Rankings for example.com"))
        .stdout(contains("Exported:"));

    let csv = fs::read_to_string(out_dir.join("example.com-keywords.csv")).expect("csv written");
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines[0], "Keyword,Position,URL,Search Volume,Trend,Change");
    assert_eq!(lines.len(), 51);
    assert!(!csv.ends_with('\n'));
}

#[test]
fn top_filter_limits_rows_and_summary() {
    let env = TestEnv::new();
    let json = env.run_json(&["keywords", "example.com", "--top", "10"]);

    let rows = json["keywords"].as_array().expect("keyword rows");
    assert!(rows.iter().all(|r| r["position"].as_u64().unwrap() <= 10));
    assert_eq!(json["summary"]["count"].as_u64().unwrap() as usize, rows.len());
    assert_eq!(json["summary"]["top10Count"], json["summary"]["count"]);
    assert_eq!(json["totalKeywords"], 50);
    assert_eq!(json["view"]["maxPosition"], 10);
}

#[test]
fn volume_sort_is_descending() {
    let env = TestEnv::new();
    let json = env.run_json(&["keywords", "example.com", "--sort", "volume"]);

    let volumes: Vec<u64> = json["keywords"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["searchVolume"].as_u64().unwrap())
        .collect();
    assert_eq!(volumes.len(), 50);
    assert!(volumes.windows(2).all(|w| w[0] >= w[1]));
}

#[test]
fn seeded_runs_are_reproducible() {
    let env = TestEnv::new();
    let first = env.run_json(&["keywords", "example.com"]);
    let second = env.run_json(&["keywords", "example.com"]);
    assert_eq!(first["keywords"], second["keywords"]);
}

#[test]
fn ai_select_expands_one_engine() {
    let env = TestEnv::new();
    let json = env.run_json(&["ai", "example.com", "--select", "chatgpt"]);

    assert_eq!(json["expansion"]["state"], "expanded");
    assert_eq!(json["expansion"]["engine"], "ChatGPT");
    assert_eq!(json["results"].as_array().unwrap().len(), 4);
    assert_eq!(json["summary"]["totalEngines"], 4);

    let json = env.run_json(&["ai", "example.com", "--select", "Claude", "--select", "claude"]);
    assert_eq!(json["expansion"]["state"], "collapsed");
}

#[test]
fn unknown_engine_is_rejected() {
    let env = TestEnv::new();
    env.cmd()
        .args(["ai", "example.com", "--select", "bing"])
        .assert()
        .failure()
        .stderr(contains("unknown engine"));
}

#[test]
fn empty_domain_fails() {
    let env = TestEnv::new();
    env.cmd()
        .args(["keywords", "https://"])
        .assert()
        .failure()
        .stderr(contains("domain is required"));
}

#[test]
fn analyze_renders_both_sections() {
    let env = TestEnv::new();
    env.cmd()
        .args(["analyze", "example.com", "--top", "50"])
        .assert()
        .success()
        .stdout(contains("Keyword Rankings for example.com"))
        .stdout(contains("AI Search Visibility for example.com"))
        .stdout(contains("Engines Visible"));
}

#[test]
fn unreachable_http_source_reports_generic_error() {
    let env = TestEnv::new();
    env.cmd()
        .args(["--source", "http", "--base-url", "http://127.0.0.1:9"])
        .args(["keywords", "example.com"])
        .assert()
        .failure()
        .stderr(contains("Error loading keyword data"))
        .stderr(contains("Please try again later"));
}

#[test]
fn config_init_then_show() {
    let env = TestEnv::new();
    env.cmd()
        .args(["config", "init"])
        .assert()
        .success()
        .stdout(contains("Config initialized at:"));
    assert!(env.home.join(".rankscope/rankscope.toml").exists());

    env.cmd()
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(contains("kind = \"mock\""))
        .stdout(contains("seed = 1"));
}

#[test]
fn config_defaults_apply_until_overridden() {
    let env = TestEnv::new();
    env.write_config("[defaults]\nmax_position = 20\nsort = \"volume\"\nregion = \"UK\"\n");

    let json = env.run_json(&["keywords", "example.com"]);
    assert_eq!(json["view"]["maxPosition"], 20);
    assert_eq!(json["view"]["sort"], "volume");
    assert_eq!(json["region"], "UK");

    let json = env.run_json(&["keywords", "example.com", "--top", "50", "--region", "ca"]);
    assert_eq!(json["view"]["maxPosition"], 50);
    assert_eq!(json["region"], "CA");
}

#[test]
fn export_of_domain_with_path_lands_in_target_dir() {
    let env = TestEnv::new();
    let out_dir = env.home.join("exports");

    env.cmd()
        .args(["keywords", "https://example.com/blog/", "--export"])
        .arg(&out_dir)
        .assert()
        .success();

    let csv = fs::read_to_string(out_dir.join("example.com_blog-keywords.csv")).expect("csv written");
    assert_eq!(csv.lines().count(), 51);
}
