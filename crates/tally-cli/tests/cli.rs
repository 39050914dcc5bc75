use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const WALMART: &str = "WALMART SUPERCENTER\nmilk 3.48\nTotal: $13.64\n2024-01-15";
const SHELL_JAN: &str = "Shell station 7\nfuel total $45.00\n01/20/2024";
const SHELL_FEB: &str = "SHELL\ntotal: $38.10\n2024-02-03";
const STARBUCKS: &str = "STARBUCKS #221\nlatte $6.25\n2024-02-10";

/// A scratch workspace with its own config dir and receipt store.
struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn store(&self) -> PathBuf {
        self.path("receipts.json")
    }

    fn write(&self, name: &str, content: &str) -> PathBuf {
        let path = self.path(name);
        fs::write(&path, content).unwrap();
        path
    }

    fn tally(&self) -> Command {
        let mut cmd = Command::cargo_bin("tally").unwrap();
        cmd.env("XDG_CONFIG_HOME", self.path("config-home"))
            .env("HOME", self.dir.path())
            .env_remove("RUST_LOG")
            .arg("--store")
            .arg(self.store());
        cmd
    }

    fn process(&self, name: &str, content: &str) {
        let path = self.write(name, content);
        self.tally().arg("process").arg(path).assert().success();
    }

    fn seeded() -> Self {
        let ws = Self::new();
        ws.process("walmart.txt", WALMART);
        ws.process("shell-1.txt", SHELL_JAN);
        ws.process("shell-2.txt", SHELL_FEB);
        ws.process("coffee.txt", STARBUCKS);
        ws
    }

    fn json(&self, args: &[&str]) -> serde_json::Value {
        let output = self.tally().args(args).args(["--format", "json"]).output().unwrap();
        assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
        serde_json::from_slice(&output.stdout).unwrap()
    }
}

fn vendors(receipts: &serde_json::Value) -> Vec<String> {
    receipts
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["vendor"].as_str().unwrap().to_string())
        .collect()
}

fn read(path: &Path) -> String {
    fs::read_to_string(path).unwrap()
}

#[test]
fn test_help_lists_commands() {
    Command::cargo_bin("tally")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("process"))
        .stdout(predicate::str::contains("dashboard"))
        .stdout(predicate::str::contains("export"));
}

#[test]
fn test_process_stores_receipt() {
    let ws = Workspace::new();
    let path = ws.write("walmart.txt", WALMART);

    ws.tally()
        .arg("process")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Stored receipt #1"))
        .stdout(predicate::str::contains("Walmart"))
        .stdout(predicate::str::contains("13.64"))
        .stdout(predicate::str::contains("Groceries"));

    assert!(ws.store().exists());
    assert!(read(&ws.store()).contains("walmart.txt"));
}

#[test]
fn test_process_json_outcome() {
    let ws = Workspace::new();
    let path = ws.write("shell.txt", SHELL_JAN);

    let output = ws
        .tally()
        .args(["process", "--format", "json"])
        .arg(&path)
        .output()
        .unwrap();
    assert!(output.status.success());

    let outcome: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(outcome["success"], true);
    assert_eq!(outcome["receipt_id"], 1);
    assert_eq!(outcome["extracted"]["vendor"], "Shell");
    assert_eq!(outcome["extracted"]["category"], "Gas");
    assert_eq!(outcome["extracted"]["date"], "2024-01-20");
}

#[test]
fn test_process_duplicate_fails() {
    let ws = Workspace::new();
    let first = ws.write("a.txt", WALMART);
    let second = ws.write("b.txt", WALMART);

    ws.tally().arg("process").arg(&first).assert().success();
    ws.tally()
        .arg("process")
        .arg(&second)
        .assert()
        .failure()
        .stderr(predicate::str::contains("duplicate of receipt 1"));
}

#[test]
fn test_process_dry_run_does_not_store() {
    let ws = Workspace::new();
    let path = ws.write("walmart.txt", WALMART);

    ws.tally()
        .args(["process", "--dry-run"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Extracted walmart.txt"));

    assert!(!ws.store().exists());
}

#[test]
fn test_process_missing_file() {
    let ws = Workspace::new();
    ws.tally()
        .args(["process", "no-such-file.txt"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Input file not found"));
}

#[test]
fn test_process_rejected_extension() {
    let ws = Workspace::new();
    let path = ws.write("notes.docx", "KROGER $5.00");

    ws.tally()
        .arg("process")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("not supported"));
}

#[test]
fn test_batch_with_summary() {
    let ws = Workspace::new();
    let inbox = ws.path("inbox");
    fs::create_dir(&inbox).unwrap();
    fs::write(inbox.join("a.txt"), WALMART).unwrap();
    fs::write(inbox.join("b.txt"), STARBUCKS).unwrap();
    fs::write(inbox.join("c.txt"), "").unwrap();
    fs::write(inbox.join("notes.docx"), "not a receipt").unwrap();

    let summary = ws.path("summary.csv");
    let pattern = format!("{}/*", inbox.display());

    ws.tally()
        .args(["batch", &pattern, "--summary"])
        .arg(&summary)
        .assert()
        .success()
        .stdout(predicate::str::contains("Found 4 files"))
        .stdout(predicate::str::contains("2 successful, 2 failed"));

    let csv = read(&summary);
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 5);
    assert!(lines[0].starts_with("filename,status,receipt_id,vendor"));
    assert!(csv.contains("a.txt,success,1,Walmart,13.64,2024-01-15,Groceries"));
    assert!(csv.contains("c.txt,error"));
    assert!(csv.contains("file is empty"));
    assert!(lines[4].starts_with("notes.docx,error"));
    assert!(lines[4].contains("not supported"));
}

#[test]
fn test_batch_keeps_going_after_failure() {
    let ws = Workspace::new();
    let inbox = ws.path("inbox");
    fs::create_dir(&inbox).unwrap();
    fs::write(inbox.join("a.txt"), "").unwrap();
    fs::write(inbox.join("b.txt"), WALMART).unwrap();

    let outcomes = ws.json(&["batch", &format!("{}/*.txt", inbox.display())]);
    let outcomes = outcomes.as_array().unwrap();
    assert_eq!(outcomes.len(), 2);
    assert_eq!(outcomes[0]["filename"], "a.txt");
    assert_eq!(outcomes[0]["success"], false);
    assert_eq!(outcomes[1]["filename"], "b.txt");
    assert_eq!(outcomes[1]["success"], true);

    assert_eq!(vendors(&ws.json(&["list"])), vec!["Walmart"]);
}

#[test]
fn test_batch_no_matches() {
    let ws = Workspace::new();
    ws.tally()
        .args(["batch", &format!("{}/*.pdf", ws.dir.path().display())])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No matching files"));
}

#[test]
fn test_search_ranks_matches() {
    let ws = Workspace::seeded();

    let hits = ws.json(&["search", "shell"]);
    assert_eq!(vendors(&hits), vec!["Shell", "Shell"]);
    assert!(hits[0]["relevance_score"].as_u64().unwrap() >= 3);

    let all = ws.json(&["search"]);
    assert_eq!(all.as_array().unwrap().len(), 4);
    assert!(all[0].get("relevance_score").is_none());

    let none = ws.json(&["search", "nothing-matches"]);
    assert!(none.as_array().unwrap().is_empty());
}

#[test]
fn test_list_newest_first_and_filters() {
    let ws = Workspace::seeded();

    let all = ws.json(&["list"]);
    assert_eq!(vendors(&all), vec!["Starbucks", "Shell", "Shell", "Walmart"]);

    let gas = ws.json(&["list", "--category", "gas"]);
    assert_eq!(gas.as_array().unwrap().len(), 2);

    let february = ws.json(&["list", "--from", "2024-02-01", "--to", "2024-02-28"]);
    assert_eq!(vendors(&february), vec!["Starbucks", "Shell"]);

    let page = ws.json(&["list", "--limit", "1", "--offset", "1"]);
    assert_eq!(page[0]["amount"], "38.10");
}

#[test]
fn test_list_sorted() {
    let ws = Workspace::seeded();

    let ascending = ws.json(&["list", "--sort", "amount", "--asc"]);
    let amounts: Vec<&str> = ascending
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["amount"].as_str().unwrap())
        .collect();
    assert_eq!(amounts, vec!["6.25", "13.64", "38.10", "45.00"]);

    let by_vendor = ws.json(&["list", "--sort", "vendor"]);
    assert_eq!(vendors(&by_vendor), vec!["Walmart", "Starbucks", "Shell", "Shell"]);

    ws.tally()
        .args(["list", "--sort", "price"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown field: price"));
}

#[test]
fn test_insights() {
    let ws = Workspace::seeded();

    let categories = ws.json(&["insights", "category"]);
    assert_eq!(categories["status"], "data");
    assert_eq!(categories["total_categories"], 3);
    assert_eq!(categories["category_insights"][0]["category"], "Gas");
    assert_eq!(categories["category_insights"][0]["total_spent"], "83.10");

    let vendors = ws.json(&["insights", "vendor"]);
    assert_eq!(vendors["vendor_insights"][0]["vendor"], "Shell");

    let top = ws.json(&["insights", "top", "-n", "2"]);
    assert_eq!(top.as_array().unwrap().len(), 2);
    assert_eq!(top[1]["vendor"], "Walmart");
}

#[test]
fn test_spending_periods() {
    let ws = Workspace::seeded();

    let monthly = ws.json(&["spending"]);
    assert_eq!(monthly["status"], "data");
    assert_eq!(monthly["2024-01"], "58.64");
    assert_eq!(monthly["2024-02"], "44.35");

    let weekly = ws.json(&["spending", "--period", "week"]);
    assert_eq!(weekly["2024-01-15/2024-01-21"], "58.64");

    let summary = ws.json(&["spending", "--summary"]);
    assert_eq!(summary["total_receipts"], 4);
    assert_eq!(summary["total_spent"], "102.99");
    assert_eq!(summary["earliest_date"], "2024-01-15");

    let currencies = ws.json(&["spending", "--by-currency"]);
    assert_eq!(currencies["USD"]["count"], 4);
}

#[test]
fn test_spending_rejects_unknown_period() {
    let ws = Workspace::new();
    ws.tally()
        .args(["spending", "--period", "fortnight"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown period"));
}

#[test]
fn test_empty_store_reports_no_data() {
    let ws = Workspace::new();

    assert_eq!(ws.json(&["spending"])["status"], "no_data");
    assert_eq!(ws.json(&["analytics"])["status"], "no_data");

    let summary = ws.json(&["spending", "--summary"]);
    assert_eq!(summary["status"], "data");
    assert_eq!(summary["total_receipts"], 0);

    ws.tally()
        .arg("insights")
        .assert()
        .success()
        .stdout(predicate::str::contains("No receipts stored yet"));
}

#[test]
fn test_analytics_and_dashboard() {
    let ws = Workspace::seeded();

    let analytics = ws.json(&["analytics"]);
    assert_eq!(analytics["total_receipts"], 4);
    assert_eq!(analytics["most_common_category"], "Gas");
    assert_eq!(analytics["monthly_spending"]["2024-01"], "58.64");

    let dashboard = ws.json(&["dashboard"]);
    assert_eq!(dashboard["summary"]["total_receipts"], 4);
    assert_eq!(dashboard["recent_receipts"][0]["vendor"], "Starbucks");
    assert_eq!(dashboard["top_vendors"][0]["vendor"], "Shell");

    ws.tally()
        .arg("dashboard")
        .assert()
        .success()
        .stdout(predicate::str::contains("Top vendors"))
        .stdout(predicate::str::contains("Recent receipts"));
}

#[test]
fn test_correct_receipt() {
    let ws = Workspace::seeded();

    ws.tally()
        .args(["correct", "4", "--vendor", "Blue Bottle", "--category", "Coffee"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Updated receipt #4"));

    let coffee = ws.json(&["list", "--category", "coffee"]);
    assert_eq!(vendors(&coffee), vec!["Blue Bottle"]);

    ws.tally()
        .args(["correct", "4", "--amount=-3"])
        .assert()
        .failure();

    ws.tally()
        .args(["correct", "4"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Nothing to correct"));

    ws.tally()
        .args(["correct", "99", "--vendor", "X"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn test_delete_receipts() {
    let ws = Workspace::seeded();

    ws.tally()
        .args(["delete", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Deleted receipt #1"));
    assert_eq!(ws.json(&["list"]).as_array().unwrap().len(), 3);

    ws.tally().args(["delete", "1"]).assert().failure();

    ws.tally().args(["delete", "--all"]).assert().success();
    assert!(ws.json(&["list"]).as_array().unwrap().is_empty());
}

#[test]
fn test_export_json_and_csv() {
    let ws = Workspace::seeded();

    let output = ws.tally().args(["export"]).output().unwrap();
    assert!(output.status.success());
    let doc: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(doc["export_info"]["total_receipts"], 4);
    assert_eq!(doc["export_info"]["export_version"], "1.0");
    assert_eq!(doc["summary_statistics"]["total_amount"], "102.99");

    let csv_path = ws.path("export.csv");
    ws.tally()
        .args(["export", "--format", "csv", "--output"])
        .arg(&csv_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Exported 4 receipts"));

    let csv = read(&csv_path);
    assert!(csv.starts_with("filename,vendor,amount,currency,date,category,language,upload_date"));
    assert!(csv.contains("coffee.txt,Starbucks,6.25,USD,2024-02-10,Food,en,"));
    assert_eq!(csv.lines().count(), 5);
}

#[test]
fn test_config_init_get_set() {
    let ws = Workspace::new();
    let config = ws.path("tally.json");

    ws.tally()
        .arg("--config")
        .arg(&config)
        .args(["config", "init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created configuration file"));

    ws.tally()
        .arg("--config")
        .arg(&config)
        .args(["config", "init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));

    ws.tally()
        .arg("--config")
        .arg(&config)
        .args(["config", "get", "analytics.search_limit"])
        .assert()
        .success()
        .stdout(predicate::str::contains("50"));

    ws.tally()
        .arg("--config")
        .arg(&config)
        .args(["config", "set", "defaults.currency", "EUR"])
        .assert()
        .success();
    assert!(read(&config).contains("\"EUR\""));

    ws.tally()
        .arg("--config")
        .arg(&config)
        .args(["config", "set", "analytics.search_limit", "\"many\""])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid value"));

    ws.tally()
        .arg("--config")
        .arg(&config)
        .args(["config", "get", "analytics.nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Configuration key not found"));
}

#[test]
fn test_config_applies_defaults() {
    let ws = Workspace::new();
    let config = ws.write("tally.json", r#"{"defaults": {"currency": "EUR"}}"#);
    let receipt = ws.write("walmart.txt", WALMART);

    ws.tally()
        .arg("--config")
        .arg(&config)
        .arg("process")
        .arg(&receipt)
        .assert()
        .success();

    let listed = ws.json(&["list"]);
    assert_eq!(listed[0]["currency"], "EUR");
}
