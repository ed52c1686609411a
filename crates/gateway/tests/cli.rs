// ABOUTME: Integration tests for the euraxess-gateway binary's parse subcommand.
// ABOUTME: Runs the binary on temporary feed files and stdin and inspects the JSON output.

use std::io::Write;

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use tempfile::NamedTempFile;

const FEED: &str = r#"<?xml version="1.0"?>
<rss version="2.0">
  <channel>
    <title>EURAXESS</title>
    <item>
      <title>PhD in Marine Biology</title>
      <link>https://euraxess.example/jobs/1</link>
      <description>Fully funded.</description>
      <pubDate>Tue, 16 Jan 2024 09:30:00 +0100</pubDate>
      <guid isPermaLink="false">euraxess-1</guid>
    </item>
    <item>
      <title>Postdoc in Optics</title>
      <link>https://euraxess.example/jobs/2</link>
    </item>
  </channel>
</rss>"#;

fn feed_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

fn gateway() -> Command {
    Command::cargo_bin("euraxess-gateway").unwrap()
}

#[test]
fn parse_file_prints_records() {
    let file = feed_file(FEED);

    let output = gateway()
        .args(["parse", file.path().to_str().unwrap()])
        .output()
        .unwrap();
    assert!(output.status.success());

    let records: Value = serde_json::from_slice(&output.stdout).unwrap();
    let records = records.as_array().unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["source_ref"], "euraxess-1");
    assert_eq!(records[0]["posted_date"], "2024-01-16");
    assert_eq!(records[0]["raw"]["guid"]["@isPermaLink"], "false");
    assert_eq!(records[1]["source_ref"], "https://euraxess.example/jobs/2");
    assert_eq!(records[1]["description_raw"], "");
    assert_eq!(records[1]["posted_date"], Value::Null);
}

#[test]
fn parse_with_limit_and_compact() {
    let file = feed_file(FEED);

    gateway()
        .args(["parse", file.path().to_str().unwrap(), "--limit", "1", "--compact"])
        .assert()
        .success()
        .stdout(predicate::str::contains("PhD in Marine Biology"))
        .stdout(predicate::str::contains("Postdoc in Optics").not())
        .stdout(predicate::str::contains("\n  ").not());
}

#[test]
fn parse_reads_stdin() {
    gateway()
        .args(["parse", "-", "--compact"])
        .write_stdin(FEED)
        .assert()
        .success()
        .stdout(predicate::str::contains("Postdoc in Optics"));
}

#[test]
fn parse_malformed_feed_fails() {
    let file = feed_file("<rss><channel><item></channel></rss>");

    gateway()
        .args(["parse", file.path().to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("malformed"));
}

#[test]
fn parse_missing_file_fails() {
    gateway()
        .args(["parse", "/definitely/not/here.xml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("file not found"));
}

#[test]
fn help_lists_subcommands() {
    gateway()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("serve"))
        .stdout(predicate::str::contains("parse"));
}
