//! CLI integration tests for the Sibyl command-line interface.
//!
//! These tests verify:
//! - Help text is displayed correctly
//! - Argument parsing works as expected
//! - Invalid inputs are rejected with appropriate messages
//!
//! Note: These tests do not talk to any model or search backend - they test
//! CLI parsing and help output only.

use assert_cmd::Command;
use predicates::prelude::*;

/// Get a command for the sibyl binary.
fn sibyl() -> Command {
    Command::cargo_bin("sibyl").unwrap()
}

// ─────────────────────────────────────────────────────────────────────────────
// Help and Version Tests
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_help_displays() {
    sibyl()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Sibyl"))
        .stdout(predicate::str::contains("Research Assistant"));
}

#[test]
fn test_version_displays() {
    sibyl()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("sibyl"));
}

#[test]
fn test_help_lists_subcommands() {
    sibyl()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("chat"))
        .stdout(predicate::str::contains("ask"))
        .stdout(predicate::str::contains("status"))
        .stdout(predicate::str::contains("start"));
}

// ─────────────────────────────────────────────────────────────────────────────
// Global Flag Tests
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_verbose_flag_accepted() {
    // --verbose is global and should be parsed without error
    sibyl().args(["--verbose", "--help"]).assert().success();
}

#[test]
fn test_json_flag_accepted() {
    sibyl().args(["--json", "--help"]).assert().success();
}

// ─────────────────────────────────────────────────────────────────────────────
// Subcommand Help Tests
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_chat_help() {
    sibyl()
        .args(["chat", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("chat"))
        .stdout(predicate::str::contains("--provider"))
        .stdout(predicate::str::contains("--no-search"))
        .stdout(predicate::str::contains("--window"))
        .stdout(predicate::str::contains("--max-steps"));
}

#[test]
fn test_ask_help() {
    sibyl()
        .args(["ask", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("question"))
        .stdout(predicate::str::contains("--provider"))
        .stdout(predicate::str::contains("--no-search"))
        .stdout(predicate::str::contains("--max-steps"));
}

#[test]
fn test_status_help() {
    sibyl()
        .args(["status", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("readiness"));
}

#[test]
fn test_start_help() {
    sibyl()
        .args(["start", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Ollama"));
}

// ─────────────────────────────────────────────────────────────────────────────
// Invalid Input Tests
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_unknown_subcommand_fails() {
    sibyl()
        .arg("unknown-command")
        .assert()
        .failure()
        .stderr(predicate::str::contains("error"));
}

#[test]
fn test_invalid_flag_fails() {
    sibyl()
        .arg("--invalid-flag")
        .assert()
        .failure()
        .stderr(predicate::str::contains("error"));
}

#[test]
fn test_ask_rejects_unknown_provider() {
    sibyl()
        .args(["ask", "--provider", "gpt4", "hello"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown provider"));
}

#[test]
fn test_ask_requires_question() {
    sibyl()
        .arg("ask")
        .assert()
        .failure()
        .stderr(predicate::str::contains("QUESTION"));
}
