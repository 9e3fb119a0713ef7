//! CLI integration tests
//!
//! Tests the event-harvester binary end-to-end for offline commands

use assert_cmd::Command;
use predicates::prelude::*;
use starknet_event_harvester::{selector_for, Felt, RawEvent};
use std::path::Path;

fn harvester() -> Command {
    let mut cmd = Command::cargo_bin("event-harvester").unwrap();
    cmd.env_remove("STARKNET_RPC_URL");
    cmd
}

// ==================== Basic CLI tests ====================

#[test]
fn test_version() {
    harvester()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("event-harvester"));
}

#[test]
fn test_help() {
    harvester()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Backward event harvester"))
        .stdout(predicate::str::contains("STARKNET_RPC_URL"));
}

#[test]
fn test_scan_help() {
    harvester()
        .args(["scan", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--window-size"))
        .stdout(predicate::str::contains("--events-file"));
}

// ==================== Decode tests ====================

#[test]
fn test_decode_byte_array_pending_only() {
    harvester()
        .args(["decode", "byte-array", "0x0", "0x41", "0x1"])
        .assert()
        .success()
        .stdout("A\n");
}

#[test]
fn test_decode_byte_array_empty() {
    harvester()
        .args(["decode", "byte-array", "0", "0", "0"])
        .assert()
        .success()
        .stdout("\n");
}

#[test]
fn test_decode_byte_array_full_word() {
    // One full word "A" and an empty pending word
    harvester()
        .args(["decode", "byte-array", "1", "0x41", "0", "0"])
        .assert()
        .success()
        .stdout("A\n");
}

#[test]
fn test_decode_byte_array_trailing_words() {
    harvester()
        .args(["decode", "byte-array", "0", "0x41", "1", "0x99"])
        .assert()
        .success()
        .stdout("A\n")
        .stderr(predicate::str::contains("1 trailing word"));
}

#[test]
fn test_decode_byte_array_truncated() {
    harvester()
        .args(["decode", "byte-array", "2", "0x41"])
        .assert()
        .failure();
}

#[test]
fn test_decode_byte_array_bad_pending_len() {
    harvester()
        .args(["decode", "byte-array", "0", "0x41", "31"])
        .assert()
        .failure();
}

#[test]
fn test_decode_u256() {
    harvester()
        .args(["decode", "u256", "0x5", "0x0"])
        .assert()
        .success()
        .stdout("5\n");

    harvester()
        .args(["decode", "u256", "0", "1"])
        .assert()
        .success()
        .stdout("340282366920938463463374607431768211456\n");
}

#[test]
fn test_decode_u256_hex() {
    harvester()
        .args(["decode", "u256", "0xff", "0x1", "--hex"])
        .assert()
        .success()
        .stdout("0x1000000000000000000000000000000ff\n");
}

#[test]
fn test_decode_u256_overflow() {
    harvester()
        .args([
            "decode",
            "u256",
            "0",
            "0x100000000000000000000000000000000",
        ])
        .assert()
        .failure();
}

// ==================== Selector tests ====================

#[test]
fn test_selector_transfer() {
    harvester()
        .args(["selector", "Transfer"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "0x99cd8bde557814842a3121e8ddfd433a539b8c9f14bf31ebf108d12e6196e9",
        ));
}

#[test]
fn test_selector_from_signature() {
    harvester()
        .args(["selector", "Transfer(from: ContractAddress, value: u256)"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "0x99cd8bde557814842a3121e8ddfd433a539b8c9f14bf31ebf108d12e6196e9",
        ))
        .stdout(predicate::str::contains("value: u256"));
}

#[test]
fn test_selector_bad_signature() {
    harvester()
        .args(["selector", "Transfer(from)"])
        .assert()
        .failure();
}

// ==================== Window plan tests ====================

#[test]
fn test_windows_plan() {
    harvester()
        .args(["windows", "1000", "300", "4"])
        .assert()
        .success()
        .stdout("#0 [700, 1000]\n#1 [400, 699]\n#2 [100, 399]\n#3 [0, 99]\n")
        .stderr(predicate::str::contains("genesis"));
}

#[test]
fn test_windows_budget() {
    harvester()
        .args(["windows", "10000", "1000", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#1 [8000, 8999]"))
        .stderr(predicate::str::contains("stops at block 8000"));
}

#[test]
fn test_windows_zero_size() {
    harvester()
        .args(["windows", "1000", "0", "2"])
        .assert()
        .failure();
}

// ==================== Config tests ====================

#[test]
fn test_config_path() {
    let dir = tempfile::tempdir().unwrap();
    harvester()
        .env("XDG_CONFIG_HOME", dir.path())
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("event-harvester"));
}

// ==================== Offline scan tests ====================

fn write_dump(dir: &Path) -> std::path::PathBuf {
    let selector = selector_for("TokenMinted");
    let mint = |block: u64, token: u64, uri: &[Felt]| {
        let mut data = vec![Felt::from(1u64), Felt::ZERO, Felt::from(token), Felt::ZERO];
        data.extend_from_slice(uri);
        RawEvent {
            from_address: Felt::from(0xc0u64),
            keys: vec![selector],
            data,
            block_number: block,
            block_hash: None,
            transaction_hash: Felt::from(block),
        }
    };

    let events = vec![
        mint(
            120,
            42,
            &[Felt::from(1u64), Felt::from(0x41u64), Felt::ZERO, Felt::ZERO],
        ),
        mint(
            800,
            43,
            &[Felt::ZERO, Felt::from_short_string("ipfs").unwrap(), Felt::from(4u64)],
        ),
        // ByteArray header far past the payload
        mint(900, 44, &[Felt::from(9u64), Felt::ZERO]),
    ];

    let path = dir.join("events.json");
    std::fs::write(&path, serde_json::to_string(&events).unwrap()).unwrap();
    path
}

fn empty_config(dir: &Path) -> std::path::PathBuf {
    let path = dir.join("config.toml");
    std::fs::write(&path, "").unwrap();
    path
}

const MINTED: &str = "TokenMinted(collection_id: u256, token_id: u256, token_uri: ByteArray)";

#[test]
fn test_scan_events_file_json() {
    let dir = tempfile::tempdir().unwrap();
    let dump = write_dump(dir.path());
    let config = empty_config(dir.path());

    let output = harvester()
        .args(["scan", "-q", "-e", MINTED, "--start", "1000"])
        .args(["--window-size", "300", "--window-count", "4"])
        .arg("--events-file")
        .arg(&dump)
        .arg("--config")
        .arg(&config)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let report: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(report["start_block"], 1000);
    assert_eq!(report["windows_scanned"], 4);
    assert_eq!(report["reached_genesis"], true);

    let records = report["records"].as_array().unwrap();
    assert_eq!(records.len(), 2);
    // Newest window first
    assert_eq!(records[0]["fields"]["token_uri"], "ipfs");
    assert_eq!(records[1]["fields"]["token_id"], "42");
    assert_eq!(records[1]["fields"]["token_uri"], "A");

    let diagnostics = report["diagnostics"].as_array().unwrap();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0]["kind"], "malformed_byte_array");
    assert_eq!(diagnostics[0]["block_number"], 900);
}

#[test]
fn test_scan_events_file_csv_ascending() {
    let dir = tempfile::tempdir().unwrap();
    let dump = write_dump(dir.path());
    let config = empty_config(dir.path());
    let out = dir.path().join("mints.csv");

    harvester()
        .args(["scan", "-e", MINTED, "--format", "csv", "--ascending"])
        .arg("--events-file")
        .arg(&dump)
        .arg("--config")
        .arg(&config)
        .arg("-o")
        .arg(&out)
        .assert()
        .success()
        .stderr(predicate::str::contains("Harvested 2 records"))
        .stderr(predicate::str::contains("Skipped 1 undecodable events"));

    let csv = std::fs::read_to_string(&out).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(
        lines[0],
        "block_number,transaction_hash,emitter,event_name,selector,collection_id,token_id,token_uri"
    );
    assert!(lines[1].starts_with("120,"));
    assert!(lines[1].ends_with(",1,42,A"));
    assert!(lines[2].starts_with("800,"));
}

#[test]
fn test_scan_requires_event() {
    let dir = tempfile::tempdir().unwrap();
    let dump = write_dump(dir.path());
    let config = empty_config(dir.path());

    harvester()
        .args(["scan", "-q"])
        .arg("--events-file")
        .arg(&dump)
        .arg("--config")
        .arg(&config)
        .assert()
        .failure()
        .stderr(predicate::str::contains("event signature"));
}

#[test]
fn test_scan_requires_rpc_url() {
    let dir = tempfile::tempdir().unwrap();
    let config = empty_config(dir.path());

    harvester()
        .args(["scan", "-q", "-e", MINTED])
        .arg("--config")
        .arg(&config)
        .assert()
        .failure()
        .stderr(predicate::str::contains("STARKNET_RPC_URL"));
}
