//! Contract tests for the reference CLI runner.

use std::fs;
use std::process::Command;

use sliver::encode_fast;

fn sliver_cmd() -> Command {
    Command::new(env!("CARGO_BIN_EXE_sliver"))
}

struct Fixture {
    _dir: tempfile::TempDir,
    text_path: std::path::PathBuf,
    vocab_path: std::path::PathBuf,
    out_path: std::path::PathBuf,
    expected: Vec<i32>,
}

fn fixture() -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let text_path = dir.path().join("text.txt");
    let vocab_path = dir.path().join("vocab.txt");
    let out_path = dir.path().join("ids.txt");

    let text = "unbreakable unbelievable unknown";
    let vocab = ["[UNK]", "un", "##break", "##believ", "##able"];
    fs::write(&text_path, text).unwrap();
    fs::write(&vocab_path, vocab.join("\n")).unwrap();
    let expected = encode_fast(text.as_bytes(), &vocab).unwrap();

    Fixture {
        _dir: dir,
        text_path,
        vocab_path,
        out_path,
        expected,
    }
}

fn parse_ids(s: &str) -> Vec<i32> {
    s.split_whitespace().map(|id| id.parse().unwrap()).collect()
}

#[test]
fn test_fast_mode_prints_ids() {
    let fx = fixture();
    let output = sliver_cmd()
        .args(["fast"])
        .arg(&fx.text_path)
        .arg(&fx.vocab_path)
        .output()
        .unwrap();
    assert!(output.status.success());
    assert_eq!(parse_ids(&String::from_utf8(output.stdout).unwrap()), fx.expected);
}

#[test]
fn test_linear_mode_writes_out_file() {
    let fx = fixture();
    let status = sliver_cmd()
        .args(["linear"])
        .arg(&fx.text_path)
        .arg(&fx.vocab_path)
        .arg("2")
        .arg(&fx.out_path)
        .status()
        .unwrap();
    assert!(status.success());
    assert_eq!(parse_ids(&fs::read_to_string(&fx.out_path).unwrap()), fx.expected);
}

#[test]
fn test_external_mode_streams_to_file() {
    let fx = fixture();
    let status = sliver_cmd()
        .args(["fast-external"])
        .arg(&fx.text_path)
        .arg(&fx.vocab_path)
        .arg("0")
        .arg(&fx.out_path)
        .arg("50")
        .status()
        .unwrap();
    assert!(status.success());
    assert_eq!(parse_ids(&fs::read_to_string(&fx.out_path).unwrap()), fx.expected);
}

#[test]
fn test_external_mode_requires_limit() {
    let fx = fixture();
    let status = sliver_cmd()
        .args(["linear-external"])
        .arg(&fx.text_path)
        .arg(&fx.vocab_path)
        .arg("0")
        .arg(&fx.out_path)
        .status()
        .unwrap();
    assert!(!status.success());
}

#[test]
fn test_memory_limit_below_floor_is_rejected() {
    let fx = fixture();
    let status = sliver_cmd()
        .args(["fast-external"])
        .arg(&fx.text_path)
        .arg(&fx.vocab_path)
        .arg("0")
        .arg(&fx.out_path)
        .arg("10")
        .status()
        .unwrap();
    assert!(!status.success());
}

#[test]
fn test_missing_text_file_fails() {
    let fx = fixture();
    let status = sliver_cmd()
        .args(["fast", "no/such/file.txt"])
        .arg(&fx.vocab_path)
        .status()
        .unwrap();
    assert!(!status.success());
}

#[test]
fn test_unknown_mode_fails() {
    let fx = fixture();
    let status = sliver_cmd()
        .args(["bpe"])
        .arg(&fx.text_path)
        .arg(&fx.vocab_path)
        .status()
        .unwrap();
    assert!(!status.success());
}
