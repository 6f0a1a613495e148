//! CLI tests for the sizefs binary.

use std::io::{Read, Seek, SeekFrom};
use std::process::{Command, Output};

fn execute_sizefs(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_sizefs"))
        .args(args)
        .env_remove("SIZEFS_CONFIG")
        .env_remove("SIZEFS_SEED")
        .output()
        .expect("failed to run sizefs")
}

fn assert_cli_success(output: &Output, context: &str) {
    assert!(
        output.status.success(),
        "{context} failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
}

#[test]
fn test_read_range_to_stdout() {
    let output = execute_sizefs(&[
        "read", "1K", "--filler", "ab", "--offset", "3", "--length", "5",
    ]);
    assert_cli_success(&output, "read");
    // A fresh read starts a new filler expansion at its offset.
    assert_eq!(output.stdout, b"ababa");
}

#[test]
fn test_read_whole_file_with_suffix() {
    let output = execute_sizefs(&["read", "64B", "--suffix", "END", "--filler", "x"]);
    assert_cli_success(&output, "read");
    assert_eq!(output.stdout.len(), 64);
    assert!(output.stdout.ends_with(b"xEND"));
}

#[test]
fn test_read_large_file_to_output() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("large.bin");
    let filler = "x".repeat(4096);

    let output = execute_sizefs(&[
        "read",
        "256M+1B",
        "--filler",
        &filler,
        "--suffix",
        "END",
        "--output",
        path.to_str().unwrap(),
    ]);
    assert_cli_success(&output, "read");
    assert!(output.stdout.is_empty());

    let metadata = std::fs::metadata(&path).unwrap();
    assert_eq!(metadata.len(), (256 << 20) + 1);

    let mut file = std::fs::File::open(&path).unwrap();
    let mut tail = [0u8; 8];
    file.seek(SeekFrom::End(-8)).unwrap();
    file.read_exact(&mut tail).unwrap();
    // The last filler run does not fit before the suffix, so it is padded.
    assert_eq!(&tail, b"00000END");
}

#[test]
fn test_read_window_spanning_several_chunks() {
    let whole = execute_sizefs(&["read", "300K", "--filler", "abcdefg", "--seed", "3"]);
    assert_cli_success(&whole, "read");

    let window = execute_sizefs(&[
        "read", "300K", "--filler", "abcdefg", "--seed", "3", "--offset", "0", "--length",
        "200000",
    ]);
    assert_cli_success(&window, "read");
    assert_eq!(window.stdout, whole.stdout[..200000]);
}

#[test]
fn test_write_streams_whole_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.bin");
    let path_arg = path.to_str().unwrap();

    let output = execute_sizefs(&[
        "write",
        "100K-1B",
        path_arg,
        "--prefix",
        "HEADER",
        "--filler",
        "a(bc)*d",
        "--padder",
        "-",
        "--seed",
        "5",
        "--chunk-size",
        "1000",
    ]);
    assert_cli_success(&output, "write");

    let content = std::fs::read(&path).unwrap();
    assert_eq!(content.len(), 102399);
    assert!(content.starts_with(b"HEADER"));

    // Same seed, one big read.
    let output = execute_sizefs(&[
        "read", "100K-1B", "--prefix", "HEADER", "--filler", "a(bc)*d", "--padder", "-", "--seed",
        "5",
    ]);
    assert_cli_success(&output, "read");
    assert_eq!(output.stdout, content);
}

#[test]
fn test_read_with_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("contents.yaml");
    std::fs::write(&config, "filler: \"[7]\"\nprefix: \"P\"\n").unwrap();

    let output = execute_sizefs(&[
        "read",
        "8B",
        "--config",
        config.to_str().unwrap(),
        "--prefix",
        "QQ",
    ]);
    assert_cli_success(&output, "read");
    assert_eq!(output.stdout, b"QQ777777");
}

#[test]
fn test_check_prints_canonical_pattern() {
    let output = execute_sizefs(&["check", "x[0-2](ab){2}", "--seed", "1", "--samples", "2"]);
    assert_cli_success(&output, "check");

    let stdout = String::from_utf8(output.stdout).unwrap();
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines[0], "pattern: x[012](ab){2}");
    assert_eq!(lines[1], "max length: 6");
    assert_eq!(lines.len(), 4);
    assert!(lines[2].starts_with("sample 0: x"));
}

#[test]
fn test_invalid_inputs_fail() {
    let output = execute_sizefs(&["read", "4Q"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Error: Invalid size specification"));

    let output = execute_sizefs(&["check", "a(b"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Invalid pattern"));

    let output = execute_sizefs(&["read", "1K", "--filler", "x{0}"]);
    assert!(!output.status.success());
}
