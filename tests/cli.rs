use std::io::Write;
use std::process::{Command, Stdio};

use tempfile::TempDir;

fn prismlog(home: &TempDir, args: &[&str], stdin: &str) -> std::process::Output {
    let mut child = Command::new(env!("CARGO_BIN_EXE_prismlog"))
        .args(args)
        .env("HOME", home.path())
        .env_remove("PRISMLOG_LOG")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();
    // A fatal run may exit before reading all of it
    let _ = child
        .stdin
        .take()
        .unwrap()
        .write_all(stdin.as_bytes());
    child.wait_with_output().unwrap()
}

#[test]
fn test_fatal_writes_then_exits_with_status_1() {
    let home = TempDir::new().unwrap();

    let output = prismlog(&home, &["fatal"], "boom\nnever reached\n");

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    let line = stderr
        .lines()
        .find(|line| line.starts_with("[FATAL] "))
        .unwrap_or_else(|| panic!("no fatal line in: {}", stderr));
    assert!(line.ends_with(" boom"), "{}", line);
    assert!(line.contains(":main.rs:"), "{}", line);
    assert!(!stderr.contains("never reached"));
}

#[test]
fn test_forwards_lines_at_level() {
    let home = TempDir::new().unwrap();

    let output = prismlog(&home, &["warn"], "first\nsecond\n");

    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    let lines: Vec<_> = stderr
        .lines()
        .filter(|line| line.starts_with("[WARN]  "))
        .collect();
    assert_eq!(lines, ["[WARN]  first", "[WARN]  second"]);
}
