//! Runs the `fdcat` binary against fixture files.

use anyhow::Context;
use std::process::{Command, Output};

fn fdcat(args: &[&str]) -> anyhow::Result<Output> {
    Command::new(env!("CARGO_BIN_EXE_fdcat"))
        .args(args)
        .env_remove("FDCAT_BUFFER_SIZE")
        .output()
        .context("running fdcat")
}

fn fixture(bytes: &[u8]) -> anyhow::Result<tempfile::NamedTempFile> {
    let file = tempfile::NamedTempFile::new()?;
    std::fs::write(file.path(), bytes)?;
    Ok(file)
}

#[test]
fn test_prints_range() -> anyhow::Result<()> {
    let file = fixture(b"xyz\n")?;
    let path = file.path().to_str().context("utf-8 temp path")?;

    let out = fdcat(&["--range", "1-2", path])?;
    assert!(out.status.success());
    assert_eq!(out.stdout, b"yz");

    let out = fdcat(&["--start", "1", "--buffer-size", "1", path])?;
    assert_eq!(out.stdout, b"yz\n");
    Ok(())
}

#[test]
fn test_throttled_text() -> anyhow::Result<()> {
    let text = "…".repeat(100);
    let file = fixture(text.as_bytes())?;
    let path = file.path().to_str().context("utf-8 temp path")?;

    let out = fdcat(&["--encoding", "utf8", "--buffer-size", "7", "--throttle-ms", "1", path])?;
    assert!(out.status.success());
    assert_eq!(String::from_utf8(out.stdout)?, text);
    Ok(())
}

#[test]
fn test_missing_file_fails() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("missing");

    let out = fdcat(&[path.to_str().context("utf-8 temp path")?])?;
    assert!(!out.status.success());
    assert!(out.stdout.is_empty());
    assert!(String::from_utf8_lossy(&out.stderr).contains("Failed to open"));
    Ok(())
}

#[test]
fn test_reversed_range_fails() -> anyhow::Result<()> {
    let file = fixture(b"xyz\n")?;
    let path = file.path().to_str().context("utf-8 temp path")?;

    let out = fdcat(&["--start", "3", "--end", "1", path])?;
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("\"start\" option must be <="));
    Ok(())
}
