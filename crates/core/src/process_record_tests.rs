// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn missing_file_reads_as_none() {
    let dir = tempfile::tempdir().unwrap();
    assert_eq!(ProcessRecord::read(&dir.path().join("bot.pid")).unwrap(), None);
}

#[test]
fn write_then_read() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bot.pid");
    ProcessRecord::new(4242).write(&path).unwrap();
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "4242");
    assert_eq!(ProcessRecord::read(&path).unwrap(), Some(ProcessRecord::new(4242)));
}

#[test]
fn trailing_newline_is_tolerated() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bot.pid");
    std::fs::write(&path, "77\n").unwrap();
    assert_eq!(ProcessRecord::read(&path).unwrap(), Some(ProcessRecord::new(77)));
}

#[yare::parameterized(
    empty    = { "" },
    text     = { "not-a-pid" },
    zero     = { "0" },
    negative = { "-5" },
)]
fn corrupt_contents(contents: &str) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bot.pid");
    std::fs::write(&path, contents).unwrap();
    assert!(matches!(ProcessRecord::read(&path), Err(RecordError::Corrupt(_))));
}

#[test]
fn remove_reports_whether_file_existed() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bot.pid");
    ProcessRecord::new(1).write(&path).unwrap();
    assert!(ProcessRecord::remove(&path).unwrap());
    assert!(!ProcessRecord::remove(&path).unwrap());
}
