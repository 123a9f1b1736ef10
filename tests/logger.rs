//! Integration tests for logger behavior.

use course_compass::logger::{init_file_logging, set_level, set_level_from_str, Level};
use course_compass::{debug, error, info, warn};
use tempfile::TempDir;

#[test]
fn level_parse_accepts_valid() {
    assert!(set_level_from_str("error"));
    assert!(set_level_from_str("warn"));
    assert!(set_level_from_str("info"));
    assert!(set_level_from_str("debug"));
}

#[test]
fn level_parse_rejects_invalid() {
    assert!(!set_level_from_str("invalid"));
    assert!(!set_level_from_str(""));
}

#[test]
fn logs_do_not_panic() {
    set_level(Level::Debug);
    info!("info integration");
    warn!("warn integration");
    error!("error integration");
    debug!("debug integration");
}

#[cfg(feature = "file-logging")]
#[test]
fn file_logging_creates_parent_directories() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = dir.path().join("logs").join("coursecompass.log");
    assert!(init_file_logging(&path));
    warn!("written to file");
    assert!(path.exists());
}

#[cfg(not(feature = "file-logging"))]
#[test]
fn file_logging_disabled_without_feature() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    assert!(!init_file_logging(&dir.path().join("x.log")));
}
