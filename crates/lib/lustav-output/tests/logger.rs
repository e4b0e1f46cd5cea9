use std::fs;

use lustav_output::logger::{log_file_path, LogSettings};
use lustav_testutils::scratch::scratch_dir;

fn settings(overwrite: bool) -> LogSettings {
    LogSettings {
        log_path: "run".to_string(),
        log_level: "debug".to_string(),
        log_file_name: "lustav.log".to_string(),
        log_overwrite: overwrite,
    }
}

#[test]
fn test_log_file_below_logs_dir() {
    let config_path = scratch_dir("logger_new");
    let path = log_file_path(&config_path, &settings(false)).unwrap();
    assert_eq!(path, config_path.join("run").join("logs").join("lustav.log"));
    assert!(path.parent().unwrap().is_dir());
}

#[test]
fn test_existing_log_is_replaced_or_kept() {
    let config_path = scratch_dir("logger_existing");
    let existing = log_file_path(&config_path, &settings(true)).unwrap();
    fs::write(&existing, "old").unwrap();

    let kept = log_file_path(&config_path, &settings(false)).unwrap();
    assert_ne!(kept, existing);
    assert!(existing.exists());
    let name = kept.file_name().unwrap().to_string_lossy().into_owned();
    assert!(name.starts_with("lustav_"));
    assert!(name.ends_with(".log"));

    let replaced = log_file_path(&config_path, &settings(true)).unwrap();
    assert_eq!(replaced, existing);
    assert!(!existing.exists());
}
