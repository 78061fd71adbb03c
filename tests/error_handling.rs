// tests/error_handling.rs

use std::io::Write;
use std::time::Duration;

use tempfile::NamedTempFile;

use statusblocks::config::load_and_validate;
use statusblocks::errors::StatusBlocksError;
use statusblocks::lock::InstanceLock;
use statusblocks::types::PublisherKind;

fn config_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{contents}").unwrap();
    file
}

#[test]
fn test_full_config_loads_with_overrides() {
    let file = config_file(
        r#"
[config]
delimiter = " | "
tick = "500ms"
capacity = 32
lock_file = "/tmp/sb-test.pid"
publisher = "stdout"

[[block]]
command = "/usr/local/bin/sb-date"
interval = 60

[[block]]
command = "/usr/local/bin/sb-volume"
click = "/usr/local/bin/sb-volume-click"
interval = -1
signal = 10
"#,
    );

    let cfg = load_and_validate(file.path()).unwrap();

    assert_eq!(cfg.config.delimiter, " | ");
    assert_eq!(cfg.tick(), Duration::from_millis(500));
    assert_eq!(cfg.config.capacity, 32);
    assert_eq!(cfg.config.publisher, PublisherKind::Stdout);

    let table = cfg.block_table().unwrap();
    assert_eq!(table.len(), 2);
    assert_eq!(table.position_by_slot(10), Some(1));
    let volume = table.get(1).unwrap();
    assert!(volume.is_clickable());
    assert!(!volume.runs_at_startup());
    assert_eq!(volume.current().capacity(), 32);
}

#[test]
fn test_defaults_apply_when_config_section_is_missing() {
    let file = config_file(
        r#"
[[block]]
command = "/bin/date"
"#,
    );

    let cfg = load_and_validate(file.path()).unwrap();

    assert_eq!(cfg.config.delimiter, " ");
    assert_eq!(cfg.tick(), Duration::from_secs(1));
    assert_eq!(cfg.config.capacity, 50);
    assert_eq!(cfg.config.publisher, PublisherKind::Xsetroot);
    assert_eq!(cfg.block[0].interval, 0);
    assert_eq!(cfg.block[0].signal, 0);
}

#[test]
fn test_empty_block_table_returns_config_error() {
    let file = config_file(
        r#"
[config]
delimiter = "|"
"#,
    );

    match load_and_validate(file.path()) {
        Err(StatusBlocksError::ConfigError(msg)) => {
            assert!(msg.contains("at least one"), "unexpected message: {msg}");
        }
        Err(e) => panic!("Expected ConfigError, got: {:?}", e),
        Ok(_) => panic!("Expected error, got Ok"),
    }
}

#[test]
fn test_duplicate_signal_returns_config_error() {
    let file = config_file(
        r#"
[[block]]
command = "/bin/a"
signal = 4

[[block]]
command = "/bin/b"
signal = 4
"#,
    );

    match load_and_validate(file.path()) {
        Err(StatusBlocksError::ConfigError(msg)) => {
            assert!(msg.contains("signal 4"));
            assert!(msg.contains("/bin/a") && msg.contains("/bin/b"));
        }
        Err(e) => panic!("Expected ConfigError, got: {:?}", e),
        Ok(_) => panic!("Expected error, got Ok"),
    }
}

#[test]
fn test_click_without_signal_returns_config_error() {
    let file = config_file(
        r#"
[[block]]
command = "/bin/vol"
click = "/bin/vol-click"
"#,
    );

    match load_and_validate(file.path()) {
        Err(StatusBlocksError::ConfigError(msg)) => {
            assert!(msg.contains("no `signal`"), "unexpected message: {msg}");
        }
        Err(e) => panic!("Expected ConfigError, got: {:?}", e),
        Ok(_) => panic!("Expected error, got Ok"),
    }
}

#[test]
fn test_zero_tick_returns_config_error() {
    let file = config_file(
        r#"
[config]
tick = "0s"

[[block]]
command = "/bin/date"
"#,
    );

    assert!(matches!(
        load_and_validate(file.path()),
        Err(StatusBlocksError::ConfigError(_))
    ));
}

#[test]
fn test_negative_signal_is_a_toml_error() {
    let file = config_file(
        r#"
[[block]]
command = "/bin/date"
signal = -2
"#,
    );

    assert!(matches!(
        load_and_validate(file.path()),
        Err(StatusBlocksError::TomlError(_))
    ));
}

#[test]
fn test_unknown_publisher_is_a_toml_error() {
    let file = config_file(
        r#"
[config]
publisher = "wayland"

[[block]]
command = "/bin/date"
"#,
    );

    assert!(matches!(
        load_and_validate(file.path()),
        Err(StatusBlocksError::TomlError(_))
    ));
}

#[test]
fn test_missing_config_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = load_and_validate(dir.path().join("nope.toml"));
    assert!(matches!(result, Err(StatusBlocksError::IoError(_))));
}

#[test]
fn test_second_instance_lock_reports_already_running() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("statusblocks.pid");

    let _first = InstanceLock::acquire(&path).unwrap();
    let err = InstanceLock::acquire(&path).unwrap_err();

    assert!(matches!(err, StatusBlocksError::AlreadyRunning { .. }));
    assert_eq!(err.exit_code(), 2);
}
