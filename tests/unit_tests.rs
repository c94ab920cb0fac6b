use mysql_sink::PkBinding;
use mysql_syncer::{ApplyOpts, Config};
use std::io::Write;
use std::time::Duration;

fn apply_opts(batch_size: Option<usize>) -> ApplyOpts {
    ApplyOpts {
        input: "-".to_string(),
        batch_size,
        dry_run: false,
    }
}

#[test]
fn test_config_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
thread = 3
batch_size = 64
flush_interval = "2s"

[target]
addr = "mysql:3306"
user = "syncer"
schema = "shop"
"#
    )
    .unwrap();

    let config = Config::from_file(file.path()).unwrap();
    assert_eq!(config.workers(), 3);
    assert_eq!(config.batch_size, 64);
    assert_eq!(config.flush_interval().unwrap(), Duration::from_secs(2));
    assert_eq!(config.pk_binding, PkBinding::Parameter);
    assert_eq!(config.target.user, "syncer");
    assert_eq!(config.target.max_open, 10);
}

#[test]
fn test_missing_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = Config::from_file(dir.path().join("absent.toml")).unwrap_err();
    assert!(format!("{err:#}").contains("Failed to read config file"));
}

#[test]
fn test_feed_opts_use_config_batch_size() {
    let config = Config {
        batch_size: 250,
        ..Default::default()
    };
    let opts = apply_opts(None).feed_opts(&config).unwrap();
    assert_eq!(opts.batch_size, 250);
    assert_eq!(opts.flush_interval, Duration::from_millis(200));
}

#[test]
fn test_feed_opts_batch_size_override() {
    let config = Config::default();
    assert_eq!(apply_opts(Some(7)).feed_opts(&config).unwrap().batch_size, 7);
    assert_eq!(apply_opts(Some(0)).feed_opts(&config).unwrap().batch_size, 1);
}

#[test]
fn test_thread_flag_overrides_file_only_above_one() {
    let config = Config::from_toml_str("thread = 5").unwrap();
    assert_eq!(config.clone().with_thread_override(1).workers(), 5);
    assert_eq!(config.with_thread_override(12).workers(), 12);
}
