//! # Configuration Tests
//!
//! Defaults, partial JSON files, and loading failures.

use std::io::Write;

use rvtrace_core::TraceError;
use rvtrace_core::config::*;
use rvtrace_core::event::InputFormat;
use tempfile::NamedTempFile;

fn config_file(json: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(json.as_bytes()).unwrap();
    file
}

#[test]
fn test_config_default() {
    let config = Config::default();
    assert!(config.tracker.flush_stale);
    assert_eq!(config.format.pc_width, 8);
    assert!(!config.format.show_timing);
    assert_eq!(config.input.format, InputFormat::Auto);
}

#[test]
fn test_config_load_full_file() {
    let file = config_file(
        r#"{
            "tracker": { "flush_stale": false },
            "format": { "pc_width": 12, "show_timing": true },
            "input": { "format": "ndjson" }
        }"#,
    );
    let config = Config::load(file.path()).unwrap();
    assert_eq!(
        config,
        Config {
            tracker: TrackerConfig { flush_stale: false },
            format: FormatConfig {
                pc_width: 12,
                show_timing: true,
            },
            input: InputConfig {
                format: InputFormat::Lines,
            },
        }
    );
}

#[test]
fn test_config_input_format_aliases() {
    for (name, expected) in [
        ("auto", InputFormat::Auto),
        ("Array", InputFormat::Array),
        ("json", InputFormat::Array),
        ("lines", InputFormat::Lines),
        ("jsonl", InputFormat::Lines),
    ] {
        let json = format!(r#"{{"input":{{"format":"{name}"}}}}"#);
        assert_eq!(Config::from_json(&json).unwrap().input.format, expected, "{name}");
    }
}

#[test]
fn test_config_unknown_keys_are_ignored() {
    let config = Config::from_json(r#"{"tracker":{"flush_stale":true,"legacy":1},"extra":{}}"#).unwrap();
    assert_eq!(config, Config::default());
}

#[test]
fn test_config_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = Config::load(dir.path().join("absent.json")).unwrap_err();
    assert!(matches!(err, TraceError::Io(_)), "{err:?}");
}

#[test]
fn test_config_invalid_file_is_config_error() {
    let file = config_file(r#"{"format":{"pc_width":-1}}"#);
    let err = Config::load(file.path()).unwrap_err();
    assert!(matches!(err, TraceError::Config(_)), "{err:?}");
    assert!(err.to_string().starts_with("invalid configuration"));
}
