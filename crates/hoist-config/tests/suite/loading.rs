use hoist_config::{ConfigError, HoistConfig};
use pretty_assertions::assert_eq;

#[test]
fn loads_a_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("hoist.toml");
    std::fs::write(
        &path,
        r#"
[extract_variable]
variable_name = "extracted"

[logging]
level = "DEBUG"
json = true
"#,
    )
    .unwrap();

    let config = HoistConfig::load_from_path(&path).unwrap();
    assert!(config.extract_variable.enabled);
    assert_eq!(config.extract_variable.variable_name, "extracted");
    assert_eq!(config.logging.level, "DEBUG");
    assert!(config.logging.json);
}

#[test]
fn missing_files_report_the_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing.toml");
    let err = HoistConfig::load_from_path(&path).unwrap_err();
    assert!(matches!(err, ConfigError::Io { .. }), "{err:?}");
    assert!(err.to_string().contains("missing.toml"), "{err}");
}

#[test]
fn unknown_keys_are_rejected() {
    let err = HoistConfig::load_from_str("[extract_variable]\nname = \"x\"\n").unwrap_err();
    let ConfigError::Toml(message) = err else {
        panic!("expected a parse error, got {err:?}");
    };
    assert!(message.contains("unknown field `name`"), "{message}");
}

#[test]
fn parse_errors_do_not_echo_the_input() {
    let err = HoistConfig::load_from_str("[logging]\njson = \"secret-value\"\n").unwrap_err();
    assert!(matches!(err, ConfigError::Toml(_)));
    assert!(!err.to_string().contains("json = "), "{err}");
}
