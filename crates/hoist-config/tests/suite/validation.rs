use hoist_config::{ConfigError, HoistConfig};
use pretty_assertions::assert_eq;

fn invalid_value(text: &str) -> (String, String) {
    match HoistConfig::load_from_str(text) {
        Err(ConfigError::InvalidValue { toml_path, message }) => (toml_path, message),
        other => panic!("expected an invalid value, got {other:?}"),
    }
}

#[test]
fn variable_names_must_be_identifiers() {
    let (path, message) = invalid_value("[extract_variable]\nvariable_name = \"2fast\"\n");
    assert_eq!(path, "extract_variable.variable_name");
    assert_eq!(message, "must be a C identifier");
}

#[test]
fn variable_names_must_not_be_keywords() {
    let (_, message) = invalid_value("[extract_variable]\nvariable_name = \"return\"\n");
    assert_eq!(message, "must not be a keyword");
}

#[test]
fn filter_directives_are_accepted_as_levels() {
    let config = HoistConfig::load_from_str("[logging]\nlevel = \"hoist.refactor=trace,warn\"\n").unwrap();
    assert_eq!(config.logging.level, "hoist.refactor=trace,warn");
}

#[test]
fn disabled_refactoring_still_validates_the_name() {
    let text = "[extract_variable]\nenabled = false\nvariable_name = \"\"\n";
    let (path, _) = invalid_value(text);
    assert_eq!(path, "extract_variable.variable_name");
}
