//! Configuration loading from files on disk.

use std::io::Write;

use rest_service::config::{load_config, Config, ConfigError, ValidationError};

fn write_config(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn test_load_full_config() {
    let file = write_config(
        r#"
[listener]
bind_address = "127.0.0.1:9000"

[timeouts]
request_secs = 5
outgoing_secs = 2

[limits]
max_body_size = 4096

[observability]
log_level = "debug"
json_logs = true
"#,
    );
    let config = load_config(file.path()).unwrap();
    assert_eq!(config.listener.bind_address, "127.0.0.1:9000");
    assert_eq!(config.timeouts.request_secs, 5);
    assert_eq!(config.timeouts.outgoing_secs, 2);
    assert_eq!(config.limits.max_body_size, 4096);
    assert_eq!(config.observability.log_level, "debug");
    assert!(config.observability.json_logs);
}

#[test]
fn test_parse_error() {
    let file = write_config("[listener\nbind_address = ");
    assert!(matches!(load_config(file.path()), Err(ConfigError::Parse(_))));
}

#[test]
fn test_invalid_values() {
    let file = write_config("[listener]\nbind_address = \"localhost\"\n");
    match load_config(file.path()) {
        Err(ConfigError::Validation(errors)) => {
            assert_eq!(
                errors,
                vec![ValidationError::InvalidBindAddress("localhost".into())]
            );
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn test_free_form_config_file() {
    let file = write_config(
        r#"
rootdir = "/srv/app"

[section]
libdir = "/srv/app/lib"
path = ["/srv/app", "/srv/app/lib"]
"#,
    );
    let mut cfg = Config::from_file(file.path()).unwrap();
    assert_eq!(
        cfg.value("rootdir", true).unwrap().and_then(|v| v.as_str()),
        Some("/srv/app")
    );
    let section = cfg.section_values("section", true).unwrap().unwrap();
    assert_eq!(section["path"].as_array().map(Vec::len), Some(2));

    cfg.set_section_value("section", "constant", "constant");
    assert_eq!(
        cfg.section_value("section", "constant", true)
            .unwrap()
            .and_then(|v| v.as_str()),
        Some("constant")
    );
    assert!(matches!(
        cfg.value("missing", true),
        Err(ConfigError::MissingKey(key)) if key == "missing"
    ));
}
