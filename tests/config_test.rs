use std::io::Write;

use genhub::config::validation::validate_config;
use genhub::config::{load_config, models::Config};

const DEMO_YAML: &str = r#"
adapters:
  - key: primary
    type: openai_compatible
    api_key: test_key
    base_url: "https://example.invalid/v1"
models:
  - key: demo-chat
    type: demo-model-v1
    adapter: primary
"#;

#[test]
fn loads_yaml_config_with_flattened_params() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(DEMO_YAML.as_bytes()).unwrap();

    let config = load_config(file.path().to_str().unwrap()).unwrap();
    assert_eq!(config.adapters.len(), 1);
    assert_eq!(config.adapters[0].key, "primary");
    assert_eq!(
        config.adapters[0].params.get("base_url").map(String::as_str),
        Some("https://example.invalid/v1")
    );
    assert_eq!(config.models[0].adapter, "primary");
    assert!(validate_config(&config).is_ok());
}

#[test]
fn missing_file_is_an_error() {
    assert!(load_config("/definitely/not/here.yaml").is_err());
}

#[test]
fn dangling_adapter_reference_fails_validation() {
    let config: Config = serde_yaml::from_str(
        r#"
models:
  - key: demo-chat
    type: demo-model-v1
    adapter: ghost
"#,
    )
    .unwrap();
    let errors = validate_config(&config).unwrap_err();
    assert!(errors[0].contains("non-existent adapter 'ghost'"));
}
