use crate::config::*;
use crate::error::{ZencpError, ZencpExpectedError};
use crate::testing;

#[test]
fn test_config_minimal() {
    let temp_dir = testing::init();
    let config_path = temp_dir.path().join("config.toml");
    std::fs::write(&config_path, "").unwrap();

    let config = Config::parse(Some(&config_path)).unwrap();
    assert_eq!(config, Config::default());
    assert_eq!(config.fill_empty_tags, "<Unknown>");
}

#[test]
fn test_config_full() {
    let temp_dir = testing::init();
    let config_path = temp_dir.path().join("config.toml");
    std::fs::write(
        &config_path,
        r#"
        force = true
        assume_yes = true
        fill_empty_tags = "<Unbekannt>"
        id3v1 = true
        device = 4242
        "#,
    )
    .unwrap();

    let config = Config::parse(Some(&config_path)).unwrap();
    assert!(config.force);
    assert!(config.assume_yes);
    assert!(!config.allow_empty_tags);
    assert_eq!(config.fill_empty_tags, "<Unbekannt>");
    assert!(config.id3v1);
    assert_eq!(config.device, Some(4242));

    let opts = config.tag_options();
    assert!(opts.id3v1);
    assert!(!opts.allow_empty);
    assert_eq!(opts.fill, "<Unbekannt>");
}

#[test]
fn test_config_not_found() {
    let temp_dir = testing::init();
    let config_path = temp_dir.path().join("nope.toml");
    let err = Config::parse(Some(&config_path)).unwrap_err();
    assert!(matches!(err, ZencpError::Expected(ZencpExpectedError::ConfigNotFound { path }) if path == config_path));
}

#[test]
fn test_config_invalid_toml() {
    let temp_dir = testing::init();
    let config_path = temp_dir.path().join("config.toml");
    std::fs::write(&config_path, "force = ").unwrap();
    assert!(matches!(Config::parse(Some(&config_path)), Err(ZencpError::ConfigDecode(_))));
}

#[test]
fn test_config_wrong_type() {
    let path = std::path::Path::new("config.toml");
    assert!(matches!(Config::parse_str(r#"force = "yes""#, path), Err(ZencpError::ConfigDecode(_))));
}

#[test]
fn test_config_fill_conflicts_with_allow_empty() {
    let path = std::path::Path::new("config.toml");
    let err = Config::parse_str(
        r#"
        allow_empty_tags = true
        fill_empty_tags = "?"
        "#,
        path,
    )
    .unwrap_err();
    assert!(matches!(err, ZencpError::Expected(ZencpExpectedError::InvalidConfigValue { key: "fill_empty_tags", .. })));
}

#[test]
fn test_config_empty_fill_string() {
    let path = std::path::Path::new("config.toml");
    let err = Config::parse_str(r#"fill_empty_tags = """#, path).unwrap_err();
    assert!(matches!(err, ZencpError::Expected(ZencpExpectedError::InvalidConfigValue { key: "fill_empty_tags", .. })));
}

#[test]
fn test_config_allow_empty_alone() {
    let path = std::path::Path::new("config.toml");
    let config = Config::parse_str("allow_empty_tags = true", path).unwrap();
    assert!(config.allow_empty_tags);
    assert!(config.tag_options().allow_empty);
}

#[test]
fn test_config_unknown_keys_are_not_fatal() {
    let _ = testing::init();
    let path = std::path::Path::new("config.toml");
    let config = Config::parse_str(
        r#"
        force = true
        colour = "blue"
        [player]
        model = "Zen Touch"
        "#,
        path,
    )
    .unwrap();
    assert!(config.force);
}
