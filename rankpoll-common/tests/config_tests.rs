//! Tests for configuration and root folder resolution
//!
//! Note: Uses serial_test to prevent ENV variable race conditions. Tests
//! that manipulate RANKPOLL_ROOT_FOLDER are marked with #[serial] so they
//! run sequentially, not in parallel.

use rankpoll_common::config::{
    CompiledDefaults, RootFolderInitializer, RootFolderResolver, TomlConfig,
};
use serial_test::serial;
use std::env;
use std::path::PathBuf;

#[test]
fn test_compiled_defaults_for_current_platform() {
    let defaults = CompiledDefaults::for_current_platform();

    assert!(!defaults.root_folder.as_os_str().is_empty());
    assert_eq!(defaults.log_level, "info");
    assert!(defaults.log_file.is_none());

    let path_str = defaults.root_folder.to_string_lossy();
    assert!(path_str.contains("rankpoll"), "default root should be a rankpoll directory");
}

#[test]
#[serial]
fn test_resolver_with_no_overrides_uses_default() {
    env::remove_var("RANKPOLL_ROOT_FOLDER");

    let resolver = RootFolderResolver::new(None, &TomlConfig::default());
    let root_folder = resolver.resolve();

    let defaults = CompiledDefaults::for_current_platform();
    assert_eq!(root_folder, defaults.root_folder);
}

#[test]
#[serial]
fn test_resolver_env_var() {
    let test_path = "/tmp/rankpoll-test-env-folder";
    env::set_var("RANKPOLL_ROOT_FOLDER", test_path);

    let resolver = RootFolderResolver::new(None, &TomlConfig::default());
    assert_eq!(resolver.resolve(), PathBuf::from(test_path));

    env::remove_var("RANKPOLL_ROOT_FOLDER");
}

#[test]
#[serial]
fn test_resolver_cli_arg_beats_env_var() {
    env::set_var("RANKPOLL_ROOT_FOLDER", "/tmp/rankpoll-from-env");

    let resolver = RootFolderResolver::new(Some("/tmp/rankpoll-from-cli"), &TomlConfig::default());
    assert_eq!(resolver.resolve(), PathBuf::from("/tmp/rankpoll-from-cli"));

    env::remove_var("RANKPOLL_ROOT_FOLDER");
}

#[test]
#[serial]
fn test_resolver_toml_beats_default() {
    env::remove_var("RANKPOLL_ROOT_FOLDER");

    let toml_config = TomlConfig {
        root_folder: Some(PathBuf::from("/tmp/rankpoll-from-toml")),
        ..TomlConfig::default()
    };

    let resolver = RootFolderResolver::new(None, &toml_config);
    assert_eq!(resolver.resolve(), PathBuf::from("/tmp/rankpoll-from-toml"));
}

#[test]
fn test_toml_config_parses_full_file() {
    let content = r#"
        root_folder = "/srv/rankpoll"
        listen_port = 6001
        results_password = "viewers"
        admin_password = "operators"
        admin_email = "ops@example.com"

        [logging]
        level = "debug"

        [survey]
        max_selections = 3

        [[survey.items]]
        id = "alpha"
        label = "Alpha"

        [[survey.items]]
        id = "beta"
        label = "Beta"
        description = "Second option"
    "#;

    let config: TomlConfig = toml::from_str(content).unwrap();
    assert_eq!(config.root_folder, Some(PathBuf::from("/srv/rankpoll")));
    assert_eq!(config.listen_port, Some(6001));
    assert_eq!(config.results_password.as_deref(), Some("viewers"));
    assert_eq!(config.admin_password.as_deref(), Some("operators"));
    assert_eq!(config.admin_email.as_deref(), Some("ops@example.com"));
    assert_eq!(config.logging.as_ref().unwrap().level, "debug");

    let survey = config.survey.unwrap();
    assert_eq!(survey.max_selections, Some(3));
    let items = survey.items.unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].id, "alpha");
    assert_eq!(items[1].description.as_deref(), Some("Second option"));
}

#[test]
fn test_toml_config_empty_file_yields_defaults() {
    let config: TomlConfig = toml::from_str("").unwrap();
    assert!(config.root_folder.is_none());
    assert!(config.listen_port.is_none());
    assert!(config.results_password.is_none());
    assert!(config.survey.is_none());
}

#[test]
fn test_toml_config_missing_file_yields_defaults() {
    let config = TomlConfig::load_from(&PathBuf::from("/nonexistent/rankpoll/config.toml"));
    assert!(config.root_folder.is_none());
}

#[test]
fn test_initializer_creates_directory_and_db_path() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("nested").join("rankpoll");

    let initializer = RootFolderInitializer::new(root.clone());
    initializer.ensure_directory_exists().unwrap();

    assert!(root.exists());
    assert_eq!(initializer.database_path(), root.join("rankpoll.db"));
}
