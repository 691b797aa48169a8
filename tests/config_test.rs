//! Integration tests for Settings loading with layered precedence.
//!
//! Note: These tests run without a global config (temp directories only),
//! so they effectively test the local config layered over defaults.

use std::fs;
use std::path::PathBuf;

use tempfile::TempDir;

use btedit::application::{ApplicationError, Format};
use btedit::config::{local_config_path, Settings};
use btedit::domain::TidyLayout;
use btedit::infrastructure::di::ServiceContainer;

#[test]
fn given_no_local_config_when_load_then_defaults() {
    // Arrange
    let dir = TempDir::new().unwrap();

    // Act
    let settings = Settings::load(Some(dir.path())).expect("load settings");

    // Assert
    assert_eq!(settings, Settings::default());
}

#[test]
fn given_local_config_when_load_then_overrides_only_given_fields() {
    // Arrange
    let dir = TempDir::new().unwrap();
    fs::write(
        local_config_path(dir.path()),
        r#"
format = "toml"

[layout]
sibling_spacing = 60.0
"#,
    )
    .unwrap();

    // Act
    let settings = Settings::load(Some(dir.path())).expect("load settings");

    // Assert
    assert_eq!(settings.format, Format::Toml);
    assert_eq!(settings.layout.sibling_spacing, 60.0);
    assert_eq!(
        settings.layout.level_spacing,
        TidyLayout::default().level_spacing
    );
}

#[test]
fn given_default_file_with_tilde_when_load_then_expanded() {
    let dir = TempDir::new().unwrap();
    fs::write(
        local_config_path(dir.path()),
        "default_file = \"~/trees/ai.json\"\n",
    )
    .unwrap();

    let settings = Settings::load(Some(dir.path())).expect("load settings");

    let home = PathBuf::from(std::env::var("HOME").expect("HOME should be set"));
    assert_eq!(settings.default_file, Some(home.join("trees/ai.json")));
}

#[test]
fn given_invalid_local_config_when_load_then_config_error() {
    let dir = TempDir::new().unwrap();
    fs::write(local_config_path(dir.path()), "format = \"yaml\"\n").unwrap();

    let err = Settings::load(Some(dir.path())).unwrap_err();

    assert!(matches!(err, ApplicationError::Config { .. }), "{err:?}");
}

#[test]
fn given_layout_config_when_building_model_then_spacing_applied() {
    let dir = TempDir::new().unwrap();
    fs::write(
        local_config_path(dir.path()),
        "[layout]\nlevel_spacing = 10.0\n",
    )
    .unwrap();
    let settings = Settings::load(Some(dir.path())).unwrap();
    let container = ServiceContainer::new(settings);

    let mut model = container.new_model::<String>();
    model
        .add(btedit::domain::Node::new(0, "R".to_string()), None)
        .unwrap();
    model
        .add(
            btedit::domain::Node::new(1, "C".to_string()),
            Some(btedit::domain::NodeId(0)),
        )
        .unwrap();

    assert_eq!(
        model.node(btedit::domain::NodeId(1)).unwrap().position().1,
        10.0
    );
}
