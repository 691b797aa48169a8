//! Environment layer of Settings loading.
//!
//! Kept in its own test binary: environment variables are process-wide and
//! would leak into the file-based config tests running in parallel.

use std::env;
use std::fs;

use tempfile::TempDir;

use btedit::application::Format;
use btedit::config::{local_config_path, Settings};

#[test]
fn given_btedit_env_vars_when_load_then_override_local_config() {
    // Arrange
    let dir = TempDir::new().unwrap();
    fs::write(
        local_config_path(dir.path()),
        r#"
format = "json"

[layout]
level_spacing = 40.0
sibling_spacing = 60.0
"#,
    )
    .unwrap();
    env::set_var("BTEDIT_FORMAT", "toml");
    env::set_var("BTEDIT_LAYOUT__LEVEL_SPACING", "7");
    env::set_var("BTEDIT_DEFAULT_FILE", "/tmp/bt/main.json");

    // Act
    let result = Settings::load(Some(dir.path()));
    env::remove_var("BTEDIT_FORMAT");
    env::remove_var("BTEDIT_LAYOUT__LEVEL_SPACING");
    env::remove_var("BTEDIT_DEFAULT_FILE");
    let settings = result.expect("load settings");

    // Assert
    assert_eq!(settings.format, Format::Toml);
    assert_eq!(settings.layout.level_spacing, 7.0);
    assert_eq!(settings.layout.sibling_spacing, 60.0);
    assert_eq!(
        settings.default_file,
        Some(std::path::PathBuf::from("/tmp/bt/main.json"))
    );
}
