//! Service container for dependency injection
//!
//! Wires settings, filesystem and codec into the services.

use std::path::Path;
use std::sync::Arc;

use crate::application::services::DocumentService;
use crate::application::Format;
use crate::config::Settings;
use crate::domain::{TidyLayout, TreeModel};
use crate::infrastructure::traits::{FileSystem, RealFileSystem};

/// Container holding all application services.
pub struct ServiceContainer {
    /// Application settings
    pub settings: Arc<Settings>,

    /// Filesystem abstraction
    pub fs: Arc<dyn FileSystem>,
}

impl ServiceContainer {
    /// Create a new service container with real implementations.
    pub fn new(settings: Settings) -> Self {
        Self::with_deps(settings, Arc::new(RealFileSystem))
    }

    /// Create a service container with custom dependencies (for testing).
    pub fn with_deps(settings: Settings, fs: Arc<dyn FileSystem>) -> Self {
        Self {
            settings: Arc::new(settings),
            fs,
        }
    }

    /// Format for `path`: explicit override, then file extension, then settings.
    pub fn format_for(&self, path: &Path, explicit: Option<Format>) -> Format {
        explicit
            .or_else(|| Format::from_path(path))
            .unwrap_or(self.settings.format)
    }

    /// Document service using the format resolved for `path`.
    pub fn documents(&self, path: &Path, explicit: Option<Format>) -> DocumentService {
        DocumentService::new(Arc::clone(&self.fs), self.format_for(path, explicit))
    }

    /// Empty model laid out with the configured spacing.
    pub fn new_model<P>(&self) -> TreeModel<P> {
        TreeModel::with_layout(TidyLayout::from(&self.settings.layout))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn given_sources_then_explicit_beats_extension_beats_settings() {
        let settings = Settings {
            format: Format::Toml,
            ..Settings::default()
        };
        let c = ServiceContainer::new(settings);
        let json = PathBuf::from("t.json");
        let plain = PathBuf::from("tree");
        assert_eq!(c.format_for(&json, Some(Format::Toml)), Format::Toml);
        assert_eq!(c.format_for(&json, None), Format::Json);
        assert_eq!(c.format_for(&plain, None), Format::Toml);
    }
}
