//! Environment map catalog
//!
//! Maps the display names offered by the control panel to HDR files under the
//! `environmentMap` asset directory. The names are part of the panel contract
//! and must match exactly.

use std::path::{Path, PathBuf};

use super::AssetError;

/// Display name and relative path of every environment, in panel order
pub const ENVIRONMENTS: [(&str, &str); 5] = [
    ("City Center", "environmentMap/city_center.hdr"),
    ("Closed Room", "environmentMap/closed_room.hdr"),
    ("Suburbs", "environmentMap/suburbs.hdr"),
    ("City Night", "environmentMap/city_night.hdr"),
    ("Forest", "environmentMap/forest.hdr"),
];

/// Immutable name → path mapping, resolved against the asset root
#[derive(Debug, Clone)]
pub struct EnvironmentCatalog {
    entries: Vec<(String, PathBuf)>,
}

impl EnvironmentCatalog {
    pub fn new(assets_root: impl AsRef<Path>) -> Self {
        let root = assets_root.as_ref();
        let entries = ENVIRONMENTS
            .iter()
            .map(|(name, relative)| (name.to_string(), root.join(relative)))
            .collect();
        Self { entries }
    }

    /// Returns the HDR path for a display name
    pub fn resolve(&self, name: &str) -> Result<&Path, AssetError> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, path)| path.as_path())
            .ok_or_else(|| AssetError::UnknownEnvironment(name.to_string()))
    }

    /// Display names in panel order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|(key, _)| key == name)
    }

    pub fn name_at(&self, index: usize) -> Option<&str> {
        self.entries.get(index).map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_exactly_the_five_panel_names() {
        let catalog = EnvironmentCatalog::new("assets");
        let names: Vec<&str> = catalog.names().collect();
        assert_eq!(
            names,
            vec!["City Center", "Closed Room", "Suburbs", "City Night", "Forest"]
        );
    }

    #[test]
    fn resolves_relative_to_asset_root() {
        let catalog = EnvironmentCatalog::new("static");
        assert_eq!(
            catalog.resolve("Forest").unwrap(),
            Path::new("static/environmentMap/forest.hdr")
        );
        assert_eq!(
            catalog.resolve("City Center").unwrap(),
            Path::new("static/environmentMap/city_center.hdr")
        );
    }

    #[test]
    fn unknown_or_near_miss_keys_do_not_resolve() {
        let catalog = EnvironmentCatalog::new("assets");
        for key in ["", "forest", "City center", "Forest ", "Beach"] {
            match catalog.resolve(key) {
                Err(AssetError::UnknownEnvironment(name)) => assert_eq!(name, key),
                other => panic!("expected UnknownEnvironment for {key:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn index_lookup_round_trips() {
        let catalog = EnvironmentCatalog::new("assets");
        assert_eq!(catalog.len(), 5);
        assert_eq!(catalog.index_of("Suburbs"), Some(2));
        assert_eq!(catalog.name_at(2), Some("Suburbs"));
        assert_eq!(catalog.name_at(5), None);
    }
}
