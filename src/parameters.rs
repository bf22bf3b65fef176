//! Live-editable parameters
//!
//! The control panel never touches the material directly. It emits
//! [`ParameterEdit`]s while a frame is being built, and the app applies them
//! after that frame is submitted, so an edit made during frame N shows up in
//! frame N+1.

use crate::{assets::EnvironmentCatalog, gfx::resources::MaterialConfig};

#[derive(Debug, Clone, PartialEq)]
pub enum ParameterEdit {
    Roughness(f32),
    Metalness(f32),
    /// Catalog display name
    Environment(String),
}

/// Ask the environment loader for one load
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvironmentRequest {
    pub name: String,
}

/// The selected environment and the names it can be chosen from
///
/// Roughness and metalness live on the scene's material; this store only
/// routes edits to it.
#[derive(Debug, Clone)]
pub struct ParameterStore {
    choices: Vec<String>,
    selected_environment: Option<String>,
}

impl ParameterStore {
    pub fn new(catalog: &EnvironmentCatalog, initial_environment: Option<&str>) -> Self {
        Self {
            choices: catalog.names().map(str::to_string).collect(),
            selected_environment: initial_environment.map(str::to_string),
        }
    }

    pub fn environment_choices(&self) -> &[String] {
        &self.choices
    }

    pub fn selected_environment(&self) -> Option<&str> {
        self.selected_environment.as_deref()
    }

    /// Index of the selected environment in `environment_choices`
    pub fn selected_index(&self) -> Option<usize> {
        let selected = self.selected_environment.as_deref()?;
        self.choices.iter().position(|name| name == selected)
    }

    /// Applies one edit; an environment selection yields exactly one request
    pub fn apply(
        &mut self,
        edit: ParameterEdit,
        material: &mut MaterialConfig,
    ) -> Option<EnvironmentRequest> {
        match edit {
            ParameterEdit::Roughness(value) => {
                material.set_roughness(value);
                None
            }
            ParameterEdit::Metalness(value) => {
                material.set_metalness(value);
                None
            }
            ParameterEdit::Environment(name) => {
                if !self.choices.contains(&name) {
                    log::warn!("Ignoring selection of unknown environment '{name}'");
                    return None;
                }
                self.selected_environment = Some(name.clone());
                Some(EnvironmentRequest { name })
            }
        }
    }

    pub fn apply_all(
        &mut self,
        edits: impl IntoIterator<Item = ParameterEdit>,
        material: &mut MaterialConfig,
    ) -> Vec<EnvironmentRequest> {
        edits
            .into_iter()
            .filter_map(|edit| self.apply(edit, material))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> ParameterStore {
        ParameterStore::new(&EnvironmentCatalog::new("assets"), Some("City Center"))
    }

    #[test]
    fn scalar_edits_are_clamped_onto_the_material() {
        let mut store = store();
        let mut material = MaterialConfig::basic();

        assert_eq!(store.apply(ParameterEdit::Roughness(0.42), &mut material), None);
        assert_eq!(material.roughness, 0.42);
        store.apply(ParameterEdit::Metalness(3.0), &mut material);
        assert_eq!(material.metalness, 1.0);
        store.apply(ParameterEdit::Roughness(-1.0), &mut material);
        assert_eq!(material.roughness, 0.0);
    }

    #[test]
    fn environment_selection_yields_one_request() {
        let mut store = store();
        let mut material = MaterialConfig::basic();

        let requests = store.apply_all(
            vec![
                ParameterEdit::Roughness(0.3),
                ParameterEdit::Environment("Forest".to_string()),
            ],
            &mut material,
        );
        assert_eq!(
            requests,
            vec![EnvironmentRequest {
                name: "Forest".to_string()
            }]
        );
        assert_eq!(store.selected_environment(), Some("Forest"));
        assert_eq!(store.selected_index(), Some(4));
    }

    #[test]
    fn unknown_environment_is_ignored() {
        let mut store = store();
        let mut material = MaterialConfig::basic();
        assert_eq!(
            store.apply(ParameterEdit::Environment("forest".to_string()), &mut material),
            None
        );
        assert_eq!(store.selected_environment(), Some("City Center"));
    }

    #[test]
    fn choices_follow_catalog_order() {
        let store = ParameterStore::new(&EnvironmentCatalog::new("assets"), None);
        assert_eq!(store.environment_choices().len(), 5);
        assert_eq!(store.environment_choices()[1], "Closed Room");
        assert_eq!(store.selected_index(), None);
    }
}
