//! The "Material" control panel
//!
//! Two sliders and a combo. The panel edits a snapshot of the current values
//! and reports what changed as [`ParameterEdit`]s; it never mutates the scene.

use crate::{
    gfx::resources::MaterialConfig,
    parameters::{ParameterEdit, ParameterStore},
};

/// Values the panel widgets are bound to for one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanelSnapshot {
    pub roughness: f32,
    pub metalness: f32,
    pub environment_index: Option<usize>,
}

impl PanelSnapshot {
    pub fn capture(material: &MaterialConfig, parameters: &ParameterStore) -> Self {
        Self {
            roughness: material.roughness,
            metalness: material.metalness,
            environment_index: parameters.selected_index(),
        }
    }

    /// Edits that turn `self` into `after`
    pub fn edits_to(&self, after: &PanelSnapshot, choices: &[String]) -> Vec<ParameterEdit> {
        let mut edits = Vec::new();
        if after.roughness != self.roughness {
            edits.push(ParameterEdit::Roughness(after.roughness));
        }
        if after.metalness != self.metalness {
            edits.push(ParameterEdit::Metalness(after.metalness));
        }
        if after.environment_index != self.environment_index {
            if let Some(name) = after.environment_index.and_then(|i| choices.get(i)) {
                edits.push(ParameterEdit::Environment(name.clone()));
            }
        }
        edits
    }
}

/// Read-only figures shown under the controls
#[derive(Debug, Clone, Copy, Default)]
pub struct PanelInfo {
    pub elapsed: f32,
    pub frames_rendered: u64,
    pub has_environment: bool,
}

/// Draws the panel and returns the edits made this frame
pub fn material_panel(
    ui: &imgui::Ui,
    before: PanelSnapshot,
    parameters: &ParameterStore,
    info: PanelInfo,
) -> Vec<ParameterEdit> {
    let mut after = before;

    ui.window("Material")
        .size([320.0, 0.0], imgui::Condition::FirstUseEver)
        .position([20.0, 20.0], imgui::Condition::FirstUseEver)
        .always_auto_resize(true)
        .collapsible(true)
        .build(|| {
            ui.slider_config("Roughness", 0.0, 1.0)
                .display_format("%.3f")
                .build(&mut after.roughness);
            ui.slider_config("Metalness", 0.0, 1.0)
                .display_format("%.3f")
                .build(&mut after.metalness);

            let choices = parameters.environment_choices();
            // The combo needs an index even before anything is selected
            let mut index = after.environment_index.unwrap_or(0);
            if ui.combo_simple_string("Environment", &mut index, choices) {
                after.environment_index = Some(index);
            }

            ui.separator();
            ui.text_disabled(format!(
                "t = {:.1}s  frames = {}",
                info.elapsed, info.frames_rendered
            ));
            if !info.has_environment {
                ui.text_disabled("No environment map loaded");
            }
        });

    before.edits_to(&after, parameters.environment_choices())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::EnvironmentCatalog;

    fn store() -> ParameterStore {
        ParameterStore::new(&EnvironmentCatalog::new("static"), Some("City Center"))
    }

    #[test]
    fn unchanged_snapshot_produces_no_edits() {
        let store = store();
        let snapshot = PanelSnapshot::capture(&MaterialConfig::richer(), &store);
        assert!(snapshot
            .edits_to(&snapshot, store.environment_choices())
            .is_empty());
    }

    #[test]
    fn each_changed_widget_produces_one_edit() {
        let store = store();
        let before = PanelSnapshot::capture(&MaterialConfig::basic(), &store);
        let after = PanelSnapshot {
            roughness: 0.6,
            metalness: before.metalness,
            environment_index: Some(3),
        };

        assert_eq!(
            before.edits_to(&after, store.environment_choices()),
            vec![
                ParameterEdit::Roughness(0.6),
                ParameterEdit::Environment("City Night".to_string()),
            ]
        );
    }

    #[test]
    fn snapshot_reads_selection_index() {
        let store = store();
        let snapshot = PanelSnapshot::capture(&MaterialConfig::basic(), &store);
        assert_eq!(snapshot.environment_index, Some(0));
        assert_eq!(snapshot.roughness, 0.15);
    }
}
