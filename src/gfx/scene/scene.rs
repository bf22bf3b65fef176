use cgmath::Matrix4;
use wgpu::Device;

use crate::{
    config::SceneConfig,
    gfx::resources::material::{MaterialConfig, MaterialUniform},
    wgpu_utils::binding_builder::BindGroupLayoutWithDesc,
};

use super::object::SceneObject;

/// Objects plus the one material they all share
pub struct Scene {
    pub objects: Vec<SceneObject>,
    pub material: MaterialConfig,
}

/// What a single draw in a frame uses
#[derive(Debug, Clone, PartialEq)]
pub struct DrawCommand {
    pub object_index: usize,
    pub model: Matrix4<f32>,
    pub material: MaterialUniform,
}

impl Scene {
    pub fn from_config(config: &SceneConfig) -> Self {
        let objects = config.objects.iter().map(SceneObject::from_config).collect();
        Self {
            objects,
            material: config.material.clone(),
        }
    }

    /// Sets every object's rotation to `elapsed * rate` per axis
    pub fn animate(&mut self, elapsed: f32) {
        for object in &mut self.objects {
            object.set_elapsed(elapsed);
        }
    }

    /// Draws for the current frame, in object order
    ///
    /// Every command carries the same material values.
    pub fn draw_list(&self) -> Vec<DrawCommand> {
        let material = self.material.to_uniform();
        self.objects
            .iter()
            .enumerate()
            .filter(|(_, object)| object.visible)
            .map(|(object_index, object)| DrawCommand {
                object_index,
                model: object.model_matrix(),
                material,
            })
            .collect()
    }

    /// Must be called once the device exists and before rendering
    pub fn init_gpu_resources(&mut self, device: &Device, transform_layout: &BindGroupLayoutWithDesc) {
        for object in self.objects.iter_mut() {
            object.init_gpu_resources(device, transform_layout);
        }
    }

    pub fn update_all_transforms(&mut self, queue: &wgpu::Queue) {
        for object in &mut self.objects {
            object.update_transform(queue);
        }
    }

    pub fn get_object_names(&self) -> Vec<String> {
        self.objects.iter().map(|obj| obj.name.clone()).collect()
    }

    pub fn get_statistics(&self) -> SceneStatistics {
        SceneStatistics {
            object_count: self.objects.len(),
            total_triangles: self.objects.iter().map(|o| o.mesh.index_count / 3).sum(),
            total_vertices: self.objects.iter().map(|o| o.mesh.vertex_count).sum(),
        }
    }
}

/// Scene statistics for debugging and UI display
#[derive(Debug, PartialEq, Eq)]
pub struct SceneStatistics {
    pub object_count: usize,
    pub total_triangles: u32,
    pub total_vertices: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn rotation_is_elapsed_times_rate_for_both_presets() {
        for config in [SceneConfig::basic(), SceneConfig::richer()] {
            let mut scene = Scene::from_config(&config);
            for t in [0.0f32, 0.016, 1.0, 12.5, 3600.0] {
                scene.animate(t);
                for (object, object_config) in scene.objects.iter().zip(&config.objects) {
                    assert_relative_eq!(
                        object.rotation.0 .0,
                        t * object_config.rotation_rates[0],
                        max_relative = 1e-6
                    );
                    assert_relative_eq!(
                        object.rotation.1 .0,
                        t * object_config.rotation_rates[1],
                        max_relative = 1e-6
                    );
                }
            }
        }
    }

    #[test]
    fn every_draw_carries_the_shared_material() {
        let mut scene = Scene::from_config(&SceneConfig::richer());
        scene.material.set_roughness(0.9);
        scene.material.set_metalness(0.1);

        let draws = scene.draw_list();
        assert_eq!(draws.len(), 3);
        for draw in &draws {
            assert_eq!(draw.material.roughness, 0.9);
            assert_eq!(draw.material.metalness, 0.1);
            assert_eq!(draw.material, draws[0].material);
        }
    }

    #[test]
    fn objects_keep_preset_names_and_order() {
        let scene = Scene::from_config(&SceneConfig::basic());
        assert_eq!(scene.get_object_names(), vec!["plane", "sphere", "torus"]);

        let stats = scene.get_statistics();
        assert_eq!(stats.object_count, 3);
        // plane 1x1 segments, 16x16 sphere, 16x32 torus
        assert_eq!(stats.total_vertices, 4 + 17 * 17 + 17 * 33);
        assert_eq!(stats.total_triangles, 2 + 2 * 16 * 15 + 2 * 16 * 32);
    }

    #[test]
    fn hidden_objects_are_not_drawn() {
        let mut scene = Scene::from_config(&SceneConfig::basic());
        scene.objects[1].visible = false;
        let indices: Vec<usize> = scene.draw_list().iter().map(|d| d.object_index).collect();
        assert_eq!(indices, vec![0, 2]);
    }
}
