//! # Procedural Geometry Generation
//!
//! Generates the primitive shapes shown in the scene, so no model files are
//! needed. All shapes are centered at the origin, wound counter-clockwise when
//! seen from outside, and carry unit normals and UVs in `[0, 1]`.
//!
//! ## Usage
//!
//! ```rust
//! use sheen::gfx::geometry::{generate_plane, generate_sphere, generate_torus};
//!
//! let plane = generate_plane(1.0, 1.0, 1, 1);
//! let sphere = generate_sphere(0.5, 16, 16);
//! let torus = generate_torus(0.3, 0.2, 16, 32);
//! assert_eq!(plane.vertex_count(), 4);
//! ```

pub mod primitives;

use serde::{Deserialize, Serialize};

pub use primitives::*;

/// Represents generated geometry data ready for GPU upload
#[derive(Debug, Clone)]
pub struct GeometryData {
    /// Vertex positions (x, y, z)
    pub vertices: Vec<[f32; 3]>,
    /// Texture coordinates (u, v)
    pub tex_coords: Vec<[f32; 2]>,
    /// Normal vectors (x, y, z)
    pub normals: Vec<[f32; 3]>,
    /// Triangle indices (counter-clockwise winding)
    pub indices: Vec<u32>,
}

impl GeometryData {
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            tex_coords: Vec::new(),
            normals: Vec::new(),
            indices: Vec::new(),
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Interleaves positions, normals and UVs into the renderer's vertex format
    pub fn to_scene_format(&self) -> (Vec<crate::gfx::scene::vertex::Vertex3D>, Vec<u32>) {
        use crate::gfx::scene::vertex::Vertex3D;

        let vertices: Vec<Vertex3D> = (0..self.vertices.len())
            .map(|i| Vertex3D {
                position: self.vertices[i],
                normal: self.normals.get(i).copied().unwrap_or([0.0, 1.0, 0.0]),
                uv: self.tex_coords.get(i).copied().unwrap_or([0.0, 0.0]),
            })
            .collect();

        (vertices, self.indices.clone())
    }
}

impl Default for GeometryData {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixed shape parameters of a scene object
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PrimitiveDescriptor {
    Plane {
        width: f32,
        height: f32,
        width_segments: u32,
        height_segments: u32,
    },
    Sphere {
        radius: f32,
        width_segments: u32,
        height_segments: u32,
    },
    Torus {
        radius: f32,
        tube: f32,
        radial_segments: u32,
        tubular_segments: u32,
    },
}

impl PrimitiveDescriptor {
    pub fn generate(&self) -> GeometryData {
        match *self {
            PrimitiveDescriptor::Plane {
                width,
                height,
                width_segments,
                height_segments,
            } => generate_plane(width, height, width_segments, height_segments),
            PrimitiveDescriptor::Sphere {
                radius,
                width_segments,
                height_segments,
            } => generate_sphere(radius, width_segments, height_segments),
            PrimitiveDescriptor::Torus {
                radius,
                tube,
                radial_segments,
                tubular_segments,
            } => generate_torus(radius, tube, radial_segments, tubular_segments),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            PrimitiveDescriptor::Plane { .. } => "plane",
            PrimitiveDescriptor::Sphere { .. } => "sphere",
            PrimitiveDescriptor::Torus { .. } => "torus",
        }
    }
}
