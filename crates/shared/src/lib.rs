//! Data types shared between the editor application and the gizmo layer.
//!
//! Everything here crosses the host boundary and is serde-serializable so the
//! host can persist it and the undo/redo stack can snapshot it.

use glam::{EulerRot, Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};

pub mod text;

/// Unique identifier of an object in the document
pub type ObjectId = String;

/// Tolerant float comparison used by all equality rules in this crate.
pub fn approx_eq(a: f32, b: f32) -> bool {
    (a - b).abs() < f32::EPSILON
}

/// A support anchor placed on the mesh surface.
///
/// Positions are in object-local coordinates. The `island` flag is owned by
/// the external support-generation subsystem; this layer only carries it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SupportPoint {
    pub pos: Vec3,
    /// Radius of the support head sphere
    pub head_radius: f32,
    /// Whether the point was generated to prop up an isolated island
    pub island: bool,
}

impl SupportPoint {
    pub fn new(pos: Vec3, head_radius: f32, island: bool) -> Self {
        Self {
            pos,
            head_radius,
            island,
        }
    }
}

impl PartialEq for SupportPoint {
    fn eq(&self, other: &Self) -> bool {
        approx_eq(self.pos.x, other.pos.x)
            && approx_eq(self.pos.y, other.pos.y)
            && approx_eq(self.pos.z, other.pos.z)
            && approx_eq(self.head_radius, other.head_radius)
            && self.island == other.island
    }
}

/// Global support-generation parameters editable alongside the points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SupportParams {
    /// Minimal distance between generated points [mm]
    pub minimal_distance: f32,
    /// Relative point density [%]
    pub density: f32,
}

impl Default for SupportParams {
    fn default() -> Self {
        Self {
            minimal_distance: 1.0,
            density: 100.0,
        }
    }
}

/// Object placement in the scene
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: Vec3,
    /// Independent rotation angles around X, Y, Z (radians)
    pub rotation: Vec3,
    pub scale: Vec3,
}

impl Transform {
    pub fn new() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
        }
    }

    /// World-from-local matrix
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(
            self.scale,
            Quat::from_euler(
                EulerRot::XYZ,
                self.rotation.x,
                self.rotation.y,
                self.rotation.z,
            ),
            self.position,
        )
    }

    /// Rotation-only matrix (orientation of the object)
    pub fn orientation(&self) -> Mat4 {
        Mat4::from_quat(Quat::from_euler(
            EulerRot::XYZ,
            self.rotation.x,
            self.rotation.y,
            self.rotation.z,
        ))
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::new()
    }
}

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn from_points<I: IntoIterator<Item = Vec3>>(points: I) -> Self {
        let mut min = Vec3::splat(f32::MAX);
        let mut max = Vec3::splat(f32::MIN);
        for p in points {
            min = min.min(p);
            max = max.max(p);
        }
        Self { min, max }
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Half diagonal length; the bounding sphere radius around `center`
    pub fn radius(&self) -> f32 {
        self.size().length() * 0.5
    }
}

/// Indexed triangle mesh in object-local coordinates
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TriangleMesh {
    pub positions: Vec<Vec3>,
    pub indices: Vec<u32>,
}

impl TriangleMesh {
    pub fn new(positions: Vec<Vec3>, indices: Vec<u32>) -> Self {
        Self { positions, indices }
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Vertices of triangle `i`
    pub fn triangle(&self, i: usize) -> (Vec3, Vec3, Vec3) {
        let base = i * 3;
        (
            self.positions[self.indices[base] as usize],
            self.positions[self.indices[base + 1] as usize],
            self.positions[self.indices[base + 2] as usize],
        )
    }

    pub fn aabb(&self) -> Aabb {
        Aabb::from_points(self.positions.iter().copied())
    }
}
