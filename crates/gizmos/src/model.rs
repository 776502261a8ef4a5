use glam::Vec3;
use uuid::Uuid;

use shared::{Aabb, ObjectId, SupportParams, SupportPoint, Transform, TriangleMesh};

/// An object owned by the editor's document model.
///
/// The gizmos read from it every frame and write to it only on explicit
/// commit; nothing else may mutate it while a gizmo holds an edit session.
#[derive(Debug, Clone)]
pub struct ModelObject {
    pub id: ObjectId,
    pub name: String,
    pub mesh: TriangleMesh,
    pub transform: Transform,
    /// Committed support points, in object-local coordinates
    pub support_points: Vec<SupportPoint>,
    pub support_params: SupportParams,
}

impl ModelObject {
    pub fn new(name: impl Into<String>, mesh: TriangleMesh) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            mesh,
            transform: Transform::new(),
            support_points: Vec::new(),
            support_params: SupportParams::default(),
        }
    }

    /// Bounding box of the transformed mesh in world space
    pub fn world_aabb(&self) -> Aabb {
        let local = self.mesh.aabb();
        let m = self.transform.matrix();
        let corners = [
            Vec3::new(local.min.x, local.min.y, local.min.z),
            Vec3::new(local.max.x, local.min.y, local.min.z),
            Vec3::new(local.min.x, local.max.y, local.min.z),
            Vec3::new(local.max.x, local.max.y, local.min.z),
            Vec3::new(local.min.x, local.min.y, local.max.z),
            Vec3::new(local.max.x, local.min.y, local.max.z),
            Vec3::new(local.min.x, local.max.y, local.max.z),
            Vec3::new(local.max.x, local.max.y, local.max.z),
        ];
        Aabb::from_points(corners.iter().map(|c| m.transform_point3(*c)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_object_has_unique_id() {
        let mesh = TriangleMesh::default();
        let a = ModelObject::new("a", mesh.clone());
        let b = ModelObject::new("b", mesh);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_world_aabb_follows_translation() {
        let mesh = TriangleMesh::new(
            vec![Vec3::splat(-1.0), Vec3::splat(1.0), Vec3::new(1.0, -1.0, 1.0)],
            vec![0, 1, 2],
        );
        let mut obj = ModelObject::new("cube", mesh);
        obj.transform.position = Vec3::new(5.0, 0.0, 0.0);
        let aabb = obj.world_aabb();
        assert!((aabb.center().x - 5.0).abs() < 1e-6);
    }
}
