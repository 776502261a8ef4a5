use glam::{Mat4, Vec3};

use shared::{Aabb, Transform, TriangleMesh};

/// A ray in world space
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

/// Ray-plane intersection.
/// Returns the ray parameter, or None if the ray is parallel to the plane
/// or the intersection lies behind the origin.
pub fn ray_plane(ray: &Ray, plane_point: Vec3, plane_normal: Vec3) -> Option<f32> {
    let denom = ray.direction.dot(plane_normal);
    if denom.abs() < 1e-6 {
        return None;
    }
    let t = (plane_point - ray.origin).dot(plane_normal) / denom;
    if t < 0.0 {
        return None;
    }
    Some(t)
}

/// Ray-sphere intersection, nearest positive hit distance.
pub fn ray_sphere(ray: &Ray, center: Vec3, radius: f32) -> Option<f32> {
    let oc = ray.origin - center;
    let b = oc.dot(ray.direction);
    let c = oc.dot(oc) - radius * radius;
    let disc = b * b - c;
    if disc < 0.0 {
        return None;
    }
    let sqrt_disc = disc.sqrt();
    let t = -b - sqrt_disc;
    if t >= 0.0 {
        return Some(t);
    }
    let t = -b + sqrt_disc;
    if t >= 0.0 {
        return Some(t);
    }
    None
}

/// Ray-AABB intersection using the slab method.
/// Returns the distance along the ray to the nearest hit, or None.
pub fn ray_aabb(ray: &Ray, aabb: &Aabb) -> Option<f32> {
    let inv_dir = Vec3::new(
        1.0 / ray.direction.x,
        1.0 / ray.direction.y,
        1.0 / ray.direction.z,
    );

    let t1 = (aabb.min.x - ray.origin.x) * inv_dir.x;
    let t2 = (aabb.max.x - ray.origin.x) * inv_dir.x;
    let t3 = (aabb.min.y - ray.origin.y) * inv_dir.y;
    let t4 = (aabb.max.y - ray.origin.y) * inv_dir.y;
    let t5 = (aabb.min.z - ray.origin.z) * inv_dir.z;
    let t6 = (aabb.max.z - ray.origin.z) * inv_dir.z;

    let tmin = t1.min(t2).max(t3.min(t4)).max(t5.min(t6));
    let tmax = t1.max(t2).min(t3.max(t4)).min(t5.max(t6));

    if tmax < 0.0 || tmin > tmax {
        return None;
    }

    Some(if tmin < 0.0 { tmax } else { tmin })
}

/// Möller-Trumbore ray-triangle intersection.
/// Returns the distance along the ray if hit, or None.
pub fn ray_triangle_intersect(ray: &Ray, v0: Vec3, v1: Vec3, v2: Vec3) -> Option<f32> {
    const EPSILON: f32 = 1e-7;

    let edge1 = v1 - v0;
    let edge2 = v2 - v0;
    let h = ray.direction.cross(edge2);
    let a = edge1.dot(h);

    // Ray is parallel to triangle
    if a.abs() < EPSILON {
        return None;
    }

    let f = 1.0 / a;
    let s = ray.origin - v0;
    let u = f * s.dot(h);

    if !(0.0..=1.0).contains(&u) {
        return None;
    }

    let q = s.cross(edge1);
    let v = f * ray.direction.dot(q);

    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    let t = f * edge2.dot(q);

    if t > EPSILON {
        Some(t)
    } else {
        None
    }
}

/// Point and surface normal of a mesh-surface hit, in object-local coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceHit {
    pub position: Vec3,
    pub normal: Vec3,
}

/// Mesh-surface hit-testing contract.
///
/// The production backend sits behind this trait; `MeshRaycaster` is the
/// in-process implementation used by the harness and tests.
pub trait SurfacePicker {
    /// Project a world-space ray onto the mesh surface.
    fn unproject(&self, ray: &Ray) -> Option<SurfaceHit>;
}

/// Brute-force triangle raycaster over a `TriangleMesh` placed by `transform`.
pub struct MeshRaycaster<'a> {
    mesh: &'a TriangleMesh,
    local_from_world: Mat4,
}

impl<'a> MeshRaycaster<'a> {
    pub fn new(mesh: &'a TriangleMesh, transform: &Transform) -> Self {
        Self {
            mesh,
            local_from_world: transform.matrix().inverse(),
        }
    }
}

impl SurfacePicker for MeshRaycaster<'_> {
    fn unproject(&self, ray: &Ray) -> Option<SurfaceHit> {
        let local_ray = Ray {
            origin: self.local_from_world.transform_point3(ray.origin),
            direction: self
                .local_from_world
                .transform_vector3(ray.direction)
                .normalize_or_zero(),
        };

        let mut best: Option<(f32, usize)> = None;
        for tri in 0..self.mesh.triangle_count() {
            let (v0, v1, v2) = self.mesh.triangle(tri);
            if let Some(dist) = ray_triangle_intersect(&local_ray, v0, v1, v2) {
                if best.is_none_or(|(d, _)| dist < d) {
                    best = Some((dist, tri));
                }
            }
        }

        best.map(|(dist, tri)| {
            let (v0, v1, v2) = self.mesh.triangle(tri);
            let mut normal = (v1 - v0).cross(v2 - v0).normalize_or_zero();
            // Orient toward the viewer so support heads face outward
            if normal.dot(local_ray.direction) > 0.0 {
                normal = -normal;
            }
            SurfaceHit {
                position: local_ray.at(dist),
                normal,
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad_mesh() -> TriangleMesh {
        // Unit quad in the XY plane at z = 0
        TriangleMesh::new(
            vec![
                Vec3::new(-1.0, -1.0, 0.0),
                Vec3::new(1.0, -1.0, 0.0),
                Vec3::new(1.0, 1.0, 0.0),
                Vec3::new(-1.0, 1.0, 0.0),
            ],
            vec![0, 1, 2, 0, 2, 3],
        )
    }

    #[test]
    fn test_ray_plane_hit() {
        let ray = Ray {
            origin: Vec3::new(0.0, 0.0, 5.0),
            direction: Vec3::new(0.0, 0.0, -1.0),
        };
        let t = ray_plane(&ray, Vec3::ZERO, Vec3::Z).unwrap();
        assert!((t - 5.0).abs() < 1e-6);
    }

    #[test]
    fn test_ray_plane_parallel_misses() {
        let ray = Ray {
            origin: Vec3::new(0.0, 0.0, 5.0),
            direction: Vec3::X,
        };
        assert!(ray_plane(&ray, Vec3::ZERO, Vec3::Z).is_none());
    }

    #[test]
    fn test_ray_sphere_hit_from_outside() {
        let ray = Ray {
            origin: Vec3::new(0.0, 0.0, 5.0),
            direction: Vec3::new(0.0, 0.0, -1.0),
        };
        let t = ray_sphere(&ray, Vec3::ZERO, 1.0).unwrap();
        assert!((t - 4.0).abs() < 1e-5);
    }

    #[test]
    fn test_ray_sphere_miss() {
        let ray = Ray {
            origin: Vec3::new(3.0, 0.0, 5.0),
            direction: Vec3::new(0.0, 0.0, -1.0),
        };
        assert!(ray_sphere(&ray, Vec3::ZERO, 1.0).is_none());
    }

    #[test]
    fn test_unproject_hits_quad() {
        let mesh = quad_mesh();
        let raycaster = MeshRaycaster::new(&mesh, &Transform::new());
        let ray = Ray {
            origin: Vec3::new(0.25, 0.25, 3.0),
            direction: Vec3::new(0.0, 0.0, -1.0),
        };
        let hit = raycaster.unproject(&ray).unwrap();
        assert!((hit.position - Vec3::new(0.25, 0.25, 0.0)).length() < 1e-5);
        // Normal faces back toward the ray origin
        assert!(hit.normal.dot(ray.direction) < 0.0);
    }

    #[test]
    fn test_unproject_miss_outside_quad() {
        let mesh = quad_mesh();
        let raycaster = MeshRaycaster::new(&mesh, &Transform::new());
        let ray = Ray {
            origin: Vec3::new(5.0, 5.0, 3.0),
            direction: Vec3::new(0.0, 0.0, -1.0),
        };
        assert!(raycaster.unproject(&ray).is_none());
    }

    #[test]
    fn test_unproject_respects_transform() {
        let mesh = quad_mesh();
        let mut transform = Transform::new();
        transform.position = Vec3::new(10.0, 0.0, 0.0);
        let raycaster = MeshRaycaster::new(&mesh, &transform);

        let ray = Ray {
            origin: Vec3::new(10.0, 0.0, 3.0),
            direction: Vec3::new(0.0, 0.0, -1.0),
        };
        let hit = raycaster.unproject(&ray).unwrap();
        // Hit position is reported in object-local coordinates
        assert!((hit.position - Vec3::ZERO).length() < 1e-4);
    }

    #[test]
    fn test_ray_aabb_hit_and_miss() {
        let aabb = Aabb {
            min: Vec3::splat(-1.0),
            max: Vec3::splat(1.0),
        };
        let hit = Ray {
            origin: Vec3::new(0.0, 0.0, 5.0),
            direction: Vec3::new(0.0, 0.0, -1.0),
        };
        let miss = Ray {
            origin: Vec3::new(5.0, 5.0, 5.0),
            direction: Vec3::new(0.0, 0.0, -1.0),
        };
        assert!((ray_aabb(&hit, &aabb).unwrap() - 4.0).abs() < 1e-5);
        assert!(ray_aabb(&miss, &aabb).is_none());
    }
}
