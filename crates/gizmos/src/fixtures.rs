//! Factory functions for meshes used in tests and by the harness.

use glam::Vec3;

use shared::TriangleMesh;

/// Axis-aligned cube centered at the origin with half extent `half`.
pub fn cube_mesh(half: f32) -> TriangleMesh {
    let s = half;
    let positions = vec![
        Vec3::new(-s, -s, -s),
        Vec3::new(s, -s, -s),
        Vec3::new(s, s, -s),
        Vec3::new(-s, s, -s),
        Vec3::new(-s, -s, s),
        Vec3::new(s, -s, s),
        Vec3::new(s, s, s),
        Vec3::new(-s, s, s),
    ];
    let indices = vec![
        4, 5, 6, 4, 6, 7, // front  (+z)
        1, 0, 3, 1, 3, 2, // back   (-z)
        0, 4, 7, 0, 7, 3, // left   (-x)
        5, 1, 2, 5, 2, 6, // right  (+x)
        0, 1, 5, 0, 5, 4, // bottom (-y)
        7, 6, 2, 7, 2, 3, // top    (+y)
    ];
    TriangleMesh::new(positions, indices)
}

/// Single quad in the XY plane at z = 0, half extent `half`.
pub fn quad_mesh(half: f32) -> TriangleMesh {
    let s = half;
    TriangleMesh::new(
        vec![
            Vec3::new(-s, -s, 0.0),
            Vec3::new(s, -s, 0.0),
            Vec3::new(s, s, 0.0),
            Vec3::new(-s, s, 0.0),
        ],
        vec![0, 1, 2, 0, 2, 3],
    )
}
