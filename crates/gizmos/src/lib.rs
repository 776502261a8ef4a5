//! Interactive 3D-manipulation widgets for the mesh-prep viewport.
//!
//! Two gizmos built on a common interaction contract: a three-axis rotation
//! dial with angle snapping, and a support-point editor backed by a
//! transactional cache with commit/discard semantics and binary undo/redo
//! snapshots. Rendering, windowing and the recomputation backend stay outside
//! behind small contracts (`DrawList` output, `PointerEvent` input,
//! `EditorHost` / `SurfacePicker` traits).

pub mod camera;
pub mod fixtures;
pub mod gizmo;
pub mod harness;
pub mod host;
pub mod model;
pub mod picking;
pub mod snapshot;
