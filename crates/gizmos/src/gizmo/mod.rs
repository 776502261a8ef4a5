//! Viewport gizmos and their shared interaction contract.

pub mod rotate;
pub mod rotate3d;
pub mod selection_rect;
pub mod supports;

pub use rotate::{Axis, RotateGizmo};
pub use rotate3d::RotateGizmo3D;
pub use selection_rect::{RectMode, ScreenRect, SelectionRectangle};
pub use supports::{CacheEntry, EditSession, PointTarget, SupportGizmo};

use glam::{Vec2, Vec3};

use crate::camera::{ArcBallCamera, Viewport};
use crate::host::EditorHost;
use crate::model::ModelObject;
use crate::picking::{ray_sphere, Ray, SurfacePicker};

/// Whether a gizmo is currently active in the viewport
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GizmoState {
    #[default]
    Off,
    On,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Secondary,
    Middle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    pub shift: bool,
    pub alt: bool,
    pub ctrl: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerEventKind {
    Pressed(PointerButton),
    Released(PointerButton),
    Dragged(PointerButton),
    Moved,
}

/// A pointer event as delivered by the windowing layer.
#[derive(Debug, Clone, Copy)]
pub struct PointerEvent {
    pub kind: PointerEventKind,
    pub pos: Vec2,
    pub modifiers: Modifiers,
}

impl PointerEvent {
    pub fn new(kind: PointerEventKind, pos: Vec2) -> Self {
        Self {
            kind,
            pos,
            modifiers: Modifiers::default(),
        }
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }
}

/// Per-sample data handed to a gizmo during a drag.
#[derive(Debug, Clone, Copy)]
pub struct UpdateData {
    pub ray: Ray,
    pub pointer: Vec2,
}

/// Everything a gizmo may need while handling one event.
/// Handed in per call so gizmos never store a back-reference to the viewport.
pub struct GizmoContext<'a> {
    pub camera: &'a ArcBallCamera,
    pub viewport: Viewport,
    pub object: &'a ModelObject,
    pub picker: &'a dyn SurfacePicker,
    pub host: &'a mut dyn EditorHost,
}

/// Line and point geometry a gizmo emits for the external renderer.
#[derive(Debug, Clone, Default)]
pub struct DrawList {
    /// Interleaved line vertices: position (3 floats) + rgba (4 floats)
    pub line_vertices: Vec<f32>,
    pub points: Vec<PointMarker>,
}

#[derive(Debug, Clone, Copy)]
pub struct PointMarker {
    pub position: Vec3,
    pub radius: f32,
    pub color: [f32; 4],
}

impl DrawList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_line(&mut self, a: Vec3, b: Vec3, color: [f32; 4]) {
        for p in [a, b] {
            self.line_vertices
                .extend_from_slice(&[p.x, p.y, p.z, color[0], color[1], color[2], color[3]]);
        }
    }

    pub fn push_point(&mut self, position: Vec3, radius: f32, color: [f32; 4]) {
        self.points.push(PointMarker {
            position,
            radius,
            color,
        });
    }

    pub fn line_count(&self) -> usize {
        self.line_vertices.len() / 14
    }

    pub fn is_empty(&self) -> bool {
        self.line_vertices.is_empty() && self.points.is_empty()
    }
}

/// A pickable sphere a gizmo exposes instead of a picking render pass.
#[derive(Debug, Clone, Copy)]
pub struct PickShape {
    pub id: usize,
    pub center: Vec3,
    pub radius: f32,
}

/// Analytic replacement for the id-encoded picking render target:
/// returns the id of the nearest shape the ray hits.
pub fn resolve_hover(ray: &Ray, shapes: &[PickShape]) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for shape in shapes {
        if let Some(dist) = ray_sphere(ray, shape.center, shape.radius) {
            if best.is_none_or(|(_, d)| dist < d) {
                best = Some((shape.id, dist));
            }
        }
    }
    best.map(|(id, _)| id)
}

/// Common interaction capability every gizmo implements.
///
/// `on_mouse` returns whether the event was consumed; a consumed event stops
/// further propagation (camera controls, object selection).
pub trait Gizmo {
    fn state(&self) -> GizmoState;
    fn set_state(&mut self, state: GizmoState);

    fn hover_id(&self) -> Option<usize>;
    fn set_hover_id(&mut self, id: Option<usize>);

    /// The selection or its bounding geometry changed externally.
    fn data_changed(&mut self, object: &ModelObject);

    fn draw(&self) -> DrawList;
    fn picking_shapes(&self) -> Vec<PickShape>;

    fn start_dragging(&mut self);
    fn stop_dragging(&mut self);
    fn dragging(&mut self, data: &UpdateData, ctx: &mut GizmoContext);
    fn is_dragging(&self) -> bool;

    fn on_mouse(&mut self, event: &PointerEvent, ctx: &mut GizmoContext) -> bool;

    fn tooltip(&self) -> String {
        String::new()
    }

    fn is_in_editing_mode(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_hover_picks_nearest() {
        let ray = Ray {
            origin: Vec3::new(0.0, 0.0, 10.0),
            direction: Vec3::new(0.0, 0.0, -1.0),
        };
        let shapes = [
            PickShape {
                id: 0,
                center: Vec3::new(0.0, 0.0, -5.0),
                radius: 0.5,
            },
            PickShape {
                id: 1,
                center: Vec3::new(0.0, 0.0, 2.0),
                radius: 0.5,
            },
        ];
        assert_eq!(resolve_hover(&ray, &shapes), Some(1));
    }

    #[test]
    fn test_resolve_hover_none_on_miss() {
        let ray = Ray {
            origin: Vec3::new(0.0, 0.0, 10.0),
            direction: Vec3::new(0.0, 0.0, -1.0),
        };
        let shapes = [PickShape {
            id: 0,
            center: Vec3::new(5.0, 0.0, 0.0),
            radius: 0.5,
        }];
        assert_eq!(resolve_hover(&ray, &shapes), None);
    }

    #[test]
    fn test_draw_list_line_count() {
        let mut list = DrawList::new();
        list.push_line(Vec3::ZERO, Vec3::X, [1.0, 0.0, 0.0, 1.0]);
        list.push_line(Vec3::ZERO, Vec3::Y, [0.0, 1.0, 0.0, 1.0]);
        assert_eq!(list.line_count(), 2);
        assert!(!list.is_empty());
    }
}
