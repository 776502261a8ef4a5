//! Three-axis rotation gizmo.
//!
//! A tagged container of three dials; hover picks exactly one active axis and
//! dragging is always routed to it. Rotation is exposed as three independent
//! axis angles, not a composed quaternion: edits are axis-aligned and never
//! simultaneous.

use glam::Vec3;

use crate::model::ModelObject;

use super::rotate::{Axis, RotateGizmo};
use super::{DrawList, Gizmo, GizmoContext, GizmoState, PickShape, PointerEvent, UpdateData};

const AXES: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

pub struct RotateGizmo3D {
    gizmos: [RotateGizmo; 3],
    state: GizmoState,
    hover_axis: Option<Axis>,
}

impl RotateGizmo3D {
    pub fn new() -> Self {
        Self {
            gizmos: [
                RotateGizmo::new(Axis::X),
                RotateGizmo::new(Axis::Y),
                RotateGizmo::new(Axis::Z),
            ],
            state: GizmoState::Off,
            hover_axis: None,
        }
    }

    /// The three accumulated axis angles as one vector.
    pub fn rotation(&self) -> Vec3 {
        Vec3::new(
            self.gizmos[0].angle() as f32,
            self.gizmos[1].angle() as f32,
            self.gizmos[2].angle() as f32,
        )
    }

    pub fn set_rotation(&mut self, rotation: Vec3) {
        self.gizmos[0].set_angle(rotation.x as f64);
        self.gizmos[1].set_angle(rotation.y as f64);
        self.gizmos[2].set_angle(rotation.z as f64);
    }

    pub fn axis_gizmo(&self, axis: Axis) -> &RotateGizmo {
        &self.gizmos[axis as usize]
    }

    /// Axis being dragged, or the hovered one when idle.
    pub fn active_axis(&self) -> Option<Axis> {
        self.dragging_axis().or(self.hover_axis)
    }

    fn dragging_axis(&self) -> Option<Axis> {
        AXES.into_iter()
            .find(|a| self.gizmos[*a as usize].is_dragging())
    }

    /// Abort an in-flight drag, restoring the pre-drag angle.
    pub fn cancel_drag(&mut self) {
        for g in &mut self.gizmos {
            g.cancel_drag();
        }
    }

    /// Feed one drag sample to the axis being dragged.
    pub fn update_drag(&mut self, ray: &crate::picking::Ray) {
        if let Some(axis) = self.dragging_axis() {
            self.gizmos[axis as usize].update_drag(ray);
        }
    }
}

impl Default for RotateGizmo3D {
    fn default() -> Self {
        Self::new()
    }
}

impl Gizmo for RotateGizmo3D {
    fn state(&self) -> GizmoState {
        self.state
    }

    fn set_state(&mut self, state: GizmoState) {
        self.state = state;
        for g in &mut self.gizmos {
            g.set_state(state);
        }
    }

    fn hover_id(&self) -> Option<usize> {
        self.hover_axis.map(|a| a as usize)
    }

    /// Activates exactly one axis: the picked one gets hover, the others lose
    /// theirs.
    fn set_hover_id(&mut self, id: Option<usize>) {
        self.hover_axis = match id {
            Some(0) => Some(Axis::X),
            Some(1) => Some(Axis::Y),
            Some(2) => Some(Axis::Z),
            _ => None,
        };
        for (i, g) in self.gizmos.iter_mut().enumerate() {
            g.set_hover_id(if Some(i) == id { Some(0) } else { None });
        }
    }

    fn data_changed(&mut self, object: &ModelObject) {
        for g in &mut self.gizmos {
            g.data_changed(object);
        }
        self.set_rotation(object.transform.rotation);
    }

    fn draw(&self) -> DrawList {
        // While dragging only the active dial is shown
        if let Some(axis) = self.dragging_axis() {
            return self.gizmos[axis as usize].draw();
        }
        let mut list = DrawList::new();
        for g in &self.gizmos {
            let part = g.draw();
            list.line_vertices.extend(part.line_vertices);
            list.points.extend(part.points);
        }
        list
    }

    fn picking_shapes(&self) -> Vec<PickShape> {
        let mut shapes = Vec::new();
        for (i, g) in self.gizmos.iter().enumerate() {
            for mut shape in g.picking_shapes() {
                shape.id = i;
                shapes.push(shape);
            }
        }
        shapes
    }

    fn start_dragging(&mut self) {
        if let Some(axis) = self.hover_axis {
            self.gizmos[axis as usize].start_dragging();
        }
    }

    fn stop_dragging(&mut self) {
        if let Some(axis) = self.dragging_axis() {
            self.gizmos[axis as usize].stop_dragging();
        }
    }

    fn dragging(&mut self, data: &UpdateData, ctx: &mut GizmoContext) {
        if let Some(axis) = self.dragging_axis() {
            self.gizmos[axis as usize].dragging(data, ctx);
        }
    }

    fn is_dragging(&self) -> bool {
        self.dragging_axis().is_some()
    }

    fn on_mouse(&mut self, event: &PointerEvent, ctx: &mut GizmoContext) -> bool {
        if self.state == GizmoState::Off {
            return false;
        }
        if let Some(axis) = self.dragging_axis() {
            return self.gizmos[axis as usize].on_mouse(event, ctx);
        }
        if let Some(axis) = self.hover_axis {
            return self.gizmos[axis as usize].on_mouse(event, ctx);
        }
        false
    }

    fn tooltip(&self) -> String {
        for g in &self.gizmos {
            let tooltip = g.tooltip();
            if !tooltip.is_empty() {
                return tooltip;
            }
        }
        String::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;

    fn gizmo_with_object() -> (RotateGizmo3D, ModelObject) {
        let object = ModelObject::new("cube", fixtures::cube_mesh(1.0));
        let mut g = RotateGizmo3D::new();
        g.set_state(GizmoState::On);
        g.data_changed(&object);
        (g, object)
    }

    #[test]
    fn test_rotation_round_trip() {
        let (mut g, _) = gizmo_with_object();
        let rotation = Vec3::new(0.1, 0.2, 0.3);
        g.set_rotation(rotation);
        assert!((g.rotation() - rotation).length() < 1e-6);
    }

    #[test]
    fn test_hover_activates_single_axis() {
        let (mut g, _) = gizmo_with_object();
        g.set_hover_id(Some(1));
        assert_eq!(g.active_axis(), Some(Axis::Y));
        assert!(g.axis_gizmo(Axis::Y).hover_id().is_some());
        assert!(g.axis_gizmo(Axis::X).hover_id().is_none());
        assert!(g.axis_gizmo(Axis::Z).hover_id().is_none());

        g.set_hover_id(Some(2));
        assert!(g.axis_gizmo(Axis::Y).hover_id().is_none());
        assert!(g.axis_gizmo(Axis::Z).hover_id().is_some());

        g.set_hover_id(None);
        assert_eq!(g.active_axis(), None);
    }

    #[test]
    fn test_dragging_routes_to_hovered_axis() {
        let (mut g, _) = gizmo_with_object();
        g.set_hover_id(Some(2));
        g.start_dragging();
        assert!(g.is_dragging());
        assert!(g.axis_gizmo(Axis::Z).is_dragging());
        assert!(!g.axis_gizmo(Axis::X).is_dragging());
        g.stop_dragging();
        assert!(!g.is_dragging());
    }

    #[test]
    fn test_data_changed_syncs_angles_from_object() {
        let object = {
            let mut o = ModelObject::new("cube", fixtures::cube_mesh(1.0));
            o.transform.rotation = Vec3::new(0.4, 0.0, 1.2);
            o
        };
        let mut g = RotateGizmo3D::new();
        g.set_state(GizmoState::On);
        g.data_changed(&object);
        assert!((g.rotation() - object.transform.rotation).length() < 1e-6);
    }

    #[test]
    fn test_tooltip_scans_axes_in_order() {
        let (mut g, _) = gizmo_with_object();
        assert!(g.tooltip().is_empty());

        g.set_hover_id(Some(1));
        let tooltip = g.tooltip();
        assert!(tooltip.starts_with("Y:"), "{tooltip}");
    }

    #[test]
    fn test_picking_shapes_tagged_by_axis() {
        let (g, _) = gizmo_with_object();
        let shapes = g.picking_shapes();
        assert_eq!(shapes.len(), 3);
        let ids: Vec<usize> = shapes.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![0, 1, 2]);
    }

    #[test]
    fn test_draw_shows_only_active_axis_while_dragging() {
        let (mut g, _) = gizmo_with_object();
        let idle_lines = g.draw().line_count();

        g.set_hover_id(Some(0));
        g.start_dragging();
        let drag_lines = g.draw().line_count();
        assert!(drag_lines < idle_lines);
    }
}
