//! Single-axis rotation dial.
//!
//! Converts pointer motion into an angle around one fixed axis: the mouse ray
//! is intersected with the dial plane (through the gizmo center, perpendicular
//! to the axis, following the object's orientation), the in-plane polar angle
//! is snapped against the radial snap bands, and the delta between successive
//! samples is accumulated into the gizmo angle.

use std::f64::consts::{PI, TAU};

use glam::{Mat4, Vec2, Vec3};

use crate::model::ModelObject;
use crate::picking::Ray;

use super::{
    DrawList, Gizmo, GizmoContext, GizmoState, PickShape, PointerButton, PointerEvent,
    PointerEventKind, UpdateData,
};

/// Dial offset beyond the selection's bounding sphere [mm]
const OFFSET: f32 = 5.0;
/// Segments used to tessellate the dial circle
const CIRCLE_RESOLUTION: usize = 64;
/// Number of tick marks on the scale
const SCALE_STEPS: usize = 72;
const SCALE_STEP_RAD: f64 = TAU / SCALE_STEPS as f64;
/// Every n-th tick is drawn long
const SCALE_LONG_EVERY: usize = 5;
/// Long tick length as a fraction of the dial radius
const SCALE_LONG_TOOTH: f32 = 0.1;
/// Number of coarse snap regions on the dial
const SNAP_REGIONS: usize = 8;
/// Grabber distance beyond the dial radius, as a fraction of it
const GRABBER_OFFSET: f32 = 0.15;
/// Grabber sphere size as a fraction of the dial radius
const GRABBER_RADIUS_RATIO: f32 = 0.06;

const COLOR_X: [f32; 4] = [0.9, 0.2, 0.2, 1.0];
const COLOR_Y: [f32; 4] = [0.2, 0.8, 0.2, 1.0];
const COLOR_Z: [f32; 4] = [0.2, 0.3, 0.9, 1.0];
const COLOR_ACTIVE: [f32; 4] = [0.95, 0.95, 0.95, 1.0];

/// Which axis a rotation dial belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X = 0,
    Y = 1,
    Z = 2,
}

impl Axis {
    pub fn unit(&self) -> Vec3 {
        match self {
            Axis::X => Vec3::X,
            Axis::Y => Vec3::Y,
            Axis::Z => Vec3::Z,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Axis::X => "X",
            Axis::Y => "Y",
            Axis::Z => "Z",
        }
    }

    pub fn color(&self) -> [f32; 4] {
        match self {
            Axis::X => COLOR_X,
            Axis::Y => COLOR_Y,
            Axis::Z => COLOR_Z,
        }
    }

    /// Frame that maps dial-local coordinates (dial in the XY plane, rotation
    /// axis along +Z) onto this world axis. The extra in-plane rotation keeps
    /// the three grabbers at distinct world positions at angle zero.
    fn frame(&self) -> Mat4 {
        match self {
            Axis::X => {
                Mat4::from_rotation_y(std::f32::consts::FRAC_PI_2)
                    * Mat4::from_rotation_z(-std::f32::consts::FRAC_PI_2)
            }
            Axis::Y => {
                Mat4::from_rotation_x(-std::f32::consts::FRAC_PI_2)
                    * Mat4::from_rotation_z(-std::f32::consts::FRAC_PI_2)
            }
            Axis::Z => Mat4::IDENTITY,
        }
    }
}

/// Wrap an angle into `[0, 2π)`.
pub fn normalize_angle(a: f64) -> f64 {
    a.rem_euclid(TAU)
}

#[derive(Debug, Clone, Copy)]
struct DragState {
    /// Angle at drag start, restored on cancel
    start_angle: f64,
    /// In-plane angle of the previous sample
    last_theta: Option<f64>,
}

/// Rotation dial around one fixed axis.
pub struct RotateGizmo {
    axis: Axis,
    state: GizmoState,
    hover: Option<usize>,
    angle: f64,
    center: Vec3,
    radius: f32,
    snap_coarse_in: f32,
    snap_coarse_out: f32,
    snap_fine_in: f32,
    snap_fine_out: f32,
    /// Orientation of the edited object; the dial plane follows it
    orient: Mat4,
    drag: Option<DragState>,
}

impl RotateGizmo {
    pub fn new(axis: Axis) -> Self {
        Self {
            axis,
            state: GizmoState::Off,
            hover: None,
            angle: 0.0,
            center: Vec3::ZERO,
            radius: 0.0,
            snap_coarse_in: 0.0,
            snap_coarse_out: 0.0,
            snap_fine_in: 0.0,
            snap_fine_out: 0.0,
            orient: Mat4::IDENTITY,
            drag: None,
        }
    }

    pub fn axis(&self) -> Axis {
        self.axis
    }

    pub fn angle(&self) -> f64 {
        self.angle
    }

    pub fn set_angle(&mut self, angle: f64) {
        self.angle = angle;
    }

    pub fn center(&self) -> Vec3 {
        self.center
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Derive center, radius and the snap bands from the selection's bounding
    /// geometry. Called when the selection or its bounding box changes, never
    /// mid-drag: resizing the bands under the pointer would make the snap
    /// thresholds jitter.
    pub fn init_from_object(&mut self, object: &ModelObject) {
        let bbox = object.world_aabb();
        self.center = bbox.center();
        self.radius = OFFSET + bbox.radius();
        self.orient = object.transform.orientation();
        self.snap_coarse_in = self.radius / 3.0;
        self.snap_coarse_out = self.snap_coarse_in * 2.0;
        self.snap_fine_in = self.radius;
        self.snap_fine_out = self.radius * (1.0 + SCALE_LONG_TOOTH);
    }

    fn world_from_gizmo(&self) -> Mat4 {
        Mat4::from_translation(self.center) * self.orient * self.axis.frame()
    }

    /// Intersection of the mouse ray with the dial plane, in dial-local 2D
    /// coordinates. None when the ray is parallel to the plane or the
    /// intersection lies behind the ray origin.
    fn local_plane_position(&self, ray: &Ray) -> Option<Vec2> {
        let inv = self.world_from_gizmo().inverse();
        let origin = inv.transform_point3(ray.origin);
        let direction = inv.transform_vector3(ray.direction);

        if direction.z.abs() < 1e-6 {
            return None;
        }
        let t = -origin.z / direction.z;
        if t < 0.0 {
            return None;
        }
        let hit = origin + direction * t;
        Some(Vec2::new(hit.x, hit.y))
    }

    /// Snap the in-plane angle against the radial bands. The pointer's
    /// distance from the center decides which grid applies.
    fn snap_theta(&self, theta: f64, radial: f32) -> f64 {
        let mut theta = theta;
        if radial >= self.snap_coarse_in && radial <= self.snap_coarse_out {
            let step = TAU / SNAP_REGIONS as f64;
            theta = (theta / step).round() * step;
        } else if radial >= self.snap_fine_in && radial <= self.snap_fine_out {
            theta = (theta / SCALE_STEP_RAD).round() * SCALE_STEP_RAD;
        }
        if (TAU - theta).abs() < 1e-9 {
            theta = 0.0;
        }
        theta
    }

    /// One drag sample: accumulate the delta between this and the previous
    /// in-plane angle. A ray that misses the plane keeps the previous angle.
    pub fn update_drag(&mut self, ray: &Ray) {
        if self.drag.is_none() {
            return;
        }
        let Some(pos) = self.local_plane_position(ray) else {
            return;
        };

        let mut theta = (pos.y.atan2(pos.x)) as f64;
        if theta < 0.0 {
            theta += TAU;
        }
        theta = self.snap_theta(theta, pos.length());

        if let Some(drag) = self.drag.as_mut() {
            match drag.last_theta {
                None => drag.last_theta = Some(theta),
                Some(last) => {
                    let mut delta = theta - last;
                    if delta > PI {
                        delta -= TAU;
                    } else if delta < -PI {
                        delta += TAU;
                    }
                    drag.last_theta = Some(theta);
                    self.angle = normalize_angle(self.angle + delta);
                }
            }
        }
    }

    /// Abort the drag and restore the pre-drag angle.
    pub fn cancel_drag(&mut self) {
        if let Some(drag) = self.drag.take() {
            self.angle = drag.start_angle;
        }
    }

    /// World position on the dial at polar angle `theta`, `radial_scale`
    /// relative to the dial radius.
    fn dial_point(&self, theta: f64, radial_scale: f32) -> Vec3 {
        let r = self.radius * radial_scale;
        self.world_from_gizmo().transform_point3(Vec3::new(
            r * theta.cos() as f32,
            r * theta.sin() as f32,
            0.0,
        ))
    }

    fn grabber_center(&self) -> Vec3 {
        self.dial_point(self.angle, 1.0 + GRABBER_OFFSET)
    }

    fn active_color(&self) -> [f32; 4] {
        if self.drag.is_some() || self.hover.is_some() {
            COLOR_ACTIVE
        } else {
            self.axis.color()
        }
    }
}

impl Gizmo for RotateGizmo {
    fn state(&self) -> GizmoState {
        self.state
    }

    fn set_state(&mut self, state: GizmoState) {
        if state == GizmoState::Off {
            self.drag = None;
            self.hover = None;
        }
        self.state = state;
    }

    fn hover_id(&self) -> Option<usize> {
        self.hover
    }

    fn set_hover_id(&mut self, id: Option<usize>) {
        self.hover = id;
    }

    fn data_changed(&mut self, object: &ModelObject) {
        self.init_from_object(object);
    }

    fn draw(&self) -> DrawList {
        let mut list = DrawList::new();
        if self.state == GizmoState::Off || self.radius <= 0.0 {
            return list;
        }
        let color = self.active_color();

        // Dial circle
        let step = TAU / CIRCLE_RESOLUTION as f64;
        for i in 0..CIRCLE_RESOLUTION {
            let a = self.dial_point(i as f64 * step, 1.0);
            let b = self.dial_point((i + 1) as f64 * step, 1.0);
            list.push_line(a, b, color);
        }

        // Tick scale, long tooth every SCALE_LONG_EVERY steps
        for i in 0..SCALE_STEPS {
            let theta = i as f64 * SCALE_STEP_RAD;
            let tooth = if i % SCALE_LONG_EVERY == 0 {
                SCALE_LONG_TOOTH
            } else {
                SCALE_LONG_TOOTH * 0.5
            };
            list.push_line(
                self.dial_point(theta, 1.0),
                self.dial_point(theta, 1.0 + tooth),
                color,
            );
        }

        // Snap region boundaries in the coarse band
        for i in 0..SNAP_REGIONS {
            let theta = i as f64 * TAU / SNAP_REGIONS as f64;
            let in_scale = self.snap_coarse_in / self.radius;
            let out_scale = self.snap_coarse_out / self.radius;
            list.push_line(
                self.dial_point(theta, in_scale),
                self.dial_point(theta, out_scale),
                color,
            );
        }

        // Reference radius at angle zero
        list.push_line(
            self.dial_point(0.0, 0.0),
            self.dial_point(0.0, 1.0 + GRABBER_OFFSET),
            color,
        );

        // Swept angle arc
        if self.angle.abs() > f64::EPSILON {
            let arc_steps =
                ((self.angle / TAU * CIRCLE_RESOLUTION as f64).ceil() as usize).max(1);
            let arc_step = self.angle / arc_steps as f64;
            for i in 0..arc_steps {
                let a = self.dial_point(i as f64 * arc_step, 1.0 / 3.0);
                let b = self.dial_point((i + 1) as f64 * arc_step, 1.0 / 3.0);
                list.push_line(a, b, color);
            }
        }

        // Grabber and its connection to the dial
        list.push_line(self.dial_point(self.angle, 1.0), self.grabber_center(), color);
        list.push_point(
            self.grabber_center(),
            self.radius * GRABBER_RADIUS_RATIO,
            color,
        );

        list
    }

    fn picking_shapes(&self) -> Vec<PickShape> {
        if self.state == GizmoState::Off || self.radius <= 0.0 {
            return Vec::new();
        }
        vec![PickShape {
            id: 0,
            center: self.grabber_center(),
            // Generous pick target so the grabber is draggable at an angle
            radius: self.radius * GRABBER_RADIUS_RATIO * 2.0,
        }]
    }

    fn start_dragging(&mut self) {
        self.drag = Some(DragState {
            start_angle: self.angle,
            last_theta: None,
        });
    }

    fn stop_dragging(&mut self) {
        if self.drag.take().is_some() {
            tracing::debug!(
                axis = self.axis.label(),
                angle = self.angle,
                "rotation drag committed"
            );
        }
    }

    fn dragging(&mut self, data: &UpdateData, _ctx: &mut GizmoContext) {
        self.update_drag(&data.ray);
    }

    fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    fn on_mouse(&mut self, event: &PointerEvent, ctx: &mut GizmoContext) -> bool {
        if self.state == GizmoState::Off {
            return false;
        }
        match event.kind {
            PointerEventKind::Pressed(PointerButton::Primary) => {
                if self.hover.is_some() {
                    self.start_dragging();
                    return true;
                }
                false
            }
            PointerEventKind::Dragged(PointerButton::Primary) => {
                if self.drag.is_some() {
                    let ray = ctx.camera.screen_ray(event.pos, ctx.viewport);
                    self.update_drag(&ray);
                    return true;
                }
                false
            }
            PointerEventKind::Released(PointerButton::Primary) => {
                if self.drag.is_some() {
                    self.stop_dragging();
                    return true;
                }
                false
            }
            _ => false,
        }
    }

    fn tooltip(&self) -> String {
        if self.drag.is_some() || self.hover.is_some() {
            format!("{}: {:.2}°", self.axis.label(), self.angle.to_degrees())
        } else {
            String::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;

    fn z_gizmo() -> RotateGizmo {
        let object = ModelObject::new("cube", fixtures::cube_mesh(1.0));
        let mut g = RotateGizmo::new(Axis::Z);
        g.init_from_object(&object);
        g.set_state(GizmoState::On);
        g
    }

    /// Ray straight down the Z axis hitting the dial plane at (x, y)
    fn plane_ray(x: f32, y: f32) -> Ray {
        Ray {
            origin: Vec3::new(x, y, 10.0),
            direction: Vec3::new(0.0, 0.0, -1.0),
        }
    }

    /// Radial distance inside neither snap band
    fn free_radius(g: &RotateGizmo) -> f32 {
        (g.snap_coarse_out + g.snap_fine_in) * 0.5
    }

    #[test]
    fn test_normalize_angle_wraps() {
        assert!((normalize_angle(TAU + 0.5) - 0.5).abs() < 1e-12);
        assert!((normalize_angle(-0.5) - (TAU - 0.5)).abs() < 1e-12);
        assert_eq!(normalize_angle(0.0), 0.0);
    }

    #[test]
    fn test_snap_radii_derived_from_radius() {
        let g = z_gizmo();
        assert!(g.radius() > 5.0);
        assert!((g.snap_coarse_in - g.radius() / 3.0).abs() < 1e-6);
        assert!((g.snap_coarse_out - 2.0 * g.radius() / 3.0).abs() < 1e-6);
        assert!((g.snap_fine_in - g.radius()).abs() < 1e-6);
        assert!(g.snap_fine_out > g.snap_fine_in);
    }

    #[test]
    fn test_drag_accumulates_delta() {
        let mut g = z_gizmo();
        let r = free_radius(&g);

        g.start_dragging();
        g.update_drag(&plane_ray(r, 0.0)); // anchors at theta = 0
        g.update_drag(&plane_ray(0.0, r)); // theta = pi/2
        assert!((g.angle() - PI / 2.0).abs() < 1e-5);

        g.update_drag(&plane_ray(-r, 0.0)); // theta = pi
        assert!((g.angle() - PI).abs() < 1e-5);
        g.stop_dragging();
        assert!(!g.is_dragging());
    }

    #[test]
    fn test_drag_from_nonzero_start_angle() {
        let mut g = z_gizmo();
        let r = free_radius(&g);
        g.set_angle(1.0);

        g.start_dragging();
        g.update_drag(&plane_ray(r, 0.0));
        g.update_drag(&plane_ray(0.0, r));
        // The delta (pi/2) applies on top of the pre-drag angle
        assert!((g.angle() - (1.0 + PI / 2.0)).abs() < 1e-5);
    }

    #[test]
    fn test_wraparound_across_zero() {
        let mut g = z_gizmo();
        let r = free_radius(&g);

        g.start_dragging();
        // Start just above the positive X axis, sweep backwards across 0
        let a0 = 0.1_f32;
        g.update_drag(&plane_ray(r * a0.cos(), r * a0.sin()));
        let a1 = -0.1_f32;
        g.update_drag(&plane_ray(r * a1.cos(), r * a1.sin()));
        // Small negative sweep, not a near-full positive turn
        assert!((g.angle() - (TAU - 0.2)).abs() < 1e-4);
    }

    #[test]
    fn test_parallel_ray_retains_angle() {
        let mut g = z_gizmo();
        let r = free_radius(&g);

        g.start_dragging();
        g.update_drag(&plane_ray(r, 0.0));
        g.update_drag(&plane_ray(0.0, r));
        let before = g.angle();

        let parallel = Ray {
            origin: Vec3::new(0.0, 50.0, 0.0),
            direction: Vec3::X,
        };
        g.update_drag(&parallel);
        assert_eq!(g.angle(), before);
    }

    #[test]
    fn test_coarse_snap_band() {
        let mut g = z_gizmo();
        let r = (g.snap_coarse_in + g.snap_coarse_out) * 0.5;

        g.start_dragging();
        g.update_drag(&plane_ray(r, 0.0));
        // 50 degrees raw; nearest coarse boundary (45 degree regions) is 45
        let theta = 50.0_f32.to_radians();
        g.update_drag(&plane_ray(r * theta.cos(), r * theta.sin()));
        assert!((g.angle() - PI / 4.0).abs() < 1e-5);

        // 70 degrees raw jumps to the next boundary, 67.5 is between them
        let theta = 70.0_f32.to_radians();
        g.update_drag(&plane_ray(r * theta.cos(), r * theta.sin()));
        assert!((g.angle() - PI / 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_fine_snap_band() {
        let mut g = z_gizmo();
        let r = (g.snap_fine_in + g.snap_fine_out) * 0.5;

        g.start_dragging();
        g.update_drag(&plane_ray(r, 0.0));
        // 7 degrees raw; fine grid is 5 degrees (72 steps)
        let theta = 7.0_f32.to_radians();
        g.update_drag(&plane_ray(r * theta.cos(), r * theta.sin()));
        assert!((g.angle().to_degrees() - 5.0).abs() < 1e-3);
    }

    #[test]
    fn test_no_snap_outside_bands() {
        let mut g = z_gizmo();
        let r = free_radius(&g);

        g.start_dragging();
        g.update_drag(&plane_ray(r, 0.0));
        let theta = 50.0_f32.to_radians();
        g.update_drag(&plane_ray(r * theta.cos(), r * theta.sin()));
        assert!((g.angle().to_degrees() - 50.0).abs() < 1e-3);
    }

    #[test]
    fn test_cancel_restores_pre_drag_angle() {
        let mut g = z_gizmo();
        let r = free_radius(&g);
        g.set_angle(0.75);

        g.start_dragging();
        g.update_drag(&plane_ray(r, 0.0));
        g.update_drag(&plane_ray(0.0, r));
        assert!((g.angle() - 0.75).abs() > 0.1);

        g.cancel_drag();
        assert_eq!(g.angle(), 0.75);
        assert!(!g.is_dragging());
    }

    #[test]
    fn test_set_angle_round_trip() {
        let mut g = z_gizmo();
        g.set_angle(1.234);
        assert_eq!(g.angle(), 1.234);
    }

    #[test]
    fn test_draw_emits_dial_geometry() {
        let g = z_gizmo();
        let list = g.draw();
        // Circle + ticks + snap spokes + reference + grabber connection
        assert!(list.line_count() > CIRCLE_RESOLUTION + SCALE_STEPS);
        assert_eq!(list.points.len(), 1);
    }

    #[test]
    fn test_draw_empty_when_off() {
        let mut g = z_gizmo();
        g.set_state(GizmoState::Off);
        assert!(g.draw().is_empty());
    }

    #[test]
    fn test_grabber_pickable() {
        let g = z_gizmo();
        let shapes = g.picking_shapes();
        assert_eq!(shapes.len(), 1);
        // Grabber sits on the dial plane beyond the radius, at angle 0
        let expected = g.dial_point(0.0, 1.0 + GRABBER_OFFSET);
        assert!((shapes[0].center - expected).length() < 1e-5);
    }

    #[test]
    fn test_x_axis_plane_orientation() {
        let object = ModelObject::new("cube", fixtures::cube_mesh(1.0));
        let mut g = RotateGizmo::new(Axis::X);
        g.init_from_object(&object);
        g.set_state(GizmoState::On);

        // The X dial lies in the YZ plane; a ray along -X crosses it head-on
        let r = free_radius(&g);
        let ray = Ray {
            origin: Vec3::new(10.0, r, 0.0),
            direction: Vec3::new(-1.0, 0.0, 0.0),
        };
        let pos = g.local_plane_position(&ray).unwrap();
        assert!((pos.length() - r).abs() < 1e-4);
    }
}
