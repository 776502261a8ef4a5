//! Headless test harness for driving the gizmos without a window.
//!
//! Owns a small object store, the camera, both gizmos and a scripted host, and
//! plays the role of the viewport: it resolves hover before presses, routes
//! pointer events, and commits rotation drags back into the model.

use std::sync::Once;

use glam::{Vec2, Vec3};

use shared::{ObjectId, SupportPoint, TriangleMesh};

use crate::camera::{ArcBallCamera, Viewport};
use crate::fixtures;
use crate::gizmo::{
    resolve_hover, Axis, Gizmo, GizmoContext, GizmoState, Modifiers, PointerButton, PointerEvent,
    PointerEventKind, RotateGizmo3D, SupportGizmo,
};
use crate::host::{ChangesDecision, EditorHost};
use crate::model::ModelObject;
use crate::picking::{MeshRaycaster, Ray};

static LOGGING: Once = Once::new();

/// Initialize tracing output for tests; safe to call repeatedly.
pub fn init_logging() {
    LOGGING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "meshprep_gizmos=info".into()),
            )
            .try_init();
    });
}

/// Host double that records backend traffic and scripts user decisions.
pub struct ScriptedHost {
    pub backend_available: bool,
    /// (object id, postpone flag) of every recomputation request
    pub reslice_requests: Vec<(ObjectId, bool)>,
    /// Answer returned for the unsaved-changes prompt
    pub decision: ChangesDecision,
    pub decisions_asked: usize,
    /// When on, island-flagged points count as protected
    pub protect_islands: bool,
}

impl ScriptedHost {
    pub fn new() -> Self {
        Self {
            backend_available: true,
            reslice_requests: Vec::new(),
            decision: ChangesDecision::Discard,
            decisions_asked: 0,
            protect_islands: false,
        }
    }
}

impl Default for ScriptedHost {
    fn default() -> Self {
        Self::new()
    }
}

impl EditorHost for ScriptedHost {
    fn has_backend_supports(&self, _object: &ModelObject) -> bool {
        self.backend_available
    }

    fn reslice_supports(&mut self, object_id: &ObjectId, postpone_error_messages: bool) {
        self.reslice_requests
            .push((object_id.clone(), postpone_error_messages));
    }

    fn ask_about_changes(&mut self) -> ChangesDecision {
        self.decisions_asked += 1;
        self.decision
    }

    fn is_protected_island(&self, point: &SupportPoint) -> bool {
        self.protect_islands && point.island
    }
}

/// Headless harness wiring model, camera, gizmos and host together.
pub struct TestHarness {
    pub objects: Vec<ModelObject>,
    pub selected: Option<ObjectId>,
    pub camera: ArcBallCamera,
    pub viewport: Viewport,
    pub rotate: RotateGizmo3D,
    pub supports: SupportGizmo,
    pub host: ScriptedHost,
}

impl TestHarness {
    pub fn new() -> Self {
        init_logging();
        Self {
            objects: Vec::new(),
            selected: None,
            camera: ArcBallCamera::new(),
            viewport: Viewport::new(800.0, 600.0),
            rotate: RotateGizmo3D::new(),
            supports: SupportGizmo::new(),
            host: ScriptedHost::new(),
        }
    }

    // ── Model manipulation ────────────────────────────────────

    pub fn add_object(&mut self, name: &str, mesh: TriangleMesh) -> ObjectId {
        let object = ModelObject::new(name, mesh);
        let id = object.id.clone();
        self.objects.push(object);
        id
    }

    /// Add a cube with the given half extent and return its ID
    pub fn add_cube(&mut self, name: &str, half: f32) -> ObjectId {
        self.add_object(name, fixtures::cube_mesh(half))
    }

    pub fn object(&self, id: &str) -> Option<&ModelObject> {
        self.objects.iter().find(|o| o.id == id)
    }

    pub fn object_mut(&mut self, id: &str) -> Option<&mut ModelObject> {
        self.objects.iter_mut().find(|o| o.id == id)
    }

    fn selected_index(&self) -> Option<usize> {
        let id = self.selected.as_ref()?;
        self.objects.iter().position(|o| &o.id == id)
    }

    pub fn selected_object(&self) -> Option<&ModelObject> {
        self.selected_index().map(|i| &self.objects[i])
    }

    /// Select an object and notify the gizmos that the data changed.
    pub fn select(&mut self, id: &str) {
        self.selected = Some(id.to_string());
        if let Some(i) = self.selected_index() {
            let object = &self.objects[i];
            self.rotate.data_changed(object);
            self.supports.data_changed(object);
        }
    }

    /// Switch the selection the way the viewport does: a live edit session
    /// with unsaved changes for another object is resolved through the host's
    /// apply/discard prompt before the new object becomes current.
    pub fn switch_selection_resolving_edits(&mut self, id: &str) {
        let stale = self
            .supports
            .session()
            .map(|s| s.object_id() != id && self.supports.unsaved_changes())
            .unwrap_or(false);
        if stale {
            let old_id = self.supports.session().map(|s| s.object_id().clone());
            if let Some(old_index) = old_id.and_then(|oid| {
                self.objects.iter().position(|o| o.id == oid)
            }) {
                let (objects, supports, host) =
                    (&mut self.objects, &mut self.supports, &mut self.host);
                supports.disable_editing_mode(&mut objects[old_index], host);
            }
        }
        self.select(id);
    }

    // ── Gizmo activation ──────────────────────────────────────

    pub fn activate_rotation(&mut self) {
        self.rotate.set_state(GizmoState::On);
        if let Some(i) = self.selected_index() {
            self.rotate.data_changed(&self.objects[i]);
        }
    }

    pub fn enter_support_editing(&mut self) -> Result<(), String> {
        let Some(i) = self.selected_index() else {
            return Err("no object selected".to_string());
        };
        self.supports.set_state(GizmoState::On);
        let object = &self.objects[i];
        let raycaster = MeshRaycaster::new(&object.mesh, &object.transform);
        self.supports.switch_to_editing_mode(object, &raycaster)
    }

    pub fn apply_support_edits(&mut self, postpone_reslice: bool) -> bool {
        let Some(i) = self.selected_index() else {
            return false;
        };
        self.supports
            .editing_mode_apply_changes(&mut self.objects[i], &mut self.host, postpone_reslice)
    }

    pub fn discard_support_edits(&mut self) {
        self.supports.editing_mode_discard_changes();
    }

    /// Close edit mode the way the viewport would: unsaved edits go through
    /// the host's apply/discard decision.
    pub fn close_support_editing(&mut self) {
        if let Some(i) = self.selected_index() {
            // Split borrows: the gizmo may mutate the object, the host records
            let (objects, supports, host) =
                (&mut self.objects, &mut self.supports, &mut self.host);
            supports.disable_editing_mode(&mut objects[i], host);
        }
    }

    pub fn delete_selected_points(&mut self, force: bool) -> usize {
        self.supports.delete_selected_points(force, &self.host)
    }

    // ── Pointer simulation ────────────────────────────────────

    /// Update hover the way the viewport does before every press: cast the
    /// pointer ray and resolve it against the active gizmo's pick shapes.
    pub fn hover_at(&mut self, pos: Vec2) {
        let ray = self.camera.screen_ray(pos, self.viewport);
        if self.supports.is_in_editing_mode() {
            let shapes = self.supports.picking_shapes();
            self.supports.set_hover_id(resolve_hover(&ray, &shapes));
        } else {
            let shapes = self.rotate.picking_shapes();
            self.rotate.set_hover_id(resolve_hover(&ray, &shapes));
        }
    }

    /// Route one pointer event through the gizmos; returns whether it was
    /// consumed. A released rotation drag is committed to the model here.
    pub fn pointer_event(
        &mut self,
        kind: PointerEventKind,
        pos: Vec2,
        modifiers: Modifiers,
    ) -> bool {
        let Some(i) = self.selected_index() else {
            return false;
        };
        let event = PointerEvent::new(kind, pos).with_modifiers(modifiers);

        let object = &self.objects[i];
        let raycaster = MeshRaycaster::new(&object.mesh, &object.transform);
        let mut ctx = GizmoContext {
            camera: &self.camera,
            viewport: self.viewport,
            object,
            picker: &raycaster,
            host: &mut self.host,
        };

        let consumed = if self.supports.is_in_editing_mode() {
            self.supports.on_mouse(&event, &mut ctx)
        } else {
            let consumed = self.rotate.on_mouse(&event, &mut ctx);
            if consumed && matches!(kind, PointerEventKind::Released(PointerButton::Primary)) {
                let rotation = self.rotate.rotation();
                self.objects[i].transform.rotation = rotation;
            }
            consumed
        };
        consumed
    }

    pub fn press(&mut self, pos: Vec2) -> bool {
        self.hover_at(pos);
        self.pointer_event(
            PointerEventKind::Pressed(PointerButton::Primary),
            pos,
            Modifiers::default(),
        )
    }

    pub fn drag(&mut self, pos: Vec2) -> bool {
        self.pointer_event(
            PointerEventKind::Dragged(PointerButton::Primary),
            pos,
            Modifiers::default(),
        )
    }

    pub fn release(&mut self, pos: Vec2) -> bool {
        self.pointer_event(
            PointerEventKind::Released(PointerButton::Primary),
            pos,
            Modifiers::default(),
        )
    }

    // ── Direct rotation driving ───────────────────────────────

    /// World point on the dial plane of `axis` at polar angle `theta` and
    /// radial distance `radial` (a fraction of the dial radius). Valid for an
    /// unrotated object.
    pub fn dial_world_point(&self, axis: Axis, theta: f64, radial: f32) -> Vec3 {
        let gizmo = self.rotate.axis_gizmo(axis);
        let center = gizmo.center();
        let r = gizmo.radius() * radial;
        // World image of each dial's in-plane basis
        let (u, v) = match axis {
            Axis::X => (Vec3::NEG_Y, Vec3::NEG_Z),
            Axis::Y => (Vec3::Z, Vec3::X),
            Axis::Z => (Vec3::X, Vec3::Y),
        };
        center + u * (r * theta.cos() as f32) + v * (r * theta.sin() as f32)
    }

    /// Ray that hits the dial plane of `axis` at polar angle `theta` and
    /// radial distance `radial` (a fraction of the dial radius).
    pub fn dial_ray(&self, axis: Axis, theta: f64, radial: f32) -> Ray {
        let point = self.dial_world_point(axis, theta, radial);
        let normal = axis.unit();
        Ray {
            origin: point + normal * 10.0,
            direction: -normal,
        }
    }

    /// Screen position of a dial-plane point, for pointer-driven tests.
    pub fn dial_screen_pos(&self, axis: Axis, theta: f64, radial: f32) -> Option<Vec2> {
        self.camera
            .project(self.dial_world_point(axis, theta, radial), self.viewport)
    }

    /// Drive a full drag on one axis through the given plane angles, then
    /// commit the result into the selected object's transform.
    pub fn drag_rotation(&mut self, axis: Axis, thetas: &[f64], radial: f32) {
        self.rotate.set_hover_id(Some(axis as usize));
        self.rotate.start_dragging();
        for &theta in thetas {
            let ray = self.dial_ray(axis, theta, radial);
            self.rotate.update_drag(&ray);
        }
        self.rotate.stop_dragging();
        if let Some(i) = self.selected_index() {
            self.objects[i].transform.rotation = self.rotate.rotation();
        }
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}
