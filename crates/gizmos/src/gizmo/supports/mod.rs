//! Support-point editing gizmo.
//!
//! Viewing mode is inert; entering edit mode opens an `EditSession` over the
//! selected object's committed points. All pointer edits mutate the session
//! only. Apply pushes positions back to the model and requests a re-slice;
//! discard drops everything without touching the model.

mod cache;

pub use cache::{CacheEntry, EditSession, PointTarget};

use serde::{Deserialize, Serialize};

use shared::ObjectId;

use crate::host::{ChangesDecision, EditorHost};
use crate::model::ModelObject;
use crate::picking::SurfacePicker;

use super::selection_rect::{RectMode, ScreenRect, SelectionRectangle};
use super::{
    DrawList, Gizmo, GizmoContext, GizmoState, PickShape, PointerButton, PointerEvent,
    PointerEventKind, UpdateData,
};

/// Head radius of a freshly placed point [mm]
const DEFAULT_HEAD_RADIUS: f32 = 0.2;

const COLOR_POINT: [f32; 4] = [0.7, 0.7, 0.7, 1.0];
const COLOR_SELECTED: [f32; 4] = [1.0, 0.3, 0.3, 1.0];
const COLOR_HOVER: [f32; 4] = [0.3, 0.9, 0.3, 1.0];

/// Serialized gizmo state for the undo/redo stack.
#[derive(Serialize, Deserialize)]
struct GizmoSnapshot {
    session: Option<EditSession>,
    new_point_head_radius: f32,
    lock_unique_islands: bool,
    last_object_id: Option<ObjectId>,
}

pub struct SupportGizmo {
    state: GizmoState,
    hover: Option<usize>,
    session: Option<EditSession>,
    /// Head radius for the next placed point
    new_point_head_radius: f32,
    /// When on, sole island anchors survive non-forced deletes
    lock_unique_islands: bool,
    selection_rectangle: SelectionRectangle,
    /// Swallow drag/press noise until the button comes back up
    wait_for_up_event: bool,
    dragging_point: Option<usize>,
    /// Identity of the object the cache was last populated from
    last_object_id: Option<ObjectId>,
}

impl SupportGizmo {
    pub fn new() -> Self {
        Self {
            state: GizmoState::Off,
            hover: None,
            session: None,
            new_point_head_radius: DEFAULT_HEAD_RADIUS,
            lock_unique_islands: false,
            selection_rectangle: SelectionRectangle::new(),
            wait_for_up_event: false,
            dragging_point: None,
            last_object_id: None,
        }
    }

    pub fn session(&self) -> Option<&EditSession> {
        self.session.as_ref()
    }

    pub fn new_point_head_radius(&self) -> f32 {
        self.new_point_head_radius
    }

    pub fn set_new_point_head_radius(&mut self, radius: f32) {
        self.new_point_head_radius = radius;
    }

    pub fn lock_unique_islands(&self) -> bool {
        self.lock_unique_islands
    }

    pub fn set_lock_unique_islands(&mut self, lock: bool) {
        self.lock_unique_islands = lock;
    }

    pub fn is_selection_rectangle_dragging(&self) -> bool {
        self.selection_rectangle.is_dragging()
    }

    pub fn unsaved_changes(&self) -> bool {
        self.session
            .as_ref()
            .map(|s| s.unsaved_changes())
            .unwrap_or(false)
    }

    /// Enter editing mode over `object`.
    ///
    /// A live session for a different object with unsaved edits blocks the
    /// switch: the owner must resolve it (ask the user, then apply or
    /// discard) first, so caches of two objects are never merged.
    pub fn switch_to_editing_mode(
        &mut self,
        object: &ModelObject,
        picker: &dyn SurfacePicker,
    ) -> Result<(), String> {
        if let Some(session) = &self.session {
            if session.object_id() == &object.id && !session.is_empty() {
                // Same object, live cache: keep it, edits and all
                return Ok(());
            }
            if session.object_id() != &object.id && session.unsaved_changes() {
                return Err(format!(
                    "unsaved support edits pending for object {}",
                    session.object_id()
                ));
            }
        }
        let session = EditSession::begin(object, picker);
        tracing::info!(
            object = %object.id,
            points = session.len(),
            "entering support-point editing"
        );
        self.session = Some(session);
        self.last_object_id = Some(object.id.clone());
        self.hover = None;
        self.dragging_point = None;
        self.wait_for_up_event = false;
        Ok(())
    }

    /// Push the session's points into the model and request recomputation.
    pub fn editing_mode_apply_changes(
        &mut self,
        object: &mut ModelObject,
        host: &mut dyn EditorHost,
        postpone_reslice: bool,
    ) -> bool {
        let Some(mut session) = self.session.take() else {
            return false;
        };
        if session.object_id() != &object.id {
            tracing::warn!(
                session = %session.object_id(),
                object = %object.id,
                "apply refused: session belongs to a different object"
            );
            self.session = Some(session);
            return false;
        }

        object.support_points = session.apply();
        object.support_params = session.params();
        tracing::info!(
            object = %object.id,
            points = object.support_points.len(),
            "support edits applied"
        );

        self.end_session();
        if !postpone_reslice && host.has_backend_supports(object) {
            host.reslice_supports(&object.id, false);
        }
        true
    }

    /// Roll the session back to its entry snapshot and leave editing mode.
    /// The model is untouched and no recomputation is requested.
    pub fn editing_mode_discard_changes(&mut self) {
        if let Some(mut session) = self.session.take() {
            session.discard();
            tracing::info!(object = %session.object_id(), "support edits discarded");
        }
        self.end_session();
    }

    /// Leave editing mode; unsaved edits go through the host's decision.
    pub fn disable_editing_mode(&mut self, object: &mut ModelObject, host: &mut dyn EditorHost) {
        if self.unsaved_changes() {
            match host.ask_about_changes() {
                ChangesDecision::Apply => {
                    self.editing_mode_apply_changes(object, host, false);
                }
                ChangesDecision::Discard => self.editing_mode_discard_changes(),
            }
        } else {
            self.session = None;
            self.end_session();
        }
    }

    fn end_session(&mut self) {
        self.hover = None;
        self.dragging_point = None;
        self.wait_for_up_event = false;
        self.selection_rectangle.reset();
    }

    pub fn select_point(&mut self, target: PointTarget) {
        if let Some(session) = self.session.as_mut() {
            session.select(target);
        }
    }

    pub fn unselect_point(&mut self, target: PointTarget) {
        if let Some(session) = self.session.as_mut() {
            session.unselect(target);
        }
    }

    /// Delete the selected points. Without `force`, points the host reports
    /// as sole island anchors are skipped while the island lock is on.
    pub fn delete_selected_points(&mut self, force: bool, host: &dyn EditorHost) -> usize {
        let locked = self.lock_unique_islands;
        let Some(session) = self.session.as_mut() else {
            return 0;
        };
        let removed =
            session.delete_selected(force, &|p| locked && host.is_protected_island(p));
        if removed > 0 {
            tracing::debug!(removed, "deleted selected support points");
        }
        removed
    }

    /// Abort the in-flight point drag or rubber-band, restoring pre-drag
    /// state. Wired to escape / focus loss by the owner.
    pub fn cancel_drag(&mut self) {
        if let Some(session) = self.session.as_mut() {
            session.cancel_point_drag();
        }
        self.dragging_point = None;
        self.selection_rectangle.reset();
        self.wait_for_up_event = false;
    }

    /// Serialize for the undo/redo stack.
    pub fn save_state(&self) -> Result<Vec<u8>, String> {
        crate::snapshot::save_snapshot(&GizmoSnapshot {
            session: self.session.clone(),
            new_point_head_radius: self.new_point_head_radius,
            lock_unique_islands: self.lock_unique_islands,
            last_object_id: self.last_object_id.clone(),
        })
    }

    /// Restore from an undo/redo snapshot.
    pub fn load_state(&mut self, bytes: &[u8]) -> Result<(), String> {
        let snapshot: GizmoSnapshot = crate::snapshot::load_snapshot(bytes)?;
        self.session = snapshot.session;
        self.new_point_head_radius = snapshot.new_point_head_radius;
        self.lock_unique_islands = snapshot.lock_unique_islands;
        self.last_object_id = snapshot.last_object_id;
        self.end_session();
        Ok(())
    }

    fn apply_rectangle(&mut self, mode: RectMode, rect: ScreenRect, ctx: &GizmoContext) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let m = session.world_from_local();
        let mut touched = Vec::new();
        for (i, entry) in session.entries().iter().enumerate() {
            let world = m.transform_point3(entry.point.pos);
            if let Some(screen) = ctx.camera.project(world, ctx.viewport) {
                if rect.contains(screen) {
                    touched.push(i);
                }
            }
        }
        for i in touched {
            match mode {
                RectMode::Select => session.select(PointTarget::Index(i)),
                RectMode::Deselect => session.unselect(PointTarget::Index(i)),
            }
        }
    }

    fn handle_press(&mut self, event: &PointerEvent, ctx: &mut GizmoContext) -> bool {
        if event.modifiers.shift || event.modifiers.alt {
            let mode = if event.modifiers.alt {
                RectMode::Deselect
            } else {
                RectMode::Select
            };
            self.selection_rectangle.start_dragging(event.pos, mode);
            return true;
        }

        if let Some(i) = self.hover {
            let Some(session) = self.session.as_mut() else {
                return false;
            };
            if event.modifiers.ctrl {
                session.toggle(i);
            } else {
                // Plain click grabs the point exclusively and may drag it
                session.unselect(PointTarget::AllPoints);
                session.select(PointTarget::Index(i));
                if session.begin_point_drag(i) {
                    self.dragging_point = Some(i);
                }
            }
            return true;
        }

        // Empty surface: try to place a new point
        let ray = ctx.camera.screen_ray(event.pos, ctx.viewport);
        if let Some(hit) = ctx.picker.unproject(&ray) {
            let radius = self.new_point_head_radius;
            if let Some(session) = self.session.as_mut() {
                session.insert_point(hit, radius);
                self.wait_for_up_event = true;
                tracing::debug!(pos = ?hit.position, "support point added");
                return true;
            }
        }
        false
    }
}

impl Default for SupportGizmo {
    fn default() -> Self {
        Self::new()
    }
}

impl Gizmo for SupportGizmo {
    fn state(&self) -> GizmoState {
        self.state
    }

    fn set_state(&mut self, state: GizmoState) {
        if state == GizmoState::Off {
            self.end_session();
        }
        self.state = state;
    }

    fn hover_id(&self) -> Option<usize> {
        self.hover
    }

    /// Hover only exists over a live cache entry.
    fn set_hover_id(&mut self, id: Option<usize>) {
        let len = self.session.as_ref().map(|s| s.len()).unwrap_or(0);
        self.hover = match id {
            Some(i) if self.session.is_some() && i < len => Some(i),
            _ => None,
        };
    }

    fn data_changed(&mut self, object: &ModelObject) {
        match &self.session {
            Some(session) if session.object_id() != &object.id => {
                // Stale cache; reload or the unsaved-changes prompt happens
                // on the next editing-mode entry
                tracing::warn!(
                    cached = %session.object_id(),
                    current = %object.id,
                    "support cache is stale for the current selection"
                );
            }
            Some(_) => {}
            None => self.last_object_id = Some(object.id.clone()),
        }
        self.set_hover_id(self.hover);
    }

    fn draw(&self) -> DrawList {
        let mut list = DrawList::new();
        let Some(session) = self.session.as_ref() else {
            return list;
        };
        let m = session.world_from_local();
        for (i, entry) in session.entries().iter().enumerate() {
            let color = if Some(i) == self.hover {
                COLOR_HOVER
            } else if entry.selected {
                COLOR_SELECTED
            } else {
                COLOR_POINT
            };
            let world = m.transform_point3(entry.point.pos);
            let tip = world
                + m.transform_vector3(entry.normal).normalize_or_zero()
                    * entry.point.head_radius
                    * 2.0;
            list.push_point(world, entry.point.head_radius, color);
            // Short whisker along the surface normal
            list.push_line(world, tip, color);
        }
        list
    }

    fn picking_shapes(&self) -> Vec<PickShape> {
        let Some(session) = self.session.as_ref() else {
            return Vec::new();
        };
        let m = session.world_from_local();
        session
            .entries()
            .iter()
            .enumerate()
            .map(|(i, entry)| PickShape {
                id: i,
                center: m.transform_point3(entry.point.pos),
                radius: entry.point.head_radius.max(0.1),
            })
            .collect()
    }

    fn start_dragging(&mut self) {
        if let (Some(i), Some(session)) = (self.hover, self.session.as_mut()) {
            if session.begin_point_drag(i) {
                self.dragging_point = Some(i);
            }
        }
    }

    fn stop_dragging(&mut self) {
        if self.dragging_point.take().is_some() {
            if let Some(session) = self.session.as_mut() {
                if session.end_point_drag() {
                    tracing::debug!("support point moved");
                }
            }
        }
    }

    fn dragging(&mut self, data: &UpdateData, ctx: &mut GizmoContext) {
        if self.selection_rectangle.is_dragging() {
            self.selection_rectangle.dragging(data.pointer);
            return;
        }
        if let Some(i) = self.dragging_point {
            // A ray that misses the mesh keeps the point where it was
            if let Some(hit) = ctx.picker.unproject(&data.ray) {
                if let Some(session) = self.session.as_mut() {
                    session.update_point(i, hit);
                }
            }
        }
    }

    fn is_dragging(&self) -> bool {
        self.dragging_point.is_some() || self.selection_rectangle.is_dragging()
    }

    fn on_mouse(&mut self, event: &PointerEvent, ctx: &mut GizmoContext) -> bool {
        if self.state == GizmoState::Off || self.session.is_none() {
            return false;
        }
        match event.kind {
            PointerEventKind::Pressed(PointerButton::Primary) => self.handle_press(event, ctx),
            PointerEventKind::Dragged(PointerButton::Primary) => {
                if self.wait_for_up_event {
                    return true;
                }
                if self.is_dragging() {
                    let ray = ctx.camera.screen_ray(event.pos, ctx.viewport);
                    self.dragging(
                        &UpdateData {
                            ray,
                            pointer: event.pos,
                        },
                        ctx,
                    );
                    return true;
                }
                false
            }
            PointerEventKind::Released(PointerButton::Primary) => {
                let was_waiting = self.wait_for_up_event;
                self.wait_for_up_event = false;
                if let Some((mode, rect)) = self.selection_rectangle.stop_dragging() {
                    self.apply_rectangle(mode, rect, ctx);
                    return true;
                }
                if self.dragging_point.is_some() {
                    self.stop_dragging();
                    return true;
                }
                was_waiting
            }
            _ => false,
        }
    }

    fn is_in_editing_mode(&self) -> bool {
        self.session.is_some()
    }
}
