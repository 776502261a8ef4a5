//! Transactional working copy of an object's support points.
//!
//! The session is populated from the committed model when editing starts and
//! pushed back only on apply. Discard rebuilds from the committed mirror, so
//! the model is never touched by speculative edits.

use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

use shared::{ObjectId, SupportParams, SupportPoint};

use crate::model::ModelObject;
use crate::picking::{Ray, SurfaceHit, SurfacePicker};

/// One row of the editing cache.
///
/// `selected` and `normal` are UI-only: equality considers the underlying
/// support point alone, so diffing against the committed model ignores them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    pub point: SupportPoint,
    pub selected: bool,
    pub normal: Vec3,
}

impl CacheEntry {
    pub fn new(point: SupportPoint, selected: bool, normal: Vec3) -> Self {
        Self {
            point,
            selected,
            normal,
        }
    }
}

impl PartialEq for CacheEntry {
    fn eq(&self, other: &Self) -> bool {
        self.point == other.point
    }
}

/// Which cache entries a select/unselect call addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointTarget {
    AllPoints,
    NoPoints,
    Index(usize),
}

/// Edit transaction over one object's support points.
///
/// Entries form an ordered sequence, not a keyed map: render and pick indices
/// are positional.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditSession {
    object_id: ObjectId,
    /// Object placement at session start; the object may not move while the
    /// session is open, so this stays valid until apply or discard
    world_from_local: Mat4,
    entries: Vec<CacheEntry>,
    /// Committed points at session start; restore source for discard and the
    /// reference for unsaved-change detection
    committed: Vec<SupportPoint>,
    /// Working copy of the generation parameters
    params: SupportParams,
    /// Parameters at session start, restored on discard
    params_stash: SupportParams,
    /// Entry snapshot taken when a point drag starts
    point_before_drag: Option<(usize, CacheEntry)>,
}

impl EditSession {
    /// Open a session over the object's committed points. Normals are
    /// recovered by probing the mesh surface through `picker`.
    pub fn begin(object: &ModelObject, picker: &dyn SurfacePicker) -> Self {
        let entries = object
            .support_points
            .iter()
            .map(|p| {
                let normal = probe_surface_normal(object, picker, p.pos).unwrap_or(Vec3::Z);
                CacheEntry::new(*p, false, normal)
            })
            .collect();
        Self {
            object_id: object.id.clone(),
            world_from_local: object.transform.matrix(),
            entries,
            committed: object.support_points.clone(),
            params: object.support_params,
            params_stash: object.support_params,
            point_before_drag: None,
        }
    }

    pub fn object_id(&self) -> &ObjectId {
        &self.object_id
    }

    pub fn world_from_local(&self) -> Mat4 {
        self.world_from_local
    }

    /// World position of entry `i`
    pub fn world_pos(&self, i: usize) -> Option<Vec3> {
        self.entries
            .get(i)
            .map(|e| self.world_from_local.transform_point3(e.point.pos))
    }

    pub fn entries(&self) -> &[CacheEntry] {
        &self.entries
    }

    pub fn entry(&self, i: usize) -> Option<&CacheEntry> {
        self.entries.get(i)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn params(&self) -> SupportParams {
        self.params
    }

    pub fn set_params(&mut self, params: SupportParams) {
        self.params = params;
    }

    pub fn params_stash(&self) -> SupportParams {
        self.params_stash
    }

    /// Append a freshly placed point; it becomes the only selected entry.
    pub fn insert_point(&mut self, hit: SurfaceHit, head_radius: f32) {
        self.unselect(PointTarget::AllPoints);
        self.entries.push(CacheEntry::new(
            SupportPoint::new(hit.position, head_radius, false),
            true,
            hit.normal,
        ));
    }

    pub fn select(&mut self, target: PointTarget) {
        match target {
            PointTarget::AllPoints => self.set_all_selected(true),
            // "Select none" clears the whole selection
            PointTarget::NoPoints => self.set_all_selected(false),
            PointTarget::Index(i) => {
                if let Some(e) = self.entries.get_mut(i) {
                    e.selected = true;
                }
            }
        }
    }

    pub fn unselect(&mut self, target: PointTarget) {
        match target {
            PointTarget::AllPoints | PointTarget::NoPoints => self.set_all_selected(false),
            PointTarget::Index(i) => {
                if let Some(e) = self.entries.get_mut(i) {
                    e.selected = false;
                }
            }
        }
    }

    fn set_all_selected(&mut self, value: bool) {
        for e in &mut self.entries {
            e.selected = value;
        }
    }

    pub fn toggle(&mut self, i: usize) {
        if let Some(e) = self.entries.get_mut(i) {
            e.selected = !e.selected;
        }
    }

    pub fn selected_count(&self) -> usize {
        self.entries.iter().filter(|e| e.selected).count()
    }

    /// Remove every selected entry. Without `force`, entries for which
    /// `is_protected` holds are skipped per point.
    pub fn delete_selected(
        &mut self,
        force: bool,
        is_protected: &dyn Fn(&SupportPoint) -> bool,
    ) -> usize {
        let before = self.entries.len();
        self.entries
            .retain(|e| !e.selected || (!force && is_protected(&e.point)));
        before - self.entries.len()
    }

    /// Snapshot the entry before a position drag so a cancel can restore it.
    pub fn begin_point_drag(&mut self, i: usize) -> bool {
        match self.entries.get(i) {
            Some(entry) => {
                self.point_before_drag = Some((i, entry.clone()));
                true
            }
            None => false,
        }
    }

    /// Move the dragged point to a new surface hit.
    pub fn update_point(&mut self, i: usize, hit: SurfaceHit) {
        if let Some(e) = self.entries.get_mut(i) {
            e.point.pos = hit.position;
            e.normal = hit.normal;
        }
    }

    /// Finish the drag; returns whether the point actually moved.
    pub fn end_point_drag(&mut self) -> bool {
        match self.point_before_drag.take() {
            Some((i, before)) => self
                .entries
                .get(i)
                .map(|now| now.point != before.point)
                .unwrap_or(false),
            None => false,
        }
    }

    /// Abort the drag, restoring the exact pre-drag entry.
    pub fn cancel_point_drag(&mut self) {
        if let Some((i, before)) = self.point_before_drag.take() {
            if let Some(e) = self.entries.get_mut(i) {
                *e = before;
            }
        }
    }

    /// Positional sequence comparison against the committed points;
    /// reordering counts as a change.
    pub fn unsaved_changes(&self) -> bool {
        self.entries.len() != self.committed.len()
            || self
                .entries
                .iter()
                .zip(&self.committed)
                .any(|(e, c)| e.point != *c)
    }

    /// Extract the points to persist, in entry order. Selection and normals
    /// are UI-only and never reach the model.
    pub fn apply(&mut self) -> Vec<SupportPoint> {
        let points: Vec<SupportPoint> = self.entries.iter().map(|e| e.point).collect();
        self.committed = points.clone();
        points
    }

    /// Roll the cache back to the committed mirror and stashed parameters.
    pub fn discard(&mut self) {
        self.entries = self
            .committed
            .iter()
            .map(|p| CacheEntry::new(*p, false, Vec3::ZERO))
            .collect();
        self.params = self.params_stash;
        self.point_before_drag = None;
    }
}

/// Recover the surface normal under a committed point by casting a ray from
/// outside the object back toward it.
fn probe_surface_normal(
    object: &ModelObject,
    picker: &dyn SurfacePicker,
    local_pos: Vec3,
) -> Option<Vec3> {
    let m = object.transform.matrix();
    let world_pos = m.transform_point3(local_pos);
    let world_center = m.transform_point3(object.mesh.aabb().center());
    let outward = (world_pos - world_center).normalize_or_zero();
    if outward == Vec3::ZERO {
        return None;
    }
    let probe = Ray {
        origin: world_pos + outward * (object.world_aabb().radius() + 1.0),
        direction: -outward,
    };
    picker.unproject(&probe).map(|hit| hit.normal)
}
