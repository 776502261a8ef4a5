use shared::{ObjectId, SupportPoint};

use crate::model::ModelObject;

/// Outcome of asking the user what to do with unsaved support edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangesDecision {
    Apply,
    Discard,
}

/// Services the embedding editor provides to the gizmos.
///
/// Passed per call; gizmos never store a handle to the host, so there is no
/// ownership cycle between viewport and widgets.
pub trait EditorHost {
    /// Whether the backend has a support tree computed for this object.
    /// Must be checked before requesting recomputation.
    fn has_backend_supports(&self, object: &ModelObject) -> bool;

    /// Fire-and-forget request to recompute the support preview.
    /// The result arrives through the host's own notification path.
    fn reslice_supports(&mut self, object_id: &ObjectId, postpone_error_messages: bool);

    /// Ask the user whether pending edits should be applied or discarded.
    fn ask_about_changes(&mut self) -> ChangesDecision;

    /// Whether this point is the only anchor of a support island and may not
    /// be deleted while island locking is on. The criterion is owned by the
    /// support-generation subsystem.
    fn is_protected_island(&self, point: &SupportPoint) -> bool;
}
