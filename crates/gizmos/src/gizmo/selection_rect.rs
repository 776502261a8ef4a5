//! Screen-space rubber-band rectangle for multi-selecting support points.

use glam::Vec2;

/// Whether the rectangle adds to or removes from the selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RectMode {
    Select,
    Deselect,
}

/// Finished rectangle in screen coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenRect {
    pub min: Vec2,
    pub max: Vec2,
}

impl ScreenRect {
    pub fn from_corners(a: Vec2, b: Vec2) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }
}

#[derive(Debug, Clone, Copy)]
struct DragData {
    mode: RectMode,
    start: Vec2,
    current: Vec2,
}

/// Rubber-band rectangle state
#[derive(Debug, Default)]
pub struct SelectionRectangle {
    drag: Option<DragData>,
}

impl SelectionRectangle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    pub fn mode(&self) -> Option<RectMode> {
        self.drag.map(|d| d.mode)
    }

    pub fn start_dragging(&mut self, pos: Vec2, mode: RectMode) {
        self.drag = Some(DragData {
            mode,
            start: pos,
            current: pos,
        });
    }

    pub fn dragging(&mut self, pos: Vec2) {
        if let Some(drag) = self.drag.as_mut() {
            drag.current = pos;
        }
    }

    /// Finish the drag and return the covered rectangle with its mode.
    pub fn stop_dragging(&mut self) -> Option<(RectMode, ScreenRect)> {
        self.drag
            .take()
            .map(|d| (d.mode, ScreenRect::from_corners(d.start, d.current)))
    }

    /// Current rectangle while dragging, for the overlay renderer.
    pub fn current_rect(&self) -> Option<ScreenRect> {
        self.drag
            .map(|d| ScreenRect::from_corners(d.start, d.current))
    }

    pub fn reset(&mut self) {
        self.drag = None;
    }
}
