//! View state: zoom, pan and the page being edited.

use kurbo::{Affine, Point, Vec2};
use serde::{Deserialize, Serialize};

/// Smallest zoom the view will accept.
pub const MIN_ZOOM: f64 = 0.05;
/// Largest zoom the view will accept.
pub const MAX_ZOOM: f64 = 40.0;

/// Maps document space to screen space.
///
/// Document space is page-local and independent of zoom; every pixel-sized
/// tolerance in the kernel is converted through [`ViewState::px_to_document`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewState {
    /// Screen pixels per document point.
    pub zoom: f64,
    /// Screen-space translation.
    pub pan: Vec2,
    /// 1-based page currently shown.
    pub current_page: u32,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            pan: Vec2::ZERO,
            current_page: 1,
        }
    }
}

impl ViewState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Document → screen transform.
    pub fn transform(&self) -> Affine {
        Affine::translate(self.pan) * Affine::scale(self.zoom)
    }

    /// Screen → document transform.
    pub fn inverse_transform(&self) -> Affine {
        Affine::scale(1.0 / self.zoom) * Affine::translate(-self.pan)
    }

    pub fn screen_to_document(&self, screen_point: Point) -> Point {
        self.inverse_transform() * screen_point
    }

    pub fn document_to_screen(&self, document_point: Point) -> Point {
        self.transform() * document_point
    }

    /// Convert a length in screen pixels to document units.
    pub fn px_to_document(&self, px: f64) -> f64 {
        px / self.zoom.max(f64::EPSILON)
    }

    /// Zoom by `factor`, keeping `screen_point` fixed on screen.
    pub fn zoom_at(&mut self, screen_point: Point, factor: f64) {
        let new_zoom = (self.zoom * factor).clamp(MIN_ZOOM, MAX_ZOOM);
        if (new_zoom - self.zoom).abs() < f64::EPSILON {
            return;
        }
        let anchor = self.screen_to_document(screen_point);
        self.zoom = new_zoom;
        let moved = self.document_to_screen(anchor);
        self.pan += screen_point - moved;
    }

    pub fn pan_by(&mut self, delta: Vec2) {
        self.pan += delta;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        let view = ViewState {
            zoom: 2.5,
            pan: Vec2::new(30.0, -12.0),
            current_page: 1,
        };
        let doc = Point::new(100.0, 40.0);
        let back = view.screen_to_document(view.document_to_screen(doc));
        assert!((back.x - doc.x).abs() < 1e-9);
        assert!((back.y - doc.y).abs() < 1e-9);
    }

    #[test]
    fn test_pixel_tolerance_scales_with_zoom() {
        let mut view = ViewState::new();
        assert!((view.px_to_document(10.0) - 10.0).abs() < f64::EPSILON);
        view.zoom = 4.0;
        assert!((view.px_to_document(10.0) - 2.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_zoom_at_keeps_anchor() {
        let mut view = ViewState::new();
        let screen = Point::new(200.0, 150.0);
        let before = view.screen_to_document(screen);
        view.zoom_at(screen, 3.0);
        let after = view.screen_to_document(screen);
        assert!((before.x - after.x).abs() < 1e-9);
        assert!((before.y - after.y).abs() < 1e-9);
        assert!((view.zoom - 3.0).abs() < f64::EPSILON);
    }
}
