//! Resolves a raw pointer position into the point a tool actually uses.
//!
//! Constraints apply in a fixed order: object snapping, then the angle
//! constraint around the tool's reference point, then the target-distance
//! lock for measuring tools.

use crate::document::{Document, Selection};
use crate::geometry::polyline_length;
use crate::snap::{SnapKind, SnapQuery, resolve_snap, snap_to_angle, snap_tolerance};
use crate::tools::{AngleReference, ToolKind};
use kurbo::Point;
use serde::{Deserialize, Serialize};
use std::time::Duration;

// Use web_time for WASM compatibility
#[cfg(target_arch = "wasm32")]
use web_time::Instant;
#[cfg(not(target_arch = "wasm32"))]
use std::time::Instant;

/// Screen distance within which a point locks to a target-distance multiple.
pub const DISTANCE_LOCK_TOLERANCE_PX: f64 = 8.0;
/// Screen distance an acquired lock survives before releasing.
pub const DISTANCE_LOCK_RELEASE_PX: f64 = 14.0;
/// Minimum time an acquired lock is held regardless of movement.
pub const DISTANCE_LOCK_HOLD: Duration = Duration::from_millis(180);

/// Modifier keys state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    /// Shift suspends object snapping.
    pub fn disables_snap(self) -> bool {
        self.shift
    }

    /// Ctrl or Cmd suspends angle snapping.
    pub fn disables_angle_snap(self) -> bool {
        self.ctrl || self.meta
    }
}

/// Device that produced the pointer event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointerKind {
    #[default]
    Mouse,
    Pen,
    Touch,
}

/// A normalized pointer sample in document space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerInput {
    pub point: Point,
    #[serde(default)]
    pub modifiers: Modifiers,
    #[serde(default)]
    pub pointer_kind: PointerKind,
}

impl PointerInput {
    pub fn new(point: Point) -> Self {
        Self {
            point,
            modifiers: Modifiers::default(),
            pointer_kind: PointerKind::default(),
        }
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    pub fn with_pointer_kind(mut self, pointer_kind: PointerKind) -> Self {
        self.pointer_kind = pointer_kind;
        self
    }
}

/// Tool state the resolver needs for one sample.
#[derive(Debug, Clone, Copy)]
pub struct ResolveContext<'a> {
    pub tool: ToolKind,
    pub angle_reference: Option<AngleReference>,
    /// Vertices already committed by the tool, in order.
    pub committed_path: &'a [Point],
    /// Target spacing in real units for the distance lock.
    pub target_distance: Option<f64>,
    /// Entity being edited, excluded from snapping.
    pub exclude: Option<&'a Selection>,
}

impl<'a> ResolveContext<'a> {
    pub fn new(tool: ToolKind) -> Self {
        Self {
            tool,
            angle_reference: None,
            committed_path: &[],
            target_distance: None,
            exclude: None,
        }
    }

    pub fn with_angle_reference(mut self, reference: Option<AngleReference>) -> Self {
        self.angle_reference = reference;
        self
    }

    pub fn with_committed_path(mut self, path: &'a [Point]) -> Self {
        self.committed_path = path;
        self
    }

    pub fn with_target_distance(mut self, target: f64) -> Self {
        self.target_distance = Some(target);
        self
    }

    pub fn excluding(mut self, selection: &'a Selection) -> Self {
        self.exclude = Some(selection);
        self
    }
}

/// The final point plus what shaped it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResolvedPoint {
    pub point: Point,
    /// Object snap still in effect on the final point.
    pub snap_kind: Option<SnapKind>,
    pub angle_snapped: bool,
    pub distance_locked: bool,
    /// False for touch input, where previews follow the finger poorly.
    pub live_preview: bool,
}

#[derive(Debug, Clone, Copy)]
struct DistanceLock {
    anchor: Point,
    multiple: u32,
    acquired_at: Instant,
}

/// Stateful resolver. Only the distance lock carries state between samples.
#[derive(Debug, Clone, Default)]
pub struct InputPointResolver {
    lock: Option<DistanceLock>,
}

impl InputPointResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget any held distance lock.
    pub fn reset(&mut self) {
        self.lock = None;
    }

    pub fn is_distance_locked(&self) -> bool {
        self.lock.is_some()
    }

    /// Resolve `input` against the visible document.
    pub fn resolve(
        &mut self,
        document: &Document,
        input: PointerInput,
        context: &ResolveContext<'_>,
        now: Instant,
    ) -> ResolvedPoint {
        let settings = &document.settings;
        let mut point = input.point;
        let mut snap_kind = None;

        if settings.snap_enabled && !input.modifiers.disables_snap() {
            let mut query = SnapQuery::new(point, snap_tolerance(document.view.zoom));
            query.exclude = context.exclude;
            query.reference = context.angle_reference.map(AngleReference::point);
            let snap = resolve_snap(document, &query);
            point = snap.point;
            snap_kind = snap.kind;
        }

        let mut angle_snapped = false;
        if let Some(reference) = context.angle_reference {
            if settings.angle_snap_enabled && !input.modifiers.disables_angle_snap() {
                let result = snap_to_angle(reference.point(), point, settings.angle_increment_deg);
                if result.distance > 0.0 {
                    angle_snapped = true;
                }
                if result.snapped {
                    point = result.point;
                    snap_kind = None;
                }
            }
        }

        let mut distance_locked = false;
        match (context.target_distance, document.scale) {
            (Some(target), Some(scale))
                if context.tool.supports_distance_lock() && target > 0.0 && scale > 0.0 =>
            {
                if let Some(locked) =
                    self.apply_distance_lock(
                        point,
                        context.committed_path,
                        target / scale,
                        document.view.zoom,
                        now,
                    )
                {
                    point = locked;
                    snap_kind = None;
                    distance_locked = true;
                }
            }
            _ => self.lock = None,
        }

        ResolvedPoint {
            point,
            snap_kind,
            angle_snapped,
            distance_locked,
            live_preview: input.pointer_kind != PointerKind::Touch,
        }
    }

    /// Lock `point` to a multiple of `step` (document units) of cumulative
    /// path length, with hysteresis.
    fn apply_distance_lock(
        &mut self,
        point: Point,
        path: &[Point],
        step: f64,
        zoom: f64,
        now: Instant,
    ) -> Option<Point> {
        let Some(&anchor) = path.last() else {
            self.lock = None;
            return None;
        };
        let offset = point - anchor;
        let segment = offset.hypot();
        if segment < 1e-9 {
            return None;
        }
        let direction = offset / segment;
        let committed = polyline_length(path);
        // Locked point for a given multiple and its screen distance from `point`.
        let candidate = |multiple: u32| -> Option<(Point, f64)> {
            let length = multiple as f64 * step - committed;
            (length > 0.0).then(|| (anchor + direction * length, (segment - length).abs() * zoom))
        };

        if let Some(lock) = self.lock {
            if lock.anchor == anchor {
                if let Some((locked, px)) = candidate(lock.multiple) {
                    let held = now.duration_since(lock.acquired_at) < DISTANCE_LOCK_HOLD;
                    if px <= DISTANCE_LOCK_RELEASE_PX || held {
                        return Some(locked);
                    }
                }
            }
            log::debug!("Distance lock released at multiple {}", lock.multiple);
            self.lock = None;
        }

        let nearest = ((committed + segment) / step).round();
        if nearest < 1.0 {
            return None;
        }
        let multiple = nearest as u32;
        let (locked, px) = candidate(multiple)?;
        if px > DISTANCE_LOCK_TOLERANCE_PX {
            return None;
        }
        log::debug!("Distance lock acquired at multiple {}", multiple);
        self.lock = Some(DistanceLock {
            anchor,
            multiple,
            acquired_at: now,
        });
        Some(locked)
    }
}
