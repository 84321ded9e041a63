//! strikeplan core library
//!
//! Geometry and document-editing kernel for lightning-protection plan
//! annotation: snapping, input resolution, auto connectors, auto spacing,
//! handle manipulation and undo history over a plain document value.

pub mod connectors;
pub mod document;
pub mod error;
pub mod geometry;
pub mod history;
pub mod input;
pub mod selection;
pub mod snap;
pub mod spacing;
pub mod tools;
pub mod view;

pub use connectors::{
    AutoConnectorNode, JunctionKind, analyze_auto_connector_nodes, rebuild_auto_connectors,
};
pub use document::{Document, EntityId, Selection, SelectionKind, Settings};
pub use error::{KernelError, KernelResult};
pub use history::{History, MAX_HISTORY};
pub use input::{
    InputPointResolver, Modifiers, PointerInput, PointerKind, ResolveContext, ResolvedPoint,
};
pub use selection::{DragGesture, Handle, HandleKind, SelectionHandleTarget};
pub use snap::{SnapKind, SnapQuery, SnapResult, SnapTarget, resolve_snap};
pub use spacing::{CornerKind, SpacingPlacement, SpacingVertex};
pub use tools::{AngleReference, ToolKind, ToolManager};
pub use view::ViewState;
