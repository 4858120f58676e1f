//! Mind-map layout and viewport engine.
//!
//! Turns loosely structured tree or graph payloads into a positioned node-link
//! diagram and renders it on an HTML canvas with:
//! - Horizontal, vertical and radial tree layouts
//! - A force-directed layout with pinning and an end signal
//! - Zoom, pan, fit-to-view and centering
//! - Dragging, selection, adding children, cascading deletes and editing
//!
//! Everything except [`MindMapCanvas`] and the renderer is DOM-free and can be
//! driven directly through [`MindMapState`].
//!
//! # Example
//!
//! ```ignore
//! use mind_map_graph::MindMapCanvas;
//! use serde_json::json;
//!
//! let data = json!({
//!     "id": "root",
//!     "label": "Checkout",
//!     "children": [
//!         { "id": "c1", "label": "Payments", "type": "category" },
//!         { "id": "c2", "label": "Shipping", "type": "category" },
//!     ],
//! });
//!
//! view! { <MindMapCanvas data=Signal::stored(data) fullscreen=true /> }
//! ```

mod component;
pub mod config;
pub mod error;
pub mod force;
pub mod graph;
pub mod interaction;
mod render;
pub mod scale;
pub mod state;
pub mod theme;
pub mod transform;
pub mod tree_layout;
pub mod types;
pub mod viewport;

pub use component::MindMapCanvas;
pub use config::{LayoutMode, MindMapConfig};
pub use error::{Error, Result};
pub use force::{Simulation, SimulationStatus, TickEvent};
pub use graph::{Graph, Link, Node, NodeKind, Point, Rect};
pub use interaction::{MindMapEvent, NodeEdit};
pub use state::{LayoutPhase, MindMapState};
pub use theme::Theme;
pub use transform::transform;
pub use viewport::{Size, Viewport};
