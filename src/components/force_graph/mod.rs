//! Force-directed publication graph.
//!
//! Lays out a weighted graph on an HTML canvas, sizing and coloring each node
//! by a chosen metric:
//! - Physics-based positioning via a cooling force simulation
//! - Radius, fill and link width derived from the metric
//! - Node dragging, pan and pointer-anchored zoom
//! - Click-to-select, reported to the host with the full node record
//!
//! Everything except [`ForceGraphCanvas`] and the canvas painter is plain Rust
//! and runs without a browser.
//!
//! # Example
//!
//! ```ignore
//! use pubnet_graph::{ForceGraphCanvas, GraphData};
//!
//! let data = GraphData::from_json(r#"{
//!     "nodes": [
//!         { "id": "a", "name": "Alpha", "avgClaps": 10 },
//!         { "id": "b", "name": "Beta", "avgClaps": 100 }
//!     ],
//!     "links": [{ "source": "a", "target": "b", "avgClaps": 5 }]
//! }"#)?;
//!
//! view! {
//!     <ForceGraphCanvas
//!         data=data
//!         metric="avgClaps".to_string()
//!         on_select=Callback::new(|node| log::info!("{node:?}"))
//!         fullscreen=true
//!     />
//! }
//! ```

mod component;
pub mod config;
pub mod dataset;
pub mod error;
pub mod interaction;
mod render;
pub mod scale;
pub mod simulation;
pub mod state;
pub mod sync;
pub mod theme;
mod types;
pub mod viewport;

pub use component::ForceGraphCanvas;
pub use config::EngineConfig;
pub use error::{GraphError, GraphResult};
pub use state::{EngineEvent, ForceGraphState};
pub use theme::Theme;
pub use types::{GraphData, GraphLink, GraphNode};
