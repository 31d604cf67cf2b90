//! pubnet-graph: Interactive force-directed layout of publication networks.
//!
//! This crate provides a WASM-based graph visualization component that lays
//! out publications with physics-based positioning, sizes and colors them by a
//! chosen metric, and supports dragging, pan/zoom and click-to-select.

use leptos::prelude::*;
use leptos_meta::*;
use log::{Level, info, warn};
use wasm_bindgen::JsCast;
use web_sys::{HtmlScriptElement, Window};

pub mod components;

pub use components::force_graph::{
	EngineConfig, EngineEvent, ForceGraphCanvas, ForceGraphState, GraphData, GraphError, GraphLink,
	GraphNode, GraphResult,
};

/// Metric used when the data element doesn't name one.
pub const DEFAULT_METRIC: &str = "avgClaps";

/// Initialize logging and panic hooks for the WASM target.
pub fn init_logging() {
	let _ = console_log::init_with_level(Level::Debug);
	console_error_panic_hook::set_once();
	info!("pubnet-graph: logging initialized");
}

fn script_text(id: &str) -> Option<(HtmlScriptElement, String)> {
	let window: Window = web_sys::window()?;
	let document = window.document()?;
	let element = document.get_element_by_id(id)?;
	let script: HtmlScriptElement = element.dyn_into().ok()?;
	let text = script.text().ok()?;
	Some((script, text))
}

/// Load graph data from a script element with id="graph-data".
/// Expected format: JSON with { nodes: [...], links: [...] }. The active
/// metric comes from its `data-metric` attribute.
fn load_graph_data() -> Option<(GraphData, String)> {
	let (script, json_text) = script_text("graph-data")?;
	let metric = script
		.get_attribute("data-metric")
		.filter(|m| !m.is_empty())
		.unwrap_or_else(|| DEFAULT_METRIC.to_string());

	match GraphData::from_json(&json_text) {
		Ok(data) => {
			info!(
				"pubnet-graph: loaded {} nodes, {} links, metric {metric:?}",
				data.nodes.len(),
				data.links.len()
			);
			Some((data, metric))
		}
		Err(e) => {
			warn!("pubnet-graph: failed to parse graph data: {}", e);
			None
		}
	}
}

/// Optional engine overrides from a script element with id="graph-config".
fn load_config() -> EngineConfig {
	let Some((_, text)) = script_text("graph-config") else {
		return EngineConfig::default();
	};
	EngineConfig::from_json(&text).unwrap_or_else(|e| {
		warn!("pubnet-graph: ignoring malformed graph config: {}", e);
		EngineConfig::default()
	})
}

fn format_metric(value: f64) -> String {
	if value.fract() == 0.0 {
		format!("{value}")
	} else {
		format!("{value:.2}")
	}
}

/// Main application component.
/// Loads graph data from DOM, renders the force-directed visualization and
/// shows the selected publication in an overlay.
#[component]
pub fn App() -> impl IntoView {
	provide_meta_context();

	let (graph_data, metric) =
		load_graph_data().unwrap_or_else(|| (GraphData::default(), DEFAULT_METRIC.to_string()));
	let graph_signal = Signal::derive(move || graph_data.clone());
	let metric_signal = Signal::derive(move || metric.clone());

	let (selected, set_selected) = signal(None::<GraphNode>);
	let (error, set_error) = signal(None::<String>);
	let selected_id = Signal::derive(move || selected.get().map(|node| node.id));
	let on_select = Callback::new(move |node: Option<GraphNode>| set_selected.set(node));
	let on_error = Callback::new(move |err: GraphError| set_error.set(Some(err.to_string())));

	let details = move || {
		selected.get().map(|node| {
			let rows = node
				.metric_names()
				.filter_map(|name| Some((name.to_string(), node.metric(name)?)))
				.collect::<Vec<_>>();
			let tags = node.top_tags.join(", ");
			view! {
				<aside class="graph-selection">
					<h2>{node.display_name().to_string()}</h2>
					<ul>
						{rows
							.into_iter()
							.map(|(name, value)| view! { <li>{name}": "{format_metric(value)}</li> })
							.collect_view()}
					</ul>
					<p class="tags">{tags}</p>
					<button on:click=move |_| set_selected.set(None)>"Clear selection"</button>
				</aside>
			}
		})
	};

	view! {
		<Html attr:lang="en" attr:dir="ltr" attr:data-theme="light" />
		<Title text="Publication Network" />
		<Meta charset="UTF-8" />
		<Meta name="viewport" content="width=device-width, initial-scale=1.0" />

		<div class="fullscreen-graph">
			<ForceGraphCanvas
				data=graph_signal
				metric=metric_signal
				on_select=on_select
				on_error=on_error
				selected=selected_id
				config=load_config()
				fullscreen=true
			/>
			<div class="graph-overlay">
				<h1>"Publication Network"</h1>
				<p class="subtitle">"Click a node for details. Drag nodes to reposition. Scroll to zoom. Drag background to pan."</p>
				{move || error.get().map(|e| view! { <p class="graph-error">{e}</p> })}
			</div>
			{details}
		</div>
	}
}
