//! Render-side scene kept in step with the simulation.
//!
//! The scene is a flat list of node and link elements carrying everything the
//! painter needs. Element identity follows data identity: nodes are keyed by
//! id, links by `(source id, target id, ordinal)` where the ordinal separates
//! parallel links. A [`join`](Scene::join) reconciles the scene with a new
//! dataset; per-tick updates only move geometry in place.

use std::collections::HashMap;

use super::dataset::Dataset;
use super::scale::VisualScales;
use super::theme::Color;
use super::viewport::Point;

/// Stable handle of a scene element. Survives joins for as long as the
/// underlying node or link does.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(u64);

/// Visual state of one node.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeElement {
	pub key: ElementId,
	pub id: String,
	/// Index into the current dataset and simulation.
	pub index: usize,
	pub name: String,
	pub position: Point,
	pub radius: f64,
	pub fill: Color,
	/// Color of the value drawn on top of `fill`.
	pub text_color: Color,
	pub value_label: String,
	pub selected: bool,
}

/// Identity of a link: endpoints plus the position among parallel links.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct LinkKey {
	pub source: String,
	pub target: String,
	pub ordinal: usize,
}

/// Visual state of one link.
#[derive(Clone, Debug, PartialEq)]
pub struct LinkElement {
	pub key: ElementId,
	pub link: LinkKey,
	pub source: usize,
	pub target: usize,
	pub from: Point,
	pub to: Point,
	pub width: f64,
}

/// What a join did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct JoinSummary {
	pub entered: usize,
	pub updated: usize,
	pub exited: usize,
}

/// The current rendered node and link set.
#[derive(Clone, Debug, Default)]
pub struct Scene {
	nodes: Vec<NodeElement>,
	links: Vec<LinkElement>,
	next_key: u64,
}

impl Scene {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn nodes(&self) -> &[NodeElement] {
		&self.nodes
	}

	pub fn links(&self) -> &[LinkElement] {
		&self.links
	}

	/// Reconcile the scene with `dataset`: drop elements whose node or link is
	/// gone, create elements for new ones, and restyle the rest in place.
	///
	/// Retained nodes keep their last position until the next
	/// [`sync_positions`](Self::sync_positions).
	pub fn join(&mut self, dataset: &Dataset, scales: &VisualScales) -> JoinSummary {
		let mut summary = JoinSummary::default();

		let mut old_nodes: HashMap<String, NodeElement> = self
			.nodes
			.drain(..)
			.map(|element| (element.id.clone(), element))
			.collect();
		let mut nodes = Vec::with_capacity(dataset.len());
		for (index, node) in dataset.nodes().iter().enumerate() {
			let value = dataset.value(index);
			let fill = scales.color_of(value);
			let (key, position, selected) = match old_nodes.remove(&node.id) {
				Some(old) => {
					summary.updated += 1;
					(old.key, old.position, old.selected)
				}
				None => {
					summary.entered += 1;
					(self.allocate(), Point::default(), false)
				}
			};
			nodes.push(NodeElement {
				key,
				id: node.id.clone(),
				index,
				name: node.display_name().to_string(),
				position,
				radius: scales.size_of(value),
				fill,
				text_color: fill.contrast_text(),
				value_label: format_value(value),
				selected,
			});
		}
		summary.exited += old_nodes.len();
		self.nodes = nodes;

		let mut old_links: HashMap<LinkKey, LinkElement> = self
			.links
			.drain(..)
			.map(|element| (element.link.clone(), element))
			.collect();
		let mut ordinals: HashMap<(usize, usize), usize> = HashMap::new();
		let mut links = Vec::with_capacity(dataset.links().len());
		for link in dataset.links() {
			let ordinal = ordinals.entry((link.source, link.target)).or_insert(0);
			let link_key = LinkKey {
				source: dataset.nodes()[link.source].id.clone(),
				target: dataset.nodes()[link.target].id.clone(),
				ordinal: *ordinal,
			};
			*ordinal += 1;

			let (key, from, to) = match old_links.remove(&link_key) {
				Some(old) => {
					summary.updated += 1;
					(old.key, old.from, old.to)
				}
				None => {
					summary.entered += 1;
					(self.allocate(), Point::default(), Point::default())
				}
			};
			links.push(LinkElement {
				key,
				link: link_key,
				source: link.source,
				target: link.target,
				from,
				to,
				width: scales.stroke_width_of(link.weight),
			});
		}
		summary.exited += old_links.len();
		self.links = links;

		summary
	}

	/// Move every element to the given node positions (dataset order).
	///
	/// Returns `false` and leaves the scene untouched if `positions` doesn't
	/// match the joined node set, e.g. a tick from a replaced simulation.
	pub fn sync_positions(&mut self, positions: &[Point]) -> bool {
		if positions.len() != self.nodes.len() {
			return false;
		}
		for node in &mut self.nodes {
			node.position = positions[node.index];
		}
		for link in &mut self.links {
			link.from = positions[link.source];
			link.to = positions[link.target];
		}
		true
	}

	/// Mark the node with `id` as selected and every other node as not.
	pub fn set_selected(&mut self, id: Option<&str>) {
		for node in &mut self.nodes {
			node.selected = Some(node.id.as_str()) == id;
		}
	}

	pub fn selected(&self) -> Option<&NodeElement> {
		self.nodes.iter().find(|n| n.selected)
	}

	pub fn clear(&mut self) -> JoinSummary {
		let summary = JoinSummary {
			exited: self.nodes.len() + self.links.len(),
			..JoinSummary::default()
		};
		self.nodes.clear();
		self.links.clear();
		summary
	}

	fn allocate(&mut self) -> ElementId {
		let key = ElementId(self.next_key);
		self.next_key += 1;
		key
	}
}

/// In-node label: the value rounded to an integer.
fn format_value(value: f64) -> String {
	let rounded = value.round();
	if rounded == 0.0 {
		"0".to_string()
	} else {
		format!("{rounded}")
	}
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;
	use crate::components::force_graph::config::ScaleRanges;
	use crate::components::force_graph::theme::ColorRamp;
	use crate::components::force_graph::types::GraphData;

	fn prepared(value: serde_json::Value, metric: &str) -> (Dataset, VisualScales) {
		let data: GraphData = serde_json::from_value(value).unwrap();
		let ds = Dataset::new(&data, metric).unwrap();
		let scales = VisualScales::new(&ds, &ScaleRanges::default(), ColorRamp::Greens);
		(ds, scales)
	}

	fn abc() -> serde_json::Value {
		json!({
			"nodes": [
				{ "id": "a", "name": "Alpha", "claps": 10, "reads": 3 },
				{ "id": "b", "name": "Beta", "claps": 100, "reads": 1 },
				{ "id": "c", "claps": 55.4, "reads": 2 }
			],
			"links": [
				{ "source": "a", "target": "b", "claps": 5 },
				{ "source": "a", "target": "b", "claps": 1 },
				{ "source": "b", "target": "c" }
			]
		})
	}

	#[test]
	fn initial_join_creates_everything() {
		let (ds, scales) = prepared(abc(), "claps");
		let mut scene = Scene::new();
		let summary = scene.join(&ds, &scales);
		assert_eq!(
			summary,
			JoinSummary {
				entered: 6,
				updated: 0,
				exited: 0
			}
		);

		let nodes = scene.nodes();
		assert_eq!(nodes[0].radius, 20.0);
		assert_eq!(nodes[1].radius, 60.0);
		assert_eq!(nodes[2].name, "c");
		assert_eq!(nodes[2].value_label, "55");
		assert_eq!(nodes[1].text_color, Color::rgb(255, 255, 255));
		assert_eq!(nodes[0].text_color, Color::rgb(0, 0, 0));

		let parallel: Vec<_> = scene.links().iter().map(|l| l.link.ordinal).collect();
		assert_eq!(parallel, vec![0, 1, 0]);
		assert_eq!(scene.links()[0].width, 8.0);
		assert_eq!(scene.links()[2].width, 1.0);
	}

	#[test]
	fn metric_switch_keeps_identity_and_restyles() {
		let (ds, scales) = prepared(abc(), "claps");
		let mut scene = Scene::new();
		scene.join(&ds, &scales);
		let keys: Vec<_> = scene.nodes().iter().map(|n| n.key).collect();
		let link_keys: Vec<_> = scene.links().iter().map(|l| l.key).collect();

		let (ds, scales) = prepared(abc(), "reads");
		let summary = scene.join(&ds, &scales);
		assert_eq!(summary.updated, 6);
		assert_eq!(summary.entered + summary.exited, 0);
		assert_eq!(scene.nodes().iter().map(|n| n.key).collect::<Vec<_>>(), keys);
		assert_eq!(scene.links().iter().map(|l| l.key).collect::<Vec<_>>(), link_keys);
		// "a" has the most reads now.
		assert_eq!(scene.nodes()[0].radius, 60.0);
		assert_eq!(scene.nodes()[1].radius, 20.0);
	}

	#[test]
	fn structural_change_enters_and_exits() {
		let (ds, scales) = prepared(abc(), "claps");
		let mut scene = Scene::new();
		scene.join(&ds, &scales);
		let b_key = scene.nodes()[1].key;

		let (ds, scales) = prepared(
			json!({
				"nodes": [
					{ "id": "d", "claps": 1 },
					{ "id": "b", "claps": 2 }
				],
				"links": [{ "source": "d", "target": "b" }]
			}),
			"claps",
		);
		let summary = scene.join(&ds, &scales);
		assert_eq!(
			summary,
			JoinSummary {
				entered: 2,
				updated: 1,
				exited: 5
			}
		);
		assert_eq!(scene.nodes()[1].key, b_key);
		assert_eq!(scene.nodes()[1].index, 1);
		assert!(scene.nodes()[0].key > b_key);
	}

	#[test]
	fn positions_sync_in_place() {
		let (ds, scales) = prepared(abc(), "claps");
		let mut scene = Scene::new();
		scene.join(&ds, &scales);
		let keys: Vec<_> = scene.nodes().iter().map(|n| n.key).collect();

		let positions = [Point::new(1.0, 2.0), Point::new(3.0, 4.0), Point::new(5.0, 6.0)];
		assert!(scene.sync_positions(&positions));
		assert_eq!(scene.nodes()[2].position, Point::new(5.0, 6.0));
		assert_eq!(scene.links()[2].from, Point::new(3.0, 4.0));
		assert_eq!(scene.links()[2].to, Point::new(5.0, 6.0));
		assert_eq!(scene.nodes().iter().map(|n| n.key).collect::<Vec<_>>(), keys);

		assert!(!scene.sync_positions(&positions[..2]));
		assert_eq!(scene.nodes()[0].position, Point::new(1.0, 2.0));
	}

	#[test]
	fn selection_is_exclusive_and_survives_joins() {
		let (ds, scales) = prepared(abc(), "claps");
		let mut scene = Scene::new();
		scene.join(&ds, &scales);

		scene.set_selected(Some("a"));
		scene.set_selected(Some("b"));
		assert_eq!(scene.nodes().iter().filter(|n| n.selected).count(), 1);
		assert_eq!(scene.selected().map(|n| n.id.as_str()), Some("b"));

		let (ds, scales) = prepared(abc(), "reads");
		scene.join(&ds, &scales);
		assert_eq!(scene.selected().map(|n| n.id.as_str()), Some("b"));

		scene.set_selected(None);
		assert!(scene.selected().is_none());
	}

	#[test]
	fn selection_keeps_node_order() {
		let (ds, scales) = prepared(abc(), "claps");
		let mut scene = Scene::new();
		scene.join(&ds, &scales);
		scene.set_selected(Some("a"));
		let ids: Vec<_> = scene.nodes().iter().map(|n| n.id.as_str()).collect();
		assert_eq!(ids, ["a", "b", "c"]);
	}

	#[test]
	fn clear_exits_everything() {
		let (ds, scales) = prepared(abc(), "claps");
		let mut scene = Scene::new();
		scene.join(&ds, &scales);
		assert_eq!(scene.clear().exited, 6);
		assert!(scene.nodes().is_empty() && scene.links().is_empty());
	}
}
