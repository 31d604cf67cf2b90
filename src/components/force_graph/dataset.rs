//! Validated, index-addressed view of a dataset for one active metric.
//!
//! Links are resolved once from node ids to positions in the node arena so
//! the simulation and the renderer never chase string keys on the hot path.

use std::collections::HashMap;

use super::error::{GraphError, GraphResult, LinkEnd};
use super::types::{GraphData, GraphLink, GraphNode};

/// A link with both endpoints resolved to node indices.
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedLink {
	pub source: usize,
	pub target: usize,
	/// Link weight for the active metric (zero when absent).
	pub weight: f64,
}

/// Nodes, links and per-node metric values for a single (dataset, metric) pair.
#[derive(Clone, Debug)]
pub struct Dataset {
	metric: String,
	nodes: Vec<GraphNode>,
	links: Vec<ResolvedLink>,
	raw_links: Vec<GraphLink>,
	values: Vec<f64>,
	index: HashMap<String, usize>,
}

impl Dataset {
	/// Validate `data` against `metric` and build the index arena.
	///
	/// Rejects duplicate node ids, links whose endpoints are not in the node
	/// set, and nodes without a numeric value for `metric`.
	pub fn new(data: &GraphData, metric: &str) -> GraphResult<Self> {
		let mut index = HashMap::with_capacity(data.nodes.len());
		let mut values = Vec::with_capacity(data.nodes.len());

		for (i, node) in data.nodes.iter().enumerate() {
			if index.insert(node.id.clone(), i).is_some() {
				return Err(GraphError::DuplicateNode {
					id: node.id.clone(),
				});
			}
			let value = node
				.metric(metric)
				.filter(|v| v.is_finite())
				.ok_or_else(|| GraphError::MissingMetric {
					node: node.id.clone(),
					metric: metric.to_string(),
				})?;
			values.push(value);
		}

		let links = data
			.links
			.iter()
			.enumerate()
			.map(|(i, link)| -> GraphResult<ResolvedLink> {
				let resolve = |id: &String, end: LinkEnd| {
					index
						.get(id)
						.copied()
						.ok_or_else(|| GraphError::UnresolvedLink {
							index: i,
							end,
							id: id.clone(),
						})
				};
				Ok(ResolvedLink {
					source: resolve(&link.source, LinkEnd::Source)?,
					target: resolve(&link.target, LinkEnd::Target)?,
					weight: link.metric_or_zero(metric),
				})
			})
			.collect::<GraphResult<Vec<_>>>()?;

		Ok(Self {
			metric: metric.to_string(),
			nodes: data.nodes.clone(),
			links,
			raw_links: data.links.clone(),
			values,
			index,
		})
	}

	pub fn metric(&self) -> &str {
		&self.metric
	}

	pub fn nodes(&self) -> &[GraphNode] {
		&self.nodes
	}

	pub fn links(&self) -> &[ResolvedLink] {
		&self.links
	}

	/// Active metric value of node `i`.
	pub fn value(&self, i: usize) -> f64 {
		self.values[i]
	}

	pub fn values(&self) -> &[f64] {
		&self.values
	}

	pub fn index_of(&self, id: &str) -> Option<usize> {
		self.index.get(id).copied()
	}

	pub fn len(&self) -> usize {
		self.nodes.len()
	}

	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}

	/// Rebuild the original input records, e.g. to revalidate under another metric.
	pub fn to_graph_data(&self) -> GraphData {
		GraphData {
			nodes: self.nodes.clone(),
			links: self.raw_links.clone(),
		}
	}
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;

	fn data(value: serde_json::Value) -> GraphData {
		serde_json::from_value(value).unwrap()
	}

	#[test]
	fn resolves_links_to_indices() {
		let ds = Dataset::new(
			&data(json!({
				"nodes": [
					{ "id": "a", "name": "A", "claps": 10 },
					{ "id": "b", "name": "B", "claps": 100 }
				],
				"links": [{ "source": "b", "target": "a", "claps": 5 }]
			})),
			"claps",
		)
		.unwrap();

		assert_eq!(ds.len(), 2);
		assert_eq!(
			ds.links(),
			&[ResolvedLink {
				source: 1,
				target: 0,
				weight: 5.0
			}]
		);
		assert_eq!(ds.values(), &[10.0, 100.0]);
		assert_eq!(ds.index_of("b"), Some(1));
	}

	#[test]
	fn rejects_unknown_link_endpoint() {
		let err = Dataset::new(
			&data(json!({
				"nodes": [{ "id": "a", "claps": 1 }],
				"links": [{ "source": "a", "target": "ghost" }]
			})),
			"claps",
		)
		.unwrap_err();

		match err {
			GraphError::UnresolvedLink { index, end, id } => {
				assert_eq!(index, 0);
				assert_eq!(end, LinkEnd::Target);
				assert_eq!(id, "ghost");
			}
			other => panic!("unexpected error: {other}"),
		}
	}

	#[test]
	fn rejects_duplicate_ids() {
		let err = Dataset::new(
			&data(json!({
				"nodes": [{ "id": "a", "claps": 1 }, { "id": "a", "claps": 2 }],
				"links": []
			})),
			"claps",
		)
		.unwrap_err();
		assert!(matches!(err, GraphError::DuplicateNode { id } if id == "a"));
	}

	#[test]
	fn rejects_missing_or_non_numeric_metric() {
		let missing = Dataset::new(
			&data(json!({ "nodes": [{ "id": "a", "claps": 1 }, { "id": "b" }], "links": [] })),
			"claps",
		)
		.unwrap_err();
		assert!(matches!(missing, GraphError::MissingMetric { ref node, .. } if node == "b"));

		let textual = Dataset::new(
			&data(json!({ "nodes": [{ "id": "a", "claps": "lots" }], "links": [] })),
			"claps",
		)
		.unwrap_err();
		assert!(matches!(textual, GraphError::MissingMetric { .. }));
	}

	#[test]
	fn empty_dataset_is_valid() {
		let ds = Dataset::new(&GraphData::default(), "claps").unwrap();
		assert!(ds.is_empty());
		assert!(ds.links().is_empty());
	}

	#[test]
	fn round_trips_input_records() {
		let input = data(json!({
			"nodes": [{ "id": "a", "claps": 1, "avgResponses": 2.5 }],
			"links": [{ "source": "a", "target": "a", "weight": 0.1 }]
		}));
		let ds = Dataset::new(&input, "claps").unwrap();
		assert_eq!(ds.to_graph_data(), input);
		let again = Dataset::new(&ds.to_graph_data(), "avgResponses").unwrap();
		assert_eq!(again.value(0), 2.5);
	}
}
