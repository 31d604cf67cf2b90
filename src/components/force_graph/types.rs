//! Graph data structures for input to the force graph component.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::error::GraphResult;

/// A publication in the network.
///
/// Metric values are kept in `fields` alongside any other attributes so the
/// selection event can hand the complete record back to the host.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct GraphNode {
	/// Unique identifier for this node. Used to reference nodes in links.
	pub id: String,
	/// Display name. Falls back to `id` when empty.
	#[serde(default)]
	pub name: String,
	/// Optional category tags.
	#[serde(default, rename = "topTags", skip_serializing_if = "Vec::is_empty")]
	pub top_tags: Vec<String>,
	/// Every other attribute, including the numeric metrics.
	#[serde(flatten)]
	pub fields: Map<String, Value>,
}

impl GraphNode {
	/// Numeric value of `metric`, if present and numeric.
	pub fn metric(&self, metric: &str) -> Option<f64> {
		self.fields.get(metric).and_then(Value::as_f64)
	}

	pub fn display_name(&self) -> &str {
		if self.name.is_empty() { &self.id } else { &self.name }
	}

	/// Names of all numeric fields, in record order.
	pub fn metric_names(&self) -> impl Iterator<Item = &str> {
		self.fields
			.iter()
			.filter(|(_, v)| v.is_number())
			.map(|(k, _)| k.as_str())
	}
}

/// An undirected relation between two publications.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct GraphLink {
	/// Source node ID.
	pub source: String,
	/// Target node ID.
	pub target: String,
	/// Optional weights, keyed by metric name.
	#[serde(flatten)]
	pub fields: Map<String, Value>,
}

impl GraphLink {
	/// Link weight for `metric`. Missing or non-numeric values count as zero.
	pub fn metric_or_zero(&self, metric: &str) -> f64 {
		self.fields
			.get(metric)
			.and_then(Value::as_f64)
			.filter(|v| v.is_finite())
			.unwrap_or(0.0)
	}
}

/// Complete graph data: nodes and links.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct GraphData {
	pub nodes: Vec<GraphNode>,
	pub links: Vec<GraphLink>,
}

impl GraphData {
	/// Decode the `{ nodes, links }` document produced by the data loader.
	pub fn from_json(text: &str) -> GraphResult<Self> {
		Ok(serde_json::from_str(text)?)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn keeps_every_node_attribute() {
		let data = GraphData::from_json(
			r#"{
				"nodes": [
					{ "id": "tds", "name": "Towards Data Science", "avgClaps": 812.5,
					  "articleCount": 40, "topTags": ["ml", "python"] }
				],
				"links": []
			}"#,
		)
		.unwrap();

		let node = &data.nodes[0];
		assert_eq!(node.display_name(), "Towards Data Science");
		assert_eq!(node.metric("avgClaps"), Some(812.5));
		assert_eq!(node.metric("articleCount"), Some(40.0));
		assert_eq!(node.top_tags, vec!["ml", "python"]);
		assert!(!node.fields.contains_key("id"));
		let names: Vec<_> = node.metric_names().collect();
		assert!(names.contains(&"avgClaps") && names.contains(&"articleCount"));
	}

	#[test]
	fn link_metric_defaults_to_zero() {
		let data = GraphData::from_json(
			r#"{ "nodes": [], "links": [
				{ "source": "a", "target": "b", "weight": 0.25 },
				{ "source": "a", "target": "c", "weight": "n/a" }
			] }"#,
		)
		.unwrap();

		assert_eq!(data.links[0].metric_or_zero("weight"), 0.25);
		assert_eq!(data.links[0].metric_or_zero("commonDates"), 0.0);
		assert_eq!(data.links[1].metric_or_zero("weight"), 0.0);
	}

	#[test]
	fn name_falls_back_to_id() {
		let data = GraphData::from_json(r#"{ "nodes": [{ "id": "solo" }], "links": [] }"#).unwrap();
		assert_eq!(data.nodes[0].display_name(), "solo");
	}

	#[test]
	fn malformed_json_is_a_parse_error() {
		let err = GraphData::from_json("{ \"nodes\": [").unwrap_err();
		assert!(matches!(err, super::super::error::GraphError::Parse(_)));
	}
}
