//! Metric-driven visual encodings.
//!
//! Maps the active metric onto the three visual channels of the graph:
//!
//! - **Radius**: square-root scale, so a node's *area* tracks its value.
//! - **Fill**: sequential color ramp over the linear metric extent.
//! - **Stroke width**: linear scale over the link weights.
//!
//! All scales clamp. A value outside the observed domain lands on the nearest
//! end of the output range, and a degenerate domain (`min == max`) maps every
//! input to the middle of the range rather than dividing by zero.

use super::config::ScaleRanges;
use super::dataset::Dataset;
use super::theme::{Color, ColorRamp};

/// How the domain is warped before interpolation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Curve {
	Linear,
	/// Signed square root, so negative metrics stay ordered.
	Sqrt,
}

impl Curve {
	fn apply(self, x: f64) -> f64 {
		match self {
			Curve::Linear => x,
			Curve::Sqrt => x.signum() * x.abs().sqrt(),
		}
	}
}

/// Observed `[min, max]` of a metric.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Domain {
	pub min: f64,
	pub max: f64,
}

impl Domain {
	/// Extent of the finite values. Empty input gives the degenerate `[0, 0]`.
	pub fn of(values: impl IntoIterator<Item = f64>) -> Self {
		let (min, max) = values
			.into_iter()
			.filter(|v| v.is_finite())
			.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
				(lo.min(v), hi.max(v))
			});
		if min > max {
			Self { min: 0.0, max: 0.0 }
		} else {
			Self { min, max }
		}
	}

	pub fn is_degenerate(&self) -> bool {
		self.min == self.max
	}
}

/// Position of `x` within `[d0, d1]`, clamped to `[0, 1]`.
fn normalize(d0: f64, d1: f64, x: f64) -> f64 {
	if d0 == d1 {
		return 0.5;
	}
	let t = (x - d0) / (d1 - d0);
	if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) }
}

/// Clamped continuous scale from a metric domain to a numeric range.
#[derive(Clone, Debug, PartialEq)]
pub struct ContinuousScale {
	curve: Curve,
	domain: Domain,
	range: (f64, f64),
}

impl ContinuousScale {
	pub fn new(curve: Curve, domain: Domain, range: (f64, f64)) -> Self {
		Self {
			curve,
			domain,
			range,
		}
	}

	pub fn domain(&self) -> Domain {
		self.domain
	}

	pub fn range(&self) -> (f64, f64) {
		self.range
	}

	/// Map `value` into the output range.
	pub fn apply(&self, value: f64) -> f64 {
		let t = normalize(
			self.curve.apply(self.domain.min),
			self.curve.apply(self.domain.max),
			self.curve.apply(value),
		);
		self.range.0 + t * (self.range.1 - self.range.0)
	}
}

/// Clamped sequential color scale.
#[derive(Clone, Debug, PartialEq)]
pub struct ColorScale {
	domain: Domain,
	ramp: ColorRamp,
}

impl ColorScale {
	pub fn new(domain: Domain, ramp: ColorRamp) -> Self {
		Self { domain, ramp }
	}

	pub fn ramp(&self) -> ColorRamp {
		self.ramp
	}

	/// Position along the ramp in `[0, 1]`.
	pub fn position(&self, value: f64) -> f64 {
		normalize(self.domain.min, self.domain.max, value)
	}

	pub fn apply(&self, value: f64) -> Color {
		self.ramp.sample(self.position(value))
	}
}

/// The three encodings derived from one (dataset, metric) pair.
///
/// Rebuilt whenever data or metric change; the color family is fixed for the
/// lifetime of the value.
#[derive(Clone, Debug, PartialEq)]
pub struct VisualScales {
	pub size: ContinuousScale,
	pub color: ColorScale,
	pub stroke: ContinuousScale,
}

impl VisualScales {
	pub fn new(dataset: &Dataset, ranges: &ScaleRanges, ramp: ColorRamp) -> Self {
		let node_domain = Domain::of(dataset.values().iter().copied());
		let link_domain = Domain::of(dataset.links().iter().map(|l| l.weight));
		Self {
			size: ContinuousScale::new(Curve::Sqrt, node_domain, ranges.radius),
			color: ColorScale::new(node_domain, ramp),
			stroke: ContinuousScale::new(Curve::Linear, link_domain, ranges.stroke_width),
		}
	}

	/// Node radius for a metric value.
	pub fn size_of(&self, value: f64) -> f64 {
		self.size.apply(value)
	}

	/// Node fill for a metric value.
	pub fn color_of(&self, value: f64) -> Color {
		self.color.apply(value)
	}

	/// Link stroke width for a link weight.
	pub fn stroke_width_of(&self, weight: f64) -> f64 {
		self.stroke.apply(weight)
	}

	/// Rendered radius of every node, in dataset order.
	pub fn radii(&self, dataset: &Dataset) -> Vec<f64> {
		dataset.values().iter().map(|&v| self.size_of(v)).collect()
	}
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;
	use crate::components::force_graph::types::GraphData;

	fn scales(value: serde_json::Value) -> VisualScales {
		let data: GraphData = serde_json::from_value(value).unwrap();
		let ds = Dataset::new(&data, "claps").unwrap();
		VisualScales::new(&ds, &ScaleRanges::default(), ColorRamp::Greens)
	}

	fn two_node_scales() -> VisualScales {
		scales(json!({
			"nodes": [
				{ "id": "A", "name": "A", "claps": 10 },
				{ "id": "B", "name": "B", "claps": 100 }
			],
			"links": [{ "source": "A", "target": "B", "claps": 5 }]
		}))
	}

	#[test]
	fn size_grows_with_value_within_range() {
		let s = two_node_scales();
		let (a, b) = (s.size_of(10.0), s.size_of(100.0));
		assert!(a < b);
		assert_eq!(a, 20.0);
		assert_eq!(b, 60.0);
		// Square-root shape: the midpoint value lands above the radius midpoint.
		assert!(s.size_of(55.0) > 40.0);
	}

	#[test]
	fn size_and_color_are_monotonic() {
		let s = two_node_scales();
		let mut last_radius = f64::NEG_INFINITY;
		let mut last_position = f64::NEG_INFINITY;
		let mut last_luminance = f64::INFINITY;
		for i in 0..=200 {
			let v = -50.0 + i as f64;
			let r = s.size_of(v);
			let p = s.color.position(v);
			let lum = s.color_of(v).relative_luminance();
			assert!((20.0..=60.0).contains(&r), "radius {r} out of range for {v}");
			assert!((0.0..=1.0).contains(&p));
			assert!(r >= last_radius && p >= last_position && lum <= last_luminance + 1e-12);
			last_radius = r;
			last_position = p;
			last_luminance = lum;
		}
	}

	#[test]
	fn values_outside_domain_clamp() {
		let s = two_node_scales();
		assert_eq!(s.size_of(-1e9), 20.0);
		assert_eq!(s.size_of(1e9), 60.0);
		assert_eq!(s.color_of(1e9), ColorRamp::Greens.sample(1.0));
	}

	#[test]
	fn degenerate_domain_has_single_valid_encoding() {
		let s = scales(json!({
			"nodes": [
				{ "id": "a", "claps": 50 },
				{ "id": "b", "claps": 50 },
				{ "id": "c", "claps": 50 }
			],
			"links": [{ "source": "a", "target": "b" }]
		}));
		let r = s.size_of(50.0);
		assert_eq!(r, 40.0);
		assert_eq!(s.color_of(50.0), ColorRamp::Greens.sample(0.5));
		assert!(!s.stroke_width_of(0.0).is_nan());
		for v in [f64::NAN, 0.0, 50.0, 1e6] {
			assert!(!s.size_of(v).is_nan());
			assert!(!s.stroke_width_of(v).is_nan());
			assert!(!s.color.position(v).is_nan());
		}
	}

	#[test]
	fn missing_link_weights_map_from_zero() {
		let s = scales(json!({
			"nodes": [{ "id": "a", "claps": 1 }, { "id": "b", "claps": 2 }, { "id": "c", "claps": 3 }],
			"links": [
				{ "source": "a", "target": "b" },
				{ "source": "b", "target": "c", "claps": 10 }
			]
		}));
		assert_eq!(s.stroke.domain(), Domain { min: 0.0, max: 10.0 });
		assert_eq!(s.stroke_width_of(0.0), 1.0);
		assert_eq!(s.stroke_width_of(5.0), 4.5);
		assert_eq!(s.stroke_width_of(1e9), 8.0);
	}

	#[test]
	fn empty_domain_is_degenerate() {
		let d = Domain::of(std::iter::empty());
		assert!(d.is_degenerate());
		assert_eq!(ContinuousScale::new(Curve::Sqrt, d, (20.0, 60.0)).apply(3.0), 40.0);
	}
}
