//! Engine configuration.
//!
//! Every field has a default matching the stock publication-network view, so
//! a host only needs to supply the values it wants to change:
//!
//! ```json
//! { "simulation": { "charge": -250 }, "colorRamp": "blues" }
//! ```

use log::warn;
use serde::Deserialize;

use super::theme::ColorRamp;

/// Physics parameters for the layout simulation.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SimulationConfig {
	/// Many-body strength. Negative values repel.
	pub charge: f64,
	/// Minimum distance used by the many-body force, to avoid blow-ups.
	pub charge_distance_min: f64,
	/// Added to the sum of both endpoint radii to get a link's rest length.
	pub link_padding: f64,
	/// Added to each node's radius for overlap resolution.
	pub collision_padding: f64,
	pub collision_strength: f64,
	/// Strength of the pull toward the viewport center (1.0 recenters fully each tick).
	pub center_strength: f64,
	/// Starting energy.
	pub alpha: f64,
	/// Below this energy the layout is considered settled and ticks go idle.
	pub alpha_min: f64,
	/// Fraction of the gap to `alpha_target` closed each tick.
	pub alpha_decay: f64,
	/// Energy floor held while a node is being dragged.
	pub drag_alpha_target: f64,
	/// Velocity retained per tick.
	pub velocity_decay: f64,
	/// Spacing of the initial phyllotaxis spiral.
	pub initial_radius: f64,
}

impl Default for SimulationConfig {
	fn default() -> Self {
		Self {
			charge: -400.0,
			charge_distance_min: 1.0,
			link_padding: 50.0,
			collision_padding: 5.0,
			collision_strength: 1.0,
			center_strength: 1.0,
			alpha: 1.0,
			alpha_min: 0.001,
			// Settles in ~300 ticks.
			alpha_decay: 1.0 - 0.001_f64.powf(1.0 / 300.0),
			drag_alpha_target: 0.3,
			velocity_decay: 0.6,
			initial_radius: 10.0,
		}
	}
}

/// Output ranges for the metric scales.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ScaleRanges {
	/// Node radius range in world units, `(smallest, largest)`.
	pub radius: (f64, f64),
	/// Link stroke width range in world units.
	pub stroke_width: (f64, f64),
}

impl Default for ScaleRanges {
	fn default() -> Self {
		Self {
			radius: (20.0, 60.0),
			stroke_width: (1.0, 8.0),
		}
	}
}

/// Pan/zoom limits.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ViewportConfig {
	pub min_scale: f64,
	pub max_scale: f64,
	/// Zoom factor applied per wheel notch.
	pub wheel_step: f64,
}

impl Default for ViewportConfig {
	fn default() -> Self {
		Self {
			min_scale: 0.5,
			max_scale: 3.0,
			wheel_step: 1.1,
		}
	}
}

/// Top-level configuration for a [`ForceGraphState`](super::state::ForceGraphState).
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
	pub simulation: SimulationConfig,
	pub scales: ScaleRanges,
	pub viewport: ViewportConfig,
	/// Pointer travel in screen pixels that turns a press into a drag.
	pub click_threshold: f64,
	/// Pin the color family instead of deriving it from the metric name.
	pub color_ramp: Option<ColorRamp>,
}

impl Default for EngineConfig {
	fn default() -> Self {
		Self {
			simulation: SimulationConfig::default(),
			scales: ScaleRanges::default(),
			viewport: ViewportConfig::default(),
			click_threshold: 4.0,
			color_ramp: None,
		}
	}
}

impl EngineConfig {
	/// Parse a partial JSON override on top of the defaults.
	pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
		serde_json::from_str::<Self>(text).map(Self::sanitized)
	}

	/// Repair values the engine can't run with.
	///
	/// Reversed ranges are swapped; non-finite or out-of-domain values fall
	/// back to their defaults. Each repair is logged.
	pub fn sanitized(mut self) -> Self {
		let sim_default = SimulationConfig::default();
		let scale_default = ScaleRanges::default();
		let view_default = ViewportConfig::default();

		let sim = &mut self.simulation;
		if !(sim.alpha_decay > 0.0 && sim.alpha_decay <= 1.0) {
			warn!("pubnet-graph: alphaDecay {} outside (0, 1], using default", sim.alpha_decay);
			sim.alpha_decay = sim_default.alpha_decay;
		}
		if !(0.0..=1.0).contains(&sim.velocity_decay) {
			warn!("pubnet-graph: velocityDecay {} outside [0, 1], using default", sim.velocity_decay);
			sim.velocity_decay = sim_default.velocity_decay;
		}

		self.scales.radius = ordered_range("radius", self.scales.radius, scale_default.radius);
		self.scales.stroke_width =
			ordered_range("strokeWidth", self.scales.stroke_width, scale_default.stroke_width);

		let view = &mut self.viewport;
		let (min, max) = ordered_range(
			"scale",
			(view.min_scale, view.max_scale),
			(view_default.min_scale, view_default.max_scale),
		);
		(view.min_scale, view.max_scale) = if min > 0.0 {
			(min, max)
		} else {
			warn!("pubnet-graph: minScale {min} must be positive, using default scale limits");
			(view_default.min_scale, view_default.max_scale)
		};
		if !(view.wheel_step.is_finite() && view.wheel_step > 0.0) {
			warn!("pubnet-graph: wheelStep {} must be positive, using default", view.wheel_step);
			view.wheel_step = view_default.wheel_step;
		}

		if !(self.click_threshold.is_finite() && self.click_threshold >= 0.0) {
			warn!("pubnet-graph: clickThreshold {} invalid, using default", self.click_threshold);
			self.click_threshold = EngineConfig::default().click_threshold;
		}
		self
	}
}

fn ordered_range(name: &str, (lo, hi): (f64, f64), fallback: (f64, f64)) -> (f64, f64) {
	if !(lo.is_finite() && hi.is_finite()) {
		warn!("pubnet-graph: {name} range ({lo}, {hi}) not finite, using default");
		return fallback;
	}
	if lo > hi {
		warn!("pubnet-graph: {name} range ({lo}, {hi}) reversed, swapping");
		return (hi, lo);
	}
	(lo, hi)
}
