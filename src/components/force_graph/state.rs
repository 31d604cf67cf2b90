//! Engine state shared by the animation loop and the pointer handlers.
//!
//! [`ForceGraphState`] owns one validated dataset, its visual scales, the
//! simulation laid out from them, the viewport, the pointer state machine and
//! the render scene. Changing the data or the metric discards the simulation
//! and seeds a fresh one; the scene is re-joined so persisting elements keep
//! their identity.

use log::{debug, info, warn};

use super::config::EngineConfig;
use super::dataset::Dataset;
use super::error::GraphResult;
use super::interaction::{InteractionController, InteractionEvent};
use super::scale::VisualScales;
use super::simulation::{Simulation, SimulationStatus, SubscriptionId, TickEvent};
use super::sync::{JoinSummary, Scene};
use super::theme::{ColorRamp, Theme};
use super::types::{GraphData, GraphNode};
use super::viewport::{Gesture, Point, ViewTransform, Viewport};

/// Events surfaced to the host UI.
#[derive(Clone, Debug, PartialEq)]
pub enum EngineEvent {
	/// The selected node changed. Carries the full input record, or `None`
	/// when the selection was cleared.
	SelectionChanged(Option<GraphNode>),
}

/// Core graph state: dataset, physics, view and interaction.
///
/// Created once per mounted canvas and mutated by the animation loop
/// ([`tick`](Self::tick)) and the pointer handlers. Every method runs to
/// completion before the next is called; nothing here is shared across threads.
pub struct ForceGraphState {
	config: EngineConfig,
	theme: Theme,
	dataset: Dataset,
	color_ramp: ColorRamp,
	scales: VisualScales,
	simulation: Simulation,
	viewport: Viewport,
	interaction: InteractionController,
	scene: Scene,
	selected: Option<String>,
	width: f64,
	height: f64,
	generation: u64,
}

impl std::fmt::Debug for ForceGraphState {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("ForceGraphState")
			.field("metric", &self.dataset.metric())
			.field("nodes", &self.dataset.len())
			.field("simulation", &self.simulation)
			.field("selected", &self.selected)
			.finish()
	}
}

impl ForceGraphState {
	/// Validate `data` for `metric` and start laying it out in a
	/// `width` x `height` viewport.
	pub fn new(
		data: &GraphData,
		metric: &str,
		width: f64,
		height: f64,
		config: EngineConfig,
	) -> GraphResult<Self> {
		let dataset = validate(data, metric)?;
		let config = config.sanitized();
		let generation = 1;
		let center = Point::new(width / 2.0, height / 2.0);
		let (color_ramp, scales, simulation) = seed(&dataset, &config, generation, center);

		let mut scene = Scene::new();
		let summary = scene.join(&dataset, &scales);
		scene.sync_positions(&simulation.positions());
		log_start("started", &dataset, color_ramp, summary);

		Ok(Self {
			theme: Theme::default(),
			viewport: Viewport::new(config.viewport.clone()),
			interaction: InteractionController::new(
				config.click_threshold,
				config.simulation.drag_alpha_target,
			),
			config,
			dataset,
			color_ramp,
			scales,
			simulation,
			scene,
			selected: None,
			width,
			height,
			generation,
		})
	}

	/// Swap in a new dataset and/or metric.
	///
	/// On a validation error nothing changes and the current layout keeps
	/// running. Otherwise the previous simulation is stopped before the new
	/// one starts and the viewport returns to identity. A selection whose
	/// node no longer exists is cleared, and the clearing is returned.
	pub fn replace(&mut self, data: &GraphData, metric: &str) -> GraphResult<Option<EngineEvent>> {
		let dataset = validate(data, metric)?;

		self.simulation.stop();
		self.interaction.reset();
		self.generation += 1;
		let (color_ramp, scales, simulation) =
			seed(&dataset, &self.config, self.generation, self.center());

		let summary = self.scene.join(&dataset, &scales);
		self.scene.sync_positions(&simulation.positions());
		log_start("replaced", &dataset, color_ramp, summary);

		self.dataset = dataset;
		self.color_ramp = color_ramp;
		self.scales = scales;
		self.simulation = simulation;
		self.viewport = Viewport::new(self.config.viewport.clone());

		let gone = self
			.selected
			.as_deref()
			.is_some_and(|id| self.dataset.index_of(id).is_none());
		if gone {
			return Ok(self.set_selection(None));
		}
		Ok(None)
	}

	/// Re-encode and re-seed the current data under another metric.
	pub fn set_metric(&mut self, metric: &str) -> GraphResult<Option<EngineEvent>> {
		let data = self.dataset.to_graph_data();
		self.replace(&data, metric)
	}

	/// Advance the simulation one step and move the scene to match.
	///
	/// Returns `true` if anything moved; a settled or stopped layout returns
	/// `false` and can skip repainting.
	pub fn tick(&mut self) -> bool {
		match self.simulation.tick() {
			Some(event) => self.apply_tick(&event),
			None => false,
		}
	}

	fn apply_tick(&mut self, event: &TickEvent) -> bool {
		event.generation == self.generation && self.scene.sync_positions(&event.positions)
	}

	/// Register a callback for every tick of the current simulation.
	///
	/// The subscription ends when the simulation stops, which includes being
	/// replaced by [`replace`](Self::replace) or [`set_metric`](Self::set_metric).
	pub fn subscribe_ticks(&mut self, listener: impl FnMut(&TickEvent) + 'static) -> SubscriptionId {
		self.simulation.subscribe(listener)
	}

	pub fn unsubscribe_ticks(&mut self, id: SubscriptionId) -> bool {
		self.simulation.unsubscribe(id)
	}

	pub fn pointer_down(&mut self, at: Point) {
		let event = self
			.interaction
			.pointer_down(at, &mut self.simulation, &self.viewport);
		self.after_interaction(event);
	}

	pub fn pointer_move(&mut self, at: Point) {
		let event = self
			.interaction
			.pointer_move(at, &mut self.simulation, &mut self.viewport);
		self.after_interaction(event);
	}

	pub fn pointer_up(&mut self) -> Option<EngineEvent> {
		let event = self.interaction.pointer_up(&mut self.simulation);
		self.after_interaction(event)
	}

	/// The pointer left the canvas or the gesture was interrupted.
	pub fn pointer_cancel(&mut self) {
		let event = self.interaction.pointer_cancel(&mut self.simulation);
		self.after_interaction(event);
	}

	/// Zoom one wheel step at `at` (screen space).
	pub fn wheel(&mut self, at: Point, delta_y: f64) -> ViewTransform {
		let factor = self.viewport.wheel_factor(delta_y);
		self.viewport.apply_gesture(Gesture::Zoom { anchor: at, factor })
	}

	pub fn apply_gesture(&mut self, gesture: Gesture) -> ViewTransform {
		self.viewport.apply_gesture(gesture)
	}

	fn after_interaction(&mut self, event: Option<InteractionEvent>) -> Option<EngineEvent> {
		match event? {
			InteractionEvent::NodeClicked(index) => {
				let id = self.dataset.nodes().get(index)?.id.clone();
				self.set_selection(Some(&id))
			}
			InteractionEvent::DragStarted(_) | InteractionEvent::DragEnded(_) => None,
		}
	}

	/// Select the node with `id` (or clear with `None`) as the host would.
	///
	/// Selecting a node always reports it, even when it was already selected.
	/// Unknown ids are ignored.
	pub fn set_selection(&mut self, id: Option<&str>) -> Option<EngineEvent> {
		let node = match id {
			Some(id) => {
				let index = self.dataset.index_of(id)?;
				Some(self.dataset.nodes()[index].clone())
			}
			None if self.selected.is_none() => return None,
			None => None,
		};
		self.selected = node.as_ref().map(|n| n.id.clone());
		self.scene.set_selected(self.selected.as_deref());
		debug!("pubnet-graph: selection is now {:?}", self.selected);
		Some(EngineEvent::SelectionChanged(node))
	}

	pub fn clear_selection(&mut self) -> Option<EngineEvent> {
		self.set_selection(None)
	}

	pub fn selected(&self) -> Option<&GraphNode> {
		let index = self.dataset.index_of(self.selected.as_deref()?)?;
		self.dataset.nodes().get(index)
	}

	/// New canvas size. The layout drifts to the new center without reseeding.
	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
		self.simulation.set_center(self.center());
		self.simulation.wake(self.config.simulation.drag_alpha_target);
	}

	/// Stop the simulation for good, releasing any pin held by a drag.
	/// Safe to call repeatedly.
	pub fn stop(&mut self) {
		self.interaction.reset();
		self.simulation.stop();
	}

	pub fn is_stopped(&self) -> bool {
		self.simulation.status() == SimulationStatus::Stopped
	}

	pub fn scene(&self) -> &Scene {
		&self.scene
	}

	pub fn transform(&self) -> ViewTransform {
		self.viewport.current_transform()
	}

	pub fn theme(&self) -> &Theme {
		&self.theme
	}

	pub fn dataset(&self) -> &Dataset {
		&self.dataset
	}

	pub fn metric(&self) -> &str {
		self.dataset.metric()
	}

	pub fn scales(&self) -> &VisualScales {
		&self.scales
	}

	pub fn color_ramp(&self) -> ColorRamp {
		self.color_ramp
	}

	pub fn simulation(&self) -> &Simulation {
		&self.simulation
	}

	pub fn generation(&self) -> u64 {
		self.generation
	}

	pub fn size(&self) -> (f64, f64) {
		(self.width, self.height)
	}

	fn center(&self) -> Point {
		Point::new(self.width / 2.0, self.height / 2.0)
	}
}

fn validate(data: &GraphData, metric: &str) -> GraphResult<Dataset> {
	Dataset::new(data, metric).inspect_err(|e| warn!("pubnet-graph: rejected dataset: {e}"))
}

fn seed(
	dataset: &Dataset,
	config: &EngineConfig,
	generation: u64,
	center: Point,
) -> (ColorRamp, VisualScales, Simulation) {
	let ramp = config
		.color_ramp
		.unwrap_or_else(|| ColorRamp::for_key(dataset.metric()));
	let scales = VisualScales::new(dataset, &config.scales, ramp);
	let simulation = Simulation::new(
		generation,
		dataset,
		&scales.radii(dataset),
		center,
		config.simulation.clone(),
	);
	(ramp, scales, simulation)
}

fn log_start(verb: &str, dataset: &Dataset, ramp: ColorRamp, summary: JoinSummary) {
	info!(
		"pubnet-graph: {verb} layout of {} nodes, {} links by {:?} ({ramp:?})",
		dataset.len(),
		dataset.links().len(),
		dataset.metric(),
	);
	debug!(
		"pubnet-graph: join entered {}, updated {}, exited {}",
		summary.entered, summary.updated, summary.exited
	);
}
