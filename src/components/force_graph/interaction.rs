//! Pointer handling: node drag, background pan and click-to-select.
//!
//! One pointer stream drives both gestures. A press stays ambiguous until the
//! pointer travels past the click threshold; only then does it become a node
//! drag (pin + reheat) or a pan. Releasing before that is a click, and a click
//! on a node is the only thing that produces a selection.
//!
//! The controller never writes node positions or the view transform itself.
//! It goes through [`Simulation`] (`find`, `pin`, `unpin`, `reheat`, `cool`)
//! and [`Viewport::apply_gesture`].

use log::debug;

use super::simulation::Simulation;
use super::viewport::{Gesture, Point, Viewport};

/// Where the pointer state machine is. Positions are in screen space.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum PointerState {
	#[default]
	Idle,
	/// Pressed on a node, still under the click threshold.
	PressedNode { node: usize, start: Point },
	/// Node pinned and following the pointer. `grab` is the world-space offset
	/// from the pointer to the node center, so the node doesn't jump on drag start.
	DraggingNode { node: usize, grab: Point },
	/// Pressed on empty canvas, still under the click threshold.
	PressedBackground { start: Point },
	Panning { last: Point },
}

/// Outward-facing results of pointer handling.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InteractionEvent {
	/// A press and release on a node without crossing the threshold.
	NodeClicked(usize),
	DragStarted(usize),
	DragEnded(usize),
}

/// Drag/pan/click state machine.
#[derive(Clone, Debug)]
pub struct InteractionController {
	state: PointerState,
	click_threshold: f64,
	drag_alpha_target: f64,
}

impl InteractionController {
	/// `click_threshold` is in screen pixels; `drag_alpha_target` is the energy
	/// held while a node is dragged.
	pub fn new(click_threshold: f64, drag_alpha_target: f64) -> Self {
		Self {
			state: PointerState::Idle,
			click_threshold,
			drag_alpha_target,
		}
	}

	pub fn state(&self) -> PointerState {
		self.state
	}

	/// Node currently pinned under the pointer, if any.
	pub fn dragged_node(&self) -> Option<usize> {
		match self.state {
			PointerState::DraggingNode { node, .. } => Some(node),
			_ => None,
		}
	}

	/// Start a gesture. A press while another gesture is live means the
	/// release was lost; a drag in progress is ended first, as on release.
	pub fn pointer_down(
		&mut self,
		at: Point,
		sim: &mut Simulation,
		viewport: &Viewport,
	) -> Option<InteractionEvent> {
		let stale = match std::mem::take(&mut self.state) {
			PointerState::Idle => None,
			PointerState::DraggingNode { node, .. } => {
				debug!("pubnet-graph: pointer down while dragging node {node}, ending drag");
				self.release(node, sim);
				Some(InteractionEvent::DragEnded(node))
			}
			other => {
				debug!("pubnet-graph: pointer down in {other:?}, restarting gesture");
				None
			}
		};
		self.state = match sim.find(viewport.screen_to_world(at)) {
			Some(node) => PointerState::PressedNode { node, start: at },
			None => PointerState::PressedBackground { start: at },
		};
		stale
	}

	pub fn pointer_move(
		&mut self,
		at: Point,
		sim: &mut Simulation,
		viewport: &mut Viewport,
	) -> Option<InteractionEvent> {
		match self.state {
			PointerState::Idle => None,
			PointerState::PressedNode { node, start } => {
				if at.distance(start) <= self.click_threshold {
					return None;
				}
				let Some(origin) = sim.nodes().get(node).map(|n| n.position()) else {
					self.state = PointerState::Idle;
					return None;
				};
				let pointer = viewport.screen_to_world(start);
				let grab = Point::new(origin.x - pointer.x, origin.y - pointer.y);
				if !sim.pin(node, origin) {
					self.state = PointerState::Idle;
					return None;
				}
				sim.reheat(self.drag_alpha_target);
				self.state = PointerState::DraggingNode { node, grab };
				self.follow(node, grab, at, sim, viewport);
				debug!("pubnet-graph: drag started on node {node}");
				Some(InteractionEvent::DragStarted(node))
			}
			PointerState::DraggingNode { node, grab } => {
				self.follow(node, grab, at, sim, viewport);
				None
			}
			PointerState::PressedBackground { start } => {
				if at.distance(start) > self.click_threshold {
					viewport.apply_gesture(Gesture::Pan {
						dx: at.x - start.x,
						dy: at.y - start.y,
					});
					self.state = PointerState::Panning { last: at };
				}
				None
			}
			PointerState::Panning { last } => {
				viewport.apply_gesture(Gesture::Pan {
					dx: at.x - last.x,
					dy: at.y - last.y,
				});
				self.state = PointerState::Panning { last: at };
				None
			}
		}
	}

	pub fn pointer_up(&mut self, sim: &mut Simulation) -> Option<InteractionEvent> {
		match std::mem::take(&mut self.state) {
			PointerState::Idle => {
				debug!("pubnet-graph: pointer up without a press, ignored");
				None
			}
			PointerState::PressedNode { node, .. } => Some(InteractionEvent::NodeClicked(node)),
			PointerState::DraggingNode { node, .. } => {
				self.release(node, sim);
				Some(InteractionEvent::DragEnded(node))
			}
			PointerState::PressedBackground { .. } | PointerState::Panning { .. } => None,
		}
	}

	/// Abandon whatever is in progress, e.g. the pointer left the canvas.
	/// A drag in progress ends normally; a pending click is dropped.
	pub fn pointer_cancel(&mut self, sim: &mut Simulation) -> Option<InteractionEvent> {
		match std::mem::take(&mut self.state) {
			PointerState::DraggingNode { node, .. } => {
				self.release(node, sim);
				Some(InteractionEvent::DragEnded(node))
			}
			_ => None,
		}
	}

	/// Forget the current gesture without touching the simulation. Used when
	/// the simulation it referred to has been replaced.
	pub fn reset(&mut self) {
		self.state = PointerState::Idle;
	}

	fn follow(&self, node: usize, grab: Point, at: Point, sim: &mut Simulation, viewport: &Viewport) {
		let pointer = viewport.screen_to_world(at);
		sim.pin(node, Point::new(pointer.x + grab.x, pointer.y + grab.y));
	}

	fn release(&self, node: usize, sim: &mut Simulation) {
		sim.unpin(node);
		sim.cool();
		debug!("pubnet-graph: drag ended on node {node}");
	}
}
