//! Force-directed layout simulation.
//!
//! Each tick applies, in order: link springs, many-body repulsion, centering
//! and collision resolution. Forces only touch velocities; positions are
//! integrated once at the end of the tick, so every force of tick N reads the
//! positions left by tick N-1.
//!
//! Energy (`alpha`) scales every force and decays toward `alpha_target`.
//! Dragging raises the target so the layout keeps reacting; once both fall
//! below `alpha_min` the layout is settled and ticks go idle until reheated.
//!
//! A pinned node (`fx`/`fy` set) is held exactly at its pin regardless of the
//! forces computed that tick.

use log::debug;

use super::config::SimulationConfig;
use super::dataset::Dataset;
use super::viewport::Point;

/// Per-node physics state.
#[derive(Clone, Debug, PartialEq)]
pub struct SimNode {
	pub x: f64,
	pub y: f64,
	pub vx: f64,
	pub vy: f64,
	/// Pinned coordinates, overriding physics while set.
	pub fx: Option<f64>,
	pub fy: Option<f64>,
	/// Rendered radius; drives link rest length and collision.
	pub radius: f64,
}

impl SimNode {
	pub fn position(&self) -> Point {
		Point::new(self.x, self.y)
	}

	pub fn is_pinned(&self) -> bool {
		self.fx.is_some() || self.fy.is_some()
	}
}

/// A spring between two node indices.
#[derive(Clone, Copy, Debug)]
struct SimLink {
	source: usize,
	target: usize,
	distance: f64,
	strength: f64,
	/// Share of the correction applied to the target; the source takes the rest.
	bias: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SimulationStatus {
	Running,
	Stopped,
}

/// Emitted after every completed integration step.
#[derive(Clone, Debug, PartialEq)]
pub struct TickEvent {
	/// Identity of the simulation instance that produced this tick.
	pub generation: u64,
	/// 1-based tick counter.
	pub tick: u64,
	pub alpha: f64,
	/// Node positions in dataset order.
	pub positions: Vec<Point>,
}

/// Handle returned by [`Simulation::subscribe`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type TickListener = Box<dyn FnMut(&TickEvent)>;

/// Physics state for one (dataset, metric) pair.
pub struct Simulation {
	generation: u64,
	config: SimulationConfig,
	nodes: Vec<SimNode>,
	links: Vec<SimLink>,
	center: Point,
	alpha: f64,
	alpha_target: f64,
	ticks: u64,
	status: SimulationStatus,
	seed: u32,
	listeners: Vec<(SubscriptionId, TickListener)>,
	next_subscription: u64,
}

impl std::fmt::Debug for Simulation {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Simulation")
			.field("generation", &self.generation)
			.field("nodes", &self.nodes.len())
			.field("links", &self.links.len())
			.field("alpha", &self.alpha)
			.field("status", &self.status)
			.finish()
	}
}

impl Simulation {
	/// Seed a running simulation.
	///
	/// `radii` holds the rendered radius of each node in dataset order. Nodes
	/// start on a phyllotaxis spiral around `center`.
	pub fn new(
		generation: u64,
		dataset: &Dataset,
		radii: &[f64],
		center: Point,
		config: SimulationConfig,
	) -> Self {
		let golden_angle = std::f64::consts::PI * (3.0 - 5.0_f64.sqrt());
		let nodes = (0..dataset.len())
			.map(|i| {
				let r = config.initial_radius * (0.5 + i as f64).sqrt();
				let angle = i as f64 * golden_angle;
				SimNode {
					x: center.x + r * angle.cos(),
					y: center.y + r * angle.sin(),
					vx: 0.0,
					vy: 0.0,
					fx: None,
					fy: None,
					radius: radii.get(i).copied().unwrap_or(0.0),
				}
			})
			.collect::<Vec<_>>();

		// Self-loops carry no spring.
		let springs = dataset.links().iter().filter(|l| l.source != l.target);
		let mut degree = vec![0_usize; nodes.len()];
		for link in springs.clone() {
			degree[link.source] += 1;
			degree[link.target] += 1;
		}
		let links = springs
			.map(|link| {
				let (s, t) = (degree[link.source] as f64, degree[link.target] as f64);
				SimLink {
					source: link.source,
					target: link.target,
					distance: nodes[link.source].radius
						+ nodes[link.target].radius
						+ config.link_padding,
					strength: 1.0 / s.min(t),
					bias: s / (s + t),
				}
			})
			.collect();

		Self {
			generation,
			alpha: config.alpha,
			alpha_target: 0.0,
			config,
			nodes,
			links,
			center,
			ticks: 0,
			status: SimulationStatus::Running,
			seed: 1,
			listeners: Vec::new(),
			next_subscription: 0,
		}
	}

	pub fn generation(&self) -> u64 {
		self.generation
	}

	pub fn status(&self) -> SimulationStatus {
		self.status
	}

	pub fn alpha(&self) -> f64 {
		self.alpha
	}

	pub fn alpha_target(&self) -> f64 {
		self.alpha_target
	}

	pub fn ticks(&self) -> u64 {
		self.ticks
	}

	pub fn nodes(&self) -> &[SimNode] {
		&self.nodes
	}

	pub fn positions(&self) -> Vec<Point> {
		self.nodes.iter().map(SimNode::position).collect()
	}

	/// Energy has decayed below `alpha_min` and nothing is holding it up.
	pub fn is_settled(&self) -> bool {
		self.alpha < self.config.alpha_min && self.alpha_target < self.config.alpha_min
	}

	/// Advance one step.
	///
	/// Returns `None` once stopped, and while settled. Listeners receive the
	/// same event that is returned.
	pub fn tick(&mut self) -> Option<TickEvent> {
		if self.status == SimulationStatus::Stopped || self.is_settled() {
			return None;
		}

		self.alpha += (self.alpha_target - self.alpha) * self.config.alpha_decay;

		self.apply_link_force();
		self.apply_many_body_force();
		self.apply_center_force();
		self.apply_collision_force();
		self.integrate();

		self.ticks += 1;
		let event = TickEvent {
			generation: self.generation,
			tick: self.ticks,
			alpha: self.alpha,
			positions: self.positions(),
		};
		for (_, listener) in &mut self.listeners {
			listener(&event);
		}
		Some(event)
	}

	/// Hold node `i` at `at`. Takes effect immediately and on every tick until unpinned.
	pub fn pin(&mut self, i: usize, at: Point) -> bool {
		if self.status == SimulationStatus::Stopped {
			return false;
		}
		let Some(node) = self.nodes.get_mut(i) else {
			return false;
		};
		node.fx = Some(at.x);
		node.fy = Some(at.y);
		node.x = at.x;
		node.y = at.y;
		node.vx = 0.0;
		node.vy = 0.0;
		true
	}

	/// Hand node `i` back to the physics.
	pub fn unpin(&mut self, i: usize) -> bool {
		let Some(node) = self.nodes.get_mut(i) else {
			return false;
		};
		let was_pinned = node.is_pinned();
		node.fx = None;
		node.fy = None;
		was_pinned
	}

	pub fn release_all(&mut self) {
		for node in &mut self.nodes {
			node.fx = None;
			node.fy = None;
		}
	}

	/// Keep energy at least near `target` until [`cool`](Self::cool) is called.
	pub fn reheat(&mut self, target: f64) {
		self.alpha_target = target.max(0.0);
	}

	/// Let energy decay back to rest.
	pub fn cool(&mut self) {
		self.alpha_target = 0.0;
	}

	/// Raise the current energy to at least `alpha` so a settled layout moves again.
	pub fn wake(&mut self, alpha: f64) {
		if self.status == SimulationStatus::Running {
			self.alpha = self.alpha.max(alpha);
		}
	}

	/// Move the centering target, e.g. after a resize.
	pub fn set_center(&mut self, center: Point) {
		self.center = center;
	}

	pub fn center(&self) -> Point {
		self.center
	}

	/// Topmost node whose disc contains `p` (world coordinates).
	pub fn find(&self, p: Point) -> Option<usize> {
		self.nodes
			.iter()
			.enumerate()
			.rev()
			.find(|(_, n)| n.position().distance(p) <= n.radius)
			.map(|(i, _)| i)
	}

	/// Register a callback invoked with every emitted tick.
	pub fn subscribe(&mut self, listener: impl FnMut(&TickEvent) + 'static) -> SubscriptionId {
		let id = SubscriptionId(self.next_subscription);
		self.next_subscription += 1;
		self.listeners.push((id, Box::new(listener)));
		id
	}

	pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
		let before = self.listeners.len();
		self.listeners.retain(|(sid, _)| *sid != id);
		self.listeners.len() != before
	}

	/// Stop for good: no further ticks, pins released, listeners dropped.
	/// Calling it again is a no-op.
	pub fn stop(&mut self) {
		if self.status == SimulationStatus::Stopped {
			return;
		}
		self.status = SimulationStatus::Stopped;
		self.release_all();
		self.listeners.clear();
		debug!(
			"pubnet-graph: simulation {} stopped after {} ticks",
			self.generation, self.ticks
		);
	}

	/// Tiny deterministic offset used to separate coincident points.
	fn jiggle(&mut self) -> f64 {
		self.seed = self.seed.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
		(self.seed as f64 / u32::MAX as f64 - 0.5) * 1e-6
	}

	fn apply_link_force(&mut self) {
		for k in 0..self.links.len() {
			let link = self.links[k];
			let (s, t) = (&self.nodes[link.source], &self.nodes[link.target]);
			let mut x = t.x + t.vx - s.x - s.vx;
			let mut y = t.y + t.vy - s.y - s.vy;
			if x == 0.0 {
				x = self.jiggle();
			}
			if y == 0.0 {
				y = self.jiggle();
			}
			let l = (x * x + y * y).sqrt();
			let l = (l - link.distance) / l * self.alpha * link.strength;
			let (x, y) = (x * l, y * l);

			let target = &mut self.nodes[link.target];
			target.vx -= x * link.bias;
			target.vy -= y * link.bias;
			let source = &mut self.nodes[link.source];
			source.vx += x * (1.0 - link.bias);
			source.vy += y * (1.0 - link.bias);
		}
	}

	fn apply_many_body_force(&mut self) {
		let strength = self.config.charge * self.alpha;
		let min2 = self.config.charge_distance_min * self.config.charge_distance_min;
		let n = self.nodes.len();

		for i in 0..n {
			for j in (i + 1)..n {
				let mut x = self.nodes[j].x - self.nodes[i].x;
				let mut y = self.nodes[j].y - self.nodes[i].y;
				let mut l = x * x + y * y;
				if x == 0.0 {
					x = self.jiggle();
					l += x * x;
				}
				if y == 0.0 {
					y = self.jiggle();
					l += y * y;
				}
				if l < min2 {
					l = (min2 * l).sqrt();
				}
				let w = strength / l;
				self.nodes[i].vx += x * w;
				self.nodes[i].vy += y * w;
				self.nodes[j].vx -= x * w;
				self.nodes[j].vy -= y * w;
			}
		}
	}

	fn apply_center_force(&mut self) {
		let n = self.nodes.len();
		if n == 0 {
			return;
		}
		let (sx, sy) = self
			.nodes
			.iter()
			.fold((0.0, 0.0), |(sx, sy), node| (sx + node.x, sy + node.y));
		let shift_x = (self.center.x - sx / n as f64) * self.config.center_strength;
		let shift_y = (self.center.y - sy / n as f64) * self.config.center_strength;
		for node in &mut self.nodes {
			node.x += shift_x;
			node.y += shift_y;
		}
	}

	fn apply_collision_force(&mut self) {
		let padding = self.config.collision_padding;
		let strength = self.config.collision_strength;
		let n = self.nodes.len();

		for i in 0..n {
			let ri = self.nodes[i].radius + padding;
			let xi = self.nodes[i].x + self.nodes[i].vx;
			let yi = self.nodes[i].y + self.nodes[i].vy;
			for j in (i + 1)..n {
				let rj = self.nodes[j].radius + padding;
				let r = ri + rj;
				let mut x = xi - self.nodes[j].x - self.nodes[j].vx;
				let mut y = yi - self.nodes[j].y - self.nodes[j].vy;
				let mut l = x * x + y * y;
				if l >= r * r {
					continue;
				}
				if x == 0.0 {
					x = self.jiggle();
					l += x * x;
				}
				if y == 0.0 {
					y = self.jiggle();
					l += y * y;
				}
				let dist = l.sqrt();
				let push = (r - dist) / dist * strength;
				x *= push;
				y *= push;
				let share = rj * rj / (ri * ri + rj * rj);
				self.nodes[i].vx += x * share;
				self.nodes[i].vy += y * share;
				self.nodes[j].vx -= x * (1.0 - share);
				self.nodes[j].vy -= y * (1.0 - share);
			}
		}
	}

	fn integrate(&mut self) {
		let decay = self.config.velocity_decay;
		for node in &mut self.nodes {
			match node.fx {
				Some(fx) => {
					node.x = fx;
					node.vx = 0.0;
				}
				None => {
					node.vx *= decay;
					node.x += node.vx;
				}
			}
			match node.fy {
				Some(fy) => {
					node.y = fy;
					node.vy = 0.0;
				}
				None => {
					node.vy *= decay;
					node.y += node.vy;
				}
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use std::cell::RefCell;
	use std::rc::Rc;

	use serde_json::json;

	use super::*;
	use crate::components::force_graph::types::GraphData;

	const CENTER: Point = Point::new(400.0, 300.0);

	fn dataset(value: serde_json::Value) -> Dataset {
		let data: GraphData = serde_json::from_value(value).unwrap();
		Dataset::new(&data, "claps").unwrap()
	}

	fn pair() -> Dataset {
		dataset(json!({
			"nodes": [
				{ "id": "A", "name": "A", "claps": 10 },
				{ "id": "B", "name": "B", "claps": 100 }
			],
			"links": [{ "source": "A", "target": "B", "claps": 5 }]
		}))
	}

	fn simulation(ds: &Dataset, radii: &[f64]) -> Simulation {
		Simulation::new(1, ds, radii, CENTER, SimulationConfig::default())
	}

	fn run(sim: &mut Simulation, ticks: usize) {
		for _ in 0..ticks {
			sim.tick();
		}
	}

	#[test]
	fn energy_decays_until_settled() {
		let ds = pair();
		let mut sim = simulation(&ds, &[20.0, 60.0]);
		let first = sim.tick().unwrap();
		assert!(first.alpha < 1.0);
		assert_eq!(first.tick, 1);
		assert_eq!(first.positions.len(), 2);

		let mut emitted = 1;
		while sim.tick().is_some() {
			emitted += 1;
			assert!(emitted < 1000, "never settled");
		}
		assert!(sim.is_settled());
		assert!((250..=350).contains(&emitted), "settled after {emitted} ticks");
		assert_eq!(sim.status(), SimulationStatus::Running);
	}

	#[test]
	fn linked_pair_settles_near_rest_length() {
		let ds = pair();
		let mut sim = simulation(&ds, &[20.0, 60.0]);
		run(&mut sim, 400);
		let rest = 20.0 + 60.0 + 50.0;
		let d = sim.nodes()[0].position().distance(sim.nodes()[1].position());
		assert!(d > rest * 0.75 && d < rest * 1.5, "distance {d} far from rest length {rest}");
	}

	#[test]
	fn overlapping_nodes_are_pushed_apart() {
		let ds = dataset(json!({
			"nodes": [{ "id": "a", "claps": 1 }, { "id": "b", "claps": 1 }, { "id": "c", "claps": 1 }],
			"links": []
		}));
		let mut sim = simulation(&ds, &[40.0, 40.0, 40.0]);
		run(&mut sim, 400);
		let nodes = sim.nodes();
		for i in 0..3 {
			for j in (i + 1)..3 {
				let d = nodes[i].position().distance(nodes[j].position());
				assert!(d >= 80.0, "nodes {i} and {j} still overlap at {d}");
			}
		}
	}

	#[test]
	fn single_node_is_centered() {
		let ds = dataset(json!({ "nodes": [{ "id": "solo", "claps": 3 }], "links": [] }));
		let mut sim = simulation(&ds, &[30.0]);
		sim.tick();
		assert!(sim.nodes()[0].position().distance(CENTER) < 1e-9);
	}

	#[test]
	fn pinned_node_ignores_forces() {
		let ds = pair();
		let mut sim = simulation(&ds, &[20.0, 60.0]);
		run(&mut sim, 5);
		let pin = Point::new(900.0, -50.0);
		assert!(sim.pin(0, pin));
		sim.reheat(0.3);

		let mut last_b = sim.nodes()[1].position();
		for _ in 0..10 {
			let event = sim.tick().unwrap();
			assert_eq!(event.positions[0], pin);
			assert_ne!(event.positions[1], last_b, "B should keep moving");
			last_b = event.positions[1];
		}

		assert!(sim.unpin(0));
		sim.tick();
		assert_ne!(sim.nodes()[0].position(), pin, "unpinned node did not move");
	}

	#[test]
	fn reheat_wakes_a_settled_layout() {
		let ds = pair();
		let mut sim = simulation(&ds, &[20.0, 60.0]);
		while sim.tick().is_some() {}
		assert!(sim.tick().is_none());

		sim.reheat(0.3);
		assert!(sim.tick().is_some());
		sim.cool();
		let mut extra = 0;
		while sim.tick().is_some() {
			extra += 1;
			assert!(extra < 1000);
		}
		assert!(sim.is_settled());
	}

	#[test]
	fn stop_is_final_and_idempotent() {
		let ds = pair();
		let mut sim = simulation(&ds, &[20.0, 60.0]);
		let seen = Rc::new(RefCell::new(0));
		let counter = seen.clone();
		sim.subscribe(move |_| *counter.borrow_mut() += 1);

		sim.tick();
		sim.pin(1, Point::new(1.0, 1.0));
		sim.stop();
		sim.stop();

		assert_eq!(sim.status(), SimulationStatus::Stopped);
		assert!(sim.tick().is_none());
		assert!(!sim.nodes()[1].is_pinned());
		assert!(!sim.pin(0, Point::default()));
		assert_eq!(*seen.borrow(), 1);
	}

	#[test]
	fn listeners_can_unsubscribe() {
		let ds = pair();
		let mut sim = simulation(&ds, &[20.0, 60.0]);
		let seen = Rc::new(RefCell::new(Vec::new()));
		let sink = seen.clone();
		let id = sim.subscribe(move |e| sink.borrow_mut().push(e.tick));

		run(&mut sim, 3);
		assert!(sim.unsubscribe(id));
		assert!(!sim.unsubscribe(id));
		run(&mut sim, 3);
		assert_eq!(*seen.borrow(), vec![1, 2, 3]);
	}

	#[test]
	fn find_prefers_topmost_node() {
		let ds = pair();
		let mut sim = simulation(&ds, &[20.0, 60.0]);
		sim.pin(0, Point::new(0.0, 0.0));
		sim.pin(1, Point::new(50.0, 0.0));
		assert_eq!(sim.find(Point::new(15.0, 0.0)), Some(1));
		assert_eq!(sim.find(Point::new(30.0, 0.0)), Some(1));
		assert_eq!(sim.find(Point::new(-15.0, 0.0)), Some(0));
		assert_eq!(sim.find(Point::new(500.0, 500.0)), None);
	}

	#[test]
	fn self_loops_and_empty_graphs_are_harmless() {
		let ds = dataset(json!({
			"nodes": [{ "id": "a", "claps": 1 }],
			"links": [{ "source": "a", "target": "a" }]
		}));
		let mut sim = simulation(&ds, &[20.0]);
		run(&mut sim, 10);
		assert!(sim.nodes()[0].x.is_finite());

		let empty = Dataset::new(&GraphData::default(), "claps").unwrap();
		let mut sim = simulation(&empty, &[]);
		let event = sim.tick().unwrap();
		assert!(event.positions.is_empty());
	}
}
