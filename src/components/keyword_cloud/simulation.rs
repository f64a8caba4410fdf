//! Force-directed layout engine.
//!
//! A [`Simulation`] owns the nodes of one keyword graph and relaxes them in 3D
//! under four forces, summed into each node's velocity every tick:
//!
//! - **link**: pulls linked nodes toward a target separation that shrinks as
//!   similarity grows, with strength proportional to similarity
//! - **repulsion**: every node pushes every other node, scaled by the pushing
//!   node's keyword count (exact O(N²) per tick)
//! - **collision**: separates nodes whose rendered spheres overlap
//! - **centering**: translates the cloud so its centroid sits at the origin
//!
//! Forces other than collision are scaled by `alpha`, which decays
//! geometrically so that it crosses `alpha_min` after `ticks` steps. Velocity
//! damping is set high enough that an isolated link settles without overshoot.
//! With repulsion on, a linked pair settles a little beyond its target
//! distance, where the link pull and the two charges balance.

use log::debug;
use serde::Deserialize;

use super::scale::RadiusScale;
use super::types::{KeywordGraph, KeywordNode, PositionedNode, Vec3};

/// Physics parameters.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
	/// Tick budget. Alpha decays to `alpha_min` over exactly this many ticks.
	pub ticks: usize,
	/// Alpha below which the simulation counts as converged.
	pub alpha_min: f64,
	/// Fraction of velocity removed each tick.
	pub velocity_decay: f64,
	/// Separation for a link of weight 0; a link of weight `w` targets
	/// `link_distance * (1 - w)`.
	pub link_distance: f64,
	/// Floor on the target separation.
	pub link_min_distance: f64,
	/// Link strength for weight 1.0.
	pub link_strength: f64,
	/// Repulsion per unit of keyword count.
	pub charge: f64,
	/// Distances below this are softened in the repulsion term.
	pub distance_min: f64,
	/// 1.0 recenters fully every tick, 0.0 disables centering.
	pub center_strength: f64,
	/// Whether overlapping spheres are pushed apart.
	pub collide: bool,
	/// Fraction of an overlap resolved per tick.
	pub collide_strength: f64,
	/// World units added to each sphere radius for collision.
	pub collide_padding: f64,
}

impl Default for SimulationConfig {
	fn default() -> Self {
		Self {
			ticks: 300,
			alpha_min: 0.001,
			velocity_decay: 0.6,
			link_distance: 30.0,
			link_min_distance: 0.0,
			link_strength: 1.0,
			charge: 1.0,
			distance_min: 1.0,
			center_strength: 1.0,
			collide: true,
			collide_strength: 0.7,
			collide_padding: 0.5,
		}
	}
}

impl SimulationConfig {
	/// Target separation for a link of the given similarity weight.
	pub fn target_distance(&self, weight: f64) -> f64 {
		(self.link_distance * (1.0 - weight)).max(self.link_min_distance)
	}

	/// Pull strength for a link of the given similarity weight.
	pub fn link_strength_for(&self, weight: f64) -> f64 {
		self.link_strength * weight
	}

	/// Repulsion exerted by a node, as a negative charge. Count 0 acts like 1.
	pub fn node_charge(&self, count: u32) -> f64 {
		-self.charge.abs() * count.max(1) as f64
	}

	fn alpha_decay(&self) -> f64 {
		if self.ticks == 0 || !(self.alpha_min > 0.0 && self.alpha_min < 1.0) {
			return 1.0;
		}
		1.0 - self.alpha_min.powf(1.0 / self.ticks as f64)
	}
}

/// Lifecycle of a [`Simulation`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SimulationState {
	/// Created, no tick has run yet.
	Initialized,
	/// At least one tick has run and more remain.
	Running,
	/// Alpha dropped below `alpha_min` or the tick budget ran out.
	Converged,
	/// Halted by [`Simulation::stop`] before converging.
	Stopped,
}

#[derive(Clone, Debug)]
struct Link {
	source: usize,
	target: usize,
	distance: f64,
	strength: f64,
	/// Share of the correction applied to the target.
	bias: f64,
}

/// An explicit, caller-owned force simulation over one keyword graph.
pub struct Simulation {
	nodes: Vec<KeywordNode>,
	links: Vec<Link>,
	radii: Vec<f64>,
	charges: Vec<f64>,
	config: SimulationConfig,
	alpha: f64,
	alpha_decay: f64,
	ticks_run: usize,
	state: SimulationState,
}

impl Simulation {
	/// Set up a simulation over `graph`. Collision radii come from `radius`.
	pub fn new(graph: KeywordGraph, config: SimulationConfig, radius: &RadiusScale) -> Self {
		let degrees = graph.degrees();
		let links = graph
			.edges
			.iter()
			.filter(|e| e.source != e.target)
			.map(|e| {
				let (ds, dt) = (degrees[e.source] as f64, degrees[e.target] as f64);
				Link {
					source: e.source,
					target: e.target,
					distance: config.target_distance(e.weight),
					strength: config.link_strength_for(e.weight),
					bias: ds / (ds + dt),
				}
			})
			.collect();

		let radii = graph
			.nodes
			.iter()
			.map(|n| radius.radius(n.count) + config.collide_padding.max(0.0))
			.collect();
		let charges = graph.nodes.iter().map(|n| config.node_charge(n.count)).collect();

		let state = if graph.nodes.is_empty() || config.ticks == 0 {
			SimulationState::Converged
		} else {
			SimulationState::Initialized
		};

		Self {
			nodes: graph.nodes,
			links,
			radii,
			charges,
			alpha_decay: config.alpha_decay(),
			config,
			alpha: 1.0,
			ticks_run: 0,
			state,
		}
	}

	/// Current lifecycle state.
	pub fn state(&self) -> SimulationState {
		self.state
	}

	/// Whether alpha or the tick budget ran out.
	pub fn is_converged(&self) -> bool {
		self.state == SimulationState::Converged
	}

	/// True once no further ticks will run, either converged or stopped.
	pub fn is_finished(&self) -> bool {
		matches!(
			self.state,
			SimulationState::Converged | SimulationState::Stopped
		)
	}

	/// Current cooling factor.
	pub fn alpha(&self) -> f64 {
		self.alpha
	}

	/// Ticks executed so far.
	pub fn ticks_run(&self) -> usize {
		self.ticks_run
	}

	/// Nodes with their current positions and velocities.
	pub fn nodes(&self) -> &[KeywordNode] {
		&self.nodes
	}

	/// Collision radius (sphere radius plus padding) of each node.
	pub fn radii(&self) -> &[f64] {
		&self.radii
	}

	/// Current positions in renderer form.
	pub fn positioned(&self) -> Vec<PositionedNode> {
		self.nodes.iter().map(PositionedNode::from).collect()
	}

	/// Halt the simulation. Later calls to [`step`](Self::step) do nothing.
	pub fn stop(&mut self) {
		if self.state != SimulationState::Converged {
			self.state = SimulationState::Stopped;
		}
	}

	/// Advance one tick and return the updated nodes.
	pub fn step(&mut self) -> &[KeywordNode] {
		if self.is_finished() {
			return &self.nodes;
		}
		self.state = SimulationState::Running;

		self.alpha += (0.0 - self.alpha) * self.alpha_decay;

		self.apply_links();
		self.apply_repulsion();
		if self.config.collide {
			self.apply_collision();
		}

		let keep = 1.0 - self.config.velocity_decay.clamp(0.0, 1.0);
		for node in &mut self.nodes {
			node.velocity *= keep;
			node.position += node.velocity;
		}
		self.apply_centering();

		self.ticks_run += 1;
		if self.alpha < self.config.alpha_min || self.ticks_run >= self.config.ticks {
			self.state = SimulationState::Converged;
		}
		&self.nodes
	}

	/// Step until converged or stopped. Returns the number of ticks executed.
	pub fn run(&mut self) -> usize {
		let before = self.ticks_run;
		while !self.is_finished() {
			self.step();
		}
		let ran = self.ticks_run - before;
		debug!(
			"keyword-cloud: simulation of {} nodes ran {} ticks (alpha {:.4})",
			self.nodes.len(),
			ran,
			self.alpha
		);
		ran
	}

	fn apply_links(&mut self) {
		let alpha = self.alpha;
		for link in &self.links {
			let (s, t) = (&self.nodes[link.source], &self.nodes[link.target]);
			let mut delta = (t.position + t.velocity) - (s.position + s.velocity);
			let mut len = delta.length();
			if len == 0.0 {
				delta = jiggle(link.source, link.target);
				len = delta.length();
			}
			delta *= (len - link.distance) / len * alpha * link.strength;

			self.nodes[link.target].velocity -= delta * link.bias;
			self.nodes[link.source].velocity += delta * (1.0 - link.bias);
		}
	}

	fn apply_repulsion(&mut self) {
		let alpha = self.alpha;
		let min2 = self.config.distance_min * self.config.distance_min;
		let n = self.nodes.len();
		let mut impulses = vec![Vec3::ZERO; n];

		for i in 0..n {
			for j in 0..n {
				if i == j {
					continue;
				}
				let mut delta = self.nodes[j].position - self.nodes[i].position;
				let mut l2 = delta.length_squared();
				if l2 == 0.0 {
					delta = jiggle(j, i);
					l2 = delta.length_squared();
				}
				if l2 < min2 {
					l2 = (min2 * l2).sqrt();
				}
				impulses[i] += delta * (self.charges[j] * alpha / l2);
			}
		}

		for (node, impulse) in self.nodes.iter_mut().zip(impulses) {
			node.velocity += impulse;
		}
	}

	fn apply_collision(&mut self) {
		let strength = self.config.collide_strength;
		let n = self.nodes.len();
		for i in 0..n {
			for j in (i + 1)..n {
				let (ri, rj) = (self.radii[i], self.radii[j]);
				let reach = ri + rj;
				let (a, b) = (&self.nodes[i], &self.nodes[j]);
				let mut delta = (a.position + a.velocity) - (b.position + b.velocity);
				let l2 = delta.length_squared();
				if l2 >= reach * reach {
					continue;
				}
				let mut len = l2.sqrt();
				if len == 0.0 {
					delta = jiggle(i, j);
					len = delta.length();
				}
				delta *= (reach - len) / len * strength;

				let share = rj * rj / (ri * ri + rj * rj);
				self.nodes[i].velocity += delta * share;
				self.nodes[j].velocity -= delta * (1.0 - share);
			}
		}
	}

	fn apply_centering(&mut self) {
		if self.nodes.is_empty() || self.config.center_strength == 0.0 {
			return;
		}
		let mut centroid = Vec3::ZERO;
		for node in &self.nodes {
			centroid += node.position;
		}
		let shift = centroid * (self.config.center_strength / self.nodes.len() as f64);
		for node in &mut self.nodes {
			node.position -= shift;
		}
	}
}

/// Tiny deterministic offset used when two nodes coincide exactly.
fn jiggle(from: usize, to: usize) -> Vec3 {
	let sign = if from < to { 1.0 } else { -1.0 };
	Vec3::new(sign * 1e-6, sign * 0.5e-6, sign * 0.25e-6)
}
