//! Top-level configuration for the keyword cloud.
//!
//! Every field has a default, and the whole struct deserializes from partial
//! JSON so a page can override only what it needs.

use log::warn;
use serde::Deserialize;

use super::scale::SceneScale;
use super::similarity::GraphConfig;
use super::simulation::SimulationConfig;

/// When layout ticks run relative to rendering.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutMode {
	/// Run every tick before publishing positions. Fixed latency, then a
	/// static result.
	#[default]
	Upfront,
	/// One tick per animation frame, streaming positions until converged.
	Continuous,
}

/// Everything the keyword cloud can be configured with.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct CloudConfig {
	/// Embedding endpoint URL. Defaults to `{origin}/api/embed`.
	pub embed_endpoint: Option<String>,
	/// Similarity graph construction.
	pub graph: GraphConfig,
	/// Force simulation physics.
	pub simulation: SimulationConfig,
	/// Whether ticks run before or during rendering.
	pub mode: LayoutMode,
	/// Sphere sizing, camera and pointer handling.
	pub scale: SceneScale,
	/// Keywords seen in fewer articles are left out of the cloud.
	pub min_keyword_count: u32,
}

impl Default for CloudConfig {
	fn default() -> Self {
		Self {
			embed_endpoint: None,
			graph: GraphConfig::default(),
			simulation: SimulationConfig::default(),
			mode: LayoutMode::default(),
			scale: SceneScale::default(),
			min_keyword_count: 3,
		}
	}
}

impl CloudConfig {
	/// Endpoint path used when `embed_endpoint` is unset.
	pub const DEFAULT_EMBED_PATH: &'static str = "/api/embed";

	/// Resolve the embedding endpoint against the page origin.
	pub fn endpoint_for(&self, origin: &str) -> String {
		match &self.embed_endpoint {
			Some(url) if url.starts_with("http://") || url.starts_with("https://") => url.clone(),
			Some(path) => format!("{}/{}", origin.trim_end_matches('/'), path.trim_start_matches('/')),
			None => format!("{}{}", origin.trim_end_matches('/'), Self::DEFAULT_EMBED_PATH),
		}
	}

	/// Parse a partial JSON override, then replace invalid values with defaults.
	pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
		serde_json::from_str::<Self>(json).map(Self::validated)
	}

	/// Replace values the layout or camera cannot work with by their defaults,
	/// logging each replacement.
	pub fn validated(mut self) -> Self {
		let graph = GraphConfig::default();
		let g = &mut self.graph;
		ensure("graph.similarity_threshold", &mut g.similarity_threshold, graph.similarity_threshold, |v| {
			(-1.0..=1.0).contains(&v)
		});
		ensure("graph.initial_extent", &mut g.initial_extent, graph.initial_extent, |v| v >= 0.0);

		let sim = SimulationConfig::default();
		let s = &mut self.simulation;
		ensure("simulation.alpha_min", &mut s.alpha_min, sim.alpha_min, |v| v > 0.0 && v < 1.0);
		ensure("simulation.velocity_decay", &mut s.velocity_decay, sim.velocity_decay, |v| {
			(0.0..=1.0).contains(&v)
		});
		ensure("simulation.link_distance", &mut s.link_distance, sim.link_distance, |v| v >= 0.0);
		ensure("simulation.link_min_distance", &mut s.link_min_distance, sim.link_min_distance, |v| {
			v >= 0.0
		});
		ensure("simulation.link_strength", &mut s.link_strength, sim.link_strength, |v| v >= 0.0);
		ensure("simulation.charge", &mut s.charge, sim.charge, |_| true);
		ensure("simulation.distance_min", &mut s.distance_min, sim.distance_min, |v| v >= 0.0);
		ensure("simulation.center_strength", &mut s.center_strength, sim.center_strength, |v| {
			(0.0..=1.0).contains(&v)
		});
		ensure("simulation.collide_strength", &mut s.collide_strength, sim.collide_strength, |v| {
			(0.0..=1.0).contains(&v)
		});
		ensure("simulation.collide_padding", &mut s.collide_padding, sim.collide_padding, |v| v >= 0.0);

		let scale = SceneScale::default();
		let c = &mut self.scale;
		ensure("scale.radius.factor", &mut c.radius.factor, scale.radius.factor, |v| v >= 0.0);
		ensure("scale.radius.min_radius", &mut c.radius.min_radius, scale.radius.min_radius, |v| v > 0.0);
		ensure("scale.camera_distance", &mut c.camera_distance, scale.camera_distance, |v| v > 0.0);
		ensure("scale.fov_degrees", &mut c.fov_degrees, scale.fov_degrees, |v| v > 0.0 && v < 180.0);
		ensure("scale.min_distance", &mut c.min_distance, scale.min_distance, |v| v > 0.0);
		ensure("scale.max_distance", &mut c.max_distance, scale.max_distance, |v| v > 0.0);
		if c.min_distance > c.max_distance {
			warn!(
				"keyword-cloud: invalid config scale.min_distance {} > scale.max_distance {}, using {}..{}",
				c.min_distance, c.max_distance, scale.min_distance, scale.max_distance
			);
			c.min_distance = scale.min_distance;
			c.max_distance = scale.max_distance;
		}
		ensure("scale.zoom_step", &mut c.zoom_step, scale.zoom_step, |v| v >= 1.0);
		ensure("scale.rotate_speed", &mut c.rotate_speed, scale.rotate_speed, |_| true);
		ensure("scale.hit_padding", &mut c.hit_padding, scale.hit_padding, |v| v >= 0.0);
		ensure("scale.label_size", &mut c.label_size, scale.label_size, |v| v > 0.0);
		ensure("scale.click_slop", &mut c.click_slop, scale.click_slop, |v| v >= 0.0);
		self
	}
}

/// Keep `value` if it is finite and `valid`, otherwise warn and use `default`.
fn ensure(field: &str, value: &mut f64, default: f64, valid: impl FnOnce(f64) -> bool) {
	if value.is_finite() && valid(*value) {
		return;
	}
	warn!("keyword-cloud: invalid config {} = {}, using {}", field, value, default);
	*value = default;
}
