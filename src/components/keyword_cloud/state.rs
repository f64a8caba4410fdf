//! Scene state: positioned spheres, camera, and pointer interaction.
//!
//! Holds the nodes the renderer draws, a trackball-style camera orbiting the
//! origin, and per-node hover intensities that ease in and out so the hover
//! color does not flicker at sphere edges.

use std::collections::HashMap;

use super::scale::SceneScale;
use super::theme::{Color, Theme};
use super::types::{KeywordSelection, PositionedNode, Vec3};

/// A sphere ready to draw.
#[derive(Clone, Debug)]
pub struct SceneNode {
	/// Keyword text.
	pub id: String,
	/// Article count shown in the tooltip.
	pub count: u32,
	/// World position.
	pub position: Vec3,
	/// World radius.
	pub radius: f64,
	/// Base fill color.
	pub color: Color,
}

/// Orbit camera looking at the origin.
#[derive(Clone, Debug)]
pub struct Camera {
	/// Rotation around the vertical axis, radians.
	pub yaw: f64,
	/// Rotation around the horizontal axis, radians, clamped short of the poles.
	pub pitch: f64,
	/// Distance from the origin in world units.
	pub distance: f64,
}

impl Camera {
	const PITCH_LIMIT: f64 = 1.5;

	/// Camera facing the origin from `distance` along +z.
	pub fn new(distance: f64) -> Self {
		Self {
			yaw: 0.0,
			pitch: 0.0,
			distance,
		}
	}

	/// Orbit by the given yaw and pitch deltas, in radians.
	pub fn rotate(&mut self, d_yaw: f64, d_pitch: f64) {
		self.yaw = (self.yaw + d_yaw) % std::f64::consts::TAU;
		self.pitch = (self.pitch + d_pitch).clamp(-Self::PITCH_LIMIT, Self::PITCH_LIMIT);
	}

	/// World point to camera space: x right, y up, z toward the viewer.
	pub fn to_view(&self, p: Vec3) -> Vec3 {
		let (sy, cy) = self.yaw.sin_cos();
		let (sp, cp) = self.pitch.sin_cos();
		let x = p.x * cy + p.z * sy;
		let z = -p.x * sy + p.z * cy;
		let y = p.y * cp - z * sp;
		let z = p.y * sp + z * cp;
		Vec3::new(x, y, z)
	}
}

/// A node projected to screen space.
#[derive(Clone, Copy, Debug)]
pub struct Projected {
	/// Index into [`CloudState::nodes`].
	pub index: usize,
	/// Screen x in pixels.
	pub sx: f64,
	/// Screen y in pixels.
	pub sy: f64,
	/// On-screen radius in pixels.
	pub radius: f64,
	/// Distance in front of the camera.
	pub depth: f64,
}

/// Tracks an in-progress rotate drag or a pending click.
#[derive(Clone, Debug, Default)]
pub struct DragState {
	/// A button is held.
	pub active: bool,
	/// Set once the pointer moved beyond the click slop.
	pub moved: bool,
	/// Press x.
	pub start_x: f64,
	/// Press y.
	pub start_y: f64,
	/// Pointer x at the previous event.
	pub last_x: f64,
	/// Pointer y at the previous event.
	pub last_y: f64,
}

/// Minimum time (seconds) a hover stays lit after the pointer leaves.
const MIN_HOLD_TIME: f64 = 0.12;

/// Smoothed per-node hover intensity.
#[derive(Clone, Debug, Default)]
pub struct HoverState {
	/// Node under the pointer, if any.
	pub hovered: Option<usize>,
	intensity: HashMap<usize, f64>,
	hold_timer: HashMap<usize, f64>,
}

impl HoverState {
	/// Change the hovered node. The previous one is held lit briefly.
	pub fn set_hover(&mut self, node: Option<usize>) {
		if self.hovered == node {
			return;
		}
		if let Some(previous) = self.hovered {
			self.hold_timer.insert(previous, MIN_HOLD_TIME);
		}
		self.hovered = node;
	}

	/// Ease intensities toward their targets: `v += (target - v) * (1 - e^(-speed * dt))`.
	pub fn tick(&mut self, dt: f64) {
		const FADE_IN_SPEED: f64 = 12.0;
		const FADE_OUT_SPEED: f64 = 6.0;

		let fade_in = 1.0 - (-FADE_IN_SPEED * dt).exp();
		let fade_out = (-FADE_OUT_SPEED * dt).exp();

		if let Some(idx) = self.hovered {
			let v = self.intensity.entry(idx).or_insert(0.0);
			*v += (1.0 - *v) * fade_in;
		}

		self.hold_timer.retain(|_, timer| {
			*timer -= dt;
			*timer > 0.0
		});

		let (hovered, holds) = (self.hovered, &self.hold_timer);
		self.intensity.retain(|idx, v| {
			if Some(*idx) == hovered {
				return true;
			}
			if !holds.contains_key(idx) {
				*v *= fade_out;
			}
			*v > 0.005
		});
	}

	/// Current intensity in `[0, 1]` for a node.
	pub fn intensity(&self, idx: usize) -> f64 {
		self.intensity.get(&idx).copied().unwrap_or(0.0)
	}

	/// Whether any hover animation is still in progress.
	pub fn is_animating(&self) -> bool {
		self.intensity
			.iter()
			.any(|(idx, v)| Some(*idx) != self.hovered || *v < 0.999)
	}

	/// Drop all hover state.
	pub fn clear(&mut self) {
		self.hovered = None;
		self.intensity.clear();
		self.hold_timer.clear();
	}
}

/// Everything the renderer needs for one frame.
pub struct CloudState {
	/// Spheres in layout order.
	pub nodes: Vec<SceneNode>,
	/// Orbit camera.
	pub camera: Camera,
	/// Pointer press state.
	pub drag: DragState,
	/// Hover easing.
	pub hover: HoverState,
	/// Canvas width in pixels.
	pub width: f64,
	/// Canvas height in pixels.
	pub height: f64,
	/// True while a layout computation is in flight.
	pub pending: bool,
	/// Whether anything changed since the last rendered frame.
	pub dirty: bool,
	index_by_id: HashMap<String, usize>,
}

impl CloudState {
	/// Empty scene for a canvas of the given size.
	pub fn new(width: f64, height: f64, scale: &SceneScale) -> Self {
		Self {
			nodes: Vec::new(),
			camera: Camera::new(scale.camera_distance),
			drag: DragState::default(),
			hover: HoverState::default(),
			width,
			height,
			pending: false,
			dirty: true,
			index_by_id: HashMap::new(),
		}
	}

	/// Replace the scene with a fresh layout.
	pub fn set_nodes(&mut self, nodes: &[PositionedNode], scale: &SceneScale, theme: &Theme) {
		self.nodes = nodes
			.iter()
			.map(|n| SceneNode {
				id: n.id.clone(),
				count: n.count,
				position: n.position(),
				radius: scale.radius.radius(n.count),
				color: theme.color_for(&n.id),
			})
			.collect();
		self.index_by_id = self
			.nodes
			.iter()
			.enumerate()
			.map(|(i, n)| (n.id.clone(), i))
			.collect();
		self.hover.clear();
		self.fit_camera(scale);
	}

	/// Move the camera back far enough that every sphere is in view.
	pub fn fit_camera(&mut self, scale: &SceneScale) {
		let extent = self
			.nodes
			.iter()
			.map(|n| n.position.length() + n.radius)
			.fold(0.0, f64::max);
		self.camera.distance = scale.fit_distance(extent);
		self.dirty = true;
	}

	/// Move existing spheres to new positions, keyed by id. Unknown ids are ignored.
	pub fn update_positions<'a>(&mut self, positions: impl IntoIterator<Item = (&'a str, Vec3)>) {
		for (id, position) in positions {
			if let Some(&i) = self.index_by_id.get(id) {
				self.nodes[i].position = position;
			}
		}
		self.dirty = true;
	}

	/// Remove every sphere.
	pub fn clear(&mut self) {
		self.nodes.clear();
		self.index_by_id.clear();
		self.hover.clear();
		self.dirty = true;
	}

	/// Track a new canvas size.
	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
		self.dirty = true;
	}

	/// Project every node in front of the camera, sorted far to near.
	pub fn project(&self, scale: &SceneScale) -> Vec<Projected> {
		let focal = scale.focal_length(self.height);
		let (cx, cy) = (self.width / 2.0, self.height / 2.0);
		let mut projected: Vec<Projected> = self
			.nodes
			.iter()
			.enumerate()
			.filter_map(|(index, node)| {
				let view = self.camera.to_view(node.position);
				let depth = self.camera.distance - view.z;
				if depth <= 1e-3 {
					return None;
				}
				let k = focal / depth;
				Some(Projected {
					index,
					sx: cx + view.x * k,
					sy: cy - view.y * k,
					radius: node.radius * k,
					depth,
				})
			})
			.collect();
		projected.sort_by(|a, b| b.depth.total_cmp(&a.depth));
		projected
	}

	/// The front-most node under a screen position.
	pub fn node_at_position(&self, sx: f64, sy: f64, scale: &SceneScale) -> Option<usize> {
		self.project(scale)
			.into_iter()
			.rev()
			.find(|p| {
				let (dx, dy) = (p.sx - sx, p.sy - sy);
				let reach = p.radius + scale.hit_padding;
				dx * dx + dy * dy <= reach * reach
			})
			.map(|p| p.index)
	}

	/// Change the hovered node and request a redraw if it differs.
	pub fn set_hover(&mut self, node: Option<usize>) {
		if self.hover.hovered != node {
			self.hover.set_hover(node);
			self.dirty = true;
		}
	}

	/// Selection payload for a node index.
	pub fn selection(&self, idx: usize) -> Option<KeywordSelection> {
		self.nodes.get(idx).map(|n| KeywordSelection {
			name: n.id.clone(),
			count: n.count,
		})
	}

	/// Start a press at a screen position.
	pub fn begin_drag(&mut self, x: f64, y: f64) {
		self.drag = DragState {
			active: true,
			moved: false,
			start_x: x,
			start_y: y,
			last_x: x,
			last_y: y,
		};
	}

	/// Rotate the camera by the pointer motion since the last event.
	pub fn drag_to(&mut self, x: f64, y: f64, scale: &SceneScale) {
		if !self.drag.active {
			return;
		}
		let (tx, ty) = (x - self.drag.start_x, y - self.drag.start_y);
		if tx * tx + ty * ty > scale.click_slop * scale.click_slop {
			self.drag.moved = true;
		}
		if self.drag.moved {
			self.camera.rotate(
				(x - self.drag.last_x) * scale.rotate_speed,
				(y - self.drag.last_y) * scale.rotate_speed,
			);
			self.dirty = true;
		}
		self.drag.last_x = x;
		self.drag.last_y = y;
	}

	/// Finish a press. Returns the clicked node when the pointer did not drag.
	pub fn end_drag(&mut self, x: f64, y: f64, scale: &SceneScale) -> Option<KeywordSelection> {
		let was_click = self.drag.active && !self.drag.moved;
		self.drag = DragState::default();
		if !was_click {
			return None;
		}
		self.node_at_position(x, y, scale)
			.and_then(|idx| self.selection(idx))
	}

	/// Apply one wheel step.
	pub fn zoom(&mut self, zoom_in: bool, scale: &SceneScale) {
		self.camera.distance = scale.zoom(self.camera.distance, zoom_in);
		self.dirty = true;
	}

	/// Advance hover easing by `dt` seconds.
	pub fn tick(&mut self, dt: f64) {
		self.hover.tick(dt);
		if self.hover.is_animating() {
			self.dirty = true;
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn positioned(id: &str, count: u32, x: f64, y: f64, z: f64) -> PositionedNode {
		PositionedNode {
			id: id.to_string(),
			count,
			x,
			y,
			z,
		}
	}

	fn scene(nodes: &[PositionedNode]) -> (CloudState, SceneScale) {
		let scale = SceneScale::default();
		let mut state = CloudState::new(800.0, 600.0, &scale);
		state.set_nodes(nodes, &scale, &Theme::default());
		(state, scale)
	}

	#[test]
	fn origin_projects_to_canvas_center() {
		let (state, scale) = scene(&[positioned("a", 4, 0.0, 0.0, 0.0)]);
		let p = state.project(&scale)[0];
		assert!((p.sx - 400.0).abs() < 1e-9);
		assert!((p.sy - 300.0).abs() < 1e-9);
		assert!((p.depth - 250.0).abs() < 1e-9);
	}

	#[test]
	fn projection_sorted_far_to_near() {
		let (state, scale) = scene(&[
			positioned("near", 4, 0.0, 0.0, 100.0),
			positioned("far", 4, 0.0, 0.0, -100.0),
			positioned("mid", 4, 0.0, 0.0, 0.0),
		]);
		let order: Vec<_> = state
			.project(&scale)
			.iter()
			.map(|p| state.nodes[p.index].id.as_str())
			.collect();
		assert_eq!(order, ["far", "mid", "near"]);
	}

	#[test]
	fn nodes_behind_camera_are_culled() {
		let (mut state, scale) = scene(&[positioned("behind", 4, 0.0, 0.0, 400.0)]);
		state.camera.distance = scale.camera_distance;
		assert!(state.project(&scale).is_empty());
	}

	#[test]
	fn camera_backs_off_to_show_wide_layouts() {
		let (state, scale) = scene(&[
			positioned("front", 10, 0.0, 0.0, 600.0),
			positioned("top", 10, 0.0, 600.0, 0.0),
			positioned("side", 10, -450.0, -300.0, -200.0),
			positioned("center", 10, 0.0, 0.0, 0.0),
		]);
		assert!(state.camera.distance > scale.camera_distance);
		let projected = state.project(&scale);
		assert_eq!(projected.len(), 4);
		for p in &projected {
			assert!((0.0..=state.width).contains(&p.sx), "{} off screen", state.nodes[p.index].id);
			assert!((0.0..=state.height).contains(&p.sy), "{} off screen", state.nodes[p.index].id);
		}
	}

	#[test]
	fn compact_layouts_keep_default_distance() {
		let (state, scale) = scene(&[
			positioned("a", 10, 20.0, 0.0, 0.0),
			positioned("b", 10, -20.0, 5.0, 0.0),
		]);
		assert_eq!(state.camera.distance, scale.camera_distance);
	}

	#[test]
	fn hit_test_prefers_front_node() {
		let (state, scale) = scene(&[
			positioned("back", 64, 0.0, 0.0, -50.0),
			positioned("front", 64, 0.0, 0.0, 50.0),
		]);
		let hit = state.node_at_position(400.0, 300.0, &scale).unwrap();
		assert_eq!(state.nodes[hit].id, "front");
		assert!(state.node_at_position(10.0, 10.0, &scale).is_none());
	}

	#[test]
	fn click_without_drag_selects() {
		let (mut state, scale) = scene(&[positioned("bone", 16, 0.0, 0.0, 0.0)]);
		state.begin_drag(400.0, 300.0);
		state.drag_to(401.0, 300.0, &scale);
		let picked = state.end_drag(401.0, 300.0, &scale);
		assert_eq!(
			picked,
			Some(KeywordSelection {
				name: "bone".into(),
				count: 16
			})
		);
	}

	#[test]
	fn drag_rotates_instead_of_clicking() {
		let (mut state, scale) = scene(&[positioned("bone", 16, 0.0, 0.0, 0.0)]);
		state.begin_drag(400.0, 300.0);
		state.drag_to(460.0, 320.0, &scale);
		assert!(state.camera.yaw != 0.0);
		assert!(state.end_drag(400.0, 300.0, &scale).is_none());
	}

	#[test]
	fn camera_rotation_preserves_distance() {
		let mut camera = Camera::new(250.0);
		camera.rotate(0.7, -0.4);
		let p = Vec3::new(12.0, -30.0, 5.0);
		assert!((camera.to_view(p).length() - p.length()).abs() < 1e-9);
		camera.rotate(0.0, 10.0);
		assert_eq!(camera.pitch, Camera::PITCH_LIMIT);
	}

	#[test]
	fn hover_fades_in_and_out() {
		let mut hover = HoverState::default();
		hover.set_hover(Some(2));
		for _ in 0..30 {
			hover.tick(0.016);
		}
		assert!(hover.intensity(2) > 0.9);

		hover.set_hover(None);
		hover.tick(0.016);
		// Held briefly before fading.
		assert!(hover.intensity(2) > 0.9);
		for _ in 0..120 {
			hover.tick(0.016);
		}
		assert_eq!(hover.intensity(2), 0.0);
		assert!(!hover.is_animating());
	}

	#[test]
	fn update_positions_by_id() {
		let (mut state, _) = scene(&[positioned("a", 3, 0.0, 0.0, 0.0)]);
		state.update_positions([("a", Vec3::new(1.0, 2.0, 3.0)), ("missing", Vec3::ZERO)]);
		assert_eq!(state.nodes[0].position, Vec3::new(1.0, 2.0, 3.0));
	}
}
