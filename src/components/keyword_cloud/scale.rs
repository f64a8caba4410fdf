//! Size and camera scaling for the keyword cloud.
//!
//! Sphere radii are a monotonic function of keyword count, shared by the
//! collision force and the renderer so that what the simulation keeps apart is
//! exactly what is drawn. Camera parameters map world units to screen pixels.
//!
//! # Coordinate Spaces
//!
//! - **World-space**: the layout's 3D coordinates, centered on the origin.
//! - **Screen-space**: canvas pixels. A sphere's on-screen radius is its
//!   world radius times `focal / depth`.

use serde::Deserialize;

/// Maps a keyword count to a sphere radius in world units.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct RadiusScale {
	/// World units per doubling of the count.
	pub factor: f64,
	/// Floor applied so rare keywords stay visible and collidable.
	pub min_radius: f64,
}

impl Default for RadiusScale {
	fn default() -> Self {
		Self {
			factor: 0.7,
			min_radius: 0.5,
		}
	}
}

impl RadiusScale {
	/// `max(min_radius, log2(count) * factor)`, with count 0 treated as 1.
	pub fn radius(&self, count: u32) -> f64 {
		let count = count.max(1) as f64;
		(count.log2() * self.factor).max(self.min_radius)
	}
}

/// Camera and interaction scaling.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct SceneScale {
	/// Count to world radius.
	pub radius: RadiusScale,
	/// Initial camera distance from the origin in world units.
	pub camera_distance: f64,
	/// Vertical field of view in degrees.
	pub fov_degrees: f64,
	/// Closest the camera may zoom in.
	pub min_distance: f64,
	/// Farthest the camera may zoom out.
	pub max_distance: f64,
	/// Multiplier applied per wheel notch.
	pub zoom_step: f64,
	/// Radians of rotation per dragged pixel.
	pub rotate_speed: f64,
	/// Extra screen pixels around a sphere that still count as a hit.
	pub hit_padding: f64,
	/// Tooltip font size in screen pixels.
	pub label_size: f64,
	/// Pointer travel (pixels) beyond which a press becomes a drag, not a click.
	pub click_slop: f64,
}

impl Default for SceneScale {
	fn default() -> Self {
		Self {
			radius: RadiusScale::default(),
			camera_distance: 250.0,
			fov_degrees: 50.0,
			min_distance: 20.0,
			max_distance: 2000.0,
			zoom_step: 1.1,
			rotate_speed: 0.005,
			hit_padding: 2.0,
			label_size: 14.0,
			click_slop: 4.0,
		}
	}
}

impl SceneScale {
	/// Focal length in pixels for a canvas of the given height.
	pub fn focal_length(&self, height: f64) -> f64 {
		let half_fov = (self.fov_degrees.clamp(1.0, 179.0) / 2.0).to_radians();
		(height / 2.0) / half_fov.tan()
	}

	/// Apply one wheel step to a camera distance. `zoom_in` moves closer.
	pub fn zoom(&self, distance: f64, zoom_in: bool) -> f64 {
		let next = if zoom_in {
			distance / self.zoom_step
		} else {
			distance * self.zoom_step
		};
		next.max(self.min_distance).min(self.max_distance)
	}

	/// Camera distance at which a cloud reaching `extent` world units from the
	/// origin fits the vertical field of view. Never closer than
	/// `camera_distance`, never beyond `max_distance`.
	pub fn fit_distance(&self, extent: f64) -> f64 {
		let half_fov = (self.fov_degrees.clamp(1.0, 179.0) / 2.0).to_radians();
		let needed = if extent.is_finite() { extent.max(0.0) / half_fov.sin() } else { 0.0 };
		needed
			.max(self.camera_distance)
			.max(self.min_distance)
			.min(self.max_distance)
	}

	/// CSS font shorthand for tooltip labels.
	pub fn label_font(&self) -> String {
		format!("{}px sans-serif", self.label_size)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn radius_is_monotonic_in_count() {
		let scale = RadiusScale::default();
		let mut last = 0.0;
		for count in 0..200 {
			let r = scale.radius(count);
			assert!(r >= last, "radius shrank at count {count}");
			last = r;
		}
	}

	#[test]
	fn zero_count_matches_count_one() {
		let scale = RadiusScale::default();
		assert_eq!(scale.radius(0), scale.radius(1));
		assert_eq!(scale.radius(1), scale.min_radius);
	}

	#[test]
	fn radius_follows_log_scale() {
		let scale = RadiusScale::default();
		assert!((scale.radius(8) - 2.1).abs() < 1e-9);
	}

	#[test]
	fn zoom_is_clamped() {
		let scale = SceneScale::default();
		let mut d = scale.camera_distance;
		for _ in 0..200 {
			d = scale.zoom(d, true);
		}
		assert_eq!(d, scale.min_distance);
		for _ in 0..200 {
			d = scale.zoom(d, false);
		}
		assert_eq!(d, scale.max_distance);
	}

	#[test]
	fn fit_distance_backs_off_for_wide_clouds() {
		let scale = SceneScale::default();
		assert_eq!(scale.fit_distance(10.0), scale.camera_distance);
		let d = scale.fit_distance(600.0);
		assert!(d > scale.camera_distance);
		assert!((600.0 / d).asin() <= 25f64.to_radians() + 1e-9);
		assert_eq!(scale.fit_distance(1e9), scale.max_distance);
		assert_eq!(scale.fit_distance(f64::NAN), scale.camera_distance);
	}

	#[test]
	fn inverted_zoom_bounds_do_not_panic() {
		let scale = SceneScale {
			min_distance: 500.0,
			max_distance: 100.0,
			..SceneScale::default()
		};
		let d = scale.zoom(250.0, true);
		assert!(d.is_finite());
	}

	#[test]
	fn focal_length_matches_fov() {
		let scale = SceneScale {
			fov_degrees: 90.0,
			..SceneScale::default()
		};
		assert!((scale.focal_length(600.0) - 300.0).abs() < 1e-6);
	}
}
