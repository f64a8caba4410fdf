//! Visual theming for the keyword cloud.
//!
//! Node colors come from [`Theme::color_for`], a pure function of the keyword
//! so the same keyword always gets the same color across reloads.

/// RGBA color representation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
	/// Red channel.
	pub r: u8,
	/// Green channel.
	pub g: u8,
	/// Blue channel.
	pub b: u8,
	/// Opacity in `[0, 1]`.
	pub a: f64,
}

impl Color {
	/// Opaque color from channels.
	pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
		Self { r, g, b, a: 1.0 }
	}

	/// Color with explicit opacity.
	pub const fn rgba(r: u8, g: u8, b: u8, a: f64) -> Self {
		Self { r, g, b, a }
	}

	/// Parse `#RRGGBB`. Anything else yields `None`.
	pub fn from_hex(hex: &str) -> Option<Self> {
		let digits = hex.strip_prefix('#')?;
		if digits.len() != 6 {
			return None;
		}
		let channel = |i: usize| u8::from_str_radix(digits.get(i..i + 2)?, 16).ok();
		Some(Self::rgb(channel(0)?, channel(2)?, channel(4)?))
	}

	/// Same color with a different opacity.
	pub fn with_alpha(self, a: f64) -> Self {
		Self { a, ..self }
	}

	/// Move toward white (0.0 = unchanged, 1.0 = white)
	pub fn lighten(self, factor: f64) -> Self {
		self.lerp(Color::rgba(255, 255, 255, self.a), factor)
	}

	/// Move toward black (0.0 = unchanged, 1.0 = black)
	pub fn darken(self, factor: f64) -> Self {
		self.lerp(Color::rgba(0, 0, 0, self.a), factor)
	}

	/// Linear interpolation between two colors
	pub fn lerp(self, other: Color, t: f64) -> Self {
		let t = t.clamp(0.0, 1.0);
		let mix = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
		Self {
			r: mix(self.r, other.r),
			g: mix(self.g, other.g),
			b: mix(self.b, other.b),
			a: self.a + (other.a - self.a) * t,
		}
	}

	/// CSS color string: hex when opaque, `rgba()` otherwise.
	pub fn to_css(self) -> String {
		if (self.a - 1.0).abs() < 0.001 {
			format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
		} else {
			format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
		}
	}
}

/// Colors assigned to keywords.
#[derive(Clone, Debug)]
pub struct KeywordPalette {
	/// Colors cycled by index.
	pub colors: Vec<Color>,
}

impl KeywordPalette {
	/// Soft pastels on a light background (default)
	pub fn pastel() -> Self {
		Self {
			colors: vec![
				Color::rgb(0xae, 0xc6, 0xcf), // Pastel blue
				Color::rgb(0xf6, 0xc1, 0xc1), // Pastel pink
				Color::rgb(0xd8, 0xbf, 0xd8), // Thistle
				Color::rgb(0xe8, 0xf8, 0xf5), // Mint cream
			],
		}
	}

	/// Muted slate blues and teals for dark backgrounds
	pub fn slate() -> Self {
		Self {
			colors: vec![
				Color::rgb(94, 129, 172),
				Color::rgb(129, 161, 193),
				Color::rgb(100, 148, 160),
				Color::rgb(136, 160, 175),
				Color::rgb(108, 142, 173),
				Color::rgb(119, 158, 165),
			],
		}
	}

	/// Color at `index`, wrapping around. Gray when the palette is empty.
	pub fn get(&self, index: usize) -> Color {
		if self.colors.is_empty() {
			return Color::rgb(128, 128, 128);
		}
		self.colors[index % self.colors.len()]
	}
}

/// Stable 32-bit string hash (`h = c + 31 * h` over UTF-16 units, wrapping).
pub fn stable_hash(id: &str) -> i32 {
	id.encode_utf16().fold(0i32, |hash, unit| {
		(unit as i32).wrapping_add((hash << 5).wrapping_sub(hash))
	})
}

/// Sphere shading.
#[derive(Clone, Debug)]
pub struct SphereStyle {
	/// Specular highlight offset as a fraction of the radius, toward the light.
	pub light_offset: (f64, f64),
	/// How far the lit side moves toward white.
	pub highlight: f64,
	/// How far the rim moves toward black.
	pub shadow: f64,
	/// Spheres further than the camera distance fade toward this alpha.
	pub min_depth_alpha: f64,
}

/// Hover tooltip style.
#[derive(Clone, Debug)]
pub struct TooltipStyle {
	/// Box fill.
	pub background: Color,
	/// Label color.
	pub text: Color,
	/// Horizontal padding in pixels.
	pub padding_x: f64,
	/// Vertical padding in pixels.
	pub padding_y: f64,
	/// Box corner radius in pixels.
	pub corner_radius: f64,
}

/// Complete visual theme.
#[derive(Clone, Debug)]
pub struct Theme {
	/// Theme identifier.
	pub name: &'static str,
	/// Canvas fill.
	pub background: Color,
	/// Node colors.
	pub palette: KeywordPalette,
	/// Color blended in as a sphere becomes hovered.
	pub hover_color: Color,
	/// Sphere shading.
	pub sphere: SphereStyle,
	/// Hover tooltip.
	pub tooltip: TooltipStyle,
	/// Text shown while a layout is being computed.
	pub status_color: Color,
}

impl Theme {
	/// Light pastel theme (default)
	pub fn light() -> Self {
		Self {
			name: "light",
			background: Color::rgb(0xf5, 0xf5, 0xf5),
			palette: KeywordPalette::pastel(),
			hover_color: Color::rgb(255, 105, 180),
			sphere: SphereStyle {
				light_offset: (0.35, 0.35),
				highlight: 0.45,
				shadow: 0.25,
				min_depth_alpha: 0.55,
			},
			tooltip: TooltipStyle {
				background: Color::rgba(40, 40, 40, 0.9),
				text: Color::rgb(255, 255, 255),
				padding_x: 10.0,
				padding_y: 5.0,
				corner_radius: 7.0,
			},
			status_color: Color::rgba(60, 60, 60, 0.7),
		}
	}

	/// Dark slate theme
	pub fn midnight() -> Self {
		Self {
			name: "midnight",
			background: Color::rgb(22, 27, 34),
			palette: KeywordPalette::slate(),
			hover_color: Color::rgb(255, 105, 180),
			sphere: SphereStyle {
				light_offset: (0.3, 0.3),
				highlight: 0.4,
				shadow: 0.2,
				min_depth_alpha: 0.45,
			},
			tooltip: TooltipStyle {
				background: Color::rgba(230, 230, 230, 0.92),
				text: Color::rgb(20, 20, 20),
				padding_x: 10.0,
				padding_y: 5.0,
				corner_radius: 7.0,
			},
			status_color: Color::rgba(200, 210, 220, 0.7),
		}
	}

	/// Deterministic color for a keyword.
	pub fn color_for(&self, id: &str) -> Color {
		self.palette.get(stable_hash(id).unsigned_abs() as usize)
	}
}

impl Default for Theme {
	fn default() -> Self {
		Self::light()
	}
}
