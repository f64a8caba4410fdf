//! Canvas rendering for the keyword cloud.
//!
//! Draws in screen space with a painter's algorithm:
//! 1. Background
//! 2. Spheres, far to near, shaded with a radial gradient and faded by depth
//! 3. Tooltip for the hovered sphere, or a status line while a layout is pending

use std::f64::consts::PI;

use web_sys::CanvasRenderingContext2d;

use super::scale::SceneScale;
use super::state::{CloudState, Projected, SceneNode};
use super::theme::Theme;

/// Ease-in-out curve so hover transitions start and end gently.
fn smooth_step(t: f64) -> f64 {
	let t = t.clamp(0.0, 1.0);
	t * t * (3.0 - 2.0 * t)
}

/// Renders the complete scene to the canvas.
pub fn render(state: &CloudState, ctx: &CanvasRenderingContext2d, scale: &SceneScale, theme: &Theme) {
	ctx.set_fill_style_str(&theme.background.to_css());
	ctx.fill_rect(0.0, 0.0, state.width, state.height);

	let projected = state.project(scale);
	for p in &projected {
		draw_sphere(state, ctx, theme, p);
	}

	if let Some(p) = state
		.hover
		.hovered
		.and_then(|idx| projected.iter().find(|p| p.index == idx))
	{
		draw_tooltip(ctx, scale, theme, &state.nodes[p.index], p);
	} else if state.pending {
		draw_status(state, ctx, scale, theme, "Arranging keywords…");
	}
}

fn draw_sphere(state: &CloudState, ctx: &CanvasRenderingContext2d, theme: &Theme, p: &Projected) {
	if p.radius < 0.25 {
		return;
	}
	let node = &state.nodes[p.index];
	let hover_t = smooth_step(state.hover.intensity(p.index));
	let base = node.color.lerp(theme.hover_color, hover_t);

	// Spheres behind the origin fade toward the background.
	let behind = ((p.depth - state.camera.distance) / state.camera.distance).clamp(0.0, 1.0);
	let alpha = 1.0 - (1.0 - theme.sphere.min_depth_alpha) * behind;
	ctx.set_global_alpha(alpha);

	let (ox, oy) = theme.sphere.light_offset;
	let gradient = ctx.create_radial_gradient(
		p.sx - p.radius * ox,
		p.sy - p.radius * oy,
		0.0,
		p.sx,
		p.sy,
		p.radius,
	);
	ctx.begin_path();
	let _ = ctx.arc(p.sx, p.sy, p.radius, 0.0, 2.0 * PI);
	match gradient {
		Ok(gradient) => {
			let _ = gradient.add_color_stop(0.0, &base.lighten(theme.sphere.highlight).to_css());
			let _ = gradient.add_color_stop(0.65, &base.to_css());
			let _ = gradient.add_color_stop(1.0, &base.darken(theme.sphere.shadow).to_css());
			#[allow(deprecated)]
			ctx.set_fill_style(&gradient);
		}
		Err(_) => ctx.set_fill_style_str(&base.to_css()),
	}
	ctx.fill();
	ctx.set_global_alpha(1.0);
}

fn draw_tooltip(
	ctx: &CanvasRenderingContext2d,
	scale: &SceneScale,
	theme: &Theme,
	node: &SceneNode,
	p: &Projected,
) {
	let style = &theme.tooltip;
	let text = format!("{} ({})", node.id, node.count);
	ctx.set_font(&scale.label_font());

	let text_width = ctx
		.measure_text(&text)
		.map(|m| m.width())
		.unwrap_or(text.chars().count() as f64 * scale.label_size * 0.6);
	let (w, h) = (
		text_width + style.padding_x * 2.0,
		scale.label_size + style.padding_y * 2.0,
	);
	let x = p.sx - w / 2.0;
	let y = p.sy - p.radius - h - 6.0;

	ctx.set_fill_style_str(&style.background.to_css());
	rounded_rect(ctx, x, y, w, h, style.corner_radius);
	ctx.fill();

	ctx.set_fill_style_str(&style.text.to_css());
	let _ = ctx.fill_text(
		&text,
		x + style.padding_x,
		y + style.padding_y + scale.label_size * 0.85,
	);
}

fn draw_status(
	state: &CloudState,
	ctx: &CanvasRenderingContext2d,
	scale: &SceneScale,
	theme: &Theme,
	text: &str,
) {
	ctx.set_font(&scale.label_font());
	ctx.set_fill_style_str(&theme.status_color.to_css());
	let width = ctx.measure_text(text).map(|m| m.width()).unwrap_or(0.0);
	let _ = ctx.fill_text(text, (state.width - width) / 2.0, state.height / 2.0);
}

fn rounded_rect(ctx: &CanvasRenderingContext2d, x: f64, y: f64, w: f64, h: f64, r: f64) {
	let r = r.min(w / 2.0).min(h / 2.0).max(0.0);
	ctx.begin_path();
	ctx.move_to(x + r, y);
	ctx.line_to(x + w - r, y);
	let _ = ctx.arc_to(x + w, y, x + w, y + r, r);
	ctx.line_to(x + w, y + h - r);
	let _ = ctx.arc_to(x + w, y + h, x + w - r, y + h, r);
	ctx.line_to(x + r, y + h);
	let _ = ctx.arc_to(x, y + h, x, y + h - r, r);
	ctx.line_to(x, y + r);
	let _ = ctx.arc_to(x, y, x + r, y, r);
	ctx.close_path();
}
