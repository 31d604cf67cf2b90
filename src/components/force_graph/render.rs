//! Canvas rendering for the force graph.
//!
//! Paints the current [`Scene`](super::sync::Scene) in three passes:
//! 1. Background (screen space)
//! 2. Links (world space)
//! 3. Nodes with their value and name labels, in scene order so the disc
//!    painted last is the one a press hits
//!
//! Everything in world space goes through the single viewport transform, so
//! strokes and text scale with zoom.

use std::f64::consts::PI;

use web_sys::CanvasRenderingContext2d;

use super::state::ForceGraphState;
use super::sync::NodeElement;
use super::theme::Theme;

/// Renders the complete graph to the canvas.
pub fn render(state: &ForceGraphState, ctx: &CanvasRenderingContext2d) {
	let theme = state.theme();
	let (width, height) = state.size();
	let transform = state.transform();

	ctx.set_fill_style_str(&theme.background.to_css());
	ctx.fill_rect(0.0, 0.0, width, height);

	ctx.save();
	let _ = ctx.translate(transform.x, transform.y);
	let _ = ctx.scale(transform.k, transform.k);

	draw_links(state, ctx, theme);
	draw_nodes(state, ctx, theme);

	ctx.restore();
}

fn draw_links(state: &ForceGraphState, ctx: &CanvasRenderingContext2d, theme: &Theme) {
	ctx.set_stroke_style_str(&theme.link.color.to_css());
	for link in state.scene().links() {
		ctx.begin_path();
		ctx.move_to(link.from.x, link.from.y);
		ctx.line_to(link.to.x, link.to.y);
		ctx.set_line_width(link.width);
		ctx.stroke();
	}
}

fn draw_nodes(state: &ForceGraphState, ctx: &CanvasRenderingContext2d, theme: &Theme) {
	let nodes = state.scene().nodes();
	for node in nodes {
		draw_node(ctx, node, theme);
	}

	// Names go on top of every disc so large nodes don't hide neighbours' labels.
	ctx.set_font(&theme.node.label_font);
	ctx.set_text_align("center");
	ctx.set_text_baseline("alphabetic");
	ctx.set_fill_style_str(&theme.node.label_color.to_css());
	for node in nodes {
		let (x, y) = (node.position.x, node.position.y);
		let _ = ctx.fill_text(&node.name, x, y + node.radius + theme.node.label_offset);
	}
}

fn draw_node(ctx: &CanvasRenderingContext2d, node: &NodeElement, theme: &Theme) {
	let (x, y) = (node.position.x, node.position.y);

	ctx.begin_path();
	let _ = ctx.arc(x, y, node.radius, 0.0, 2.0 * PI);
	ctx.set_fill_style_str(&node.fill.to_css());
	ctx.fill();

	let (border, width) = if node.selected {
		(theme.node.selected_border_color, theme.node.selected_border_width)
	} else {
		(theme.node.border_color, theme.node.border_width)
	};
	if width > 0.0 {
		ctx.set_stroke_style_str(&border.to_css());
		ctx.set_line_width(width);
		ctx.stroke();
	}

	ctx.set_font(&theme.node.value_font);
	ctx.set_text_align("center");
	ctx.set_text_baseline("middle");
	ctx.set_fill_style_str(&node.text_color.to_css());
	let _ = ctx.fill_text(&node.value_label, x, y);
}
