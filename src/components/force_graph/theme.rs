//! Visual theming for the force graph.
//!
//! Provides the color type, the sequential ramps used for metric coloring and
//! the fixed stroke/label styling.

use serde::Deserialize;

/// RGBA color representation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
	pub r: u8,
	pub g: u8,
	pub b: u8,
	pub a: f64,
}

impl Color {
	pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
		Self { r, g, b, a: 1.0 }
	}

	/// Build an opaque color from a packed `0xRRGGBB` value.
	pub const fn hex(rgb: u32) -> Self {
		Self::rgb((rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8)
	}

	pub fn with_alpha(self, a: f64) -> Self {
		Self { a, ..self }
	}

	/// Linear interpolation between two colors
	pub fn lerp(self, other: Color, t: f64) -> Self {
		let t = t.clamp(0.0, 1.0);
		Self {
			r: (self.r as f64 * (1.0 - t) + other.r as f64 * t) as u8,
			g: (self.g as f64 * (1.0 - t) + other.g as f64 * t) as u8,
			b: (self.b as f64 * (1.0 - t) + other.b as f64 * t) as u8,
			a: self.a * (1.0 - t) + other.a * t,
		}
	}

	/// WCAG relative luminance in `[0, 1]`.
	pub fn relative_luminance(self) -> f64 {
		let channel = |c: u8| {
			let c = c as f64 / 255.0;
			if c <= 0.03928 {
				c / 12.92
			} else {
				((c + 0.055) / 1.055).powf(2.4)
			}
		};
		0.2126 * channel(self.r) + 0.7152 * channel(self.g) + 0.0722 * channel(self.b)
	}

	/// Black on light fills, white on dark ones.
	pub fn contrast_text(self) -> Color {
		if self.relative_luminance() > 0.5 {
			Color::rgb(0, 0, 0)
		} else {
			Color::rgb(255, 255, 255)
		}
	}

	pub fn to_css(self) -> String {
		if (self.a - 1.0).abs() < 0.001 {
			format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
		} else {
			format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
		}
	}
}

/// Sequential color families used to encode metric magnitude.
///
/// Each ramp runs from a near-white tint to a saturated dark shade, so larger
/// values always read as darker.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorRamp {
	Greens,
	Blues,
	Oranges,
	Purples,
	Reds,
}

impl ColorRamp {
	pub const ALL: [ColorRamp; 5] = [
		ColorRamp::Greens,
		ColorRamp::Blues,
		ColorRamp::Oranges,
		ColorRamp::Purples,
		ColorRamp::Reds,
	];

	/// Nine evenly spaced stops, lightest first.
	#[rustfmt::skip]
	pub fn stops(self) -> [Color; 9] {
		let h = Color::hex;
		match self {
			ColorRamp::Greens => [
				h(0xf7fcf5), h(0xe5f5e0), h(0xc7e9c0), h(0xa1d99b), h(0x74c476),
				h(0x41ab5d), h(0x238b45), h(0x006d2c), h(0x00441b),
			],
			ColorRamp::Blues => [
				h(0xf7fbff), h(0xdeebf7), h(0xc6dbef), h(0x9ecae1), h(0x6baed6),
				h(0x4292c6), h(0x2171b5), h(0x08519c), h(0x08306b),
			],
			ColorRamp::Oranges => [
				h(0xfff5eb), h(0xfee6ce), h(0xfdd0a2), h(0xfdae6b), h(0xfd8d3c),
				h(0xf16913), h(0xd94801), h(0xa63603), h(0x7f2704),
			],
			ColorRamp::Purples => [
				h(0xfcfbfd), h(0xefedf5), h(0xdadaeb), h(0xbcbddc), h(0x9e9ac8),
				h(0x807dba), h(0x6a51a3), h(0x54278f), h(0x3f007d),
			],
			ColorRamp::Reds => [
				h(0xfff5f0), h(0xfee0d2), h(0xfcbba1), h(0xfc9272), h(0xfb6a4a),
				h(0xef3b2c), h(0xcb181d), h(0xa50f15), h(0x67000d),
			],
		}
	}

	/// Color at position `t` in `[0, 1]`. Out-of-range or NaN positions clamp.
	pub fn sample(self, t: f64) -> Color {
		let stops = self.stops();
		let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
		let scaled = t * (stops.len() - 1) as f64;
		let i = (scaled.floor() as usize).min(stops.len() - 2);
		stops[i].lerp(stops[i + 1], scaled - i as f64)
	}

	/// Stable family choice for a key, so re-rendering the same metric keeps
	/// its colors.
	pub fn for_key(key: &str) -> ColorRamp {
		// FNV-1a
		let hash = key.bytes().fold(0xcbf2_9ce4_8422_2325_u64, |h, b| {
			(h ^ b as u64).wrapping_mul(0x0000_0100_0000_01b3)
		});
		Self::ALL[(hash % Self::ALL.len() as u64) as usize]
	}
}

/// Node visual style.
#[derive(Clone, Debug)]
pub struct NodeStyle {
	pub border_color: Color,
	pub border_width: f64,
	/// Border drawn around the selected node.
	pub selected_border_color: Color,
	pub selected_border_width: f64,
	/// Font for the in-node metric value.
	pub value_font: String,
	/// Font and color for the name drawn under the node.
	pub label_font: String,
	pub label_color: Color,
	/// Gap between the node edge and the name baseline.
	pub label_offset: f64,
}

/// Link visual style.
#[derive(Clone, Debug)]
pub struct LinkStyle {
	pub color: Color,
}

/// Complete theme configuration.
#[derive(Clone, Debug)]
pub struct Theme {
	pub background: Color,
	pub node: NodeStyle,
	pub link: LinkStyle,
}

impl Default for Theme {
	fn default() -> Self {
		Self {
			background: Color::rgb(255, 255, 255),
			node: NodeStyle {
				border_color: Color::hex(0x333333),
				border_width: 1.0,
				selected_border_color: Color::hex(0xffffff),
				selected_border_width: 2.0,
				value_font: "10px sans-serif".into(),
				label_font: "10px sans-serif".into(),
				label_color: Color::hex(0x333333),
				label_offset: 15.0,
			},
			link: LinkStyle {
				color: Color::hex(0x999999).with_alpha(0.6),
			},
		}
	}
}
