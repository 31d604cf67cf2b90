//! Pan and zoom.
//!
//! The viewport owns a single affine transform `screen = world * k + (x, y)`
//! shared by everything drawn in the scene. Zoom is clamped to the configured
//! scale extent; translation is unconstrained.

use super::config::ViewportConfig;

/// A 2D point, in screen or world coordinates depending on context.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
	pub x: f64,
	pub y: f64,
}

impl Point {
	pub const fn new(x: f64, y: f64) -> Self {
		Self { x, y }
	}

	pub fn distance(self, other: Point) -> f64 {
		(self.x - other.x).hypot(self.y - other.y)
	}
}

/// Pan and zoom transform applied to the entire graph view.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewTransform {
	pub x: f64,
	pub y: f64,
	/// Zoom factor (1.0 = 100%).
	pub k: f64,
}

impl Default for ViewTransform {
	fn default() -> Self {
		Self::IDENTITY
	}
}

impl ViewTransform {
	pub const IDENTITY: Self = Self {
		x: 0.0,
		y: 0.0,
		k: 1.0,
	};

	pub fn screen_to_world(&self, p: Point) -> Point {
		Point::new((p.x - self.x) / self.k, (p.y - self.y) / self.k)
	}

	pub fn world_to_screen(&self, p: Point) -> Point {
		Point::new(p.x * self.k + self.x, p.y * self.k + self.y)
	}
}

/// A pointer gesture that changes the view.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Gesture {
	/// Translate by a screen-space delta.
	Pan { dx: f64, dy: f64 },
	/// Multiply the scale by `factor`, keeping `anchor` (screen space) fixed.
	Zoom { anchor: Point, factor: f64 },
	/// Set the scale to `k`, keeping `anchor` fixed.
	ZoomTo { anchor: Point, k: f64 },
	/// Back to identity.
	Reset,
}

/// Owns the view transform and turns gestures into transform updates.
#[derive(Clone, Debug)]
pub struct Viewport {
	transform: ViewTransform,
	config: ViewportConfig,
}

impl Viewport {
	pub fn new(config: ViewportConfig) -> Self {
		Self {
			transform: ViewTransform::IDENTITY,
			config,
		}
	}

	pub fn current_transform(&self) -> ViewTransform {
		self.transform
	}

	/// Apply a gesture and return the resulting transform.
	///
	/// Non-finite or non-positive zoom requests are ignored.
	pub fn apply_gesture(&mut self, gesture: Gesture) -> ViewTransform {
		match gesture {
			Gesture::Pan { dx, dy } => {
				if dx.is_finite() && dy.is_finite() {
					self.transform.x += dx;
					self.transform.y += dy;
				}
			}
			Gesture::Zoom { anchor, factor } => {
				if factor.is_finite() && factor > 0.0 {
					self.zoom_to(anchor, self.transform.k * factor);
				}
			}
			Gesture::ZoomTo { anchor, k } => {
				if k.is_finite() && k > 0.0 {
					self.zoom_to(anchor, k);
				}
			}
			Gesture::Reset => self.transform = ViewTransform::IDENTITY,
		}
		self.transform
	}

	/// Zoom factor for a wheel event: one step in per notch scrolled up, one out per notch down.
	pub fn wheel_factor(&self, delta_y: f64) -> f64 {
		if delta_y > 0.0 {
			1.0 / self.config.wheel_step
		} else if delta_y < 0.0 {
			self.config.wheel_step
		} else {
			1.0
		}
	}

	pub fn screen_to_world(&self, p: Point) -> Point {
		self.transform.screen_to_world(p)
	}

	fn zoom_to(&mut self, anchor: Point, k: f64) {
		// A hand-built config may hold reversed limits.
		let (lo, hi) = (self.config.min_scale, self.config.max_scale);
		let new_k = k.max(lo.min(hi)).min(hi.max(lo));
		let ratio = new_k / self.transform.k;
		self.transform.x = anchor.x - (anchor.x - self.transform.x) * ratio;
		self.transform.y = anchor.y - (anchor.y - self.transform.y) * ratio;
		self.transform.k = new_k;
	}
}

impl Default for Viewport {
	fn default() -> Self {
		Self::new(ViewportConfig::default())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn close(a: Point, b: Point) -> bool {
		a.distance(b) < 1e-9
	}

	#[test]
	fn zoom_keeps_anchor_fixed() {
		let mut vp = Viewport::default();
		vp.apply_gesture(Gesture::Pan { dx: 40.0, dy: -25.0 });
		let anchor = Point::new(310.0, 120.0);

		for factor in [1.1, 1.5, 0.8, 2.0, 0.6] {
			let before = vp.screen_to_world(anchor);
			let t = vp.apply_gesture(Gesture::Zoom { anchor, factor });
			assert!(close(t.world_to_screen(before), anchor), "anchor drifted at factor {factor}");
			assert!((0.5..=3.0).contains(&t.k));
		}
	}

	#[test]
	fn zoom_clamps_to_scale_extent() {
		let mut vp = Viewport::default();
		let anchor = Point::new(100.0, 100.0);

		let t = vp.apply_gesture(Gesture::ZoomTo { anchor, k: 10.0 });
		assert_eq!(t.k, 3.0);
		let t = vp.apply_gesture(Gesture::Zoom { anchor, factor: 0.01 });
		assert_eq!(t.k, 0.5);
		// Clamped zooms still keep the anchor in place.
		assert!(close(t.world_to_screen(t.screen_to_world(anchor)), anchor));
		assert!(close(t.screen_to_world(anchor), Point::new(100.0, 100.0)));
	}

	#[test]
	fn bogus_zoom_requests_are_ignored() {
		let mut vp = Viewport::default();
		let anchor = Point::new(5.0, 5.0);
		for factor in [0.0, -2.0, f64::NAN, f64::INFINITY] {
			assert_eq!(vp.apply_gesture(Gesture::Zoom { anchor, factor }), ViewTransform::IDENTITY);
		}
	}

	#[test]
	fn pan_is_unconstrained_and_reset_restores_identity() {
		let mut vp = Viewport::default();
		let t = vp.apply_gesture(Gesture::Pan { dx: 1e6, dy: -1e6 });
		assert_eq!((t.x, t.y), (1e6, -1e6));
		assert_eq!(vp.apply_gesture(Gesture::Reset), ViewTransform::IDENTITY);
	}

	#[test]
	fn inverse_transform_round_trips() {
		let t = ViewTransform {
			x: 12.0,
			y: -7.0,
			k: 2.5,
		};
		let p = Point::new(33.0, 44.0);
		assert!(close(t.screen_to_world(t.world_to_screen(p)), p));
	}

	#[test]
	fn wheel_direction() {
		let vp = Viewport::default();
		assert!(vp.wheel_factor(120.0) < 1.0);
		assert!(vp.wheel_factor(-120.0) > 1.0);
		assert_eq!(vp.wheel_factor(0.0), 1.0);
	}

	#[test]
	fn reversed_limits_still_bound_zoom() {
		let mut vp = Viewport::new(ViewportConfig {
			min_scale: 3.0,
			max_scale: 0.5,
			wheel_step: 1.1,
		});
		let anchor = Point::new(10.0, 10.0);
		let t = vp.apply_gesture(Gesture::Zoom { anchor, factor: 100.0 });
		assert_eq!(t.k, 3.0);
		let t = vp.apply_gesture(Gesture::Zoom { anchor, factor: 1e-4 });
		assert_eq!(t.k, 0.5);
	}
}
