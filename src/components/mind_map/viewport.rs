//! Pan/zoom camera over the diagram.
//!
//! A [`Viewport`] maps content coordinates to screen coordinates as
//! `screen = content * scale + translate`. Every operation returns a new value
//! and keeps `scale` inside the configured [`ZoomExtent`].

use super::graph::{Point, Rect};

/// Width and height of the drawing container, in screen pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Size {
	pub width: f64,
	pub height: f64,
}

impl Size {
	pub const fn new(width: f64, height: f64) -> Self {
		Self { width, height }
	}

	pub fn center(&self) -> Point {
		Point::new(self.width / 2.0, self.height / 2.0)
	}
}

/// Allowed range of `scale`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ZoomExtent {
	pub min: f64,
	pub max: f64,
}

impl ZoomExtent {
	pub fn new(min: f64, max: f64) -> Self {
		Self {
			min: min.min(max),
			max: max.max(min),
		}
	}

	pub fn clamp(&self, scale: f64) -> f64 {
		scale.clamp(self.min, self.max)
	}
}

impl Default for ZoomExtent {
	fn default() -> Self {
		Self { min: 0.1, max: 3.0 }
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct ViewportConfig {
	pub zoom_extent: ZoomExtent,
	/// Fraction of the container a fitted diagram may fill.
	pub margin_factor: f64,
	/// Screen pixels to push fitted content down, clear of a toolbar.
	pub toolbar_offset: f64,
}

impl Default for ViewportConfig {
	fn default() -> Self {
		Self {
			zoom_extent: ZoomExtent::default(),
			margin_factor: 0.8,
			toolbar_offset: 0.0,
		}
	}
}

/// Camera transform: pan (`translate_*`, screen pixels) and zoom (`scale`).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
	pub translate_x: f64,
	pub translate_y: f64,
	pub scale: f64,
}

impl Default for Viewport {
	fn default() -> Self {
		Self::identity()
	}
}

impl Viewport {
	pub const fn identity() -> Self {
		Self {
			translate_x: 0.0,
			translate_y: 0.0,
			scale: 1.0,
		}
	}

	pub fn to_screen(&self, p: Point) -> Point {
		Point::new(
			p.x * self.scale + self.translate_x,
			p.y * self.scale + self.translate_y,
		)
	}

	pub fn to_content(&self, p: Point) -> Point {
		Point::new(
			(p.x - self.translate_x) / self.scale,
			(p.y - self.translate_y) / self.scale,
		)
	}

	/// Screen-space image of a content rectangle.
	pub fn project(&self, r: Rect) -> Rect {
		let top_left = self.to_screen(Point::new(r.x, r.y));
		Rect {
			x: top_left.x,
			y: top_left.y,
			width: r.width * self.scale,
			height: r.height * self.scale,
		}
	}

	pub fn pan_by(&self, dx: f64, dy: f64) -> Self {
		Self {
			translate_x: self.translate_x + dx,
			translate_y: self.translate_y + dy,
			..*self
		}
	}

	/// Multiplies the scale by `factor`, keeping the content under the screen
	/// point `pivot` fixed.
	pub fn zoom_at(&self, factor: f64, pivot: Point, extent: ZoomExtent) -> Self {
		if !(factor.is_finite() && factor > 0.0) {
			return *self;
		}
		let scale = extent.clamp(self.scale * factor);
		let ratio = scale / self.scale;
		Self {
			translate_x: pivot.x - (pivot.x - self.translate_x) * ratio,
			translate_y: pivot.y - (pivot.y - self.translate_y) * ratio,
			scale,
		}
	}

	/// Zoom pivoting on the container centre.
	pub fn zoom_by(&self, factor: f64, container: Size, extent: ZoomExtent) -> Self {
		self.zoom_at(factor, container.center(), extent)
	}

	pub fn reset() -> Self {
		Self::identity()
	}

	/// Scales and centres `content` in `container`, leaving a margin and
	/// room for the toolbar. Degenerate boxes give the identity transform.
	pub fn fit_to_view(content: Rect, container: Size, config: &ViewportConfig) -> Self {
		Self::fit(content, container, config, config.toolbar_offset)
	}

	/// Like [`Viewport::fit_to_view`] but exactly centred, without toolbar offset.
	pub fn center_view(content: Rect, container: Size, config: &ViewportConfig) -> Self {
		Self::fit(content, container, config, 0.0)
	}

	fn fit(content: Rect, container: Size, config: &ViewportConfig, offset: f64) -> Self {
		let usable = [
			content.x,
			content.y,
			content.width,
			content.height,
			container.width,
			container.height,
		]
		.iter()
		.all(|v| v.is_finite());
		if !usable
			|| content.width <= 0.0
			|| content.height <= 0.0
			|| container.width <= 0.0
			|| container.height <= 0.0
		{
			return Self::identity();
		}

		let fill = (container.width / content.width).min(container.height / content.height);
		let scale = config.zoom_extent.clamp(fill * config.margin_factor);
		let center = content.center();
		let slack = (container.height - content.height * scale) / 2.0;
		let offset = offset.min(slack.max(0.0));
		Self {
			translate_x: container.width / 2.0 - center.x * scale,
			translate_y: container.height / 2.0 - center.y * scale + offset,
			scale,
		}
	}
}
