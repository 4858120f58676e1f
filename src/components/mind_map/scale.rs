//! Zoom-dependent sizing of strokes and text.
//!
//! Node geometry lives in content space and scales with the viewport. Strokes
//! and labels would become unreadable at the zoom extremes, so they follow a
//! [`ScaleBehavior`] that clamps their on-screen size.

/// How a visual property scales with zoom level `k`.
#[derive(Clone, Debug)]
pub enum ScaleBehavior {
	/// Constant content-space size. Appears larger when zoomed in.
	World,
	/// Constant screen-space size (pixels). Unaffected by zoom.
	Screen,
	/// Content-space size clamped to `[min_screen, max_screen]` pixels.
	Clamped { min_screen: f64, max_screen: f64 },
}

impl ScaleBehavior {
	/// Content-space value to draw with once the viewport transform is applied.
	pub fn apply(&self, base: f64, k: f64) -> f64 {
		match self {
			ScaleBehavior::World => base,
			ScaleBehavior::Screen => base / k,
			ScaleBehavior::Clamped {
				min_screen,
				max_screen,
			} => base.clamp(min_screen / k, max_screen / k),
		}
	}
}

#[derive(Clone, Debug)]
pub struct ScaleConfig {
	/// Label font size in content units.
	pub label_size: f64,
	pub label_behavior: ScaleBehavior,
	/// Labels are skipped below this on-screen font size.
	pub label_min_px: f64,
	/// Edge width in screen pixels.
	pub edge_width: f64,
	pub edge_behavior: ScaleBehavior,
	/// Selection/hover ring width and gap in screen pixels.
	pub ring_width: f64,
	pub ring_offset: f64,
}

impl Default for ScaleConfig {
	fn default() -> Self {
		Self {
			label_size: 13.0,
			label_behavior: ScaleBehavior::Clamped {
				min_screen: 9.0,
				max_screen: 22.0,
			},
			label_min_px: 4.0,
			edge_width: 1.5,
			edge_behavior: ScaleBehavior::Screen,
			ring_width: 2.0,
			ring_offset: 3.0,
		}
	}
}

/// Scale values resolved for one zoom level, computed once per frame.
#[derive(Clone, Debug)]
pub struct ScaledValues {
	pub k: f64,
	/// Label font size in content units.
	pub label_size: f64,
	/// CSS font shorthand for labels.
	pub label_font: String,
	pub show_labels: bool,
	pub edge_line_width: f64,
	pub ring_width: f64,
	pub ring_offset: f64,
}

impl ScaledValues {
	pub fn new(config: &ScaleConfig, k: f64) -> Self {
		let label_size = config.label_behavior.apply(config.label_size, k);
		Self {
			k,
			label_size,
			label_font: format!("{label_size}px sans-serif"),
			show_labels: config.label_size * k >= config.label_min_px,
			edge_line_width: config.edge_behavior.apply(config.edge_width, k),
			ring_width: config.ring_width / k,
			ring_offset: config.ring_offset / k,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn clamped_behavior_bounds_screen_size() {
		let b = ScaleBehavior::Clamped {
			min_screen: 9.0,
			max_screen: 22.0,
		};
		// At k = 0.5 a 13-unit label would be 6.5px; it is raised to 9px.
		assert_eq!(b.apply(13.0, 0.5) * 0.5, 9.0);
		assert_eq!(b.apply(13.0, 1.0), 13.0);
		assert!((b.apply(13.0, 3.0) * 3.0 - 22.0).abs() < 1e-9);
	}

	#[test]
	fn screen_behavior_is_zoom_independent() {
		let values = ScaledValues::new(&ScaleConfig::default(), 2.0);
		assert_eq!(values.edge_line_width * 2.0, 1.5);
		assert!(values.show_labels);
		assert!(!ScaledValues::new(&ScaleConfig::default(), 0.1).show_labels);
	}
}
