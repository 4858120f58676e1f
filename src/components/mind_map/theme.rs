//! Visual theming for the mind map.
//!
//! Colours are keyed by [`NodeKind`], so a test-case tree reads at a glance:
//! root, categories, modules, test cases and steps each get their own hue.

use super::graph::NodeKind;

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

	pub const fn rgba(r: u8, g: u8, b: u8, a: f64) -> Self {
		Self { r, g, b, a }
	}

	/// Lighten the color by a factor (0.0 = unchanged, 1.0 = white)
	pub fn lighten(self, factor: f64) -> Self {
		let f = factor.clamp(0.0, 1.0);
		let up = |c: u8| (c as f64 + (255.0 - c as f64) * f) as u8;
		Self {
			r: up(self.r),
			g: up(self.g),
			b: up(self.b),
			a: self.a,
		}
	}

	/// Darken the color by a factor (0.0 = unchanged, 1.0 = black)
	pub fn darken(self, factor: f64) -> Self {
		let f = 1.0 - factor.clamp(0.0, 1.0);
		let down = |c: u8| (c as f64 * f) as u8;
		Self {
			r: down(self.r),
			g: down(self.g),
			b: down(self.b),
			a: self.a,
		}
	}

	/// Parses a CSS colour: `#RRGGBB` or `rgb()`/`rgba()` notation.
	pub fn parse(value: &str) -> Option<Self> {
		let value = value.trim();
		if let Some(hex) = value.strip_prefix('#') {
			if hex.len() != 6 {
				return None;
			}
			let channel = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
			return Some(Color::rgb(channel(0)?, channel(2)?, channel(4)?));
		}
		let inner = value
			.strip_prefix("rgba(")
			.or_else(|| value.strip_prefix("rgb("))?
			.strip_suffix(')')?;
		let parts: Vec<&str> = inner.split(',').map(str::trim).collect();
		let channel = |i: usize| parts.get(i)?.parse::<u8>().ok();
		let a = match parts.get(3) {
			Some(a) => a.parse::<f64>().ok()?,
			None => 1.0,
		};
		Some(Color::rgba(channel(0)?, channel(1)?, channel(2)?, a))
	}

	pub fn to_css(self) -> String {
		if (self.a - 1.0).abs() < 0.001 {
			format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
		} else {
			format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
		}
	}
}

/// Fill colour per node kind.
#[derive(Clone, Debug)]
pub struct KindPalette {
	pub root: Color,
	pub category: Color,
	pub module: Color,
	pub test_case: Color,
	pub step: Color,
	pub default: Color,
}

impl KindPalette {
	pub fn get(&self, kind: NodeKind) -> Color {
		match kind {
			NodeKind::Root => self.root,
			NodeKind::Category => self.category,
			NodeKind::Module => self.module,
			NodeKind::TestCase => self.test_case,
			NodeKind::Step => self.step,
			NodeKind::Default => self.default,
		}
	}
}

impl Default for KindPalette {
	fn default() -> Self {
		Self {
			root: Color::rgb(229, 115, 80),      // Coral
			category: Color::rgb(94, 129, 172),  // Steel blue
			module: Color::rgb(100, 148, 160),   // Teal gray
			test_case: Color::rgb(129, 178, 120), // Sage green
			step: Color::rgb(196, 160, 100),     // Ochre
			default: Color::rgb(136, 160, 175),  // Cadet blue
		}
	}
}

#[derive(Clone, Debug)]
pub struct BackgroundStyle {
	pub color: Color,
	/// Spacing of the dot grid in content units; 0 disables it.
	pub grid_spacing: f64,
	pub grid_color: Color,
}

#[derive(Clone, Debug)]
pub struct EdgeStyle {
	pub color: Color,
	/// Edge colour when touching the selected node.
	pub highlight_color: Color,
}

#[derive(Clone, Debug)]
pub struct NodeStyle {
	pub palette: KindPalette,
	/// Shade nodes with a radial gradient instead of a flat fill.
	pub use_gradient: bool,
	pub border_color: Color,
	/// Border width in screen pixels.
	pub border_width: f64,
	pub label_color: Color,
	pub selection_color: Color,
	pub hover_color: Color,
}

/// Complete visual theme for the mind map.
#[derive(Clone, Debug)]
pub struct Theme {
	pub background: BackgroundStyle,
	pub edge: EdgeStyle,
	pub node: NodeStyle,
	pub notice_color: Color,
}

impl Default for Theme {
	fn default() -> Self {
		Self::dark()
	}
}

impl Theme {
	pub fn dark() -> Self {
		Self {
			background: BackgroundStyle {
				color: Color::rgb(22, 27, 34),
				grid_spacing: 40.0,
				grid_color: Color::rgba(255, 255, 255, 0.05),
			},
			edge: EdgeStyle {
				color: Color::rgba(150, 170, 190, 0.6),
				highlight_color: Color::rgba(240, 200, 120, 0.9),
			},
			node: NodeStyle {
				palette: KindPalette::default(),
				use_gradient: true,
				border_color: Color::rgba(255, 255, 255, 0.25),
				border_width: 1.0,
				label_color: Color::rgba(235, 240, 245, 0.92),
				selection_color: Color::rgb(240, 200, 120),
				hover_color: Color::rgba(255, 255, 255, 0.6),
			},
			notice_color: Color::rgb(240, 170, 90),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn css_output() {
		assert_eq!(Color::rgb(255, 0, 16).to_css(), "#ff0010");
		assert_eq!(Color::rgba(1, 2, 3, 0.5).to_css(), "rgba(1, 2, 3, 0.5)");
	}

	#[test]
	fn parses_css_notations() {
		assert_eq!(Color::parse("#ff8000"), Some(Color::rgb(255, 128, 0)));
		assert_eq!(Color::parse("rgb(1, 2, 3)"), Some(Color::rgb(1, 2, 3)));
		assert_eq!(Color::parse("rgba(1,2,3,0.5)"), Some(Color::rgba(1, 2, 3, 0.5)));
		assert_eq!(Color::parse("#fff"), None);
		assert_eq!(Color::parse("teal"), None);
	}

	#[test]
	fn lighten_and_darken_hit_extremes() {
		let c = Color::rgb(100, 150, 200);
		assert_eq!(c.lighten(1.0), Color::rgb(255, 255, 255));
		assert_eq!(c.darken(1.0), Color::rgb(0, 0, 0));
		assert_eq!(c.lighten(0.0), c);
	}

	#[test]
	fn every_kind_has_a_distinct_colour() {
		let palette = KindPalette::default();
		let kinds = [
			NodeKind::Root,
			NodeKind::Category,
			NodeKind::Module,
			NodeKind::TestCase,
			NodeKind::Step,
			NodeKind::Default,
		];
		for (i, a) in kinds.iter().enumerate() {
			for b in &kinds[i + 1..] {
				assert_ne!(palette.get(*a), palette.get(*b));
			}
		}
	}
}
