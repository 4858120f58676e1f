//! Recognized mind-map options and their defaults.
//!
//! The configuration is plain JSON in camelCase, e.g.
//! `{"mode": "radial", "zoomExtent": [0.2, 4.0], "nodeSpacing": 60}`.
//! Anything left out takes the default below.

use log::warn;
use serde::{Deserialize, Serialize};

use super::error::{Error, Result};
use super::force::ForceConfig;
use super::tree_layout::{TreeLayoutConfig, TreeMode};
use super::viewport::{ViewportConfig, ZoomExtent};

/// Which layout algorithm positions the graph.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutMode {
	#[default]
	Horizontal,
	Vertical,
	Radial,
	Force,
}

impl LayoutMode {
	/// The tree sub-mode, or `None` for the force simulation.
	pub fn tree_mode(self) -> Option<TreeMode> {
		match self {
			LayoutMode::Horizontal => Some(TreeMode::Horizontal),
			LayoutMode::Vertical => Some(TreeMode::Vertical),
			LayoutMode::Radial => Some(TreeMode::Radial),
			LayoutMode::Force => None,
		}
	}

	/// Parses the lowercase option value used by the config and the mode selector.
	pub fn parse(value: &str) -> Option<Self> {
		match value {
			"horizontal" => Some(LayoutMode::Horizontal),
			"vertical" => Some(LayoutMode::Vertical),
			"radial" => Some(LayoutMode::Radial),
			"force" => Some(LayoutMode::Force),
			_ => None,
		}
	}

	pub fn as_str(self) -> &'static str {
		match self {
			LayoutMode::Horizontal => "horizontal",
			LayoutMode::Vertical => "vertical",
			LayoutMode::Radial => "radial",
			LayoutMode::Force => "force",
		}
	}
}

/// Complete engine configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MindMapConfig {
	pub mode: LayoutMode,
	/// `[min, max]` content-to-screen scale.
	pub zoom_extent: [f64; 2],
	/// Target separation of linked nodes in the force layout.
	pub link_distance: f64,
	/// Many-body strength; negative values repel.
	pub charge_strength: f64,
	/// Minimum separation radius per node in the force layout.
	pub collision_radius: f64,
	/// Cross-axis distance between siblings in tree layouts.
	pub node_spacing: f64,
	/// Primary-axis distance between tree levels.
	pub level_spacing: f64,
	/// Ring radius for radial layout.
	pub radial_radius: f64,
	/// Fraction of the container a fitted diagram may occupy.
	pub margin_factor: f64,
	/// Screen pixels reserved for a toolbar above the diagram when auto-fitting.
	pub toolbar_offset: f64,
	/// Quiet period before a burst of resizes triggers one re-fit.
	pub resize_debounce_ms: f64,
	/// Fit the viewport after each completed layout.
	pub auto_fit: bool,
	pub alpha_min: f64,
	pub alpha_decay: f64,
	pub velocity_decay: f64,
	/// Alpha target while a node is being dragged.
	pub reheat_alpha: f64,
}

impl Default for MindMapConfig {
	fn default() -> Self {
		Self {
			mode: LayoutMode::Horizontal,
			zoom_extent: [0.1, 3.0],
			link_distance: 110.0,
			charge_strength: -350.0,
			collision_radius: 55.0,
			node_spacing: 80.0,
			level_spacing: 180.0,
			radial_radius: 200.0,
			margin_factor: 0.8,
			toolbar_offset: 0.0,
			resize_debounce_ms: 150.0,
			auto_fit: true,
			alpha_min: 0.001,
			// Cools from 1.0 to alpha_min in 300 ticks.
			alpha_decay: 1.0 - 0.001_f64.powf(1.0 / 300.0),
			velocity_decay: 0.4,
			reheat_alpha: 0.3,
		}
	}
}

impl MindMapConfig {
	/// Parses JSON options, rejecting an unusable zoom extent and repairing
	/// other out-of-range values.
	pub fn from_json(json: &str) -> Result<Self> {
		let config: MindMapConfig = serde_json::from_str(json)?;
		let [min, max] = config.zoom_extent;
		if !(min > 0.0 && max > 0.0 && min <= max) {
			return Err(Error::InvalidZoomExtent { min, max });
		}
		Ok(config.validated())
	}

	/// Returns a copy with every option inside its usable range.
	pub fn validated(mut self) -> Self {
		let defaults = MindMapConfig::default();

		let [mut min, mut max] = self.zoom_extent;
		if min > max {
			warn!("mind-map: zoom extent [{min}, {max}] is inverted, swapping");
			std::mem::swap(&mut min, &mut max);
		}
		if !(min > 0.0 && max.is_finite()) {
			warn!("mind-map: zoom extent [{min}, {max}] unusable, using default");
			[min, max] = defaults.zoom_extent;
		}
		self.zoom_extent = [min, max];

		if !(self.margin_factor > 0.0 && self.margin_factor <= 1.0) {
			warn!(
				"mind-map: margin factor {} outside (0, 1], clamping",
				self.margin_factor
			);
			self.margin_factor = if self.margin_factor > 1.0 {
				1.0
			} else {
				defaults.margin_factor
			};
		}

		for (name, value, fallback) in [
			("linkDistance", &mut self.link_distance, defaults.link_distance),
			("collisionRadius", &mut self.collision_radius, defaults.collision_radius),
			("nodeSpacing", &mut self.node_spacing, defaults.node_spacing),
			("levelSpacing", &mut self.level_spacing, defaults.level_spacing),
			("radialRadius", &mut self.radial_radius, defaults.radial_radius),
		] {
			if !(value.is_finite() && *value > 0.0) {
				warn!("mind-map: {name} must be positive, using {fallback}");
				*value = fallback;
			}
		}

		if !(self.alpha_decay > 0.0 && self.alpha_decay < 1.0) {
			warn!("mind-map: alphaDecay {} outside (0, 1)", self.alpha_decay);
			self.alpha_decay = defaults.alpha_decay;
		}
		if !(self.velocity_decay >= 0.0 && self.velocity_decay <= 1.0) {
			self.velocity_decay = defaults.velocity_decay;
		}
		if !(self.alpha_min > 0.0) {
			self.alpha_min = defaults.alpha_min;
		}
		self.toolbar_offset = self.toolbar_offset.max(0.0);
		self.resize_debounce_ms = self.resize_debounce_ms.max(0.0);
		self
	}

	pub fn zoom_extent(&self) -> ZoomExtent {
		ZoomExtent::new(self.zoom_extent[0], self.zoom_extent[1])
	}

	pub fn tree_settings(&self) -> TreeLayoutConfig {
		TreeLayoutConfig {
			node_spacing: self.node_spacing,
			level_spacing: self.level_spacing,
			radial_radius: self.radial_radius,
			..TreeLayoutConfig::default()
		}
	}

	pub fn force_settings(&self) -> ForceConfig {
		ForceConfig {
			link_distance: self.link_distance,
			charge_strength: self.charge_strength,
			collision_radius: self.collision_radius,
			alpha_min: self.alpha_min,
			alpha_decay: self.alpha_decay,
			velocity_decay: self.velocity_decay,
			reheat_alpha: self.reheat_alpha,
			..ForceConfig::default()
		}
	}

	pub fn viewport_settings(&self) -> ViewportConfig {
		ViewportConfig {
			zoom_extent: self.zoom_extent(),
			margin_factor: self.margin_factor,
			toolbar_offset: self.toolbar_offset,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn empty_json_takes_defaults() {
		let config = MindMapConfig::from_json("{}").unwrap();
		assert_eq!(config, MindMapConfig::default());
		assert_eq!(config.node_spacing, 80.0);
		assert_eq!(config.zoom_extent, [0.1, 3.0]);
	}

	#[test]
	fn camel_case_options_are_recognized() {
		let config = MindMapConfig::from_json(
			r#"{"mode": "force", "zoomExtent": [0.5, 2.0], "linkDistance": 90,
			"chargeStrength": -300, "collisionRadius": 50, "marginFactor": 0.9}"#,
		)
		.unwrap();
		assert_eq!(config.mode, LayoutMode::Force);
		assert_eq!(config.zoom_extent, [0.5, 2.0]);
		assert_eq!(config.link_distance, 90.0);
		assert_eq!(config.charge_strength, -300.0);
		assert_eq!(config.collision_radius, 50.0);
		assert_eq!(config.margin_factor, 0.9);
	}

	#[test]
	fn bad_zoom_extent_is_rejected() {
		let err = MindMapConfig::from_json(r#"{"zoomExtent": [2.0, 0.5]}"#).unwrap_err();
		assert!(matches!(err, Error::InvalidZoomExtent { .. }));
		let err = MindMapConfig::from_json(r#"{"zoomExtent": [0.0, 3.0]}"#).unwrap_err();
		assert!(matches!(err, Error::InvalidZoomExtent { .. }));
	}

	#[test]
	fn malformed_json_is_a_config_error() {
		let err = MindMapConfig::from_json("{mode: force").unwrap_err();
		assert!(matches!(err, Error::Config(_)));
	}

	#[test]
	fn validated_repairs_out_of_range_values() {
		let config = MindMapConfig {
			zoom_extent: [4.0, 0.5],
			margin_factor: 1.7,
			node_spacing: -3.0,
			level_spacing: f64::NAN,
			..MindMapConfig::default()
		}
		.validated();
		assert_eq!(config.zoom_extent, [0.5, 4.0]);
		assert_eq!(config.margin_factor, 1.0);
		assert_eq!(config.node_spacing, 80.0);
		assert_eq!(config.level_spacing, 180.0);
	}

	#[test]
	fn layout_mode_round_trips_through_its_option_value() {
		for mode in [
			LayoutMode::Horizontal,
			LayoutMode::Vertical,
			LayoutMode::Radial,
			LayoutMode::Force,
		] {
			assert_eq!(LayoutMode::parse(mode.as_str()), Some(mode));
		}
		assert_eq!(LayoutMode::parse("spiral"), None);
		assert_eq!(LayoutMode::Force.tree_mode(), None);
	}
}
