//! Raw payload shapes accepted from the data-fetch collaborator.
//!
//! Two shapes are recognized: an explicit `{nodes, edges}` list, and a rooted
//! tree of `{id, title, children}` objects. Both are read leniently: optional
//! fields that are null or of an unexpected type count as absent, and elements
//! that still fail to deserialize (no usable id) are skipped by the
//! transformer, not fatal.

use std::fmt;

use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

/// Node ids may arrive as strings or numbers.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum RawId {
	Text(String),
	Number(serde_json::Number),
}

impl fmt::Display for RawId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			RawId::Text(s) => f.write_str(s),
			RawId::Number(n) => write!(f, "{n}"),
		}
	}
}

/// Strings pass through, numbers and booleans are stringified, anything else
/// is treated as missing.
fn lenient_text<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
	Ok(match Value::deserialize(d)? {
		Value::String(s) => Some(s),
		Value::Number(n) => Some(n.to_string()),
		Value::Bool(b) => Some(b.to_string()),
		_ => None,
	})
}

/// Non-negative integers, or floats truncated towards zero.
fn lenient_level<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u32>, D::Error> {
	let value = Value::deserialize(d)?;
	let level = value.as_u64().or_else(|| {
		value
			.as_f64()
			.filter(|f| f.is_finite() && *f >= 0.0)
			.map(|f| f as u64)
	});
	Ok(level.map(|l| u32::try_from(l).unwrap_or(u32::MAX)))
}

fn lenient_id<'de, D: Deserializer<'de>>(d: D) -> Result<Option<RawId>, D::Error> {
	Ok(match Value::deserialize(d)? {
		Value::String(s) => Some(RawId::Text(s)),
		Value::Number(n) => Some(RawId::Number(n)),
		_ => None,
	})
}

/// A list, or empty for null and non-array values.
fn lenient_list<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<Value>, D::Error> {
	Ok(match Value::deserialize(d)? {
		Value::Array(items) => items,
		_ => Vec::new(),
	})
}

/// One entry of an explicit node list.
#[derive(Clone, Debug, Deserialize)]
pub struct RawNode {
	pub id: RawId,
	#[serde(default, deserialize_with = "lenient_text")]
	pub label: Option<String>,
	/// Fallback display text when `label` is absent.
	#[serde(default, deserialize_with = "lenient_text")]
	pub title: Option<String>,
	#[serde(rename = "type", default, deserialize_with = "lenient_text")]
	pub kind: Option<String>,
	#[serde(default, deserialize_with = "lenient_level")]
	pub level: Option<u32>,
	pub data: Option<Value>,
}

/// One entry of an explicit edge list.
#[derive(Clone, Debug, Deserialize)]
pub struct RawEdge {
	pub source: RawId,
	pub target: RawId,
	#[serde(default, deserialize_with = "lenient_id")]
	pub id: Option<RawId>,
	#[serde(rename = "type", default, deserialize_with = "lenient_text")]
	pub kind: Option<String>,
}

/// The explicit `{nodes, edges}` shape. `links` is accepted for `edges`.
#[derive(Clone, Debug, Deserialize)]
pub struct RawGraph {
	pub nodes: Vec<Value>,
	#[serde(default, alias = "links", deserialize_with = "lenient_list")]
	pub edges: Vec<Value>,
}

/// One object of the rooted-tree shape.
///
/// Fields that are not structural are collected into `extra` and become the
/// node's payload when no explicit `data` is given.
#[derive(Clone, Debug, Deserialize)]
pub struct RawTreeNode {
	#[serde(default, deserialize_with = "lenient_id")]
	pub id: Option<RawId>,
	#[serde(default, deserialize_with = "lenient_text")]
	pub title: Option<String>,
	#[serde(default, deserialize_with = "lenient_text")]
	pub label: Option<String>,
	#[serde(rename = "type", default, deserialize_with = "lenient_text")]
	pub kind: Option<String>,
	#[serde(default, deserialize_with = "lenient_list")]
	pub children: Vec<Value>,
	pub data: Option<Value>,
	#[serde(flatten)]
	pub extra: Map<String, Value>,
}

impl RawTreeNode {
	/// The opaque payload carried by the node built from this object.
	pub fn payload(&self) -> Option<Value> {
		match &self.data {
			Some(data) => Some(data.clone()),
			None if self.extra.is_empty() => None,
			None => Some(Value::Object(self.extra.clone())),
		}
	}
}
