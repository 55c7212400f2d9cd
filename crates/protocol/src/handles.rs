//! Opaque identifiers for compositor-side objects.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Compositor-issued handle for one application session.
///
/// The value is opaque to the shell; only equality and hashing matter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionHandle(pub u64);

/// Compositor-issued handle for one surface (window or buffer producer).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SurfaceHandle(pub u64);

/// Identity of a surface that survives process restarts.
///
/// Handed to applications so they can ask for their previous window identity
/// when they come back.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SurfaceId(pub String);

impl fmt::Display for SessionHandle {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "session@{}", self.0)
	}
}

impl fmt::Display for SurfaceHandle {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "surface@{}", self.0)
	}
}

impl fmt::Display for SurfaceId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl From<&str> for SurfaceId {
	fn from(value: &str) -> Self {
		Self(value.to_string())
	}
}
