//! Error types for shellmir.
//!
//! Lifecycle requests never fail: invalid transitions and stale handles are
//! no-ops. What remains here are synchronous resource failures and plumbing
//! errors around the UI context.

use shellmir_protocol::{SessionHandle, SurfaceHandle};

/// Result alias used across shellmir crates.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	/// The compositor buffer cannot back a texture. The caller skips the frame.
	#[error("cannot bind {surface} to a texture: {reason}")]
	BufferBinding { surface: SurfaceHandle, reason: String },

	#[error("{0} has been released by the compositor")]
	SurfaceReleased(SurfaceHandle),

	#[error("unknown surface {0}")]
	UnknownSurface(SurfaceHandle),

	#[error("unknown session {0}")]
	UnknownSession(SessionHandle),

	/// The UI context stopped before answering.
	#[error("UI context is no longer running")]
	ChannelClosed,

	#[error("invalid configuration: {0}")]
	Config(String),

	#[error(transparent)]
	Io(#[from] std::io::Error),

	#[error(transparent)]
	Json(#[from] serde_json::Error),
}

impl Error {
	/// Returns `true` for errors caused by the surface or buffer rather than the plumbing.
	pub fn is_resource_failure(&self) -> bool {
		matches!(self, Self::BufferBinding { .. } | Self::SurfaceReleased(_))
	}
}
