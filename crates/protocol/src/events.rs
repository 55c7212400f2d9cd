//! Messages crossing the coordinator's boundaries.

use serde::{Deserialize, Serialize};

use crate::handles::{SessionHandle, SurfaceHandle, SurfaceId};
use crate::state::{ChromeLevel, PresentationState, SessionState};

/// Lifecycle callback delivered by the compositor on its own thread.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CompositorEvent {
	SessionCreated {
		session: SessionHandle,
		pid: u32,
		app_id: String,
	},
	SessionRemoved {
		session: SessionHandle,
	},
	/// The compositor finished suspending a session the shell asked to suspend.
	SessionSuspended {
		session: SessionHandle,
	},
	SurfaceCreated {
		surface: SurfaceHandle,
		session: SessionHandle,
		#[serde(default)]
		title: String,
		#[serde(default)]
		chrome: ChromeLevel,
		/// Identity the application asked to be restored under, if any.
		#[serde(default, skip_serializing_if = "Option::is_none")]
		persistent_id: Option<SurfaceId>,
	},
	SurfaceRemoved {
		surface: SurfaceHandle,
	},
	/// A surface moved to another session, e.g. a window handed over to a helper process.
	SurfaceReparented {
		surface: SurfaceHandle,
		session: SessionHandle,
	},
	SurfaceRenamed {
		surface: SurfaceHandle,
		title: String,
	},
	FrameReady {
		surface: SurfaceHandle,
	},
}

impl CompositorEvent {
	/// Short event name used in log lines.
	pub fn kind(&self) -> &'static str {
		match self {
			Self::SessionCreated { .. } => "session_created",
			Self::SessionRemoved { .. } => "session_removed",
			Self::SessionSuspended { .. } => "session_suspended",
			Self::SurfaceCreated { .. } => "surface_created",
			Self::SurfaceRemoved { .. } => "surface_removed",
			Self::SurfaceReparented { .. } => "surface_reparented",
			Self::SurfaceRenamed { .. } => "surface_renamed",
			Self::FrameReady { .. } => "frame_ready",
		}
	}
}

/// Request issued by the shell UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ShellCommand {
	MarkRunning { session: SessionHandle },
	SuspendSession { session: SessionHandle },
	ResumeSession { session: SessionHandle },
	StopSession { session: SessionHandle },
	FocusSurface { surface: SurfaceHandle },
	RequestPresentation { surface: SurfaceHandle, state: PresentationState },
	/// Render callback from the toolkit's scene graph for one surface.
	Render { surface: SurfaceHandle },
	StartFrameDropper { surface: SurfaceHandle },
	StopFrameDropper { surface: SurfaceHandle },
}

/// State change observed by the shell UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ShellNotification {
	SessionAdded { session: SessionHandle, app_id: String },
	SessionRemoved { session: SessionHandle },
	SessionStateChanged { session: SessionHandle, state: SessionState },
	SurfaceAdded { surface: SurfaceHandle, session: SessionHandle },
	SurfaceFirstFrameDrawn { surface: SurfaceHandle },
	SurfaceLiveChanged { surface: SurfaceHandle, live: bool },
	SurfaceFrameDropperChanged { surface: SurfaceHandle, running: bool },
	SurfaceFocusChanged { surface: SurfaceHandle, focused: bool },
	SurfacePresentationChanged { surface: SurfaceHandle, state: PresentationState },
	SurfaceTitleChanged { surface: SurfaceHandle, title: String },
	WakeLockEnabledChanged { enabled: bool },
}

/// Capabilities of a compositor buffer offered to the toolkit for drawing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BufferInfo {
	pub width: u32,
	pub height: u32,
	/// Whether the buffer can be bound as a GPU texture.
	#[serde(default)]
	pub texture_capable: bool,
}
