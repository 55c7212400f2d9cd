//! Per-window rendering-readiness state machine.
//!
//! A surface tracks three mostly independent things:
//!
//! - liveness: `true` until the compositor releases the surface, then frozen
//! - the first-frame gate: flips once, on the first successful draw
//! - the frame dropper: drains frame-ready signals while nothing consumes the
//!   surface, so the compositor never stalls on an undisplayed client
//!
//! Everything except the read accessors is a no-op once the surface is released.

use parking_lot::Mutex;
use shellmir_protocol::{BufferInfo, ChromeLevel, PresentationState, SessionHandle, ShellNotification, SurfaceHandle, SurfaceId};
use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::notify::Notifier;

/// Result of a render callback on a surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderOutcome {
	/// A frame was drawn. Any backlog collapsed into this one draw.
	Drawn { first_frame: bool },
	/// Nothing new to draw.
	NoFrame,
	/// The compositor already released the surface.
	Released,
}

/// Frame bookkeeping counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameStats {
	pub pending: u32,
	pub dropped: u64,
	pub rendered: u64,
}

/// A compositor buffer successfully bound for drawing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureBinding {
	pub surface: SurfaceHandle,
	pub width: u32,
	pub height: u32,
}

/// Capability surface of a window as seen by shell policy code.
pub trait SurfaceInterface: Send + Sync {
	fn handle(&self) -> SurfaceHandle;
	fn live(&self) -> bool;
	fn presentation(&self) -> PresentationState;
	fn frame_dropper_running(&self) -> bool;
	fn draw_first_frame(&self) -> bool;
	fn start_frame_dropper(&self) -> bool;
	fn stop_frame_dropper(&self) -> bool;
}

#[derive(Debug)]
struct SurfaceState {
	owner: SessionHandle,
	live: bool,
	first_frame_drawn: bool,
	frame_dropper_running: bool,
	presentation: PresentationState,
	focused: bool,
	title: String,
	frames: FrameStats,
}

/// Shell-side object for one compositor surface.
#[derive(Debug)]
pub struct Surface {
	handle: SurfaceHandle,
	persistent_id: SurfaceId,
	chrome: ChromeLevel,
	state: Mutex<SurfaceState>,
	notifier: Notifier,
}

impl Surface {
	pub fn new(
		handle: SurfaceHandle,
		owner: SessionHandle,
		persistent_id: SurfaceId,
		title: impl Into<String>,
		chrome: ChromeLevel,
		notifier: Notifier,
	) -> Self {
		Self {
			handle,
			persistent_id,
			chrome,
			state: Mutex::new(SurfaceState {
				owner,
				live: true,
				first_frame_drawn: false,
				frame_dropper_running: true,
				presentation: PresentationState::Restored,
				focused: false,
				title: title.into(),
				frames: FrameStats::default(),
			}),
			notifier,
		}
	}

	pub fn handle(&self) -> SurfaceHandle {
		self.handle
	}

	pub fn persistent_id(&self) -> &SurfaceId {
		&self.persistent_id
	}

	pub fn chrome(&self) -> ChromeLevel {
		self.chrome
	}

	/// Session currently owning this surface.
	pub fn owner(&self) -> SessionHandle {
		self.state.lock().owner
	}

	pub(crate) fn set_owner(&self, owner: SessionHandle) {
		self.state.lock().owner = owner;
	}

	pub fn live(&self) -> bool {
		self.state.lock().live
	}

	pub fn first_frame_drawn(&self) -> bool {
		self.state.lock().first_frame_drawn
	}

	pub fn frame_dropper_running(&self) -> bool {
		self.state.lock().frame_dropper_running
	}

	pub fn presentation(&self) -> PresentationState {
		self.state.lock().presentation
	}

	pub fn focused(&self) -> bool {
		self.state.lock().focused
	}

	pub fn title(&self) -> String {
		self.state.lock().title.clone()
	}

	pub fn frame_stats(&self) -> FrameStats {
		self.state.lock().frames
	}

	/// Flips `live` to false, dropping focus first. Returns `false` if it already was released.
	pub fn mark_released(&self) -> bool {
		let was_focused = {
			let mut state = self.state.lock();
			if !state.live {
				return false;
			}
			state.live = false;
			state.frames.pending = 0;
			std::mem::replace(&mut state.focused, false)
		};

		debug!(target = "shellmir.surface", surface = %self.handle, "released");
		if was_focused {
			self.notifier.emit(ShellNotification::SurfaceFocusChanged {
				surface: self.handle,
				focused: false,
			});
		}
		self.notifier.emit(ShellNotification::SurfaceLiveChanged {
			surface: self.handle,
			live: false,
		});
		true
	}

	/// Handles a buffer-ready signal from the compositor.
	pub fn frame_ready(&self) {
		let mut state = self.state.lock();
		if !state.live {
			trace!(target = "shellmir.surface", surface = %self.handle, "frame on released surface ignored");
			return;
		}
		if state.frame_dropper_running {
			state.frames.dropped += 1;
		} else {
			state.frames.pending = state.frames.pending.saturating_add(1);
		}
	}

	/// Render callback from the toolkit.
	pub fn render(&self) -> RenderOutcome {
		let first_frame = {
			let mut state = self.state.lock();
			if !state.live {
				return RenderOutcome::Released;
			}
			if state.frames.pending == 0 {
				return RenderOutcome::NoFrame;
			}
			state.frames.pending = 0;
			state.frames.rendered += 1;
			!std::mem::replace(&mut state.first_frame_drawn, true)
		};

		if first_frame {
			self.notify_first_frame();
		}
		RenderOutcome::Drawn { first_frame }
	}

	/// Marks the first frame as drawn without a compositor frame.
	///
	/// Returns `true` only on the call that actually flipped the gate.
	pub fn draw_first_frame(&self) -> bool {
		{
			let mut state = self.state.lock();
			if !state.live || state.first_frame_drawn {
				return false;
			}
			state.first_frame_drawn = true;
		}
		self.notify_first_frame();
		true
	}

	/// Resumes draining frame-ready signals. Pending frames count as dropped.
	pub fn start_frame_dropper(&self) -> bool {
		{
			let mut state = self.state.lock();
			if !state.live || state.frame_dropper_running {
				return false;
			}
			state.frame_dropper_running = true;
			let pending = std::mem::take(&mut state.frames.pending);
			state.frames.dropped += u64::from(pending);
		}
		self.notify_frame_dropper(true);
		true
	}

	/// Stops draining so frames queue for the next render.
	pub fn stop_frame_dropper(&self) -> bool {
		{
			let mut state = self.state.lock();
			if !state.live || !state.frame_dropper_running {
				return false;
			}
			state.frame_dropper_running = false;
		}
		self.notify_frame_dropper(false);
		true
	}

	pub fn request_presentation(&self, presentation: PresentationState) -> bool {
		{
			let mut state = self.state.lock();
			if !state.live || state.presentation == presentation {
				return false;
			}
			state.presentation = presentation;
		}
		self.notifier.emit(ShellNotification::SurfacePresentationChanged {
			surface: self.handle,
			state: presentation,
		});
		true
	}

	pub fn set_focused(&self, focused: bool) -> bool {
		{
			let mut state = self.state.lock();
			if !state.live || state.focused == focused {
				return false;
			}
			state.focused = focused;
		}
		self.notifier.emit(ShellNotification::SurfaceFocusChanged {
			surface: self.handle,
			focused,
		});
		true
	}

	pub fn set_title(&self, title: &str) -> bool {
		{
			let mut state = self.state.lock();
			if !state.live || state.title == title {
				return false;
			}
			state.title = title.to_string();
		}
		self.notifier.emit(ShellNotification::SurfaceTitleChanged {
			surface: self.handle,
			title: title.to_string(),
		});
		true
	}

	/// Binds a compositor buffer for drawing.
	///
	/// Fails synchronously when the buffer has no texture capability; the
	/// caller is expected to skip that frame.
	pub fn bind_texture(&self, buffer: &BufferInfo) -> Result<TextureBinding> {
		if !self.live() {
			return Err(Error::SurfaceReleased(self.handle));
		}
		if !buffer.texture_capable {
			return Err(Error::BufferBinding {
				surface: self.handle,
				reason: "buffer has no texture capability".to_string(),
			});
		}
		if buffer.width == 0 || buffer.height == 0 {
			return Err(Error::BufferBinding {
				surface: self.handle,
				reason: format!("empty buffer {}x{}", buffer.width, buffer.height),
			});
		}

		Ok(TextureBinding {
			surface: self.handle,
			width: buffer.width,
			height: buffer.height,
		})
	}

	fn notify_first_frame(&self) {
		debug!(target = "shellmir.surface", surface = %self.handle, "first frame drawn");
		self.notifier.emit(ShellNotification::SurfaceFirstFrameDrawn { surface: self.handle });
	}

	fn notify_frame_dropper(&self, running: bool) {
		trace!(target = "shellmir.surface", surface = %self.handle, running, "frame dropper toggled");
		self.notifier.emit(ShellNotification::SurfaceFrameDropperChanged {
			surface: self.handle,
			running,
		});
	}
}

impl SurfaceInterface for Surface {
	fn handle(&self) -> SurfaceHandle {
		Surface::handle(self)
	}

	fn live(&self) -> bool {
		Surface::live(self)
	}

	fn presentation(&self) -> PresentationState {
		Surface::presentation(self)
	}

	fn frame_dropper_running(&self) -> bool {
		Surface::frame_dropper_running(self)
	}

	fn draw_first_frame(&self) -> bool {
		Surface::draw_first_frame(self)
	}

	fn start_frame_dropper(&self) -> bool {
		Surface::start_frame_dropper(self)
	}

	fn stop_frame_dropper(&self) -> bool {
		Surface::stop_frame_dropper(self)
	}
}
