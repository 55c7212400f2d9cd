//! Per-application lifecycle state machine.
//!
//! ```text
//! Starting --mark_running--> Running --suspend--> Suspending --confirm--> Suspended
//!                               ^                      |                      |
//!                               +-------resume---------+----------------------+
//! any non-Stopped --stop--> Stopped (terminal)
//! ```
//!
//! Requests from a state that has no matching edge are silent no-ops: lifecycle
//! requests routinely race with teardown of the process they target.

use std::sync::Arc;

use parking_lot::Mutex;
use shellmir_protocol::{SessionHandle, SessionState, ShellNotification, SurfaceHandle};
use tracing::{debug, trace};

use crate::notify::Notifier;
use crate::surface::Surface;

/// A lifecycle request against a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleOp {
	MarkRunning,
	Suspend,
	/// The compositor reports that a requested suspend completed.
	ConfirmSuspended,
	Resume,
	Stop,
}

impl LifecycleOp {
	/// State reached by applying `self` in `from`, or `None` when the edge does not exist.
	pub fn target(self, from: SessionState) -> Option<SessionState> {
		use SessionState::*;

		match (self, from) {
			(_, Stopped) => None,
			(Self::Stop, _) => Some(Stopped),
			(Self::MarkRunning, Starting) => Some(Running),
			(Self::Suspend, Running) => Some(Suspending),
			(Self::ConfirmSuspended, Suspending) => Some(Suspended),
			(Self::Resume, Suspending | Suspended) => Some(Running),
			_ => None,
		}
	}
}

/// Capability surface of a session as seen by shell policy code.
pub trait SessionInterface: Send + Sync {
	fn handle(&self) -> SessionHandle;
	fn state(&self) -> SessionState;
	fn mark_running(&self) -> bool;
	fn suspend(&self) -> bool;
	fn resume(&self) -> bool;
	fn stop(&self) -> bool;
}

/// Shell-side object for one compositor session.
///
/// Owns its surfaces exclusively. Every actual state change emits exactly one
/// [`ShellNotification::SessionStateChanged`].
#[derive(Debug)]
pub struct Session {
	handle: SessionHandle,
	pid: u32,
	app_id: String,
	state: Mutex<SessionState>,
	surfaces: Mutex<Vec<Arc<Surface>>>,
	notifier: Notifier,
}

impl Session {
	pub fn new(handle: SessionHandle, pid: u32, app_id: impl Into<String>, notifier: Notifier) -> Self {
		Self {
			handle,
			pid,
			app_id: app_id.into(),
			state: Mutex::new(SessionState::Starting),
			surfaces: Mutex::new(Vec::new()),
			notifier,
		}
	}

	pub fn handle(&self) -> SessionHandle {
		self.handle
	}

	pub fn pid(&self) -> u32 {
		self.pid
	}

	pub fn app_id(&self) -> &str {
		&self.app_id
	}

	pub fn state(&self) -> SessionState {
		*self.state.lock()
	}

	pub fn mark_running(&self) -> bool {
		self.apply(LifecycleOp::MarkRunning)
	}

	pub fn suspend(&self) -> bool {
		self.apply(LifecycleOp::Suspend)
	}

	pub fn confirm_suspended(&self) -> bool {
		self.apply(LifecycleOp::ConfirmSuspended)
	}

	pub fn resume(&self) -> bool {
		self.apply(LifecycleOp::Resume)
	}

	/// Always wins over an in-flight suspend or resume.
	pub fn stop(&self) -> bool {
		self.apply(LifecycleOp::Stop)
	}

	/// Applies `op` and returns whether the state changed.
	pub fn apply(&self, op: LifecycleOp) -> bool {
		let (from, to) = {
			let mut state = self.state.lock();
			let from = *state;
			match op.target(from) {
				Some(to) if to != from => {
					*state = to;
					(from, to)
				}
				_ => {
					trace!(target = "shellmir.session", session = %self.handle, ?op, state = %from, "request ignored");
					return false;
				}
			}
		};

		debug!(target = "shellmir.session", session = %self.handle, app_id = %self.app_id, %from, %to, "state changed");
		self.notifier.emit(ShellNotification::SessionStateChanged {
			session: self.handle,
			state: to,
		});
		true
	}

	/// Takes ownership of `surface`.
	pub fn adopt_surface(&self, surface: Arc<Surface>) {
		surface.set_owner(self.handle);
		let mut surfaces = self.surfaces.lock();
		if !surfaces.iter().any(|s| s.handle() == surface.handle()) {
			surfaces.push(surface);
		}
	}

	/// Gives up ownership of one surface without releasing it.
	pub fn take_surface(&self, handle: SurfaceHandle) -> Option<Arc<Surface>> {
		let mut surfaces = self.surfaces.lock();
		let index = surfaces.iter().position(|s| s.handle() == handle)?;
		Some(surfaces.remove(index))
	}

	pub fn surface(&self, handle: SurfaceHandle) -> Option<Arc<Surface>> {
		self.surfaces.lock().iter().find(|s| s.handle() == handle).cloned()
	}

	pub fn surfaces(&self) -> Vec<Arc<Surface>> {
		self.surfaces.lock().clone()
	}

	pub fn surface_count(&self) -> usize {
		self.surfaces.lock().len()
	}

	/// Drops every surface, marking each one released first.
	pub fn release_surfaces(&self) -> Vec<Arc<Surface>> {
		let surfaces = std::mem::take(&mut *self.surfaces.lock());
		for surface in &surfaces {
			surface.mark_released();
		}
		surfaces
	}
}

impl SessionInterface for Session {
	fn handle(&self) -> SessionHandle {
		Session::handle(self)
	}

	fn state(&self) -> SessionState {
		Session::state(self)
	}

	fn mark_running(&self) -> bool {
		Session::mark_running(self)
	}

	fn suspend(&self) -> bool {
		Session::suspend(self)
	}

	fn resume(&self) -> bool {
		Session::resume(self)
	}

	fn stop(&self) -> bool {
		Session::stop(self)
	}
}
