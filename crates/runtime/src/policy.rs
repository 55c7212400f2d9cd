//! Frame-dropper policy for surfaces of suspended sessions.
//!
//! The coordinator calls these hooks on session transitions. Whether
//! suspended clients get throttled is a configuration choice.

use std::collections::HashSet;

use shellmir::protocol::{SessionState, SurfaceHandle};
use shellmir::{SessionInterface, SurfaceInterface};
use tracing::debug;

pub trait SurfacePolicy: Send {
	/// The owning session reached Suspended, or a surface appeared on (or moved to) a suspended session.
	fn session_suspended(&mut self, _session: &dyn SessionInterface, _surface: &dyn SurfaceInterface) {}

	/// The owning session is Running again, or the surface moved to a running session.
	fn session_resumed(&mut self, _session: &dyn SessionInterface, _surface: &dyn SurfaceInterface) {}

	fn surface_removed(&mut self, _surface: SurfaceHandle) {}
}

/// Leaves frame dropping alone.
#[derive(Debug, Default, Clone, Copy)]
pub struct KeepCompositing;

impl SurfacePolicy for KeepCompositing {}

/// Stops the frame dropper of suspended surfaces and restarts only the ones it stopped.
#[derive(Debug, Default)]
pub struct ThrottleSuspended {
	throttled: HashSet<SurfaceHandle>,
}

impl ThrottleSuspended {
	pub fn is_throttled(&self, surface: SurfaceHandle) -> bool {
		self.throttled.contains(&surface)
	}
}

impl SurfacePolicy for ThrottleSuspended {
	fn session_suspended(&mut self, session: &dyn SessionInterface, surface: &dyn SurfaceInterface) {
		if session.state() != SessionState::Suspended {
			return;
		}
		if surface.stop_frame_dropper() {
			debug!(target = "shellmir.coordinator", session = %session.handle(), surface = %surface.handle(), "throttling suspended surface");
			self.throttled.insert(surface.handle());
		}
	}

	fn session_resumed(&mut self, session: &dyn SessionInterface, surface: &dyn SurfaceInterface) {
		if session.state() != SessionState::Running {
			return;
		}
		if self.throttled.remove(&surface.handle()) {
			surface.start_frame_dropper();
		}
	}

	fn surface_removed(&mut self, surface: SurfaceHandle) {
		self.throttled.remove(&surface);
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use shellmir::protocol::{ChromeLevel, SessionHandle, SurfaceId};
	use shellmir::{Notifier, Session, Surface};

	fn surface(raw: u64) -> Surface {
		Surface::new(SurfaceHandle(raw), SessionHandle(1), SurfaceId::from("s"), "", ChromeLevel::Normal, Notifier::disconnected())
	}

	fn session_in(state: SessionState) -> Session {
		let session = Session::new(SessionHandle(1), 10, "browser", Notifier::disconnected());
		session.mark_running();
		match state {
			SessionState::Suspended => {
				session.suspend();
				session.confirm_suspended();
			}
			SessionState::Stopped => {
				session.stop();
			}
			_ => {}
		}
		session
	}

	#[test]
	fn keep_compositing_never_touches_the_dropper() {
		let s = surface(1);
		let mut policy = KeepCompositing;
		policy.session_suspended(&session_in(SessionState::Suspended), &s);
		assert!(s.frame_dropper_running());
	}

	#[test]
	fn throttle_round_trip() {
		let s = surface(1);
		let mut policy = ThrottleSuspended::default();
		policy.session_suspended(&session_in(SessionState::Suspended), &s);
		assert!(!s.frame_dropper_running());
		assert!(policy.is_throttled(SurfaceHandle(1)));

		policy.session_resumed(&session_in(SessionState::Running), &s);
		assert!(s.frame_dropper_running());
		assert!(!policy.is_throttled(SurfaceHandle(1)));
	}

	#[test]
	fn hooks_ignore_sessions_in_other_states() {
		let s = surface(3);
		let mut policy = ThrottleSuspended::default();
		policy.session_suspended(&session_in(SessionState::Running), &s);
		assert!(s.frame_dropper_running(), "running session is not throttled");

		policy.session_suspended(&session_in(SessionState::Suspended), &s);
		policy.session_resumed(&session_in(SessionState::Stopped), &s);
		assert!(!s.frame_dropper_running(), "stopped session does not restart the dropper");
		assert!(policy.is_throttled(SurfaceHandle(3)));
	}

	#[test]
	fn resume_leaves_shell_stopped_droppers_alone() {
		let s = surface(2);
		s.stop_frame_dropper();
		let mut policy = ThrottleSuspended::default();

		policy.session_suspended(&session_in(SessionState::Suspended), &s);
		policy.session_resumed(&session_in(SessionState::Running), &s);
		assert!(!s.frame_dropper_running(), "dropper was stopped by the shell, not the policy");
	}
}
