//! Ownership of sessions and the surface -> session index.
//!
//! `ApplicationManager` is the authority on which sessions exist. It owns every
//! [`Session`] and keeps the shared [`SessionRegistry`] in sync with it.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use serde::Serialize;
use shellmir_protocol::{
	ChromeLevel, PresentationState, SessionHandle, SessionState, ShellNotification, SurfaceHandle, SurfaceId,
};
use tracing::{debug, warn};

use crate::notify::Notifier;
use crate::registry::SessionRegistry;
use crate::session::Session;
use crate::surface::Surface;

/// Serializable view of every session, ordered by handle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShellSnapshot {
	pub sessions: Vec<SessionSnapshot>,
	pub wakelock_enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
	pub session: SessionHandle,
	pub pid: u32,
	pub app_id: String,
	pub state: SessionState,
	pub surfaces: Vec<SurfaceSnapshot>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SurfaceSnapshot {
	pub surface: SurfaceHandle,
	pub persistent_id: SurfaceId,
	pub title: String,
	pub chrome: ChromeLevel,
	pub live: bool,
	pub first_frame_drawn: bool,
	pub frame_dropper_running: bool,
	pub presentation: PresentationState,
	pub focused: bool,
}

impl SurfaceSnapshot {
	fn of(surface: &Surface) -> Self {
		Self {
			surface: surface.handle(),
			persistent_id: surface.persistent_id().clone(),
			title: surface.title(),
			chrome: surface.chrome(),
			live: surface.live(),
			first_frame_drawn: surface.first_frame_drawn(),
			frame_dropper_running: surface.frame_dropper_running(),
			presentation: surface.presentation(),
			focused: surface.focused(),
		}
	}
}

pub struct ApplicationManager {
	sessions: BTreeMap<SessionHandle, Arc<Session>>,
	surface_owners: HashMap<SurfaceHandle, SessionHandle>,
	registry: Arc<SessionRegistry>,
	notifier: Notifier,
}

impl ApplicationManager {
	pub fn new(registry: Arc<SessionRegistry>, notifier: Notifier) -> Self {
		Self {
			sessions: BTreeMap::new(),
			surface_owners: HashMap::new(),
			registry,
			notifier,
		}
	}

	pub fn registry(&self) -> &Arc<SessionRegistry> {
		&self.registry
	}

	pub fn notifier(&self) -> &Notifier {
		&self.notifier
	}

	/// Creates the session for a compositor handle.
	///
	/// A repeated handle returns the existing session unchanged.
	pub fn add_session(&mut self, handle: SessionHandle, pid: u32, app_id: &str) -> Arc<Session> {
		if let Some(existing) = self.sessions.get(&handle) {
			warn!(target = "shellmir.session", session = %handle, "compositor reported an existing session again");
			return Arc::clone(existing);
		}

		let session = Arc::new(Session::new(handle, pid, app_id, self.notifier.clone()));
		self.registry.register(&session);
		self.sessions.insert(handle, Arc::clone(&session));
		debug!(target = "shellmir.session", session = %handle, pid, app_id, "session added");
		self.notifier.emit(ShellNotification::SessionAdded {
			session: handle,
			app_id: app_id.to_string(),
		});
		session
	}

	/// Stops and forgets a session, releasing all of its surfaces.
	pub fn remove_session(&mut self, handle: SessionHandle) -> Option<Arc<Session>> {
		let session = self.sessions.remove(&handle)?;
		session.stop();
		for surface in session.release_surfaces() {
			self.surface_owners.remove(&surface.handle());
		}
		self.registry.unregister(handle);
		debug!(target = "shellmir.session", session = %handle, "session removed");
		self.notifier.emit(ShellNotification::SessionRemoved { session: handle });
		Some(session)
	}

	pub fn session(&self, handle: SessionHandle) -> Option<Arc<Session>> {
		self.sessions.get(&handle).cloned()
	}

	pub fn sessions(&self) -> impl Iterator<Item = &Arc<Session>> {
		self.sessions.values()
	}

	pub fn session_count(&self) -> usize {
		self.sessions.len()
	}

	/// Creates a surface under `session`.
	///
	/// Returns `None` when the session is unknown or already stopped, or when
	/// the handle is already in use.
	pub fn add_surface(
		&mut self,
		handle: SurfaceHandle,
		session: SessionHandle,
		persistent_id: SurfaceId,
		title: &str,
		chrome: ChromeLevel,
	) -> Option<Arc<Surface>> {
		if self.surface_owners.contains_key(&handle) {
			warn!(target = "shellmir.surface", surface = %handle, "surface handle reused; ignoring creation");
			return None;
		}
		let Some(owner) = self.sessions.get(&session) else {
			debug!(target = "shellmir.surface", surface = %handle, %session, "surface for unknown session ignored");
			return None;
		};
		if owner.state().is_terminal() {
			debug!(target = "shellmir.surface", surface = %handle, %session, "surface for stopped session ignored");
			return None;
		}

		let surface = Arc::new(Surface::new(handle, session, persistent_id, title, chrome, self.notifier.clone()));
		owner.adopt_surface(Arc::clone(&surface));
		self.surface_owners.insert(handle, session);
		debug!(target = "shellmir.surface", surface = %handle, %session, "surface added");
		self.notifier.emit(ShellNotification::SurfaceAdded { surface: handle, session });
		Some(surface)
	}

	/// Releases and detaches a surface. Returns its former owner and the surface.
	pub fn remove_surface(&mut self, handle: SurfaceHandle) -> Option<(Arc<Session>, Arc<Surface>)> {
		let owner = self.surface_owners.remove(&handle)?;
		let session = self.sessions.get(&owner).cloned()?;
		let surface = session.take_surface(handle)?;
		surface.mark_released();
		Some((session, surface))
	}

	pub fn surface(&self, handle: SurfaceHandle) -> Option<Arc<Surface>> {
		self.owner_of(handle)?.surface(handle)
	}

	pub fn owner_of(&self, handle: SurfaceHandle) -> Option<Arc<Session>> {
		let owner = self.surface_owners.get(&handle)?;
		self.sessions.get(owner).cloned()
	}

	/// Moves a live surface to another session.
	pub fn reparent_surface(&mut self, handle: SurfaceHandle, new_owner: SessionHandle) -> bool {
		let Some(target) = self.sessions.get(&new_owner).cloned() else {
			return false;
		};
		if target.state().is_terminal() {
			return false;
		}
		let Some(current) = self.owner_of(handle) else {
			return false;
		};
		if current.handle() == new_owner {
			return true;
		}
		let Some(surface) = current.take_surface(handle) else {
			return false;
		};

		target.adopt_surface(surface);
		self.surface_owners.insert(handle, new_owner);
		debug!(target = "shellmir.surface", surface = %handle, from = %current.handle(), to = %new_owner, "surface reparented");
		true
	}

	/// Stops every session and clears the manager.
	pub fn remove_all(&mut self) -> Vec<Arc<Session>> {
		let handles: Vec<_> = self.sessions.keys().copied().collect();
		handles.into_iter().filter_map(|handle| self.remove_session(handle)).collect()
	}

	pub fn snapshot(&self, wakelock_enabled: bool) -> ShellSnapshot {
		let sessions = self
			.sessions
			.values()
			.map(|session| {
				let mut surfaces: Vec<_> = session.surfaces().iter().map(|s| SurfaceSnapshot::of(s)).collect();
				surfaces.sort_by_key(|s| s.surface);
				SessionSnapshot {
					session: session.handle(),
					pid: session.pid(),
					app_id: session.app_id().to_string(),
					state: session.state(),
					surfaces,
				}
			})
			.collect();
		ShellSnapshot { sessions, wakelock_enabled }
	}
}

impl std::fmt::Debug for ApplicationManager {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("ApplicationManager")
			.field("sessions", &self.sessions.len())
			.field("surfaces", &self.surface_owners.len())
			.finish()
	}
}
