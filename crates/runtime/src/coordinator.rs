//! UI-context lifecycle coordinator.
//!
//! Applies compositor events and shell commands to the session and surface
//! state machines, in queue order, and derives the side effects:
//!
//! - a session entering Running with at least one surface acquires the wake lock
//!   on its behalf; entering Suspended releases it
//! - a stopped session is torn down at once, releasing its surfaces and its hold
//!   on the wake lock
//! - surfaces only become eligible for drawing while their session is Running
//! - the [`SurfacePolicy`] decides what happens to frame dropping on suspension

use std::sync::Arc;

use shellmir::protocol::{BufferInfo, ChromeLevel, CompositorEvent, SessionHandle, SessionState, ShellCommand, SurfaceHandle, SurfaceId};
use shellmir::{
	ApplicationManager, Error, LifecycleOp, LoggingPowerBackend, MemorySurfaceIdStore, Notifier, PowerBackend, RenderOutcome, Result, Session,
	SessionRegistry, ShellSnapshot, SurfaceIdStore, TextureBinding, WakeLock,
};
use tracing::{debug, info, trace};

use crate::authorize::{Authorizer, PolicyAuthorizer};
use crate::bridge::{Envelope, UiReceiver};
use crate::config::LifecycleConfig;
use crate::policy::{KeepCompositing, SurfacePolicy, ThrottleSuspended};
use crate::process;

const UNKNOWN_APP_ID: &str = "unknown";

/// Builder for [`LifecycleCoordinator`]. Every collaborator has a default.
pub struct CoordinatorBuilder {
	config: LifecycleConfig,
	notifier: Notifier,
	registry: Option<Arc<SessionRegistry>>,
	backend: Option<Arc<dyn PowerBackend>>,
	surface_ids: Option<Arc<dyn SurfaceIdStore>>,
	authorizer: Option<Box<dyn Authorizer>>,
	policy: Option<Box<dyn SurfacePolicy>>,
}

impl CoordinatorBuilder {
	pub fn registry(mut self, registry: Arc<SessionRegistry>) -> Self {
		self.registry = Some(registry);
		self
	}

	pub fn power_backend(mut self, backend: Arc<dyn PowerBackend>) -> Self {
		self.backend = Some(backend);
		self
	}

	pub fn surface_ids(mut self, store: Arc<dyn SurfaceIdStore>) -> Self {
		self.surface_ids = Some(store);
		self
	}

	pub fn authorizer(mut self, authorizer: impl Authorizer + 'static) -> Self {
		self.authorizer = Some(Box::new(authorizer));
		self
	}

	pub fn policy(mut self, policy: impl SurfacePolicy + 'static) -> Self {
		self.policy = Some(Box::new(policy));
		self
	}

	pub fn build(self) -> LifecycleCoordinator {
		let registry = self.registry.unwrap_or_default();
		let backend: Arc<dyn PowerBackend> = match self.backend {
			Some(backend) => backend,
			None => Arc::new(LoggingPowerBackend),
		};
		let surface_ids: Arc<dyn SurfaceIdStore> = match self.surface_ids {
			Some(store) => store,
			None => Arc::new(MemorySurfaceIdStore::default()),
		};
		let authorizer: Box<dyn Authorizer> = match self.authorizer {
			Some(authorizer) => authorizer,
			None => Box::new(PolicyAuthorizer::from_config(&self.config)),
		};
		let policy: Box<dyn SurfacePolicy> = match self.policy {
			Some(policy) => policy,
			None if self.config.throttle_suspended_surfaces => Box::new(ThrottleSuspended::default()),
			None => Box::new(KeepCompositing),
		};

		LifecycleCoordinator {
			manager: ApplicationManager::new(registry, self.notifier.clone()),
			wakelock: Arc::new(WakeLock::new(backend, self.notifier)),
			surface_ids,
			authorizer,
			policy,
			focused: None,
			config: self.config,
		}
	}
}

/// Owner of all session and surface state on the UI context.
pub struct LifecycleCoordinator {
	config: LifecycleConfig,
	manager: ApplicationManager,
	wakelock: Arc<WakeLock>,
	surface_ids: Arc<dyn SurfaceIdStore>,
	authorizer: Box<dyn Authorizer>,
	policy: Box<dyn SurfacePolicy>,
	focused: Option<SurfaceHandle>,
}

impl LifecycleCoordinator {
	pub fn builder(config: LifecycleConfig, notifier: Notifier) -> CoordinatorBuilder {
		CoordinatorBuilder {
			config,
			notifier,
			registry: None,
			backend: None,
			surface_ids: None,
			authorizer: None,
			policy: None,
		}
	}

	pub fn config(&self) -> &LifecycleConfig {
		&self.config
	}

	pub fn manager(&self) -> &ApplicationManager {
		&self.manager
	}

	pub fn registry(&self) -> &Arc<SessionRegistry> {
		self.manager.registry()
	}

	pub fn wakelock(&self) -> &Arc<WakeLock> {
		&self.wakelock
	}

	pub fn surface_ids(&self) -> &Arc<dyn SurfaceIdStore> {
		&self.surface_ids
	}

	pub fn focused_surface(&self) -> Option<SurfaceHandle> {
		self.focused
	}

	/// Processes envelopes until every sender is dropped or a shutdown is requested.
	pub async fn run(mut self, mut rx: UiReceiver) {
		info!(target = "shellmir.coordinator", "lifecycle coordinator started");
		while let Some(envelope) = rx.recv().await {
			if !self.dispatch(envelope) {
				break;
			}
		}
		self.shutdown();
		info!(target = "shellmir.coordinator", "lifecycle coordinator stopped");
	}

	/// Processes whatever is queued right now without waiting.
	///
	/// Returns the number of envelopes handled.
	pub fn dispatch_pending(&mut self, rx: &mut UiReceiver) -> usize {
		let mut handled = 0;
		while let Some(envelope) = rx.try_recv() {
			handled += 1;
			if !self.dispatch(envelope) {
				break;
			}
		}
		handled
	}

	/// Returns `false` for a shutdown request.
	fn dispatch(&mut self, envelope: Envelope) -> bool {
		match envelope {
			Envelope::Compositor(event) => self.handle_event(event),
			Envelope::Authorize { pid, app_id, reply } => {
				let _ = reply.send(self.authorize(pid, &app_id));
			}
			Envelope::Shell(command) => self.handle_command(command),
			Envelope::BindTexture { surface, buffer, reply } => {
				let _ = reply.send(self.bind_texture(surface, &buffer));
			}
			Envelope::Snapshot { reply } => {
				let _ = reply.send(self.snapshot());
			}
			Envelope::Shutdown => return false,
		}
		true
	}

	pub fn authorize(&self, pid: u32, app_id: &str) -> bool {
		let authorized = self.authorizer.authorize(pid, app_id);
		info!(target = "shellmir.coordinator", pid, app_id, authorized, "session authorization");
		authorized
	}

	pub fn handle_event(&mut self, event: CompositorEvent) {
		trace!(target = "shellmir.coordinator", kind = event.kind(), "compositor event");
		match event {
			CompositorEvent::SessionCreated { session, pid, app_id } => {
				let app_id = resolve_app_id(self.manager.registry(), pid, app_id);
				self.manager.add_session(session, pid, &app_id);
			}
			CompositorEvent::SessionRemoved { session } => self.remove_session(session),
			CompositorEvent::SessionSuspended { session } => {
				self.transition(session, LifecycleOp::ConfirmSuspended);
			}
			CompositorEvent::SurfaceCreated {
				surface,
				session,
				title,
				chrome,
				persistent_id,
			} => self.add_surface(surface, session, &title, chrome, persistent_id),
			CompositorEvent::SurfaceRemoved { surface } => self.remove_surface(surface),
			CompositorEvent::SurfaceReparented { surface, session } => {
				self.reparent_surface(surface, session);
			}
			CompositorEvent::SurfaceRenamed { surface, title } => {
				if let Some(surface) = self.live_surface(surface) {
					surface.set_title(&title);
				}
			}
			CompositorEvent::FrameReady { surface } => {
				if let Some(surface) = self.manager.surface(surface) {
					surface.frame_ready();
				}
			}
		}
	}

	pub fn handle_command(&mut self, command: ShellCommand) {
		trace!(target = "shellmir.coordinator", ?command, "shell command");
		match command {
			ShellCommand::MarkRunning { session } => {
				self.mark_running(session);
			}
			ShellCommand::SuspendSession { session } => {
				self.suspend(session);
			}
			ShellCommand::ResumeSession { session } => {
				self.resume(session);
			}
			ShellCommand::StopSession { session } => {
				self.stop(session);
			}
			ShellCommand::FocusSurface { surface } => {
				self.focus(surface);
			}
			ShellCommand::RequestPresentation { surface, state } => {
				if let Some(surface) = self.live_surface(surface) {
					surface.request_presentation(state);
				}
			}
			ShellCommand::Render { surface } => {
				self.render(surface);
			}
			ShellCommand::StartFrameDropper { surface } => {
				if let Some(surface) = self.live_surface(surface) {
					surface.start_frame_dropper();
				}
			}
			ShellCommand::StopFrameDropper { surface } => {
				if let Some(surface) = self.live_surface(surface) {
					surface.stop_frame_dropper();
				}
			}
		}
	}

	pub fn mark_running(&mut self, session: SessionHandle) -> bool {
		self.transition(session, LifecycleOp::MarkRunning)
	}

	/// Requests a suspend. Exempt applications keep running.
	pub fn suspend(&mut self, session: SessionHandle) -> bool {
		let Some(target) = self.manager.session(session) else {
			debug!(target = "shellmir.coordinator", %session, "suspend for unknown session ignored");
			return false;
		};
		if self.config.is_exempt(target.app_id()) {
			debug!(target = "shellmir.coordinator", %session, app_id = target.app_id(), "application is exempt from suspension");
			return false;
		}
		self.transition(session, LifecycleOp::Suspend)
	}

	pub fn resume(&mut self, session: SessionHandle) -> bool {
		self.transition(session, LifecycleOp::Resume)
	}

	pub fn stop(&mut self, session: SessionHandle) -> bool {
		self.transition(session, LifecycleOp::Stop)
	}

	/// Forwards a render callback when the owning session is Running.
	///
	/// Returns `None` when the surface is unknown or not eligible for drawing.
	pub fn render(&self, surface: SurfaceHandle) -> Option<RenderOutcome> {
		let owner = self.manager.owner_of(surface)?;
		if owner.state() != SessionState::Running {
			trace!(target = "shellmir.coordinator", %surface, state = %owner.state(), "render skipped; session not running");
			return None;
		}
		let surface = owner.surface(surface)?;
		Some(surface.render())
	}

	/// Binds a compositor buffer to a texture. Never retried.
	pub fn bind_texture(&self, surface: SurfaceHandle, buffer: &BufferInfo) -> Result<TextureBinding> {
		self.manager.surface(surface).ok_or(Error::UnknownSurface(surface))?.bind_texture(buffer)
	}

	pub fn focus(&mut self, surface: SurfaceHandle) -> bool {
		let Some(target) = self.live_surface(surface) else {
			return false;
		};
		if let Some(previous) = self.focused.filter(|previous| *previous != surface) {
			if let Some(previous) = self.manager.surface(previous) {
				previous.set_focused(false);
			}
		}
		self.focused = Some(surface);
		target.set_focused(true)
	}

	pub fn snapshot(&self) -> ShellSnapshot {
		self.manager.snapshot(self.wakelock.enabled())
	}

	/// Stops every session and releases the wake lock.
	pub fn shutdown(&mut self) {
		let surfaces: Vec<_> = self.manager.sessions().flat_map(|s| s.surfaces()).map(|s| s.handle()).collect();
		let removed = self.manager.remove_all();
		for surface in surfaces {
			self.forget_surface(surface);
		}
		debug!(target = "shellmir.coordinator", sessions = removed.len(), "all sessions stopped");
		self.wakelock.release_all();
	}

	fn transition(&mut self, session: SessionHandle, op: LifecycleOp) -> bool {
		let Some(target) = self.manager.session(session) else {
			debug!(target = "shellmir.coordinator", %session, ?op, "request for unknown session ignored");
			return false;
		};
		if !target.apply(op) {
			return false;
		}
		if target.state().is_terminal() {
			self.remove_session(session);
		} else {
			self.after_transition(&target);
		}
		true
	}

	fn after_transition(&mut self, session: &Arc<Session>) {
		match session.state() {
			SessionState::Running => {
				if self.config.wakelock && session.surface_count() > 0 {
					self.wakelock.acquire(session.handle());
				}
				for surface in session.surfaces() {
					self.policy.session_resumed(&**session, &*surface);
				}
			}
			SessionState::Suspended => {
				self.wakelock.release(session.handle());
				for surface in session.surfaces() {
					self.policy.session_suspended(&**session, &*surface);
				}
			}
			SessionState::Starting | SessionState::Suspending | SessionState::Stopped => {}
		}
	}

	fn add_surface(&mut self, surface: SurfaceHandle, session: SessionHandle, title: &str, chrome: ChromeLevel, persistent_id: Option<SurfaceId>) {
		let id = match persistent_id {
			Some(id) => {
				self.surface_ids.associate(id.clone(), surface);
				id
			}
			None => self.surface_ids.id_for(surface),
		};

		let Some(created) = self.manager.add_surface(surface, session, id, title, chrome) else {
			self.surface_ids.forget(surface);
			return;
		};
		let Some(owner) = self.manager.session(session) else {
			return;
		};

		self.settle_moved_surface(&owner, &created);
	}

	/// Applies the owner's lifecycle to a surface that just joined it.
	fn settle_moved_surface(&mut self, owner: &Arc<Session>, surface: &Arc<shellmir::Surface>) {
		match owner.state() {
			SessionState::Running => {
				if self.config.wakelock {
					self.wakelock.acquire(owner.handle());
				}
				self.policy.session_resumed(&**owner, &**surface);
			}
			SessionState::Suspended => self.policy.session_suspended(&**owner, &**surface),
			_ => {}
		}
	}

	fn reparent_surface(&mut self, surface: SurfaceHandle, session: SessionHandle) -> bool {
		let Some(previous) = self.manager.owner_of(surface) else {
			debug!(target = "shellmir.coordinator", %surface, "reparent of unknown surface ignored");
			return false;
		};
		if previous.handle() == session {
			return true;
		}
		if !self.manager.reparent_surface(surface, session) {
			debug!(target = "shellmir.coordinator", %surface, %session, "reparent to unknown or stopped session ignored");
			return false;
		}
		let (Some(owner), Some(moved)) = (self.manager.session(session), self.manager.surface(surface)) else {
			return false;
		};

		self.settle_moved_surface(&owner, &moved);
		true
	}

	fn remove_surface(&mut self, surface: SurfaceHandle) {
		if self.manager.remove_surface(surface).is_none() {
			debug!(target = "shellmir.coordinator", %surface, "removal of unknown surface ignored");
			return;
		}
		self.forget_surface(surface);
	}

	fn remove_session(&mut self, session: SessionHandle) {
		let surfaces: Vec<_> = self
			.manager
			.session(session)
			.map(|s| s.surfaces().iter().map(|surface| surface.handle()).collect())
			.unwrap_or_default();
		let Some(removed) = self.manager.remove_session(session) else {
			debug!(target = "shellmir.coordinator", %session, "removal of unknown session ignored");
			return;
		};
		for surface in surfaces {
			self.forget_surface(surface);
		}
		self.wakelock.release(removed.handle());
	}

	fn forget_surface(&mut self, surface: SurfaceHandle) {
		self.surface_ids.forget(surface);
		self.policy.surface_removed(surface);
		if self.focused == Some(surface) {
			self.focused = None;
		}
	}

	fn live_surface(&self, surface: SurfaceHandle) -> Option<Arc<shellmir::Surface>> {
		let found = self.manager.surface(surface).filter(|s| s.live());
		if found.is_none() {
			debug!(target = "shellmir.coordinator", %surface, "stale surface handle ignored");
		}
		found
	}
}

/// Picks the app id for a new session: the reported one, then the one of a
/// session the same process already owns, then the launcher's `APP_ID`.
fn resolve_app_id(registry: &SessionRegistry, pid: u32, reported: String) -> String {
	if !reported.is_empty() {
		return reported;
	}
	if let Some(sibling) = registry.find_by_pid(pid) {
		return sibling.app_id().to_string();
	}
	process::launched_app_id(pid).unwrap_or_else(|| UNKNOWN_APP_ID.to_string())
}

#[cfg(test)]
mod tests {
	use super::*;
	use shellmir::NotificationReceiver;
	use shellmir::protocol::ShellNotification;

	fn coordinator(config: LifecycleConfig) -> (LifecycleCoordinator, NotificationReceiver) {
		let (notifier, rx) = Notifier::channel();
		(LifecycleCoordinator::builder(config, notifier).build(), rx)
	}

	fn drain(rx: &mut NotificationReceiver) -> Vec<ShellNotification> {
		std::iter::from_fn(|| rx.try_recv().ok()).collect()
	}

	fn session_created(raw: u64, app_id: &str) -> CompositorEvent {
		CompositorEvent::SessionCreated {
			session: SessionHandle(raw),
			pid: 4000 + raw as u32,
			app_id: app_id.to_string(),
		}
	}

	fn surface_created(raw: u64, session: u64) -> CompositorEvent {
		CompositorEvent::SurfaceCreated {
			surface: SurfaceHandle(raw),
			session: SessionHandle(session),
			title: String::new(),
			chrome: ChromeLevel::Normal,
			persistent_id: None,
		}
	}

	#[test]
	fn running_session_with_surface_holds_wakelock() {
		let (mut c, _rx) = coordinator(LifecycleConfig::default());
		c.handle_event(session_created(1, "dialer"));
		assert!(c.mark_running(SessionHandle(1)));
		assert!(!c.wakelock().enabled(), "no surface yet");

		c.handle_event(surface_created(10, 1));
		assert!(c.wakelock().is_held_by(SessionHandle(1)));

		assert!(c.suspend(SessionHandle(1)));
		assert!(c.wakelock().enabled(), "held while suspending");
		c.handle_event(CompositorEvent::SessionSuspended { session: SessionHandle(1) });
		assert!(!c.wakelock().enabled());

		assert!(c.resume(SessionHandle(1)));
		assert!(c.wakelock().enabled());
	}

	#[test]
	fn wakelock_can_be_disabled_by_config() {
		let config = LifecycleConfig {
			wakelock: false,
			..Default::default()
		};
		let (mut c, _rx) = coordinator(config);
		c.handle_event(session_created(1, "dialer"));
		c.handle_event(surface_created(10, 1));
		c.mark_running(SessionHandle(1));
		assert!(!c.wakelock().enabled());
	}

	#[test]
	fn exempt_apps_ignore_suspend() {
		let config = LifecycleConfig {
			exempt_app_ids: vec!["music".to_string()],
			..Default::default()
		};
		let (mut c, _rx) = coordinator(config);
		c.handle_event(session_created(1, "music"));
		c.mark_running(SessionHandle(1));
		assert!(!c.suspend(SessionHandle(1)));
		assert_eq!(c.manager().session(SessionHandle(1)).map(|s| s.state()), Some(SessionState::Running));
	}

	#[test]
	fn render_requires_running_owner() {
		let (mut c, mut rx) = coordinator(LifecycleConfig::default());
		c.handle_event(session_created(1, "camera"));
		c.handle_event(surface_created(10, 1));
		c.handle_command(ShellCommand::StopFrameDropper { surface: SurfaceHandle(10) });
		c.handle_event(CompositorEvent::FrameReady { surface: SurfaceHandle(10) });
		assert_eq!(c.render(SurfaceHandle(10)), None, "session still starting");

		c.mark_running(SessionHandle(1));
		assert_eq!(c.render(SurfaceHandle(10)), Some(RenderOutcome::Drawn { first_frame: true }));
		assert_eq!(c.render(SurfaceHandle(10)), Some(RenderOutcome::NoFrame));

		let first_frames = drain(&mut rx)
			.into_iter()
			.filter(|n| matches!(n, ShellNotification::SurfaceFirstFrameDrawn { .. }))
			.count();
		assert_eq!(first_frames, 1);
	}

	#[test]
	fn removing_session_releases_surfaces_and_lock() {
		let (mut c, mut rx) = coordinator(LifecycleConfig::default());
		c.handle_event(session_created(1, "dialer"));
		c.handle_event(surface_created(10, 1));
		c.mark_running(SessionHandle(1));
		let surface = c.manager().surface(SurfaceHandle(10)).expect("surface");
		assert!(c.focus(SurfaceHandle(10)));
		drain(&mut rx);

		c.handle_event(CompositorEvent::SessionRemoved { session: SessionHandle(1) });
		assert!(!surface.live());
		assert!(!c.wakelock().enabled());
		assert_eq!(c.focused_surface(), None);
		assert!(c.registry().find(SessionHandle(1)).is_none());

		let notes = drain(&mut rx);
		assert!(notes.contains(&ShellNotification::SessionStateChanged {
			session: SessionHandle(1),
			state: SessionState::Stopped,
		}));
		assert!(notes.contains(&ShellNotification::WakeLockEnabledChanged { enabled: false }));
		assert!(notes.contains(&ShellNotification::SessionRemoved { session: SessionHandle(1) }));
	}

	#[test]
	fn focus_moves_between_surfaces() {
		let (mut c, _rx) = coordinator(LifecycleConfig::default());
		c.handle_event(session_created(1, "dialer"));
		c.handle_event(surface_created(10, 1));
		c.handle_event(surface_created(11, 1));

		c.focus(SurfaceHandle(10));
		c.focus(SurfaceHandle(11));
		let first = c.manager().surface(SurfaceHandle(10)).expect("first");
		let second = c.manager().surface(SurfaceHandle(11)).expect("second");
		assert!(!first.focused());
		assert!(second.focused());
		assert!(!c.focus(SurfaceHandle(99)));
	}

	#[test]
	fn throttle_config_stops_suspended_droppers() {
		let config = LifecycleConfig {
			throttle_suspended_surfaces: true,
			..Default::default()
		};
		let (mut c, _rx) = coordinator(config);
		c.handle_event(session_created(1, "browser"));
		c.handle_event(surface_created(10, 1));
		c.mark_running(SessionHandle(1));
		let surface = c.manager().surface(SurfaceHandle(10)).expect("surface");

		c.suspend(SessionHandle(1));
		c.handle_event(CompositorEvent::SessionSuspended { session: SessionHandle(1) });
		assert!(!surface.frame_dropper_running());

		c.handle_event(surface_created(11, 1));
		let late = c.manager().surface(SurfaceHandle(11)).expect("late surface");
		assert!(!late.frame_dropper_running(), "new surfaces of a suspended session are throttled too");

		c.resume(SessionHandle(1));
		assert!(surface.frame_dropper_running());
		assert!(late.frame_dropper_running());
	}

	#[test]
	fn persistent_ids_survive_restart() {
		let (mut c, _rx) = coordinator(LifecycleConfig::default());
		c.handle_event(session_created(1, "notes"));
		c.handle_event(CompositorEvent::SurfaceCreated {
			surface: SurfaceHandle(20),
			session: SessionHandle(1),
			title: "Notes".to_string(),
			chrome: ChromeLevel::Low,
			persistent_id: Some(SurfaceId::from("notes-main")),
		});
		let surface = c.manager().surface(SurfaceHandle(20)).expect("surface");
		assert_eq!(surface.persistent_id(), &SurfaceId::from("notes-main"));
		assert_eq!(c.surface_ids().surface_for(&SurfaceId::from("notes-main")), Some(SurfaceHandle(20)));

		c.handle_event(CompositorEvent::SurfaceRemoved { surface: SurfaceHandle(20) });
		assert_eq!(c.surface_ids().surface_for(&SurfaceId::from("notes-main")), None);
	}

	#[test]
	fn surface_for_unknown_session_is_dropped() {
		let (mut c, _rx) = coordinator(LifecycleConfig::default());
		c.handle_event(surface_created(10, 7));
		assert!(c.manager().surface(SurfaceHandle(10)).is_none());
	}

	#[test]
	fn bind_texture_reports_unknown_surface() {
		let (c, _rx) = coordinator(LifecycleConfig::default());
		let buffer = BufferInfo {
			width: 10,
			height: 10,
			texture_capable: true,
		};
		assert!(matches!(c.bind_texture(SurfaceHandle(1), &buffer), Err(Error::UnknownSurface(_))));
	}

	#[test]
	fn stopping_a_session_tears_it_down() {
		let (mut c, mut rx) = coordinator(LifecycleConfig::default());
		c.handle_event(session_created(1, "dialer"));
		c.handle_event(surface_created(10, 1));
		c.mark_running(SessionHandle(1));
		c.focus(SurfaceHandle(10));
		let surface = c.manager().surface(SurfaceHandle(10)).expect("surface");
		drain(&mut rx);

		c.handle_command(ShellCommand::StopSession { session: SessionHandle(1) });
		assert!(c.manager().session(SessionHandle(1)).is_none());
		assert!(c.registry().find(SessionHandle(1)).is_none());
		assert!(!surface.live());
		assert!(!c.focus(SurfaceHandle(10)));
		assert_eq!(c.focused_surface(), None);
		assert!(!c.wakelock().enabled());

		let notes = drain(&mut rx);
		assert!(notes.contains(&ShellNotification::SurfaceFocusChanged {
			surface: SurfaceHandle(10),
			focused: false,
		}));
		assert!(notes.contains(&ShellNotification::SurfaceLiveChanged {
			surface: SurfaceHandle(10),
			live: false,
		}));
		assert!(notes.contains(&ShellNotification::SessionRemoved { session: SessionHandle(1) }));

		// The compositor's own removal arrives later and finds nothing left.
		c.handle_event(CompositorEvent::SessionRemoved { session: SessionHandle(1) });
		assert!(drain(&mut rx).is_empty());
	}

	#[test]
	fn reparenting_into_a_running_session_acquires_the_wakelock() {
		let (mut c, _rx) = coordinator(LifecycleConfig::default());
		c.handle_event(session_created(1, "launcher"));
		c.handle_event(session_created(2, "browser"));
		c.handle_event(surface_created(10, 1));
		c.mark_running(SessionHandle(2));
		assert!(!c.wakelock().enabled(), "running session without surfaces");

		c.handle_event(CompositorEvent::SurfaceReparented {
			surface: SurfaceHandle(10),
			session: SessionHandle(2),
		});
		assert_eq!(c.manager().owner_of(SurfaceHandle(10)).map(|s| s.handle()), Some(SessionHandle(2)));
		assert!(c.wakelock().is_held_by(SessionHandle(2)));
	}

	#[test]
	fn reparenting_follows_the_throttle_policy() {
		let config = LifecycleConfig {
			throttle_suspended_surfaces: true,
			..Default::default()
		};
		let (mut c, _rx) = coordinator(config);
		c.handle_event(session_created(1, "browser"));
		c.handle_event(session_created(2, "viewer"));
		c.handle_event(surface_created(10, 1));
		c.mark_running(SessionHandle(1));
		c.mark_running(SessionHandle(2));
		c.suspend(SessionHandle(1));
		c.handle_event(CompositorEvent::SessionSuspended { session: SessionHandle(1) });
		let surface = c.manager().surface(SurfaceHandle(10)).expect("surface");
		assert!(!surface.frame_dropper_running());

		c.handle_event(CompositorEvent::SurfaceReparented {
			surface: SurfaceHandle(10),
			session: SessionHandle(2),
		});
		assert!(surface.frame_dropper_running(), "moved to a running session");
	}

	#[test]
	fn reparenting_to_unknown_session_keeps_owner() {
		let (mut c, _rx) = coordinator(LifecycleConfig::default());
		c.handle_event(session_created(1, "launcher"));
		c.handle_event(surface_created(10, 1));
		c.handle_event(CompositorEvent::SurfaceReparented {
			surface: SurfaceHandle(10),
			session: SessionHandle(9),
		});
		assert_eq!(c.manager().owner_of(SurfaceHandle(10)).map(|s| s.handle()), Some(SessionHandle(1)));
	}

	#[test]
	fn missing_app_id_is_taken_from_a_sibling_session() {
		let (mut c, _rx) = coordinator(LifecycleConfig::default());
		c.handle_event(CompositorEvent::SessionCreated {
			session: SessionHandle(1),
			pid: 7100,
			app_id: "mail".to_string(),
		});
		c.handle_event(CompositorEvent::SessionCreated {
			session: SessionHandle(2),
			pid: 7100,
			app_id: String::new(),
		});
		assert_eq!(c.manager().session(SessionHandle(2)).map(|s| s.app_id().to_string()).as_deref(), Some("mail"));
	}

	#[test]
	fn shutdown_stops_everything() {
		let (mut c, _rx) = coordinator(LifecycleConfig::default());
		c.handle_event(session_created(1, "a"));
		c.handle_event(session_created(2, "b"));
		c.handle_event(surface_created(10, 1));
		c.mark_running(SessionHandle(1));

		c.shutdown();
		assert_eq!(c.manager().session_count(), 0);
		assert!(!c.wakelock().enabled());
		assert!(c.registry().is_empty());
	}
}
