//! Shared wake lock keyed by owner identity.
//!
//! Owners are kept in a set rather than counted, so a duplicate acquire from
//! the same owner cannot cause an early release later. Only the empty <->
//! non-empty crossings reach the power backend and the shell.

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use shellmir_protocol::{SessionHandle, ShellNotification};
use tracing::{info, trace, warn};

use crate::error::Result;
use crate::notify::Notifier;

/// Identity of a wake lock holder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OwnerToken {
	Session(SessionHandle),
	/// Any other holder, e.g. a shell component playing media.
	Client(u64),
}

impl OwnerToken {
	/// Allocates a client token that compares unequal to every other token.
	pub fn new_client() -> Self {
		static NEXT_CLIENT: AtomicU64 = AtomicU64::new(1);
		Self::Client(NEXT_CLIENT.fetch_add(1, Ordering::Relaxed))
	}
}

impl From<SessionHandle> for OwnerToken {
	fn from(handle: SessionHandle) -> Self {
		Self::Session(handle)
	}
}

/// The platform facility that actually keeps the device awake.
pub trait PowerBackend: Send + Sync {
	fn acquire(&self) -> Result<()>;
	fn release(&self) -> Result<()>;
}

/// Backend that only records edges in the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingPowerBackend;

impl PowerBackend for LoggingPowerBackend {
	fn acquire(&self) -> Result<()> {
		info!(target = "shellmir.wakelock", "display wake lock acquired");
		Ok(())
	}

	fn release(&self) -> Result<()> {
		info!(target = "shellmir.wakelock", "display wake lock released");
		Ok(())
	}
}

pub struct WakeLock {
	owners: Mutex<HashSet<OwnerToken>>,
	/// State last pushed to the backend. Held across the backend call so
	/// edges from concurrent callers are applied one at a time, in order.
	applied: Mutex<bool>,
	backend: Arc<dyn PowerBackend>,
	notifier: Notifier,
}

impl WakeLock {
	pub fn new(backend: Arc<dyn PowerBackend>, notifier: Notifier) -> Self {
		Self {
			owners: Mutex::new(HashSet::new()),
			applied: Mutex::new(false),
			backend,
			notifier,
		}
	}

	/// Adds `owner`. Returns `false` if it already held the lock.
	pub fn acquire(&self, owner: impl Into<OwnerToken>) -> bool {
		let owner = owner.into();
		if !self.owners.lock().insert(owner) {
			return false;
		}

		trace!(target = "shellmir.wakelock", ?owner, "owner acquired");
		self.sync_backend();
		true
	}

	/// Removes `owner`. Returns `false` if it was not holding the lock.
	pub fn release(&self, owner: impl Into<OwnerToken>) -> bool {
		let owner = owner.into();
		if !self.owners.lock().remove(&owner) {
			return false;
		}

		trace!(target = "shellmir.wakelock", ?owner, "owner released");
		self.sync_backend();
		true
	}

	/// Drops every owner at once.
	pub fn release_all(&self) {
		self.owners.lock().clear();
		self.sync_backend();
	}

	pub fn enabled(&self) -> bool {
		!self.owners.lock().is_empty()
	}

	pub fn is_held_by(&self, owner: impl Into<OwnerToken>) -> bool {
		self.owners.lock().contains(&owner.into())
	}

	pub fn holders(&self) -> usize {
		self.owners.lock().len()
	}

	/// Brings the backend in line with the owner set.
	///
	/// The wanted state is read after `applied` is taken, so a caller that
	/// waited behind a slower edge sees the latest owner set and never pushes
	/// a stale one. Crossings that cancel out while waiting produce no edge.
	fn sync_backend(&self) {
		let mut applied = self.applied.lock();
		let wanted = !self.owners.lock().is_empty();
		if *applied == wanted {
			return;
		}

		let result = if wanted { self.backend.acquire() } else { self.backend.release() };
		if let Err(err) = result {
			warn!(target = "shellmir.wakelock", enabled = wanted, error = %err, "power backend failed");
		}
		*applied = wanted;
		self.notifier.emit(ShellNotification::WakeLockEnabledChanged { enabled: wanted });
	}
}

impl Drop for WakeLock {
	fn drop(&mut self) {
		self.release_all();
	}
}

impl std::fmt::Debug for WakeLock {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("WakeLock").field("holders", &self.holders()).finish()
	}
}
