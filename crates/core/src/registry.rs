//! Handle -> session lookup.
//!
//! The registry is a derived index: it holds weak references and never decides
//! whether a session exists. [`ApplicationManager`](crate::ApplicationManager)
//! owns sessions and is the only writer.

use std::collections::HashMap;
use std::sync::{Arc, Weak};

use parking_lot::RwLock;
use shellmir_protocol::SessionHandle;

use crate::session::Session;

#[derive(Debug, Default)]
pub struct SessionRegistry {
	entries: RwLock<HashMap<SessionHandle, Weak<Session>>>,
}

impl SessionRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	/// Resolves a compositor handle.
	///
	/// `None` is an expected answer during startup and teardown races.
	pub fn find(&self, handle: SessionHandle) -> Option<Arc<Session>> {
		self.entries.read().get(&handle).and_then(Weak::upgrade)
	}

	pub fn find_by_pid(&self, pid: u32) -> Option<Arc<Session>> {
		self.entries.read().values().filter_map(Weak::upgrade).find(|session| session.pid() == pid)
	}

	pub fn register(&self, session: &Arc<Session>) {
		self.entries.write().insert(session.handle(), Arc::downgrade(session));
	}

	/// Returns `false` if the handle was not registered.
	pub fn unregister(&self, handle: SessionHandle) -> bool {
		self.entries.write().remove(&handle).is_some()
	}

	/// Number of registered handles, including ones whose session is already gone.
	pub fn len(&self) -> usize {
		self.entries.read().len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.read().is_empty()
	}
}
