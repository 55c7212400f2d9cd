//! Persistent window identity.
//!
//! Applications keep the [`SurfaceId`] of their windows and present it again
//! after a restart; the store maps it back onto the new compositor handle.

use std::collections::HashMap;

use parking_lot::Mutex;
use shellmir_protocol::{SurfaceHandle, SurfaceId};

/// Lookup-and-assign contract for persistent surface ids.
pub trait SurfaceIdStore: Send + Sync {
	/// Returns the id of `surface`, assigning a fresh one on first use.
	fn id_for(&self, surface: SurfaceHandle) -> SurfaceId;
	fn surface_for(&self, id: &SurfaceId) -> Option<SurfaceHandle>;
	/// Re-attaches a previously issued id to a new handle.
	fn associate(&self, id: SurfaceId, surface: SurfaceHandle);
	fn forget(&self, surface: SurfaceHandle);
}

#[derive(Debug, Default)]
struct IdMaps {
	next: u64,
	by_surface: HashMap<SurfaceHandle, SurfaceId>,
	by_id: HashMap<SurfaceId, SurfaceHandle>,
}

/// In-process store. Ids are `<prefix>-<n>`.
#[derive(Debug)]
pub struct MemorySurfaceIdStore {
	prefix: String,
	maps: Mutex<IdMaps>,
}

impl MemorySurfaceIdStore {
	pub fn new(prefix: impl Into<String>) -> Self {
		Self {
			prefix: prefix.into(),
			maps: Mutex::new(IdMaps::default()),
		}
	}
}

impl Default for MemorySurfaceIdStore {
	fn default() -> Self {
		Self::new("surface")
	}
}

impl SurfaceIdStore for MemorySurfaceIdStore {
	fn id_for(&self, surface: SurfaceHandle) -> SurfaceId {
		let mut maps = self.maps.lock();
		if let Some(id) = maps.by_surface.get(&surface) {
			return id.clone();
		}

		// Skip ids that were handed in through `associate`.
		let id = loop {
			maps.next += 1;
			let candidate = SurfaceId(format!("{}-{}", self.prefix, maps.next));
			if !maps.by_id.contains_key(&candidate) {
				break candidate;
			}
		};
		maps.by_surface.insert(surface, id.clone());
		maps.by_id.insert(id.clone(), surface);
		id
	}

	fn surface_for(&self, id: &SurfaceId) -> Option<SurfaceHandle> {
		self.maps.lock().by_id.get(id).copied()
	}

	fn associate(&self, id: SurfaceId, surface: SurfaceHandle) {
		let mut maps = self.maps.lock();
		if let Some(previous) = maps.by_surface.remove(&surface) {
			maps.by_id.remove(&previous);
		}
		if let Some(stale) = maps.by_id.insert(id.clone(), surface) {
			maps.by_surface.remove(&stale);
		}
		maps.by_surface.insert(surface, id);
	}

	fn forget(&self, surface: SurfaceHandle) {
		let mut maps = self.maps.lock();
		if let Some(id) = maps.by_surface.remove(&surface) {
			maps.by_id.remove(&id);
		}
	}
}
