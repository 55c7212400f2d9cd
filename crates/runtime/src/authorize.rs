//! Session authorization decisions.
//!
//! The compositor asks before accepting a new client connection and blocks
//! until the UI context answers.

use std::collections::HashSet;

use tracing::debug;

use crate::config::LifecycleConfig;
use crate::process;

pub trait Authorizer: Send {
	fn authorize(&self, pid: u32, app_id: &str) -> bool;
}

impl<F> Authorizer for F
where
	F: Fn(u32, &str) -> bool + Send,
{
	fn authorize(&self, pid: u32, app_id: &str) -> bool {
		self(pid, app_id)
	}
}

/// Default authorizer driven by [`LifecycleConfig`].
#[derive(Debug, Clone, Default)]
pub struct PolicyAuthorizer {
	denied: HashSet<String>,
	require_live_process: bool,
}

impl PolicyAuthorizer {
	pub fn from_config(config: &LifecycleConfig) -> Self {
		Self {
			denied: config.deny_app_ids.iter().cloned().collect(),
			require_live_process: config.require_live_process,
		}
	}
}

impl Authorizer for PolicyAuthorizer {
	fn authorize(&self, pid: u32, app_id: &str) -> bool {
		if self.denied.contains(app_id) {
			debug!(target = "shellmir.coordinator", pid, app_id, "application is denied");
			return false;
		}
		if self.require_live_process && !process::pid_is_alive(pid) {
			debug!(target = "shellmir.coordinator", pid, app_id, "process is not alive");
			return false;
		}
		true
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn default_policy_allows_everyone() {
		assert!(PolicyAuthorizer::default().authorize(0, "anything"));
	}

	#[test]
	fn denied_apps_are_refused() {
		let config = LifecycleConfig {
			deny_app_ids: vec!["rogue".to_string()],
			..Default::default()
		};
		let authorizer = PolicyAuthorizer::from_config(&config);
		assert!(!authorizer.authorize(10, "rogue"));
		assert!(authorizer.authorize(10, "dialer"));
	}

	#[cfg(unix)]
	#[test]
	fn live_process_requirement_checks_pid() {
		let config = LifecycleConfig {
			require_live_process: true,
			..Default::default()
		};
		let authorizer = PolicyAuthorizer::from_config(&config);
		assert!(authorizer.authorize(std::process::id(), "self"));
		assert!(!authorizer.authorize(0, "ghost"));
	}

	#[test]
	fn closures_are_authorizers() {
		let only_even = |pid: u32, _: &str| pid % 2 == 0;
		assert!(only_even.authorize(4, "a"));
		assert!(!only_even.authorize(5, "a"));
	}
}
