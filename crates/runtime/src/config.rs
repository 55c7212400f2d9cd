//! Lifecycle policy configuration.
//!
//! Stored as camelCase JSON; every field is optional.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use shellmir::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LifecycleConfig {
	/// Stop frame dropping on the surfaces of suspended sessions, throttling their clients.
	pub throttle_suspended_surfaces: bool,
	/// Applications that ignore shell suspend requests.
	pub exempt_app_ids: Vec<String>,
	/// Hold the display wake lock for running sessions.
	pub wakelock: bool,
	/// Applications refused by the default authorizer.
	pub deny_app_ids: Vec<String>,
	/// Refuse sessions whose process is not alive on this host.
	pub require_live_process: bool,
}

impl Default for LifecycleConfig {
	fn default() -> Self {
		Self {
			throttle_suspended_surfaces: false,
			exempt_app_ids: Vec::new(),
			wakelock: true,
			deny_app_ids: Vec::new(),
			require_live_process: false,
		}
	}
}

impl LifecycleConfig {
	/// Loads and validates a config file.
	pub fn load(path: &Path) -> Result<Self> {
		let content = std::fs::read_to_string(path)?;
		let config: Self = serde_json::from_str(&content)?;
		config.validate()?;
		Ok(config)
	}

	pub fn validate(&self) -> Result<()> {
		if let Some(empty) = self.exempt_app_ids.iter().chain(&self.deny_app_ids).find(|id| id.trim().is_empty()) {
			return Err(Error::Config(format!("application id {empty:?} is blank")));
		}

		let exempt: HashSet<&str> = self.exempt_app_ids.iter().map(String::as_str).collect();
		if let Some(both) = self.deny_app_ids.iter().find(|id| exempt.contains(id.as_str())) {
			return Err(Error::Config(format!("{both} is both exempt and denied")));
		}
		Ok(())
	}

	pub fn is_exempt(&self, app_id: &str) -> bool {
		self.exempt_app_ids.iter().any(|id| id == app_id)
	}

	pub fn is_denied(&self, app_id: &str) -> bool {
		self.deny_app_ids.iter().any(|id| id == app_id)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::io::Write;

	#[test]
	fn missing_fields_take_defaults() {
		let config: LifecycleConfig = serde_json::from_str(r#"{"exemptAppIds": ["music-app"]}"#).unwrap();
		assert!(config.wakelock);
		assert!(!config.throttle_suspended_surfaces);
		assert!(config.is_exempt("music-app"));
		assert!(!config.is_exempt("camera-app"));
	}

	#[test]
	fn load_reads_camel_case_file() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		write!(file, r#"{{"throttleSuspendedSurfaces": true, "wakelock": false, "denyAppIds": ["rogue"]}}"#).unwrap();

		let config = LifecycleConfig::load(file.path()).unwrap();
		assert!(config.throttle_suspended_surfaces);
		assert!(!config.wakelock);
		assert!(config.is_denied("rogue"));
	}

	#[test]
	fn overlapping_lists_are_rejected() {
		let config = LifecycleConfig {
			exempt_app_ids: vec!["music-app".to_string()],
			deny_app_ids: vec!["music-app".to_string()],
			..Default::default()
		};
		assert!(matches!(config.validate(), Err(Error::Config(_))));
	}

	#[test]
	fn blank_ids_are_rejected() {
		let config = LifecycleConfig {
			exempt_app_ids: vec!["  ".to_string()],
			..Default::default()
		};
		assert!(matches!(config.validate(), Err(Error::Config(_))));
	}

	#[test]
	fn malformed_file_is_a_json_error() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		write!(file, "{{not json").unwrap();
		assert!(matches!(LifecycleConfig::load(file.path()), Err(Error::Json(_))));
	}
}
