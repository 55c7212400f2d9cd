//! Lifecycle and presentation states observed by the shell.

use std::fmt;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize};

/// Lifecycle state of an application session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
	/// Reported by the compositor but not yet activated by the shell.
	#[default]
	Starting,
	Running,
	/// Suspend requested; waiting for the compositor to confirm.
	Suspending,
	Suspended,
	/// Terminal.
	Stopped,
}

impl SessionState {
	/// Returns `true` for [`SessionState::Stopped`].
	pub fn is_terminal(self) -> bool {
		self == Self::Stopped
	}
}

impl fmt::Display for SessionState {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let name = match self {
			Self::Starting => "starting",
			Self::Running => "running",
			Self::Suspending => "suspending",
			Self::Suspended => "suspended",
			Self::Stopped => "stopped",
		};
		f.write_str(name)
	}
}

/// How a surface is presented by the shell.
///
/// Independent of liveness and frame readiness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PresentationState {
	#[default]
	Restored,
	Minimized,
	Maximized,
	Fullscreen,
	HorizMaximized,
	VertMaximized,
	Hidden,
}

/// Amount of shell decoration an application asked for.
///
/// Deserializes from its snake_case name or from the compositor's raw
/// integer hint (see [`ChromeLevel::from_raw`]). `NoChrome` has no raw value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChromeLevel {
	NoChrome,
	Low,
	#[default]
	Normal,
}

impl ChromeLevel {
	/// Raw compositor value for [`ChromeLevel::Normal`].
	pub const RAW_NORMAL: u32 = 0;
	/// Raw compositor value for [`ChromeLevel::Low`].
	pub const RAW_LOW: u32 = 1;

	/// Maps the compositor's raw chrome hint.
	///
	/// Unknown values fall back to [`ChromeLevel::Normal`], never to `Low`.
	pub fn from_raw(raw: u32) -> Self {
		match raw {
			Self::RAW_LOW => Self::Low,
			_ => Self::Normal,
		}
	}

	fn from_name(name: &str) -> Option<Self> {
		match name {
			"no_chrome" => Some(Self::NoChrome),
			"low" => Some(Self::Low),
			"normal" => Some(Self::Normal),
			_ => None,
		}
	}
}

impl<'de> Deserialize<'de> for ChromeLevel {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		struct ChromeVisitor;

		impl Visitor<'_> for ChromeVisitor {
			type Value = ChromeLevel;

			fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
				f.write_str("a chrome level name or raw chrome hint")
			}

			fn visit_str<E: de::Error>(self, value: &str) -> Result<ChromeLevel, E> {
				ChromeLevel::from_name(value).ok_or_else(|| E::unknown_variant(value, &["no_chrome", "low", "normal"]))
			}

			fn visit_u64<E: de::Error>(self, value: u64) -> Result<ChromeLevel, E> {
				Ok(u32::try_from(value).map(ChromeLevel::from_raw).unwrap_or_default())
			}

			fn visit_i64<E: de::Error>(self, value: i64) -> Result<ChromeLevel, E> {
				Ok(u32::try_from(value).map(ChromeLevel::from_raw).unwrap_or_default())
			}
		}

		deserializer.deserialize_any(ChromeVisitor)
	}
}
