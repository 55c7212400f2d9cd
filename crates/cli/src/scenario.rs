//! Replay scripts.
//!
//! One JSON object per line, keyed by where the step enters the system:
//!
//! ```text
//! {"compositor": {"type": "session_created", "session": 1, "pid": 40, "app_id": "dialer"}}
//! {"shell": {"type": "mark_running", "session": 1}}
//! {"authorize": {"pid": 41, "appId": "camera"}}
//! {"bindTexture": {"surface": 10, "buffer": {"width": 720, "height": 1280, "texture_capable": true}}}
//! ```
//!
//! Blank lines and lines starting with `#` are skipped.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use shellmir::protocol::{BufferInfo, CompositorEvent, ShellCommand, SurfaceHandle};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ScriptStep {
	Compositor(CompositorEvent),
	Shell(ShellCommand),
	#[serde(rename_all = "camelCase")]
	Authorize {
		pid: u32,
		app_id: String,
	},
	BindTexture {
		surface: SurfaceHandle,
		buffer: BufferInfo,
	},
}

pub fn load(path: &Path) -> Result<Vec<ScriptStep>> {
	let content = std::fs::read_to_string(path).with_context(|| format!("failed to read script {}", path.display()))?;
	parse(&content).with_context(|| format!("invalid script {}", path.display()))
}

pub fn parse(content: &str) -> Result<Vec<ScriptStep>> {
	content
		.lines()
		.enumerate()
		.filter(|(_, line)| {
			let line = line.trim();
			!line.is_empty() && !line.starts_with('#')
		})
		.map(|(index, line)| serde_json::from_str(line).with_context(|| format!("line {}", index + 1)))
		.collect()
}
