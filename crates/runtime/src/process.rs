//! Host process checks used when authorizing compositor sessions.

use std::path::PathBuf;

/// Returns `true` when `pid` names a running process on this host.
///
/// Zombies count as gone: their surfaces can never draw again. Without
/// `/proc` only the current process is known to be alive.
pub fn pid_is_alive(pid: u32) -> bool {
	if pid == 0 {
		return false;
	}
	match std::fs::read_to_string(proc_path(pid).join("stat")) {
		Ok(stat) => state_from_stat(&stat).is_some_and(|state| !matches!(state, 'Z' | 'X' | 'x')),
		Err(_) => pid == std::process::id(),
	}
}

fn proc_path(pid: u32) -> PathBuf {
	PathBuf::from("/proc").join(pid.to_string())
}

/// Extracts the state letter from a `/proc/<pid>/stat` line.
///
/// The command name is parenthesized and may itself contain `)`, so the
/// state is the first field after the last one.
fn state_from_stat(stat: &str) -> Option<char> {
	let (_, rest) = stat.rsplit_once(')')?;
	rest.trim_start().chars().next()
}

/// Reads the `APP_ID` a launcher exported into the environment of `pid`.
///
/// Returns `None` when the process is gone, unreadable, or was not launched
/// through the shell.
pub fn launched_app_id(pid: u32) -> Option<String> {
	let environ = std::fs::read(proc_path(pid).join("environ")).ok()?;
	app_id_from_environ(&environ)
}

fn app_id_from_environ(environ: &[u8]) -> Option<String> {
	environ
		.split(|byte| *byte == 0)
		.filter_map(|entry| entry.strip_prefix(b"APP_ID="))
		.find(|value| !value.is_empty())
		.map(|value| String::from_utf8_lossy(value).into_owned())
}
