use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use shellmir::{NotificationReceiver, Notifier};
use shellmir_runtime::{CompositorBridge, LifecycleConfig, LifecycleCoordinator, ShellHandle, ui_channel};
use tokio::runtime::Handle;
use tracing::{debug, info, warn};

use crate::cli::Commands;
use crate::scenario::{self, ScriptStep};

pub async fn dispatch(command: Commands) -> Result<()> {
	match command {
		Commands::Replay {
			script,
			config,
			throttle,
			exempt,
		} => replay(&script, config, throttle, exempt).await,
		Commands::CheckConfig { file } => check_config(&file),
	}
}

async fn replay(script: &Path, config_path: Option<PathBuf>, throttle: bool, exempt: Vec<String>) -> Result<()> {
	let mut config = match config_path {
		Some(path) => LifecycleConfig::load(&path)?,
		None => LifecycleConfig::default(),
	};
	config.throttle_suspended_surfaces |= throttle;
	config.exempt_app_ids.extend(exempt);
	config.validate()?;

	let steps = scenario::load(script)?;
	info!(target = "shellmir", steps = steps.len(), script = %script.display(), "replaying script");

	let (notifier, mut notes) = Notifier::channel();
	let coordinator = LifecycleCoordinator::builder(config, notifier).build();
	let (bridge, shell, rx) = ui_channel();
	let ui = tokio::spawn(coordinator.run(rx));

	// The compositor side blocks on authorization, so it runs off the runtime.
	let driver_shell = shell.clone();
	let runtime = Handle::current();
	tokio::task::spawn_blocking(move || drive(steps, &bridge, &driver_shell, &runtime))
		.await
		.context("script driver panicked")??;

	let snapshot = shell.snapshot().await?;
	print_notifications(&mut notes)?;
	println!("{}", serde_json::to_string(&serde_json::json!({ "snapshot": snapshot }))?);

	shell.shutdown();
	ui.await.context("coordinator task panicked")?;
	Ok(())
}

fn drive(steps: Vec<ScriptStep>, bridge: &CompositorBridge, shell: &ShellHandle, runtime: &Handle) -> Result<()> {
	for step in steps {
		match step {
			ScriptStep::Compositor(event) => {
				bridge.post(event);
			}
			ScriptStep::Shell(command) => shell.send(command)?,
			ScriptStep::Authorize { pid, app_id } => {
				let allowed = bridge.authorize(pid, &app_id);
				info!(target = "shellmir", pid, app_id = %app_id, allowed, "authorization answered");
			}
			ScriptStep::BindTexture { surface, buffer } => match runtime.block_on(shell.bind_texture(surface, buffer)) {
				Ok(binding) => debug!(target = "shellmir", ?binding, "texture bound"),
				Err(err) if err.is_resource_failure() => warn!(target = "shellmir", %surface, error = %err, "frame skipped"),
				Err(shellmir::Error::UnknownSurface(_)) => warn!(target = "shellmir", %surface, "bind for unknown surface"),
				Err(err) => return Err(err.into()),
			},
		}
	}
	Ok(())
}

fn print_notifications(notes: &mut NotificationReceiver) -> Result<()> {
	while let Ok(notification) = notes.try_recv() {
		println!("{}", serde_json::to_string(&notification)?);
	}
	Ok(())
}

fn check_config(file: &Path) -> Result<()> {
	let config = LifecycleConfig::load(file)?;
	println!("{}", serde_json::to_string_pretty(&config)?);
	Ok(())
}
