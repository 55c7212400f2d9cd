//! Marshaling boundary between the compositor's threads and the UI context.
//!
//! Every compositor callback, authorization request and shell command goes
//! through one FIFO queue, so events for a given session or surface are
//! applied in the order they were produced.
//!
//! # Message Flow
//!
//! 1. A compositor thread calls [`CompositorBridge::post`] (fire-and-forget) or
//!    [`CompositorBridge::authorize`] (blocking)
//! 2. The envelope is queued on an unbounded channel
//! 3. [`LifecycleCoordinator::run`](crate::LifecycleCoordinator::run) pops it on the UI context
//! 4. Requests carrying a `oneshot` sender get their answer sent back

use shellmir::protocol::{BufferInfo, CompositorEvent, ShellCommand, SurfaceHandle};
use shellmir::{Error, Result, ShellSnapshot, TextureBinding};
use tokio::sync::{mpsc, oneshot};
use tracing::{trace, warn};

pub(crate) enum Envelope {
	Compositor(CompositorEvent),
	Authorize {
		pid: u32,
		app_id: String,
		reply: oneshot::Sender<bool>,
	},
	Shell(ShellCommand),
	BindTexture {
		surface: SurfaceHandle,
		buffer: BufferInfo,
		reply: oneshot::Sender<Result<TextureBinding>>,
	},
	Snapshot {
		reply: oneshot::Sender<ShellSnapshot>,
	},
	Shutdown,
}

/// Creates the UI-context queue.
///
/// Returns the compositor-side sender, the shell-side sender, and the receiver
/// to hand to the coordinator.
pub fn ui_channel() -> (CompositorBridge, ShellHandle, UiReceiver) {
	let (tx, rx) = mpsc::unbounded_channel();
	(CompositorBridge { tx: tx.clone() }, ShellHandle { tx }, UiReceiver { rx })
}

/// Receiving end of the UI-context queue.
pub struct UiReceiver {
	rx: mpsc::UnboundedReceiver<Envelope>,
}

impl UiReceiver {
	pub(crate) async fn recv(&mut self) -> Option<Envelope> {
		self.rx.recv().await
	}

	pub(crate) fn try_recv(&mut self) -> Option<Envelope> {
		self.rx.try_recv().ok()
	}
}

/// Handle given to the compositor's callback threads.
#[derive(Clone)]
pub struct CompositorBridge {
	tx: mpsc::UnboundedSender<Envelope>,
}

impl CompositorBridge {
	/// Queues a lifecycle event. Returns `false` once the UI context is gone.
	pub fn post(&self, event: CompositorEvent) -> bool {
		trace!(target = "shellmir.bridge", kind = event.kind(), "queueing compositor event");
		if self.tx.send(Envelope::Compositor(event)).is_err() {
			warn!(target = "shellmir.bridge", "UI context gone; compositor event dropped");
			return false;
		}
		true
	}

	/// Asks the UI context whether a new client may connect, blocking until it answers.
	///
	/// Must be called from a compositor thread, never from inside the async
	/// runtime driving the coordinator. Answers `false` when the UI context is gone.
	pub fn authorize(&self, pid: u32, app_id: &str) -> bool {
		let (reply, answer) = oneshot::channel();
		let request = Envelope::Authorize {
			pid,
			app_id: app_id.to_string(),
			reply,
		};
		if self.tx.send(request).is_err() {
			warn!(target = "shellmir.bridge", pid, app_id, "UI context gone; refusing session");
			return false;
		}
		answer.blocking_recv().unwrap_or_else(|_| {
			warn!(target = "shellmir.bridge", pid, app_id, "UI context stopped before answering; refusing session");
			false
		})
	}
}

/// Handle used by the shell UI and the toolkit's render callbacks.
#[derive(Clone)]
pub struct ShellHandle {
	tx: mpsc::UnboundedSender<Envelope>,
}

impl ShellHandle {
	pub fn send(&self, command: ShellCommand) -> Result<()> {
		self.tx.send(Envelope::Shell(command)).map_err(|_| Error::ChannelClosed)
	}

	/// Binds a compositor buffer on the UI context and waits for the outcome.
	pub async fn bind_texture(&self, surface: SurfaceHandle, buffer: BufferInfo) -> Result<TextureBinding> {
		let (reply, answer) = oneshot::channel();
		self.tx
			.send(Envelope::BindTexture { surface, buffer, reply })
			.map_err(|_| Error::ChannelClosed)?;
		answer.await.map_err(|_| Error::ChannelClosed).and_then(|result| result)
	}

	pub async fn snapshot(&self) -> Result<ShellSnapshot> {
		let (reply, answer) = oneshot::channel();
		self.tx.send(Envelope::Snapshot { reply }).map_err(|_| Error::ChannelClosed)?;
		answer.await.map_err(|_| Error::ChannelClosed)
	}

	/// Asks the coordinator loop to stop after the envelopes already queued.
	pub fn shutdown(&self) {
		let _ = self.tx.send(Envelope::Shutdown);
	}
}
