//! Delivery of shell notifications.
//!
//! Notifications are pushed into an unbounded channel so that emitting one
//! never runs observer code while a state lock is held.

use shellmir_protocol::ShellNotification;
use tokio::sync::mpsc;
use tracing::trace;

/// Receiving end of the shell notification stream.
pub type NotificationReceiver = mpsc::UnboundedReceiver<ShellNotification>;

/// Cloneable sender shared by every session, surface and the wake lock.
#[derive(Debug, Clone)]
pub struct Notifier {
	tx: Option<mpsc::UnboundedSender<ShellNotification>>,
}

impl Notifier {
	/// Creates a notifier and the receiver the shell UI reads from.
	pub fn channel() -> (Self, NotificationReceiver) {
		let (tx, rx) = mpsc::unbounded_channel();
		(Self { tx: Some(tx) }, rx)
	}

	/// A notifier nobody listens to.
	pub fn disconnected() -> Self {
		Self { tx: None }
	}

	pub fn emit(&self, notification: ShellNotification) {
		let Some(tx) = &self.tx else {
			return;
		};
		if tx.send(notification).is_err() {
			trace!(target = "shellmir.notify", "shell receiver dropped; notification discarded");
		}
	}
}

#[cfg(test)]
pub(crate) fn drain(rx: &mut NotificationReceiver) -> Vec<ShellNotification> {
	let mut out = Vec::new();
	while let Ok(notification) = rx.try_recv() {
		out.push(notification);
	}
	out
}
