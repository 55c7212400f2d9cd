// shellmir: lifecycle state for compositor-backed shells
//
// Tracks application sessions and their surfaces, the shared wake lock, and the
// handle lookups the shell needs. Marshaling compositor callbacks onto the UI
// context lives in `shellmir-runtime`.

pub mod error;
pub mod manager;
pub mod notify;
pub mod registry;
pub mod session;
pub mod surface;
pub mod surface_id;
pub mod wakelock;

pub use error::{Error, Result};
pub use manager::{ApplicationManager, SessionSnapshot, ShellSnapshot, SurfaceSnapshot};
pub use notify::{NotificationReceiver, Notifier};
pub use registry::SessionRegistry;
pub use session::{LifecycleOp, Session, SessionInterface};
pub use surface::{FrameStats, RenderOutcome, Surface, SurfaceInterface, TextureBinding};
pub use surface_id::{MemorySurfaceIdStore, SurfaceIdStore};
pub use wakelock::{LoggingPowerBackend, OwnerToken, PowerBackend, WakeLock};

pub use shellmir_protocol as protocol;
