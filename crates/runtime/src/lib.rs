//! shellmir-runtime: drives shellmir's lifecycle state from the UI context.
//!
//! The compositor calls in from its own threads through a [`CompositorBridge`];
//! the shell talks to the same queue through a [`ShellHandle`]. A single
//! [`LifecycleCoordinator`] drains the queue and owns all mutable state.

pub mod authorize;
pub mod bridge;
pub mod config;
pub mod coordinator;
pub mod policy;
pub mod process;

pub use authorize::{Authorizer, PolicyAuthorizer};
pub use bridge::{CompositorBridge, ShellHandle, UiReceiver, ui_channel};
pub use config::LifecycleConfig;
pub use coordinator::{CoordinatorBuilder, LifecycleCoordinator};
pub use policy::{KeepCompositing, SurfacePolicy, ThrottleSuspended};
pub use shellmir::{Error, Result};
