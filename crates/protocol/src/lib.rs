//! Boundary types for shellmir.
//!
//! This crate contains the plain data exchanged across the three edges of the
//! lifecycle coordinator: compositor -> coordinator events, shell -> coordinator
//! commands, and coordinator -> shell notifications.
//!
//! # Design Philosophy
//!
//! Types in this crate are:
//! * Pure data: No behavior beyond small conversions and serialization
//! * Copyable handles: Compositor objects are referred to by opaque ids only
//! * Stable: Changes only when one of the boundaries changes
//!
//! State machines and ownership live in the `shellmir` crate.

pub mod events;
pub mod handles;
pub mod state;

pub use events::*;
pub use handles::*;
pub use state::*;
