//! Composition layer: the alter dispatcher and listener wiring.
//!
//! This crate contains no IO; it composes the `formbus-events` traits into
//! the single entry point a host calls once per form-processing cycle.

pub mod alter_dispatcher;
pub mod listener_set;


pub use alter_dispatcher::{AlterDispatcher, DispatchError};
pub use listener_set::ListenerSet;
