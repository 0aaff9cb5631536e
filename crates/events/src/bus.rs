//! Event publishing/subscription abstraction (mechanics only).
//!
//! The bus is a synchronous, priority-ordered pub/sub registry. It makes
//! minimal assumptions:
//!
//! - **Transport-agnostic**: the trait fits an in-process registry as well as
//!   a host-framework listener collection.
//! - **Synchronous fan-out**: `publish` returns only after every listener on
//!   the channel has run.
//! - **No persistence**: the bus distributes events; it never stores them.
//!
//! Listener failures are the bus's to surface: `publish` reports the first
//! failing listener through its error type, and callers decide what that
//! means for the surrounding form-processing cycle.

use core::fmt;
use std::sync::Arc;

use crate::listener::EventListener;

/// A named, prioritized listener registration.
///
/// The name identifies the listener in logs and errors; the priority decides
/// where it sorts in the channel's invocation order (higher runs earlier).
pub struct Registration<E> {
    name: String,
    priority: i32,
    listener: Arc<dyn EventListener<E>>,
}

impl<E> Registration<E> {
    pub fn new(
        name: impl Into<String>,
        priority: i32,
        listener: Arc<dyn EventListener<E>>,
    ) -> Self {
        Self {
            name: name.into(),
            priority,
            listener,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn priority(&self) -> i32 {
        self.priority
    }

    pub fn listener(&self) -> &Arc<dyn EventListener<E>> {
        &self.listener
    }
}

impl<E> Clone for Registration<E> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            priority: self.priority,
            listener: Arc::clone(&self.listener),
        }
    }
}

impl<E> fmt::Debug for Registration<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("name", &self.name)
            .field("priority", &self.priority)
            .finish_non_exhaustive()
    }
}

/// Synchronous, priority-ordered pub/sub bus.
///
/// Contract for implementations:
///
/// - `publish` invokes every listener registered on the channel in descending
///   priority order, ties broken by registration order, each receiving the
///   same event instance in sequence, and returns only after the last one.
/// - An unknown channel is not an error; publishing to it is a no-op.
/// - The first listener failure aborts the remaining chain and surfaces
///   through the publish result.
pub trait EventBus<E>: Send + Sync {
    type Error: fmt::Debug + Send + Sync + 'static;

    /// Register a listener on `channel`.
    fn register(&self, channel: &str, registration: Registration<E>) -> Result<(), Self::Error>;

    /// Publish `event` to every listener registered on `channel`, in order.
    fn publish(&self, channel: &str, event: &mut E) -> Result<(), Self::Error>;
}

impl<E, B> EventBus<E> for Arc<B>
where
    B: EventBus<E> + ?Sized,
{
    type Error = B::Error;

    fn register(&self, channel: &str, registration: Registration<E>) -> Result<(), Self::Error> {
        (**self).register(channel, registration)
    }

    fn publish(&self, channel: &str, event: &mut E) -> Result<(), Self::Error> {
        (**self).publish(channel, event)
    }
}
